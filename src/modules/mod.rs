pub mod backend;
pub mod console;
pub mod control;
pub mod dates;
pub mod errors;
pub mod keywords;
pub mod logs;
pub mod panel;
pub mod render;
pub mod serialize;
pub mod status;
pub mod tasks;
pub mod types;
