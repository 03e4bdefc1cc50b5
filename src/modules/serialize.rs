use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

pub const URL_ENV: &str = "KEYWORD_DASH_URL";

/// Settings for the panel, read from `keyword_dash.toml`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct PanelConfig {
    pub base_url: String,
    pub status_interval_ms: u64,
    pub log_interval_ms: u64,
    pub log_lines: usize,
    pub run_recheck_ms: u64,
    pub stop_recheck_ms: u64,
    pub request_timeout_secs: Option<u64>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            status_interval_ms: 5000,
            log_interval_ms: 10000,
            log_lines: 100,
            run_recheck_ms: 500,
            stop_recheck_ms: 1500,
            request_timeout_secs: None,
        }
    }
}

impl PanelConfig {
    pub fn status_interval(&self) -> Duration {
        Duration::from_millis(self.status_interval_ms)
    }

    pub fn log_interval(&self) -> Duration {
        Duration::from_millis(self.log_interval_ms)
    }

    pub fn run_recheck(&self) -> Duration {
        Duration::from_millis(self.run_recheck_ms)
    }

    pub fn stop_recheck(&self) -> Duration {
        Duration::from_millis(self.stop_recheck_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.status_interval_ms == 0 {
            return Err("status_interval_ms must be greater than zero".into());
        }
        if self.log_interval_ms == 0 {
            return Err("log_interval_ms must be greater than zero".into());
        }
        if self.log_lines == 0 {
            return Err("log_lines must be greater than zero".into());
        }
        Ok(())
    }
}

pub fn load_panel_config(path: &str) -> Result<PanelConfig, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let config: PanelConfig = toml::from_str(&text)?;
    config.validate()?;
    Ok(config)
}

/// Like [`load_panel_config`], but a missing file means defaults.
pub fn load_panel_config_or_default(path: &str) -> Result<PanelConfig, Box<dyn std::error::Error>> {
    match load_panel_config(path) {
        Ok(config) => Ok(config),
        Err(err) if is_not_found(&err) => Ok(PanelConfig::default()),
        Err(err) => Err(err),
    }
}

pub fn save_panel_config(path: &str, config: &PanelConfig) -> Result<(), Box<dyn std::error::Error>> {
    let toml_str = toml::to_string_pretty(config)?;
    fs::write(path, toml_str)?;
    Ok(())
}

fn is_not_found(err: &Box<dyn std::error::Error>) -> bool {
    err.downcast_ref::<std::io::Error>()
        .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keyword_dash.toml");
        fs::write(&path, "base_url = \"http://dash:9000\"\nlog_lines = 50\n").unwrap();

        let config = load_panel_config(path.to_str().unwrap()).unwrap();
        assert_eq!(config.base_url, "http://dash:9000");
        assert_eq!(config.log_lines, 50);
        assert_eq!(config.status_interval(), Duration::from_secs(5));
        assert_eq!(config.stop_recheck(), Duration::from_millis(1500));
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = load_panel_config_or_default(path.to_str().unwrap()).unwrap();
        assert_eq!(config, PanelConfig::default());
    }

    #[test]
    fn broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "log_lines = \"many\"").unwrap();
        assert!(load_panel_config_or_default(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn zero_intervals_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zero.toml");
        fs::write(&path, "status_interval_ms = 0\n").unwrap();
        let err = load_panel_config_or_default(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("status_interval_ms"));

        fs::write(&path, "log_interval_ms = 0\n").unwrap();
        let err = load_panel_config(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("log_interval_ms"));

        assert!(PanelConfig::default().validate().is_ok());
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let config = PanelConfig {
            request_timeout_secs: Some(30),
            ..PanelConfig::default()
        };
        save_panel_config(path.to_str().unwrap(), &config).unwrap();
        assert_eq!(load_panel_config(path.to_str().unwrap()).unwrap(), config);
    }
}
