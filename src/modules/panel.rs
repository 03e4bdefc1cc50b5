use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;
use tokio::sync::watch;

use crate::modules::backend::ApiClient;
use crate::modules::errors::FetchError;
use crate::modules::render::{View, render};
use crate::modules::serialize::PanelConfig;
use crate::modules::types::{JobAction, KeywordEntry, Notice, RunStatus};

pub const LOG_ERROR_TEXT: &str = "Error while updating logs.";
pub const KEYWORD_HINT: &str = "Pick a date and choose 'view' to load keywords.";
pub const RUN_UNAVAILABLE: &str = "Scrape start is not available right now.";
pub const STOP_UNAVAILABLE: &str = "Scrape stop is not available right now.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub run_enabled: bool,
    pub stop_enabled: bool,
}

impl Controls {
    pub fn for_status(status: RunStatus) -> Self {
        match status {
            RunStatus::Running { .. } => Self {
                run_enabled: false,
                stop_enabled: true,
            },
            RunStatus::Idle => Self {
                run_enabled: true,
                stop_enabled: false,
            },
            RunStatus::Unknown => Self {
                run_enabled: false,
                stop_enabled: false,
            },
        }
    }

    pub fn allows(&self, action: JobAction) -> bool {
        match action {
            JobAction::Run => self.run_enabled,
            JobAction::Stop => self.stop_enabled,
        }
    }

    fn set(&mut self, action: JobAction, enabled: bool) {
        match action {
            JobAction::Run => self.run_enabled = enabled,
            JobAction::Stop => self.stop_enabled = enabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogPane {
    Waiting,
    Text(String),
    Failed,
}

impl LogPane {
    pub fn text(&self) -> &str {
        match self {
            LogPane::Waiting => "",
            LogPane::Text(text) => text,
            LogPane::Failed => LOG_ERROR_TEXT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordPane {
    pub loading: bool,
    pub message: Option<Notice>,
    pub rows: Vec<KeywordEntry>,
    pub table_visible: bool,
    pub shown_date: Option<String>,
}

impl Default for KeywordPane {
    fn default() -> Self {
        Self {
            loading: false,
            message: Some(Notice::secondary(KEYWORD_HINT)),
            rows: Vec::new(),
            table_visible: false,
            shown_date: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelState {
    pub status: RunStatus,
    pub controls: Controls,
    pub logs: LogPane,
    pub run_message: Option<Notice>,
    pub selected_date: Option<String>,
    pub keywords: KeywordPane,
    status_ticket: Ticket,
    log_ticket: Ticket,
    keyword_ticket: Ticket,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            status: RunStatus::Unknown,
            controls: Controls::for_status(RunStatus::Unknown),
            logs: LogPane::Waiting,
            run_message: None,
            selected_date: None,
            keywords: KeywordPane::default(),
            status_ticket: Ticket::default(),
            log_ticket: Ticket::default(),
            keyword_ticket: Ticket::default(),
        }
    }
}

impl PanelState {
    /// Returns false when a newer status-affecting request already landed.
    pub fn apply_status(&mut self, ticket: Ticket, status: RunStatus) -> bool {
        if ticket < self.status_ticket {
            return false;
        }
        self.status_ticket = ticket;
        self.status = status;
        self.controls = Controls::for_status(status);
        true
    }

    /// A disabled control refuses the action and nothing may be sent.
    pub fn begin_action(&mut self, ticket: Ticket, action: JobAction, message: Notice) -> bool {
        if !self.controls.allows(action) {
            let refusal = match action {
                JobAction::Run => RUN_UNAVAILABLE,
                JobAction::Stop => STOP_UNAVAILABLE,
            };
            self.run_message = Some(Notice::danger(refusal));
            return false;
        }
        if ticket > self.status_ticket {
            self.status_ticket = ticket;
        }
        self.controls.set(action, false);
        self.run_message = Some(message);
        true
    }

    pub fn action_succeeded(&mut self, message: Notice) {
        self.run_message = Some(message);
    }

    pub fn action_failed(&mut self, ticket: Ticket, action: JobAction, message: Notice) {
        self.run_message = Some(message);
        if ticket >= self.status_ticket {
            self.controls.set(action, true);
        }
    }

    pub fn apply_logs(&mut self, ticket: Ticket, logs: LogPane) -> bool {
        if ticket < self.log_ticket {
            return false;
        }
        self.log_ticket = ticket;
        self.logs = logs;
        true
    }

    pub fn prompt_for_date(&mut self, ticket: Ticket, message: Notice) {
        if ticket < self.keyword_ticket {
            return;
        }
        self.keyword_ticket = ticket;
        self.keywords.loading = false;
        self.keywords.message = Some(message);
        self.keywords.table_visible = false;
    }

    pub fn begin_keywords(&mut self, ticket: Ticket) {
        self.keyword_ticket = ticket;
        self.keywords.loading = true;
        self.keywords.rows.clear();
        self.keywords.table_visible = false;
        self.keywords.message = None;
        self.keywords.shown_date = None;
    }

    pub fn finish_keywords(
        &mut self,
        ticket: Ticket,
        date: &str,
        outcome: Result<Vec<KeywordEntry>, Notice>,
        empty_message: Notice,
    ) -> bool {
        if ticket < self.keyword_ticket {
            return false;
        }
        self.keywords.loading = false;
        match outcome {
            Ok(rows) if rows.is_empty() => {
                self.keywords.message = Some(empty_message);
            }
            Ok(rows) => {
                self.keywords.rows = rows;
                self.keywords.table_visible = true;
                self.keywords.message = None;
                self.keywords.shown_date = Some(date.to_string());
            }
            Err(notice) => {
                self.keywords.message = Some(notice);
            }
        }
        true
    }
}

#[derive(Debug)]
pub struct Panel {
    client: ApiClient,
    config: PanelConfig,
    state: Mutex<PanelState>,
    tickets: AtomicU64,
    revision: watch::Sender<u64>,
    shutdown: watch::Sender<bool>,
}

impl Panel {
    pub fn new(config: PanelConfig) -> Result<Arc<Self>, FetchError> {
        let client = ApiClient::new(&config)?;
        let (revision, _) = watch::channel(0);
        let (shutdown, _) = watch::channel(false);
        Ok(Arc::new(Self {
            client,
            config,
            state: Mutex::new(PanelState::default()),
            tickets: AtomicU64::new(0),
            revision,
            shutdown,
        }))
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn issue_ticket(&self) -> Ticket {
        Ticket(self.tickets.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn lock(&self) -> MutexGuard<'_, PanelState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> PanelState {
        self.lock().clone()
    }

    pub fn view(&self) -> View {
        render(&self.lock())
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut PanelState) -> R) -> R {
        let result = {
            let mut state = self.lock();
            f(&mut state)
        };
        self.revision.send_modify(|rev| *rev += 1);
        result
    }

    pub fn select_date(&self, date: impl Into<String>) {
        let date = date.into();
        debug!("Selected date {date}");
        self.update(|state| state.selected_date = Some(date));
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    pub fn begin_shutdown(&self) {
        self.shutdown.send_replace(true);
    }
}
