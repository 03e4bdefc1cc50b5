use std::sync::Arc;

use log::{debug, error};

use crate::modules::errors::classify;
use crate::modules::panel::Panel;
use crate::modules::types::RunStatus;

/// Keeps the status badge and the run/stop controls in step with the job.
#[derive(Debug, Clone)]
pub struct StatusPoller {
    panel: Arc<Panel>,
}

impl StatusPoller {
    pub fn new(panel: Arc<Panel>) -> Self {
        Self { panel }
    }

    /// One poll. Any failure shows the job as unknown until a later poll succeeds.
    pub async fn check_status(&self) -> RunStatus {
        let ticket = self.panel.issue_ticket();
        let status = match self.panel.client().status().await {
            Ok(resp) => RunStatus::from(resp),
            Err(e) => {
                error!("Error checking status: {e} ({})", classify(&e).kind);
                RunStatus::Unknown
            }
        };
        let applied = self.panel.update(|state| state.apply_status(ticket, status));
        if !applied {
            debug!("Dropped stale status reply {ticket:?}: {status}");
        }
        status
    }
}
