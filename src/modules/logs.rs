use std::sync::Arc;

use log::{debug, error};

use crate::modules::panel::{LogPane, Panel};

/// Mirrors the tail of the scrape log.
#[derive(Debug, Clone)]
pub struct LogTailer {
    panel: Arc<Panel>,
}

impl LogTailer {
    pub fn new(panel: Arc<Panel>) -> Self {
        Self { panel }
    }

    /// Replaces the log pane with the latest lines, verbatim.
    pub async fn update_logs(&self) {
        let ticket = self.panel.issue_ticket();
        let lines = self.panel.config().log_lines;
        let pane = match self.panel.client().logs(lines).await {
            Ok(resp) => LogPane::Text(resp.logs),
            Err(e) => {
                error!("Error updating logs: {e}");
                LogPane::Failed
            }
        };
        if !self.panel.update(|state| state.apply_logs(ticket, pane)) {
            debug!("Dropped stale log reply {ticket:?}");
        }
    }
}
