use std::sync::Arc;

use log::{debug, error, info};

use crate::modules::errors::classify;
use crate::modules::panel::Panel;
use crate::modules::types::Notice;

pub const CHOOSE_DATE: &str = "Select a date to view data.";
pub const NO_DATA: &str = "No data for this date.";

/// Loads the keyword ranking of one day into the table.
#[derive(Debug, Clone)]
pub struct KeywordViewer {
    panel: Arc<Panel>,
}

impl KeywordViewer {
    pub fn new(panel: Arc<Panel>) -> Self {
        Self { panel }
    }

    /// Loads whatever date the selector currently holds.
    pub async fn view_selected(&self) {
        let date = self.panel.snapshot().selected_date;
        self.load_keywords(date.as_deref()).await;
    }

    pub async fn load_keywords(&self, date: Option<&str>) {
        let Some(date) = date.map(str::trim).filter(|d| !d.is_empty()) else {
            let ticket = self.panel.issue_ticket();
            self.panel
                .update(|state| state.prompt_for_date(ticket, Notice::secondary(CHOOSE_DATE)));
            return;
        };
        info!("Loading keywords for {date}");

        let ticket = self.panel.issue_ticket();
        self.panel.update(|state| state.begin_keywords(ticket));

        let outcome = match self.panel.client().keywords(date).await {
            Ok(resp) => {
                info!("Loaded {} keywords for {date}", resp.keywords.len());
                Ok(resp.keywords)
            }
            Err(e) => {
                error!("Error loading keywords for {date}: {e}");
                let feedback = classify(&e);
                Err(Notice::danger(format!("Failed to load keywords: {feedback}")))
            }
        };

        let applied = self.panel.update(|state| {
            state.finish_keywords(ticket, date, outcome, Notice::secondary(NO_DATA))
        });
        if !applied {
            debug!("Dropped keywords for {date}, a newer load is running");
        }
    }
}
