use std::sync::Arc;

use log::{error, info};

use crate::modules::panel::Panel;

/// Seeds the date selector with the newest day that has results.
#[derive(Debug, Clone)]
pub struct DateCatalog {
    panel: Arc<Panel>,
}

impl DateCatalog {
    pub fn new(panel: Arc<Panel>) -> Self {
        Self { panel }
    }

    /// Returns the date that was selected, if any. Failures are only logged.
    pub async fn load_available_dates(&self) -> Option<String> {
        let dates = match self.panel.client().dates().await {
            Ok(resp) => resp.dates,
            Err(e) => {
                error!("Error loading dates: {e}");
                return None;
            }
        };
        // newest first
        let latest = dates.into_iter().next()?;
        info!("Most recent date selected: {latest}");
        self.panel.select_date(latest.clone());
        Some(latest)
    }
}
