use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::task::JoinHandle;

use crate::modules::errors::{FetchError, classify};
use crate::modules::panel::{Panel, Ticket};
use crate::modules::status::StatusPoller;
use crate::modules::types::{JobAction, MessageResponse, Notice, ScrapeRequest};

/// Starts and stops the scrape job.
///
/// A successful request leaves its control disabled; the status re-check
/// scheduled afterwards decides what comes back on. Nothing is sent while the
/// action's control is off.
#[derive(Debug, Clone)]
pub struct RunController {
    panel: Arc<Panel>,
    poller: StatusPoller,
}

impl RunController {
    pub fn new(panel: Arc<Panel>) -> Self {
        let poller = StatusPoller::new(panel.clone());
        Self { panel, poller }
    }

    /// Returns the scheduled status re-check when the request succeeded.
    pub async fn run_scrape(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Option<JoinHandle<()>> {
        let request = ScrapeRequest::from_inputs(start_date, end_date);
        info!(
            "Run requested (start={:?}, end={:?})",
            request.start_date, request.end_date
        );
        let ticket = self.panel.issue_ticket();
        let started = self.panel.update(|state| {
            state.begin_action(ticket, JobAction::Run, Notice::info("Requesting scrape start..."))
        });
        if !started {
            warn!("Run refused, the control is disabled");
            return None;
        }

        let result = self.panel.client().run_scrape(&request).await;
        self.finish(JobAction::Run, ticket, result, self.panel.config().run_recheck())
    }

    pub async fn stop_scrape(&self) -> Option<JoinHandle<()>> {
        info!("Stop requested");
        let ticket = self.panel.issue_ticket();
        let started = self.panel.update(|state| {
            state.begin_action(ticket, JobAction::Stop, Notice::info("Requesting scrape stop..."))
        });
        if !started {
            warn!("Stop refused, the control is disabled");
            return None;
        }

        let result = self.panel.client().stop_scrape().await;
        self.finish(JobAction::Stop, ticket, result, self.panel.config().stop_recheck())
    }

    fn finish(
        &self,
        action: JobAction,
        ticket: Ticket,
        result: Result<MessageResponse, FetchError>,
        recheck: Duration,
    ) -> Option<JoinHandle<()>> {
        match result {
            Ok(reply) => {
                info!("{action} reply: {reply}");
                if let Some(pid) = reply.pid {
                    info!("Scrape process pid {pid}");
                }
                if let Some(command) = &reply.command {
                    debug!("Scrape command: {command}");
                }
                self.panel
                    .update(|state| state.action_succeeded(Notice::success(reply.message)));
                Some(self.schedule_recheck(recheck))
            }
            Err(e) => {
                error!("Error on {action} request: {e}");
                let feedback = classify(&e);
                let text = match action {
                    JobAction::Run => format!("Failed to start scrape: {feedback}"),
                    JobAction::Stop => format!("Failed to stop scrape: {feedback}"),
                };
                self.panel
                    .update(|state| state.action_failed(ticket, action, Notice::danger(text)));
                None
            }
        }
    }

    /// One delayed status poll, skipped if the panel shuts down first.
    fn schedule_recheck(&self, delay: Duration) -> JoinHandle<()> {
        let poller = self.poller.clone();
        let mut shutdown = self.panel.shutdown_signal();
        tokio::spawn(async move {
            if *shutdown.borrow() {
                return;
            }
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    poller.check_status().await;
                }
                _ = shutdown.changed() => {
                    debug!("Status re-check cancelled");
                }
            }
        })
    }
}
