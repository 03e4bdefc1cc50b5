use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::modules::dates::DateCatalog;
use crate::modules::logs::LogTailer;
use crate::modules::panel::Panel;
use crate::modules::status::StatusPoller;

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Status and log loops plus the startup date load. Dropping it aborts them.
#[derive(Debug)]
pub struct PollTasks {
    panel: Arc<Panel>,
    handles: Vec<JoinHandle<()>>,
}

impl PollTasks {
    pub fn start(panel: &Arc<Panel>) -> Self {
        let config = panel.config();
        info!(
            "Starting pollers (status every {:?}, logs every {:?})",
            config.status_interval(),
            config.log_interval()
        );

        let catalog = DateCatalog::new(panel.clone());
        let mut shutdown = panel.shutdown_signal();
        let dates = tokio::spawn(async move {
            tokio::select! {
                _ = catalog.load_available_dates() => {}
                _ = shutdown.changed() => debug!("Date load cancelled"),
            }
        });

        let poller = StatusPoller::new(panel.clone());
        let status = spawn_repeating(
            "status",
            config.status_interval(),
            panel.shutdown_signal(),
            move || {
                let poller = poller.clone();
                async move {
                    poller.check_status().await;
                }
            },
        );

        let tailer = LogTailer::new(panel.clone());
        let logs = spawn_repeating(
            "logs",
            config.log_interval(),
            panel.shutdown_signal(),
            move || {
                let tailer = tailer.clone();
                async move { tailer.update_logs().await }
            },
        );

        Self {
            panel: panel.clone(),
            handles: vec![dates, status, logs],
        }
    }

    pub async fn shutdown(mut self) {
        self.panel.begin_shutdown();
        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                warn!("Poll task ended abnormally: {e}");
            }
        }
        info!("Pollers stopped");
    }
}

impl Drop for PollTasks {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

fn spawn_repeating<F, Fut>(
    label: &'static str,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    job: F,
) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period.max(MIN_PERIOD));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = async {
                    ticker.tick().await;
                    job().await;
                } => {}
            }
        }
        debug!("{label} loop stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn repeating_job_runs_immediately_and_stops_on_signal() {
        let (tx, rx) = watch::channel(false);
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let handle = spawn_repeating("test", Duration::from_millis(20), rx, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(runs.load(Ordering::SeqCst) >= 1);

        tokio::time::sleep(Duration::from_millis(70)).await;
        assert!(runs.load(Ordering::SeqCst) >= 2);

        tx.send_replace(true);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        let settled = runs.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(runs.load(Ordering::SeqCst), settled);
    }

    #[tokio::test]
    async fn zero_period_is_clamped_instead_of_panicking() {
        let (tx, rx) = watch::channel(false);
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let handle = spawn_repeating("zero", Duration::ZERO, rx, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(runs.load(Ordering::SeqCst) >= 2);

        tx.send_replace(true);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
