//! Periodic auto-save task
//!
//! While a list is open its working set is written back on a fixed period,
//! whether or not anything changed. At most one task runs per store: the
//! store stops the running task (and waits for it) before spawning the next.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::error::ShoplistResult;
use crate::models::ListId;

/// Handle to a running auto-save task
///
/// Dropping the handle also ends the task, after any save in progress.
#[derive(Debug)]
pub struct AutoSave {
    list_id: ListId,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl AutoSave {
    /// Spawn a task calling `save` every `period`
    ///
    /// The first save happens one full period after spawning. Failures are
    /// logged and the next tick simply tries again.
    pub fn spawn<F, Fut>(list_id: ListId, period: Duration, mut save: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ShoplistResult<()>> + Send + 'static,
    {
        let (shutdown, mut stop_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // Skip the first immediate tick
            ticker.tick().await;

            debug!(
                list = %list_id,
                period_ms = period.as_millis() as u64,
                "Auto-save started"
            );

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = save().await {
                            warn!(list = %list_id, error = %e, "Auto-save failed");
                        }
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            debug!(list = %list_id, "Auto-save stopped");
        });

        Self {
            list_id,
            shutdown,
            handle,
        }
    }

    /// List the task was started for
    pub fn list_id(&self) -> ListId {
        self.list_id
    }

    /// Signal the task to stop and wait until it has exited
    ///
    /// A save already in progress runs to completion first.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            warn!(list = %self.list_id, error = %e, "Auto-save task ended abnormally");
        }
    }
}
