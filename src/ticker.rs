// =============================================================================
// Ticker — Cancellable periodic task
// =============================================================================
//
// Wraps a tokio interval in a spawned task that invokes one synchronous
// callback per period. The first invocation happens one full period after
// spawn. Missed ticks are delayed rather than bursted, and because the
// callback runs inline in the loop two invocations can never overlap.
//
// Cancellation is explicit through `Ticker::cancel`; dropping the handle
// aborts the task.
// =============================================================================

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::debug;

pub struct Ticker {
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Spawn the loop on the current tokio runtime.
    pub fn spawn<F>(name: &'static str, period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut stop_rx => {
                        debug!(ticker = name, "ticker stopped");
                        break;
                    }
                    _ = interval.tick() => on_tick(),
                }
            }
        });

        Self {
            stop_tx: Some(stop_tx),
            task: Some(task),
        }
    }

    /// Stop the loop and wait for the in-flight tick, if any, to finish.
    pub async fn cancel(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
