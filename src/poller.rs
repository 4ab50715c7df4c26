//! Repeating background job with cancellation.
//!
//! The job runs once per tick of a `tokio::time::interval` (first tick is
//! immediate). A run always finishes before the next tick is awaited, and
//! missed ticks are skipped, so runs never overlap or pile up.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

pub struct Poller {
    name: &'static str,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, mut job: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            tracing::info!(target: "poller", name, period_secs = period.as_secs(), "poller started");
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::info!(target: "poller", name, "poller stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        job().await;
                    }
                }
            }
        });

        Self {
            name,
            cancel,
            handle: Some(handle),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Token observed by the loop; cancelling it stops the poller.
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel and wait for the current run (if any) to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(h) = self.handle.take() {
            if let Err(e) = h.await {
                tracing::warn!(target: "poller", name = self.name, error = %e, "poller task failed");
            }
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
