use crate::{SupervisorHandle, SupervisorStatus};

use std::time::Duration;

use log::{debug, info};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Resolves once the server is gone and no update restart is pending.
///
/// Polls on a fixed interval rather than reacting to every status change, so
/// the short `Absent` window between an update's stop and restart is never
/// mistaken for the end.
pub struct LivenessWaiter {
    status_rx: watch::Receiver<SupervisorStatus>,
    interval: Duration,
}

impl LivenessWaiter {
    pub fn new(handle: &SupervisorHandle, interval: Duration) -> Self {
        Self {
            status_rx: handle.subscribe(),
            interval,
        }
    }

    pub async fn wait(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let status = self.status_rx.borrow().clone();
            if status.is_finished() {
                info!("Server has stopped and no update is pending");
                return;
            }

            debug!("Liveness: {:?}", status);
        }
    }
}
