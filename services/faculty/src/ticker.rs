//! Cancellable repeating tasks

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

/// Runs an async job on a fixed period until stopped or dropped
///
/// The first run happens as soon as the task starts. Runs that fall behind are
/// skipped rather than replayed back to back.
pub struct RepeatingTask {
    name: &'static str,
    handle: Option<JoinHandle<()>>,
}

impl RepeatingTask {
    pub fn new(name: &'static str) -> Self {
        Self { name, handle: None }
    }

    /// Start running `job` every `period`, replacing any previous schedule
    pub fn start<F, Fut>(&mut self, period: Duration, mut job: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.stop();

        let name = self.name;
        debug!("Starting {} every {:?}", name, period);

        self.handle = Some(tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                job().await;
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Stopped {}", self.name);
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for RepeatingTask {
    fn drop(&mut self) {
        self.stop();
    }
}
