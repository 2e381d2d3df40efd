use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Cancellable delay between search attempts.
///
/// Every wait races the owning engine's shutdown token, so disposing the
/// engine wakes pending waits instead of leaving them scheduled.
#[derive(Clone, Debug)]
pub struct RetryTimer {
    shutdown: CancellationToken,
}

impl RetryTimer {
    pub fn new(shutdown: CancellationToken) -> Self {
        Self { shutdown }
    }

    /// Sleep for `delay`. Returns `false` if cancelled first.
    pub async fn wait(&self, delay: Duration) -> bool {
        if self.shutdown.is_cancelled() {
            return false;
        }
        tokio::select! {
            _ = self.shutdown.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}
