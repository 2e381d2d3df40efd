//! Bounded wait for host document readiness

use std::sync::Arc;
use std::time::Duration;

use anchor_host::HostDocument;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub struct ReadinessGate<D: HostDocument> {
    document: Arc<D>,
    shutdown: CancellationToken,
}

impl<D: HostDocument> ReadinessGate<D> {
    pub fn new(document: Arc<D>, shutdown: CancellationToken) -> Self {
        Self { document, shutdown }
    }

    /// Wait until the document reports `interactive` or `complete`.
    ///
    /// Returns `false` when `timeout` elapses first, when the lifecycle signal
    /// closes, or when the owning engine shuts down. The lifecycle subscription
    /// is released on every path.
    pub async fn wait_until_ready(&self, timeout: Duration) -> bool {
        if self.document.ready_state().is_ready() {
            return true;
        }

        let mut lifecycle = self.document.subscribe_lifecycle();
        // A transition may have landed between the first check and subscribing.
        if self.document.ready_state().is_ready() {
            return true;
        }

        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);

        let ready = loop {
            tokio::select! {
                _ = &mut deadline => {
                    debug!(timeout_ms = timeout.as_millis() as u64, "document not ready before timeout");
                    break false;
                }
                _ = self.shutdown.cancelled() => break false,
                event = lifecycle.recv() => match event {
                    Ok(state) if state.is_ready() => {
                        debug!(state = %state, "document ready");
                        break true;
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "lifecycle listener lagged");
                        if self.document.ready_state().is_ready() {
                            break true;
                        }
                    }
                    Err(RecvError::Closed) => break false,
                },
            }
        };

        drop(lifecycle);
        ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_host::{MemoryHostTree, ReadyState};
    use std::time::Instant;

    fn gate(tree: &Arc<MemoryHostTree>) -> ReadinessGate<MemoryHostTree> {
        ReadinessGate::new(tree.clone(), CancellationToken::new())
    }

    #[tokio::test]
    async fn ready_document_resolves_without_subscribing() {
        let tree = Arc::new(MemoryHostTree::new(ReadyState::Interactive));
        assert!(gate(&tree).wait_until_ready(Duration::from_secs(5)).await);
        assert_eq!(tree.lifecycle_listener_count(), 0);
    }

    #[tokio::test]
    async fn resolves_on_transition() {
        let tree = Arc::new(MemoryHostTree::new(ReadyState::Loading));
        let signaller = {
            let tree = tree.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                tree.set_ready_state(ReadyState::Complete);
            })
        };

        assert!(gate(&tree).wait_until_ready(Duration::from_secs(5)).await);
        assert_eq!(tree.lifecycle_listener_count(), 0);
        signaller.await.unwrap();
    }

    #[tokio::test]
    async fn times_out_without_signal() {
        let tree = Arc::new(MemoryHostTree::new(ReadyState::Loading));
        let started = Instant::now();
        assert!(!gate(&tree).wait_until_ready(Duration::from_millis(30)).await);
        assert!(started.elapsed() >= Duration::from_millis(30));
        assert_eq!(tree.lifecycle_listener_count(), 0);
    }

    #[tokio::test]
    async fn shutdown_aborts_wait() {
        let tree = Arc::new(MemoryHostTree::new(ReadyState::Loading));
        let token = CancellationToken::new();
        let gate = ReadinessGate::new(tree.clone(), token.clone());
        token.cancel();
        assert!(!gate.wait_until_ready(Duration::from_secs(10)).await);
        assert_eq!(tree.lifecycle_listener_count(), 0);
    }
}
