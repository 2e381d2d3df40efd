//! Engine facade handed to feature code

use std::sync::Arc;
use std::time::Duration;

use anchor_host::{HostDocument, HostNode};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::container::ContainerFactory;
use crate::options::EngineOptions;
use crate::readiness::ReadinessGate;
use crate::resolver::AnchorResolver;
use crate::timer::RetryTimer;
use crate::types::{CacheStats, CandidateConfig, SearchResult};

/// Anchor resolution surface consumed by feature modules
#[async_trait]
pub trait AnchorLocator: Send + Sync {
    type Node: HostNode;

    /// Locate an anchor through prioritized fallback candidates
    async fn find_element(
        &self,
        candidates: &[CandidateConfig],
        cache_key: Option<&str>,
    ) -> SearchResult<Self::Node>;

    /// Wait, bounded by `timeout`, for the host document to become ready
    async fn wait_until_ready(&self, timeout: Duration) -> bool;

    /// Get or create the marker-tagged container under `parent_query`
    fn ensure_container(&self, parent_query: &str, marker_class: &str) -> Option<Arc<Self::Node>>;

    /// Drop every cached anchor
    fn clear_cache(&self);

    /// Cache occupancy and hit rate
    fn cache_stats(&self) -> CacheStats;
}

/// Default engine: one resolver, container factory and readiness gate bound
/// to a single host document.
///
/// Owned by the feature module that builds it. Disposing it (explicitly or
/// by drop) cancels pending retry and readiness waits and empties the cache.
pub struct AnchorEngine<D: HostDocument> {
    resolver: AnchorResolver<D>,
    containers: ContainerFactory<D>,
    readiness: ReadinessGate<D>,
    shutdown: CancellationToken,
}

impl<D: HostDocument> AnchorEngine<D> {
    pub fn new(document: Arc<D>, options: EngineOptions) -> Self {
        let shutdown = CancellationToken::new();
        Self {
            resolver: AnchorResolver::new(
                Arc::clone(&document),
                options,
                RetryTimer::new(shutdown.clone()),
            ),
            containers: ContainerFactory::new(Arc::clone(&document)),
            readiness: ReadinessGate::new(document, shutdown.clone()),
            shutdown,
        }
    }

    pub fn with_defaults(document: Arc<D>) -> Self {
        Self::new(document, EngineOptions::default())
    }

    pub fn options(&self) -> &EngineOptions {
        self.resolver.options()
    }

    /// Cancel pending waits and drop cached anchors.
    ///
    /// Searches suspended in a retry delay return not-found without touching
    /// the cache.
    pub fn dispose(&self) {
        if !self.shutdown.is_cancelled() {
            debug!("disposing anchor engine");
            self.shutdown.cancel();
        }
        self.resolver.clear_cache();
    }

    pub fn is_disposed(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl<D: HostDocument> Drop for AnchorEngine<D> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[async_trait]
impl<D: HostDocument> AnchorLocator for AnchorEngine<D> {
    type Node = D::Node;

    async fn find_element(
        &self,
        candidates: &[CandidateConfig],
        cache_key: Option<&str>,
    ) -> SearchResult<D::Node> {
        self.resolver.find_element(candidates, cache_key).await
    }

    async fn wait_until_ready(&self, timeout: Duration) -> bool {
        self.readiness.wait_until_ready(timeout).await
    }

    fn ensure_container(&self, parent_query: &str, marker_class: &str) -> Option<Arc<D::Node>> {
        self.containers.ensure_container(parent_query, marker_class)
    }

    fn clear_cache(&self) {
        self.resolver.clear_cache();
    }

    fn cache_stats(&self) -> CacheStats {
        self.resolver.cache_stats()
    }
}
