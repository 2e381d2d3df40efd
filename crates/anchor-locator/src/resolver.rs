//! Prioritized candidate search with bounded retry and caching

use std::sync::Arc;
use std::time::Instant;

use anchor_host::HostDocument;
use tracing::{debug, info, warn};

use crate::cache::AnchorCache;
use crate::errors::LocatorError;
use crate::options::EngineOptions;
use crate::timer::RetryTimer;
use crate::types::{CacheStats, CandidateConfig, SearchResult};
use crate::validity::ValidityChecker;

enum CandidateOutcome<N> {
    Matched { node: Arc<N>, query: String },
    Exhausted,
    Cancelled,
}

/// Resolves anchors against one host document
///
/// Owns its cache; nothing is shared between resolver instances.
pub struct AnchorResolver<D: HostDocument> {
    document: Arc<D>,
    options: EngineOptions,
    cache: AnchorCache<D::Node>,
    timer: RetryTimer,
}

impl<D: HostDocument> AnchorResolver<D> {
    /// Create a new resolver; `timer` ties retry waits to the owner's lifetime
    pub fn new(document: Arc<D>, options: EngineOptions, timer: RetryTimer) -> Self {
        let cache = AnchorCache::new(options.cache_ttl());
        Self {
            document,
            options,
            cache,
            timer,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Locate an anchor using the first candidate, by priority, that matches
    ///
    /// Never fails: malformed queries, misses and cancellation all degrade to
    /// a not-found result.
    pub async fn find_element(
        &self,
        candidates: &[CandidateConfig],
        cache_key: Option<&str>,
    ) -> SearchResult<D::Node> {
        if candidates.is_empty() {
            debug!("no candidates supplied");
            return SearchResult::not_found();
        }

        let cache_key = cache_key.filter(|_| self.options.caching_enabled);
        if let Some(key) = cache_key {
            if let Some(hit) = self.cache.get(key) {
                debug!(
                    key = %key,
                    query = %hit.query,
                    age_ms = hit.age.as_millis() as u64,
                    "anchor served from cache"
                );
                return SearchResult::from_cache(hit.node, hit.query);
            }
        }

        let started = Instant::now();
        for candidate in order_by_priority(candidates) {
            match self.search_candidate(candidate).await {
                CandidateOutcome::Matched { node, query } => {
                    if let Some(key) = cache_key {
                        if !self.timer.is_cancelled() {
                            self.cache.put(key, &node, &query);
                        }
                    }
                    info!(
                        candidate = %candidate.label,
                        priority = candidate.priority,
                        query = %query,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "resolved anchor"
                    );
                    return SearchResult::matched(node, query);
                }
                CandidateOutcome::Exhausted => {
                    debug!(candidate = %candidate.label, "candidate exhausted");
                }
                CandidateOutcome::Cancelled => {
                    debug!(candidate = %candidate.label, "search abandoned on shutdown");
                    return SearchResult::not_found();
                }
            }
        }

        debug!(
            candidates = candidates.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "no anchor found"
        );
        SearchResult::not_found()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    async fn search_candidate(&self, candidate: &CandidateConfig) -> CandidateOutcome<D::Node> {
        let attempts = self.options.attempts();
        for attempt in 1..=attempts {
            if let Some((node, query)) = self.attempt(candidate, attempt) {
                return CandidateOutcome::Matched { node, query };
            }
            if attempt < attempts && !self.timer.wait(self.options.retry_delay()).await {
                return CandidateOutcome::Cancelled;
            }
        }
        CandidateOutcome::Exhausted
    }

    fn attempt(&self, candidate: &CandidateConfig, attempt: u32) -> Option<(Arc<D::Node>, String)> {
        for query in &candidate.queries {
            match self.document.query_selector(query) {
                Ok(Some(node)) => {
                    let verdict = ValidityChecker::judge(Some(&*node));
                    if verdict.is_usable() {
                        return Some((node, query.clone()));
                    }
                    debug!(
                        candidate = %candidate.label,
                        query = %query,
                        attempt,
                        reason = verdict.reason(),
                        "match rejected"
                    );
                }
                Ok(None) => {}
                Err(err) => {
                    let err = LocatorError::from(err);
                    let problem = if err.is_malformed_query() {
                        "malformed query"
                    } else {
                        "lookup failed"
                    };
                    warn!(
                        candidate = %candidate.label,
                        query = %query,
                        attempt,
                        "{}, skipping: {}",
                        problem,
                        err
                    );
                }
            }
        }
        None
    }
}

/// Candidates by descending priority; ties keep submission order.
fn order_by_priority(candidates: &[CandidateConfig]) -> Vec<&CandidateConfig> {
    let mut ordered: Vec<&CandidateConfig> = candidates.iter().collect();
    ordered.sort_by(|a, b| b.priority.cmp(&a.priority));
    ordered
}
