//! Time-bounded anchor cache with re-validation on read

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use anchor_host::HostNode;
use dashmap::DashMap;
use tracing::debug;

use crate::types::CacheStats;
use crate::validity::{ValidityChecker, Verdict};

/// Stored resolution. The node is held weakly so the cache never keeps a
/// node alive after the host tree lets go of it.
pub struct CacheEntry<N> {
    pub node: Weak<N>,
    pub inserted_at: Instant,
    pub query: String,
}

impl<N> CacheEntry<N> {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() > ttl
    }
}

/// A cache read that passed both the age and the validity check.
pub struct CacheHit<N> {
    pub node: Arc<N>,
    pub query: String,
    pub age: Duration,
}

enum Probe<N> {
    Absent,
    Fresh(CacheHit<N>),
    Stale { inserted_at: Instant, reason: &'static str },
}

pub struct AnchorCache<N> {
    entries: DashMap<String, CacheEntry<N>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<N: HostNode> AnchorCache<N> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fetch `key` if it is within TTL and its node is still usable.
    ///
    /// A stale or invalid entry is deleted before returning `None`.
    pub fn get(&self, key: &str) -> Option<CacheHit<N>> {
        // The map guard must be released before any removal on the same shard.
        let probe = match self.entries.get(key) {
            None => Probe::Absent,
            Some(entry) if entry.is_expired(self.ttl) => Probe::Stale {
                inserted_at: entry.inserted_at,
                reason: "expired",
            },
            Some(entry) => {
                let node = entry.node.upgrade();
                match ValidityChecker::judge(node.as_deref()) {
                    Verdict::Usable => match node {
                        Some(node) => Probe::Fresh(CacheHit {
                            node,
                            query: entry.query.clone(),
                            age: entry.inserted_at.elapsed(),
                        }),
                        None => Probe::Absent,
                    },
                    verdict => Probe::Stale {
                        inserted_at: entry.inserted_at,
                        reason: verdict.reason(),
                    },
                }
            }
        };

        match probe {
            Probe::Fresh(hit) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(hit)
            }
            Probe::Absent => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Probe::Stale {
                inserted_at,
                reason,
            } => {
                // Leave a newer entry written concurrently in place.
                self.entries
                    .remove_if(key, |_, entry| entry.inserted_at == inserted_at);
                debug!(key = %key, reason, "purged cached anchor");
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Record a resolution, replacing any previous entry for `key`.
    pub fn put(&self, key: &str, node: &Arc<N>, query: &str) {
        self.sweep();
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                node: Arc::downgrade(node),
                inserted_at: Instant::now(),
                query: query.to_string(),
            },
        );
    }

    /// Drop expired entries and entries whose node has been freed.
    pub fn sweep(&self) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| !entry.is_expired(ttl) && entry.node.strong_count() > 0);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(removed, "swept anchor cache");
        }
        removed
    }

    /// Drop every entry and reset the hit counters.
    pub fn clear(&self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats::new(
            self.entries.len(),
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_host::{HostDocument, MemoryHostTree, MemoryNode, NodeSpec};

    fn tree_with_button() -> (MemoryHostTree, Arc<MemoryNode>) {
        let tree = MemoryHostTree::default();
        let button = tree
            .insert(&tree.root(), &NodeSpec::new("button").class("send").sized(80.0, 32.0))
            .unwrap();
        (tree, button)
    }

    #[test]
    fn returns_fresh_valid_entries() {
        let (_tree, button) = tree_with_button();
        let cache = AnchorCache::new(Duration::from_secs(30));
        cache.put("send", &button, ".send");

        let hit = cache.get("send").unwrap();
        assert!(Arc::ptr_eq(&hit.node, &button));
        assert_eq!(hit.query, ".send");
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn writes_overwrite_previous_entry() {
        let (tree, button) = tree_with_button();
        let other = tree
            .insert(&tree.root(), &NodeSpec::new("div").sized(10.0, 10.0))
            .unwrap();
        let cache = AnchorCache::new(Duration::from_secs(30));
        cache.put("anchor", &button, ".send");
        cache.put("anchor", &other, "div");

        assert_eq!(cache.len(), 1);
        let hit = cache.get("anchor").unwrap();
        assert!(Arc::ptr_eq(&hit.node, &other));
        assert_eq!(hit.query, "div");
    }

    #[test]
    fn expired_entries_are_purged_on_read() {
        let (_tree, button) = tree_with_button();
        let cache = AnchorCache::new(Duration::from_millis(5));
        cache.put("send", &button, ".send");
        std::thread::sleep(Duration::from_millis(20));

        assert!(cache.get("send").is_none());
        assert!(cache.is_empty());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn detached_nodes_are_purged_on_read() {
        let (tree, button) = tree_with_button();
        let cache = AnchorCache::new(Duration::from_secs(30));
        cache.put("send", &button, ".send");
        tree.detach(&button);

        assert!(cache.get("send").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn cache_does_not_keep_nodes_alive() {
        let (tree, button) = tree_with_button();
        let cache = AnchorCache::new(Duration::from_secs(30));
        cache.put("send", &button, ".send");
        tree.detach(&button);
        let weak = Arc::downgrade(&button);
        drop(button);

        assert!(weak.upgrade().is_none());
        assert!(cache.get("send").is_none());
    }

    #[test]
    fn writes_sweep_expired_entries() {
        let (tree, button) = tree_with_button();
        let cache = AnchorCache::new(Duration::from_millis(5));
        cache.put("old-a", &button, ".send");
        cache.put("old-b", &button, ".send");
        std::thread::sleep(Duration::from_millis(20));

        let fresh = tree.query_selector(".send").unwrap().unwrap();
        cache.put("new", &fresh, ".send");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_resets_entries_and_counters() {
        let (_tree, button) = tree_with_button();
        let cache = AnchorCache::new(Duration::from_secs(30));
        cache.put("send", &button, ".send");
        cache.get("send");
        cache.get("missing");
        let stats = cache.stats();
        assert_eq!((stats.size, stats.hits, stats.misses), (1, 1, 1));
        assert_eq!(stats.hit_rate, 0.5);

        cache.clear();
        let stats = cache.stats();
        assert_eq!((stats.size, stats.hits, stats.misses), (0, 0, 0));
        assert_eq!(stats.hit_rate, 0.0);
    }
}
