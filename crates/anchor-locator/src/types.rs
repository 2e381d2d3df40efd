//! Core types for anchor resolution

use std::fmt;
use std::sync::Arc;

use anchor_host::HostNode;
use serde::{Deserialize, Serialize};

/// One fallback strategy for locating an anchor
///
/// Queries are tried in listed order within an attempt. Candidates with a
/// higher priority are searched first; equal priorities keep submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateConfig {
    /// Human-readable name used in logs
    #[serde(default)]
    pub label: String,

    /// Higher runs first
    #[serde(default)]
    pub priority: i32,

    /// Structural lookup expressions
    pub queries: Vec<String>,
}

impl CandidateConfig {
    /// Create a new candidate
    pub fn new<I, S>(label: impl Into<String>, priority: i32, queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            priority,
            queries: queries.into_iter().map(Into::into).collect(),
        }
    }
}

/// Outcome of a `find_element` call
pub struct SearchResult<N> {
    /// Matched anchor node
    pub node: Option<Arc<N>>,

    /// Query that matched; empty when nothing was found
    pub query: String,

    /// Whether an anchor was found
    pub found: bool,

    /// Whether the anchor came from the cache
    pub cached: bool,
}

impl<N> SearchResult<N> {
    pub fn not_found() -> Self {
        Self {
            node: None,
            query: String::new(),
            found: false,
            cached: false,
        }
    }

    pub fn matched(node: Arc<N>, query: impl Into<String>) -> Self {
        Self {
            node: Some(node),
            query: query.into(),
            found: true,
            cached: false,
        }
    }

    pub fn from_cache(node: Arc<N>, query: impl Into<String>) -> Self {
        Self {
            cached: true,
            ..Self::matched(node, query)
        }
    }
}

impl<N> Clone for SearchResult<N> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
            query: self.query.clone(),
            found: self.found,
            cached: self.cached,
        }
    }
}

impl<N: HostNode> fmt::Debug for SearchResult<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchResult")
            .field("node", &self.node.as_ref().map(|node| node.node_id()))
            .field("query", &self.query)
            .field("found", &self.found)
            .field("cached", &self.cached)
            .finish()
    }
}

/// Cache occupancy and effectiveness since the last clear
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    /// hits / (hits + misses), 0.0 before the first read
    pub hit_rate: f64,
}

impl CacheStats {
    pub fn new(size: usize, hits: u64, misses: u64) -> Self {
        let reads = hits + misses;
        let hit_rate = if reads == 0 {
            0.0
        } else {
            hits as f64 / reads as f64
        };
        Self {
            size,
            hits,
            misses,
            hit_rate,
        }
    }
}
