//! Resilient anchor resolution for injected UI
//!
//! Locates insertion points inside host documents whose markup is not under
//! our control:
//! - Prioritized fallback candidates, each a list of structural queries
//! - Bounded, cancellable retry per candidate
//! - TTL cache re-validated on every read
//! - Usability checks (attached, rendered, non-empty box)
//! - Idempotent fallback container creation
//! - Bounded wait for document readiness
//!
//! Every operation degrades to "not found" instead of failing.

pub mod cache;
pub mod container;
pub mod engine;
pub mod errors;
pub mod options;
pub mod readiness;
pub mod resolver;
pub mod timer;
pub mod types;
pub mod validity;

pub use cache::{AnchorCache, CacheEntry, CacheHit};
pub use container::{ContainerFactory, CONTAINER_STYLE};
pub use engine::{AnchorEngine, AnchorLocator};
pub use errors::LocatorError;
pub use options::EngineOptions;
pub use readiness::ReadinessGate;
pub use resolver::AnchorResolver;
pub use timer::RetryTimer;
pub use types::{CacheStats, CandidateConfig, SearchResult};
pub use validity::{ValidityChecker, Verdict};
