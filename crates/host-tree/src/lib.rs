//! Host document capabilities for anchor resolution.
//!
//! - [`HostDocument`] / [`HostNode`]: the capability seam the engine is written against
//! - [`MemoryHostTree`]: an in-memory document with a CSS-subset query engine
//! - [`DocumentSpec`]: YAML/JSON fixtures describing a document

pub mod errors;
pub mod fixture;
pub mod memory;
pub mod model;
pub mod ports;
pub mod selector;

pub use errors::HostError;
pub use fixture::{DocumentSpec, NodeSpec};
pub use memory::{MemoryHostTree, MemoryNode};
pub use model::{BoundingBox, NodeId, ReadyState};
pub use ports::{HostDocument, HostNode};
pub use selector::{SelectorList, SelectorTarget};
