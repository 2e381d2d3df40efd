//! Capability interface the anchor engine consumes from a host document.
//!
//! The engine never touches a concrete document type. Anything able to run
//! structural lookups and report layout facts about its nodes can host it:
//! a real page bridge, or the in-memory [`crate::MemoryHostTree`] used by tests
//! and the CLI.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::errors::HostError;
use crate::model::{BoundingBox, NodeId, ReadyState};

/// Layout and attachment facts about a single host node.
pub trait HostNode: Send + Sync + 'static {
    fn node_id(&self) -> NodeId;

    /// Whether the node is currently reachable from the document root.
    fn is_attached(&self) -> bool;

    /// Whether the node has a layout parent (`offsetParent` in a browser).
    fn has_layout_parent(&self) -> bool;

    /// Whether the node is positioned with `position: fixed`.
    fn is_fixed_position(&self) -> bool;

    fn bounding_box(&self) -> BoundingBox;

    fn has_class(&self, class: &str) -> bool;

    fn add_class(&self, class: &str);

    fn set_style(&self, property: &str, value: &str);
}

/// Structural lookups, element creation and lifecycle signalling.
pub trait HostDocument: Send + Sync + 'static {
    type Node: HostNode;

    /// First node in document order matching `query`.
    ///
    /// Malformed queries raise [`HostError::InvalidSelector`].
    fn query_selector(&self, query: &str) -> Result<Option<Arc<Self::Node>>, HostError>;

    /// First descendant of `scope` matching `query`.
    fn query_selector_within(
        &self,
        scope: &Arc<Self::Node>,
        query: &str,
    ) -> Result<Option<Arc<Self::Node>>, HostError>;

    /// Create a detached element.
    fn create_element(&self, tag: &str) -> Result<Arc<Self::Node>, HostError>;

    fn append_child(&self, parent: &Arc<Self::Node>, child: &Arc<Self::Node>)
        -> Result<(), HostError>;

    fn ready_state(&self) -> ReadyState;

    /// Register for lifecycle transitions. Dropping the receiver deregisters.
    fn subscribe_lifecycle(&self) -> broadcast::Receiver<ReadyState>;
}
