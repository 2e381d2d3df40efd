//! Idempotent fallback container creation

use std::sync::Arc;

use anchor_host::{HostDocument, HostNode};
use tracing::{debug, error, info};

use crate::errors::LocatorError;

const CONTAINER_TAG: &str = "div";

/// Presentational style applied to every created container.
pub const CONTAINER_STYLE: [(&str, &str); 3] = [("display", "flex"), ("gap", "8px"), ("order", "1")];

/// Creates a marker-tagged container under a parent, at most once.
pub struct ContainerFactory<D: HostDocument> {
    document: Arc<D>,
}

impl<D: HostDocument> ContainerFactory<D> {
    pub fn new(document: Arc<D>) -> Self {
        Self { document }
    }

    /// Return the container carrying `marker_class` under the node matched by
    /// `parent_query`, creating it when missing.
    ///
    /// Every failure is logged and reported as `None`.
    pub fn ensure_container(&self, parent_query: &str, marker_class: &str) -> Option<Arc<D::Node>> {
        match self.try_ensure_container(parent_query, marker_class) {
            Ok(container) => Some(container),
            Err(err) => {
                error!(
                    parent = %parent_query,
                    marker = %marker_class,
                    "failed to ensure container: {}",
                    err
                );
                None
            }
        }
    }

    fn try_ensure_container(
        &self,
        parent_query: &str,
        marker_class: &str,
    ) -> Result<Arc<D::Node>, LocatorError> {
        if !is_valid_marker(marker_class) {
            return Err(LocatorError::InvalidMarker(marker_class.to_string()));
        }

        let parent = self
            .document
            .query_selector(parent_query)?
            .ok_or_else(|| LocatorError::ParentNotFound(parent_query.to_string()))?;

        let marker_query = format!(".{}", marker_class);
        if let Some(existing) = self.document.query_selector_within(&parent, &marker_query)? {
            debug!(
                marker = %marker_class,
                node = %existing.node_id(),
                "reusing existing container"
            );
            return Ok(existing);
        }

        let container = self.document.create_element(CONTAINER_TAG)?;
        container.add_class(marker_class);
        for (property, value) in CONTAINER_STYLE {
            container.set_style(property, value);
        }
        self.document.append_child(&parent, &container)?;

        info!(
            parent = %parent_query,
            marker = %marker_class,
            node = %container.node_id(),
            "created container"
        );
        Ok(container)
    }
}

/// Class names usable both as a marker and inside a `.class` query.
fn is_valid_marker(marker: &str) -> bool {
    let mut chars = marker.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let valid_start = first.is_ascii_alphabetic() || first == '_' || first == '-';
    let second_is_digit = first == '-' && marker[1..].starts_with(|c: char| c.is_ascii_digit());
    valid_start
        && !second_is_digit
        && marker != "-"
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_host::{MemoryHostTree, NodeSpec};

    fn tree_with_toolbar() -> Arc<MemoryHostTree> {
        let tree = Arc::new(MemoryHostTree::default());
        tree.insert(
            &tree.root(),
            &NodeSpec::new("div")
                .class("toolbar")
                .sized(600.0, 40.0)
                .child(NodeSpec::new("button").class("send").sized(80.0, 32.0)),
        )
        .unwrap();
        tree
    }

    #[test]
    fn creates_styled_container_under_parent() {
        let tree = tree_with_toolbar();
        let factory = ContainerFactory::new(tree.clone());

        let container = factory.ensure_container(".toolbar", "reply-assist").unwrap();
        assert!(container.has_class("reply-assist"));
        assert_eq!(container.tag(), "div");
        assert_eq!(container.style("display").as_deref(), Some("flex"));
        assert_eq!(container.style("gap").as_deref(), Some("8px"));
        assert_eq!(container.style("order").as_deref(), Some("1"));

        let toolbar = tree.query_selector(".toolbar").unwrap().unwrap();
        let children = toolbar.children();
        assert_eq!(children.len(), 2);
        assert!(Arc::ptr_eq(&children[1], &container));
    }

    #[test]
    fn repeated_calls_return_same_node() {
        let tree = tree_with_toolbar();
        let factory = ContainerFactory::new(tree.clone());

        let first = factory.ensure_container(".toolbar", "reply-assist").unwrap();
        let second = factory.ensure_container(".toolbar", "reply-assist").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(tree.query_all(&tree.root(), ".reply-assist").unwrap().len(), 1);
    }

    #[test]
    fn missing_parent_yields_none() {
        let tree = tree_with_toolbar();
        let factory = ContainerFactory::new(tree.clone());
        assert!(factory.ensure_container(".composer", "reply-assist").is_none());
        assert!(tree.query_all(&tree.root(), ".reply-assist").unwrap().is_empty());
    }

    #[test]
    fn malformed_parent_query_yields_none() {
        let factory = ContainerFactory::new(tree_with_toolbar());
        assert!(factory.ensure_container(".toolbar[", "reply-assist").is_none());
    }

    #[test]
    fn invalid_marker_yields_none() {
        let factory = ContainerFactory::new(tree_with_toolbar());
        for marker in ["", "reply assist", "9lives", "-1", "-", "a.b"] {
            assert!(factory.ensure_container(".toolbar", marker).is_none(), "{marker:?}");
        }
    }

    #[test]
    fn marker_validation() {
        assert!(is_valid_marker("reply-assist"));
        assert!(is_valid_marker("_x"));
        assert!(is_valid_marker("-x"));
        assert!(!is_valid_marker("-9"));
    }
}
