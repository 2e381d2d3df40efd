//! In-memory host document.
//!
//! Nodes are reference counted with weak parent links, so a node removed from
//! the tree is freed as soon as the last outside strong reference goes away.
//! Layout is declarative: every node carries the box it would occupy, and
//! `display: none` / `position: fixed` styles drive the layout-parent rules.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::debug;

use crate::errors::HostError;
use crate::fixture::{DocumentSpec, NodeSpec};
use crate::model::{BoundingBox, NodeId, ReadyState};
use crate::ports::{HostDocument, HostNode};
use crate::selector::{SelectorList, SelectorTarget};

const LIFECYCLE_CAPACITY: usize = 16;
const DOCUMENT_TAG: &str = "#document";

pub struct MemoryNode {
    id: NodeId,
    tag: String,
    is_document: bool,
    classes: RwLock<Vec<String>>,
    attributes: RwLock<BTreeMap<String, String>>,
    style: RwLock<BTreeMap<String, String>>,
    bounds: RwLock<BoundingBox>,
    parent: RwLock<Weak<MemoryNode>>,
    children: RwLock<Vec<Arc<MemoryNode>>>,
}

impl MemoryNode {
    fn new(id: NodeId, tag: &str, is_document: bool) -> Self {
        Self {
            id,
            tag: tag.to_string(),
            is_document,
            classes: RwLock::new(Vec::new()),
            attributes: RwLock::new(BTreeMap::new()),
            style: RwLock::new(BTreeMap::new()),
            bounds: RwLock::new(BoundingBox::ZERO),
            parent: RwLock::new(Weak::new()),
            children: RwLock::new(Vec::new()),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn parent(&self) -> Option<Arc<MemoryNode>> {
        self.parent.read().upgrade()
    }

    pub fn children(&self) -> Vec<Arc<MemoryNode>> {
        self.children.read().clone()
    }

    pub fn classes(&self) -> Vec<String> {
        self.classes.read().clone()
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        if name == "class" {
            let classes = self.classes.read();
            return (!classes.is_empty()).then(|| classes.join(" "));
        }
        self.attributes.read().get(name).cloned()
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        if name == "class" {
            *self.classes.write() = value.split_whitespace().map(str::to_string).collect();
            return;
        }
        self.attributes
            .write()
            .insert(name.to_string(), value.to_string());
    }

    pub fn style(&self, property: &str) -> Option<String> {
        self.style.read().get(property).cloned()
    }

    pub fn set_bounds(&self, bounds: BoundingBox) {
        *self.bounds.write() = bounds;
    }

    /// Short `tag#id.class` rendering for logs and CLI output.
    pub fn describe(&self) -> String {
        let mut out = self.tag.clone();
        if let Some(id) = self.attributes.read().get("id") {
            out.push('#');
            out.push_str(id);
        }
        for class in self.classes.read().iter() {
            out.push('.');
            out.push_str(class);
        }
        out
    }

    fn is_display_none(&self) -> bool {
        self.style("display").as_deref() == Some("none")
    }

    /// `display: none` on this node or any ancestor.
    fn hidden_by_display(&self) -> bool {
        if self.is_display_none() {
            return true;
        }
        let mut current = self.parent();
        while let Some(node) = current {
            if node.is_display_none() {
                return true;
            }
            current = node.parent();
        }
        false
    }

    fn is_ancestor_of(self: &Arc<Self>, other: &Arc<MemoryNode>) -> bool {
        let mut current = other.parent();
        while let Some(node) = current {
            if Arc::ptr_eq(&node, self) {
                return true;
            }
            current = node.parent();
        }
        false
    }
}

impl std::fmt::Debug for MemoryNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryNode")
            .field("id", &self.id)
            .field("node", &self.describe())
            .finish()
    }
}

impl HostNode for MemoryNode {
    fn node_id(&self) -> NodeId {
        self.id
    }

    fn is_attached(&self) -> bool {
        if self.is_document {
            return true;
        }
        let mut current = self.parent();
        while let Some(node) = current {
            if node.is_document {
                return true;
            }
            current = node.parent();
        }
        false
    }

    fn has_layout_parent(&self) -> bool {
        self.is_attached() && !self.is_fixed_position() && !self.hidden_by_display()
    }

    fn is_fixed_position(&self) -> bool {
        self.style("position").as_deref() == Some("fixed")
    }

    fn bounding_box(&self) -> BoundingBox {
        if self.hidden_by_display() {
            BoundingBox::ZERO
        } else {
            *self.bounds.read()
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.read().iter().any(|c| c == class)
    }

    fn add_class(&self, class: &str) {
        let mut classes = self.classes.write();
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    fn set_style(&self, property: &str, value: &str) {
        self.style
            .write()
            .insert(property.to_string(), value.to_string());
    }
}

impl SelectorTarget for Arc<MemoryNode> {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn attribute(&self, name: &str) -> Option<String> {
        MemoryNode::attribute(self, name)
    }

    fn has_class(&self, class: &str) -> bool {
        HostNode::has_class(self.as_ref(), class)
    }

    fn parent_element(&self) -> Option<Self> {
        self.parent().filter(|parent| !parent.is_document)
    }
}

/// Mutable in-memory document implementing [`HostDocument`].
pub struct MemoryHostTree {
    root: Arc<MemoryNode>,
    next_id: AtomicU64,
    ready_state: RwLock<ReadyState>,
    lifecycle: broadcast::Sender<ReadyState>,
    queries: AtomicUsize,
}

impl Default for MemoryHostTree {
    fn default() -> Self {
        Self::new(ReadyState::Complete)
    }
}

impl MemoryHostTree {
    pub fn new(ready_state: ReadyState) -> Self {
        let (lifecycle, _) = broadcast::channel(LIFECYCLE_CAPACITY);
        Self {
            root: Arc::new(MemoryNode::new(NodeId(0), DOCUMENT_TAG, true)),
            next_id: AtomicU64::new(1),
            ready_state: RwLock::new(ready_state),
            lifecycle,
            queries: AtomicUsize::new(0),
        }
    }

    /// Build a document from a fixture.
    pub fn from_spec(spec: &DocumentSpec) -> Result<Self, HostError> {
        let tree = Self::new(spec.ready_state);
        let root = tree.root();
        for node in &spec.nodes {
            tree.insert(&root, node)?;
        }
        Ok(tree)
    }

    pub fn root(&self) -> Arc<MemoryNode> {
        Arc::clone(&self.root)
    }

    /// Create `spec` (and its subtree) as the last child of `parent`.
    pub fn insert(&self, parent: &Arc<MemoryNode>, spec: &NodeSpec) -> Result<Arc<MemoryNode>, HostError> {
        let node = self.create_element(&spec.tag)?;
        if let Some(id) = &spec.id {
            node.set_attribute("id", id);
        }
        for class in &spec.classes {
            node.add_class(class);
        }
        for (name, value) in &spec.attributes {
            node.set_attribute(name, value);
        }
        for (property, value) in &spec.style {
            node.set_style(property, value);
        }
        if let Some(bounds) = spec.bounds {
            node.set_bounds(bounds);
        }
        self.append_child(parent, &node)?;
        for child in &spec.children {
            self.insert(&node, child)?;
        }
        Ok(node)
    }

    /// Remove `node` from its parent. Returns `false` if it had none.
    pub fn detach(&self, node: &Arc<MemoryNode>) -> bool {
        let Some(parent) = node.parent() else {
            return false;
        };
        parent
            .children
            .write()
            .retain(|child| !Arc::ptr_eq(child, node));
        *node.parent.write() = Weak::new();
        debug!(node = %node.id, "detached node");
        true
    }

    pub fn set_ready_state(&self, state: ReadyState) {
        *self.ready_state.write() = state;
        // No subscribers is fine; the state is still recorded.
        let _ = self.lifecycle.send(state);
    }

    /// Number of structural lookups performed so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }

    /// Number of live lifecycle subscriptions.
    pub fn lifecycle_listener_count(&self) -> usize {
        self.lifecycle.receiver_count()
    }

    /// Every node under `scope` matching `query`, in document order.
    pub fn query_all(&self, scope: &Arc<MemoryNode>, query: &str) -> Result<Vec<Arc<MemoryNode>>, HostError> {
        let selector = SelectorList::parse(query)?;
        let mut matches = Vec::new();
        walk(scope, &mut |node| {
            if selector.matches(node) {
                matches.push(Arc::clone(node));
            }
            false
        });
        Ok(matches)
    }

    fn first_match(&self, scope: &Arc<MemoryNode>, query: &str) -> Result<Option<Arc<MemoryNode>>, HostError> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        let selector = SelectorList::parse(query)?;
        let mut found = None;
        walk(scope, &mut |node| {
            if selector.matches(node) {
                found = Some(Arc::clone(node));
                true
            } else {
                false
            }
        });
        Ok(found)
    }
}

/// Pre-order walk over the descendants of `scope`; `visit` returns `true` to stop.
fn walk(scope: &Arc<MemoryNode>, visit: &mut dyn FnMut(&Arc<MemoryNode>) -> bool) -> bool {
    for child in scope.children() {
        if visit(&child) || walk(&child, visit) {
            return true;
        }
    }
    false
}

impl HostDocument for MemoryHostTree {
    type Node = MemoryNode;

    fn query_selector(&self, query: &str) -> Result<Option<Arc<MemoryNode>>, HostError> {
        self.first_match(&self.root, query)
    }

    fn query_selector_within(
        &self,
        scope: &Arc<MemoryNode>,
        query: &str,
    ) -> Result<Option<Arc<MemoryNode>>, HostError> {
        self.first_match(scope, query)
    }

    fn create_element(&self, tag: &str) -> Result<Arc<MemoryNode>, HostError> {
        let valid = tag.chars().next().map_or(false, |c| c.is_ascii_alphabetic())
            && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid {
            return Err(HostError::InvalidTagName(tag.to_string()));
        }
        let id = NodeId(self.next_id.fetch_add(1, Ordering::Relaxed));
        Ok(Arc::new(MemoryNode::new(id, &tag.to_ascii_lowercase(), false)))
    }

    fn append_child(&self, parent: &Arc<MemoryNode>, child: &Arc<MemoryNode>) -> Result<(), HostError> {
        if child.is_document {
            return Err(HostError::HierarchyRequest(
                "the document cannot be appended".to_string(),
            ));
        }
        if Arc::ptr_eq(parent, child) || child.is_ancestor_of(parent) {
            return Err(HostError::HierarchyRequest(format!(
                "{} cannot contain its own ancestor {}",
                parent.id, child.id
            )));
        }
        if let Some(previous) = child.parent() {
            previous
                .children
                .write()
                .retain(|existing| !Arc::ptr_eq(existing, child));
        }
        *child.parent.write() = Arc::downgrade(parent);
        parent.children.write().push(Arc::clone(child));
        Ok(())
    }

    fn ready_state(&self) -> ReadyState {
        *self.ready_state.read()
    }

    fn subscribe_lifecycle(&self) -> broadcast::Receiver<ReadyState> {
        self.lifecycle.subscribe()
    }
}
