//! Declarative description of a host document.
//!
//! Fixtures are written in YAML or JSON:
//!
//! ```yaml
//! ready_state: complete
//! nodes:
//!   - tag: div
//!     classes: [composer]
//!     box: { width: 600, height: 80 }
//!     children:
//!       - tag: button
//!         classes: [legacy-send]
//!         box: { width: 80, height: 32 }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::HostError;
use crate::model::{BoundingBox, ReadyState};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentSpec {
    #[serde(default = "default_ready_state")]
    pub ready_state: ReadyState,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

impl Default for DocumentSpec {
    fn default() -> Self {
        Self {
            ready_state: default_ready_state(),
            nodes: Vec::new(),
        }
    }
}

fn default_ready_state() -> ReadyState {
    ReadyState::Complete
}

impl DocumentSpec {
    pub fn from_yaml_str(source: &str) -> Result<Self, HostError> {
        serde_yaml::from_str(source).map_err(|err| HostError::InvalidFixture(err.to_string()))
    }

    pub fn from_json_str(source: &str) -> Result<Self, HostError> {
        serde_json::from_str(source).map_err(|err| HostError::InvalidFixture(err.to_string()))
    }

    /// Load a fixture file; `.json` files are read as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self, HostError> {
        let content = std::fs::read_to_string(path).map_err(|err| {
            HostError::InvalidFixture(format!("failed to read {}: {}", path.display(), err))
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }
}

/// One element and its subtree.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NodeSpec {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub style: BTreeMap<String, String>,
    #[serde(default, rename = "box", skip_serializing_if = "Option::is_none")]
    pub bounds: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.insert(property.into(), value.into());
        self
    }

    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.bounds = Some(BoundingBox::sized(width, height));
        self
    }

    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }
}
