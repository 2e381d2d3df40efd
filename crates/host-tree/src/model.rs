use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a node inside a host document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// Layout box of a rendered node, in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl BoundingBox {
    pub const ZERO: BoundingBox = BoundingBox {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// True when neither dimension is positive.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 && self.height <= 0.0
    }
}

/// Document lifecycle state, mirroring `document.readyState`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadyState {
    #[default]
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    /// `interactive` and `complete` both count as ready.
    pub fn is_ready(self) -> bool {
        matches!(self, ReadyState::Interactive | ReadyState::Complete)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReadyState::Loading => "loading",
            ReadyState::Interactive => "interactive",
            ReadyState::Complete => "complete",
        }
    }
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_box_needs_both_dimensions_zero() {
        assert!(BoundingBox::ZERO.is_empty());
        assert!(!BoundingBox::sized(0.0, 12.0).is_empty());
        assert!(!BoundingBox::sized(12.0, 0.0).is_empty());
    }

    #[test]
    fn negative_dimensions_count_as_empty() {
        assert!(BoundingBox::sized(-4.0, 0.0).is_empty());
        assert!(BoundingBox::sized(-1.0, -1.0).is_empty());
        assert!(!BoundingBox::sized(-1.0, 3.0).is_empty());
    }

    #[test]
    fn ready_state_readiness() {
        assert!(!ReadyState::Loading.is_ready());
        assert!(ReadyState::Interactive.is_ready());
        assert!(ReadyState::Complete.is_ready());
        assert_eq!(ReadyState::default(), ReadyState::Loading);
    }

    #[test]
    fn ready_state_serde_is_lowercase() {
        let parsed: ReadyState = serde_json::from_str("\"interactive\"").unwrap();
        assert_eq!(parsed, ReadyState::Interactive);
        assert_eq!(serde_json::to_string(&ReadyState::Complete).unwrap(), "\"complete\"");
    }
}
