//! Usability judge for candidate anchor nodes

use anchor_host::HostNode;

/// Result of judging a node, naming the first failed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Usable,
    Missing,
    Detached,
    NotRendered,
    ZeroArea,
}

impl Verdict {
    pub fn is_usable(self) -> bool {
        self == Verdict::Usable
    }

    pub fn reason(self) -> &'static str {
        match self {
            Verdict::Usable => "usable",
            Verdict::Missing => "missing",
            Verdict::Detached => "detached",
            Verdict::NotRendered => "not_rendered",
            Verdict::ZeroArea => "zero_area",
        }
    }
}

/// Stateless predicate deciding whether a node can serve as an anchor.
///
/// Checks run in order and stop at the first failure:
/// present, attached, rendered (layout parent or fixed positioning),
/// non-zero width or height.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidityChecker;

impl ValidityChecker {
    pub fn judge<N: HostNode + ?Sized>(node: Option<&N>) -> Verdict {
        let Some(node) = node else {
            return Verdict::Missing;
        };
        if !node.is_attached() {
            return Verdict::Detached;
        }
        if !node.has_layout_parent() && !node.is_fixed_position() {
            return Verdict::NotRendered;
        }
        if node.bounding_box().is_empty() {
            return Verdict::ZeroArea;
        }
        Verdict::Usable
    }

    pub fn is_usable<N: HostNode + ?Sized>(node: Option<&N>) -> bool {
        Self::judge(node).is_usable()
    }
}
