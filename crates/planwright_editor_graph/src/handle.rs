// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection handles on nodes.
//!
//! A handle is a named connection point. Its role tag disambiguates several
//! points on one node (an action's precondition input vs. its effect output).

use crate::node::NodeKind;
use serde::{Deserialize, Serialize};

/// Handle direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleDirection {
    /// Edges start here
    Source,
    /// Edges end here
    Target,
}

/// Role tag of a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleRole {
    /// General outgoing point
    Output,
    /// General incoming point
    Input,
    /// An action's precondition input
    Precondition,
    /// An action's effect output
    Effect,
}

impl HandleRole {
    /// Stable tag string for the role
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Output => "output",
            Self::Input => "input",
            Self::Precondition => "precondition",
            Self::Effect => "effect",
        }
    }
}

/// A connection point on a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handle {
    /// Role tag
    pub role: HandleRole,
    /// Direction
    pub direction: HandleDirection,
    /// Display name
    pub name: &'static str,
}

impl Handle {
    const fn source(role: HandleRole, name: &'static str) -> Self {
        Self {
            role,
            direction: HandleDirection::Source,
            name,
        }
    }

    const fn target(role: HandleRole, name: &'static str) -> Self {
        Self {
            role,
            direction: HandleDirection::Target,
            name,
        }
    }
}

const TYPE_HANDLES: [Handle; 1] = [Handle::source(HandleRole::Output, "Instances")];
const OBJECT_HANDLES: [Handle; 1] = [Handle::target(HandleRole::Input, "Type")];
const PREDICATE_HANDLES: [Handle; 2] = [
    Handle::target(HandleRole::Input, "Affected by"),
    Handle::source(HandleRole::Output, "Precondition of"),
];
const ACTION_HANDLES: [Handle; 2] = [
    Handle::target(HandleRole::Precondition, "Preconditions"),
    Handle::source(HandleRole::Effect, "Effects"),
];

/// Fixed handle layout of a node kind, targets first
pub fn handles(kind: NodeKind) -> &'static [Handle] {
    match kind {
        NodeKind::Type => &TYPE_HANDLES,
        NodeKind::Object => &OBJECT_HANDLES,
        NodeKind::Predicate => &PREDICATE_HANDLES,
        NodeKind::Action => &ACTION_HANDLES,
    }
}

/// Find a handle of a kind by role and direction
///
/// Without a role, the kind's first handle in that direction is returned.
pub fn resolve(kind: NodeKind, role: Option<HandleRole>, direction: HandleDirection) -> Option<Handle> {
    handles(kind)
        .iter()
        .filter(|h| h.direction == direction)
        .find(|h| role.map_or(true, |r| h.role == r))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_handles() {
        let source = resolve(NodeKind::Action, None, HandleDirection::Source).unwrap();
        assert_eq!(source.role, HandleRole::Effect);
        let target = resolve(NodeKind::Action, None, HandleDirection::Target).unwrap();
        assert_eq!(target.role, HandleRole::Precondition);
    }

    #[test]
    fn test_wrong_direction_is_unresolved() {
        assert!(resolve(NodeKind::Type, None, HandleDirection::Target).is_none());
        assert!(resolve(NodeKind::Object, None, HandleDirection::Source).is_none());
        assert!(resolve(NodeKind::Action, Some(HandleRole::Effect), HandleDirection::Target).is_none());
        assert!(resolve(NodeKind::Predicate, Some(HandleRole::Precondition), HandleDirection::Target).is_none());
    }
}
