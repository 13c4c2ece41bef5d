// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the planning graph.

use crate::payload::NodePayload;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The closed set of planning entity categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// A domain type (`block`, `room`, ...)
    Type,
    /// A predicate over typed parameters
    Predicate,
    /// An action with preconditions and effects
    Action,
    /// A problem object, instance of a type
    Object,
}

impl NodeKind {
    /// All kinds, in palette order
    pub const ALL: [NodeKind; 4] = [Self::Type, Self::Predicate, Self::Action, Self::Object];

    /// Display name for this kind
    pub fn name(&self) -> &'static str {
        match self {
            Self::Type => "Type",
            Self::Predicate => "Predicate",
            Self::Action => "Action",
            Self::Object => "Object",
        }
    }

    /// Header color for this kind (for UI)
    pub fn color(&self) -> [u8; 3] {
        match self {
            Self::Type => [110, 110, 130],
            Self::Predicate => [70, 130, 200],
            Self::Action => [210, 130, 60],
            Self::Object => [90, 170, 110],
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A node instance in the graph
///
/// The node's kind is not stored separately: it is read off the payload
/// variant, so a node can never carry a payload of another kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID, stable for the node's lifetime
    pub id: NodeId,
    /// Position in the graph UI
    pub position: [f32; 2],
    /// Kind-specific data
    pub payload: NodePayload,
}

impl Node {
    /// Create a node with a fresh ID at the origin
    pub fn new(payload: NodePayload) -> Self {
        Self {
            id: NodeId::new(),
            position: [0.0, 0.0],
            payload,
        }
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }

    /// The node's kind
    pub fn kind(&self) -> NodeKind {
        self.payload.kind()
    }

    /// The node's label
    pub fn label(&self) -> &str {
        self.payload.label()
    }
}
