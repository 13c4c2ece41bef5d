// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions and the connection rules of the planning graph.

use crate::handle::{self, HandleDirection, HandleRole};
use crate::node::{Node, NodeId, NodeKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Visual style of an edge, derived from the kinds it joins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeStyle {
    /// Animated flow between predicates and actions
    AnimatedFlow,
    /// Plain line from a type to one of its objects
    PlainStructural,
}

impl EdgeStyle {
    /// Stable tag string for the style
    pub fn tag(&self) -> &'static str {
        match self {
            Self::AnimatedFlow => "animated-flow",
            Self::PlainStructural => "plain-structural",
        }
    }
}

impl fmt::Display for EdgeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The legal ordered (source, target) kind pairs and the style each one gets
pub const LEGAL_CONNECTIONS: [(NodeKind, NodeKind, EdgeStyle); 3] = [
    // predicate is a precondition of the action
    (NodeKind::Predicate, NodeKind::Action, EdgeStyle::AnimatedFlow),
    // action produces or affects the predicate
    (NodeKind::Action, NodeKind::Predicate, EdgeStyle::AnimatedFlow),
    // object is an instance of the type
    (NodeKind::Type, NodeKind::Object, EdgeStyle::PlainStructural),
];

/// Style for an ordered kind pair, `None` if the pair is illegal
pub fn edge_style(source: NodeKind, target: NodeKind) -> Option<EdgeStyle> {
    LEGAL_CONNECTIONS
        .iter()
        .find(|(s, t, _)| *s == source && *t == target)
        .map(|(_, _, style)| *style)
}

/// A connection between two node handles
///
/// Only [`crate::graph::Graph::connect`] creates connections, so `style`
/// always matches the validated kind pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Source node ID
    pub source: NodeId,
    /// Source handle role
    pub source_handle: HandleRole,
    /// Target node ID
    pub target: NodeId,
    /// Target handle role
    pub target_handle: HandleRole,
    /// Derived edge style
    pub style: EdgeStyle,
}

impl Connection {
    pub(crate) fn new(
        source: NodeId,
        source_handle: HandleRole,
        target: NodeId,
        target_handle: HandleRole,
        style: EdgeStyle,
    ) -> Self {
        Self {
            id: ConnectionId::new(),
            source,
            source_handle,
            target,
            target_handle,
            style,
        }
    }

    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.source == node_id || self.target == node_id
    }

    /// Check if this connection joins the same endpoints as another
    pub fn same_endpoints(&self, other: &ConnectionRequest) -> bool {
        self.source == other.source
            && self.target == other.target
            && self.source_handle == other.source_handle
            && self.target_handle == other.target_handle
    }
}

/// A validated request to connect two handles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionRequest {
    /// Source node
    pub source: NodeId,
    /// Resolved source handle
    pub source_handle: HandleRole,
    /// Target node
    pub target: NodeId,
    /// Resolved target handle
    pub target_handle: HandleRole,
    /// Style the edge will carry
    pub style: EdgeStyle,
}

/// Error when creating a connection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Self-loop not allowed
    #[error("A node cannot be connected to itself")]
    SelfLoop,

    /// Kind pair is not in the legal set
    #[error("Cannot connect a {source_kind} node to a {target_kind} node")]
    IllegalKinds {
        /// Kind of the source node
        source_kind: NodeKind,
        /// Kind of the target node
        target_kind: NodeKind,
    },

    /// Role is not a handle of the node in that direction
    #[error("{kind} nodes have no {} handle as {direction:?}", .role.map_or("default", |r| r.tag()))]
    HandleNotFound {
        /// Node kind
        kind: NodeKind,
        /// Requested role (`None` for the default one)
        role: Option<HandleRole>,
        /// Requested direction
        direction: HandleDirection,
    },

    /// Identical connection already exists
    #[error("These handles are already connected")]
    Duplicate(ConnectionId),
}

/// Decide whether `source` may connect to `target` through the given handles
///
/// A missing role resolves to the kind's default handle in that direction.
pub fn validate_connection(
    source: &Node,
    source_handle: Option<HandleRole>,
    target: &Node,
    target_handle: Option<HandleRole>,
) -> Result<ConnectionRequest, ConnectionError> {
    // Prevent self-loops
    if source.id == target.id {
        return Err(ConnectionError::SelfLoop);
    }

    let style = edge_style(source.kind(), target.kind()).ok_or(ConnectionError::IllegalKinds {
        source_kind: source.kind(),
        target_kind: target.kind(),
    })?;

    let from = handle::resolve(source.kind(), source_handle, HandleDirection::Source).ok_or(
        ConnectionError::HandleNotFound {
            kind: source.kind(),
            role: source_handle,
            direction: HandleDirection::Source,
        },
    )?;
    let to = handle::resolve(target.kind(), target_handle, HandleDirection::Target).ok_or(
        ConnectionError::HandleNotFound {
            kind: target.kind(),
            role: target_handle,
            direction: HandleDirection::Target,
        },
    )?;

    Ok(ConnectionRequest {
        source: source.id,
        source_handle: from.role,
        target: target.id,
        target_handle: to.role,
        style,
    })
}
