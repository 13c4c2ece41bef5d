// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and connections.
//!
//! [`Graph`] is the authoritative state. Every mutation either applies fully
//! or leaves the graph untouched and reports why.

use crate::catalog::ObjectCatalog;
use crate::connection::{self, Connection, ConnectionError, ConnectionId};
use crate::handle::HandleRole;
use crate::node::{Node, NodeId};
use crate::payload::NodePayload;
use crate::schema::{self, SchemaError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A planning graph
#[derive(Debug, Clone)]
pub struct Graph {
    /// Graph name
    pub name: String,
    /// Nodes in insertion order
    nodes: IndexMap<NodeId, Node>,
    /// Connections between nodes
    connections: IndexMap<ConnectionId, Connection>,
    /// Bumped on every change to the node collection
    revision: u64,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
            revision: 0,
        }
    }

    /// Add a node to the graph
    ///
    /// The payload must conform to its schema.
    pub fn add_node(&mut self, node: Node) -> Result<NodeId, GraphError> {
        schema::validate(node.kind(), &node.payload)?;
        let id = node.id;
        self.nodes.insert(id, node);
        self.revision += 1;
        Ok(id)
    }

    /// Remove a node together with every connection touching it
    ///
    /// Returns the node and the connections removed with it.
    pub fn remove_node(&mut self, node_id: NodeId) -> Result<(Node, Vec<Connection>), GraphError> {
        let node = self
            .nodes
            .shift_remove(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;

        let mut removed = Vec::new();
        self.connections.retain(|_, c| {
            if c.involves_node(node_id) {
                removed.push(c.clone());
                false
            } else {
                true
            }
        });

        self.revision += 1;
        Ok((node, removed))
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Check whether a node exists
    pub fn contains_node(&self, node_id: NodeId) -> bool {
        self.nodes.contains_key(&node_id)
    }

    /// Get all nodes in insertion order
    pub fn nodes(&self) -> impl DoubleEndedIterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Move a node; payload and connections are untouched
    pub fn move_node(&mut self, node_id: NodeId, position: [f32; 2]) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        node.position = position;
        self.revision += 1;
        Ok(())
    }

    /// Replace a node's payload after checking it against the node's schema
    pub fn set_payload(&mut self, node_id: NodeId, payload: NodePayload) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        schema::validate(node.kind(), &payload)?;
        if node.payload != payload {
            node.payload = payload;
            self.revision += 1;
        }
        Ok(())
    }

    /// Connect two nodes
    ///
    /// A `None` role picks the kind's default handle for that direction.
    /// Identical connections are rejected.
    pub fn connect(
        &mut self,
        source: NodeId,
        source_handle: Option<HandleRole>,
        target: NodeId,
        target_handle: Option<HandleRole>,
    ) -> Result<ConnectionId, ConnectionError> {
        // Validate nodes exist
        let source_node = self.nodes.get(&source).ok_or(ConnectionError::NodeNotFound(source))?;
        let target_node = self.nodes.get(&target).ok_or(ConnectionError::NodeNotFound(target))?;

        let request = connection::validate_connection(source_node, source_handle, target_node, target_handle)?;

        if let Some(existing) = self.connections.values().find(|c| c.same_endpoints(&request)) {
            return Err(ConnectionError::Duplicate(existing.id));
        }

        let connection = Connection::new(
            request.source,
            request.source_handle,
            request.target,
            request.target_handle,
            request.style,
        );
        let id = connection.id;
        self.connections.insert(id, connection);
        Ok(id)
    }

    /// Remove a connection
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Result<Connection, GraphError> {
        self.connections
            .shift_remove(&connection_id)
            .ok_or(GraphError::ConnectionNotFound(connection_id))
    }

    /// Get a connection by ID
    pub fn connection(&self, connection_id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&connection_id)
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get connections involving a node
    pub fn connections_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.involves_node(node_id))
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Version of the node collection, usable as a memoization key
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Derive the current object catalog
    pub fn object_catalog(&self) -> ObjectCatalog {
        ObjectCatalog::derive(self.nodes.values())
    }

    /// Copy of the committed graph
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            name: self.name.clone(),
            nodes: self.nodes.values().cloned().collect(),
            connections: self.connections.values().cloned().collect(),
        }
    }

    /// Rebuild a graph from a snapshot, re-checking every invariant
    ///
    /// Connections are revalidated, so stored styles are recomputed rather
    /// than trusted.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self, GraphError> {
        let mut graph = Self::new(snapshot.name);
        for node in snapshot.nodes {
            graph.add_node(node)?;
        }
        for c in snapshot.connections {
            graph.connect(c.source, Some(c.source_handle), c.target, Some(c.target_handle))?;
        }
        Ok(graph)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled Domain")
    }
}

/// Exportable copy of the committed graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Graph name
    pub name: String,
    /// Nodes in insertion order
    pub nodes: Vec<Node>,
    /// Connections in creation order
    pub connections: Vec<Connection>,
}

/// Error from a graph mutation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Connection not found
    #[error("Connection not found: {0:?}")]
    ConnectionNotFound(ConnectionId),

    /// Payload does not conform to its schema
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Connection rejected
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::EdgeStyle;
    use crate::node::NodeKind;
    use crate::payload::{ObjectData, TypeData};
    use crate::schema::NodeRegistry;

    fn add(graph: &mut Graph, kind: NodeKind) -> NodeId {
        let node = NodeRegistry::planning().create_node(kind, [0.0, 0.0]);
        graph.add_node(node).unwrap()
    }

    #[test]
    fn test_connect_once_per_handle_pair() {
        let mut graph = Graph::default();
        let predicate = add(&mut graph, NodeKind::Predicate);
        let action = add(&mut graph, NodeKind::Action);

        let id = graph.connect(predicate, None, action, None).unwrap();
        assert_eq!(graph.connection(id).map(|c| c.style), Some(EdgeStyle::AnimatedFlow));

        let err = graph
            .connect(predicate, Some(HandleRole::Output), action, Some(HandleRole::Precondition))
            .unwrap_err();
        assert_eq!(err, ConnectionError::Duplicate(id));
        assert_eq!(graph.connection_count(), 1);

        // the reverse direction is a different edge
        graph.connect(action, None, predicate, None).unwrap();
        assert_eq!(graph.connection_count(), 2);
    }

    #[test]
    fn test_rejected_connection_changes_nothing() {
        let mut graph = Graph::default();
        let object = add(&mut graph, NodeKind::Object);
        let predicate = add(&mut graph, NodeKind::Predicate);
        let before = graph.snapshot();

        assert!(graph.connect(object, None, predicate, None).is_err());
        assert!(graph.connect(predicate, None, predicate, None).is_err());
        assert_eq!(graph.snapshot(), before);
    }

    #[test]
    fn test_connect_missing_node() {
        let mut graph = Graph::default();
        let predicate = add(&mut graph, NodeKind::Predicate);
        let ghost = NodeId::new();
        assert_eq!(
            graph.connect(predicate, None, ghost, None).unwrap_err(),
            ConnectionError::NodeNotFound(ghost)
        );
    }

    #[test]
    fn test_remove_node_cascades_only_its_edges() {
        let mut graph = Graph::default();
        let type_node = add(&mut graph, NodeKind::Type);
        let object = add(&mut graph, NodeKind::Object);
        let predicate = add(&mut graph, NodeKind::Predicate);
        let action = add(&mut graph, NodeKind::Action);
        let other = add(&mut graph, NodeKind::Predicate);

        graph.connect(type_node, None, object, None).unwrap();
        graph.connect(predicate, None, action, None).unwrap();
        graph.connect(action, None, predicate, None).unwrap();
        let kept = graph.connect(other, None, action, None).unwrap();
        assert_eq!(graph.connections_for_node(predicate).count(), 2);
        assert_eq!(graph.connections_for_node(action).count(), 3);

        let (removed_node, removed_edges) = graph.remove_node(predicate).unwrap();
        assert_eq!(removed_node.id, predicate);
        assert_eq!(removed_edges.len(), 2);
        assert_eq!(graph.connection_count(), 2);
        assert!(graph.connections().all(|c| !c.involves_node(predicate)));
        assert!(graph.connection(kept).is_some());
        let action_edges: Vec<_> = graph.connections_for_node(action).map(|c| c.id).collect();
        assert_eq!(action_edges, vec![kept]);
    }

    #[test]
    fn test_remove_keeps_insertion_order() {
        let mut graph = Graph::default();
        let a = graph.add_node(Node::new(NodePayload::Object(ObjectData::new("a", "block")))).unwrap();
        graph.add_node(Node::new(NodePayload::Object(ObjectData::new("b", "block")))).unwrap();
        graph.add_node(Node::new(NodePayload::Object(ObjectData::new("c", "block")))).unwrap();
        graph.remove_node(a).unwrap();

        let labels: Vec<_> = graph.object_catalog().iter().map(|e| e.label.clone()).collect();
        assert_eq!(labels, vec!["b", "c"]);
    }

    #[test]
    fn test_set_payload_validates() {
        let mut graph = Graph::default();
        let id = add(&mut graph, NodeKind::Type);
        let revision = graph.revision();

        let err = graph
            .set_payload(id, NodePayload::Object(ObjectData::new("a", "block")))
            .unwrap_err();
        assert!(matches!(err, GraphError::Schema(_)));
        assert_eq!(graph.revision(), revision);

        graph.set_payload(id, NodePayload::Type(TypeData::new("block"))).unwrap();
        assert_eq!(graph.node(id).map(Node::label), Some("block"));
        assert!(graph.revision() > revision);
    }

    #[test]
    fn test_move_node() {
        let mut graph = Graph::default();
        let id = add(&mut graph, NodeKind::Action);
        let payload = graph.node(id).unwrap().payload.clone();
        graph.move_node(id, [30.0, 45.0]).unwrap();
        let node = graph.node(id).unwrap();
        assert_eq!(node.position, [30.0, 45.0]);
        assert_eq!(node.payload, payload);
        assert!(graph.move_node(NodeId::new(), [0.0, 0.0]).is_err());
    }

    #[test]
    fn test_snapshot_rebuild_checks_edges() {
        let mut graph = Graph::default();
        let type_node = add(&mut graph, NodeKind::Type);
        let object = add(&mut graph, NodeKind::Object);
        graph.connect(type_node, None, object, None).unwrap();

        let text = serde_json::to_string(&graph.snapshot()).unwrap();
        let snapshot: GraphSnapshot = serde_json::from_str(&text).unwrap();
        let rebuilt = Graph::from_snapshot(snapshot.clone()).unwrap();
        assert_eq!(rebuilt.node_count(), 2);
        assert_eq!(rebuilt.connection_count(), 1);

        let mut dangling = snapshot;
        dangling.nodes.retain(|n| n.id != object);
        assert!(matches!(
            Graph::from_snapshot(dangling),
            Err(GraphError::Connection(ConnectionError::NodeNotFound(_)))
        ));
    }
}
