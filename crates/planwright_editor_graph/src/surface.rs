// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph surface: the single owner of the editable planning graph.
//!
//! The surface wraps [`Graph`] with the current selection, a notification
//! sink and host observers. Every user-facing structural operation goes
//! through here so that notifications and host callbacks fire consistently.

use crate::catalog::ObjectCatalog;
use crate::connection::{Connection, ConnectionError, ConnectionId};
use crate::graph::{Graph, GraphError, GraphSnapshot};
use crate::handle::HandleRole;
use crate::node::{Node, NodeId, NodeKind};
use crate::notify::{Notification, NotificationLog, NotificationSink};
use crate::payload::NodePayload;
use crate::schema::NodeRegistry;

/// Host callbacks for observing the surface without owning it
///
/// All methods default to doing nothing.
pub trait SurfaceObserver {
    /// Selection changed
    fn on_node_select(&mut self, _node: Option<&Node>) {}

    /// Nodes or connections changed
    fn on_nodes_update(&mut self, _graph: &Graph) {}

    /// The set of bindable objects changed
    fn on_catalog_update(&mut self, _catalog: &ObjectCatalog) {}
}

/// Editable graph with selection, notifications and observers
pub struct GraphSurface<S: NotificationSink = NotificationLog> {
    graph: Graph,
    registry: NodeRegistry,
    selection: Option<NodeId>,
    sink: S,
    observers: Vec<Box<dyn SurfaceObserver>>,
    /// Last catalog handed to observers, only used to detect changes
    announced_catalog: ObjectCatalog,
}

impl<S: NotificationSink> GraphSurface<S> {
    /// Create a surface over an empty graph
    pub fn new(registry: NodeRegistry, sink: S) -> Self {
        Self::with_graph(Graph::default(), registry, sink)
    }

    /// Create a surface over an existing graph
    pub fn with_graph(graph: Graph, registry: NodeRegistry, sink: S) -> Self {
        let announced_catalog = graph.object_catalog();
        Self {
            graph,
            registry,
            selection: None,
            sink,
            observers: Vec::new(),
            announced_catalog,
        }
    }

    /// Register a host observer
    pub fn add_observer(&mut self, observer: Box<dyn SurfaceObserver>) {
        self.observers.push(observer);
    }

    /// The committed graph
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Node schema registry
    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Notification sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable notification sink
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Look up a node
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.graph.node(node_id)
    }

    /// Freshly derived object catalog
    pub fn catalog(&self) -> ObjectCatalog {
        self.graph.object_catalog()
    }

    /// Version of the node collection
    pub fn revision(&self) -> u64 {
        self.graph.revision()
    }

    /// Export the committed graph; editor drafts are never included
    pub fn snapshot(&self) -> GraphSnapshot {
        self.graph.snapshot()
    }

    /// Create a node of `kind` with its default payload
    pub fn create_node(&mut self, kind: NodeKind, position: [f32; 2]) -> Result<Node, GraphError> {
        let node = self.registry.create_node(kind, position);
        match self.graph.add_node(node.clone()) {
            Ok(id) => {
                tracing::info!("Created {} node {}", kind, id);
                self.sink.notify(Notification::success(
                    "Node created",
                    format!("{kind} node added to canvas"),
                ));
                self.nodes_changed();
                Ok(node)
            }
            Err(err) => {
                tracing::warn!("Failed to create {} node: {}", kind, err);
                self.sink.notify(Notification::error("Node not created", err.to_string()));
                Err(err)
            }
        }
    }

    /// Connect two nodes through the given handles
    ///
    /// A rejected connection leaves the graph unchanged and is reported to the
    /// notification sink.
    pub fn connect(
        &mut self,
        source: NodeId,
        source_handle: Option<HandleRole>,
        target: NodeId,
        target_handle: Option<HandleRole>,
    ) -> Result<ConnectionId, ConnectionError> {
        match self.graph.connect(source, source_handle, target, target_handle) {
            Ok(id) => {
                if let Some(connection) = self.graph.connection(id) {
                    tracing::info!(
                        "Connected {} -> {} ({})",
                        connection.source,
                        connection.target,
                        connection.style
                    );
                }
                self.nodes_changed();
                Ok(id)
            }
            Err(err) => {
                tracing::warn!("Rejected connection {} -> {}: {}", source, target, err);
                self.sink.notify(Notification::error("Invalid connection", err.to_string()));
                Err(err)
            }
        }
    }

    /// Remove a single connection
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Result<Connection, GraphError> {
        let connection = self.graph.disconnect(connection_id)?;
        tracing::info!("Disconnected {} -> {}", connection.source, connection.target);
        self.nodes_changed();
        Ok(connection)
    }

    /// Move a node
    pub fn move_node(&mut self, node_id: NodeId, position: [f32; 2]) -> Result<(), GraphError> {
        self.graph.move_node(node_id, position)?;
        tracing::debug!("Moved node {} to {:?}", node_id, position);
        self.nodes_changed();
        Ok(())
    }

    /// Delete a node and every connection touching it
    ///
    /// Deleting the selected node clears the selection.
    pub fn delete_node(&mut self, node_id: NodeId) -> Result<Node, GraphError> {
        let (node, removed) = self.graph.remove_node(node_id)?;
        tracing::info!(
            "Deleted {} node {} and {} connection(s)",
            node.kind(),
            node_id,
            removed.len()
        );
        if self.selection == Some(node_id) {
            self.selection = None;
            self.selection_changed();
        }
        self.nodes_changed();
        Ok(node)
    }

    /// Set or clear the selected node
    pub fn select(&mut self, node_id: Option<NodeId>) -> Result<(), GraphError> {
        if let Some(id) = node_id {
            if !self.graph.contains_node(id) {
                return Err(GraphError::NodeNotFound(id));
            }
        }
        if self.selection != node_id {
            tracing::debug!("Selection changed to {:?}", node_id);
            self.selection = node_id;
            self.selection_changed();
        }
        Ok(())
    }

    /// Currently selected node ID
    pub fn selection(&self) -> Option<NodeId> {
        self.selection
    }

    /// Currently selected node
    pub fn selected_node(&self) -> Option<&Node> {
        self.selection.and_then(|id| self.graph.node(id))
    }

    /// Write a payload into committed state after schema validation
    pub fn commit_payload(&mut self, node_id: NodeId, payload: NodePayload) -> Result<(), GraphError> {
        let revision = self.graph.revision();
        if let Err(err) = self.graph.set_payload(node_id, payload) {
            tracing::warn!("Rejected payload for node {}: {}", node_id, err);
            return Err(err);
        }
        if self.graph.revision() != revision {
            tracing::info!("Committed payload of node {}", node_id);
            self.nodes_changed();
        }
        Ok(())
    }

    fn selection_changed(&mut self) {
        let node = self.selection.and_then(|id| self.graph.node(id));
        for observer in &mut self.observers {
            observer.on_node_select(node);
        }
    }

    fn nodes_changed(&mut self) {
        for observer in &mut self.observers {
            observer.on_nodes_update(&self.graph);
        }

        let catalog = self.graph.object_catalog();
        if catalog != self.announced_catalog {
            tracing::debug!("Object catalog now has {} entries", catalog.len());
            for observer in &mut self.observers {
                observer.on_catalog_update(&catalog);
            }
            self.announced_catalog = catalog;
        }
    }
}

impl Default for GraphSurface {
    fn default() -> Self {
        Self::new(NodeRegistry::planning(), NotificationLog::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::EdgeStyle;
    use crate::notify::Severity;
    use crate::payload::{BindingField, ObjectData, ObjectPair, Parameter};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorded {
        selections: Vec<Option<NodeId>>,
        updates: usize,
        catalogs: Vec<Vec<String>>,
    }

    struct Recorder(Rc<RefCell<Recorded>>);

    impl SurfaceObserver for Recorder {
        fn on_node_select(&mut self, node: Option<&Node>) {
            self.0.borrow_mut().selections.push(node.map(|n| n.id));
        }

        fn on_nodes_update(&mut self, _graph: &Graph) {
            self.0.borrow_mut().updates += 1;
        }

        fn on_catalog_update(&mut self, catalog: &ObjectCatalog) {
            let labels = catalog.iter().map(|e| e.label.clone()).collect();
            self.0.borrow_mut().catalogs.push(labels);
        }
    }

    fn relabel(surface: &mut GraphSurface, id: NodeId, label: &str) {
        let mut payload = surface.node(id).unwrap().payload.clone();
        *payload.label_mut() = label.to_string();
        surface.commit_payload(id, payload).unwrap();
    }

    #[test]
    fn test_create_node_notifies() {
        let mut surface = GraphSurface::default();
        let node = surface.create_node(NodeKind::Predicate, [30.0, 60.0]).unwrap();

        assert_eq!(node.position, [30.0, 60.0]);
        assert_eq!(surface.node(node.id).map(Node::kind), Some(NodeKind::Predicate));
        let note = surface.sink().latest().unwrap();
        assert_eq!(note.severity, Severity::Success);
        assert_eq!(note.summary, "Node created");
        assert_eq!(note.detail, "Predicate node added to canvas");
    }

    #[test]
    fn test_blocks_world_scenario() {
        let mut surface = GraphSurface::default();
        let t = surface.create_node(NodeKind::Type, [0.0, 0.0]).unwrap().id;
        relabel(&mut surface, t, "block");

        let o = surface.create_node(NodeKind::Object, [0.0, 150.0]).unwrap().id;
        surface
            .commit_payload(o, NodePayload::Object(ObjectData::new("a", "block")))
            .unwrap();

        let p = surface.create_node(NodeKind::Predicate, [300.0, 0.0]).unwrap().id;
        let mut payload = surface.node(p).unwrap().payload.clone();
        *payload.label_mut() = "on-top".to_string();
        if let Some(params) = payload.parameters_mut() {
            params.push(Parameter::new("?x", "block"));
            params.push(Parameter::new("?y", "block"));
        }
        surface.commit_payload(p, payload).unwrap();

        let t_o = surface.connect(t, None, o, None).unwrap();
        assert_eq!(
            surface.graph().connection(t_o).map(|c| c.style.tag()),
            Some("plain-structural")
        );

        let notified = surface.sink().len();
        let err = surface.connect(o, None, p, None).unwrap_err();
        assert!(matches!(err, ConnectionError::IllegalKinds { .. }));
        assert_eq!(surface.sink().len(), notified + 1);
        let note = surface.sink().latest().unwrap();
        assert_eq!(note.severity, Severity::Error);
        assert_eq!(note.summary, "Invalid connection");
        assert_eq!(surface.graph().connection_count(), 1);

        let a = surface.create_node(NodeKind::Action, [600.0, 0.0]).unwrap().id;
        let p_a = surface.connect(p, None, a, None).unwrap();
        assert_eq!(
            surface.graph().connection(p_a).map(|c| c.style),
            Some(EdgeStyle::AnimatedFlow)
        );
    }

    #[test]
    fn test_every_illegal_pair_rejected_by_surface() {
        let mut surface = GraphSurface::default();
        let mut nodes = Vec::new();
        for kind in NodeKind::ALL {
            let first = surface.create_node(kind, [0.0, 0.0]).unwrap().id;
            let second = surface.create_node(kind, [0.0, 150.0]).unwrap().id;
            nodes.push((kind, first, second));
        }
        let (_, predicate, _) = nodes[1];
        let (_, action, _) = nodes[2];
        surface.connect(predicate, None, action, None).unwrap();

        let before = surface.snapshot();
        let mut rejected = 0;
        for &(source_kind, source, _) in &nodes {
            for &(target_kind, _, target) in &nodes {
                if crate::connection::edge_style(source_kind, target_kind).is_some() {
                    continue;
                }
                let notified = surface.sink().len();
                let err = surface.connect(source, None, target, None).unwrap_err();
                assert_eq!(err, ConnectionError::IllegalKinds { source_kind, target_kind });
                assert_eq!(surface.sink().len(), notified + 1);
                assert_eq!(surface.sink().latest().map(|n| n.severity), Some(Severity::Error));
                assert_eq!(surface.snapshot(), before);
                rejected += 1;
            }
        }
        assert_eq!(rejected, 13);
        assert_eq!(surface.graph().connection_count(), 1);
    }

    #[test]
    fn test_deleted_object_leaves_stale_binding() {
        let mut surface = GraphSurface::default();
        let o = surface.create_node(NodeKind::Object, [0.0, 0.0]).unwrap().id;
        relabel(&mut surface, o, "a");

        let p = surface.create_node(NodeKind::Predicate, [200.0, 0.0]).unwrap().id;
        let mut payload = surface.node(p).unwrap().payload.clone();
        if let Some(params) = payload.parameters_mut() {
            params.push(Parameter::new("?x", "object"));
        }
        if let Some(bindings) = payload.bindings_mut(BindingField::Bindings) {
            bindings.push(ObjectPair::single("a"));
        }
        surface.commit_payload(p, payload).unwrap();

        surface.delete_node(o).unwrap();

        let bindings = surface
            .node(p)
            .and_then(|n| n.payload.bindings(BindingField::Bindings))
            .unwrap();
        assert_eq!(bindings[0].object1, "a");

        let picker = surface.catalog().picker(Some("a"));
        assert!(picker.stale);
        assert!(picker.options.is_empty());
        assert!(picker.is_disabled());
    }

    #[test]
    fn test_delete_selected_clears_selection() {
        let mut surface = GraphSurface::default();
        let a = surface.create_node(NodeKind::Action, [0.0, 0.0]).unwrap().id;
        let b = surface.create_node(NodeKind::Predicate, [0.0, 0.0]).unwrap().id;
        surface.connect(b, None, a, None).unwrap();
        surface.select(Some(a)).unwrap();

        surface.delete_node(b).unwrap();
        assert_eq!(surface.selection(), Some(a));
        assert_eq!(surface.graph().connection_count(), 0);

        surface.delete_node(a).unwrap();
        assert_eq!(surface.selection(), None);
        assert!(surface.selected_node().is_none());
    }

    #[test]
    fn test_select_missing_node_rejected() {
        let mut surface = GraphSurface::default();
        let ghost = NodeId::new();
        assert_eq!(surface.select(Some(ghost)), Err(GraphError::NodeNotFound(ghost)));
        assert_eq!(surface.selection(), None);
    }

    #[test]
    fn test_only_creation_and_rejection_notify() {
        let mut surface = GraphSurface::default();
        let t = surface.create_node(NodeKind::Type, [0.0, 0.0]).unwrap().id;
        let o = surface.create_node(NodeKind::Object, [0.0, 0.0]).unwrap().id;
        let count = surface.sink().len();

        surface.connect(t, None, o, None).unwrap();
        surface.move_node(o, [15.0, 15.0]).unwrap();
        surface.select(Some(o)).unwrap();
        surface.delete_node(t).unwrap();
        assert_eq!(surface.sink().len(), count);
    }

    #[test]
    fn test_observers_follow_changes() {
        let recorded = Rc::new(RefCell::new(Recorded::default()));
        let mut surface = GraphSurface::default();
        surface.add_observer(Box::new(Recorder(Rc::clone(&recorded))));

        let t = surface.create_node(NodeKind::Type, [0.0, 0.0]).unwrap().id;
        assert!(recorded.borrow().catalogs.is_empty());

        let o = surface.create_node(NodeKind::Object, [0.0, 0.0]).unwrap().id;
        relabel(&mut surface, o, "a");
        surface.select(Some(o)).unwrap();
        surface.move_node(t, [45.0, 0.0]).unwrap();
        surface.delete_node(o).unwrap();

        let recorded = recorded.borrow();
        assert_eq!(recorded.selections, vec![Some(o), None]);
        assert_eq!(recorded.updates, 5);
        assert_eq!(
            recorded.catalogs,
            vec![vec!["New object".to_string()], vec!["a".to_string()], vec![]]
        );
    }

    #[test]
    fn test_rejected_commit_changes_nothing() {
        let mut surface = GraphSurface::default();
        let id = surface.create_node(NodeKind::Type, [0.0, 0.0]).unwrap().id;
        let before = surface.snapshot();

        let mut payload = surface.node(id).unwrap().payload.clone();
        payload.label_mut().clear();
        assert!(matches!(
            surface.commit_payload(id, payload),
            Err(GraphError::Schema(_))
        ));
        assert_eq!(surface.snapshot(), before);
    }
}
