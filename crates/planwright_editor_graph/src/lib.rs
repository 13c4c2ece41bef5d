// SPDX-License-Identifier: MIT OR Apache-2.0
//! Planning graph model and editing protocol for Planwright.
//!
//! A planning domain is edited as a graph of four node kinds: types,
//! objects, predicates and actions. This crate provides:
//! - Typed node payloads and their schema registry
//! - Connection validation with derived edge styles
//! - The object catalog derived from the node collection
//! - A graph surface that owns the authoritative state
//! - A draft-based property editor with explicit commit policies
//! - An egui canvas for the surface
//!
//! ## Architecture
//!
//! [`Graph`] holds committed state. [`GraphSurface`] wraps it with selection,
//! notifications and host observers, and is the only thing the canvas and the
//! property editor mutate.

pub mod catalog;
pub mod connection;
pub mod editor;
pub mod graph;
pub mod handle;
pub mod node;
pub mod notify;
pub mod payload;
pub mod schema;
pub mod surface;
pub mod ui;

pub use catalog::{CatalogEntry, ObjectCatalog, ObjectPicker, EMPTY_CATALOG_HINT};
pub use connection::{Connection, ConnectionError, ConnectionId, EdgeStyle};
pub use editor::{CommitError, CommitPolicy, Draft, EditorField, EditorState, PanelLayout, PropertyEditor, StructuralEdit, TextField};
pub use graph::{Graph, GraphError, GraphSnapshot};
pub use handle::{Handle, HandleDirection, HandleRole};
pub use node::{Node, NodeId, NodeKind};
pub use notify::{Notification, NotificationLog, NotificationSink, NullSink, Severity};
pub use payload::{BindingField, BindingSlot, NodePayload, ObjectPair, Parameter};
pub use schema::{NodeRegistry, NodeType, SchemaError, SchemaViolation};
pub use surface::{GraphSurface, SurfaceObserver};
pub use ui::GraphCanvas;
