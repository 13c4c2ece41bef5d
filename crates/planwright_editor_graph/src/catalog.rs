// SPDX-License-Identifier: MIT OR Apache-2.0
//! Object catalog: the read-only list of objects that bindings may name.
//!
//! The catalog is derived from the node collection and never stored on its
//! own. Consumers derive it again whenever they need it, so a relabelled or
//! deleted object can never be observed under its old label.

use crate::node::{Node, NodeId};
use crate::payload::NodePayload;
use serde::Serialize;

/// Hint shown when there is nothing to bind
pub const EMPTY_CATALOG_HINT: &str = "Create an 'Object' node to enable parameter selection.";

/// One addressable object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Object node ID
    pub id: NodeId,
    /// Object label
    pub label: String,
    /// Object type name
    #[serde(rename = "type")]
    pub type_name: String,
}

impl CatalogEntry {
    /// Picker text, `label (type)`
    pub fn display(&self) -> String {
        format!("{} ({})", self.label, self.type_name)
    }
}

/// Objects available for binding, in node insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObjectCatalog {
    entries: Vec<CatalogEntry>,
}

impl ObjectCatalog {
    /// Derive the catalog from a node collection
    pub fn derive<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Self {
        let entries = nodes
            .into_iter()
            .filter_map(|node| match &node.payload {
                NodePayload::Object(data) => Some(CatalogEntry {
                    id: node.id,
                    label: data.label.clone(),
                    type_name: data.type_name.clone(),
                }),
                NodePayload::Type(_) | NodePayload::Predicate(_) | NodePayload::Action(_) => None,
            })
            .collect();
        Self { entries }
    }

    /// All entries
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Iterate entries
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no objects exist
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an object with this label exists
    pub fn contains_label(&self, label: &str) -> bool {
        self.entries.iter().any(|e| e.label == label)
    }

    /// Label of the first object, used as the default for new bindings
    pub fn first_label(&self) -> Option<&str> {
        self.entries.first().map(|e| e.label.as_str())
    }

    /// Build the picker for a currently bound value
    pub fn picker(&self, current: Option<&str>) -> ObjectPicker {
        let current = current.filter(|c| !c.is_empty()).map(str::to_string);
        let stale = current.as_deref().is_some_and(|c| !self.contains_label(c));
        ObjectPicker {
            options: self.entries.clone(),
            current,
            stale,
        }
    }
}

/// What an object picker shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectPicker {
    /// Selectable objects, in catalog order
    pub options: Vec<CatalogEntry>,
    /// Bound label, if any
    pub current: Option<String>,
    /// Bound label names no existing object
    pub stale: bool,
}

impl ObjectPicker {
    /// Picker has nothing to offer and must render disabled
    pub fn is_disabled(&self) -> bool {
        self.options.is_empty()
    }

    /// Hint directing the user to create an object, when disabled
    pub fn hint(&self) -> Option<&'static str> {
        self.is_disabled().then_some(EMPTY_CATALOG_HINT)
    }

    /// Text for the closed picker
    pub fn selected_text(&self) -> String {
        match (&self.current, self.is_disabled()) {
            (Some(label), _) if self.stale => format!("{label} (missing)"),
            (Some(label), _) => self
                .options
                .iter()
                .find(|o| o.label == *label)
                .map_or_else(|| label.clone(), CatalogEntry::display),
            (None, true) => "No objects available".to_string(),
            (None, false) => "Select Object".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{ObjectData, TypeData};

    fn object(label: &str, type_name: &str) -> Node {
        Node::new(NodePayload::Object(ObjectData::new(label, type_name)))
    }

    #[test]
    fn test_only_objects_in_insertion_order() {
        let nodes = vec![
            object("b", "block"),
            Node::new(NodePayload::Type(TypeData::new("block"))),
            object("a", "block"),
            object("table", "surface"),
        ];
        let catalog = ObjectCatalog::derive(&nodes);
        let labels: Vec<_> = catalog.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "a", "table"]);
        assert_eq!(catalog.entries()[2].type_name, "surface");
        assert_eq!(catalog.entries()[0].id, nodes[0].id);
        assert_eq!(catalog.first_label(), Some("b"));
    }

    #[test]
    fn test_rederive_sees_relabel() {
        let mut nodes = vec![object("a", "block")];
        assert!(ObjectCatalog::derive(&nodes).contains_label("a"));

        *nodes[0].payload.label_mut() = "a2".to_string();
        let catalog = ObjectCatalog::derive(&nodes);
        assert!(!catalog.contains_label("a"));
        assert!(catalog.contains_label("a2"));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_empty_picker_is_disabled_with_hint() {
        let picker = ObjectCatalog::default().picker(None);
        assert!(picker.is_disabled());
        assert_eq!(picker.hint(), Some(EMPTY_CATALOG_HINT));
        assert_eq!(picker.selected_text(), "No objects available");
    }

    #[test]
    fn test_stale_value_flagged() {
        let catalog = ObjectCatalog::derive(&[object("b", "block")]);
        let picker = catalog.picker(Some("a"));
        assert!(picker.stale);
        assert!(picker.options.iter().all(|o| o.label != "a"));
        assert_eq!(picker.selected_text(), "a (missing)");

        let picker = catalog.picker(Some("b"));
        assert!(!picker.stale);
        assert_eq!(picker.selected_text(), "b (block)");

        assert!(!catalog.picker(Some("")).stale);
    }
}
