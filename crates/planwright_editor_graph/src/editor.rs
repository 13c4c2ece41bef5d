// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property editor for the selected node.
//!
//! The editor holds a [`Draft`] of the selected node's payload. Free-text
//! fields only touch the draft until the input loses focus, then
//! [`PropertyEditor::commit_on_blur`] writes the whole draft back.
//! Structural edits go through [`PropertyEditor::commit_immediately`], which
//! writes to committed state first and mirrors the change into the draft, so
//! pending text stays pending.
//!
//! Which field uses which policy is fixed by [`EditorField::policy`].

use crate::catalog::{ObjectCatalog, ObjectPicker};
use crate::graph::GraphError;
use crate::node::{NodeId, NodeKind};
use crate::notify::NotificationSink;
use crate::payload::{BindingField, BindingSlot, NodePayload, ObjectPair, Parameter};
use crate::schema::SchemaError;
use crate::surface::GraphSurface;

/// When an edited field reaches committed state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitPolicy {
    /// Draft only, written when the input loses focus
    OnBlur,
    /// Written at the moment of the edit
    Immediately,
}

/// Every editable field of the properties panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorField {
    /// Node label
    Label,
    /// Node description
    Description,
    /// Object type name
    ObjectType,
    /// Parameter name
    ParameterName,
    /// Parameter type
    ParameterType,
    /// Object bound to a parameter
    ParameterValue,
    /// Adding or removing a parameter
    ParameterList,
    /// Adding or removing a binding
    BindingList,
    /// Object picked for a binding slot
    BindingObject,
}

impl EditorField {
    /// Commit policy of this field
    pub const fn policy(self) -> CommitPolicy {
        match self {
            Self::Label | Self::Description | Self::ObjectType | Self::ParameterName | Self::ParameterType => {
                CommitPolicy::OnBlur
            }
            Self::ParameterValue | Self::ParameterList | Self::BindingList | Self::BindingObject => {
                CommitPolicy::Immediately
            }
        }
    }
}

/// A free-text field of the draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    /// Node label
    Label,
    /// Node description
    Description,
    /// Object type name
    ObjectType,
    /// Name of the parameter at an index
    ParameterName(usize),
    /// Type of the parameter at an index
    ParameterType(usize),
}

impl TextField {
    /// Field in the policy table
    pub const fn field(self) -> EditorField {
        match self {
            Self::Label => EditorField::Label,
            Self::Description => EditorField::Description,
            Self::ObjectType => EditorField::ObjectType,
            Self::ParameterName(_) => EditorField::ParameterName,
            Self::ParameterType(_) => EditorField::ParameterType,
        }
    }
}

/// A structural change, committed as soon as it is made
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralEdit {
    /// Append a parameter with default name, type and value
    AddParameter,
    /// Remove the parameter at an index
    RemoveParameter(usize),
    /// Bind (or unbind) a parameter's value
    BindParameter {
        /// Parameter index
        index: usize,
        /// Object label, `None` to unbind
        label: Option<String>,
    },
    /// Append a binding to a sequence
    AddBinding(BindingField),
    /// Remove a binding from a sequence
    RemoveBinding {
        /// Sequence
        field: BindingField,
        /// Binding index
        index: usize,
    },
    /// Pick the object for one slot of a binding
    BindObject {
        /// Sequence
        field: BindingField,
        /// Binding index
        index: usize,
        /// Slot
        slot: BindingSlot,
        /// Object label
        label: String,
    },
}

impl StructuralEdit {
    /// Field in the policy table
    pub const fn field(&self) -> EditorField {
        match self {
            Self::AddParameter | Self::RemoveParameter(_) => EditorField::ParameterList,
            Self::BindParameter { .. } => EditorField::ParameterValue,
            Self::AddBinding(_) | Self::RemoveBinding { .. } => EditorField::BindingList,
            Self::BindObject { .. } => EditorField::BindingObject,
        }
    }

    /// Apply the edit to a payload
    ///
    /// Deterministic for a given catalog and default type, so applying it to
    /// both the committed payload and the draft yields the same shape.
    fn apply(
        &self,
        payload: &mut NodePayload,
        catalog: &ObjectCatalog,
        default_type: &str,
    ) -> Result<(), CommitError> {
        let kind = payload.kind();
        match self {
            Self::AddParameter => {
                let params = payload
                    .parameters_mut()
                    .ok_or(CommitError::NotApplicable { field: self.field(), kind })?;
                let mut parameter = Parameter::new(format!("?param{}", params.len() + 1), default_type);
                parameter.value = catalog.first_label().map(str::to_string);
                params.push(parameter);
            }
            Self::RemoveParameter(index) => {
                let params = payload
                    .parameters_mut()
                    .ok_or(CommitError::NotApplicable { field: self.field(), kind })?;
                if *index >= params.len() {
                    return Err(CommitError::IndexOutOfRange {
                        what: "Parameter",
                        index: *index,
                    });
                }
                params.remove(*index);
                if params.len() <= 1 {
                    // unary or nullary owners cannot fill the second slot
                    for field in payload.binding_fields() {
                        if let Some(bindings) = payload.bindings_mut(*field) {
                            for binding in bindings {
                                binding.object2 = None;
                            }
                        }
                    }
                }
            }
            Self::BindParameter { index, label } => {
                if let Some(label) = label {
                    require_object(catalog, label)?;
                }
                let parameter = payload
                    .parameters_mut()
                    .ok_or(CommitError::NotApplicable { field: self.field(), kind })?
                    .get_mut(*index)
                    .ok_or(CommitError::IndexOutOfRange {
                        what: "Parameter",
                        index: *index,
                    })?;
                parameter.value.clone_from(label);
            }
            Self::AddBinding(field) => {
                let bindings = payload
                    .bindings_mut(*field)
                    .ok_or(CommitError::NotApplicable { field: self.field(), kind })?;
                bindings.push(ObjectPair::single(catalog.first_label().unwrap_or_default()));
            }
            Self::RemoveBinding { field, index } => {
                let bindings = payload
                    .bindings_mut(*field)
                    .ok_or(CommitError::NotApplicable { field: self.field(), kind })?;
                if *index >= bindings.len() {
                    return Err(CommitError::IndexOutOfRange {
                        what: "Binding",
                        index: *index,
                    });
                }
                bindings.remove(*index);
            }
            Self::BindObject {
                field,
                index,
                slot,
                label,
            } => {
                require_object(catalog, label)?;
                let binding = payload
                    .bindings_mut(*field)
                    .ok_or(CommitError::NotApplicable { field: self.field(), kind })?
                    .get_mut(*index)
                    .ok_or(CommitError::IndexOutOfRange {
                        what: "Binding",
                        index: *index,
                    })?;
                match slot {
                    BindingSlot::First => binding.object1.clone_from(label),
                    BindingSlot::Second => binding.object2 = Some(label.clone()),
                }
            }
        }
        Ok(())
    }
}

fn require_object(catalog: &ObjectCatalog, label: &str) -> Result<(), CommitError> {
    if catalog.contains_label(label) {
        Ok(())
    } else {
        Err(CommitError::UnknownObject(label.to_string()))
    }
}

/// Error from a commit
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommitError {
    /// Nothing is being edited
    #[error("No node is selected")]
    NoSelection,

    /// Field does not exist on this kind
    #[error("{field:?} cannot be edited on {kind} nodes")]
    NotApplicable {
        /// Edited field
        field: EditorField,
        /// Kind of the selected node
        kind: NodeKind,
    },

    /// Index past the end of a list
    #[error("{what} {index} does not exist")]
    IndexOutOfRange {
        /// List addressed
        what: &'static str,
        /// Requested index
        index: usize,
    },

    /// Label is not in the object catalog
    #[error("No object named '{0}'")]
    UnknownObject(String),

    /// Result does not conform to the node's schema
    #[error(transparent)]
    Schema(SchemaError),

    /// Committed state rejected the write
    #[error(transparent)]
    Graph(GraphError),
}

impl From<GraphError> for CommitError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::Schema(schema) => Self::Schema(schema),
            other => Self::Graph(other),
        }
    }
}

/// Working copy of the selected node's payload
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    node_id: NodeId,
    captured: NodePayload,
    payload: NodePayload,
    error: Option<SchemaError>,
}

impl Draft {
    fn capture(node_id: NodeId, payload: &NodePayload) -> Self {
        Self {
            node_id,
            captured: payload.clone(),
            payload: payload.clone(),
            error: None,
        }
    }

    /// Node being edited
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Draft payload, including uncommitted text
    pub fn payload(&self) -> &NodePayload {
        &self.payload
    }

    /// Whether the draft holds uncommitted edits
    pub fn is_dirty(&self) -> bool {
        self.payload != self.captured
    }

    /// Schema error of the last rejected commit
    pub fn error(&self) -> Option<&SchemaError> {
        self.error.as_ref()
    }

    /// Current text of a free-text field
    pub fn text(&self, field: TextField) -> Option<&str> {
        match field {
            TextField::Label => Some(self.payload.label()),
            TextField::Description => Some(self.payload.description().unwrap_or_default()),
            TextField::ObjectType => self.payload.object_type(),
            TextField::ParameterName(i) => self.payload.parameters()?.get(i).map(|p| p.name.as_str()),
            TextField::ParameterType(i) => self.payload.parameters()?.get(i).map(|p| p.type_name.as_str()),
        }
    }
}

/// Editor state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorState<'a> {
    /// No node selected
    Unselected,
    /// A node's draft is open
    Editing(&'a Draft),
}

/// Which sections the properties panel shows for a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelLayout {
    /// Kind being edited
    pub kind: NodeKind,
    /// Object type field
    pub shows_object_type: bool,
    /// Parameter list editor
    pub shows_parameters: bool,
    /// Binding list editors, in display order
    pub binding_fields: &'static [BindingField],
    /// Second object picker in each binding
    pub shows_second_object: bool,
}

impl PanelLayout {
    /// Layout for a payload
    pub fn for_payload(payload: &NodePayload) -> Self {
        Self {
            kind: payload.kind(),
            shows_object_type: payload.object_type().is_some(),
            shows_parameters: payload.parameters().is_some(),
            binding_fields: payload.binding_fields(),
            shows_second_object: payload.has_second_slot(),
        }
    }
}

/// Draft-based editor over the surface's selected node
#[derive(Debug, Default)]
pub struct PropertyEditor {
    draft: Option<Draft>,
}

impl PropertyEditor {
    /// Create an editor with nothing selected
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> EditorState<'_> {
        self.draft.as_ref().map_or(EditorState::Unselected, EditorState::Editing)
    }

    /// Open draft, if editing
    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    /// Follow the surface's selection
    ///
    /// Captures a fresh draft when the selection moved to another node or the
    /// selected node's committed payload changed behind the editor's back.
    /// Uncommitted edits are discarded in both cases.
    pub fn sync<S: NotificationSink>(&mut self, surface: &GraphSurface<S>) {
        let Some(node) = surface.selected_node() else {
            if self.draft.take().is_some() {
                tracing::debug!("Property editor cleared");
            }
            return;
        };

        let (same_node, unchanged) = self
            .draft
            .as_ref()
            .map_or((false, false), |d| (d.node_id == node.id, d.captured == node.payload));
        if same_node && unchanged {
            return;
        }
        if same_node {
            tracing::debug!("Node {} changed externally, draft re-captured", node.id);
        } else {
            tracing::debug!("Editing node {}", node.id);
        }
        self.draft = Some(Draft::capture(node.id, &node.payload));
    }

    /// Change a free-text field of the draft
    ///
    /// Committed state is untouched until [`Self::commit_on_blur`].
    pub fn edit_text(&mut self, field: TextField, text: &str) -> Result<(), CommitError> {
        let draft = self.draft.as_mut().ok_or(CommitError::NoSelection)?;
        let kind = draft.payload.kind();
        let not_applicable = CommitError::NotApplicable {
            field: field.field(),
            kind,
        };
        match field {
            TextField::Label => *draft.payload.label_mut() = text.to_string(),
            TextField::Description => {
                *draft.payload.description_mut() = (!text.is_empty()).then(|| text.to_string());
            }
            TextField::ObjectType => {
                *draft.payload.object_type_mut().ok_or(not_applicable)? = text.to_string();
            }
            TextField::ParameterName(index) | TextField::ParameterType(index) => {
                let parameter = draft
                    .payload
                    .parameters_mut()
                    .ok_or(not_applicable)?
                    .get_mut(index)
                    .ok_or(CommitError::IndexOutOfRange {
                        what: "Parameter",
                        index,
                    })?;
                if matches!(field, TextField::ParameterName(_)) {
                    parameter.name = text.to_string();
                } else {
                    parameter.type_name = text.to_string();
                }
            }
        }
        Ok(())
    }

    /// Throw away uncommitted edits
    pub fn discard(&mut self) {
        if let Some(draft) = &mut self.draft {
            draft.payload = draft.captured.clone();
            draft.error = None;
        }
    }

    /// Write the draft to committed state
    ///
    /// On a schema violation nothing is written and the draft stays open with
    /// the error attached.
    pub fn commit_on_blur<S: NotificationSink>(&mut self, surface: &mut GraphSurface<S>) -> Result<(), CommitError> {
        let draft = self.draft.as_mut().ok_or(CommitError::NoSelection)?;
        if !draft.is_dirty() {
            draft.error = None;
            return Ok(());
        }

        match surface.commit_payload(draft.node_id, draft.payload.clone()) {
            Ok(()) => {
                draft.captured = draft.payload.clone();
                draft.error = None;
                Ok(())
            }
            Err(err) => {
                let err = CommitError::from(err);
                if let CommitError::Schema(schema) = &err {
                    draft.error = Some(schema.clone());
                }
                Err(err)
            }
        }
    }

    /// Apply a structural edit straight to committed state
    ///
    /// The edit is applied to the committed payload, validated and written;
    /// then it is mirrored into the draft so the draft's pending text edits
    /// survive.
    pub fn commit_immediately<S: NotificationSink>(
        &mut self,
        surface: &mut GraphSurface<S>,
        edit: StructuralEdit,
    ) -> Result<(), CommitError> {
        let draft = self.draft.as_mut().ok_or(CommitError::NoSelection)?;
        let node = surface
            .node(draft.node_id)
            .ok_or(CommitError::Graph(GraphError::NodeNotFound(draft.node_id)))?;

        let catalog = surface.catalog();
        let default_type = surface.registry().default_type_name().to_string();
        let mut committed = node.payload.clone();
        edit.apply(&mut committed, &catalog, &default_type)?;

        if let Err(err) = surface.commit_payload(draft.node_id, committed.clone()) {
            let err = CommitError::from(err);
            if let CommitError::Schema(schema) = &err {
                draft.error = Some(schema.clone());
            }
            return Err(err);
        }
        tracing::debug!("Applied {:?} to node {}", edit, draft.node_id);

        if edit.apply(&mut draft.payload, &catalog, &default_type).is_err() {
            draft.payload = committed.clone();
        }
        draft.captured = committed;
        Ok(())
    }

    /// Panel sections for the open draft
    pub fn layout(&self) -> Option<PanelLayout> {
        self.draft.as_ref().map(|d| PanelLayout::for_payload(&d.payload))
    }

    /// Picker for a parameter's bound object
    pub fn parameter_picker(&self, catalog: &ObjectCatalog, index: usize) -> Option<ObjectPicker> {
        let parameter = self.draft.as_ref()?.payload.parameters()?.get(index)?;
        Some(catalog.picker(parameter.value.as_deref()))
    }

    /// Picker for one slot of a binding
    pub fn binding_picker(
        &self,
        catalog: &ObjectCatalog,
        field: BindingField,
        index: usize,
        slot: BindingSlot,
    ) -> Option<ObjectPicker> {
        let payload = &self.draft.as_ref()?.payload;
        if slot == BindingSlot::Second && !payload.has_second_slot() {
            return None;
        }
        let binding = payload.bindings(field)?.get(index)?;
        Some(catalog.picker(binding.slot(slot)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::payload::ObjectData;
    use crate::schema::SchemaViolation;

    fn surface_with(kind: NodeKind) -> (GraphSurface, NodeId) {
        let mut surface = GraphSurface::default();
        let id = surface.create_node(kind, [0.0, 0.0]).unwrap().id;
        surface.select(Some(id)).unwrap();
        (surface, id)
    }

    fn add_object(surface: &mut GraphSurface, label: &str) -> NodeId {
        let id = surface.create_node(NodeKind::Object, [0.0, 0.0]).unwrap().id;
        surface
            .commit_payload(id, NodePayload::Object(ObjectData::new(label, "block")))
            .unwrap();
        id
    }

    #[test]
    fn test_policy_table() {
        assert_eq!(EditorField::Label.policy(), CommitPolicy::OnBlur);
        assert_eq!(EditorField::ParameterName.policy(), CommitPolicy::OnBlur);
        assert_eq!(EditorField::ParameterList.policy(), CommitPolicy::Immediately);
        assert_eq!(EditorField::BindingObject.policy(), CommitPolicy::Immediately);
        assert_eq!(TextField::ParameterType(0).field().policy(), CommitPolicy::OnBlur);
        assert_eq!(
            StructuralEdit::AddBinding(BindingField::Effects).field().policy(),
            CommitPolicy::Immediately
        );
    }

    #[test]
    fn test_unselected_without_selection() {
        let mut surface = GraphSurface::default();
        let mut editor = PropertyEditor::new();
        editor.sync(&surface);
        assert_eq!(editor.state(), EditorState::Unselected);
        assert_eq!(editor.commit_on_blur(&mut surface), Err(CommitError::NoSelection));
    }

    #[test]
    fn test_text_edit_waits_for_blur() {
        let (mut surface, id) = surface_with(NodeKind::Type);
        let mut editor = PropertyEditor::new();
        editor.sync(&surface);

        editor.edit_text(TextField::Label, "block").unwrap();
        assert_eq!(surface.node(id).map(Node::label), Some("New type"));
        assert!(editor.draft().is_some_and(Draft::is_dirty));

        editor.commit_on_blur(&mut surface).unwrap();
        assert_eq!(surface.node(id).map(Node::label), Some("block"));
        assert!(editor.draft().is_some_and(|d| !d.is_dirty()));
    }

    #[test]
    fn test_reselect_discards_draft() {
        let (mut surface, n) = surface_with(NodeKind::Predicate);
        let m = surface.create_node(NodeKind::Action, [0.0, 0.0]).unwrap().id;
        let mut editor = PropertyEditor::new();
        editor.sync(&surface);

        editor.edit_text(TextField::Label, "on-top").unwrap();
        surface.select(Some(m)).unwrap();
        editor.sync(&surface);

        assert_eq!(surface.node(n).map(Node::label), Some("New predicate"));
        assert_eq!(editor.draft().map(Draft::node_id), Some(m));

        surface.select(Some(n)).unwrap();
        editor.sync(&surface);
        assert_eq!(editor.draft().and_then(|d| d.text(TextField::Label)), Some("New predicate"));
    }

    #[test]
    fn test_add_parameter_commits_immediately() {
        let (mut surface, id) = surface_with(NodeKind::Predicate);
        add_object(&mut surface, "a");
        let mut editor = PropertyEditor::new();
        editor.sync(&surface);

        editor.commit_immediately(&mut surface, StructuralEdit::AddParameter).unwrap();

        let params = surface.node(id).and_then(|n| n.payload.parameters()).unwrap();
        assert_eq!(params, &[Parameter::new("?param1", "object").with_value("a")]);
        assert_eq!(editor.draft().map(Draft::payload), surface.node(id).map(|n| &n.payload));
    }

    #[test]
    fn test_structural_edit_keeps_pending_text() {
        let (mut surface, id) = surface_with(NodeKind::Action);
        let mut editor = PropertyEditor::new();
        editor.sync(&surface);

        editor.edit_text(TextField::Label, "stack").unwrap();
        editor
            .commit_immediately(&mut surface, StructuralEdit::AddBinding(BindingField::Effects))
            .unwrap();

        let node = surface.node(id).unwrap();
        assert_eq!(node.label(), "New action");
        assert_eq!(node.payload.bindings(BindingField::Effects), Some(&[ObjectPair::single("")][..]));

        // a frame later the editor must not treat its own commit as external
        editor.sync(&surface);
        let draft = editor.draft().unwrap();
        assert_eq!(draft.text(TextField::Label), Some("stack"));
        assert_eq!(draft.payload().bindings(BindingField::Effects).map(<[_]>::len), Some(1));
    }

    #[test]
    fn test_schema_violation_keeps_draft() {
        let (mut surface, id) = surface_with(NodeKind::Predicate);
        let mut editor = PropertyEditor::new();
        editor.sync(&surface);
        editor.commit_immediately(&mut surface, StructuralEdit::AddParameter).unwrap();

        editor.edit_text(TextField::ParameterName(0), "").unwrap();
        let err = editor.commit_on_blur(&mut surface).unwrap_err();
        assert!(matches!(err, CommitError::Schema(_)));

        let draft = editor.draft().unwrap();
        assert!(draft.is_dirty());
        assert_eq!(
            draft.error().map(|e| e.violations.clone()),
            Some(vec![SchemaViolation::EmptyParameterName { index: 0 }])
        );
        let committed = surface.node(id).and_then(|n| n.payload.parameters()).unwrap();
        assert_eq!(committed[0].name, "?param1");

        editor.edit_text(TextField::ParameterName(0), "?x").unwrap();
        editor.commit_on_blur(&mut surface).unwrap();
        assert!(editor.draft().and_then(Draft::error).is_none());
    }

    #[test]
    fn test_external_change_recaptures() {
        let (mut surface, id) = surface_with(NodeKind::Object);
        let mut editor = PropertyEditor::new();
        editor.sync(&surface);
        editor.edit_text(TextField::ObjectType, "blo").unwrap();

        surface
            .commit_payload(id, NodePayload::Object(ObjectData::new("a", "block")))
            .unwrap();
        editor.sync(&surface);

        let draft = editor.draft().unwrap();
        assert!(!draft.is_dirty());
        assert_eq!(draft.text(TextField::ObjectType), Some("block"));
    }

    #[test]
    fn test_deleting_selection_unselects() {
        let (mut surface, id) = surface_with(NodeKind::Type);
        let mut editor = PropertyEditor::new();
        editor.sync(&surface);
        surface.delete_node(id).unwrap();
        editor.sync(&surface);
        assert_eq!(editor.state(), EditorState::Unselected);
    }

    #[test]
    fn test_removing_parameter_clears_second_objects() {
        let (mut surface, id) = surface_with(NodeKind::Predicate);
        add_object(&mut surface, "a");
        add_object(&mut surface, "b");
        let mut editor = PropertyEditor::new();
        editor.sync(&surface);

        editor.commit_immediately(&mut surface, StructuralEdit::AddParameter).unwrap();
        editor.commit_immediately(&mut surface, StructuralEdit::AddParameter).unwrap();
        editor
            .commit_immediately(&mut surface, StructuralEdit::AddBinding(BindingField::Bindings))
            .unwrap();
        editor
            .commit_immediately(
                &mut surface,
                StructuralEdit::BindObject {
                    field: BindingField::Bindings,
                    index: 0,
                    slot: BindingSlot::Second,
                    label: "b".to_string(),
                },
            )
            .unwrap();
        assert!(editor.layout().is_some_and(|l| l.shows_second_object));

        editor.commit_immediately(&mut surface, StructuralEdit::RemoveParameter(1)).unwrap();
        let bindings = surface.node(id).and_then(|n| n.payload.bindings(BindingField::Bindings)).unwrap();
        assert_eq!(bindings, &[ObjectPair::single("a")]);
        assert!(editor.layout().is_some_and(|l| !l.shows_second_object));
        let catalog = surface.catalog();
        assert!(editor
            .binding_picker(&catalog, BindingField::Bindings, 0, BindingSlot::Second)
            .is_none());
    }

    #[test]
    fn test_second_slot_rejected_for_unary_owner() {
        let (mut surface, id) = surface_with(NodeKind::Action);
        add_object(&mut surface, "a");
        let mut editor = PropertyEditor::new();
        editor.sync(&surface);
        editor.commit_immediately(&mut surface, StructuralEdit::AddParameter).unwrap();
        editor
            .commit_immediately(&mut surface, StructuralEdit::AddBinding(BindingField::Preconditions))
            .unwrap();
        let before = surface.node(id).map(|n| n.payload.clone());

        let err = editor
            .commit_immediately(
                &mut surface,
                StructuralEdit::BindObject {
                    field: BindingField::Preconditions,
                    index: 0,
                    slot: BindingSlot::Second,
                    label: "a".to_string(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, CommitError::Schema(_)));
        assert_eq!(surface.node(id).map(|n| n.payload.clone()), before);
    }

    #[test]
    fn test_unknown_object_rejected() {
        let (mut surface, _) = surface_with(NodeKind::Predicate);
        let mut editor = PropertyEditor::new();
        editor.sync(&surface);
        editor.commit_immediately(&mut surface, StructuralEdit::AddParameter).unwrap();

        let err = editor
            .commit_immediately(
                &mut surface,
                StructuralEdit::BindParameter {
                    index: 0,
                    label: Some("ghost".to_string()),
                },
            )
            .unwrap_err();
        assert_eq!(err, CommitError::UnknownObject("ghost".to_string()));
    }

    #[test]
    fn test_layout_per_kind() {
        let registry = crate::schema::NodeRegistry::planning();
        let object = PanelLayout::for_payload(&registry.default_payload(NodeKind::Object));
        assert!(object.shows_object_type && !object.shows_parameters);
        assert!(object.binding_fields.is_empty());

        let action = PanelLayout::for_payload(&registry.default_payload(NodeKind::Action));
        assert!(action.shows_parameters && !action.shows_object_type);
        assert_eq!(action.binding_fields, &[BindingField::Preconditions, BindingField::Effects]);

        let ty = PanelLayout::for_payload(&registry.default_payload(NodeKind::Type));
        assert!(!ty.shows_parameters && !ty.shows_object_type && !ty.shows_second_object);
    }

    #[test]
    fn test_empty_catalog_picker() {
        let (mut surface, _) = surface_with(NodeKind::Predicate);
        let mut editor = PropertyEditor::new();
        editor.sync(&surface);
        editor.commit_immediately(&mut surface, StructuralEdit::AddParameter).unwrap();
        editor
            .commit_immediately(&mut surface, StructuralEdit::AddBinding(BindingField::Bindings))
            .unwrap();

        let catalog = surface.catalog();
        let picker = editor.parameter_picker(&catalog, 0).unwrap();
        assert!(picker.is_disabled());
        assert!(picker.hint().is_some());
        let picker = editor
            .binding_picker(&catalog, BindingField::Bindings, 0, BindingSlot::First)
            .unwrap();
        assert_eq!(picker.selected_text(), "No objects available");
    }

    #[test]
    fn test_object_type_not_on_predicate() {
        let (surface, _) = surface_with(NodeKind::Predicate);
        let mut editor = PropertyEditor::new();
        editor.sync(&surface);
        assert!(matches!(
            editor.edit_text(TextField::ObjectType, "block"),
            Err(CommitError::NotApplicable { .. })
        ));
    }
}
