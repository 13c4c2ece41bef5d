// SPDX-License-Identifier: MIT OR Apache-2.0
//! Kind-specific node payloads.
//!
//! Each node kind has exactly one payload shape. The shapes are modelled as
//! variants of [`NodePayload`] so every consumer matches exhaustively over the
//! four kinds. Deserialization rejects unknown fields.

use crate::node::NodeKind;
use serde::{Deserialize, Serialize};

/// Payload of a `Type` node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeData {
    /// Type name
    pub label: String,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TypeData {
    /// Create type data with the given label
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: None,
        }
    }
}

/// Payload of an `Object` node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectData {
    /// Object name
    pub label: String,
    /// Name of the object's type
    #[serde(rename = "type")]
    pub type_name: String,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ObjectData {
    /// Create object data with the given label and type name
    pub fn new(label: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            type_name: type_name.into(),
            description: None,
        }
    }
}

/// A typed parameter of a predicate or action (`?x - block`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Parameter {
    /// Variable name, conventionally `?`-prefixed
    pub name: String,
    /// Type label
    #[serde(rename = "type")]
    pub type_name: String,
    /// Bound object label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Parameter {
    /// Create an unbound parameter
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            value: None,
        }
    }

    /// Bind the parameter to an object label
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// One or two catalog objects assigned to a predicate's parameter slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectPair {
    /// First bound object label (empty when nothing was available to bind)
    pub object1: String,
    /// Second bound object label, only for predicates with more than one parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object2: Option<String>,
}

impl ObjectPair {
    /// Create a binding with a single object
    pub fn single(object1: impl Into<String>) -> Self {
        Self {
            object1: object1.into(),
            object2: None,
        }
    }

    /// Create a binding with two objects
    pub fn pair(object1: impl Into<String>, object2: impl Into<String>) -> Self {
        Self {
            object1: object1.into(),
            object2: Some(object2.into()),
        }
    }

    /// Get the label bound in a slot
    pub fn slot(&self, slot: BindingSlot) -> Option<&str> {
        match slot {
            BindingSlot::First => Some(self.object1.as_str()),
            BindingSlot::Second => self.object2.as_deref(),
        }
    }
}

/// Payload of a `Predicate` node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PredicateData {
    /// Predicate name
    pub label: String,
    /// Ordered parameters
    pub parameters: Vec<Parameter>,
    /// Ordered object assignments
    pub bindings: Vec<ObjectPair>,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Payload of an `Action` node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionData {
    /// Action name
    pub label: String,
    /// Ordered parameters
    pub parameters: Vec<Parameter>,
    /// Ordered precondition bindings
    pub preconditions: Vec<ObjectPair>,
    /// Ordered effect bindings
    pub effects: Vec<ObjectPair>,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Which binding sequence of a payload is addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BindingField {
    /// A predicate's object assignments
    Bindings,
    /// An action's preconditions
    Preconditions,
    /// An action's effects
    Effects,
}

impl BindingField {
    /// Display name for the field
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bindings => "Object Assignment",
            Self::Preconditions => "Preconditions",
            Self::Effects => "Effects",
        }
    }
}

/// Slot of an [`ObjectPair`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingSlot {
    /// `object1`
    First,
    /// `object2`
    Second,
}

/// Kind-specific node data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum NodePayload {
    /// `Type` node data
    Type(TypeData),
    /// `Predicate` node data
    Predicate(PredicateData),
    /// `Action` node data
    Action(ActionData),
    /// `Object` node data
    Object(ObjectData),
}

impl NodePayload {
    /// The kind this payload belongs to
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Type(_) => NodeKind::Type,
            Self::Predicate(_) => NodeKind::Predicate,
            Self::Action(_) => NodeKind::Action,
            Self::Object(_) => NodeKind::Object,
        }
    }

    /// Label of the node
    pub fn label(&self) -> &str {
        match self {
            Self::Type(d) => &d.label,
            Self::Predicate(d) => &d.label,
            Self::Action(d) => &d.label,
            Self::Object(d) => &d.label,
        }
    }

    /// Mutable label of the node
    pub fn label_mut(&mut self) -> &mut String {
        match self {
            Self::Type(d) => &mut d.label,
            Self::Predicate(d) => &mut d.label,
            Self::Action(d) => &mut d.label,
            Self::Object(d) => &mut d.label,
        }
    }

    /// Description of the node
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Type(d) => d.description.as_deref(),
            Self::Predicate(d) => d.description.as_deref(),
            Self::Action(d) => d.description.as_deref(),
            Self::Object(d) => d.description.as_deref(),
        }
    }

    /// Mutable description slot
    pub fn description_mut(&mut self) -> &mut Option<String> {
        match self {
            Self::Type(d) => &mut d.description,
            Self::Predicate(d) => &mut d.description,
            Self::Action(d) => &mut d.description,
            Self::Object(d) => &mut d.description,
        }
    }

    /// Parameters, for predicates and actions
    pub fn parameters(&self) -> Option<&[Parameter]> {
        match self {
            Self::Predicate(d) => Some(&d.parameters),
            Self::Action(d) => Some(&d.parameters),
            Self::Type(_) | Self::Object(_) => None,
        }
    }

    /// Mutable parameters, for predicates and actions
    pub fn parameters_mut(&mut self) -> Option<&mut Vec<Parameter>> {
        match self {
            Self::Predicate(d) => Some(&mut d.parameters),
            Self::Action(d) => Some(&mut d.parameters),
            Self::Type(_) | Self::Object(_) => None,
        }
    }

    /// Binding fields this payload carries
    pub fn binding_fields(&self) -> &'static [BindingField] {
        match self {
            Self::Predicate(_) => &[BindingField::Bindings],
            Self::Action(_) => &[BindingField::Preconditions, BindingField::Effects],
            Self::Type(_) | Self::Object(_) => &[],
        }
    }

    /// A binding sequence, if this payload has it
    pub fn bindings(&self, field: BindingField) -> Option<&[ObjectPair]> {
        match (self, field) {
            (Self::Predicate(d), BindingField::Bindings) => Some(&d.bindings),
            (Self::Action(d), BindingField::Preconditions) => Some(&d.preconditions),
            (Self::Action(d), BindingField::Effects) => Some(&d.effects),
            _ => None,
        }
    }

    /// A mutable binding sequence, if this payload has it
    pub fn bindings_mut(&mut self, field: BindingField) -> Option<&mut Vec<ObjectPair>> {
        match (self, field) {
            (Self::Predicate(d), BindingField::Bindings) => Some(&mut d.bindings),
            (Self::Action(d), BindingField::Preconditions) => Some(&mut d.preconditions),
            (Self::Action(d), BindingField::Effects) => Some(&mut d.effects),
            _ => None,
        }
    }

    /// Type name, for objects
    pub fn object_type(&self) -> Option<&str> {
        match self {
            Self::Object(d) => Some(&d.type_name),
            _ => None,
        }
    }

    /// Mutable type name, for objects
    pub fn object_type_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::Object(d) => Some(&mut d.type_name),
            _ => None,
        }
    }

    /// Whether bindings of this payload may fill the second slot
    pub fn has_second_slot(&self) -> bool {
        self.parameters().is_some_and(|p| p.len() > 1)
    }
}
