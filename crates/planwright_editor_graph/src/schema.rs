// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node schema registry: default payloads and payload conformance checks.

use crate::handle::{self, Handle};
use crate::node::{Node, NodeKind};
use crate::payload::{
    ActionData, BindingField, NodePayload, ObjectData, ObjectPair, Parameter, PredicateData, TypeData,
};
use indexmap::IndexMap;
use std::fmt;

/// Type name given to new objects and parameters
pub const DEFAULT_TYPE_NAME: &str = "object";

/// Node type definition
#[derive(Debug, Clone)]
pub struct NodeType {
    /// Kind described
    pub kind: NodeKind,
    /// Display name
    pub name: &'static str,
    /// Description shown in the palette
    pub description: &'static str,
    /// Connection points
    pub handles: &'static [Handle],
    /// Type name used for new objects and parameters
    pub default_type_name: String,
}

impl NodeType {
    fn planning(kind: NodeKind, default_type_name: String) -> Self {
        let description = match kind {
            NodeKind::Type => "A domain type; connect it to the objects that instantiate it",
            NodeKind::Predicate => "A relation over typed parameters; feeds actions as a precondition",
            NodeKind::Action => "An operator with parameters, preconditions and effects",
            NodeKind::Object => "A problem object of some type, bindable from predicates and actions",
        };
        Self {
            kind,
            name: kind.name(),
            description,
            handles: handle::handles(kind),
            default_type_name,
        }
    }

    /// Payload for a freshly created node of this type
    pub fn default_payload(&self) -> NodePayload {
        let label = format!("New {}", self.name.to_lowercase());
        match self.kind {
            NodeKind::Type => NodePayload::Type(TypeData::new(label)),
            NodeKind::Object => NodePayload::Object(ObjectData::new(label, self.default_type_name.clone())),
            NodeKind::Predicate => NodePayload::Predicate(PredicateData {
                label,
                parameters: Vec::new(),
                bindings: Vec::new(),
                description: None,
            }),
            NodeKind::Action => NodePayload::Action(ActionData {
                label,
                parameters: Vec::new(),
                preconditions: Vec::new(),
                effects: Vec::new(),
                description: None,
            }),
        }
    }
}

/// Registry of the planning node types
pub struct NodeRegistry {
    /// Registered node types by kind
    types: IndexMap<NodeKind, NodeType>,
}

impl NodeRegistry {
    /// Create the registry of all four planning kinds
    pub fn planning() -> Self {
        Self::with_default_type_name(DEFAULT_TYPE_NAME)
    }

    /// Create the registry with a custom default type name for new objects and parameters
    pub fn with_default_type_name(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        let types = NodeKind::ALL
            .into_iter()
            .map(|kind| (kind, NodeType::planning(kind, type_name.clone())))
            .collect();
        Self { types }
    }

    /// Get a node type by kind
    pub fn get(&self, kind: NodeKind) -> Option<&NodeType> {
        self.types.get(&kind)
    }

    /// Get all registered types
    pub fn types(&self) -> impl Iterator<Item = &NodeType> {
        self.types.values()
    }

    /// Default payload for a kind
    pub fn default_payload(&self, kind: NodeKind) -> NodePayload {
        self.get(kind).map_or_else(
            || NodeType::planning(kind, DEFAULT_TYPE_NAME.to_string()).default_payload(),
            NodeType::default_payload,
        )
    }

    /// Create a node of a kind at a position
    pub fn create_node(&self, kind: NodeKind, position: [f32; 2]) -> Node {
        Node::new(self.default_payload(kind)).with_position(position[0], position[1])
    }

    /// Type name used for new parameters
    pub fn default_type_name(&self) -> &str {
        self.types
            .values()
            .next()
            .map_or(DEFAULT_TYPE_NAME, |t| t.default_type_name.as_str())
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::planning()
    }
}

/// A single schema rule broken by a payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    /// Payload variant does not belong to the declared kind
    KindMismatch {
        /// Declared kind
        expected: NodeKind,
        /// Kind of the payload
        found: NodeKind,
    },
    /// Label is blank
    EmptyLabel,
    /// Object type name is blank
    EmptyObjectType,
    /// A parameter has a blank name
    EmptyParameterName {
        /// Parameter index
        index: usize,
    },
    /// A parameter has a blank type
    EmptyParameterType {
        /// Parameter index
        index: usize,
    },
    /// A binding fills the second slot although the owner has at most one parameter
    UnexpectedSecondObject {
        /// Binding sequence
        field: BindingField,
        /// Binding index
        index: usize,
    },
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KindMismatch { expected, found } => {
                write!(f, "expected a {expected} payload, found a {found} payload")
            }
            Self::EmptyLabel => f.write_str("name must not be empty"),
            Self::EmptyObjectType => f.write_str("object type must not be empty"),
            Self::EmptyParameterName { index } => write!(f, "parameter {} has no name", index + 1),
            Self::EmptyParameterType { index } => write!(f, "parameter {} has no type", index + 1),
            Self::UnexpectedSecondObject { field, index } => write!(
                f,
                "{} entry {} binds a second object but only one parameter is declared",
                field.name(),
                index + 1
            ),
        }
    }
}

/// Payload does not conform to its kind's schema
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} payload violates its schema: {}", join(.violations))]
pub struct SchemaError {
    /// Kind checked against
    pub kind: NodeKind,
    /// Every rule broken, in payload order
    pub violations: Vec<SchemaViolation>,
}

fn join(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Check that a payload conforms to the schema of `kind`
pub fn validate(kind: NodeKind, payload: &NodePayload) -> Result<(), SchemaError> {
    let mut violations = Vec::new();

    if payload.kind() != kind {
        violations.push(SchemaViolation::KindMismatch {
            expected: kind,
            found: payload.kind(),
        });
        return Err(SchemaError { kind, violations });
    }

    if is_blank(payload.label()) {
        violations.push(SchemaViolation::EmptyLabel);
    }

    match payload {
        NodePayload::Type(_) => {}
        NodePayload::Object(data) => {
            if is_blank(&data.type_name) {
                violations.push(SchemaViolation::EmptyObjectType);
            }
        }
        NodePayload::Predicate(data) => {
            check_parameters(&data.parameters, &mut violations);
            check_bindings(BindingField::Bindings, &data.bindings, data.parameters.len(), &mut violations);
        }
        NodePayload::Action(data) => {
            check_parameters(&data.parameters, &mut violations);
            let arity = data.parameters.len();
            check_bindings(BindingField::Preconditions, &data.preconditions, arity, &mut violations);
            check_bindings(BindingField::Effects, &data.effects, arity, &mut violations);
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(SchemaError { kind, violations })
    }
}

fn check_parameters(parameters: &[Parameter], violations: &mut Vec<SchemaViolation>) {
    for (index, parameter) in parameters.iter().enumerate() {
        if is_blank(&parameter.name) {
            violations.push(SchemaViolation::EmptyParameterName { index });
        }
        if is_blank(&parameter.type_name) {
            violations.push(SchemaViolation::EmptyParameterType { index });
        }
    }
}

fn check_bindings(
    field: BindingField,
    bindings: &[ObjectPair],
    arity: usize,
    violations: &mut Vec<SchemaViolation>,
) {
    if arity > 1 {
        return;
    }
    for (index, binding) in bindings.iter().enumerate() {
        if binding.object2.is_some() {
            violations.push(SchemaViolation::UnexpectedSecondObject { field, index });
        }
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_payloads_conform() {
        let registry = NodeRegistry::planning();
        for kind in NodeKind::ALL {
            let payload = registry.default_payload(kind);
            assert_eq!(payload.kind(), kind);
            assert!(validate(kind, &payload).is_ok(), "default {kind} payload should conform");
        }
    }

    #[test]
    fn test_default_labels_and_types() {
        let registry = NodeRegistry::planning();
        assert_eq!(registry.default_payload(NodeKind::Action).label(), "New action");
        assert_eq!(registry.default_payload(NodeKind::Object).object_type(), Some("object"));

        let registry = NodeRegistry::with_default_type_name("thing");
        assert_eq!(registry.default_payload(NodeKind::Object).object_type(), Some("thing"));
        assert_eq!(registry.default_type_name(), "thing");
    }

    #[test]
    fn test_kind_mismatch() {
        let payload = NodePayload::Type(TypeData::new("block"));
        let err = validate(NodeKind::Object, &payload).unwrap_err();
        assert_eq!(
            err.violations,
            vec![SchemaViolation::KindMismatch {
                expected: NodeKind::Object,
                found: NodeKind::Type,
            }]
        );
    }

    #[test]
    fn test_all_violations_reported() {
        let payload = NodePayload::Predicate(PredicateData {
            label: "  ".to_string(),
            parameters: vec![Parameter::new("", "block")],
            bindings: vec![ObjectPair::pair("a", "b")],
            description: None,
        });
        let err = validate(NodeKind::Predicate, &payload).unwrap_err();
        assert_eq!(
            err.violations,
            vec![
                SchemaViolation::EmptyLabel,
                SchemaViolation::EmptyParameterName { index: 0 },
                SchemaViolation::UnexpectedSecondObject {
                    field: BindingField::Bindings,
                    index: 0,
                },
            ]
        );
        assert!(err.to_string().contains("parameter 1 has no name"));
    }

    #[test]
    fn test_binary_predicate_may_bind_two_objects() {
        let payload = NodePayload::Predicate(PredicateData {
            label: "on-top".to_string(),
            parameters: vec![Parameter::new("?x", "block"), Parameter::new("?y", "block")],
            bindings: vec![ObjectPair::pair("a", "b"), ObjectPair::single("c")],
            description: None,
        });
        assert!(validate(NodeKind::Predicate, &payload).is_ok());
    }

    #[test]
    fn test_empty_placeholder_binding_is_valid() {
        let payload = NodePayload::Action(ActionData {
            label: "pick-up".to_string(),
            parameters: vec![Parameter::new("?x", "block")],
            preconditions: vec![ObjectPair::single("")],
            effects: vec![],
            description: None,
        });
        assert!(validate(NodeKind::Action, &payload).is_ok());
    }

    #[test]
    fn test_object_type_required() {
        let payload = NodePayload::Object(ObjectData::new("a", " "));
        let err = validate(NodeKind::Object, &payload).unwrap_err();
        assert_eq!(err.violations, vec![SchemaViolation::EmptyObjectType]);
    }
}
