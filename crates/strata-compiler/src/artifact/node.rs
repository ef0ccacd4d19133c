//! JSON shape of artifact documents.
//!
//! Nodes borrow from the IR; nothing is copied until serialization.

use serde::Serialize;
use serde_json::Value as Json;

use crate::ir::{Argument, Definition, Metadata, Selection, Value, VariableDefinition};
use crate::schema::Schema;

use super::{Artifact, ArtifactKind, RequestParameters};

#[derive(Debug, Serialize)]
#[serde(tag = "kind")]
pub enum ArtifactNode<'a> {
    Request {
        fragment: Box<ArtifactNode<'a>>,
        operation: Box<ArtifactNode<'a>>,
        params: &'a RequestParameters,
    },
    Fragment(DefinitionNode<'a>),
    Operation(DefinitionNode<'a>),
    SplitOperation(DefinitionNode<'a>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionNode<'a> {
    pub name: &'a str,
    #[serde(rename = "type")]
    pub type_name: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub argument_definitions: Vec<ArgumentDefinitionNode<'a>>,
    #[serde(skip_serializing_if = "is_empty")]
    pub metadata: &'a Metadata,
    pub selections: Vec<SelectionNode<'a>>,
}

fn is_empty(metadata: &&Metadata) -> bool {
    metadata.is_empty()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentDefinitionNode<'a> {
    pub kind: &'static str,
    pub name: &'a str,
    #[serde(rename = "type")]
    pub ty: String,
    pub default_value: Json,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum SelectionNode<'a> {
    ScalarField {
        alias: Option<&'a str>,
        name: &'a str,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        args: Vec<ArgumentNode<'a>>,
    },
    LinkedField {
        alias: Option<&'a str>,
        name: &'a str,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        args: Vec<ArgumentNode<'a>>,
        /// Set when the field's type is an object type.
        concrete_type: Option<&'a str>,
        plural: bool,
        selections: Vec<SelectionNode<'a>>,
    },
    FragmentSpread {
        name: &'a str,
    },
    InlineFragment {
        #[serde(rename = "type")]
        type_condition: Option<&'a str>,
        selections: Vec<SelectionNode<'a>>,
    },
    Condition {
        condition: Json,
        passing_value: bool,
        selections: Vec<SelectionNode<'a>>,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum ArgumentNode<'a> {
    Literal { name: &'a str, value: Json },
    Variable { name: &'a str, variable_name: &'a str },
}

pub(super) fn artifact_node<'a>(artifact: &'a Artifact, schema: &'a Schema) -> ArtifactNode<'a> {
    let reader = definition_node(&artifact.definition, schema);
    match (artifact.kind, &artifact.operation, &artifact.params) {
        (ArtifactKind::Request, Some(operation), Some(params)) => ArtifactNode::Request {
            fragment: Box::new(ArtifactNode::Fragment(reader)),
            operation: Box::new(ArtifactNode::Operation(definition_node(operation, schema))),
            params,
        },
        (ArtifactKind::SplitOperation, ..) => ArtifactNode::SplitOperation(reader),
        _ => ArtifactNode::Fragment(reader),
    }
}

fn definition_node<'a>(definition: &'a Definition, schema: &'a Schema) -> DefinitionNode<'a> {
    let variables: &[VariableDefinition] = match definition {
        Definition::Operation(op) => &op.variables,
        Definition::Fragment(_) => &[],
    };
    DefinitionNode {
        name: definition.name(),
        type_name: definition.type_name(),
        argument_definitions: variables
            .iter()
            .map(|var| ArgumentDefinitionNode {
                kind: "LocalArgument",
                name: &var.name,
                ty: var.ty.to_string(),
                default_value: var.default_value.as_ref().map_or(Json::Null, Value::to_json),
            })
            .collect(),
        metadata: definition.metadata(),
        selections: selection_nodes(definition.selections(), schema),
    }
}

fn selection_nodes<'a>(selections: &'a [Selection], schema: &'a Schema) -> Vec<SelectionNode<'a>> {
    selections
        .iter()
        .map(|selection| match selection {
            Selection::Field(field) if field.is_linked() => {
                let ty = field.ty.name();
                SelectionNode::LinkedField {
                    alias: field.alias.as_deref(),
                    name: &field.name,
                    args: argument_nodes(&field.arguments),
                    concrete_type: (!schema.is_abstract(ty)).then_some(ty),
                    plural: field.ty.nullable().is_list(),
                    selections: selection_nodes(&field.selections, schema),
                }
            }
            Selection::Field(field) => SelectionNode::ScalarField {
                alias: field.alias.as_deref(),
                name: &field.name,
                args: argument_nodes(&field.arguments),
            },
            Selection::FragmentSpread(spread) => SelectionNode::FragmentSpread {
                name: &spread.name,
            },
            Selection::InlineFragment(inline) => SelectionNode::InlineFragment {
                type_condition: inline.type_condition.as_deref(),
                selections: selection_nodes(&inline.selections, schema),
            },
            Selection::Condition(condition) => SelectionNode::Condition {
                condition: match &condition.condition {
                    Value::Variable(name) => Json::String(name.clone()),
                    other => other.to_json(),
                },
                passing_value: condition.passing_value,
                selections: selection_nodes(&condition.selections, schema),
            },
        })
        .collect()
}

fn argument_nodes(arguments: &[Argument]) -> Vec<ArgumentNode<'_>> {
    arguments
        .iter()
        .map(|arg| match &arg.value {
            Value::Variable(variable) => ArgumentNode::Variable {
                name: &arg.name,
                variable_name: variable,
            },
            value => ArgumentNode::Literal {
                name: &arg.name,
                value: value.to_json(),
            },
        })
        .collect()
}
