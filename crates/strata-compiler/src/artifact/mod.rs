//! Artifacts: one compiled unit per definition of the artifact context.
//!
//! Operations become `Request` artifacts. They carry the reader tree from the
//! artifact context, the normalization tree from the query-execution context
//! and the request parameters with the printed query text. Fragments become
//! `Fragment` artifacts. Operations derived by `split_deferred` become
//! `SplitOperation` artifacts flagged `deferred`; they are recorded but never
//! written on their own.

mod node;

#[cfg(test)]
mod artifact_tests;

use std::collections::BTreeSet;

use serde::Serialize;

use crate::ir::{Definition, Location, print_definition};
use crate::parser::OperationType;
use crate::schema::Schema;
use crate::transform::Contexts;
use crate::{Error, Result};

pub use node::{
    ArgumentDefinitionNode, ArgumentNode, ArtifactNode, DefinitionNode, SelectionNode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ArtifactKind {
    Request,
    Fragment,
    SplitOperation,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Request => "Request",
            ArtifactKind::Fragment => "Fragment",
            ArtifactKind::SplitOperation => "SplitOperation",
        }
    }
}

/// What a client needs to send a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestParameters {
    /// Persisted id. Set once the text has been persisted.
    pub id: Option<String>,
    pub name: String,
    #[serde(serialize_with = "serialize_operation_kind")]
    pub operation_kind: OperationType,
    /// Printed query text. Dropped once the request is persisted.
    pub text: Option<String>,
}

fn serialize_operation_kind<S: serde::Serializer>(
    kind: &OperationType,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(kind.as_str())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub name: String,
    pub kind: ArtifactKind,
    pub deferred: bool,
    /// Reader tree, from the artifact context.
    pub definition: Definition,
    /// Normalization tree, from the query-execution context. Requests only.
    pub operation: Option<Definition>,
    pub params: Option<RequestParameters>,
}

impl Artifact {
    /// Deferred artifacts ride along with their parent request.
    pub fn is_writable(&self) -> bool {
        !self.deferred
    }

    pub fn location(&self) -> &Location {
        self.definition.location()
    }

    /// Query text sent to the server, if this is an unpersisted request.
    pub fn request_text(&self) -> Option<&str> {
        self.params.as_ref().and_then(|p| p.text.as_deref())
    }

    /// Replace the request text with its persisted id.
    pub fn persisted(mut self, id: impl Into<String>) -> Self {
        if let Some(params) = &mut self.params {
            params.id = Some(id.into());
            params.text = None;
        }
        self
    }

    /// The serializable document node written into the generated module.
    pub fn node<'a>(&'a self, schema: &'a Schema) -> ArtifactNode<'a> {
        node::artifact_node(self, schema)
    }

    pub fn to_json(&self, schema: &Schema) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.node(schema))?)
    }
}

/// Build artifacts for every definition of the artifact context that is not
/// a base-only name. Returned in the context's order.
pub fn compile_artifacts(
    contexts: &Contexts,
    base_names: &BTreeSet<String>,
) -> Result<Vec<Artifact>> {
    let _span = tracing::debug_span!("compile_artifacts").entered();
    let mut artifacts = Vec::new();

    for definition in contexts.artifact.definitions() {
        let name = definition.name();
        if base_names.contains(name) {
            continue;
        }
        let deferred = definition
            .metadata()
            .get("deferred")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);

        let artifact = match definition {
            Definition::Fragment(_) => Artifact {
                name: name.to_string(),
                kind: ArtifactKind::Fragment,
                deferred,
                definition: definition.clone(),
                operation: None,
                params: None,
            },
            Definition::Operation(_) if deferred => Artifact {
                name: name.to_string(),
                kind: ArtifactKind::SplitOperation,
                deferred,
                definition: definition.clone(),
                operation: None,
                params: None,
            },
            Definition::Operation(op) => {
                let Some(normalization) = contexts.query_execution.get(name) else {
                    return Err(Error::Artifact {
                        name: name.to_string(),
                        message: "missing from the query-execution context".to_string(),
                    });
                };
                Artifact {
                    name: name.to_string(),
                    kind: ArtifactKind::Request,
                    deferred,
                    definition: definition.clone(),
                    operation: Some(normalization.clone()),
                    params: Some(RequestParameters {
                        id: None,
                        name: op.name.clone(),
                        operation_kind: op.kind,
                        text: Some(print_definition(normalization)),
                    }),
                }
            }
        };

        if artifact.is_writable() && !contexts.type_generation.contains(name) {
            return Err(Error::Artifact {
                name: name.to_string(),
                message: "missing from the type-generation context".to_string(),
            });
        }
        artifacts.push(artifact);
    }

    tracing::debug!(artifacts = artifacts.len(), "compiled artifacts");
    Ok(artifacts)
}
