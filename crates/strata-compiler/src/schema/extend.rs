//! Client schema extensions.
//!
//! Extensions come from two places: standalone extension files configured for
//! the project, and type-system definitions that live next to operations in
//! project documents. Both are applied together so that one can reference
//! types declared by the other.

use super::{Schema, SchemaBuilder};
use crate::Result;
use crate::document_store::Document;
use crate::source_map::{SourceId, SourceMap};

/// Return a new schema with every extension applied on top of `base`.
///
/// `base` is left untouched. Types, fields, and directives added here are
/// marked as client extensions. With nothing to apply, the result equals
/// `base`.
pub fn extend_schema(
    base: &Schema,
    sources: &SourceMap,
    extensions: &[SourceId],
    documents: &[&Document],
) -> Result<Schema> {
    let has_type_system = documents
        .iter()
        .any(|doc| doc.document().type_system_definitions().next().is_some());
    if extensions.is_empty() && !has_type_system {
        return Ok(base.clone());
    }

    let mut builder = SchemaBuilder::extending(sources, base);
    for id in extensions {
        builder = builder.add_source(*id)?;
    }
    for doc in documents {
        builder = builder.add_document(doc.source(), doc.document());
    }
    let schema = builder.finish()?;
    tracing::debug!(
        extensions = extensions.len(),
        documents = documents.len(),
        "schema extended"
    );
    Ok(schema)
}

impl Schema {
    /// Shorthand for [`extend_schema`] with extension sources only.
    pub fn extend(&self, sources: &SourceMap, extensions: &[SourceId]) -> Result<Schema> {
        extend_schema(self, sources, extensions, &[])
    }
}
