//! GraphQL embedded in JavaScript and TypeScript modules.
//!
//! A [`TagExtractor`] finds the tagged template literals of a module. Each
//! tag is registered in the [`DocumentStore`] as an embedded source, so
//! diagnostics inside a tag point into the enclosing file.
//! [`parse_module`] also checks that definitions are named after the module
//! that declares them.

mod template;

#[cfg(test)]
mod tags_tests;

use std::path::Path;

use strata_core::utils::module_name;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::document_store::{DocumentStore, Partition};
use crate::parser::OperationType;
use crate::source_map::{LineCol, SourceId};
use crate::{Error, Result};

pub use template::TemplateTagExtractor;

/// One GraphQL tag found in a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedTag {
    /// Tag contents, without the delimiters.
    pub text: String,
    /// Where the contents begin in the module, zero-based.
    pub start: LineCol,
    /// Object key the tag is assigned to, e.g. `user` in `user: graphql`...``.
    pub prop: Option<String>,
}

pub trait TagExtractor: Send + Sync {
    fn extract(&self, text: &str, path: &Path) -> Result<Vec<ExtractedTag>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleOptions {
    validate_names: bool,
}

impl ModuleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require operation and fragment names to carry the module name.
    pub fn validate_names(mut self, value: bool) -> Self {
        self.validate_names = value;
        self
    }
}

/// Extract the tags of the module at `path` and add them as project documents.
///
/// On any failure the module contributes nothing to the store.
pub fn parse_module(
    store: &mut DocumentStore,
    path: &Path,
    text: &str,
    extractor: &dyn TagExtractor,
    options: ModuleOptions,
) -> Result<Vec<SourceId>> {
    let tags = extractor.extract(text, path)?;
    tracing::trace!(path = %path.display(), tags = tags.len(), "extracted");

    let mut added = Vec::with_capacity(tags.len());
    let result = register(store, path, &tags, options, &mut added);
    if result.is_err() {
        store.remove_project(path);
    }
    result.map(|()| added)
}

fn register(
    store: &mut DocumentStore,
    path: &Path,
    tags: &[ExtractedTag],
    options: ModuleOptions,
    added: &mut Vec<SourceId>,
) -> Result<()> {
    for tag in tags {
        added.push(store.add_embedded(Partition::Project, path, tag.start, &tag.text)?);
    }

    let mut syntax = Diagnostics::new();
    for doc in store.project().iter().filter(|d| added.contains(&d.source())) {
        if doc.diagnostics().has_errors() {
            syntax.extend(doc.diagnostics().filtered());
        }
    }
    if syntax.has_errors() {
        return Err(Error::Parse(syntax));
    }

    if !options.validate_names {
        return Ok(());
    }

    let module = module_name(path);
    let mut diagnostics = Diagnostics::new();
    for (tag, source) in tags.iter().zip(added.iter().copied()) {
        let Some(doc) = store.project().iter().find(|d| d.source() == source) else {
            continue;
        };
        let document = doc.document();
        for op in document.operations() {
            let Some(name) = op.name() else {
                diagnostics
                    .report(
                        source,
                        DiagnosticKind::AnonymousOperationInModule,
                        op.as_cst().text_range(),
                    )
                    .emit();
                continue;
            };
            if !is_valid_operation_name(name.text(), &module, op.operation_type()) {
                diagnostics
                    .report(source, DiagnosticKind::OperationNameNotPrefixed, name.text_range())
                    .raw_message(format!(
                        "Operation names in graphql tags must be prefixed with the module name and end in \"Mutation\", \"Query\", or \"Subscription\". Got `{}` in module `{module}`.",
                        name.text()
                    ))
                    .emit();
            }
        }
        for fragment in document.fragments() {
            let Some(name) = fragment.name() else {
                continue;
            };
            match &tag.prop {
                Some(prop) => {
                    let expected = format!("{module}_{prop}");
                    if name.text() != expected {
                        diagnostics
                            .report(
                                source,
                                DiagnosticKind::ContainerFragmentName,
                                name.text_range(),
                            )
                            .raw_message(format!(
                                "Container fragment names must be `<ModuleName>_<propName>`. Got `{}`, expected `{expected}`.",
                                name.text()
                            ))
                            .emit();
                    }
                }
                None if !name.text().starts_with(&format!("{module}_")) => {
                    diagnostics
                        .report(source, DiagnosticKind::FragmentNameNotPrefixed, name.text_range())
                        .raw_message(format!(
                            "Fragment names in graphql tags must be prefixed with the module name. Got `{}` in module `{module}`.",
                            name.text()
                        ))
                        .emit();
                }
                None => {}
            }
        }
    }

    if diagnostics.has_errors() {
        return Err(Error::Validation(diagnostics));
    }
    Ok(())
}

fn is_valid_operation_name(name: &str, module: &str, kind: OperationType) -> bool {
    let suffix = match kind {
        OperationType::Query => "Query",
        OperationType::Mutation => "Mutation",
        OperationType::Subscription => "Subscription",
    };
    name.starts_with(module) && name.ends_with(suffix)
}
