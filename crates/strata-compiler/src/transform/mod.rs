//! Context transforms and the pipelines that chain them.
//!
//! A transform is a pure function from one [`CompilerContext`] to the next.
//! A [`Pipeline`] applies its transforms strictly left to right; it never
//! reorders them and never runs two at once. Applying several pipelines to
//! the same context yields independent results.

mod client_extensions;
mod flatten;
mod inline_fragments;
mod skip_redundant;
mod skip_unreachable;
mod split_deferred;
mod typename;

#[cfg(test)]
mod transform_tests;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::context::CompilerContext;
use crate::ir::Selection;
use crate::reporter::Reporter;
use crate::schema::Schema;
use crate::{Error, Result};

pub use client_extensions::{filter_directives, skip_client_extensions};
pub use flatten::flatten;
pub use inline_fragments::inline_fragments;
pub use skip_redundant::skip_redundant_nodes;
pub use skip_unreachable::skip_unreachable;
pub use split_deferred::{DEFER_SEPARATOR, split_deferred};
pub use typename::generate_typename;

pub const TYPE_GENERATION: &str = "type-generation";
pub const QUERY_EXECUTION: &str = "query-execution";
pub const ARTIFACT: &str = "artifact";

type TransformFn = dyn Fn(&CompilerContext) -> Result<CompilerContext> + Send + Sync;

/// A named context transform.
#[derive(Clone)]
pub struct Transform {
    name: String,
    run: Arc<TransformFn>,
}

impl Transform {
    pub fn new<F>(name: impl Into<String>, run: F) -> Self
    where
        F: Fn(&CompilerContext) -> Result<CompilerContext> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            run: Arc::new(run),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn run(&self, context: &CompilerContext) -> Result<CompilerContext> {
        (self.run)(context)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Transform").field(&self.name).finish()
    }
}

/// Look up a built-in transform by name.
pub fn builtin(name: &str) -> Option<Transform> {
    let run: fn(&CompilerContext) -> Result<CompilerContext> = match name {
        "flatten" => flatten,
        "skip_redundant_nodes" => skip_redundant_nodes,
        "generate_typename" => generate_typename,
        "inline_fragments" => inline_fragments,
        "skip_client_extensions" => skip_client_extensions,
        "filter_directives" => filter_directives,
        "split_deferred" => split_deferred,
        "skip_unreachable" => skip_unreachable,
        _ => return None,
    };
    Some(Transform::new(name, run))
}

/// Error for a failing transform. The pipeline fills in where it happened.
pub(crate) fn step_error(message: impl Into<String>) -> Error {
    Error::Transform {
        pipeline: String::new(),
        step: String::new(),
        message: message.into(),
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    name: String,
    steps: Vec<Transform>,
}

impl Pipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    pub fn step(mut self, transform: Transform) -> Self {
        self.steps.push(transform);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Transform] {
        &self.steps
    }

    /// Fold the steps over `context`. The input context is never modified.
    pub fn apply(
        &self,
        context: &CompilerContext,
        reporter: &dyn Reporter,
    ) -> Result<CompilerContext> {
        let _span = tracing::debug_span!("pipeline", name = %self.name).entered();
        let started = Instant::now();
        let mut current = context.clone();
        for step in &self.steps {
            let step_started = Instant::now();
            current = step.run(&current).map_err(|err| match err {
                Error::Transform { message, .. } => Error::Transform {
                    pipeline: self.name.clone(),
                    step: step.name.clone(),
                    message,
                },
                other => Error::Transform {
                    pipeline: self.name.clone(),
                    step: step.name.clone(),
                    message: other.to_string(),
                },
            })?;
            tracing::debug!(
                step = %step.name,
                definitions = current.len(),
                elapsed_us = step_started.elapsed().as_micros() as u64,
                "applied transform"
            );
        }
        reporter.report_message(&format!(
            "{}: {} transforms in {:.1?}",
            self.name,
            self.steps.len(),
            started.elapsed()
        ));
        Ok(current)
    }
}

/// The three pipelines a compile runs.
#[derive(Debug, Clone)]
pub struct Pipelines {
    pub type_generation: Pipeline,
    pub query_execution: Pipeline,
    pub artifact: Pipeline,
}

impl Default for Pipelines {
    fn default() -> Self {
        Self {
            type_generation: Pipeline::new(TYPE_GENERATION)
                .step(Transform::new("skip_unreachable", skip_unreachable))
                .step(Transform::new("flatten", flatten))
                .step(Transform::new("generate_typename", generate_typename)),
            query_execution: Pipeline::new(QUERY_EXECUTION)
                .step(Transform::new("skip_client_extensions", skip_client_extensions))
                .step(Transform::new("skip_unreachable", skip_unreachable))
                .step(Transform::new("inline_fragments", inline_fragments))
                .step(Transform::new("filter_directives", filter_directives))
                .step(Transform::new("flatten", flatten))
                .step(Transform::new("skip_redundant_nodes", skip_redundant_nodes))
                .step(Transform::new("generate_typename", generate_typename)),
            artifact: Pipeline::new(ARTIFACT)
                .step(Transform::new("skip_unreachable", skip_unreachable))
                .step(Transform::new("split_deferred", split_deferred))
                .step(Transform::new("flatten", flatten))
                .step(Transform::new("generate_typename", generate_typename)),
        }
    }
}

impl Pipelines {
    pub fn iter(&self) -> impl Iterator<Item = &Pipeline> {
        [&self.type_generation, &self.query_execution, &self.artifact].into_iter()
    }

    pub fn get(&self, name: &str) -> Option<&Pipeline> {
        self.iter().find(|p| p.name == name)
    }

    /// Apply every pipeline to the same source context.
    pub fn apply_all(
        &self,
        context: &CompilerContext,
        reporter: &dyn Reporter,
    ) -> Result<Contexts> {
        Ok(Contexts {
            type_generation: self.type_generation.apply(context, reporter)?,
            query_execution: self.query_execution.apply(context, reporter)?,
            artifact: self.artifact.apply(context, reporter)?,
        })
    }
}

/// Contexts derived by [`Pipelines::apply_all`].
#[derive(Debug, Clone)]
pub struct Contexts {
    pub type_generation: CompilerContext,
    pub query_execution: CompilerContext,
    pub artifact: CompilerContext,
}

/// Drop linked fields, inline fragments, and conditions left without children.
pub(crate) fn prune_empty(schema: &Schema, selections: Vec<Selection>) -> Vec<Selection> {
    selections
        .into_iter()
        .filter(|selection| match selection {
            Selection::Field(field) => {
                field.is_linked() || !schema.is_composite(field.ty.name())
            }
            Selection::FragmentSpread(_) => true,
            Selection::InlineFragment(inline) => !inline.selections.is_empty(),
            Selection::Condition(condition) => !condition.selections.is_empty(),
        })
        .collect()
}
