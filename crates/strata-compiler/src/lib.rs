//! Strata compiler: GraphQL documents in, generated data-access modules out.
//!
//! Pipeline, leaves first:
//! - `parser` - lexer, CST, and typed AST for executable and SDL documents
//! - `document_store` - base and project document partitions
//! - `tags` - GraphQL tags embedded in JavaScript and TypeScript modules
//! - `schema` - schema model, SDL building, and extension merging
//! - `validate` - local and global validation rules
//! - `lower` - AST to IR, with identity-field injection
//! - `context` - persistent collection of IR definitions
//! - `transform` - named pipelines of context transforms
//! - `artifact` - per-definition artifacts from transformed contexts
//! - `codegen` - source hashing, type generation, formatting, persistence
//! - `output` - output directory reconciliation
//! - `query_map` - persisted-query manifest aggregation
//! - `compiler` - the `compile` entry point tying it all together
//!
//! # Example
//!
//! ```
//! use strata_compiler::schema::Schema;
//!
//! let schema = Schema::parse("type Query { me: String }").expect("valid schema");
//! assert!(schema.has_type("Query"));
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use std::path::PathBuf;

pub mod artifact;
pub mod codegen;
pub mod compiler;
pub mod context;
pub mod diagnostics;
pub mod document_store;
pub mod ir;
pub mod lower;
pub mod output;
pub mod parser;
pub mod query_map;
pub mod reporter;
pub mod schema;
pub mod source_map;
pub mod tags;
pub mod transform;
pub mod validate;

#[cfg(test)]
pub mod test_utils;


#[cfg(test)]
mod context_tests;

#[cfg(test)]
mod document_store_tests;

#[cfg(test)]
mod query_map_tests;


pub use compiler::{CompileOutput, CompileRequest, compile};
pub use diagnostics::{Diagnostics, DiagnosticsPrinter, Severity};
pub use source_map::{LineCol, SourceId, SourceMap};

/// Coarse error category, stable across message wording changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Schema,
    Parse,
    Validation,
    Lowering,
    Transform,
    Artifact,
    Output,
    Io,
    Drift,
    QueryMap,
    Extract,
}

/// Errors that can abort a compile run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Execution fuel exhausted (too many parser operations).
    #[error("execution limit exceeded")]
    ExecFuelExhausted,

    /// Recursion fuel exhausted (input nested too deeply).
    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,

    #[error("schema build failed with {} errors", .0.error_count())]
    Schema(Diagnostics),

    #[error("parsing failed with {} errors", .0.error_count())]
    Parse(Diagnostics),

    #[error("validation failed with {} errors", .0.error_count())]
    Validation(Diagnostics),

    #[error("lowering failed with {} errors", .0.error_count())]
    Lowering(Diagnostics),

    #[error("transform `{step}` in pipeline `{pipeline}` failed: {message}")]
    Transform {
        pipeline: String,
        step: String,
        message: String,
    },

    #[error("artifact `{name}`: {message}")]
    Artifact { name: String, message: String },

    #[error("output directory `{}`: {message}", .path.display())]
    Output { path: PathBuf, message: String },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{} generated file(s) are out of date", .files.len())]
    Drift { files: Vec<PathBuf> },

    #[error("query map: {0}")]
    QueryMap(String),

    #[error("{}: {message}", .path.display())]
    Extract { path: PathBuf, message: String },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ExecFuelExhausted | Error::RecursionLimitExceeded | Error::Parse(_) => {
                ErrorKind::Parse
            }
            Error::Schema(_) => ErrorKind::Schema,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Lowering(_) => ErrorKind::Lowering,
            Error::Transform { .. } => ErrorKind::Transform,
            Error::Artifact { .. } | Error::Json(_) => ErrorKind::Artifact,
            Error::Output { .. } => ErrorKind::Output,
            Error::Io { .. } => ErrorKind::Io,
            Error::Drift { .. } => ErrorKind::Drift,
            Error::QueryMap(_) => ErrorKind::QueryMap,
            Error::Extract { .. } => ErrorKind::Extract,
        }
    }

    /// Source-located diagnostics carried by aggregated errors.
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            Error::Schema(d) | Error::Parse(d) | Error::Validation(d) | Error::Lowering(d) => {
                Some(d)
            }
            _ => None,
        }
    }

    /// Attach a path to an I/O error, for use with `map_err`.
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Error {
        let path = path.into();
        move |source| Error::Io { path, source }
    }
}

/// Result type for compiler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for passes that produce both output and non-fatal diagnostics.
pub type PassResult<T> = std::result::Result<(T, Diagnostics), Error>;
