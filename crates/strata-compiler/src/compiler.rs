//! The `compile` entry point.
//!
//! One run: syntax check, schema build and extension, validation, lowering,
//! the three transform pipelines, artifact compilation, concurrent rendering
//! and staging, directory finalization. A persisting run then aggregates the
//! query map, and a writing run hands changed directories to source control.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::Instrument;

use crate::artifact::compile_artifacts;
use crate::codegen::CodegenWriter;
use crate::context::CompilerContext;
use crate::document_store::{Document, DocumentStore};
use crate::lower::{LowerOptions, lower};
use crate::output::{ChangeSummary, Directories, OutputDirectory, finalize_all, summarize};
use crate::query_map;
use crate::reporter::{Reporter, TracingReporter};
use crate::schema::{build_schema, extend_schema};
use crate::source_map::SourceId;
use crate::transform::Pipelines;
use crate::validate::{RuleSet, Validator};
use crate::{Error, Result};

pub const DEFAULT_QUERY_MAP_PATH: &str = "persisted_query_map.json";

/// Stages changed files with the project's version control.
#[async_trait]
pub trait SourceControl: Send + Sync {
    async fn add(&self, paths: &[PathBuf]) -> Result<()>;
}

/// Inputs of one run. Schema and extension sources live in the store's
/// source map (see [`DocumentStore::sources_mut`]).
pub struct CompileRequest<'a> {
    documents: &'a DocumentStore,
    schema_sources: Vec<SourceId>,
    extension_sources: Vec<SourceId>,
    writer: CodegenWriter,
    rules: RuleSet,
    lower_options: LowerOptions,
    pipelines: Pipelines,
    reporter: Arc<dyn Reporter>,
    source_control: Option<Arc<dyn SourceControl>>,
    query_map_path: PathBuf,
}

impl<'a> CompileRequest<'a> {
    pub fn new(
        documents: &'a DocumentStore,
        schema_sources: Vec<SourceId>,
        writer: CodegenWriter,
    ) -> Self {
        Self {
            documents,
            schema_sources,
            extension_sources: Vec::new(),
            writer,
            rules: RuleSet::builtin(),
            lower_options: LowerOptions::default(),
            pipelines: Pipelines::default(),
            reporter: Arc::new(TracingReporter),
            source_control: None,
            query_map_path: PathBuf::from(DEFAULT_QUERY_MAP_PATH),
        }
    }

    pub fn extensions(mut self, sources: Vec<SourceId>) -> Self {
        self.extension_sources = sources;
        self
    }

    /// Project rules, run after the built-in ones.
    pub fn rules(mut self, custom: RuleSet) -> Self {
        self.rules = RuleSet::builtin().with(custom);
        self
    }

    pub fn lower_options(mut self, options: LowerOptions) -> Self {
        self.lower_options = options;
        self
    }

    pub fn pipelines(mut self, pipelines: Pipelines) -> Self {
        self.pipelines = pipelines;
        self
    }

    pub fn reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn source_control(mut self, source_control: Arc<dyn SourceControl>) -> Self {
        self.source_control = Some(source_control);
        self
    }

    pub fn query_map_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.query_map_path = path.into();
        self
    }

    pub fn is_validate_only(&self) -> bool {
        self.writer.config().is_validate_only()
    }
}

/// Finalized directories of a run, by path.
#[derive(Debug)]
pub struct CompileOutput {
    directories: Directories,
    summary: ChangeSummary,
}

impl CompileOutput {
    pub fn directories(&self) -> &Directories {
        &self.directories
    }

    pub fn directory(&self, path: &Path) -> Option<&OutputDirectory> {
        self.directories.get(path)
    }

    pub fn summary(&self) -> ChangeSummary {
        self.summary
    }

    pub fn into_directories(self) -> Directories {
        self.directories
    }
}

/// Everything up to lowering: the lowered definitions in a context over the
/// (server schema, extended schema) pair. Validation warnings go to
/// `reporter`.
pub fn build_context(
    store: &DocumentStore,
    schema_sources: &[SourceId],
    extension_sources: &[SourceId],
    rules: &RuleSet,
    lower_options: &LowerOptions,
    reporter: &dyn Reporter,
) -> Result<CompilerContext> {
    store.check_syntax()?;

    let sources = store.sources();
    let base = build_schema(sources, schema_sources)?;
    let documents: Vec<&Document> = store.all().collect();
    let extended = extend_schema(&base, sources, extension_sources, &documents)?;

    let warnings = Validator::new(rules.clone()).validate(&documents, &extended)?;
    if !warnings.is_empty() {
        reporter.report_message(&warnings.render_locations(sources));
    }

    let definitions = lower(&extended, &documents, lower_options)?;
    tracing::debug!(definitions = definitions.len(), "lowered");
    CompilerContext::new(Arc::new(base), Arc::new(extended)).add_all(definitions)
}

pub async fn compile(request: CompileRequest<'_>) -> Result<CompileOutput> {
    let validate_only = request.is_validate_only();
    let span = tracing::info_span!("compile", validate_only);
    run(request, validate_only).instrument(span).await
}

async fn run(request: CompileRequest<'_>, validate_only: bool) -> Result<CompileOutput> {
    let store = request.documents;
    let reporter = request.reporter.as_ref();

    let context = build_context(
        store,
        &request.schema_sources,
        &request.extension_sources,
        &request.rules,
        &request.lower_options,
        reporter,
    )?;
    let contexts = request.pipelines.apply_all(&context, reporter)?;
    let artifacts = compile_artifacts(&contexts, &store.base_names())?;
    tracing::debug!(artifacts = artifacts.len(), "artifacts compiled");

    let mut directories = request
        .writer
        .write_all(&artifacts, &contexts.type_generation, store.sources())
        .await?;
    let owned = request
        .writer
        .codegen_dirs(store.project().iter().filter_map(Document::path));
    for path in owned {
        directories
            .entry(path.clone())
            .or_insert_with(|| OutputDirectory::new(path, validate_only));
    }
    finalize_all(&mut directories).await?;

    let summary = summarize(&directories);
    reporter.report_message(&format!("{} artifacts: {summary}", artifacts.len()));

    if validate_only {
        if summary.has_changes() {
            let files = directories
                .values()
                .flat_map(OutputDirectory::changed_files)
                .collect();
            return Err(Error::Drift { files });
        }
        return Ok(CompileOutput {
            directories,
            summary,
        });
    }

    if request.writer.is_persisting() {
        let manifest_name = request.writer.config().manifest_file_name();
        if let Err(err) =
            query_map::aggregate(&directories, manifest_name, &request.query_map_path).await
        {
            reporter.report_error("query map", &err);
        }
    }

    if let Some(source_control) = &request.source_control {
        let changed: Vec<PathBuf> = directories
            .values()
            .filter(|dir| dir.has_changes())
            .map(|dir| dir.path().to_path_buf())
            .collect();
        if !changed.is_empty() {
            source_control.add(&changed).await?;
        }
    }

    Ok(CompileOutput {
        directories,
        summary,
    })
}
