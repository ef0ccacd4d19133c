use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::Instrument;

use super::{
    JsModuleFormatter, ModuleFormatter, ModuleInput, Persister, SourceHash, TypeGenConfig,
    TypeGenerator, TypeScriptGenerator,
};
use crate::artifact::Artifact;
use crate::context::CompilerContext;
use crate::ir::Definition;
use crate::output::{Directories, OutputDirectory};
use crate::source_map::SourceMap;
use crate::{Error, Result};

pub const DEFAULT_GENERATED_DIR: &str = "__generated__";
pub const DEFAULT_EXTENSION: &str = "ts";
pub const DEFAULT_MANIFEST_NAME: &str = "persisted_queries.json";

/// Where and how generated modules are written.
#[derive(Clone, Debug)]
pub struct WriterConfig {
    output_dir: Option<PathBuf>,
    generated_dir_name: String,
    extension: String,
    platform: Option<String>,
    manifest_name: String,
    validate_only: bool,
    typegen: TypeGenConfig,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            generated_dir_name: DEFAULT_GENERATED_DIR.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            platform: None,
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
            validate_only: false,
            typegen: TypeGenConfig::default(),
        }
    }
}

impl WriterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write every module into one directory instead of next to its source.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn generated_dir_name(mut self, name: impl Into<String>) -> Self {
        self.generated_dir_name = name.into();
        self
    }

    /// Extension after `.graphql` in module file names.
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// File name of the per-directory persisted-query manifest.
    pub fn manifest_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_name = name.into();
        self
    }

    pub fn validate_only(mut self, value: bool) -> Self {
        self.validate_only = value;
        self
    }

    pub fn typegen(mut self, config: TypeGenConfig) -> Self {
        self.typegen = config;
        self
    }

    pub fn is_validate_only(&self) -> bool {
        self.validate_only
    }

    pub fn manifest_file_name(&self) -> &str {
        &self.manifest_name
    }

    pub fn typegen_config(&self) -> &TypeGenConfig {
        &self.typegen
    }

    pub fn generated_dir(&self) -> &str {
        &self.generated_dir_name
    }
}

/// One rendered module, not yet staged.
struct Rendered {
    directory: PathBuf,
    file: String,
    content: String,
    /// Persisted id and text, for the manifest.
    persisted: Option<(String, String)>,
}

/// Renders artifacts and stages them into their output directories.
#[derive(Clone)]
pub struct CodegenWriter {
    config: WriterConfig,
    generator: Arc<dyn TypeGenerator>,
    formatter: Arc<dyn ModuleFormatter>,
    persister: Option<Arc<dyn Persister>>,
}

impl CodegenWriter {
    /// A writer with the TypeScript generator and the JS module formatter.
    pub fn new(config: WriterConfig) -> Self {
        Self {
            config,
            generator: Arc::new(TypeScriptGenerator),
            formatter: Arc::new(JsModuleFormatter),
            persister: None,
        }
    }

    pub fn generator(mut self, generator: Arc<dyn TypeGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn formatter(mut self, formatter: Arc<dyn ModuleFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn persister(mut self, persister: Arc<dyn Persister>) -> Self {
        self.persister = Some(persister);
        self
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    pub fn is_persisting(&self) -> bool {
        self.persister.is_some()
    }

    pub fn file_name(&self, artifact_name: &str) -> String {
        format!("{artifact_name}.graphql.{}", self.config.extension)
    }

    /// The configured output directory, or the generated directory next to
    /// the artifact's source file.
    pub fn directory_for(&self, artifact: &Artifact) -> Result<PathBuf> {
        if let Some(dir) = &self.config.output_dir {
            return Ok(dir.clone());
        }
        artifact
            .location()
            .directory()
            .map(|dir| dir.join(&self.config.generated_dir_name))
            .ok_or_else(|| Error::Artifact {
                name: artifact.name.clone(),
                message: "source has no directory and no output directory is configured"
                    .to_string(),
            })
    }

    /// Directories this writer owns for a set of source files: the output
    /// directory if one is configured, else each source's generated directory.
    /// They are reconciled even when no artifact lands in them.
    pub fn codegen_dirs<'p>(
        &self,
        sources: impl IntoIterator<Item = &'p Path>,
    ) -> BTreeSet<PathBuf> {
        if let Some(dir) = &self.config.output_dir {
            return BTreeSet::from([dir.clone()]);
        }
        sources
            .into_iter()
            .filter_map(Path::parent)
            .map(|dir| dir.join(&self.config.generated_dir_name))
            .collect()
    }

    /// Render every writable artifact and stage it. Directories come back
    /// unfinalized.
    ///
    /// Rendering (including persisting) runs concurrently across artifacts.
    /// Staging then runs one task per directory, so no directory is shared.
    pub async fn write_all(
        &self,
        artifacts: &[Artifact],
        type_context: &CompilerContext,
        sources: &SourceMap,
    ) -> Result<Directories> {
        let span = tracing::debug_span!("write_all", artifacts = artifacts.len());
        async move {
            let mut typegen = self.config.typegen.clone();
            typegen.existing_fragment_names.extend(
                type_context
                    .definitions()
                    .filter_map(Definition::as_fragment)
                    .map(|f| f.name.clone()),
            );

            let mut planned: BTreeMap<PathBuf, BTreeSet<String>> = BTreeMap::new();
            let mut jobs = Vec::new();
            for artifact in artifacts.iter().filter(|a| a.is_writable()) {
                let directory = self.directory_for(artifact)?;
                let file = self.file_name(&artifact.name);
                if !planned
                    .entry(directory.clone())
                    .or_default()
                    .insert(file.clone())
                {
                    return Err(Error::Output {
                        path: directory,
                        message: format!("`{file}` is produced by more than one artifact"),
                    });
                }
                jobs.push((directory, file, artifact));
            }

            let rendered = try_join_all(jobs.into_iter().map(|(directory, file, artifact)| {
                self.render(directory, file, artifact, type_context, sources, &typegen)
            }))
            .await?;

            let mut groups: BTreeMap<PathBuf, Vec<Rendered>> = BTreeMap::new();
            for module in rendered {
                groups.entry(module.directory.clone()).or_default().push(module);
            }

            let staged = try_join_all(
                groups
                    .into_iter()
                    .map(|(path, modules)| self.stage(path, modules)),
            )
            .await?;
            Ok(staged.into_iter().collect())
        }
        .instrument(span)
        .await
    }

    async fn render(
        &self,
        directory: PathBuf,
        file: String,
        artifact: &Artifact,
        type_context: &CompilerContext,
        sources: &SourceMap,
        typegen: &TypeGenConfig,
    ) -> Result<Rendered> {
        let attribute = |err: Error| match err {
            Error::Artifact { .. } => err,
            other => Error::Artifact {
                name: artifact.name.clone(),
                message: other.to_string(),
            },
        };

        let source_hash = SourceHash::of_definition(sources, &artifact.definition);
        let Some(typed) = type_context.get(&artifact.name) else {
            return Err(Error::Artifact {
                name: artifact.name.clone(),
                message: "missing from the type-generation context".to_string(),
            });
        };
        let type_text = self
            .generator
            .generate(typed, type_context.schema(), typegen)
            .map_err(attribute)?;

        let mut persisted = None;
        let artifact: Cow<'_, Artifact> = match (&self.persister, artifact.request_text()) {
            (Some(persister), Some(text)) => {
                let id = persister.persist(text).await.map_err(attribute)?;
                tracing::trace!(name = %artifact.name, %id, "persisted");
                persisted = Some((id.clone(), text.to_string()));
                Cow::Owned(artifact.clone().persisted(id))
            }
            _ => Cow::Borrowed(artifact),
        };

        let document_text = serde_json::to_string_pretty(&artifact.node(type_context.schema()))?;
        let input = ModuleInput {
            module_name: &artifact.name,
            document_text: &document_text,
            type_text: &type_text,
            source_hash: &source_hash,
            platform: self.config.platform.as_deref(),
            runtime_module: &typegen.runtime_module,
        };
        let content = self.formatter.format(&input).map_err(attribute)?;

        Ok(Rendered {
            directory,
            file,
            content,
            persisted,
        })
    }

    async fn stage(
        &self,
        path: PathBuf,
        modules: Vec<Rendered>,
    ) -> Result<(PathBuf, OutputDirectory)> {
        let mut directory = OutputDirectory::new(&path, self.config.validate_only);
        let mut manifest = BTreeMap::new();
        for module in modules {
            directory.write(&module.file, &module.content).await?;
            if let Some((id, text)) = module.persisted {
                manifest.insert(id, text);
            }
        }
        if !manifest.is_empty() {
            let mut text = serde_json::to_string_pretty(&manifest)?;
            text.push('\n');
            directory.write(&self.config.manifest_name, &text).await?;
        }
        tracing::debug!(path = %path.display(), files = directory.staged().count(), "staged");
        Ok((path, directory))
    }
}

impl std::fmt::Debug for CodegenWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodegenWriter")
            .field("config", &self.config)
            .field("persisting", &self.persister.is_some())
            .finish()
    }
}
