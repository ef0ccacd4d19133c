pub mod compile;
pub mod config;
pub mod dump;
pub mod logging;
pub mod source_loader;

#[cfg(test)]
mod compile_tests;
#[cfg(test)]
mod dump_tests;
#[cfg(test)]
mod test_fixtures;

use std::path::{Path, PathBuf};

use strata_compiler::document_store::DocumentStore;

use config::ProjectConfig;
use source_loader::{ProjectSources, load_sources};

/// Flags shared by every command that loads a project.
#[derive(Clone, Debug, Default)]
pub struct ProjectArgs {
    pub config: Option<PathBuf>,
    pub schema: Option<PathBuf>,
    pub src: Vec<PathBuf>,
    pub color: bool,
}

impl ProjectArgs {
    /// The project config with command-line overrides applied. Override
    /// paths are relative to the working directory, not the config file.
    pub fn config(&self) -> anyhow::Result<ProjectConfig> {
        let mut config = ProjectConfig::discover(self.config.as_deref())?;
        if let Some(schema) = &self.schema {
            config.schema = from_cwd(schema)?;
        }
        if !self.src.is_empty() {
            config.src = self
                .src
                .iter()
                .map(|p| from_cwd(p))
                .collect::<anyhow::Result<_>>()?;
        }
        Ok(config)
    }
}

/// A loaded project: its config, documents, and schema sources.
pub struct Project {
    pub config: ProjectConfig,
    pub store: DocumentStore,
    pub sources: ProjectSources,
}

impl Project {
    pub fn load(config: ProjectConfig, color: bool) -> anyhow::Result<Self> {
        let mut store = DocumentStore::new();
        let sources = match load_sources(&config, &mut store) {
            Ok(sources) => sources,
            Err(err) => return Err(explain(err, &store, color)),
        };
        tracing::debug!(
            base = store.base().len(),
            project = store.project().len(),
            "documents loaded"
        );
        Ok(Self {
            config,
            store,
            sources,
        })
    }
}

pub fn from_cwd(path: &Path) -> anyhow::Result<PathBuf> {
    Ok(std::path::absolute(path)?)
}

/// Print source-located diagnostics of `err` to stderr, then hand it on.
pub fn explain(err: strata_compiler::Error, store: &DocumentStore, color: bool) -> anyhow::Error {
    if let Some(diagnostics) = err.diagnostics() {
        eprint!("{}", diagnostics.render_colored(store.sources(), color));
    }
    anyhow::Error::new(err)
}
