//! Filesystem discovery of schema files, base documents, and project sources.

use std::path::{Path, PathBuf};

use strata_compiler::document_store::{DocumentStore, Partition};
use strata_compiler::tags::{ModuleOptions, TemplateTagExtractor, parse_module};
use strata_compiler::{Error, Result, SourceId};
use walkdir::{DirEntry, WalkDir};

use super::config::ProjectConfig;

const DOCUMENT_EXTENSION: &str = "graphql";

/// Schema and extension sources registered in the store's source map.
#[derive(Debug, Default)]
pub struct ProjectSources {
    pub schema: Vec<SourceId>,
    pub extensions: Vec<SourceId>,
}

/// Register the schema files and every document under the configured roots.
///
/// `.graphql` files are parsed whole. Other included files are read as
/// modules with embedded `graphql` tags. Base roots only contribute
/// `.graphql` documents.
pub fn load_sources(config: &ProjectConfig, store: &mut DocumentStore) -> Result<ProjectSources> {
    let schema_path = config.resolve(&config.schema);
    let schema = vec![add_source(store, &schema_path)?];

    let mut extensions = Vec::with_capacity(config.extensions.len());
    for path in &config.extensions {
        extensions.push(add_source(store, &config.resolve(path))?);
    }

    for root in &config.base {
        for path in discover(config, &config.resolve(root))? {
            if is_document(&path) {
                let text = read(&path)?;
                store.add(Partition::Base, Some(path.as_path()), &text)?;
            }
        }
    }

    let options = ModuleOptions::new().validate_names(config.validate_names);
    for root in &config.src {
        for path in discover(config, &config.resolve(root))? {
            let text = read(&path)?;
            if is_document(&path) {
                store.add(Partition::Project, Some(path.as_path()), &text)?;
            } else {
                parse_module(store, &path, &text, &TemplateTagExtractor, options)?;
            }
        }
    }

    Ok(ProjectSources { schema, extensions })
}

/// Included files under `root`, in path order, skipping excluded directories.
pub fn discover(config: &ProjectConfig, root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded(config, entry));
    for entry in walker {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(root).to_path_buf();
            Error::Io {
                path,
                source: err.into(),
            }
        })?;
        if entry.file_type().is_file() && config.includes(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_excluded(config: &ProjectConfig, entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| config.excludes(name))
}

fn is_document(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == DOCUMENT_EXTENSION)
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(Error::io(path))
}

fn add_source(store: &mut DocumentStore, path: &Path) -> Result<SourceId> {
    let text = read(path)?;
    Ok(store.sources_mut().add_file(path, &text))
}
