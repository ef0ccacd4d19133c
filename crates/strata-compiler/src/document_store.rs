//! Parsed documents, split into base and project partitions.
//!
//! Base documents are shared definitions compiled elsewhere; they are only
//! used to resolve references. Project documents are the compile targets.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::diagnostics::Diagnostics;
use crate::parser::{self, Definition, Parse, ast};
use crate::source_map::{LineCol, SourceId, SourceMap};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Base,
    Project,
}

/// One parsed unit of GraphQL text and where it came from.
#[derive(Debug, Clone)]
pub struct Document {
    source: SourceId,
    path: Option<PathBuf>,
    parse: Parse,
    diagnostics: Diagnostics,
}

impl Document {
    pub fn source(&self) -> SourceId {
        self.source
    }

    /// File the text was read from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Directory of the originating file.
    pub fn directory(&self) -> Option<&Path> {
        self.path.as_deref().and_then(Path::parent)
    }

    pub fn document(&self) -> ast::Document {
        self.parse.document()
    }

    pub fn parse(&self) -> &Parse {
        &self.parse
    }

    /// Syntax diagnostics from parsing this document.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Names of the operations and fragments defined here.
    pub fn definition_names(&self) -> Vec<String> {
        self.document()
            .definitions()
            .filter(|d| !matches!(d, Definition::TypeSystem(_)))
            .filter_map(|d| d.name())
            .map(|t| t.text().to_string())
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct DocumentStore {
    sources: SourceMap,
    base: Vec<Document>,
    project: Vec<Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    /// For registering schema and extension files next to the documents, so
    /// one map renders every diagnostic of a run.
    pub fn sources_mut(&mut self) -> &mut SourceMap {
        &mut self.sources
    }

    /// Register and parse the full text of a file (or of an inline snippet when
    /// `path` is `None`).
    pub fn add(
        &mut self,
        partition: Partition,
        path: Option<&Path>,
        text: &str,
    ) -> Result<SourceId> {
        let source = match path {
            Some(path) => self.sources.add_file(path, text),
            None => self.sources.add_inline("<document>", text),
        };
        self.push(partition, source, path.map(Path::to_path_buf))
    }

    /// Register text that was extracted from `path`, starting at `start` there.
    pub fn add_embedded(
        &mut self,
        partition: Partition,
        path: &Path,
        start: LineCol,
        text: &str,
    ) -> Result<SourceId> {
        let source = self.sources.add_embedded(path, start, text);
        self.push(partition, source, Some(path.to_path_buf()))
    }

    /// Replace every project document of `path` with the given text.
    pub fn update_project(&mut self, path: &Path, text: &str) -> Result<SourceId> {
        self.remove_project(path);
        self.add(Partition::Project, Some(path), text)
    }

    /// Drop every project document of `path`. Returns whether any existed.
    pub fn remove_project(&mut self, path: &Path) -> bool {
        let before = self.project.len();
        self.project.retain(|doc| doc.path() != Some(path));
        before != self.project.len()
    }

    pub fn base(&self) -> &[Document] {
        &self.base
    }

    pub fn project(&self) -> &[Document] {
        &self.project
    }

    /// Base documents first, then project documents.
    pub fn all(&self) -> impl Iterator<Item = &Document> {
        self.base.iter().chain(self.project.iter())
    }

    pub fn partition_of(&self, source: SourceId) -> Option<Partition> {
        if self.base.iter().any(|d| d.source == source) {
            Some(Partition::Base)
        } else if self.project.iter().any(|d| d.source == source) {
            Some(Partition::Project)
        } else {
            None
        }
    }

    /// Definition names that only exist to be referenced.
    pub fn base_names(&self) -> BTreeSet<String> {
        self.base
            .iter()
            .flat_map(Document::definition_names)
            .collect()
    }

    /// Fail with every syntax error across both partitions.
    pub fn check_syntax(&self) -> Result<()> {
        let mut diagnostics = Diagnostics::new();
        for doc in self.all() {
            if doc.diagnostics.has_errors() {
                diagnostics.extend(doc.diagnostics.filtered());
            }
        }
        if diagnostics.has_errors() {
            return Err(Error::Parse(diagnostics));
        }
        Ok(())
    }

    fn push(
        &mut self,
        partition: Partition,
        source: SourceId,
        path: Option<PathBuf>,
    ) -> Result<SourceId> {
        let (parse, diagnostics) = parser::parse(self.sources.content(source), source)?;
        let doc = Document {
            source,
            path,
            parse,
            diagnostics,
        };
        match partition {
            Partition::Base => self.base.push(doc),
            Partition::Project => self.project.push(doc),
        }
        Ok(source)
    }
}
