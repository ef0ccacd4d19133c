//! Source storage for a compilation session.
//!
//! Every document the compiler sees (schema files, `.graphql` files, tags
//! extracted from host-language modules, inline test snippets) is registered
//! here and referenced by a [`SourceId`]. Embedded sources remember where they
//! start inside their enclosing file so positions can be reported in the
//! coordinates of that file.

use std::path::{Path, PathBuf};

use rowan::TextSize;

/// Lightweight handle to a source in a compilation session.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct SourceId(pub(crate) u32);

/// Zero-based position inside a file.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

impl LineCol {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for LineCol {
    /// Renders 1-based `line:column`, the form editors and terminals expect.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Describes the origin of a source.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SourceKind {
    /// Text passed directly (tests, `--schema-extension` snippets).
    Inline(String),
    /// A whole file.
    File(PathBuf),
    /// A tag extracted from `path`, starting at `start` in that file.
    Embedded { path: PathBuf, start: LineCol },
}

impl SourceKind {
    /// Returns the display name for diagnostics.
    pub fn display_name(&self) -> String {
        match self {
            SourceKind::Inline(name) => name.clone(),
            SourceKind::File(path) | SourceKind::Embedded { path, .. } => {
                path.display().to_string()
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            SourceKind::Inline(_) => None,
            SourceKind::File(path) | SourceKind::Embedded { path, .. } => Some(path),
        }
    }
}

/// A borrowed view of a source: id, kind, and content.
#[derive(Clone, Debug)]
pub struct Source<'a> {
    pub id: SourceId,
    pub kind: &'a SourceKind,
    pub content: &'a str,
}

#[derive(Clone, Debug)]
struct SourceEntry {
    kind: SourceKind,
    content: String,
    /// Byte offset of every line start, computed once on insert.
    line_starts: Vec<u32>,
}

/// Registry of all sources.
#[derive(Clone, Debug, Default)]
pub struct SourceMap {
    entries: Vec<SourceEntry>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an inline source with a display name such as `<schema>`.
    pub fn add_inline(&mut self, name: &str, content: &str) -> SourceId {
        self.push_entry(SourceKind::Inline(name.to_owned()), content)
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>, content: &str) -> SourceId {
        self.push_entry(SourceKind::File(path.into()), content)
    }

    /// Add text that was extracted from `path` and begins at `start` there.
    pub fn add_embedded(
        &mut self,
        path: impl Into<PathBuf>,
        start: LineCol,
        content: &str,
    ) -> SourceId {
        self.push_entry(
            SourceKind::Embedded {
                path: path.into(),
                start,
            },
            content,
        )
    }

    /// Create a SourceMap with a single inline source.
    pub fn one_liner(content: &str) -> Self {
        let mut map = Self::new();
        map.add_inline("<query>", content);
        map
    }

    pub fn content(&self, id: SourceId) -> &str {
        &self.entry(id).content
    }

    pub fn kind(&self, id: SourceId) -> &SourceKind {
        &self.entry(id).kind
    }

    pub fn path(&self, id: SourceId) -> Option<&Path> {
        self.entry(id).kind.path()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: SourceId) -> Source<'_> {
        let entry = self.entry(id);
        Source {
            id,
            kind: &entry.kind,
            content: &entry.content,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Source<'_>> {
        self.entries.iter().enumerate().map(|(idx, entry)| Source {
            id: SourceId(idx as u32),
            kind: &entry.kind,
            content: &entry.content,
        })
    }

    /// Position of `offset` inside the source's own text.
    pub fn local_line_col(&self, id: SourceId, offset: TextSize) -> LineCol {
        let entry = self.entry(id);
        let offset = u32::from(offset).min(entry.content.len() as u32);
        let line = match entry.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = entry.line_starts[line] as usize;
        let column = entry.content[line_start..offset as usize].chars().count() as u32;
        LineCol::new(line as u32, column)
    }

    /// Position of `offset` in the coordinates of the enclosing file.
    ///
    /// For embedded sources the first line is shifted by the tag's start column
    /// and every line by the tag's start line.
    pub fn line_col(&self, id: SourceId, offset: TextSize) -> LineCol {
        let local = self.local_line_col(id, offset);
        match &self.entry(id).kind {
            SourceKind::Embedded { start, .. } => {
                if local.line == 0 {
                    LineCol::new(start.line, start.column + local.column)
                } else {
                    LineCol::new(start.line + local.line, local.column)
                }
            }
            _ => local,
        }
    }

    fn entry(&self, id: SourceId) -> &SourceEntry {
        self.entries.get(id.0 as usize).expect("invalid SourceId")
    }

    fn push_entry(&mut self, kind: SourceKind, content: &str) -> SourceId {
        let id = SourceId(self.entries.len() as u32);
        let line_starts = std::iter::once(0)
            .chain(
                content
                    .match_indices('\n')
                    .map(|(idx, _)| idx as u32 + 1),
            )
            .collect();
        self.entries.push(SourceEntry {
            kind,
            content: content.to_owned(),
            line_starts,
        });
        id
    }
}
