//! Output directory reconciliation.
//!
//! An [`OutputDirectory`] collects the files a run produces for one directory.
//! Writes are compared against what is on disk: identical content is left
//! alone, new or different content is written. [`OutputDirectory::finalize`]
//! then deletes every file on disk that was not written in this run. In
//! validate-only mode nothing touches storage; the same changes are recorded
//! so a caller can report drift.


use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use futures::future::try_join_all;

use crate::{Error, Result};

/// Directories reached by a run, by path.
pub type Directories = BTreeMap<PathBuf, OutputDirectory>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryState {
    Accumulating,
    Finalized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChangeKind {
    Created,
    Updated,
    Unchanged,
    Deleted,
}

impl ChangeKind {
    pub fn is_change(&self) -> bool {
        !matches!(self, ChangeKind::Unchanged)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// File name relative to the directory.
    pub file: String,
    pub kind: ChangeKind,
}

/// Counts of each change kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSummary {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub deleted: usize,
}

impl ChangeSummary {
    pub fn add(&mut self, kind: ChangeKind) {
        match kind {
            ChangeKind::Created => self.created += 1,
            ChangeKind::Updated => self.updated += 1,
            ChangeKind::Unchanged => self.unchanged += 1,
            ChangeKind::Deleted => self.deleted += 1,
        }
    }

    pub fn merge(&mut self, other: ChangeSummary) {
        self.created += other.created;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.deleted += other.deleted;
    }

    pub fn has_changes(&self) -> bool {
        self.created + self.updated + self.deleted > 0
    }
}

impl std::fmt::Display for ChangeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} unchanged, {} deleted",
            self.created, self.updated, self.unchanged, self.deleted
        )
    }
}

#[derive(Debug)]
pub struct OutputDirectory {
    path: PathBuf,
    validate_only: bool,
    state: DirectoryState,
    staged: BTreeSet<String>,
    changes: Vec<Change>,
}

impl OutputDirectory {
    pub fn new(path: impl Into<PathBuf>, validate_only: bool) -> Self {
        Self {
            path: path.into(),
            validate_only,
            state: DirectoryState::Accumulating,
            staged: BTreeSet::new(),
            changes: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> DirectoryState {
        self.state
    }

    pub fn is_validate_only(&self) -> bool {
        self.validate_only
    }

    /// File names written so far.
    pub fn staged(&self) -> impl Iterator<Item = &str> {
        self.staged.iter().map(String::as_str)
    }

    /// Stage `file` with `content`, writing it unless the content on disk is
    /// already identical.
    pub async fn write(&mut self, file: &str, content: &str) -> Result<ChangeKind> {
        if self.state == DirectoryState::Finalized {
            return Err(self.error(format!("cannot write `{file}` after finalize")));
        }
        if !self.staged.insert(file.to_string()) {
            return Err(self.error(format!("`{file}` is written twice")));
        }

        let target = self.path.join(file);
        let kind = match tokio::fs::read(&target).await {
            Ok(existing) if existing == content.as_bytes() => ChangeKind::Unchanged,
            Ok(_) => ChangeKind::Updated,
            Err(err) if err.kind() == IoErrorKind::NotFound => ChangeKind::Created,
            Err(err) => return Err(Error::io(&target)(err)),
        };

        if kind.is_change() && !self.validate_only {
            tokio::fs::create_dir_all(&self.path)
                .await
                .map_err(Error::io(&self.path))?;
            tokio::fs::write(&target, content)
                .await
                .map_err(Error::io(&target))?;
        }
        tracing::trace!(file, ?kind, "staged");
        self.changes.push(Change {
            file: file.to_string(),
            kind,
        });
        Ok(kind)
    }

    /// Delete files on disk that were not staged, then refuse further use.
    pub async fn finalize(&mut self) -> Result<()> {
        if self.state == DirectoryState::Finalized {
            return Err(self.error("finalized twice".to_string()));
        }
        for file in self.existing_files().await? {
            if self.staged.contains(&file) {
                continue;
            }
            if !self.validate_only {
                let target = self.path.join(&file);
                tokio::fs::remove_file(&target)
                    .await
                    .map_err(Error::io(&target))?;
            }
            self.changes.push(Change {
                file,
                kind: ChangeKind::Deleted,
            });
        }

        self.state = DirectoryState::Finalized;
        tracing::debug!(path = %self.path.display(), summary = %self.summary(), "finalized");
        Ok(())
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn summary(&self) -> ChangeSummary {
        let mut summary = ChangeSummary::default();
        for change in &self.changes {
            summary.add(change.kind);
        }
        summary
    }

    pub fn has_changes(&self) -> bool {
        self.changes.iter().any(|c| c.kind.is_change())
    }

    /// Full paths of created, updated, and deleted files.
    pub fn changed_files(&self) -> Vec<PathBuf> {
        self.changes
            .iter()
            .filter(|c| c.kind.is_change())
            .map(|c| self.path.join(&c.file))
            .collect()
    }

    /// Regular files currently in the directory, sorted.
    async fn existing_files(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.path).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == IoErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(Error::io(&self.path)(err)),
        };
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(Error::io(&self.path))? {
            let file_type = entry.file_type().await.map_err(Error::io(entry.path()))?;
            if file_type.is_file() {
                files.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        files.sort();
        Ok(files)
    }

    fn error(&self, message: String) -> Error {
        Error::Output {
            path: self.path.clone(),
            message,
        }
    }
}

/// Finalize every directory. Directories are independent, so they finalize
/// concurrently.
pub async fn finalize_all(directories: &mut Directories) -> Result<()> {
    try_join_all(directories.values_mut().map(|dir| dir.finalize())).await?;
    Ok(())
}

/// Combined summary across directories.
pub fn summarize(directories: &Directories) -> ChangeSummary {
    let mut summary = ChangeSummary::default();
    for directory in directories.values() {
        summary.merge(directory.summary());
    }
    summary
}
