//! Combined persisted-query manifest.
//!
//! Every output directory of a persisting run stages its own manifest. Once
//! all directories are finalized, [`aggregate`] reads those manifests back
//! from storage and merges them into one file keyed by persisted id.

use std::collections::BTreeMap;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;

use crate::output::Directories;
use crate::{Error, Result};

/// Merge the on-storage manifests of `directories` into `output`.
///
/// Directories are visited in path order and later ones win on id
/// collisions. Directories without a manifest are skipped. Returns the
/// number of entries written.
pub async fn aggregate(
    directories: &Directories,
    manifest_name: &str,
    output: &Path,
) -> Result<usize> {
    let mut merged: BTreeMap<String, String> = BTreeMap::new();

    for path in directories.keys() {
        let manifest = path.join(manifest_name);
        let text = match tokio::fs::read_to_string(&manifest).await {
            Ok(text) => text,
            Err(err) if err.kind() == IoErrorKind::NotFound => continue,
            Err(err) => {
                return Err(Error::QueryMap(format!(
                    "cannot read `{}`: {err}",
                    manifest.display()
                )));
            }
        };
        let entries: BTreeMap<String, String> = serde_json::from_str(&text).map_err(|err| {
            Error::QueryMap(format!("`{}` is not a manifest: {err}", manifest.display()))
        })?;
        tracing::trace!(manifest = %manifest.display(), entries = entries.len(), "merging");
        merged.extend(entries);
    }

    let mut text = serde_json::to_string_pretty(&merged)?;
    text.push('\n');
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|err| {
                Error::QueryMap(format!("cannot create `{}`: {err}", parent.display()))
            })?;
    }
    tokio::fs::write(output, text)
        .await
        .map_err(|err| Error::QueryMap(format!("cannot write `{}`: {err}", output.display())))?;

    tracing::info!(path = %output.display(), entries = merged.len(), "query map written");
    Ok(merged.len())
}
