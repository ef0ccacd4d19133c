//! Content fingerprints of original definitions.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::ir::{Definition, print_definition};
use crate::parser::lexer::{lex, token_text};
use crate::source_map::SourceMap;

/// Header tag the hash is written under in generated files.
pub const SOURCE_HASH_TAG: &str = "@sourceHash";

/// SHA-256 of a definition's significant tokens, as lowercase hex.
///
/// Whitespace, commas and comments never change the hash, so reformatting a
/// source file does not mark its generated files stale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceHash(String);

impl SourceHash {
    /// Hash the non-trivia tokens of `text`.
    pub fn of_text(text: &str) -> Self {
        let mut hasher = Sha256::new();
        for token in lex(text).iter().filter(|t| !t.kind.is_trivia()) {
            hasher.update(token_text(text, token).as_bytes());
            hasher.update([0]);
        }
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Hash the source text `definition` was lowered from. Definitions the
    /// compiler synthesized hash their printed form instead.
    pub fn of_definition(sources: &SourceMap, definition: &Definition) -> Self {
        let location = definition.location();
        if location.range.is_empty() {
            return Self::of_text(&print_definition(definition));
        }
        let content = sources.content(location.source);
        Self::of_text(&content[std::ops::Range::<usize>::from(location.range)])
    }

    /// Read the hash back from a generated file's header.
    pub fn from_generated(text: &str) -> Option<Self> {
        text.lines().find_map(|line| {
            let (_, rest) = line.split_once(SOURCE_HASH_TAG)?;
            let hash = rest.split_whitespace().next()?;
            (hash.len() == 64 && hash.bytes().all(|b| b.is_ascii_hexdigit()))
                .then(|| Self(hash.to_string()))
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
