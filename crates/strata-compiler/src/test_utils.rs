//! Shared fixtures for unit tests.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use indoc::indoc;

use crate::artifact::{Artifact, compile_artifacts};
use crate::codegen::Persister;
use crate::context::CompilerContext;
use crate::document_store::{DocumentStore, Partition};
use crate::ir::Definition;
use crate::lower::{LowerOptions, lower};
use crate::reporter::Reporter;
use crate::schema::{Schema, SchemaBuilder, extend_schema};
use crate::source_map::SourceMap;
use crate::transform::{Contexts, Pipelines};
use crate::{Error, Result};

pub const ARTIST_SCHEMA: &str = indoc! {r#"
    interface Node { __id: ID! }

    type Artist implements Node {
      __id: ID!
      name: String
      bio: String
      genre: Genre
      albums(first: Int): [Album!]
    }

    type Album implements Node {
      __id: ID!
      title: String
      year: Int
    }

    type Viewer {
      name: String
      favorite: SearchResult
    }

    union SearchResult = Artist | Album

    enum Genre { ROCK POP }

    input ArtistFilter {
      genre: Genre
      first: Int
      tags: [String]
    }

    type Query {
      artists: [Artist!]!
      artist(id: ID!): Artist
      node(id: ID!): Node
      viewer: Viewer
      search(filter: ArtistFilter!): [Artist!]!
    }

    type Mutation {
      renameArtist(id: ID!, name: String!): Artist
    }
"#};

/// Build a schema, panicking with rendered diagnostics on failure.
pub fn schema(sdl: &str) -> Schema {
    let mut sources = SourceMap::new();
    let id = sources.add_inline("<schema>", sdl);
    match SchemaBuilder::new(&sources)
        .add_source(id)
        .and_then(SchemaBuilder::finish)
    {
        Ok(schema) => schema,
        Err(err) => panic!("{}", render(&err, &sources)),
    }
}

/// A store holding each text as an inline project document.
pub fn store(documents: &[&str]) -> DocumentStore {
    let mut store = DocumentStore::new();
    for text in documents {
        store
            .add(Partition::Project, None, text)
            .expect("document registers");
    }
    store
}

/// Lower `source` against `sdl`, panicking with rendered diagnostics on failure.
pub fn lower_source(sdl: &str, source: &str) -> Vec<Definition> {
    let schema = schema(sdl);
    let store = store(&[source]);
    let docs: Vec<_> = store.all().collect();
    match lower(&schema, &docs, &LowerOptions::default()) {
        Ok(definitions) => definitions,
        Err(err) => panic!("{}", render(&err, store.sources())),
    }
}

/// Context holding the lowered `documents`. Type-system definitions inside the
/// documents extend the schema.
pub fn context(sdl: &str, documents: &[&str]) -> CompilerContext {
    let base = schema(sdl);
    let store = store(documents);
    let docs: Vec<_> = store.all().collect();
    let extended = match extend_schema(&base, store.sources(), &[], &docs) {
        Ok(schema) => schema,
        Err(err) => panic!("{}", render(&err, store.sources())),
    };
    let definitions = match lower(&extended, &docs, &LowerOptions::default()) {
        Ok(definitions) => definitions,
        Err(err) => panic!("{}", render(&err, store.sources())),
    };
    CompilerContext::new(Arc::new(base), Arc::new(extended))
        .add_all(definitions)
        .expect("definition names are unique")
}

/// Everything up to artifact compilation, for documents read from `path`s.
pub struct Compiled {
    pub store: DocumentStore,
    pub contexts: Contexts,
    pub artifacts: Vec<Artifact>,
}

pub fn compiled(sdl: &str, documents: &[(&Path, &str)]) -> Compiled {
    let base = schema(sdl);
    let mut store = DocumentStore::new();
    for (path, text) in documents {
        store
            .add(Partition::Project, Some(*path), text)
            .expect("document registers");
    }
    let docs: Vec<_> = store.all().collect();
    let definitions = match lower(&base, &docs, &LowerOptions::default()) {
        Ok(definitions) => definitions,
        Err(err) => panic!("{}", render(&err, store.sources())),
    };
    let base = Arc::new(base);
    let ctx = CompilerContext::new(Arc::clone(&base), base)
        .add_all(definitions)
        .expect("definition names are unique");
    let contexts = Pipelines::default()
        .apply_all(&ctx, &crate::reporter::NullReporter)
        .expect("pipelines apply");
    let artifacts = compile_artifacts(&contexts, &BTreeSet::new()).expect("artifacts compile");
    Compiled {
        store,
        contexts,
        artifacts,
    }
}

fn render(err: &Error, sources: &SourceMap) -> String {
    match err.diagnostics() {
        Some(diagnostics) => diagnostics.render(sources),
        None => err.to_string(),
    }
}

/// Reporter that keeps everything it receives.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub messages: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn report_message(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }

    fn report_error(&self, context: &str, error: &Error) {
        self.errors.lock().unwrap().push(format!("{context}: {error}"));
    }
}

/// Persister that numbers texts in the order it sees them.
#[derive(Debug, Default)]
pub struct RecordingPersister {
    pub texts: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl Persister for RecordingPersister {
    async fn persist(&self, text: &str) -> Result<String> {
        let mut texts = self.texts.lock().unwrap();
        texts.push(text.to_string());
        Ok(format!("q{}", texts.len()))
    }
}
