use std::path::{Path, PathBuf};
use std::sync::Arc;

use indoc::indoc;

use super::*;
use crate::ErrorKind;
use crate::ir::Definition;
use crate::output::{ChangeKind, finalize_all, summarize};
use crate::schema::Schema;
use crate::test_utils::{ARTIST_SCHEMA, Compiled, RecordingPersister, compiled};
use crate::{Error, Result};

const ARTIST_PAGE: &str = indoc! {r#"
    query ArtistPageQuery($id: ID!) {
      artist(id: $id) { name ...ArtistBio_artist }
    }
"#};

const ARTIST_BIO: &str = indoc! {r#"
    fragment ArtistBio_artist on Artist { bio }
"#};

fn project(root: &Path) -> Compiled {
    compiled(
        ARTIST_SCHEMA,
        &[
            (root.join("pages/ArtistPage.graphql").as_path(), ARTIST_PAGE),
            (root.join("components/ArtistBio.graphql").as_path(), ARTIST_BIO),
        ],
    )
}

async fn write(
    writer: &CodegenWriter,
    project: &Compiled,
) -> Result<crate::output::Directories> {
    writer
        .write_all(
            &project.artifacts,
            &project.contexts.type_generation,
            project.store.sources(),
        )
        .await
}

#[tokio::test]
async fn modules_are_written_next_to_their_sources() {
    let dir = tempfile::tempdir().unwrap();
    let project = project(dir.path());
    let writer = CodegenWriter::new(WriterConfig::new().platform("web"));

    let mut directories = write(&writer, &project).await.unwrap();
    finalize_all(&mut directories).await.unwrap();

    let pages = dir.path().join("pages/__generated__");
    let components = dir.path().join("components/__generated__");
    assert_eq!(
        directories.keys().collect::<Vec<_>>(),
        vec![&components, &pages]
    );
    assert_eq!(
        summarize(&directories).to_string(),
        "2 created, 0 updated, 0 unchanged, 0 deleted"
    );

    let text = std::fs::read_to_string(pages.join("ArtistPageQuery.graphql.ts")).unwrap();
    assert!(text.starts_with("/**\n * @generated\n * @sourceHash "));
    assert!(text.contains(" * @platform web\n"));
    assert!(text.contains("export type ArtistPageQuery$data = {"));
    assert!(text.contains("FragmentRefs<\"ArtistBio_artist\">"));
    assert!(text.ends_with("export default node;\n"));

    let page = project
        .artifacts
        .iter()
        .find(|a| a.name == "ArtistPageQuery")
        .unwrap();
    let expected = SourceHash::of_definition(project.store.sources(), &page.definition);
    assert_eq!(SourceHash::from_generated(&text), Some(expected));
    assert!(components.join("ArtistBio_artist.graphql.ts").is_file());
}

#[tokio::test]
async fn output_dir_collects_everything_and_duplicates_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut project = project(dir.path());
    let out = dir.path().join("generated");
    let writer = CodegenWriter::new(WriterConfig::new().output_dir(&out).extension("js"));

    let directories = write(&writer, &project).await.unwrap();
    let staged: Vec<_> = directories[&out].staged().collect();
    assert_eq!(
        staged,
        vec!["ArtistBio_artist.graphql.js", "ArtistPageQuery.graphql.js"]
    );

    let duplicate = project
        .artifacts
        .iter()
        .find(|a| a.name == "ArtistPageQuery")
        .unwrap()
        .clone();
    project.artifacts.push(duplicate);
    let err = write(&writer, &project).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Output);
    assert!(
        err.to_string()
            .contains("`ArtistPageQuery.graphql.js` is produced by more than one artifact")
    );
}

#[test]
fn codegen_dirs_follow_sources_or_the_output_dir() {
    let sources = [
        Path::new("/app/pages/ArtistPage.graphql"),
        Path::new("/app/pages/Other.graphql"),
        Path::new("/app/components/ArtistBio.tsx"),
    ];

    let beside = CodegenWriter::new(WriterConfig::new()).codegen_dirs(sources);
    assert_eq!(
        beside.into_iter().collect::<Vec<_>>(),
        vec![
            PathBuf::from("/app/components/__generated__"),
            PathBuf::from("/app/pages/__generated__"),
        ]
    );

    let single = CodegenWriter::new(WriterConfig::new().output_dir("/app/out"));
    assert_eq!(
        single.codegen_dirs(sources).into_iter().collect::<Vec<_>>(),
        vec![PathBuf::from("/app/out")]
    );
}

#[tokio::test]
async fn persisted_requests_carry_ids_and_fill_the_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let project = project(dir.path());
    let persister = Arc::new(RecordingPersister::default());
    let writer = CodegenWriter::new(WriterConfig::new()).persister(persister.clone());

    let mut directories = write(&writer, &project).await.unwrap();
    finalize_all(&mut directories).await.unwrap();

    let pages = dir.path().join("pages/__generated__");
    let text = std::fs::read_to_string(pages.join("ArtistPageQuery.graphql.ts")).unwrap();
    assert!(text.contains("\"id\": \"q1\""));
    assert!(text.contains("\"text\": null"));

    let persisted = persister.texts.lock().unwrap().clone();
    assert_eq!(persisted.len(), 1);
    let manifest = std::fs::read_to_string(pages.join("persisted_queries.json")).unwrap();
    let manifest: serde_json::Value = serde_json::from_str(&manifest).unwrap();
    assert_eq!(manifest, serde_json::json!({ "q1": persisted[0] }));

    let components = dir.path().join("components/__generated__");
    assert!(!components.join("persisted_queries.json").exists());
}

#[tokio::test]
async fn validate_only_reports_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let project = project(dir.path());
    let writer = CodegenWriter::new(WriterConfig::new().validate_only(true));

    let mut directories = write(&writer, &project).await.unwrap();
    finalize_all(&mut directories).await.unwrap();

    assert!(!dir.path().join("pages/__generated__").exists());
    let pages = &directories[&dir.path().join("pages/__generated__")];
    assert_eq!(pages.changes()[0].kind, ChangeKind::Created);
    assert_eq!(
        pages.changed_files(),
        vec![dir.path().join("pages/__generated__/ArtistPageQuery.graphql.ts")]
    );
}

struct FailingGenerator;

impl TypeGenerator for FailingGenerator {
    fn generate(&self, _: &Definition, _: &Schema, _: &TypeGenConfig) -> Result<String> {
        Err(Error::io("types.ts")(std::io::Error::other("disk full")))
    }
}

#[tokio::test]
async fn generator_failures_name_the_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let project = project(dir.path());
    let writer = CodegenWriter::new(WriterConfig::new()).generator(Arc::new(FailingGenerator));

    let err = write(&writer, &project).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Artifact);
    let message = err.to_string();
    assert!(message.starts_with("artifact `"), "{message}");
    assert!(message.ends_with(": types.ts: disk full"), "{message}");
    assert!(!dir.path().join("pages/__generated__").exists());
}
