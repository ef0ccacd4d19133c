use strata_compiler::transform::Pipelines;
use strata_core::Colors;

use super::Project;
use super::config::ProjectConfig;
use super::dump::{dump_context, find_pipeline, render};
use super::test_fixtures::artist_project;

fn project() -> (tempfile::TempDir, Project) {
    let dir = tempfile::tempdir().unwrap();
    artist_project(dir.path(), "");
    let config = ProjectConfig::load(&dir.path().join("strata.toml")).unwrap();
    let project = Project::load(config, false).unwrap();
    (dir, project)
}

#[test]
fn lowered_definitions_are_printed() {
    let (_dir, project) = project();
    let context = dump_context(&project, None).unwrap();

    let all = render(&context, None, Colors::OFF).unwrap();
    assert!(all.contains("fragment ArtistBio_artist on Artist {"), "{all}");
    assert!(all.contains("query ArtistPageQuery($id: ID!) {"), "{all}");
    assert!(all.contains("...ArtistBio_artist"), "{all}");

    let one = render(&context, Some("ArtistBio_artist"), Colors::OFF).unwrap();
    assert!(
        one.starts_with("# ArtistBio_artist\nfragment ArtistBio_artist on Artist {"),
        "{one}"
    );
    assert!(!one.contains("ArtistPageQuery"));
}

#[test]
fn pipelines_transform_before_printing() {
    let (_dir, project) = project();
    let pipelines = Pipelines::default();
    let pipeline = find_pipeline(&pipelines, "query-execution").unwrap();
    let context = dump_context(&project, Some(pipeline)).unwrap();

    let query = render(&context, Some("ArtistPageQuery"), Colors::OFF).unwrap();
    assert!(query.contains("bio"), "{query}");
    assert!(!query.contains("...ArtistBio_artist"), "{query}");
}

#[test]
fn unknown_names_are_errors() {
    let pipelines = Pipelines::default();
    let err = find_pipeline(&pipelines, "nope").unwrap_err();
    assert_eq!(
        err.to_string(),
        "unknown pipeline 'nope' (expected one of: type-generation, query-execution, artifact)"
    );

    let (_dir, project) = project();
    let context = dump_context(&project, None).unwrap();
    let err = render(&context, Some("Nope"), Colors::OFF).unwrap_err();
    assert_eq!(err.to_string(), "no definition named 'Nope'");
}
