use std::path::Path;

use strata_core::Colors;

use super::compile::{CompileArgs, compile_project, render_summary, run};
use super::config::ProjectConfig;
use super::test_fixtures::artist_project;
use super::{Project, ProjectArgs};

fn args(root: &Path, validate: bool) -> CompileArgs {
    CompileArgs {
        project: ProjectArgs {
            config: Some(root.join("strata.toml")),
            ..ProjectArgs::default()
        },
        validate,
        output: None,
        persist_output: None,
    }
}

fn load(root: &Path) -> Project {
    let config = ProjectConfig::load(&root.join("strata.toml")).unwrap();
    Project::load(config, false).unwrap()
}

#[test]
fn check_fails_until_compiled() {
    let dir = tempfile::tempdir().unwrap();
    artist_project(dir.path(), "");

    let err = run(args(dir.path(), true)).unwrap_err();
    assert_eq!(err.to_string(), "2 generated file(s) are out of date");
    assert!(!dir.path().join("src/pages/__generated__").exists());

    run(args(dir.path(), false)).unwrap();
    assert!(
        dir.path()
            .join("src/pages/__generated__/ArtistPageQuery.graphql.ts")
            .is_file()
    );
    assert!(
        dir.path()
            .join("src/components/__generated__/ArtistBio_artist.graphql.ts")
            .is_file()
    );

    run(args(dir.path(), true)).unwrap();
}

#[tokio::test]
async fn summary_lists_changed_files() {
    let dir = tempfile::tempdir().unwrap();
    artist_project(dir.path(), "");
    let project = load(dir.path());

    let output = compile_project(&project, false).await.unwrap();
    insta::assert_snapshot!(render_summary(&output, project.config.root(), Colors::OFF), @r"
    created  src/components/__generated__/ArtistBio_artist.graphql.ts
    created  src/pages/__generated__/ArtistPageQuery.graphql.ts
    2 created, 0 updated, 0 unchanged, 0 deleted
    ");

    let again = compile_project(&project, false).await.unwrap();
    let summary = render_summary(&again, project.config.root(), Colors::OFF);
    insta::assert_snapshot!(summary, @"0 created, 0 updated, 2 unchanged, 0 deleted");
}

#[test]
fn output_override_collects_modules() {
    let dir = tempfile::tempdir().unwrap();
    artist_project(dir.path(), "artifact_extension = \"js\"");
    let out = dir.path().join("gen");

    let mut compile = args(dir.path(), false);
    compile.output = Some(out.clone());
    run(compile).unwrap();

    assert!(out.join("ArtistPageQuery.graphql.js").is_file());
    assert!(out.join("ArtistBio_artist.graphql.js").is_file());
    assert!(!dir.path().join("src/pages/__generated__").exists());
}

#[test]
fn persist_output_writes_the_query_map() {
    let dir = tempfile::tempdir().unwrap();
    artist_project(dir.path(), "");
    let query_map = dir.path().join("build/queries.json");

    let mut compile = args(dir.path(), false);
    compile.persist_output = Some(query_map.clone());
    run(compile).unwrap();

    let text = std::fs::read_to_string(&query_map).unwrap();
    let map: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(map.as_object().unwrap().len(), 1);
    let module = std::fs::read_to_string(
        dir.path()
            .join("src/pages/__generated__/ArtistPageQuery.graphql.ts"),
    )
    .unwrap();
    assert!(module.contains("\"text\": null"), "{module}");
}

#[test]
fn validation_errors_fail_the_command() {
    let dir = tempfile::tempdir().unwrap();
    artist_project(dir.path(), "");
    super::test_fixtures::write(
        dir.path(),
        "src/pages/Missing.graphql",
        "query MissingQuery { artist(id: \"1\") { nickname } }",
    );

    let err = run(args(dir.path(), false)).unwrap_err();
    let err = err.downcast_ref::<strata_compiler::Error>().unwrap();
    assert_eq!(err.kind(), strata_compiler::ErrorKind::Validation);
}
