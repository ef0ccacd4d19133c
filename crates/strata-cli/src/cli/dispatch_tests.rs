use std::path::PathBuf;

use super::*;
use crate::cli::commands::{check_command, compile_command, dump_command};

#[test]
fn compile_extracts_overrides() {
    let m = compile_command()
        .try_get_matches_from([
            "compile",
            "--schema",
            "schema.graphql",
            "--src",
            "app",
            "--src",
            "lib",
            "-o",
            "gen",
            "--persist-output",
            "build/queries.json",
        ])
        .unwrap();
    let params = CompileParams::from_matches(&m);

    assert_eq!(params.project.schema, Some(PathBuf::from("schema.graphql")));
    assert_eq!(
        params.project.src,
        vec![PathBuf::from("app"), PathBuf::from("lib")]
    );
    assert_eq!(params.output, Some(PathBuf::from("gen")));
    assert_eq!(
        params.persist_output,
        Some(PathBuf::from("build/queries.json"))
    );
    assert!(!params.validate);
    assert_eq!(params.project.color, ColorChoice::Auto);
}

#[test]
fn absent_flags_leave_config_alone() {
    let m = compile_command().try_get_matches_from(["compile"]).unwrap();
    let params = CompileParams::from_matches(&m);
    assert_eq!(params.project.config, None);
    assert_eq!(params.project.schema, None);
    assert!(params.project.src.is_empty());
    assert_eq!(params.output, None);
}

#[test]
fn check_always_validates() {
    let m = check_command()
        .try_get_matches_from(["check", "--color", "never"])
        .unwrap();
    let CheckParams(params) = CheckParams::from_matches(&m);
    assert!(params.validate);
    assert_eq!(params.project.color, ColorChoice::Never);
}

#[test]
fn check_hides_validate_flag() {
    let help = check_command().render_help().to_string();
    assert!(!help.contains("--validate"), "{help}");
    let help = compile_command().render_help().to_string();
    assert!(help.contains("--validate"));
}

#[test]
fn dump_takes_pipeline_and_definition() {
    let m = dump_command()
        .try_get_matches_from(["dump", "-p", "artifact", "ArtistPageQuery"])
        .unwrap();
    let params = DumpParams::from_matches(&m);
    assert_eq!(params.pipeline.as_deref(), Some("artifact"));
    assert_eq!(params.definition.as_deref(), Some("ArtistPageQuery"));
}

#[test]
fn dump_rejects_compile_flags() {
    let result = dump_command().try_get_matches_from(["dump", "--validate"]);
    assert!(result.is_err());
}

#[test]
fn verbosity_is_global() {
    let m = build_cli()
        .try_get_matches_from(["strata", "check", "-vv"])
        .unwrap();
    assert_eq!(m.get_count("verbose"), 2);
}
