use std::path::PathBuf;

use crate::ErrorKind;
use crate::output::{Directories, OutputDirectory};
use crate::query_map::*;

fn directories(paths: &[PathBuf]) -> Directories {
    paths
        .iter()
        .map(|p| (p.clone(), OutputDirectory::new(p, false)))
        .collect()
}

#[tokio::test]
async fn later_directories_win() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a/__generated__");
    let b = dir.path().join("b/__generated__");
    let c = dir.path().join("c/__generated__");
    for (path, manifest) in [
        (&a, r#"{"q1": "query A { a }", "q2": "query Old { x }"}"#),
        (&b, r#"{"q2": "query B { b }"}"#),
    ] {
        std::fs::create_dir_all(path).unwrap();
        std::fs::write(path.join("persisted_queries.json"), manifest).unwrap();
    }
    std::fs::create_dir_all(&c).unwrap();

    let output = dir.path().join("out/queries.json");
    let count = aggregate(
        &directories(&[a, b, c]),
        "persisted_queries.json",
        &output,
    )
    .await
    .unwrap();

    assert_eq!(count, 2);
    insta::assert_snapshot!(std::fs::read_to_string(&output).unwrap(), @r#"
    {
      "q1": "query A { a }",
      "q2": "query B { b }"
    }
    "#);
}

#[tokio::test]
async fn malformed_manifests_are_query_map_errors() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a");
    std::fs::create_dir_all(&a).unwrap();
    std::fs::write(a.join("manifest.json"), "[1, 2]").unwrap();

    let output = dir.path().join("queries.json");
    let err = aggregate(&directories(&[a]), "manifest.json", &output)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::QueryMap);
    assert!(err.to_string().contains("is not a manifest"));
    assert!(!output.exists());
}
