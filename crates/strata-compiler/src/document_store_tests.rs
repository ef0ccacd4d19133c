use std::path::Path;

use crate::ErrorKind;
use crate::document_store::{DocumentStore, Partition};

#[test]
fn partitions_are_kept_apart() {
    let mut store = DocumentStore::new();
    let base = store
        .add(
            Partition::Base,
            Some(Path::new("lib/Shared.graphql")),
            "fragment Shared_artist on Artist { name }",
        )
        .unwrap();
    let project = store
        .add(
            Partition::Project,
            Some(Path::new("src/Page.graphql")),
            "query PageQuery { viewer { name } }",
        )
        .unwrap();

    assert_eq!(store.partition_of(base), Some(Partition::Base));
    assert_eq!(store.partition_of(project), Some(Partition::Project));
    assert_eq!(
        store.base_names().into_iter().collect::<Vec<_>>(),
        vec!["Shared_artist"]
    );
    let order: Vec<_> = store.all().map(|doc| doc.source()).collect();
    assert_eq!(order, vec![base, project]);
}

#[test]
fn update_replaces_every_document_of_a_path() {
    let mut store = DocumentStore::new();
    let path = Path::new("src/Page.graphql");
    store
        .add(Partition::Project, Some(path), "query PageQuery { a }")
        .unwrap();
    store
        .add(Partition::Project, Some(path), "fragment Page_b on B { b }")
        .unwrap();
    store
        .add(
            Partition::Project,
            Some(Path::new("src/Other.graphql")),
            "query OtherQuery { c }",
        )
        .unwrap();

    store
        .update_project(path, "query PageQuery { d }")
        .unwrap();
    let names: Vec<_> = store
        .project()
        .iter()
        .flat_map(|doc| doc.definition_names())
        .collect();
    assert_eq!(names, vec!["OtherQuery", "PageQuery"]);

    assert!(store.remove_project(path));
    assert!(!store.remove_project(path));
    assert_eq!(store.project().len(), 1);
}

#[test]
fn syntax_errors_surface_on_check() {
    let mut store = DocumentStore::new();
    store
        .add(Partition::Project, None, "query Broken { a ")
        .unwrap();
    store
        .add(Partition::Base, None, "fragment Ok_x on X { x }")
        .unwrap();

    let err = store.check_syntax().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert!(err.diagnostics().unwrap().has_errors());
}
