use indoc::indoc;

use super::*;
use crate::ErrorKind;
use crate::document_store::{DocumentStore, Partition};
use crate::source_map::SourceMap;

const BASE: &str = indoc! {r#"
    interface Node { id: ID! }
    type User implements Node { id: ID! name: String }
    type Query { viewer: User }
"#};

#[test]
fn extension_is_a_superset_and_base_is_untouched() {
    let base = Schema::parse(BASE).unwrap();
    let mut sources = SourceMap::new();
    let ext = sources.add_inline(
        "<extension>",
        indoc! {r#"
            extend type User { isSelected: Boolean }
            type LocalState { draft: String }
            directive @local on FIELD
        "#},
    );

    let extended = base.extend(&sources, &[ext]).unwrap();

    for ty in base.types() {
        assert!(extended.has_type(&ty.name), "lost {}", ty.name);
    }
    assert!(extended.has_type("LocalState"));
    assert!(extended.is_client_type("LocalState"));
    assert!(!extended.is_client_type("User"));
    assert!(extended.field("User", "isSelected").unwrap().is_extension);
    assert!(!extended.field("User", "name").unwrap().is_extension);
    assert!(extended.directive("local").unwrap().is_client);

    assert!(!base.has_type("LocalState"));
    assert!(base.field("User", "isSelected").is_none());
}

#[test]
fn no_extensions_returns_equal_schema() {
    let base = Schema::parse(BASE).unwrap();
    let extended = extend_schema(&base, &SourceMap::new(), &[], &[]).unwrap();
    assert_eq!(extended, base);
}

#[test]
fn extensions_may_reference_types_from_documents() {
    let base = Schema::parse(BASE).unwrap();
    let mut store = DocumentStore::new();
    store
        .add(
            Partition::Project,
            None,
            indoc! {r#"
                type Draft { body: String }
                query ViewerQuery { viewer { id } }
            "#},
        )
        .unwrap();
    let mut sources = store.sources().clone();
    let ext = sources.add_inline("<extension>", "extend type User { draft: Draft }");

    let documents: Vec<_> = store.all().collect();
    let extended = extend_schema(&base, &sources, &[ext], &documents).unwrap();
    assert_eq!(extended.field("User", "draft").unwrap().ty.name(), "Draft");
    assert!(extended.is_client_type("Draft"));
}

#[test]
fn redefining_a_base_type_fails() {
    let base = Schema::parse(BASE).unwrap();
    let mut sources = SourceMap::new();
    let ext = sources.add_inline("<extension>", "type User { other: Int }");
    let err = base.extend(&sources, &[ext]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
    assert_eq!(
        err.diagnostics().unwrap().messages(),
        vec!["type `User` is already defined"]
    );
}

#[test]
fn malformed_extension_text_fails() {
    let base = Schema::parse(BASE).unwrap();
    let mut sources = SourceMap::new();
    let ext = sources.add_inline("<extension>", "extend type User { broken: }");
    let err = base.extend(&sources, &[ext]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
}
