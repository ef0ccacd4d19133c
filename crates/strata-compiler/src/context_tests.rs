use std::sync::Arc;

use crate::ErrorKind;
use crate::context::CompilerContext;
use crate::ir::{Definition, Location, Operation};
use crate::parser::OperationType;
use crate::schema::Schema;
use crate::test_utils::{ARTIST_SCHEMA, context};

fn operation(name: &str) -> Definition {
    Definition::Operation(Operation {
        name: name.to_string(),
        kind: OperationType::Query,
        root_type: "Query".to_string(),
        variables: Vec::new(),
        directives: Vec::new(),
        selections: Vec::new(),
        location: Location::generated(),
        metadata: Default::default(),
    })
}

#[test]
fn add_returns_new_context() {
    let schema = Arc::new(Schema::default());
    let empty = CompilerContext::new(Arc::clone(&schema), schema);
    let one = empty.add(operation("FirstQuery")).unwrap();
    let two = one.add(operation("SecondQuery")).unwrap();

    assert!(empty.is_empty());
    assert_eq!(one.len(), 1);
    assert_eq!(two.names().collect::<Vec<_>>(), vec!["FirstQuery", "SecondQuery"]);
    assert!(two.operation("SecondQuery").is_some());
    assert!(two.fragment("SecondQuery").is_none());
}

#[test]
fn duplicate_names_are_rejected() {
    let ctx = context(ARTIST_SCHEMA, &["query ViewerQuery { viewer { name } }"]);
    let err = ctx.add(operation("ViewerQuery")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transform);
    assert_eq!(ctx.len(), 1);
}

#[test]
fn map_and_without_leave_receiver_untouched() {
    let ctx = context(
        ARTIST_SCHEMA,
        &["query ViewerQuery { viewer { name } }", "query ArtistsQuery { artists { name } }"],
    );
    let clone = ctx.clone();
    assert!(clone.shares_storage_with(&ctx));

    let dropped = ctx
        .map(|_, def| Ok((def.name() != "ViewerQuery").then(|| def.clone())))
        .unwrap();
    assert_eq!(dropped.names().collect::<Vec<_>>(), vec!["ArtistsQuery"]);
    assert!(!dropped.shares_storage_with(&ctx));

    let without = ctx.without(["ArtistsQuery"]);
    assert_eq!(without.names().collect::<Vec<_>>(), vec!["ViewerQuery"]);
    assert_eq!(ctx.len(), 2);
}
