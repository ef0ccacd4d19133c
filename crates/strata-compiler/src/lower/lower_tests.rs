use indoc::indoc;

use super::*;
use crate::ErrorKind;
use crate::ir::print_definitions;
use crate::test_utils::{ARTIST_SCHEMA, lower_source, schema, store};

#[test]
fn identity_field_is_injected() {
    let defs = lower_source(ARTIST_SCHEMA, "query ArtistsQuery { artists { name } }");
    insta::assert_snapshot!(print_definitions(&defs), @r"
    query ArtistsQuery {
      artists {
        __id
        name
      }
    }
    ");
}

#[test]
fn aliased_identity_field_is_not_duplicated() {
    let defs = lower_source(
        ARTIST_SCHEMA,
        "query ArtistsQuery { artists { key: __id name } }",
    );
    insta::assert_snapshot!(print_definitions(&defs), @r"
    query ArtistsQuery {
      artists {
        key: __id
        name
      }
    }
    ");
}

#[test]
fn explicit_identity_field_is_kept_in_place() {
    let defs = lower_source(ARTIST_SCHEMA, "query ArtistsQuery { artists { name __id } }");
    let Some(Selection::Field(artists)) = defs[0].selections().first() else {
        panic!("expected artists field");
    };
    let names: Vec<_> = artists
        .selections
        .iter()
        .filter_map(Selection::as_field)
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(names, vec!["name", "__id"]);
}

#[test]
fn fragments_and_interfaces_get_identity_once() {
    let defs = lower_source(
        ARTIST_SCHEMA,
        indoc! {r#"
            fragment ArtistCard_artist on Artist {
              name
              ... on Artist { bio }
            }
            query NodeQuery($id: ID!) {
              node(id: $id) { ...ArtistCard_artist ... on Album { title } }
              viewer { name }
            }
        "#},
    );
    insta::assert_snapshot!(print_definitions(&defs), @r"
    fragment ArtistCard_artist on Artist {
      __id
      name
      ... on Artist {
        bio
      }
    }

    query NodeQuery($id: ID!) {
      node(id: $id) {
        __id
        ...ArtistCard_artist
        ... on Album {
          title
        }
      }
      viewer {
        name
      }
    }
    ");
}

#[test]
fn inline_fragments_under_unions_get_identity() {
    let defs = lower_source(
        ARTIST_SCHEMA,
        indoc! {r#"
            query FavoriteQuery {
              viewer { favorite { ... on Artist { name } ... on Album { __id } } }
            }
        "#},
    );
    insta::assert_snapshot!(print_definitions(&defs), @r"
    query FavoriteQuery {
      viewer {
        favorite {
          ... on Artist {
            __id
            name
          }
          ... on Album {
            __id
          }
        }
      }
    }
    ");
}

#[test]
fn custom_identity_field() {
    let schema = schema(indoc! {r#"
        interface Entity { uuid: String! key: ID! }
        type Song implements Entity { uuid: String! key: ID! title: String }
        type Query { songs: [Song] }
    "#});
    let store = store(&["query SongsQuery { songs { title } }"]);
    let docs: Vec<_> = store.all().collect();

    let options = LowerOptions::new()
        .identity_interface("Entity")
        .identity_field("uuid");
    let defs = lower(&schema, &docs, &options).unwrap();
    insta::assert_snapshot!(print_definitions(&defs), @r"
    query SongsQuery {
      songs {
        uuid
        title
      }
    }
    ");

    let options = LowerOptions::new().identity_interface("Entity");
    let defaulted = lower(&schema, &docs, &options).unwrap();
    let Some(Selection::Field(songs)) = defaulted[0].selections().first() else {
        panic!("expected songs field");
    };
    assert_eq!(songs.selections[0].as_field().unwrap().name, "key");
}

#[test]
fn conditions_wrap_selections() {
    let defs = lower_source(
        ARTIST_SCHEMA,
        indoc! {r#"
            query ViewerQuery($show: Boolean!) {
              viewer {
                name @include(if: $show) @skip(if: false)
              }
            }
        "#},
    );
    let Some(Selection::Field(viewer)) = defs[0].selections().first() else {
        panic!("expected viewer field");
    };
    let Selection::Condition(include) = &viewer.selections[0] else {
        panic!("expected include condition");
    };
    assert!(include.passing_value);
    assert_eq!(include.condition, Value::Variable("show".into()));
    let Selection::Condition(skip) = &include.selections[0] else {
        panic!("expected nested skip condition");
    };
    assert_eq!(skip.static_outcome(), Some(true));

    insta::assert_snapshot!(print_definitions(&defs), @r"
    query ViewerQuery($show: Boolean!) {
      viewer {
        name @include(if: $show) @skip(if: false)
      }
    }
    ");
}

#[test]
fn arguments_are_typed() {
    let defs = lower_source(
        ARTIST_SCHEMA,
        r#"query SearchQuery { search(filter: {genre: ROCK, first: 5, tags: "solo"}) { name } }"#,
    );
    let Some(Selection::Field(search)) = defs[0].selections().first() else {
        panic!("expected search field");
    };
    assert_eq!(
        search.arguments[0].value,
        Value::Object(vec![
            ("genre".into(), Value::Enum("ROCK".into())),
            ("first".into(), Value::Int(5)),
            ("tags".into(), Value::String("solo".into())),
        ])
    );
    assert_eq!(search.location.path, None);
    assert_eq!(search.parent_type, "Query");
    assert_eq!(search.ty.to_string(), "[Artist!]!");
}

#[test]
fn invalid_values_are_lowering_errors() {
    let schema = schema(ARTIST_SCHEMA);
    let store = store(&[
        r#"query SearchQuery { search(filter: {genre: JAZZ, first: "5"}) { name } }"#,
    ]);
    let docs: Vec<_> = store.all().collect();
    let err = lower(&schema, &docs, &LowerOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Lowering);
    assert_eq!(
        err.diagnostics().unwrap().messages(),
        vec!["expected `Genre`, found `JAZZ`", "expected `Int`, found `\"5\"`"]
    );
}

#[test]
fn unresolved_spread_names_fragment_and_definition() {
    let schema = schema(ARTIST_SCHEMA);
    let store = store(&["query ViewerQuery { viewer { ...Missing_viewer } }"]);
    let docs: Vec<_> = store.all().collect();
    let err = lower(&schema, &docs, &LowerOptions::default()).unwrap_err();
    assert_eq!(
        err.diagnostics().unwrap().messages(),
        vec!["fragment `Missing_viewer` referenced by `ViewerQuery` is not defined"]
    );
}

#[test]
fn base_and_project_collision() {
    let schema = schema(ARTIST_SCHEMA);
    let mut store = store(&["query ViewerQuery { viewer { name } }"]);
    store
        .add(
            crate::document_store::Partition::Base,
            None,
            "query ViewerQuery { viewer { name } }",
        )
        .unwrap();
    let docs: Vec<_> = store.all().collect();
    let err = lower(&schema, &docs, &LowerOptions::default()).unwrap_err();
    let diagnostics = err.diagnostics().unwrap();
    assert_eq!(
        diagnostics.iter().next().unwrap().kind(),
        DiagnosticKind::DefinitionCollision
    );
}

#[test]
fn locations_carry_document_path() {
    let schema = schema(ARTIST_SCHEMA);
    let mut store = crate::document_store::DocumentStore::new();
    store
        .add(
            crate::document_store::Partition::Project,
            Some(std::path::Path::new("src/artists/Artists.graphql")),
            "query ArtistsQuery { artists { name } }",
        )
        .unwrap();
    let docs: Vec<_> = store.all().collect();
    let defs = lower(&schema, &docs, &LowerOptions::default()).unwrap();
    assert_eq!(
        defs[0].location().directory(),
        Some(std::path::Path::new("src/artists"))
    );
}
