use std::sync::{Arc, Mutex};

use indoc::indoc;

use super::*;
use crate::ErrorKind;
use crate::ir::{Selection, print_definition, print_definitions};
use crate::reporter::NullReporter;
use crate::test_utils::{ARTIST_SCHEMA, RecordingReporter, context};

fn print(ctx: &CompilerContext) -> String {
    print_definitions(ctx.definitions())
}

#[test]
fn skip_unreachable_resolves_literal_conditions() {
    let ctx = context(
        ARTIST_SCHEMA,
        &[indoc! {r#"
            query ArtistQuery($x: Boolean!) {
              artist(id: "1") {
                name @include(if: false)
                bio @skip(if: false)
                genre @include(if: $x)
              }
              viewer {
                name @skip(if: true)
              }
            }
        "#}],
    );
    let out = skip_unreachable(&ctx).unwrap();
    insta::assert_snapshot!(print(&out), @r#"
    query ArtistQuery($x: Boolean!) {
      artist(id: "1") {
        __id
        bio
        genre @include(if: $x)
      }
    }
    "#);
}

#[test]
fn flatten_merges_fields_and_inline_fragments() {
    let ctx = context(
        ARTIST_SCHEMA,
        &[indoc! {r#"
            query ArtistQuery {
              artist(id: "1") {
                name
                ... on Artist { bio }
                ... { name }
                albums(first: 2) { title }
                albums(first: 2) { year }
              }
              node(id: "1") {
                ... on Artist { name }
                ... on Artist { bio }
              }
            }
        "#}],
    );
    let out = flatten(&ctx).unwrap();
    insta::assert_snapshot!(print(&out), @r#"
    query ArtistQuery {
      artist(id: "1") {
        __id
        name
        bio
        albums(first: 2) {
          __id
          title
          year
        }
      }
      node(id: "1") {
        __id
        ... on Artist {
          name
          bio
        }
      }
    }
    "#);
}

#[test]
fn flatten_keeps_fields_with_different_arguments_apart() {
    let ctx = context(
        ARTIST_SCHEMA,
        &[indoc! {r#"
            query ArtistQuery {
              artist(id: "1") {
                albums(first: 1) { title }
                albums(first: 2) { title }
              }
            }
        "#}],
    );
    let out = flatten(&ctx).unwrap();
    let query = out.get("ArtistQuery").unwrap();
    let Some(Selection::Field(artist)) = query.selections().first() else {
        panic!("expected artist field");
    };
    let albums = artist
        .selections
        .iter()
        .filter_map(Selection::as_field)
        .filter(|f| f.name == "albums")
        .count();
    assert_eq!(albums, 2);
}

#[test]
fn skip_redundant_nodes_drops_already_fetched_fields() {
    let ctx = context(
        ARTIST_SCHEMA,
        &[indoc! {r#"
            query ArtistQuery($x: Boolean!) {
              artist(id: "1") {
                name
                ... on Artist { name bio }
                name @include(if: $x)
                albums(first: 1) { title }
                albums(first: 1) { title year }
              }
            }
        "#}],
    );
    let out = skip_redundant_nodes(&ctx).unwrap();
    insta::assert_snapshot!(print(&out), @r#"
    query ArtistQuery($x: Boolean!) {
      artist(id: "1") {
        __id
        name
        ... on Artist {
          bio
        }
        albums(first: 1) {
          __id
          title
        }
        albums(first: 1) {
          year
        }
      }
    }
    "#);
}

#[test]
fn generate_typename_on_abstract_selections() {
    let ctx = context(
        ARTIST_SCHEMA,
        &[indoc! {r#"
            query SearchQuery {
              node(id: "1") { ... on Artist { name } }
              viewer { favorite { ... on Album { title } } }
            }
            fragment Result_item on SearchResult { ... on Artist { name } }
        "#}],
    );
    let out = generate_typename(&ctx).unwrap();
    insta::assert_snapshot!(print(&out), @r#"
    query SearchQuery {
      node(id: "1") {
        __typename
        __id
        ... on Artist {
          name
        }
      }
      viewer {
        favorite {
          __typename
          ... on Album {
            __id
            title
          }
        }
      }
    }

    fragment Result_item on SearchResult {
      __typename
      ... on Artist {
        __id
        name
      }
    }
    "#);

    let again = generate_typename(&out).unwrap();
    assert_eq!(print(&again), print(&out));
}

#[test]
fn inline_fragments_replaces_spreads_and_drops_fragments() {
    let ctx = context(
        ARTIST_SCHEMA,
        &[indoc! {r#"
            fragment ArtistName_artist on Artist { name }
            query ArtistQuery { artist(id: "1") { ...ArtistName_artist } }
        "#}],
    );
    let out = inline_fragments(&ctx).unwrap();
    insta::assert_snapshot!(print(&out), @r#"
    query ArtistQuery {
      artist(id: "1") {
        __id
        ... on Artist {
          __id
          name
        }
      }
    }
    "#);
    assert!(!out.contains("ArtistName_artist"));
    assert!(ctx.contains("ArtistName_artist"));
}

#[test]
fn inline_fragments_reports_cycles_with_step_name() {
    let ctx = context(
        ARTIST_SCHEMA,
        &[indoc! {r#"
            fragment A_artist on Artist { ...B_artist }
            fragment B_artist on Artist { ...A_artist }
            query CycleQuery { artist(id: "1") { ...A_artist } }
        "#}],
    );
    let pipeline = Pipeline::new("custom").step(builtin("inline_fragments").unwrap());
    let err = pipeline.apply(&ctx, &NullReporter).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transform);
    assert_eq!(
        err.to_string(),
        "transform `inline_fragments` in pipeline `custom` failed: \
         fragment cycle: A_artist -> B_artist -> A_artist"
    );
}

#[test]
fn skip_client_extensions_removes_client_fields_and_types() {
    let ctx = context(
        ARTIST_SCHEMA,
        &[
            indoc! {r#"
                extend type Artist { isFavorite: Boolean }
                type Badge { label: String }
                extend type Viewer { badge: Badge }
            "#},
            indoc! {r#"
                query ViewerQuery {
                  viewer { name badge { label } }
                  artist(id: "1") { name isFavorite }
                }
            "#},
        ],
    );
    let out = skip_client_extensions(&ctx).unwrap();
    insta::assert_snapshot!(print(&out), @r#"
    query ViewerQuery {
      viewer {
        name
      }
      artist(id: "1") {
        __id
        name
      }
    }
    "#);
    assert!(print(&ctx).contains("isFavorite"));
}

#[test]
fn filter_directives_strips_client_directives() {
    let ctx = context(
        ARTIST_SCHEMA,
        &[indoc! {r#"
            fragment ArtistBio_artist on Artist { bio }
            query ArtistQuery($x: Boolean!) {
              artist(id: "1") {
                ...ArtistBio_artist @defer @include(if: $x)
              }
            }
        "#}],
    );
    let out = filter_directives(&ctx).unwrap();
    let printed = print_definition(out.get("ArtistQuery").unwrap());
    insta::assert_snapshot!(printed, @r#"
    query ArtistQuery($x: Boolean!) {
      artist(id: "1") {
        __id
        ...ArtistBio_artist @include(if: $x)
      }
    }
    "#);
}

#[test]
fn split_deferred_creates_derived_operation() {
    let ctx = context(
        ARTIST_SCHEMA,
        &[indoc! {r#"
            fragment ArtistBio_artist on Artist { bio }
            query ArtistQuery($id: ID!) {
              artist(id: $id) { name ...ArtistBio_artist @defer }
            }
        "#}],
    );
    let out = split_deferred(&ctx).unwrap();
    let names: Vec<_> = out.names().collect();
    assert_eq!(
        names,
        vec![
            "ArtistBio_artist",
            "ArtistQuery",
            "ArtistQuery$defer$ArtistBio_artist"
        ]
    );

    let derived = out.get("ArtistQuery$defer$ArtistBio_artist").unwrap();
    insta::assert_snapshot!(print_definition(derived), @r"
    query ArtistQuery$defer$ArtistBio_artist($id: ID!) {
      ...ArtistBio_artist
    }
    ");
    assert_eq!(derived.type_name(), "Artist");
    assert_eq!(derived.metadata()["deferred"], serde_json::json!(true));
    assert_eq!(derived.metadata()["parent"], serde_json::json!("ArtistQuery"));

    let parent = out.get("ArtistQuery").unwrap();
    assert_eq!(
        parent.metadata()["deferred_fragments"],
        serde_json::json!(["ArtistBio_artist"])
    );
    assert!(!print_definition(parent).contains("@defer"));
}

#[test]
fn split_deferred_ignores_disabled_defer() {
    let ctx = context(
        ARTIST_SCHEMA,
        &[indoc! {r#"
            fragment ArtistBio_artist on Artist { bio }
            query ArtistQuery {
              artist(id: "1") { ...ArtistBio_artist @defer(if: false) }
            }
        "#}],
    );
    let out = split_deferred(&ctx).unwrap();
    assert_eq!(out.len(), 2);
    assert!(!print(&out).contains("@defer"));
}

#[test]
fn pipeline_runs_steps_in_order_and_leaves_input_intact() {
    let ctx = context(ARTIST_SCHEMA, &["query ViewerQuery { viewer { name } }"]);
    let before = print(&ctx);
    let seen = Arc::new(Mutex::new(Vec::new()));

    let record = |name: &'static str| {
        let seen = Arc::clone(&seen);
        Transform::new(name, move |ctx: &CompilerContext| {
            seen.lock().unwrap().push(name);
            ctx.map(|_, def| Ok(Some(def.clone())))
        })
    };
    let pipeline = Pipeline::new("ordered")
        .step(record("first"))
        .step(record("second"))
        .step(record("third"));
    let reporter = RecordingReporter::default();
    let out = pipeline.apply(&ctx, &reporter).unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
    assert_eq!(print(&out), before);
    assert_eq!(print(&ctx), before);
    assert_eq!(reporter.messages().len(), 1);
    assert!(reporter.messages()[0].starts_with("ordered: 3 transforms"));
}

#[test]
fn failing_step_names_pipeline_and_step() {
    let ctx = context(ARTIST_SCHEMA, &["query ViewerQuery { viewer { name } }"]);
    let pipeline = Pipeline::new("custom")
        .step(builtin("flatten").unwrap())
        .step(Transform::new("boom", |_: &CompilerContext| Err(step_error("bad input"))));
    let err = pipeline.apply(&ctx, &NullReporter).unwrap_err();
    let Error::Transform {
        pipeline,
        step,
        message,
    } = err
    else {
        panic!("expected transform error");
    };
    assert_eq!(pipeline, "custom");
    assert_eq!(step, "boom");
    assert_eq!(message, "bad input");
}

#[test]
fn default_pipelines_derive_independent_contexts() {
    let ctx = context(
        ARTIST_SCHEMA,
        &[indoc! {r#"
            fragment ArtistName_artist on Artist { name }
            query ArtistQuery { artist(id: "1") { ...ArtistName_artist } }
        "#}],
    );
    let before = print(&ctx);
    let reporter = RecordingReporter::default();
    let contexts = Pipelines::default().apply_all(&ctx, &reporter).unwrap();

    assert!(contexts.query_execution.fragment("ArtistName_artist").is_none());
    assert!(contexts.type_generation.fragment("ArtistName_artist").is_some());
    assert!(contexts.artifact.fragment("ArtistName_artist").is_some());
    assert_eq!(print(&ctx), before);

    let pipelines: Vec<_> = reporter
        .messages()
        .iter()
        .map(|m| m.split(':').next().unwrap().to_string())
        .collect();
    assert_eq!(pipelines, vec!["type-generation", "query-execution", "artifact"]);

    insta::assert_snapshot!(print(&contexts.query_execution), @r#"
    query ArtistQuery {
      artist(id: "1") {
        __id
        name
      }
    }
    "#);
}

#[test]
fn builtin_lookup() {
    assert!(builtin("flatten").is_some());
    assert!(builtin("split_deferred").is_some());
    assert!(builtin("nope").is_none());
    assert!(Pipelines::default().get(QUERY_EXECUTION).is_some());
    assert!(matches!(
        Pipelines::default().get("artifact").unwrap().steps()[1].name(),
        "split_deferred"
    ));
}
