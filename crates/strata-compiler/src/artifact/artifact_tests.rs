use std::collections::BTreeSet;

use indoc::indoc;
use serde_json::json;

use super::*;
use crate::ErrorKind;
use crate::reporter::NullReporter;
use crate::test_utils::{ARTIST_SCHEMA, context};
use crate::transform::Pipelines;

const ARTIST_QUERY: &str = indoc! {r#"
    query ArtistQuery($id: ID!) {
      artist(id: $id) { ...ArtistBio_artist }
    }
    fragment ArtistBio_artist on Artist { bio }
"#};

fn contexts(documents: &[&str]) -> Contexts {
    let ctx = context(ARTIST_SCHEMA, documents);
    Pipelines::default().apply_all(&ctx, &NullReporter).unwrap()
}

fn names(artifacts: &[Artifact]) -> Vec<&str> {
    artifacts.iter().map(|a| a.name.as_str()).collect()
}

#[test]
fn operations_become_requests_and_fragments_stay_fragments() {
    let artifacts = compile_artifacts(&contexts(&[ARTIST_QUERY]), &BTreeSet::new()).unwrap();
    assert_eq!(names(&artifacts), vec!["ArtistQuery", "ArtistBio_artist"]);
    assert_eq!(artifacts[0].kind, ArtifactKind::Request);
    assert_eq!(artifacts[1].kind, ArtifactKind::Fragment);
    assert!(artifacts.iter().all(Artifact::is_writable));

    insta::assert_snapshot!(artifacts[0].request_text().unwrap(), @r"
    query ArtistQuery($id: ID!) {
      artist(id: $id) {
        __id
        bio
      }
    }
    ");
}

#[test]
fn base_names_are_skipped() {
    let base: BTreeSet<String> = ["ArtistBio_artist".to_string()].into();
    let artifacts = compile_artifacts(&contexts(&[ARTIST_QUERY]), &base).unwrap();
    assert_eq!(names(&artifacts), vec!["ArtistQuery"]);
}

#[test]
fn deferred_operations_are_recorded_but_not_writable() {
    let artifacts = compile_artifacts(
        &contexts(&[indoc! {r#"
            query ArtistQuery {
              artist(id: "1") { ...ArtistBio_artist @defer }
            }
            fragment ArtistBio_artist on Artist { bio }
        "#}]),
        &BTreeSet::new(),
    )
    .unwrap();
    assert_eq!(
        names(&artifacts),
        vec![
            "ArtistQuery",
            "ArtistBio_artist",
            "ArtistQuery$defer$ArtistBio_artist"
        ]
    );
    let split = &artifacts[2];
    assert_eq!(split.kind, ArtifactKind::SplitOperation);
    assert!(split.deferred);
    assert!(!split.is_writable());
    assert!(split.params.is_none());
}

#[test]
fn missing_type_generation_definition_is_fatal() {
    let mut contexts = contexts(&[ARTIST_QUERY]);
    contexts.type_generation = contexts.type_generation.without(["ArtistBio_artist"]);
    let err = compile_artifacts(&contexts, &BTreeSet::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Artifact);
    assert_eq!(
        err.to_string(),
        "artifact `ArtistBio_artist`: missing from the type-generation context"
    );
}

#[test]
fn request_node_json() {
    let contexts = contexts(&[ARTIST_QUERY]);
    let artifacts = compile_artifacts(&contexts, &BTreeSet::new()).unwrap();
    let json = artifacts[0].to_json(contexts.artifact.schema()).unwrap();

    assert_eq!(json["kind"], "Request");
    assert_eq!(json["params"]["name"], "ArtistQuery");
    assert_eq!(json["params"]["operationKind"], "query");
    assert_eq!(json["params"]["id"], serde_json::Value::Null);
    assert_eq!(json["fragment"]["kind"], "Fragment");
    assert_eq!(
        json["fragment"]["argumentDefinitions"][0],
        json!({ "kind": "LocalArgument", "name": "id", "type": "ID!", "defaultValue": null })
    );
    assert_eq!(
        json["fragment"]["selections"][0]["selections"][1],
        json!({ "kind": "FragmentSpread", "name": "ArtistBio_artist" })
    );
    assert_eq!(json["operation"]["kind"], "Operation");
    assert_eq!(
        json["operation"]["selections"][0],
        json!({
            "kind": "LinkedField",
            "alias": null,
            "name": "artist",
            "args": [{ "kind": "Variable", "name": "id", "variableName": "id" }],
            "concreteType": "Artist",
            "plural": false,
            "selections": [
                { "kind": "ScalarField", "alias": null, "name": "__id" },
                { "kind": "ScalarField", "alias": null, "name": "bio" }
            ]
        })
    );
}

#[test]
fn persisted_requests_carry_the_id_instead_of_text() {
    let contexts = contexts(&[ARTIST_QUERY]);
    let artifacts = compile_artifacts(&contexts, &BTreeSet::new()).unwrap();
    let persisted = artifacts[0].clone().persisted("q1");
    assert_eq!(persisted.request_text(), None);

    let json = persisted.to_json(contexts.artifact.schema()).unwrap();
    assert_eq!(json["params"]["id"], "q1");
    assert_eq!(json["params"]["text"], serde_json::Value::Null);
}

#[test]
fn abstract_linked_fields_have_no_concrete_type() {
    let contexts = contexts(&["query NodeQuery { node(id: \"1\") { ... on Album { title } } }"]);
    let artifacts = compile_artifacts(&contexts, &BTreeSet::new()).unwrap();
    let json = artifacts[0].to_json(contexts.artifact.schema()).unwrap();
    let node = &json["fragment"]["selections"][0];
    assert_eq!(node["kind"], "LinkedField");
    assert_eq!(node["concreteType"], serde_json::Value::Null);
}
