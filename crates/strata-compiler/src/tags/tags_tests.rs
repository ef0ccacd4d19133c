use std::path::Path;

use indoc::indoc;

use super::*;
use crate::ErrorKind;
use crate::document_store::DocumentStore;

const MODULE_PATH: &str = "src/FindGraphQLTags.js";

fn extract(text: &str) -> Vec<ExtractedTag> {
    TemplateTagExtractor
        .extract(text, Path::new(MODULE_PATH))
        .unwrap()
}

fn parse(text: &str) -> (DocumentStore, Result<Vec<SourceId>>) {
    let mut store = DocumentStore::new();
    let result = parse_module(
        &mut store,
        Path::new(MODULE_PATH),
        text,
        &TemplateTagExtractor,
        ModuleOptions::new().validate_names(true),
    );
    (store, result)
}

fn messages(err: &Error) -> Vec<String> {
    err.diagnostics()
        .unwrap()
        .messages()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[test]
fn tags_carry_position_and_prop() {
    let tags = extract(indoc! {r#"
        import { graphql } from "strata-runtime";

        // graphql`query Ignored { a }`
        const label = "graphql`not a tag`";
        export default createContainer(Component, {
          artist: graphql`fragment FindGraphQLTags_artist on Artist { name }`,
        });
        const query = graphql`
          query FindGraphQLTagsQuery { viewer { name } }
        `;
    "#});

    assert_eq!(tags.len(), 2);
    assert_eq!(
        tags[0].text,
        "fragment FindGraphQLTags_artist on Artist { name }"
    );
    assert_eq!(tags[0].start, LineCol::new(5, 18));
    assert_eq!(tags[0].prop.as_deref(), Some("artist"));

    assert_eq!(tags[1].start, LineCol::new(7, 22));
    assert_eq!(tags[1].prop, None);
    assert!(tags[1].text.contains("query FindGraphQLTagsQuery"));
}

#[test]
fn substitutions_are_rejected() {
    let err = TemplateTagExtractor
        .extract(
            "const q = graphql`query Q { ${field} }`;",
            Path::new(MODULE_PATH),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Extract);
    assert_eq!(
        err.to_string(),
        "src/FindGraphQLTags.js: 1:18: graphql tags cannot contain substitutions"
    );
}

#[test]
fn operation_named_after_module_is_accepted() {
    let (store, result) = parse("graphql`query FindGraphQLTagsQuery { viewer { name } }`;");
    let ids = result.unwrap();
    assert_eq!(ids.len(), 1);
    assert_eq!(store.project().len(), 1);
    assert_eq!(
        store.project()[0].definition_names(),
        vec!["FindGraphQLTagsQuery"]
    );
}

#[test]
fn operation_not_named_after_module_is_rejected() {
    let (store, result) = parse("graphql`query NotModuleName { viewer { name } }`;");
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(
        messages(&err),
        vec![
            "Operation names in graphql tags must be prefixed with the module name and end in \"Mutation\", \"Query\", or \"Subscription\". Got `NotModuleName` in module `FindGraphQLTags`."
        ]
    );
    assert!(store.project().is_empty());
}

#[test]
fn container_fragments_are_named_after_their_prop() {
    let (_, result) = parse(indoc! {r#"
        createContainer(Component, {
          foo: graphql`fragment FindGraphQLTags_bar on Artist { name }`,
        });
    "#});
    assert_eq!(
        messages(&result.unwrap_err()),
        vec![
            "Container fragment names must be `<ModuleName>_<propName>`. Got `FindGraphQLTags_bar`, expected `FindGraphQLTags_foo`."
        ]
    );

    let (_, result) = parse(indoc! {r#"
        createContainer(Component, {
          foo: graphql`fragment FindGraphQLTags_foo on Artist { name }`,
        });
    "#});
    assert!(result.is_ok());
}

#[test]
fn name_checks_are_optional() {
    let mut store = DocumentStore::new();
    let ids = parse_module(
        &mut store,
        Path::new(MODULE_PATH),
        "graphql`query Anything { viewer { name } }`;",
        &TemplateTagExtractor,
        ModuleOptions::new(),
    )
    .unwrap();
    assert_eq!(ids.len(), 1);
}

#[test]
fn syntax_errors_point_into_the_module() {
    let (store, result) = parse(indoc! {r#"
        const a = 1;
        export const q = graphql`
          query FindGraphQLTagsQuery { artist(id: ) { name } }
        `;
    "#});
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    let rendered = err.diagnostics().unwrap().render_locations(store.sources());
    assert!(
        rendered.starts_with("src/FindGraphQLTags.js:3:"),
        "{rendered}"
    );
}
