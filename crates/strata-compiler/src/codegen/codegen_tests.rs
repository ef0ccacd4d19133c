use indoc::{formatdoc, indoc};

use super::*;

#[test]
fn source_hash_ignores_formatting() {
    let compact = SourceHash::of_text("query Q($a: Int, $b: Int) { f(a: $a, b: $b) { id } }");
    let spread = SourceHash::of_text(indoc! {r#"
        # leading comment
        query Q($a: Int $b: Int) {
          f(a: $a b: $b) {
            id # trailing
          }
        }
    "#});
    assert_eq!(compact, spread);
    assert_eq!(compact.as_str().len(), 64);

    let changed = SourceHash::of_text("query Q($a: Int, $b: Int) { f(a: $a, b: $b) { ids } }");
    assert_ne!(compact, changed);
}

#[test]
fn source_hash_separates_tokens() {
    assert_ne!(SourceHash::of_text("ab c"), SourceHash::of_text("a bc"));
}

#[test]
fn source_hash_survives_the_module_header() {
    let hash = SourceHash::of_text("fragment F on T { id }");
    let input = ModuleInput {
        module_name: "F",
        document_text: "{}",
        type_text: "",
        source_hash: &hash,
        platform: None,
        runtime_module: DEFAULT_RUNTIME_MODULE,
    };
    let text = JsModuleFormatter.format(&input).unwrap();
    assert_eq!(SourceHash::from_generated(&text), Some(hash));
    assert_eq!(SourceHash::from_generated("// nothing here\n"), None);
    assert_eq!(SourceHash::from_generated(" * @sourceHash abc\n"), None);
}

#[test]
fn module_layout() {
    let hash = SourceHash::of_text("query Q { f }");
    let input = ModuleInput {
        module_name: "Q",
        document_text: "{\n  \"kind\": \"Request\"\n}",
        type_text: "export type Q = {};\n",
        source_hash: &hash,
        platform: Some("ios"),
        runtime_module: "my-runtime",
    };
    let text = JsModuleFormatter.format(&input).unwrap();
    let expected = formatdoc! {r#"
            /**
             * @generated
             * @sourceHash {hash}
             * @platform ios
             */

            /* eslint-disable */

            import type {{ GraphQLNode }} from "my-runtime";

            export type Q = {{}};

            const node: GraphQLNode = {{
              "kind": "Request"
            }};

            (node as any).hash = "{hash}";

            export default node;
        "#};
    assert_eq!(text, expected);
}

#[tokio::test]
async fn digest_persister_is_stable() {
    let first = DigestPersister.persist("query Q { f }").await.unwrap();
    let second = DigestPersister.persist("query Q { f }").await.unwrap();
    let other = DigestPersister.persist("query Q { g }").await.unwrap();
    assert_eq!(first, second);
    assert_ne!(first, other);
    assert_eq!(first.len(), 64);
}
