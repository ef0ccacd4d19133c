use indoc::indoc;

use super::ast::{Selection, Type, Value};
use super::*;
use crate::Error;
use crate::diagnostics::{DiagnosticKind, Diagnostics};

fn parse_ok(source: &str) -> Document {
    let (parse, diagnostics) = parse(source, SourceId::default()).expect("no fuel exhaustion");
    assert!(
        diagnostics.is_empty(),
        "unexpected diagnostics: {diagnostics}"
    );
    parse.document()
}

fn parse_err(source: &str) -> Diagnostics {
    let (_, diagnostics) = parse(source, SourceId::default()).expect("no fuel exhaustion");
    assert!(diagnostics.has_errors(), "expected errors for {source:?}");
    diagnostics
}

fn kinds(diagnostics: &Diagnostics) -> Vec<DiagnosticKind> {
    diagnostics.filtered().iter().map(|d| d.kind()).collect()
}

#[test]
fn tree_is_lossless() {
    let source = indoc! {r#"
        # leading comment
        query UserQuery($id: ID!, $first: Int = 10) @live {
          user(id: $id) { name, friends(first: $first) { id } }
        }
    "#};
    let (parse, _) = parse(source, SourceId::default()).unwrap();
    assert_eq!(parse.syntax().to_string(), source);
}

#[test]
fn operation_with_variables_and_directives() {
    let doc = parse_ok(indoc! {r#"
        query UserQuery($id: ID!, $size: [Int!] = [1, 2]) @live {
          me: user(id: $id) @include(if: true) {
            name
          }
        }
    "#});

    let op = doc.operations().next().unwrap();
    assert_eq!(op.operation_type(), OperationType::Query);
    assert_eq!(op.name().unwrap().text(), "UserQuery");

    let vars = op.variable_definitions();
    assert_eq!(vars.len(), 2);
    assert_eq!(vars[0].variable().unwrap().name().unwrap().text(), "id");
    assert_eq!(vars[0].ty().unwrap().to_string(), "ID!");
    assert_eq!(vars[1].ty().unwrap().to_string(), "[Int!]");
    assert!(matches!(vars[1].default_value(), Some(Value::List(_))));

    assert_eq!(op.directives()[0].name().unwrap().text(), "live");

    let selections: Vec<_> = op.selection_set().unwrap().selections().collect();
    let Selection::Field(field) = &selections[0] else {
        panic!("expected field");
    };
    assert_eq!(field.alias().unwrap().text(), "me");
    assert_eq!(field.name().unwrap().text(), "user");
    assert_eq!(field.response_key().as_deref(), Some("me"));
    assert_eq!(field.arguments()[0].name().unwrap().text(), "id");
    assert!(matches!(
        field.arguments()[0].value(),
        Some(Value::Variable(_))
    ));
    assert_eq!(field.directives()[0].name().unwrap().text(), "include");
    assert_eq!(field.selection_set().unwrap().selections().count(), 1);
}

#[test]
fn shorthand_query_is_anonymous() {
    let doc = parse_ok("{ viewer { id } }");
    let op = doc.operations().next().unwrap();
    assert_eq!(op.operation_type(), OperationType::Query);
    assert!(op.name().is_none());
}

#[test]
fn mutation_and_subscription_keywords() {
    let doc = parse_ok("mutation M { like } subscription S { feed }");
    let types: Vec<_> = doc.operations().map(|o| o.operation_type()).collect();
    assert_eq!(types, vec![OperationType::Mutation, OperationType::Subscription]);
}

#[test]
fn keywords_are_valid_field_names() {
    let doc = parse_ok("query Q { type query fragment on }");
    let op = doc.operations().next().unwrap();
    let names: Vec<_> = op
        .selection_set()
        .unwrap()
        .selections()
        .filter_map(|s| match s {
            Selection::Field(f) => f.name().map(|n| n.text().to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["type", "query", "fragment", "on"]);
}

#[test]
fn fragment_spread_and_inline_fragment() {
    let doc = parse_ok(indoc! {r#"
        fragment UserFields on User @relay(plural: false) {
          ...Avatar @defer
          ... on Admin { level }
          ... @include(if: $show) { email }
        }
    "#});

    let fragment = doc.fragments().next().unwrap();
    assert_eq!(fragment.name().unwrap().text(), "UserFields");
    assert_eq!(
        fragment.type_condition().unwrap().name().unwrap().text(),
        "User"
    );
    assert_eq!(fragment.directives().len(), 1);

    let selections: Vec<_> = fragment.selection_set().unwrap().selections().collect();
    assert_eq!(selections.len(), 3);

    let Selection::FragmentSpread(spread) = &selections[0] else {
        panic!("expected spread");
    };
    assert_eq!(spread.name().unwrap().text(), "Avatar");
    assert_eq!(spread.directives()[0].name().unwrap().text(), "defer");

    let Selection::InlineFragment(inline) = &selections[1] else {
        panic!("expected inline fragment");
    };
    assert_eq!(inline.type_condition().unwrap().name().unwrap().text(), "Admin");

    let Selection::InlineFragment(untyped) = &selections[2] else {
        panic!("expected inline fragment");
    };
    assert!(untyped.type_condition().is_none());
    assert_eq!(untyped.directives().len(), 1);
}

#[test]
fn object_and_list_values() {
    let doc = parse_ok(
        r#"{ search(filter: {tags: ["a", "b"], limit: 5, ratio: -1.5e3, mode: FAST}) }"#,
    );
    let op = doc.operations().next().unwrap();
    let Some(Selection::Field(field)) = op.selection_set().unwrap().selections().next() else {
        panic!("expected field");
    };
    let Some(Value::Object(object)) = field.arguments()[0].value() else {
        panic!("expected object value");
    };
    let names: Vec<_> = object
        .fields()
        .map(|f| f.name().unwrap().text().to_string())
        .collect();
    assert_eq!(names, vec!["tags", "limit", "ratio", "mode"]);
}

#[test]
fn type_system_definitions() {
    let doc = parse_ok(indoc! {r#"
        schema { query: Query mutation: Mutation }

        "A thing with an id"
        interface Node { id: ID! }

        type User implements Node & Actor @key(fields: "id") {
          id: ID!
          """
          Display name
          """
          name(format: String = "full"): String @deprecated(reason: "use handle")
        }

        union SearchResult = | User | Page
        enum Color { RED GREEN }
        input Filter { first: Int = 10, after: String }
        scalar DateTime
        directive @live(throttle: Int) repeatable on QUERY | FIELD
        extend type User { age: Int }
        extend schema @link
    "#});

    let defs: Vec<_> = doc.type_system_definitions().collect();
    assert_eq!(defs.len(), 10);

    let TypeSystemDefinition::Schema(schema) = &defs[0] else {
        panic!("expected schema");
    };
    let roots: Vec<_> = schema
        .root_operations()
        .map(|r| {
            (
                r.operation_type().unwrap(),
                r.named_type().unwrap().name().unwrap().text().to_string(),
            )
        })
        .collect();
    assert_eq!(
        roots,
        vec![
            (OperationType::Query, "Query".to_string()),
            (OperationType::Mutation, "Mutation".to_string())
        ]
    );

    assert_eq!(defs[1].description().as_deref(), Some("A thing with an id"));
    assert_eq!(defs[1].name().unwrap().text(), "Node");

    let TypeSystemDefinition::Object(user) = &defs[2] else {
        panic!("expected object type");
    };
    let interfaces: Vec<_> = user
        .implements()
        .iter()
        .map(|t| t.name().unwrap().text().to_string())
        .collect();
    assert_eq!(interfaces, vec!["Node", "Actor"]);
    let fields = user.fields();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[1].description().as_deref(), Some("Display name"));
    assert_eq!(fields[1].arguments()[0].name().unwrap().text(), "format");
    assert_eq!(fields[1].ty().unwrap().to_string(), "String");
    assert!(!defs[2].is_extension());

    let TypeSystemDefinition::Union(union) = &defs[3] else {
        panic!("expected union");
    };
    assert_eq!(union.members().len(), 2);

    let TypeSystemDefinition::Enum(color) = &defs[4] else {
        panic!("expected enum");
    };
    assert_eq!(color.values().len(), 2);

    let TypeSystemDefinition::InputObject(filter) = &defs[5] else {
        panic!("expected input");
    };
    assert_eq!(filter.fields().len(), 2);
    assert!(filter.fields()[0].default_value().is_some());

    assert!(matches!(defs[6], TypeSystemDefinition::Scalar(_)));

    let TypeSystemDefinition::Directive(live) = &defs[7] else {
        panic!("expected directive definition");
    };
    assert_eq!(live.name().unwrap().text(), "live");
    assert!(live.is_repeatable());
    assert_eq!(live.locations(), vec!["QUERY", "FIELD"]);

    assert!(defs[8].is_extension());
    assert_eq!(defs[8].name().unwrap().text(), "User");
    assert!(defs[9].is_extension());
    assert!(defs[9].name().is_none());
}

#[test]
fn nested_types_display() {
    let doc = parse_ok("query Q($ids: [[ID!]!]) { a }");
    let op = doc.operations().next().unwrap();
    let ty = op.variable_definitions()[0].ty().unwrap();
    assert_eq!(ty.to_string(), "[[ID!]!]");
    assert!(matches!(ty, Type::List(_)));
    assert_eq!(ty.named_type().unwrap().name().unwrap().text(), "ID");
}

#[test]
fn unclosed_selection_set() {
    let diagnostics = parse_err("query Q { user { name }");
    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::UnclosedDelimiter]);
    assert!(diagnostics.messages()[0].contains("missing `}`"));
}

#[test]
fn missing_selection_set() {
    let diagnostics = parse_err("query Q");
    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::ExpectedSelectionSet]);
}

#[test]
fn unterminated_string() {
    let diagnostics = parse_err("{ a(b: \"oops) }\n");
    assert!(
        diagnostics
            .iter()
            .any(|d| d.kind() == DiagnosticKind::UnterminatedString)
    );
}

#[test]
fn invalid_character() {
    let diagnostics = parse_err("{ a ? b }");
    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::InvalidCharacter]);
}

#[test]
fn variable_in_default_value() {
    let diagnostics = parse_err("query Q($a: Int = $b) { a }");
    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::VariableInConstValue]);
}

#[test]
fn unknown_top_level_token() {
    let diagnostics = parse_err("banana { a }");
    assert_eq!(diagnostics.iter().next().unwrap().kind(), DiagnosticKind::ExpectedDefinition);
}

#[test]
fn recovery_keeps_later_definitions() {
    let (parse, diagnostics) =
        parse("query A { a ) } query B { b }", SourceId::default()).unwrap();
    assert!(diagnostics.has_errors());
    let names: Vec<_> = parse
        .document()
        .operations()
        .filter_map(|o| o.name().map(|n| n.text().to_string()))
        .collect();
    assert!(names.contains(&"B".to_string()));
}

#[test]
fn recursion_limit_is_fatal() {
    let source = format!("{{ a(x: {}1{}) }}", "[".repeat(50), "]".repeat(50));
    let parser = Parser::new(&source, SourceId::default(), lexer::lex(&source))
        .with_recursion_fuel(Some(16));
    let result = parse_with_parser(parser);
    assert!(matches!(result, Err(Error::RecursionLimitExceeded)));
}

#[test]
fn exec_fuel_is_fatal() {
    let source = "{ a b c d e f g h i j k }";
    let parser =
        Parser::new(source, SourceId::default(), lexer::lex(source)).with_exec_fuel(Some(3));
    let result = parse_with_parser(parser);
    assert!(matches!(result, Err(Error::ExecFuelExhausted)));
}

#[test]
fn block_string_value_strips_indent() {
    assert_eq!(
        lexer::string_value("\"\"\"\n    Hello,\n      World!\n    \"\"\""),
        "Hello,\n  World!"
    );
    assert_eq!(lexer::string_value(r#""a\nbA""#), "a\nbA");
}
