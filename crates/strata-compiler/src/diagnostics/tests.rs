use rowan::TextRange;

use super::*;
use crate::source_map::LineCol;

fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(start.into(), end.into())
}

#[test]
fn severity_display() {
    insta::assert_snapshot!(format!("{}", Severity::Error), @"error");
    insta::assert_snapshot!(format!("{}", Severity::Warning), @"warning");
}

#[test]
fn report_with_default_message() {
    let sources = SourceMap::one_liner("query { a }");
    let id = sources.iter().next().unwrap().id;
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(id, DiagnosticKind::ExpectedName, range(0, 5))
        .emit();

    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics.has_errors());
    assert_eq!(diagnostics.messages(), vec!["expected a name"]);
}

#[test]
fn report_with_custom_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(SourceId::default(), DiagnosticKind::UnknownFragment, range(0, 5))
        .message("UserFragment")
        .emit();

    assert_eq!(diagnostics.messages(), vec!["unknown fragment `UserFragment`"]);
}

#[test]
fn unused_variable_is_warning() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(SourceId::default(), DiagnosticKind::UnusedVariable, range(0, 3))
        .message("id")
        .emit();

    assert!(!diagnostics.has_errors());
    assert!(diagnostics.has_warnings());
    assert_eq!(diagnostics.warning_count(), 1);
    assert!(diagnostics.errors().is_empty());
}

#[test]
fn display_includes_related_and_hints() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(SourceId::default(), DiagnosticKind::DuplicateDefinition, range(6, 10))
        .message("UserQuery")
        .related_to(SourceId::default(), range(20, 24), "first defined here")
        .hint("rename one of them")
        .emit();

    insta::assert_snapshot!(diagnostics.to_string(), @"error at 6..10: `UserQuery` is already defined (related: first defined here at 20..24) (hint: rename one of them)");
}

#[test]
fn render_locations_uses_file_coordinates() {
    let mut sources = SourceMap::new();
    let file = sources.add_file("schema.graphql", "type Query {\n  me: User\n}\n");
    let tag = sources.add_embedded("src/Profile.js", LineCol::new(4, 20), "\n  query {\n    me\n");

    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(file, DiagnosticKind::UnknownSchemaType, range(19, 23))
        .message("User")
        .emit();
    diagnostics
        .report(tag, DiagnosticKind::ExpectedName, range(3, 8))
        .emit();
    diagnostics
        .report(tag, DiagnosticKind::UnexpectedToken, range(0, 0))
        .message("`}`")
        .emit();

    insta::assert_snapshot!(diagnostics.render_locations(&sources), @r"
    schema.graphql:2:7: error: unknown type `User` in schema
    src/Profile.js:6:3: error: expected a name
    src/Profile.js:5:21: error: unexpected token: `}`
    ");
}

#[test]
fn printer_renders_snippet_with_path() {
    let mut sources = SourceMap::new();
    let id = sources.add_file("ops.graphql", "query Q { nope }");
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(id, DiagnosticKind::UnknownField, range(10, 14))
        .raw_message("field `nope` does not exist on type `Query`")
        .emit();

    let rendered = diagnostics.render(&sources);
    assert!(rendered.contains("error: field `nope` does not exist on type `Query`"));
    assert!(rendered.contains("ops.graphql"));
    assert!(rendered.contains("query Q { nope }"));
}

#[test]
fn printer_handles_empty_range_at_eof() {
    let mut sources = SourceMap::new();
    let id = sources.add_inline("<query>", "query Q {");
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(id, DiagnosticKind::UnclosedDelimiter, range(9, 9))
        .message("missing `}`")
        .emit();

    let rendered = diagnostics.render(&sources);
    assert!(rendered.contains("unclosed delimiter: missing `}`"));
}

#[test]
fn filtered_suppresses_contained_lower_priority() {
    let mut diagnostics = Diagnostics::new();
    let src = SourceId::default();
    diagnostics
        .report(src, DiagnosticKind::UnclosedDelimiter, range(0, 20))
        .emit();
    diagnostics
        .report(src, DiagnosticKind::UnexpectedToken, range(5, 6))
        .emit();
    diagnostics
        .report(src, DiagnosticKind::UnknownField, range(25, 30))
        .emit();

    let filtered = diagnostics.filtered();
    assert_eq!(filtered.len(), 2);
    let kinds: Vec<_> = filtered.iter().map(|d| d.kind()).collect();
    assert_eq!(
        kinds,
        vec![DiagnosticKind::UnclosedDelimiter, DiagnosticKind::UnknownField]
    );
}

#[test]
fn filtered_keeps_diagnostics_from_other_sources() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(SourceId(0), DiagnosticKind::UnclosedDelimiter, range(0, 20))
        .emit();
    diagnostics
        .report(SourceId(1), DiagnosticKind::UnexpectedToken, range(5, 6))
        .emit();

    assert_eq!(diagnostics.filtered().len(), 2);
}

#[test]
fn sorted_is_order_independent() {
    let mut a = Diagnostics::new();
    a.report(SourceId(1), DiagnosticKind::UnknownType, range(4, 5)).emit();
    a.report(SourceId(0), DiagnosticKind::UnknownField, range(9, 12)).emit();

    let mut b = Diagnostics::new();
    b.report(SourceId(0), DiagnosticKind::UnknownField, range(9, 12)).emit();
    b.report(SourceId(1), DiagnosticKind::UnknownType, range(4, 5)).emit();

    assert_eq!(a.sorted(), b.sorted());
}
