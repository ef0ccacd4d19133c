//! Grammar productions for GraphQL documents.
//!
//! This module implements all `parse_*` methods as an extension of `Parser`.
//! One grammar covers executable documents and type-system documents, so a
//! single file may mix operations, fragments, and schema extensions.

mod executable;
mod shared;
mod type_system;

use crate::diagnostics::DiagnosticKind;
use crate::parser::Parser;
use crate::parser::cst::SyntaxKind;
use crate::parser::cst::token_sets::DESCRIPTION_FIRST;

impl Parser<'_> {
    pub(crate) fn parse_document(&mut self) {
        self.start_node(SyntaxKind::Document);

        while !self.should_stop() {
            self.parse_definition();
        }

        self.eat_trivia();
        self.finish_node();
    }

    fn parse_definition(&mut self) {
        if self.currently_is(SyntaxKind::BraceOpen) {
            self.parse_operation();
            return;
        }

        if self.currently_is_one_of(DESCRIPTION_FIRST) {
            self.parse_type_system_definition();
            return;
        }

        if !self.currently_is(SyntaxKind::Name) {
            self.error_and_bump_msg(
                DiagnosticKind::ExpectedDefinition,
                "try `query`, `fragment`, `type`, or `extend`",
            );
            return;
        }

        match self.current_text() {
            "query" | "mutation" | "subscription" => self.parse_operation(),
            "fragment" => self.parse_fragment(),
            "schema" | "scalar" | "type" | "interface" | "union" | "enum" | "input"
            | "directive" | "extend" => self.parse_type_system_definition(),
            _ => self.error_and_bump_msg(
                DiagnosticKind::ExpectedDefinition,
                "try `query`, `fragment`, `type`, or `extend`",
            ),
        }
    }
}
