//! Productions used by both executable and type-system definitions:
//! types, values, arguments, and directives.

use crate::diagnostics::DiagnosticKind;
use crate::parser::Parser;
use crate::parser::cst::SyntaxKind;
use crate::parser::cst::token_sets::{ARGUMENT_RECOVERY, VALUE_FIRST};

impl Parser<'_> {
    /// `Name`, `[Type]`, and either followed by `!`.
    pub(super) fn parse_type(&mut self) {
        if !self.enter_recursion() {
            return;
        }
        let checkpoint = self.checkpoint();

        if self.currently_is(SyntaxKind::BracketOpen) {
            self.start_node(SyntaxKind::ListType);
            self.open_delimited(SyntaxKind::BracketOpen);
            self.parse_type_or_error();
            self.close_delimited(SyntaxKind::BracketClose, "]");
            self.finish_node();
        } else {
            self.parse_named_type();
        }

        if self.currently_is(SyntaxKind::Bang) {
            self.start_node_at(checkpoint, SyntaxKind::NonNullType);
            self.bump();
            self.finish_node();
        }
        self.exit_recursion();
    }

    pub(super) fn parse_named_type(&mut self) {
        self.start_node(SyntaxKind::NamedType);
        self.expect_name("for type");
        self.finish_node();
    }

    pub(super) fn parse_variable(&mut self) {
        self.start_node(SyntaxKind::Variable);
        self.bump();
        self.expect_name("after `$`");
        self.finish_node();
    }

    pub(super) fn parse_default_value(&mut self) {
        self.start_node(SyntaxKind::DefaultValue);
        self.bump();
        self.parse_value_or_error(true);
        self.finish_node();
    }

    /// `(name: value ...)`
    pub(super) fn parse_arguments(&mut self, is_const: bool) {
        self.start_node(SyntaxKind::Arguments);
        self.open_delimited(SyntaxKind::ParenOpen);

        while !self.should_stop() && !self.currently_is(SyntaxKind::ParenClose) {
            if self.currently_is(SyntaxKind::Name) {
                self.start_node(SyntaxKind::Argument);
                self.bump();
                self.expect(SyntaxKind::Colon, "`:` after argument name");
                self.parse_value_or_error(is_const);
                self.finish_node();
            } else if self.currently_is_one_of(ARGUMENT_RECOVERY) {
                break;
            } else {
                self.error_and_bump_msg(DiagnosticKind::UnexpectedToken, "expected an argument");
            }
        }

        self.close_delimited(SyntaxKind::ParenClose, ")");
        self.finish_node();
    }

    /// Zero or more `@name(args)`; no node is created when there are none.
    pub(super) fn parse_directives_opt(&mut self, is_const: bool) {
        if !self.currently_is(SyntaxKind::At) {
            return;
        }
        self.start_node(SyntaxKind::Directives);
        while self.currently_is(SyntaxKind::At) {
            self.start_node(SyntaxKind::Directive);
            self.bump();
            self.expect_name("for directive");
            if self.currently_is(SyntaxKind::ParenOpen) {
                self.parse_arguments(is_const);
            }
            self.finish_node();
        }
        self.finish_node();
    }

    pub(super) fn parse_value_or_error(&mut self, is_const: bool) {
        if self.currently_is_one_of(VALUE_FIRST) {
            self.parse_value(is_const);
        } else {
            self.error(DiagnosticKind::ExpectedValue);
        }
    }

    fn parse_value(&mut self, is_const: bool) {
        if !self.enter_recursion() {
            return;
        }
        match self.current() {
            SyntaxKind::Dollar => {
                if is_const {
                    self.error(DiagnosticKind::VariableInConstValue);
                }
                self.parse_variable();
            }
            SyntaxKind::BracketOpen => self.parse_list_value(is_const),
            SyntaxKind::BraceOpen => self.parse_object_value(is_const),
            _ => {
                self.start_node(SyntaxKind::ScalarValue);
                self.bump();
                self.finish_node();
            }
        }
        self.exit_recursion();
    }

    fn parse_list_value(&mut self, is_const: bool) {
        self.start_node(SyntaxKind::ListValue);
        self.open_delimited(SyntaxKind::BracketOpen);
        while !self.should_stop() && !self.currently_is(SyntaxKind::BracketClose) {
            if self.currently_is_one_of(VALUE_FIRST) {
                self.parse_value(is_const);
            } else if self.currently_is_one_of(ARGUMENT_RECOVERY) {
                break;
            } else {
                self.error_and_bump(DiagnosticKind::ExpectedValue);
            }
        }
        self.close_delimited(SyntaxKind::BracketClose, "]");
        self.finish_node();
    }

    fn parse_object_value(&mut self, is_const: bool) {
        self.start_node(SyntaxKind::ObjectValue);
        self.open_delimited(SyntaxKind::BraceOpen);
        while !self.should_stop() && !self.currently_is(SyntaxKind::BraceClose) {
            if self.currently_is(SyntaxKind::Name) {
                self.start_node(SyntaxKind::ObjectField);
                self.bump();
                self.expect(SyntaxKind::Colon, "`:` after field name");
                self.parse_value_or_error(is_const);
                self.finish_node();
            } else if self.currently_is_one_of(ARGUMENT_RECOVERY) {
                break;
            } else {
                self.error_and_bump_msg(DiagnosticKind::UnexpectedToken, "expected `name: value`");
            }
        }
        self.close_delimited(SyntaxKind::BraceClose, "}");
        self.finish_node();
    }
}
