use crate::diagnostics::DiagnosticKind;
use crate::parser::Parser;
use crate::parser::cst::SyntaxKind;
use crate::parser::cst::token_sets::{SELECTION_FIRST, SELECTION_RECOVERY, TYPE_FIRST};

impl Parser<'_> {
    /// `query Name($v: T) @dir { ... }` or the `{ ... }` shorthand.
    pub(super) fn parse_operation(&mut self) {
        self.start_node(SyntaxKind::OperationDefinition);

        if self.currently_is(SyntaxKind::BraceOpen) {
            self.parse_selection_set();
            self.finish_node();
            return;
        }

        self.bump_remap(SyntaxKind::Keyword);
        self.eat_token(SyntaxKind::Name);

        if self.currently_is(SyntaxKind::ParenOpen) {
            self.parse_variable_definitions();
        }
        self.parse_directives_opt(false);
        self.expect_selection_set("operation");

        self.finish_node();
    }

    /// `fragment Name on Type @dir { ... }`
    pub(super) fn parse_fragment(&mut self) {
        self.start_node(SyntaxKind::FragmentDefinition);
        self.bump_remap(SyntaxKind::Keyword);

        if self.at_keyword("on") {
            self.error_msg(DiagnosticKind::ExpectedName, "fragments must be named");
        } else {
            self.expect_name("for fragment");
        }

        if self.at_keyword("on") {
            self.parse_type_condition();
        } else {
            self.error_msg(DiagnosticKind::UnexpectedToken, "expected `on Type`");
        }

        self.parse_directives_opt(false);
        self.expect_selection_set("fragment");

        self.finish_node();
    }

    fn parse_variable_definitions(&mut self) {
        self.start_node(SyntaxKind::VariableDefinitions);
        self.open_delimited(SyntaxKind::ParenOpen);

        while !self.should_stop() && !self.currently_is(SyntaxKind::ParenClose) {
            if self.currently_is(SyntaxKind::Dollar) {
                self.parse_variable_definition();
            } else if self.currently_is_one_of(SELECTION_RECOVERY)
                || self.currently_is(SyntaxKind::BraceOpen)
            {
                break;
            } else {
                self.error_and_bump_msg(DiagnosticKind::UnexpectedToken, "expected `$variable`");
            }
        }

        self.close_delimited(SyntaxKind::ParenClose, ")");
        self.finish_node();
    }

    fn parse_variable_definition(&mut self) {
        self.start_node(SyntaxKind::VariableDefinition);
        self.parse_variable();
        self.expect(SyntaxKind::Colon, "`:` after variable name");
        self.parse_type_or_error();
        if self.currently_is(SyntaxKind::Equals) {
            self.parse_default_value();
        }
        self.parse_directives_opt(true);
        self.finish_node();
    }

    fn expect_selection_set(&mut self, owner: &str) {
        if self.currently_is(SyntaxKind::BraceOpen) {
            self.parse_selection_set();
        } else {
            self.error_msg(DiagnosticKind::ExpectedSelectionSet, format!("for {owner}"));
        }
    }

    pub(super) fn parse_selection_set(&mut self) {
        if !self.enter_recursion() {
            return;
        }
        self.start_node(SyntaxKind::SelectionSet);
        self.open_delimited(SyntaxKind::BraceOpen);

        while !self.should_stop() && !self.currently_is(SyntaxKind::BraceClose) {
            if self.currently_is_one_of(SELECTION_FIRST) {
                self.parse_selection();
            } else if self.currently_is_one_of(SELECTION_RECOVERY) {
                break;
            } else {
                self.error_and_bump_msg(
                    DiagnosticKind::UnexpectedToken,
                    "expected a field, `...Fragment`, or `... on Type`",
                );
            }
        }

        self.close_delimited(SyntaxKind::BraceClose, "}");
        self.finish_node();
        self.exit_recursion();
    }

    fn parse_selection(&mut self) {
        if self.currently_is(SyntaxKind::Spread) {
            // `...Name` is a spread unless the name is the `on` keyword.
            let is_spread = self.next_is(SyntaxKind::Name) && self.peek_text(1) != "on";
            if is_spread {
                self.parse_fragment_spread();
            } else {
                self.parse_inline_fragment();
            }
        } else {
            self.parse_field();
        }
    }

    fn parse_field(&mut self) {
        self.start_node(SyntaxKind::Field);

        if self.next_is(SyntaxKind::Colon) {
            self.start_node(SyntaxKind::Alias);
            self.bump();
            self.bump();
            self.finish_node();
        }

        self.expect_name("for field");

        if self.currently_is(SyntaxKind::ParenOpen) {
            self.parse_arguments(false);
        }
        self.parse_directives_opt(false);
        if self.currently_is(SyntaxKind::BraceOpen) {
            self.parse_selection_set();
        }

        self.finish_node();
    }

    fn parse_fragment_spread(&mut self) {
        self.start_node(SyntaxKind::FragmentSpread);
        self.bump();
        self.bump();
        self.parse_directives_opt(false);
        self.finish_node();
    }

    fn parse_inline_fragment(&mut self) {
        self.start_node(SyntaxKind::InlineFragment);
        self.bump();
        if self.at_keyword("on") {
            self.parse_type_condition();
        }
        self.parse_directives_opt(false);
        self.expect_selection_set("inline fragment");
        self.finish_node();
    }

    fn parse_type_condition(&mut self) {
        self.start_node(SyntaxKind::TypeCondition);
        self.bump_remap(SyntaxKind::Keyword);
        if self.currently_is(SyntaxKind::Name) {
            self.parse_named_type();
        } else {
            self.error_msg(DiagnosticKind::ExpectedType, "after `on`");
        }
        self.finish_node();
    }

    pub(super) fn parse_type_or_error(&mut self) {
        if self.currently_is_one_of(TYPE_FIRST) {
            self.parse_type();
        } else {
            self.error(DiagnosticKind::ExpectedType);
        }
    }
}
