use crate::diagnostics::DiagnosticKind;
use crate::parser::Parser;
use crate::parser::cst::SyntaxKind;
use crate::parser::cst::token_sets::{DESCRIPTION_FIRST, SELECTION_RECOVERY};

impl Parser<'_> {
    /// Type-system definitions and their `extend` forms, with an optional
    /// leading description.
    pub(super) fn parse_type_system_definition(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_description_opt();

        let is_extension = self.at_keyword("extend");
        let keyword = if is_extension {
            self.peek_text(1)
        } else {
            self.peek_text(0)
        };

        let kind = match keyword {
            "schema" => SyntaxKind::SchemaDefinition,
            "scalar" => SyntaxKind::ScalarTypeDefinition,
            "type" => SyntaxKind::ObjectTypeDefinition,
            "interface" => SyntaxKind::InterfaceTypeDefinition,
            "union" => SyntaxKind::UnionTypeDefinition,
            "enum" => SyntaxKind::EnumTypeDefinition,
            "input" => SyntaxKind::InputObjectTypeDefinition,
            "directive" if !is_extension => SyntaxKind::DirectiveDefinition,
            _ => {
                self.start_node_at(checkpoint, SyntaxKind::Error);
                self.eat_keyword("extend");
                self.error_and_bump_msg(
                    DiagnosticKind::ExpectedDefinition,
                    "expected a type-system definition",
                );
                self.finish_node();
                return;
            }
        };

        self.start_node_at(checkpoint, kind);
        self.eat_keyword("extend");
        self.bump_remap(SyntaxKind::Keyword);

        match kind {
            SyntaxKind::SchemaDefinition => self.parse_schema_body(),
            SyntaxKind::ScalarTypeDefinition => {
                self.expect_name("for scalar");
                self.parse_directives_opt(true);
            }
            SyntaxKind::ObjectTypeDefinition | SyntaxKind::InterfaceTypeDefinition => {
                self.expect_name("for type");
                if self.at_keyword("implements") {
                    self.parse_implements_interfaces();
                }
                self.parse_directives_opt(true);
                if self.currently_is(SyntaxKind::BraceOpen) {
                    self.parse_fields_definition();
                }
            }
            SyntaxKind::UnionTypeDefinition => {
                self.expect_name("for union");
                self.parse_directives_opt(true);
                if self.currently_is(SyntaxKind::Equals) {
                    self.parse_union_members();
                }
            }
            SyntaxKind::EnumTypeDefinition => {
                self.expect_name("for enum");
                self.parse_directives_opt(true);
                if self.currently_is(SyntaxKind::BraceOpen) {
                    self.parse_enum_values();
                }
            }
            SyntaxKind::InputObjectTypeDefinition => {
                self.expect_name("for input");
                self.parse_directives_opt(true);
                if self.currently_is(SyntaxKind::BraceOpen) {
                    self.parse_input_fields();
                }
            }
            _ => self.parse_directive_definition_body(),
        }

        self.finish_node();
    }

    fn parse_description_opt(&mut self) {
        if self.currently_is_one_of(DESCRIPTION_FIRST) {
            self.start_node(SyntaxKind::Description);
            self.bump();
            self.finish_node();
        }
    }

    /// `schema @dir { query: Query mutation: Mutation }`
    fn parse_schema_body(&mut self) {
        self.parse_directives_opt(true);
        if !self.open_delimited(SyntaxKind::BraceOpen) {
            return;
        }
        while !self.should_stop() && !self.currently_is(SyntaxKind::BraceClose) {
            if self.currently_is(SyntaxKind::Name) {
                self.start_node(SyntaxKind::RootOperationTypeDefinition);
                let operation = self.current_text();
                if !matches!(operation, "query" | "mutation" | "subscription") {
                    self.error_msg(
                        DiagnosticKind::UnexpectedToken,
                        "expected `query`, `mutation`, or `subscription`",
                    );
                }
                self.bump_remap(SyntaxKind::Keyword);
                self.expect(SyntaxKind::Colon, "`:` after operation type");
                self.parse_named_type();
                self.finish_node();
            } else if self.currently_is_one_of(SELECTION_RECOVERY) {
                break;
            } else {
                self.error_and_bump(DiagnosticKind::UnexpectedToken);
            }
        }
        self.close_delimited(SyntaxKind::BraceClose, "}");
    }

    /// `implements A & B`
    fn parse_implements_interfaces(&mut self) {
        self.start_node(SyntaxKind::ImplementsInterfaces);
        self.bump_remap(SyntaxKind::Keyword);
        self.eat_token(SyntaxKind::Amp);
        self.parse_named_type();
        while self.eat_token(SyntaxKind::Amp) {
            self.parse_named_type();
        }
        self.finish_node();
    }

    fn parse_fields_definition(&mut self) {
        self.start_node(SyntaxKind::FieldsDefinition);
        self.open_delimited(SyntaxKind::BraceOpen);
        while !self.should_stop() && !self.currently_is(SyntaxKind::BraceClose) {
            if self.currently_is(SyntaxKind::Name) || self.currently_is_one_of(DESCRIPTION_FIRST) {
                self.parse_field_definition();
            } else if self.currently_is_one_of(SELECTION_RECOVERY) {
                break;
            } else {
                self.error_and_bump_msg(DiagnosticKind::UnexpectedToken, "expected a field");
            }
        }
        self.close_delimited(SyntaxKind::BraceClose, "}");
        self.finish_node();
    }

    fn parse_field_definition(&mut self) {
        self.start_node(SyntaxKind::FieldDefinition);
        self.parse_description_opt();
        self.expect_name("for field");
        if self.currently_is(SyntaxKind::ParenOpen) {
            self.parse_arguments_definition();
        }
        self.expect(SyntaxKind::Colon, "`:` before field type");
        self.parse_type_or_error();
        self.parse_directives_opt(true);
        self.finish_node();
    }

    fn parse_arguments_definition(&mut self) {
        self.start_node(SyntaxKind::ArgumentsDefinition);
        self.open_delimited(SyntaxKind::ParenOpen);
        while !self.should_stop() && !self.currently_is(SyntaxKind::ParenClose) {
            if self.currently_is(SyntaxKind::Name) || self.currently_is_one_of(DESCRIPTION_FIRST) {
                self.parse_input_value_definition();
            } else if self.currently_is_one_of(SELECTION_RECOVERY) {
                break;
            } else {
                self.error_and_bump_msg(DiagnosticKind::UnexpectedToken, "expected an argument");
            }
        }
        self.close_delimited(SyntaxKind::ParenClose, ")");
        self.finish_node();
    }

    fn parse_input_value_definition(&mut self) {
        self.start_node(SyntaxKind::InputValueDefinition);
        self.parse_description_opt();
        self.expect_name("for input value");
        self.expect(SyntaxKind::Colon, "`:` before input type");
        self.parse_type_or_error();
        if self.currently_is(SyntaxKind::Equals) {
            self.parse_default_value();
        }
        self.parse_directives_opt(true);
        self.finish_node();
    }

    /// `= A | B`
    fn parse_union_members(&mut self) {
        self.start_node(SyntaxKind::UnionMemberTypes);
        self.bump();
        self.eat_token(SyntaxKind::Pipe);
        self.parse_named_type();
        while self.eat_token(SyntaxKind::Pipe) {
            self.parse_named_type();
        }
        self.finish_node();
    }

    fn parse_enum_values(&mut self) {
        self.start_node(SyntaxKind::EnumValuesDefinition);
        self.open_delimited(SyntaxKind::BraceOpen);
        while !self.should_stop() && !self.currently_is(SyntaxKind::BraceClose) {
            if self.currently_is(SyntaxKind::Name) || self.currently_is_one_of(DESCRIPTION_FIRST) {
                self.start_node(SyntaxKind::EnumValueDefinition);
                self.parse_description_opt();
                self.expect_name("for enum value");
                self.parse_directives_opt(true);
                self.finish_node();
            } else if self.currently_is_one_of(SELECTION_RECOVERY) {
                break;
            } else {
                self.error_and_bump_msg(DiagnosticKind::UnexpectedToken, "expected an enum value");
            }
        }
        self.close_delimited(SyntaxKind::BraceClose, "}");
        self.finish_node();
    }

    fn parse_input_fields(&mut self) {
        self.start_node(SyntaxKind::InputFieldsDefinition);
        self.open_delimited(SyntaxKind::BraceOpen);
        while !self.should_stop() && !self.currently_is(SyntaxKind::BraceClose) {
            if self.currently_is(SyntaxKind::Name) || self.currently_is_one_of(DESCRIPTION_FIRST) {
                self.parse_input_value_definition();
            } else if self.currently_is_one_of(SELECTION_RECOVERY) {
                break;
            } else {
                self.error_and_bump_msg(DiagnosticKind::UnexpectedToken, "expected an input field");
            }
        }
        self.close_delimited(SyntaxKind::BraceClose, "}");
        self.finish_node();
    }

    /// `@name(args) repeatable on FIELD | FRAGMENT_SPREAD`
    fn parse_directive_definition_body(&mut self) {
        self.expect(SyntaxKind::At, "`@` before directive name");
        self.expect_name("for directive");
        if self.currently_is(SyntaxKind::ParenOpen) {
            self.parse_arguments_definition();
        }
        self.eat_keyword("repeatable");
        if !self.eat_keyword("on") {
            self.error_msg(DiagnosticKind::UnexpectedToken, "expected `on` and locations");
            return;
        }
        self.start_node(SyntaxKind::DirectiveLocations);
        self.eat_token(SyntaxKind::Pipe);
        self.expect_name("for directive location");
        while self.eat_token(SyntaxKind::Pipe) {
            self.expect_name("for directive location");
        }
        self.finish_node();
    }
}
