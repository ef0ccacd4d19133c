use indexmap::IndexMap;

use super::Lowerer;
use crate::diagnostics::DiagnosticKind;
use crate::ir::{Argument, Value};
use crate::parser::ast;
use crate::parser::cst::SyntaxKind;
use crate::parser::lexer::string_value;
use crate::schema::{InputValueDef, TypeKind, TypeRef};

impl Lowerer<'_> {
    pub(super) fn arguments(
        &mut self,
        arguments: &[ast::Argument],
        defs: &IndexMap<String, InputValueDef>,
    ) -> Vec<Argument> {
        arguments
            .iter()
            .filter_map(|arg| {
                let name = arg.name()?.text().to_string();
                let expected = defs.get(&name).map(|d| d.ty.clone());
                let value = self.value(&arg.value()?, expected.as_ref())?;
                Some(Argument { name, value })
            })
            .collect()
    }

    /// Lower a literal, checking it against `expected` when known.
    pub(super) fn value(
        &mut self,
        value: &ast::Value,
        expected: Option<&TypeRef>,
    ) -> Option<Value> {
        let lowered = match value {
            ast::Value::Variable(var) => {
                return Some(Value::Variable(var.name()?.text().to_string()));
            }
            ast::Value::Scalar(scalar) => {
                let token = scalar.token()?;
                match token.kind() {
                    SyntaxKind::IntValue => match token.text().parse() {
                        Ok(n) => Value::Int(n),
                        Err(_) => return self.invalid(value, "integer literal out of range"),
                    },
                    SyntaxKind::FloatValue => match token.text().parse() {
                        Ok(n) => Value::Float(n),
                        Err(_) => return self.invalid(value, "malformed float literal"),
                    },
                    SyntaxKind::StringValue | SyntaxKind::BlockString => {
                        Value::String(string_value(token.text()))
                    }
                    _ => match token.text() {
                        "true" => Value::Boolean(true),
                        "false" => Value::Boolean(false),
                        "null" => Value::Null,
                        other => Value::Enum(other.to_string()),
                    },
                }
            }
            ast::Value::List(list) => {
                let item_type = expected.and_then(TypeRef::item_type);
                let items: Vec<_> = list
                    .values()
                    .map(|item| self.value(&item, item_type))
                    .collect();
                let items = items.into_iter().collect::<Option<Vec<_>>>()?;
                return self.check_list(value, Value::List(items), expected);
            }
            ast::Value::Object(object) => {
                let input_fields = expected
                    .and_then(|ty| self.schema.get_type(ty.name()))
                    .filter(|t| t.kind == TypeKind::InputObject)
                    .map(|t| (t.name.clone(), t.input_fields.clone()));
                let mut fields = Vec::new();
                let mut valid = true;
                for field in object.fields() {
                    let Some(name) = field.name().map(|t| t.text().to_string()) else {
                        continue;
                    };
                    let field_type = match &input_fields {
                        Some((type_name, defs)) => match defs.get(&name) {
                            Some(def) => Some(def.ty.clone()),
                            None => {
                                let message = format!("`{type_name}` has no field `{name}`");
                                self.invalid(value, &message);
                                valid = false;
                                continue;
                            }
                        },
                        None => None,
                    };
                    match field
                        .value()
                        .and_then(|v| self.value(&v, field_type.as_ref()))
                    {
                        Some(lowered) => fields.push((name, lowered)),
                        None => valid = false,
                    }
                }
                if !valid {
                    return None;
                }
                Value::Object(fields)
            }
        };
        match expected {
            Some(ty) => self.check(value, lowered, ty),
            None => Some(lowered),
        }
    }

    fn check_list(
        &mut self,
        node: &ast::Value,
        value: Value,
        expected: Option<&TypeRef>,
    ) -> Option<Value> {
        match expected {
            Some(ty) if ty.item_type().is_none() && !self.is_custom_scalar(ty.name()) => {
                self.invalid(node, &format!("expected `{ty}`, found a list"))
            }
            _ => Some(value),
        }
    }

    fn check(&mut self, node: &ast::Value, value: Value, expected: &TypeRef) -> Option<Value> {
        if value == Value::Null {
            if expected.is_non_null() {
                return self.invalid(node, &format!("`null` is not a valid `{expected}`"));
            }
            return Some(value);
        }
        // A single value is accepted where a list is expected.
        let named = match expected.nullable().item_type() {
            Some(item) => return self.check(node, value, item),
            None => expected.name(),
        };
        let fits = match (named, &value) {
            ("Int", Value::Int(_)) => true,
            ("Float", Value::Int(_) | Value::Float(_)) => true,
            ("String", Value::String(_)) => true,
            ("Boolean", Value::Boolean(_)) => true,
            ("ID", Value::String(_) | Value::Int(_)) => true,
            ("Int" | "Float" | "String" | "Boolean" | "ID", _) => false,
            (_, value) => match self.schema.get_type(named).map(|t| t.kind) {
                Some(TypeKind::Enum) => match value {
                    Value::Enum(v) => self
                        .schema
                        .get_type(named)
                        .is_some_and(|t| t.enum_values.contains(v)),
                    _ => false,
                },
                Some(TypeKind::InputObject) => matches!(value, Value::Object(_)),
                _ => true,
            },
        };
        if fits {
            Some(value)
        } else {
            let found = crate::ir::print_value(&value);
            self.invalid(node, &format!("expected `{named}`, found `{found}`"))
        }
    }

    fn is_custom_scalar(&self, name: &str) -> bool {
        self.schema
            .get_type(name)
            .is_some_and(|t| t.kind == TypeKind::Scalar)
            && !crate::schema::BUILTIN_SCALARS.contains(&name)
    }

    fn invalid(&mut self, node: &ast::Value, message: &str) -> Option<Value> {
        self.diagnostics
            .report(self.source, DiagnosticKind::InvalidValue, node.text_range())
            .message(message)
            .emit();
        None
    }
}
