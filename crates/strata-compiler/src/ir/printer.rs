//! Prints IR back to GraphQL text.
//!
//! Output is canonical: two-space indentation, one selection per line,
//! arguments in source order. Conditions print as `@include`/`@skip` on each
//! guarded selection.

use std::fmt::Write;

use super::{
    Argument, Condition, Definition, Directive, Field, Selection, Value, VariableDefinition,
};

pub fn print_definition(definition: &Definition) -> String {
    let mut out = String::new();
    match definition {
        Definition::Operation(op) => {
            out.push_str(op.kind.as_str());
            out.push(' ');
            out.push_str(&op.name);
            print_variables(&mut out, &op.variables);
            print_directives(&mut out, &op.directives, &[]);
        }
        Definition::Fragment(frag) => {
            let _ = write!(out, "fragment {} on {}", frag.name, frag.type_condition);
            print_directives(&mut out, &frag.directives, &[]);
        }
    }
    out.push(' ');
    print_block(&mut out, definition.selections(), 0);
    out.push('\n');
    out
}

/// Print several definitions separated by blank lines.
pub fn print_definitions<'a>(definitions: impl IntoIterator<Item = &'a Definition>) -> String {
    definitions
        .into_iter()
        .map(print_definition)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print a selection list without surrounding braces, at indent zero.
pub fn print_selections(selections: &[Selection]) -> String {
    let mut out = String::new();
    for selection in selections {
        print_selection(&mut out, selection, 0, &[]);
    }
    out
}

pub fn print_value(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn print_block(out: &mut String, selections: &[Selection], indent: usize) {
    out.push_str("{\n");
    for selection in selections {
        print_selection(out, selection, indent + 1, &[]);
    }
    pad(out, indent);
    out.push('}');
}

fn print_selection(out: &mut String, selection: &Selection, indent: usize, guards: &[String]) {
    match selection {
        Selection::Field(field) => print_field(out, field, indent, guards),
        Selection::FragmentSpread(spread) => {
            pad(out, indent);
            out.push_str("...");
            out.push_str(&spread.name);
            print_directives(out, &spread.directives, guards);
            out.push('\n');
        }
        Selection::InlineFragment(inline) => {
            pad(out, indent);
            out.push_str("...");
            if let Some(ty) = &inline.type_condition {
                out.push_str(" on ");
                out.push_str(ty);
            }
            print_directives(out, &inline.directives, guards);
            out.push(' ');
            print_block(out, &inline.selections, indent);
            out.push('\n');
        }
        Selection::Condition(condition) => {
            let mut guards = guards.to_vec();
            guards.push(condition_directive(condition));
            for child in &condition.selections {
                print_selection(out, child, indent, &guards);
            }
        }
    }
}

fn print_field(out: &mut String, field: &Field, indent: usize, guards: &[String]) {
    pad(out, indent);
    if let Some(alias) = &field.alias {
        out.push_str(alias);
        out.push_str(": ");
    }
    out.push_str(&field.name);
    print_arguments(out, &field.arguments);
    print_directives(out, &field.directives, guards);
    if field.is_linked() {
        out.push(' ');
        print_block(out, &field.selections, indent);
    }
    out.push('\n');
}

fn print_variables(out: &mut String, variables: &[VariableDefinition]) {
    if variables.is_empty() {
        return;
    }
    out.push('(');
    for (i, var) in variables.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "${}: {}", var.name, var.ty);
        if let Some(default) = &var.default_value {
            out.push_str(" = ");
            write_value(out, default);
        }
    }
    out.push(')');
}

fn print_arguments(out: &mut String, arguments: &[Argument]) {
    if arguments.is_empty() {
        return;
    }
    out.push('(');
    for (i, arg) in arguments.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&arg.name);
        out.push_str(": ");
        write_value(out, &arg.value);
    }
    out.push(')');
}

fn print_directives(out: &mut String, directives: &[Directive], guards: &[String]) {
    for directive in directives {
        out.push_str(" @");
        out.push_str(&directive.name);
        print_arguments(out, &directive.arguments);
    }
    for guard in guards {
        out.push(' ');
        out.push_str(guard);
    }
}

fn condition_directive(condition: &Condition) -> String {
    let name = if condition.passing_value {
        "include"
    } else {
        "skip"
    };
    format!("@{name}(if: {})", print_value(&condition.condition))
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Variable(name) => {
            out.push('$');
            out.push_str(name);
        }
        Value::Int(n) => {
            let _ = write!(out, "{n}");
        }
        Value::Float(n) => {
            let text = n.to_string();
            out.push_str(&text);
            if !text.contains(['.', 'e', 'E']) {
                out.push_str(".0");
            }
        }
        Value::String(s) => {
            out.push_str(&serde_json::Value::String(s.clone()).to_string());
        }
        Value::Boolean(b) => {
            let _ = write!(out, "{b}");
        }
        Value::Null => out.push_str("null"),
        Value::Enum(name) => out.push_str(name),
        Value::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(fields) => {
            out.push('{');
            for (i, (name, value)) in fields.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(name);
                out.push_str(": ");
                write_value(out, value);
            }
            out.push('}');
        }
    }
}

fn pad(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}
