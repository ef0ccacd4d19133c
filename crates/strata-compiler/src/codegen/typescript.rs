//! TypeScript declarations for operations and fragments.
//!
//! Operations get `<Name>$variables`, `<Name>$data` and a `<Name>` pair type.
//! Fragments get `<Name>$data` and the opaque `<Name>$key` callers pass in.
//! Fields reached only through a type-narrowing inline fragment or a
//! condition are optional; fragment spreads become `FragmentRefs`.

use std::collections::BTreeSet;
use std::fmt::Write;

use super::{EnumStyle, OutputMode, TypeGenConfig, TypeGenerator};
use crate::Result;
use crate::ir::{Definition, Fragment, Operation, Selection, VariableDefinition};
use crate::schema::{Schema, TYPENAME_FIELD, TypeKind, TypeRef};

const FUTURE_ENUM_VALUE: &str = "\"%future added value\"";

#[derive(Debug, Default, Clone, Copy)]
pub struct TypeScriptGenerator;

impl TypeGenerator for TypeScriptGenerator {
    fn generate(
        &self,
        definition: &Definition,
        schema: &Schema,
        config: &TypeGenConfig,
    ) -> Result<String> {
        Ok(Emitter::new(schema, config).emit(definition))
    }
}

struct Member {
    key: String,
    ty: String,
    optional: bool,
}

#[derive(Default)]
struct Shape {
    members: Vec<Member>,
    spreads: Vec<String>,
}

struct Emitter<'a> {
    schema: &'a Schema,
    config: &'a TypeGenConfig,
    /// Runtime types referenced so far.
    runtime_imports: BTreeSet<&'static str>,
    /// Enums imported from their own modules.
    enum_imports: BTreeSet<String>,
    /// Input objects already declared, or being declared.
    declared_inputs: BTreeSet<String>,
    input_declarations: Vec<String>,
    declarations: Vec<String>,
}

impl<'a> Emitter<'a> {
    fn new(schema: &'a Schema, config: &'a TypeGenConfig) -> Self {
        Self {
            schema,
            config,
            runtime_imports: BTreeSet::new(),
            enum_imports: BTreeSet::new(),
            declared_inputs: BTreeSet::new(),
            input_declarations: Vec::new(),
            declarations: Vec::new(),
        }
    }

    fn emit(mut self, definition: &Definition) -> String {
        match definition {
            Definition::Operation(op) => self.emit_operation(op),
            Definition::Fragment(frag) => self.emit_fragment(frag),
        }

        let mut output = String::new();
        if !self.runtime_imports.is_empty() {
            let names: Vec<_> = self.runtime_imports.iter().copied().collect();
            let _ = writeln!(
                output,
                "import type {{ {} }} from \"{}\";",
                names.join(", "),
                self.config.runtime_module
            );
        }
        for name in &self.enum_imports {
            let _ = writeln!(output, "import type {{ {name} }} from \"./{name}.graphql\";");
        }
        if !output.is_empty() {
            output.push('\n');
        }
        for declaration in self.input_declarations.iter().chain(&self.declarations) {
            output.push_str(declaration);
            output.push_str("\n\n");
        }

        // Ensure exactly one trailing newline
        output.truncate(output.trim_end().len());
        output.push('\n');
        output
    }

    fn emit_operation(&mut self, op: &Operation) {
        let variables = self.variables(&op.variables);
        self.declare(&format!("{}$variables", op.name), &variables);

        let data = self.object(&op.root_type, &op.selections, 0, None);
        self.declare(&format!("{}$data", op.name), &data);

        let pair = format!(
            "{{\n  response: {name}$data;\n  variables: {name}$variables;\n}}",
            name = op.name
        );
        self.declare(&op.name, &pair);
    }

    fn emit_fragment(&mut self, frag: &Fragment) {
        let data = self.object(&frag.type_condition, &frag.selections, 0, Some(&frag.name));
        self.declare(&format!("{}$data", frag.name), &data);

        self.runtime_imports.insert("FragmentRefs");
        let key = format!(
            "{{\n  readonly \" $data\"?: {name}$data;\n  \
             readonly \" $fragmentSpreads\": FragmentRefs<\"{name}\">;\n}}",
            name = frag.name
        );
        self.declare(&format!("{}$key", frag.name), &key);
    }

    fn declare(&mut self, name: &str, body: &str) {
        let declaration = format!("{} {name} = {body};", self.keyword());
        self.declarations.push(declaration);
    }

    fn keyword(&self) -> &'static str {
        match self.config.output_mode {
            OutputMode::Export => "export type",
            OutputMode::Declare => "declare type",
        }
    }

    fn variables(&mut self, variables: &[VariableDefinition]) -> String {
        if variables.is_empty() {
            return "Record<PropertyKey, never>".to_string();
        }
        let mut out = String::from("{\n");
        for var in variables {
            let named = self.input_type(var.ty.name());
            let optional = !var.ty.is_non_null() || var.default_value.is_some();
            let _ = writeln!(
                out,
                "  {}{}: {};",
                var.name,
                if optional { "?" } else { "" },
                wrap(&var.ty, &named)
            );
        }
        out.push('}');
        out
    }

    /// Object type for `selections` on `parent`. Member lines are indented one
    /// level deeper than `indent`.
    fn object(
        &mut self,
        parent: &str,
        selections: &[Selection],
        indent: usize,
        fragment_type: Option<&str>,
    ) -> String {
        let mut shape = Shape::default();
        self.collect(parent, selections, indent, false, &mut shape);

        let pad = "  ".repeat(indent + 1);
        let mut out = String::from("{\n");
        for member in &shape.members {
            let _ = writeln!(
                out,
                "{pad}readonly {}{}: {};",
                member.key,
                if member.optional { "?" } else { "" },
                member.ty
            );
        }
        if !shape.spreads.is_empty() {
            self.runtime_imports.insert("FragmentRefs");
            let refs: Vec<_> = shape.spreads.iter().map(|s| format!("\"{s}\"")).collect();
            let _ = writeln!(
                out,
                "{pad}readonly \" $fragmentSpreads\": FragmentRefs<{}>;",
                refs.join(" | ")
            );
        }
        if let Some(name) = fragment_type {
            let _ = writeln!(out, "{pad}readonly \" $fragmentType\": \"{name}\";");
        }
        out.push_str(&"  ".repeat(indent));
        out.push('}');
        out
    }

    fn collect(
        &mut self,
        parent: &str,
        selections: &[Selection],
        indent: usize,
        optional: bool,
        shape: &mut Shape,
    ) {
        for selection in selections {
            match selection {
                Selection::Field(field) => {
                    let key = field.response_key();
                    if shape.members.iter().any(|m| m.key == key) {
                        continue;
                    }
                    let named = if field.is_linked() {
                        self.object(field.ty.name(), &field.selections, indent + 1, None)
                    } else if field.name == TYPENAME_FIELD
                        && !self.schema.is_abstract(&field.parent_type)
                    {
                        format!("\"{}\"", field.parent_type)
                    } else {
                        self.output_type(field.ty.name())
                    };
                    shape.members.push(Member {
                        key: key.to_string(),
                        ty: wrap(&field.ty, &named),
                        optional,
                    });
                }
                Selection::InlineFragment(inline) => {
                    let narrows = inline
                        .type_condition
                        .as_deref()
                        .is_some_and(|t| t != parent);
                    let scope = inline.type_condition.as_deref().unwrap_or(parent);
                    self.collect(scope, &inline.selections, indent, optional || narrows, shape);
                }
                Selection::Condition(condition) => {
                    self.collect(parent, &condition.selections, indent, true, shape);
                }
                Selection::FragmentSpread(spread) => {
                    if !self.config.existing_fragment_names.contains(&spread.name) {
                        tracing::debug!(
                            fragment = %spread.name,
                            "spread of fragment without module"
                        );
                        continue;
                    }
                    if !shape.spreads.contains(&spread.name) {
                        shape.spreads.push(spread.name.clone());
                    }
                }
            }
        }
    }

    fn output_type(&mut self, name: &str) -> String {
        self.leaf_type(name, false)
    }

    fn input_type(&mut self, name: &str) -> String {
        let is_input_object = self
            .schema
            .get_type(name)
            .is_some_and(|t| t.kind == TypeKind::InputObject);
        if is_input_object {
            self.declare_input(name);
            return name.to_string();
        }
        self.leaf_type(name, true)
    }

    fn leaf_type(&mut self, name: &str, input: bool) -> String {
        if let Some(mapped) = self.config.custom_scalars.get(name) {
            return mapped.clone();
        }
        match name {
            "ID" | "String" => return "string".to_string(),
            "Int" | "Float" => return "number".to_string(),
            "Boolean" => return "boolean".to_string(),
            _ => {}
        }
        let Some(def) = self.schema.get_type(name) else {
            return "unknown".to_string();
        };
        match (def.kind, self.config.enum_style) {
            (TypeKind::Enum, EnumStyle::Module) => {
                self.enum_imports.insert(name.to_string());
                name.to_string()
            }
            (TypeKind::Enum, EnumStyle::Union) => {
                let mut values: Vec<_> = def
                    .enum_values
                    .iter()
                    .map(|v| format!("\"{v}\""))
                    .collect();
                if !input {
                    values.push(FUTURE_ENUM_VALUE.to_string());
                }
                values.join(" | ")
            }
            _ => "unknown".to_string(),
        }
    }

    fn declare_input(&mut self, name: &str) {
        if !self.declared_inputs.insert(name.to_string()) {
            return;
        }
        let Some(def) = self.schema.get_type(name) else {
            return;
        };
        let allowlist = &self.config.input_field_allowlist;
        let fields: Vec<_> = def
            .input_fields
            .values()
            .filter(|f| allowlist.is_empty() || allowlist.contains(&f.name))
            .map(|f| (f.name.clone(), f.ty.clone(), f.default_value.is_some()))
            .collect();

        let mut body = String::from("{\n");
        for (field, ty, has_default) in fields {
            let named = self.input_type(ty.name());
            let optional = !ty.is_non_null() || has_default;
            let _ = writeln!(
                body,
                "  {field}{}: {};",
                if optional { "?" } else { "" },
                wrap(&ty, &named)
            );
        }
        body.push('}');
        let declaration = format!("{} {name} = {body};", self.keyword());
        self.input_declarations.push(declaration);
    }
}

/// Apply list and nullability modifiers of `ty` around `named`.
fn wrap(ty: &TypeRef, named: &str) -> String {
    match ty {
        TypeRef::NonNull(inner) => wrap_non_null(inner, named),
        other => format!("{} | null", wrap_non_null(other, named)),
    }
}

fn wrap_non_null(ty: &TypeRef, named: &str) -> String {
    match ty {
        TypeRef::Named(_) => named.to_string(),
        TypeRef::List(item) => format!("ReadonlyArray<{}>", wrap(item, named)),
        TypeRef::NonNull(inner) => wrap_non_null(inner, named),
    }
}
