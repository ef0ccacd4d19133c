//! AST to IR lowering.
//!
//! Lowering runs after validation, so most lookups succeed. Whatever still
//! fails (unresolved spreads, collisions between base and project definitions,
//! values that don't fit their input type) is collected and reported as one
//! [`Error::Lowering`].
//!
//! Every selection set on a type that is, or implements, the identity
//! interface gets the identity field prepended unless it already selects a
//! field of that name, aliased or not. Inline fragments inside such a set
//! are left alone; the enclosing set already carries the field.

mod values;

#[cfg(test)]
mod lower_tests;

use std::collections::BTreeMap;
use std::path::PathBuf;

use indexmap::{IndexMap, IndexSet};
use rowan::TextRange;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::document_store::Document;
use crate::ir::{
    Condition, Definition, Directive, Field, Fragment, FragmentSpread, InlineFragment, Location,
    Operation, Selection, Value, VariableDefinition,
};
use crate::parser::ast;
use crate::schema::{Schema, TypeKind, TypeRef};
use crate::source_map::SourceId;
use crate::{Error, Result};

pub const DEFAULT_IDENTITY_INTERFACE: &str = "Node";

#[derive(Debug, Clone)]
pub struct LowerOptions {
    identity_interface: String,
    identity_field: Option<String>,
}

impl Default for LowerOptions {
    fn default() -> Self {
        Self {
            identity_interface: DEFAULT_IDENTITY_INTERFACE.to_string(),
            identity_field: None,
        }
    }
}

impl LowerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity_interface(mut self, name: impl Into<String>) -> Self {
        self.identity_interface = name.into();
        self
    }

    /// Field to inject. Defaults to the interface's first non-null `ID` field.
    pub fn identity_field(mut self, name: impl Into<String>) -> Self {
        self.identity_field = Some(name.into());
        self
    }
}

/// Lower every operation and fragment in `documents`, in document order.
pub fn lower(
    schema: &Schema,
    documents: &[&Document],
    options: &LowerOptions,
) -> Result<Vec<Definition>> {
    let mut lowerer = Lowerer::new(schema, options);
    for doc in documents {
        for def in doc.document().definitions() {
            if let ast::Definition::Fragment(fragment) = def
                && let Some(name) = fragment.name()
            {
                lowerer.fragments.insert(name.text().to_string());
            }
        }
    }

    let mut definitions = Vec::new();
    let mut seen: IndexMap<String, (SourceId, TextRange)> = IndexMap::new();
    for doc in documents {
        lowerer.enter_document(doc);
        for def in doc.document().definitions() {
            let Some(lowered) = (match &def {
                ast::Definition::Operation(op) => lowerer.operation(op),
                ast::Definition::Fragment(frag) => lowerer.fragment(frag),
                ast::Definition::TypeSystem(_) => continue,
            }) else {
                continue;
            };

            let range = def.name().map_or(TextRange::default(), |t| t.text_range());
            if let Some((first_source, first_range)) = seen.get(lowered.name()) {
                lowerer
                    .diagnostics
                    .report(doc.source(), DiagnosticKind::DefinitionCollision, range)
                    .raw_message(format!("`{}` is defined more than once", lowered.name()))
                    .related_to(*first_source, *first_range, "first defined here")
                    .emit();
                continue;
            }
            seen.insert(lowered.name().to_string(), (doc.source(), range));
            definitions.push(lowered);
        }
    }

    if lowerer.diagnostics.has_errors() {
        return Err(Error::Lowering(lowerer.diagnostics));
    }
    tracing::debug!(definitions = definitions.len(), "lowered documents");
    Ok(definitions)
}

/// Identity interface resolved against the schema.
struct Identity {
    interface: String,
    field: String,
}

struct Lowerer<'a> {
    schema: &'a Schema,
    identity: Option<Identity>,
    fragments: IndexSet<String>,
    diagnostics: Diagnostics,
    source: SourceId,
    path: Option<PathBuf>,
    /// Name of the definition being lowered, for error messages.
    current: String,
}

impl<'a> Lowerer<'a> {
    fn new(schema: &'a Schema, options: &LowerOptions) -> Self {
        Self {
            schema,
            identity: resolve_identity(schema, options),
            fragments: IndexSet::new(),
            diagnostics: Diagnostics::new(),
            source: SourceId::default(),
            path: None,
            current: String::new(),
        }
    }

    fn enter_document(&mut self, doc: &Document) {
        self.source = doc.source();
        self.path = doc.path().map(|p| p.to_path_buf());
    }

    fn location(&self, range: TextRange) -> Location {
        Location::new(self.source, range, self.path.clone())
    }

    fn operation(&mut self, op: &ast::OperationDefinition) -> Option<Definition> {
        let Some(name) = op.name() else {
            self.diagnostics
                .report(self.source, DiagnosticKind::ExpectedName, op.text_range())
                .raw_message("operations must be named to be compiled")
                .emit();
            return None;
        };
        self.current = name.text().to_string();
        let kind = op.operation_type();
        let Some(root) = self.schema.root_type(kind) else {
            self.diagnostics
                .report(self.source, DiagnosticKind::UnknownType, name.text_range())
                .raw_message(format!("schema does not define a {kind} root type"))
                .emit();
            return None;
        };
        let root_type = root.name.clone();

        let variables = op
            .variable_definitions()
            .iter()
            .filter_map(|var| self.variable(var))
            .collect();
        let directives = self.directives(&op.directives());
        let selections = op
            .selection_set()
            .map(|set| self.selection_set(&root_type, &set, true))
            .unwrap_or_default();

        Some(Definition::Operation(Operation {
            name: self.current.clone(),
            kind,
            root_type,
            variables,
            directives,
            selections,
            location: self.location(op.text_range()),
            metadata: BTreeMap::new(),
        }))
    }

    fn fragment(&mut self, frag: &ast::FragmentDefinition) -> Option<Definition> {
        let name = frag.name()?;
        let type_condition = frag.type_condition()?.name()?.text().to_string();
        self.current = name.text().to_string();

        let directives = self.directives(&frag.directives());
        let selections = frag
            .selection_set()
            .map(|set| self.selection_set(&type_condition, &set, true))
            .unwrap_or_default();

        Some(Definition::Fragment(Fragment {
            name: self.current.clone(),
            type_condition,
            directives,
            selections,
            location: self.location(frag.text_range()),
            metadata: BTreeMap::new(),
        }))
    }

    fn variable(&mut self, var: &ast::VariableDefinition) -> Option<VariableDefinition> {
        let name = var.variable()?.name()?.text().to_string();
        let ty = TypeRef::from_ast(&var.ty()?)?;
        let default_value = var
            .default_value()
            .and_then(|value| self.value(&value, Some(&ty)));
        Some(VariableDefinition {
            name,
            ty,
            default_value,
            location: self.location(var.text_range()),
        })
    }

    fn selection_set(
        &mut self,
        parent: &str,
        set: &ast::SelectionSet,
        inject_identity: bool,
    ) -> Vec<Selection> {
        let mut selections: Vec<Selection> = set
            .selections()
            .filter_map(|selection| self.selection(parent, &selection))
            .collect();

        if inject_identity && let Some(identity_field) = self.identity_field_for(parent, set) {
            selections.insert(0, Selection::Field(identity_field));
        }
        selections
    }

    /// The identity field to prepend to `set`, if it needs one.
    fn identity_field_for(&self, parent: &str, set: &ast::SelectionSet) -> Option<Field> {
        let identity = self.identity.as_ref()?;
        if !self.schema.implements(parent, &identity.interface) {
            return None;
        }
        let already_selected = set.selections().any(|s| match s {
            ast::Selection::Field(f) => f.name().is_some_and(|n| n.text() == identity.field),
            _ => false,
        });
        if already_selected {
            return None;
        }
        let field_def = self.schema.field(parent, &identity.field)?;
        Some(Field {
            alias: None,
            name: identity.field.clone(),
            parent_type: parent.to_string(),
            ty: field_def.ty.clone(),
            arguments: Vec::new(),
            directives: Vec::new(),
            selections: Vec::new(),
            location: Location::generated(),
        })
    }

    fn selection(&mut self, parent: &str, selection: &ast::Selection) -> Option<Selection> {
        let (conditions, directives) = self.split_conditions(&selection.directives());
        let lowered = match selection {
            ast::Selection::Field(field) => self.field(parent, field, directives)?,
            ast::Selection::FragmentSpread(spread) => self.spread(spread, directives)?,
            ast::Selection::InlineFragment(inline) => {
                self.inline_fragment(parent, inline, directives)?
            }
        };
        Some(
            conditions
                .into_iter()
                .rev()
                .fold(lowered, |inner, (condition, passing_value)| {
                    Selection::Condition(Condition {
                        condition,
                        passing_value,
                        selections: vec![inner],
                    })
                }),
        )
    }

    fn field(
        &mut self,
        parent: &str,
        field: &ast::Field,
        directives: Vec<Directive>,
    ) -> Option<Selection> {
        let name = field.name()?;
        let Some(field_def) = self.schema.field(parent, name.text()) else {
            self.diagnostics
                .report(self.source, DiagnosticKind::UnknownField, name.text_range())
                .message(format!("`{parent}` has no field `{}`", name.text()))
                .emit();
            return None;
        };
        let ty = field_def.ty.clone();
        let arg_defs = field_def.arguments.clone();

        let arguments = self.arguments(&field.arguments(), &arg_defs);
        let selections = field
            .selection_set()
            .map(|set| self.selection_set(ty.name(), &set, true))
            .unwrap_or_default();

        Some(Selection::Field(Field {
            alias: field.alias().map(|a| a.text().to_string()),
            name: name.text().to_string(),
            parent_type: parent.to_string(),
            ty,
            arguments,
            directives,
            selections,
            location: self.location(field.text_range()),
        }))
    }

    fn spread(
        &mut self,
        spread: &ast::FragmentSpread,
        directives: Vec<Directive>,
    ) -> Option<Selection> {
        let name = spread.name()?;
        if !self.fragments.contains(name.text()) {
            self.diagnostics
                .report(self.source, DiagnosticKind::UnresolvedFragment, name.text_range())
                .raw_message(format!(
                    "fragment `{}` referenced by `{}` is not defined",
                    name.text(),
                    self.current
                ))
                .emit();
            return None;
        }
        Some(Selection::FragmentSpread(FragmentSpread {
            name: name.text().to_string(),
            directives,
            location: self.location(spread.text_range()),
        }))
    }

    fn inline_fragment(
        &mut self,
        parent: &str,
        inline: &ast::InlineFragment,
        directives: Vec<Directive>,
    ) -> Option<Selection> {
        let type_condition = inline
            .type_condition()
            .and_then(|t| t.name())
            .map(|t| t.text().to_string());
        let scope = type_condition.clone().unwrap_or_else(|| parent.to_string());
        // An identity-bearing parent already carries the field.
        let inject = !self
            .identity
            .as_ref()
            .is_some_and(|identity| self.schema.implements(parent, &identity.interface));
        let selections = inline
            .selection_set()
            .map(|set| self.selection_set(&scope, &set, inject))
            .unwrap_or_default();
        Some(Selection::InlineFragment(InlineFragment {
            type_condition,
            directives,
            selections,
            location: self.location(inline.text_range()),
        }))
    }

    /// Separate `@include`/`@skip` from the remaining directives.
    fn split_conditions(
        &mut self,
        directives: &[ast::Directive],
    ) -> (Vec<(Value, bool)>, Vec<Directive>) {
        let mut conditions = Vec::new();
        let mut rest = Vec::new();
        for directive in directives {
            let Some(name) = directive.name() else {
                continue;
            };
            let passing_value = match name.text() {
                "include" => true,
                "skip" => false,
                _ => {
                    rest.extend(self.directive(directive));
                    continue;
                }
            };
            let condition = directive
                .argument("if")
                .and_then(|a| a.value())
                .and_then(|v| self.value(&v, Some(&TypeRef::named("Boolean").non_null())));
            match condition {
                Some(condition) => conditions.push((condition, passing_value)),
                None => {
                    self.diagnostics
                        .report(self.source, DiagnosticKind::InvalidValue, directive.text_range())
                        .raw_message(format!("`@{}` needs an `if` argument", name.text()))
                        .emit();
                }
            }
        }
        (conditions, rest)
    }

    fn directives(&mut self, directives: &[ast::Directive]) -> Vec<Directive> {
        directives
            .iter()
            .filter_map(|d| self.directive(d))
            .collect()
    }

    fn directive(&mut self, directive: &ast::Directive) -> Option<Directive> {
        let name = directive.name()?.text().to_string();
        let arg_defs = self
            .schema
            .directive(&name)
            .map(|d| d.arguments.clone())
            .unwrap_or_default();
        let arguments = self.arguments(&directive.arguments(), &arg_defs);
        Some(Directive { name, arguments })
    }
}

fn resolve_identity(schema: &Schema, options: &LowerOptions) -> Option<Identity> {
    let interface = schema.get_type(&options.identity_interface)?;
    if interface.kind != TypeKind::Interface {
        return None;
    }
    let field = match &options.identity_field {
        Some(field) => interface.fields.get(field)?.name.clone(),
        None => interface
            .fields
            .values()
            .find(|f| f.ty == TypeRef::named("ID").non_null())?
            .name
            .clone(),
    };
    Some(Identity {
        interface: interface.name.clone(),
        field,
    })
}
