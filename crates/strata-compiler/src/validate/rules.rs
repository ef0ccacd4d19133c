//! Built-in validation rules.

use indexmap::{IndexMap, IndexSet};
use rowan::TextRange;

use super::visitor::{
    Visitor, walk_definition, walk_field, walk_fragment_spread, walk_variable_definition,
};
use super::{GlobalContext, GlobalRule, LocalContext, LocalRule};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::parser::ast;
use crate::schema::{InputValueDef, Schema, TypeRef};
use crate::source_map::SourceId;

pub const LOCAL: &[LocalRule] = &[
    LocalRule {
        name: "known_type_names",
        check: known_type_names,
    },
    LocalRule {
        name: "fields_on_correct_type",
        check: fields_on_correct_type,
    },
    LocalRule {
        name: "scalar_leafs",
        check: scalar_leafs,
    },
    LocalRule {
        name: "known_argument_names",
        check: known_argument_names,
    },
    LocalRule {
        name: "provided_required_arguments",
        check: provided_required_arguments,
    },
    LocalRule {
        name: "no_undefined_variables",
        check: no_undefined_variables,
    },
    LocalRule {
        name: "no_unused_variables",
        check: no_unused_variables,
    },
    LocalRule {
        name: "known_directives",
        check: known_directives,
    },
];

pub const GLOBAL: &[GlobalRule] = &[
    GlobalRule {
        name: "unique_definition_names",
        check: unique_definition_names,
    },
    GlobalRule {
        name: "known_fragment_names",
        check: known_fragment_names,
    },
    GlobalRule {
        name: "no_fragment_cycles",
        check: no_fragment_cycles,
    },
];

/// Schema, source, and sink shared by the visitor-based rules.
struct Scope<'a, 'd> {
    schema: &'a Schema,
    source: SourceId,
    diag: &'d mut Diagnostics,
}

impl<'a, 'd> Scope<'a, 'd> {
    fn new(ctx: &LocalContext<'a>, diag: &'d mut Diagnostics) -> Self {
        Self {
            schema: ctx.schema,
            source: ctx.source,
            diag,
        }
    }
}

// ---------------------------------------------------------------------------
// Local rules
// ---------------------------------------------------------------------------

pub fn known_type_names(ctx: &LocalContext<'_>, diag: &mut Diagnostics) {
    KnownTypeNames(Scope::new(ctx, diag)).visit_definition(ctx.definition);
}

struct KnownTypeNames<'a, 'd>(Scope<'a, 'd>);

impl Visitor for KnownTypeNames<'_, '_> {
    fn schema(&self) -> &Schema {
        self.0.schema
    }

    fn visit_variable_definition(&mut self, variable: &ast::VariableDefinition) {
        if let Some(named) = variable.ty().and_then(|t| t.named_type())
            && let Some(name) = named.name()
        {
            match self.0.schema.get_type(name.text()) {
                None => self
                    .0
                    .diag
                    .report(self.0.source, DiagnosticKind::UnknownType, named.text_range())
                    .message(name.text())
                    .emit(),
                Some(ty) if !ty.is_input() => self
                    .0
                    .diag
                    .report(self.0.source, DiagnosticKind::UnknownType, named.text_range())
                    .raw_message(format!(
                        "variable type `{}` is not an input type",
                        name.text()
                    ))
                    .emit(),
                Some(_) => {}
            }
        }
        walk_variable_definition(self, variable);
    }

    fn visit_type_condition(&mut self, ty: &ast::NamedType) {
        let Some(name) = ty.name() else {
            return;
        };
        if !self.0.schema.has_type(name.text()) {
            self.0
                .diag
                .report(self.0.source, DiagnosticKind::UnknownType, ty.text_range())
                .message(name.text())
                .emit();
        } else if !self.0.schema.is_composite(name.text()) {
            self.0
                .diag
                .report(self.0.source, DiagnosticKind::InvalidTypeCondition, ty.text_range())
                .message(format!("fragment cannot target non-composite type `{}`", name.text()))
                .emit();
        }
    }
}

pub fn fields_on_correct_type(ctx: &LocalContext<'_>, diag: &mut Diagnostics) {
    FieldsOnCorrectType(Scope::new(ctx, diag)).visit_definition(ctx.definition);
}

struct FieldsOnCorrectType<'a, 'd>(Scope<'a, 'd>);

impl Visitor for FieldsOnCorrectType<'_, '_> {
    fn schema(&self) -> &Schema {
        self.0.schema
    }

    fn visit_field(&mut self, parent: Option<&str>, field: &ast::Field) {
        if let (Some(parent), Some(name)) = (parent, field.name())
            && self.0.schema.field(parent, name.text()).is_none()
        {
            self.0
                .diag
                .report(self.0.source, DiagnosticKind::UnknownField, name.text_range())
                .message(format!("`{parent}` has no field `{}`", name.text()))
                .emit();
        }
        walk_field(self, parent, field);
    }
}

pub fn scalar_leafs(ctx: &LocalContext<'_>, diag: &mut Diagnostics) {
    ScalarLeafs(Scope::new(ctx, diag)).visit_definition(ctx.definition);
}

struct ScalarLeafs<'a, 'd>(Scope<'a, 'd>);

impl Visitor for ScalarLeafs<'_, '_> {
    fn schema(&self) -> &Schema {
        self.0.schema
    }

    fn visit_field(&mut self, parent: Option<&str>, field: &ast::Field) {
        if let (Some(parent), Some(name)) = (parent, field.name())
            && let Some(def) = self.0.schema.field(parent, name.text())
        {
            let ty = def.ty.name();
            let has_selection = field.selection_set().is_some();
            if self.0.schema.is_leaf(ty) && has_selection {
                self.0
                    .diag
                    .report(
                        self.0.source,
                        DiagnosticKind::LeafFieldWithSelection,
                        name.text_range(),
                    )
                    .message(format!(
                        "`{}` has leaf type `{}` and cannot have a selection set",
                        name.text(),
                        def.ty
                    ))
                    .emit();
            } else if self.0.schema.is_composite(ty) && !has_selection {
                self.0
                    .diag
                    .report(
                        self.0.source,
                        DiagnosticKind::CompositeFieldWithoutSelection,
                        name.text_range(),
                    )
                    .message(format!(
                        "`{}` has composite type `{}` and needs a selection set",
                        name.text(),
                        def.ty
                    ))
                    .emit();
            }
        }
        walk_field(self, parent, field);
    }
}

pub fn known_argument_names(ctx: &LocalContext<'_>, diag: &mut Diagnostics) {
    KnownArgumentNames(Scope::new(ctx, diag)).visit_definition(ctx.definition);
}

struct KnownArgumentNames<'a, 'd>(Scope<'a, 'd>);

impl KnownArgumentNames<'_, '_> {
    fn check(
        &mut self,
        owner: &str,
        arguments: &[ast::Argument],
        defs: &IndexMap<String, InputValueDef>,
    ) {
        for arg in arguments {
            let Some(name) = arg.name() else {
                continue;
            };
            if !defs.contains_key(name.text()) {
                self.0
                    .diag
                    .report(self.0.source, DiagnosticKind::UnknownArgument, name.text_range())
                    .message(format!("`{owner}` has no argument `{}`", name.text()))
                    .emit();
            }
        }
    }
}

impl Visitor for KnownArgumentNames<'_, '_> {
    fn schema(&self) -> &Schema {
        self.0.schema
    }

    fn visit_field(&mut self, parent: Option<&str>, field: &ast::Field) {
        if let (Some(parent), Some(name)) = (parent, field.name())
            && let Some(def) = self.0.schema.field(parent, name.text())
        {
            let owner = format!("{parent}.{}", name.text());
            self.check(&owner, &field.arguments(), &def.arguments);
        }
        walk_field(self, parent, field);
    }

    fn visit_directive(&mut self, _location: &'static str, directive: &ast::Directive) {
        if let Some(name) = directive.name()
            && let Some(def) = self.0.schema.directive(name.text())
        {
            let owner = format!("@{}", name.text());
            self.check(&owner, &directive.arguments(), &def.arguments);
        }
    }
}

pub fn provided_required_arguments(ctx: &LocalContext<'_>, diag: &mut Diagnostics) {
    ProvidedRequiredArguments(Scope::new(ctx, diag)).visit_definition(ctx.definition);
}

struct ProvidedRequiredArguments<'a, 'd>(Scope<'a, 'd>);

impl ProvidedRequiredArguments<'_, '_> {
    fn check(
        &mut self,
        owner: &str,
        range: TextRange,
        arguments: &[ast::Argument],
        defs: &IndexMap<String, InputValueDef>,
    ) {
        let provided: Vec<String> = arguments
            .iter()
            .filter_map(|a| a.name().map(|n| n.text().to_string()))
            .collect();
        for def in defs.values() {
            if is_required(&def.ty, def.default_value.as_deref()) && !provided.contains(&def.name) {
                self.0
                    .diag
                    .report(self.0.source, DiagnosticKind::MissingRequiredArgument, range)
                    .message(format!("`{owner}` requires argument `{}: {}`", def.name, def.ty))
                    .emit();
            }
        }
    }
}

fn is_required(ty: &TypeRef, default_value: Option<&str>) -> bool {
    ty.is_non_null() && default_value.is_none()
}

impl Visitor for ProvidedRequiredArguments<'_, '_> {
    fn schema(&self) -> &Schema {
        self.0.schema
    }

    fn visit_field(&mut self, parent: Option<&str>, field: &ast::Field) {
        if let (Some(parent), Some(name)) = (parent, field.name())
            && let Some(def) = self.0.schema.field(parent, name.text())
        {
            let owner = format!("{parent}.{}", name.text());
            self.check(&owner, name.text_range(), &field.arguments(), &def.arguments);
        }
        walk_field(self, parent, field);
    }

    fn visit_directive(&mut self, _location: &'static str, directive: &ast::Directive) {
        if let Some(name) = directive.name()
            && let Some(def) = self.0.schema.directive(name.text())
        {
            let owner = format!("@{}", name.text());
            self.check(&owner, directive.text_range(), &directive.arguments(), &def.arguments);
        }
    }
}

/// Collects variable usages, optionally following fragment spreads.
struct VariableUsages<'a> {
    schema: &'a Schema,
    fragments: Option<&'a super::FragmentIndex>,
    visited: IndexSet<String>,
    usages: Vec<ast::Variable>,
}

impl<'a> VariableUsages<'a> {
    fn collect(
        ctx: &LocalContext<'a>,
        op: &ast::OperationDefinition,
        follow_spreads: bool,
    ) -> Vec<ast::Variable> {
        let mut collector = VariableUsages {
            schema: ctx.schema,
            fragments: follow_spreads.then_some(ctx.fragments),
            visited: IndexSet::new(),
            usages: Vec::new(),
        };
        collector.visit_definition(&ast::Definition::Operation(op.clone()));
        collector.usages
    }
}

impl Visitor for VariableUsages<'_> {
    fn schema(&self) -> &Schema {
        self.schema
    }

    fn visit_variable_definition(&mut self, _variable: &ast::VariableDefinition) {
        // Defaults cannot reference variables.
    }

    fn visit_fragment_spread(&mut self, _parent: Option<&str>, spread: &ast::FragmentSpread) {
        walk_fragment_spread(self, spread);
        let Some(fragments) = self.fragments else {
            return;
        };
        let Some(name) = spread.name() else {
            return;
        };
        if !self.visited.insert(name.text().to_string()) {
            return;
        }
        if let Some((_, frag)) = fragments.get(name.text()) {
            walk_definition(self, &ast::Definition::Fragment(frag.clone()));
        }
    }

    fn visit_variable_usage(&mut self, variable: &ast::Variable) {
        self.usages.push(variable.clone());
    }
}

fn defined_variables(op: &ast::OperationDefinition) -> Vec<(String, TextRange)> {
    op.variable_definitions()
        .iter()
        .filter_map(|def| {
            let var = def.variable()?;
            let name = var.name()?;
            Some((name.text().to_string(), var.text_range()))
        })
        .collect()
}

pub fn no_undefined_variables(ctx: &LocalContext<'_>, diag: &mut Diagnostics) {
    let ast::Definition::Operation(op) = ctx.definition else {
        return;
    };
    let defined = defined_variables(op);
    for usage in VariableUsages::collect(ctx, op, false) {
        let Some(name) = usage.name() else {
            continue;
        };
        if !defined.iter().any(|(d, _)| d == name.text()) {
            diag.report(ctx.source, DiagnosticKind::UndefinedVariable, usage.text_range())
                .message(name.text())
                .emit();
        }
    }
}

pub fn no_unused_variables(ctx: &LocalContext<'_>, diag: &mut Diagnostics) {
    let ast::Definition::Operation(op) = ctx.definition else {
        return;
    };
    let used: IndexSet<String> = VariableUsages::collect(ctx, op, true)
        .iter()
        .filter_map(|v| v.name().map(|n| n.text().to_string()))
        .collect();
    for (name, range) in defined_variables(op) {
        if !used.contains(&name) {
            diag.report(ctx.source, DiagnosticKind::UnusedVariable, range)
                .message(&name)
                .emit();
        }
    }
}

pub fn known_directives(ctx: &LocalContext<'_>, diag: &mut Diagnostics) {
    KnownDirectives(Scope::new(ctx, diag)).visit_definition(ctx.definition);
}

struct KnownDirectives<'a, 'd>(Scope<'a, 'd>);

impl Visitor for KnownDirectives<'_, '_> {
    fn schema(&self) -> &Schema {
        self.0.schema
    }

    fn visit_directive(&mut self, location: &'static str, directive: &ast::Directive) {
        let Some(name) = directive.name() else {
            return;
        };
        match self.0.schema.directive(name.text()) {
            None => self
                .0
                .diag
                .report(self.0.source, DiagnosticKind::UnknownDirective, directive.text_range())
                .message(name.text())
                .emit(),
            Some(def) if !def.locations.iter().any(|l| l == location) => self
                .0
                .diag
                .report(self.0.source, DiagnosticKind::UnknownDirective, directive.text_range())
                .raw_message(format!("directive `@{}` is not allowed on {location}", name.text()))
                .emit(),
            Some(_) => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Global rules
// ---------------------------------------------------------------------------

pub fn unique_definition_names(ctx: &GlobalContext<'_>, diag: &mut Diagnostics) {
    let mut seen: IndexMap<String, (SourceId, TextRange)> = IndexMap::new();
    for doc in ctx.documents {
        for def in doc.document().definitions() {
            if matches!(def, ast::Definition::TypeSystem(_)) {
                continue;
            }
            let Some(name) = def.name() else {
                continue;
            };
            match seen.get(name.text()) {
                Some((first_source, first_range)) => {
                    diag.report(
                        doc.source(),
                        DiagnosticKind::DuplicateDefinition,
                        name.text_range(),
                    )
                    .message(name.text())
                    .related_to(*first_source, *first_range, "first defined here")
                    .emit();
                }
                None => {
                    seen.insert(name.text().to_string(), (doc.source(), name.text_range()));
                }
            }
        }
    }
}

/// Spreads directly inside a definition, with their name ranges.
struct Spreads<'a> {
    schema: &'a Schema,
    spreads: Vec<(String, TextRange)>,
}

impl<'a> Spreads<'a> {
    fn of(schema: &'a Schema, definition: &ast::Definition) -> Vec<(String, TextRange)> {
        let mut collector = Spreads {
            schema,
            spreads: Vec::new(),
        };
        collector.visit_definition(definition);
        collector.spreads
    }
}

impl Visitor for Spreads<'_> {
    fn schema(&self) -> &Schema {
        self.schema
    }

    fn visit_fragment_spread(&mut self, _parent: Option<&str>, spread: &ast::FragmentSpread) {
        if let Some(name) = spread.name() {
            self.spreads
                .push((name.text().to_string(), name.text_range()));
        }
    }
}

pub fn known_fragment_names(ctx: &GlobalContext<'_>, diag: &mut Diagnostics) {
    for doc in ctx.documents {
        for def in doc.document().definitions() {
            for (name, range) in Spreads::of(ctx.schema, &def) {
                if !ctx.fragments.contains(&name) {
                    diag.report(doc.source(), DiagnosticKind::UnknownFragment, range)
                        .message(&name)
                        .emit();
                }
            }
        }
    }
}

pub fn no_fragment_cycles(ctx: &GlobalContext<'_>, diag: &mut Diagnostics) {
    let graph: IndexMap<&str, (SourceId, TextRange, Vec<String>)> = ctx
        .fragments
        .iter()
        .map(|(name, source, frag)| {
            let range = frag.name().map_or(frag.text_range(), |n| n.text_range());
            let spreads = Spreads::of(ctx.schema, &ast::Definition::Fragment(frag.clone()))
                .into_iter()
                .map(|(name, _)| name)
                .collect();
            (name, (source, range, spreads))
        })
        .collect();

    let mut done: IndexSet<&str> = IndexSet::new();
    let mut reported: IndexSet<Vec<String>> = IndexSet::new();
    for &start in graph.keys() {
        let mut path = Vec::new();
        find_cycles(&graph, start, &mut path, &mut done, &mut |cycle: &[&str]| {
            let mut key: Vec<String> = cycle.iter().map(|s| s.to_string()).collect();
            key.sort();
            if !reported.insert(key) {
                return;
            }
            let head = cycle[0];
            let (source, range, _) = &graph[head];
            let mut via: Vec<&str> = cycle.to_vec();
            via.push(head);
            diag.report(*source, DiagnosticKind::FragmentCycle, *range)
                .raw_message(format!("fragment `{head}` spreads itself via {}", via.join(" -> ")))
                .emit();
        });
    }
}

fn find_cycles<'g>(
    graph: &IndexMap<&'g str, (SourceId, TextRange, Vec<String>)>,
    node: &'g str,
    path: &mut Vec<&'g str>,
    done: &mut IndexSet<&'g str>,
    on_cycle: &mut impl FnMut(&[&'g str]),
) {
    if done.contains(node) {
        return;
    }
    if let Some(index) = path.iter().position(|n| *n == node) {
        on_cycle(&path[index..]);
        return;
    }
    let Some((&key, (_, _, spreads))) = graph.get_key_value(node) else {
        return;
    };
    path.push(key);
    for next in spreads {
        if let Some((&next_key, _)) = graph.get_key_value(next.as_str()) {
            find_cycles(graph, next_key, path, done, on_cycle);
        }
    }
    path.pop();
    done.insert(key);
}
