//! Typed AST visitor.
//!
//! Implement `Visitor` and override the `visit_*` methods you care about.
//! Call the matching `walk_*` function from an override to keep descending.
//! Selection-level methods receive the enclosing type, or `None` when it is
//! unknown (an unknown field or type condition further up).
//!
//! ```ignore
//! impl Visitor for MyRule<'_> {
//!     fn schema(&self) -> &Schema { self.schema }
//!
//!     fn visit_field(&mut self, parent: Option<&str>, field: &ast::Field) {
//!         // Pre-order logic
//!         walk_field(self, parent, field);
//!     }
//! }
//! ```

use crate::parser::ast;
use crate::schema::Schema;

pub const QUERY: &str = "QUERY";
pub const MUTATION: &str = "MUTATION";
pub const SUBSCRIPTION: &str = "SUBSCRIPTION";
pub const FIELD: &str = "FIELD";
pub const FRAGMENT_DEFINITION: &str = "FRAGMENT_DEFINITION";
pub const FRAGMENT_SPREAD: &str = "FRAGMENT_SPREAD";
pub const INLINE_FRAGMENT: &str = "INLINE_FRAGMENT";
pub const VARIABLE_DEFINITION: &str = "VARIABLE_DEFINITION";

pub trait Visitor: Sized {
    /// Schema used to resolve field types while walking.
    fn schema(&self) -> &Schema;

    fn visit_definition(&mut self, definition: &ast::Definition) {
        walk_definition(self, definition);
    }

    fn visit_variable_definition(&mut self, variable: &ast::VariableDefinition) {
        walk_variable_definition(self, variable);
    }

    fn visit_type_condition(&mut self, _ty: &ast::NamedType) {}

    fn visit_selection_set(&mut self, parent: Option<&str>, set: &ast::SelectionSet) {
        walk_selection_set(self, parent, set);
    }

    fn visit_field(&mut self, parent: Option<&str>, field: &ast::Field) {
        walk_field(self, parent, field);
    }

    fn visit_fragment_spread(&mut self, _parent: Option<&str>, spread: &ast::FragmentSpread) {
        walk_fragment_spread(self, spread);
    }

    fn visit_inline_fragment(&mut self, parent: Option<&str>, inline: &ast::InlineFragment) {
        walk_inline_fragment(self, parent, inline);
    }

    fn visit_directive(&mut self, _location: &'static str, directive: &ast::Directive) {
        walk_directive(self, directive);
    }

    fn visit_variable_usage(&mut self, _variable: &ast::Variable) {
        // Leaf
    }
}

pub fn walk_definition<V: Visitor>(visitor: &mut V, definition: &ast::Definition) {
    match definition {
        ast::Definition::Operation(op) => {
            for var in op.variable_definitions() {
                visitor.visit_variable_definition(&var);
            }
            let location = match op.operation_type() {
                crate::parser::OperationType::Query => QUERY,
                crate::parser::OperationType::Mutation => MUTATION,
                crate::parser::OperationType::Subscription => SUBSCRIPTION,
            };
            for directive in op.directives() {
                visitor.visit_directive(location, &directive);
            }
            let root = visitor
                .schema()
                .root_type(op.operation_type())
                .map(|t| t.name.clone());
            if let Some(set) = op.selection_set() {
                visitor.visit_selection_set(root.as_deref(), &set);
            }
        }
        ast::Definition::Fragment(frag) => {
            let ty = frag.type_condition();
            if let Some(ty) = &ty {
                visitor.visit_type_condition(ty);
            }
            for directive in frag.directives() {
                visitor.visit_directive(FRAGMENT_DEFINITION, &directive);
            }
            let parent = composite_name(visitor.schema(), ty.as_ref());
            if let Some(set) = frag.selection_set() {
                visitor.visit_selection_set(parent.as_deref(), &set);
            }
        }
        ast::Definition::TypeSystem(_) => {}
    }
}

pub fn walk_variable_definition<V: Visitor>(visitor: &mut V, variable: &ast::VariableDefinition) {
    for directive in variable.directives() {
        visitor.visit_directive(VARIABLE_DEFINITION, &directive);
    }
}

pub fn walk_selection_set<V: Visitor>(
    visitor: &mut V,
    parent: Option<&str>,
    set: &ast::SelectionSet,
) {
    for selection in set.selections() {
        match &selection {
            ast::Selection::Field(field) => visitor.visit_field(parent, field),
            ast::Selection::FragmentSpread(spread) => visitor.visit_fragment_spread(parent, spread),
            ast::Selection::InlineFragment(inline) => visitor.visit_inline_fragment(parent, inline),
        }
    }
}

pub fn walk_field<V: Visitor>(visitor: &mut V, parent: Option<&str>, field: &ast::Field) {
    walk_arguments(visitor, &field.arguments());
    for directive in field.directives() {
        visitor.visit_directive(FIELD, &directive);
    }
    let schema = visitor.schema();
    let child = match (parent, field.name()) {
        (Some(parent), Some(name)) => schema
            .field(parent, name.text())
            .map(|def| def.ty.name())
            .filter(|ty| schema.is_composite(ty))
            .map(str::to_string),
        _ => None,
    };
    if let Some(set) = field.selection_set() {
        visitor.visit_selection_set(child.as_deref(), &set);
    }
}

pub fn walk_fragment_spread<V: Visitor>(visitor: &mut V, spread: &ast::FragmentSpread) {
    for directive in spread.directives() {
        visitor.visit_directive(FRAGMENT_SPREAD, &directive);
    }
}

pub fn walk_inline_fragment<V: Visitor>(
    visitor: &mut V,
    parent: Option<&str>,
    inline: &ast::InlineFragment,
) {
    let ty = inline.type_condition();
    if let Some(ty) = &ty {
        visitor.visit_type_condition(ty);
    }
    for directive in inline.directives() {
        visitor.visit_directive(INLINE_FRAGMENT, &directive);
    }
    let scope = match &ty {
        Some(_) => composite_name(visitor.schema(), ty.as_ref()),
        None => parent.map(str::to_string),
    };
    if let Some(set) = inline.selection_set() {
        visitor.visit_selection_set(scope.as_deref(), &set);
    }
}

pub fn walk_directive<V: Visitor>(visitor: &mut V, directive: &ast::Directive) {
    walk_arguments(visitor, &directive.arguments());
}

fn walk_arguments<V: Visitor>(visitor: &mut V, arguments: &[ast::Argument]) {
    for arg in arguments {
        if let Some(value) = arg.value() {
            for var in value.variables() {
                visitor.visit_variable_usage(&var);
            }
        }
    }
}

/// Name of a type condition, if the schema knows it as a composite type.
fn composite_name(schema: &Schema, ty: Option<&ast::NamedType>) -> Option<String> {
    let name = ty?.name()?;
    schema
        .is_composite(name.text())
        .then(|| name.text().to_string())
}
