use crate::Result;
use crate::context::CompilerContext;
use crate::ir::{Directive, Selection};
use crate::schema::Schema;

use super::prune_empty;

/// Remove everything the server does not know about: fields declared by
/// client schema extensions, selections on client-only types, and fragments
/// defined on client-only types along with their spreads.
pub fn skip_client_extensions(context: &CompilerContext) -> Result<CompilerContext> {
    context.map(|ctx, definition| {
        if ctx.schema().is_client_type(definition.type_name()) {
            return Ok(None);
        }
        let mut definition = definition.clone();
        let selections = std::mem::take(definition.selections_mut());
        *definition.selections_mut() = skip(ctx, selections);
        Ok(Some(definition))
    })
}

fn skip(ctx: &CompilerContext, selections: Vec<Selection>) -> Vec<Selection> {
    let schema = ctx.schema();
    let kept = selections
        .into_iter()
        .filter(|selection| match selection {
            Selection::Field(field) => {
                let declared_by_client = schema
                    .field(&field.parent_type, &field.name)
                    .is_some_and(|def| def.is_extension);
                !declared_by_client && !schema.is_client_type(field.ty.name())
            }
            Selection::InlineFragment(inline) => inline
                .type_condition
                .as_deref()
                .is_none_or(|t| !schema.is_client_type(t)),
            Selection::FragmentSpread(spread) => ctx
                .fragment(&spread.name)
                .is_none_or(|f| !schema.is_client_type(&f.type_condition)),
            Selection::Condition(_) => true,
        })
        .map(|mut selection| {
            if let Some(children) = selection.selections_mut() {
                let taken = std::mem::take(children);
                *children = skip(ctx, taken);
            }
            selection
        })
        .collect();
    prune_empty(schema, kept)
}

/// Strip directives the server schema does not define, along with the
/// client-only ones (`@defer`, `@relay`).
pub fn filter_directives(context: &CompilerContext) -> Result<CompilerContext> {
    context.map(|ctx, definition| {
        let schema = ctx.schema();
        let mut definition = definition.clone();
        definition.directives_mut().retain(|d| is_server_directive(schema, d));
        let selections = std::mem::take(definition.selections_mut());
        *definition.selections_mut() = filter(schema, selections);
        Ok(Some(definition))
    })
}

fn filter(schema: &Schema, selections: Vec<Selection>) -> Vec<Selection> {
    selections
        .into_iter()
        .map(|mut selection| {
            match &mut selection {
                Selection::Field(field) => {
                    field.directives.retain(|d| is_server_directive(schema, d));
                }
                Selection::FragmentSpread(spread) => {
                    spread.directives.retain(|d| is_server_directive(schema, d));
                }
                Selection::InlineFragment(inline) => {
                    inline.directives.retain(|d| is_server_directive(schema, d));
                }
                Selection::Condition(_) => {}
            }
            if let Some(children) = selection.selections_mut() {
                let taken = std::mem::take(children);
                *children = filter(schema, taken);
            }
            selection
        })
        .collect()
}

fn is_server_directive(schema: &Schema, directive: &Directive) -> bool {
    schema
        .directive(&directive.name)
        .is_some_and(|def| !def.is_client)
}
