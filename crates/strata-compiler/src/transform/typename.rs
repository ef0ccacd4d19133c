use crate::Result;
use crate::context::CompilerContext;
use crate::ir::{Field, Location, Selection};
use crate::schema::{Schema, TYPENAME_FIELD, TypeRef};

/// Select `__typename` wherever the concrete type is not known statically.
///
/// Applies to the roots of definitions on abstract types and to linked fields
/// of abstract type. An existing unaliased `__typename` is left alone.
pub fn generate_typename(context: &CompilerContext) -> Result<CompilerContext> {
    context.map(|ctx, definition| {
        let mut definition = definition.clone();
        let parent = definition.type_name().to_string();
        let selections = std::mem::take(definition.selections_mut());
        *definition.selections_mut() = add_typename(ctx.schema(), &parent, selections, true);
        Ok(Some(definition))
    })
}

fn add_typename(
    schema: &Schema,
    parent: &str,
    selections: Vec<Selection>,
    is_object_scope: bool,
) -> Vec<Selection> {
    let mut out: Vec<Selection> = selections
        .into_iter()
        .map(|mut selection| {
            match &mut selection {
                Selection::Field(field) if field.is_linked() => {
                    let ty = field.ty.name().to_string();
                    let children = std::mem::take(&mut field.selections);
                    field.selections = add_typename(schema, &ty, children, true);
                }
                Selection::Field(_) | Selection::FragmentSpread(_) => {}
                Selection::InlineFragment(inline) => {
                    let ty = inline
                        .type_condition
                        .clone()
                        .unwrap_or_else(|| parent.to_string());
                    let children = std::mem::take(&mut inline.selections);
                    inline.selections = add_typename(schema, &ty, children, false);
                }
                Selection::Condition(condition) => {
                    let children = std::mem::take(&mut condition.selections);
                    condition.selections = add_typename(schema, parent, children, false);
                }
            }
            selection
        })
        .collect();

    if is_object_scope && schema.is_abstract(parent) && !selects_typename(&out) {
        out.insert(0, Selection::Field(typename_field(parent)));
    }
    out
}

fn selects_typename(selections: &[Selection]) -> bool {
    selections
        .iter()
        .filter_map(Selection::as_field)
        .any(|f| f.name == TYPENAME_FIELD && f.alias.is_none())
}

fn typename_field(parent: &str) -> Field {
    Field {
        alias: None,
        name: TYPENAME_FIELD.to_string(),
        parent_type: parent.to_string(),
        ty: TypeRef::named("String").non_null(),
        arguments: Vec::new(),
        directives: Vec::new(),
        selections: Vec::new(),
        location: Location::generated(),
    }
}
