use crate::Result;
use crate::context::CompilerContext;
use crate::ir::{Argument, Directive, Field, Selection};
use crate::schema::Schema;

use super::prune_empty;

/// Remove fields that an enclosing or earlier selection already fetches.
///
/// A field is fetched unconditionally when it is reachable without passing
/// through an inline fragment or condition. Anything such a field already
/// covers is dropped from later occurrences, including fields nested in later
/// copies of the same linked field.
pub fn skip_redundant_nodes(context: &CompilerContext) -> Result<CompilerContext> {
    context.map(|ctx, definition| {
        let mut definition = definition.clone();
        let selections = std::mem::take(definition.selections_mut());
        let mut seen = Seen::default();
        *definition.selections_mut() = skip(ctx.schema(), selections, &mut seen);
        Ok(Some(definition))
    })
}

/// Tree of fields fetched so far, keyed the way responses are.
#[derive(Debug, Clone, Default)]
struct Seen {
    fields: Vec<(FieldKey, Seen)>,
}

#[derive(Debug, Clone, PartialEq)]
struct FieldKey {
    response_key: String,
    name: String,
    arguments: Vec<Argument>,
    directives: Vec<Directive>,
}

impl FieldKey {
    fn of(field: &Field) -> Self {
        Self {
            response_key: field.response_key().to_string(),
            name: field.name.clone(),
            arguments: field.arguments.clone(),
            directives: field.directives.clone(),
        }
    }
}

impl Seen {
    fn contains(&self, key: &FieldKey) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    fn entry(&mut self, key: FieldKey) -> &mut Seen {
        let index = match self.fields.iter().position(|(k, _)| *k == key) {
            Some(index) => index,
            None => {
                self.fields.push((key, Seen::default()));
                self.fields.len() - 1
            }
        };
        &mut self.fields[index].1
    }
}

fn skip(schema: &Schema, selections: Vec<Selection>, seen: &mut Seen) -> Vec<Selection> {
    let mut out = Vec::with_capacity(selections.len());
    for selection in selections {
        match selection {
            Selection::Field(mut field) => {
                let key = FieldKey::of(&field);
                if field.is_linked() {
                    let children = std::mem::take(&mut field.selections);
                    field.selections = skip(schema, children, seen.entry(key));
                    out.push(Selection::Field(field));
                } else if !seen.contains(&key) {
                    seen.entry(key);
                    out.push(Selection::Field(field));
                }
            }
            Selection::InlineFragment(mut inline) => {
                let mut local = seen.clone();
                let children = std::mem::take(&mut inline.selections);
                inline.selections = skip(schema, children, &mut local);
                out.push(Selection::InlineFragment(inline));
            }
            Selection::Condition(mut condition) => {
                let mut local = seen.clone();
                let children = std::mem::take(&mut condition.selections);
                condition.selections = skip(schema, children, &mut local);
                out.push(Selection::Condition(condition));
            }
            spread @ Selection::FragmentSpread(_) => out.push(spread),
        }
    }
    prune_empty(schema, out)
}
