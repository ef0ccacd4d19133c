use crate::Result;
use crate::context::CompilerContext;
use crate::ir::{Selection, rewrite_selections};

use super::prune_empty;

/// Resolve conditions with a literal outcome.
///
/// `@include(if: true)` and `@skip(if: false)` splice their children into the
/// parent; the opposite literals drop them. Linked fields left empty are pruned.
pub fn skip_unreachable(context: &CompilerContext) -> Result<CompilerContext> {
    context.map(|ctx, definition| {
        let mut definition = definition.clone();
        let selections = std::mem::take(definition.selections_mut());
        *definition.selections_mut() = rewrite_selections(selections, &mut |list| {
            prune_empty(ctx.schema(), resolve(list))
        });
        Ok(Some(definition))
    })
}

fn resolve(selections: Vec<Selection>) -> Vec<Selection> {
    let mut out = Vec::with_capacity(selections.len());
    for selection in selections {
        match selection {
            Selection::Condition(condition) => match condition.static_outcome() {
                Some(true) => out.extend(condition.selections),
                Some(false) => {}
                None => out.push(Selection::Condition(condition)),
            },
            other => out.push(other),
        }
    }
    out
}
