use crate::Result;
use crate::context::CompilerContext;
use crate::ir::{Definition, InlineFragment, Selection};

use super::step_error;

/// Replace every fragment spread with an inline fragment holding the
/// fragment's selections, then drop the fragments themselves.
pub fn inline_fragments(context: &CompilerContext) -> Result<CompilerContext> {
    context.map(|ctx, definition| match definition {
        Definition::Fragment(_) => Ok(None),
        Definition::Operation(op) => {
            let mut op = op.clone();
            let mut stack = Vec::new();
            op.selections = inline(ctx, std::mem::take(&mut op.selections), &mut stack)?;
            Ok(Some(Definition::Operation(op)))
        }
    })
}

fn inline(
    ctx: &CompilerContext,
    selections: Vec<Selection>,
    stack: &mut Vec<String>,
) -> Result<Vec<Selection>> {
    selections
        .into_iter()
        .map(|selection| match selection {
            Selection::FragmentSpread(spread) => {
                let Some(fragment) = ctx.fragment(&spread.name) else {
                    return Err(step_error(format!("unknown fragment `{}`", spread.name)));
                };
                if stack.contains(&spread.name) {
                    stack.push(spread.name.clone());
                    return Err(step_error(format!(
                        "fragment cycle: {}",
                        stack.join(" -> ")
                    )));
                }
                stack.push(spread.name.clone());
                let selections = inline(ctx, fragment.selections.clone(), stack)?;
                stack.pop();
                Ok(Selection::InlineFragment(InlineFragment {
                    type_condition: Some(fragment.type_condition.clone()),
                    directives: spread.directives,
                    selections,
                    location: spread.location,
                }))
            }
            mut other => {
                if let Some(children) = other.selections_mut() {
                    let taken = std::mem::take(children);
                    *children = inline(ctx, taken, stack)?;
                }
                Ok(other)
            }
        })
        .collect()
}
