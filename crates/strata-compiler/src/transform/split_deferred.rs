use serde_json::json;

use crate::Result;
use crate::context::CompilerContext;
use crate::ir::{Definition, FragmentSpread, Operation, Selection, Value};
use crate::parser::OperationType;

use super::step_error;

/// Joins a parent operation name and a deferred fragment name.
pub const DEFER_SEPARATOR: &str = "$defer$";

const DEFER: &str = "defer";

/// Move `@defer`red spreads into derived operations.
///
/// The spread stays in the parent with `@defer` removed, so the parent still
/// reads the fragment. Each deferred fragment also gets its own operation
/// named `<Parent>$defer$<Fragment>`, rooted at the fragment's type and marked
/// `deferred` in its metadata. `@defer(if: false)` is removed without
/// splitting.
pub fn split_deferred(context: &CompilerContext) -> Result<CompilerContext> {
    let mut derived = Vec::new();
    let rewritten = context.map(|ctx, definition| {
        let Definition::Operation(op) = definition else {
            return Ok(Some(definition.clone()));
        };
        let mut op = op.clone();
        let mut deferred = Vec::new();
        op.selections = strip(std::mem::take(&mut op.selections), &mut deferred);
        if deferred.is_empty() {
            return Ok(Some(Definition::Operation(op)));
        }
        for spread in &deferred {
            let Some(fragment) = ctx.fragment(&spread.name) else {
                return Err(step_error(format!(
                    "deferred fragment `{}` is not defined",
                    spread.name
                )));
            };
            derived.push(Definition::Operation(Operation {
                name: format!("{}{DEFER_SEPARATOR}{}", op.name, spread.name),
                kind: OperationType::Query,
                root_type: fragment.type_condition.clone(),
                variables: op.variables.clone(),
                directives: Vec::new(),
                selections: vec![Selection::FragmentSpread(spread.clone())],
                location: spread.location.clone(),
                metadata: [
                    ("deferred".to_string(), json!(true)),
                    ("parent".to_string(), json!(op.name)),
                    ("fragment".to_string(), json!(spread.name)),
                ]
                .into_iter()
                .collect(),
            }));
        }
        let names: Vec<_> = deferred.iter().map(|s| s.name.as_str()).collect();
        op.metadata
            .insert("deferred_fragments".to_string(), json!(names));
        Ok(Some(Definition::Operation(op)))
    })?;
    rewritten.add_all(derived)
}

/// Remove `@defer` from spreads, collecting the ones that really defer.
fn strip(selections: Vec<Selection>, deferred: &mut Vec<FragmentSpread>) -> Vec<Selection> {
    selections
        .into_iter()
        .map(|mut selection| {
            match &mut selection {
                Selection::FragmentSpread(spread) => {
                    if let Some(index) = spread.directives.iter().position(|d| d.name == DEFER) {
                        let directive = spread.directives.remove(index);
                        let enabled = directive.argument("if") != Some(&Value::Boolean(false));
                        if enabled && !deferred.iter().any(|d| d.name == spread.name) {
                            deferred.push(spread.clone());
                        }
                    }
                }
                other => {
                    if let Some(children) = other.selections_mut() {
                        let taken = std::mem::take(children);
                        *children = strip(taken, deferred);
                    }
                }
            }
            selection
        })
        .collect()
}
