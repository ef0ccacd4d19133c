use crate::Result;
use crate::context::CompilerContext;
use crate::ir::Selection;

/// Flatten selections without changing what a response contains.
///
/// Inline fragments that add nothing (no directives, and a type condition that
/// is absent or equal to the enclosing type) are replaced by their children.
/// Sibling fields with the same response key, arguments, and directives are
/// merged, as are sibling inline fragments and conditions with equal guards
/// and repeated identical spreads.
pub fn flatten(context: &CompilerContext) -> Result<CompilerContext> {
    context.map(|_, definition| {
        let mut definition = definition.clone();
        let parent = definition.type_name().to_string();
        let selections = std::mem::take(definition.selections_mut());
        *definition.selections_mut() = flatten_selections(selections, &parent);
        Ok(Some(definition))
    })
}

fn flatten_selections(selections: Vec<Selection>, parent: &str) -> Vec<Selection> {
    let mut spliced = Vec::with_capacity(selections.len());
    splice(selections, parent, &mut spliced);

    let mut merged: Vec<Selection> = Vec::with_capacity(spliced.len());
    for selection in spliced {
        match merged.iter_mut().find(|existing| can_merge(existing, &selection)) {
            Some(existing) => {
                if let (Some(into), Some(children)) =
                    (existing.selections_mut(), owned_children(selection))
                {
                    into.extend(children);
                }
            }
            None => merged.push(selection),
        }
    }

    merged
        .into_iter()
        .map(|mut selection| {
            let child_parent = match &selection {
                Selection::Field(field) => field.ty.name().to_string(),
                Selection::InlineFragment(inline) => inline
                    .type_condition
                    .clone()
                    .unwrap_or_else(|| parent.to_string()),
                _ => parent.to_string(),
            };
            if let Some(children) = selection.selections_mut() {
                let taken = std::mem::take(children);
                *children = flatten_selections(taken, &child_parent);
            }
            selection
        })
        .collect()
}

fn splice(selections: Vec<Selection>, parent: &str, out: &mut Vec<Selection>) {
    for selection in selections {
        match selection {
            Selection::InlineFragment(inline)
                if inline.directives.is_empty()
                    && inline.type_condition.as_deref().is_none_or(|t| t == parent) =>
            {
                splice(inline.selections, parent, out);
            }
            other => out.push(other),
        }
    }
}

fn can_merge(existing: &Selection, next: &Selection) -> bool {
    match (existing, next) {
        (Selection::Field(a), Selection::Field(b)) => {
            a.response_key() == b.response_key()
                && a.name == b.name
                && a.arguments == b.arguments
                && a.directives == b.directives
        }
        (Selection::InlineFragment(a), Selection::InlineFragment(b)) => {
            a.type_condition == b.type_condition && a.directives == b.directives
        }
        (Selection::Condition(a), Selection::Condition(b)) => {
            a.condition == b.condition && a.passing_value == b.passing_value
        }
        (Selection::FragmentSpread(a), Selection::FragmentSpread(b)) => {
            a.name == b.name && a.directives == b.directives
        }
        _ => false,
    }
}

fn owned_children(selection: Selection) -> Option<Vec<Selection>> {
    match selection {
        Selection::Field(field) => Some(field.selections),
        Selection::InlineFragment(inline) => Some(inline.selections),
        Selection::Condition(condition) => Some(condition.selections),
        Selection::FragmentSpread(_) => None,
    }
}
