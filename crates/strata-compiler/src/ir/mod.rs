//! Intermediate representation of operations and fragments.
//!
//! IR is schema-aware: every field knows its parent type and output type, and
//! argument values are already typed. Transforms and artifact compilation only
//! ever see IR, never syntax.

pub mod printer;


use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rowan::TextRange;

use crate::parser::OperationType;
use crate::schema::TypeRef;
use crate::source_map::SourceId;

pub use printer::{print_definition, print_definitions, print_selections, print_value};

/// Free-form metadata attached by lowering and transforms.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Where an IR node came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub source: SourceId,
    pub range: TextRange,
    /// File of the originating document, if it was read from disk.
    pub path: Option<PathBuf>,
}

impl Location {
    pub fn new(source: SourceId, range: TextRange, path: Option<PathBuf>) -> Self {
        Self {
            source,
            range,
            path,
        }
    }

    /// Location for nodes synthesized by the compiler.
    pub fn generated() -> Self {
        Self {
            source: SourceId::default(),
            range: TextRange::default(),
            path: None,
        }
    }

    pub fn directory(&self) -> Option<&Path> {
        self.path.as_deref().and_then(Path::parent)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Operation(Operation),
    Fragment(Fragment),
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Operation(op) => &op.name,
            Definition::Fragment(frag) => &frag.name,
        }
    }

    /// Root type for operations, type condition for fragments.
    pub fn type_name(&self) -> &str {
        match self {
            Definition::Operation(op) => &op.root_type,
            Definition::Fragment(frag) => &frag.type_condition,
        }
    }

    pub fn selections(&self) -> &[Selection] {
        match self {
            Definition::Operation(op) => &op.selections,
            Definition::Fragment(frag) => &frag.selections,
        }
    }

    pub fn selections_mut(&mut self) -> &mut Vec<Selection> {
        match self {
            Definition::Operation(op) => &mut op.selections,
            Definition::Fragment(frag) => &mut frag.selections,
        }
    }

    pub fn directives(&self) -> &[Directive] {
        match self {
            Definition::Operation(op) => &op.directives,
            Definition::Fragment(frag) => &frag.directives,
        }
    }

    pub fn directives_mut(&mut self) -> &mut Vec<Directive> {
        match self {
            Definition::Operation(op) => &mut op.directives,
            Definition::Fragment(frag) => &mut frag.directives,
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            Definition::Operation(op) => &op.location,
            Definition::Fragment(frag) => &frag.location,
        }
    }

    pub fn metadata(&self) -> &Metadata {
        match self {
            Definition::Operation(op) => &op.metadata,
            Definition::Fragment(frag) => &frag.metadata,
        }
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        match self {
            Definition::Operation(op) => &mut op.metadata,
            Definition::Fragment(frag) => &mut frag.metadata,
        }
    }

    pub fn as_operation(&self) -> Option<&Operation> {
        match self {
            Definition::Operation(op) => Some(op),
            Definition::Fragment(_) => None,
        }
    }

    pub fn as_fragment(&self) -> Option<&Fragment> {
        match self {
            Definition::Fragment(frag) => Some(frag),
            Definition::Operation(_) => None,
        }
    }

    /// Names of fragments spread anywhere in this definition.
    pub fn spread_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        collect_spreads(self.selections(), &mut names);
        names
    }
}

fn collect_spreads<'a>(selections: &'a [Selection], out: &mut Vec<&'a str>) {
    for selection in selections {
        match selection {
            Selection::FragmentSpread(spread) => {
                if !out.contains(&spread.name.as_str()) {
                    out.push(&spread.name);
                }
            }
            other => collect_spreads(other.selections(), out),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub name: String,
    pub kind: OperationType,
    pub root_type: String,
    pub variables: Vec<VariableDefinition>,
    pub directives: Vec<Directive>,
    pub selections: Vec<Selection>,
    pub location: Location,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub name: String,
    pub type_condition: String,
    pub directives: Vec<Directive>,
    pub selections: Vec<Selection>,
    pub location: Location,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDefinition {
    pub name: String,
    pub ty: TypeRef,
    pub default_value: Option<Value>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Field(Field),
    FragmentSpread(FragmentSpread),
    InlineFragment(InlineFragment),
    Condition(Condition),
}

impl Selection {
    /// Child selections; empty for scalar fields and spreads.
    pub fn selections(&self) -> &[Selection] {
        match self {
            Selection::Field(field) => &field.selections,
            Selection::FragmentSpread(_) => &[],
            Selection::InlineFragment(inline) => &inline.selections,
            Selection::Condition(condition) => &condition.selections,
        }
    }

    pub fn selections_mut(&mut self) -> Option<&mut Vec<Selection>> {
        match self {
            Selection::Field(field) => Some(&mut field.selections),
            Selection::FragmentSpread(_) => None,
            Selection::InlineFragment(inline) => Some(&mut inline.selections),
            Selection::Condition(condition) => Some(&mut condition.selections),
        }
    }

    pub fn as_field(&self) -> Option<&Field> {
        match self {
            Selection::Field(field) => Some(field),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub alias: Option<String>,
    pub name: String,
    /// Type the field was selected on.
    pub parent_type: String,
    pub ty: TypeRef,
    pub arguments: Vec<Argument>,
    pub directives: Vec<Directive>,
    /// Empty for scalar fields.
    pub selections: Vec<Selection>,
    pub location: Location,
}

impl Field {
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn is_linked(&self) -> bool {
        !self.selections.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FragmentSpread {
    pub name: String,
    pub directives: Vec<Directive>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlineFragment {
    pub type_condition: Option<String>,
    pub directives: Vec<Directive>,
    pub selections: Vec<Selection>,
    pub location: Location,
}

/// Selections guarded by `@include` (`passing_value: true`) or `@skip`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub condition: Value,
    pub passing_value: bool,
    pub selections: Vec<Selection>,
}

impl Condition {
    /// The statically known outcome, when the condition is a literal.
    pub fn static_outcome(&self) -> Option<bool> {
        match self.condition {
            Value::Boolean(value) => Some(value == self.passing_value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub name: String,
    pub arguments: Vec<Argument>,
}

impl Directive {
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Variable(String),
    Int(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
    Enum(String),
    List(Vec<Value>),
    Object(Vec<(String, Value)>),
}

impl Value {
    pub fn variables(&self) -> Vec<&str> {
        match self {
            Value::Variable(name) => vec![name.as_str()],
            Value::List(items) => items.iter().flat_map(Value::variables).collect(),
            Value::Object(fields) => fields.iter().flat_map(|(_, v)| v.variables()).collect(),
            _ => Vec::new(),
        }
    }

    /// JSON form used in artifacts. Variables become `{"variable": name}`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::{Value as Json, json};
        match self {
            Value::Variable(name) => json!({ "variable": name }),
            Value::Int(n) => json!(n),
            Value::Float(n) => json!(n),
            Value::String(s) | Value::Enum(s) => Json::String(s.clone()),
            Value::Boolean(b) => Json::Bool(*b),
            Value::Null => Json::Null,
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(fields) => Json::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Rewrite every selection list in `selections`, children first.
pub fn rewrite_selections<F>(selections: Vec<Selection>, f: &mut F) -> Vec<Selection>
where
    F: FnMut(Vec<Selection>) -> Vec<Selection>,
{
    let children_done = selections
        .into_iter()
        .map(|mut selection| {
            if let Some(children) = selection.selections_mut() {
                let taken = std::mem::take(children);
                *children = rewrite_selections(taken, f);
            }
            selection
        })
        .collect();
    f(children_done)
}
