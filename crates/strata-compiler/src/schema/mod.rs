//! Immutable GraphQL schema model.
//!
//! A [`Schema`] is built from SDL documents ([`build`]) and can be extended
//! with client-side schema extensions ([`extend`]), which always produces a
//! new value that is a superset of the original. Types and fields introduced
//! by an extension are flagged with `is_extension`.

pub mod build;
pub mod extend;

#[cfg(test)]
mod extend_tests;

use indexmap::IndexMap;

use crate::parser::OperationType;
use crate::source_map::SourceMap;
use crate::{Error, Result};

pub use build::{SchemaBuilder, build_schema};
pub use extend::extend_schema;

/// Scalars every schema has.
pub const BUILTIN_SCALARS: &[&str] = &["ID", "String", "Int", "Float", "Boolean"];

/// Directives every schema knows, plus the compiler's own client directives.
pub(crate) const BUILTIN_SDL: &str = r#"
scalar ID
scalar String
scalar Int
scalar Float
scalar Boolean
directive @include(if: Boolean!) on FIELD | FRAGMENT_SPREAD | INLINE_FRAGMENT
directive @skip(if: Boolean!) on FIELD | FRAGMENT_SPREAD | INLINE_FRAGMENT
directive @deprecated(reason: String = "No longer supported") on FIELD_DEFINITION | ENUM_VALUE
"#;

/// Directives the compiler consumes itself; never sent to the server.
pub(crate) const CLIENT_SDL: &str = r#"
directive @defer(label: String, if: Boolean = true) on FRAGMENT_SPREAD | INLINE_FRAGMENT
directive @relay(plural: Boolean, mask: Boolean) on FRAGMENT_DEFINITION | FRAGMENT_SPREAD
"#;

pub const TYPENAME_FIELD: &str = "__typename";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
}

impl TypeKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            TypeKind::Scalar => "scalar",
            TypeKind::Object => "type",
            TypeKind::Interface => "interface",
            TypeKind::Union => "union",
            TypeKind::Enum => "enum",
            TypeKind::InputObject => "input",
        }
    }
}

/// Reference to a type from a field, argument, or variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn non_null(self) -> Self {
        match self {
            TypeRef::NonNull(_) => self,
            other => TypeRef::NonNull(Box::new(other)),
        }
    }

    pub fn list(self) -> Self {
        TypeRef::List(Box::new(self))
    }

    /// The innermost named type.
    pub fn name(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.name(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }

    pub fn is_list(&self) -> bool {
        match self {
            TypeRef::List(_) => true,
            TypeRef::NonNull(inner) => inner.is_list(),
            TypeRef::Named(_) => false,
        }
    }

    /// Strip one level of non-null.
    pub fn nullable(&self) -> &TypeRef {
        match self {
            TypeRef::NonNull(inner) => inner,
            other => other,
        }
    }

    /// Element type of a (possibly non-null) list.
    pub fn item_type(&self) -> Option<&TypeRef> {
        match self.nullable() {
            TypeRef::List(inner) => Some(inner),
            _ => None,
        }
    }

    pub(crate) fn from_ast(ty: &crate::parser::ast::Type) -> Option<TypeRef> {
        use crate::parser::ast::Type;
        Some(match ty {
            Type::Named(n) => TypeRef::Named(n.name()?.text().to_string()),
            Type::List(l) => TypeRef::List(Box::new(TypeRef::from_ast(&l.inner()?)?)),
            Type::NonNull(n) => TypeRef::NonNull(Box::new(TypeRef::from_ast(&n.inner()?)?)),
        })
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeRef::Named(name) => f.write_str(name),
            TypeRef::List(inner) => write!(f, "[{inner}]"),
            TypeRef::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputValueDef {
    pub name: String,
    pub ty: TypeRef,
    /// Default value as printed GraphQL.
    pub default_value: Option<String>,
    pub description: Option<String>,
    pub is_extension: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeRef,
    pub arguments: IndexMap<String, InputValueDef>,
    pub description: Option<String>,
    pub deprecation: Option<String>,
    pub is_extension: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            arguments: IndexMap::new(),
            description: None,
            deprecation: None,
            is_extension: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    pub name: String,
    pub kind: TypeKind,
    pub description: Option<String>,
    /// Object and interface fields.
    pub fields: IndexMap<String, FieldDef>,
    /// Interfaces implemented by an object or interface.
    pub interfaces: Vec<String>,
    /// Union members.
    pub members: Vec<String>,
    pub enum_values: Vec<String>,
    pub input_fields: IndexMap<String, InputValueDef>,
    pub is_extension: bool,
}

impl TypeDef {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
            fields: IndexMap::new(),
            interfaces: Vec::new(),
            members: Vec::new(),
            enum_values: Vec::new(),
            input_fields: IndexMap::new(),
            is_extension: false,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Object | TypeKind::Interface | TypeKind::Union
        )
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self.kind, TypeKind::Interface | TypeKind::Union)
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, TypeKind::Scalar | TypeKind::Enum)
    }

    pub fn is_input(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Scalar | TypeKind::Enum | TypeKind::InputObject
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveDef {
    pub name: String,
    pub arguments: IndexMap<String, InputValueDef>,
    pub locations: Vec<String>,
    pub repeatable: bool,
    /// Consumed by the compiler and stripped before queries reach the server.
    pub is_client: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub(crate) types: IndexMap<String, TypeDef>,
    pub(crate) directives: IndexMap<String, DirectiveDef>,
    pub(crate) query_type: Option<String>,
    pub(crate) mutation_type: Option<String>,
    pub(crate) subscription_type: Option<String>,
    typename_field: FieldDef,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            types: IndexMap::new(),
            directives: IndexMap::new(),
            query_type: None,
            mutation_type: None,
            subscription_type: None,
            typename_field: FieldDef::new(
                TYPENAME_FIELD,
                TypeRef::named("String").non_null(),
            ),
        }
    }
}

impl Schema {
    /// Build a schema from one SDL string.
    pub fn parse(sdl: &str) -> Result<Schema> {
        let mut sources = SourceMap::new();
        let id = sources.add_inline("<schema>", sdl);
        SchemaBuilder::new(&sources).add_source(id)?.finish()
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn get_type(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    pub fn directive(&self, name: &str) -> Option<&DirectiveDef> {
        self.directives.get(name)
    }

    pub fn directives(&self) -> impl Iterator<Item = &DirectiveDef> {
        self.directives.values()
    }

    pub fn root_type(&self, operation: OperationType) -> Option<&TypeDef> {
        let name = match operation {
            OperationType::Query => self.query_type.as_deref(),
            OperationType::Mutation => self.mutation_type.as_deref(),
            OperationType::Subscription => self.subscription_type.as_deref(),
        }?;
        self.types.get(name)
    }

    /// Field lookup, including the `__typename` meta field on composite types.
    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldDef> {
        let ty = self.types.get(type_name)?;
        if field_name == TYPENAME_FIELD && ty.is_composite() {
            return Some(&self.typename_field);
        }
        ty.fields.get(field_name)
    }

    pub fn is_composite(&self, name: &str) -> bool {
        self.types.get(name).is_some_and(TypeDef::is_composite)
    }

    pub fn is_abstract(&self, name: &str) -> bool {
        self.types.get(name).is_some_and(TypeDef::is_abstract)
    }

    pub fn is_leaf(&self, name: &str) -> bool {
        self.types.get(name).is_some_and(TypeDef::is_leaf)
    }

    /// Whether `type_name` is `interface` or transitively implements it.
    pub fn implements(&self, type_name: &str, interface: &str) -> bool {
        if type_name == interface {
            return true;
        }
        let mut stack = vec![type_name];
        let mut seen = Vec::new();
        while let Some(current) = stack.pop() {
            if seen.contains(&current) {
                continue;
            }
            seen.push(current);
            let Some(ty) = self.types.get(current) else {
                continue;
            };
            for implemented in &ty.interfaces {
                if implemented == interface {
                    return true;
                }
                stack.push(implemented);
            }
        }
        false
    }

    /// Concrete object types a value of `name` may have at runtime.
    pub fn possible_types(&self, name: &str) -> Vec<&str> {
        let Some(ty) = self.types.get(name) else {
            return Vec::new();
        };
        match ty.kind {
            TypeKind::Object => vec![ty.name.as_str()],
            TypeKind::Union => ty.members.iter().map(String::as_str).collect(),
            TypeKind::Interface => self
                .types
                .values()
                .filter(|t| t.kind == TypeKind::Object && self.implements(&t.name, name))
                .map(|t| t.name.as_str())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Whether a fragment on `condition` can apply within `parent`.
    pub fn types_overlap(&self, parent: &str, condition: &str) -> bool {
        if parent == condition {
            return true;
        }
        let parent_types = self.possible_types(parent);
        self.possible_types(condition)
            .iter()
            .any(|t| parent_types.contains(t))
    }

    /// Whether the type or any of its fields came from a client extension.
    pub fn is_client_type(&self, name: &str) -> bool {
        self.types.get(name).is_some_and(|t| t.is_extension)
    }

    pub(crate) fn insert_type(&mut self, ty: TypeDef) {
        self.types.insert(ty.name.clone(), ty);
    }

    pub(crate) fn insert_directive(&mut self, directive: DirectiveDef) {
        self.directives.insert(directive.name.clone(), directive);
    }

    pub(crate) fn type_mut(&mut self, name: &str) -> Option<&mut TypeDef> {
        self.types.get_mut(name)
    }

    /// Fill in default root operation types when no `schema` block set them.
    pub(crate) fn resolve_default_roots(&mut self) {
        for (slot, name) in [
            (&mut self.query_type, "Query"),
            (&mut self.mutation_type, "Mutation"),
            (&mut self.subscription_type, "Subscription"),
        ] {
            if slot.is_none() && self.types.contains_key(name) {
                *slot = Some(name.to_string());
            }
        }
    }
}

impl TryFrom<&str> for Schema {
    type Error = Error;

    fn try_from(sdl: &str) -> Result<Self> {
        Schema::parse(sdl)
    }
}
