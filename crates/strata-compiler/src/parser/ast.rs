//! Typed AST wrappers over CST nodes.
//!
//! Each struct wraps a `SyntaxNode` and provides typed accessors.
//! Cast is infallible for correct `SyntaxKind` - validation happens elsewhere.

use rowan::TextRange;

use super::cst::{SyntaxKind, SyntaxNode, SyntaxToken};
use super::lexer::string_value;

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl $name {
            pub fn cast(node: SyntaxNode) -> Option<Self> {
                (node.kind() == SyntaxKind::$kind).then(|| Self(node))
            }

            pub fn as_cst(&self) -> &SyntaxNode {
                &self.0
            }

            /// Range of the node without surrounding trivia.
            pub fn text_range(&self) -> TextRange {
                trimmed_range(&self.0)
            }
        }
    };
}

ast_node!(Document, Document);
ast_node!(OperationDefinition, OperationDefinition);
ast_node!(FragmentDefinition, FragmentDefinition);
ast_node!(VariableDefinition, VariableDefinition);
ast_node!(Variable, Variable);
ast_node!(SelectionSet, SelectionSet);
ast_node!(Field, Field);
ast_node!(FragmentSpread, FragmentSpread);
ast_node!(InlineFragment, InlineFragment);
ast_node!(Argument, Argument);
ast_node!(Directive, Directive);
ast_node!(NamedType, NamedType);
ast_node!(ListType, ListType);
ast_node!(NonNullType, NonNullType);
ast_node!(ScalarValue, ScalarValue);
ast_node!(ListValue, ListValue);
ast_node!(ObjectValue, ObjectValue);
ast_node!(ObjectField, ObjectField);
ast_node!(Description, Description);
ast_node!(SchemaDefinition, SchemaDefinition);
ast_node!(RootOperationTypeDefinition, RootOperationTypeDefinition);
ast_node!(ScalarTypeDefinition, ScalarTypeDefinition);
ast_node!(ObjectTypeDefinition, ObjectTypeDefinition);
ast_node!(InterfaceTypeDefinition, InterfaceTypeDefinition);
ast_node!(UnionTypeDefinition, UnionTypeDefinition);
ast_node!(EnumTypeDefinition, EnumTypeDefinition);
ast_node!(InputObjectTypeDefinition, InputObjectTypeDefinition);
ast_node!(DirectiveDefinition, DirectiveDefinition);
ast_node!(FieldDefinition, FieldDefinition);
ast_node!(InputValueDefinition, InputValueDefinition);
ast_node!(EnumValueDefinition, EnumValueDefinition);

fn trimmed_range(node: &SyntaxNode) -> TextRange {
    let mut tokens = node
        .descendants_with_tokens()
        .filter_map(|it| it.into_token())
        .filter(|t| !t.kind().is_trivia());
    let Some(first) = tokens.next() else {
        return node.text_range();
    };
    let last = tokens.last().unwrap_or_else(|| first.clone());
    TextRange::new(first.text_range().start(), last.text_range().end())
}

fn token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|t| t.kind() == kind)
}

fn keyword(node: &SyntaxNode, text: &str) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|t| t.kind() == SyntaxKind::Keyword && t.text() == text)
}

fn child<N>(node: &SyntaxNode, cast: fn(SyntaxNode) -> Option<N>) -> Option<N> {
    node.children().find_map(cast)
}

/// Children of the first child node of kind `list`, cast with `cast`.
fn list<N>(node: &SyntaxNode, list: SyntaxKind, cast: fn(SyntaxNode) -> Option<N>) -> Vec<N> {
    node.children()
        .find(|n| n.kind() == list)
        .map(|l| l.children().filter_map(cast).collect())
        .unwrap_or_default()
}

fn directives(node: &SyntaxNode) -> Vec<Directive> {
    list(node, SyntaxKind::Directives, Directive::cast)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl OperationType {
    pub fn from_keyword(text: &str) -> Option<Self> {
        match text {
            "query" => Some(Self::Query),
            "mutation" => Some(Self::Mutation),
            "subscription" => Some(Self::Subscription),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Executable or type-system definition at the top of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Definition {
    Operation(OperationDefinition),
    Fragment(FragmentDefinition),
    TypeSystem(TypeSystemDefinition),
}

impl Definition {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::OperationDefinition => {
                OperationDefinition::cast(node).map(Definition::Operation)
            }
            SyntaxKind::FragmentDefinition => {
                FragmentDefinition::cast(node).map(Definition::Fragment)
            }
            _ => TypeSystemDefinition::cast(node).map(Definition::TypeSystem),
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            Definition::Operation(n) => n.as_cst(),
            Definition::Fragment(n) => n.as_cst(),
            Definition::TypeSystem(n) => n.as_cst(),
        }
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        match self {
            Definition::Operation(n) => n.name(),
            Definition::Fragment(n) => n.name(),
            Definition::TypeSystem(n) => n.name(),
        }
    }
}

impl Document {
    pub fn definitions(&self) -> impl Iterator<Item = Definition> + '_ {
        self.0.children().filter_map(Definition::cast)
    }

    pub fn operations(&self) -> impl Iterator<Item = OperationDefinition> + '_ {
        self.0.children().filter_map(OperationDefinition::cast)
    }

    pub fn fragments(&self) -> impl Iterator<Item = FragmentDefinition> + '_ {
        self.0.children().filter_map(FragmentDefinition::cast)
    }

    pub fn type_system_definitions(&self) -> impl Iterator<Item = TypeSystemDefinition> + '_ {
        self.0.children().filter_map(TypeSystemDefinition::cast)
    }
}

impl OperationDefinition {
    /// `query` for the `{ ... }` shorthand.
    pub fn operation_type(&self) -> OperationType {
        token(&self.0, SyntaxKind::Keyword)
            .and_then(|t| OperationType::from_keyword(t.text()))
            .unwrap_or(OperationType::Query)
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::Name)
    }

    pub fn variable_definitions(&self) -> Vec<VariableDefinition> {
        list(&self.0, SyntaxKind::VariableDefinitions, VariableDefinition::cast)
    }

    pub fn directives(&self) -> Vec<Directive> {
        directives(&self.0)
    }

    pub fn selection_set(&self) -> Option<SelectionSet> {
        child(&self.0, SelectionSet::cast)
    }
}

impl FragmentDefinition {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::Name)
    }

    pub fn type_condition(&self) -> Option<NamedType> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::TypeCondition)
            .and_then(|n| child(&n, NamedType::cast))
    }

    pub fn directives(&self) -> Vec<Directive> {
        directives(&self.0)
    }

    pub fn selection_set(&self) -> Option<SelectionSet> {
        child(&self.0, SelectionSet::cast)
    }
}

impl VariableDefinition {
    pub fn variable(&self) -> Option<Variable> {
        child(&self.0, Variable::cast)
    }

    pub fn ty(&self) -> Option<Type> {
        child(&self.0, Type::cast)
    }

    pub fn default_value(&self) -> Option<Value> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::DefaultValue)
            .and_then(|n| child(&n, Value::cast))
    }

    pub fn directives(&self) -> Vec<Directive> {
        directives(&self.0)
    }
}

impl Variable {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::Name)
    }
}

/// A single entry of a selection set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selection {
    Field(Field),
    FragmentSpread(FragmentSpread),
    InlineFragment(InlineFragment),
}

impl Selection {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::Field => Field::cast(node).map(Selection::Field),
            SyntaxKind::FragmentSpread => FragmentSpread::cast(node).map(Selection::FragmentSpread),
            SyntaxKind::InlineFragment => InlineFragment::cast(node).map(Selection::InlineFragment),
            _ => None,
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            Selection::Field(n) => n.as_cst(),
            Selection::FragmentSpread(n) => n.as_cst(),
            Selection::InlineFragment(n) => n.as_cst(),
        }
    }

    pub fn directives(&self) -> Vec<Directive> {
        directives(self.as_cst())
    }
}

impl SelectionSet {
    pub fn selections(&self) -> impl Iterator<Item = Selection> + '_ {
        self.0.children().filter_map(Selection::cast)
    }
}

impl Field {
    pub fn alias(&self) -> Option<SyntaxToken> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::Alias)
            .and_then(|n| token(&n, SyntaxKind::Name))
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::Name)
    }

    /// Alias if present, otherwise the field name.
    pub fn response_key(&self) -> Option<String> {
        self.alias()
            .or_else(|| self.name())
            .map(|t| t.text().to_string())
    }

    pub fn arguments(&self) -> Vec<Argument> {
        list(&self.0, SyntaxKind::Arguments, Argument::cast)
    }

    pub fn directives(&self) -> Vec<Directive> {
        directives(&self.0)
    }

    pub fn selection_set(&self) -> Option<SelectionSet> {
        child(&self.0, SelectionSet::cast)
    }
}

impl FragmentSpread {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::Name)
    }

    pub fn directives(&self) -> Vec<Directive> {
        directives(&self.0)
    }
}

impl InlineFragment {
    pub fn type_condition(&self) -> Option<NamedType> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::TypeCondition)
            .and_then(|n| child(&n, NamedType::cast))
    }

    pub fn directives(&self) -> Vec<Directive> {
        directives(&self.0)
    }

    pub fn selection_set(&self) -> Option<SelectionSet> {
        child(&self.0, SelectionSet::cast)
    }
}

impl Argument {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::Name)
    }

    pub fn value(&self) -> Option<Value> {
        child(&self.0, Value::cast)
    }
}

impl Directive {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::Name)
    }

    pub fn arguments(&self) -> Vec<Argument> {
        list(&self.0, SyntaxKind::Arguments, Argument::cast)
    }

    pub fn argument(&self, name: &str) -> Option<Argument> {
        self.arguments()
            .into_iter()
            .find(|a| a.name().is_some_and(|n| n.text() == name))
    }
}

/// Type reference: `Name`, `[T]`, or `T!`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Named(NamedType),
    List(ListType),
    NonNull(NonNullType),
}

impl Type {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::NamedType => NamedType::cast(node).map(Type::Named),
            SyntaxKind::ListType => ListType::cast(node).map(Type::List),
            SyntaxKind::NonNullType => NonNullType::cast(node).map(Type::NonNull),
            _ => None,
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            Type::Named(n) => n.as_cst(),
            Type::List(n) => n.as_cst(),
            Type::NonNull(n) => n.as_cst(),
        }
    }

    /// The innermost named type.
    pub fn named_type(&self) -> Option<NamedType> {
        match self {
            Type::Named(n) => Some(n.clone()),
            Type::List(l) => l.inner()?.named_type(),
            Type::NonNull(n) => n.inner()?.named_type(),
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Named(n) => match n.name() {
                Some(name) => write!(f, "{}", name.text()),
                None => Ok(()),
            },
            Type::List(l) => match l.inner() {
                Some(inner) => write!(f, "[{inner}]"),
                None => write!(f, "[]"),
            },
            Type::NonNull(n) => match n.inner() {
                Some(inner) => write!(f, "{inner}!"),
                None => write!(f, "!"),
            },
        }
    }
}

impl NamedType {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::Name)
    }
}

impl ListType {
    pub fn inner(&self) -> Option<Type> {
        child(&self.0, Type::cast)
    }
}

impl NonNullType {
    pub fn inner(&self) -> Option<Type> {
        child(&self.0, Type::cast)
    }
}

/// Argument or default value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Variable(Variable),
    Scalar(ScalarValue),
    List(ListValue),
    Object(ObjectValue),
}

impl Value {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::Variable => Variable::cast(node).map(Value::Variable),
            SyntaxKind::ScalarValue => ScalarValue::cast(node).map(Value::Scalar),
            SyntaxKind::ListValue => ListValue::cast(node).map(Value::List),
            SyntaxKind::ObjectValue => ObjectValue::cast(node).map(Value::Object),
            _ => None,
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            Value::Variable(n) => n.as_cst(),
            Value::Scalar(n) => n.as_cst(),
            Value::List(n) => n.as_cst(),
            Value::Object(n) => n.as_cst(),
        }
    }

    pub fn text_range(&self) -> TextRange {
        trimmed_range(self.as_cst())
    }

    /// Variables referenced anywhere inside this value.
    pub fn variables(&self) -> Vec<Variable> {
        match self {
            Value::Variable(v) => vec![v.clone()],
            Value::Scalar(_) => Vec::new(),
            _ => self
                .as_cst()
                .descendants()
                .filter_map(Variable::cast)
                .collect(),
        }
    }
}

impl ScalarValue {
    /// The single literal token: int, float, string, or name.
    pub fn token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| !t.kind().is_trivia())
    }
}

impl ListValue {
    pub fn values(&self) -> impl Iterator<Item = Value> + '_ {
        self.0.children().filter_map(Value::cast)
    }
}

impl ObjectValue {
    pub fn fields(&self) -> impl Iterator<Item = ObjectField> + '_ {
        self.0.children().filter_map(ObjectField::cast)
    }
}

impl ObjectField {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::Name)
    }

    pub fn value(&self) -> Option<Value> {
        child(&self.0, Value::cast)
    }
}

impl Description {
    pub fn text(&self) -> String {
        token(&self.0, SyntaxKind::StringValue)
            .or_else(|| token(&self.0, SyntaxKind::BlockString))
            .map(|t| string_value(t.text()))
            .unwrap_or_default()
    }
}

/// Schema, type, and directive definitions, including `extend` forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSystemDefinition {
    Schema(SchemaDefinition),
    Scalar(ScalarTypeDefinition),
    Object(ObjectTypeDefinition),
    Interface(InterfaceTypeDefinition),
    Union(UnionTypeDefinition),
    Enum(EnumTypeDefinition),
    InputObject(InputObjectTypeDefinition),
    Directive(DirectiveDefinition),
}

impl TypeSystemDefinition {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::SchemaDefinition => SchemaDefinition::cast(node).map(Self::Schema),
            SyntaxKind::ScalarTypeDefinition => ScalarTypeDefinition::cast(node).map(Self::Scalar),
            SyntaxKind::ObjectTypeDefinition => ObjectTypeDefinition::cast(node).map(Self::Object),
            SyntaxKind::InterfaceTypeDefinition => {
                InterfaceTypeDefinition::cast(node).map(Self::Interface)
            }
            SyntaxKind::UnionTypeDefinition => UnionTypeDefinition::cast(node).map(Self::Union),
            SyntaxKind::EnumTypeDefinition => EnumTypeDefinition::cast(node).map(Self::Enum),
            SyntaxKind::InputObjectTypeDefinition => {
                InputObjectTypeDefinition::cast(node).map(Self::InputObject)
            }
            SyntaxKind::DirectiveDefinition => DirectiveDefinition::cast(node).map(Self::Directive),
            _ => None,
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            Self::Schema(n) => n.as_cst(),
            Self::Scalar(n) => n.as_cst(),
            Self::Object(n) => n.as_cst(),
            Self::Interface(n) => n.as_cst(),
            Self::Union(n) => n.as_cst(),
            Self::Enum(n) => n.as_cst(),
            Self::InputObject(n) => n.as_cst(),
            Self::Directive(n) => n.as_cst(),
        }
    }

    /// Defined name; `None` for schema definitions.
    pub fn name(&self) -> Option<SyntaxToken> {
        match self {
            Self::Schema(_) => None,
            _ => token(self.as_cst(), SyntaxKind::Name),
        }
    }

    /// Whether this is an `extend ...` form.
    pub fn is_extension(&self) -> bool {
        keyword(self.as_cst(), "extend").is_some()
    }

    pub fn description(&self) -> Option<String> {
        child(self.as_cst(), Description::cast).map(|d| d.text())
    }

    pub fn directives(&self) -> Vec<Directive> {
        directives(self.as_cst())
    }

    pub fn text_range(&self) -> TextRange {
        trimmed_range(self.as_cst())
    }
}

impl SchemaDefinition {
    pub fn root_operations(&self) -> impl Iterator<Item = RootOperationTypeDefinition> + '_ {
        self.0.children().filter_map(RootOperationTypeDefinition::cast)
    }
}

impl RootOperationTypeDefinition {
    pub fn operation_type(&self) -> Option<OperationType> {
        token(&self.0, SyntaxKind::Keyword).and_then(|t| OperationType::from_keyword(t.text()))
    }

    pub fn named_type(&self) -> Option<NamedType> {
        child(&self.0, NamedType::cast)
    }
}

impl ObjectTypeDefinition {
    pub fn implements(&self) -> Vec<NamedType> {
        list(&self.0, SyntaxKind::ImplementsInterfaces, NamedType::cast)
    }

    pub fn fields(&self) -> Vec<FieldDefinition> {
        list(&self.0, SyntaxKind::FieldsDefinition, FieldDefinition::cast)
    }
}

impl InterfaceTypeDefinition {
    pub fn implements(&self) -> Vec<NamedType> {
        list(&self.0, SyntaxKind::ImplementsInterfaces, NamedType::cast)
    }

    pub fn fields(&self) -> Vec<FieldDefinition> {
        list(&self.0, SyntaxKind::FieldsDefinition, FieldDefinition::cast)
    }
}

impl UnionTypeDefinition {
    pub fn members(&self) -> Vec<NamedType> {
        list(&self.0, SyntaxKind::UnionMemberTypes, NamedType::cast)
    }
}

impl EnumTypeDefinition {
    pub fn values(&self) -> Vec<EnumValueDefinition> {
        list(&self.0, SyntaxKind::EnumValuesDefinition, EnumValueDefinition::cast)
    }
}

impl InputObjectTypeDefinition {
    pub fn fields(&self) -> Vec<InputValueDefinition> {
        list(&self.0, SyntaxKind::InputFieldsDefinition, InputValueDefinition::cast)
    }
}

impl DirectiveDefinition {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::Name)
    }

    pub fn arguments(&self) -> Vec<InputValueDefinition> {
        list(&self.0, SyntaxKind::ArgumentsDefinition, InputValueDefinition::cast)
    }

    pub fn is_repeatable(&self) -> bool {
        keyword(&self.0, "repeatable").is_some()
    }

    pub fn locations(&self) -> Vec<String> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::DirectiveLocations)
            .map(|n| {
                n.children_with_tokens()
                    .filter_map(|it| it.into_token())
                    .filter(|t| t.kind() == SyntaxKind::Name)
                    .map(|t| t.text().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl FieldDefinition {
    pub fn description(&self) -> Option<String> {
        child(&self.0, Description::cast).map(|d| d.text())
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::Name)
    }

    pub fn arguments(&self) -> Vec<InputValueDefinition> {
        list(&self.0, SyntaxKind::ArgumentsDefinition, InputValueDefinition::cast)
    }

    pub fn ty(&self) -> Option<Type> {
        child(&self.0, Type::cast)
    }

    pub fn directives(&self) -> Vec<Directive> {
        directives(&self.0)
    }
}

impl InputValueDefinition {
    pub fn description(&self) -> Option<String> {
        child(&self.0, Description::cast).map(|d| d.text())
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::Name)
    }

    pub fn ty(&self) -> Option<Type> {
        child(&self.0, Type::cast)
    }

    pub fn default_value(&self) -> Option<Value> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::DefaultValue)
            .and_then(|n| child(&n, Value::cast))
    }

    pub fn directives(&self) -> Vec<Directive> {
        directives(&self.0)
    }
}

impl EnumValueDefinition {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::Name)
    }

    pub fn directives(&self) -> Vec<Directive> {
        directives(&self.0)
    }
}
