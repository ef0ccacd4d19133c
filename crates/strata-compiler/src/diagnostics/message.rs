use rowan::TextRange;

use crate::source_map::SourceId;

/// Diagnostic kinds ordered by priority (highest priority first).
///
/// When two diagnostics overlap, the higher-priority one suppresses the
/// lower-priority one. Syntax problems come first because everything after
/// them is built on a recovered tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Cascading syntax errors
    UnclosedDelimiter,

    // Something required is missing
    ExpectedName,
    ExpectedType,
    ExpectedValue,
    ExpectedSelectionSet,
    ExpectedDefinition,

    // Something present doesn't belong
    UnexpectedToken,
    UnterminatedString,
    InvalidCharacter,
    VariableInConstValue,

    // Schema construction
    DuplicateType,
    DuplicateField,
    DuplicateEnumValue,
    UnknownExtensionTarget,
    ExtensionKindMismatch,
    UnknownSchemaType,
    InvalidImplementedType,
    InvalidUnionMember,

    // Module naming conventions for embedded tags
    AnonymousOperationInModule,
    OperationNameNotPrefixed,
    FragmentNameNotPrefixed,
    ContainerFragmentName,

    // Validation rules
    DuplicateDefinition,
    UnknownFragment,
    FragmentCycle,
    UnknownType,
    InvalidTypeCondition,
    UnknownField,
    LeafFieldWithSelection,
    CompositeFieldWithoutSelection,
    UnknownArgument,
    MissingRequiredArgument,
    UndefinedVariable,
    UnusedVariable,
    UnknownDirective,

    // Lowering
    UnresolvedFragment,
    DefinitionCollision,
    InvalidValue,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::UnusedVariable => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Whether this kind suppresses `other` when spans overlap.
    pub fn suppresses(&self, other: &DiagnosticKind) -> bool {
        self < other
    }

    /// Syntax-level problems; any of these make later phases meaningless.
    pub fn is_syntax_error(&self) -> bool {
        *self <= Self::VariableInConstValue
    }

    pub fn default_hint(&self) -> Option<&'static str> {
        match self {
            Self::ExpectedSelectionSet => Some("composite fields need `{ ... }`"),
            Self::VariableInConstValue => Some("schema definitions only accept constant values"),
            Self::AnonymousOperationInModule => Some("give the operation a name"),
            _ => None,
        }
    }

    /// Base message for this kind, used when no detail is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::UnclosedDelimiter => "unclosed delimiter",

            Self::ExpectedName => "expected a name",
            Self::ExpectedType => "expected a type",
            Self::ExpectedValue => "expected a value",
            Self::ExpectedSelectionSet => "expected a selection set",
            Self::ExpectedDefinition => "expected a definition",

            Self::UnexpectedToken => "unexpected token",
            Self::UnterminatedString => "unterminated string",
            Self::InvalidCharacter => "invalid character",
            Self::VariableInConstValue => "variables are not allowed here",

            Self::DuplicateType => "duplicate type",
            Self::DuplicateField => "duplicate field",
            Self::DuplicateEnumValue => "duplicate enum value",
            Self::UnknownExtensionTarget => "cannot extend unknown type",
            Self::ExtensionKindMismatch => "extension kind does not match the extended type",
            Self::UnknownSchemaType => "unknown type in schema",
            Self::InvalidImplementedType => "only interfaces can be implemented",
            Self::InvalidUnionMember => "union members must be object types",

            Self::AnonymousOperationInModule => "operations in modules must be named",
            Self::OperationNameNotPrefixed => "operation name is not prefixed by its module name",
            Self::FragmentNameNotPrefixed => "fragment name is not prefixed by its module name",
            Self::ContainerFragmentName => "container fragment name does not match its prop",

            Self::DuplicateDefinition => "duplicate definition",
            Self::UnknownFragment => "unknown fragment",
            Self::FragmentCycle => "fragment spreads form a cycle",
            Self::UnknownType => "unknown type",
            Self::InvalidTypeCondition => "fragments can only target composite types",
            Self::UnknownField => "unknown field",
            Self::LeafFieldWithSelection => "leaf field cannot have a selection set",
            Self::CompositeFieldWithoutSelection => "field of composite type needs a selection set",
            Self::UnknownArgument => "unknown argument",
            Self::MissingRequiredArgument => "missing required argument",
            Self::UndefinedVariable => "undefined variable",
            Self::UnusedVariable => "unused variable",
            Self::UnknownDirective => "unknown directive",

            Self::UnresolvedFragment => "unresolved fragment",
            Self::DefinitionCollision => "definition collides with a base definition",
            Self::InvalidValue => "invalid value",
        }
    }

    /// Template for custom messages. Contains `{}` placeholder for caller detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::DuplicateType => "type `{}` is already defined".to_string(),
            Self::DuplicateField => "field `{}` is already defined".to_string(),
            Self::DuplicateEnumValue => "enum value `{}` is already defined".to_string(),
            Self::UnknownExtensionTarget => "cannot extend unknown type `{}`".to_string(),
            Self::UnknownSchemaType => "unknown type `{}` in schema".to_string(),
            Self::DuplicateDefinition => "`{}` is already defined".to_string(),
            Self::UnknownFragment => "unknown fragment `{}`".to_string(),
            Self::UnknownType => "unknown type `{}`".to_string(),
            Self::UnknownDirective => "unknown directive `@{}`".to_string(),
            Self::UndefinedVariable => "variable `${}` is not defined".to_string(),
            Self::UnusedVariable => "variable `${}` is never used".to_string(),
            Self::UnexpectedToken
            | Self::UnclosedDelimiter
            | Self::ExpectedName
            | Self::ExpectedType
            | Self::ExpectedValue
            | Self::ExpectedSelectionSet
            | Self::ExpectedDefinition => format!("{}: {{}}", self.fallback_message()),
            _ => "{}".to_string(),
        }
    }

    /// - `None` → `fallback_message()`
    /// - `Some(detail)` → `custom_message()` with `{}` replaced by detail
    pub fn message(&self, detail: Option<&str>) -> String {
        match detail {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub(crate) source: SourceId,
    pub(crate) range: TextRange,
    pub(crate) message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    pub(crate) source: SourceId,
    /// The range shown to the user.
    pub(crate) range: TextRange,
    /// The range used for cascade suppression; an enclosing delimiter for
    /// errors reported inside unclosed constructs.
    pub(crate) suppression_range: TextRange,
    pub(crate) message: String,
    pub(crate) related: Vec<RelatedInfo>,
    pub(crate) hints: Vec<String>,
}

impl DiagnosticMessage {
    pub(crate) fn new(
        source: SourceId,
        kind: DiagnosticKind,
        range: TextRange,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            source,
            range,
            suppression_range: range,
            message: message.into(),
            related: Vec::new(),
            hints: kind.default_hint().map(str::to_string).into_iter().collect(),
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn source(&self) -> SourceId {
        self.source
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    pub fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl std::fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}..{}: {}",
            self.severity(),
            u32::from(self.range.start()),
            u32::from(self.range.end()),
            self.message
        )?;
        for related in &self.related {
            write!(
                f,
                " (related: {} at {}..{})",
                related.message,
                u32::from(related.range.start()),
                u32::from(related.range.end())
            )?;
        }
        for hint in &self.hints {
            write!(f, " (hint: {})", hint)?;
        }
        Ok(())
    }
}
