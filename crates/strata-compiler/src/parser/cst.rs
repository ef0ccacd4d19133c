//! Syntax kinds for GraphQL documents.
//!
//! `SyntaxKind` serves dual roles: token kinds (from lexer) and node kinds (from parser).
//! Logos derives token recognition; node kinds lack token/regex attributes.
//! `GqlLang` implements Rowan's `Language` trait for tree construction.
//!
//! GraphQL keywords are contextual (`type` is a valid field name), so the lexer
//! only produces `Name`. The parser re-tags keyword positions as `Keyword`.

use logos::Logos;
use rowan::Language;

/// All token and node kinds. Tokens first, then nodes, then `__LAST` sentinel.
/// `#[repr(u16)]` enables safe transmute in `kind_from_raw`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    #[token("{")]
    BraceOpen = 0,

    #[token("}")]
    BraceClose,

    #[token("(")]
    ParenOpen,

    #[token(")")]
    ParenClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token(":")]
    Colon,

    #[token("=")]
    Equals,

    #[token("!")]
    Bang,

    #[token("$")]
    Dollar,

    #[token("@")]
    At,

    #[token("&")]
    Amp,

    #[token("|")]
    Pipe,

    #[token("...")]
    Spread,

    /// Insignificant in GraphQL; treated as trivia.
    #[token(",")]
    Comma,

    #[regex(r#""(?:[^"\\\n\r]|\\[^\n\r])*""#)]
    StringValue,

    #[regex(r#""""(?:[^"\\]|"[^"]|""[^"]|\\[^\n])*""""#)]
    BlockString,

    /// A string that runs into the end of its line.
    #[regex(r#""(?:[^"\\\n\r]|\\[^\n\r])*"#)]
    UnterminatedString,

    #[regex(r"-?(?:0|[1-9][0-9]*)")]
    IntValue,

    #[regex(r"-?(?:0|[1-9][0-9]*)\.[0-9]+(?:[eE][+-]?[0-9]+)?")]
    #[regex(r"-?(?:0|[1-9][0-9]*)[eE][+-]?[0-9]+")]
    FloatValue,

    #[regex(r"[_A-Za-z][_0-9A-Za-z]*")]
    Name,

    /// A `Name` in keyword position. Never produced by the lexer.
    Keyword,

    #[regex(r"[ \t\u{FEFF}]+")]
    Whitespace,

    #[token("\n")]
    #[token("\r\n")]
    #[token("\r")]
    Newline,

    #[regex(r"#[^\n\r]*", allow_greedy = true)]
    Comment,

    /// Coalesced unrecognized characters
    Garbage,
    Error,

    // --- Node kinds (non-terminals) ---
    Document,

    // Executable definitions
    OperationDefinition,
    FragmentDefinition,
    VariableDefinitions,
    VariableDefinition,
    Variable,
    DefaultValue,
    SelectionSet,
    Field,
    Alias,
    Arguments,
    Argument,
    FragmentSpread,
    InlineFragment,
    TypeCondition,
    Directives,
    Directive,

    // Types
    NamedType,
    ListType,
    NonNullType,

    // Values
    ScalarValue,
    ListValue,
    ObjectValue,
    ObjectField,

    // Type system
    Description,
    SchemaDefinition,
    RootOperationTypeDefinition,
    ScalarTypeDefinition,
    ObjectTypeDefinition,
    InterfaceTypeDefinition,
    UnionTypeDefinition,
    EnumTypeDefinition,
    InputObjectTypeDefinition,
    DirectiveDefinition,
    ImplementsInterfaces,
    FieldsDefinition,
    FieldDefinition,
    ArgumentsDefinition,
    InputValueDefinition,
    UnionMemberTypes,
    EnumValuesDefinition,
    EnumValueDefinition,
    InputFieldsDefinition,
    DirectiveLocations,

    // Must be last - used for bounds checking in `kind_from_raw`
    #[doc(hidden)]
    __LAST,
}

use SyntaxKind::*;

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Whitespace | Newline | Comment | Comma)
    }

    #[inline]
    pub fn is_error(self) -> bool {
        matches!(self, Error | Garbage | UnterminatedString)
    }

    #[inline]
    pub fn is_string(self) -> bool {
        matches!(self, StringValue | BlockString)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    #[inline]
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language tag for Rowan's tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GqlLang {}

impl Language for GqlLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 < __LAST as u16);
        // SAFETY: We've verified the value is in bounds, and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for Rowan types parameterized by our language.
pub type SyntaxNode = rowan::SyntaxNode<GqlLang>;
pub type SyntaxToken = rowan::SyntaxToken<GqlLang>;
pub type SyntaxElement = rowan::NodeOrToken<SyntaxNode, SyntaxToken>;

/// 64-bit bitset of `SyntaxKind`s for O(1) membership testing.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TokenSet(u64);

impl TokenSet {
    /// Panics at compile time if any kind's discriminant >= 64.
    #[inline]
    pub const fn new(kinds: &[SyntaxKind]) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < kinds.len() {
            let kind = kinds[i] as u16;
            assert!(kind < 64, "SyntaxKind value exceeds TokenSet capacity");
            bits |= 1 << kind;
            i += 1;
        }
        TokenSet(bits)
    }

    #[inline]
    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let kind = kind as u16;
        if kind >= 64 {
            return false;
        }
        self.0 & (1 << kind) != 0
    }

    #[inline]
    pub const fn union(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 | other.0)
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_set();
        for i in 0..64u16 {
            if self.0 & (1 << i) != 0 && i < __LAST as u16 {
                // SAFETY: bounds checked against `__LAST` above
                let kind: SyntaxKind = unsafe { std::mem::transmute(i) };
                list.entry(&kind);
            }
        }
        list.finish()
    }
}

/// Pre-defined token sets for the parser.
pub mod token_sets {
    use super::*;

    pub const VALUE_FIRST: TokenSet = TokenSet::new(&[
        Dollar,
        IntValue,
        FloatValue,
        StringValue,
        BlockString,
        Name,
        BracketOpen,
        BraceOpen,
    ]);

    pub const SELECTION_FIRST: TokenSet = TokenSet::new(&[Name, Spread]);

    pub const TYPE_FIRST: TokenSet = TokenSet::new(&[Name, BracketOpen]);

    pub const DESCRIPTION_FIRST: TokenSet = TokenSet::new(&[StringValue, BlockString]);

    pub const TRIVIA: TokenSet = TokenSet::new(&[Whitespace, Newline, Comment, Comma]);

    /// Tokens that close a selection set or any enclosing delimiter.
    pub const SELECTION_RECOVERY: TokenSet =
        TokenSet::new(&[BraceClose, ParenClose, BracketClose]);

    pub const ARGUMENT_RECOVERY: TokenSet = TokenSet::new(&[ParenClose, BraceOpen, BraceClose]);
}

/// Keywords that start an executable or type-system definition.
pub const DEFINITION_KEYWORDS: &[&str] = &[
    "query",
    "mutation",
    "subscription",
    "fragment",
    "schema",
    "scalar",
    "type",
    "interface",
    "union",
    "enum",
    "input",
    "directive",
    "extend",
];

pub const OPERATION_KEYWORDS: &[&str] = &["query", "mutation", "subscription"];
