//! Parser infrastructure for GraphQL documents.
//!
//! # Architecture
//!
//! This parser produces a lossless concrete syntax tree (CST) via Rowan's green tree builder.
//!
//! - Zero-copy parsing: tokens carry spans, text sliced only when building tree nodes
//! - Trivia buffering: whitespace, comments and commas collected, then attached
//!   before the next node
//! - Checkpoint-based wrapping: `T!` and described definitions are wrapped retroactively
//! - Contextual keywords: the lexer only knows names; keyword positions are re-tagged by the parser
//!
//! # Recovery Strategy
//!
//! The parser is resilient; it always produces a tree. Recovery follows these rules:
//!
//! 1. Unknown tokens get wrapped in `SyntaxKind::Error` nodes and consumed
//! 2. Missing expected tokens emit a diagnostic but don't consume (parent may handle)
//! 3. Closing delimiters of an enclosing construct stop the inner production
//! 4. One diagnostic per source position
//!
//! However, fuel exhaustion (exec_fuel, recursion_fuel) returns an actual error immediately.

pub mod ast;
pub mod cst;
pub mod lexer;

mod core;
mod grammar;

#[cfg(test)]
mod tests;

pub use ast::{Definition, Document, OperationType, Selection, TypeSystemDefinition};
pub use cst::{SyntaxKind, SyntaxNode, SyntaxToken};

pub use core::Parser;

use crate::PassResult;
use crate::source_map::SourceId;
use lexer::lex;

/// Parse result containing the green tree.
///
/// The tree is always complete; diagnostics are returned separately.
/// Error nodes in the tree represent recovery points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parse {
    cst: rowan::GreenNode,
}

impl Parse {
    pub fn as_cst(&self) -> &rowan::GreenNode {
        &self.cst
    }

    /// Creates a typed view over the immutable green tree.
    /// This is cheap: SyntaxNode is a thin wrapper with parent pointers.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.cst.clone())
    }

    pub fn document(&self) -> Document {
        // The root is always a Document node.
        Document::cast(self.syntax()).unwrap_or_else(|| unreachable!("parser root is a Document"))
    }
}

/// Main entry point. Returns Err on fuel exhaustion.
pub fn parse(source: &str, source_id: SourceId) -> PassResult<Parse> {
    parse_with_parser(Parser::new(source, source_id, lex(source)))
}

/// Parse with a pre-configured parser (for custom fuel limits).
pub fn parse_with_parser(mut parser: Parser) -> PassResult<Parse> {
    parser.parse_document();
    let (cst, diagnostics) = parser.finish()?;
    Ok((Parse { cst }, diagnostics))
}
