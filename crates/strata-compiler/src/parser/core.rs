//! Parser state machine and low-level operations.

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder, TextRange, TextSize};

use super::cst::{SyntaxKind, TokenSet};
use super::lexer::{Token, token_text};
use crate::Error;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::source_map::SourceId;

pub const DEFAULT_EXEC_FUEL: u32 = 1_000_000;
pub const DEFAULT_RECURSION_FUEL: u32 = 256;

#[derive(Debug, Clone, Copy)]
pub(super) struct OpenDelimiter {
    pub span: TextRange,
}

/// Trivia tokens are buffered and flushed when starting a new node.
pub struct Parser<'src> {
    pub(super) source: &'src str,
    pub(super) source_id: SourceId,
    pub(super) tokens: Vec<Token>,
    pub(super) pos: usize,
    pub(super) trivia_buffer: Vec<Token>,
    pub(super) builder: GreenNodeBuilder<'static>,
    pub(super) diagnostics: Diagnostics,
    pub(super) depth: u32,
    pub(super) last_diagnostic_pos: Option<TextSize>,
    pub(super) delimiter_stack: Vec<OpenDelimiter>,
    debug_fuel: std::cell::Cell<u32>,
    exec_fuel_remaining: Option<u32>,
    recursion_fuel_limit: Option<u32>,
    fatal_error: Option<Error>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, source_id: SourceId, tokens: Vec<Token>) -> Self {
        Self {
            source,
            source_id,
            tokens,
            pos: 0,
            trivia_buffer: Vec::with_capacity(4),
            builder: GreenNodeBuilder::new(),
            diagnostics: Diagnostics::new(),
            depth: 0,
            last_diagnostic_pos: None,
            delimiter_stack: Vec::with_capacity(8),
            debug_fuel: std::cell::Cell::new(256),
            exec_fuel_remaining: Some(DEFAULT_EXEC_FUEL),
            recursion_fuel_limit: Some(DEFAULT_RECURSION_FUEL),
            fatal_error: None,
        }
    }

    pub fn with_exec_fuel(mut self, limit: Option<u32>) -> Self {
        self.exec_fuel_remaining = limit;
        self
    }

    pub fn with_recursion_fuel(mut self, limit: Option<u32>) -> Self {
        self.recursion_fuel_limit = limit;
        self
    }

    pub(super) fn finish(mut self) -> Result<(GreenNode, Diagnostics), Error> {
        self.drain_trivia();
        if let Some(err) = self.fatal_error {
            return Err(err);
        }
        Ok((self.builder.finish(), self.diagnostics))
    }

    pub(super) fn has_fatal_error(&self) -> bool {
        self.fatal_error.is_some()
    }

    pub(super) fn current(&mut self) -> SyntaxKind {
        self.skip_trivia_to_buffer();
        self.nth_raw(0)
    }

    fn reset_debug_fuel(&self) {
        self.debug_fuel.set(256);
    }

    /// Panics when the parser peeks many times without consuming anything.
    fn ensure_progress(&self) {
        let fuel = self.debug_fuel.get();
        assert!(fuel > 0, "parser is stuck at token {}", self.pos);
        self.debug_fuel.set(fuel - 1);
    }

    pub(super) fn nth_raw(&self, lookahead: usize) -> SyntaxKind {
        self.ensure_progress();
        self.tokens
            .get(self.pos + lookahead)
            .map_or(SyntaxKind::Error, |t| t.kind)
    }

    fn consume_exec_fuel(&mut self) {
        if let Some(ref mut remaining) = self.exec_fuel_remaining {
            if *remaining == 0 {
                if self.fatal_error.is_none() {
                    self.fatal_error = Some(Error::ExecFuelExhausted);
                }
                return;
            }
            *remaining -= 1;
        }
    }

    pub(super) fn current_span(&mut self) -> TextRange {
        self.skip_trivia_to_buffer();
        self.tokens
            .get(self.pos)
            .map_or_else(|| TextRange::empty(self.eof_offset()), |t| t.span)
    }

    /// Text of the current non-trivia token, empty at EOF.
    pub(super) fn current_text(&mut self) -> &'src str {
        self.skip_trivia_to_buffer();
        self.tokens
            .get(self.pos)
            .map_or("", |t| token_text(self.source, t))
    }

    pub(super) fn eof_offset(&self) -> TextSize {
        TextSize::from(self.source.len() as u32)
    }

    pub(super) fn eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(super) fn should_stop(&mut self) -> bool {
        self.skip_trivia_to_buffer();
        self.eof() || self.has_fatal_error()
    }

    pub(super) fn currently_is(&mut self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    pub(super) fn currently_is_one_of(&mut self, set: TokenSet) -> bool {
        set.contains(self.current())
    }

    /// Whether the current token is the name `keyword`.
    pub(super) fn at_keyword(&mut self, keyword: &str) -> bool {
        self.currently_is(SyntaxKind::Name) && self.current_text() == keyword
    }

    /// LL(k) lookahead past trivia.
    pub(super) fn peek_nth(&mut self, n: usize) -> SyntaxKind {
        self.skip_trivia_to_buffer();
        self.ensure_progress();
        let mut count = 0;
        let mut pos = self.pos;
        while pos < self.tokens.len() {
            let kind = self.tokens[pos].kind;
            if !kind.is_trivia() {
                if count == n {
                    return kind;
                }
                count += 1;
            }
            pos += 1;
        }
        SyntaxKind::Error
    }

    /// Text of the `n`-th non-trivia token ahead, empty past EOF.
    pub(super) fn peek_text(&mut self, n: usize) -> &'src str {
        self.skip_trivia_to_buffer();
        self.tokens[self.pos..]
            .iter()
            .filter(|t| !t.kind.is_trivia())
            .nth(n)
            .map_or("", |t| token_text(self.source, t))
    }

    pub(super) fn next_is(&mut self, kind: SyntaxKind) -> bool {
        self.peek_nth(1) == kind
    }

    pub(super) fn skip_trivia_to_buffer(&mut self) {
        while self.pos < self.tokens.len() && self.tokens[self.pos].kind.is_trivia() {
            self.trivia_buffer.push(self.tokens[self.pos]);
            self.pos += 1;
        }
    }

    pub(super) fn drain_trivia(&mut self) {
        for token in self.trivia_buffer.drain(..) {
            let text = token_text(self.source, &token);
            self.builder.token(token.kind.into(), text);
        }
    }

    pub(super) fn eat_trivia(&mut self) {
        self.skip_trivia_to_buffer();
        self.drain_trivia();
    }

    pub(super) fn start_node(&mut self, kind: SyntaxKind) {
        self.drain_trivia();
        self.builder.start_node(kind.into());
    }

    pub(super) fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    pub(super) fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    pub(super) fn checkpoint(&mut self) -> Checkpoint {
        self.skip_trivia_to_buffer();
        self.drain_trivia();
        self.builder.checkpoint()
    }

    pub(super) fn bump(&mut self) {
        let kind = self.current();
        self.bump_remap(kind);
    }

    /// Consume the current token, recording it in the tree as `kind`.
    pub(super) fn bump_remap(&mut self, kind: SyntaxKind) {
        self.skip_trivia_to_buffer();
        if self.eof() {
            return;
        }
        self.reset_debug_fuel();
        self.consume_exec_fuel();

        self.drain_trivia();

        let token = self.tokens[self.pos];
        let text = token_text(self.source, &token);
        self.builder.token(kind.into(), text);
        self.pos += 1;
    }

    pub(super) fn eat_token(&mut self, kind: SyntaxKind) -> bool {
        if self.currently_is(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume `keyword` as a `Keyword` token if present.
    pub(super) fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.at_keyword(keyword) {
            self.bump_remap(SyntaxKind::Keyword);
            true
        } else {
            false
        }
    }

    /// On mismatch: emit diagnostic but don't consume.
    pub(super) fn expect(&mut self, kind: SyntaxKind, what: &str) -> bool {
        if self.eat_token(kind) {
            return true;
        }
        self.error_msg(DiagnosticKind::UnexpectedToken, format!("expected {what}"));
        false
    }

    /// Expect a name token; reports `ExpectedName` with `context` on mismatch.
    pub(super) fn expect_name(&mut self, context: &str) -> bool {
        if self.eat_token(SyntaxKind::Name) {
            return true;
        }
        self.error_msg(DiagnosticKind::ExpectedName, context);
        false
    }

    pub(super) fn current_suppression_span(&mut self) -> TextRange {
        match self.delimiter_stack.last() {
            Some(d) => TextRange::new(d.span.start(), self.eof_offset()),
            None => self.current_span(),
        }
    }

    fn should_report(&mut self, pos: TextSize) -> bool {
        if self.last_diagnostic_pos == Some(pos) {
            return false;
        }
        self.last_diagnostic_pos = Some(pos);
        true
    }

    fn bump_as_error(&mut self) {
        if !self.should_stop() {
            self.start_node(SyntaxKind::Error);
            self.bump();
            self.finish_node();
        }
    }

    fn get_error_ranges(&mut self) -> Option<(TextRange, TextRange)> {
        let range = self.current_span();
        if !self.should_report(range.start()) {
            return None;
        }
        let suppression = self.current_suppression_span();
        Some((range, suppression))
    }

    /// Lexical errors under the cursor take precedence over grammar errors.
    fn lexical_error(&mut self) -> Option<DiagnosticKind> {
        match self.current() {
            SyntaxKind::Garbage => Some(DiagnosticKind::InvalidCharacter),
            SyntaxKind::UnterminatedString => Some(DiagnosticKind::UnterminatedString),
            _ => None,
        }
    }

    pub(super) fn error(&mut self, kind: DiagnosticKind) {
        let kind = self.lexical_error().unwrap_or(kind);
        let Some((range, suppression)) = self.get_error_ranges() else {
            return;
        };
        self.diagnostics
            .report(self.source_id, kind, range)
            .suppression_range(suppression)
            .emit();
    }

    pub(super) fn error_msg(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        if let Some(lexical) = self.lexical_error() {
            self.error(lexical);
            return;
        }
        let Some((range, suppression)) = self.get_error_ranges() else {
            return;
        };
        self.diagnostics
            .report(self.source_id, kind, range)
            .message(message)
            .suppression_range(suppression)
            .emit();
    }

    pub(super) fn error_and_bump(&mut self, kind: DiagnosticKind) {
        self.error(kind);
        self.bump_as_error();
    }

    pub(super) fn error_and_bump_msg(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.error_msg(kind, message);
        self.bump_as_error();
    }

    /// Report, then skip tokens into an `Error` node until one in `recovery`.
    pub(super) fn error_recover(
        &mut self,
        kind: DiagnosticKind,
        message: &str,
        recovery: TokenSet,
    ) {
        if self.currently_is_one_of(recovery) || self.should_stop() {
            self.error_msg(kind, message);
            return;
        }

        self.start_node(SyntaxKind::Error);
        self.error_msg(kind, message);
        while !self.currently_is_one_of(recovery) && !self.should_stop() {
            self.bump();
        }
        self.finish_node();
    }

    pub(super) fn enter_recursion(&mut self) -> bool {
        if let Some(limit) = self.recursion_fuel_limit
            && self.depth >= limit
        {
            if self.fatal_error.is_none() {
                self.fatal_error = Some(Error::RecursionLimitExceeded);
            }
            return false;
        }
        self.depth += 1;
        self.reset_debug_fuel();
        true
    }

    pub(super) fn exit_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.reset_debug_fuel();
    }

    pub(super) fn push_delimiter(&mut self) {
        let span = self.current_span();
        self.delimiter_stack.push(OpenDelimiter { span });
    }

    pub(super) fn pop_delimiter(&mut self) -> Option<OpenDelimiter> {
        self.delimiter_stack.pop()
    }

    /// Consume `open` and track it as the innermost delimiter, if present.
    pub(super) fn open_delimited(&mut self, open: SyntaxKind) -> bool {
        if !self.currently_is(open) {
            return false;
        }
        self.push_delimiter();
        self.bump();
        true
    }

    /// Close the innermost delimiter with `close`, reporting it as unclosed otherwise.
    pub(super) fn close_delimited(&mut self, close: SyntaxKind, closing: &str) {
        let open = self.pop_delimiter();
        if self.eat_token(close) {
            return;
        }
        let Some(open) = open else {
            self.error_msg(DiagnosticKind::UnexpectedToken, format!("expected `{closing}`"));
            return;
        };
        self.error_unclosed_delimiter(format!("missing `{closing}`"), open.span);
    }

    pub(super) fn error_unclosed_delimiter(
        &mut self,
        message: impl Into<String>,
        open_range: TextRange,
    ) {
        let current = self.current_span();
        if !self.should_report(current.start()) {
            return;
        }
        // Use full range for easier downstream error suppression
        let full_range = TextRange::new(open_range.start(), current.end());
        self.diagnostics
            .report(self.source_id, DiagnosticKind::UnclosedDelimiter, full_range)
            .message(message)
            .related_to(self.source_id, open_range, "opened here")
            .emit();
    }
}
