mod message;
mod printer;

#[cfg(test)]
mod tests;

use rowan::TextRange;

pub use message::{DiagnosticKind, DiagnosticMessage, RelatedInfo, Severity};
pub use printer::DiagnosticsPrinter;

use crate::source_map::{SourceId, SourceMap};

/// Ordered collection of diagnostics from one or more sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    messages: Vec<DiagnosticMessage>,
}

#[must_use = "diagnostic not emitted, call .emit()"]
pub struct DiagnosticBuilder<'a> {
    diagnostics: &'a mut Diagnostics,
    message: DiagnosticMessage,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a diagnostic with the given kind and span.
    ///
    /// Uses the kind's default message. Call `.message()` on the builder to override.
    pub fn report(
        &mut self,
        source: SourceId,
        kind: DiagnosticKind,
        range: TextRange,
    ) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            diagnostics: self,
            message: DiagnosticMessage::new(source, kind, range, kind.fallback_message()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|d| d.is_error())
    }

    pub fn has_warnings(&self) -> bool {
        self.messages.iter().any(|d| d.is_warning())
    }

    pub fn error_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_warning()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticMessage> {
        self.messages.iter()
    }

    /// Messages only, in emission order.
    pub fn messages(&self) -> Vec<&str> {
        self.messages.iter().map(|m| m.message()).collect()
    }

    /// Keep only errors; warnings are dropped.
    pub fn errors(&self) -> Diagnostics {
        Diagnostics {
            messages: self.messages.iter().filter(|m| m.is_error()).cloned().collect(),
        }
    }

    /// Returns diagnostics with cascading errors suppressed.
    ///
    /// Within one source, when a higher-priority span contains another span,
    /// the inner one is dropped. Spans starting at the same offset keep only
    /// the highest-priority kind.
    pub fn filtered(&self) -> Diagnostics {
        let mut suppressed = vec![false; self.messages.len()];

        for (i, a) in self.messages.iter().enumerate() {
            for (j, b) in self.messages.iter().enumerate() {
                if i == j || suppressed[i] || suppressed[j] || a.source != b.source {
                    continue;
                }

                if span_strictly_contains(a.suppression_range, b.range)
                    && a.kind.suppresses(&b.kind)
                {
                    suppressed[j] = true;
                    continue;
                }

                if a.range.start() == b.range.start() && a.kind.suppresses(&b.kind) {
                    suppressed[j] = true;
                }
            }
        }

        Diagnostics {
            messages: self
                .messages
                .iter()
                .zip(suppressed)
                .filter(|(_, suppressed)| !suppressed)
                .map(|(m, _)| m.clone())
                .collect(),
        }
    }

    /// Stable ordering by source, then position, then kind.
    pub fn sorted(&self) -> Diagnostics {
        let mut messages = self.messages.clone();
        messages.sort_by(|a, b| {
            (a.source, a.range.start(), a.range.end(), a.kind, &a.message).cmp(&(
                b.source,
                b.range.start(),
                b.range.end(),
                b.kind,
                &b.message,
            ))
        });
        Diagnostics { messages }
    }

    pub fn printer<'d, 's>(&'d self, sources: &'s SourceMap) -> DiagnosticsPrinter<'d, 's> {
        DiagnosticsPrinter::new(self, sources)
    }

    pub fn render(&self, sources: &SourceMap) -> String {
        self.printer(sources).render()
    }

    pub fn render_colored(&self, sources: &SourceMap, colored: bool) -> String {
        self.printer(sources).colored(colored).render()
    }

    /// One `path:line:column: severity: message` line per diagnostic.
    ///
    /// Positions are 1-based and expressed in the coordinates of the enclosing
    /// file, so tags extracted from modules point into the module itself.
    pub fn render_locations(&self, sources: &SourceMap) -> String {
        let mut out = String::new();
        for (i, diag) in self.messages.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let name = sources.kind(diag.source).display_name();
            let pos = sources.line_col(diag.source, diag.range.start());
            out.push_str(&format!(
                "{name}:{pos}: {}: {}",
                diag.severity(),
                diag.message
            ));
        }
        out
    }

    pub fn push(&mut self, message: DiagnosticMessage) {
        self.messages.push(message);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.messages.extend(other.messages);
    }
}

impl IntoIterator for Diagnostics {
    type Item = DiagnosticMessage;
    type IntoIter = std::vec::IntoIter<DiagnosticMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, diag) in self.messages.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{diag}")?;
        }
        Ok(())
    }
}

impl<'a> DiagnosticBuilder<'a> {
    /// Provide custom detail for this diagnostic, rendered using the kind's template.
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        let detail = msg.into();
        self.message.message = self.message.kind.message(Some(&detail));
        self
    }

    /// Use `msg` verbatim, bypassing the kind's template.
    pub fn raw_message(mut self, msg: impl Into<String>) -> Self {
        self.message.message = msg.into();
        self
    }

    pub fn related_to(
        mut self,
        source: SourceId,
        range: TextRange,
        msg: impl Into<String>,
    ) -> Self {
        self.message.related.push(RelatedInfo {
            source,
            range,
            message: msg.into(),
        });
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.message.hints.push(hint.into());
        self
    }

    /// Widen the range used for cascade suppression.
    pub fn suppression_range(mut self, range: TextRange) -> Self {
        self.message.suppression_range = range;
        self
    }

    pub fn emit(self) {
        self.diagnostics.messages.push(self.message);
    }
}

/// Check if outer span strictly contains inner span (different start positions).
fn span_strictly_contains(outer: TextRange, inner: TextRange) -> bool {
    outer.start() < inner.start() && inner.end() <= outer.end()
}
