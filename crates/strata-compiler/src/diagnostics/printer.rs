//! Builder-pattern printer for rendering diagnostics.

use std::fmt::Write;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};
use rowan::TextRange;

use super::Diagnostics;
use super::message::Severity;
use crate::source_map::{SourceKind, SourceMap};

/// Builder for rendering diagnostics against the sources they point into.
pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    sources: &'s SourceMap,
    colored: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics, sources: &'s SourceMap) -> Self {
        Self {
            diagnostics,
            sources,
            colored: false,
        }
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.format(&mut out);
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        for (i, diag) in self.diagnostics.iter().enumerate() {
            let source = self.sources.get(diag.source);
            let content = source.content;
            let range = adjust_range(diag.range, content.len());
            let path = source.kind.display_name();

            let mut snippet = Snippet::source(content)
                .line_start(first_line(source.kind))
                .path(&path)
                .annotation(
                    AnnotationKind::Primary
                        .span(range)
                        .label(&diag.message),
                );

            for related in diag.related.iter().filter(|r| r.source == diag.source) {
                snippet = snippet.annotation(
                    AnnotationKind::Context
                        .span(adjust_range(related.range, content.len()))
                        .label(&related.message),
                );
            }

            let mut title_group = severity_to_level(diag.severity())
                .primary_title(&diag.message)
                .element(snippet);
            for hint in &diag.hints {
                title_group = title_group.element(Level::HELP.message(hint));
            }

            let report: Vec<Group> = vec![title_group];

            if i > 0 {
                w.write_char('\n')?;
            }
            write!(w, "{}", renderer.render(&report))?;
        }

        Ok(())
    }
}

/// Embedded tags are numbered from the line they start on in their file.
fn first_line(kind: &SourceKind) -> usize {
    match kind {
        SourceKind::Embedded { start, .. } => start.line as usize + 1,
        _ => 1,
    }
}

fn severity_to_level(severity: Severity) -> Level<'static> {
    match severity {
        Severity::Error => Level::ERROR,
        Severity::Warning => Level::WARNING,
    }
}

fn adjust_range(range: TextRange, limit: usize) -> std::ops::Range<usize> {
    let start: usize = range.start().into();
    let end: usize = range.end().into();

    if start == end {
        return start.min(limit)..(start + 1).min(limit);
    }

    start..end
}
