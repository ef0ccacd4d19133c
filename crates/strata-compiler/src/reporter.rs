//! Sink for progress messages and non-fatal errors.

use crate::Error;

/// Receives messages from the compiler. Nothing it returns affects a run.
pub trait Reporter: Send + Sync {
    fn report_message(&self, message: &str);

    /// A non-fatal failure. `context` names the stage, e.g. `query map`.
    fn report_error(&self, context: &str, error: &Error);
}

/// Forwards everything to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report_message(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn report_error(&self, context: &str, error: &Error) {
        tracing::error!(context, kind = ?error.kind(), "{error}");
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report_message(&self, _message: &str) {}

    fn report_error(&self, _context: &str, _error: &Error) {}
}
