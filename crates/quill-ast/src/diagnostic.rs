//! Diagnostics produced by parsers and checkers

use serde::{Deserialize, Serialize};

use crate::Range;

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hint,
    Warning,
    Error,
}

/// A message attached to a source range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    pub range: Range,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, range: Range, severity: Severity) -> Self {
        Self {
            message: message.into(),
            range,
            severity,
        }
    }

    pub fn error(message: impl Into<String>, range: Range) -> Self {
        Self::new(message, range, Severity::Error)
    }

    pub fn warning(message: impl Into<String>, range: Range) -> Self {
        Self::new(message, range, Severity::Warning)
    }
}

/// Collects diagnostics in emission order.
///
/// Parsers that backtrack take a [`mark`](ErrorSink::mark) before trying an
/// alternative and [`rollback`](ErrorSink::rollback) when it fails.
#[derive(Debug, Clone, Default)]
pub struct ErrorSink {
    diagnostics: Vec<Diagnostic>,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report an error
    pub fn report(&mut self, message: impl Into<String>, range: Range) {
        self.push(Diagnostic::error(message, range));
    }

    /// Report with an explicit severity
    pub fn report_with(&mut self, message: impl Into<String>, range: Range, severity: Severity) {
        self.push(Diagnostic::new(message, range, severity));
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Number of `Error` severity diagnostics
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn mark(&self) -> usize {
        self.diagnostics.len()
    }

    /// Drop everything reported after `mark`
    pub fn rollback(&mut self, mark: usize) {
        self.diagnostics.truncate(mark);
    }

    /// Remove and return everything reported after `mark`
    pub fn split_off(&mut self, mark: usize) -> Vec<Diagnostic> {
        self.diagnostics.split_off(mark.min(self.diagnostics.len()))
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
