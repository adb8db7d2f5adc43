// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Semantic diagnostics.
//!
//! Recoverable semantic errors are collected in a [`DiagnosticSink`] in
//! discovery order; the annotation pass never stops at the first error.
//! A non-empty sink (at error severity) signals overall failure to the
//! caller, which is expected to halt the pipeline before later stages.

use std::io;

use camino::Utf8PathBuf;
use ecow::EcoString;

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// An error that fails the pass.
    Error,
    /// A warning that does not affect the pass outcome.
    Warning,
}

/// A semantic diagnostic with source-location context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The severity of the diagnostic.
    pub severity: Severity,
    /// The error message.
    pub message: EcoString,
    /// Source file the offending declaration lives in.
    pub filename: Utf8PathBuf,
    /// 1-based source line.
    pub line: u32,
    /// Optional hint for how to fix the issue.
    pub hint: Option<EcoString>,
}

impl Diagnostic {
    /// Creates a new error diagnostic.
    #[must_use]
    pub fn error(message: impl Into<EcoString>, filename: impl Into<Utf8PathBuf>, line: u32) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            filename: filename.into(),
            line,
            hint: None,
        }
    }

    /// Creates a new warning diagnostic.
    #[must_use]
    pub fn warning(
        message: impl Into<EcoString>,
        filename: impl Into<Utf8PathBuf>,
        line: u32,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            filename: filename.into(),
            line,
            hint: None,
        }
    }

    /// Attaches a fix-it hint.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<EcoString>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Ordered accumulator for semantic diagnostics.
///
/// The checker pushes diagnostics as it finds them and keeps walking; the
/// sink preserves discovery order for reporting.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Returns the number of error-severity diagnostics recorded.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Returns true if no error-severity diagnostics were recorded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.error_count() == 0
    }

    /// Iterates over the recorded diagnostics in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Consumes the sink, returning the diagnostics in discovery order.
    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Renders every diagnostic to `out` as `filename:line: severity: message`
    /// lines, hints indented beneath.
    ///
    /// # Errors
    ///
    /// Propagates any I/O error from the writer.
    pub fn write_to(&self, out: &mut impl io::Write) -> io::Result<()> {
        for d in &self.diagnostics {
            let tag = match d.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            };
            writeln!(out, "{}:{}: {}: {}", d.filename, d.line, tag, d.message)?;
            if let Some(hint) = &d.hint {
                writeln!(out, "    = help: {hint}")?;
            }
        }
        Ok(())
    }
}

impl IntoIterator for DiagnosticSink {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_preserves_discovery_order() {
        let mut sink = DiagnosticSink::new();
        sink.push(Diagnostic::error("first", "a.kite", 1));
        sink.push(Diagnostic::error("second", "a.kite", 9));

        let messages: Vec<&str> = sink.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[test]
    fn warnings_do_not_fail_the_pass() {
        let mut sink = DiagnosticSink::new();
        sink.push(Diagnostic::warning("meh", "a.kite", 2));
        assert!(sink.is_clean());
        assert_eq!(sink.error_count(), 0);

        sink.push(Diagnostic::error("bad", "a.kite", 3));
        assert!(!sink.is_clean());
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn write_to_renders_location_and_hint() {
        let mut sink = DiagnosticSink::new();
        sink.push(
            Diagnostic::error("method `lenght` is not declared", "main.kite", 12)
                .with_hint("did you mean `length`?"),
        );

        let mut out = Vec::new();
        sink.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "main.kite:12: error: method `lenght` is not declared\n    = help: did you mean `length`?\n"
        );
    }
}
