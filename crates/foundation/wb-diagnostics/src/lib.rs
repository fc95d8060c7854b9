//! Diagnostic collection and rendering
//!
//! Analysis passes report through the [`DiagnosticSink`] trait and never
//! decide how diagnostics are presented. [`DiagnosticBag`] is the in-memory
//! sink; [`render`] turns collected diagnostics into text, either in the
//! plain `line:column ***ERROR*** message` form or as rustc-style snippets
//! via `codespan-reporting`.

pub mod render;

pub use render::{RenderError, render_plain, render_rich, to_codespan_diagnostic};

use derive_more::Display;
use std::slice;
use wb_span::Position;

/// How serious a diagnostic is
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq)]
pub enum Severity {
    /// Fatal error: the program is rejected, but analysis keeps going
    #[display("ERROR")]
    Error,
    /// Warning: reported, does not reject the program
    #[display("WARNING")]
    Warning,
}

/// A single positioned message
#[derive(Clone, Debug, Display, Hash, Eq, PartialEq)]
#[display("{pos} ***{severity}*** {message}")]
pub struct Diagnostic {
    /// Severity of the message
    pub severity: Severity,
    /// Where the problem was found
    pub pos: Position,
    /// Human readable message
    pub message: String,
}

impl Diagnostic {
    /// Create an error diagnostic
    pub fn error(pos: Position, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            pos,
            message: message.into(),
        }
    }

    /// Create a warning diagnostic
    pub fn warning(pos: Position, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            pos,
            message: message.into(),
        }
    }

    /// Whether this diagnostic rejects the program
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Destination for diagnostics produced by a pass
pub trait DiagnosticSink {
    /// Record a diagnostic
    fn report(&mut self, diagnostic: Diagnostic);

    /// Whether any fatal diagnostic has been recorded
    fn had_fatal(&self) -> bool;

    /// Record an error at `pos`
    fn error(&mut self, pos: Position, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.report(Diagnostic::error(pos, message));
    }

    /// Record a warning at `pos`
    fn warning(&mut self, pos: Position, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.report(Diagnostic::warning(pos, message));
    }
}

/// Append-only, in-memory diagnostic sink
#[derive(Clone, Debug, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
    fatal: bool,
}

impl DiagnosticBag {
    /// Create an empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostics in the order they were reported
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Number of recorded diagnostics
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Whether nothing has been reported
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Take ownership of the recorded diagnostics
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl DiagnosticSink for DiagnosticBag {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.fatal |= diagnostic.is_fatal();
        self.diagnostics.push(diagnostic);
    }

    fn had_fatal(&self) -> bool {
        self.fatal
    }
}

impl<'bag> IntoIterator for &'bag DiagnosticBag {
    type Item = &'bag Diagnostic;
    type IntoIter = slice::Iter<'bag, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_display() {
        let diagnostic = Diagnostic::error(Position::new(4, 9), "Undeclared identifier");
        assert_eq!(diagnostic.to_string(), "4:9 ***ERROR*** Undeclared identifier");

        let warning = Diagnostic::warning(Position::new(1, 1), "unused");
        assert_eq!(warning.to_string(), "1:1 ***WARNING*** unused");
    }

    #[test]
    fn test_fatal_flag_is_monotonic() {
        let mut bag = DiagnosticBag::new();
        assert!(!bag.had_fatal());

        bag.warning(Position::new(1, 1), "first");
        assert!(!bag.had_fatal());

        bag.error(Position::new(2, 1), "second");
        assert!(bag.had_fatal());

        bag.warning(Position::new(3, 1), "third");
        assert!(bag.had_fatal());
        assert_eq!(bag.len(), 3);
    }

    #[test]
    fn test_report_order_is_preserved() {
        let mut bag = DiagnosticBag::new();
        bag.error(Position::new(9, 1), "late");
        bag.error(Position::new(1, 1), "early");

        let messages: Vec<_> = bag.iter().map(|diag| diag.message.as_str()).collect();
        assert_eq!(messages, ["late", "early"]);
    }
}
