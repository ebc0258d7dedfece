//! Diagnostic reporting for the tokenizer and grammar parser.
//!
//! Expectation failures are routed through a [`Reporter`] so callers can
//! choose between coloured terminal output, silence, or collecting the
//! messages for later inspection.

use std::cell::RefCell;
use std::fmt;
use std::io::{self, IsTerminal, Write};
use std::rc::Rc;

use crate::output::{BOLD, GREEN, RED, RESET, YELLOW};
use crate::parser::Location;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A single reported diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub location: Location,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(location: Location, message: impl Into<String>) -> Self {
        Self {
            location,
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.location, self.severity, self.message)
    }
}

/// Sink for diagnostics produced while tokenizing and parsing.
pub trait Reporter {
    fn report(&self, location: &Location, severity: Severity, message: &str);
}

/// Prints `file:row:col: LEVEL: message` to stderr.
///
/// Only the location and level are coloured, and only when stderr is a terminal.
pub struct StderrReporter {
    color: bool,
}

impl StderrReporter {
    pub fn new() -> Self {
        Self {
            color: io::stderr().is_terminal(),
        }
    }
}

impl Default for StderrReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for StderrReporter {
    fn report(&self, location: &Location, severity: Severity, message: &str) {
        let mut stderr = io::stderr().lock();
        if self.color {
            let color = match severity {
                Severity::Error => RED,
                Severity::Warning => YELLOW,
                Severity::Info => GREEN,
            };
            let _ = writeln!(stderr, "{BOLD}{color}{location}: {severity}:{RESET} {message}");
        } else {
            let _ = writeln!(stderr, "{location}: {severity}: {message}");
        }
    }
}

/// Drops every diagnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn report(&self, _location: &Location, _severity: Severity, _message: &str) {}
}

/// Records diagnostics for later inspection.
///
/// Clones share the same buffer, so one handle can be given to a tokenizer
/// while another is kept for assertions.
#[derive(Debug, Clone, Default)]
pub struct CollectingReporter {
    diagnostics: Rc<RefCell<Vec<Diagnostic>>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    /// Count errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Check if nothing has been reported.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.borrow().is_empty()
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, location: &Location, severity: Severity, message: &str) {
        self.diagnostics.borrow_mut().push(Diagnostic {
            location: location.clone(),
            severity,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> Location {
        Location::new("test.bnf", 2, 5)
    }

    #[test]
    fn test_collecting_reporter_shares_buffer() {
        let reporter = CollectingReporter::new();
        let handle = reporter.clone();

        handle.report(&loc(), Severity::Error, "Expected `;`");
        handle.report(&loc(), Severity::Warning, "unused rule");

        assert_eq!(reporter.diagnostics().len(), 2);
        assert_eq!(reporter.error_count(), 1);
        assert!(!reporter.is_empty());
    }

    #[test]
    fn test_silent_reporter() {
        SilentReporter.report(&loc(), Severity::Error, "ignored");
    }

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::error(loc(), "Expected Symbol but got End");
        assert_eq!(d.to_string(), "test.bnf:2:5: ERROR: Expected Symbol but got End");
    }
}
