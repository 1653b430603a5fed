//! Diagnostics shared by every stage of a compilation unit.

use std::fmt;

use serde::Serialize;

use crate::span::SourcePosition;

/// A (position, message) pair reported to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub position: SourcePosition,
    pub message: String,
}

impl Diagnostic {
    pub fn new(position: SourcePosition, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.position.is_unknown() {
            write!(f, "error: {}", self.message)
        } else {
            write!(f, "{}: error: {}", self.position, self.message)
        }
    }
}

/// Append-only, ordered list of diagnostics for one compilation unit.
///
/// Entries are never reordered or removed except by [`drain`](Self::drain),
/// which hands everything to the driver at once. Components that need to
/// know whether *they* reported something remember
/// [`total_reported`](Self::total_reported) on entry and compare later.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticSink {
    entries: Vec<Diagnostic>,
    /// Every entry ever pushed; not reset by `drain`.
    total: usize,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
        self.total += 1;
    }

    /// Append a diagnostic built from its parts.
    pub fn report(&mut self, position: SourcePosition, message: impl Into<String>) {
        self.push(Diagnostic::new(position, message));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// How many diagnostics were ever reported, drained ones included.
    pub fn total_reported(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    /// Entries appended after the sink had `mark` entries.
    pub fn since(&self, mark: usize) -> &[Diagnostic] {
        &self.entries[mark.min(self.entries.len())..]
    }

    /// Remove and return every entry, in append order.
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }
}

impl<'a> IntoIterator for &'a DiagnosticSink {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
