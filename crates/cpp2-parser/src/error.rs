//! Parse error types for the Cpp2 declaration parser.

use std::fmt;

use cpp2_common::diagnostic::Diagnostic;
use cpp2_common::span::{SourcePosition, Span};

/// A parse error with location information and optional related position.
///
/// Parse errors carry the span and position of the token where the problem
/// was detected, a human-readable message, and an optional related location
/// for context (e.g., "opened here" for unclosed braces).
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Human-readable description of what went wrong.
    pub message: String,
    /// Byte span in the text the tokens were lexed from.
    pub span: Span,
    /// Line/column of the offending token, tagged with its origin.
    pub position: SourcePosition,
    /// Optional related location with context message.
    pub related: Option<(String, SourcePosition)>,
}

impl ParseError {
    /// Create a new parse error with just a message and location.
    pub fn new(message: impl Into<String>, span: Span, position: SourcePosition) -> Self {
        Self {
            message: message.into(),
            span,
            position,
            related: None,
        }
    }

    /// Attach a related location for additional context.
    pub fn with_related(
        mut self,
        related_message: impl Into<String>,
        related_position: SourcePosition,
    ) -> Self {
        self.related = Some((related_message.into(), related_position));
        self
    }

    /// Convert into the diagnostic reported to the user.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match &self.related {
            Some((note, at)) => Diagnostic::new(
                self.position,
                format!("{} ({} at {})", self.message, note, at),
            ),
            None => Diagnostic::new(self.position, self.message.clone()),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;
    use cpp2_common::span::SourceOrigin;

    #[test]
    fn parse_error_new() {
        let pos = SourcePosition::new(SourceOrigin::Authored, 1, 4);
        let err = ParseError::new("expected ';'", Span::new(3, 4), pos);
        assert_eq!(err.message, "expected ';'");
        assert_eq!(err.position, pos);
        assert!(err.related.is_none());
        assert_eq!(err.to_string(), "expected ';'");
    }

    #[test]
    fn related_position_is_folded_into_diagnostic() {
        let open = SourcePosition::new(SourceOrigin::Authored, 1, 10);
        let err = ParseError::new(
            "unclosed '{'",
            Span::new(20, 20),
            SourcePosition::new(SourceOrigin::Authored, 3, 1),
        )
        .with_related("opened here", open);
        let diag = err.to_diagnostic();
        assert_eq!(diag.message, "unclosed '{' (opened here at 1:10)");
        assert_eq!(diag.position.line, 3);
    }
}
