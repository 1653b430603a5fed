//! Shared types for the Cpp2 front end: byte spans and source positions,
//! tokens, source lines, lexer errors and the diagnostic sink.

pub mod diagnostic;
pub mod error;
pub mod source;
pub mod span;
pub mod token;

pub use diagnostic::{Diagnostic, DiagnosticSink};
pub use span::{LineIndex, SourceOrigin, SourcePosition, Span};
pub use token::{Token, TokenKind};
