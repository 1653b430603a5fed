use serde::Serialize;

use crate::span::{SourcePosition, Span};

/// A token produced by the Cpp2 lexer.
///
/// `span` is a byte range into the text the token was lexed from, and
/// `position` is the same location as a line/column pair tagged with its
/// origin so later stages can attribute synthesized code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub position: SourcePosition,
}

impl Token {
    /// Create a new token from a kind, byte offsets and a position.
    pub fn new(kind: TokenKind, start: u32, end: u32, position: SourcePosition) -> Self {
        Self {
            kind,
            span: Span::new(start, end),
            position,
        }
    }

    /// The token's text within `source`.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.span.start as usize..self.span.end as usize]
    }
}

/// Every kind of token in the Cpp2 declaration grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // ── Keywords ───────────────────────────────────────────────────────
    Type,
    Namespace,
    Public,
    Protected,
    Private,
    In,
    Inout,
    Out,
    Copy,
    Move,
    Forward,
    Virtual,
    Override,
    Final,
    Const,

    // ── Operators ──────────────────────────────────────────────────────
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `=`
    Eq,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,
    /// `<=>`
    Spaceship,
    /// `&`
    Amp,
    /// `&&`
    AmpAmp,
    /// `|`
    Bar,
    /// `||`
    PipePipe,
    /// `!`
    Bang,
    /// `~`
    Tilde,
    /// `^`
    Caret,
    /// `?`
    Question,
    /// `->`
    Arrow,
    /// `::`
    ColonColon,
    /// `@`
    At,

    // ── Delimiters ─────────────────────────────────────────────────────
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,

    // ── Punctuation ────────────────────────────────────────────────────
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `:`
    Colon,
    /// `;`
    Semicolon,

    // ── Literals ───────────────────────────────────────────────────────
    /// Integer or floating-point literal, e.g. `42`, `0xFF`, `1.5e3`.
    NumberLiteral,
    /// `"..."`
    StringLiteral,
    /// `'c'`
    CharLiteral,

    // ── Identifiers ────────────────────────────────────────────────────
    /// Identifier, including `this`, `that`, `_` and `operator=`-style names.
    Ident,

    // ── Special ────────────────────────────────────────────────────────
    /// End of input.
    Eof,
    /// Invalid/unexpected input. Used for error recovery.
    Error,
}

impl TokenKind {
    /// Whether this kind opens a bracketed region.
    pub fn is_open_delimiter(self) -> bool {
        matches!(self, TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace)
    }

    /// Whether this kind closes a bracketed region.
    pub fn is_close_delimiter(self) -> bool {
        matches!(self, TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace)
    }

    /// Whether this kind is a word (identifier, keyword or literal), used by
    /// the printer to decide where spaces are required between tokens.
    pub fn is_word(self) -> bool {
        keyword_text(self).is_some()
            || matches!(
                self,
                TokenKind::Ident
                    | TokenKind::NumberLiteral
                    | TokenKind::StringLiteral
                    | TokenKind::CharLiteral
            )
    }
}

/// Look up a keyword from its string representation.
///
/// Returns `Some(TokenKind)` if the string is a Cpp2 keyword, `None` otherwise.
/// The lexer calls this to distinguish keywords from identifiers after scanning
/// an identifier-shaped token.
pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
    match s {
        "type" => Some(TokenKind::Type),
        "namespace" => Some(TokenKind::Namespace),
        "public" => Some(TokenKind::Public),
        "protected" => Some(TokenKind::Protected),
        "private" => Some(TokenKind::Private),
        "in" => Some(TokenKind::In),
        "inout" => Some(TokenKind::Inout),
        "out" => Some(TokenKind::Out),
        "copy" => Some(TokenKind::Copy),
        "move" => Some(TokenKind::Move),
        "forward" => Some(TokenKind::Forward),
        "virtual" => Some(TokenKind::Virtual),
        "override" => Some(TokenKind::Override),
        "final" => Some(TokenKind::Final),
        "const" => Some(TokenKind::Const),
        _ => None,
    }
}

/// The source spelling of a keyword kind.
pub fn keyword_text(kind: TokenKind) -> Option<&'static str> {
    let text = match kind {
        TokenKind::Type => "type",
        TokenKind::Namespace => "namespace",
        TokenKind::Public => "public",
        TokenKind::Protected => "protected",
        TokenKind::Private => "private",
        TokenKind::In => "in",
        TokenKind::Inout => "inout",
        TokenKind::Out => "out",
        TokenKind::Copy => "copy",
        TokenKind::Move => "move",
        TokenKind::Forward => "forward",
        TokenKind::Virtual => "virtual",
        TokenKind::Override => "override",
        TokenKind::Final => "final",
        TokenKind::Const => "const",
        _ => return None,
    };
    Some(text)
}
