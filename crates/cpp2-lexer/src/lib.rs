//! Cpp2 lexer: tokenizer for authored source and synthesized fragments.
//!
//! The lexer works on one text at a time (the authored file, or the joined
//! lines of a generated record) and tags every token with a
//! [`SourcePosition`] carrying that text's [`SourceOrigin`]. Comments and
//! whitespace are dropped; problems are collected as [`LexError`]s and
//! surface as `Error` tokens so the parser can recover.

mod cursor;
mod group;

use cpp2_common::error::{LexError, LexErrorKind};
use cpp2_common::source::{join_lines, SourceLine};
use cpp2_common::span::{LineIndex, SourceOrigin, SourcePosition, Span};
use cpp2_common::token::{keyword_from_str, Token, TokenKind};
use cursor::Cursor;

pub use group::{group_declarations, TokenGroup};

/// Operator spellings that may follow `operator` to form a single name,
/// longest first so `<=>` wins over `<=`.
const OPERATOR_NAME_SUFFIXES: [&str; 14] = [
    "<=>", "==", "!=", "<=", ">=", "()", "[]", "=", "<", ">", "+", "-", "*", "/",
];

/// The Cpp2 lexer. Converts source text into a stream of tokens.
///
/// Wraps a [`Cursor`] for byte-level iteration and implements
/// `Iterator<Item = Token>` so callers can consume tokens lazily
/// or collect them into a `Vec`.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    origin: SourceOrigin,
    lines: LineIndex,
    /// Whether we have already emitted the `Eof` token.
    emitted_eof: bool,
    errors: Vec<LexError>,
}

/// Everything produced by lexing one text.
#[derive(Debug, Clone)]
pub struct Lexed {
    /// The text the token spans point into.
    pub text: String,
    /// Tokens in source order, without the trailing `Eof`.
    pub tokens: Vec<Token>,
    /// One group per top-level declaration, indexing into `tokens`.
    pub groups: Vec<TokenGroup>,
    pub errors: Vec<LexError>,
}

impl Lexed {
    /// The tokens of one group.
    pub fn group_tokens(&self, group: &TokenGroup) -> &[Token] {
        &self.tokens[group.range.clone()]
    }
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'src str, origin: SourceOrigin) -> Self {
        Self {
            cursor: Cursor::new(source),
            origin,
            lines: LineIndex::new(source),
            emitted_eof: false,
            errors: Vec::new(),
        }
    }

    /// Convenience: tokenize the entire source into a `Vec<Token>`.
    ///
    /// The returned vector includes the final `Eof` token.
    pub fn tokenize(source: &str) -> Vec<Token> {
        Lexer::new(source, SourceOrigin::Authored).collect()
    }

    /// Lex `source` completely and partition it into declaration groups.
    pub fn lex(source: &str, origin: SourceOrigin) -> Lexed {
        let mut lexer = Lexer::new(source, origin);
        let mut tokens: Vec<Token> = lexer.by_ref().collect();
        if tokens.last().is_some_and(|t| t.kind == TokenKind::Eof) {
            tokens.pop();
        }
        let groups = group_declarations(&tokens);
        Lexed {
            text: source.to_string(),
            tokens,
            groups,
            errors: lexer.errors,
        }
    }

    /// Lex a sequence of source lines as one text.
    pub fn lex_lines(lines: &[SourceLine], origin: SourceOrigin) -> Lexed {
        Self::lex(&join_lines(lines), origin)
    }

    fn position(&self, offset: u32) -> SourcePosition {
        let (line, col) = self.lines.line_col(offset);
        SourcePosition::new(self.origin, line, col)
    }

    fn make(&self, kind: TokenKind, start: u32) -> Token {
        Token::new(kind, start, self.cursor.pos(), self.position(start))
    }

    fn error(&mut self, kind: LexErrorKind, start: u32) {
        let span = Span::new(start, self.cursor.pos());
        let position = Self::position(self, start);
        self.errors.push(LexError::new(kind, span, position));
    }

    /// Produce the next token from the source.
    fn next_token(&mut self) -> Token {
        if let Some(unterminated) = self.skip_trivia() {
            self.error(LexErrorKind::UnterminatedBlockComment, unterminated);
        }

        let start = self.cursor.pos();

        let Some(c) = self.cursor.peek() else {
            return self.make(TokenKind::Eof, start);
        };

        match c {
            // ── Single-character delimiters ───────────────────────────────
            '(' => self.single_char_token(TokenKind::LParen, start),
            ')' => self.single_char_token(TokenKind::RParen, start),
            '[' => self.single_char_token(TokenKind::LBracket, start),
            ']' => self.single_char_token(TokenKind::RBracket, start),
            '{' => self.single_char_token(TokenKind::LBrace, start),
            '}' => self.single_char_token(TokenKind::RBrace, start),
            ',' => self.single_char_token(TokenKind::Comma, start),
            ';' => self.single_char_token(TokenKind::Semicolon, start),
            '.' => self.single_char_token(TokenKind::Dot, start),
            '@' => self.single_char_token(TokenKind::At, start),
            '~' => self.single_char_token(TokenKind::Tilde, start),
            '^' => self.single_char_token(TokenKind::Caret, start),
            '?' => self.single_char_token(TokenKind::Question, start),
            '+' => self.single_char_token(TokenKind::Plus, start),
            '*' => self.single_char_token(TokenKind::Star, start),
            '/' => self.single_char_token(TokenKind::Slash, start),
            '%' => self.single_char_token(TokenKind::Percent, start),

            // ── Multi-character operators ─────────────────────────────────
            '=' => self.lex_pair(start, TokenKind::Eq, &[("==", TokenKind::EqEq)]),
            '!' => self.lex_pair(start, TokenKind::Bang, &[("!=", TokenKind::NotEq)]),
            '>' => self.lex_pair(start, TokenKind::Gt, &[(">=", TokenKind::GtEq)]),
            '-' => self.lex_pair(start, TokenKind::Minus, &[("->", TokenKind::Arrow)]),
            ':' => self.lex_pair(start, TokenKind::Colon, &[("::", TokenKind::ColonColon)]),
            '&' => self.lex_pair(start, TokenKind::Amp, &[("&&", TokenKind::AmpAmp)]),
            '|' => self.lex_pair(start, TokenKind::Bar, &[("||", TokenKind::PipePipe)]),
            '<' => self.lex_pair(
                start,
                TokenKind::Lt,
                &[("<=>", TokenKind::Spaceship), ("<=", TokenKind::LtEq)],
            ),

            // ── Literals ─────────────────────────────────────────────────
            '0'..='9' => self.lex_number(start),
            '"' => self.lex_quoted(start, '"'),
            '\'' => self.lex_quoted(start, '\''),

            // ── Identifiers and keywords ─────────────────────────────────
            c if is_ident_start(c) => self.lex_ident(start),

            // ── Unknown character (error recovery) ───────────────────────
            c => {
                self.cursor.advance();
                self.error(LexErrorKind::UnexpectedCharacter(c), start);
                self.make(TokenKind::Error, start)
            }
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────────

    /// Skip whitespace and comments. Returns the start offset of a block
    /// comment that runs off the end of the input.
    fn skip_trivia(&mut self) -> Option<u32> {
        loop {
            self.cursor.eat_while(char::is_whitespace);
            let start = self.cursor.pos();
            if self.cursor.eat_str("//") {
                self.cursor.eat_while(|c| c != '\n');
            } else if self.cursor.eat_str("/*") {
                while !self.cursor.eat_str("*/") {
                    if self.cursor.advance().is_none() {
                        return Some(start);
                    }
                }
            } else {
                return None;
            }
        }
    }

    /// Consume one character and return a token of the given kind.
    fn single_char_token(&mut self, kind: TokenKind, start: u32) -> Token {
        self.cursor.advance();
        self.make(kind, start)
    }

    /// Try each longer spelling in order, falling back to the one-character kind.
    fn lex_pair(&mut self, start: u32, single: TokenKind, longer: &[(&str, TokenKind)]) -> Token {
        for (text, kind) in longer {
            if self.cursor.eat_str(text) {
                return self.make(*kind, start);
            }
        }
        self.single_char_token(single, start)
    }

    fn lex_number(&mut self, start: u32) -> Token {
        self.cursor
            .eat_while(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '\'');
        self.make(TokenKind::NumberLiteral, start)
    }

    /// Lex a string or character literal. Literals may not span lines.
    fn lex_quoted(&mut self, start: u32, quote: char) -> Token {
        let (kind, unterminated) = if quote == '"' {
            (TokenKind::StringLiteral, LexErrorKind::UnterminatedString)
        } else {
            (TokenKind::CharLiteral, LexErrorKind::UnterminatedChar)
        };
        self.cursor.advance(); // opening quote
        loop {
            match self.cursor.peek() {
                Some(c) if c == quote => {
                    self.cursor.advance();
                    return self.make(kind, start);
                }
                Some('\\') => {
                    self.cursor.advance();
                    if self.cursor.peek().is_some_and(|c| c != '\n') {
                        self.cursor.advance();
                    }
                }
                None | Some('\n') => {
                    self.error(unterminated, start);
                    return self.make(TokenKind::Error, start);
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    /// Lex an identifier or keyword. `operator` directly followed by an
    /// operator spelling is one identifier (`operator=`, `operator<=>`, ...).
    fn lex_ident(&mut self, start: u32) -> Token {
        self.cursor.eat_while(is_ident_continue);
        let text = self.cursor.slice(start, self.cursor.pos());
        if text == "operator" {
            for suffix in OPERATOR_NAME_SUFFIXES {
                if self.cursor.eat_str(suffix) {
                    return self.make(TokenKind::Ident, start);
                }
            }
        }
        let kind = keyword_from_str(text).unwrap_or(TokenKind::Ident);
        self.make(kind, start)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.emitted_eof {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.emitted_eof = true;
        }
        Some(token)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
