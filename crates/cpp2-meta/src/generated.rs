//! Append-only storage for code synthesized by meta-functions.

use std::ops::Range;

use cpp2_common::source::{join_lines, SourceLine};
use cpp2_common::token::Token;

/// Generated-source records and the generated-token buffer of one
/// compilation unit.
///
/// Record `n` is the text behind every position tagged
/// `SourceOrigin::Generated(n)`. Both arenas only grow; a record is never
/// changed once stored.
#[derive(Debug, Clone, Default)]
pub struct GeneratedSources {
    records: Vec<Vec<SourceLine>>,
    tokens: Vec<Token>,
}

impl GeneratedSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record and return its number.
    pub fn add_record(&mut self, lines: Vec<SourceLine>) -> u32 {
        self.records.push(lines);
        (self.records.len() - 1) as u32
    }

    pub fn record(&self, n: u32) -> Option<&[SourceLine]> {
        self.records.get(n as usize).map(Vec::as_slice)
    }

    /// The record's lines joined back into the text its tokens point into.
    pub fn record_text(&self, n: u32) -> Option<String> {
        self.record(n).map(join_lines)
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Append lexed tokens and return where they landed in the buffer.
    pub fn extend_tokens(&mut self, tokens: impl IntoIterator<Item = Token>) -> Range<usize> {
        let start = self.tokens.len();
        self.tokens.extend(tokens);
        start..self.tokens.len()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Forget everything. Only for drivers that reuse a unit for a new pass.
    pub fn clear(&mut self) {
        self.records.clear();
        self.tokens.clear();
    }
}
