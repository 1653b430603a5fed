//! Partitioning of a token stream into one group per top-level declaration.

use std::ops::Range;

use cpp2_common::token::{Token, TokenKind};

/// A contiguous run of tokens holding exactly one top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGroup {
    pub range: Range<usize>,
}

impl TokenGroup {
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Split `tokens` at top-level declaration boundaries.
///
/// A group ends at a `;` at nesting depth zero, or at a `}` that brings the
/// depth back to zero; a `;` directly after such a `}` belongs to the same
/// group. Tokens left over without a terminator form a final group.
pub fn group_declarations(tokens: &[Token]) -> Vec<TokenGroup> {
    let mut groups = Vec::new();
    let mut start = 0;
    let mut depth: u32 = 0;
    let mut i = 0;

    while i < tokens.len() {
        let kind = tokens[i].kind;
        let mut end_here = false;
        if kind.is_open_delimiter() {
            depth += 1;
        } else if kind.is_close_delimiter() {
            depth = depth.saturating_sub(1);
            end_here = depth == 0 && kind == TokenKind::RBrace;
        } else if kind == TokenKind::Semicolon && depth == 0 {
            end_here = true;
        }
        i += 1;

        if end_here {
            if kind == TokenKind::RBrace
                && tokens.get(i).is_some_and(|t| t.kind == TokenKind::Semicolon)
            {
                i += 1;
            }
            groups.push(TokenGroup { range: start..i });
            start = i;
        }
    }

    if start < tokens.len() {
        groups.push(TokenGroup {
            range: start..tokens.len(),
        });
    }
    groups
}
