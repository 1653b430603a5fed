//! Cpp2 parser: declarations into an arena syntax tree.
//!
//! This crate turns the token groups produced by `cpp2-lexer` into
//! [`DeclarationNode`]s stored in a [`SyntaxTree`]. Each group holds one
//! declaration and is parsed independently, so a failure in one group never
//! disturbs the nodes of another.

pub mod error;
mod parser;
pub mod print;
pub mod tree;

use cpp2_common::token::Token;

pub use error::ParseError;
pub use print::{print_declaration, print_tree};
pub use tree::{
    Accessibility, AliasOf, DeclId, DeclKind, DeclarationNode, DeclarationRequests,
    DeclaredThatFunctions, FunctionSig, Initializer, InitializerKind, MemberFilter, Parameter,
    PassingStyle, SyntaxTree, ThisSpecifier,
};

/// Parse exactly one declaration from `tokens` into `tree`.
///
/// `source` is the text the tokens were lexed from. The new node is
/// detached: it is neither a root nor a member of any scope until the caller
/// attaches it. On error the arena is rolled back, so no partial nodes stay
/// behind.
pub fn parse_one_declaration(
    tokens: &[Token],
    source: &str,
    tree: &mut SyntaxTree,
) -> Result<DeclId, ParseError> {
    let mark = tree.mark();
    let result = parser::Parser::new(tokens, source, tree).parse_whole();
    if result.is_err() {
        tree.truncate(mark);
    }
    result
}
