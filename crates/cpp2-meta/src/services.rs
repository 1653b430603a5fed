//! Compiler Services: the capability every reflective view is built on.
//!
//! Bundles the unit's syntax tree, diagnostic sink and generated sources
//! behind two operations: [`require`](CompilerServices::require), the
//! policy-diagnostic primitive, and
//! [`parse_statement`](CompilerServices::parse_statement), which compiles a
//! synthesized source fragment into a new detached declaration.

use std::cell::{Ref, RefCell, RefMut};

use cpp2_common::diagnostic::DiagnosticSink;
use cpp2_common::source::{join_lines, split_lines, LineCategory};
use cpp2_common::span::{SourceOrigin, SourcePosition};
use cpp2_lexer::Lexer;
use cpp2_parser::{parse_one_declaration, DeclId, SyntaxTree};

use crate::generated::GeneratedSources;

pub struct CompilerServices<'a> {
    tree: &'a RefCell<SyntaxTree>,
    diagnostics: &'a RefCell<DiagnosticSink>,
    generated: &'a RefCell<GeneratedSources>,
    reported_at_start: usize,
}

impl<'a> CompilerServices<'a> {
    pub fn new(
        tree: &'a RefCell<SyntaxTree>,
        diagnostics: &'a RefCell<DiagnosticSink>,
        generated: &'a RefCell<GeneratedSources>,
    ) -> Self {
        let reported_at_start = diagnostics.borrow().total_reported();
        Self {
            tree,
            diagnostics,
            generated,
            reported_at_start,
        }
    }

    /// Report `message` at the unknown position unless `condition` holds.
    pub fn require(&self, condition: bool, message: &str) {
        self.require_at(condition, message, SourcePosition::default());
    }

    /// Report `message` at `position` unless `condition` holds.
    pub fn require_at(&self, condition: bool, message: &str, position: SourcePosition) {
        if !condition {
            self.diagnostics.borrow_mut().report(position, message);
        }
    }

    /// Whether anything was reported since these services were created.
    pub fn produced_diagnostics(&self) -> bool {
        self.diagnostics.borrow().total_reported() > self.reported_at_start
    }

    /// Compile one synthesized declaration.
    ///
    /// The text becomes a new generated-source record, its tokens are
    /// appended to the generated-token buffer, and the declaration is parsed
    /// into the tree as a detached node. Lexer and parser errors go to the
    /// shared sink and yield `None`.
    ///
    /// # Panics
    ///
    /// Panics unless `source` holds exactly one top-level declaration.
    pub fn parse_statement(&self, source: &str) -> Option<DeclId> {
        let lines = split_lines(source, LineCategory::Generated);
        let text = join_lines(&lines);
        let record = self.generated.borrow_mut().add_record(lines);
        let lexed = Lexer::lex(&text, SourceOrigin::Generated(record));

        assert!(
            lexed.groups.len() == 1,
            "a generated fragment must hold exactly one declaration, found {} in {source:?}",
            lexed.groups.len()
        );

        let range = self
            .generated
            .borrow_mut()
            .extend_tokens(lexed.tokens.iter().cloned());
        log::debug!(
            "compiled generated record #{record} into {} tokens (buffer {range:?})",
            lexed.tokens.len()
        );

        {
            let mut sink = self.diagnostics.borrow_mut();
            for err in &lexed.errors {
                sink.report(err.position, err.to_string());
            }
        }

        let group = lexed.group_tokens(&lexed.groups[0]);
        let mut tree = self.tree.borrow_mut();
        let mark = tree.mark();
        match parse_one_declaration(group, &lexed.text, &mut tree) {
            Ok(id) if lexed.errors.is_empty() => Some(id),
            Ok(_) => {
                tree.truncate(mark);
                None
            }
            Err(err) => {
                log::debug!("generated record #{record} failed to parse: {err}");
                self.diagnostics.borrow_mut().push(err.to_diagnostic());
                None
            }
        }
    }

    pub(crate) fn tree(&self) -> Ref<'a, SyntaxTree> {
        self.tree.borrow()
    }

    pub(crate) fn tree_mut(&self) -> RefMut<'a, SyntaxTree> {
        self.tree.borrow_mut()
    }
}
