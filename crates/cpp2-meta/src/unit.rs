//! One compilation unit: authored source, its tree, diagnostics and
//! generated code, plus the driver-side meta-function pass.

use std::cell::{Ref, RefCell};

use cpp2_common::diagnostic::{Diagnostic, DiagnosticSink};
use cpp2_common::span::SourceOrigin;
use cpp2_lexer::Lexer;
use cpp2_parser::{parse_one_declaration, print_tree, DeclId, SyntaxTree};

use crate::generated::GeneratedSources;
use crate::registry::MetaFunctionRegistry;
use crate::services::CompilerServices;

/// Outcome of [`CompilationUnit::apply_meta_functions`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaReport {
    /// Annotated types the dispatcher ran on.
    pub processed: usize,
    /// Types whose dispatch failed, in processing order.
    pub failed: Vec<DeclId>,
}

impl MetaReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct CompilationUnit {
    source: String,
    tree: RefCell<SyntaxTree>,
    diagnostics: RefCell<DiagnosticSink>,
    generated: RefCell<GeneratedSources>,
    registry: MetaFunctionRegistry,
}

impl CompilationUnit {
    /// Lex and parse authored source.
    ///
    /// Each top-level declaration is parsed on its own; one that fails is
    /// reported and skipped without affecting the rest.
    pub fn parse(source: &str) -> Self {
        let lexed = Lexer::lex(source, SourceOrigin::Authored);
        let mut tree = SyntaxTree::new();
        let mut diagnostics = DiagnosticSink::new();

        for err in &lexed.errors {
            diagnostics.report(err.position, err.to_string());
        }
        for group in &lexed.groups {
            match parse_one_declaration(lexed.group_tokens(group), &lexed.text, &mut tree) {
                Ok(id) => tree.push_root(id),
                Err(err) => diagnostics.push(err.to_diagnostic()),
            }
        }
        log::debug!(
            "parsed {} top-level declarations ({} nodes, {} diagnostics)",
            tree.roots().len(),
            tree.len(),
            diagnostics.len()
        );

        Self {
            source: source.to_string(),
            tree: RefCell::new(tree),
            diagnostics: RefCell::new(diagnostics),
            generated: RefCell::new(GeneratedSources::new()),
            registry: MetaFunctionRegistry::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Fresh Compiler Services over this unit.
    pub fn services(&self) -> CompilerServices<'_> {
        CompilerServices::new(&self.tree, &self.diagnostics, &self.generated)
    }

    /// Run the meta-functions of every annotated type.
    ///
    /// Nested types go before their enclosing type and roots go in source
    /// order. The set of types is fixed up front, so members synthesized
    /// during the pass are not visited.
    pub fn apply_meta_functions(&self) -> MetaReport {
        let pending = {
            let tree = self.tree.borrow();
            let mut pending = Vec::new();
            for &root in tree.roots() {
                collect_annotated(&tree, root, &mut pending);
            }
            pending
        };

        let mut report = MetaReport::default();
        for ty in pending {
            let services = self.services();
            report.processed += 1;
            if !self.registry.apply_type_meta_functions(&services, ty) {
                report.failed.push(ty);
            }
        }
        report
    }

    pub fn tree(&self) -> Ref<'_, SyntaxTree> {
        self.tree.borrow()
    }

    pub fn diagnostics(&self) -> Ref<'_, DiagnosticSink> {
        self.diagnostics.borrow()
    }

    pub fn generated(&self) -> Ref<'_, GeneratedSources> {
        self.generated.borrow()
    }

    /// Hand every diagnostic to the driver, leaving the sink empty.
    pub fn drain_diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow_mut().drain()
    }

    /// The current tree printed back as source.
    pub fn print(&self) -> String {
        print_tree(&self.tree.borrow())
    }
}

fn collect_annotated(tree: &SyntaxTree, id: DeclId, out: &mut Vec<DeclId>) {
    let node = tree.node(id);
    for &member in node.members() {
        collect_annotated(tree, member, out);
    }
    if node.is_type() && !node.meta_functions().is_empty() {
        out.push(id);
    }
}
