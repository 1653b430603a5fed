//! Render declarations back to Cpp2 source.
//!
//! Output is normalized rather than lossless: one declaration per line,
//! four-space indentation for members, initializers reproduced verbatim.

use std::fmt::Write;

use crate::tree::{AliasOf, DeclId, DeclKind, InitializerKind, Parameter, SyntaxTree};

const INDENT: &str = "    ";

/// Render one declaration (and its members) as source text.
pub fn print_declaration(tree: &SyntaxTree, id: DeclId) -> String {
    let mut out = String::new();
    write_declaration(tree, id, 0, &mut out);
    out
}

/// Render every file-scope declaration, one after another.
pub fn print_tree(tree: &SyntaxTree) -> String {
    let mut out = String::new();
    for &root in tree.roots() {
        write_declaration(tree, root, 0, &mut out);
    }
    out
}

fn write_declaration(tree: &SyntaxTree, id: DeclId, depth: usize, out: &mut String) {
    let node = tree.node(id);
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    if let Some(access) = node.access.keyword() {
        out.push_str(access);
        out.push(' ');
    }
    out.push_str(node.name.as_deref().unwrap_or("_"));
    out.push(':');

    match &node.kind {
        DeclKind::Function(sig) => {
            out.push_str(" (");
            let params: Vec<String> = sig.params.iter().map(parameter).collect();
            out.push_str(&params.join(", "));
            out.push(')');
            if let Some(returns) = &sig.returns {
                let _ = write!(out, " -> {returns}");
            }
        }
        DeclKind::Object { ty, is_const } => {
            if *is_const {
                out.push_str(" const");
            }
            let _ = write!(out, " {}", ty.as_deref().unwrap_or("_"));
        }
        DeclKind::Type {
            members,
            meta_functions,
        } => {
            for meta in meta_functions {
                let _ = write!(out, " @{meta}");
            }
            out.push_str(" type = ");
            write_members(tree, members, depth, out);
            return;
        }
        DeclKind::Namespace { members } => {
            out.push_str(" namespace = ");
            write_members(tree, members, depth, out);
            return;
        }
        DeclKind::Alias { of, target } => {
            match of {
                AliasOf::Type => out.push_str(" type"),
                AliasOf::Namespace => out.push_str(" namespace"),
                AliasOf::Object(Some(ty)) => {
                    let _ = write!(out, " {ty}");
                }
                AliasOf::Object(None) => {}
            }
            let _ = writeln!(out, " == {target};");
            return;
        }
    }

    match &node.initializer {
        Some(init) => match init.kind {
            InitializerKind::Block => {
                let _ = writeln!(out, " = {}", init.text);
            }
            InitializerKind::Expr => {
                let _ = writeln!(out, " = {};", init.text);
            }
        },
        None => out.push_str(";\n"),
    }
}

fn write_members(tree: &SyntaxTree, members: &[DeclId], depth: usize, out: &mut String) {
    if members.is_empty() {
        out.push_str("{ }\n");
        return;
    }
    out.push_str("{\n");
    for &member in members {
        write_declaration(tree, member, depth + 1, out);
    }
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str("}\n");
}

fn parameter(param: &Parameter) -> String {
    let mut text = String::new();
    if let Some(spec) = param.this_spec {
        text.push_str(spec.keyword());
        text.push(' ');
    }
    if let Some(pass) = param.pass {
        text.push_str(pass.keyword());
        text.push(' ');
    }
    text.push_str(&param.name);
    if let Some(ty) = &param.ty {
        let _ = write!(text, ": {ty}");
    }
    if let Some(default) = &param.default {
        let _ = write!(text, " = {default}");
    }
    text
}
