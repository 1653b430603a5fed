//! Compiler Services and reflective view tests.

use cpp2_common::span::{SourceOrigin, SourcePosition};
use cpp2_meta::{
    render_diagnostic, CompilationUnit, Declaration, DiagnosticOptions, FunctionDeclaration,
    TypeDeclaration,
};
use cpp2_parser::{Accessibility, DeclaredThatFunctions};

const SAMPLE: &str = "\
t: type = {
    operator=: (out this, that) = { }
    operator=: (inout this, move that) = { }
    private f: (this, out r: int);
    public g: (virtual this);
    c: const int = 1;
    w := 2;
    u: type = { }
}
_: int = 0;
";

// ── parse_statement ────────────────────────────────────────────────────

#[test]
fn parse_statement_round_trip() {
    let unit = CompilationUnit::parse("");
    let services = unit.services();

    let cases = [
        ("f: (x: int) -> int = x;", "f"),
        ("x: const int = 1;", "x"),
        ("t: type = { }", "t"),
        ("n: namespace = { }", "n"),
        ("a: type == int;", "a"),
    ];
    for (fragment, name) in cases {
        let id = services
            .parse_statement(fragment)
            .unwrap_or_else(|| panic!("{fragment:?} should parse"));
        let d = Declaration::new(id, &services);
        assert_eq!(d.name(), name);
        assert!(d.is_global());
    }

    // fragments stay detached until someone attaches them
    assert!(unit.tree().roots().is_empty());
    assert_eq!(unit.tree().len(), 5);
    assert_eq!(unit.generated().record_count(), 5);
    assert!(!services.produced_diagnostics());
}

#[test]
fn parse_statement_kinds() {
    let unit = CompilationUnit::parse("");
    let services = unit.services();
    let kind_of = |fragment: &str| {
        let id = services.parse_statement(fragment).unwrap();
        let d = Declaration::new(id, &services);
        (
            d.is_function(),
            d.is_object(),
            d.is_type(),
            d.is_namespace(),
            d.is_alias(),
        )
    };
    assert_eq!(kind_of("f: () = { }"), (true, false, false, false, false));
    assert_eq!(kind_of("x := 1;"), (false, true, false, false, false));
    assert_eq!(kind_of("t: type = { }"), (false, false, true, false, false));
    assert_eq!(kind_of("n: namespace = { }"), (false, false, false, true, false));
    assert_eq!(kind_of("a: type == int;"), (false, false, false, false, true));
}

#[test]
fn multi_line_fragment_keeps_generated_positions() {
    let unit = CompilationUnit::parse("");
    let services = unit.services();
    let id = services
        .parse_statement("g: (this)\n    = {\n    }")
        .unwrap();
    let d = Declaration::new(id, &services);
    assert_eq!(
        d.position(),
        SourcePosition::new(SourceOrigin::Generated(0), 1, 1)
    );
    assert_eq!(unit.generated().record(0).unwrap().len(), 3);
    assert_eq!(unit.generated().tokens().len(), 8);
}

#[test]
fn failed_fragment_reports_and_returns_none() {
    let unit = CompilationUnit::parse("");
    let services = unit.services();
    assert!(services.parse_statement("x: int").is_none());
    assert!(services.produced_diagnostics());

    let diags = unit.diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(
        diags.as_slice()[0].to_string(),
        "<generated #0>:1:7: error: expected '=' or ';' after the object type, found end of declaration"
    );
    assert!(unit.tree().is_empty());
}

#[test]
fn fragment_with_lex_errors_leaves_the_tree_unchanged() {
    let unit = CompilationUnit::parse("t: type = { }");
    let services = unit.services();
    assert_eq!(unit.tree().len(), 1);

    assert!(services.parse_statement("f: (this) = { $ }").is_none());
    assert_eq!(unit.tree().len(), 1);

    let t = TypeDeclaration::new(unit.tree().roots()[0], &services);
    assert!(!t.add_member("g: (this) = { $ }"));
    assert_eq!(unit.tree().len(), 1);
    assert!(t.get_members().is_empty());
    assert_eq!(unit.diagnostics().len(), 2);
}

#[test]
#[should_panic(expected = "exactly one declaration")]
fn two_declarations_in_a_fragment_is_a_contract_violation() {
    let unit = CompilationUnit::parse("");
    unit.services().parse_statement("a: int; b: int;");
}

#[test]
fn require_only_reports_failures() {
    let unit = CompilationUnit::parse("");
    let services = unit.services();
    services.require(true, "never");
    assert!(!services.produced_diagnostics());
    services.require(false, "always");
    let diags = unit.diagnostics();
    assert_eq!(diags.as_slice()[0].message, "always");
    assert!(diags.as_slice()[0].position.is_unknown());
}

#[test]
fn produced_diagnostics_counts_across_a_drain() {
    let unit = CompilationUnit::parse("");
    let services = unit.services();
    services.require(false, "old one");
    assert_eq!(unit.drain_diagnostics().len(), 1);

    let services = unit.services();
    assert!(!services.produced_diagnostics());
    services.require(false, "new one");
    assert!(services.produced_diagnostics());
    assert_eq!(unit.diagnostics().len(), 1);
}

// ── Views ──────────────────────────────────────────────────────────────

#[test]
fn member_enumeration_by_kind() {
    let unit = CompilationUnit::parse(SAMPLE);
    assert!(unit.diagnostics().is_empty());
    let services = unit.services();
    let t = TypeDeclaration::new(unit.tree().roots()[0], &services);

    assert_eq!(t.get_member_functions().len(), 4);
    assert_eq!(t.get_member_objects().len(), 2);
    assert_eq!(t.get_member_types().len(), 1);
    assert_eq!(t.get_members().len(), 7);
    assert!(t.is_polymorphic());
    assert!(t.is_global());
    assert!(t.meta_functions().is_empty());

    for m in t.get_members() {
        assert!(m.parent_is_type());
        assert!(m.parent_is_polymorphic());
        assert!(!m.parent_is_namespace());
        assert!(!m.is_global());
    }
}

#[test]
fn member_lists_are_snapshots() {
    let unit = CompilationUnit::parse(SAMPLE);
    let services = unit.services();
    let t = TypeDeclaration::new(unit.tree().roots()[0], &services);

    let before = t.get_members();
    assert!(t.add_member("h: (this);"));
    assert_eq!(before.len(), 7);
    assert_eq!(t.get_members().len(), 8);
    assert!(t.get_members()[7].has_name_eq("h"));

    assert!(!t.add_member("k: (this)"), "missing ';' must not parse");
    assert_eq!(t.get_members().len(), 8);
}

#[test]
fn function_queries() {
    let unit = CompilationUnit::parse(SAMPLE);
    let services = unit.services();
    let t = TypeDeclaration::new(unit.tree().roots()[0], &services);
    let fns = t.get_member_functions();

    let copy = fns[0];
    assert!(copy.is_constructor() && copy.is_constructor_with_in_that());
    assert!(copy.is_copy_or_move());
    assert_eq!(
        copy.query_declared_that_functions(),
        DeclaredThatFunctions {
            out_this_in_that: true,
            out_this_move_that: false,
            inout_this_in_that: false,
            inout_this_move_that: true,
        }
    );

    let move_assign = fns[1];
    assert!(move_assign.is_assignment_with_move_that());
    assert!(move_assign.has_move_parameter_named("that"));

    let f = fns[2];
    assert!(f.has_this());
    assert_eq!(f.index_of_parameter_named("r"), Some(1));
    assert_eq!(f.index_of_parameter_named("q"), None);
    assert!(f.has_out_parameter_named("r"));
    assert!(!f.has_in_parameter_named("r"));
    assert!(f.has_in_parameter_named("this"));
    assert!(!f.is_virtual());
    assert!(f.make_function_virtual());
    assert!(f.is_virtual());

    let g = fns[3];
    assert!(g.is_virtual() && g.is_public());
    assert!(!g.is_destructor() && !g.is_constructor() && !g.is_assignment());
}

#[test]
fn access_requests_follow_node_policy() {
    let unit = CompilationUnit::parse(SAMPLE);
    let services = unit.services();
    let t = TypeDeclaration::new(unit.tree().roots()[0], &services);
    let fns = t.get_member_functions();

    let f = fns[2];
    assert!(f.is_private());
    assert!(!f.make_public());
    assert!(f.make_private());
    assert_eq!(f.access(), Accessibility::Private);

    let copy = fns[0];
    assert!(copy.is_default_access() && copy.is_public());
    assert!(copy.make_protected());
    assert!(copy.is_protected());
    assert!(!copy.make_public());
}

#[test]
fn object_queries() {
    let unit = CompilationUnit::parse(SAMPLE);
    let services = unit.services();
    let t = TypeDeclaration::new(unit.tree().roots()[0], &services);
    let objects = t.get_member_objects();

    let c = objects[0];
    assert!(c.is_const() && !c.has_wildcard_type());
    assert!(c.has_initializer());
    assert!(c.is_private(), "objects in a type default to private");

    let w = objects[1];
    assert!(w.has_wildcard_type() && !w.is_const());
}

#[test]
fn unnamed_declaration_has_empty_name() {
    let unit = CompilationUnit::parse(SAMPLE);
    let services = unit.services();
    let d = Declaration::new(unit.tree().roots()[1], &services);
    assert!(!d.has_name());
    assert_eq!(d.name(), "");
    assert!(d.is_object() && d.is_global());
    assert!(d.is_public());
    assert!(!d.parent_is_type());
}

#[test]
fn downcasts_build_specialized_views() {
    let unit = CompilationUnit::parse(SAMPLE);
    let services = unit.services();
    let t = TypeDeclaration::new(unit.tree().roots()[0], &services);
    let members = t.get_members();
    assert!(members[0].as_function().is_constructor());
    assert!(members[4].as_object().is_const());
    assert!(members[6].as_type().get_members().is_empty());
}

#[test]
#[should_panic(expected = "is not a function declaration")]
fn view_over_wrong_kind_panics() {
    let unit = CompilationUnit::parse(SAMPLE);
    let services = unit.services();
    let root = unit.tree().roots()[0];
    FunctionDeclaration::new(root, &services);
}

// ── Rendering ──────────────────────────────────────────────────────────

#[test]
fn renders_authored_and_generated_positions() {
    let unit = CompilationUnit::parse("t: @nope type = { }");
    unit.apply_meta_functions();
    unit.services().parse_statement("x: int");

    let diags = unit.diagnostics();
    let generated = unit.generated();
    let options = DiagnosticOptions::colorless();

    let authored = render_diagnostic(&diags.as_slice()[0], unit.source(), &generated, "t.cpp2", &options);
    assert!(authored.contains("unrecognized meta function name 'nope'"));
    assert!(authored.contains("in t.cpp2"));

    let synthesized = render_diagnostic(&diags.as_slice()[1], unit.source(), &generated, "t.cpp2", &options);
    assert!(synthesized.contains("in <generated #0>"));
    assert!(synthesized.contains("x: int"));

    let json = DiagnosticOptions {
        color: false,
        json: true,
    };
    let line = render_diagnostic(&diags.as_slice()[1], unit.source(), &generated, "t.cpp2", &json);
    assert!(line.ends_with("\"generated\":0}\n"));
}

#[test]
fn renders_label_after_non_ascii_text() {
    let unit = CompilationUnit::parse("// h\u{e9}llo w\u{f6}rld \u{fc}n\u{ef}code\nx: int = $;");
    let diags = unit.diagnostics();
    let generated = unit.generated();
    let first = &diags.as_slice()[0];
    assert_eq!(first.message, "unexpected character: '$'");

    let out = render_diagnostic(first, unit.source(), &generated, "u.cpp2", &DiagnosticOptions::colorless());
    assert!(out.contains("x: int = $;"), "no source snippet in:\n{out}");
    assert!(out.contains("in u.cpp2"));
}
