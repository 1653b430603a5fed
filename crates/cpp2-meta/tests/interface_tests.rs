//! `@interface` and dispatcher behaviour on whole compilation units.

use cpp2_common::span::SourceOrigin;
use cpp2_meta::CompilationUnit;
use insta::assert_snapshot;

/// Parse `source` (which must be free of syntax errors) and run the
/// meta-function pass once.
fn run(source: &str) -> CompilationUnit {
    let unit = CompilationUnit::parse(source);
    assert!(
        unit.diagnostics().is_empty(),
        "unexpected parse diagnostics: {:?}",
        unit.diagnostics().as_slice()
    );
    unit.apply_meta_functions();
    unit
}

fn messages(unit: &CompilationUnit) -> Vec<String> {
    unit.diagnostics().iter().map(|d| d.message.clone()).collect()
}

fn rendered(unit: &CompilationUnit) -> String {
    unit.diagnostics()
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn member_count(unit: &CompilationUnit, root: usize) -> usize {
    let tree = unit.tree();
    tree.node(tree.roots()[root]).members().len()
}

// ── Concrete scenario ──────────────────────────────────────────────────

#[test]
fn shape_with_body_and_data_member() {
    let unit = run("shape: @interface type = {\n    draw: (this) = { ... }\n    x: int;\n}");

    assert_snapshot!(rendered(&unit), @r"
    2:5: error: interface functions must not have a function body; remove the '=' initializer
    3:5: error: interfaces may not contain data objects
    ");
    assert_snapshot!(unit.print(), @r"
    shape: @interface type = {
        public draw: (virtual this) = { ... }
        x: int;
        operator=: (virtual move this) = { }
    }
    ");
}

// ── Properties ─────────────────────────────────────────────────────────

#[test]
fn data_members_are_flagged_not_removed() {
    let unit = run("i: @interface type = {\n    a: int;\n    b: std::string = \"\";\n    f: (this);\n}");
    let msgs = messages(&unit);
    assert_eq!(
        msgs.iter()
            .filter(|m| m.contains("may not contain data objects"))
            .count(),
        2
    );
    // a, b, f plus the synthesized destructor
    assert_eq!(member_count(&unit, 0), 4);
}

#[test]
fn empty_interface_gets_exactly_a_virtual_destructor() {
    let unit = run("i: @interface type = { }");
    assert!(messages(&unit).is_empty());
    assert_eq!(member_count(&unit, 0), 1);

    let tree = unit.tree();
    let dtor = tree.node(tree.node(tree.roots()[0]).members()[0]);
    assert!(dtor.is_destructor());
    assert!(dtor.is_virtual());
    assert!(matches!(dtor.position.origin, SourceOrigin::Generated(0)));
}

#[test]
fn function_with_body_is_still_made_virtual() {
    let unit = run("i: @interface type = {\n    f: (this) -> int = 42;\n}");
    assert_eq!(
        messages(&unit),
        ["interface functions must not have a function body; remove the '=' initializer"]
    );
    let tree = unit.tree();
    let f = tree.node(tree.node(tree.roots()[0]).members()[0]);
    assert!(f.is_virtual());
}

#[test]
fn non_public_function_is_reported_and_still_made_virtual() {
    let unit = run("i: @interface type = {\n    private f: (this);\n}");
    assert_eq!(messages(&unit), ["interface functions must be public"]);
    let tree = unit.tree();
    let f = tree.node(tree.node(tree.roots()[0]).members()[0]);
    assert!(f.is_virtual());
}

#[test]
fn copy_and_move_operations_are_rejected() {
    let unit = run(
        "i: @interface type = {\n    operator=: (out this, that);\n    operator=: (inout this, move that);\n}",
    );
    let msgs = messages(&unit);
    assert_eq!(
        msgs,
        [
            "interfaces may not copy or move; consider a virtual clone() instead",
            "interfaces may not copy or move; consider a virtual clone() instead",
        ]
    );
}

#[test]
fn existing_destructor_suppresses_synthesis() {
    let unit = run("i: @interface type = {\n    operator=: (move this);\n    f: (this);\n}");
    assert!(messages(&unit).is_empty());
    assert_eq!(member_count(&unit, 0), 2);
    assert_eq!(unit.generated().record_count(), 0);

    let tree = unit.tree();
    let dtor = tree.node(tree.node(tree.roots()[0]).members()[0]);
    assert!(dtor.is_virtual(), "the user's destructor is made virtual too");
}

#[test]
fn second_application_does_not_add_another_destructor() {
    let unit = run("i: @interface type = {\n    f: (this);\n}");
    assert!(messages(&unit).is_empty());
    assert_eq!(member_count(&unit, 0), 2);

    // The synthesized destructor has a body, so a second run flags it, but
    // it still counts as the type's destructor.
    unit.apply_meta_functions();
    assert_eq!(member_count(&unit, 0), 2);
    assert_eq!(
        messages(&unit),
        ["interface functions must not have a function body; remove the '=' initializer"]
    );
    assert_eq!(unit.generated().record_count(), 1);
}

// ── Dispatch ───────────────────────────────────────────────────────────

#[test]
fn unknown_name_stops_remaining_annotations() {
    let unit = CompilationUnit::parse("t: @shape @interface type = {\n    x: int;\n}");
    let report = unit.apply_meta_functions();

    assert_eq!(report.processed, 1);
    assert!(!report.is_success());
    assert_snapshot!(
        rendered(&unit),
        @"1:1: error: unrecognized meta function name 'shape' - currently only unqualified 'interface' is supported"
    );
    // `interface` never ran: no data-object diagnostic, no destructor.
    assert_eq!(member_count(&unit, 0), 1);
}

#[test]
fn qualified_name_is_unknown() {
    let unit = CompilationUnit::parse("t: @cpp2::interface type = { }");
    let report = unit.apply_meta_functions();
    assert_eq!(report.failed.len(), 1);
    assert_eq!(
        messages(&unit),
        ["unrecognized meta function name 'cpp2::interface' - currently only unqualified 'interface' is supported"]
    );
}

#[test]
fn one_failing_type_does_not_block_others() {
    let unit = CompilationUnit::parse("a: @bogus type = { }\nb: @interface type = { }");
    let report = unit.apply_meta_functions();

    assert_eq!(report.processed, 2);
    let tree = unit.tree();
    assert_eq!(report.failed, [tree.roots()[0]]);
    assert_eq!(tree.node(tree.roots()[1]).members().len(), 1);
}

#[test]
fn nested_types_run_before_their_parent() {
    let unit = run("outer: @interface type = {\n    inner: @interface type = { }\n}");
    assert!(messages(&unit).is_empty());

    let tree = unit.tree();
    let outer = tree.node(tree.roots()[0]);
    let inner_id = outer.members()[0];
    let inner_dtor = tree.node(tree.node(inner_id).members()[0]);
    let outer_dtor = tree.node(outer.members()[1]);
    assert_eq!(inner_dtor.position.origin, SourceOrigin::Generated(0));
    assert_eq!(outer_dtor.position.origin, SourceOrigin::Generated(1));
}

#[test]
fn unannotated_types_are_left_alone() {
    let unit = CompilationUnit::parse("t: type = { x: int; }");
    let report = unit.apply_meta_functions();
    assert_eq!(report.processed, 0);
    assert!(report.is_success());
    assert_eq!(member_count(&unit, 0), 1);
}

#[test]
fn syntax_errors_skip_only_the_broken_declaration() {
    let unit = CompilationUnit::parse("bad: @interface (this);\ni: @interface type = { }");
    assert_eq!(
        messages(&unit),
        ["meta functions may only be applied to type declarations"]
    );
    let report = unit.apply_meta_functions();
    assert_eq!(report.processed, 1);
    assert_eq!(member_count(&unit, 0), 1);
}

#[test]
fn drain_hands_over_everything() {
    let unit = run("i: @interface type = { x: int; }");
    let drained = unit.drain_diagnostics();
    assert_eq!(drained.len(), 1);
    assert!(unit.diagnostics().is_empty());
}
