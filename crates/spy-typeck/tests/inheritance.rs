//! Integration tests for the declaration collector and inheritance linker.
//!
//! These exercise base resolution (`extends`/`implements`), cycle
//! detection over the combined relation, MRO computation, override tables,
//! and the interface closure.

use spy_typeck::error::CheckError;
use spy_typeck::CheckResult;

// ── Helpers ────────────────────────────────────────────────────────────

/// Parse Spy source and run semantic analysis. The source must be
/// syntactically valid; only semantic diagnostics are under test here.
fn check_source(src: &str) -> CheckResult {
    let parse = spy_parser::parse(src);
    assert!(
        parse.errors().is_empty() && parse.lex_errors().is_empty(),
        "unexpected syntax errors: {:?} {:?}",
        parse.errors(),
        parse.lex_errors()
    );
    spy_typeck::check(&parse)
}

/// Assert that the result contains an error matching the given predicate.
fn assert_has_error<F: Fn(&CheckError) -> bool>(result: &CheckResult, pred: F, desc: &str) {
    assert!(
        result.errors.iter().any(|e| pred(e)),
        "expected error matching `{}`, got errors: {:?}",
        desc,
        result.errors
    );
}

fn assert_clean(result: &CheckResult) {
    assert!(
        result.diagnostics.is_empty(),
        "expected no diagnostics, got: {:?}",
        result.diagnostics
    );
}

fn codes(result: &CheckResult) -> Vec<&'static str> {
    result.diagnostics.iter().map(|d| d.code).collect()
}

// ── Base Resolution ────────────────────────────────────────────────────

#[test]
fn unresolved_base_class() {
    let result = check_source("class C extends Missing {}");
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::UnresolvedBase { name, .. } if name == "Missing"),
        "UnresolvedBase(Missing)",
    );
}

#[test]
fn unresolved_interface() {
    let result = check_source("class C implements Nowhere {}");
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::UnresolvedBase { name, .. } if name == "Nowhere"),
        "UnresolvedBase(Nowhere)",
    );
}

#[test]
fn class_extends_interface_is_rejected() {
    let result = check_source("interface I {} class C extends I {}");
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::ExtendsNonClass { class, base, .. } if class == "C" && base == "I"),
        "ExtendsNonClass",
    );
}

#[test]
fn interface_extends_class_is_rejected() {
    let result = check_source("class C {} interface I extends C {}");
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::ExtendsNonInterface { interface, base, .. } if interface == "I" && base == "C"),
        "ExtendsNonInterface",
    );
}

#[test]
fn class_implements_class_is_rejected() {
    let result = check_source("class Base {} class C implements Base {}");
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::ImplementsNonInterface { base, .. } if base == "Base"),
        "ImplementsNonInterface",
    );
}

#[test]
fn extends_final_class() {
    let result = check_source("final class F {} class G extends F {}");
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::ExtendsFinalClass { class, base, .. } if class == "G" && base == "F"),
        "ExtendsFinalClass",
    );
}

#[test]
fn duplicate_type_declaration() {
    let result = check_source("class A {} interface A {}");
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::DuplicateDeclaration { name, .. } if name == "A"),
        "DuplicateDeclaration",
    );
}

#[test]
fn duplicate_member_declaration() {
    let result = check_source("class A { def m() { pass; } def m() { pass; } }");
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::DuplicateDeclaration { name, .. } if name == "m"),
        "DuplicateDeclaration(member)",
    );
}

// ── Cycles ─────────────────────────────────────────────────────────────

#[test]
fn class_cycle_is_reported_and_analysis_survives() {
    let result = check_source("class A extends B {} class B extends A {} class C {} x = C();");
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::InheritanceCycle { path, .. } if path.contains(&"A".to_string())),
        "InheritanceCycle",
    );
    // Downstream passes ran: the unrelated class C checked without panic.
    assert!(codes(&result).iter().all(|c| *c == "InheritanceCycle"));
}

#[test]
fn interface_self_loop() {
    let result = check_source("interface I extends I {}");
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::InheritanceCycle { .. }),
        "InheritanceCycle(self)",
    );
}

#[test]
fn mixed_relation_cycle() {
    // A -> (implements) I, I -> (extends) J, J declared after; no cycle.
    // Then make it cyclic via class extends.
    let result = check_source("class A extends A {}");
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::InheritanceCycle { .. }),
        "InheritanceCycle(self class)",
    );
}

// ── MRO, Override Table, Interface Closure ─────────────────────────────

#[test]
fn mro_is_the_parent_chain() {
    let result = check_source(
        "class A { def m() { pass; } }
         class B extends A { def m() { pass; } }
         class C extends B {}",
    );
    assert_clean(&result);
    let graph = &result.graph;
    let c = graph.resolve("C").unwrap();
    let names: Vec<&str> = graph
        .class(c)
        .unwrap()
        .mro
        .iter()
        .map(|id| graph.name_of(*id))
        .collect();
    assert_eq!(names, vec!["C", "B", "A"]);
}

#[test]
fn override_table_picks_most_derived() {
    let result = check_source(
        "class A { def m() { pass; } }
         class B extends A { def m() { pass; } }
         class C extends B {}",
    );
    let graph = &result.graph;
    let c = graph.resolve("C").unwrap();
    let b = graph.resolve("B").unwrap();
    let mref = graph.method_on(c, "m").expect("m resolves on C");
    assert_eq!(mref.owner, b, "B.m shadows A.m for C instances");
}

#[test]
fn interface_closure_includes_extended_interfaces() {
    let result = check_source(
        "interface Base { def f() -> int; }
         interface Child extends Base { def g() -> int; }
         class C implements Child {
             def f() -> int { return 1; }
             def g() -> int { return 2; }
         }",
    );
    assert_clean(&result);
    let graph = &result.graph;
    let c = graph.resolve("C").unwrap();
    let base = graph.resolve("Base").unwrap();
    let child = graph.resolve("Child").unwrap();
    assert!(graph.implements(c, child));
    assert!(graph.implements(c, base), "satisfying the child satisfies all ancestors");
}

#[test]
fn inherited_implements_propagates_to_subclasses() {
    let result = check_source(
        "interface I { def f() -> int; }
         class P implements I { def f() -> int { return 1; } }
         class C extends P {}",
    );
    assert_clean(&result);
    let graph = &result.graph;
    let c = graph.resolve("C").unwrap();
    let i = graph.resolve("I").unwrap();
    assert!(graph.implements(c, i));
}

#[test]
fn still_abstract_tracks_interface_requirements_through_chain() {
    let result = check_source(
        "interface I { def f() -> int; }
         abstract class P implements I {}
         class C extends P {}",
    );
    // P is abstract, so it may leave f unimplemented; C may not.
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::ConcreteClassHasAbstractMembers { class, missing, .. }
            if class == "C" && missing == &vec!["f".to_string()]),
        "ConcreteClassHasAbstractMembers(C, [f])",
    );
    assert!(
        !result
            .errors
            .iter()
            .any(|e| matches!(e, CheckError::ConcreteClassHasAbstractMembers { class, .. } if class == "P")),
        "abstract P is exempt from rule 1b"
    );
}

// ── Properties ─────────────────────────────────────────────────────────

#[test]
fn checking_is_idempotent() {
    let src = "final class F {} class G extends F { def m() { return q; } }";
    let parse = spy_parser::parse(src);
    let first = spy_typeck::check(&parse);
    let second = spy_typeck::check(&parse);
    assert_eq!(first.diagnostics, second.diagnostics);
}

#[test]
fn diagnostics_are_monotonic_under_additions() {
    let base = "final class F {}\nclass G extends F {}\n";
    let extended = format!("{base}class H {{ def m() {{ return nowhere; }} }}\n");

    let before = check_source(base);
    let after = check_source(&extended);

    for diag in &before.diagnostics {
        assert!(
            after
                .diagnostics
                .iter()
                .any(|d| d.code == diag.code && d.message == diag.message),
            "diagnostic lost after adding unrelated code: {diag:?}"
        );
    }
    assert!(after.diagnostics.len() > before.diagnostics.len());
}
