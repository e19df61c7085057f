//! Integration tests for the modifier checker: abstract, final, static,
//! interface, and constructor discipline, plus name resolution.
//!
//! The first five tests are the end-to-end diagnostic scenarios from the
//! language's acceptance suite, verbatim.

use spy_typeck::error::CheckError;
use spy_typeck::CheckResult;

// ── Helpers ────────────────────────────────────────────────────────────

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

// ── Acceptance Scenarios ───────────────────────────────────────────────

/// Scenario 1: a concrete subclass implementing the abstract method is clean.
#[test]
fn scenario_1_concrete_override_is_clean() {
    let result = check_source(
        "abstract class A { abstract def m() -> int; } \
         class B extends A { def m() -> int { return 1; } } \
         B().m();",
    );
    assert_clean(&result);
}

/// Scenario 2: the subclass misses the abstract method; instantiating it is
/// NOT additionally flagged because B itself is concrete (just invalid).
#[test]
fn scenario_2_missing_abstract_member() {
    let result = check_source(
        "abstract class A { abstract def m() -> int; } \
         class B extends A {} \
         B();",
    );
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::ConcreteClassHasAbstractMembers { class, missing, .. }
            if class == "B" && missing == &vec!["m".to_string()]),
        "ConcreteClassHasAbstractMembers(B, [m])",
    );
    assert!(
        !codes(&result).contains(&"AbstractInstantiation"),
        "B is concrete; instantiating it is not AbstractInstantiation"
    );
}

/// Scenario 3: extending a final class.
#[test]
fn scenario_3_extends_final() {
    let result = check_source("final class F {} class G extends F {}");
    assert_eq!(codes(&result), vec!["ExtendsFinalClass"]);
}

/// Scenario 4: overriding a final method.
#[test]
fn scenario_4_override_of_final_method() {
    let result = check_source(
        "class P { final def m() -> int { return 1; } } \
         class C extends P { def m() -> int { return 2; } }",
    );
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::OverrideOfFinalMethod { method, class, base, .. }
            if method == "m" && class == "C" && base == "P"),
        "OverrideOfFinalMethod(C.m over P.m)",
    );
}

/// Scenario 5: interface implementation with the wrong return type.
#[test]
fn scenario_5_interface_signature_mismatch() {
    let result = check_source(
        "interface I { def f() -> int; } \
         class K implements I { def f() -> str { return \"x\"; } }",
    );
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::OverrideSignatureMismatch { method, origin, .. }
            if method == "f" && origin.contains("interface `I`")),
        "OverrideSignatureMismatch(K.f vs I.f)",
    );
}

// ── Abstract Discipline ────────────────────────────────────────────────

#[test]
fn abstract_method_with_body() {
    let result = check_source("abstract class A { abstract def m() { return 1; } }");
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::AbstractMethodHasBody { method, .. } if method == "m"),
        "AbstractMethodHasBody",
    );
}

#[test]
fn abstract_method_in_concrete_class() {
    let result = check_source("class A { abstract def m(); }");
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::AbstractMethodOutsideAbstractClass { method, class, .. }
            if method == "m" && class == "A"),
        "AbstractMethodOutsideAbstractClass",
    );
}

#[test]
fn abstract_instantiation_of_truly_abstract_class() {
    let result = check_source("abstract class A { abstract def m(); } x = A();");
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::AbstractInstantiation { class, .. } if class == "A"),
        "AbstractInstantiation(A)",
    );
}

#[test]
fn abstract_instantiation_inside_method_body() {
    let result = check_source(
        "abstract class A {} \
         class B { def make(self) { return A(); } }",
    );
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::AbstractInstantiation { class, .. } if class == "A"),
        "AbstractInstantiation in body",
    );
}

#[test]
fn abstract_chain_through_abstract_intermediate() {
    // The abstract intermediate may leave m open; the concrete leaf must not.
    let result = check_source(
        "abstract class A { abstract def m() -> int; } \
         abstract class B extends A {} \
         class C extends B {}",
    );
    let offenders: Vec<&CheckError> = result
        .errors
        .iter()
        .filter(|e| matches!(e, CheckError::ConcreteClassHasAbstractMembers { .. }))
        .collect();
    assert_eq!(offenders.len(), 1, "only the concrete leaf is flagged: {offenders:?}");
}

// ── Final Discipline ───────────────────────────────────────────────────

#[test]
fn final_method_blocks_deep_override() {
    // m is final on the grandparent; the parent does not redefine it, the
    // grandchild does.
    let result = check_source(
        "class A { final def m() { pass; } } \
         class B extends A {} \
         class C extends B { def m() { pass; } }",
    );
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::OverrideOfFinalMethod { class, base, .. }
            if class == "C" && base == "A"),
        "OverrideOfFinalMethod through the chain",
    );
}

#[test]
fn abstract_and_final_method() {
    let result = check_source("abstract class A { abstract final def m(); }");
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::AbstractAndFinal { name, .. } if name == "m"),
        "AbstractAndFinal(method)",
    );
}

#[test]
fn abstract_and_final_class() {
    let result = check_source("abstract final class A {}");
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::AbstractAndFinal { name, .. } if name == "A"),
        "AbstractAndFinal(class)",
    );
}

#[test]
fn override_signature_mismatch_against_ancestor() {
    let result = check_source(
        "class P { def m(x: int) -> int { return x; } } \
         class C extends P { def m(x: str) -> int { return 1; } }",
    );
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::OverrideSignatureMismatch { method, origin, .. }
            if method == "m" && origin.contains("class `P`")),
        "OverrideSignatureMismatch vs ancestor",
    );
}

#[test]
fn unannotated_override_is_compatible() {
    let result = check_source(
        "class P { def m(x: int) -> int { return x; } } \
         class C extends P { def m(x) { return x; } }",
    );
    assert_clean(&result);
}

// ── Static Discipline ──────────────────────────────────────────────────

#[test]
fn static_cannot_be_abstract() {
    let result = check_source("abstract class A { abstract static def m(); }");
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::StaticCannotBeAbstract { name, .. } if name == "m"),
        "StaticCannotBeAbstract",
    );
}

#[test]
fn static_method_using_self() {
    let result = check_source(
        "class A { static def m() { return self.x; } }",
    );
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::StaticUsesSelf { method, keyword, .. }
            if method == "m" && *keyword == "self"),
        "StaticUsesSelf",
    );
}

#[test]
fn static_method_using_super() {
    let result = check_source(
        "class P { def m(self) { pass; } } \
         class A extends P { static def m2() { super.m(); } }",
    );
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::StaticUsesSelf { keyword, .. } if *keyword == "super"),
        "StaticUsesSelf(super)",
    );
}

#[test]
fn static_method_declaring_self_param() {
    let result = check_source("class A { static def m(self) { pass; } }");
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::StaticUsesSelf { keyword, .. } if *keyword == "self"),
        "StaticUsesSelf(param)",
    );
}

#[test]
fn static_shadowing_in_subclass_is_allowed() {
    let result = check_source(
        "class A { static def m() { return 1; } } \
         class B extends A { static def m() { return 2; } }",
    );
    assert_clean(&result);
}

// ── Interface Discipline ───────────────────────────────────────────────

#[test]
fn interface_method_with_body() {
    let result = check_source("interface I { def f() { return 1; } }");
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::InterfaceHasBody { interface, method, .. }
            if interface == "I" && method == "f"),
        "InterfaceHasBody",
    );
}

#[test]
fn interface_with_field() {
    let result = check_source("interface I { x = 1; }");
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::InterfaceHasField { interface, field, .. }
            if interface == "I" && field == "x"),
        "InterfaceHasField",
    );
}

#[test]
fn interface_with_static_member() {
    let result = check_source("interface I { static def f() -> int; }");
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::StaticCannotBeAbstract { name, .. } if name == "f"),
        "no interface can require a static member",
    );
}

#[test]
fn empty_interface_and_empty_class_are_valid() {
    let result = check_source("interface I {} class C implements I {} C();");
    assert_clean(&result);
}

// ── Constructor Discipline ─────────────────────────────────────────────

#[test]
fn constructor_cannot_carry_modifiers() {
    for (src, modifier) in [
        ("class A { static def __init__(self) { pass; } }", "static"),
        ("abstract class A { abstract def __init__(self); }", "abstract"),
        ("class A { final def __init__(self) { pass; } }", "final"),
    ] {
        let result = check_source(src);
        assert_has_error(
            &result,
            |e| matches!(e, CheckError::ConstructorHasModifier { modifier: m, .. } if m == &modifier),
            &format!("ConstructorHasModifier({modifier})"),
        );
    }
}

#[test]
fn missing_super_init_is_a_warning_for_arity_zero_parent() {
    let result = check_source(
        "class P { def __init__(self) { pass; } } \
         class C extends P { def __init__(self) { x = 1; } }",
    );
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::MissingSuperInit { class, parent_takes_args, .. }
            if class == "C" && !parent_takes_args),
        "MissingSuperInit warning",
    );
    assert!(!result.has_errors(), "arity-0 parent makes it a warning");
}

#[test]
fn missing_super_init_is_an_error_when_parent_takes_args() {
    let result = check_source(
        "class P { def __init__(self, n) { pass; } } \
         class C extends P { def __init__(self) { pass; } }",
    );
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::MissingSuperInit { parent_takes_args, .. } if *parent_takes_args),
        "MissingSuperInit error",
    );
    assert!(result.has_errors());
}

#[test]
fn leading_super_call_satisfies_the_rule() {
    let result = check_source(
        "class P { def __init__(self, n) { pass; } } \
         class C extends P { def __init__(self) { super(1); } }",
    );
    assert_clean(&result);
}

#[test]
fn no_parent_constructor_means_no_super_requirement() {
    let result = check_source(
        "class P {} \
         class C extends P { def __init__(self) { pass; } }",
    );
    assert_clean(&result);
}

// ── Name Resolution ────────────────────────────────────────────────────

#[test]
fn undefined_name_in_function_body() {
    let result = check_source("def f() { return missing_thing; }");
    assert_has_error(
        &result,
        |e| matches!(e, CheckError::UndefinedName { name, .. } if name == "missing_thing"),
        "UndefinedName",
    );
}

#[test]
fn builtins_and_assignments_resolve() {
    let result = check_source(
        "def f(n) { total = 0; for i in range(n) { total += i; } return total; } \
         print(f(3));",
    );
    assert_clean(&result);
}

#[test]
fn imported_time_module_resolves() {
    let result = check_source("import time; now = time.time(); print(now);");
    assert_clean(&result);
}

// ── Internal Names ─────────────────────────────────────────────────────

#[test]
fn underscore_names_are_recorded_but_not_diagnosed() {
    let result = check_source("class A { _hidden = 1; def _peek(self) { return 1; } }");
    assert_clean(&result);
    let names: Vec<&str> = result.internal_names.iter().map(|(n, _)| n.as_str()).collect();
    assert!(names.contains(&"_hidden"));
    assert!(names.contains(&"_peek"));
}

#[test]
fn dunder_init_is_not_recorded_as_internal() {
    let result = check_source("class A { def __init__(self) { pass; } } A();");
    assert_clean(&result);
    assert!(result.internal_names.is_empty());
}
