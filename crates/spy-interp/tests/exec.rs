//! Execution tests: parse, check, run, and assert captured output.

use spy_interp::RuntimeErrorKind;

/// Run a program and return its stdout. Panics on any compile diagnostic
/// or runtime error.
fn run_program(src: &str) -> String {
    let parse = spy_parser::parse(src);
    assert!(
        parse.errors().is_empty() && parse.lex_errors().is_empty(),
        "syntax errors: {:?} {:?}",
        parse.errors(),
        parse.lex_errors()
    );
    let check = spy_typeck::check(&parse);
    assert!(
        !check.has_errors(),
        "check errors: {:?}",
        check.diagnostics
    );
    let mut out = Vec::new();
    spy_interp::run(&parse, &check, &mut out).expect("runtime error");
    String::from_utf8(out).expect("output is UTF-8")
}

/// Run a program expected to die at runtime; returns the error.
fn run_expect_error(src: &str) -> spy_interp::RuntimeError {
    let parse = spy_parser::parse(src);
    assert!(parse.errors().is_empty(), "syntax errors: {:?}", parse.errors());
    let check = spy_typeck::check(&parse);
    assert!(!check.has_errors(), "check errors: {:?}", check.diagnostics);
    let mut out = Vec::new();
    spy_interp::run(&parse, &check, &mut out).expect_err("expected a runtime error")
}

// ── Basics ─────────────────────────────────────────────────────────────

#[test]
fn print_and_arithmetic() {
    let out = run_program("print(1 + 2 * 3); print(7 % 3); print(2 ** 10);");
    assert_eq!(out, "7\n1\n1024\n");
}

#[test]
fn division_is_float() {
    let out = run_program("print(7 / 2); print(4 / 2);");
    assert_eq!(out, "3.5\n2.0\n");
}

#[test]
fn string_ops_and_methods() {
    let out = run_program(
        "s = \"Hello World\"; print(s.lower()); print(s.upper()); print(len(s)); \
         parts = s.split(); print(parts);",
    );
    assert_eq!(out, "hello world\nHELLO WORLD\n11\n['Hello', 'World']\n");
}

#[test]
fn list_operations() {
    let out = run_program(
        "xs = [1, 2, 3]; xs.append(4); xs.remove(2); ys = xs.copy(); ys.append(9); \
         print(xs); print(ys); print(xs[0]); print(xs[-1]);",
    );
    assert_eq!(out, "[1, 3, 4]\n[1, 3, 4, 9]\n1\n4\n");
}

#[test]
fn slicing_with_negative_indices() {
    let out = run_program(
        "xs = [1, 2, 3, 4, 5]; print(xs[1:3]); print(xs[-2:]); print(xs[:2]); print(\"hello\"[1:-1]);",
    );
    assert_eq!(out, "[2, 3]\n[4, 5]\n[1, 2]\nell\n");
}

#[test]
fn dict_literals_and_methods() {
    let out = run_program(
        "d = {\"a\": 1, \"b\": 2}; print(d[\"a\"]); d[\"c\"] = 3; print(len(d)); \
         print(d.keys()); print(d.get(\"x\", 0));",
    );
    assert_eq!(out, "1\n3\n['a', 'b', 'c']\n0\n");
}

#[test]
fn tuples_print_like_python() {
    let out = run_program("t = (1, 2.5, \"x\"); print(t); print(t[2]);");
    assert_eq!(out, "(1, 2.5, 'x')\nx\n");
}

#[test]
fn control_flow() {
    let out = run_program(
        "total = 0; \
         for i in range(5) { if i % 2 == 0 { total += i; } } \
         n = 3; \
         while n > 0 { n -= 1; } \
         if total > 5 { print(\"big\"); } elif total == 6 { print(\"six\"); } else { print(total); } \
         print(n);",
    );
    assert_eq!(out, "big\n0\n");
}

#[test]
fn comparisons_and_membership() {
    let out = run_program(
        "print(1 < 2 and 2 <= 2); print(not 1 == 2); print(3 in [1, 2, 3]); \
         print(4 not in [1, 2, 3]); print(None is None); print(\"lo\" in \"hello\");",
    );
    assert_eq!(out, "True\nTrue\nTrue\nTrue\nTrue\nTrue\n");
}

#[test]
fn functions_and_recursion() {
    let out = run_program(
        "def fib(n) { if n < 2 { return n; } return fib(n - 1) + fib(n - 2); } \
         print(fib(10));",
    );
    assert_eq!(out, "55\n");
}

#[test]
fn sum_over_list_and_range() {
    let out = run_program("print(sum([1, 2, 3])); print(sum(range(1, 5))); print(sum([1.5, 2.5]));");
    assert_eq!(out, "6\n10\n4.0\n");
}

// ── F-Strings ──────────────────────────────────────────────────────────

#[test]
fn fstring_interpolation_and_specs() {
    let out = run_program(
        "r = 5; pi = 3.14159265; \
         print(f\"r={r}\"); \
         print(f\"Area: {pi * r * r:.2f}\"); \
         print(f\"rate: {0.07250:.2%}\"); \
         print(f\"{{literal}}\");",
    );
    assert_eq!(out, "r=5\nArea: 78.54\nrate: 7.25%\n{literal}\n");
}

#[test]
fn fstring_nested_expression() {
    let out = run_program("xs = [10, 20, 30]; print(f\"mid={xs[1:2]} len={len(xs)}\");");
    assert_eq!(out, "mid=[20] len=3\n");
}

// ── Classes and Dispatch ───────────────────────────────────────────────

#[test]
fn abstract_override_dispatch() {
    let out = run_program(
        "abstract class A { abstract def m() -> int; } \
         class B extends A { def m() -> int { return 1; } } \
         print(B().m());",
    );
    assert_eq!(out, "1\n");
}

#[test]
fn constructor_and_attributes() {
    let out = run_program(
        "class Point { \
             def __init__(self, x, y) { self.x = x; self.y = y; } \
             def norm2(self) { return self.x * self.x + self.y * self.y; } \
         } \
         p = Point(3, 4); print(p.x); print(p.norm2());",
    );
    assert_eq!(out, "3\n25\n");
}

#[test]
fn inherited_constructor_and_super_chain() {
    let out = run_program(
        "class Animal { \
             def __init__(self, name) { self.name = name; } \
             def describe(self) { return self.name; } \
         } \
         class Dog extends Animal { \
             def __init__(self, name) { super(name); self.sound = \"woof\"; } \
             def describe(self) { return super.describe() + \" says \" + self.sound; } \
         } \
         d = Dog(\"Rex\"); print(d.describe()); print(isinstance(d, Animal));",
    );
    assert_eq!(out, "Rex says woof\nTrue\n");
}

#[test]
fn dynamic_dispatch_picks_most_derived() {
    let out = run_program(
        "class A { def who(self) { return \"A\"; } def call(self) { return self.who(); } } \
         class B extends A { def who(self) { return \"B\"; } } \
         print(B().call()); print(A().call());",
    );
    assert_eq!(out, "B\nA\n");
}

#[test]
fn instance_field_defaults() {
    let out = run_program(
        "class Counter { count = 0; def bump(self) { self.count += 1; return self.count; } } \
         c = Counter(); print(c.bump()); print(c.bump()); print(Counter().bump());",
    );
    assert_eq!(out, "1\n2\n1\n");
}

#[test]
fn static_members_and_shadowing() {
    let out = run_program(
        "class A { static origin = \"A\"; static def tag() { return \"from A\"; } } \
         class B extends A { static origin = \"B\"; } \
         print(A.origin); print(B.origin); print(B.tag()); \
         A.origin = \"A2\"; print(A.origin); print(B.origin);",
    );
    assert_eq!(out, "A\nB\nfrom A\nA2\nB\n");
}

#[test]
fn static_counter_pattern() {
    let out = run_program(
        "class Shape { \
             static _count = 0; \
             static def made() { return Shape._count; } \
         } \
         Shape._count += 1; Shape._count += 1; \
         print(Shape.made()); print(hasattr(Shape, \"_count\")); print(hasattr(Shape, \"nope\"));",
    );
    assert_eq!(out, "2\nTrue\nFalse\n");
}

#[test]
fn interface_polymorphism_and_isinstance() {
    let out = run_program(
        "interface Drawable { def draw() -> str; } \
         interface Sized extends Drawable { def size() -> int; } \
         class Box implements Sized { \
             def draw() -> str { return \"box\"; } \
             def size() -> int { return 4; } \
         } \
         b = Box(); \
         print(isinstance(b, Sized)); print(isinstance(b, Drawable)); print(isinstance(b, Box)); \
         print(b.draw());",
    );
    assert_eq!(out, "True\nTrue\nTrue\nbox\n");
}

#[test]
fn isinstance_on_builtin_types() {
    let out = run_program("print(isinstance(1, int)); print(isinstance(\"x\", str)); print(isinstance(1.5, int));");
    assert_eq!(out, "True\nTrue\nFalse\n");
}

#[test]
fn object_display_is_stable() {
    let out = run_program("class C {} print(C()); print(C);");
    assert_eq!(out, "<C object>\n<class 'C'>\n");
}

// ── Exceptions ─────────────────────────────────────────────────────────

#[test]
fn uncaught_value_error_terminates() {
    let err = run_expect_error("raise ValueError(\"bad input\");");
    assert_eq!(err.kind, RuntimeErrorKind::ValueError);
    assert_eq!(err.message, "bad input");
}

#[test]
fn zero_division() {
    let err = run_expect_error("print(1 / 0);");
    assert_eq!(err.kind, RuntimeErrorKind::ZeroDivision);
}

#[test]
fn index_out_of_range() {
    let err = run_expect_error("xs = [1]; print(xs[3]);");
    assert_eq!(err.kind, RuntimeErrorKind::IndexError);
}

#[test]
fn attribute_error_on_missing_member() {
    let err = run_expect_error("class C {} C().missing;");
    assert_eq!(err.kind, RuntimeErrorKind::AttributeError);
}

#[test]
fn raise_inside_method() {
    let err = run_expect_error(
        "class Strict { \
             def check(self, n) { \
                 if n < 0 { raise ValueError(f\"negative: {n}\"); } \
                 return n; \
             } \
         } \
         Strict().check(-3);",
    );
    assert_eq!(err.kind, RuntimeErrorKind::ValueError);
    assert_eq!(err.message, "negative: -3");
}

// ── Time Module ────────────────────────────────────────────────────────

#[test]
fn time_module_returns_a_float() {
    let out = run_program("import time; t = time.time(); print(t > 0);");
    assert_eq!(out, "True\n");
}
