use indoc::indoc;
use mml_ast::{Module, Term};
use pretty_assertions::assert_eq;

use crate::diagnostics::{CompilationError, Diagnostics, SemanticError};
use crate::test_utils::expr_sexpr;

use super::{duplicates, id_assign, ref_resolve, rewrite, type_resolve};

fn run(source: &str) -> (Module, Diagnostics) {
    let (mut module, _) = crate::parser::parse(source, "Test");
    crate::stdlib::inject(&mut module);
    let mut diag = Diagnostics::new();
    let module = duplicates::run(module, &mut diag);
    let module = id_assign::run(module, &mut diag);
    let module = type_resolve::run(module, &mut diag);
    let module = ref_resolve::run(module, &mut diag);
    let module = rewrite::run(module, &mut diag);
    (module, diag)
}

fn value_sexpr(source: &str, name: &str) -> String {
    let (module, diag) = run(source);
    assert!(diag.is_empty(), "unexpected diagnostics for {source:?}");
    expr_sexpr(&module.binding(name).expect("binding present").value)
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let source = indoc! {"
        let a = 1;
        let b = 2;
        let c = a + b * 3;
    "};
    assert_eq!(
        value_sexpr(source, "c"),
        "(app (app (ref +) (ref a)) (app (app (ref *) (ref b)) (int 3)))"
    );
}

#[test]
fn equal_precedence_associates_left() {
    let source = indoc! {"
        let a = 1;
        let c = a - a - a;
    "};
    assert_eq!(
        value_sexpr(source, "c"),
        "(app (app (ref -) (app (app (ref -) (ref a)) (ref a))) (ref a))"
    );
}

#[test]
fn unary_then_binary_minus() {
    // Binary outermost, the unary applied to the first literal.
    assert_eq!(
        value_sexpr("let x = -1 - 1;", "x"),
        "(app (app (ref -) (app (ref -) (int 1))) (int 1))"
    );
}

#[test]
fn minus_candidates_pin_by_position() {
    let (module, diag) = run("let x = -1 - 1;");
    assert!(diag.is_empty());
    let bnd = module.binding("x").expect("x");
    let pinned: Vec<String> = mml_ast::visit::refs_in(&bnd.value)
        .iter()
        .filter(|r| r.name == "-")
        .map(|r| r.resolved_id.as_ref().expect("pinned").to_string())
        .collect();
    assert_eq!(pinned, ["stdlib::op.minus.2", "stdlib::op.minus.1"]);
}

#[test]
fn juxtaposition_associates_left() {
    let source = indoc! {"
        fn f(a: Int, b: Int): Int = a;
        let r = f 1 2;
    "};
    assert_eq!(
        value_sexpr(source, "r"),
        "(app (app (ref f) (int 1)) (int 2))"
    );
}

#[test]
fn application_binds_tighter_than_operators() {
    let source = indoc! {"
        fn g(a: Int): Int = a;
        let r = g 1 + 2;
    "};
    assert_eq!(
        value_sexpr(source, "r"),
        "(app (app (ref +) (app (ref g) (int 1))) (int 2))"
    );
}

#[test]
fn prefix_operator_covers_a_whole_application() {
    let source = indoc! {"
        fn h(a: Int): Int = a;
        let r = - h 1;
    "};
    assert_eq!(
        value_sexpr(source, "r"),
        "(app (ref -) (app (ref h) (int 1)))"
    );
}

#[test]
fn grouped_expressions_override_precedence() {
    let source = indoc! {"
        let a = 1;
        let c = (a + a) * a;
    "};
    assert_eq!(
        value_sexpr(source, "c"),
        "(app (app (ref *) (group (app (app (ref +) (ref a)) (ref a)))) (ref a))"
    );
}

#[test]
fn adjacent_non_callables_are_dangling() {
    let (module, diag) = run("let x = 1 2;");
    assert!(diag.errors().iter().any(|e| matches!(
        e,
        CompilationError::Semantic(SemanticError::DanglingTerms { .. })
    )));
    let x = module.binding("x").expect("x");
    assert!(matches!(x.value.only_term(), Some(Term::Invalid(_))));
}

#[test]
fn trailing_operator_is_dangling() {
    let (_, diag) = run("let x = 1 +;");
    assert!(diag.errors().iter().any(|e| matches!(
        e,
        CompilationError::Semantic(SemanticError::DanglingTerms { .. })
    )));
}

#[test]
fn mixed_associativity_at_equal_precedence_is_rejected() {
    let source = indoc! {"
        op <<(a: Int, b: Int): Int 55 left = ???;
        op >>(a: Int, b: Int): Int 55 right = ???;
        let x = 1 << 2 >> 3;
    "};
    let (_, diag) = run(source);
    assert!(diag.errors().iter().any(|e| matches!(
        e,
        CompilationError::Semantic(SemanticError::DanglingTerms { .. })
    )));
}

#[test]
fn lone_nullary_reference_is_not_auto_applied() {
    let source = indoc! {"
        fn z(): Int = 1;
        let v = z;
    "};
    assert_eq!(value_sexpr(source, "v"), "(ref z)");
}

#[test]
fn conditional_branches_are_rewritten() {
    let source = indoc! {"
        let a = 1;
        let x = if true then a + a else a * a;
    "};
    assert_eq!(
        value_sexpr(source, "x"),
        "(if (bool true) (app (app (ref +) (ref a)) (ref a)) (app (app (ref *) (ref a)) (ref a)))"
    );
}
