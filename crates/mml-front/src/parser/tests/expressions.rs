use indoc::indoc;
use mml_ast::Term;

use crate::test_utils::{binding, expr_sexpr, parsed};

fn value_sexpr(source: &str, name: &str) -> String {
    let (module, diag) = parsed(source);
    assert!(diag.is_empty(), "unexpected diagnostics for {source:?}");
    expr_sexpr(&binding(&module, name).value)
}

#[test]
fn expressions_parse_flat() {
    // No precedence at this stage: five terms in a row.
    assert_eq!(
        value_sexpr("let c = a + b * 3;", "c"),
        "(terms (ref a) (ref +) (ref b) (ref *) (int 3))"
    );
}

#[test]
fn minus_stays_ambiguous_in_the_term_list() {
    assert_eq!(
        value_sexpr("let x = -1 - 1;", "x"),
        "(terms (ref -) (int 1) (ref -) (int 1))"
    );
}

#[test]
fn one_element_parens_group() {
    assert_eq!(value_sexpr("let g = (a);", "g"), "(group (ref a))");
}

#[test]
fn two_element_parens_tuple() {
    assert_eq!(
        value_sexpr("let t = (a, b);", "t"),
        "(tuple (ref a) (ref b))"
    );
}

#[test]
fn empty_parens_are_the_unit_literal() {
    assert_eq!(value_sexpr("let u = ();", "u"), "(unit)");
}

#[test]
fn conditional_with_optional_end() {
    assert_eq!(
        value_sexpr("let x = if c then 1 else 2;", "x"),
        "(if (ref c) (int 1) (int 2))"
    );
    assert_eq!(
        value_sexpr("let y = if c then 1 else 2 end;", "y"),
        "(if (ref c) (int 1) (int 2))"
    );
}

#[test]
fn qualified_reference_chains() {
    assert_eq!(value_sexpr("let l = s.length;", "l"), "(ref s.length)");
    assert_eq!(value_sexpr("let d = a.b.c;", "d"), "(ref a.b.c)");
}

#[test]
fn hole_and_placeholder() {
    assert_eq!(value_sexpr("let h: Int = ???;", "h"), "(hole)");
    assert_eq!(value_sexpr("let p = f _;", "p"), "(terms (ref f) (_))");
}

#[test]
fn string_literal_kept_verbatim_across_lines() {
    let (module, _) = parsed("let s = \"one\ntwo\";");
    match binding(&module, "s").value.only_term() {
        Some(Term::LiteralString(lit)) => assert_eq!(lit.value, "one\ntwo"),
        other => panic!("expected a string literal, got {other:?}"),
    }
}

#[test]
fn float_literals() {
    assert_eq!(value_sexpr("let f = 1.5;", "f"), "(float 1.5)");
    assert_eq!(value_sexpr("let g = .25;", "g"), "(float 0.25)");
}

#[test]
fn bool_literals() {
    assert_eq!(value_sexpr("let t = true;", "t"), "(bool true)");
    assert_eq!(value_sexpr("let f = false;", "f"), "(bool false)");
}

#[test]
fn body_statements_become_a_sequence() {
    let source = indoc! {"
        fn f(): Unit = let s = readline (); println s; println s;
    "};
    let (module, diag) = parsed(source);
    assert!(diag.is_empty());
    let body = &binding(&module, "f").lambda().expect("lambda").body;
    assert_eq!(
        expr_sexpr(body),
        "(seq (let s (terms (ref readline) (unit))) \
         (terms (ref println) (ref s)) \
         (terms (ref println) (ref s)))"
    );
}

#[test]
fn let_after_semicolon_continues_an_open_sequence() {
    let source = indoc! {"
        fn f(): Int = let a = 1; let b = 2; a + b;
    "};
    let (module, diag) = parsed(source);
    assert!(diag.is_empty());
    assert_eq!(module.members.len(), 1);
    let body = &binding(&module, "f").lambda().expect("lambda").body;
    assert!(expr_sexpr(body).starts_with("(seq (let a (int 1)) (let b (int 2))"));
}

#[test]
fn uppercase_reference_for_constructors() {
    assert_eq!(
        value_sexpr("let p = Point 1 2;", "p"),
        "(terms (ref Point) (int 1) (int 2))"
    );
}
