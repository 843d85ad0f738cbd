use indoc::indoc;
use mml_ast::{Member, Module};

use crate::diagnostics::{CompilationError, Diagnostics, SemanticError};

use super::duplicates;

fn run(source: &str) -> (Module, Diagnostics) {
    let (module, _) = crate::parser::parse(source, "Test");
    let mut diag = Diagnostics::new();
    let module = duplicates::run(module, &mut diag);
    (module, diag)
}

fn duplicate_errors(diag: &Diagnostics) -> Vec<(String, usize)> {
    diag.errors()
        .iter()
        .filter_map(|e| match e {
            CompilationError::Semantic(SemanticError::DuplicateName { name, spans }) => {
                Some((name.clone(), spans.len()))
            }
            _ => None,
        })
        .collect()
}

#[test]
fn duplicate_let_wraps_the_second() {
    let (module, diag) = run("let a = 1;\nlet a = 2;");
    assert_eq!(duplicate_errors(&diag), [("a".to_owned(), 2)]);
    assert!(matches!(module.members[0], Member::Bnd(_)));
    assert!(matches!(module.members[1], Member::Duplicate(_)));
}

#[test]
fn unary_and_binary_operator_coexist() {
    let source = indoc! {"
        op -(a: Int): Int 95 right = ???;
        op -(a: Int, b: Int): Int 60 left = ???;
    "};
    let (module, diag) = run(source);
    assert!(diag.is_empty());
    assert!(module.members.iter().all(|m| !matches!(m, Member::Duplicate(_))));
}

#[test]
fn same_arity_operators_collide() {
    let source = indoc! {"
        op %%(a: Int, b: Int): Int 70 left = ???;
        op %%(a: Int, b: Int): Int 30 left = ???;
    "};
    let (_, diag) = run(source);
    assert_eq!(duplicate_errors(&diag), [("%%".to_owned(), 2)]);
}

#[test]
fn functions_do_not_overload_on_arity() {
    let source = indoc! {"
        fn f(a: Int): Int = a;
        fn f(a: Int, b: Int): Int = a;
    "};
    let (_, diag) = run(source);
    assert_eq!(duplicate_errors(&diag), [("f".to_owned(), 2)]);
}

#[test]
fn three_duplicates_report_every_span() {
    let (_, diag) = run("let a = 1;\nlet a = 2;\nlet a = 3;");
    assert_eq!(duplicate_errors(&diag), [("a".to_owned(), 3)]);
}

#[test]
fn duplicate_parameter_invalidates_the_member() {
    let (module, diag) = run("fn f(a: Int, a: Int): Int = a;");
    assert_eq!(duplicate_errors(&diag), [("a".to_owned(), 2)]);
    assert!(matches!(module.members[0], Member::Invalid(_)));
}

#[test]
fn type_and_value_namespaces_do_not_collide() {
    let (_, diag) = run("type Foo = @native[t=i64];\nlet foo = 1;");
    assert!(diag.is_empty());
}

#[test]
fn first_declaration_wins() {
    let (module, _) = run("let a = 1;\nlet a = 2;");
    let kept = module.members[0].as_bnd().expect("first stays a binding");
    assert_eq!(crate::test_utils::expr_sexpr(&kept.value), "(int 1)");
}
