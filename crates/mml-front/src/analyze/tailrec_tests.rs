use indoc::indoc;

use crate::test_utils::{analyzed, binding};

fn is_tail_recursive(source: &str, name: &str) -> bool {
    let state = analyzed(source);
    assert!(state.can_emit_code, "errors: {:?}", state.errors);
    binding(&state.module, name)
        .lambda()
        .expect("lambda")
        .is_tail_recursive
}

#[test]
fn self_call_in_else_branch_is_tail() {
    let source = indoc! {"
        fn count(n: Int): Int = if n == 0 then 0 else count (n - 1);
    "};
    assert!(is_tail_recursive(source, "count"));
}

#[test]
fn self_call_under_an_operator_is_not_tail() {
    let source = indoc! {"
        fn sum(n: Int): Int = if n == 0 then 0 else n + sum (n - 1);
    "};
    assert!(!is_tail_recursive(source, "sum"));
}

#[test]
fn last_statement_of_a_sequence_is_tail() {
    let source = indoc! {"
        fn spin(n: Int): Int = let m = n - 1; spin m;
    "};
    assert!(is_tail_recursive(source, "spin"));
}

#[test]
fn non_recursive_functions_stay_unmarked() {
    let source = indoc! {"
        fn id(n: Int): Int = n;
    "};
    assert!(!is_tail_recursive(source, "id"));
}

#[test]
fn partial_self_application_is_not_tail() {
    let source = indoc! {"
        fn two(a: Int, b: Int): Int = if a == 0 then b else two 1;
    "};
    let state = analyzed(source);
    let lambda = binding(&state.module, "two").lambda().expect("lambda");
    assert!(!lambda.is_tail_recursive);
}
