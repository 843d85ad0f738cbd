use indoc::indoc;
use pretty_assertions::assert_eq;

use crate::diagnostics::{CompilationError, OwnershipError, SemanticError};
use crate::test_utils::{analyzed, binding, expr_sexpr};

fn ownership_errors(state: &crate::CompilerState) -> Vec<&OwnershipError> {
    state
        .errors
        .iter()
        .filter_map(|e| match e {
            CompilationError::Semantic(SemanticError::OwnershipError(o)) => Some(o),
            _ => None,
        })
        .collect()
}

fn body_sexpr(state: &crate::CompilerState, name: &str) -> String {
    expr_sexpr(&binding(&state.module, name).lambda().expect("lambda").body)
}

#[test]
fn borrowing_uses_free_at_scope_end() {
    let source = indoc! {"
        fn f(): Unit = let s = readline (); println s; println s;
    "};
    let state = analyzed(source);
    assert!(state.can_emit_code, "errors: {:?}", state.errors);
    assert_eq!(
        body_sexpr(&state, "f"),
        "(seq (let s (app (ref readline) (unit))) \
         (app (ref println) (ref s)) \
         (app (ref println) (ref s)) \
         (app (ref __free_String) (ref s)))"
    );
}

#[test]
fn use_after_move_is_reported_and_not_freed() {
    let source = indoc! {"
        fn consume(~s: String): Unit = @native;
        fn g(): Unit = let s = readline (); consume s; println s;
    "};
    let state = analyzed(source);
    let errors = ownership_errors(&state);
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], OwnershipError::UseAfterMove { name, .. } if name == "s"));
    assert!(
        !body_sexpr(&state, "g").contains("__free_String"),
        "moved bindings are not freed"
    );
}

#[test]
fn owned_return_transfers_to_the_caller() {
    let state = analyzed("fn make(): String = readline ();");
    assert!(state.can_emit_code, "errors: {:?}", state.errors);
    assert_eq!(body_sexpr(&state, "make"), "(app (ref readline) (unit))");
}

#[test]
fn returning_a_borrowed_parameter_is_an_escape() {
    let state = analyzed("fn id(s: String): String = s;");
    assert!(matches!(
        ownership_errors(&state).first(),
        Some(OwnershipError::BorrowEscapeViaReturn { name, .. }) if name == "s"
    ));
}

#[test]
fn static_string_returns_are_cloned() {
    let state = analyzed(r#"fn hello(): String = "hi";"#);
    assert!(state.can_emit_code, "errors: {:?}", state.errors);
    assert_eq!(
        body_sexpr(&state, "hello"),
        "(app (ref __clone_String) (str \"hi\"))"
    );
}

#[test]
fn consuming_parameter_is_freed_by_the_callee_scope() {
    let source = indoc! {"
        fn shout(~s: String): Unit = println s; println s;
    "};
    let state = analyzed(source);
    assert!(state.can_emit_code, "errors: {:?}", state.errors);
    let body = body_sexpr(&state, "shout");
    assert!(
        body.ends_with("(app (ref __free_String) (ref s)))"),
        "consumed parameters are owned by the callee: {body}"
    );
}

#[test]
fn discarded_allocation_is_anchored_and_freed() {
    let source = indoc! {r#"
        fn d(): Unit = readline (); println "x";
    "#};
    let state = analyzed(source);
    assert!(state.can_emit_code, "errors: {:?}", state.errors);
    let body = body_sexpr(&state, "d");
    assert!(body.contains("(let __tmp0 (app (ref readline) (unit)))"), "got: {body}");
    assert!(body.contains("(app (ref __free_String) (ref __tmp0))"), "got: {body}");
}

#[test]
fn nested_allocation_in_borrowed_position_is_hoisted() {
    let source = indoc! {"
        fn n(): Unit = println (to_string 42);
    "};
    let state = analyzed(source);
    assert!(state.can_emit_code, "errors: {:?}", state.errors);
    let body = body_sexpr(&state, "n");
    assert!(body.contains("(let __tmp0"), "got: {body}");
    assert!(body.contains("(app (ref __free_String) (ref __tmp0))"), "got: {body}");
}

#[test]
fn mixed_conditional_ownership_uses_a_witness() {
    let source = indoc! {r#"
        fn w(c: Bool): Unit = let x = if c then readline () else "s"; println x;
    "#};
    let state = analyzed(source);
    assert!(state.can_emit_code, "errors: {:?}", state.errors);
    let body = body_sexpr(&state, "w");
    assert!(body.contains("(let __owns_x (ref c))"), "got: {body}");
    assert!(
        body.contains("(if (ref __owns_x) (app (ref __free_String) (ref x)) (unit))"),
        "got: {body}"
    );
}

#[test]
fn partial_application_with_consuming_parameter() {
    let source = indoc! {"
        fn eat(~a: String, b: String): Unit = @native;
        fn h(s: String): Unit = let p = eat s; ();
    "};
    let state = analyzed(source);
    assert!(matches!(
        ownership_errors(&state).first(),
        Some(OwnershipError::PartialApplicationWithConsuming { name, .. }) if name == "eat"
    ));
}

#[test]
fn consuming_use_must_be_the_last_in_its_call() {
    let source = indoc! {"
        fn both(~a: String, b: String): Unit = @native;
        fn k(): Unit = let s = readline (); both s s;
    "};
    let state = analyzed(source);
    assert!(matches!(
        ownership_errors(&state).first(),
        Some(OwnershipError::ConsumingParamNotLastUse { name, .. }) if name == "s"
    ));
}

#[test]
fn owned_local_returned_is_not_freed() {
    let source = indoc! {"
        fn pick(): String = let a = readline (); let b = readline (); b;
    "};
    let state = analyzed(source);
    assert!(state.can_emit_code, "errors: {:?}", state.errors);
    let body = body_sexpr(&state, "pick");
    assert!(body.contains("(app (ref __free_String) (ref a))"), "got: {body}");
    assert!(!body.contains("(app (ref __free_String) (ref b))"), "got: {body}");
    assert!(body.ends_with("(ref b))"), "frees run before the return: {body}");
}
