use indoc::indoc;
use mml_ast::{BindingArity, BindingOrigin, Type};

use crate::test_utils::{analyzed, binding, expr_sexpr};

#[test]
fn heap_struct_gets_free_and_clone() {
    let state = analyzed("struct User { name: String };");
    assert!(state.can_emit_code, "errors: {:?}", state.errors);

    let free = binding(&state.module, "__free_User");
    let meta = free.meta.as_ref().expect("meta");
    assert_eq!(meta.origin, BindingOrigin::Destructor);
    assert_eq!(meta.arity, BindingArity::Unary);
    let lambda = free.lambda().expect("lambda");
    assert!(lambda.params[0].consuming);
    assert_eq!(
        expr_sexpr(&lambda.body),
        "(seq (app (ref __free_String) (ref s.name)) (unit))"
    );

    let clone = binding(&state.module, "__clone_User");
    let lambda = clone.lambda().expect("lambda");
    assert!(!lambda.params[0].consuming);
    assert_eq!(
        expr_sexpr(&lambda.body),
        "(app (ref __mk_User) (app (ref __clone_String) (ref s.name)))"
    );
}

#[test]
fn plain_struct_gets_no_helpers() {
    let state = analyzed("struct P { x: Int };");
    assert!(state.can_emit_code);
    assert!(state.module.binding("__free_P").is_none());
    assert!(state.module.binding("__clone_P").is_none());
}

#[test]
fn nested_heap_struct_frees_through_its_own_helper() {
    let source = indoc! {"
        struct A { s: String };
        struct B { a: A, tag: Int };
    "};
    let state = analyzed(source);
    assert!(state.can_emit_code, "errors: {:?}", state.errors);

    let free_b = binding(&state.module, "__free_B");
    let body = expr_sexpr(&free_b.lambda().expect("lambda").body);
    assert!(body.contains("(ref __free_A)"), "got: {body}");
    assert!(!body.contains("tag"), "non-heap fields are not freed: {body}");

    let clone_b = binding(&state.module, "__clone_B");
    let body = expr_sexpr(&clone_b.lambda().expect("lambda").body);
    assert!(body.contains("(ref __clone_A)"), "got: {body}");
    assert!(body.contains("(ref s.tag)"), "plain fields pass through: {body}");
}

#[test]
fn helpers_are_registered_in_the_index() {
    let state = analyzed("struct User { name: String };");
    let free_id = binding(&state.module, "__free_User")
        .id
        .clone()
        .expect("id");
    assert!(free_id.is_synth());
    assert!(state.module.resolvables.value(&free_id).is_some());
}

#[test]
fn helper_types_are_complete() {
    let state = analyzed("struct User { name: String };");
    let clone = binding(&state.module, "__clone_User");
    match clone.type_spec.as_ref() {
        Some(Type::Fn(f)) => {
            assert_eq!(f.params.len(), 1);
            assert!(f.params[0].same_type(f.ret.as_ref()));
        }
        other => panic!("expected a function type, got {other:?}"),
    }
}
