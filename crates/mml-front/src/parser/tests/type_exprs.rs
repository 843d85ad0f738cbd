use mml_ast::Type;

use crate::test_utils::{binding, parsed};

fn ascription(source: &str, name: &str) -> Type {
    let (module, diag) = parsed(source);
    assert!(diag.is_empty(), "unexpected diagnostics for {source:?}");
    binding(&module, name)
        .type_asc
        .clone()
        .expect("binding has an ascription")
}

#[test]
fn simple_type_reference() {
    match ascription("let x: Int = 1;", "x") {
        Type::Ref(r) => {
            assert_eq!(r.name, "Int");
            assert!(r.resolved_id.is_none());
        }
        other => panic!("expected a type ref, got {other:?}"),
    }
}

#[test]
fn function_types_are_right_associative() {
    match ascription("let f: Int -> Int -> Bool = ???;", "f") {
        Type::Fn(outer) => {
            assert_eq!(outer.params.len(), 1);
            assert!(matches!(*outer.ret, Type::Fn(_)));
        }
        other => panic!("expected a function type, got {other:?}"),
    }
}

#[test]
fn tuple_type() {
    match ascription("let p: (Int, Bool) = ???;", "p") {
        Type::Tuple(items) => assert_eq!(items.len(), 2),
        other => panic!("expected a tuple type, got {other:?}"),
    }
}

#[test]
fn grouped_type_stays_a_group() {
    match ascription("let x: (Int) = 1;", "x") {
        Type::Group(inner) => assert!(matches!(*inner, Type::Ref(_))),
        other => panic!("expected a grouped type, got {other:?}"),
    }
}

#[test]
fn unit_type_in_return_position() {
    let (module, _) = parsed("fn f(): () = @native;");
    let lambda = binding(&module, "f").lambda().expect("lambda");
    assert!(matches!(lambda.type_asc, Some(Type::Unit)));
}

#[test]
fn union_type_is_representable() {
    match ascription("let u: Int | Bool = ???;", "u") {
        Type::Union(items) => assert_eq!(items.len(), 2),
        other => panic!("expected a union type, got {other:?}"),
    }
}
