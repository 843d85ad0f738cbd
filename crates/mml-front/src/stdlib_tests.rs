use mml_ast::{Associativity, BindingArity, MemEffect, Member, Module, NativeRep, Term};

use crate::stdlib::{self, FN_PRECEDENCE};

fn prelude() -> Module {
    let mut module = Module::new("Test");
    stdlib::inject(&mut module);
    module
}

fn meta_of<'m>(module: &'m Module, mangled: &str) -> &'m mml_ast::BindingMeta {
    module
        .binding(mangled)
        .unwrap_or_else(|| panic!("no prelude binding `{mangled}`"))
        .meta
        .as_ref()
        .expect("prelude callables carry meta")
}

#[test]
fn prelude_lands_before_user_members() {
    let (mut module, _) = crate::parser::parse("let x = 1;", "Test");
    stdlib::inject(&mut module);

    assert!(matches!(module.members.first(), Some(Member::TypeDef(t)) if t.name == "Int64"));
    assert!(matches!(module.members.last(), Some(Member::Bnd(b)) if b.name == "x"));
}

#[test]
fn operator_precedence_ladder() {
    let module = prelude();
    for (mangled, prec, assoc) in [
        ("op.star.2", 80, Associativity::Left),
        ("op.slash.2", 80, Associativity::Left),
        ("op.percent.2", 80, Associativity::Left),
        ("op.plus.2", 60, Associativity::Left),
        ("op.minus.2", 60, Associativity::Left),
        ("op.plus.1", 95, Associativity::Right),
        ("op.minus.1", 95, Associativity::Right),
        ("op.eqeq.2", 50, Associativity::Left),
        ("op.lteq.2", 50, Associativity::Left),
        ("op.and.2", 40, Associativity::Left),
        ("op.or.2", 30, Associativity::Left),
        ("op.not.1", 95, Associativity::Right),
    ] {
        let meta = meta_of(&module, mangled);
        assert_eq!(meta.precedence, prec, "precedence of {mangled}");
        assert_eq!(meta.assoc, assoc, "associativity of {mangled}");
    }
}

#[test]
fn minus_ships_in_both_arities() {
    let module = prelude();
    assert_eq!(meta_of(&module, "op.minus.1").arity, BindingArity::Unary);
    assert_eq!(meta_of(&module, "op.minus.2").arity, BindingArity::Binary);
    assert_eq!(meta_of(&module, "op.minus.1").original_name, "-");
    assert_eq!(meta_of(&module, "op.minus.2").original_name, "-");
}

#[test]
fn application_outranks_every_operator() {
    let module = prelude();
    for bnd in module.bindings() {
        if let Some(meta) = &bnd.meta {
            if meta.origin == mml_ast::BindingOrigin::Operator {
                assert!(meta.precedence < FN_PRECEDENCE, "{}", bnd.name);
            }
        }
    }
}

#[test]
fn prelude_ids_carry_the_reserved_prefix() {
    let module = prelude();
    for member in &module.members {
        match member {
            Member::Bnd(b) => assert!(b.id.as_ref().expect("id preset").is_stdlib()),
            Member::TypeDef(t) => assert!(t.id.as_ref().expect("id preset").is_stdlib()),
            Member::TypeAlias(t) => assert!(t.id.as_ref().expect("id preset").is_stdlib()),
            _ => {}
        }
    }
}

#[test]
fn string_is_a_heap_struct() {
    let module = prelude();
    let string = module.members.iter().find_map(|m| match m {
        Member::TypeDef(t) if t.name == "String" => Some(t),
        _ => None,
    });
    let string = string.expect("String in prelude");
    assert!(string.heap);
    match &string.rep {
        NativeRep::Struct { fields } => {
            let names: Vec<_> = fields.keys().cloned().collect();
            assert_eq!(names, ["length", "data"]);
        }
        other => panic!("String should be a native struct, got {other:?}"),
    }
}

#[test]
fn string_producers_allocate() {
    let module = prelude();
    for (name, effect) in [
        ("readline", MemEffect::Alloc),
        ("concat", MemEffect::Alloc),
        ("to_string", MemEffect::Alloc),
        ("println", MemEffect::NoAlloc),
        ("str_to_int", MemEffect::NoAlloc),
        ("__clone_String", MemEffect::Alloc),
        ("__free_String", MemEffect::NoAlloc),
    ] {
        let bnd = module.binding(name).unwrap_or_else(|| panic!("no `{name}`"));
        let lambda = bnd.lambda().expect("prelude callables are lambdas");
        match lambda.body.only_term() {
            Some(Term::Native(native)) => {
                assert_eq!(native.mem_effect, effect, "effect of {name}");
            }
            other => panic!("{name} body should be native, got {other:?}"),
        }
    }
}

#[test]
fn string_free_consumes_its_argument() {
    let module = prelude();
    let free = module.binding("__free_String").expect("free helper");
    let lambda = free.lambda().expect("lambda");
    assert!(lambda.params[0].consuming);
}

#[test]
fn int_aliases_point_at_native_defs() {
    let module = prelude();
    let alias = module.members.iter().find_map(|m| match m {
        Member::TypeAlias(a) if a.name == "Int" => Some(a),
        _ => None,
    });
    let alias = alias.expect("Int alias");
    match &alias.aliased {
        mml_ast::Type::Ref(r) => assert_eq!(r.name, "Int64"),
        other => panic!("alias target should be a type ref, got {other:?}"),
    }
}
