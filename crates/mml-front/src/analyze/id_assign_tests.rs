use mml_ast::{Module, Term};

use crate::diagnostics::Diagnostics;

use super::id_assign;

fn run(source: &str) -> Module {
    let (mut module, _) = crate::parser::parse(source, "Test");
    crate::stdlib::inject(&mut module);
    let mut diag = Diagnostics::new();
    id_assign::run(module, &mut diag)
}

#[test]
fn every_resolvable_gets_an_id() {
    let module = run("fn f(a: Int): Int = let b = a; b;");
    let f = module.binding("f").expect("binding present");
    assert!(f.id.is_some());
    let lambda = f.lambda().expect("lambda");
    assert!(lambda.params[0].id.is_some());

    let mut let_ids = Vec::new();
    mml_ast::visit::walk_expr(&lambda.body, &mut |term| {
        if let Term::Let(l) = term {
            let_ids.push(l.id.clone());
        }
    });
    assert_eq!(let_ids.len(), 1);
    assert!(let_ids[0].is_some());
}

#[test]
fn prelude_ids_are_untouched() {
    let module = run("let x = 1;");
    let plus = module.binding("op.plus.2").expect("prelude operator");
    assert!(plus.id.as_ref().expect("id").is_stdlib());
}

#[test]
fn reassignment_is_a_no_op() {
    let module = run("fn f(a: Int): Int = a;\nlet x = 1;");
    let mut diag = Diagnostics::new();
    let again = id_assign::run(module.clone(), &mut diag);
    assert!(diag.is_empty());
    assert_eq!(module, again);
}

#[test]
fn index_is_seeded_with_values_and_types() {
    let module = run("struct P { x: Int };\nlet v = 1;");
    let v_id = module.binding("v").expect("binding").id.clone().expect("id");
    assert!(module.resolvables.value(&v_id).is_some());

    let p = module.members.iter().find_map(|m| match m {
        mml_ast::Member::TypeStruct(st) => Some(st),
        _ => None,
    });
    let p_id = p.expect("struct").id.clone().expect("id");
    assert!(module.resolvables.type_entry(&p_id).is_some());
}

#[test]
fn ids_embed_the_module_name() {
    let module = run("let x = 1;");
    let id = module.binding("x").expect("binding").id.clone().expect("id");
    assert!(id.as_str().starts_with("Test::bnd::x::"));
}
