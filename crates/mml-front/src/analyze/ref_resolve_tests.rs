use indoc::indoc;
use mml_ast::{Module, Term};

use crate::diagnostics::{CompilationError, Diagnostics, SemanticError};

use super::{duplicates, id_assign, ref_resolve, type_resolve};

fn run(source: &str) -> (Module, Diagnostics) {
    let (mut module, _) = crate::parser::parse(source, "Test");
    crate::stdlib::inject(&mut module);
    let mut diag = Diagnostics::new();
    let module = duplicates::run(module, &mut diag);
    let module = id_assign::run(module, &mut diag);
    let module = type_resolve::run(module, &mut diag);
    let module = ref_resolve::run(module, &mut diag);
    (module, diag)
}

fn first_ref<'m>(module: &'m Module, binding: &str) -> &'m mml_ast::Ref {
    let bnd = module.binding(binding).expect("binding present");
    mml_ast::visit::refs_in(&bnd.value)
        .into_iter()
        .next()
        .expect("at least one reference")
}

#[test]
fn parameter_scope_beats_module_scope() {
    let source = indoc! {"
        let a = 1;
        fn f(a: Int): Int = a;
    "};
    let (module, diag) = run(source);
    assert!(diag.is_empty());
    let r = first_ref(&module, "f");
    let id = r.resolved_id.as_ref().expect("resolved");
    assert!(id.as_str().contains("::param::"), "resolved to {id}");
}

#[test]
fn module_scope_resolves_by_declaration() {
    let source = indoc! {"
        let a = 1;
        let b = a;
    "};
    let (module, diag) = run(source);
    assert!(diag.is_empty());
    let a_id = module.binding("a").expect("a").id.clone().expect("id");
    assert_eq!(first_ref(&module, "b").resolved_id.as_ref(), Some(&a_id));
}

#[test]
fn local_binding_scopes_over_the_rest_of_the_sequence() {
    let (module, diag) = run("fn f(): Int = let a = 1; a + a;");
    assert!(diag.is_empty());
    let bnd = module.binding("f").expect("f");
    let refs = mml_ast::visit::refs_in(&bnd.value);
    let a_refs: Vec<_> = refs.iter().filter(|r| r.name == "a").collect();
    assert_eq!(a_refs.len(), 2);
    for r in a_refs {
        let id = r.resolved_id.as_ref().expect("resolved");
        assert!(id.as_str().contains("::let::"), "resolved to {id}");
    }
}

#[test]
fn undefined_reference_wraps_the_expression() {
    let (module, diag) = run("let x = y + 1;");
    assert!(matches!(
        diag.errors().first(),
        Some(CompilationError::Semantic(SemanticError::UndefinedRef { name, .. })) if name == "y"
    ));
    let x = module.binding("x").expect("x");
    assert!(matches!(x.value.only_term(), Some(Term::Invalid(_))));
}

#[test]
fn ambiguous_operator_keeps_candidates() {
    let (module, diag) = run("let x = 1 - 2;");
    assert!(diag.is_empty());
    let bnd = module.binding("x").expect("x");
    let minus = mml_ast::visit::refs_in(&bnd.value)
        .into_iter()
        .find(|r| r.name == "-")
        .expect("minus reference");
    assert!(minus.resolved_id.is_none());
    assert_eq!(minus.candidate_ids.len(), 2);
}

#[test]
fn constructor_resolves_under_the_struct_name() {
    let source = indoc! {"
        struct P { x: Int };
        let p = P 1;
    "};
    let (module, diag) = run(source);
    assert!(diag.is_empty());
    let ctor_id = module.binding("__mk_P").expect("ctor").id.clone().expect("id");
    let r = first_ref(&module, "p");
    assert_eq!(r.resolved_id.as_ref(), Some(&ctor_id));
}

#[test]
fn qualified_reference_resolves_only_its_base() {
    let (module, diag) = run("fn len(s: String): SizeT = s.length;");
    assert!(diag.is_empty());
    let bnd = module.binding("len").expect("len");
    let refs = mml_ast::visit::refs_in(&bnd.value);
    let outer = refs.iter().find(|r| r.name == "length").expect("selection");
    let base = refs.iter().find(|r| r.name == "s").expect("base");
    assert!(outer.resolved_id.is_none());
    assert!(base.resolved_id.is_some());
}

#[test]
fn prelude_functions_are_in_scope() {
    let (module, diag) = run("fn f(): Unit = println \"hi\";");
    assert!(diag.is_empty());
    let r = first_ref(&module, "f");
    assert_eq!(r.resolved_id.as_ref().map(|id| id.as_str()), Some("stdlib::println"));
}
