use indoc::indoc;
use mml_ast::{Member, Module, ResolvableId, Type};

use crate::diagnostics::{CompilationError, Diagnostics, SemanticError, TypeError};

use super::{duplicates, id_assign, type_resolve};

fn run(source: &str) -> (Module, Diagnostics) {
    let (mut module, _) = crate::parser::parse(source, "Test");
    crate::stdlib::inject(&mut module);
    let mut diag = Diagnostics::new();
    let module = duplicates::run(module, &mut diag);
    let module = id_assign::run(module, &mut diag);
    let module = type_resolve::run(module, &mut diag);
    (module, diag)
}

fn asc_of<'m>(module: &'m Module, name: &str) -> &'m Type {
    module
        .binding(name)
        .expect("binding present")
        .type_asc
        .as_ref()
        .expect("ascription present")
}

#[test]
fn alias_collapses_to_the_native_def() {
    let (module, diag) = run("let x: Int = 1;");
    assert!(diag.is_empty());
    assert_eq!(
        asc_of(&module, "x").nominal_id(),
        Some(&ResolvableId::stdlib("Int64"))
    );
}

#[test]
fn user_alias_chain_collapses() {
    let source = indoc! {"
        type A = Int;
        type B = A;
        let x: B = 1;
    "};
    let (module, diag) = run(source);
    assert!(diag.is_empty());
    assert_eq!(
        asc_of(&module, "x").nominal_id(),
        Some(&ResolvableId::stdlib("Int64"))
    );
}

#[test]
fn undefined_type_wraps_invalid() {
    let (module, diag) = run("let x: Missing = 1;");
    assert!(matches!(
        diag.errors().first(),
        Some(CompilationError::Semantic(SemanticError::UndefinedTypeRef { name, .. }))
            if name == "Missing"
    ));
    assert!(asc_of(&module, "x").is_invalid());
}

#[test]
fn alias_cycle_reports_unresolvable() {
    let source = indoc! {"
        type A = B;
        type B = A;
        let x: A = 1;
    "};
    let (module, diag) = run(source);
    assert!(diag.errors().iter().any(|e| matches!(
        e,
        CompilationError::Semantic(SemanticError::TypeCheckingError(
            TypeError::UnresolvableType { .. }
        ))
    )));
    assert!(asc_of(&module, "x").is_invalid());
}

#[test]
fn struct_fields_get_canonical_types() {
    let (module, diag) = run("struct P { x: Int };");
    assert!(diag.is_empty());
    let st = module.members.iter().find_map(|m| match m {
        Member::TypeStruct(st) => Some(st),
        _ => None,
    });
    let field = &st.expect("struct").fields[0];
    assert_eq!(
        field.type_spec.as_ref().and_then(Type::nominal_id),
        Some(&ResolvableId::stdlib("Int64"))
    );
}

#[test]
fn parameter_ascriptions_resolve_in_place() {
    let (module, diag) = run("fn f(a: Int): Bool = true;");
    assert!(diag.is_empty());
    let lambda = module.binding("f").expect("binding").lambda().expect("lambda");
    assert_eq!(
        lambda.params[0].type_asc.as_ref().and_then(Type::nominal_id),
        Some(&ResolvableId::stdlib("Int64"))
    );
    assert_eq!(
        lambda.type_asc.as_ref().and_then(Type::nominal_id),
        Some(&ResolvableId::stdlib("Bool"))
    );
}

#[test]
fn unit_syntax_canonicalizes_to_the_prelude_unit() {
    let (module, diag) = run("fn f(): () = @native;");
    assert!(diag.is_empty());
    let lambda = module.binding("f").expect("binding").lambda().expect("lambda");
    assert_eq!(
        lambda.type_asc.as_ref().and_then(Type::nominal_id),
        Some(&ResolvableId::stdlib("Unit"))
    );
}
