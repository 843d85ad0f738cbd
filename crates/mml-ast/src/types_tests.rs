use crate::ids::ResolvableId;
use crate::types::{Type, TypeRef, TypeStructRef};

fn resolved(name: &str) -> Type {
    Type::Ref(TypeRef::resolved(name, ResolvableId::stdlib(name)))
}

#[test]
fn resolved_refs_compare_by_id() {
    assert!(resolved("Int64").same_type(&resolved("Int64")));
    assert!(!resolved("Int64").same_type(&resolved("Int32")));
}

#[test]
fn unresolved_refs_never_compare_equal() {
    let a = Type::Ref(TypeRef::named("Int64", crate::span::SrcSpan::synthetic()));
    let b = Type::Ref(TypeRef::named("Int64", crate::span::SrcSpan::synthetic()));
    assert!(!a.same_type(&b));
}

#[test]
fn struct_handle_matches_resolved_ref_with_same_id() {
    let id = ResolvableId::new("m::struct::Point::3");
    let as_ref = Type::Ref(TypeRef::resolved("Point", id.clone()));
    let as_struct = Type::Struct(TypeStructRef {
        name: "Point".to_owned(),
        id,
    });
    assert!(as_ref.same_type(&as_struct));
}

#[test]
fn function_types_compare_pointwise() {
    let f = Type::fun(vec![resolved("Int64")], resolved("Bool"));
    let g = Type::fun(vec![resolved("Int64")], resolved("Bool"));
    let h = Type::fun(vec![resolved("Bool")], resolved("Bool"));
    assert!(f.same_type(&g));
    assert!(!f.same_type(&h));
    assert!(!f.same_type(&resolved("Bool")));
}

#[test]
fn groups_are_transparent() {
    let grouped = Type::Group(Box::new(resolved("Int64")));
    assert!(grouped.same_type(&resolved("Int64")));
}

#[test]
fn unit_is_structural() {
    assert!(Type::Unit.same_type(&Type::Unit));
    assert!(!Type::Unit.same_type(&resolved("Int64")));
}

#[test]
fn invalid_types_never_compare_equal() {
    let inv = Type::Invalid(crate::types::InvalidType {
        original: Box::new(resolved("Int64")),
        span: crate::span::SrcSpan::synthetic(),
    });
    assert!(!inv.same_type(&inv.clone()));
    assert!(!inv.same_type(&resolved("Int64")));
}

#[test]
fn display_renders_surface_syntax() {
    assert_eq!(resolved("Int64").to_string(), "Int64");
    assert_eq!(Type::Unit.to_string(), "()");
    assert_eq!(
        Type::fun(vec![resolved("Int")], resolved("Bool")).to_string(),
        "(Int) -> Bool"
    );
    assert_eq!(
        Type::Tuple(vec![resolved("Int"), resolved("Bool")]).to_string(),
        "(Int, Bool)"
    );
}
