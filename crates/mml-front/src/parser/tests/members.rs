use indoc::indoc;
use mml_ast::{
    Associativity, BindingArity, BindingOrigin, Member, NativeRep, SourceOrigin, Term,
};

use crate::test_utils::{binding, expr_sexpr, parsed};

#[test]
fn let_member_is_a_plain_binding() {
    let (module, diag) = parsed("let x = 5;");
    assert!(diag.is_empty());
    assert_eq!(module.members.len(), 1);
    let x = binding(&module, "x");
    assert!(x.meta.is_none());
    assert_eq!(expr_sexpr(&x.value), "(int 5)");
}

#[test]
fn let_member_with_ascription() {
    let (module, _) = parsed(r#"let s: String = "done";"#);
    let s = binding(&module, "s");
    assert!(s.type_asc.is_some());
    assert_eq!(expr_sexpr(&s.value), "(str \"done\")");
}

#[test]
fn fn_member_wraps_a_lambda() {
    let (module, diag) = parsed("fn add(a: Int, b: Int): Int = a + b;");
    assert!(diag.is_empty());
    let add = binding(&module, "add");
    let meta = add.meta.as_ref().expect("functions carry meta");
    assert_eq!(meta.origin, BindingOrigin::Function);
    assert_eq!(meta.arity, BindingArity::Binary);
    assert_eq!(meta.original_name, "add");

    let lambda = add.lambda().expect("value is a lambda");
    assert_eq!(lambda.params.len(), 2);
    assert!(lambda.params.iter().all(|p| p.type_asc.is_some()));
    assert!(lambda.type_asc.is_some());
    assert_eq!(
        expr_sexpr(&lambda.body),
        "(terms (ref a) (ref +) (ref b))"
    );
}

#[test]
fn nullary_fn() {
    let (module, _) = parsed("fn f(): Unit = @native;");
    let f = binding(&module, "f");
    assert_eq!(f.meta.as_ref().expect("meta").arity, BindingArity::Nullary);
    assert_eq!(expr_sexpr(&f.lambda().expect("lambda").body), "(native)");
}

#[test]
fn operator_member_mangles_arity() {
    let (module, diag) = parsed("op -(a: Int): Int 95 right = ???;");
    assert!(diag.is_empty());
    let minus = binding(&module, "op.minus.1");
    let meta = minus.meta.as_ref().expect("meta");
    assert_eq!(meta.origin, BindingOrigin::Operator);
    assert_eq!(meta.arity, BindingArity::Unary);
    assert_eq!(meta.precedence, 95);
    assert_eq!(meta.assoc, Associativity::Right);
    assert_eq!(meta.original_name, "-");
    assert_eq!(meta.mangled_name, "op.minus.1");
}

#[test]
fn operator_defaults_by_arity() {
    let (module, _) = parsed("op ><(a: Int, b: Int): Bool = ???;");
    let meta = binding(&module, "op.gtlt.2").meta.as_ref().expect("meta").clone();
    assert_eq!(meta.precedence, 50);
    assert_eq!(meta.assoc, Associativity::Left);
}

#[test]
fn alphanumeric_operator_name() {
    let (module, _) = parsed("op xor(a: Bool, b: Bool): Bool 40 left = ???;");
    let meta = binding(&module, "op.xor.2").meta.as_ref().expect("meta").clone();
    assert_eq!(meta.original_name, "xor");
}

#[test]
fn consuming_parameter_flag() {
    let (module, _) = parsed("fn consume(~s: String): Unit = @native;");
    let lambda = binding(&module, "consume").lambda().expect("lambda");
    assert!(lambda.params[0].consuming);
}

#[test]
fn native_type_def() {
    let (module, _) = parsed("type MyInt = @native[t=i64];");
    match &module.members[0] {
        Member::TypeDef(def) => {
            assert_eq!(def.name, "MyInt");
            assert!(!def.heap);
            assert!(matches!(&def.rep, NativeRep::Primitive { llvm } if llvm == "i64"));
        }
        other => panic!("expected a type def, got {other:?}"),
    }
}

#[test]
fn native_heap_pointer_type() {
    let (module, _) = parsed("type Buf = @native[t=*i8, mem=heap];");
    match &module.members[0] {
        Member::TypeDef(def) => {
            assert!(def.heap);
            assert!(matches!(&def.rep, NativeRep::Pointer { pointee } if pointee == "i8"));
        }
        other => panic!("expected a type def, got {other:?}"),
    }
}

#[test]
fn type_alias_member() {
    let (module, _) = parsed("type Id = Int;");
    match &module.members[0] {
        Member::TypeAlias(alias) => {
            assert_eq!(alias.name, "Id");
            assert!(matches!(&alias.aliased, mml_ast::Type::Ref(r) if r.name == "Int"));
        }
        other => panic!("expected a type alias, got {other:?}"),
    }
}

#[test]
fn struct_member_synthesizes_constructor() {
    let (module, diag) = parsed("struct Point { x: Int, y: Int };");
    assert!(diag.is_empty());
    assert_eq!(module.members.len(), 2);

    match &module.members[0] {
        Member::TypeStruct(st) => {
            assert_eq!(st.name, "Point");
            assert_eq!(st.fields.len(), 2);
        }
        other => panic!("expected a struct, got {other:?}"),
    }

    let ctor = binding(&module, "__mk_Point");
    let meta = ctor.meta.as_ref().expect("meta");
    assert_eq!(meta.origin, BindingOrigin::Constructor);
    assert_eq!(meta.original_name, "Point");
    assert_eq!(ctor.source, SourceOrigin::Synth);
    assert!(matches!(
        ctor.lambda().expect("lambda").body.only_term(),
        Some(Term::DataConstructor(_))
    ));
}

#[test]
fn empty_struct_is_a_member_error() {
    let (module, _) = parsed("struct Empty { };");
    assert!(matches!(module.members[0], Member::ParseError(_)));
}

#[test]
fn module_header_overrides_the_name() {
    let source = indoc! {"
        module Demo =
        let x = 1;
    "};
    let (module, diag) = parsed(source);
    assert!(diag.is_empty());
    assert_eq!(module.name, "Demo");
    assert_eq!(module.members.len(), 1);
}

#[test]
fn two_plain_lets_stay_separate_members() {
    let source = indoc! {"
        let a = 1;
        let b = 2;
    "};
    let (module, diag) = parsed(source);
    assert!(diag.is_empty());
    assert_eq!(module.members.len(), 2);
}

#[test]
fn member_spans_are_valid() {
    let (module, _) = parsed("let x = 5;\nfn f(): Unit = @native;");
    for member in &module.members {
        assert!(member.span().is_valid(), "span of {member:?}");
    }
}
