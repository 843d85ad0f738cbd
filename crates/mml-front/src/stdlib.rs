//! The compiled-in prelude.
//!
//! Every module gets the same fixed set of native types, aliases,
//! operators, and builtin functions prepended to its members before any
//! semantic phase runs. Prelude nodes are synthesized: ids carry the
//! `stdlib::` prefix and spans are invalid.

use indexmap::IndexMap;

use mml_ast::{
    Associativity, BindingArity, BindingMeta, BindingOrigin, Bnd, Expr, FnParam, Lambda, MemEffect,
    Member, Module, NativeImpl, NativeRep, ResolvableId, SourceOrigin, SrcSpan, Term, Type,
    TypeAlias, TypeDef, TypeRef, Visibility,
};

use crate::parser::mangle_operator;

/// Precedence of juxtaposition (function application). Strictly above
/// every operator so `f x + y` parses as `(f x) + y`.
pub const FN_PRECEDENCE: u32 = 100;

/// Prepends the prelude to a module's members.
pub fn inject(module: &mut Module) {
    let mut members = prelude();
    members.append(&mut module.members);
    module.members = members;
}

fn prelude() -> Vec<Member> {
    let mut out = Vec::new();

    for (name, llvm) in [
        ("Int64", "i64"),
        ("Int32", "i32"),
        ("Int16", "i16"),
        ("Int8", "i8"),
        ("Float", "float"),
        ("Double", "double"),
        ("Bool", "i1"),
        ("Char", "i8"),
        ("Unit", "void"),
        ("SizeT", "i64"),
    ] {
        out.push(native_primitive(name, llvm));
    }
    out.push(native_pointer("CharPtr", "i8"));
    out.push(string_struct());

    for (name, target) in [("Int", "Int64"), ("Byte", "Int8"), ("Word", "Int8")] {
        out.push(type_alias(name, target));
    }

    // Binary arithmetic on Int.
    for (sym, prec, template) in [
        ("*", 80, "mul"),
        ("/", 80, "sdiv"),
        ("%", 80, "srem"),
        ("+", 60, "add"),
        ("-", 60, "sub"),
    ] {
        out.push(operator(
            sym,
            &[("a", "Int"), ("b", "Int")],
            "Int",
            prec,
            Associativity::Left,
            template,
        ));
    }

    // Comparisons.
    for (sym, template) in [
        ("==", "icmp eq"),
        ("!=", "icmp ne"),
        ("<", "icmp slt"),
        (">", "icmp sgt"),
        ("<=", "icmp sle"),
        (">=", "icmp sge"),
    ] {
        out.push(operator(
            sym,
            &[("a", "Int"), ("b", "Int")],
            "Bool",
            50,
            Associativity::Left,
            template,
        ));
    }

    // Prefix arithmetic.
    for (sym, template) in [("+", "prefix add"), ("-", "prefix sub")] {
        out.push(operator(
            sym,
            &[("a", "Int")],
            "Int",
            95,
            Associativity::Right,
            template,
        ));
    }

    // Boolean connectives.
    out.push(operator(
        "and",
        &[("a", "Bool"), ("b", "Bool")],
        "Bool",
        40,
        Associativity::Left,
        "and",
    ));
    out.push(operator(
        "or",
        &[("a", "Bool"), ("b", "Bool")],
        "Bool",
        30,
        Associativity::Left,
        "or",
    ));
    out.push(operator(
        "not",
        &[("a", "Bool")],
        "Bool",
        95,
        Associativity::Right,
        "xor 1",
    ));

    // Builtin functions. Anything handing out a fresh `String` allocates.
    out.push(builtin(
        "print",
        &[("s", "String", false)],
        "Unit",
        MemEffect::NoAlloc,
        "mml_print",
    ));
    out.push(builtin(
        "println",
        &[("s", "String", false)],
        "Unit",
        MemEffect::NoAlloc,
        "mml_println",
    ));
    out.push(builtin(
        "mml_sys_flush",
        &[],
        "Unit",
        MemEffect::NoAlloc,
        "mml_sys_flush",
    ));
    out.push(builtin(
        "readline",
        &[],
        "String",
        MemEffect::Alloc,
        "mml_readline",
    ));
    out.push(builtin(
        "concat",
        &[("a", "String", false), ("b", "String", false)],
        "String",
        MemEffect::Alloc,
        "mml_str_concat",
    ));
    out.push(builtin(
        "to_string",
        &[("n", "Int", false)],
        "String",
        MemEffect::Alloc,
        "mml_int_to_str",
    ));
    out.push(builtin(
        "str_to_int",
        &[("s", "String", false)],
        "Int",
        MemEffect::NoAlloc,
        "mml_str_to_int",
    ));

    // Memory helpers for the one heap type the prelude ships.
    out.push(builtin(
        "__free_String",
        &[("s", "String", true)],
        "Unit",
        MemEffect::NoAlloc,
        "mml_str_free",
    ));
    out.push(builtin(
        "__clone_String",
        &[("s", "String", false)],
        "String",
        MemEffect::Alloc,
        "mml_str_clone",
    ));

    out
}

fn ty(name: &str) -> Type {
    Type::Ref(TypeRef::named(name, SrcSpan::synthetic()))
}

fn native_primitive(name: &str, llvm: &str) -> Member {
    Member::TypeDef(TypeDef {
        name: name.to_owned(),
        id: Some(ResolvableId::stdlib(name)),
        rep: NativeRep::Primitive {
            llvm: llvm.to_owned(),
        },
        heap: false,
        doc_comment: None,
        visibility: Visibility::Public,
        span: SrcSpan::synthetic(),
        source: SourceOrigin::Synth,
    })
}

fn native_pointer(name: &str, pointee: &str) -> Member {
    Member::TypeDef(TypeDef {
        name: name.to_owned(),
        id: Some(ResolvableId::stdlib(name)),
        rep: NativeRep::Pointer {
            pointee: pointee.to_owned(),
        },
        heap: false,
        doc_comment: None,
        visibility: Visibility::Public,
        span: SrcSpan::synthetic(),
        source: SourceOrigin::Synth,
    })
}

/// `String` is a heap struct of length plus character data.
fn string_struct() -> Member {
    let mut fields = IndexMap::new();
    fields.insert("length".to_owned(), ty("SizeT"));
    fields.insert("data".to_owned(), ty("CharPtr"));
    Member::TypeDef(TypeDef {
        name: "String".to_owned(),
        id: Some(ResolvableId::stdlib("String")),
        rep: NativeRep::Struct { fields },
        heap: true,
        doc_comment: None,
        visibility: Visibility::Public,
        span: SrcSpan::synthetic(),
        source: SourceOrigin::Synth,
    })
}

fn type_alias(name: &str, target: &str) -> Member {
    Member::TypeAlias(TypeAlias {
        name: name.to_owned(),
        id: Some(ResolvableId::stdlib(name)),
        aliased: ty(target),
        type_spec: None,
        doc_comment: None,
        visibility: Visibility::Public,
        span: SrcSpan::synthetic(),
        source: SourceOrigin::Synth,
    })
}

fn native_params(mangled: &str, specs: &[(&str, &str, bool)]) -> Vec<FnParam> {
    specs
        .iter()
        .map(|(name, ty_name, consuming)| FnParam {
            name: (*name).to_owned(),
            id: Some(ResolvableId::stdlib(&format!("{mangled}::{name}"))),
            type_asc: Some(ty(ty_name)),
            type_spec: None,
            consuming: *consuming,
            span: SrcSpan::synthetic(),
            source: SourceOrigin::Synth,
        })
        .collect()
}

fn native_callable(
    original: &str,
    mangled: String,
    origin: BindingOrigin,
    params: Vec<FnParam>,
    ret: Type,
    precedence: u32,
    assoc: Associativity,
    mem_effect: MemEffect,
    template: &str,
) -> Member {
    let arity = BindingArity::of(params.len());
    let body = Expr::single(Term::Native(NativeImpl {
        mem_effect,
        template: Some(template.to_owned()),
        span: SrcSpan::synthetic(),
    }));
    let mut lambda = Lambda::new(params, body, SrcSpan::synthetic());
    lambda.type_asc = Some(ret);

    Member::Bnd(Bnd {
        id: Some(ResolvableId::stdlib(&mangled)),
        name: mangled.clone(),
        value: Expr::single(Term::Lambda(lambda)),
        type_asc: None,
        type_spec: None,
        meta: Some(BindingMeta {
            origin,
            arity,
            precedence,
            assoc,
            original_name: original.to_owned(),
            mangled_name: mangled,
        }),
        doc_comment: None,
        visibility: Visibility::Public,
        span: SrcSpan::synthetic(),
        source: SourceOrigin::Synth,
    })
}

fn operator(
    sym: &str,
    param_specs: &[(&str, &str)],
    ret: &str,
    precedence: u32,
    assoc: Associativity,
    template: &str,
) -> Member {
    let mangled = mangle_operator(sym, param_specs.len());
    let specs: Vec<(&str, &str, bool)> =
        param_specs.iter().map(|(n, t)| (*n, *t, false)).collect();
    let params = native_params(&mangled, &specs);
    native_callable(
        sym,
        mangled,
        BindingOrigin::Operator,
        params,
        ty(ret),
        precedence,
        assoc,
        MemEffect::NoAlloc,
        template,
    )
}

fn builtin(
    name: &str,
    param_specs: &[(&str, &str, bool)],
    ret: &str,
    mem_effect: MemEffect,
    template: &str,
) -> Member {
    let params = native_params(name, param_specs);
    native_callable(
        name,
        name.to_owned(),
        BindingOrigin::Function,
        params,
        ty(ret),
        FN_PRECEDENCE,
        Associativity::Left,
        mem_effect,
        template,
    )
}
