//! Synthesis of memory helpers for user structs with heap fields.
//!
//! A struct that transitively owns heap data gets `__free_<S>` (release
//! every heap field, consuming the value) and `__clone_<S>` (rebuild via
//! the constructor, deep-copying heap fields). Helpers are appended as
//! members in final, fully-resolved form and registered in the index.

use mml_ast::{
    App, Associativity, BindingArity, BindingMeta, BindingOrigin, Bnd, Expr, Field, FnParam,
    Lambda, Member, Module, Ref, Resolvable, ResolvableId, Seq, SourceOrigin, SrcSpan, Term, Type,
    TypeFn, TypeRef, TypeStruct, Visibility,
};

use crate::diagnostics::Diagnostics;
use crate::stdlib::FN_PRECEDENCE;

use super::heap::TypeInfo;

pub fn run(mut module: Module, _diag: &mut Diagnostics) -> Module {
    let info = TypeInfo::collect(&module);

    let mut generated: Vec<Member> = Vec::new();
    for member in &module.members {
        let Member::TypeStruct(st) = member else {
            continue;
        };
        if st.source != SourceOrigin::Source {
            continue;
        }
        let Some(struct_id) = &st.id else { continue };
        if info.heap_fields(st).is_empty() {
            continue;
        }
        generated.push(free_helper(st, struct_id, &info));
        if let Some(clone) = clone_helper(st, struct_id, &info) {
            generated.push(clone);
        }
    }

    for member in &generated {
        if let Member::Bnd(bnd) = member {
            if let Some(id) = &bnd.id {
                module
                    .resolvables
                    .insert_value(id.clone(), Resolvable::Binding(bnd.clone()));
            }
        }
    }
    module.members.extend(generated);
    module
}

fn unit_ty() -> Type {
    Type::Ref(TypeRef::resolved("Unit", ResolvableId::stdlib("Unit")))
}

fn struct_ty(st: &TypeStruct, id: &ResolvableId) -> Type {
    Type::Ref(TypeRef::resolved(st.name.clone(), id.clone()))
}

fn field_ty(field: &Field) -> Type {
    field
        .type_spec
        .clone()
        .unwrap_or_else(|| field.type_asc.clone())
}

/// Where the release helper for a type lives. Helpers generated in this
/// same pass are addressed by their predetermined `synth::` id.
fn free_target(info: &TypeInfo, ty: &Type) -> Option<(String, ResolvableId)> {
    if let Some(found) = info.free_fn_for(ty) {
        return Some(found);
    }
    let id = ty.nominal_id()?;
    let name = info.structs.get(id).map(|st| st.name.clone())?;
    let mangled = format!("__free_{name}");
    let target = ResolvableId::synth(&mangled);
    Some((mangled, target))
}

fn clone_target(info: &TypeInfo, ty: &Type) -> Option<(String, ResolvableId)> {
    if let Some(found) = info.clone_fn_for(ty) {
        return Some(found);
    }
    let id = ty.nominal_id()?;
    let name = info.structs.get(id).map(|st| st.name.clone())?;
    let mangled = format!("__clone_{name}");
    let target = ResolvableId::synth(&mangled);
    Some((mangled, target))
}

fn param_ref(param_id: &ResolvableId, sty: &Type) -> Ref {
    let mut r = Ref::resolved("s", param_id.clone());
    r.type_spec = Some(sty.clone());
    r
}

/// `s.<field>` with both ends pinned.
fn field_access(param_id: &ResolvableId, sty: &Type, field: &Field) -> Term {
    let mut r = Ref::named(field.name.clone(), SrcSpan::synthetic());
    r.resolved_id = field.id.clone();
    r.qualifier = Some(Box::new(param_ref(param_id, sty)));
    r.type_spec = Some(field_ty(field));
    Term::Ref(r)
}

fn call1(fn_name: &str, fn_id: ResolvableId, fn_ty: Type, arg: Term, result: Type) -> Term {
    let mut head = Ref::resolved(fn_name, fn_id);
    head.type_spec = Some(fn_ty);
    let mut app = App::new(Term::Ref(head), arg);
    app.type_spec = Some(result);
    Term::App(app)
}

fn free_helper(st: &TypeStruct, struct_id: &ResolvableId, info: &TypeInfo) -> Member {
    let mangled = format!("__free_{}", st.name);
    let id = ResolvableId::synth(&mangled);
    let sty = struct_ty(st, struct_id);
    let param_id = ResolvableId::synth(&format!("{mangled}::s"));

    let mut items: Vec<Expr> = Vec::new();
    for field in info.heap_fields(st) {
        let fty = field_ty(field);
        let Some((free_name, free_id)) = free_target(info, &fty) else {
            continue;
        };
        let free_ty = Type::Fn(TypeFn {
            params: vec![fty.clone()],
            ret: Box::new(unit_ty()),
        });
        let call = call1(
            &free_name,
            free_id,
            free_ty,
            field_access(&param_id, &sty, field),
            unit_ty(),
        );
        items.push(Expr::single(call));
    }
    items.push(Expr::single(Term::LiteralUnit(mml_ast::LiteralUnit {
        span: SrcSpan::synthetic(),
    })));

    let seq = Seq {
        items,
        span: SrcSpan::synthetic(),
        type_spec: Some(unit_ty()),
    };

    let param = FnParam {
        name: "s".to_owned(),
        id: Some(param_id),
        type_asc: Some(sty.clone()),
        type_spec: Some(sty.clone()),
        consuming: true,
        span: SrcSpan::synthetic(),
        source: SourceOrigin::Synth,
    };
    let fn_ty = Type::Fn(TypeFn {
        params: vec![sty],
        ret: Box::new(unit_ty()),
    });

    let mut body = Expr::single(Term::Seq(seq));
    body.type_spec = Some(unit_ty());
    let mut lambda = Lambda::new(vec![param], body, SrcSpan::synthetic());
    lambda.type_asc = Some(unit_ty());
    lambda.type_spec = Some(fn_ty.clone());

    callable_member(mangled, id, BindingOrigin::Destructor, lambda, fn_ty)
}

fn clone_helper(st: &TypeStruct, struct_id: &ResolvableId, info: &TypeInfo) -> Option<Member> {
    let mangled = format!("__clone_{}", st.name);
    let id = ResolvableId::synth(&mangled);
    let sty = struct_ty(st, struct_id);
    let param_id = ResolvableId::synth(&format!("{mangled}::s"));
    let ctor_id = info.ctor_fns.get(&st.name)?.clone();

    // __mk_<S> applied field by field; heap fields pass through their
    // clone helper, the rest are copied as-is.
    let ctor_params: Vec<Type> = st.fields.iter().map(field_ty).collect();
    let mut head_ref = Ref::resolved(format!("__mk_{}", st.name), ctor_id);
    head_ref.type_spec = Some(Type::Fn(TypeFn {
        params: ctor_params.clone(),
        ret: Box::new(sty.clone()),
    }));
    let mut spine: Term = Term::Ref(head_ref);
    let mut remaining = ctor_params;

    for field in &st.fields {
        let fty = field_ty(field);
        let arg = if info.is_heap(&fty) {
            let (clone_name, clone_id) = clone_target(info, &fty)?;
            let clone_ty = Type::Fn(TypeFn {
                params: vec![fty.clone()],
                ret: Box::new(fty.clone()),
            });
            call1(
                &clone_name,
                clone_id,
                clone_ty,
                field_access(&param_id, &sty, field),
                fty.clone(),
            )
        } else {
            field_access(&param_id, &sty, field)
        };
        remaining.remove(0);
        let result = if remaining.is_empty() {
            sty.clone()
        } else {
            Type::Fn(TypeFn {
                params: remaining.clone(),
                ret: Box::new(sty.clone()),
            })
        };
        let mut app = App::new(spine, arg);
        app.type_spec = Some(result);
        spine = Term::App(app);
    }

    let param = FnParam {
        name: "s".to_owned(),
        id: Some(param_id),
        type_asc: Some(sty.clone()),
        type_spec: Some(sty.clone()),
        consuming: false,
        span: SrcSpan::synthetic(),
        source: SourceOrigin::Synth,
    };
    let fn_ty = Type::Fn(TypeFn {
        params: vec![sty.clone()],
        ret: Box::new(sty.clone()),
    });

    let mut body = Expr::single(spine);
    body.type_spec = Some(sty);
    let mut lambda = Lambda::new(vec![param], body, SrcSpan::synthetic());
    lambda.type_asc = lambda_ret(&fn_ty);
    lambda.type_spec = Some(fn_ty.clone());

    Some(callable_member(
        mangled,
        id,
        BindingOrigin::Function,
        lambda,
        fn_ty,
    ))
}

fn lambda_ret(fn_ty: &Type) -> Option<Type> {
    match fn_ty {
        Type::Fn(f) => Some((*f.ret).clone()),
        _ => None,
    }
}

fn callable_member(
    mangled: String,
    id: ResolvableId,
    origin: BindingOrigin,
    lambda: Lambda,
    fn_ty: Type,
) -> Member {
    Member::Bnd(Bnd {
        id: Some(id),
        name: mangled.clone(),
        value: Expr::single(Term::Lambda(lambda)),
        type_asc: None,
        type_spec: Some(fn_ty),
        meta: Some(BindingMeta {
            origin,
            arity: BindingArity::Unary,
            precedence: FN_PRECEDENCE,
            assoc: Associativity::Left,
            original_name: mangled.clone(),
            mangled_name: mangled,
        }),
        doc_comment: None,
        visibility: Visibility::Public,
        span: SrcSpan::synthetic(),
        source: SourceOrigin::Synth,
    })
}
