//! Bidirectional, monomorphic type checking.
//!
//! Stage one copies declared parameter ascriptions into computed types
//! and complains about the ones that are missing. Stage two checks every
//! body: in check mode against an expected type where the context
//! provides one, in synthesis mode otherwise. Return types may be
//! inferred from bodies; recursive functions must declare theirs. Type
//! equality is nominal: resolved names compare by declaration id.

use indexmap::IndexMap;

use mml_ast::{
    App, BindingOrigin, Cond, Expr, Member, Module, NativeRep, Ref, ResolvableId, SrcSpan, Term,
    Type, TypeFn, TypeRef,
};

use crate::diagnostics::{Diagnostics, TypeError};

use super::heap::TypeInfo;

/// Signature of a module-level binding as the checker sees it.
#[derive(Debug, Clone)]
enum Sig {
    Value(Option<Type>),
    Fn {
        params: Option<Vec<Type>>,
        ret: Option<Type>,
    },
}

pub fn run(mut module: Module, diag: &mut Diagnostics) -> Module {
    let info = TypeInfo::collect(&module);
    let mut sigs: IndexMap<ResolvableId, Sig> = IndexMap::new();

    // Stage one: parameter ascriptions become computed types; signatures
    // are collected for every binding so bodies can reference each other.
    for member in &mut module.members {
        let Member::Bnd(bnd) = member else { continue };
        let Some(id) = bnd.id.clone() else { continue };
        match &bnd.meta {
            Some(meta) => {
                let origin = meta.origin;
                let Some(lambda) = bnd.lambda_mut() else {
                    sigs.insert(id, Sig::Value(None));
                    continue;
                };
                let mut params: Vec<Type> = Vec::new();
                let mut complete = true;
                for param in &mut lambda.params {
                    match &param.type_asc {
                        Some(t) if !t.is_invalid() => {
                            param.type_spec = Some(t.clone());
                            params.push(t.clone());
                        }
                        Some(_) => complete = false,
                        None => {
                            complete = false;
                            let err = match origin {
                                BindingOrigin::Operator => TypeError::MissingOperatorParameterType {
                                    name: param.name.clone(),
                                    span: param.span,
                                },
                                _ => TypeError::MissingParameterType {
                                    name: param.name.clone(),
                                    span: param.span,
                                },
                            };
                            diag.error(err);
                        }
                    }
                }
                let ret = lambda
                    .type_asc
                    .clone()
                    .filter(|t| !t.is_invalid());
                sigs.insert(
                    id,
                    Sig::Fn {
                        params: complete.then_some(params),
                        ret,
                    },
                );
            }
            None => {
                let asc = bnd.type_asc.clone().filter(|t| !t.is_invalid());
                sigs.insert(id, Sig::Value(asc));
            }
        }
    }

    // Stage two: check bodies in declaration order, feeding inferred
    // return types back so later members see them.
    let mut order: Vec<usize> = Vec::new();
    for (i, member) in module.members.iter().enumerate() {
        if matches!(member, Member::Bnd(_)) {
            order.push(i);
        }
    }
    for i in order {
        let Member::Bnd(bnd) = &mut module.members[i] else {
            continue;
        };
        let mut checker = Checker {
            sigs: &mut sigs,
            info: &info,
            locals: Vec::new(),
            self_id: bnd.id.clone(),
            recursion_reported: false,
            diag: &mut *diag,
        };
        checker.check_binding(bnd);
    }

    module
}

fn known(name: &str) -> Type {
    Type::Ref(TypeRef::resolved(name, ResolvableId::stdlib(name)))
}

struct Checker<'a, 'd> {
    sigs: &'a mut IndexMap<ResolvableId, Sig>,
    info: &'a TypeInfo,
    locals: Vec<IndexMap<ResolvableId, Type>>,
    self_id: Option<ResolvableId>,
    recursion_reported: bool,
    diag: &'d mut Diagnostics,
}

impl Checker<'_, '_> {
    fn check_binding(&mut self, bnd: &mut mml_ast::Bnd) {
        let is_callable = bnd.meta.is_some();
        let origin = bnd.meta.as_ref().map(|m| m.origin);
        let surface = bnd.surface_name().to_owned();
        let bnd_span = bnd.span;
        let id = bnd.id.clone();

        if is_callable {
            let Some(lambda) = bnd.lambda_mut() else { return };
            let mut frame = IndexMap::new();
            for param in &lambda.params {
                if let (Some(pid), Some(ty)) = (&param.id, &param.type_spec) {
                    frame.insert(pid.clone(), ty.clone());
                }
            }
            self.locals.push(frame);

            let declared = lambda.type_asc.clone().filter(|t| !t.is_invalid());
            let declared_invalid =
                lambda.type_asc.as_ref().is_some_and(|t| t.is_invalid());
            let body_ty = self.check_expr(&mut lambda.body, declared.as_ref());
            self.locals.pop();

            let ret = declared.clone().or(body_ty);
            if ret.is_none()
                && !declared_invalid
                && !self.recursion_reported
                && bnd.source == mml_ast::SourceOrigin::Source
            {
                let err = match origin {
                    Some(BindingOrigin::Operator) => TypeError::MissingOperatorReturnType {
                        name: surface.clone(),
                        span: bnd_span,
                    },
                    _ => TypeError::MissingReturnType {
                        name: surface.clone(),
                        span: bnd_span,
                    },
                };
                self.diag.error(err);
            }

            // Publish the (possibly inferred) return type and pin the
            // lambda's full type when it is complete.
            if let Some(id) = &id {
                if let Some(Sig::Fn { params, ret: slot }) = self.sigs.get_mut(id) {
                    *slot = ret.clone();
                    if let (Some(ps), Some(r)) = (params.clone(), ret.clone()) {
                        let fn_ty = Type::Fn(TypeFn {
                            params: ps,
                            ret: Box::new(r),
                        });
                        if let Some(lambda) = bnd.lambda_mut() {
                            lambda.type_spec = Some(fn_ty.clone());
                        }
                        bnd.type_spec = Some(fn_ty);
                    }
                }
            }
        } else {
            let expected = bnd.type_asc.clone().filter(|t| !t.is_invalid());
            let ty = self.check_expr(&mut bnd.value, expected.as_ref());
            let final_ty = expected.or(ty);
            bnd.type_spec = final_ty.clone();
            if let Some(id) = &id {
                self.sigs.insert(id.clone(), Sig::Value(final_ty));
            }
        }
    }

    /// Checks an expression, storing the computed type on the node.
    fn check_expr(&mut self, expr: &mut Expr, expected: Option<&Type>) -> Option<Type> {
        let asc = expr.type_asc.clone().filter(|t| !t.is_invalid());
        let expect = expected.cloned().or(asc);
        if expr.terms.len() != 1 {
            return None;
        }
        let term = &mut expr.terms[0];
        let ty = self.infer_term(term, expect.as_ref());
        expr.type_spec = ty.clone();
        ty
    }

    fn infer_term(&mut self, term: &mut Term, expected: Option<&Type>) -> Option<Type> {
        let span = term.span();
        let actual = match term {
            Term::Invalid(_) | Term::Error(_) | Term::Placeholder(_) => return None,
            Term::LiteralInt(_) => Some(known("Int64")),
            Term::LiteralFloat(_) => Some(known("Double")),
            Term::LiteralString(_) => Some(known("String")),
            Term::LiteralBool(_) => Some(known("Bool")),
            Term::LiteralUnit(_) => Some(known("Unit")),
            Term::Hole(hole) => {
                return match expected {
                    Some(exp) => {
                        hole.type_spec = Some(exp.clone());
                        Some(exp.clone())
                    }
                    None => {
                        self.diag.error(TypeError::UntypedHoleInBinding { span });
                        None
                    }
                };
            }
            // Native bodies and constructor sentinels are opaque: the
            // declared types around them are trusted.
            Term::Native(_) | Term::DataConstructor(_) | Term::DataDestructor(_) => {
                return expected.cloned();
            }
            Term::Ref(r) => {
                if r.qualifier.is_some() {
                    self.infer_selection(r)
                } else {
                    let ty = self.lookup_ref(r);
                    r.type_spec = ty.clone();
                    ty
                }
            }
            Term::App(app) => self.infer_app(app),
            Term::Cond(c) => self.infer_cond(c, expected),
            Term::Group(g) => {
                let ty = self.check_expr(&mut g.inner, expected);
                g.type_spec = ty.clone();
                return ty;
            }
            Term::Tuple(t) => {
                let mut items = Vec::new();
                let mut complete = true;
                for item in &mut t.items {
                    match self.check_expr(item, None) {
                        Some(ty) => items.push(ty),
                        None => complete = false,
                    }
                }
                let ty = complete.then(|| Type::Tuple(items));
                t.type_spec = ty.clone();
                ty
            }
            Term::Expr(e) => return self.check_expr(e, expected),
            Term::Seq(s) => {
                self.locals.push(IndexMap::new());
                let mut last_ty = None;
                let count = s.items.len();
                for (i, item) in s.items.iter_mut().enumerate() {
                    let exp = if i + 1 == count { expected } else { None };
                    last_ty = self.check_expr(item, exp);
                }
                self.locals.pop();
                s.type_spec = last_ty.clone();
                return last_ty;
            }
            Term::Let(l) => {
                let asc = l.type_asc.clone().filter(|t| !t.is_invalid());
                let value_ty = self.check_expr(&mut l.value, asc.as_ref());
                let ty = asc.or(value_ty);
                l.type_spec = ty.clone();
                if let (Some(frame), Some(id), Some(t)) =
                    (self.locals.last_mut(), &l.id, &ty)
                {
                    frame.insert(id.clone(), t.clone());
                }
                return None;
            }
            Term::Lambda(lambda) => {
                let mut frame = IndexMap::new();
                let mut params = Vec::new();
                let mut complete = true;
                for param in &mut lambda.params {
                    match &param.type_asc {
                        Some(t) if !t.is_invalid() => {
                            param.type_spec = Some(t.clone());
                            params.push(t.clone());
                            if let Some(pid) = &param.id {
                                frame.insert(pid.clone(), t.clone());
                            }
                        }
                        _ => complete = false,
                    }
                }
                self.locals.push(frame);
                let declared = lambda.type_asc.clone().filter(|t| !t.is_invalid());
                let body_ty = self.check_expr(&mut lambda.body, declared.as_ref());
                self.locals.pop();
                let ret = declared.or(body_ty);
                let ty = match (complete, ret) {
                    (true, Some(r)) => Some(Type::Fn(TypeFn {
                        params,
                        ret: Box::new(r),
                    })),
                    _ => None,
                };
                lambda.type_spec = ty.clone();
                ty
            }
        };

        self.finish(actual, expected, span)
    }

    /// Compares a synthesized type against the context's expectation.
    fn finish(
        &mut self,
        actual: Option<Type>,
        expected: Option<&Type>,
        span: SrcSpan,
    ) -> Option<Type> {
        let act = actual?;
        let Some(exp) = expected else {
            return Some(act);
        };
        if act.is_invalid() || exp.is_invalid() {
            return None;
        }
        if act.same_type(exp) {
            return Some(act);
        }
        // A nullary callable where its result type is wanted: the call
        // is missing its `()` argument.
        if let Type::Fn(f) = &act {
            if f.params.is_empty() && f.ret.same_type(exp) {
                self.diag.error(TypeError::UndersaturatedApplication {
                    expected: 1,
                    actual: 0,
                    span,
                });
                return None;
            }
        }
        self.diag.error(TypeError::TypeMismatch {
            expected: exp.to_string(),
            actual: act.to_string(),
            span,
        });
        None
    }

    fn lookup_ref(&mut self, r: &Ref) -> Option<Type> {
        let Some(id) = &r.resolved_id else {
            if !r.candidate_ids.is_empty() {
                self.diag.error(TypeError::UnresolvableType {
                    name: r.name.clone(),
                    span: r.span,
                });
            }
            return None;
        };
        self.lookup_id(id.clone(), &r.name, r.span)
    }

    fn lookup_id(&mut self, id: ResolvableId, name: &str, span: SrcSpan) -> Option<Type> {
        for frame in self.locals.iter().rev() {
            if let Some(ty) = frame.get(&id) {
                return Some(ty.clone());
            }
        }
        match self.sigs.get(&id) {
            Some(Sig::Value(ty)) => ty.clone(),
            Some(Sig::Fn { params, ret }) => {
                let params = params.clone()?;
                match ret {
                    Some(r) => Some(Type::Fn(TypeFn {
                        params,
                        ret: Box::new(r.clone()),
                    })),
                    None => {
                        if self.self_id.as_ref() == Some(&id) && !self.recursion_reported {
                            self.recursion_reported = true;
                            self.diag
                                .error(TypeError::RecursiveFunctionMissingReturnType {
                                    name: name.to_owned(),
                                    span,
                                });
                        }
                        None
                    }
                }
            }
            None => None,
        }
    }

    fn infer_app(&mut self, app: &mut App) -> Option<Type> {
        let span = app.span;
        let spine = spine_shape(app, self.sigs);
        let fty = self.infer_term(&mut app.func, None)?;

        match strip_groups(fty) {
            Type::Fn(f) if f.params.is_empty() => {
                let arg_is_unit = matches!(app.arg.as_ref(), Term::LiteralUnit(_));
                let arg_ty = self.infer_term(&mut app.arg, None);
                let unit = known("Unit");
                if arg_is_unit || arg_ty.as_ref().is_some_and(|t| t.same_type(&unit)) {
                    app.type_spec = Some((*f.ret).clone());
                    Some((*f.ret).clone())
                } else {
                    self.diag.error(TypeError::TypeMismatch {
                        expected: "()".to_owned(),
                        actual: arg_ty.map_or_else(|| "?".to_owned(), |t| t.to_string()),
                        span,
                    });
                    None
                }
            }
            Type::Fn(mut f) => {
                let param = f.params.remove(0);
                let _ = self.infer_term(&mut app.arg, Some(&param));
                let result = if f.params.is_empty() {
                    *f.ret
                } else {
                    Type::Fn(f)
                };
                app.type_spec = Some(result.clone());
                Some(result)
            }
            other => {
                let arg_ty = self.infer_term(&mut app.arg, None);
                if let Some((declared, supplied)) = spine {
                    if supplied > declared {
                        self.diag.error(TypeError::OversaturatedApplication {
                            expected: declared,
                            actual: supplied,
                            span,
                        });
                        return None;
                    }
                }
                self.diag.error(TypeError::InvalidApplication {
                    fn_type: other.to_string(),
                    arg_type: arg_ty.map_or_else(|| "?".to_owned(), |t| t.to_string()),
                    span,
                });
                None
            }
        }
    }

    fn infer_cond(&mut self, c: &mut Cond, expected: Option<&Type>) -> Option<Type> {
        let bool_ty = known("Bool");
        self.check_expr(&mut c.cond, Some(&bool_ty));

        let result = match expected {
            Some(exp) => {
                let t1 = self.check_expr(&mut c.if_true, Some(exp));
                let t2 = self.check_expr(&mut c.if_false, Some(exp));
                (t1.is_some() && t2.is_some()).then(|| exp.clone())
            }
            None => {
                let t1 = self.check_expr(&mut c.if_true, None);
                let t2 = self.check_expr(&mut c.if_false, None);
                match (t1, t2) {
                    (Some(a), Some(b)) => {
                        if a.same_type(&b) {
                            Some(a)
                        } else {
                            self.diag.error(TypeError::ConditionalBranchTypeMismatch {
                                if_true: a.to_string(),
                                if_false: b.to_string(),
                                span: c.span,
                            });
                            None
                        }
                    }
                    (Some(a), None) => Some(a),
                    (None, Some(b)) => Some(b),
                    (None, None) => {
                        self.diag
                            .error(TypeError::ConditionalBranchTypeUnknown { span: c.span });
                        None
                    }
                }
            }
        };
        c.type_spec = result.clone();
        result
    }

    /// Field selection: the base must be a struct (user struct or native
    /// struct definition); the reference pins to the field.
    fn infer_selection(&mut self, r: &mut Ref) -> Option<Type> {
        let base_ty = {
            let q = r.qualifier.as_mut().expect("selection has a qualifier");
            let ty = if q.qualifier.is_some() {
                self.infer_selection(q)
            } else {
                self.lookup_ref(q)
            };
            q.type_spec = ty.clone();
            ty
        };
        let Some(base_ty) = base_ty else { return None };

        if let Some(id) = base_ty.nominal_id() {
            if let Some(st) = self.info.structs.get(id) {
                return match st.field(&r.name) {
                    Some(field) => {
                        r.resolved_id = field.id.clone();
                        let ty = field
                            .type_spec
                            .clone()
                            .unwrap_or_else(|| field.type_asc.clone());
                        r.type_spec = Some(ty.clone());
                        Some(ty)
                    }
                    None => {
                        self.diag.error(TypeError::UnknownField {
                            field: r.name.clone(),
                            base_type: st.name.clone(),
                            span: r.span,
                        });
                        None
                    }
                };
            }
            if let Some(def) = self.info.typedefs.get(id) {
                if let NativeRep::Struct { fields } = &def.rep {
                    return match fields.get(&r.name) {
                        Some(ty) => {
                            r.type_spec = Some(ty.clone());
                            Some(ty.clone())
                        }
                        None => {
                            self.diag.error(TypeError::UnknownField {
                                field: r.name.clone(),
                                base_type: def.name.clone(),
                                span: r.span,
                            });
                            None
                        }
                    };
                }
            }
        }

        self.diag.error(TypeError::InvalidSelection {
            base_type: base_ty.to_string(),
            span: r.span,
        });
        None
    }
}

fn strip_groups(ty: Type) -> Type {
    match ty {
        Type::Group(inner) => strip_groups(*inner),
        other => other,
    }
}

/// Declared parameter count of the spine's head callable and the number
/// of arguments supplied, for saturation diagnostics.
fn spine_shape(app: &App, sigs: &IndexMap<ResolvableId, Sig>) -> Option<(usize, usize)> {
    let mut count = 1usize;
    let mut func = app.func.as_ref();
    while let Term::App(inner) = func {
        count += 1;
        func = inner.func.as_ref();
    }
    let Term::Ref(r) = func else { return None };
    let id = r.resolved_id.as_ref()?;
    match sigs.get(id)? {
        Sig::Fn {
            params: Some(ps), ..
        } => Some((ps.len().max(1), count)),
        _ => None,
    }
}
