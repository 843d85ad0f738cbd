//! Type reference resolution and alias collapse.
//!
//! Three sub-passes: collect every type declaration into a scratch map,
//! resolve inside the declarations themselves (alias right-hand sides,
//! struct fields) while collapsing alias chains to a canonical form, then
//! resolve every ascription in member signatures and bodies. Unresolvable
//! references are wrapped invalid and reported; alias cycles count as
//! unresolvable.

use indexmap::IndexMap;

use mml_ast::{
    Expr, InvalidType, Member, Module, NativeRep, ResolvableId, Term, Type, TypeRef,
};

use crate::diagnostics::{Diagnostics, SemanticError, TypeError};

#[derive(Debug, Clone, Copy, PartialEq)]
enum TypeKind {
    Def,
    Alias,
    Struct,
}

pub fn run(mut module: Module, diag: &mut Diagnostics) -> Module {
    let mut resolver = Resolver::collect(&module, diag);

    // Resolve inside the declarations first so alias chains collapse and
    // struct fields get canonical types.
    for member in &mut module.members {
        match member {
            Member::TypeAlias(alias) => {
                let rhs = std::mem::replace(&mut alias.aliased, Type::Unit);
                let resolved = resolver.resolve(rhs);
                let canonical = resolver.canonicalize(resolved.clone());
                alias.aliased = resolved;
                alias.type_spec = Some(canonical);
            }
            Member::TypeDef(def) => {
                if let NativeRep::Struct { fields } = &mut def.rep {
                    let owned = std::mem::take(fields);
                    *fields = owned
                        .into_iter()
                        .map(|(name, ty)| {
                            let t = resolver.resolve(ty);
                            let t = resolver.canonicalize(t);
                            (name, t)
                        })
                        .collect();
                }
            }
            Member::TypeStruct(st) => {
                for field in &mut st.fields {
                    let asc = std::mem::replace(&mut field.type_asc, Type::Unit);
                    let resolved = resolver.resolve(asc);
                    field.type_spec = Some(resolver.canonicalize(resolved.clone()));
                    field.type_asc = resolved;
                }
            }
            _ => {}
        }
    }

    // Then every signature and expression ascription.
    for member in &mut module.members {
        if let Member::Bnd(bnd) = member {
            if let Some(asc) = bnd.type_asc.take() {
                bnd.type_asc = Some(resolver.resolve_canonical(asc));
            }
            resolve_expr(&mut bnd.value, &mut resolver);
        }
    }

    module
}

fn resolve_expr(expr: &mut Expr, resolver: &mut Resolver<'_>) {
    if let Some(asc) = expr.type_asc.take() {
        expr.type_asc = Some(resolver.resolve_canonical(asc));
    }
    for term in &mut expr.terms {
        resolve_term(term, resolver);
    }
}

fn resolve_term(term: &mut Term, resolver: &mut Resolver<'_>) {
    match term {
        Term::Lambda(lambda) => {
            for param in &mut lambda.params {
                if let Some(asc) = param.type_asc.take() {
                    param.type_asc = Some(resolver.resolve_canonical(asc));
                }
            }
            if let Some(ret) = lambda.type_asc.take() {
                lambda.type_asc = Some(resolver.resolve_canonical(ret));
            }
            resolve_expr(&mut lambda.body, resolver);
        }
        Term::Let(l) => {
            if let Some(asc) = l.type_asc.take() {
                l.type_asc = Some(resolver.resolve_canonical(asc));
            }
            resolve_expr(&mut l.value, resolver);
        }
        Term::Ref(r) => {
            if let Some(asc) = r.type_asc.take() {
                r.type_asc = Some(resolver.resolve_canonical(asc));
            }
        }
        Term::App(app) => {
            resolve_term(&mut app.func, resolver);
            resolve_term(&mut app.arg, resolver);
        }
        Term::Cond(c) => {
            resolve_expr(&mut c.cond, resolver);
            resolve_expr(&mut c.if_true, resolver);
            resolve_expr(&mut c.if_false, resolver);
        }
        Term::Group(g) => resolve_expr(&mut g.inner, resolver),
        Term::Tuple(t) => {
            for item in &mut t.items {
                resolve_expr(item, resolver);
            }
        }
        Term::Expr(e) => resolve_expr(e, resolver),
        Term::Seq(s) => {
            for item in &mut s.items {
                resolve_expr(item, resolver);
            }
        }
        Term::Invalid(inv) => {
            for t in &mut inv.terms {
                resolve_term(t, resolver);
            }
        }
        _ => {}
    }
}

struct Resolver<'d> {
    names: IndexMap<String, (ResolvableId, TypeKind)>,
    aliases: IndexMap<ResolvableId, (String, Type)>,
    canon: IndexMap<ResolvableId, Type>,
    visiting: Vec<ResolvableId>,
    diag: &'d mut Diagnostics,
}

impl<'d> Resolver<'d> {
    fn collect(module: &Module, diag: &'d mut Diagnostics) -> Self {
        let mut names = IndexMap::new();
        let mut aliases = IndexMap::new();
        for member in &module.members {
            match member {
                Member::TypeDef(def) => {
                    if let Some(id) = &def.id {
                        names.insert(def.name.clone(), (id.clone(), TypeKind::Def));
                    }
                }
                Member::TypeAlias(alias) => {
                    if let Some(id) = &alias.id {
                        names.insert(alias.name.clone(), (id.clone(), TypeKind::Alias));
                        aliases.insert(id.clone(), (alias.name.clone(), alias.aliased.clone()));
                    }
                }
                Member::TypeStruct(st) => {
                    if let Some(id) = &st.id {
                        names.insert(st.name.clone(), (id.clone(), TypeKind::Struct));
                    }
                }
                _ => {}
            }
        }
        Self {
            names,
            aliases,
            canon: IndexMap::new(),
            visiting: Vec::new(),
            diag,
        }
    }

    fn resolve_canonical(&mut self, ty: Type) -> Type {
        let resolved = self.resolve(ty);
        self.canonicalize(resolved)
    }

    /// Pins every reference in the type to a declaration id, wrapping
    /// unresolvable references invalid.
    fn resolve(&mut self, ty: Type) -> Type {
        match ty {
            Type::Ref(mut r) => {
                if r.resolved_id.is_some() {
                    return Type::Ref(r);
                }
                match self.names.get(&r.name) {
                    Some((id, _)) => {
                        r.resolved_id = Some(id.clone());
                        r.candidate_ids = vec![id.clone()];
                        Type::Ref(r)
                    }
                    None => {
                        self.diag.error(SemanticError::UndefinedTypeRef {
                            name: r.name.clone(),
                            span: r.span,
                        });
                        let span = r.span;
                        Type::Invalid(InvalidType {
                            original: Box::new(Type::Ref(r)),
                            span,
                        })
                    }
                }
            }
            // The unit syntax is sugar for the prelude's Unit type.
            Type::Unit => match self.names.get("Unit") {
                Some((id, _)) => Type::Ref(TypeRef::resolved("Unit", id.clone())),
                None => Type::Unit,
            },
            Type::Fn(mut f) => {
                f.params = f.params.into_iter().map(|p| self.resolve(p)).collect();
                *f.ret = self.resolve(*f.ret);
                Type::Fn(f)
            }
            Type::Tuple(items) => {
                Type::Tuple(items.into_iter().map(|t| self.resolve(t)).collect())
            }
            Type::Group(inner) => Type::Group(Box::new(self.resolve(*inner))),
            Type::Union(items) => {
                Type::Union(items.into_iter().map(|t| self.resolve(t)).collect())
            }
            Type::Intersection(items) => {
                Type::Intersection(items.into_iter().map(|t| self.resolve(t)).collect())
            }
            Type::NativeStruct { fields } => Type::NativeStruct {
                fields: fields
                    .into_iter()
                    .map(|(name, t)| (name, self.resolve(t)))
                    .collect(),
            },
            other => other,
        }
    }

    /// Collapses alias chains to their final target. Cycles report as
    /// unresolvable and collapse to an invalid type.
    fn canonicalize(&mut self, ty: Type) -> Type {
        match ty {
            Type::Ref(r) => {
                let Some(id) = r.resolved_id.clone() else {
                    return Type::Ref(r);
                };
                if !self.aliases.contains_key(&id) {
                    return Type::Ref(r);
                }
                self.canonical_of_alias(&id)
            }
            Type::Fn(mut f) => {
                f.params = f.params.into_iter().map(|p| self.canonicalize(p)).collect();
                *f.ret = self.canonicalize(*f.ret);
                Type::Fn(f)
            }
            Type::Tuple(items) => {
                Type::Tuple(items.into_iter().map(|t| self.canonicalize(t)).collect())
            }
            Type::Group(inner) => self.canonicalize(*inner),
            other => other,
        }
    }

    fn canonical_of_alias(&mut self, id: &ResolvableId) -> Type {
        if let Some(cached) = self.canon.get(id) {
            return cached.clone();
        }
        let Some((name, rhs)) = self.aliases.get(id).cloned() else {
            return Type::Unit;
        };

        if self.visiting.contains(id) {
            let span = rhs.span().unwrap_or_else(mml_ast::SrcSpan::synthetic);
            self.diag.error(TypeError::UnresolvableType {
                name: name.clone(),
                span,
            });
            let invalid = Type::Invalid(InvalidType {
                original: Box::new(rhs),
                span,
            });
            self.canon.insert(id.clone(), invalid.clone());
            return invalid;
        }

        self.visiting.push(id.clone());
        let resolved = self.resolve(rhs);
        let canonical = self.canonicalize(resolved);
        self.visiting.pop();
        self.canon.insert(id.clone(), canonical.clone());
        canonical
    }
}
