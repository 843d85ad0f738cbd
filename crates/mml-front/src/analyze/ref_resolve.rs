//! Value reference resolution.
//!
//! Lexical scope wins over module scope: local bindings in enclosing
//! sequences, then enclosing lambda parameters, then module members
//! (prelude included). Module members match by surface name, which is how
//! operators and struct constructors stay addressable. Zero matches wrap
//! the containing expression invalid; several matches leave the candidate
//! list for the rewriter and checker to settle.

use indexmap::IndexMap;

use mml_ast::{
    Expr, InvalidExpression, Member, Module, Ref, ResolvableId, SrcSpan, Term,
};

use crate::diagnostics::{Diagnostics, SemanticError};

pub fn run(mut module: Module, diag: &mut Diagnostics) -> Module {
    let mut env: IndexMap<String, Vec<ResolvableId>> = IndexMap::new();
    for member in &module.members {
        if let Member::Bnd(bnd) = member {
            if let Some(id) = &bnd.id {
                env.entry(bnd.surface_name().to_owned())
                    .or_default()
                    .push(id.clone());
            }
        }
    }

    let mut resolver = RefResolver {
        env,
        scopes: Vec::new(),
        diag,
    };
    for member in &mut module.members {
        if let Member::Bnd(bnd) = member {
            resolver.resolve_expr(&mut bnd.value);
        }
    }
    module
}

struct RefResolver<'d> {
    env: IndexMap<String, Vec<ResolvableId>>,
    scopes: Vec<IndexMap<String, ResolvableId>>,
    diag: &'d mut Diagnostics,
}

impl RefResolver<'_> {
    /// Resolves every reference in the expression. If any reference at
    /// this level stays undefined, the whole expression is wrapped
    /// invalid; nested sub-expressions wrap themselves.
    fn resolve_expr(&mut self, expr: &mut Expr) {
        let mut failures: Vec<(String, SrcSpan)> = Vec::new();
        for term in &mut expr.terms {
            self.resolve_term(term, &mut failures);
        }
        if failures.is_empty() {
            return;
        }
        for (name, span) in &failures {
            self.diag.error(SemanticError::UndefinedRef {
                name: name.clone(),
                span: *span,
            });
        }
        let (name, _) = failures.swap_remove(0);
        let terms = std::mem::take(&mut expr.terms);
        let span = expr.span;
        expr.terms = vec![Term::Invalid(InvalidExpression {
            terms,
            reason: format!("`{name}` is not defined"),
            span,
        })];
    }

    fn resolve_term(&mut self, term: &mut Term, failures: &mut Vec<(String, SrcSpan)>) {
        match term {
            Term::Ref(r) => self.resolve_ref(r, failures),
            Term::Lambda(lambda) => {
                let mut frame = IndexMap::new();
                for param in &lambda.params {
                    if let Some(id) = &param.id {
                        frame.insert(param.name.clone(), id.clone());
                    }
                }
                self.scopes.push(frame);
                self.resolve_expr(&mut lambda.body);
                self.scopes.pop();
            }
            Term::Seq(seq) => {
                self.scopes.push(IndexMap::new());
                for item in &mut seq.items {
                    self.resolve_expr(item);
                    // A local binding scopes over the remaining items.
                    if let Some(Term::Let(l)) = item.only_term() {
                        if let (Some(frame), Some(id)) = (self.scopes.last_mut(), &l.id) {
                            frame.insert(l.name.clone(), id.clone());
                        }
                    }
                }
                self.scopes.pop();
            }
            Term::Let(l) => self.resolve_expr(&mut l.value),
            Term::App(app) => {
                self.resolve_term(&mut app.func, failures);
                self.resolve_term(&mut app.arg, failures);
            }
            Term::Cond(c) => {
                self.resolve_expr(&mut c.cond);
                self.resolve_expr(&mut c.if_true);
                self.resolve_expr(&mut c.if_false);
            }
            Term::Group(g) => self.resolve_expr(&mut g.inner),
            Term::Tuple(t) => {
                for item in &mut t.items {
                    self.resolve_expr(item);
                }
            }
            Term::Expr(e) => self.resolve_expr(e),
            _ => {}
        }
    }

    fn resolve_ref(&mut self, r: &mut Ref, failures: &mut Vec<(String, SrcSpan)>) {
        // Field selection resolves its base here; the field itself waits
        // for the checker, which knows the base's type.
        let target = r.base_mut();
        if target.resolved_id.is_some() {
            return;
        }

        for frame in self.scopes.iter().rev() {
            if let Some(id) = frame.get(&target.name) {
                target.resolved_id = Some(id.clone());
                target.candidate_ids = vec![id.clone()];
                return;
            }
        }

        match self.env.get(&target.name) {
            Some(ids) if ids.len() == 1 => {
                target.resolved_id = Some(ids[0].clone());
                target.candidate_ids = ids.clone();
            }
            Some(ids) if !ids.is_empty() => {
                target.candidate_ids = ids.clone();
            }
            _ => {
                failures.push((target.name.clone(), target.span));
            }
        }
    }
}
