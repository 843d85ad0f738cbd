//! Read-only walks over the term tree.
//!
//! Phases that rewrite take nodes by value and rebuild them; these helpers
//! cover the read-only passes (liveness, tail-call detection, audits).

use crate::term::{Expr, Ref, Term};

/// Pre-order walk over every term reachable from `expr`.
pub fn walk_expr<'a>(expr: &'a Expr, f: &mut impl FnMut(&'a Term)) {
    for term in &expr.terms {
        walk_term(term, f);
    }
}

pub fn walk_term<'a>(term: &'a Term, f: &mut impl FnMut(&'a Term)) {
    f(term);
    match term {
        Term::App(app) => {
            walk_term(&app.func, f);
            walk_term(&app.arg, f);
        }
        Term::Lambda(l) => walk_expr(&l.body, f),
        Term::Cond(c) => {
            walk_expr(&c.cond, f);
            walk_expr(&c.if_true, f);
            walk_expr(&c.if_false, f);
        }
        Term::Group(g) => walk_expr(&g.inner, f),
        Term::Tuple(t) => {
            for item in &t.items {
                walk_expr(item, f);
            }
        }
        Term::Expr(e) => walk_expr(e, f),
        Term::Seq(s) => {
            for item in &s.items {
                walk_expr(item, f);
            }
        }
        Term::Let(l) => walk_expr(&l.value, f),
        Term::Invalid(inv) => {
            for t in &inv.terms {
                walk_term(t, f);
            }
        }
        _ => {}
    }
}

/// All references under `expr`, including qualifier chains, in walk order.
pub fn refs_in<'a>(expr: &'a Expr) -> Vec<&'a Ref> {
    let mut out = Vec::new();
    walk_expr(expr, &mut |term| {
        if let Term::Ref(r) = term {
            let mut cur = Some(r);
            while let Some(node) = cur {
                out.push(node);
                cur = node.qualifier.as_deref();
            }
        }
    });
    out
}
