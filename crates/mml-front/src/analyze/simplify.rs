//! Mechanical cleanup after rewriting.
//!
//! Single-term nested expressions and single-term groups unwrap, carrying
//! any ascription outward. The outermost wrapper of member bodies,
//! conditional branches, lambda bodies, and sequence items stays in place
//! so those positions keep their spans.

use mml_ast::{Expr, Member, Module, Term};

use crate::diagnostics::Diagnostics;

pub fn run(mut module: Module, _diag: &mut Diagnostics) -> Module {
    for member in &mut module.members {
        if let Member::Bnd(bnd) = member {
            simplify_expr(&mut bnd.value);
        }
    }
    module
}

/// Simplifies inside an expression, preserving the expression node itself.
fn simplify_expr(expr: &mut Expr) {
    for term in &mut expr.terms {
        simplify_term(term);
        unwrap_term(term);
    }
}

fn simplify_term(term: &mut Term) {
    match term {
        Term::App(app) => {
            simplify_term(&mut app.func);
            unwrap_term(&mut app.func);
            simplify_term(&mut app.arg);
            unwrap_term(&mut app.arg);
        }
        Term::Lambda(lambda) => simplify_expr(&mut lambda.body),
        Term::Cond(c) => {
            simplify_expr(&mut c.cond);
            simplify_expr(&mut c.if_true);
            simplify_expr(&mut c.if_false);
        }
        Term::Group(g) => simplify_expr(&mut g.inner),
        Term::Tuple(t) => {
            for item in &mut t.items {
                simplify_expr(item);
            }
        }
        Term::Expr(e) => simplify_expr(e),
        Term::Seq(s) => {
            for item in &mut s.items {
                simplify_expr(item);
            }
        }
        Term::Let(l) => simplify_expr(&mut l.value),
        _ => {}
    }
}

/// `Expr([t])` and `TermGroup(Expr([t]))` collapse to `t`. Wrappers that
/// carry an ascription stay, so the ascription is not lost.
fn unwrap_term(term: &mut Term) {
    loop {
        let replacement = match term {
            Term::Expr(e) if e.terms.len() == 1 && e.type_asc.is_none() => {
                Some(e.terms.pop().expect("single term checked"))
            }
            Term::Group(g) if g.inner.terms.len() == 1 && g.inner.type_asc.is_none() => {
                Some(g.inner.terms.pop().expect("single term checked"))
            }
            _ => None,
        };
        match replacement {
            Some(inner) => *term = inner,
            None => break,
        }
    }
}
