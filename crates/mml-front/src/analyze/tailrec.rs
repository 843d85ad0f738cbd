//! Tail-recursion tagging.
//!
//! A lambda is tail-recursive when a saturated call to its own binding
//! sits in tail position: the body's value, the last statement of a
//! sequence, or either branch of a conditional. The flag is a codegen
//! hint only; semantics are untouched.

use mml_ast::{Expr, Member, Module, Term};

use crate::diagnostics::Diagnostics;

pub fn run(mut module: Module, _diag: &mut Diagnostics) -> Module {
    for member in &mut module.members {
        let Member::Bnd(bnd) = member else { continue };
        if bnd.meta.is_none() {
            continue;
        }
        let Some(id) = bnd.id.clone() else { continue };
        let Some(lambda) = bnd.lambda_mut() else {
            continue;
        };
        let arity = lambda.params.len();
        if tail_expr(&lambda.body, &id, arity) {
            lambda.is_tail_recursive = true;
        }
    }
    module
}

fn tail_expr(expr: &Expr, id: &mml_ast::ResolvableId, arity: usize) -> bool {
    match expr.terms.as_slice() {
        [term] => tail_term(term, id, arity),
        _ => false,
    }
}

fn tail_term(term: &Term, id: &mml_ast::ResolvableId, arity: usize) -> bool {
    match term {
        Term::App(app) => {
            let (head, args) = app.spine();
            match head {
                Term::Ref(r) => {
                    r.resolved_id.as_ref() == Some(id) && args.len() == arity.max(1)
                }
                _ => false,
            }
        }
        Term::Cond(c) => {
            tail_expr(&c.if_true, id, arity) || tail_expr(&c.if_false, id, arity)
        }
        Term::Seq(s) => s.items.last().is_some_and(|last| tail_expr(last, id, arity)),
        Term::Group(g) => tail_expr(&g.inner, id, arity),
        Term::Expr(e) => tail_expr(e, id, arity),
        _ => false,
    }
}
