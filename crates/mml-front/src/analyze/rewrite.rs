//! Precedence climbing over flat term sequences.
//!
//! Juxtaposition is a virtual left-associative binary operator sitting
//! strictly above every user operator, which is what makes `f x + y`
//! come out as `(f x) + y`. Operator references that are ambiguous
//! between unary and binary (the two `-` declarations) are settled here
//! by syntactic position and pinned to the winning candidate.

use std::collections::VecDeque;

use indexmap::IndexMap;

use mml_ast::{
    App, Associativity, BindingArity, BindingMeta, BindingOrigin, Expr, InvalidExpression, Member,
    Module, ResolvableId, SrcSpan, Term,
};

use crate::diagnostics::{Diagnostics, SemanticError};
use crate::stdlib::FN_PRECEDENCE;

pub fn run(mut module: Module, diag: &mut Diagnostics) -> Module {
    let mut metas: IndexMap<ResolvableId, BindingMeta> = IndexMap::new();
    for member in &module.members {
        if let Member::Bnd(bnd) = member {
            if let (Some(id), Some(meta)) = (&bnd.id, &bnd.meta) {
                metas.insert(id.clone(), meta.clone());
            }
        }
    }

    let mut rewriter = Rewriter { metas, diag };
    for member in &mut module.members {
        if let Member::Bnd(bnd) = member {
            let value = std::mem::replace(&mut bnd.value, Expr::new(Vec::new(), bnd.span));
            bnd.value = rewriter.rewrite_expr(value);
        }
    }
    module
}

struct ClimbError {
    message: String,
    span: SrcSpan,
}

enum Classified {
    Operand,
    Prefix { prec: u32, id: ResolvableId },
    Binary {
        prec: u32,
        assoc: Associativity,
        id: ResolvableId,
    },
    Postfix { prec: u32, id: ResolvableId },
}

struct Rewriter<'d> {
    metas: IndexMap<ResolvableId, BindingMeta>,
    diag: &'d mut Diagnostics,
}

impl Rewriter<'_> {
    fn rewrite_expr(&mut self, mut expr: Expr) -> Expr {
        let terms = std::mem::take(&mut expr.terms);
        let terms: Vec<Term> = terms.into_iter().map(|t| self.rewrite_term(t)).collect();

        if terms.len() <= 1 {
            expr.terms = terms;
            return expr;
        }

        let original = terms.clone();
        match self.climb(terms) {
            Ok(term) => expr.terms = vec![term],
            Err(err) => {
                self.diag.error(SemanticError::DanglingTerms {
                    terms: render_terms(&original),
                    message: err.message.clone(),
                    span: err.span,
                });
                let span = expr.span;
                expr.terms = vec![Term::Invalid(InvalidExpression {
                    terms: original,
                    reason: err.message,
                    span,
                })];
            }
        }
        expr
    }

    fn rewrite_term(&mut self, term: Term) -> Term {
        match term {
            Term::Lambda(mut lambda) => {
                let body = std::mem::replace(&mut *lambda.body, Expr::new(Vec::new(), lambda.span));
                *lambda.body = self.rewrite_expr(body);
                Term::Lambda(lambda)
            }
            Term::Cond(mut c) => {
                for slot in [&mut c.cond, &mut c.if_true, &mut c.if_false] {
                    let e = std::mem::replace(&mut **slot, Expr::new(Vec::new(), c.span));
                    **slot = self.rewrite_expr(e);
                }
                Term::Cond(c)
            }
            Term::Group(mut g) => {
                let e = std::mem::replace(&mut *g.inner, Expr::new(Vec::new(), g.span));
                *g.inner = self.rewrite_expr(e);
                Term::Group(g)
            }
            Term::Tuple(mut t) => {
                t.items = t
                    .items
                    .into_iter()
                    .map(|item| self.rewrite_expr(item))
                    .collect();
                Term::Tuple(t)
            }
            Term::Expr(e) => Term::Expr(self.rewrite_expr(e)),
            Term::Seq(mut s) => {
                s.items = s
                    .items
                    .into_iter()
                    .map(|item| self.rewrite_expr(item))
                    .collect();
                Term::Seq(s)
            }
            Term::Let(mut l) => {
                let e = std::mem::replace(&mut *l.value, Expr::new(Vec::new(), l.span));
                *l.value = self.rewrite_expr(e);
                Term::Let(l)
            }
            Term::App(mut app) => {
                *app.func = self.rewrite_term(*app.func);
                *app.arg = self.rewrite_term(*app.arg);
                Term::App(app)
            }
            other => other,
        }
    }

    fn climb(&mut self, terms: Vec<Term>) -> Result<Term, ClimbError> {
        let mut stream: VecDeque<Term> = terms.into();
        let result = self.parse_min(&mut stream, 0, None)?;
        if let Some(extra) = stream.front() {
            return Err(ClimbError {
                message: "unexpected trailing terms".to_owned(),
                span: extra.span(),
            });
        }
        Ok(result)
    }

    fn parse_min(
        &mut self,
        stream: &mut VecDeque<Term>,
        min: u32,
        entered: Option<(u32, Associativity)>,
    ) -> Result<Term, ClimbError> {
        let mut lhs = self.parse_operand(stream)?;
        let mut last_bin = entered;

        loop {
            let Some(next) = stream.front() else { break };
            match self.classify(next, true) {
                Classified::Binary { prec, assoc, id } => {
                    if prec < min {
                        break;
                    }
                    if let Some((last_prec, last_assoc)) = last_bin {
                        if last_prec == prec && last_assoc != assoc {
                            return Err(ClimbError {
                                message:
                                    "operators of equal precedence but different associativity"
                                        .to_owned(),
                                span: next.span(),
                            });
                        }
                    }
                    let op = pin_ref(stream.pop_front().expect("operator present"), &id);
                    let next_min = if assoc == Associativity::Left {
                        prec + 1
                    } else {
                        prec
                    };
                    let rhs = self.parse_min(stream, next_min, Some((prec, assoc)))?;
                    lhs = Term::App(App::new(Term::App(App::new(op, lhs)), rhs));
                    last_bin = Some((prec, assoc));
                }
                Classified::Postfix { prec, id } => {
                    if prec < min {
                        break;
                    }
                    let op = pin_ref(stream.pop_front().expect("operator present"), &id);
                    lhs = Term::App(App::new(op, lhs));
                }
                Classified::Operand | Classified::Prefix { .. } => {
                    if FN_PRECEDENCE < min {
                        break;
                    }
                    let head = as_head(lhs)?;
                    let arg = self.parse_min(stream, FN_PRECEDENCE + 1, None)?;
                    lhs = Term::App(App::new(head, arg));
                }
            }
        }
        Ok(lhs)
    }

    fn parse_operand(&mut self, stream: &mut VecDeque<Term>) -> Result<Term, ClimbError> {
        let Some(next) = stream.front() else {
            return Err(ClimbError {
                message: "expected an operand".to_owned(),
                span: SrcSpan::synthetic(),
            });
        };
        match self.classify(next, false) {
            Classified::Prefix { prec, id } => {
                let op = pin_ref(stream.pop_front().expect("operator present"), &id);
                let operand = self.parse_min(stream, prec, None)?;
                Ok(Term::App(App::new(op, operand)))
            }
            Classified::Operand => Ok(stream.pop_front().expect("operand present")),
            _ => {
                let span = next.span();
                Err(ClimbError {
                    message: "operator is missing its left operand".to_owned(),
                    span,
                })
            }
        }
    }

    /// What role can this term play at the current position? Ambiguous
    /// operator references pick their arity from position: awaiting an
    /// operand means prefix, after an operand means binary (or postfix
    /// for left-associative unaries).
    fn classify(&self, term: &Term, after_operand: bool) -> Classified {
        let Term::Ref(r) = term else {
            return Classified::Operand;
        };
        if r.qualifier.is_some() {
            return Classified::Operand;
        }

        let ids: Vec<ResolvableId> = match &r.resolved_id {
            Some(id) => vec![id.clone()],
            None => r.candidate_ids.clone(),
        };
        let mut unary: Option<(ResolvableId, BindingMeta)> = None;
        let mut binary: Option<(ResolvableId, BindingMeta)> = None;
        for id in ids {
            let Some(meta) = self.metas.get(&id) else { continue };
            if meta.origin != BindingOrigin::Operator {
                continue;
            }
            match meta.arity {
                BindingArity::Unary => unary = Some((id, meta.clone())),
                BindingArity::Binary => binary = Some((id, meta.clone())),
                _ => {}
            }
        }

        if unary.is_none() && binary.is_none() {
            return Classified::Operand;
        }

        if after_operand {
            if let Some((id, meta)) = binary {
                return Classified::Binary {
                    prec: meta.precedence,
                    assoc: meta.assoc,
                    id,
                };
            }
            if let Some((id, meta)) = unary {
                if meta.assoc == Associativity::Left {
                    return Classified::Postfix {
                        prec: meta.precedence,
                        id,
                    };
                }
            }
            // A lone prefix operator starts the next juxtaposed operand.
            Classified::Operand
        } else {
            if let Some((id, meta)) = &unary {
                if meta.assoc == Associativity::Right {
                    return Classified::Prefix {
                        prec: meta.precedence,
                        id: id.clone(),
                    };
                }
            }
            if let Some((id, meta)) = binary {
                return Classified::Binary {
                    prec: meta.precedence,
                    assoc: meta.assoc,
                    id,
                };
            }
            let (id, meta) = unary.expect("operator has at least one form");
            Classified::Postfix {
                prec: meta.precedence,
                id,
            }
        }
    }
}

/// Pins an operator reference to the candidate the climber picked.
fn pin_ref(term: Term, id: &ResolvableId) -> Term {
    match term {
        Term::Ref(mut r) => {
            r.resolved_id = Some(id.clone());
            Term::Ref(r)
        }
        other => other,
    }
}

/// Application heads are restricted to references, applications, and
/// lambdas; transparent wrappers around one of those unwrap.
fn as_head(term: Term) -> Result<Term, ClimbError> {
    if term.can_head_application() {
        return Ok(term);
    }
    match term {
        Term::Group(g) if g.inner.terms.len() == 1 => {
            let inner = g
                .inner
                .terms
                .into_iter()
                .next()
                .expect("single term checked");
            as_head(inner)
        }
        Term::Expr(e) if e.terms.len() == 1 => {
            let inner = e.terms.into_iter().next().expect("single term checked");
            as_head(inner)
        }
        other => Err(ClimbError {
            message: "this value cannot be applied to an argument".to_owned(),
            span: other.span(),
        }),
    }
}

fn render_terms(terms: &[Term]) -> String {
    terms
        .iter()
        .map(render_term)
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_term(term: &Term) -> String {
    match term {
        Term::Ref(r) => r.name.clone(),
        Term::LiteralInt(l) => l.value.to_string(),
        Term::LiteralFloat(l) => l.value.to_string(),
        Term::LiteralString(l) => format!("{:?}", l.value),
        Term::LiteralBool(l) => l.value.to_string(),
        Term::LiteralUnit(_) => "()".to_owned(),
        Term::Placeholder(_) => "_".to_owned(),
        Term::Hole(_) => "???".to_owned(),
        Term::Group(_) => "(..)".to_owned(),
        Term::Tuple(_) => "(..,..)".to_owned(),
        _ => "<expr>".to_owned(),
    }
}
