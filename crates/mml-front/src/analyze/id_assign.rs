//! Stable id assignment.
//!
//! A deterministic pre-order walk gives every resolvable node without an
//! id a fresh `<module>::<kind>::<name>::<n>` one, then seeds the first
//! resolvables index. Idempotent: nodes that already carry an id (the
//! prelude, re-runs) are left untouched, so ids never change once given.

use mml_ast::{Expr, Member, Module, ResolvableId, Term};

use crate::diagnostics::Diagnostics;

use super::indexer;

pub fn run(mut module: Module, _diag: &mut Diagnostics) -> Module {
    let mut assigner = Assigner {
        module_name: module.name.clone(),
        counter: 0,
    };
    for member in &mut module.members {
        assigner.member(member);
    }
    module.resolvables = indexer::build_index(&module.members);
    module
}

struct Assigner {
    module_name: String,
    counter: usize,
}

impl Assigner {
    fn fresh(&mut self, kind: &str, name: &str) -> ResolvableId {
        let id = ResolvableId::new(format!("{}::{kind}::{name}::{}", self.module_name, self.counter));
        self.counter += 1;
        id
    }

    fn member(&mut self, member: &mut Member) {
        match member {
            Member::Bnd(bnd) => {
                if bnd.id.is_none() {
                    bnd.id = Some(self.fresh("bnd", &bnd.name));
                }
                self.expr(&mut bnd.value);
            }
            Member::TypeDef(def) => {
                if def.id.is_none() {
                    def.id = Some(self.fresh("type", &def.name));
                }
            }
            Member::TypeAlias(alias) => {
                if alias.id.is_none() {
                    alias.id = Some(self.fresh("alias", &alias.name));
                }
            }
            Member::TypeStruct(st) => {
                if st.id.is_none() {
                    st.id = Some(self.fresh("struct", &st.name));
                }
                for field in &mut st.fields {
                    if field.id.is_none() {
                        field.id = Some(self.fresh("field", &field.name));
                    }
                }
            }
            // Wrapped members are out of the namespace; nothing points at them.
            Member::Duplicate(_) | Member::Invalid(_) => {}
            Member::ParseError(_) | Member::IdError(_) => {}
        }
    }

    fn expr(&mut self, expr: &mut Expr) {
        for term in &mut expr.terms {
            self.term(term);
        }
    }

    fn term(&mut self, term: &mut Term) {
        match term {
            Term::Lambda(lambda) => {
                for param in &mut lambda.params {
                    if param.id.is_none() {
                        param.id = Some(self.fresh("param", &param.name));
                    }
                }
                self.expr(&mut lambda.body);
            }
            Term::Let(l) => {
                if l.id.is_none() {
                    l.id = Some(self.fresh("let", &l.name));
                }
                self.expr(&mut l.value);
            }
            Term::App(app) => {
                self.term(&mut app.func);
                self.term(&mut app.arg);
            }
            Term::Cond(c) => {
                self.expr(&mut c.cond);
                self.expr(&mut c.if_true);
                self.expr(&mut c.if_false);
            }
            Term::Group(g) => self.expr(&mut g.inner),
            Term::Tuple(t) => {
                for item in &mut t.items {
                    self.expr(item);
                }
            }
            Term::Expr(e) => self.expr(e),
            Term::Seq(s) => {
                for item in &mut s.items {
                    self.expr(item);
                }
            }
            Term::Invalid(inv) => {
                for t in &mut inv.terms {
                    self.term(t);
                }
            }
            _ => {}
        }
    }
}
