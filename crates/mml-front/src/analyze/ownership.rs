//! Affine ownership analysis with borrow-by-default.
//!
//! Heap values are owned by whoever allocated them and borrowed by
//! everyone else. A `~` parameter moves its argument; moved bindings are
//! dead. At the end of each scope every still-owned binding gets exactly
//! one release call on every path that does not transfer it out;
//! expression temporaries are anchored as `__tmp` bindings, and
//! conditionally-owned values get a witness boolean deciding their
//! release at run time. The analysis is a straight rewrite of the curried
//! application trees the expression rewriter produced.

use indexmap::IndexMap;

use mml_ast::{
    App, Cond, Expr, LetBind, LiteralUnit, Member, Module, Ref, Resolvable, ResolvableId, Seq,
    SourceOrigin, SrcSpan, Term, Type,
};

use crate::diagnostics::{Diagnostics, OwnershipError};

use super::heap::TypeInfo;

/// What the analyzer knows about a callable.
#[derive(Debug, Clone)]
struct FnFacts {
    name: String,
    params: usize,
    consuming: Vec<bool>,
    /// Call results are owned by the caller.
    allocates: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    Owned,
    Moved(SrcSpan),
    Borrowed,
    Literal,
}

#[derive(Debug, Clone)]
struct BindState {
    name: String,
    ty: Type,
    state: State,
    escaped: bool,
    is_param: bool,
    /// Witness boolean guarding a conditionally-owned value.
    witness: Option<(ResolvableId, String)>,
}

type States = IndexMap<ResolvableId, BindState>;

pub fn run(mut module: Module, diag: &mut Diagnostics) -> Module {
    let info = TypeInfo::collect(&module);
    let fns = collect_facts(&module, &info);

    let mut analyzer = Analyzer {
        info: &info,
        fns,
        diag,
        tmp_counter: 0,
        new_lets: Vec::new(),
    };

    for member in &mut module.members {
        let Member::Bnd(bnd) = member else { continue };
        if bnd.source != SourceOrigin::Source || bnd.meta.is_none() {
            continue;
        }
        analyzer.analyze_binding(bnd);
    }

    for l in analyzer.new_lets {
        if let Some(id) = &l.id {
            module.resolvables.insert_value(id.clone(), Resolvable::Let(l.clone()));
        }
    }
    module
}

fn collect_facts(module: &Module, info: &TypeInfo) -> IndexMap<ResolvableId, FnFacts> {
    let mut fns = IndexMap::new();
    for member in &module.members {
        let Member::Bnd(bnd) = member else { continue };
        let (Some(id), Some(lambda)) = (&bnd.id, bnd.lambda()) else {
            continue;
        };
        let consuming: Vec<bool> = lambda.params.iter().map(|p| p.consuming).collect();
        let ret = match &lambda.type_spec {
            Some(Type::Fn(f)) => Some((*f.ret).clone()),
            _ => lambda.type_asc.clone(),
        };
        let allocates = match lambda.body.only_term() {
            Some(Term::Native(native)) => native.mem_effect == mml_ast::MemEffect::Alloc,
            _ => ret.as_ref().is_some_and(|t| info.is_heap(t)),
        };
        fns.insert(
            id.clone(),
            FnFacts {
                name: bnd.surface_name().to_owned(),
                params: lambda.params.len(),
                consuming,
                allocates,
            },
        );
    }
    fns
}

struct Analyzer<'a, 'd> {
    info: &'a TypeInfo,
    fns: IndexMap<ResolvableId, FnFacts>,
    diag: &'d mut Diagnostics,
    tmp_counter: usize,
    new_lets: Vec<LetBind>,
}

impl Analyzer<'_, '_> {
    fn analyze_binding(&mut self, bnd: &mut mml_ast::Bnd) {
        let owner = bnd.name.clone();
        let Some(lambda) = bnd.lambda_mut() else { return };
        // Native and constructor bodies manage their own memory.
        if matches!(
            lambda.body.only_term(),
            Some(Term::Native(_) | Term::DataConstructor(_) | Term::Invalid(_))
        ) {
            return;
        }

        let ret_ty = match &lambda.type_spec {
            Some(Type::Fn(f)) => Some((*f.ret).clone()),
            _ => lambda.type_asc.clone(),
        };

        let mut states: States = IndexMap::new();
        for param in &lambda.params {
            let (Some(id), Some(ty)) = (&param.id, &param.type_spec) else {
                continue;
            };
            if !self.info.is_heap(ty) {
                continue;
            }
            states.insert(
                id.clone(),
                BindState {
                    name: param.name.clone(),
                    ty: ty.clone(),
                    state: if param.consuming {
                        State::Owned
                    } else {
                        State::Borrowed
                    },
                    escaped: false,
                    is_param: true,
                    witness: None,
                },
            );
        }

        let body_span = lambda.body.span;
        let body = std::mem::replace(&mut *lambda.body, Expr::new(Vec::new(), body_span));
        *lambda.body = self.analyze_body(body, ret_ty.as_ref(), states, &owner);
    }

    fn analyze_body(
        &mut self,
        mut body: Expr,
        ret_ty: Option<&Type>,
        mut states: States,
        owner: &str,
    ) -> Expr {
        let span = body.span;
        if body.terms.len() != 1 {
            return body;
        }
        let items = match body.terms.pop().expect("single term checked") {
            Term::Seq(seq) => seq.items,
            other => vec![Expr {
                terms: vec![other],
                span,
                type_asc: None,
                type_spec: body.type_spec.clone(),
            }],
        };

        let items = self.analyze_scope(items, ret_ty, &mut states, owner);

        let seq_ty = items.last().and_then(|e| e.type_spec.clone());
        if items.len() == 1 {
            let mut only = items.into_iter().next().expect("one item");
            only.span = span;
            return only;
        }
        Expr {
            terms: vec![Term::Seq(Seq {
                items,
                span,
                type_spec: seq_ty,
            })],
            span,
            type_asc: None,
            type_spec: body.type_spec,
        }
    }

    fn analyze_scope(
        &mut self,
        items: Vec<Expr>,
        ret_ty: Option<&Type>,
        states: &mut States,
        owner: &str,
    ) -> Vec<Expr> {
        let count = items.len();
        let mut out: Vec<Expr> = Vec::new();

        for (i, item) in items.into_iter().enumerate() {
            let last = i + 1 == count;
            if is_let_stmt(&item) {
                self.analyze_let_stmt(item, states, owner, &mut out);
            } else {
                self.analyze_plain_stmt(item, last, ret_ty, states, owner, &mut out);
            }
        }

        self.insert_frees(ret_ty, states, owner, &mut out);
        out
    }

    fn analyze_let_stmt(
        &mut self,
        mut item: Expr,
        states: &mut States,
        owner: &str,
        out: &mut Vec<Expr>,
    ) {
        let Some(Term::Let(l)) = item.terms.first_mut() else {
            out.push(item);
            return;
        };

        self.hoist_temporaries(&mut l.value, true, states, owner, out);
        self.walk_uses(&l.value.terms, states);

        let ty = l.type_spec.clone();
        let tracked = ty.as_ref().is_some_and(|t| self.info.is_heap(t));
        if tracked {
            let (Some(id), Some(ty)) = (l.id.clone(), ty) else {
                out.push(item);
                return;
            };
            let name = l.name.clone();
            let value_term = l.value.only_term();
            match value_term.map(|t| self.classify_value(t)) {
                Some(Ownership::Owned) => {
                    track(states, id, name, ty, State::Owned, None);
                }
                Some(Ownership::Literal) => {
                    track(states, id, name, ty, State::Literal, None);
                }
                Some(Ownership::Borrowed) | None => {
                    track(states, id, name, ty, State::Borrowed, None);
                }
                Some(Ownership::Mixed) => {
                    // Owned on one branch only: materialize a witness
                    // boolean from the same condition and track through it.
                    let witness = self.make_witness(&name, l, owner);
                    match witness {
                        Some((witness_stmt, witness_id, witness_name)) => {
                            track(
                                states,
                                id,
                                name,
                                ty,
                                State::Owned,
                                Some((witness_id, witness_name)),
                            );
                            out.push(witness_stmt);
                        }
                        None => {
                            self.diag.error(OwnershipError::ConditionalOwnershipMismatch {
                                name,
                                span: l.span,
                            });
                        }
                    }
                }
                Some(Ownership::Irreconcilable) => {
                    self.diag.error(OwnershipError::ConditionalOwnershipMismatch {
                        name: name.clone(),
                        span: l.span,
                    });
                    track(states, id, name, ty, State::Borrowed, None);
                }
            }
        }
        out.push(item);
    }

    #[allow(clippy::too_many_arguments)]
    fn analyze_plain_stmt(
        &mut self,
        mut item: Expr,
        last: bool,
        ret_ty: Option<&Type>,
        states: &mut States,
        owner: &str,
        out: &mut Vec<Expr>,
    ) {
        // A discarded allocation needs a home so it can be released.
        if !last {
            let discards_alloc = item
                .only_term()
                .is_some_and(|t| self.is_alloc_call(t));
            if discards_alloc {
                let stmt = self.bind_temporary(&mut item, owner, states);
                self.walk_uses(&stmt.terms, states);
                out.push(stmt);
                return;
            }
        }

        self.hoist_temporaries(&mut item, true, states, owner, out);
        self.walk_uses(&item.terms, states);

        if last {
            self.analyze_return(&mut item, ret_ty, states);
        }
        out.push(item);
    }

    /// Ownership of the value of a returned expression.
    fn analyze_return(&mut self, item: &mut Expr, ret_ty: Option<&Type>, states: &mut States) {
        let ret_heap = ret_ty.is_some_and(|t| self.info.is_heap(t));
        let Some(term) = item.terms.first_mut() else {
            return;
        };
        match term {
            Term::Ref(r) if r.qualifier.is_none() => {
                let Some(id) = &r.resolved_id else { return };
                let Some(bind) = states.get_mut(id) else { return };
                match bind.state {
                    State::Borrowed if ret_heap && bind.is_param => {
                        self.diag.error(OwnershipError::BorrowEscapeViaReturn {
                            name: bind.name.clone(),
                            span: r.span,
                        });
                    }
                    State::Owned => bind.escaped = true,
                    State::Literal if ret_heap => {
                        // Static data handed to a caller expecting an
                        // owned value gets copied.
                        if let Some(ty) = ret_ty {
                            if let Some(wrapped) =
                                self.clone_wrap(Term::Ref(r.clone()), ty)
                            {
                                bind.escaped = true;
                                *term = wrapped;
                            }
                        }
                    }
                    _ => {}
                }
            }
            Term::LiteralString(_) if ret_heap => {
                if let Some(ty) = ret_ty {
                    let lit = std::mem::replace(
                        term,
                        Term::LiteralUnit(LiteralUnit {
                            span: SrcSpan::synthetic(),
                        }),
                    );
                    match self.clone_wrap(lit, ty) {
                        Some(wrapped) => *term = wrapped,
                        None => {}
                    }
                }
            }
            _ => {}
        }
    }

    fn clone_wrap(&self, value: Term, ty: &Type) -> Option<Term> {
        let (name, id) = self.info.clone_fn_for(ty)?;
        let mut head = Ref::resolved(name, id);
        head.type_spec = Some(Type::fun(vec![ty.clone()], ty.clone()));
        let mut app = App::new(Term::Ref(head), value);
        app.type_spec = Some(ty.clone());
        Some(Term::App(app))
    }

    /// Releases every still-owned binding, newest first, before the
    /// scope's value leaves.
    fn insert_frees(
        &mut self,
        ret_ty: Option<&Type>,
        states: &States,
        owner: &str,
        out: &mut Vec<Expr>,
    ) {
        let mut frees: Vec<Expr> = Vec::new();
        for (id, bind) in states.iter().rev() {
            if bind.escaped || bind.state != State::Owned {
                continue;
            }
            let Some(free_stmt) = self.free_stmt(id, bind) else {
                continue;
            };
            frees.push(free_stmt);
        }
        if frees.is_empty() {
            return;
        }

        let unit = stdlib_ty("Unit");
        let ret_is_unit = ret_ty.is_none_or(|t| t.same_type(&unit));
        if ret_is_unit {
            out.extend(frees);
            return;
        }

        let Some(last) = out.pop() else {
            out.extend(frees);
            return;
        };
        let returns_plain_ref = matches!(
            last.only_term(),
            Some(Term::Ref(r)) if r.qualifier.is_none()
        );
        if returns_plain_ref {
            out.extend(frees);
            out.push(last);
            return;
        }

        // Anchor the result so the releases run before it is returned.
        let (tmp_stmt, tmp_ref) = self.anchor_result(last, owner);
        out.push(tmp_stmt);
        out.extend(frees);
        out.push(tmp_ref);
    }

    fn free_stmt(&mut self, id: &ResolvableId, bind: &BindState) -> Option<Expr> {
        let (free_name, free_id) = self.info.free_fn_for(&bind.ty)?;
        let mut head = Ref::resolved(free_name, free_id);
        head.type_spec = Some(Type::fun(vec![bind.ty.clone()], stdlib_ty("Unit")));
        let mut target = Ref::resolved(bind.name.clone(), id.clone());
        target.type_spec = Some(bind.ty.clone());
        let mut call = App::new(Term::Ref(head), Term::Ref(target));
        call.type_spec = Some(stdlib_ty("Unit"));
        let call = Term::App(call);

        let term = match &bind.witness {
            None => call,
            Some((witness_id, witness_name)) => {
                let mut guard = Ref::resolved(witness_name.clone(), witness_id.clone());
                guard.type_spec = Some(stdlib_ty("Bool"));
                Term::Cond(Cond {
                    cond: Box::new(Expr::single(Term::Ref(guard))),
                    if_true: Box::new(Expr::single(call)),
                    if_false: Box::new(Expr::single(Term::LiteralUnit(LiteralUnit {
                        span: SrcSpan::synthetic(),
                    }))),
                    span: SrcSpan::synthetic(),
                    type_spec: Some(stdlib_ty("Unit")),
                })
            }
        };
        let mut stmt = Expr::single(term);
        stmt.type_spec = Some(stdlib_ty("Unit"));
        Some(stmt)
    }

    /// `let __owns_<x> = <condition>;` for a value owned on one branch.
    /// Returns `None` when the mix cannot be reconciled.
    fn make_witness(
        &mut self,
        bound_name: &str,
        l: &LetBind,
        owner: &str,
    ) -> Option<(Expr, ResolvableId, String)> {
        let Some(Term::Cond(cond)) = l.value.only_term() else {
            return None;
        };
        let witness_name = format!("__owns_{bound_name}");
        let witness_id = ResolvableId::synth(&format!("{owner}::{witness_name}"));
        let stmt_let = LetBind {
            name: witness_name.clone(),
            id: Some(witness_id.clone()),
            value: Box::new((*cond.cond).clone()),
            span: SrcSpan::synthetic(),
            type_asc: None,
            type_spec: Some(stdlib_ty("Bool")),
            source: SourceOrigin::Synth,
        };
        self.new_lets.push(stmt_let.clone());
        let stmt = Expr::single(Term::Let(stmt_let));
        Some((stmt, witness_id, witness_name))
    }

    /// Rebinds a discarded allocating statement as an owned temporary.
    fn bind_temporary(&mut self, item: &mut Expr, owner: &str, states: &mut States) -> Expr {
        let name = format!("__tmp{}", self.tmp_counter);
        self.tmp_counter += 1;
        let id = ResolvableId::synth(&format!("{owner}::{name}"));
        let ty = item.type_spec.clone();

        let span = item.span;
        let value = std::mem::replace(item, Expr::new(Vec::new(), span));
        let l = LetBind {
            name: name.clone(),
            id: Some(id.clone()),
            value: Box::new(value),
            span,
            type_asc: None,
            type_spec: ty.clone(),
            source: SourceOrigin::Synth,
        };
        self.new_lets.push(l.clone());
        if let Some(ty) = ty {
            if self.info.is_heap(&ty) {
                track(states, id, name, ty, State::Owned, None);
            }
        }
        Expr::single(Term::Let(l))
    }

    /// Rebinds a returned value so releases can run before it leaves.
    fn anchor_result(&mut self, last: Expr, owner: &str) -> (Expr, Expr) {
        let name = format!("__tmp{}", self.tmp_counter);
        self.tmp_counter += 1;
        let id = ResolvableId::synth(&format!("{owner}::{name}"));
        let ty = last.type_spec.clone();
        let span = last.span;

        let l = LetBind {
            name: name.clone(),
            id: Some(id.clone()),
            value: Box::new(last),
            span,
            type_asc: None,
            type_spec: ty.clone(),
            source: SourceOrigin::Synth,
        };
        self.new_lets.push(l.clone());
        let stmt = Expr::single(Term::Let(l));
        let mut back = Ref::resolved(name, id);
        back.type_spec = ty.clone();
        let mut ref_stmt = Expr::single(Term::Ref(back));
        ref_stmt.type_spec = ty;
        (stmt, ref_stmt)
    }

    /// Pulls allocating sub-calls in borrowed argument positions out into
    /// owned temporaries, so they have a release point. Skips conditional
    /// branches (evaluation is not unconditional there) and consuming
    /// positions (the callee takes the value over).
    fn hoist_temporaries(
        &mut self,
        expr: &mut Expr,
        skip_top: bool,
        states: &mut States,
        owner: &str,
        out: &mut Vec<Expr>,
    ) {
        let terms = std::mem::take(&mut expr.terms);
        expr.terms = terms
            .into_iter()
            .map(|t| self.hoist_term(t, skip_top, states, owner, out))
            .collect();
    }

    fn hoist_term(
        &mut self,
        term: Term,
        is_top: bool,
        states: &mut States,
        owner: &str,
        out: &mut Vec<Expr>,
    ) -> Term {
        match term {
            Term::App(mut app) => {
                let facts = self.spine_facts(&app);
                self.hoist_spine(&mut app, &facts, states, owner, out);
                let term = Term::App(app);
                if !is_top && self.is_alloc_call(&term) {
                    self.lift_alloc(term, states, owner, out)
                } else {
                    term
                }
            }
            Term::Group(mut g) => {
                self.hoist_temporaries(&mut g.inner, false, states, owner, out);
                Term::Group(g)
            }
            Term::Tuple(mut t) => {
                for item in &mut t.items {
                    self.hoist_temporaries(item, false, states, owner, out);
                }
                Term::Tuple(t)
            }
            other => other,
        }
    }

    /// Number of arguments already below each spine node plus the head's
    /// consuming flags, computed before mutation.
    fn spine_facts(&self, app: &App) -> Option<FnFacts> {
        let (head, _) = app.spine();
        let Term::Ref(r) = head else { return None };
        let id = r.resolved_id.as_ref()?;
        self.fns.get(id).cloned()
    }

    fn hoist_spine(
        &mut self,
        app: &mut App,
        facts: &Option<FnFacts>,
        states: &mut States,
        owner: &str,
        out: &mut Vec<Expr>,
    ) -> usize {
        let below = match app.func.as_mut() {
            Term::App(inner) => self.hoist_spine(inner, facts, states, owner, out),
            _ => 0,
        };
        let consuming = facts
            .as_ref()
            .and_then(|f| f.consuming.get(below).copied())
            .unwrap_or(false);

        let arg = std::mem::replace(
            &mut *app.arg,
            Term::LiteralUnit(LiteralUnit {
                span: SrcSpan::synthetic(),
            }),
        );
        let arg = if consuming {
            // Consumed arguments transfer into the callee; recurse only
            // into their own sub-arguments.
            match arg {
                Term::App(mut inner) => {
                    let inner_facts = self.spine_facts(&inner);
                    self.hoist_spine(&mut inner, &inner_facts, states, owner, out);
                    Term::App(inner)
                }
                other => other,
            }
        } else {
            self.hoist_term(arg, false, states, owner, out)
        };
        *app.arg = arg;
        below + 1
    }

    fn lift_alloc(
        &mut self,
        term: Term,
        states: &mut States,
        owner: &str,
        out: &mut Vec<Expr>,
    ) -> Term {
        let ty = term.type_spec().cloned();
        let Some(ty) = ty else { return term };
        if !self.info.is_heap(&ty) {
            return term;
        }

        let name = format!("__tmp{}", self.tmp_counter);
        self.tmp_counter += 1;
        let id = ResolvableId::synth(&format!("{owner}::{name}"));
        let span = term.span();

        let l = LetBind {
            name: name.clone(),
            id: Some(id.clone()),
            value: Box::new(Expr::single(term)),
            span,
            type_asc: None,
            type_spec: Some(ty.clone()),
            source: SourceOrigin::Synth,
        };
        self.new_lets.push(l.clone());
        out.push(Expr::single(Term::Let(l)));
        track(states, id.clone(), name.clone(), ty.clone(), State::Owned, None);

        let mut r = Ref::resolved(name, id);
        r.type_spec = Some(ty);
        Term::Ref(r)
    }

    /// A saturated call to an allocating callable.
    fn is_alloc_call(&self, term: &Term) -> bool {
        let Term::App(app) = term else { return false };
        let (head, args) = app.spine();
        let Term::Ref(r) = head else { return false };
        let Some(id) = &r.resolved_id else { return false };
        let Some(facts) = self.fns.get(id) else {
            return false;
        };
        facts.allocates && args.len() == facts.params.max(1)
    }

    /// How a let-bound value relates to ownership.
    fn classify_value(&self, term: &Term) -> Ownership {
        match term {
            _ if self.is_alloc_call(term) => Ownership::Owned,
            Term::LiteralString(_) => Ownership::Literal,
            Term::Ref(_) => Ownership::Borrowed,
            Term::Cond(c) => {
                let a = c
                    .if_true
                    .only_term()
                    .map_or(Ownership::Borrowed, |t| self.classify_value(t));
                let b = c
                    .if_false
                    .only_term()
                    .map_or(Ownership::Borrowed, |t| self.classify_value(t));
                merge_ownership(a, b)
            }
            Term::Group(g) => g
                .inner
                .only_term()
                .map_or(Ownership::Borrowed, |t| self.classify_value(t)),
            _ => Ownership::Borrowed,
        }
    }

    /// Forward walk marking moves and flagging uses of dead bindings.
    /// Conditional branches fork the state and merge moves afterwards.
    fn walk_uses(&mut self, terms: &[Term], states: &mut States) {
        for term in terms {
            self.walk_term(term, states);
        }
    }

    fn walk_term(&mut self, term: &Term, states: &mut States) {
        match term {
            Term::Ref(r) => self.use_ref(r, states),
            Term::App(app) => self.walk_spine(app, states),
            Term::Cond(c) => {
                self.walk_uses(&c.cond.terms, states);
                let snapshot = states.clone();
                self.walk_uses(&c.if_true.terms, states);
                let after_true = std::mem::replace(states, snapshot);
                self.walk_uses(&c.if_false.terms, states);
                for (id, bind) in after_true {
                    if let State::Moved(at) = bind.state {
                        if let Some(existing) = states.get_mut(&id) {
                            if !matches!(existing.state, State::Moved(_)) {
                                existing.state = State::Moved(at);
                            }
                        }
                    }
                }
            }
            Term::Group(g) => self.walk_uses(&g.inner.terms, states),
            Term::Tuple(t) => {
                for item in &t.items {
                    self.walk_uses(&item.terms, states);
                }
            }
            Term::Expr(e) => self.walk_uses(&e.terms, states),
            Term::Seq(s) => {
                for item in &s.items {
                    self.walk_uses(&item.terms, states);
                }
            }
            Term::Let(l) => self.walk_uses(&l.value.terms, states),
            _ => {}
        }
    }

    fn use_ref(&mut self, r: &Ref, states: &mut States) {
        let base = r.base();
        let Some(id) = &base.resolved_id else { return };
        let Some(bind) = states.get_mut(id) else { return };
        if let State::Moved(_) = bind.state {
            self.diag.error(OwnershipError::UseAfterMove {
                name: bind.name.clone(),
                span: base.span,
            });
        }
    }

    fn walk_spine(&mut self, app: &App, states: &mut States) {
        let (head, args) = app.spine();

        let facts = match head {
            Term::Ref(r) => r.resolved_id.as_ref().and_then(|id| self.fns.get(id)).cloned(),
            _ => None,
        };

        if let Term::Ref(r) = head {
            self.use_ref(r, states);
        }

        if let Some(facts) = &facts {
            if args.len() < facts.params && facts.consuming.iter().any(|c| *c) {
                self.diag.error(OwnershipError::PartialApplicationWithConsuming {
                    name: facts.name.clone(),
                    span: app.span,
                });
            }
        }

        for (i, arg) in args.iter().enumerate() {
            self.walk_term(arg, states);

            let consuming = facts
                .as_ref()
                .and_then(|f| f.consuming.get(i).copied())
                .unwrap_or(false);
            if !consuming {
                continue;
            }
            let Term::Ref(r) = arg else { continue };
            if r.qualifier.is_some() {
                continue;
            }
            let Some(id) = &r.resolved_id else { continue };
            let Some(bind) = states.get_mut(id) else {
                continue;
            };
            if matches!(bind.state, State::Moved(_)) {
                continue;
            }

            // A later argument of the same call reusing the binding means
            // the consuming use is not its last.
            let reused_later = args
                .iter()
                .skip(i + 1)
                .any(|later| term_mentions(later, id));
            if reused_later {
                self.diag.error(OwnershipError::ConsumingParamNotLastUse {
                    name: bind.name.clone(),
                    span: r.span,
                });
            }
            bind.state = State::Moved(r.span);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Ownership {
    Owned,
    Borrowed,
    Literal,
    Mixed,
    Irreconcilable,
}

fn merge_ownership(a: Ownership, b: Ownership) -> Ownership {
    use Ownership::*;
    match (a, b) {
        (Owned, Owned) => Owned,
        (Literal, Literal) => Literal,
        (Borrowed, Borrowed) => Borrowed,
        (Owned, Literal) | (Literal, Owned) => Mixed,
        (Irreconcilable, _) | (_, Irreconcilable) => Irreconcilable,
        (Owned, Borrowed) | (Borrowed, Owned) => Irreconcilable,
        (Literal, Borrowed) | (Borrowed, Literal) => Borrowed,
        (Mixed, _) | (_, Mixed) => Mixed,
    }
}

fn track(
    states: &mut States,
    id: ResolvableId,
    name: String,
    ty: Type,
    state: State,
    witness: Option<(ResolvableId, String)>,
) {
    states.insert(
        id,
        BindState {
            name,
            ty,
            state,
            escaped: false,
            is_param: false,
            witness,
        },
    );
}

fn is_let_stmt(item: &Expr) -> bool {
    matches!(item.only_term(), Some(Term::Let(_)))
}

fn term_mentions(term: &Term, id: &ResolvableId) -> bool {
    let expr = Expr::single(term.clone());
    mml_ast::visit::refs_in(&expr)
        .iter()
        .any(|r| r.resolved_id.as_ref() == Some(id))
}

fn stdlib_ty(name: &str) -> Type {
    Type::Ref(mml_ast::TypeRef::resolved(name, ResolvableId::stdlib(name)))
}
