//! The expression algebra.
//!
//! Terms form a closed sum. Straight from the parser an [`Expr`] holds a
//! flat juxtaposition of terms; the semantic rewriter turns that into a
//! curried [`App`] tree, and the simplifier collapses the trivial wrappers
//! that are left over. Error arms (`Invalid`, `Error`) keep every phase
//! total: a node that cannot be processed is wrapped, never dropped.

use crate::ids::ResolvableId;
use crate::member::FnParam;
use crate::span::{SourceOrigin, SrcSpan};
use crate::types::Type;

/// An expression: an ordered sequence of terms.
///
/// Member bodies and conditional branches stay wrapped in `Expr` through
/// every phase so their spans remain addressable.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub terms: Vec<Term>,
    pub span: SrcSpan,
    pub type_asc: Option<Type>,
    pub type_spec: Option<Type>,
}

impl Expr {
    pub fn new(terms: Vec<Term>, span: SrcSpan) -> Self {
        Self {
            terms,
            span,
            type_asc: None,
            type_spec: None,
        }
    }

    pub fn single(term: Term) -> Self {
        let span = term.span();
        Self::new(vec![term], span)
    }

    /// The sole term, if this expression has exactly one.
    pub fn only_term(&self) -> Option<&Term> {
        match self.terms.as_slice() {
            [t] => Some(t),
            _ => None,
        }
    }

    pub fn only_term_mut(&mut self) -> Option<&mut Term> {
        match self.terms.as_mut_slice() {
            [t] => Some(t),
            _ => None,
        }
    }
}

/// A by-name reference to a resolvable entity.
///
/// `qualifier` chains field selection: `a.b` is `Ref { name: "b",
/// qualifier: Ref { name: "a" } }`. After resolution `resolved_id` is set
/// for unambiguous references while `candidate_ids` keeps the discovery
/// trace for diagnostics and tooling.
#[derive(Debug, Clone, PartialEq)]
pub struct Ref {
    pub name: String,
    pub qualifier: Option<Box<Ref>>,
    pub span: SrcSpan,
    pub resolved_id: Option<ResolvableId>,
    pub candidate_ids: Vec<ResolvableId>,
    pub type_asc: Option<Type>,
    pub type_spec: Option<Type>,
}

impl Ref {
    pub fn named(name: impl Into<String>, span: SrcSpan) -> Self {
        Self {
            name: name.into(),
            qualifier: None,
            span,
            resolved_id: None,
            candidate_ids: Vec::new(),
            type_asc: None,
            type_spec: None,
        }
    }

    /// Reference already pinned to a target, for synthesized code.
    pub fn resolved(name: impl Into<String>, id: ResolvableId) -> Self {
        Self {
            name: name.into(),
            qualifier: None,
            span: SrcSpan::synthetic(),
            resolved_id: Some(id),
            candidate_ids: Vec::new(),
            type_asc: None,
            type_spec: None,
        }
    }

    /// The innermost reference of a qualifier chain (the chain's base).
    pub fn base(&self) -> &Ref {
        match &self.qualifier {
            Some(q) => q.base(),
            None => self,
        }
    }

    pub fn base_mut(&mut self) -> &mut Ref {
        if self.qualifier.is_some() {
            self.qualifier.as_mut().unwrap().base_mut()
        } else {
            self
        }
    }
}

/// Curried application. `func` is syntactically one of `Ref`, `App`,
/// `Lambda`; multi-argument calls nest.
#[derive(Debug, Clone, PartialEq)]
pub struct App {
    pub func: Box<Term>,
    pub arg: Box<Term>,
    pub span: SrcSpan,
    pub type_spec: Option<Type>,
}

impl App {
    pub fn new(func: Term, arg: Term) -> Self {
        let span = func.span().merge(arg.span());
        Self {
            func: Box::new(func),
            arg: Box::new(arg),
            span,
            type_spec: None,
        }
    }

    /// Flattens the curried spine: `((f a) b)` gives `(f, [a, b])`.
    pub fn spine(&self) -> (&Term, Vec<&Term>) {
        match self.func.as_ref() {
            Term::App(inner) => {
                let (head, mut args) = inner.spine();
                args.push(self.arg.as_ref());
                (head, args)
            }
            head => (head, vec![self.arg.as_ref()]),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub params: Vec<FnParam>,
    pub body: Box<Expr>,
    pub span: SrcSpan,
    /// Declared return type.
    pub type_asc: Option<Type>,
    pub type_spec: Option<Type>,
    pub is_tail_recursive: bool,
}

impl Lambda {
    pub fn new(params: Vec<FnParam>, body: Expr, span: SrcSpan) -> Self {
        Self {
            params,
            body: Box::new(body),
            span,
            type_asc: None,
            type_spec: None,
            is_tail_recursive: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cond {
    pub cond: Box<Expr>,
    pub if_true: Box<Expr>,
    pub if_false: Box<Expr>,
    pub span: SrcSpan,
    pub type_spec: Option<Type>,
}

/// A parenthesized sub-expression. One element stays a group; two or more
/// become a [`TermTuple`].
#[derive(Debug, Clone, PartialEq)]
pub struct TermGroup {
    pub inner: Box<Expr>,
    pub span: SrcSpan,
    pub type_spec: Option<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TermTuple {
    pub items: Vec<Expr>,
    pub span: SrcSpan,
    pub type_spec: Option<Type>,
}

/// `;`-separated statement sequence inside a binding body. Its value is
/// the last item.
#[derive(Debug, Clone, PartialEq)]
pub struct Seq {
    pub items: Vec<Expr>,
    pub span: SrcSpan,
    pub type_spec: Option<Type>,
}

/// Local binding statement. Scopes over the remaining items of the
/// enclosing sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct LetBind {
    pub name: String,
    pub id: Option<ResolvableId>,
    pub value: Box<Expr>,
    pub span: SrcSpan,
    pub type_asc: Option<Type>,
    pub type_spec: Option<Type>,
    pub source: SourceOrigin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralInt {
    pub value: i64,
    pub span: SrcSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralFloat {
    pub value: f64,
    pub span: SrcSpan,
}

/// String contents are kept verbatim; escape decoding happens in codegen.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralString {
    pub value: String,
    pub span: SrcSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralBool {
    pub value: bool,
    pub span: SrcSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralUnit {
    pub span: SrcSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub span: SrcSpan,
}

/// `???`, a typed gap the checker fills from the expected type.
#[derive(Debug, Clone, PartialEq)]
pub struct Hole {
    pub span: SrcSpan,
    pub type_spec: Option<Type>,
}

/// Body sentinel of a synthesized struct constructor; tells codegen to
/// emit struct assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct DataConstructor {
    pub struct_name: String,
    pub span: SrcSpan,
}

/// Reserved body sentinel for struct teardown; no current phase emits it.
#[derive(Debug, Clone, PartialEq)]
pub struct DataDestructor {
    pub struct_name: String,
    pub span: SrcSpan,
}

/// Memory behavior of a native implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemEffect {
    Alloc,
    Static,
    #[default]
    NoAlloc,
}

/// Body marker of a `@native` declaration. Opaque to the checker.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeImpl {
    pub mem_effect: MemEffect,
    pub template: Option<String>,
    pub span: SrcSpan,
}

/// An expression analysis gave up on; the offending terms are preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidExpression {
    pub terms: Vec<Term>,
    pub reason: String,
    pub span: SrcSpan,
}

/// A term the parser could not make sense of.
#[derive(Debug, Clone, PartialEq)]
pub struct TermError {
    pub message: String,
    pub failed_code: String,
    pub span: SrcSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Ref(Ref),
    App(App),
    Lambda(Lambda),
    Cond(Cond),
    Group(TermGroup),
    Tuple(TermTuple),
    Expr(Expr),
    Seq(Seq),
    Let(LetBind),
    LiteralInt(LiteralInt),
    LiteralFloat(LiteralFloat),
    LiteralString(LiteralString),
    LiteralBool(LiteralBool),
    LiteralUnit(LiteralUnit),
    Placeholder(Placeholder),
    Hole(Hole),
    DataConstructor(DataConstructor),
    DataDestructor(DataDestructor),
    Native(NativeImpl),
    Invalid(InvalidExpression),
    Error(TermError),
}

impl Term {
    pub fn span(&self) -> SrcSpan {
        match self {
            Term::Ref(t) => t.span,
            Term::App(t) => t.span,
            Term::Lambda(t) => t.span,
            Term::Cond(t) => t.span,
            Term::Group(t) => t.span,
            Term::Tuple(t) => t.span,
            Term::Expr(t) => t.span,
            Term::Seq(t) => t.span,
            Term::Let(t) => t.span,
            Term::LiteralInt(t) => t.span,
            Term::LiteralFloat(t) => t.span,
            Term::LiteralString(t) => t.span,
            Term::LiteralBool(t) => t.span,
            Term::LiteralUnit(t) => t.span,
            Term::Placeholder(t) => t.span,
            Term::Hole(t) => t.span,
            Term::DataConstructor(t) => t.span,
            Term::DataDestructor(t) => t.span,
            Term::Native(t) => t.span,
            Term::Invalid(t) => t.span,
            Term::Error(t) => t.span,
        }
    }

    /// The computed type of this term, where one is stored.
    pub fn type_spec(&self) -> Option<&Type> {
        match self {
            Term::Ref(t) => t.type_spec.as_ref(),
            Term::App(t) => t.type_spec.as_ref(),
            Term::Lambda(t) => t.type_spec.as_ref(),
            Term::Cond(t) => t.type_spec.as_ref(),
            Term::Group(t) => t.type_spec.as_ref(),
            Term::Tuple(t) => t.type_spec.as_ref(),
            Term::Expr(t) => t.type_spec.as_ref(),
            Term::Seq(t) => t.type_spec.as_ref(),
            Term::Let(t) => t.type_spec.as_ref(),
            Term::Hole(t) => t.type_spec.as_ref(),
            _ => None,
        }
    }

    pub fn set_type_spec(&mut self, ty: Type) {
        match self {
            Term::Ref(t) => t.type_spec = Some(ty),
            Term::App(t) => t.type_spec = Some(ty),
            Term::Lambda(t) => t.type_spec = Some(ty),
            Term::Cond(t) => t.type_spec = Some(ty),
            Term::Group(t) => t.type_spec = Some(ty),
            Term::Tuple(t) => t.type_spec = Some(ty),
            Term::Expr(t) => t.type_spec = Some(ty),
            Term::Seq(t) => t.type_spec = Some(ty),
            Term::Let(t) => t.type_spec = Some(ty),
            Term::Hole(t) => t.type_spec = Some(ty),
            _ => {}
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Term::Invalid(_) | Term::Error(_))
    }

    /// Whether this term may appear in the function position of an [`App`].
    pub fn can_head_application(&self) -> bool {
        matches!(self, Term::Ref(_) | Term::App(_) | Term::Lambda(_))
    }
}
