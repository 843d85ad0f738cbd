//! Top-level module members: bindings, type declarations, and the error
//! wrappers that keep parsing and analysis total.

use indexmap::IndexMap;

use crate::ids::ResolvableId;
use crate::span::{SourceOrigin, SrcSpan};
use crate::term::{Expr, Lambda};
use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// What kind of callable a binding declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingOrigin {
    Function,
    Operator,
    Constructor,
    Destructor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingArity {
    Nullary,
    Unary,
    Binary,
    Nary(u32),
}

impl BindingArity {
    pub fn of(count: usize) -> Self {
        match count {
            0 => BindingArity::Nullary,
            1 => BindingArity::Unary,
            2 => BindingArity::Binary,
            n => BindingArity::Nary(n as u32),
        }
    }

    pub fn count(&self) -> usize {
        match self {
            BindingArity::Nullary => 0,
            BindingArity::Unary => 1,
            BindingArity::Binary => 2,
            BindingArity::Nary(n) => *n as usize,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
    None,
}

/// Metadata of a callable binding: how it was declared, how the rewriter
/// should treat it, and both its surface and mangled spellings.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingMeta {
    pub origin: BindingOrigin,
    pub arity: BindingArity,
    pub precedence: u32,
    pub assoc: Associativity,
    pub original_name: String,
    pub mangled_name: String,
}

/// A lambda parameter. `consuming` marks `~`-declared parameters, which
/// take ownership of their argument.
#[derive(Debug, Clone, PartialEq)]
pub struct FnParam {
    pub name: String,
    pub id: Option<ResolvableId>,
    pub type_asc: Option<Type>,
    pub type_spec: Option<Type>,
    pub consuming: bool,
    pub span: SrcSpan,
    pub source: SourceOrigin,
}

impl FnParam {
    pub fn new(name: impl Into<String>, span: SrcSpan) -> Self {
        Self {
            name: name.into(),
            id: None,
            type_asc: None,
            type_spec: None,
            consuming: false,
            span,
            source: SourceOrigin::Source,
        }
    }
}

/// The unified binding form: values, functions, and operators are all a
/// name bound to an expression. Callables carry `meta` and their value's
/// sole term is a [`Lambda`].
#[derive(Debug, Clone, PartialEq)]
pub struct Bnd {
    pub id: Option<ResolvableId>,
    /// Mangled name; operators mangle arity in (`op.minus.2`), everything
    /// else keeps its surface spelling.
    pub name: String,
    pub value: Expr,
    pub type_asc: Option<Type>,
    pub type_spec: Option<Type>,
    pub meta: Option<BindingMeta>,
    pub doc_comment: Option<String>,
    pub visibility: Visibility,
    pub span: SrcSpan,
    pub source: SourceOrigin,
}

impl Bnd {
    /// Surface name: the original spelling for callables, `name` otherwise.
    pub fn surface_name(&self) -> &str {
        match &self.meta {
            Some(meta) => &meta.original_name,
            None => &self.name,
        }
    }

    pub fn lambda(&self) -> Option<&Lambda> {
        match self.value.only_term() {
            Some(crate::term::Term::Lambda(l)) => Some(l),
            _ => None,
        }
    }

    pub fn lambda_mut(&mut self) -> Option<&mut Lambda> {
        match self.value.only_term_mut() {
            Some(crate::term::Term::Lambda(l)) => Some(l),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        self.meta.is_some()
    }
}

/// Underlying representation of a native type definition.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeRep {
    Primitive { llvm: String },
    Pointer { pointee: String },
    Struct { fields: IndexMap<String, Type> },
}

/// A nominal type: identity is the declaration, never the representation.
/// Two defs over the same LLVM scalar are distinct types.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    pub name: String,
    pub id: Option<ResolvableId>,
    pub rep: NativeRep,
    /// Values of this type live on the heap and need a release helper.
    pub heap: bool,
    pub doc_comment: Option<String>,
    pub visibility: Visibility,
    pub span: SrcSpan,
    pub source: SourceOrigin,
}

/// A name for an existing type expression. After resolution `type_spec`
/// holds the canonical (alias-free) form.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAlias {
    pub name: String,
    pub id: Option<ResolvableId>,
    pub aliased: Type,
    pub type_spec: Option<Type>,
    pub doc_comment: Option<String>,
    pub visibility: Visibility,
    pub span: SrcSpan,
    pub source: SourceOrigin,
}

/// A struct field; separately resolvable so selection can pin to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub id: Option<ResolvableId>,
    pub type_asc: Type,
    pub type_spec: Option<Type>,
    pub span: SrcSpan,
    pub source: SourceOrigin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeStruct {
    pub name: String,
    pub id: Option<ResolvableId>,
    pub fields: Vec<Field>,
    pub doc_comment: Option<String>,
    pub visibility: Visibility,
    pub span: SrcSpan,
    pub source: SourceOrigin,
}

impl TypeStruct {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A member shadowed by an earlier declaration with the same key.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateMember {
    pub member: Box<Member>,
    pub first_span: SrcSpan,
    pub span: SrcSpan,
}

/// A member analysis rejected wholesale (e.g. duplicated parameter names).
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidMember {
    pub member: Box<Member>,
    pub reason: String,
    pub span: SrcSpan,
}

/// A member the parser could not finish; the failed source is preserved
/// and parsing resumed at the next member boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsingMemberError {
    pub failed_code: String,
    pub message: String,
    pub span: SrcSpan,
}

/// An identifier that breaks the lexical rules, e.g. `123invalid`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsingIdError {
    pub invalid_id: String,
    pub message: String,
    pub span: SrcSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Bnd(Bnd),
    TypeDef(TypeDef),
    TypeAlias(TypeAlias),
    TypeStruct(TypeStruct),
    Duplicate(DuplicateMember),
    Invalid(InvalidMember),
    ParseError(ParsingMemberError),
    IdError(ParsingIdError),
}

impl Member {
    pub fn name(&self) -> Option<&str> {
        match self {
            Member::Bnd(b) => Some(&b.name),
            Member::TypeDef(t) => Some(&t.name),
            Member::TypeAlias(t) => Some(&t.name),
            Member::TypeStruct(t) => Some(&t.name),
            Member::Duplicate(d) => d.member.name(),
            Member::Invalid(i) => i.member.name(),
            Member::ParseError(_) | Member::IdError(_) => None,
        }
    }

    pub fn span(&self) -> SrcSpan {
        match self {
            Member::Bnd(b) => b.span,
            Member::TypeDef(t) => t.span,
            Member::TypeAlias(t) => t.span,
            Member::TypeStruct(t) => t.span,
            Member::Duplicate(d) => d.span,
            Member::Invalid(i) => i.span,
            Member::ParseError(e) => e.span,
            Member::IdError(e) => e.span,
        }
    }

    pub fn as_bnd(&self) -> Option<&Bnd> {
        match self {
            Member::Bnd(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_bnd_mut(&mut self) -> Option<&mut Bnd> {
        match self {
            Member::Bnd(b) => Some(b),
            _ => None,
        }
    }
}
