//! The type expression algebra.
//!
//! Types form a closed sum. Nominal variants (`Ref`, `Struct`) compare by
//! resolved id; structural variants (`Fn`, `Tuple`, `Unit`) compare
//! recursively. The generic machinery (`Application`, `Variable`, `Scheme`,
//! `Union`, `Intersection`, `OpenRecord`, `Refinement`) is representable but
//! not solved by the current checker.

use indexmap::IndexMap;

use crate::ids::ResolvableId;
use crate::span::SrcSpan;

/// A reference to a named type, resolved to a stable id by analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    pub name: String,
    pub span: SrcSpan,
    pub resolved_id: Option<ResolvableId>,
    pub candidate_ids: Vec<ResolvableId>,
}

impl TypeRef {
    pub fn named(name: impl Into<String>, span: SrcSpan) -> Self {
        Self {
            name: name.into(),
            span,
            resolved_id: None,
            candidate_ids: Vec::new(),
        }
    }

    /// A reference already pinned to its target, for synthesized nodes.
    pub fn resolved(name: impl Into<String>, id: ResolvableId) -> Self {
        Self {
            name: name.into(),
            span: SrcSpan::synthetic(),
            resolved_id: Some(id),
            candidate_ids: Vec::new(),
        }
    }
}

/// Function type: parameter list plus return type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeFn {
    pub params: Vec<Type>,
    pub ret: Box<Type>,
}

/// Nominal handle to a struct declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeStructRef {
    pub name: String,
    pub id: ResolvableId,
}

/// A type expression that could not be resolved; keeps the original around
/// for tooling.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidType {
    pub original: Box<Type>,
    pub span: SrcSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Ref(TypeRef),
    /// Raw LLVM scalar, e.g. `i64`. Appears only inside native definitions.
    NativePrimitive { llvm: String },
    /// Raw LLVM pointer, e.g. `*i8`.
    NativePointer { pointee: String },
    /// Native struct layout with ordered fields.
    NativeStruct { fields: IndexMap<String, Type> },
    Fn(TypeFn),
    Tuple(Vec<Type>),
    Struct(TypeStructRef),
    Application { ctor: Box<Type>, args: Vec<Type> },
    OpenRecord { fields: IndexMap<String, Type> },
    Union(Vec<Type>),
    Intersection(Vec<Type>),
    Group(Box<Type>),
    Variable { name: String },
    Scheme { vars: Vec<String>, body: Box<Type> },
    Unit,
    Refinement { base: Box<Type>, predicate: String },
    Invalid(InvalidType),
}

impl Type {
    pub fn fun(params: Vec<Type>, ret: Type) -> Self {
        Type::Fn(TypeFn {
            params,
            ret: Box::new(ret),
        })
    }

    /// The nominal id this type stands for, if it is a resolved name.
    pub fn nominal_id(&self) -> Option<&ResolvableId> {
        match self {
            Type::Ref(r) => r.resolved_id.as_ref(),
            Type::Struct(s) => Some(&s.id),
            Type::Group(inner) => inner.nominal_id(),
            _ => None,
        }
    }

    /// Nominal equality as used by the checker: resolved names compare by
    /// id, structural forms compare pointwise, invalid types never compare
    /// equal.
    pub fn same_type(&self, other: &Type) -> bool {
        if let (Some(a), Some(b)) = (self.nominal_id(), other.nominal_id()) {
            return a == b;
        }
        match (self.unwrap_groups(), other.unwrap_groups()) {
            (Type::Unit, Type::Unit) => true,
            (Type::Fn(a), Type::Fn(b)) => {
                a.params.len() == b.params.len()
                    && a.params
                        .iter()
                        .zip(&b.params)
                        .all(|(x, y)| x.same_type(y))
                    && a.ret.same_type(&b.ret)
            }
            (Type::Tuple(a), Type::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_type(y))
            }
            (Type::NativePrimitive { llvm: a }, Type::NativePrimitive { llvm: b }) => a == b,
            (Type::NativePointer { pointee: a }, Type::NativePointer { pointee: b }) => a == b,
            _ => false,
        }
    }

    fn unwrap_groups(&self) -> &Type {
        match self {
            Type::Group(inner) => inner.unwrap_groups(),
            other => other,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Type::Invalid(_))
    }

    pub fn span(&self) -> Option<SrcSpan> {
        match self {
            Type::Ref(r) => Some(r.span),
            Type::Invalid(inv) => Some(inv.span),
            Type::Group(inner) => inner.span(),
            _ => None,
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Ref(r) => f.write_str(&r.name),
            Type::NativePrimitive { llvm } => write!(f, "@native[t={llvm}]"),
            Type::NativePointer { pointee } => write!(f, "@native[t=*{pointee}]"),
            Type::NativeStruct { fields } => {
                f.write_str("@native {")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, " {name}: {ty}")?;
                }
                f.write_str(" }")
            }
            Type::Fn(func) => {
                f.write_str("(")?;
                for (i, p) in func.params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ") -> {}", func.ret)
            }
            Type::Tuple(items) => {
                f.write_str("(")?;
                for (i, t) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{t}")?;
                }
                f.write_str(")")
            }
            Type::Struct(s) => f.write_str(&s.name),
            Type::Application { ctor, args } => {
                write!(f, "{ctor}[")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{a}")?;
                }
                f.write_str("]")
            }
            Type::OpenRecord { fields } => {
                f.write_str("{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, " {name}: {ty}")?;
                }
                f.write_str(", .. }")
            }
            Type::Union(items) => {
                for (i, t) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{t}")?;
                }
                Ok(())
            }
            Type::Intersection(items) => {
                for (i, t) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" & ")?;
                    }
                    write!(f, "{t}")?;
                }
                Ok(())
            }
            Type::Group(inner) => write!(f, "({inner})"),
            Type::Variable { name } => f.write_str(name),
            Type::Scheme { vars, body } => {
                f.write_str("forall")?;
                for v in vars {
                    write!(f, " {v}")?;
                }
                write!(f, ". {body}")
            }
            Type::Unit => f.write_str("()"),
            Type::Refinement { base, predicate } => write!(f, "{{ {base} where {predicate} }}"),
            Type::Invalid(inv) => write!(f, "<invalid: {}>", inv.original),
        }
    }
}
