//! MinnieML AST: the data structures the compiler pipeline operates on.
//!
//! - `span` - 1-based source points and half-open spans
//! - `ids` - stable identifiers for resolvable entities
//! - `member` - top-level declarations and their error wrappers
//! - `term` - the expression algebra
//! - `types` - the type expression algebra
//! - `module` - the compilation unit
//! - `index` - the id -> node map shared by all phases
//! - `visit` - read-only tree walks
//!
//! Nodes are value-like: phases rewrite by producing new copies, and
//! cross-node references go through stable ids plus the
//! [`ResolvablesIndex`], never through pointers.

pub mod ids;
pub mod index;
pub mod member;
pub mod module;
pub mod span;
pub mod term;
pub mod types;
pub mod visit;

#[cfg(test)]
mod types_tests;

pub use ids::{ResolvableId, STDLIB_PREFIX, SYNTH_PREFIX};
pub use index::{Resolvable, ResolvableType, ResolvablesIndex};
pub use member::{
    Associativity, BindingArity, BindingMeta, BindingOrigin, Bnd, DuplicateMember, Field, FnParam,
    InvalidMember, Member, NativeRep, ParsingIdError, ParsingMemberError, TypeAlias, TypeDef,
    TypeStruct, Visibility,
};
pub use module::Module;
pub use span::{SourceOrigin, SrcPoint, SrcSpan};
pub use term::{
    App, Cond, DataConstructor, DataDestructor, Expr, Hole, InvalidExpression, LetBind, Lambda,
    LiteralBool, LiteralFloat, LiteralInt, LiteralString, LiteralUnit, MemEffect, NativeImpl,
    Placeholder, Ref, Seq, Term, TermError, TermGroup, TermTuple,
};
pub use types::{InvalidType, Type, TypeFn, TypeRef, TypeStructRef};
