//! The resolvable-entity index: `id -> current node`, split into value and
//! type namespaces.
//!
//! This is the soft-reference backbone. References across the tree hold
//! ids, never pointers, so phases can rewrite any node freely; the index is
//! replaced wholesale, never mutated in place across a phase boundary.

use indexmap::IndexMap;

use crate::ids::ResolvableId;
use crate::member::{Bnd, Field, TypeAlias, TypeDef, TypeStruct};
use crate::term::LetBind;

/// A value-namespace entity: anything a value reference can point at.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolvable {
    Binding(Bnd),
    Param(crate::member::FnParam),
    Let(LetBind),
    Field(Field),
}

impl Resolvable {
    pub fn name(&self) -> &str {
        match self {
            Resolvable::Binding(b) => &b.name,
            Resolvable::Param(p) => &p.name,
            Resolvable::Let(l) => &l.name,
            Resolvable::Field(f) => &f.name,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Resolvable::Binding(_) => "binding",
            Resolvable::Param(_) => "parameter",
            Resolvable::Let(_) => "local",
            Resolvable::Field(_) => "field",
        }
    }
}

/// A type-namespace entity.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvableType {
    Def(TypeDef),
    Alias(TypeAlias),
    Struct(TypeStruct),
}

impl ResolvableType {
    pub fn name(&self) -> &str {
        match self {
            ResolvableType::Def(d) => &d.name,
            ResolvableType::Alias(a) => &a.name,
            ResolvableType::Struct(s) => &s.name,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ResolvableType::Def(_) => "type",
            ResolvableType::Alias(_) => "alias",
            ResolvableType::Struct(_) => "struct",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvablesIndex {
    values: IndexMap<ResolvableId, Resolvable>,
    types: IndexMap<ResolvableId, ResolvableType>,
}

impl ResolvablesIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_value(&mut self, id: ResolvableId, node: Resolvable) {
        self.values.insert(id, node);
    }

    pub fn insert_type(&mut self, id: ResolvableId, node: ResolvableType) {
        self.types.insert(id, node);
    }

    pub fn value(&self, id: &ResolvableId) -> Option<&Resolvable> {
        self.values.get(id)
    }

    pub fn type_entry(&self, id: &ResolvableId) -> Option<&ResolvableType> {
        self.types.get(id)
    }

    pub fn contains(&self, id: &ResolvableId) -> bool {
        self.values.contains_key(id) || self.types.contains_key(id)
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.types.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = (&ResolvableId, &Resolvable)> {
        self.values.iter()
    }

    pub fn types(&self) -> impl Iterator<Item = (&ResolvableId, &ResolvableType)> {
        self.types.iter()
    }
}
