//! The compilation unit: a module and its members.

use crate::index::ResolvablesIndex;
use crate::member::{Member, Visibility};

/// One module per source file. Member order is source order and is
/// preserved by every phase: rewrites replace in place, never reorder.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    pub visibility: Visibility,
    pub members: Vec<Member>,
    pub doc_comment: Option<String>,
    pub source_path: Option<String>,
    pub resolvables: ResolvablesIndex,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            members: Vec::new(),
            doc_comment: None,
            source_path: None,
            resolvables: ResolvablesIndex::new(),
        }
    }

    /// Bindings in declaration order.
    pub fn bindings(&self) -> impl Iterator<Item = &crate::member::Bnd> {
        self.members.iter().filter_map(Member::as_bnd)
    }

    pub fn binding(&self, name: &str) -> Option<&crate::member::Bnd> {
        self.bindings().find(|b| b.name == name)
    }
}
