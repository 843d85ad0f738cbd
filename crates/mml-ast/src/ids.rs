//! Stable identifiers for resolvable nodes.
//!
//! An id survives every phase rewrite: phases replace node contents under
//! the same id, so references held elsewhere in the tree stay meaningful
//! without back-pointers.

/// Module-unique identifier of a node that can be the target of a reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolvableId(String);

/// Prefix for prelude members injected into every module.
pub const STDLIB_PREFIX: &str = "stdlib::";

/// Prefix for members synthesized by semantic phases (memory helpers, temps).
pub const SYNTH_PREFIX: &str = "synth::";

impl ResolvableId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id for a prelude member, e.g. `stdlib::op.plus.2`.
    pub fn stdlib(name: &str) -> Self {
        Self(format!("{STDLIB_PREFIX}{name}"))
    }

    /// Id for a member synthesized during analysis, e.g. `synth::__free_Point`.
    pub fn synth(name: &str) -> Self {
        Self(format!("{SYNTH_PREFIX}{name}"))
    }

    pub fn is_stdlib(&self) -> bool {
        self.0.starts_with(STDLIB_PREFIX)
    }

    pub fn is_synth(&self) -> bool {
        self.0.starts_with(SYNTH_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResolvableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResolvableId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}
