//! Semantic analysis phases.
//!
//! Each phase is a total function from module to module that may append
//! diagnostics; phases run in a fixed order and never reorder members:
//!
//! 1. `surface` - lift parse-error nodes into diagnostics
//! 2. `duplicates` - duplicate declaration detection
//! 3. `id_assign` - stable id assignment, first index seed
//! 4. `type_resolve` - type reference resolution, alias collapse
//! 5. `ref_resolve` - value reference resolution through lexical scopes
//! 6. `rewrite` - precedence climbing into curried applications
//! 7. `simplify` - trivial wrapper removal
//! 8. `type_check` - bidirectional monomorphic checking
//! 9. `memory` - `__free_*` / `__clone_*` synthesis for heap structs
//! 10. `indexer` - final resolvable-index rebuild
//! 11. `tailrec` - tail-recursion tagging
//! 12. `ownership` - affine tracking, free/clone insertion
//! 13. `entry` - entry-point validation

pub mod duplicates;
pub mod entry;
pub mod heap;
pub mod id_assign;
pub mod indexer;
pub mod memory;
pub mod ownership;
pub mod ref_resolve;
pub mod rewrite;
pub mod simplify;
pub mod surface;
pub mod tailrec;
pub mod type_check;
pub mod type_resolve;

#[cfg(test)]
mod duplicates_tests;
#[cfg(test)]
mod id_assign_tests;
#[cfg(test)]
mod memory_tests;
#[cfg(test)]
mod ownership_tests;
#[cfg(test)]
mod ref_resolve_tests;
#[cfg(test)]
mod rewrite_tests;
#[cfg(test)]
mod tailrec_tests;
#[cfg(test)]
mod type_resolve_tests;
