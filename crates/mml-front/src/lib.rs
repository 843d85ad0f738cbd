//! MinnieML compiler front-end.
//!
//! This crate turns a source text into a fully resolved, type-checked,
//! ownership-annotated module ready for code generation:
//! - `parser` - character-level parser with member-boundary recovery
//! - `stdlib` - the compiled-in prelude injected into every module
//! - `analyze` - the semantic phase chain
//! - `diagnostics` - the error taxonomy and renderer
//! - `pipeline` - the staged driver and its two pure entry points
//!
//! # Example
//!
//! ```
//! use mml_front::Compilation;
//!
//! let state = Compilation::source("let answer = 41 + 1;")
//!     .name("Demo")
//!     .parse()
//!     .analyze();
//!
//! assert!(state.can_emit_code);
//! ```

pub mod analyze;
pub mod diagnostics;
pub mod parser;
pub mod pipeline;
pub mod state;
pub mod stdlib;

#[cfg(test)]
pub mod test_utils;

#[cfg(test)]
mod stdlib_tests;

pub use diagnostics::{
    CompilationError, CompilerWarning, DiagnosticRecord, Diagnostics, DiagnosticsPrinter,
    OwnershipError, ParserError, SemanticError, Severity, TypeError,
};
pub use parser::parse;
pub use pipeline::{Compilation, Parsed, analyze, compile};
pub use state::{AnalyzerConfig, CompilerState, SourceInfo};
