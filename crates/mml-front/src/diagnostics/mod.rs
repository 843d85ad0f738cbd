//! Diagnostics: accumulated errors and warnings plus a renderer.
//!
//! Errors are values, accumulated in order and never thrown; a phase that
//! cannot handle a node wraps the node and keeps going.

mod error;
mod printer;

#[cfg(test)]
mod tests;

use mml_ast::SrcSpan;
use serde::Serialize;

pub use error::{
    CompilationError, CompilerWarning, OwnershipError, ParserError, SemanticError, TypeError,
};
pub use printer::DiagnosticsPrinter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// The flat shape language tooling consumes: a range, a severity, and a
/// stable message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticRecord {
    pub range: SrcSpan,
    pub severity: Severity,
    pub message: String,
}

/// Ordered collection of diagnostics from parsing and analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    errors: Vec<CompilationError>,
    warnings: Vec<CompilerWarning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, err: impl Into<CompilationError>) {
        self.errors.push(err.into());
    }

    pub fn warning(&mut self, warn: CompilerWarning) {
        self.warnings.push(warn);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    pub fn errors(&self) -> &[CompilationError] {
        &self.errors
    }

    pub fn warnings(&self) -> &[CompilerWarning] {
        &self.warnings
    }

    pub fn into_parts(self) -> (Vec<CompilationError>, Vec<CompilerWarning>) {
        (self.errors, self.warnings)
    }

    pub fn printer(&self) -> DiagnosticsPrinter<'_, '_> {
        DiagnosticsPrinter::new(self)
    }

    /// Flattens to the tooling-facing record shape, errors first.
    pub fn records(&self) -> Vec<DiagnosticRecord> {
        let mut out: Vec<DiagnosticRecord> = self
            .errors
            .iter()
            .map(|e| DiagnosticRecord {
                range: e.span(),
                severity: Severity::Error,
                message: e.to_string(),
            })
            .collect();
        out.extend(self.warnings.iter().map(|w| DiagnosticRecord {
            range: w.span(),
            severity: Severity::Warning,
            message: w.to_string(),
        }));
        out
    }
}

impl FromIterator<CompilationError> for Diagnostics {
    fn from_iter<T: IntoIterator<Item = CompilationError>>(iter: T) -> Self {
        Self {
            errors: iter.into_iter().collect(),
            warnings: Vec::new(),
        }
    }
}
