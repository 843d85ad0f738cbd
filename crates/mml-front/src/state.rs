//! The state threaded through the compilation pipeline.

use mml_ast::Module;

use crate::diagnostics::{CompilationError, CompilerWarning, Diagnostics};

/// Knobs for the semantic pipeline.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Demand a well-shaped entry point.
    pub require_entry_point: bool,
    pub entry_point_name: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            require_entry_point: false,
            entry_point_name: "main".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SourceInfo {
    pub path: Option<String>,
    pub text: String,
}

/// Everything the front-end produced for one module: the processed tree,
/// accumulated diagnostics, and per-phase telemetry. Downstream stages
/// read it; nothing here is ever thrown.
#[derive(Debug, Clone)]
pub struct CompilerState {
    pub module: Module,
    pub source_info: SourceInfo,
    pub config: AnalyzerConfig,
    pub errors: Vec<CompilationError>,
    pub warnings: Vec<CompilerWarning>,
    /// Phase name and elapsed nanoseconds, in execution order.
    pub timings: Vec<(String, u128)>,
    pub counters: Vec<(String, u64)>,
    pub entry_point: Option<String>,
    /// No fatal diagnostics: code generation may proceed.
    pub can_emit_code: bool,
    /// Filled by the code generator, not by the front-end.
    pub llvm_ir: Option<String>,
}

impl CompilerState {
    /// Rebuilds a diagnostics collection, e.g. for rendering.
    pub fn diagnostics(&self) -> Diagnostics {
        let mut diag: Diagnostics = self.errors.iter().cloned().collect();
        for w in &self.warnings {
            diag.warning(w.clone());
        }
        diag
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}
