//! The staged front-end pipeline.
//!
//! Two pure entry points make up the boundary: [`parse`] and [`analyze`],
//! with [`compile`] chaining them. Both are total; failures accumulate as
//! diagnostics, never as panics or early returns. Each semantic phase is
//! timed into the resulting state.

use std::time::Instant;

use mml_ast::Module;

pub use crate::parser::parse;

use crate::analyze::{
    duplicates, entry, id_assign, indexer, memory, ownership, ref_resolve, rewrite, simplify,
    surface, tailrec, type_check, type_resolve,
};
use crate::diagnostics::Diagnostics;
use crate::state::{AnalyzerConfig, CompilerState, SourceInfo};
use crate::stdlib;

/// Runs the semantic pipeline over a parsed module.
pub fn analyze(module: Module, config: AnalyzerConfig) -> CompilerState {
    analyze_with_source(module, config, SourceInfo::default(), Diagnostics::new())
}

/// Parse then analyze one source text.
pub fn compile(source: &str, module_name: &str, config: AnalyzerConfig) -> CompilerState {
    let (module, diagnostics) = parse(source, module_name);
    let source_info = SourceInfo {
        path: None,
        text: source.to_owned(),
    };
    analyze_with_source(module, config, source_info, diagnostics)
}

pub(crate) fn analyze_with_source(
    mut module: Module,
    config: AnalyzerConfig,
    source_info: SourceInfo,
    mut diag: Diagnostics,
) -> CompilerState {
    let mut timings: Vec<(String, u128)> = Vec::new();
    let mut timed = |name: &str, start: Instant| {
        timings.push((name.to_owned(), start.elapsed().as_nanos()));
    };

    let t = Instant::now();
    stdlib::inject(&mut module);
    timed("stdlib", t);

    let t = Instant::now();
    surface::run(&module, &mut diag);
    timed("surface", t);

    let t = Instant::now();
    module = duplicates::run(module, &mut diag);
    timed("duplicates", t);

    let t = Instant::now();
    module = id_assign::run(module, &mut diag);
    timed("id_assign", t);

    let t = Instant::now();
    module = type_resolve::run(module, &mut diag);
    timed("type_resolve", t);

    let t = Instant::now();
    module = ref_resolve::run(module, &mut diag);
    timed("ref_resolve", t);

    let t = Instant::now();
    module = rewrite::run(module, &mut diag);
    timed("rewrite", t);

    let t = Instant::now();
    module = simplify::run(module, &mut diag);
    timed("simplify", t);

    let t = Instant::now();
    module = type_check::run(module, &mut diag);
    timed("type_check", t);

    let t = Instant::now();
    module = memory::run(module, &mut diag);
    timed("memory", t);

    let t = Instant::now();
    module = indexer::run(module, &mut diag);
    timed("indexer", t);

    let t = Instant::now();
    module = tailrec::run(module, &mut diag);
    timed("tailrec", t);

    let t = Instant::now();
    module = ownership::run(module, &mut diag);
    timed("ownership", t);

    let t = Instant::now();
    let entry_point = entry::run(&module, &config, &mut diag);
    timed("entry", t);

    let counters = vec![
        ("members".to_owned(), module.members.len() as u64),
        ("errors".to_owned(), diag.error_count() as u64),
        ("warnings".to_owned(), diag.warning_count() as u64),
    ];

    let (errors, warnings) = diag.into_parts();
    let can_emit_code = errors.is_empty();
    CompilerState {
        module,
        source_info,
        config,
        errors,
        warnings,
        timings,
        counters,
        entry_point,
        can_emit_code,
        llvm_ir: None,
    }
}

/// Builder-style facade over the two entry points.
pub struct Compilation {
    source: String,
    name: String,
    config: AnalyzerConfig,
}

impl Compilation {
    pub fn source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            name: "Main".to_owned(),
            config: AnalyzerConfig::default(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn config(mut self, config: AnalyzerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn parse(self) -> Parsed {
        let (module, diagnostics) = parse(&self.source, &self.name);
        Parsed {
            module,
            diagnostics,
            source: self.source,
            config: self.config,
        }
    }
}

/// A parsed module awaiting analysis.
pub struct Parsed {
    pub module: Module,
    pub diagnostics: Diagnostics,
    source: String,
    config: AnalyzerConfig,
}

impl Parsed {
    pub fn analyze(self) -> CompilerState {
        let source_info = SourceInfo {
            path: None,
            text: self.source,
        };
        analyze_with_source(self.module, self.config, source_info, self.diagnostics)
    }
}
