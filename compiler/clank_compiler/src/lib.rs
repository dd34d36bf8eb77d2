//! Portable Clank compiler driver.
//!
//! An IO-free pipeline between the core crates and consumers (CLI, WASM,
//! test harnesses): run the checker over a parsed program, generate
//! repairs, back-link cross-references, and assemble a [`CompileResult`].
//!
//! # Architecture
//!
//! ```text
//! clank_ir, clank_types, clank_solver, clank_diagnostic,
//! clank_typeck, clank_repair
//!                  |
//!           clank_compiler   <- this crate
//!                  |
//!           CLI / embedders
//! ```
//!
//! Every compilation constructs a fresh [`Compiler`]; all monotonic
//! counters (type variables, diagnostic/obligation ids, repair ids) live on
//! per-run instances, so independent compilations can run in parallel.

mod aggregate;
mod result;

pub use aggregate::back_link;
pub use result::{CompileResult, CompileStats, CompileStatus, EmitterOutput};

use std::time::Instant;

use clank_ir::Program;
use clank_repair::generate_repairs;
use clank_typeck::{check_program_with_config, CheckConfig};

/// Version string stamped into every result.
pub const COMPILER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Caller-supplied source statistics (the parser counts these).
#[derive(Clone, Debug, Default)]
pub struct SourceInfo {
    pub files: usize,
    pub lines: usize,
    pub tokens: usize,
}

/// Compilation options.
#[derive(Clone, Debug, Default)]
pub struct CompilerConfig {
    pub check: CheckConfig,
    /// Include the serialized program as `canonical_ast` in the result.
    pub emit_canonical_ast: bool,
    pub source: SourceInfo,
}

/// A compiler instance. Cheap to construct; one per compilation.
#[derive(Debug, Default)]
pub struct Compiler {
    config: CompilerConfig,
}

/// Compile with default options.
pub fn compile(program: &Program) -> CompileResult {
    Compiler::new(CompilerConfig::default()).compile(program)
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Compiler { config }
    }

    /// Run the semantic pipeline over a parsed program.
    pub fn compile(&self, program: &Program) -> CompileResult {
        let started = Instant::now();
        tracing::debug!(decls = program.decls.len(), "compilation started");

        let check = check_program_with_config(program, self.config.check.clone());
        let mut diagnostics = check.diagnostics;
        let mut obligations = check.obligations;
        let mut holes = check.holes;

        let repairs = generate_repairs(program, &diagnostics, &obligations, &holes);
        back_link(&mut diagnostics, &mut obligations, &mut holes, &repairs);

        let status = if diagnostics.iter().any(clank_diagnostic::Diagnostic::is_error) {
            CompileStatus::Error
        } else if obligations.is_empty() {
            CompileStatus::Success
        } else {
            CompileStatus::Incomplete
        };

        let obligations_total = obligations.len() + check.obligations_discharged;
        let stats = CompileStats {
            source_files: self.config.source.files,
            source_lines: self.config.source.lines,
            source_tokens: self.config.source.tokens,
            output_lines: 0,
            output_bytes: 0,
            obligations_total,
            obligations_discharged: check.obligations_discharged,
            compile_time_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        let canonical_ast = self
            .config
            .emit_canonical_ast
            .then(|| serde_json::to_value(program).unwrap_or(serde_json::Value::Null));

        tracing::debug!(
            status = ?status,
            diagnostics = diagnostics.len(),
            obligations = obligations.len(),
            repairs = repairs.len(),
            "compilation finished"
        );

        CompileResult {
            status,
            compiler_version: COMPILER_VERSION.to_string(),
            canonical_ast,
            output: None,
            diagnostics,
            obligations,
            holes,
            repairs,
            stats,
        }
    }
}
