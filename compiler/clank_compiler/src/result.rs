//! The compilation result surface.
//!
//! `CompileResult` is the machine-consumable artifact: typed diagnostics,
//! obligations, holes, and repairs, plus status and stats. Arbitrary
//! precision integers inside the canonical AST serialize as strings.

use serde::Serialize;

use clank_diagnostic::{Diagnostic, Obligation, TypeHole};
use clank_repair::RepairCandidate;

/// Overall compilation status.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompileStatus {
    /// No errors and every obligation discharged.
    Success,
    /// At least one error diagnostic.
    Error,
    /// No errors, but undischarged obligations remain.
    Incomplete,
}

/// Output of the (external) code emitter, threaded through when present.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EmitterOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub js: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "jsMap")]
    pub js_map: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dts: Option<String>,
}

/// Compilation statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileStats {
    pub source_files: usize,
    pub source_lines: usize,
    pub source_tokens: usize,
    pub output_lines: usize,
    pub output_bytes: usize,
    pub obligations_total: usize,
    pub obligations_discharged: usize,
    pub compile_time_ms: u64,
}

/// The complete result of one compilation.
#[derive(Debug, Serialize)]
pub struct CompileResult {
    pub status: CompileStatus,
    #[serde(rename = "compilerVersion")]
    pub compiler_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_ast: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<EmitterOutput>,
    pub diagnostics: Vec<Diagnostic>,
    pub obligations: Vec<Obligation>,
    pub holes: Vec<TypeHole>,
    pub repairs: Vec<RepairCandidate>,
    pub stats: CompileStats,
}

impl CompileResult {
    /// One-line human summary of the result.
    pub fn summary(&self) -> String {
        let errors = self.diagnostics.iter().filter(|d| d.is_error()).count();
        let warnings = self
            .diagnostics
            .iter()
            .filter(|d| d.severity == clank_diagnostic::Severity::Warning)
            .count();
        format!(
            "{status}: {errors} error(s), {warnings} warning(s), {obligations} open obligation(s), {repairs} repair(s)",
            status = match self.status {
                CompileStatus::Success => "success",
                CompileStatus::Error => "error",
                CompileStatus::Incomplete => "incomplete",
            },
            obligations = self.obligations.len(),
            repairs = self.repairs.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn stats_serialize_camel_case() {
        let stats = CompileStats {
            source_files: 1,
            source_lines: 10,
            obligations_total: 2,
            obligations_discharged: 2,
            compile_time_ms: 3,
            ..CompileStats::default()
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["sourceFiles"], 1);
        assert_eq!(json["obligationsDischarged"], 2);
        assert_eq!(json["compileTimeMs"], 3);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(CompileStatus::Incomplete).unwrap(),
            "incomplete"
        );
    }
}
