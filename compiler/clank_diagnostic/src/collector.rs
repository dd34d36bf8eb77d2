//! Diagnostic collection: id allocation, limits, sorting, merging.
//!
//! The collector owns the monotonic id counter. Diagnostics and obligations
//! draw from the *same* counter so ids are unique across both sets; repair
//! ids have their own counter in the repair engine. Constructing a fresh
//! collector is what resets ids between compilations.

use crate::{Diagnostic, DiagnosticId, HoleId, ObligationId, Severity};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DiagnosticConfig {
    /// Maximum number of errors before further errors are dropped
    /// (0 = unlimited). Warnings are never limited.
    pub error_limit: usize,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig { error_limit: 100 }
    }
}

impl DiagnosticConfig {
    /// A config with no limits (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig { error_limit: 0 }
    }
}

/// Collects diagnostics and allocates record ids.
#[derive(Debug)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    /// Shared counter for diagnostic and obligation ids.
    next_id: u32,
    next_hole_id: u32,
    error_count: usize,
    suppressed: usize,
    config: DiagnosticConfig,
}

impl Default for DiagnosticCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::with_config(DiagnosticConfig::default())
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticCollector {
            diagnostics: Vec::new(),
            next_id: 0,
            next_hole_id: 0,
            error_count: 0,
            suppressed: 0,
            config,
        }
    }

    /// Emit a diagnostic, assigning its id. Errors beyond the limit are
    /// counted but dropped.
    pub fn emit(&mut self, mut diagnostic: Diagnostic) -> DiagnosticId {
        let id = DiagnosticId::from_raw(self.alloc());
        diagnostic.id = id;
        if diagnostic.is_error() {
            self.error_count += 1;
            if self.config.error_limit > 0 && self.error_count > self.config.error_limit {
                self.suppressed += 1;
                return id;
            }
        }
        self.diagnostics.push(diagnostic);
        id
    }

    /// Allocate an obligation id from the shared counter.
    pub fn alloc_obligation_id(&mut self) -> ObligationId {
        ObligationId::from_raw(self.alloc())
    }

    /// Allocate a type-hole id.
    pub fn alloc_hole_id(&mut self) -> HoleId {
        let id = HoleId::from_raw(self.next_hole_id);
        self.next_hole_id += 1;
        id
    }

    fn alloc(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Number of errors dropped by the error limit.
    pub fn suppressed_count(&self) -> usize {
        self.suppressed
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut [Diagnostic] {
        &mut self.diagnostics
    }

    /// Stable-sort diagnostics by `(file, line, column)`.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by_key(|d| d.location.sort_key());
    }

    /// Merge another collector's diagnostics into this one. The other
    /// collector's ids are shifted past this counter so ids stay unique
    /// across the merged set.
    pub fn merge(&mut self, other: DiagnosticCollector) {
        let offset = self.next_id;
        for mut diagnostic in other.diagnostics {
            diagnostic.id = DiagnosticId::from_raw(diagnostic.id.raw() + offset);
            self.diagnostics.push(diagnostic);
        }
        self.next_id += other.next_id;
        self.next_hole_id += other.next_hole_id;
        self.error_count += other.error_count;
        self.suppressed += other.suppressed;
    }

    /// Consume the collector, yielding the diagnostics.
    pub fn into_diagnostics(mut self) -> Vec<Diagnostic> {
        self.sort();
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;
    use clank_ir::Span;
    use pretty_assertions::assert_eq;

    fn diag(code: ErrorCode, line: u32) -> Diagnostic {
        Diagnostic::new(code, "test", Span::line(line, 1, 2))
    }

    #[test]
    fn ids_are_monotonic_and_shared_with_obligations() {
        let mut collector = DiagnosticCollector::new();
        let d1 = collector.emit(diag(ErrorCode::E2001, 1));
        let o1 = collector.alloc_obligation_id();
        let d2 = collector.emit(diag(ErrorCode::E2001, 2));

        assert_eq!(d1.raw(), 0);
        assert_eq!(o1.raw(), 1);
        assert_eq!(d2.raw(), 2);
    }

    #[test]
    fn classification_helpers() {
        let mut collector = DiagnosticCollector::new();
        assert!(!collector.has_errors());
        collector.emit(diag(ErrorCode::W0001, 1));
        assert!(!collector.has_errors());
        collector.emit(diag(ErrorCode::E2001, 2));
        assert!(collector.has_errors());
        assert_eq!(collector.error_count(), 1);
        assert_eq!(collector.warning_count(), 1);
    }

    #[test]
    fn error_limit_drops_but_counts() {
        let mut collector = DiagnosticCollector::with_config(DiagnosticConfig { error_limit: 2 });
        for line in 0..5 {
            collector.emit(diag(ErrorCode::E2001, line));
        }
        assert_eq!(collector.error_count(), 5);
        assert_eq!(collector.diagnostics().len(), 2);
        assert_eq!(collector.suppressed_count(), 3);
    }

    #[test]
    fn sorting_by_file_line_column() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::new(
            ErrorCode::E2001,
            "b",
            Span::line(9, 1, 2).in_file("b.ck"),
        ));
        collector.emit(Diagnostic::new(
            ErrorCode::E2001,
            "a2",
            Span::line(4, 7, 8).in_file("a.ck"),
        ));
        collector.emit(Diagnostic::new(
            ErrorCode::E2001,
            "a1",
            Span::line(4, 2, 3).in_file("a.ck"),
        ));
        let sorted = collector.into_diagnostics();
        let messages: Vec<_> = sorted.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["a1", "a2", "b"]);
    }

    #[test]
    fn merge_preserves_ids_and_counts() {
        let mut a = DiagnosticCollector::new();
        a.emit(diag(ErrorCode::E2001, 1));

        let mut b = DiagnosticCollector::new();
        b.emit(diag(ErrorCode::E2001, 2));
        b.emit(diag(ErrorCode::W0001, 3));

        a.merge(b);
        assert_eq!(a.error_count(), 2);
        assert_eq!(a.diagnostics().len(), 3);

        // Ids remain unique after the merge.
        let mut ids: Vec<u32> = a.diagnostics().iter().map(|d| d.id.raw()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }
}
