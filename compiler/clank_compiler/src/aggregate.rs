//! Back-linking repairs into the records they address.
//!
//! After generation, every repair's `expected_delta` and `targets` are
//! walked once to build `diagnostic id -> repair ids` and `obligation id ->
//! repair ids` maps (plus holes), and the `repair_refs` fields are filled
//! in before emission.

use rustc_hash::FxHashMap;

use clank_diagnostic::{
    Diagnostic, DiagnosticId, HoleId, Obligation, ObligationId, RepairId, TypeHole,
};
use clank_repair::RepairCandidate;

/// Populate `repair_refs` across diagnostics, obligations, and holes.
pub fn back_link(
    diagnostics: &mut [Diagnostic],
    obligations: &mut [Obligation],
    holes: &mut [TypeHole],
    repairs: &[RepairCandidate],
) {
    let mut by_diagnostic: FxHashMap<DiagnosticId, Vec<RepairId>> = FxHashMap::default();
    let mut by_obligation: FxHashMap<ObligationId, Vec<RepairId>> = FxHashMap::default();
    let mut by_hole: FxHashMap<HoleId, Vec<RepairId>> = FxHashMap::default();

    for repair in repairs {
        for &diag_id in &repair.expected_delta.diagnostics_resolved {
            by_diagnostic.entry(diag_id).or_default().push(repair.id);
        }
        for &obl_id in &repair.expected_delta.obligations_discharged {
            by_obligation.entry(obl_id).or_default().push(repair.id);
        }
        for &hole_id in &repair.expected_delta.holes_filled {
            by_hole.entry(hole_id).or_default().push(repair.id);
        }
    }

    for diagnostic in diagnostics {
        if let Some(refs) = by_diagnostic.get(&diagnostic.id) {
            diagnostic.repair_refs = refs.clone();
        }
    }
    for obligation in obligations {
        if let Some(refs) = by_obligation.get(&obligation.id) {
            obligation.repair_refs = refs.clone();
        }
    }
    for hole in holes {
        if let Some(refs) = by_hole.get(&hole.id) {
            hole.repair_refs = refs.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clank_diagnostic::ErrorCode;
    use clank_ir::Span;
    use clank_repair::{ExpectedDelta, RepairKind, RepairScope, RepairTargets, Safety};
    use pretty_assertions::assert_eq;

    fn repair(id: u32, delta: ExpectedDelta) -> RepairCandidate {
        RepairCandidate {
            id: RepairId::from_raw(id),
            title: "test".to_string(),
            confidence: clank_diagnostic::Confidence::High,
            safety: Safety::BehaviorPreserving,
            kind: RepairKind::LocalFix,
            scope: RepairScope::default(),
            targets: RepairTargets::default(),
            edits: vec![],
            expected_delta: delta,
            rationale: String::new(),
            preconditions: None,
        }
    }

    #[test]
    fn links_repairs_to_diagnostics() {
        let mut diagnostics =
            vec![Diagnostic::new(ErrorCode::E2013, "test", Span::DUMMY)];
        diagnostics[0].id = DiagnosticId::from_raw(5);
        let repairs = vec![
            repair(
                0,
                ExpectedDelta {
                    diagnostics_resolved: vec![DiagnosticId::from_raw(5)],
                    ..ExpectedDelta::default()
                },
            ),
            repair(
                1,
                ExpectedDelta {
                    diagnostics_resolved: vec![DiagnosticId::from_raw(5)],
                    ..ExpectedDelta::default()
                },
            ),
        ];

        back_link(&mut diagnostics, &mut [], &mut [], &repairs);
        assert_eq!(
            diagnostics[0].repair_refs,
            vec![RepairId::from_raw(0), RepairId::from_raw(1)]
        );
    }
}
