//! Repair candidates: proposed edits with confidence, safety, and the
//! expected effect on the diagnostic/obligation set.

use serde::Serialize;

use clank_diagnostic::{Confidence, DiagnosticId, HoleId, ObligationId, RepairId};
use clank_ir::NodeId;

use crate::PatchOp;

/// How a repair affects program behavior when applied.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Safety {
    BehaviorPreserving,
    LikelyPreserving,
    BehaviorChanging,
}

/// The nature of a repair.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairKind {
    LocalFix,
    Refactor,
    BoundaryValidation,
    SemanticsChange,
}

/// Size and reach of a repair.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RepairScope {
    /// Number of AST nodes the edits touch.
    pub node_count: usize,
    /// Whether any edit lands outside the function that triggered it.
    pub crosses_function: bool,
}

/// What the repair addresses.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RepairTargets {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub node_ids: Vec<NodeId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostic_codes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub obligation_ids: Vec<ObligationId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hole_ids: Vec<HoleId>,
}

/// The effect a repair is expected to have on the result set.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExpectedDelta {
    pub diagnostics_resolved: Vec<DiagnosticId>,
    pub obligations_discharged: Vec<ObligationId>,
    pub holes_filled: Vec<HoleId>,
}

/// A proposed, machine-applicable repair.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RepairCandidate {
    pub id: RepairId,
    pub title: String,
    pub confidence: Confidence,
    pub safety: Safety,
    pub kind: RepairKind,
    pub scope: RepairScope,
    pub targets: RepairTargets,
    pub edits: Vec<PatchOp>,
    pub expected_delta: ExpectedDelta,
    pub rationale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preconditions: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn candidate_serializes_snake_case() {
        let candidate = RepairCandidate {
            id: RepairId::from_raw(0),
            title: "Make 'x' mutable".to_string(),
            confidence: Confidence::High,
            safety: Safety::BehaviorPreserving,
            kind: RepairKind::LocalFix,
            scope: RepairScope {
                node_count: 1,
                crosses_function: false,
            },
            targets: RepairTargets {
                node_ids: vec![NodeId::from_raw(4)],
                diagnostic_codes: vec!["E2013".to_string()],
                ..RepairTargets::default()
            },
            edits: vec![],
            expected_delta: ExpectedDelta {
                diagnostics_resolved: vec![DiagnosticId::from_raw(0)],
                ..ExpectedDelta::default()
            },
            rationale: "the assigned binding is declared immutable".to_string(),
            preconditions: None,
        };
        let json = serde_json::to_value(&candidate).unwrap();
        assert_eq!(json["safety"], "behavior_preserving");
        assert_eq!(json["kind"], "local_fix");
        assert_eq!(json["targets"]["diagnostic_codes"][0], "E2013");
        assert_eq!(json["expected_delta"]["diagnostics_resolved"][0], 0);
        assert!(json.get("preconditions").is_none());
    }
}
