//! Proof obligations and type holes.
//!
//! An obligation is a goal the checker could not discharge locally. It
//! freezes a snapshot of the context (bindings and facts) so a later - or
//! external - solver can retry without re-running the checker.

use serde::Serialize;

use clank_ir::{NodeId, Span};

use crate::{Counterexample, Hint, HoleId, ObligationId, RepairId};

/// What kind of goal an obligation represents.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObligationKind {
    Refinement,
    Precondition,
    Postcondition,
    Effect,
    Linearity,
}

/// Solver outcome recorded on an obligation.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverStatus {
    Discharged,
    Refuted,
    Unknown,
}

/// One binding in a frozen context snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContextBinding {
    pub name: String,
    /// Formatted type.
    pub ty: String,
    /// Formatted defining term, when the binding has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}

/// Frozen context snapshot carried by an obligation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ObligationContext {
    pub bindings: Vec<ContextBinding>,
    /// Formatted facts with their sources.
    pub facts: Vec<String>,
}

/// A proof goal the checker could not discharge.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Obligation {
    pub id: ObligationId,
    pub kind: ObligationKind,
    /// Formatted goal predicate.
    pub goal: String,
    pub location: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_node_id: Option<NodeId>,
    pub context: ObligationContext,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<Hint>,
    pub solver_attempted: bool,
    pub solver_result: SolverStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unknown_reason: Option<String>,
    /// Definite for refuted results; labelled a candidate for unknowns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counterexample: Option<Counterexample>,
    /// Back-links to repair candidates; populated by the aggregator.
    pub repair_refs: Vec<RepairId>,
}

/// A typed hole awaiting a fill.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TypeHole {
    pub id: HoleId,
    pub location: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    /// Formatted expected type at the hole.
    pub expected_type: String,
    pub bindings: Vec<ContextBinding>,
    pub allowed_effects: Vec<String>,
    /// In-scope names whose type fits the hole.
    pub fill_candidates: Vec<String>,
    pub repair_refs: Vec<RepairId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn obligation_serializes_with_snapshot() {
        let obligation = Obligation {
            id: ObligationId::from_raw(3),
            kind: ObligationKind::Refinement,
            goal: "m > 0".to_string(),
            location: Span::line(4, 9, 10),
            primary_node_id: Some(NodeId::from_raw(17)),
            context: ObligationContext {
                bindings: vec![ContextBinding {
                    name: "m".to_string(),
                    ty: "Int".to_string(),
                    definition: Some("n + 1".to_string()),
                }],
                facts: vec!["n > 0 (from: parameter n)".to_string()],
            },
            hints: vec![],
            solver_attempted: true,
            solver_result: SolverStatus::Unknown,
            unknown_reason: Some("could not prove `m > 0` from 1 known fact(s)".to_string()),
            counterexample: None,
            repair_refs: vec![],
        };
        let json = serde_json::to_value(&obligation).unwrap();
        assert_eq!(json["kind"], "refinement");
        assert_eq!(json["solver_result"], "unknown");
        assert_eq!(json["context"]["bindings"][0]["definition"], "n + 1");
        assert_eq!(json["context"]["facts"][0], "n > 0 (from: parameter n)");
    }

    #[test]
    fn hole_serializes() {
        let hole = TypeHole {
            id: HoleId::from_raw(0),
            location: Span::DUMMY,
            node_id: None,
            expected_type: "Int".to_string(),
            bindings: vec![],
            allowed_effects: vec!["IO".to_string()],
            fill_candidates: vec!["count".to_string()],
            repair_refs: vec![],
        };
        let json = serde_json::to_value(&hole).unwrap();
        assert_eq!(json["expected_type"], "Int");
        assert_eq!(json["fill_candidates"][0], "count");
    }
}
