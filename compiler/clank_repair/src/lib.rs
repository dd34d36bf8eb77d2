//! Repair generation for the Clank compiler.
//!
//! Consumes the AST plus the checker's diagnostics, obligations, and holes,
//! and produces a ranked list of [`RepairCandidate`]s. Generation order is
//! deterministic: diagnostics in order, then obligations, then holes - so
//! repair ids are stable for a fixed input.

mod candidate;
mod diagnostics;
mod index;
mod obligations;
mod patch;

pub use candidate::{ExpectedDelta, RepairCandidate, RepairKind, RepairScope, RepairTargets, Safety};
pub use index::{AstIndex, NodeRef};
pub use patch::PatchOp;

use clank_diagnostic::{Diagnostic, Obligation, RepairId, TypeHole};
use clank_ir::Program;

/// Generate repairs for one compilation's results.
pub fn generate_repairs(
    program: &Program,
    diagnostics: &[Diagnostic],
    obligations: &[Obligation],
    holes: &[TypeHole],
) -> Vec<RepairCandidate> {
    RepairEngine::new(program).generate(diagnostics, obligations, holes)
}

/// The repair generator. Owns the repair-id counter; a fresh engine per
/// compilation resets it.
pub struct RepairEngine<'a> {
    pub(crate) index: AstIndex<'a>,
    next_id: u32,
    pub(crate) repairs: Vec<RepairCandidate>,
}

impl<'a> RepairEngine<'a> {
    pub fn new(program: &'a Program) -> Self {
        RepairEngine {
            index: AstIndex::build(program),
            next_id: 0,
            repairs: Vec::new(),
        }
    }

    /// Run all handlers and return the candidates in generation order.
    pub fn generate(
        mut self,
        diagnostics: &[Diagnostic],
        obligations: &[Obligation],
        holes: &[TypeHole],
    ) -> Vec<RepairCandidate> {
        for diagnostic in diagnostics {
            self.repair_diagnostic(diagnostic);
        }
        for obligation in obligations {
            self.repair_obligation(obligation);
        }
        for hole in holes {
            self.repair_hole(hole);
        }
        self.repairs
    }

    pub(crate) fn alloc_id(&mut self) -> RepairId {
        let id = RepairId::from_raw(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn push(&mut self, candidate: RepairCandidate) {
        self.repairs.push(candidate);
    }
}

/// Serialize an AST fragment into a patch payload.
pub(crate) fn node_value<T: serde::Serialize>(node: &T) -> serde_json::Value {
    serde_json::to_value(node).unwrap_or(serde_json::Value::Null)
}
