//! Refinement enforcement and the hint generator.
//!
//! When an expression is checked against a refined expected type, the
//! predicate is instantiated with the argument term and handed to the
//! solver. Discharged goals vanish (counted for stats); refuted goals are
//! hard errors with a counterexample; unknowns become proof obligations
//! carrying a context snapshot and repair-ready hints.

use clank_diagnostic::{
    Confidence, ContextBinding, Diagnostic, ErrorCode, Hint, HintStrategy, Obligation,
    ObligationContext, ObligationKind, SolverStatus, Structured,
};
use clank_ir::Expr;
use clank_solver::{solve_with_config, SolveResult};
use clank_types::{BindingSource, Predicate, Type};

use crate::{expr_to_term, substitute_pred_var, TypeChecker};

impl TypeChecker {
    /// Unify `actual` against `expected` and, when the expectation is
    /// refined, enforce its predicate.
    pub(crate) fn check_expected(
        &mut self,
        expr: &Expr,
        actual: Type,
        expected: &Type,
        kind: ObligationKind,
    ) -> Type {
        let unified = self.unify_at(expected, &actual, &expr.span, expr.id);
        if let Type::Refined { var, pred, .. } = self.apply(expected) {
            self.enforce_refinement(expr, &var, &pred, kind);
        }
        unified
    }

    fn enforce_refinement(
        &mut self,
        expr: &Expr,
        var: &str,
        pred: &Predicate,
        kind: ObligationKind,
    ) {
        // Instantiate the predicate with the argument when it is a term;
        // otherwise the goal keeps the bound variable and stays abstract.
        let (goal, known_term) = match expr_to_term(expr) {
            Some(term) => (substitute_pred_var(pred, var, &term), true),
            None => (pred.clone(), false),
        };

        tracing::trace!(goal = %goal, "enforcing refinement");
        match solve_with_config(&goal, &self.rctx, &self.solver_config) {
            SolveResult::Discharged => {
                self.obligations_discharged += 1;
            }
            SolveResult::Refuted { counterexample } => {
                self.emit(
                    Diagnostic::new(
                        ErrorCode::E3001,
                        format!("refinement `{goal}` does not hold"),
                        expr.span.clone(),
                    )
                    .with_node(expr.id)
                    .with_structured(
                        Structured::new("refinement_refuted")
                            .with_predicate(goal.to_string())
                            .with_counterexample(counterexample),
                    ),
                );
            }
            SolveResult::Unknown { reason, candidate } => {
                let reason = if known_term {
                    reason
                } else {
                    "argument is not a known term".to_string()
                };
                let obligation = self.make_obligation(expr, &goal, kind, reason, candidate);
                self.obligations.push(obligation);
            }
        }
    }

    fn make_obligation(
        &mut self,
        expr: &Expr,
        goal: &Predicate,
        kind: ObligationKind,
        reason: String,
        candidate: Option<clank_solver::Counterexample>,
    ) -> Obligation {
        let hints = self.generate_hints(goal);
        Obligation {
            id: self.collector.alloc_obligation_id(),
            kind,
            goal: goal.to_string(),
            location: expr.span.clone(),
            primary_node_id: Some(expr.id),
            context: self.context_snapshot(goal),
            hints,
            solver_attempted: true,
            solver_result: SolverStatus::Unknown,
            unknown_reason: Some(reason),
            counterexample: candidate,
            repair_refs: Vec::new(),
        }
    }

    /// Freeze the context visible at an obligation site: the bindings the
    /// goal references and every fact in scope.
    fn context_snapshot(&self, goal: &Predicate) -> ObligationContext {
        let bindings = goal
            .referenced_vars()
            .into_iter()
            .filter_map(|name| {
                let binding = self.ctx.peek(&name)?;
                Some(ContextBinding {
                    ty: self.apply(&binding.scheme.ty).to_string(),
                    definition: self.rctx.get_definition(&name).map(ToString::to_string),
                    name,
                })
            })
            .collect();
        let facts = self
            .rctx
            .get_all_facts()
            .into_iter()
            .map(ToString::to_string)
            .collect();
        ObligationContext { bindings, facts }
    }

    /// The four-hint shape every obligation carries: a guard, a refinement
    /// per referenced parameter, an assert, and an informational summary.
    pub(crate) fn generate_hints(&mut self, goal: &Predicate) -> Vec<Hint> {
        let mut hints = Vec::new();

        hints.push(
            Hint::new(
                HintStrategy::Guard,
                format!("guard the operation so `{goal}` is known to hold"),
                Confidence::High,
            )
            .with_template(format!("if {goal} {{ ... }}")),
        );

        for name in goal.referenced_vars() {
            let Some(binding) = self.ctx.peek(&name) else {
                continue;
            };
            if binding.source != BindingSource::Parameter {
                continue;
            }
            let ty = self.apply(&binding.scheme.ty);
            let base = ty.get_base().clone();
            hints.push(
                Hint::new(
                    HintStrategy::RefineParam,
                    format!("strengthen the type of parameter `{name}`"),
                    Confidence::Medium,
                )
                .with_template(format!("{name}: {base}{{{goal}}}")),
            );
        }

        hints.push(
            Hint::new(
                HintStrategy::Assert,
                format!("assert `{goal}` before this point"),
                Confidence::Medium,
            )
            .with_template(format!("assert {goal}")),
        );

        let mut info = String::new();
        for name in goal.referenced_vars() {
            if let Some(binding) = self.ctx.peek(&name) {
                if !info.is_empty() {
                    info.push_str("; ");
                }
                info.push_str(&format!("{name}: {}", self.apply(&binding.scheme.ty)));
                if let Some(def) = self.rctx.get_definition(&name) {
                    info.push_str(&format!(" = {def}"));
                }
            }
        }
        let facts: Vec<String> = self
            .rctx
            .get_all_facts()
            .into_iter()
            .map(ToString::to_string)
            .collect();
        if !facts.is_empty() {
            if !info.is_empty() {
                info.push_str("; ");
            }
            info.push_str(&format!("facts: {}", facts.join(", ")));
        }
        if info.is_empty() {
            info = "no bindings or facts are known at this point".to_string();
        }
        hints.push(Hint::new(HintStrategy::Info, info, Confidence::Low));

        hints
    }
}
