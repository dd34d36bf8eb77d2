//! The fact-based refinement prover.
//!
//! `solve` runs, in order: definition substitution, simplification,
//! constant resolution, direct proof from facts, arithmetic-bound
//! reasoning, compound handling, refutation, and finally candidate
//! counterexample generation for unknowns.
//!
//! The prover is intentionally incomplete: it is a linear-arithmetic
//! fact chaser, not an SMT solver. `unknown` is an expected, common
//! outcome and is surfaced with a reason.

use std::collections::BTreeMap;

use clank_types::refine::Predicate;

use crate::bounds::{atomic_bound, AtomicBound};
use crate::simplify::{simplify, substitute_definitions};
use crate::{Fact, RefinementContext};

/// A counterexample: variable names mapped to string-formatted values,
/// plus `_`-prefixed metadata keys.
pub type Counterexample = BTreeMap<String, String>;

/// Solver resource limits.
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Cap on fact-chain steps before giving up with `unknown`.
    pub max_steps: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig { max_steps: 1000 }
    }
}

/// Outcome of solving one predicate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolveResult {
    /// The predicate holds under the known facts.
    Discharged,
    /// The predicate is false under the known facts; the counterexample is
    /// definite.
    Refuted { counterexample: Counterexample },
    /// Neither provable nor refutable. A candidate counterexample, when
    /// present, is only a possibility.
    Unknown {
        reason: String,
        candidate: Option<Counterexample>,
    },
}

impl SolveResult {
    pub fn is_discharged(&self) -> bool {
        matches!(self, SolveResult::Discharged)
    }
}

/// Solve with default limits.
pub fn solve(goal: &Predicate, ctx: &RefinementContext) -> SolveResult {
    solve_with_config(goal, ctx, &SolverConfig::default())
}

/// Solve a predicate against the facts in scope.
pub fn solve_with_config(
    goal: &Predicate,
    ctx: &RefinementContext,
    config: &SolverConfig,
) -> SolveResult {
    tracing::trace!(goal = %goal, "solving refinement goal");

    // Steps 1-2: substitute definitions, then simplify.
    let substituted = substitute_definitions(goal, ctx);
    let simplified = simplify(&substituted);

    // Step 3: constant resolution.
    match &simplified {
        Predicate::True => return SolveResult::Discharged,
        Predicate::False => {
            return SolveResult::Refuted {
                counterexample: static_false_counterexample(goal, ctx),
            }
        }
        _ => {}
    }

    // Preprocess facts through the same pipeline so shapes line up.
    let facts: Vec<Fact> = ctx
        .get_all_facts()
        .into_iter()
        .map(|fact| Fact {
            pred: simplify(&substitute_definitions(&fact.pred, ctx)),
            source: fact.source.clone(),
        })
        .collect();

    let mut prover = Prover {
        facts: &facts,
        steps_left: config.max_steps,
        exhausted: false,
    };

    // Steps 4-6: proof (direct, arithmetic, compound).
    if prover.prove(&simplified) {
        return SolveResult::Discharged;
    }

    // Step 7: refutation.
    if let Some(counterexample) = prover.refute(&simplified) {
        return SolveResult::Refuted { counterexample };
    }

    if prover.exhausted {
        return SolveResult::Unknown {
            reason: "budget exhausted".to_string(),
            candidate: None,
        };
    }

    // Step 8: unknown, with a candidate counterexample when one can be
    // constructed within the known bounds.
    let candidate = candidate_counterexample(&simplified, &facts);
    SolveResult::Unknown {
        reason: format!(
            "could not prove `{simplified}` from {} known fact(s)",
            facts.len()
        ),
        candidate,
    }
}

struct Prover<'a> {
    facts: &'a [Fact],
    steps_left: usize,
    exhausted: bool,
}

impl Prover<'_> {
    fn tick(&mut self) -> bool {
        if self.steps_left == 0 {
            self.exhausted = true;
            return false;
        }
        self.steps_left -= 1;
        true
    }

    /// Try to prove `goal` from the facts.
    fn prove(&mut self, goal: &Predicate) -> bool {
        match goal {
            Predicate::True => true,
            Predicate::False => false,
            // Compound handling: `&&` needs both sides, `||` needs one,
            // `!p` holds when `p` is refutable.
            Predicate::And(lhs, rhs) => self.prove(lhs) && self.prove(rhs),
            Predicate::Or(lhs, rhs) => self.prove(lhs) || self.prove(rhs),
            Predicate::Not(inner) => {
                simplify(inner) == Predicate::False || self.refute(inner).is_some()
            }
            _ => self.prove_atomic(goal),
        }
    }

    fn prove_atomic(&mut self, goal: &Predicate) -> bool {
        let goal_bound = atomic_bound(goal);
        for fact in self.facts {
            if !self.tick() {
                return false;
            }
            if fact_implies(&fact.pred, goal) {
                return true;
            }
            // Arithmetic reasoning: both sides normalize to bounds on the
            // same variable; apply the transitive rules.
            if let (Some(fb), Some(gb)) = (atomic_bound(&fact.pred), goal_bound.as_ref()) {
                if fb.implies(gb) {
                    return true;
                }
            }
        }
        false
    }

    /// Try to refute `goal` from the facts, producing a definite
    /// counterexample.
    fn refute(&mut self, goal: &Predicate) -> Option<Counterexample> {
        // A conjunction is refuted by refuting either conjunct.
        if let Predicate::And(lhs, rhs) = goal {
            return self.refute(lhs).or_else(|| self.refute(rhs));
        }
        // `!p` is refuted by proving `p`.
        if let Predicate::Not(inner) = goal {
            if self.prove(inner) {
                return Some(negation_counterexample(inner, self.facts));
            }
        }

        let goal_bound = atomic_bound(goal);
        for fact in self.facts {
            if !self.tick() {
                return None;
            }
            if predicate_contradicts(&fact.pred, goal) {
                return Some(contradiction_counterexample(fact, goal));
            }
            if let (Some(fb), Some(gb)) = (atomic_bound(&fact.pred), goal_bound.as_ref()) {
                if fb.contradicts(gb) {
                    let mut cex = Counterexample::new();
                    cex.insert(fb.var.clone(), fb.boundary_value().to_string());
                    cex.insert(
                        "_explanation".to_string(),
                        format!("contradicts '{}'", fact.pred),
                    );
                    cex.insert("_contradicts".to_string(), fact.to_string());
                    return Some(cex);
                }
            }
        }
        None
    }
}

/// Structural and operator-table implication between two predicates.
fn fact_implies(fact: &Predicate, goal: &Predicate) -> bool {
    if fact == goal {
        return true;
    }
    // Same operands, implied operator: `x == y` implies `x <= y`, etc.
    if let (Predicate::Compare(fop, fl, fr), Predicate::Compare(gop, gl, gr)) = (fact, goal) {
        if fl == gl && fr == gr && fop.implies(*gop) {
            return true;
        }
        // Flipped orientation: `a op b` vs `b op' a`.
        if fl == gr && fr == gl && fop.flipped().implies(*gop) {
            return true;
        }
    }
    // A conjunction fact implies each conjunct.
    if let Predicate::And(lhs, rhs) = fact {
        return fact_implies(lhs, goal) || fact_implies(rhs, goal);
    }
    false
}

/// Direct structural/operator-level contradiction between two predicates.
fn predicate_contradicts(fact: &Predicate, goal: &Predicate) -> bool {
    // `p` vs `!p`, in both orientations.
    if let Predicate::Not(inner) = goal {
        if inner.as_ref() == fact {
            return true;
        }
    }
    if let Predicate::Not(inner) = fact {
        if inner.as_ref() == goal {
            return true;
        }
    }
    if let (Predicate::Compare(fop, fl, fr), Predicate::Compare(gop, gl, gr)) = (fact, goal) {
        if fl == gl && fr == gr && fop.contradicts(*gop) {
            return true;
        }
        if fl == gr && fr == gl && fop.flipped().contradicts(*gop) {
            return true;
        }
    }
    // A conjunction fact contradicts if either conjunct does.
    if let Predicate::And(lhs, rhs) = fact {
        return predicate_contradicts(lhs, goal) || predicate_contradicts(rhs, goal);
    }
    false
}

/// Counterexample for a predicate that simplified to `false` outright.
fn static_false_counterexample(goal: &Predicate, ctx: &RefinementContext) -> Counterexample {
    let mut cex = Counterexample::new();
    cex.insert(
        "_explanation".to_string(),
        "predicate is statically false".to_string(),
    );
    cex.insert("_violated".to_string(), goal.to_string());
    for var in goal.referenced_vars() {
        let value = ctx
            .get_value(&var)
            .map_or_else(|| "?".to_string(), |term| term.to_string());
        cex.insert(var, value);
    }
    cex
}

/// Counterexample for a goal contradicted by a fact at the predicate level.
fn contradiction_counterexample(fact: &Fact, goal: &Predicate) -> Counterexample {
    let mut cex = Counterexample::new();
    cex.insert(
        "_explanation".to_string(),
        format!("contradicts '{}'", fact.pred),
    );
    cex.insert("_contradicts".to_string(), fact.to_string());
    if let Some(fb) = atomic_bound(&fact.pred) {
        cex.insert(fb.var.clone(), fb.boundary_value().to_string());
    } else {
        for var in goal.referenced_vars() {
            cex.insert(var, "?".to_string());
        }
    }
    cex
}

/// Counterexample for `!p` refuted because `p` is provable.
fn negation_counterexample(inner: &Predicate, facts: &[Fact]) -> Counterexample {
    let mut cex = Counterexample::new();
    cex.insert(
        "_explanation".to_string(),
        format!("`{inner}` holds, so its negation cannot"),
    );
    if let Some(source) = facts
        .iter()
        .find(|fact| fact_implies(&fact.pred, inner))
        .map(Fact::to_string)
    {
        cex.insert("_source".to_string(), source);
    }
    cex
}

/// Candidate counterexample for an unknown result.
///
/// Picks a value at the boundary of the facts' allowed region that violates
/// the goal's requirement. The value must respect every known bound; when
/// the goal yields no atomic requirement, no candidate is produced.
fn candidate_counterexample(goal: &Predicate, facts: &[Fact]) -> Option<Counterexample> {
    let goal_bound = atomic_bound(goal)?;
    let fact_bounds: Vec<AtomicBound> = facts
        .iter()
        .filter_map(|fact| atomic_bound(&fact.pred))
        .filter(|fb| fb.var == goal_bound.var)
        .collect();

    let mut candidates = vec![goal_bound.violating_value()];
    for fb in &fact_bounds {
        candidates.push(fb.boundary_value());
    }

    let admissible = |value: &num_bigint::BigInt| fact_bounds.iter().all(|fb| fb.admits(value));
    let value = candidates
        .into_iter()
        .find(|value| !goal_bound.admits(value) && admissible(value))?;

    let mut cex = Counterexample::new();
    cex.insert(goal_bound.var.clone(), value.to_string());
    cex.insert("_note".to_string(), "possible counterexample".to_string());
    cex.insert(
        "_explanation".to_string(),
        format!("value satisfies the known facts but violates `{goal}`"),
    );
    Some(cex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clank_types::refine::{ArithOp, CompareOp, Term};
    use pretty_assertions::assert_eq;

    fn gt(lhs: Term, rhs: Term) -> Predicate {
        Predicate::compare(CompareOp::Gt, lhs, rhs)
    }

    fn le(lhs: Term, rhs: Term) -> Predicate {
        Predicate::compare(CompareOp::Le, lhs, rhs)
    }

    // ── Constant resolution ───────────────────────────────────────

    #[test]
    fn constant_true_discharges() {
        let ctx = RefinementContext::new();
        assert_eq!(solve(&Predicate::True, &ctx), SolveResult::Discharged);
        assert_eq!(
            solve(&gt(Term::int(5), Term::int(3)), &ctx),
            SolveResult::Discharged
        );
    }

    #[test]
    fn constant_false_refutes_with_static_counterexample() {
        let ctx = RefinementContext::new();
        let result = solve(&gt(Term::int(1), Term::int(3)), &ctx);
        match result {
            SolveResult::Refuted { counterexample } => {
                assert_eq!(
                    counterexample.get("_explanation").map(String::as_str),
                    Some("predicate is statically false")
                );
            }
            other => panic!("expected refuted, got {other:?}"),
        }
    }

    // ── Direct proof ──────────────────────────────────────────────

    #[test]
    fn fact_proves_goal_structurally() {
        let mut ctx = RefinementContext::new();
        ctx.add_fact(gt(Term::var("x"), Term::int(0)), "parameter x");
        assert_eq!(
            solve(&gt(Term::var("x"), Term::int(0)), &ctx),
            SolveResult::Discharged
        );
    }

    #[test]
    fn operator_implication() {
        // x == 5 proves x <= 5 and x >= 5.
        let mut ctx = RefinementContext::new();
        ctx.add_fact(
            Predicate::compare(CompareOp::Eq, Term::var("x"), Term::int(5)),
            "test",
        );
        assert_eq!(
            solve(&le(Term::var("x"), Term::int(5)), &ctx),
            SolveResult::Discharged
        );
        assert_eq!(
            solve(
                &Predicate::compare(CompareOp::Ge, Term::var("x"), Term::int(5)),
                &ctx
            ),
            SolveResult::Discharged
        );
    }

    #[test]
    fn transitive_bounds() {
        // x > 5 proves x > 3 and x != 2.
        let mut ctx = RefinementContext::new();
        ctx.add_fact(gt(Term::var("x"), Term::int(5)), "test");
        assert_eq!(
            solve(&gt(Term::var("x"), Term::int(3)), &ctx),
            SolveResult::Discharged
        );
        assert_eq!(
            solve(
                &Predicate::compare(CompareOp::Ne, Term::var("x"), Term::int(2)),
                &ctx
            ),
            SolveResult::Discharged
        );
    }

    #[test]
    fn flipped_goal_orientation() {
        // Fact x > 5; goal 3 < x.
        let mut ctx = RefinementContext::new();
        ctx.add_fact(gt(Term::var("x"), Term::int(5)), "test");
        assert_eq!(
            solve(
                &Predicate::compare(CompareOp::Lt, Term::int(3), Term::var("x")),
                &ctx
            ),
            SolveResult::Discharged
        );
    }

    // ── Arithmetic reasoning through definitions ──────────────────

    #[test]
    fn definition_substitution_plus_arithmetic() {
        // n > 0, m defined as n + 1: m > 0 discharges.
        let mut ctx = RefinementContext::new();
        ctx.add_fact(gt(Term::var("n"), Term::int(0)), "parameter n");
        ctx.set_definition(
            "m",
            Term::binop(ArithOp::Add, Term::var("n"), Term::int(1)),
        );
        assert_eq!(
            solve(&gt(Term::var("m"), Term::int(0)), &ctx),
            SolveResult::Discharged
        );
    }

    #[test]
    fn shifted_goal_reduces_to_variable_bound() {
        // Fact x >= 1; goal (x + 1) > 1.
        let mut ctx = RefinementContext::new();
        ctx.add_fact(
            Predicate::compare(CompareOp::Ge, Term::var("x"), Term::int(1)),
            "test",
        );
        let goal = gt(
            Term::binop(ArithOp::Add, Term::var("x"), Term::int(1)),
            Term::int(1),
        );
        assert_eq!(solve(&goal, &ctx), SolveResult::Discharged);
    }

    // ── Compound predicates ───────────────────────────────────────

    #[test]
    fn conjunction_needs_both() {
        let mut ctx = RefinementContext::new();
        ctx.add_fact(gt(Term::var("x"), Term::int(5)), "test");
        let both = Predicate::and(
            gt(Term::var("x"), Term::int(0)),
            gt(Term::var("x"), Term::int(3)),
        );
        assert_eq!(solve(&both, &ctx), SolveResult::Discharged);

        let too_strong = Predicate::and(
            gt(Term::var("x"), Term::int(0)),
            gt(Term::var("x"), Term::int(7)),
        );
        assert!(matches!(
            solve(&too_strong, &ctx),
            SolveResult::Unknown { .. }
        ));
    }

    #[test]
    fn disjunction_needs_one() {
        let mut ctx = RefinementContext::new();
        ctx.add_fact(gt(Term::var("x"), Term::int(5)), "test");
        let either = Predicate::or(
            gt(Term::var("x"), Term::int(100)),
            gt(Term::var("x"), Term::int(3)),
        );
        assert_eq!(solve(&either, &ctx), SolveResult::Discharged);
    }

    #[test]
    fn negation_proved_by_refuting_inner() {
        // Fact x > 10; goal !(x <= 10) should discharge.
        let mut ctx = RefinementContext::new();
        ctx.add_fact(gt(Term::var("x"), Term::int(10)), "test");
        let goal = Predicate::not(le(Term::var("x"), Term::int(10)));
        assert_eq!(solve(&goal, &ctx), SolveResult::Discharged);
    }

    // ── Refutation ────────────────────────────────────────────────

    #[test]
    fn refutes_with_boundary_counterexample() {
        // Context { x > 10 }, goal x <= 10: refuted, witness x = 11.
        let mut ctx = RefinementContext::new();
        ctx.add_fact(gt(Term::var("x"), Term::int(10)), "test");
        let result = solve(&le(Term::var("x"), Term::int(10)), &ctx);
        match result {
            SolveResult::Refuted { counterexample } => {
                assert_eq!(counterexample.get("x").map(String::as_str), Some("11"));
                assert_eq!(
                    counterexample.get("_explanation").map(String::as_str),
                    Some("contradicts 'x > 10'")
                );
                assert_eq!(
                    counterexample.get("_contradicts").map(String::as_str),
                    Some("x > 10 (from: test)")
                );
            }
            other => panic!("expected refuted, got {other:?}"),
        }
    }

    #[test]
    fn refutes_conjunction_through_one_side() {
        let mut ctx = RefinementContext::new();
        ctx.add_fact(gt(Term::var("x"), Term::int(10)), "test");
        let goal = Predicate::and(
            gt(Term::var("y"), Term::int(0)),
            le(Term::var("x"), Term::int(5)),
        );
        assert!(matches!(solve(&goal, &ctx), SolveResult::Refuted { .. }));
    }

    #[test]
    fn refutes_explicit_negation_pair() {
        let mut ctx = RefinementContext::new();
        let sorted = Predicate::Call("sorted".to_string(), vec![Term::var("xs")]);
        ctx.add_fact(sorted.clone(), "invariant");
        let goal = Predicate::not(sorted);
        assert!(matches!(solve(&goal, &ctx), SolveResult::Refuted { .. }));
    }

    // ── Unknown + candidates ──────────────────────────────────────

    #[test]
    fn unknown_with_candidate_within_bounds() {
        // Fact x >= 0; goal x > 5: not provable, not refutable.
        // Candidate must respect x >= 0 and violate x > 5.
        let mut ctx = RefinementContext::new();
        ctx.add_fact(
            Predicate::compare(CompareOp::Ge, Term::var("x"), Term::int(0)),
            "test",
        );
        let result = solve(&gt(Term::var("x"), Term::int(5)), &ctx);
        match result {
            SolveResult::Unknown { candidate, .. } => {
                let cex = candidate.expect("candidate expected");
                let value: i64 = cex.get("x").and_then(|v| v.parse().ok()).expect("x value");
                assert!((0..=5).contains(&value), "candidate {value} out of range");
                assert_eq!(
                    cex.get("_note").map(String::as_str),
                    Some("possible counterexample")
                );
            }
            other => panic!("expected unknown, got {other:?}"),
        }
    }

    #[test]
    fn unknown_without_bounds_has_no_candidate_for_opaque_goals() {
        let ctx = RefinementContext::new();
        let goal = Predicate::Call("sorted".to_string(), vec![Term::var("xs")]);
        match solve(&goal, &ctx) {
            SolveResult::Unknown { candidate, .. } => assert!(candidate.is_none()),
            other => panic!("expected unknown, got {other:?}"),
        }
    }

    #[test]
    fn uninterpreted_call_proved_only_structurally() {
        let mut ctx = RefinementContext::new();
        let sorted = Predicate::Call("sorted".to_string(), vec![Term::var("xs")]);
        ctx.add_fact(sorted.clone(), "invariant");
        assert_eq!(solve(&sorted, &ctx), SolveResult::Discharged);
    }

    // ── Budget ────────────────────────────────────────────────────

    #[test]
    fn budget_exhaustion_reports_unknown() {
        let mut ctx = RefinementContext::new();
        for i in 0..50 {
            ctx.add_fact(gt(Term::var("y"), Term::int(i)), "noise");
        }
        let config = SolverConfig { max_steps: 3 };
        let result = solve_with_config(&gt(Term::var("x"), Term::int(0)), &ctx, &config);
        match result {
            SolveResult::Unknown { reason, .. } => assert_eq!(reason, "budget exhausted"),
            other => panic!("expected unknown, got {other:?}"),
        }
    }

    // ── Determinism (U3) ──────────────────────────────────────────

    #[test]
    fn solving_is_deterministic() {
        let mut ctx = RefinementContext::new();
        ctx.add_fact(gt(Term::var("x"), Term::int(3)), "a");
        ctx.add_fact(le(Term::var("y"), Term::int(9)), "b");
        let goal = Predicate::and(
            gt(Term::var("x"), Term::int(0)),
            gt(Term::var("y"), Term::int(0)),
        );
        let first = solve(&goal, &ctx);
        for _ in 0..3 {
            assert_eq!(solve(&goal, &ctx), first);
        }
    }
}
