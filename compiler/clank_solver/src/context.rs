//! Refinement context: the facts in scope at a program point.
//!
//! A stack of scopes mirroring the typing context. Each scope holds facts
//! (predicates known to hold), values (literal bindings usable for direct
//! substitution), and definitions (the term a `let` bound its name to).
//! Children see everything outer scopes hold and never mutate them.

use clank_types::refine::{CompareOp, Predicate, Term};

/// A predicate known to hold, tagged with where it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fact {
    pub pred: Predicate,
    /// Human-readable origin, e.g. `parameter n`, `if condition`.
    pub source: String,
}

impl Fact {
    pub fn new(pred: Predicate, source: impl Into<String>) -> Self {
        Fact {
            pred,
            source: source.into(),
        }
    }
}

impl std::fmt::Display for Fact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (from: {})", self.pred, self.source)
    }
}

#[derive(Default)]
struct Scope {
    facts: Vec<Fact>,
    values: Vec<(String, Term)>,
    definitions: Vec<(String, Term)>,
}

/// Scoped collection of refinement facts and variable knowledge.
pub struct RefinementContext {
    scopes: Vec<Scope>,
}

impl Default for RefinementContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RefinementContext {
    pub fn new() -> Self {
        RefinementContext {
            scopes: vec![Scope::default()],
        }
    }

    /// Enter a child scope.
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Leave the innermost scope, discarding its local knowledge.
    pub fn pop_scope(&mut self) {
        self.scopes.pop();
        debug_assert!(!self.scopes.is_empty(), "popped the root scope");
    }

    /// Record a fact in the current scope.
    pub fn add_fact(&mut self, pred: Predicate, source: impl Into<String>) {
        self.innermost().facts.push(Fact::new(pred, source));
    }

    /// Record a comparison fact. The operator string accepts the Unicode
    /// forms `≠ ≤ ≥` and normalizes them to ASCII.
    pub fn add_comparison(
        &mut self,
        op: &str,
        left: Term,
        right: Term,
        source: impl Into<String>,
    ) -> bool {
        match CompareOp::parse(op) {
            Some(op) => {
                self.add_fact(Predicate::Compare(op, left, right), source);
                true
            }
            None => false,
        }
    }

    /// Record a fact and, for comparisons, nothing else; for use at branch
    /// entry (`if cond { ... }`).
    pub fn with_fact(&mut self, pred: Predicate, source: impl Into<String>) {
        self.push_scope();
        self.add_fact(pred, source);
    }

    /// Enter a scope knowing `pred` is false. Adds `!pred` and, when `pred`
    /// is a comparison, also the de-negated comparison (`!(x > 0)` adds
    /// `x <= 0` too) so the prover sees it directly.
    pub fn with_negated_fact(&mut self, pred: Predicate, source: impl Into<String>) {
        self.push_scope();
        let source = source.into();
        if let Predicate::Compare(op, lhs, rhs) = &pred {
            self.add_fact(
                Predicate::Compare(op.negated(), lhs.clone(), rhs.clone()),
                source.clone(),
            );
        }
        self.add_fact(Predicate::not(pred), source);
    }

    /// All facts visible at this point, outermost first.
    pub fn get_all_facts(&self) -> Vec<&Fact> {
        self.scopes
            .iter()
            .flat_map(|scope| scope.facts.iter())
            .collect()
    }

    /// Bind a name to a known literal value.
    pub fn set_value(&mut self, name: impl Into<String>, term: Term) {
        self.innermost().values.push((name.into(), term));
    }

    /// Look up a known literal value; inner scopes shadow outer ones.
    pub fn get_value(&self, name: &str) -> Option<&Term> {
        self.scopes.iter().rev().find_map(|scope| {
            scope
                .values
                .iter()
                .rev()
                .find_map(|(n, t)| (n == name).then_some(t))
        })
    }

    /// Record the defining term of a `let` binding.
    pub fn set_definition(&mut self, name: impl Into<String>, term: Term) {
        self.innermost().definitions.push((name.into(), term));
    }

    /// Look up a definition; inner scopes shadow outer ones.
    pub fn get_definition(&self, name: &str) -> Option<&Term> {
        self.scopes.iter().rev().find_map(|scope| {
            scope
                .definitions
                .iter()
                .rev()
                .find_map(|(n, t)| (n == name).then_some(t))
        })
    }

    fn innermost(&mut self) -> &mut Scope {
        self.scopes
            .last_mut()
            .unwrap_or_else(|| unreachable!("context always has a root scope"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clank_types::refine::ArithOp;
    use pretty_assertions::assert_eq;

    #[test]
    fn facts_accumulate_across_scopes() {
        let mut ctx = RefinementContext::new();
        ctx.add_fact(
            Predicate::compare(CompareOp::Gt, Term::var("x"), Term::int(0)),
            "outer",
        );
        ctx.push_scope();
        ctx.add_fact(
            Predicate::compare(CompareOp::Lt, Term::var("x"), Term::int(10)),
            "inner",
        );
        assert_eq!(ctx.get_all_facts().len(), 2);
        ctx.pop_scope();
        assert_eq!(ctx.get_all_facts().len(), 1);
    }

    #[test]
    fn definitions_shadow_parents() {
        let mut ctx = RefinementContext::new();
        ctx.set_definition("m", Term::var("n"));
        ctx.push_scope();
        ctx.set_definition(
            "m",
            Term::binop(ArithOp::Add, Term::var("n"), Term::int(1)),
        );
        assert_eq!(
            ctx.get_definition("m"),
            Some(&Term::binop(ArithOp::Add, Term::var("n"), Term::int(1)))
        );
        ctx.pop_scope();
        assert_eq!(ctx.get_definition("m"), Some(&Term::var("n")));
    }

    #[test]
    fn unicode_comparison_normalizes() {
        let mut ctx = RefinementContext::new();
        assert!(ctx.add_comparison("≥", Term::var("x"), Term::int(1), "test"));
        let facts = ctx.get_all_facts();
        assert_eq!(
            facts[0].pred,
            Predicate::compare(CompareOp::Ge, Term::var("x"), Term::int(1))
        );
    }

    #[test]
    fn negated_fact_adds_denegated_comparison() {
        let mut ctx = RefinementContext::new();
        let gt = Predicate::compare(CompareOp::Gt, Term::var("x"), Term::int(0));
        ctx.with_negated_fact(gt.clone(), "else branch");
        let facts = ctx.get_all_facts();
        assert_eq!(facts.len(), 2);
        assert_eq!(
            facts[0].pred,
            Predicate::compare(CompareOp::Le, Term::var("x"), Term::int(0))
        );
        assert_eq!(facts[1].pred, Predicate::not(gt));
    }

    #[test]
    fn fact_display_names_source() {
        let fact = Fact::new(
            Predicate::compare(CompareOp::Gt, Term::var("x"), Term::int(10)),
            "test",
        );
        assert_eq!(fact.to_string(), "x > 10 (from: test)");
    }
}
