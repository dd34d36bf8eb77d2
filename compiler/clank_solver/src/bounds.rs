//! Atomic integer bounds over variables.
//!
//! The prover reduces comparisons of the shape `x op c`, `(x + k) op c`,
//! `(x - k) op c` (and the flipped forms) to an [`AtomicBound`] on the bare
//! variable. Transitive proof, contradiction detection, and counterexample
//! generation all work over these normalized bounds.

use num_bigint::BigInt;

use clank_types::refine::{ArithOp, CompareOp, Predicate, Term};

/// A normalized bound: `var op value` with integer reasoning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AtomicBound {
    pub var: String,
    pub op: CompareOp,
    pub value: BigInt,
}

impl AtomicBound {
    /// Whether a concrete value satisfies this bound.
    pub fn admits(&self, candidate: &BigInt) -> bool {
        match self.op {
            CompareOp::Eq => candidate == &self.value,
            CompareOp::Ne => candidate != &self.value,
            CompareOp::Lt => candidate < &self.value,
            CompareOp::Le => candidate <= &self.value,
            CompareOp::Gt => candidate > &self.value,
            CompareOp::Ge => candidate >= &self.value,
        }
    }

    /// A value satisfying this bound, at its boundary.
    pub fn boundary_value(&self) -> BigInt {
        match self.op {
            CompareOp::Eq | CompareOp::Le | CompareOp::Ge => self.value.clone(),
            CompareOp::Lt => &self.value - 1,
            CompareOp::Gt => &self.value + 1,
            CompareOp::Ne => &self.value + 1,
        }
    }

    /// A value *violating* this bound, at its boundary.
    pub fn violating_value(&self) -> BigInt {
        match self.op {
            CompareOp::Eq => &self.value + 1,
            CompareOp::Ne => self.value.clone(),
            CompareOp::Lt | CompareOp::Le => self.boundary_complement_high(),
            CompareOp::Gt | CompareOp::Ge => self.boundary_complement_low(),
        }
    }

    fn boundary_complement_high(&self) -> BigInt {
        match self.op {
            CompareOp::Lt => self.value.clone(),
            _ => &self.value + 1,
        }
    }

    fn boundary_complement_low(&self) -> BigInt {
        match self.op {
            CompareOp::Gt => self.value.clone(),
            _ => &self.value - 1,
        }
    }

    /// Whether this bound (as a fact) implies `goal` on the same variable,
    /// using integer reasoning: `x > c1` implies `x >= c2` iff `c1 + 1 >= c2`.
    pub fn implies(&self, goal: &AtomicBound) -> bool {
        if self.var != goal.var {
            return false;
        }
        let (c1, c2) = (&self.value, &goal.value);
        use CompareOp::{Eq, Ge, Gt, Le, Lt, Ne};
        match (self.op, goal.op) {
            // An equality fact decides every comparison outright.
            (Eq, op) => AtomicBound {
                var: goal.var.clone(),
                op,
                value: c2.clone(),
            }
            .admits(c1),

            (Gt, Gt) | (Gt, Ne) => c1 >= c2,
            (Gt, Ge) => c1 + 1 >= *c2,
            (Ge, Ge) => c1 >= c2,
            (Ge, Gt) | (Ge, Ne) => c1 > c2,

            (Lt, Lt) => c1 <= c2,
            (Lt, Le) => c1 - 1 <= *c2,
            (Lt, Ne) => c1 <= c2,
            (Le, Le) => c1 <= c2,
            (Le, Lt) | (Le, Ne) => c1 < c2,

            (Ne, Ne) => c1 == c2,

            _ => false,
        }
    }

    /// Whether this bound and `other` (on the same variable) cannot both
    /// hold for any integer.
    pub fn contradicts(&self, other: &AtomicBound) -> bool {
        if self.var != other.var {
            return false;
        }
        // Same operands: use the operator contradiction table directly.
        if self.value == other.value && self.op.contradicts(other.op) {
            return true;
        }
        // Interval reasoning: empty intersection of the admitted sets.
        let lower = [self, other]
            .into_iter()
            .filter_map(AtomicBound::lower_bound)
            .max();
        let upper = [self, other]
            .into_iter()
            .filter_map(AtomicBound::upper_bound)
            .min();
        match (lower, upper) {
            (Some(lo), Some(hi)) if lo > hi => true,
            _ => {
                // Eq pinned outside the other's admitted set.
                for (a, b) in [(self, other), (other, self)] {
                    if a.op == CompareOp::Eq && !b.admits(&a.value) {
                        return true;
                    }
                }
                false
            }
        }
    }

    /// Inclusive lower bound on admitted values, when one exists.
    fn lower_bound(&self) -> Option<BigInt> {
        match self.op {
            CompareOp::Gt => Some(&self.value + 1),
            CompareOp::Ge | CompareOp::Eq => Some(self.value.clone()),
            _ => None,
        }
    }

    /// Inclusive upper bound on admitted values, when one exists.
    fn upper_bound(&self) -> Option<BigInt> {
        match self.op {
            CompareOp::Lt => Some(&self.value - 1),
            CompareOp::Le | CompareOp::Eq => Some(self.value.clone()),
            _ => None,
        }
    }
}

/// Normalize a comparison to an atomic bound on a bare variable.
///
/// Handles `x op c`, `(x + k) op c`, `(x - k) op c`, `(k + x) op c`, and the
/// flipped forms with the constant on the left.
pub fn atomic_bound(pred: &Predicate) -> Option<AtomicBound> {
    let Predicate::Compare(op, lhs, rhs) = pred else {
        return None;
    };
    // Constant on the left: flip to put the variable side first.
    let (op, var_side, const_side) = match (lhs, rhs) {
        (Term::Int(_), r) if !matches!(r, Term::Int(_)) => (op.flipped(), rhs, lhs),
        _ => (*op, lhs, rhs),
    };
    let Term::Int(c) = const_side else {
        return None;
    };
    let (var, shift) = var_and_shift(var_side)?;
    Some(AtomicBound {
        var,
        op,
        value: c - shift,
    })
}

/// Decompose a term into `(variable, constant shift)`: `x -> (x, 0)`,
/// `x + k -> (x, k)`, `x - k -> (x, -k)`, `k + x -> (x, k)`.
fn var_and_shift(term: &Term) -> Option<(String, BigInt)> {
    match term {
        Term::Var(name) => Some((name.clone(), BigInt::from(0))),
        Term::Binop(ArithOp::Add, lhs, rhs) => match (lhs.as_ref(), rhs.as_ref()) {
            (Term::Var(name), Term::Int(k)) | (Term::Int(k), Term::Var(name)) => {
                Some((name.clone(), k.clone()))
            }
            _ => None,
        },
        Term::Binop(ArithOp::Sub, lhs, rhs) => match (lhs.as_ref(), rhs.as_ref()) {
            (Term::Var(name), Term::Int(k)) => Some((name.clone(), -k.clone())),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bound(var: &str, op: CompareOp, value: i64) -> AtomicBound {
        AtomicBound {
            var: var.to_string(),
            op,
            value: BigInt::from(value),
        }
    }

    #[test]
    fn normalizes_shifted_forms() {
        // (n + 1) > 0  ->  n > -1
        let pred = Predicate::compare(
            CompareOp::Gt,
            Term::binop(ArithOp::Add, Term::var("n"), Term::int(1)),
            Term::int(0),
        );
        assert_eq!(atomic_bound(&pred), Some(bound("n", CompareOp::Gt, -1)));

        // (n - 2) <= 5  ->  n <= 7
        let pred = Predicate::compare(
            CompareOp::Le,
            Term::binop(ArithOp::Sub, Term::var("n"), Term::int(2)),
            Term::int(5),
        );
        assert_eq!(atomic_bound(&pred), Some(bound("n", CompareOp::Le, 7)));
    }

    #[test]
    fn normalizes_flipped_comparisons() {
        // 0 < x  ->  x > 0
        let pred = Predicate::compare(CompareOp::Lt, Term::int(0), Term::var("x"));
        assert_eq!(atomic_bound(&pred), Some(bound("x", CompareOp::Gt, 0)));
    }

    #[test]
    fn transitive_implication_rules() {
        // x > 5 implies x > 3, x >= 6, x != 2
        let fact = bound("x", CompareOp::Gt, 5);
        assert!(fact.implies(&bound("x", CompareOp::Gt, 3)));
        assert!(fact.implies(&bound("x", CompareOp::Ge, 6)));
        assert!(fact.implies(&bound("x", CompareOp::Ne, 2)));
        assert!(!fact.implies(&bound("x", CompareOp::Gt, 6)));
        assert!(!fact.implies(&bound("y", CompareOp::Gt, 3)));

        // x >= 5 implies x > 4 but not x > 5
        let fact = bound("x", CompareOp::Ge, 5);
        assert!(fact.implies(&bound("x", CompareOp::Gt, 4)));
        assert!(!fact.implies(&bound("x", CompareOp::Gt, 5)));

        // x < 3 implies x <= 2 (integer reasoning)
        let fact = bound("x", CompareOp::Lt, 3);
        assert!(fact.implies(&bound("x", CompareOp::Le, 2)));

        // x == 4 decides everything
        let fact = bound("x", CompareOp::Eq, 4);
        assert!(fact.implies(&bound("x", CompareOp::Gt, 3)));
        assert!(fact.implies(&bound("x", CompareOp::Le, 4)));
        assert!(!fact.implies(&bound("x", CompareOp::Gt, 4)));
    }

    #[test]
    fn contradiction_detection() {
        // x > 10 contradicts x <= 10
        assert!(bound("x", CompareOp::Gt, 10).contradicts(&bound("x", CompareOp::Le, 10)));
        // x > 10 contradicts x < 5
        assert!(bound("x", CompareOp::Gt, 10).contradicts(&bound("x", CompareOp::Lt, 5)));
        // x == 3 contradicts x > 7
        assert!(bound("x", CompareOp::Eq, 3).contradicts(&bound("x", CompareOp::Gt, 7)));
        // x > 3 does not contradict x < 10
        assert!(!bound("x", CompareOp::Gt, 3).contradicts(&bound("x", CompareOp::Lt, 10)));
        // Different variables never contradict.
        assert!(!bound("x", CompareOp::Gt, 10).contradicts(&bound("y", CompareOp::Le, 10)));
    }

    #[test]
    fn boundary_values() {
        assert_eq!(bound("x", CompareOp::Gt, 10).boundary_value(), BigInt::from(11));
        assert_eq!(bound("x", CompareOp::Ge, 10).boundary_value(), BigInt::from(10));
        assert_eq!(bound("x", CompareOp::Lt, 10).boundary_value(), BigInt::from(9));
        assert_eq!(
            bound("x", CompareOp::Gt, 10).violating_value(),
            BigInt::from(10)
        );
        assert_eq!(
            bound("x", CompareOp::Le, 10).violating_value(),
            BigInt::from(11)
        );
    }
}
