//! Predicate simplification.
//!
//! Rewrites predicates toward a normal form before proving:
//! - constant folding over arbitrary-precision integers (division and
//!   modulo by zero leave the term unevaluated, never an error),
//! - double-negation elimination, negation pushed through comparisons and
//!   through `&&`/`||` by De Morgan,
//! - `&&`/`||` constant folding,
//! - arithmetic regrouping: `(x + a) + b -> x + (a + b)` and the
//!   sign-adjusting variants.
//!
//! Simplification runs to a fixed point, so it is idempotent.

use num_bigint::BigInt;
use num_traits::Zero;

use clank_types::refine::{ArithOp, CompareOp, Predicate, Term};

use crate::RefinementContext;

/// Upper bound on rewrite iterations; pathological inputs bail out early
/// rather than spin.
const MAX_REWRITE_PASSES: usize = 64;

/// Replace variables with their known definitions (and literal values),
/// recursively, until no substitution applies.
pub fn substitute_definitions(pred: &Predicate, ctx: &RefinementContext) -> Predicate {
    let mut current = pred.clone();
    for _ in 0..MAX_REWRITE_PASSES {
        let next = subst_pred(&current, ctx);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn subst_pred(pred: &Predicate, ctx: &RefinementContext) -> Predicate {
    match pred {
        Predicate::Compare(op, lhs, rhs) => {
            Predicate::Compare(*op, subst_term(lhs, ctx), subst_term(rhs, ctx))
        }
        Predicate::And(lhs, rhs) => Predicate::and(subst_pred(lhs, ctx), subst_pred(rhs, ctx)),
        Predicate::Or(lhs, rhs) => Predicate::or(subst_pred(lhs, ctx), subst_pred(rhs, ctx)),
        Predicate::Not(inner) => Predicate::not(subst_pred(inner, ctx)),
        Predicate::Call(name, args) => Predicate::Call(
            name.clone(),
            args.iter().map(|a| subst_term(a, ctx)).collect(),
        ),
        Predicate::True | Predicate::False | Predicate::Unknown(_) => pred.clone(),
    }
}

fn subst_term(term: &Term, ctx: &RefinementContext) -> Term {
    match term {
        Term::Var(name) => ctx
            .get_definition(name)
            .or_else(|| ctx.get_value(name))
            .cloned()
            .unwrap_or_else(|| term.clone()),
        Term::Int(_) | Term::Bool(_) | Term::Str(_) => term.clone(),
        Term::Binop(op, lhs, rhs) => Term::binop(*op, subst_term(lhs, ctx), subst_term(rhs, ctx)),
        Term::Call(name, args) => Term::Call(
            name.clone(),
            args.iter().map(|a| subst_term(a, ctx)).collect(),
        ),
        Term::Field(base, field) => Term::Field(Box::new(subst_term(base, ctx)), field.clone()),
    }
}

/// Simplify a predicate to a fixed point.
pub fn simplify(pred: &Predicate) -> Predicate {
    let mut current = pred.clone();
    for _ in 0..MAX_REWRITE_PASSES {
        let next = simplify_once(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn simplify_once(pred: &Predicate) -> Predicate {
    match pred {
        Predicate::Compare(op, lhs, rhs) => {
            let lhs = simplify_term(lhs);
            let rhs = simplify_term(rhs);
            eval_compare(*op, &lhs, &rhs).map_or(Predicate::Compare(*op, lhs, rhs), |holds| {
                if holds {
                    Predicate::True
                } else {
                    Predicate::False
                }
            })
        }
        Predicate::And(lhs, rhs) => {
            let lhs = simplify_once(lhs);
            let rhs = simplify_once(rhs);
            match (lhs, rhs) {
                (Predicate::False, _) | (_, Predicate::False) => Predicate::False,
                (Predicate::True, other) | (other, Predicate::True) => other,
                (lhs, rhs) => Predicate::and(lhs, rhs),
            }
        }
        Predicate::Or(lhs, rhs) => {
            let lhs = simplify_once(lhs);
            let rhs = simplify_once(rhs);
            match (lhs, rhs) {
                (Predicate::True, _) | (_, Predicate::True) => Predicate::True,
                (Predicate::False, other) | (other, Predicate::False) => other,
                (lhs, rhs) => Predicate::or(lhs, rhs),
            }
        }
        Predicate::Not(inner) => match inner.as_ref() {
            Predicate::True => Predicate::False,
            Predicate::False => Predicate::True,
            // !!p -> p
            Predicate::Not(inner2) => simplify_once(inner2),
            // !(x > 0) -> x <= 0
            Predicate::Compare(op, lhs, rhs) => {
                simplify_once(&Predicate::Compare(op.negated(), lhs.clone(), rhs.clone()))
            }
            // De Morgan.
            Predicate::And(lhs, rhs) => simplify_once(&Predicate::or(
                Predicate::not(lhs.as_ref().clone()),
                Predicate::not(rhs.as_ref().clone()),
            )),
            Predicate::Or(lhs, rhs) => simplify_once(&Predicate::and(
                Predicate::not(lhs.as_ref().clone()),
                Predicate::not(rhs.as_ref().clone()),
            )),
            _ => Predicate::not(simplify_once(inner)),
        },
        Predicate::Call(name, args) => {
            Predicate::Call(name.clone(), args.iter().map(simplify_term).collect())
        }
        Predicate::True | Predicate::False | Predicate::Unknown(_) => pred.clone(),
    }
}

/// Decide a comparison between closed terms, or between syntactically equal
/// terms. `None` when the comparison cannot be decided symbolically.
fn eval_compare(op: CompareOp, lhs: &Term, rhs: &Term) -> Option<bool> {
    match (lhs, rhs) {
        (Term::Int(a), Term::Int(b)) => Some(match op {
            CompareOp::Eq => a == b,
            CompareOp::Ne => a != b,
            CompareOp::Lt => a < b,
            CompareOp::Le => a <= b,
            CompareOp::Gt => a > b,
            CompareOp::Ge => a >= b,
        }),
        (Term::Bool(a), Term::Bool(b)) => match op {
            CompareOp::Eq => Some(a == b),
            CompareOp::Ne => Some(a != b),
            _ => None,
        },
        (Term::Str(a), Term::Str(b)) => match op {
            CompareOp::Eq => Some(a == b),
            CompareOp::Ne => Some(a != b),
            _ => None,
        },
        // Terms are pure, so `t op t` is decidable for reflexive operators.
        _ if lhs == rhs => match op {
            CompareOp::Eq | CompareOp::Le | CompareOp::Ge => Some(true),
            CompareOp::Ne | CompareOp::Lt | CompareOp::Gt => Some(false),
        },
        _ => None,
    }
}

/// Simplify a term: fold constants and regroup nested additions so that a
/// variable-plus-constant shape surfaces for the arithmetic prover.
pub fn simplify_term(term: &Term) -> Term {
    match term {
        Term::Binop(op, lhs, rhs) => {
            let lhs = simplify_term(lhs);
            let rhs = simplify_term(rhs);
            fold_binop(*op, lhs, rhs)
        }
        Term::Call(name, args) => {
            Term::Call(name.clone(), args.iter().map(simplify_term).collect())
        }
        Term::Field(base, field) => Term::Field(Box::new(simplify_term(base)), field.clone()),
        Term::Var(_) | Term::Int(_) | Term::Bool(_) | Term::Str(_) => term.clone(),
    }
}

fn fold_binop(op: ArithOp, lhs: Term, rhs: Term) -> Term {
    // Constant folding. Division/modulo by zero stays unevaluated.
    if let (Term::Int(a), Term::Int(b)) = (&lhs, &rhs) {
        let folded = match op {
            ArithOp::Add => Some(a + b),
            ArithOp::Sub => Some(a - b),
            ArithOp::Mul => Some(a * b),
            ArithOp::Div => (!b.is_zero()).then(|| a / b),
            ArithOp::Rem => (!b.is_zero()).then(|| a % b),
        };
        if let Some(value) = folded {
            return Term::Int(value);
        }
    }

    // Canonicalize `k + x` to `x + k` so regrouping sees one shape.
    if op == ArithOp::Add {
        if let (Term::Int(_), other) = (&lhs, &rhs) {
            if !matches!(other, Term::Int(_)) {
                return fold_binop(ArithOp::Add, rhs, lhs);
            }
        }
    }

    // Identity elements.
    match (&op, &rhs) {
        (ArithOp::Add | ArithOp::Sub, Term::Int(b)) if b.is_zero() => return lhs,
        (ArithOp::Mul | ArithOp::Div, Term::Int(b)) if *b == BigInt::from(1) => return lhs,
        _ => {}
    }

    // Regrouping: pull nested constant offsets together.
    if let (ArithOp::Add | ArithOp::Sub, Term::Int(b)) = (op, &rhs) {
        if let Term::Binop(inner_op @ (ArithOp::Add | ArithOp::Sub), x, a) = &lhs {
            if let Term::Int(a) = a.as_ref() {
                // Net constant offset of `((x ± a) ± b)`.
                let a_signed = match inner_op {
                    ArithOp::Add => a.clone(),
                    _ => -a.clone(),
                };
                let b_signed = match op {
                    ArithOp::Add => b.clone(),
                    _ => -b.clone(),
                };
                let net = a_signed + b_signed;
                return add_offset(x.as_ref().clone(), net);
            }
        }
    }

    Term::Binop(op, Box::new(lhs), Box::new(rhs))
}

/// `x + net`, rendered with a non-negative constant (`x - 3` over `x + -3`).
fn add_offset(x: Term, net: BigInt) -> Term {
    use num_traits::Signed;
    if net.is_zero() {
        x
    } else if net.is_negative() {
        Term::binop(ArithOp::Sub, x, Term::Int(-net))
    } else {
        Term::binop(ArithOp::Add, x, Term::Int(net))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn gt(lhs: Term, rhs: Term) -> Predicate {
        Predicate::compare(CompareOp::Gt, lhs, rhs)
    }

    #[test]
    fn constant_folding() {
        let term = Term::binop(ArithOp::Add, Term::int(2), Term::int(3));
        assert_eq!(simplify_term(&term), Term::int(5));

        let pred = gt(Term::int(5), Term::int(3));
        assert_eq!(simplify(&pred), Predicate::True);
        let pred = gt(Term::int(1), Term::int(3));
        assert_eq!(simplify(&pred), Predicate::False);
    }

    #[test]
    fn division_by_zero_stays_unevaluated() {
        let term = Term::binop(ArithOp::Div, Term::int(1), Term::int(0));
        assert_eq!(simplify_term(&term), term);
        let term = Term::binop(ArithOp::Rem, Term::int(1), Term::int(0));
        assert_eq!(simplify_term(&term), term);
    }

    #[test]
    fn double_negation() {
        let pred = Predicate::not(Predicate::not(gt(Term::var("x"), Term::int(0))));
        assert_eq!(simplify(&pred), gt(Term::var("x"), Term::int(0)));
    }

    #[test]
    fn negation_pushes_through_comparison() {
        let pred = Predicate::not(gt(Term::var("x"), Term::int(0)));
        assert_eq!(
            simplify(&pred),
            Predicate::compare(CompareOp::Le, Term::var("x"), Term::int(0))
        );
    }

    #[test]
    fn de_morgan() {
        let p = gt(Term::var("x"), Term::int(0));
        let q = gt(Term::var("y"), Term::int(0));
        let pred = Predicate::not(Predicate::and(p.clone(), q.clone()));
        assert_eq!(
            simplify(&pred),
            Predicate::or(
                Predicate::compare(CompareOp::Le, Term::var("x"), Term::int(0)),
                Predicate::compare(CompareOp::Le, Term::var("y"), Term::int(0)),
            )
        );
        let pred = Predicate::not(Predicate::or(p, q));
        assert_eq!(
            simplify(&pred),
            Predicate::and(
                Predicate::compare(CompareOp::Le, Term::var("x"), Term::int(0)),
                Predicate::compare(CompareOp::Le, Term::var("y"), Term::int(0)),
            )
        );
    }

    #[test]
    fn and_or_constant_folding() {
        let p = gt(Term::var("x"), Term::int(0));
        assert_eq!(simplify(&Predicate::and(p.clone(), Predicate::True)), p);
        assert_eq!(
            simplify(&Predicate::and(p.clone(), Predicate::False)),
            Predicate::False
        );
        assert_eq!(
            simplify(&Predicate::or(p.clone(), Predicate::True)),
            Predicate::True
        );
        assert_eq!(simplify(&Predicate::or(p.clone(), Predicate::False)), p);
    }

    #[test]
    fn arithmetic_regrouping() {
        // (x + 1) + 2 -> x + 3
        let term = Term::binop(
            ArithOp::Add,
            Term::binop(ArithOp::Add, Term::var("x"), Term::int(1)),
            Term::int(2),
        );
        assert_eq!(
            simplify_term(&term),
            Term::binop(ArithOp::Add, Term::var("x"), Term::int(3))
        );

        // (x - 1) + 3 -> x + 2 (sign-adjusting)
        let term = Term::binop(
            ArithOp::Add,
            Term::binop(ArithOp::Sub, Term::var("x"), Term::int(1)),
            Term::int(3),
        );
        assert_eq!(
            simplify_term(&term),
            Term::binop(ArithOp::Add, Term::var("x"), Term::int(2))
        );

        // (x - 1) - 2 -> x - 3
        let term = Term::binop(
            ArithOp::Sub,
            Term::binop(ArithOp::Sub, Term::var("x"), Term::int(1)),
            Term::int(2),
        );
        assert_eq!(
            simplify_term(&term),
            Term::binop(ArithOp::Sub, Term::var("x"), Term::int(3))
        );

        // (x + 5) - 2 -> x + 3
        let term = Term::binop(
            ArithOp::Sub,
            Term::binop(ArithOp::Add, Term::var("x"), Term::int(5)),
            Term::int(2),
        );
        assert_eq!(
            simplify_term(&term),
            Term::binop(ArithOp::Add, Term::var("x"), Term::int(3))
        );
    }

    #[test]
    fn reflexive_comparisons_decide() {
        let x = Term::var("x");
        assert_eq!(
            simplify(&Predicate::compare(CompareOp::Eq, x.clone(), x.clone())),
            Predicate::True
        );
        assert_eq!(
            simplify(&Predicate::compare(CompareOp::Lt, x.clone(), x)),
            Predicate::False
        );
    }

    #[test]
    fn definition_substitution_reaches_fixpoint() {
        let mut ctx = RefinementContext::new();
        ctx.set_definition(
            "m",
            Term::binop(ArithOp::Add, Term::var("n"), Term::int(1)),
        );
        let goal = gt(Term::var("m"), Term::int(0));
        let substituted = substitute_definitions(&goal, &ctx);
        assert_eq!(
            substituted,
            gt(
                Term::binop(ArithOp::Add, Term::var("n"), Term::int(1)),
                Term::int(0)
            )
        );
    }

    #[test]
    fn simplify_is_idempotent() {
        let preds = [
            Predicate::not(Predicate::and(
                gt(Term::var("x"), Term::int(0)),
                Predicate::not(gt(Term::var("y"), Term::int(2))),
            )),
            gt(
                Term::binop(
                    ArithOp::Add,
                    Term::binop(ArithOp::Sub, Term::var("x"), Term::int(2)),
                    Term::int(7),
                ),
                Term::int(0),
            ),
            Predicate::Unknown("opaque".to_string()),
        ];
        for pred in preds {
            let once = simplify(&pred);
            assert_eq!(simplify(&once), once, "not idempotent for {pred}");
        }
    }
}
