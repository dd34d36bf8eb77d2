//! Lowering expressions into refinement predicates and terms.
//!
//! The same extractor serves three sites: refined type annotations,
//! `if`/`while` conditions entering the refinement context, and `assert`
//! statements. Expressions outside the term language lower to `None`; the
//! caller decides whether that means "no fact" or an `unknown` predicate.

use clank_ir::{BinOp, Expr, ExprKind, Literal, UnOp};
use clank_types::refine::{ArithOp, CompareOp, Predicate, Term};

/// Lower an expression to a refinement term, if it is in the term language.
pub fn expr_to_term(expr: &Expr) -> Option<Term> {
    match &expr.kind {
        ExprKind::Literal { value } => match value {
            Literal::Int { value, .. } => Some(Term::Int(value.clone())),
            Literal::Bool { value } => Some(Term::Bool(*value)),
            Literal::Str { value } => Some(Term::Str(value.clone())),
            Literal::Float { .. } | Literal::Unit => None,
        },
        ExprKind::Ident { name } => Some(Term::Var(name.clone())),
        ExprKind::Binary { op, lhs, rhs } => {
            let op = arith_op(*op)?;
            Some(Term::binop(op, expr_to_term(lhs)?, expr_to_term(rhs)?))
        }
        ExprKind::Unary {
            op: UnOp::Neg,
            operand,
        } => match expr_to_term(operand)? {
            Term::Int(value) => Some(Term::Int(-value)),
            term => Some(Term::binop(ArithOp::Sub, Term::int(0), term)),
        },
        ExprKind::Call { callee, args } => {
            let ExprKind::Ident { name } = &callee.kind else {
                return None;
            };
            let args = args.iter().map(expr_to_term).collect::<Option<Vec<_>>>()?;
            Some(Term::Call(name.clone(), args))
        }
        ExprKind::Field { base, name } => {
            Some(Term::Field(Box::new(expr_to_term(base)?), name.clone()))
        }
        _ => None,
    }
}

/// Lower a boolean expression to a predicate, if it is in the predicate
/// language.
pub fn lower_predicate(expr: &Expr) -> Option<Predicate> {
    match &expr.kind {
        ExprKind::Literal {
            value: Literal::Bool { value },
        } => Some(if *value {
            Predicate::True
        } else {
            Predicate::False
        }),
        ExprKind::Binary { op, lhs, rhs } => match op {
            BinOp::And => Some(Predicate::and(lower_predicate(lhs)?, lower_predicate(rhs)?)),
            BinOp::Or => Some(Predicate::or(lower_predicate(lhs)?, lower_predicate(rhs)?)),
            _ => {
                let op = compare_op(*op)?;
                Some(Predicate::Compare(op, expr_to_term(lhs)?, expr_to_term(rhs)?))
            }
        },
        ExprKind::Unary {
            op: UnOp::Not,
            operand,
        } => Some(Predicate::not(lower_predicate(operand)?)),
        ExprKind::Call { callee, args } => {
            let ExprKind::Ident { name } = &callee.kind else {
                return None;
            };
            let args = args.iter().map(expr_to_term).collect::<Option<Vec<_>>>()?;
            Some(Predicate::Call(name.clone(), args))
        }
        _ => None,
    }
}

/// Substitute the refinement-bound variable with a concrete term.
pub fn substitute_pred_var(pred: &Predicate, var: &str, term: &Term) -> Predicate {
    match pred {
        Predicate::Compare(op, lhs, rhs) => Predicate::Compare(
            *op,
            substitute_term_var(lhs, var, term),
            substitute_term_var(rhs, var, term),
        ),
        Predicate::And(lhs, rhs) => Predicate::and(
            substitute_pred_var(lhs, var, term),
            substitute_pred_var(rhs, var, term),
        ),
        Predicate::Or(lhs, rhs) => Predicate::or(
            substitute_pred_var(lhs, var, term),
            substitute_pred_var(rhs, var, term),
        ),
        Predicate::Not(inner) => Predicate::not(substitute_pred_var(inner, var, term)),
        Predicate::Call(name, args) => Predicate::Call(
            name.clone(),
            args.iter()
                .map(|a| substitute_term_var(a, var, term))
                .collect(),
        ),
        Predicate::True | Predicate::False | Predicate::Unknown(_) => pred.clone(),
    }
}

fn substitute_term_var(haystack: &Term, var: &str, term: &Term) -> Term {
    match haystack {
        Term::Var(name) if name == var => term.clone(),
        Term::Var(_) | Term::Int(_) | Term::Bool(_) | Term::Str(_) => haystack.clone(),
        Term::Binop(op, lhs, rhs) => Term::binop(
            *op,
            substitute_term_var(lhs, var, term),
            substitute_term_var(rhs, var, term),
        ),
        Term::Call(name, args) => Term::Call(
            name.clone(),
            args.iter()
                .map(|a| substitute_term_var(a, var, term))
                .collect(),
        ),
        Term::Field(base, field) => Term::Field(
            Box::new(substitute_term_var(base, var, term)),
            field.clone(),
        ),
    }
}

fn arith_op(op: BinOp) -> Option<ArithOp> {
    match op {
        BinOp::Add => Some(ArithOp::Add),
        BinOp::Sub => Some(ArithOp::Sub),
        BinOp::Mul => Some(ArithOp::Mul),
        BinOp::Div => Some(ArithOp::Div),
        BinOp::Rem => Some(ArithOp::Rem),
        _ => None,
    }
}

fn compare_op(op: BinOp) -> Option<CompareOp> {
    match op {
        BinOp::Eq => Some(CompareOp::Eq),
        BinOp::Ne => Some(CompareOp::Ne),
        BinOp::Lt => Some(CompareOp::Lt),
        BinOp::Le => Some(CompareOp::Le),
        BinOp::Gt => Some(CompareOp::Gt),
        BinOp::Ge => Some(CompareOp::Ge),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clank_ir::{NodeId, Span};
    use pretty_assertions::assert_eq;

    fn expr(kind: ExprKind) -> Expr {
        Expr {
            id: NodeId::SYNTHETIC,
            span: Span::DUMMY,
            kind,
        }
    }

    fn ident(name: &str) -> Expr {
        expr(ExprKind::Ident {
            name: name.to_string(),
        })
    }

    fn int(value: i64) -> Expr {
        expr(ExprKind::Literal {
            value: Literal::int(value),
        })
    }

    fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
        expr(ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    #[test]
    fn comparison_lowers() {
        let cond = binary(BinOp::Gt, ident("x"), int(0));
        assert_eq!(
            lower_predicate(&cond),
            Some(Predicate::compare(CompareOp::Gt, Term::var("x"), Term::int(0)))
        );
    }

    #[test]
    fn arithmetic_lowers_inside_comparison() {
        let cond = binary(BinOp::Gt, binary(BinOp::Add, ident("n"), int(1)), int(0));
        assert_eq!(
            lower_predicate(&cond),
            Some(Predicate::compare(
                CompareOp::Gt,
                Term::binop(ArithOp::Add, Term::var("n"), Term::int(1)),
                Term::int(0)
            ))
        );
    }

    #[test]
    fn logical_structure_lowers() {
        let cond = binary(
            BinOp::And,
            binary(BinOp::Gt, ident("x"), int(0)),
            binary(BinOp::Lt, ident("x"), int(10)),
        );
        let pred = lower_predicate(&cond).unwrap();
        assert!(matches!(pred, Predicate::And(_, _)));
    }

    #[test]
    fn non_predicate_exprs_lower_to_none() {
        assert_eq!(lower_predicate(&int(1)), None);
        let pipe = binary(BinOp::Pipe, ident("x"), ident("f"));
        assert_eq!(lower_predicate(&pipe), None);
    }

    #[test]
    fn substitution_replaces_bound_var() {
        let pred = Predicate::compare(CompareOp::Gt, Term::var("x"), Term::int(0));
        let instantiated = substitute_pred_var(&pred, "x", &Term::var("m"));
        assert_eq!(
            instantiated,
            Predicate::compare(CompareOp::Gt, Term::var("m"), Term::int(0))
        );
        // Other variables are untouched.
        let untouched = substitute_pred_var(&pred, "y", &Term::var("m"));
        assert_eq!(untouched, pred);
    }

    #[test]
    fn negated_int_literal_folds() {
        let neg = expr(ExprKind::Unary {
            op: UnOp::Neg,
            operand: Box::new(int(5)),
        });
        assert_eq!(expr_to_term(&neg), Some(Term::int(-5)));
    }
}
