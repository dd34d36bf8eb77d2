//! Type unification.
//!
//! `unify` is pure: it returns the substitution that makes both types equal
//! and never mutates ambient state. The caller composes the result into its
//! own substitution. Failures carry the expected and actual types plus a
//! machine-usable error kind.
//!
//! Refinements are stripped before structural comparison - predicate
//! entailment is the solver's concern, not the unifier's.

use thiserror::Error;

use crate::{types_equal, Substitution, Type};

/// Classification of unification failures.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum UnifyErrorKind {
    TypeMismatch,
    OccursCheck,
    ArityMismatch,
    MissingField,
}

/// A failed unification.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("cannot unify `{expected}` with `{actual}`")]
pub struct UnifyError {
    pub kind: UnifyErrorKind,
    pub expected: Type,
    pub actual: Type,
    /// Extra context, e.g. the missing field name.
    pub detail: Option<String>,
}

impl UnifyError {
    fn mismatch(expected: &Type, actual: &Type) -> Self {
        UnifyError {
            kind: UnifyErrorKind::TypeMismatch,
            expected: expected.clone(),
            actual: actual.clone(),
            detail: None,
        }
    }

}

/// Unify two types, producing the substitution that equates them.
pub fn unify(t1: &Type, t2: &Type) -> Result<Substitution, UnifyError> {
    // Reflexive shortcut.
    if types_equal(t1, t2) {
        return Ok(Substitution::empty());
    }

    // Refinements are transparent to unification.
    let t1 = t1.get_base();
    let t2 = t2.get_base();
    if types_equal(t1, t2) {
        return Ok(Substitution::empty());
    }

    // Never unifies unilaterally, without occurs-check.
    if matches!(t1, Type::Never) || matches!(t2, Type::Never) {
        return Ok(Substitution::empty());
    }

    match (t1, t2) {
        (Type::Var { id, .. }, other) | (other, Type::Var { id, .. }) => {
            unify_var(*id, other, t1, t2)
        }

        (Type::Con { name: n1 }, Type::Con { name: n2 }) => {
            if n1 == n2 {
                Ok(Substitution::empty())
            } else {
                Err(UnifyError::mismatch(t1, t2))
            }
        }

        (
            Type::App { ctor: c1, args: a1 },
            Type::App { ctor: c2, args: a2 },
        ) => {
            if c1 != c2 {
                return Err(UnifyError::mismatch(t1, t2));
            }
            if a1.len() != a2.len() {
                return Err(UnifyError {
                    kind: UnifyErrorKind::ArityMismatch,
                    expected: t1.clone(),
                    actual: t2.clone(),
                    detail: Some(format!(
                        "`{c1}` applied to {} argument(s), expected {}",
                        a2.len(),
                        a1.len()
                    )),
                });
            }
            unify_pairwise(a1, a2)
        }

        (
            Type::Fn {
                params: p1,
                ret: r1,
                ..
            },
            Type::Fn {
                params: p2,
                ret: r2,
                ..
            },
        ) => {
            if p1.len() != p2.len() {
                return Err(UnifyError {
                    kind: UnifyErrorKind::ArityMismatch,
                    expected: t1.clone(),
                    actual: t2.clone(),
                    detail: Some(format!(
                        "function takes {} parameter(s), expected {}",
                        p2.len(),
                        p1.len()
                    )),
                });
            }
            let mut subst = unify_pairwise(p1, p2)?;
            let ret_subst = unify(&subst.apply(r1), &subst.apply(r2))?;
            subst = ret_subst.compose(&subst);
            Ok(subst)
        }

        (Type::Tuple { elems: e1 }, Type::Tuple { elems: e2 }) => {
            if e1.len() != e2.len() {
                return Err(UnifyError {
                    kind: UnifyErrorKind::ArityMismatch,
                    expected: t1.clone(),
                    actual: t2.clone(),
                    detail: Some(format!(
                        "tuple has {} element(s), expected {}",
                        e2.len(),
                        e1.len()
                    )),
                });
            }
            unify_pairwise(e1, e2)
        }

        (Type::Array { elem: e1 }, Type::Array { elem: e2 }) => unify(e1, e2),

        (
            Type::Record {
                fields: f1,
                is_open: o1,
            },
            Type::Record {
                fields: f2,
                is_open: o2,
            },
        ) => {
            let mut subst = Substitution::empty();
            // Width subtyping: a closed record must carry every field of the
            // other side; an open record tolerates extras.
            for (name, ty1) in f1 {
                match f2.get(name) {
                    Some(ty2) => {
                        let s = unify(&subst.apply(ty1), &subst.apply(ty2))?;
                        subst = s.compose(&subst);
                    }
                    None if *o2 => {}
                    None => {
                        return Err(UnifyError {
                            kind: UnifyErrorKind::MissingField,
                            expected: t1.clone(),
                            actual: t2.clone(),
                            detail: Some(format!("missing field `{name}`")),
                        });
                    }
                }
            }
            for name in f2.keys() {
                if !f1.contains_key(name) && !*o1 {
                    return Err(UnifyError {
                        kind: UnifyErrorKind::MissingField,
                        expected: t1.clone(),
                        actual: t2.clone(),
                        detail: Some(format!("missing field `{name}`")),
                    });
                }
            }
            Ok(subst)
        }

        _ => Err(UnifyError::mismatch(t1, t2)),
    }
}

/// Bind a variable, guarding against infinite types.
fn unify_var(
    id: crate::TypeVarId,
    other: &Type,
    expected: &Type,
    actual: &Type,
) -> Result<Substitution, UnifyError> {
    if let Type::Var { id: other_id, .. } = other {
        if *other_id == id {
            return Ok(Substitution::empty());
        }
    }
    if other.free_type_vars().contains(&id) {
        tracing::debug!(var = id, ty = %other, "occurs check failed");
        return Err(UnifyError {
            kind: UnifyErrorKind::OccursCheck,
            expected: expected.clone(),
            actual: actual.clone(),
            detail: Some(format!("type variable ${id} occurs in `{other}`")),
        });
    }
    Ok(Substitution::singleton(id, other.clone()))
}

/// Unify two slices pairwise, threading the substitution left to right.
fn unify_pairwise(xs: &[Type], ys: &[Type]) -> Result<Substitution, UnifyError> {
    let mut subst = Substitution::empty();
    for (x, y) in xs.iter().zip(ys) {
        let s = unify(&subst.apply(x), &subst.apply(y))?;
        subst = s.compose(&subst);
    }
    Ok(subst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refine::{CompareOp, Predicate, Term};
    use crate::{type_app, type_array, type_fn, type_record, type_refined, type_tuple};
    use pretty_assertions::assert_eq;

    #[test]
    fn unify_identical_primitives() {
        assert!(unify(&Type::int(), &Type::int()).is_ok());
        assert!(unify(&Type::str(), &Type::str()).is_ok());
    }

    #[test]
    fn unify_different_primitives_fails() {
        let err = unify(&Type::int(), &Type::str()).unwrap_err();
        assert_eq!(err.kind, UnifyErrorKind::TypeMismatch);
        assert_eq!(err.expected, Type::int());
        assert_eq!(err.actual, Type::str());
    }

    #[test]
    fn unify_variable_with_primitive() {
        let subst = unify(&Type::var(1), &Type::int()).unwrap();
        assert_eq!(subst.apply(&Type::var(1)), Type::int());
    }

    #[test]
    fn unified_sides_apply_equal() {
        // U2: apply(s, t1) == apply(s, t2) structurally.
        let t1 = type_fn(vec![Type::var(1)], Type::var(2));
        let t2 = type_fn(vec![Type::int()], type_array(Type::var(1)));
        let subst = unify(&t1, &t2).unwrap();
        assert_eq!(subst.apply(&t1), subst.apply(&t2));
    }

    #[test]
    fn occurs_check_detects_infinite_type() {
        let err = unify(&Type::var(1), &type_array(Type::var(1))).unwrap_err();
        assert_eq!(err.kind, UnifyErrorKind::OccursCheck);
    }

    #[test]
    fn never_unifies_with_anything() {
        assert!(unify(&Type::Never, &Type::int()).is_ok());
        assert!(unify(&Type::str(), &Type::Never).is_ok());
        // Even against a variable nested in its own structure there is no
        // occurs check on the Never side.
        assert!(unify(&Type::Never, &type_array(Type::var(1))).is_ok());
    }

    #[test]
    fn unify_apps_checks_ctor_and_arity() {
        let opt_int = type_app("Option", vec![Type::int()]);
        let opt_var = type_app("Option", vec![Type::var(1)]);
        let res = type_app("Result", vec![Type::int()]);

        let subst = unify(&opt_var, &opt_int).unwrap();
        assert_eq!(subst.apply(&Type::var(1)), Type::int());

        assert_eq!(
            unify(&opt_int, &res).unwrap_err().kind,
            UnifyErrorKind::TypeMismatch
        );
        let two_args = type_app("Option", vec![Type::int(), Type::str()]);
        assert_eq!(
            unify(&opt_int, &two_args).unwrap_err().kind,
            UnifyErrorKind::ArityMismatch
        );
    }

    #[test]
    fn unify_functions() {
        let f1 = type_fn(vec![Type::var(1)], Type::var(1));
        let f2 = type_fn(vec![Type::int()], Type::int());
        assert!(unify(&f1, &f2).is_ok());

        let wrong_arity = type_fn(vec![Type::int(), Type::int()], Type::int());
        assert_eq!(
            unify(&f2, &wrong_arity).unwrap_err().kind,
            UnifyErrorKind::ArityMismatch
        );
    }

    #[test]
    fn unify_tuples_pairwise() {
        let t1 = type_tuple(vec![Type::var(1), Type::bool()]);
        let t2 = type_tuple(vec![Type::int(), Type::bool()]);
        let subst = unify(&t1, &t2).unwrap();
        assert_eq!(subst.apply(&Type::var(1)), Type::int());
    }

    #[test]
    fn closed_record_missing_field_errors() {
        let r1 = type_record(
            [
                ("x".to_string(), Type::int()),
                ("y".to_string(), Type::int()),
            ],
            false,
        );
        let r2 = type_record([("x".to_string(), Type::int())], false);
        let err = unify(&r1, &r2).unwrap_err();
        assert_eq!(err.kind, UnifyErrorKind::MissingField);
        assert_eq!(err.detail.as_deref(), Some("missing field `y`"));
    }

    #[test]
    fn open_record_tolerates_extra_fields() {
        let open = type_record([("x".to_string(), Type::var(1))], true);
        let full = type_record(
            [
                ("x".to_string(), Type::int()),
                ("y".to_string(), Type::str()),
            ],
            false,
        );
        let subst = unify(&open, &full).unwrap();
        assert_eq!(subst.apply(&Type::var(1)), Type::int());
    }

    #[test]
    fn refinements_are_transparent() {
        let pos = type_refined(
            Type::int(),
            "x",
            Predicate::compare(CompareOp::Gt, Term::var("x"), Term::int(0)),
        );
        assert!(unify(&pos, &Type::int()).is_ok());
        assert!(unify(&Type::var(1), &pos).is_ok());
    }
}
