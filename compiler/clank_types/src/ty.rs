//! Semantic types.
//!
//! Types are immutable values: constructors are pure, substitution returns
//! new values, and nothing in this module mutates a type in place. Equality
//! is structural; a type variable's display name is presentation-only and
//! ignored by comparison.

use std::collections::BTreeMap;
use std::fmt;

use rustc_hash::FxHashSet;

use crate::refine::Predicate;
use crate::EffectSet;

/// Identifier of a type variable, unique within one compilation.
pub type TypeVarId = u32;

/// Names of the built-in primitive constructors.
pub mod prim {
    pub const INT: &str = "Int";
    pub const INT32: &str = "Int32";
    pub const INT64: &str = "Int64";
    pub const NAT: &str = "Nat";
    pub const FLOAT: &str = "Float";
    pub const BOOL: &str = "Bool";
    pub const STR: &str = "Str";
    pub const UNIT: &str = "Unit";
}

/// A semantic type.
#[derive(Clone, Debug, Eq)]
pub enum Type {
    /// Unification variable. The display name is presentation-only.
    Var {
        id: TypeVarId,
        name: Option<String>,
    },
    /// A named constructor: a primitive or a user-defined nullary type.
    Con { name: String },
    /// A constructor applied to arguments, e.g. `Option[Int]`.
    App { ctor: String, args: Vec<Type> },
    /// Function type with an effect set.
    Fn {
        params: Vec<Type>,
        ret: Box<Type>,
        effects: EffectSet,
    },
    Tuple {
        elems: Vec<Type>,
    },
    Array {
        elem: Box<Type>,
    },
    /// Record with width subtyping when `is_open`.
    Record {
        fields: BTreeMap<String, Type>,
        is_open: bool,
    },
    /// Base type constrained by a predicate over a bound variable.
    Refined {
        base: Box<Type>,
        var: String,
        pred: Predicate,
    },
    /// Bottom type; unifies with anything.
    Never,
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Var { id: a, .. }, Type::Var { id: b, .. }) => a == b,
            (Type::Con { name: a }, Type::Con { name: b }) => a == b,
            (
                Type::App { ctor: c1, args: a1 },
                Type::App { ctor: c2, args: a2 },
            ) => c1 == c2 && a1 == a2,
            (
                Type::Fn {
                    params: p1,
                    ret: r1,
                    effects: e1,
                },
                Type::Fn {
                    params: p2,
                    ret: r2,
                    effects: e2,
                },
            ) => p1 == p2 && r1 == r2 && e1 == e2,
            (Type::Tuple { elems: a }, Type::Tuple { elems: b }) => a == b,
            (Type::Array { elem: a }, Type::Array { elem: b }) => a == b,
            (
                Type::Record {
                    fields: f1,
                    is_open: o1,
                },
                Type::Record {
                    fields: f2,
                    is_open: o2,
                },
            ) => o1 == o2 && f1 == f2,
            (
                Type::Refined {
                    base: b1,
                    var: v1,
                    pred: p1,
                },
                Type::Refined {
                    base: b2,
                    var: v2,
                    pred: p2,
                },
            ) => b1 == b2 && v1 == v2 && p1 == p2,
            (Type::Never, Type::Never) => true,
            _ => false,
        }
    }
}

// ── Constructors ──────────────────────────────────────────────

/// Named type constructor (primitive or user nullary type).
pub fn type_con(name: impl Into<String>) -> Type {
    Type::Con { name: name.into() }
}

/// Constructor application, e.g. `type_app("Option", vec![Type::int()])`.
pub fn type_app(ctor: impl Into<String>, args: Vec<Type>) -> Type {
    Type::App {
        ctor: ctor.into(),
        args,
    }
}

/// Pure function type.
pub fn type_fn(params: Vec<Type>, ret: Type) -> Type {
    Type::Fn {
        params: params.into(),
        ret: Box::new(ret),
        effects: EffectSet::empty(),
    }
}

/// Function type with effects.
pub fn type_fn_effects(params: Vec<Type>, ret: Type, effects: EffectSet) -> Type {
    Type::Fn {
        params: params.into(),
        ret: Box::new(ret),
        effects,
    }
}

pub fn type_tuple(elems: Vec<Type>) -> Type {
    Type::Tuple { elems }
}

pub fn type_array(elem: Type) -> Type {
    Type::Array {
        elem: Box::new(elem),
    }
}

pub fn type_record(fields: impl IntoIterator<Item = (String, Type)>, is_open: bool) -> Type {
    Type::Record {
        fields: fields.into_iter().collect(),
        is_open,
    }
}

pub fn type_refined(base: Type, var: impl Into<String>, pred: Predicate) -> Type {
    Type::Refined {
        base: Box::new(base),
        var: var.into(),
        pred,
    }
}

impl Type {
    pub fn int() -> Type {
        type_con(prim::INT)
    }

    pub fn int32() -> Type {
        type_con(prim::INT32)
    }

    pub fn int64() -> Type {
        type_con(prim::INT64)
    }

    pub fn nat() -> Type {
        type_con(prim::NAT)
    }

    pub fn float() -> Type {
        type_con(prim::FLOAT)
    }

    pub fn bool() -> Type {
        type_con(prim::BOOL)
    }

    pub fn str() -> Type {
        type_con(prim::STR)
    }

    pub fn unit() -> Type {
        type_con(prim::UNIT)
    }

    pub fn var(id: TypeVarId) -> Type {
        Type::Var { id, name: None }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Strip refinements recursively, returning the underlying base type.
    pub fn get_base(&self) -> &Type {
        match self {
            Type::Refined { base, .. } => base.get_base(),
            other => other,
        }
    }

    /// Whether this is a numeric type (after stripping refinements).
    pub fn is_numeric(&self) -> bool {
        matches!(
            self.get_base(),
            Type::Con { name } if matches!(
                name.as_str(),
                prim::INT | prim::INT32 | prim::INT64 | prim::NAT | prim::FLOAT
            )
        )
    }

    /// Whether this is an integer type (after stripping refinements).
    pub fn is_integer(&self) -> bool {
        matches!(
            self.get_base(),
            Type::Con { name } if matches!(
                name.as_str(),
                prim::INT | prim::INT32 | prim::INT64 | prim::NAT
            )
        )
    }

    /// Whether this is a bare named constructor with the given name.
    pub fn is_con(&self, name: &str) -> bool {
        matches!(self.get_base(), Type::Con { name: n } if n == name)
    }

    /// The set of type-variable ids reachable in this type.
    pub fn free_type_vars(&self) -> FxHashSet<TypeVarId> {
        let mut vars = FxHashSet::default();
        self.collect_free_vars(&mut vars);
        vars
    }

    fn collect_free_vars(&self, vars: &mut FxHashSet<TypeVarId>) {
        match self {
            Type::Var { id, .. } => {
                vars.insert(*id);
            }
            Type::Con { .. } | Type::Never => {}
            Type::App { args, .. } => {
                for arg in args {
                    arg.collect_free_vars(vars);
                }
            }
            Type::Fn { params, ret, .. } => {
                for param in params {
                    param.collect_free_vars(vars);
                }
                ret.collect_free_vars(vars);
            }
            Type::Tuple { elems } => {
                for elem in elems {
                    elem.collect_free_vars(vars);
                }
            }
            Type::Array { elem } => elem.collect_free_vars(vars),
            Type::Record { fields, .. } => {
                for field in fields.values() {
                    field.collect_free_vars(vars);
                }
            }
            Type::Refined { base, .. } => base.collect_free_vars(vars),
        }
    }
}

/// Structural type equality.
///
/// Refined types are equal iff their bases are equal and their predicates
/// are syntactically equal. Variable display names are ignored.
pub fn types_equal(a: &Type, b: &Type) -> bool {
    a == b
}

// ── Formatting ────────────────────────────────────────────────

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Var { id, name } => match name {
                Some(name) => write!(f, "{name}"),
                None => write!(f, "${id}"),
            },
            Type::Con { name } => f.write_str(name),
            Type::App { ctor, args } => {
                write!(f, "{ctor}[")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str("]")
            }
            Type::Fn {
                params,
                ret,
                effects,
            } => {
                f.write_str("fn(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ") -> {ret}")?;
                if !effects.is_empty() {
                    write!(f, " ! {effects}")?;
                }
                Ok(())
            }
            Type::Tuple { elems } => {
                f.write_str("(")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{elem}")?;
                }
                f.write_str(")")
            }
            Type::Array { elem } => write!(f, "[{elem}]"),
            Type::Record { fields, is_open } => {
                f.write_str("{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {ty}")?;
                }
                if *is_open {
                    if !fields.is_empty() {
                        f.write_str(", ")?;
                    }
                    f.write_str("..")?;
                }
                f.write_str("}")
            }
            Type::Refined { base, pred, .. } => write!(f, "{base}{{{pred}}}"),
            Type::Never => f.write_str("Never"),
        }
    }
}

/// Fresh type-variable generator.
///
/// Owned by the compiler instance; created fresh at compile start, which is
/// what resets the counter between runs.
#[derive(Debug, Default)]
pub struct TypeVarGen {
    next: TypeVarId,
}

impl TypeVarGen {
    pub fn new() -> Self {
        TypeVarGen::default()
    }

    /// Allocate a fresh anonymous variable.
    pub fn fresh(&mut self) -> Type {
        let id = self.next;
        self.next += 1;
        Type::Var { id, name: None }
    }

    /// Allocate a fresh variable with a display name.
    pub fn fresh_named(&mut self, name: impl Into<String>) -> Type {
        let id = self.next;
        self.next += 1;
        Type::Var {
            id,
            name: Some(name.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refine::{CompareOp, Term};
    use pretty_assertions::assert_eq;

    #[test]
    fn var_equality_ignores_display_name() {
        let a = Type::Var {
            id: 3,
            name: Some("T".to_string()),
        };
        let b = Type::Var { id: 3, name: None };
        assert_eq!(a, b);
        assert_ne!(a, Type::var(4));
    }

    #[test]
    fn refined_equality_requires_same_predicate() {
        let gt0 = Predicate::compare(CompareOp::Gt, Term::var("x"), Term::int(0));
        let ge0 = Predicate::compare(CompareOp::Ge, Term::var("x"), Term::int(0));
        let a = type_refined(Type::int(), "x", gt0.clone());
        let b = type_refined(Type::int(), "x", gt0);
        let c = type_refined(Type::int(), "x", ge0);
        assert!(types_equal(&a, &b));
        assert!(!types_equal(&a, &c));
    }

    #[test]
    fn get_base_strips_nested_refinements() {
        let gt0 = Predicate::compare(CompareOp::Gt, Term::var("x"), Term::int(0));
        let lt9 = Predicate::compare(CompareOp::Lt, Term::var("x"), Term::int(9));
        let nested = type_refined(type_refined(Type::int(), "x", gt0), "x", lt9);
        assert_eq!(nested.get_base(), &Type::int());
        assert!(nested.is_numeric());
        assert!(nested.is_integer());
    }

    #[test]
    fn numeric_classification() {
        assert!(Type::int().is_numeric());
        assert!(Type::nat().is_numeric());
        assert!(Type::float().is_numeric());
        assert!(!Type::float().is_integer());
        assert!(!Type::bool().is_numeric());
        assert!(!Type::str().is_integer());
    }

    #[test]
    fn free_vars_reach_all_positions() {
        let ty = type_fn(
            vec![Type::var(1), type_array(Type::var(2))],
            type_tuple(vec![Type::var(3), Type::int()]),
        );
        let vars = ty.free_type_vars();
        assert_eq!(vars.len(), 3);
        assert!(vars.contains(&1) && vars.contains(&2) && vars.contains(&3));
    }

    #[test]
    fn display_forms() {
        assert_eq!(type_app("Option", vec![Type::int()]).to_string(), "Option[Int]");
        assert_eq!(
            type_fn(vec![Type::int(), Type::str()], Type::bool()).to_string(),
            "fn(Int, Str) -> Bool"
        );
        assert_eq!(type_array(Type::int()).to_string(), "[Int]");
        let refined = type_refined(
            Type::int(),
            "x",
            Predicate::compare(CompareOp::Gt, Term::var("x"), Term::int(0)),
        );
        assert_eq!(refined.to_string(), "Int{x > 0}");
        let io_fn = type_fn_effects(vec![Type::str()], Type::unit(), EffectSet::singleton("IO"));
        assert_eq!(io_fn.to_string(), "fn(Str) -> Unit ! {IO}");
    }

    #[test]
    fn fresh_vars_are_distinct() {
        let mut gen = TypeVarGen::new();
        let a = gen.fresh();
        let b = gen.fresh();
        assert_ne!(a, b);
    }
}
