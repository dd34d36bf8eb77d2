//! Type system for the Clank compiler.
//!
//! Contents:
//! - The semantic [`Type`] universe and refinement [`Predicate`]/[`Term`]
//!   language, with canonical formatting and parsing.
//! - [`Substitution`] and [`unify`]: pure Hindley-Milner unification with
//!   occurs check, `Never` as bottom, and open-record width subtyping.
//! - [`TypeScheme`] instantiation for let-polymorphism.
//! - The scoped [`TypeContext`] with type definitions and built-ins.

mod builtins;
mod context;
mod effects;
mod parse;
pub mod refine;
mod scheme;
mod subst;
mod ty;
mod unify;

pub use builtins::register_builtins;
pub use context::{find_fields, Binding, BindingSource, TypeContext, TypeDef, VariantInfo};
pub use effects::EffectSet;
pub use parse::{parse_predicate, parse_term, PredParseError};
pub use refine::{ArithOp, CompareOp, Predicate, Term};
pub use scheme::{substitute_params, TypeScheme};
pub use subst::Substitution;
pub use ty::{
    prim, type_app, type_array, type_con, type_fn, type_fn_effects, type_record, type_refined,
    type_tuple, types_equal, Type, TypeVarGen, TypeVarId,
};
pub use unify::{unify, UnifyError, UnifyErrorKind};
