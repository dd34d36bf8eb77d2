//! Type schemes and instantiation.
//!
//! Quantified parameters are recorded by name; the scheme body refers to
//! them as named constructors (`Con("T")`). Instantiation substitutes each
//! quantified name with a fresh type variable carrying that display name.

use rustc_hash::FxHashMap;

use crate::{Type, TypeVarGen};

/// A (possibly) polymorphic type: `∀ params. ty`.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeScheme {
    pub params: Vec<String>,
    pub ty: Type,
}

impl TypeScheme {
    /// A monomorphic scheme.
    pub fn mono(ty: Type) -> Self {
        TypeScheme {
            params: Vec::new(),
            ty,
        }
    }

    /// A polymorphic scheme over the given parameter names.
    pub fn poly<I, S>(params: I, ty: Type) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TypeScheme {
            params: params.into_iter().map(Into::into).collect(),
            ty,
        }
    }

    pub fn is_mono(&self) -> bool {
        self.params.is_empty()
    }

    /// Instantiate, replacing each quantified name with a fresh variable.
    pub fn instantiate(&self, gen: &mut TypeVarGen) -> Type {
        if self.params.is_empty() {
            return self.ty.clone();
        }
        let fresh: FxHashMap<&str, Type> = self
            .params
            .iter()
            .map(|name| (name.as_str(), gen.fresh_named(name)))
            .collect();
        substitute_named(&self.ty, &fresh)
    }
}

/// Replace named constructors appearing in `map` with their replacements.
fn substitute_named(ty: &Type, map: &FxHashMap<&str, Type>) -> Type {
    match ty {
        Type::Con { name } => match map.get(name.as_str()) {
            Some(replacement) => replacement.clone(),
            None => ty.clone(),
        },
        Type::Var { .. } | Type::Never => ty.clone(),
        Type::App { ctor, args } => Type::App {
            ctor: ctor.clone(),
            args: args.iter().map(|a| substitute_named(a, map)).collect(),
        },
        Type::Fn {
            params,
            ret,
            effects,
        } => Type::Fn {
            params: params.iter().map(|p| substitute_named(p, map)).collect(),
            ret: Box::new(substitute_named(ret, map)),
            effects: effects.clone(),
        },
        Type::Tuple { elems } => Type::Tuple {
            elems: elems.iter().map(|e| substitute_named(e, map)).collect(),
        },
        Type::Array { elem } => Type::Array {
            elem: Box::new(substitute_named(elem, map)),
        },
        Type::Record { fields, is_open } => Type::Record {
            fields: fields
                .iter()
                .map(|(name, field)| (name.clone(), substitute_named(field, map)))
                .collect(),
            is_open: *is_open,
        },
        Type::Refined { base, var, pred } => Type::Refined {
            base: Box::new(substitute_named(base, map)),
            var: var.clone(),
            pred: pred.clone(),
        },
    }
}

/// Substitute named type parameters in a type (used when expanding aliases
/// and constructing variant constructor types at a use site).
pub fn substitute_params(ty: &Type, params: &[String], args: &[Type]) -> Type {
    let map: FxHashMap<&str, Type> = params
        .iter()
        .map(String::as_str)
        .zip(args.iter().cloned())
        .collect();
    substitute_named(ty, &map)
}
