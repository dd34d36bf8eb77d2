//! Type-variable substitutions.
//!
//! A [`Substitution`] is an immutable mapping from variable ids to types.
//! `apply` resolves chains transitively: if `$1 -> $2` and `$2 -> Int`,
//! applying to `$1` yields `Int`. `compose` has `s1 ∘ s2` semantics, so
//! `compose(s1, s2).apply(t) == s1.apply(&s2.apply(t))` for every `t`.

use rustc_hash::FxHashMap;

use crate::{Type, TypeVarId};

/// A finite map from type-variable ids to types.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Substitution {
    map: FxHashMap<TypeVarId, Type>,
}

impl Substitution {
    /// The empty substitution.
    pub fn empty() -> Self {
        Substitution::default()
    }

    /// A substitution binding a single variable.
    pub fn singleton(id: TypeVarId, ty: Type) -> Self {
        let mut map = FxHashMap::default();
        map.insert(id, ty);
        Substitution { map }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn get(&self, id: TypeVarId) -> Option<&Type> {
        self.map.get(&id)
    }

    /// Apply this substitution to a type, resolving variable chains to a
    /// fixed point.
    pub fn apply(&self, ty: &Type) -> Type {
        if self.map.is_empty() {
            return ty.clone();
        }
        match ty {
            Type::Var { id, .. } => match self.map.get(id) {
                // Resolve chains: the replacement may itself mention
                // substituted variables.
                Some(replacement) => self.apply(replacement),
                None => ty.clone(),
            },
            Type::Con { .. } | Type::Never => ty.clone(),
            Type::App { ctor, args } => Type::App {
                ctor: ctor.clone(),
                args: args.iter().map(|a| self.apply(a)).collect(),
            },
            Type::Fn {
                params,
                ret,
                effects,
            } => Type::Fn {
                params: params.iter().map(|p| self.apply(p)).collect::<Vec<_>>(),
                ret: Box::new(self.apply(ret)),
                effects: effects.clone(),
            },
            Type::Tuple { elems } => Type::Tuple {
                elems: elems.iter().map(|e| self.apply(e)).collect(),
            },
            Type::Array { elem } => Type::Array {
                elem: Box::new(self.apply(elem)),
            },
            Type::Record { fields, is_open } => Type::Record {
                fields: fields
                    .iter()
                    .map(|(name, field)| (name.clone(), self.apply(field)))
                    .collect(),
                is_open: *is_open,
            },
            Type::Refined { base, var, pred } => Type::Refined {
                base: Box::new(self.apply(base)),
                var: var.clone(),
                pred: pred.clone(),
            },
        }
    }

    /// Compose with another substitution: `self ∘ other`.
    ///
    /// Applies `self` to every value of `other`, then unions in bindings of
    /// `self` absent from `other`.
    #[must_use]
    pub fn compose(&self, other: &Substitution) -> Substitution {
        let mut map: FxHashMap<TypeVarId, Type> = other
            .map
            .iter()
            .map(|(&id, ty)| (id, self.apply(ty)))
            .collect();
        for (&id, ty) in &self.map {
            map.entry(id).or_insert_with(|| ty.clone());
        }
        Substitution { map }
    }
}

impl FromIterator<(TypeVarId, Type)> for Substitution {
    fn from_iter<I: IntoIterator<Item = (TypeVarId, Type)>>(iter: I) -> Self {
        Substitution {
            map: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{type_array, type_fn};
    use pretty_assertions::assert_eq;

    #[test]
    fn apply_resolves_chains() {
        // $1 -> $2, $2 -> Int: applying to $1 reaches Int.
        let subst: Substitution =
            [(1, Type::var(2)), (2, Type::int())].into_iter().collect();
        assert_eq!(subst.apply(&Type::var(1)), Type::int());
    }

    #[test]
    fn apply_descends_into_structure() {
        let subst = Substitution::singleton(1, Type::int());
        let ty = type_fn(vec![Type::var(1)], type_array(Type::var(1)));
        assert_eq!(
            subst.apply(&ty),
            type_fn(vec![Type::int()], type_array(Type::int()))
        );
    }

    #[test]
    fn apply_is_identity_on_unbound() {
        let subst = Substitution::singleton(1, Type::int());
        assert_eq!(subst.apply(&Type::var(9)), Type::var(9));
    }

    #[test]
    fn compose_law() {
        // compose(s1, s2).apply == s1.apply ∘ s2.apply
        let s1 = Substitution::singleton(2, Type::int());
        let s2 = Substitution::singleton(1, Type::var(2));
        let composed = s1.compose(&s2);

        for ty in [Type::var(1), Type::var(2), type_array(Type::var(1))] {
            assert_eq!(composed.apply(&ty), s1.apply(&s2.apply(&ty)));
        }
    }

    #[test]
    fn compose_prefers_inner_binding_for_shared_keys() {
        // If both bind $1, the `other` (inner) binding wins after rewriting.
        let s1 = Substitution::singleton(1, Type::int());
        let s2 = Substitution::singleton(1, Type::str());
        let composed = s1.compose(&s2);
        assert_eq!(composed.apply(&Type::var(1)), Type::str());
    }

    #[test]
    fn applied_result_is_fixed_point() {
        let subst: Substitution = [(1, Type::var(2)), (2, type_array(Type::int()))]
            .into_iter()
            .collect();
        let once = subst.apply(&Type::var(1));
        assert_eq!(subst.apply(&once), once);
    }
}
