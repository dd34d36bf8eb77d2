//! Effect sets on function types.
//!
//! Effects are open-ended names (`IO`, `Err`, user-defined). Checking is a
//! subset test against the ambient function's declaration; there is no
//! effect-row inference.

use std::collections::BTreeSet;
use std::fmt;

/// An ordered set of effect names.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct EffectSet(BTreeSet<String>);

impl EffectSet {
    /// The empty (pure) effect set.
    pub fn empty() -> Self {
        EffectSet::default()
    }

    /// A set containing one effect.
    pub fn singleton(effect: impl Into<String>) -> Self {
        let mut set = BTreeSet::new();
        set.insert(effect.into());
        EffectSet(set)
    }

    /// Build from declared effect names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EffectSet(names.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, effect: &str) -> bool {
        self.0.contains(effect)
    }

    pub fn insert(&mut self, effect: impl Into<String>) {
        self.0.insert(effect.into());
    }

    /// Whether every effect in `self` is allowed by `other`.
    pub fn is_subset(&self, other: &EffectSet) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Effects in `self` missing from `other`, in order.
    pub fn missing_from(&self, other: &EffectSet) -> Vec<String> {
        self.0.difference(&other.0).cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for EffectSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, effect) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(effect)?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subset_and_missing() {
        let declared = EffectSet::from_names(["IO"]);
        let required = EffectSet::from_names(["IO", "Err"]);
        assert!(declared.is_subset(&required));
        assert!(!required.is_subset(&declared));
        assert_eq!(required.missing_from(&declared), vec!["Err".to_string()]);
    }

    #[test]
    fn display_is_sorted() {
        let set = EffectSet::from_names(["IO", "Err"]);
        assert_eq!(set.to_string(), "{Err, IO}");
    }
}
