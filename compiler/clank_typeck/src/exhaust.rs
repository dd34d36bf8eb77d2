//! Pattern-match coverage analysis.
//!
//! Works directly over the source arms against the resolved scrutinee type:
//!
//! - Guarded arms are excluded from coverage (the guard may fail).
//! - A wildcard or bare identifier is a catch-all.
//! - Sum types compare declared variants against covered variant names.
//! - `Bool` needs both literals; `Unit` needs any arm; tuples need a
//!   catch-all (product coverage is intentionally not attempted); every
//!   other type needs a catch-all.
//!
//! Missing patterns carry enough structure for the repair generator to
//! synthesize concrete arms.

use clank_diagnostic::MissingPattern;
use clank_ir::{Literal, MatchArm, PatternKind};
use clank_types::{prim, Type, TypeContext, TypeDef};

/// Result of coverage analysis for one `match`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchCoverage {
    pub exhaustive: bool,
    pub missing: Vec<MissingPattern>,
    pub has_catch_all: bool,
}

impl MatchCoverage {
    fn exhaustive(has_catch_all: bool) -> Self {
        MatchCoverage {
            exhaustive: true,
            missing: Vec::new(),
            has_catch_all,
        }
    }

    fn missing(missing: Vec<MissingPattern>) -> Self {
        MatchCoverage {
            exhaustive: missing.is_empty(),
            missing,
            has_catch_all: false,
        }
    }
}

/// Check whether `arms` cover every inhabitant of `scrutinee`.
///
/// `scrutinee` should already have the ambient substitution applied; alias
/// and application resolution happens here against `ctx`.
pub fn check_match_coverage(
    arms: &[MatchArm],
    scrutinee: &Type,
    ctx: &TypeContext,
) -> MatchCoverage {
    // Arms with guards may fail at runtime; only unguarded arms count.
    let unguarded: Vec<&MatchArm> = arms.iter().filter(|arm| arm.guard.is_none()).collect();

    if unguarded.iter().any(|arm| arm.pattern.is_catch_all()) {
        return MatchCoverage::exhaustive(true);
    }

    let resolved = resolve_scrutinee(scrutinee, ctx);

    match &resolved {
        Type::Con { name } if name == prim::BOOL => check_bool(&unguarded),
        Type::Con { name } if name == prim::UNIT => check_unit(&unguarded),
        Type::Con { name } | Type::App { ctor: name, .. } => {
            match ctx.lookup_type(name) {
                Some(TypeDef::Sum { variants, .. }) => {
                    check_sum(&unguarded, name, variants)
                }
                // Alias chains were already expanded by `resolve_scrutinee`;
                // anything else is not enumerable.
                _ => not_enumerable(),
            }
        }
        // Tuples: full product analysis is not attempted; require a
        // catch-all.
        Type::Tuple { .. } => not_enumerable(),
        _ => not_enumerable(),
    }
}

/// Expand refinements and alias chains to the underlying nominal type.
fn resolve_scrutinee(ty: &Type, ctx: &TypeContext) -> Type {
    let mut current = ty.get_base().clone();
    // Alias chains are finite in well-formed programs; the cap guards
    // against cyclic definitions that slipped past declaration checks.
    for _ in 0..32 {
        let name = match &current {
            Type::Con { name } => name.clone(),
            _ => break,
        };
        match ctx.lookup_type(&name) {
            Some(TypeDef::Alias { ty, params, .. }) if params.is_empty() => {
                current = ty.get_base().clone();
            }
            _ => break,
        }
    }
    current
}

fn check_bool(unguarded: &[&MatchArm]) -> MatchCoverage {
    let mut has_true = false;
    let mut has_false = false;
    for arm in unguarded {
        if let PatternKind::Literal {
            value: Literal::Bool { value },
        } = &arm.pattern.kind
        {
            if *value {
                has_true = true;
            } else {
                has_false = true;
            }
        }
    }
    let mut missing = Vec::new();
    if !has_true {
        missing.push(literal_missing("true", prim::BOOL));
    }
    if !has_false {
        missing.push(literal_missing("false", prim::BOOL));
    }
    MatchCoverage::missing(missing)
}

fn check_unit(unguarded: &[&MatchArm]) -> MatchCoverage {
    if unguarded.is_empty() {
        MatchCoverage::missing(vec![literal_missing("()", prim::UNIT)])
    } else {
        MatchCoverage::exhaustive(false)
    }
}

fn check_sum(
    unguarded: &[&MatchArm],
    type_name: &str,
    variants: &[clank_types::VariantInfo],
) -> MatchCoverage {
    let covered: Vec<&str> = unguarded
        .iter()
        .filter_map(|arm| match &arm.pattern.kind {
            PatternKind::Variant { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect();

    let missing: Vec<MissingPattern> = variants
        .iter()
        .filter(|variant| !covered.contains(&variant.name.as_str()))
        .map(|variant| {
            let has_payload = !variant.fields.is_empty();
            let description = if has_payload {
                let wildcards = vec!["_"; variant.fields.len()].join(", ");
                format!("{}({wildcards})", variant.name)
            } else {
                variant.name.clone()
            };
            MissingPattern {
                description,
                variant_name: Some(variant.name.clone()),
                type_name: Some(type_name.to_string()),
                has_payload,
                field_names: variant.field_names.clone().unwrap_or_default(),
            }
        })
        .collect();

    MatchCoverage::missing(missing)
}

/// Types with unenumerable inhabitants (`Int`, `Str`, tuples, functions).
fn not_enumerable() -> MatchCoverage {
    MatchCoverage::missing(vec![MissingPattern {
        description: "_".to_string(),
        variant_name: None,
        type_name: None,
        has_payload: false,
        field_names: vec![],
    }])
}

fn literal_missing(description: &str, type_name: &str) -> MissingPattern {
    MissingPattern {
        description: description.to_string(),
        variant_name: None,
        type_name: Some(type_name.to_string()),
        has_payload: false,
        field_names: vec![],
    }
}
