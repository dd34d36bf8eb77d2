//! Lowering syntactic type expressions to semantic types.

use clank_diagnostic::{Diagnostic, ErrorCode, Structured};
use clank_ir::TypeExpr;
use clank_types::{
    prim, type_app, type_array, type_fn_effects, type_record, type_refined, type_tuple,
    EffectSet, Type, TypeDef,
};

use crate::{lower_predicate, TypeChecker};

const PRIMITIVES: &[&str] = &[
    prim::INT,
    prim::INT32,
    prim::INT64,
    prim::NAT,
    prim::FLOAT,
    prim::BOOL,
    prim::STR,
    prim::UNIT,
];

impl TypeChecker {
    /// Resolve a type expression against the current context.
    pub(crate) fn lower_type_expr(&mut self, ty: &TypeExpr) -> Type {
        match ty {
            TypeExpr::Name { name, args, span } => {
                if let Some(bound) = self.ctx.lookup_type_param(name).cloned() {
                    if !args.is_empty() {
                        self.type_param_arity_error(name, 0, args.len(), span);
                    }
                    return bound;
                }
                if name == "Never" {
                    return Type::Never;
                }
                if PRIMITIVES.contains(&name.as_str()) {
                    if !args.is_empty() {
                        self.type_param_arity_error(name, 0, args.len(), span);
                    }
                    return clank_types::type_con(name);
                }

                let known_params = self
                    .ctx
                    .lookup_type(name)
                    .map(|def| def.params().len())
                    .or_else(|| self.declared_types.contains(name).then_some(args.len()));

                match known_params {
                    Some(expected) => {
                        if expected != args.len() {
                            self.type_param_arity_error(name, expected, args.len(), span);
                        }
                        let lowered: Vec<Type> =
                            args.iter().map(|a| self.lower_type_expr(a)).collect();
                        if lowered.is_empty() {
                            clank_types::type_con(name)
                        } else {
                            type_app(name, lowered)
                        }
                    }
                    None => {
                        let mut candidates = self.ctx.visible_type_names();
                        candidates.extend(PRIMITIVES.iter().map(ToString::to_string));
                        let similar = clank_diagnostic::find_similar(name, &candidates);
                        let mut diagnostic = Diagnostic::new(
                            ErrorCode::E1005,
                            format!("unresolved type `{name}`"),
                            span.clone(),
                        )
                        .with_structured(
                            Structured::new("unresolved_type")
                                .with_name(name)
                                .with_similar_types(similar),
                        );
                        if let Some(node) = self.anchor {
                            diagnostic = diagnostic.with_node(node);
                        }
                        self.emit(diagnostic);
                        self.fresh()
                    }
                }
            }
            TypeExpr::Fn {
                params,
                ret,
                effects,
                ..
            } => {
                let params: Vec<Type> = params.iter().map(|p| self.lower_type_expr(p)).collect();
                let ret = self.lower_type_expr(ret);
                type_fn_effects(params, ret, EffectSet::from_names(effects.clone()))
            }
            TypeExpr::Tuple { elems, .. } => {
                type_tuple(elems.iter().map(|e| self.lower_type_expr(e)).collect())
            }
            TypeExpr::Array { elem, .. } => type_array(self.lower_type_expr(elem)),
            TypeExpr::Record {
                fields, is_open, ..
            } => type_record(
                fields
                    .iter()
                    .map(|f| (f.name.clone(), self.lower_type_expr(&f.ty))),
                *is_open,
            ),
            TypeExpr::Refined {
                base, var, pred, ..
            } => {
                let base = self.lower_type_expr(base);
                // The annotation's predicate is an ordinary expression over
                // the bound variable; outside the predicate language it
                // degrades to an uninterpreted `unknown`.
                let pred = lower_predicate(pred).unwrap_or_else(|| {
                    clank_types::Predicate::Unknown("unsupported refinement expression".to_string())
                });
                type_refined(base, var, pred)
            }
        }
    }

    fn type_param_arity_error(
        &mut self,
        name: &str,
        expected: usize,
        found: usize,
        span: &clank_ir::Span,
    ) {
        let mut diagnostic = Diagnostic::new(
            ErrorCode::E2017,
            format!("`{name}` takes {expected} type parameter(s), but {found} were supplied"),
            span.clone(),
        )
        .with_structured(
            Structured::new("type_param_mismatch")
                .with_name(name)
                .with_arity(expected, found),
        );
        if let Some(node) = self.anchor {
            diagnostic = diagnostic.with_node(node);
        }
        self.emit(diagnostic);
    }

    /// Resolve a type to its nominal shape: apply the ambient substitution,
    /// strip refinements, and expand alias chains.
    pub(crate) fn resolve_nominal(&self, ty: &Type) -> Type {
        let mut current = self.apply(ty).get_base().clone();
        for _ in 0..32 {
            let Type::Con { name } = &current else {
                break;
            };
            match self.ctx.lookup_type(name) {
                Some(TypeDef::Alias { ty, params, .. }) if params.is_empty() => {
                    current = ty.get_base().clone();
                }
                _ => break,
            }
        }
        current
    }
}
