//! Statement checking and pattern binding.

use clank_diagnostic::{Diagnostic, ErrorCode, ObligationKind, Structured};
use clank_ir::{Expr, ExprKind, Literal, Pattern, PatternKind, Stmt, StmtKind};
use clank_types::{
    substitute_params, type_array, type_tuple, Binding, BindingSource, Term, Type, TypeDef,
    TypeScheme,
};

use crate::{expr_to_term, lower_predicate, substitute_pred_var, TypeChecker};

impl TypeChecker {
    pub(crate) fn check_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Let {
                pattern,
                mutable,
                ty,
                init,
            } => self.check_let(stmt, pattern, *mutable, ty.as_ref(), init),
            StmtKind::Assign { target, value } => self.check_assign(stmt, target, value),
            StmtKind::For {
                pattern,
                iter,
                body,
            } => {
                let iter_ty = self.infer_expr(iter);
                let resolved = self.resolve_nominal(&iter_ty);
                let elem = match &resolved {
                    Type::Array { elem } => elem.as_ref().clone(),
                    Type::Var { .. } => {
                        let elem = self.fresh();
                        let expected = type_array(elem.clone());
                        self.unify_at(&expected, &iter_ty, &iter.span, iter.id);
                        elem
                    }
                    other => {
                        self.emit(
                            Diagnostic::new(
                                ErrorCode::E2010,
                                format!("`for` needs an array, found `{other}`"),
                                iter.span.clone(),
                            )
                            .with_node(iter.id)
                            .with_structured(
                                Structured::new("not_iterable")
                                    .with_types("array", other.to_string()),
                            ),
                        );
                        self.fresh()
                    }
                };
                self.ctx.push_scope();
                self.rctx.push_scope();
                self.bind_pattern(pattern, &elem);
                self.infer_block(body);
                self.rctx.pop_scope();
                let unused = self.ctx.pop_scope();
                self.report_unused(unused);
            }
            StmtKind::While { cond, body } => {
                self.check_expr(cond, &Type::bool(), ObligationKind::Refinement);
                // Inside the loop body the condition is known to hold.
                match lower_predicate(cond) {
                    Some(pred) => self.rctx.with_fact(pred, "while condition"),
                    None => self.rctx.push_scope(),
                }
                self.infer_block(body);
                self.rctx.pop_scope();
            }
            StmtKind::Return { value } => {
                let Some(current) = &self.current_fn else {
                    self.emit(
                        Diagnostic::new(
                            ErrorCode::E2014,
                            "`return` outside of a function",
                            stmt.span.clone(),
                        )
                        .with_node(stmt.id),
                    );
                    if let Some(value) = value {
                        self.infer_expr(value);
                    }
                    return;
                };
                let ret = current.ret.clone();
                match value {
                    Some(value) => {
                        self.check_expr(value, &ret, ObligationKind::Postcondition);
                    }
                    None => {
                        self.unify_at(&ret, &Type::unit(), &stmt.span, stmt.id);
                    }
                }
            }
            StmtKind::Assert { cond } => {
                self.check_expr(cond, &Type::bool(), ObligationKind::Refinement);
                if let Some(pred) = lower_predicate(cond) {
                    // A statically refuted assertion is an error; otherwise
                    // the assertion becomes a fact downstream (it panics at
                    // runtime if false).
                    match clank_solver::solve_with_config(&pred, &self.rctx, &self.solver_config)
                    {
                        clank_solver::SolveResult::Refuted { counterexample } => {
                            self.emit(
                                Diagnostic::new(
                                    ErrorCode::E3004,
                                    format!("assertion `{pred}` is provably false"),
                                    stmt.span.clone(),
                                )
                                .with_node(stmt.id)
                                .with_structured(
                                    Structured::new("assertion_refuted")
                                        .with_predicate(pred.to_string())
                                        .with_counterexample(counterexample),
                                ),
                            );
                        }
                        _ => self.rctx.add_fact(pred, "assert"),
                    }
                }
            }
            StmtKind::Expr { expr } => {
                self.infer_expr(expr);
            }
        }
    }

    fn check_let(
        &mut self,
        stmt: &Stmt,
        pattern: &Pattern,
        mutable: bool,
        annotation: Option<&clank_ir::TypeExpr>,
        init: &Expr,
    ) {
        let bound_ty = match annotation {
            Some(annotation) => {
                let outer_anchor = self.anchor;
                self.anchor = Some(stmt.id);
                let expected = self.lower_type_expr(annotation);
                self.anchor = outer_anchor;
                self.check_expr(init, &expected, ObligationKind::Refinement);
                expected
            }
            None => self.infer_expr(init),
        };

        match &pattern.kind {
            PatternKind::Ident { name } => {
                self.ctx.define(
                    name,
                    Binding {
                        scheme: TypeScheme::mono(self.apply(&bound_ty)),
                        mutable,
                        span: stmt.span.clone(),
                        source: BindingSource::Let,
                        decl_node: Some(stmt.id),
                    },
                );
                if !mutable {
                    // Immutable bindings feed the solver: the defining term
                    // enables substitution reasoning, literal values enable
                    // direct evaluation.
                    if let Some(term) = expr_to_term(init) {
                        self.rctx.set_definition(name, term);
                    }
                    if let ExprKind::Literal {
                        value: Literal::Int { value, .. },
                    } = &init.kind
                    {
                        self.rctx.set_value(name, Term::Int(value.clone()));
                    }
                }
                // A refined annotation is a fact about the new binding.
                if let Type::Refined { var, pred, .. } = self.apply(&bound_ty) {
                    let fact = substitute_pred_var(&pred, &var, &Term::Var(name.clone()));
                    self.rctx.add_fact(fact, format!("let {name}"));
                }
            }
            _ => self.bind_pattern(pattern, &bound_ty),
        }
    }

    fn check_assign(&mut self, stmt: &Stmt, target: &Expr, value: &Expr) {
        // Resolve the root binding of the assignment target.
        let Some(root) = assign_root(target) else {
            self.emit(
                Diagnostic::new(
                    ErrorCode::E2016,
                    "invalid assignment target",
                    target.span.clone(),
                )
                .with_node(target.id),
            );
            self.infer_expr(value);
            return;
        };

        let Some(binding) = self.ctx.peek(root).cloned() else {
            let similar = clank_diagnostic::find_similar(root, &self.ctx.visible_names());
            self.emit(
                Diagnostic::new(
                    ErrorCode::E1001,
                    format!("unresolved name `{root}`"),
                    target.span.clone(),
                )
                .with_node(target.id)
                .with_structured(
                    Structured::new("unresolved_name")
                        .with_name(root)
                        .with_similar_names(similar),
                ),
            );
            self.infer_expr(value);
            return;
        };

        if !binding.mutable {
            self.emit(
                Diagnostic::new(
                    ErrorCode::E2013,
                    format!("cannot assign to immutable binding `{root}`"),
                    stmt.span.clone(),
                )
                .with_node(stmt.id)
                .with_structured(Structured::new("immutable_assign").with_name(root))
                .with_related(
                    format!("`{root}` declared immutable here"),
                    binding.span.clone(),
                ),
            );
        }

        let target_ty = self.infer_expr(target);
        self.check_expr(value, &target_ty, ObligationKind::Refinement);
    }

    /// Bind a pattern's variables against the matched type.
    pub(crate) fn bind_pattern(&mut self, pattern: &Pattern, ty: &Type) {
        match &pattern.kind {
            PatternKind::Wildcard => {}
            PatternKind::Ident { name } => {
                self.ctx.define(
                    name,
                    Binding {
                        scheme: TypeScheme::mono(self.apply(ty)),
                        mutable: false,
                        span: pattern.span.clone(),
                        source: BindingSource::Let,
                        decl_node: Some(pattern.id),
                    },
                );
            }
            PatternKind::Literal { value } => {
                let lit_ty = match value {
                    Literal::Int { .. } => Type::int(),
                    Literal::Float { .. } => Type::float(),
                    Literal::Bool { .. } => Type::bool(),
                    Literal::Str { .. } => Type::str(),
                    Literal::Unit => Type::unit(),
                };
                self.unify_at(ty, &lit_ty, &pattern.span, pattern.id);
            }
            PatternKind::Tuple { elems } => {
                let resolved = self.resolve_nominal(ty);
                match &resolved {
                    Type::Tuple { elems: elem_tys } if elem_tys.len() == elems.len() => {
                        for (sub, sub_ty) in elems.iter().zip(elem_tys.clone()) {
                            self.bind_pattern(sub, &sub_ty);
                        }
                    }
                    Type::Var { .. } => {
                        let fresh: Vec<Type> = elems.iter().map(|_| self.fresh()).collect();
                        self.unify_at(&type_tuple(fresh.clone()), ty, &pattern.span, pattern.id);
                        for (sub, sub_ty) in elems.iter().zip(fresh) {
                            self.bind_pattern(sub, &sub_ty);
                        }
                    }
                    other => {
                        self.pattern_mismatch(pattern, other);
                        for sub in elems {
                            let fresh = self.fresh();
                            self.bind_pattern(sub, &fresh);
                        }
                    }
                }
            }
            PatternKind::Variant { name, args } => self.bind_variant_pattern(pattern, name, args, ty),
        }
    }

    fn bind_variant_pattern(
        &mut self,
        pattern: &Pattern,
        name: &str,
        args: &[Pattern],
        ty: &Type,
    ) {
        let resolved = self.resolve_nominal(ty);
        let (type_name, type_args) = match &resolved {
            Type::Con { name } => (Some(name.clone()), Vec::new()),
            Type::App { ctor, args } => (Some(ctor.clone()), args.clone()),
            _ => (None, Vec::new()),
        };

        // Nominal scrutinee: resolve the variant through the sum
        // definition. Payloads bind positionally.
        if let Some(type_name) = type_name {
            if let Some(TypeDef::Sum {
                params, variants, ..
            }) = self.ctx.lookup_type(&type_name).cloned()
            {
                let Some(variant) = variants.iter().find(|v| v.name == name) else {
                    let variant_names: Vec<String> =
                        variants.iter().map(|v| v.name.clone()).collect();
                    let similar = clank_diagnostic::find_similar(name, &variant_names);
                    self.emit(
                        Diagnostic::new(
                            ErrorCode::E1006,
                            format!("type `{type_name}` has no variant `{name}`"),
                            pattern.span.clone(),
                        )
                        .with_node(pattern.id)
                        .with_structured(
                            Structured::new("variant_not_found")
                                .with_name(name)
                                .with_similar_names(similar),
                        ),
                    );
                    for sub in args {
                        let fresh = self.fresh();
                        self.bind_pattern(sub, &fresh);
                    }
                    return;
                };
                if variant.fields.len() != args.len() {
                    self.emit(
                        Diagnostic::new(
                            ErrorCode::E2009,
                            format!(
                                "variant `{name}` has {} field(s), but the pattern binds {}",
                                variant.fields.len(),
                                args.len()
                            ),
                            pattern.span.clone(),
                        )
                        .with_node(pattern.id)
                        .with_structured(
                            Structured::new("pattern_mismatch")
                                .with_name(name)
                                .with_arity(variant.fields.len(), args.len()),
                        ),
                    );
                }
                for (sub, field_ty) in args.iter().zip(&variant.fields) {
                    let concrete = substitute_params(field_ty, &params, &type_args);
                    self.bind_pattern(sub, &concrete);
                }
                return;
            }
        }

        // Unresolved scrutinee: fall back to the variant's constructor
        // binding and unify its result with the scrutinee type.
        let Some(binding) = self.ctx.peek(name).cloned() else {
            self.pattern_mismatch(pattern, &resolved);
            for sub in args {
                let fresh = self.fresh();
                self.bind_pattern(sub, &fresh);
            }
            return;
        };
        match binding.scheme.instantiate(&mut self.vars) {
            Type::Fn { params, ret, .. } => {
                self.unify_at(&ret, ty, &pattern.span, pattern.id);
                for (sub, param) in args.iter().zip(params) {
                    self.bind_pattern(sub, &param);
                }
            }
            nullary => {
                self.unify_at(&nullary, ty, &pattern.span, pattern.id);
            }
        }
    }

    fn pattern_mismatch(&mut self, pattern: &Pattern, found: &Type) {
        self.emit(
            Diagnostic::new(
                ErrorCode::E2009,
                format!("pattern does not match a value of type `{found}`"),
                pattern.span.clone(),
            )
            .with_node(pattern.id)
            .with_structured(
                Structured::new("pattern_mismatch").with_types("pattern", found.to_string()),
            ),
        );
    }
}

/// The root identifier of an assignment target (`x`, `x.field`, `x[i]`).
fn assign_root(target: &Expr) -> Option<&str> {
    match &target.kind {
        ExprKind::Ident { name } => Some(name),
        ExprKind::Field { base, .. } | ExprKind::Index { base, .. } => assign_root(base),
        _ => None,
    }
}
