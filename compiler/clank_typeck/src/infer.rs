//! Expression inference.
//!
//! `infer_expr` synthesizes a type; `check_expr` pushes an expected type
//! into the expression and enforces refinements through the solver. Both
//! apply the ambient substitution after every unification.

use clank_diagnostic::{
    ContextBinding, Diagnostic, ErrorCode, ObligationKind, Structured, TypeHole,
};
use clank_ir::{BinOp, Block, Expr, ExprKind, IntSuffix, Literal, MatchArm, UnOp};
use clank_types::{
    find_fields, type_app, type_array, type_fn, type_record, type_tuple, BindingSource, Type,
    TypeDef, TypeScheme,
};

use crate::{exhaust, lower_predicate, TypeChecker};

impl TypeChecker {
    /// Synthesize the type of an expression.
    pub(crate) fn infer_expr(&mut self, expr: &Expr) -> Type {
        match &expr.kind {
            ExprKind::Literal { value } => literal_type(value),
            ExprKind::Ident { name } => self.infer_ident(expr, name),
            ExprKind::Binary { op, lhs, rhs } => self.infer_binary(expr, *op, lhs, rhs),
            ExprKind::Unary { op, operand } => self.infer_unary(expr, *op, operand),
            ExprKind::Call { callee, args } => self.infer_call(expr, callee, args),
            ExprKind::Lambda { params, body } => self.infer_lambda(params, body),
            ExprKind::If {
                cond,
                then_block,
                else_block,
            } => self.infer_if(expr, cond, then_block, else_block.as_ref()),
            ExprKind::Match { scrutinee, arms } => self.infer_match(expr, scrutinee, arms),
            ExprKind::Block { block } => self.infer_block_scoped(block),
            ExprKind::Array { elems } => self.infer_array(elems),
            ExprKind::Tuple { elems } => {
                type_tuple(elems.iter().map(|e| self.infer_expr(e)).collect())
            }
            ExprKind::RecordLit { name, fields } => self.infer_record_lit(expr, name.as_deref(), fields),
            ExprKind::Index { base, index } => self.infer_index(expr, base, index),
            ExprKind::Field { base, name } => self.infer_field(expr, base, name),
            ExprKind::Propagate { operand } => self.infer_propagate(expr, operand),
            ExprKind::Range { start, end } => {
                self.check_expr(start, &Type::int(), ObligationKind::Refinement);
                self.check_expr(end, &Type::int(), ObligationKind::Refinement);
                type_array(Type::int())
            }
            ExprKind::Hole { .. } => {
                let expected = self.fresh();
                self.register_hole(expr, &expected);
                expected
            }
        }
    }

    /// Check an expression against an expected type, enforcing refinements.
    pub(crate) fn check_expr(
        &mut self,
        expr: &Expr,
        expected: &Type,
        kind: ObligationKind,
    ) -> Type {
        if matches!(expr.kind, ExprKind::Hole { .. }) {
            self.register_hole(expr, expected);
            return self.apply(expected);
        }
        let actual = self.infer_expr(expr);
        self.check_expected(expr, actual, expected, kind)
    }

    // ── Identifiers ───────────────────────────────────────────

    fn infer_ident(&mut self, expr: &Expr, name: &str) -> Type {
        match self.ctx.lookup(name) {
            Some(binding) => {
                let scheme = binding.scheme.clone();
                scheme.instantiate(&mut self.vars)
            }
            None => {
                let similar =
                    clank_diagnostic::find_similar(name, &self.ctx.visible_names());
                self.emit(
                    Diagnostic::new(
                        ErrorCode::E1001,
                        format!("unresolved name `{name}`"),
                        expr.span.clone(),
                    )
                    .with_node(expr.id)
                    .with_structured(
                        Structured::new("unresolved_name")
                            .with_name(name)
                            .with_similar_names(similar),
                    ),
                );
                self.fresh()
            }
        }
    }

    // ── Operators ─────────────────────────────────────────────

    fn infer_binary(&mut self, expr: &Expr, op: BinOp, lhs: &Expr, rhs: &Expr) -> Type {
        match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Rem | BinOp::Pow => {
                let lt = self.infer_expr(lhs);
                let rt = self.infer_expr(rhs);
                self.require_numeric(lhs, &lt, op);
                self.require_numeric(rhs, &rt, op);
                self.unify_at(&lt, &rt, &expr.span, expr.id)
            }
            // `/` always returns Float, whatever the (numeric) operands.
            BinOp::Div => {
                let lt = self.infer_expr(lhs);
                let rt = self.infer_expr(rhs);
                self.require_numeric(lhs, &lt, op);
                self.require_numeric(rhs, &rt, op);
                Type::float()
            }
            BinOp::Eq | BinOp::Ne => {
                let lt = self.infer_expr(lhs);
                let rt = self.infer_expr(rhs);
                self.unify_at(&lt, &rt, &expr.span, expr.id);
                Type::bool()
            }
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                let lt = self.infer_expr(lhs);
                let rt = self.infer_expr(rhs);
                self.require_numeric(lhs, &lt, op);
                self.require_numeric(rhs, &rt, op);
                self.unify_at(&lt, &rt, &expr.span, expr.id);
                Type::bool()
            }
            BinOp::And | BinOp::Or => {
                self.check_expr(lhs, &Type::bool(), ObligationKind::Refinement);
                self.check_expr(rhs, &Type::bool(), ObligationKind::Refinement);
                Type::bool()
            }
            BinOp::Concat => self.infer_concat(expr, lhs, rhs),
            BinOp::Pipe => self.infer_pipe(expr, lhs, rhs),
        }
    }

    fn infer_concat(&mut self, expr: &Expr, lhs: &Expr, rhs: &Expr) -> Type {
        let lt = self.infer_expr(lhs);
        let rt = self.infer_expr(rhs);
        let lt_applied = self.apply(&lt);
        match lt_applied.get_base() {
            Type::Con { name } if name == clank_types::prim::STR => {
                self.unify_at(&Type::str(), &rt, &rhs.span, rhs.id);
                Type::str()
            }
            Type::Array { .. } => self.unify_at(&lt, &rt, &expr.span, expr.id),
            // Unresolved: let unification decide, both sides equal.
            Type::Var { .. } => self.unify_at(&lt, &rt, &expr.span, expr.id),
            _ => {
                self.invalid_operand(expr, BinOp::Concat, &lt_applied, "`Str` or an array");
                self.fresh()
            }
        }
    }

    fn infer_pipe(&mut self, expr: &Expr, lhs: &Expr, rhs: &Expr) -> Type {
        let arg_ty = self.infer_expr(lhs);
        let fn_ty = self.infer_expr(rhs);
        let fn_applied = self.apply(&fn_ty);
        match &fn_applied {
            Type::Fn { params, .. } if params.len() != 1 => {
                self.emit(
                    Diagnostic::new(
                        ErrorCode::E2002,
                        format!(
                            "`|>` needs a function of exactly one parameter, found one of {}",
                            params.len()
                        ),
                        rhs.span.clone(),
                    )
                    .with_node(rhs.id)
                    .with_structured(
                        Structured::new("arity_mismatch").with_arity(1, params.len()),
                    ),
                );
                self.fresh()
            }
            Type::Fn { params, ret, effects } => {
                self.check_call_effects(expr, effects, None);
                let param = params[0].clone();
                let ret = ret.as_ref().clone();
                self.check_expected(lhs, arg_ty, &param, ObligationKind::Refinement);
                self.apply(&ret)
            }
            Type::Var { .. } => {
                let ret = self.fresh();
                let expected_fn = type_fn(vec![arg_ty], ret.clone());
                self.unify_at(&expected_fn, &fn_ty, &rhs.span, rhs.id);
                self.apply(&ret)
            }
            other => {
                self.emit(
                    Diagnostic::new(
                        ErrorCode::E2005,
                        format!("`|>` target is not callable: `{other}`"),
                        rhs.span.clone(),
                    )
                    .with_node(rhs.id)
                    .with_structured(
                        Structured::new("not_callable")
                            .with_types("function", other.to_string()),
                    ),
                );
                self.fresh()
            }
        }
    }

    fn infer_unary(&mut self, _expr: &Expr, op: UnOp, operand: &Expr) -> Type {
        match op {
            UnOp::Neg => {
                let ty = self.infer_expr(operand);
                self.require_numeric(operand, &ty, BinOp::Sub);
                self.apply(&ty)
            }
            UnOp::Not => {
                self.check_expr(operand, &Type::bool(), ObligationKind::Refinement);
                Type::bool()
            }
        }
    }

    fn require_numeric(&mut self, expr: &Expr, ty: &Type, op: BinOp) {
        let applied = self.apply(ty);
        // Unresolved variables are constrained later; only concrete
        // non-numeric types are operand errors.
        if !matches!(applied.get_base(), Type::Var { .. }) && !applied.is_numeric() {
            self.invalid_operand(expr, op, &applied, "a numeric type");
        }
    }

    fn invalid_operand(&mut self, expr: &Expr, op: BinOp, found: &Type, wanted: &str) {
        self.emit(
            Diagnostic::new(
                ErrorCode::E2016,
                format!("operator `{op}` expects {wanted}, found `{found}`"),
                expr.span.clone(),
            )
            .with_node(expr.id)
            .with_structured(
                Structured::new("invalid_operand").with_types(wanted, found.to_string()),
            ),
        );
    }

    // ── Calls and lambdas ─────────────────────────────────────

    fn infer_call(&mut self, expr: &Expr, callee: &Expr, args: &[Expr]) -> Type {
        let callee_name = match &callee.kind {
            ExprKind::Ident { name } => Some(name.clone()),
            _ => None,
        };
        let callee_ty = self.infer_expr(callee);
        let callee_applied = self.apply(&callee_ty);

        match &callee_applied {
            Type::Fn {
                params,
                ret,
                effects,
            } => {
                if params.len() != args.len() {
                    self.emit(
                        Diagnostic::new(
                            ErrorCode::E2002,
                            format!(
                                "{} takes {} argument(s), but {} were supplied",
                                callee_name
                                    .as_deref()
                                    .map_or_else(|| "this function".to_string(), |n| format!("`{n}`")),
                                params.len(),
                                args.len()
                            ),
                            expr.span.clone(),
                        )
                        .with_node(expr.id)
                        .with_structured({
                            let mut s = Structured::new("arity_mismatch")
                                .with_arity(params.len(), args.len());
                            if let Some(name) = &callee_name {
                                s = s.with_function(name);
                            }
                            s
                        }),
                    );
                    // Check what we can pair up, then recover.
                    for (arg, param) in args.iter().zip(params.iter()) {
                        self.check_expr(arg, &param.clone(), ObligationKind::Refinement);
                    }
                    return self.fresh();
                }
                self.check_call_effects(expr, effects, callee_name.as_deref());
                let ret = ret.as_ref().clone();
                let params: Vec<Type> = params.iter().cloned().collect();
                for (arg, param) in args.iter().zip(params) {
                    self.check_expr(arg, &param, ObligationKind::Refinement);
                }
                self.apply(&ret)
            }
            Type::Var { .. } => {
                // Unresolved callee: constrain it to a fresh function type.
                let arg_types: Vec<Type> = args.iter().map(|a| self.infer_expr(a)).collect();
                let ret = self.fresh();
                let expected = type_fn(arg_types, ret.clone());
                self.unify_at(&expected, &callee_ty, &callee.span, callee.id);
                self.apply(&ret)
            }
            Type::Never => Type::Never,
            other => {
                self.emit(
                    Diagnostic::new(
                        ErrorCode::E2005,
                        format!("cannot call a value of type `{other}`"),
                        expr.span.clone(),
                    )
                    .with_node(expr.id)
                    .with_structured(
                        Structured::new("not_callable").with_types("function", other.to_string()),
                    ),
                );
                self.fresh()
            }
        }
    }

    /// Calls into effectful functions must be allowed by the ambient
    /// function's declared effects.
    fn check_call_effects(
        &mut self,
        expr: &Expr,
        callee_effects: &clank_types::EffectSet,
        callee_name: Option<&str>,
    ) {
        let Some(current) = &self.current_fn else {
            return;
        };
        let fn_name = current.name.clone();
        let current_effects = current.effects.clone();
        for effect in callee_effects.missing_from(&current_effects) {
            let message = match callee_name {
                Some(callee) => format!(
                    "effect `{effect}` of `{callee}` is not allowed in function `{fn_name}`"
                ),
                None => format!("effect `{effect}` is not allowed in function `{fn_name}`"),
            };
            self.emit(
                Diagnostic::new(ErrorCode::E4001, message, expr.span.clone())
                    .with_node(expr.id)
                    .with_structured(
                        Structured::new("effect_not_allowed")
                            .with_effect(&effect)
                            .with_function(fn_name.clone()),
                    ),
            );
        }
    }

    fn infer_lambda(&mut self, params: &[clank_ir::Param], body: &Expr) -> Type {
        self.ctx.push_scope();
        let param_types: Vec<Type> = params
            .iter()
            .map(|param| {
                let ty = match &param.ty {
                    Some(t) => {
                        let outer_anchor = self.anchor;
                        self.anchor = Some(param.id);
                        let lowered = self.lower_type_expr(t);
                        self.anchor = outer_anchor;
                        lowered
                    }
                    None => self.fresh(),
                };
                self.ctx.define(
                    &param.name,
                    clank_types::Binding {
                        scheme: TypeScheme::mono(ty.clone()),
                        mutable: false,
                        span: param.span.clone(),
                        source: BindingSource::Parameter,
                        decl_node: Some(param.id),
                    },
                );
                ty
            })
            .collect();
        let body_ty = self.infer_expr(body);
        let unused = self.ctx.pop_scope();
        self.report_unused(unused);
        type_fn(
            param_types.iter().map(|t| self.apply(t)).collect(),
            self.apply(&body_ty),
        )
    }

    // ── Control flow ──────────────────────────────────────────

    fn infer_if(
        &mut self,
        expr: &Expr,
        cond: &Expr,
        then_block: &Block,
        else_block: Option<&Block>,
    ) -> Type {
        self.check_expr(cond, &Type::bool(), ObligationKind::Refinement);
        let cond_pred = lower_predicate(cond);

        // Then branch: the condition holds.
        match &cond_pred {
            Some(pred) => self.rctx.with_fact(pred.clone(), "if condition"),
            None => self.rctx.push_scope(),
        }
        let then_ty = self.infer_block_scoped(then_block);
        self.rctx.pop_scope();

        match else_block {
            Some(els) => {
                // Else branch: the condition is false.
                match &cond_pred {
                    Some(pred) => self
                        .rctx
                        .with_negated_fact(pred.clone(), "else of if condition"),
                    None => self.rctx.push_scope(),
                }
                let else_ty = self.infer_block_scoped(els);
                self.rctx.pop_scope();
                self.unify_at(&then_ty, &else_ty, &expr.span, expr.id)
            }
            None => {
                // An `if` without `else` evaluates to Unit.
                self.unify_at(&Type::unit(), &then_ty, &then_block.span, then_block.id);
                Type::unit()
            }
        }
    }

    fn infer_match(&mut self, expr: &Expr, scrutinee: &Expr, arms: &[MatchArm]) -> Type {
        let scrutinee_ty = self.infer_expr(scrutinee);
        let mut result: Option<Type> = None;

        for arm in arms {
            self.ctx.push_scope();
            self.rctx.push_scope();
            self.bind_pattern(&arm.pattern, &scrutinee_ty);
            if let Some(guard) = &arm.guard {
                self.check_expr(guard, &Type::bool(), ObligationKind::Refinement);
                if let Some(pred) = lower_predicate(guard) {
                    self.rctx.add_fact(pred, "match guard");
                }
            }
            let arm_ty = self.infer_expr(&arm.body);
            self.rctx.pop_scope();
            let unused = self.ctx.pop_scope();
            self.report_unused(unused);

            result = Some(match result {
                None => arm_ty,
                Some(prev) => self.unify_at(&prev, &arm_ty, &arm.span, arm.id),
            });
        }

        let scrutinee_applied = self.apply(&scrutinee_ty);
        let coverage = exhaust::check_match_coverage(arms, &scrutinee_applied, &self.ctx);
        if !coverage.exhaustive {
            let missing_list = coverage
                .missing
                .iter()
                .map(|m| format!("`{}`", m.description))
                .collect::<Vec<_>>()
                .join(", ");
            self.emit(
                Diagnostic::new(
                    ErrorCode::E2015,
                    format!("non-exhaustive match: missing {missing_list}"),
                    expr.span.clone(),
                )
                .with_node(expr.id)
                .with_structured(
                    Structured::new("non_exhaustive_match")
                        .with_types(scrutinee_applied.to_string(), String::new())
                        .with_missing_patterns(coverage.missing),
                ),
            );
        }

        result.unwrap_or_else(|| {
            // A match with no arms has no value; treat as Never.
            Type::Never
        })
    }

    // ── Aggregates ────────────────────────────────────────────

    fn infer_array(&mut self, elems: &[Expr]) -> Type {
        match elems.split_first() {
            // Empty arrays get a fresh element variable; not an error.
            None => type_array(self.fresh()),
            Some((first, rest)) => {
                let elem_ty = self.infer_expr(first);
                for elem in rest {
                    let ty = self.infer_expr(elem);
                    self.unify_at(&elem_ty, &ty, &elem.span, elem.id);
                }
                type_array(self.apply(&elem_ty))
            }
        }
    }

    fn infer_record_lit(
        &mut self,
        expr: &Expr,
        name: Option<&str>,
        fields: &[clank_ir::RecordField],
    ) -> Type {
        let Some(name) = name else {
            // Anonymous record literal.
            let fields = fields
                .iter()
                .map(|f| (f.name.clone(), self.infer_expr(&f.value)))
                .collect::<Vec<_>>();
            return type_record(fields, false);
        };

        let Some(TypeDef::Record {
            params,
            fields: declared,
            ..
        }) = self.ctx.lookup_type(name).cloned()
        else {
            self.emit(
                Diagnostic::new(
                    ErrorCode::E2011,
                    format!("`{name}` is not a record type"),
                    expr.span.clone(),
                )
                .with_node(expr.id)
                .with_structured(Structured::new("not_a_record").with_name(name)),
            );
            for field in fields {
                self.infer_expr(&field.value);
            }
            return self.fresh();
        };

        // Fresh variables for the record's type parameters; field checks
        // pin them down.
        let args: Vec<Type> = params.iter().map(|p| self.vars.fresh_named(p)).collect();
        let declared: Vec<(String, Type)> = declared
            .iter()
            .map(|(fname, fty)| {
                (
                    fname.clone(),
                    clank_types::substitute_params(fty, &params, &args),
                )
            })
            .collect();

        for (fname, fty) in &declared {
            match fields.iter().find(|f| &f.name == fname) {
                Some(field) => {
                    self.check_expr(&field.value, fty, ObligationKind::Refinement);
                }
                None => {
                    self.emit(
                        Diagnostic::new(
                            ErrorCode::E2003,
                            format!("missing field `{fname}` in `{name}` literal"),
                            expr.span.clone(),
                        )
                        .with_node(expr.id)
                        .with_structured(
                            Structured::new("missing_field")
                                .with_name(name)
                                .with_field(fname),
                        ),
                    );
                }
            }
        }
        for field in fields {
            if !declared.iter().any(|(fname, _)| fname == &field.name) {
                let declared_names: Vec<String> =
                    declared.iter().map(|(n, _)| n.clone()).collect();
                let similar = clank_diagnostic::find_similar(&field.name, &declared_names);
                self.infer_expr(&field.value);
                self.emit(
                    Diagnostic::new(
                        ErrorCode::E2004,
                        format!("`{name}` has no field `{}`", field.name),
                        field.span.clone(),
                    )
                    .with_node(expr.id)
                    .with_structured(
                        Structured::new("unknown_field")
                            .with_name(name)
                            .with_field(&field.name)
                            .with_similar_fields(similar),
                    ),
                );
            }
        }

        if args.is_empty() {
            clank_types::type_con(name)
        } else {
            type_app(name, args.iter().map(|a| self.apply(a)).collect())
        }
    }

    // ── Projections ───────────────────────────────────────────

    fn infer_index(&mut self, expr: &Expr, base: &Expr, index: &Expr) -> Type {
        let base_ty = self.infer_expr(base);
        let resolved = self.resolve_nominal(&base_ty);
        match &resolved {
            Type::Array { elem } => {
                let index_ty = self.infer_expr(index);
                self.require_integer_index(index, &index_ty);
                self.apply(elem)
            }
            Type::Tuple { .. } => {
                // Literal-index resolution is not attempted; the element
                // type stays open.
                let index_ty = self.infer_expr(index);
                self.require_integer_index(index, &index_ty);
                self.fresh()
            }
            Type::Var { .. } => {
                // Unknown base: constrain it to be an array.
                let elem = self.fresh();
                let expected = type_array(elem.clone());
                self.unify_at(&expected, &base_ty, &base.span, base.id);
                self.check_expr(index, &Type::int(), ObligationKind::Refinement);
                self.apply(&elem)
            }
            other => {
                self.emit(
                    Diagnostic::new(
                        ErrorCode::E2006,
                        format!("cannot index into a value of type `{other}`"),
                        expr.span.clone(),
                    )
                    .with_node(expr.id)
                    .with_structured(
                        Structured::new("not_indexable").with_types("array", other.to_string()),
                    ),
                );
                self.infer_expr(index);
                self.fresh()
            }
        }
    }

    fn require_integer_index(&mut self, index: &Expr, ty: &Type) {
        let applied = self.apply(ty);
        if matches!(applied.get_base(), Type::Var { .. }) {
            self.unify_at(&Type::int(), &applied, &index.span, index.id);
        } else if !applied.is_integer() {
            self.emit(
                Diagnostic::new(
                    ErrorCode::E2001,
                    format!("index must be an integer, found `{applied}`"),
                    index.span.clone(),
                )
                .with_node(index.id)
                .with_structured(
                    Structured::new("type_mismatch").with_types("Int", applied.to_string()),
                ),
            );
        }
    }

    fn infer_field(&mut self, expr: &Expr, base: &Expr, name: &str) -> Type {
        let base_ty = self.infer_expr(base);
        let resolved = self.resolve_nominal(&base_ty);

        let Some(fields) = find_fields(&resolved, &self.ctx) else {
            self.emit(
                Diagnostic::new(
                    ErrorCode::E2011,
                    format!("cannot access field `{name}` on non-record type `{resolved}`"),
                    expr.span.clone(),
                )
                .with_node(expr.id)
                .with_structured(
                    Structured::new("not_a_record").with_types("record", resolved.to_string()),
                ),
            );
            return self.fresh();
        };

        match fields.iter().find(|(fname, _)| fname == name) {
            Some((_, field_ty)) => self.apply(field_ty),
            None => {
                let field_names: Vec<String> =
                    fields.iter().map(|(fname, _)| fname.clone()).collect();
                let similar = clank_diagnostic::find_similar(name, &field_names);
                self.emit(
                    Diagnostic::new(
                        ErrorCode::E2004,
                        format!("type `{resolved}` has no field `{name}`"),
                        expr.span.clone(),
                    )
                    .with_node(expr.id)
                    .with_structured(
                        Structured::new("unknown_field")
                            .with_field(name)
                            .with_similar_fields(similar),
                    ),
                );
                self.fresh()
            }
        }
    }

    fn infer_propagate(&mut self, expr: &Expr, operand: &Expr) -> Type {
        let operand_ty = self.infer_expr(operand);
        let resolved = self.resolve_nominal(&operand_ty);
        let inner = match &resolved {
            Type::App { ctor, args } if ctor == "Option" && args.len() == 1 => {
                Some(args[0].clone())
            }
            Type::App { ctor, args } if ctor == "Result" && args.len() == 2 => {
                Some(args[0].clone())
            }
            _ => None,
        };
        let Some(inner) = inner else {
            self.emit(
                Diagnostic::new(
                    ErrorCode::E2012,
                    format!("`?` needs an `Option` or `Result`, found `{resolved}`"),
                    expr.span.clone(),
                )
                .with_node(expr.id)
                .with_structured(
                    Structured::new("invalid_propagate")
                        .with_types("Option or Result", resolved.to_string()),
                ),
            );
            return self.fresh();
        };

        // `?` can exit early with the error; the ambient function must
        // declare the Err effect.
        if let Some(current) = &self.current_fn {
            if !current.effects.contains("Err") {
                let fn_name = current.name.clone();
                self.emit(
                    Diagnostic::new(
                        ErrorCode::E4002,
                        format!(
                            "`?` propagates a failure, but function `{fn_name}` does not declare the `Err` effect"
                        ),
                        expr.span.clone(),
                    )
                    .with_node(expr.id)
                    .with_structured(
                        Structured::new("unhandled_effect")
                            .with_effect("Err")
                            .with_function(fn_name),
                    ),
                );
            }
        }
        inner
    }

    // ── Blocks ────────────────────────────────────────────────

    /// Infer a block in fresh typing and refinement scopes.
    pub(crate) fn infer_block_scoped(&mut self, block: &Block) -> Type {
        self.rctx.push_scope();
        let ty = self.infer_block(block);
        self.rctx.pop_scope();
        ty
    }

    /// Infer a block's statements and tail in a fresh typing scope.
    pub(crate) fn infer_block(&mut self, block: &Block) -> Type {
        self.ctx.push_scope();
        for stmt in &block.stmts {
            self.check_stmt(stmt);
        }
        let ty = match &block.tail {
            Some(tail) => self.infer_expr(tail),
            None => Type::unit(),
        };
        let unused = self.ctx.pop_scope();
        self.report_unused(unused);
        ty
    }

    // ── Holes ─────────────────────────────────────────────────

    fn register_hole(&mut self, expr: &Expr, expected: &Type) {
        let expected_applied = self.apply(expected);
        let expected_str = match &expected_applied {
            Type::Var { .. } => "_".to_string(),
            other => other.to_string(),
        };

        let mut bindings = Vec::new();
        let mut candidates = Vec::new();
        for name in self.ctx.visible_names() {
            let Some(binding) = self.ctx.peek(&name) else {
                continue;
            };
            if binding.source == BindingSource::External {
                continue;
            }
            let scheme = binding.scheme.clone();
            bindings.push(ContextBinding {
                name: name.clone(),
                ty: scheme.ty.to_string(),
                definition: None,
            });
            // A candidate fills the hole if its type unifies with the
            // expectation.
            let instantiated = scheme.instantiate(&mut self.vars);
            if clank_types::unify(&expected_applied, &self.apply(&instantiated)).is_ok() {
                candidates.push(name);
            }
        }

        let allowed_effects = self
            .current_fn
            .as_ref()
            .map(|f| f.effects.iter().map(str::to_string).collect())
            .unwrap_or_default();

        let hole = TypeHole {
            id: self.collector.alloc_hole_id(),
            location: expr.span.clone(),
            node_id: Some(expr.id),
            expected_type: expected_str,
            bindings,
            allowed_effects,
            fill_candidates: candidates,
            repair_refs: Vec::new(),
        };
        self.holes.push(hole);
    }
}

fn literal_type(literal: &Literal) -> Type {
    match literal {
        Literal::Int { suffix, .. } => match suffix {
            Some(IntSuffix::I32) => Type::int32(),
            Some(IntSuffix::I64) => Type::int64(),
            None => Type::int(),
        },
        Literal::Float { .. } => Type::float(),
        Literal::Bool { .. } => Type::bool(),
        Literal::Str { .. } => Type::str(),
        Literal::Unit => Type::unit(),
    }
}
