//! Type checker for the Clank compiler.
//!
//! Three passes over the declarations:
//!
//! 1. **Collect type declarations** - aliases, records (registering a
//!    constructor function), sum types (registering variant constructors).
//! 2. **Collect function signatures** - parameter types, return type,
//!    effect set, bound as (possibly polymorphic) schemes.
//! 3. **Check function bodies** - bidirectional inference with refinement
//!    enforcement through the solver.
//!
//! Every pass collects diagnostics and continues; unification failures
//! insert a fresh type variable at the failure site and keep checking.

mod exhaust;
mod infer;
mod lower;
mod predicates;
mod refine;
mod stmts;

pub use exhaust::{check_match_coverage, MatchCoverage};
pub use predicates::{expr_to_term, lower_predicate, substitute_pred_var};

use rustc_hash::FxHashSet;

use clank_diagnostic::{
    Diagnostic, DiagnosticCollector, DiagnosticConfig, DiagnosticId, ErrorCode, Obligation,
    Structured, TypeHole,
};
use clank_ir::{Decl, DeclKind, FnDecl, NodeId, Program, Span};
use clank_solver::{RefinementContext, SolverConfig};
use clank_types::{
    register_builtins, type_fn_effects, unify, Binding, BindingSource, EffectSet, Substitution,
    Type, TypeContext, TypeScheme, TypeVarGen, UnifyErrorKind,
};

/// Configuration for one checking run.
#[derive(Clone, Debug, Default)]
pub struct CheckConfig {
    pub solver: SolverConfig,
    pub diagnostics: DiagnosticConfig,
}

/// Everything the checker produced for one program.
#[derive(Debug)]
pub struct CheckOutput {
    pub diagnostics: Vec<Diagnostic>,
    pub obligations: Vec<Obligation>,
    pub holes: Vec<TypeHole>,
    /// Obligations the solver discharged inline (not present in
    /// `obligations`); feeds compilation stats.
    pub obligations_discharged: usize,
}

impl CheckOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Check a program with default configuration.
pub fn check_program(program: &Program) -> CheckOutput {
    TypeChecker::new(CheckConfig::default()).run(program)
}

/// Check a program with explicit configuration.
pub fn check_program_with_config(program: &Program, config: CheckConfig) -> CheckOutput {
    TypeChecker::new(config).run(program)
}

/// Ambient function information while checking a body.
pub(crate) struct FnInfo {
    pub(crate) name: String,
    pub(crate) decl_id: NodeId,
    pub(crate) ret: Type,
    pub(crate) effects: EffectSet,
}

/// The checker instance. All counters (type variables, diagnostic and
/// obligation ids) live here; a fresh instance per compilation resets them.
pub struct TypeChecker {
    pub(crate) ctx: TypeContext,
    pub(crate) rctx: RefinementContext,
    pub(crate) subst: Substitution,
    pub(crate) vars: TypeVarGen,
    pub(crate) collector: DiagnosticCollector,
    pub(crate) obligations: Vec<Obligation>,
    pub(crate) holes: Vec<TypeHole>,
    pub(crate) obligations_discharged: usize,
    pub(crate) solver_config: SolverConfig,
    /// Names of user type declarations, known before their bodies lower.
    pub(crate) declared_types: FxHashSet<String>,
    pub(crate) current_fn: Option<FnInfo>,
    /// AST node diagnostics from type-annotation lowering anchor to (type
    /// expressions carry no ids of their own).
    pub(crate) anchor: Option<NodeId>,
}

impl TypeChecker {
    pub fn new(config: CheckConfig) -> Self {
        let mut ctx = TypeContext::new();
        register_builtins(&mut ctx);
        TypeChecker {
            ctx,
            rctx: RefinementContext::new(),
            subst: Substitution::empty(),
            vars: TypeVarGen::new(),
            collector: DiagnosticCollector::with_config(config.diagnostics),
            obligations: Vec::new(),
            holes: Vec::new(),
            obligations_discharged: 0,
            solver_config: config.solver,
            declared_types: FxHashSet::default(),
            current_fn: None,
            anchor: None,
        }
    }

    /// Run all three passes and collect the output.
    pub fn run(mut self, program: &Program) -> CheckOutput {
        tracing::debug!(decls = program.decls.len(), "pass 1: collect type declarations");
        self.collect_type_decls(program);
        tracing::debug!("pass 2: collect function signatures");
        self.collect_signatures(program);
        tracing::debug!("pass 3: check function bodies");
        self.check_bodies(program);

        CheckOutput {
            diagnostics: self.collector.into_diagnostics(),
            obligations: self.obligations,
            holes: self.holes,
            obligations_discharged: self.obligations_discharged,
        }
    }

    // ── Pass 1: type declarations ─────────────────────────────

    fn collect_type_decls(&mut self, program: &Program) {
        self.declared_types = program
            .decls
            .iter()
            .filter(|decl| !matches!(decl.kind, DeclKind::Function(_)))
            .map(|decl| decl.name().to_string())
            .collect();

        for decl in &program.decls {
            self.anchor = Some(decl.id);
            match &decl.kind {
                DeclKind::TypeAlias { name, params, ty } => {
                    let lowered = self.lower_in_param_scope(params, |check| {
                        check.lower_type_expr(ty)
                    });
                    self.register_type_def(
                        decl,
                        name,
                        clank_types::TypeDef::Alias {
                            params: params.clone(),
                            ty: lowered,
                            span: decl.span.clone(),
                        },
                    );
                }
                DeclKind::Record {
                    name,
                    params,
                    fields,
                } => {
                    let lowered: Vec<(String, Type)> = self.lower_in_param_scope(params, |check| {
                        fields
                            .iter()
                            .map(|f| (f.name.clone(), check.lower_type_expr(&f.ty)))
                            .collect()
                    });
                    let field_types: Vec<Type> =
                        lowered.iter().map(|(_, ty)| ty.clone()).collect();
                    self.register_type_def(
                        decl,
                        name,
                        clank_types::TypeDef::Record {
                            params: params.clone(),
                            fields: lowered,
                            span: decl.span.clone(),
                        },
                    );
                    // Record constructor: field types -> named type.
                    let ctor = TypeScheme::poly(
                        params.clone(),
                        clank_types::type_fn(field_types, named_type(name, params)),
                    );
                    self.register_value(decl, name, ctor);
                }
                DeclKind::Sum {
                    name,
                    params,
                    variants,
                } => {
                    let infos: Vec<clank_types::VariantInfo> =
                        self.lower_in_param_scope(params, |check| {
                            variants
                                .iter()
                                .map(|v| clank_types::VariantInfo {
                                    name: v.name.clone(),
                                    fields: v
                                        .fields
                                        .iter()
                                        .map(|f| check.lower_type_expr(f))
                                        .collect(),
                                    field_names: v.field_names.clone(),
                                })
                                .collect()
                        });
                    self.register_type_def(
                        decl,
                        name,
                        clank_types::TypeDef::Sum {
                            params: params.clone(),
                            variants: infos.clone(),
                            span: decl.span.clone(),
                        },
                    );
                    // Each variant is a constructor; nullary variants bind
                    // the named type directly.
                    for info in infos {
                        let scheme = if info.fields.is_empty() {
                            TypeScheme::poly(params.clone(), named_type(name, params))
                        } else {
                            TypeScheme::poly(
                                params.clone(),
                                clank_types::type_fn(info.fields, named_type(name, params)),
                            )
                        };
                        self.register_value(decl, &info.name, scheme);
                    }
                }
                DeclKind::Function(_) => {}
            }
        }
        self.anchor = None;
    }

    fn lower_in_param_scope<T>(
        &mut self,
        params: &[String],
        lower: impl FnOnce(&mut Self) -> T,
    ) -> T {
        self.ctx.push_scope();
        for param in params {
            self.ctx
                .bind_type_param(param, clank_types::type_con(param));
        }
        let result = lower(self);
        self.ctx.pop_scope();
        result
    }

    fn register_type_def(&mut self, decl: &Decl, name: &str, def: clank_types::TypeDef) {
        if let Some(previous) = self.ctx.define_type(name, def) {
            self.emit(
                Diagnostic::new(
                    ErrorCode::E1002,
                    format!("duplicate definition of type `{name}`"),
                    decl.span.clone(),
                )
                .with_node(decl.id)
                .with_structured(Structured::new("duplicate_definition").with_name(name))
                .with_related("previous definition here", previous.span().clone()),
            );
        }
    }

    fn register_value(&mut self, decl: &Decl, name: &str, scheme: TypeScheme) {
        let binding = Binding {
            scheme,
            mutable: false,
            span: decl.span.clone(),
            source: BindingSource::Function,
            decl_node: Some(decl.id),
        };
        if let Some(previous) = self.ctx.define(name, binding) {
            self.emit(
                Diagnostic::new(
                    ErrorCode::E1002,
                    format!("duplicate definition of `{name}`"),
                    decl.span.clone(),
                )
                .with_node(decl.id)
                .with_structured(Structured::new("duplicate_definition").with_name(name))
                .with_related("previous definition here", previous.span),
            );
        }
    }

    // ── Pass 2: function signatures ───────────────────────────

    fn collect_signatures(&mut self, program: &Program) {
        for decl in &program.decls {
            let DeclKind::Function(func) = &decl.kind else {
                continue;
            };
            self.anchor = Some(decl.id);
            let fn_type = self.signature_type(func);
            self.register_value(
                decl,
                &func.name,
                TypeScheme::poly(func.type_params.clone(), fn_type),
            );
        }
        self.anchor = None;
    }

    fn signature_type(&mut self, func: &FnDecl) -> Type {
        self.lower_in_param_scope(&func.type_params.clone(), |check| {
            let outer_anchor = check.anchor;
            let params: Vec<Type> = func
                .params
                .iter()
                .map(|param| match &param.ty {
                    Some(ty) => {
                        check.anchor = Some(param.id);
                        check.lower_type_expr(ty)
                    }
                    None => {
                        check.emit(
                            Diagnostic::new(
                                ErrorCode::E2007,
                                format!(
                                    "parameter `{}` of function `{}` needs a type annotation",
                                    param.name, func.name
                                ),
                                param.span.clone(),
                            )
                            .with_node(param.id)
                            .with_structured(
                                Structured::new("missing_annotation").with_name(&param.name),
                            ),
                        );
                        check.fresh()
                    }
                })
                .collect();
            check.anchor = outer_anchor;
            let ret = func
                .ret
                .as_ref()
                .map_or_else(Type::unit, |ty| check.lower_type_expr(ty));
            type_fn_effects(params, ret, EffectSet::from_names(func.effects.clone()))
        })
    }

    // ── Pass 3: function bodies ───────────────────────────────

    fn check_bodies(&mut self, program: &Program) {
        for decl in &program.decls {
            if let DeclKind::Function(func) = &decl.kind {
                self.check_fn_body(decl, func);
            }
        }
    }

    fn check_fn_body(&mut self, decl: &Decl, func: &FnDecl) {
        // Reuse the signature registered in pass 2 (re-lowering here would
        // duplicate its diagnostics). Type parameters stay rigid inside the
        // body: they are bound to themselves, not instantiated.
        let signature = self.ctx.peek(&func.name).map(|b| b.scheme.ty.clone());
        let (param_types, ret) = match signature {
            Some(Type::Fn { params, ret, .. }) => (params.to_vec(), *ret),
            _ => (
                func.params.iter().map(|_| self.fresh()).collect(),
                Type::unit(),
            ),
        };

        self.ctx.push_scope();
        self.rctx.push_scope();
        for param in &func.type_params {
            self.ctx.bind_type_param(param, clank_types::type_con(param));
        }

        for (param, ty) in func.params.iter().zip(&param_types) {
            self.ctx.define(
                &param.name,
                Binding {
                    scheme: TypeScheme::mono(ty.clone()),
                    mutable: false,
                    span: param.span.clone(),
                    source: BindingSource::Parameter,
                    decl_node: Some(param.id),
                },
            );
            // A refined parameter type seeds the refinement context: the
            // predicate holds for the parameter by assumption.
            if let Type::Refined { var, pred, .. } = ty {
                let fact = substitute_pred_var(
                    pred,
                    var,
                    &clank_types::Term::Var(param.name.clone()),
                );
                self.rctx
                    .add_fact(fact, format!("parameter {}", param.name));
            }
        }

        self.current_fn = Some(FnInfo {
            name: func.name.clone(),
            decl_id: decl.id,
            ret: ret.clone(),
            effects: EffectSet::from_names(func.effects.clone()),
        });

        let body_ty = self.infer_block(&func.body);
        // The body's value must match the declared return type. A trailing
        // `return` statement makes the block `Never`, which unifies freely.
        if let Some(tail) = &func.body.tail {
            let actual = body_ty.clone();
            self.check_expected(
                tail,
                actual,
                &ret,
                clank_diagnostic::ObligationKind::Postcondition,
            );
        } else {
            self.unify_at(&ret, &body_ty, &func.body.span, func.body.id);
        }

        self.current_fn = None;
        self.rctx.pop_scope();
        let unused = self.ctx.pop_scope();
        self.report_unused(unused);
    }

    // ── Shared helpers ────────────────────────────────────────

    pub(crate) fn fresh(&mut self) -> Type {
        self.vars.fresh()
    }

    pub(crate) fn apply(&self, ty: &Type) -> Type {
        self.subst.apply(ty)
    }

    pub(crate) fn emit(&mut self, diagnostic: Diagnostic) -> DiagnosticId {
        self.collector.emit(diagnostic)
    }

    /// Unify, composing the result into the ambient substitution. On
    /// failure, emit the mapped diagnostic and return a fresh variable so
    /// checking continues.
    pub(crate) fn unify_at(
        &mut self,
        expected: &Type,
        actual: &Type,
        span: &Span,
        node: NodeId,
    ) -> Type {
        let expected_applied = self.apply(expected);
        let actual_applied = self.apply(actual);
        match unify(&expected_applied, &actual_applied) {
            Ok(subst) => {
                self.subst = subst.compose(&self.subst);
                self.apply(&actual_applied)
            }
            Err(err) => {
                let (code, message) = match err.kind {
                    UnifyErrorKind::OccursCheck => (
                        ErrorCode::E2018,
                        format!(
                            "infinite type: `{}` would contain itself",
                            err.expected
                        ),
                    ),
                    UnifyErrorKind::MissingField => (
                        ErrorCode::E2003,
                        format!(
                            "{}: expected `{}`, found `{}`",
                            err.detail.as_deref().unwrap_or("missing field"),
                            err.expected,
                            err.actual
                        ),
                    ),
                    UnifyErrorKind::TypeMismatch | UnifyErrorKind::ArityMismatch => (
                        ErrorCode::E2001,
                        match &err.detail {
                            Some(detail) => format!(
                                "type mismatch: expected `{}`, found `{}` ({detail})",
                                err.expected, err.actual
                            ),
                            None => format!(
                                "type mismatch: expected `{}`, found `{}`",
                                err.expected, err.actual
                            ),
                        },
                    ),
                };
                let mut structured = Structured::new("type_mismatch")
                    .with_types(err.expected.to_string(), err.actual.to_string());
                if err.kind == UnifyErrorKind::MissingField {
                    structured.kind = "missing_field".to_string();
                    if let Some(field) = err
                        .detail
                        .as_deref()
                        .and_then(|d| d.strip_prefix("missing field `"))
                        .and_then(|d| d.strip_suffix('`'))
                    {
                        structured.field = Some(field.to_string());
                    }
                }
                self.emit(
                    Diagnostic::new(code, message, span.clone())
                        .with_node(node)
                        .with_structured(structured),
                );
                self.fresh()
            }
        }
    }

    /// Emit unused-binding warnings for a popped scope.
    pub(crate) fn report_unused(&mut self, unused: Vec<(String, Binding)>) {
        let mut unused = unused;
        unused.sort_by(|(_, a), (_, b)| a.span.sort_key().cmp(&b.span.sort_key()));
        for (name, binding) in unused {
            let code = match binding.source {
                BindingSource::Let => ErrorCode::W0001,
                BindingSource::Parameter => ErrorCode::W0005,
                _ => continue,
            };
            let noun = if code == ErrorCode::W0005 {
                "parameter"
            } else {
                "variable"
            };
            let mut diagnostic = Diagnostic::new(
                code,
                format!("unused {noun} `{name}`"),
                binding.span.clone(),
            )
            .with_structured(Structured::new("unused_binding").with_name(&name));
            if let Some(node) = binding.decl_node {
                diagnostic = diagnostic.with_node(node);
            }
            self.emit(diagnostic);
        }
    }
}

/// The named type a record/sum declaration introduces: `Con` when it has no
/// parameters, `App` over the parameter names otherwise.
fn named_type(name: &str, params: &[String]) -> Type {
    if params.is_empty() {
        clank_types::type_con(name)
    } else {
        clank_types::type_app(
            name,
            params.iter().map(clank_types::type_con).collect(),
        )
    }
}
