//! End-to-end checker tests over hand-built programs.

use clank_diagnostic::{ErrorCode, HintStrategy, ObligationKind};
use clank_ir::build::{program, AstBuilder};
use clank_ir::{BinOp, Program};
use clank_typeck::{check_program, CheckOutput};
use pretty_assertions::assert_eq;

fn codes(output: &CheckOutput) -> Vec<&'static str> {
    output
        .diagnostics
        .iter()
        .map(|d| d.code.as_str())
        .collect()
}

/// `fn f() -> Int { 42 }`
#[test]
fn trivial_function_checks_clean() {
    let mut b = AstBuilder::new();
    let forty_two = b.int(42);
    let body = b.block(vec![], Some(forty_two));
    let f = b.function("f", vec![], Some(b.ty("Int")), vec![], body);
    let output = check_program(&program(vec![f]));
    assert_eq!(codes(&output), Vec::<&str>::new());
    assert!(output.obligations.is_empty());
}

/// `fn main() -> Unit { let x = 1; x = 2 }` - immutable assignment.
#[test]
fn immutable_assign_is_e2013() {
    let mut b = AstBuilder::new();
    let one = b.int(1);
    let let_x = b.let_stmt("x", false, None, one);
    let target = b.ident("x");
    let two = b.int(2);
    let assign = b.assign_stmt(target, two);
    let body = b.block(vec![let_x, assign], None);
    let main = b.function("main", vec![], Some(b.ty("Unit")), vec![], body);

    let output = check_program(&program(vec![main]));
    let diag = output
        .diagnostics
        .iter()
        .find(|d| d.code == ErrorCode::E2013)
        .expect("expected E2013");
    assert!(diag.message.contains("`x`"));
    let structured = diag.structured.as_ref().expect("structured payload");
    assert_eq!(structured.kind, "immutable_assign");
    assert_eq!(structured.name.as_deref(), Some("x"));
    assert_eq!(diag.related.len(), 1);
}

/// `fn pure_fn() -> Int { println("side effect"); 42 }` - effect violation.
#[test]
fn effect_violation_is_e4001() {
    let mut b = AstBuilder::new();
    let msg = b.str("side effect");
    let call = b.call_named("println", vec![msg]);
    let call_stmt = b.expr_stmt(call);
    let forty_two = b.int(42);
    let body = b.block(vec![call_stmt], Some(forty_two));
    let pure_fn = b.function("pure_fn", vec![], Some(b.ty("Int")), vec![], body);

    let output = check_program(&program(vec![pure_fn]));
    let diag = output
        .diagnostics
        .iter()
        .find(|d| d.code == ErrorCode::E4001)
        .expect("expected E4001");
    let structured = diag.structured.as_ref().expect("structured payload");
    assert_eq!(structured.effect.as_deref(), Some("IO"));
    assert_eq!(structured.function.as_deref(), Some("pure_fn"));
}

/// Declaring the effect silences E4001.
#[test]
fn declared_effect_allows_call() {
    let mut b = AstBuilder::new();
    let msg = b.str("hello");
    let call = b.call_named("println", vec![msg]);
    let call_stmt = b.expr_stmt(call);
    let body = b.block(vec![call_stmt], None);
    let f = b.function(
        "logger",
        vec![],
        Some(b.ty("Unit")),
        vec!["IO".to_string()],
        body,
    );
    let output = check_program(&program(vec![f]));
    assert_eq!(codes(&output), Vec::<&str>::new());
}

/// Scenario: `n: Int{n > 0}`, `let m = n + 1`, `requires_positive(m)` -
/// the obligation `m > 0` discharges via substitution and arithmetic.
fn arithmetic_proof_program() -> Program {
    let mut b = AstBuilder::new();

    // fn requires_positive(x: Int{x > 0}) -> Int { x }
    let x_ref = b.ident("x");
    let zero = b.int(0);
    let x_pos = b.binary(BinOp::Gt, x_ref, zero);
    let int_ty = b.ty("Int");
    let refined = b.refined_ty(int_ty, "x", x_pos);
    let x_param = b.param("x", Some(refined));
    let x_body_ref = b.ident("x");
    let rp_body = b.block(vec![], Some(x_body_ref));
    let requires_positive =
        b.function("requires_positive", vec![x_param], Some(b.ty("Int")), vec![], rp_body);

    // fn caller(n: Int{n > 0}) -> Int { let m = n + 1; requires_positive(m) }
    let n_ref = b.ident("n");
    let zero2 = b.int(0);
    let n_pos = b.binary(BinOp::Gt, n_ref, zero2);
    let int_ty2 = b.ty("Int");
    let n_refined = b.refined_ty(int_ty2, "n", n_pos);
    let n_param = b.param("n", Some(n_refined));

    let n_use = b.ident("n");
    let one = b.int(1);
    let n_plus_1 = b.binary(BinOp::Add, n_use, one);
    let let_m = b.let_stmt("m", false, None, n_plus_1);
    let m_use = b.ident("m");
    let call = b.call_named("requires_positive", vec![m_use]);
    let caller_body = b.block(vec![let_m], Some(call));
    let caller = b.function("caller", vec![n_param], Some(b.ty("Int")), vec![], caller_body);

    program(vec![requires_positive, caller])
}

#[test]
fn arithmetic_refinement_discharges() {
    let output = check_program(&arithmetic_proof_program());
    assert_eq!(codes(&output), Vec::<&str>::new());
    assert!(output.obligations.is_empty(), "{:?}", output.obligations);
    assert!(output.obligations_discharged >= 1);
}

/// An unprovable refinement becomes an obligation with the four-hint shape.
#[test]
fn unprovable_refinement_becomes_obligation() {
    let mut b = AstBuilder::new();

    // fn requires_positive(x: Int{x > 0}) -> Int { x }
    let x_ref = b.ident("x");
    let zero = b.int(0);
    let x_pos = b.binary(BinOp::Gt, x_ref, zero);
    let int_ty = b.ty("Int");
    let refined = b.refined_ty(int_ty, "x", x_pos);
    let x_param = b.param("x", Some(refined));
    let x_body = b.ident("x");
    let rp_body = b.block(vec![], Some(x_body));
    let requires_positive =
        b.function("requires_positive", vec![x_param], Some(b.ty("Int")), vec![], rp_body);

    // fn caller(n: Int) -> Int { requires_positive(n) } - nothing known.
    let n_param = b.param("n", Some(b.ty("Int")));
    let n_use = b.ident("n");
    let call = b.call_named("requires_positive", vec![n_use]);
    let caller_body = b.block(vec![], Some(call));
    let caller = b.function("caller", vec![n_param], Some(b.ty("Int")), vec![], caller_body);

    let output = check_program(&program(vec![requires_positive, caller]));
    assert_eq!(codes(&output), Vec::<&str>::new());
    assert_eq!(output.obligations.len(), 1);

    let obligation = &output.obligations[0];
    assert_eq!(obligation.kind, ObligationKind::Refinement);
    assert_eq!(obligation.goal, "n > 0");
    assert!(obligation.solver_attempted);
    assert!(obligation.primary_node_id.is_some());

    let strategies: Vec<HintStrategy> =
        obligation.hints.iter().map(|h| h.strategy).collect();
    assert_eq!(
        strategies,
        vec![
            HintStrategy::Guard,
            HintStrategy::RefineParam,
            HintStrategy::Assert,
            HintStrategy::Info,
        ]
    );
    assert_eq!(
        obligation.hints[0].template.as_deref(),
        Some("if n > 0 { ... }")
    );
    assert_eq!(obligation.context.bindings[0].name, "n");
}

/// A provably false refinement argument is a hard E3001.
#[test]
fn refuted_refinement_is_e3001() {
    let mut b = AstBuilder::new();

    let x_ref = b.ident("x");
    let zero = b.int(0);
    let x_pos = b.binary(BinOp::Gt, x_ref, zero);
    let int_ty = b.ty("Int");
    let refined = b.refined_ty(int_ty, "x", x_pos);
    let x_param = b.param("x", Some(refined));
    let x_body = b.ident("x");
    let rp_body = b.block(vec![], Some(x_body));
    let requires_positive =
        b.function("requires_positive", vec![x_param], Some(b.ty("Int")), vec![], rp_body);

    // fn caller() -> Int { requires_positive(-3) }
    let neg = b.int(-3);
    let call = b.call_named("requires_positive", vec![neg]);
    let caller_body = b.block(vec![], Some(call));
    let caller = b.function("caller", vec![], Some(b.ty("Int")), vec![], caller_body);

    let output = check_program(&program(vec![requires_positive, caller]));
    let diag = output
        .diagnostics
        .iter()
        .find(|d| d.code == ErrorCode::E3001)
        .expect("expected E3001");
    let structured = diag.structured.as_ref().expect("structured payload");
    assert!(structured.counterexample.is_some());
}

/// Unresolved names get "did you mean" suggestions.
#[test]
fn unresolved_name_suggests_similar() {
    let mut b = AstBuilder::new();

    let s_param = b.param("s", Some(b.ty("Str")));
    let s_use = b.ident("s");
    let inner_call = b.call_named("println", vec![s_use]);
    let inner_stmt = b.expr_stmt(inner_call);
    let cl_body = b.block(vec![inner_stmt], None);
    let console_log = b.function(
        "console_log",
        vec![s_param],
        Some(b.ty("Unit")),
        vec!["IO".to_string()],
        cl_body,
    );

    let msg = b.str("hi");
    let bad_call = b.call_named("consol_log", vec![msg]);
    let bad_stmt = b.expr_stmt(bad_call);
    let main_body = b.block(vec![bad_stmt], None);
    let main = b.function(
        "main",
        vec![],
        Some(b.ty("Unit")),
        vec!["IO".to_string()],
        main_body,
    );

    let output = check_program(&program(vec![console_log, main]));
    let diag = output
        .diagnostics
        .iter()
        .find(|d| d.code == ErrorCode::E1001)
        .expect("expected E1001");
    let structured = diag.structured.as_ref().expect("structured payload");
    assert_eq!(structured.similar_names, vec!["console_log".to_string()]);
}

/// `Status = Active | Pending | Closed` matched on two variants.
#[test]
fn non_exhaustive_match_is_e2015() {
    let mut b = AstBuilder::new();
    let status = b.sum_decl(
        "Status",
        vec![("Active", vec![]), ("Pending", vec![]), ("Closed", vec![])],
    );

    let s_param = b.param("s", Some(b.ty("Status")));
    let scrutinee = b.ident("s");
    let active_pat = b.variant_pattern("Active", vec![]);
    let one = b.int(1);
    let active_arm = b.arm(active_pat, None, one);
    let closed_pat = b.variant_pattern("Closed", vec![]);
    let two = b.int(2);
    let closed_arm = b.arm(closed_pat, None, two);
    let match_expr = b.match_expr(scrutinee, vec![active_arm, closed_arm]);
    let body = b.block(vec![], Some(match_expr));
    let f = b.function("classify", vec![s_param], Some(b.ty("Int")), vec![], body);

    let output = check_program(&program(vec![status, f]));
    let diag = output
        .diagnostics
        .iter()
        .find(|d| d.code == ErrorCode::E2015)
        .expect("expected E2015");
    let structured = diag.structured.as_ref().expect("structured payload");
    assert_eq!(structured.missing_patterns.len(), 1);
    let missing = &structured.missing_patterns[0];
    assert_eq!(missing.description, "Pending");
    assert_eq!(missing.variant_name.as_deref(), Some("Pending"));
    assert_eq!(missing.type_name.as_deref(), Some("Status"));
    assert!(!missing.has_payload);
}

/// Wrong argument count is E2002 with arity payload.
#[test]
fn arity_mismatch_is_e2002() {
    let mut b = AstBuilder::new();
    let a_param = b.param("a", Some(b.ty("Int")));
    let b_param = b.param("b", Some(b.ty("Int")));
    let a_use = b.ident("a");
    let b_use = b.ident("b");
    let sum = b.binary(BinOp::Add, a_use, b_use);
    let add_body = b.block(vec![], Some(sum));
    let add = b.function("add", vec![a_param, b_param], Some(b.ty("Int")), vec![], add_body);

    let one = b.int(1);
    let call = b.call_named("add", vec![one]);
    let main_body = b.block(vec![], Some(call));
    let main = b.function("main", vec![], Some(b.ty("Int")), vec![], main_body);

    let output = check_program(&program(vec![add, main]));
    let diag = output
        .diagnostics
        .iter()
        .find(|d| d.code == ErrorCode::E2002)
        .expect("expected E2002");
    let structured = diag.structured.as_ref().expect("structured payload");
    assert_eq!(structured.expected_arity, Some(2));
    assert_eq!(structured.found_arity, Some(1));
}

/// Unused let bindings warn with W0001.
#[test]
fn unused_binding_is_w0001() {
    let mut b = AstBuilder::new();
    let one = b.int(1);
    let let_unused = b.let_stmt("unused", false, None, one);
    let two = b.int(2);
    let body = b.block(vec![let_unused], Some(two));
    let f = b.function("f", vec![], Some(b.ty("Int")), vec![], body);

    let output = check_program(&program(vec![f]));
    let diag = output
        .diagnostics
        .iter()
        .find(|d| d.code == ErrorCode::W0001)
        .expect("expected W0001");
    assert!(!diag.is_error());
    assert_eq!(
        diag.structured.as_ref().and_then(|s| s.name.as_deref()),
        Some("unused")
    );
}

/// `?` in a function without the Err effect is E4002.
#[test]
fn propagate_without_err_effect_is_e4002() {
    let mut b = AstBuilder::new();
    let opt_param = b.param(
        "o",
        Some(clank_ir::TypeExpr::Name {
            name: "Option".to_string(),
            args: vec![b.ty("Int")],
            span: clank_ir::Span::DUMMY,
        }),
    );
    let o_use = b.ident("o");
    let propagate = b.expr(clank_ir::ExprKind::Propagate {
        operand: Box::new(o_use),
    });
    let body = b.block(vec![], Some(propagate));
    let f = b.function("unwrap_it", vec![opt_param], Some(b.ty("Int")), vec![], body);

    let output = check_program(&program(vec![f]));
    let diag = output
        .diagnostics
        .iter()
        .find(|d| d.code == ErrorCode::E4002)
        .expect("expected E4002");
    let structured = diag.structured.as_ref().expect("structured payload");
    assert_eq!(structured.effect.as_deref(), Some("Err"));
    assert_eq!(structured.function.as_deref(), Some("unwrap_it"));
}

/// Type holes record expectations and fill candidates.
#[test]
fn hole_collects_fill_candidates() {
    let mut b = AstBuilder::new();
    let one = b.int(1);
    let let_count = b.let_stmt("count", false, None, one);
    let count_use = b.ident("count");
    let hole = b.hole();
    let sum = b.binary(BinOp::Add, count_use, hole);
    let body = b.block(vec![let_count], Some(sum));
    let f = b.function("f", vec![], Some(b.ty("Int")), vec![], body);

    let output = check_program(&program(vec![f]));
    assert_eq!(output.holes.len(), 1);
    let hole = &output.holes[0];
    assert!(hole.node_id.is_some());
    assert!(hole.fill_candidates.contains(&"count".to_string()));
}

/// Duplicate top-level definitions are E1002.
#[test]
fn duplicate_definition_is_e1002() {
    let mut b = AstBuilder::new();
    let one = b.int(1);
    let body1 = b.block(vec![], Some(one));
    let f1 = b.function("f", vec![], Some(b.ty("Int")), vec![], body1);
    let two = b.int(2);
    let body2 = b.block(vec![], Some(two));
    let f2 = b.function("f", vec![], Some(b.ty("Int")), vec![], body2);

    let output = check_program(&program(vec![f1, f2]));
    assert!(output
        .diagnostics
        .iter()
        .any(|d| d.code == ErrorCode::E1002));
}

/// A misspelled type annotation is E1005 with suggestions.
#[test]
fn unresolved_type_suggests_similar() {
    let mut b = AstBuilder::new();
    let s_param = b.param("s", Some(b.ty("Strr")));
    let s_use = b.ident("s");
    let body = b.block(vec![], Some(s_use));
    let f = b.function("echo", vec![s_param], Some(b.ty("Strr")), vec![], body);

    let output = check_program(&program(vec![f]));
    let diag = output
        .diagnostics
        .iter()
        .find(|d| d.code == ErrorCode::E1005)
        .expect("expected E1005");
    let structured = diag.structured.as_ref().expect("structured payload");
    assert_eq!(structured.name.as_deref(), Some("Strr"));
    assert_eq!(structured.similar_types.first().map(String::as_str), Some("Str"));
    assert!(diag.primary_node_id.is_some());
}

/// Record field access with a typo suggests the near miss.
#[test]
fn unknown_field_suggests_similar() {
    let mut b = AstBuilder::new();
    let point = b.record_decl("Point", vec![("x", b.ty("Int")), ("y", b.ty("Int"))]);

    let p_param = b.param("p", Some(b.ty("Point")));
    let p_use = b.ident("p");
    let access = b.field(p_use, "xx");
    let body = b.block(vec![], Some(access));
    let f = b.function("get_x", vec![p_param], Some(b.ty("Int")), vec![], body);

    let output = check_program(&program(vec![point, f]));
    let diag = output
        .diagnostics
        .iter()
        .find(|d| d.code == ErrorCode::E2004)
        .expect("expected E2004");
    let structured = diag.structured.as_ref().expect("structured payload");
    assert_eq!(structured.field.as_deref(), Some("xx"));
    assert_eq!(structured.similar_fields, vec!["x".to_string()]);
}
