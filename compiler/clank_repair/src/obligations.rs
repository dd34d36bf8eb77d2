//! Per-obligation and per-hole repair handlers.
//!
//! Obligation repairs come from hint templates: a `guard` hint becomes a
//! wrap around the obligation's node, an `assert` hint becomes an inserted
//! assertion. `refine_param` and `info` hints are informational only. Holes
//! get one fill repair per candidate.

use clank_diagnostic::{Confidence, HintStrategy, Obligation, TypeHole};
use clank_ir::{BinOp, Expr, ExprKind, Literal, NodeId, Span, Stmt, StmtKind, UnOp};
use clank_types::refine::{ArithOp, CompareOp, Predicate, Term};
use clank_types::parse_predicate;

use crate::{
    node_value, ExpectedDelta, PatchOp, RepairCandidate, RepairEngine, RepairKind, RepairScope,
    RepairTargets, Safety,
};

impl RepairEngine<'_> {
    pub(crate) fn repair_obligation(&mut self, obligation: &Obligation) {
        let Some(node) = obligation.primary_node_id else {
            return;
        };
        for hint in &obligation.hints {
            match hint.strategy {
                HintStrategy::Guard => {
                    let Some(template) = &hint.template else {
                        continue;
                    };
                    // The guard template is `if <cond> { ... }`; the wrap
                    // condition is the text between.
                    let Some(cond) = template
                        .strip_prefix("if ")
                        .and_then(|t| t.strip_suffix(" { ... }"))
                    else {
                        continue;
                    };
                    let id = self.alloc_id();
                    self.push(RepairCandidate {
                        id,
                        title: format!("Guard with `if {cond}`"),
                        confidence: hint.confidence,
                        safety: Safety::LikelyPreserving,
                        kind: RepairKind::BoundaryValidation,
                        scope: RepairScope {
                            node_count: 1,
                            crosses_function: false,
                        },
                        targets: RepairTargets {
                            node_ids: vec![node],
                            obligation_ids: vec![obligation.id],
                            ..RepairTargets::default()
                        },
                        edits: vec![PatchOp::Wrap {
                            node_id: node,
                            wrapper: format!("if {cond} {{ @ }}"),
                            hole_ref: "@".to_string(),
                        }],
                        expected_delta: ExpectedDelta {
                            obligations_discharged: vec![obligation.id],
                            ..ExpectedDelta::default()
                        },
                        rationale: format!(
                            "inside the guard `{cond}` is a known fact, so `{}` discharges",
                            obligation.goal
                        ),
                        preconditions: None,
                    });
                }
                HintStrategy::Assert => {
                    // Reconstruct the assert statement from the goal's
                    // canonical form; skip if it does not parse back.
                    let Ok(goal) = parse_predicate(&obligation.goal) else {
                        continue;
                    };
                    let Some(cond) = pred_to_expr(&goal) else {
                        continue;
                    };
                    let assert_stmt = Stmt {
                        id: NodeId::SYNTHETIC,
                        span: Span::DUMMY,
                        kind: StmtKind::Assert { cond },
                    };
                    let id = self.alloc_id();
                    self.push(RepairCandidate {
                        id,
                        title: format!("Assert `{}` beforehand", obligation.goal),
                        confidence: hint.confidence,
                        safety: Safety::BehaviorChanging,
                        kind: RepairKind::BoundaryValidation,
                        scope: RepairScope {
                            node_count: 1,
                            crosses_function: false,
                        },
                        targets: RepairTargets {
                            node_ids: vec![node],
                            obligation_ids: vec![obligation.id],
                            ..RepairTargets::default()
                        },
                        edits: vec![PatchOp::InsertBefore {
                            node_id: node,
                            new_node: node_value(&assert_stmt),
                        }],
                        expected_delta: ExpectedDelta {
                            obligations_discharged: vec![obligation.id],
                            ..ExpectedDelta::default()
                        },
                        rationale: format!(
                            "the assertion establishes `{}` as a fact (and panics at runtime \
                             when it does not hold)",
                            obligation.goal
                        ),
                        preconditions: None,
                    });
                }
                // Informational hints produce no patch.
                HintStrategy::RefineParam | HintStrategy::Info => {}
            }
        }
    }

    pub(crate) fn repair_hole(&mut self, hole: &TypeHole) {
        let Some(node) = hole.node_id else {
            return;
        };
        for (i, candidate) in hole.fill_candidates.iter().enumerate() {
            let filler = Expr {
                id: NodeId::SYNTHETIC,
                span: Span::DUMMY,
                kind: ExprKind::Ident {
                    name: candidate.clone(),
                },
            };
            let id = self.alloc_id();
            self.push(RepairCandidate {
                id,
                title: format!("Fill hole with `{candidate}`"),
                confidence: if i == 0 {
                    Confidence::High
                } else {
                    Confidence::Medium
                },
                safety: Safety::BehaviorChanging,
                kind: RepairKind::LocalFix,
                scope: RepairScope {
                    node_count: 1,
                    crosses_function: false,
                },
                targets: RepairTargets {
                    node_ids: vec![node],
                    hole_ids: vec![hole.id],
                    ..RepairTargets::default()
                },
                edits: vec![PatchOp::ReplaceNode {
                    node_id: node,
                    new_node: node_value(&filler),
                }],
                expected_delta: ExpectedDelta {
                    holes_filled: vec![hole.id],
                    ..ExpectedDelta::default()
                },
                rationale: format!(
                    "`{candidate}` is in scope with type `{}`",
                    hole.expected_type
                ),
                preconditions: None,
            });
        }
    }
}

/// Render a predicate back into expression AST (synthetic ids).
fn pred_to_expr(pred: &Predicate) -> Option<Expr> {
    let kind = match pred {
        Predicate::Compare(op, lhs, rhs) => ExprKind::Binary {
            op: compare_binop(*op),
            lhs: Box::new(term_to_expr(lhs)?),
            rhs: Box::new(term_to_expr(rhs)?),
        },
        Predicate::And(lhs, rhs) => ExprKind::Binary {
            op: BinOp::And,
            lhs: Box::new(pred_to_expr(lhs)?),
            rhs: Box::new(pred_to_expr(rhs)?),
        },
        Predicate::Or(lhs, rhs) => ExprKind::Binary {
            op: BinOp::Or,
            lhs: Box::new(pred_to_expr(lhs)?),
            rhs: Box::new(pred_to_expr(rhs)?),
        },
        Predicate::Not(inner) => ExprKind::Unary {
            op: UnOp::Not,
            operand: Box::new(pred_to_expr(inner)?),
        },
        Predicate::Call(name, args) => ExprKind::Call {
            callee: Box::new(synth(ExprKind::Ident { name: name.clone() })),
            args: args
                .iter()
                .map(term_to_expr)
                .collect::<Option<Vec<_>>>()?,
        },
        Predicate::True => ExprKind::Literal {
            value: Literal::Bool { value: true },
        },
        Predicate::False => ExprKind::Literal {
            value: Literal::Bool { value: false },
        },
        Predicate::Unknown(_) => return None,
    };
    Some(synth(kind))
}

fn term_to_expr(term: &Term) -> Option<Expr> {
    let kind = match term {
        Term::Var(name) => ExprKind::Ident { name: name.clone() },
        Term::Int(value) => ExprKind::Literal {
            value: Literal::Int {
                value: value.clone(),
                suffix: None,
            },
        },
        Term::Bool(value) => ExprKind::Literal {
            value: Literal::Bool { value: *value },
        },
        Term::Str(value) => ExprKind::Literal {
            value: Literal::Str {
                value: value.clone(),
            },
        },
        Term::Binop(op, lhs, rhs) => ExprKind::Binary {
            op: arith_binop(*op),
            lhs: Box::new(term_to_expr(lhs)?),
            rhs: Box::new(term_to_expr(rhs)?),
        },
        Term::Call(name, args) => ExprKind::Call {
            callee: Box::new(synth(ExprKind::Ident { name: name.clone() })),
            args: args
                .iter()
                .map(term_to_expr)
                .collect::<Option<Vec<_>>>()?,
        },
        Term::Field(base, field) => ExprKind::Field {
            base: Box::new(term_to_expr(base)?),
            name: field.clone(),
        },
    };
    Some(synth(kind))
}

fn synth(kind: ExprKind) -> Expr {
    Expr {
        id: NodeId::SYNTHETIC,
        span: Span::DUMMY,
        kind,
    }
}

fn compare_binop(op: CompareOp) -> BinOp {
    match op {
        CompareOp::Eq => BinOp::Eq,
        CompareOp::Ne => BinOp::Ne,
        CompareOp::Lt => BinOp::Lt,
        CompareOp::Le => BinOp::Le,
        CompareOp::Gt => BinOp::Gt,
        CompareOp::Ge => BinOp::Ge,
    }
}

fn arith_binop(op: ArithOp) -> BinOp {
    match op {
        ArithOp::Add => BinOp::Add,
        ArithOp::Sub => BinOp::Sub,
        ArithOp::Mul => BinOp::Mul,
        ArithOp::Div => BinOp::Div,
        ArithOp::Rem => BinOp::Rem,
    }
}
