//! Per-diagnostic repair handlers.
//!
//! Each error code with a repair strategy gets a handler producing zero or
//! more candidates. First-choice suggestions (closest name, preferred
//! conversion) come out at high confidence, the rest at medium.

use clank_diagnostic::{Confidence, Diagnostic, ErrorCode};
use clank_ir::{
    DeclKind, Expr, ExprKind, Literal, MatchArm, NodeId, Pattern, PatternKind, Span, StmtKind,
};

use crate::{
    node_value, ExpectedDelta, PatchOp, RepairCandidate, RepairEngine, RepairKind, RepairScope,
    RepairTargets, Safety,
};

fn synth_expr(kind: ExprKind) -> Expr {
    Expr {
        id: NodeId::SYNTHETIC,
        span: Span::DUMMY,
        kind,
    }
}

impl RepairEngine<'_> {
    pub(crate) fn repair_diagnostic(&mut self, diagnostic: &Diagnostic) {
        match diagnostic.code {
            ErrorCode::E1001 => self.rename_from_suggestions(diagnostic, SuggestionSource::Names),
            ErrorCode::E1005 => self.rename_from_suggestions(diagnostic, SuggestionSource::Types),
            ErrorCode::E2001 => self.conversion_wrap(diagnostic),
            ErrorCode::E2002 => self.fix_arity(diagnostic),
            ErrorCode::E2003 => self.add_missing_field(diagnostic),
            ErrorCode::E2004 => self.rename_field(diagnostic),
            ErrorCode::E2013 => self.make_mutable(diagnostic),
            ErrorCode::E2015 => self.add_wildcard_arm(diagnostic),
            ErrorCode::E4001 => self.widen_effect(diagnostic, None),
            ErrorCode::E4002 => self.widen_effect(diagnostic, Some("Err")),
            ErrorCode::W0001 => self.underscore_unused(diagnostic),
            _ => {}
        }
    }

    // ── E1001 / E1005: rename to a similar symbol ─────────────

    fn rename_from_suggestions(&mut self, diagnostic: &Diagnostic, source: SuggestionSource) {
        let Some(structured) = &diagnostic.structured else {
            return;
        };
        let Some(from) = structured.name.clone() else {
            return;
        };
        let Some(node) = diagnostic.primary_node_id else {
            return;
        };
        let suggestions = match source {
            SuggestionSource::Names => structured.similar_names.clone(),
            SuggestionSource::Types => structured.similar_types.clone(),
        };
        for (i, to) in suggestions.iter().enumerate() {
            let id = self.alloc_id();
            self.push(RepairCandidate {
                id,
                title: format!("Rename '{from}' to '{to}'"),
                confidence: rank_confidence(i),
                safety: Safety::BehaviorChanging,
                kind: RepairKind::LocalFix,
                scope: RepairScope {
                    node_count: 1,
                    crosses_function: false,
                },
                targets: RepairTargets {
                    node_ids: vec![node],
                    diagnostic_codes: vec![diagnostic.code.as_str().to_string()],
                    ..RepairTargets::default()
                },
                edits: vec![PatchOp::RenameSymbol {
                    node_id: node,
                    from: from.clone(),
                    to: to.clone(),
                }],
                expected_delta: ExpectedDelta {
                    diagnostics_resolved: vec![diagnostic.id],
                    ..ExpectedDelta::default()
                },
                rationale: format!("`{to}` is the closest name in scope to `{from}`"),
                preconditions: None,
            });
        }
    }

    // ── E2001: conversion call ────────────────────────────────

    fn conversion_wrap(&mut self, diagnostic: &Diagnostic) {
        let Some(structured) = &diagnostic.structured else {
            return;
        };
        let (Some(expected), Some(actual)) = (&structured.expected, &structured.actual) else {
            return;
        };
        let Some(node) = diagnostic.primary_node_id else {
            return;
        };
        let conversion = match (expected.as_str(), actual.as_str()) {
            ("Float", "Int" | "Int32" | "Int64" | "Nat") => {
                Some(("int_to_float", Confidence::High, "converts without loss"))
            }
            ("Int" | "Int32" | "Int64" | "Nat", "Float") => Some((
                "float_to_int",
                Confidence::Medium,
                "truncates the fractional part",
            )),
            ("Str", _) => Some(("to_string", Confidence::Medium, "renders the value as text")),
            _ => None,
        };
        let Some((function, confidence, note)) = conversion else {
            return;
        };
        let id = self.alloc_id();
        self.push(RepairCandidate {
            id,
            title: format!("Convert with `{function}`"),
            confidence,
            safety: Safety::BehaviorChanging,
            kind: RepairKind::LocalFix,
            scope: RepairScope {
                node_count: 1,
                crosses_function: false,
            },
            targets: RepairTargets {
                node_ids: vec![node],
                diagnostic_codes: vec!["E2001".to_string()],
                ..RepairTargets::default()
            },
            edits: vec![PatchOp::Wrap {
                node_id: node,
                wrapper: format!("{function}(@)"),
                hole_ref: "@".to_string(),
            }],
            expected_delta: ExpectedDelta {
                diagnostics_resolved: vec![diagnostic.id],
                ..ExpectedDelta::default()
            },
            rationale: format!("`{function}` turns `{actual}` into `{expected}`; {note}"),
            preconditions: None,
        });
    }

    // ── E2002: adjust argument count ──────────────────────────

    fn fix_arity(&mut self, diagnostic: &Diagnostic) {
        let Some(structured) = &diagnostic.structured else {
            return;
        };
        let (Some(expected), Some(found)) =
            (structured.expected_arity, structured.found_arity)
        else {
            return;
        };
        let Some(node) = diagnostic.primary_node_id else {
            return;
        };
        let Some(call) = self.index.expr(node) else {
            return;
        };
        let ExprKind::Call { callee, args } = &call.kind else {
            return;
        };

        let mut new_args = args.clone();
        let title;
        if found < expected {
            for _ in found..expected {
                new_args.push(synth_expr(ExprKind::Ident {
                    name: "todo_arg".to_string(),
                }));
            }
            let n = expected - found;
            title = format!("Add {n} placeholder argument(s)");
        } else {
            new_args.truncate(expected);
            let n = found - expected;
            title = format!("Remove {n} excess argument(s)");
        }
        let new_call = synth_expr(ExprKind::Call {
            callee: callee.clone(),
            args: new_args,
        });

        let id = self.alloc_id();
        self.push(RepairCandidate {
            id,
            title,
            confidence: Confidence::Medium,
            safety: Safety::BehaviorChanging,
            kind: RepairKind::LocalFix,
            scope: RepairScope {
                node_count: 1,
                crosses_function: false,
            },
            targets: RepairTargets {
                node_ids: vec![node],
                diagnostic_codes: vec!["E2002".to_string()],
                ..RepairTargets::default()
            },
            edits: vec![PatchOp::ReplaceNode {
                node_id: node,
                new_node: node_value(&new_call),
            }],
            expected_delta: ExpectedDelta {
                diagnostics_resolved: vec![diagnostic.id],
                ..ExpectedDelta::default()
            },
            rationale: format!("the call supplies {found} argument(s) but {expected} are needed"),
            preconditions: Some("placeholder arguments must be filled in".to_string()),
        });
    }

    // ── E2003: add the missing field ──────────────────────────

    fn add_missing_field(&mut self, diagnostic: &Diagnostic) {
        let Some(field) = diagnostic
            .structured
            .as_ref()
            .and_then(|s| s.field.clone())
        else {
            return;
        };
        let Some(node) = diagnostic.primary_node_id else {
            return;
        };
        // Only record literals can grow a field.
        let Some(expr) = self.index.expr(node) else {
            return;
        };
        if !matches!(expr.kind, ExprKind::RecordLit { .. }) {
            return;
        }

        let id = self.alloc_id();
        self.push(RepairCandidate {
            id,
            title: format!("Add missing field `{field}`"),
            confidence: Confidence::High,
            safety: Safety::BehaviorChanging,
            kind: RepairKind::LocalFix,
            scope: RepairScope {
                node_count: 1,
                crosses_function: false,
            },
            targets: RepairTargets {
                node_ids: vec![node],
                diagnostic_codes: vec!["E2003".to_string()],
                ..RepairTargets::default()
            },
            edits: vec![PatchOp::AddField {
                node_id: node,
                name: field.clone(),
                value: node_value(&synth_expr(ExprKind::Ident {
                    name: field.clone(),
                })),
            }],
            expected_delta: ExpectedDelta {
                diagnostics_resolved: vec![diagnostic.id],
                ..ExpectedDelta::default()
            },
            rationale: format!(
                "the literal lacks `{field}`; a placeholder identifier marks the value to supply"
            ),
            preconditions: Some(format!("a value for `{field}` must be in scope")),
        });
    }

    // ── E2004: rename to a similar field ──────────────────────

    fn rename_field(&mut self, diagnostic: &Diagnostic) {
        let Some(structured) = &diagnostic.structured else {
            return;
        };
        let Some(from) = structured.field.clone() else {
            return;
        };
        let Some(node) = diagnostic.primary_node_id else {
            return;
        };
        let suggestions = structured.similar_fields.clone();
        for (i, to) in suggestions.iter().enumerate() {
            let id = self.alloc_id();
            self.push(RepairCandidate {
                id,
                title: format!("Rename field '{from}' to '{to}'"),
                confidence: rank_confidence(i),
                safety: Safety::BehaviorChanging,
                kind: RepairKind::LocalFix,
                scope: RepairScope {
                    node_count: 1,
                    crosses_function: false,
                },
                targets: RepairTargets {
                    node_ids: vec![node],
                    diagnostic_codes: vec!["E2004".to_string()],
                    ..RepairTargets::default()
                },
                edits: vec![PatchOp::RenameField {
                    node_id: node,
                    from: from.clone(),
                    to: to.clone(),
                }],
                expected_delta: ExpectedDelta {
                    diagnostics_resolved: vec![diagnostic.id],
                    ..ExpectedDelta::default()
                },
                rationale: format!("`{to}` is the closest declared field to `{from}`"),
                preconditions: None,
            });
        }
    }

    // ── E2013: make the binding mutable ───────────────────────

    fn make_mutable(&mut self, diagnostic: &Diagnostic) {
        let Some(name) = diagnostic
            .structured
            .as_ref()
            .and_then(|s| s.name.clone())
        else {
            return;
        };
        let Some(let_stmt) = self.index.let_stmt(&name) else {
            return;
        };
        let mut new_stmt = let_stmt.clone();
        if let StmtKind::Let { mutable, .. } = &mut new_stmt.kind {
            *mutable = true;
        }

        let id = self.alloc_id();
        self.push(RepairCandidate {
            id,
            title: format!("Make '{name}' mutable"),
            confidence: Confidence::High,
            safety: Safety::BehaviorPreserving,
            kind: RepairKind::LocalFix,
            scope: RepairScope {
                node_count: 1,
                crosses_function: false,
            },
            targets: RepairTargets {
                node_ids: vec![let_stmt.id],
                diagnostic_codes: vec!["E2013".to_string()],
                ..RepairTargets::default()
            },
            edits: vec![PatchOp::ReplaceNode {
                node_id: let_stmt.id,
                new_node: node_value(&new_stmt),
            }],
            expected_delta: ExpectedDelta {
                diagnostics_resolved: vec![diagnostic.id],
                ..ExpectedDelta::default()
            },
            rationale: format!("`{name}` is assigned after its immutable declaration"),
            preconditions: None,
        });
    }

    // ── E2015: add a catch-all arm ────────────────────────────

    fn add_wildcard_arm(&mut self, diagnostic: &Diagnostic) {
        let Some(node) = diagnostic.primary_node_id else {
            return;
        };
        let Some(expr) = self.index.expr(node) else {
            return;
        };
        let ExprKind::Match { scrutinee, arms } = &expr.kind else {
            return;
        };

        let panic_call = synth_expr(ExprKind::Call {
            callee: Box::new(synth_expr(ExprKind::Ident {
                name: "panic".to_string(),
            })),
            args: vec![synth_expr(ExprKind::Literal {
                value: Literal::Str {
                    value: "unhandled match case".to_string(),
                },
            })],
        });
        let wildcard_arm = MatchArm {
            id: NodeId::SYNTHETIC,
            span: Span::DUMMY,
            pattern: Pattern {
                id: NodeId::SYNTHETIC,
                span: Span::DUMMY,
                kind: PatternKind::Wildcard,
            },
            guard: None,
            body: panic_call,
        };
        let mut new_arms = arms.clone();
        new_arms.push(wildcard_arm);
        let new_match = synth_expr(ExprKind::Match {
            scrutinee: scrutinee.clone(),
            arms: new_arms,
        });

        let missing = diagnostic
            .structured
            .as_ref()
            .map(|s| {
                s.missing_patterns
                    .iter()
                    .map(|m| m.description.clone())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();

        let id = self.alloc_id();
        self.push(RepairCandidate {
            id,
            title: "Add a catch-all arm".to_string(),
            confidence: Confidence::Medium,
            safety: Safety::LikelyPreserving,
            kind: RepairKind::LocalFix,
            scope: RepairScope {
                node_count: 1,
                crosses_function: false,
            },
            targets: RepairTargets {
                node_ids: vec![node],
                diagnostic_codes: vec!["E2015".to_string()],
                ..RepairTargets::default()
            },
            edits: vec![PatchOp::ReplaceNode {
                node_id: node,
                new_node: node_value(&new_match),
            }],
            expected_delta: ExpectedDelta {
                diagnostics_resolved: vec![diagnostic.id],
                ..ExpectedDelta::default()
            },
            rationale: format!("the match does not cover: {missing}"),
            preconditions: None,
        });
    }

    // ── E4001 / E4002: widen the function's effects ───────────

    fn widen_effect(&mut self, diagnostic: &Diagnostic, forced_effect: Option<&str>) {
        let Some(structured) = &diagnostic.structured else {
            return;
        };
        let Some(fn_name) = structured.function.clone() else {
            return;
        };
        let effect = match forced_effect {
            Some(effect) => effect.to_string(),
            None => match structured.effect.clone() {
                Some(effect) => effect,
                None => return,
            },
        };
        let Some(decl) = self.index.fn_decl(&fn_name) else {
            return;
        };
        // Already declared? Then this repair would be a no-op.
        if let DeclKind::Function(func) = &decl.kind {
            if func.effects.iter().any(|e| e == &effect) {
                return;
            }
        }

        let id = self.alloc_id();
        self.push(RepairCandidate {
            id,
            title: format!("Add {effect} effect to '{fn_name}'"),
            confidence: Confidence::Medium,
            safety: Safety::LikelyPreserving,
            kind: RepairKind::SemanticsChange,
            scope: RepairScope {
                node_count: 1,
                // The edit lands on the declaration, away from the
                // triggering call site.
                crosses_function: true,
            },
            targets: RepairTargets {
                node_ids: vec![decl.id],
                diagnostic_codes: vec![diagnostic.code.as_str().to_string()],
                ..RepairTargets::default()
            },
            edits: vec![PatchOp::WidenEffect {
                fn_id: decl.id,
                add_effects: vec![effect.clone()],
            }],
            expected_delta: ExpectedDelta {
                diagnostics_resolved: vec![diagnostic.id],
                ..ExpectedDelta::default()
            },
            rationale: format!(
                "`{fn_name}` performs `{effect}` but does not declare it; widening the signature \
                 makes the effect visible to callers"
            ),
            preconditions: None,
        });
    }

    // ── W0001: underscore the unused binding ──────────────────

    fn underscore_unused(&mut self, diagnostic: &Diagnostic) {
        let Some(name) = diagnostic
            .structured
            .as_ref()
            .and_then(|s| s.name.clone())
        else {
            return;
        };
        let Some(let_stmt) = self.index.let_stmt(&name) else {
            return;
        };
        let mut new_stmt = let_stmt.clone();
        if let StmtKind::Let { pattern, .. } = &mut new_stmt.kind {
            if let PatternKind::Ident { name: bound } = &mut pattern.kind {
                *bound = format!("_{name}");
            }
        }

        let id = self.alloc_id();
        self.push(RepairCandidate {
            id,
            title: format!("Rename '{name}' to '_{name}'"),
            confidence: Confidence::High,
            safety: Safety::BehaviorPreserving,
            kind: RepairKind::LocalFix,
            scope: RepairScope {
                node_count: 1,
                crosses_function: false,
            },
            targets: RepairTargets {
                node_ids: vec![let_stmt.id],
                diagnostic_codes: vec!["W0001".to_string()],
                ..RepairTargets::default()
            },
            edits: vec![PatchOp::ReplaceNode {
                node_id: let_stmt.id,
                new_node: node_value(&new_stmt),
            }],
            expected_delta: ExpectedDelta {
                diagnostics_resolved: vec![diagnostic.id],
                ..ExpectedDelta::default()
            },
            rationale: format!("`{name}` is never read; the underscore silences the warning"),
            preconditions: None,
        });
    }
}

enum SuggestionSource {
    Names,
    Types,
}

fn rank_confidence(index: usize) -> Confidence {
    if index == 0 {
        Confidence::High
    } else {
        Confidence::Medium
    }
}
