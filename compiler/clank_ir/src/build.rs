//! Programmatic AST construction.
//!
//! The parser collaborator allocates node ids as it builds the tree; this
//! builder gives tests and embedders the same capability without a parser.
//! Every node gets a unique id from the builder's allocator and a dummy
//! span unless one is supplied.

use num_bigint::BigInt;

use crate::{
    BinOp, Block, Decl, DeclKind, Expr, ExprKind, FieldDef, FnDecl, Literal, MatchArm, NodeId,
    NodeIdGen, Param, Pattern, PatternKind, Program, RecordField, Span, Stmt, StmtKind, TypeExpr,
    UnOp, VariantDef,
};

/// Builds AST nodes with sequentially allocated ids.
#[derive(Debug, Default)]
pub struct AstBuilder {
    ids: NodeIdGen,
}

impl AstBuilder {
    pub fn new() -> Self {
        AstBuilder::default()
    }

    pub fn fresh_id(&mut self) -> NodeId {
        self.ids.fresh()
    }

    // ── Declarations ──────────────────────────────────────────

    pub fn function(
        &mut self,
        name: impl Into<String>,
        params: Vec<Param>,
        ret: Option<TypeExpr>,
        effects: Vec<String>,
        body: Block,
    ) -> Decl {
        Decl {
            id: self.fresh_id(),
            span: Span::DUMMY,
            kind: DeclKind::Function(FnDecl {
                name: name.into(),
                type_params: Vec::new(),
                params,
                ret,
                effects,
                body,
            }),
        }
    }

    pub fn sum_decl(
        &mut self,
        name: impl Into<String>,
        variants: Vec<(&str, Vec<TypeExpr>)>,
    ) -> Decl {
        Decl {
            id: self.fresh_id(),
            span: Span::DUMMY,
            kind: DeclKind::Sum {
                name: name.into(),
                params: Vec::new(),
                variants: variants
                    .into_iter()
                    .map(|(vname, fields)| VariantDef {
                        name: vname.to_string(),
                        fields,
                        field_names: None,
                        span: Span::DUMMY,
                    })
                    .collect(),
            },
        }
    }

    pub fn record_decl(
        &mut self,
        name: impl Into<String>,
        fields: Vec<(&str, TypeExpr)>,
    ) -> Decl {
        Decl {
            id: self.fresh_id(),
            span: Span::DUMMY,
            kind: DeclKind::Record {
                name: name.into(),
                params: Vec::new(),
                fields: fields
                    .into_iter()
                    .map(|(fname, ty)| FieldDef {
                        name: fname.to_string(),
                        ty,
                        span: Span::DUMMY,
                    })
                    .collect(),
            },
        }
    }

    pub fn param(&mut self, name: impl Into<String>, ty: Option<TypeExpr>) -> Param {
        Param {
            id: self.fresh_id(),
            span: Span::DUMMY,
            name: name.into(),
            ty,
        }
    }

    // ── Blocks and statements ─────────────────────────────────

    pub fn block(&mut self, stmts: Vec<Stmt>, tail: Option<Expr>) -> Block {
        Block {
            id: self.fresh_id(),
            span: Span::DUMMY,
            stmts,
            tail: tail.map(Box::new),
        }
    }

    pub fn let_stmt(
        &mut self,
        name: impl Into<String>,
        mutable: bool,
        ty: Option<TypeExpr>,
        init: Expr,
    ) -> Stmt {
        let pattern = self.ident_pattern(name);
        self.stmt(StmtKind::Let {
            pattern,
            mutable,
            ty,
            init,
        })
    }

    pub fn assign_stmt(&mut self, target: Expr, value: Expr) -> Stmt {
        self.stmt(StmtKind::Assign { target, value })
    }

    pub fn expr_stmt(&mut self, expr: Expr) -> Stmt {
        self.stmt(StmtKind::Expr { expr })
    }

    pub fn assert_stmt(&mut self, cond: Expr) -> Stmt {
        self.stmt(StmtKind::Assert { cond })
    }

    pub fn return_stmt(&mut self, value: Option<Expr>) -> Stmt {
        self.stmt(StmtKind::Return { value })
    }

    pub fn stmt(&mut self, kind: StmtKind) -> Stmt {
        Stmt {
            id: self.fresh_id(),
            span: Span::DUMMY,
            kind,
        }
    }

    // ── Expressions ───────────────────────────────────────────

    pub fn expr(&mut self, kind: ExprKind) -> Expr {
        Expr {
            id: self.fresh_id(),
            span: Span::DUMMY,
            kind,
        }
    }

    pub fn int(&mut self, value: impl Into<BigInt>) -> Expr {
        self.expr(ExprKind::Literal {
            value: Literal::int(value),
        })
    }

    pub fn bool(&mut self, value: bool) -> Expr {
        self.expr(ExprKind::Literal {
            value: Literal::Bool { value },
        })
    }

    pub fn str(&mut self, value: impl Into<String>) -> Expr {
        self.expr(ExprKind::Literal {
            value: Literal::Str {
                value: value.into(),
            },
        })
    }

    pub fn unit(&mut self) -> Expr {
        self.expr(ExprKind::Literal {
            value: Literal::Unit,
        })
    }

    pub fn ident(&mut self, name: impl Into<String>) -> Expr {
        self.expr(ExprKind::Ident { name: name.into() })
    }

    pub fn binary(&mut self, op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
        self.expr(ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub fn unary(&mut self, op: UnOp, operand: Expr) -> Expr {
        self.expr(ExprKind::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    pub fn call(&mut self, callee: Expr, args: Vec<Expr>) -> Expr {
        self.expr(ExprKind::Call {
            callee: Box::new(callee),
            args,
        })
    }

    pub fn call_named(&mut self, name: impl Into<String>, args: Vec<Expr>) -> Expr {
        let callee = self.ident(name);
        self.call(callee, args)
    }

    pub fn if_expr(&mut self, cond: Expr, then_block: Block, else_block: Option<Block>) -> Expr {
        self.expr(ExprKind::If {
            cond: Box::new(cond),
            then_block,
            else_block,
        })
    }

    pub fn match_expr(&mut self, scrutinee: Expr, arms: Vec<MatchArm>) -> Expr {
        self.expr(ExprKind::Match {
            scrutinee: Box::new(scrutinee),
            arms,
        })
    }

    pub fn array(&mut self, elems: Vec<Expr>) -> Expr {
        self.expr(ExprKind::Array { elems })
    }

    pub fn record_lit(
        &mut self,
        name: Option<&str>,
        fields: Vec<(&str, Expr)>,
    ) -> Expr {
        let fields = fields
            .into_iter()
            .map(|(fname, value)| RecordField {
                name: fname.to_string(),
                value,
                span: Span::DUMMY,
            })
            .collect();
        self.expr(ExprKind::RecordLit {
            name: name.map(ToString::to_string),
            fields,
        })
    }

    pub fn field(&mut self, base: Expr, name: impl Into<String>) -> Expr {
        self.expr(ExprKind::Field {
            base: Box::new(base),
            name: name.into(),
        })
    }

    pub fn hole(&mut self) -> Expr {
        self.expr(ExprKind::Hole { name: None })
    }

    // ── Patterns and arms ─────────────────────────────────────

    pub fn pattern(&mut self, kind: PatternKind) -> Pattern {
        Pattern {
            id: self.fresh_id(),
            span: Span::DUMMY,
            kind,
        }
    }

    pub fn wildcard_pattern(&mut self) -> Pattern {
        self.pattern(PatternKind::Wildcard)
    }

    pub fn ident_pattern(&mut self, name: impl Into<String>) -> Pattern {
        self.pattern(PatternKind::Ident { name: name.into() })
    }

    pub fn variant_pattern(&mut self, name: impl Into<String>, args: Vec<Pattern>) -> Pattern {
        self.pattern(PatternKind::Variant {
            name: name.into(),
            args,
        })
    }

    pub fn arm(&mut self, pattern: Pattern, guard: Option<Expr>, body: Expr) -> MatchArm {
        MatchArm {
            id: self.fresh_id(),
            span: Span::DUMMY,
            pattern,
            guard,
            body,
        }
    }

    // ── Type expressions ──────────────────────────────────────

    pub fn ty(&self, name: impl Into<String>) -> TypeExpr {
        TypeExpr::name(name, Span::DUMMY)
    }

    /// A refined type annotation: `base{var: pred}` where `pred` is an
    /// ordinary expression over `var`.
    pub fn refined_ty(
        &self,
        base: TypeExpr,
        var: impl Into<String>,
        pred: Expr,
    ) -> TypeExpr {
        TypeExpr::Refined {
            base: Box::new(base),
            var: var.into(),
            pred: Box::new(pred),
            span: Span::DUMMY,
        }
    }
}

/// Assemble a program from declarations.
pub fn program(decls: Vec<Decl>) -> Program {
    Program { decls }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_allocates_unique_ids() {
        let mut build = AstBuilder::new();
        let a = build.int(1);
        let b = build.int(2);
        assert_ne!(a.id, b.id);
    }
}
