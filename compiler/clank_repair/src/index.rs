//! AST node index.
//!
//! One walk over the program builds `node_id -> node`, plus the two
//! name-scoped maps repair handlers need: `let` statements by bound name
//! (mutability fixes) and function declarations by name (effect widening).
//! Repairs read from the index and never hold node pointers across it.

use rustc_hash::FxHashMap;

use clank_ir::{
    Block, Decl, DeclKind, Expr, ExprKind, MatchArm, NodeId, Param, Pattern, PatternKind, Program,
    Stmt, StmtKind,
};

/// A reference to any indexed AST node.
#[derive(Copy, Clone, Debug)]
pub enum NodeRef<'a> {
    Decl(&'a Decl),
    Stmt(&'a Stmt),
    Expr(&'a Expr),
    Pattern(&'a Pattern),
    Arm(&'a MatchArm),
    Param(&'a Param),
    Block(&'a Block),
}

/// Index over every node of a program.
pub struct AstIndex<'a> {
    nodes: FxHashMap<NodeId, NodeRef<'a>>,
    let_stmts_by_name: FxHashMap<String, &'a Stmt>,
    fn_decls_by_name: FxHashMap<String, &'a Decl>,
}

impl<'a> AstIndex<'a> {
    /// Walk the program and build the index.
    pub fn build(program: &'a Program) -> Self {
        let mut index = AstIndex {
            nodes: FxHashMap::default(),
            let_stmts_by_name: FxHashMap::default(),
            fn_decls_by_name: FxHashMap::default(),
        };
        for decl in &program.decls {
            index.visit_decl(decl);
        }
        index
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'a>> {
        self.nodes.get(&id).copied()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn let_stmt(&self, name: &str) -> Option<&'a Stmt> {
        self.let_stmts_by_name.get(name).copied()
    }

    pub fn fn_decl(&self, name: &str) -> Option<&'a Decl> {
        self.fn_decls_by_name.get(name).copied()
    }

    pub fn expr(&self, id: NodeId) -> Option<&'a Expr> {
        match self.node(id)? {
            NodeRef::Expr(expr) => Some(expr),
            _ => None,
        }
    }

    fn visit_decl(&mut self, decl: &'a Decl) {
        self.nodes.insert(decl.id, NodeRef::Decl(decl));
        if let DeclKind::Function(func) = &decl.kind {
            self.fn_decls_by_name.insert(func.name.clone(), decl);
            for param in &func.params {
                self.nodes.insert(param.id, NodeRef::Param(param));
            }
            self.visit_block(&func.body);
        }
    }

    fn visit_block(&mut self, block: &'a Block) {
        self.nodes.insert(block.id, NodeRef::Block(block));
        for stmt in &block.stmts {
            self.visit_stmt(stmt);
        }
        if let Some(tail) = &block.tail {
            self.visit_expr(tail);
        }
    }

    fn visit_stmt(&mut self, stmt: &'a Stmt) {
        self.nodes.insert(stmt.id, NodeRef::Stmt(stmt));
        match &stmt.kind {
            StmtKind::Let { pattern, init, .. } => {
                if let PatternKind::Ident { name } = &pattern.kind {
                    self.let_stmts_by_name.insert(name.clone(), stmt);
                }
                self.visit_pattern(pattern);
                self.visit_expr(init);
            }
            StmtKind::Assign { target, value } => {
                self.visit_expr(target);
                self.visit_expr(value);
            }
            StmtKind::For {
                pattern,
                iter,
                body,
            } => {
                self.visit_pattern(pattern);
                self.visit_expr(iter);
                self.visit_block(body);
            }
            StmtKind::While { cond, body } => {
                self.visit_expr(cond);
                self.visit_block(body);
            }
            StmtKind::Return { value } => {
                if let Some(value) = value {
                    self.visit_expr(value);
                }
            }
            StmtKind::Assert { cond } => self.visit_expr(cond),
            StmtKind::Expr { expr } => self.visit_expr(expr),
        }
    }

    fn visit_expr(&mut self, expr: &'a Expr) {
        self.nodes.insert(expr.id, NodeRef::Expr(expr));
        match &expr.kind {
            ExprKind::Literal { .. } | ExprKind::Ident { .. } | ExprKind::Hole { .. } => {}
            ExprKind::Binary { lhs, rhs, .. } => {
                self.visit_expr(lhs);
                self.visit_expr(rhs);
            }
            ExprKind::Unary { operand, .. } => self.visit_expr(operand),
            ExprKind::Call { callee, args } => {
                self.visit_expr(callee);
                for arg in args {
                    self.visit_expr(arg);
                }
            }
            ExprKind::Lambda { params, body } => {
                for param in params {
                    self.nodes.insert(param.id, NodeRef::Param(param));
                }
                self.visit_expr(body);
            }
            ExprKind::If {
                cond,
                then_block,
                else_block,
            } => {
                self.visit_expr(cond);
                self.visit_block(then_block);
                if let Some(els) = else_block {
                    self.visit_block(els);
                }
            }
            ExprKind::Match { scrutinee, arms } => {
                self.visit_expr(scrutinee);
                for arm in arms {
                    self.nodes.insert(arm.id, NodeRef::Arm(arm));
                    self.visit_pattern(&arm.pattern);
                    if let Some(guard) = &arm.guard {
                        self.visit_expr(guard);
                    }
                    self.visit_expr(&arm.body);
                }
            }
            ExprKind::Block { block } => self.visit_block(block),
            ExprKind::Array { elems } | ExprKind::Tuple { elems } => {
                for elem in elems {
                    self.visit_expr(elem);
                }
            }
            ExprKind::RecordLit { fields, .. } => {
                for field in fields {
                    self.visit_expr(&field.value);
                }
            }
            ExprKind::Index { base, index } => {
                self.visit_expr(base);
                self.visit_expr(index);
            }
            ExprKind::Field { base, .. } => self.visit_expr(base),
            ExprKind::Propagate { operand } => self.visit_expr(operand),
            ExprKind::Range { start, end } => {
                self.visit_expr(start);
                self.visit_expr(end);
            }
        }
    }

    fn visit_pattern(&mut self, pattern: &'a Pattern) {
        self.nodes.insert(pattern.id, NodeRef::Pattern(pattern));
        match &pattern.kind {
            PatternKind::Tuple { elems } | PatternKind::Variant { args: elems, .. } => {
                for sub in elems {
                    self.visit_pattern(sub);
                }
            }
            PatternKind::Wildcard | PatternKind::Ident { .. } | PatternKind::Literal { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clank_ir::build::{program, AstBuilder};

    #[test]
    fn index_covers_all_nodes() {
        let mut b = AstBuilder::new();
        let one = b.int(1);
        let let_x = b.let_stmt("x", false, None, one);
        let x_use = b.ident("x");
        let body = b.block(vec![let_x.clone()], Some(x_use));
        let f = b.function("f", vec![], Some(b.ty("Int")), vec![], body);
        let prog = program(vec![f]);

        let index = AstIndex::build(&prog);
        assert!(index.fn_decl("f").is_some());
        let let_stmt = index.let_stmt("x").expect("let x indexed");
        assert_eq!(let_stmt.id, let_x.id);
        assert!(index.node(let_x.id).is_some());
    }
}
