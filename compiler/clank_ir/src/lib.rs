//! Shared IR types for the Clank compiler.
//!
//! This crate defines the data every later phase consumes: source spans,
//! node identifiers, and the abstract syntax tree. It has no semantic
//! knowledge - types, facts, and diagnostics live in their own crates.

mod ast;
pub mod build;
mod node_id;
mod span;

pub use ast::{
    BinOp, Block, Decl, DeclKind, Expr, ExprKind, FieldDef, FnDecl, IntSuffix, Literal, MatchArm,
    Param, Pattern, PatternKind, Program, RecordField, Stmt, StmtKind, TypeExpr, UnOp, VariantDef,
};
pub use node_id::{NodeId, NodeIdGen};
pub use span::{Pos, Span};
