//! Abstract syntax tree for Clank programs.
//!
//! Every node carries an explicit `kind` discriminator in its serialized
//! form and a unique [`NodeId`]. Integer literals hold arbitrary-precision
//! values and serialize as strings. The AST serializes (for `canonical_ast`
//! and patch payloads) but is never deserialized here - constructing it from
//! source or JSON is the parser collaborator's job.

use std::fmt;

use num_bigint::BigInt;
use serde::Serialize;

use crate::{NodeId, Span};

fn bigint_as_string<S: serde::Serializer>(value: &BigInt, ser: S) -> Result<S::Ok, S::Error> {
    ser.serialize_str(&value.to_str_radix(10))
}

/// A complete program: an ordered list of top-level declarations.
#[derive(Clone, Debug, PartialEq, Default, Serialize)]
pub struct Program {
    pub decls: Vec<Decl>,
}

// ── Declarations ──────────────────────────────────────────────

/// A top-level declaration.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Decl {
    pub id: NodeId,
    pub span: Span,
    #[serde(flatten)]
    pub kind: DeclKind,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclKind {
    TypeAlias {
        name: String,
        params: Vec<String>,
        ty: TypeExpr,
    },
    Record {
        name: String,
        params: Vec<String>,
        fields: Vec<FieldDef>,
    },
    Sum {
        name: String,
        params: Vec<String>,
        variants: Vec<VariantDef>,
    },
    Function(FnDecl),
}

impl Decl {
    /// The declared name, for all declaration kinds.
    pub fn name(&self) -> &str {
        match &self.kind {
            DeclKind::TypeAlias { name, .. }
            | DeclKind::Record { name, .. }
            | DeclKind::Sum { name, .. } => name,
            DeclKind::Function(f) => &f.name,
        }
    }
}

/// A named field in a record declaration.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeExpr,
    pub span: Span,
}

/// A variant of a sum-type declaration.
///
/// `field_names` is present only for variants declared with named fields.
/// Pattern binding stays positional either way.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VariantDef {
    pub name: String,
    pub fields: Vec<TypeExpr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_names: Option<Vec<String>>,
    pub span: Span,
}

/// A function declaration.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FnDecl {
    pub name: String,
    pub type_params: Vec<String>,
    pub params: Vec<Param>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ret: Option<TypeExpr>,
    /// Declared effect names (e.g. `IO`, `Err`).
    pub effects: Vec<String>,
    pub body: Block,
}

/// A function or lambda parameter.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Param {
    pub id: NodeId,
    pub span: Span,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeExpr>,
}

// ── Statements ────────────────────────────────────────────────

/// A block: statements plus an optional tail expression giving its value.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Block {
    pub id: NodeId,
    pub span: Span,
    pub stmts: Vec<Stmt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tail: Option<Box<Expr>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Stmt {
    pub id: NodeId,
    pub span: Span,
    #[serde(flatten)]
    pub kind: StmtKind,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StmtKind {
    Let {
        pattern: Pattern,
        mutable: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        ty: Option<TypeExpr>,
        init: Expr,
    },
    Assign {
        target: Expr,
        value: Expr,
    },
    For {
        pattern: Pattern,
        iter: Expr,
        body: Block,
    },
    While {
        cond: Expr,
        body: Block,
    },
    Return {
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<Expr>,
    },
    Assert {
        cond: Expr,
    },
    Expr {
        expr: Expr,
    },
}

// ── Expressions ───────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Expr {
    pub id: NodeId,
    pub span: Span,
    #[serde(flatten)]
    pub kind: ExprKind,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExprKind {
    Literal {
        value: Literal,
    },
    Ident {
        name: String,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Lambda {
        params: Vec<Param>,
        body: Box<Expr>,
    },
    If {
        cond: Box<Expr>,
        then_block: Block,
        #[serde(skip_serializing_if = "Option::is_none")]
        else_block: Option<Block>,
    },
    Match {
        scrutinee: Box<Expr>,
        arms: Vec<MatchArm>,
    },
    Block {
        block: Block,
    },
    Array {
        elems: Vec<Expr>,
    },
    Tuple {
        elems: Vec<Expr>,
    },
    RecordLit {
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        fields: Vec<RecordField>,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Field {
        base: Box<Expr>,
        name: String,
    },
    /// The `?` postfix operator on `Option`/`Result` values.
    Propagate {
        operand: Box<Expr>,
    },
    Range {
        start: Box<Expr>,
        end: Box<Expr>,
    },
    /// A typed hole (`?name` in source); filled in by the programmer later.
    Hole {
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

/// One `name: value` entry in a record literal.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecordField {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

/// One arm of a `match` expression.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchArm {
    pub id: NodeId,
    pub span: Span,
    pub pattern: Pattern,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guard: Option<Expr>,
    pub body: Expr,
}

// ── Patterns ──────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Pattern {
    pub id: NodeId,
    pub span: Span,
    #[serde(flatten)]
    pub kind: PatternKind,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternKind {
    Wildcard,
    Ident { name: String },
    Literal { value: Literal },
    Tuple { elems: Vec<Pattern> },
    Variant { name: String, args: Vec<Pattern> },
}

impl Pattern {
    /// A wildcard or bare identifier matches any value.
    pub fn is_catch_all(&self) -> bool {
        matches!(
            self.kind,
            PatternKind::Wildcard | PatternKind::Ident { .. }
        )
    }
}

// ── Literals and operators ────────────────────────────────────

/// Suffix on an integer literal selecting a sized type.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntSuffix {
    I32,
    I64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Literal {
    Int {
        #[serde(serialize_with = "bigint_as_string")]
        value: BigInt,
        #[serde(skip_serializing_if = "Option::is_none")]
        suffix: Option<IntSuffix>,
    },
    Float {
        value: f64,
    },
    Bool {
        value: bool,
    },
    Str {
        value: String,
    },
    Unit,
}

impl Literal {
    /// Unsuffixed integer literal.
    pub fn int(value: impl Into<BigInt>) -> Self {
        Literal::Int {
            value: value.into(),
            suffix: None,
        }
    }
}

/// Binary operators.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    /// `++` string or array concatenation.
    Concat,
    /// `|>` pipeline application.
    Pipe,
}

impl BinOp {
    /// Source-level spelling of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Pow => "^",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Concat => "++",
            BinOp::Pipe => "|>",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unary operators.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnOp {
    Neg,
    Not,
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnOp::Neg => "-",
            UnOp::Not => "!",
        })
    }
}

// ── Type expressions ──────────────────────────────────────────

/// Syntactic (unresolved) types as written in source.
///
/// The refinement predicate on `Refined` is an ordinary expression over the
/// bound variable; the checker lowers it with the same extractor it uses for
/// `if` and `assert` conditions.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeExpr {
    Name {
        name: String,
        args: Vec<TypeExpr>,
        span: Span,
    },
    Fn {
        params: Vec<TypeExpr>,
        ret: Box<TypeExpr>,
        effects: Vec<String>,
        span: Span,
    },
    Tuple {
        elems: Vec<TypeExpr>,
        span: Span,
    },
    Array {
        elem: Box<TypeExpr>,
        span: Span,
    },
    Record {
        fields: Vec<FieldDef>,
        is_open: bool,
        span: Span,
    },
    Refined {
        base: Box<TypeExpr>,
        var: String,
        pred: Box<Expr>,
        span: Span,
    },
}

impl TypeExpr {
    /// A bare named type with no arguments.
    pub fn name(name: impl Into<String>, span: Span) -> Self {
        TypeExpr::Name {
            name: name.into(),
            args: Vec::new(),
            span,
        }
    }

    /// The span of this type expression.
    pub fn span(&self) -> &Span {
        match self {
            TypeExpr::Name { span, .. }
            | TypeExpr::Fn { span, .. }
            | TypeExpr::Tuple { span, .. }
            | TypeExpr::Array { span, .. }
            | TypeExpr::Record { span, .. }
            | TypeExpr::Refined { span, .. } => span,
        }
    }
}
