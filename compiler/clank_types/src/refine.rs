//! Refinement predicates and terms.
//!
//! A refinement type `Int{x > 0}` pairs a base type with a [`Predicate`]
//! over a bound variable. Predicates and terms are immutable values with
//! arbitrary-precision integer arithmetic; the solver crate interprets them.

use std::fmt;

use num_bigint::BigInt;

/// Comparison operators in predicates.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// Source spelling (`==`, `!=`, `<`, `<=`, `>`, `>=`).
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    /// Parse an operator, normalizing the Unicode forms `≠ ≤ ≥`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "==" => Some(CompareOp::Eq),
            "!=" | "≠" => Some(CompareOp::Ne),
            "<" => Some(CompareOp::Lt),
            "<=" | "≤" => Some(CompareOp::Le),
            ">" => Some(CompareOp::Gt),
            ">=" | "≥" => Some(CompareOp::Ge),
            _ => None,
        }
    }

    /// The operator obtained by swapping the operands: `a < b` iff `b > a`.
    pub fn flipped(self) -> Self {
        match self {
            CompareOp::Lt => CompareOp::Gt,
            CompareOp::Le => CompareOp::Ge,
            CompareOp::Gt => CompareOp::Lt,
            CompareOp::Ge => CompareOp::Le,
            CompareOp::Eq | CompareOp::Ne => self,
        }
    }

    /// The logical negation: `!(a < b)` iff `a >= b`.
    pub fn negated(self) -> Self {
        match self {
            CompareOp::Eq => CompareOp::Ne,
            CompareOp::Ne => CompareOp::Eq,
            CompareOp::Lt => CompareOp::Ge,
            CompareOp::Le => CompareOp::Gt,
            CompareOp::Gt => CompareOp::Le,
            CompareOp::Ge => CompareOp::Lt,
        }
    }

    /// Whether `a self b` entails `a other b` for the same operands.
    pub fn implies(self, other: Self) -> bool {
        use CompareOp::{Eq, Ge, Gt, Le, Lt, Ne};
        match self {
            Eq => matches!(other, Eq | Le | Ge),
            Lt => matches!(other, Lt | Le | Ne),
            Gt => matches!(other, Gt | Ge | Ne),
            Le => matches!(other, Le),
            Ge => matches!(other, Ge),
            Ne => matches!(other, Ne),
        }
    }

    /// Whether `a self b` and `a other b` cannot both hold.
    pub fn contradicts(self, other: Self) -> bool {
        use CompareOp::{Eq, Ge, Gt, Le, Lt, Ne};
        match self {
            Eq => matches!(other, Ne | Lt | Gt),
            Ne => matches!(other, Eq),
            Lt => matches!(other, Ge | Gt | Eq),
            Le => matches!(other, Gt),
            Gt => matches!(other, Le | Lt | Eq),
            Ge => matches!(other, Lt),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Arithmetic operators in refinement terms.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl ArithOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Rem => "%",
        }
    }

    /// Binding strength for the canonical printer.
    fn precedence(self) -> u8 {
        match self {
            ArithOp::Add | ArithOp::Sub => 1,
            ArithOp::Mul | ArithOp::Div | ArithOp::Rem => 2,
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A refinement term: the value-level language predicates compare.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Term {
    Var(String),
    Int(BigInt),
    Bool(bool),
    Str(String),
    Binop(ArithOp, Box<Term>, Box<Term>),
    Call(String, Vec<Term>),
    Field(Box<Term>, String),
}

impl Term {
    pub fn var(name: impl Into<String>) -> Self {
        Term::Var(name.into())
    }

    pub fn int(value: impl Into<BigInt>) -> Self {
        Term::Int(value.into())
    }

    pub fn binop(op: ArithOp, lhs: Term, rhs: Term) -> Self {
        Term::Binop(op, Box::new(lhs), Box::new(rhs))
    }

    /// Collect every variable name referenced by this term.
    pub fn collect_vars(&self, out: &mut Vec<String>) {
        match self {
            Term::Var(name) => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            Term::Int(_) | Term::Bool(_) | Term::Str(_) => {}
            Term::Binop(_, lhs, rhs) => {
                lhs.collect_vars(out);
                rhs.collect_vars(out);
            }
            Term::Call(_, args) => {
                for arg in args {
                    arg.collect_vars(out);
                }
            }
            Term::Field(base, _) => base.collect_vars(out),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Term::Binop(op, _, _) => op.precedence(),
            _ => 3,
        }
    }

    fn fmt_prec(&self, f: &mut fmt::Formatter<'_>, min_prec: u8) -> fmt::Result {
        match self {
            Term::Var(name) => f.write_str(name),
            Term::Int(value) => write!(f, "{value}"),
            Term::Bool(value) => write!(f, "{value}"),
            Term::Str(value) => write!(f, "{value:?}"),
            Term::Binop(op, lhs, rhs) => {
                let prec = op.precedence();
                let parens = prec < min_prec;
                if parens {
                    f.write_str("(")?;
                }
                lhs.fmt_prec(f, prec)?;
                write!(f, " {op} ")?;
                // Left-associative: the right child needs one more level.
                rhs.fmt_prec(f, prec + 1)?;
                if parens {
                    f.write_str(")")?;
                }
                Ok(())
            }
            Term::Call(name, args) => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    arg.fmt_prec(f, 0)?;
                }
                f.write_str(")")
            }
            Term::Field(base, field) => {
                base.fmt_prec(f, 3)?;
                write!(f, ".{field}")
            }
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_prec(f, 0)
    }
}

/// A refinement predicate.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Predicate {
    Compare(CompareOp, Term, Term),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
    /// An uninterpreted named predicate, e.g. `positive(x)`.
    Call(String, Vec<Term>),
    True,
    False,
    /// A predicate the front-end could not interpret; carries its source text.
    Unknown(String),
}

impl Predicate {
    pub fn compare(op: CompareOp, lhs: Term, rhs: Term) -> Self {
        Predicate::Compare(op, lhs, rhs)
    }

    pub fn and(lhs: Predicate, rhs: Predicate) -> Self {
        Predicate::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: Predicate, rhs: Predicate) -> Self {
        Predicate::Or(Box::new(lhs), Box::new(rhs))
    }

    pub fn not(inner: Predicate) -> Self {
        Predicate::Not(Box::new(inner))
    }

    /// Collect every variable name referenced by this predicate.
    pub fn collect_vars(&self, out: &mut Vec<String>) {
        match self {
            Predicate::Compare(_, lhs, rhs) => {
                lhs.collect_vars(out);
                rhs.collect_vars(out);
            }
            Predicate::And(lhs, rhs) | Predicate::Or(lhs, rhs) => {
                lhs.collect_vars(out);
                rhs.collect_vars(out);
            }
            Predicate::Not(inner) => inner.collect_vars(out),
            Predicate::Call(_, args) => {
                for arg in args {
                    arg.collect_vars(out);
                }
            }
            Predicate::True | Predicate::False | Predicate::Unknown(_) => {}
        }
    }

    /// All referenced variable names, deduplicated in first-seen order.
    pub fn referenced_vars(&self) -> Vec<String> {
        let mut vars = Vec::new();
        self.collect_vars(&mut vars);
        vars
    }

    fn fmt_prec(&self, f: &mut fmt::Formatter<'_>, min_prec: u8) -> fmt::Result {
        match self {
            Predicate::Compare(op, lhs, rhs) => write!(f, "{lhs} {op} {rhs}"),
            Predicate::And(lhs, rhs) => {
                let parens = 2 < min_prec;
                if parens {
                    f.write_str("(")?;
                }
                lhs.fmt_prec(f, 2)?;
                f.write_str(" && ")?;
                rhs.fmt_prec(f, 3)?;
                if parens {
                    f.write_str(")")?;
                }
                Ok(())
            }
            Predicate::Or(lhs, rhs) => {
                let parens = 1 < min_prec;
                if parens {
                    f.write_str("(")?;
                }
                lhs.fmt_prec(f, 1)?;
                f.write_str(" || ")?;
                rhs.fmt_prec(f, 2)?;
                if parens {
                    f.write_str(")")?;
                }
                Ok(())
            }
            Predicate::Not(inner) => {
                f.write_str("!")?;
                // Comparisons read ambiguously after `!`; parenthesize them
                // along with the binary connectives.
                let parens = matches!(
                    inner.as_ref(),
                    Predicate::Compare(..) | Predicate::And(..) | Predicate::Or(..)
                );
                if parens {
                    f.write_str("(")?;
                    inner.fmt_prec(f, 0)?;
                    f.write_str(")")
                } else {
                    inner.fmt_prec(f, 4)
                }
            }
            Predicate::Call(name, args) => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Predicate::True => f.write_str("true"),
            Predicate::False => f.write_str("false"),
            Predicate::Unknown(source) => write!(f, "unknown({source:?})"),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_prec(f, 0)
    }
}
