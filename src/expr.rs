//! Arithmetic expressions over program variables.
//!
//! A deliberately closed tagged union: every consumer of expressions in this
//! crate (the interval evaluator, the linear-form extractor, the octagon's
//! partial evaluator) matches on it exhaustively, so adding a variant forces
//! every matcher to be revisited.

use std::fmt;

/// The static type of a program variable.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Type {
    Int,
    Bool,
}

/// A typed program variable identifier.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Variable {
    name: String,
    typ: Type,
}

impl Variable {
    pub fn new(name: impl Into<String>, typ: Type) -> Self {
        Self {
            name: name.into(),
            typ,
        }
    }

    /// An integer-typed variable.
    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, Type::Int)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn typ(&self) -> Type {
        self.typ
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The sign of a variable occurrence or a unary operator.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Sign {
    Plus,
    Minus,
}

impl Sign {
    pub fn flipped(self) -> Sign {
        match self {
            Sign::Plus => Sign::Minus,
            Sign::Minus => Sign::Plus,
        }
    }

    /// Sign of a product: combining two minuses yields a plus.
    pub fn combined(self, other: Sign) -> Sign {
        if self == other {
            Sign::Plus
        } else {
            Sign::Minus
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sign::Plus => write!(f, "+"),
            Sign::Minus => write!(f, "-"),
        }
    }
}

/// A binary arithmetic operator.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinOp::Add => write!(f, "+"),
            BinOp::Sub => write!(f, "-"),
            BinOp::Mul => write!(f, "*"),
            BinOp::Div => write!(f, "/"),
        }
    }
}

/// An arithmetic expression.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Expr {
    /// An integer literal.
    Literal(i64),
    /// A variable reference.
    Var(Variable),
    /// A non-deterministic external input (unknown value).
    Input,
    /// A signed sub-expression, e.g. `-x`.
    Unary(Sign, Box<Expr>),
    /// A binary arithmetic operation.
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn literal(value: i64) -> Self {
        Expr::Literal(value)
    }

    pub fn var(variable: Variable) -> Self {
        Expr::Var(variable)
    }

    pub fn input() -> Self {
        Expr::Input
    }

    pub fn neg(inner: Self) -> Self {
        Expr::Unary(Sign::Minus, Box::new(inner))
    }

    pub fn add(lhs: Self, rhs: Self) -> Self {
        Expr::Binary(BinOp::Add, Box::new(lhs), Box::new(rhs))
    }

    pub fn sub(lhs: Self, rhs: Self) -> Self {
        Expr::Binary(BinOp::Sub, Box::new(lhs), Box::new(rhs))
    }

    pub fn mul(lhs: Self, rhs: Self) -> Self {
        Expr::Binary(BinOp::Mul, Box::new(lhs), Box::new(rhs))
    }

    pub fn div(lhs: Self, rhs: Self) -> Self {
        Expr::Binary(BinOp::Div, Box::new(lhs), Box::new(rhs))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(c) => write!(f, "{}", c),
            Expr::Var(v) => write!(f, "{}", v),
            Expr::Input => write!(f, "input()"),
            Expr::Unary(sign, e) => write!(f, "{}({})", sign, e),
            Expr::Binary(op, l, r) => write!(f, "({} {} {})", l, op, r),
        }
    }
}
