//! Constant intervals.
//!
//! The octagon core uses intervals in exactly two roles: as the `[lower,
//! upper]` part of a single-variable linear form, and as the result of
//! evaluating a variable-free expression. This is not a full interval
//! abstract domain; it is the helper capability the octagon consumes.

use std::fmt;

use thiserror::Error;

use crate::bound::Bound;
use crate::expr::{BinOp, Expr, Sign};

/// The expression mentions a variable (or an unsupported operator) and so
/// does not reduce to a constant interval.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
#[error("expression does not evaluate to a constant interval")]
pub struct NotConstant;

/// A closed interval `[lower, upper]` with possibly infinite endpoints.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Interval {
    pub lower: Bound,
    pub upper: Bound,
}

impl Interval {
    /// Creates an interval. The endpoints must be ordered.
    pub fn new(lower: Bound, upper: Bound) -> Self {
        assert!(lower <= upper, "Interval endpoints must be ordered");
        Self { lower, upper }
    }

    /// The degenerate interval `[c, c]`.
    pub fn constant(c: i64) -> Self {
        Self::new(Bound::Finite(c), Bound::Finite(c))
    }

    /// The unbounded interval `[-inf, +inf]`.
    pub fn top() -> Self {
        Self::new(Bound::NegInf, Bound::PosInf)
    }

    pub fn is_top(&self) -> bool {
        self.lower == Bound::NegInf && self.upper == Bound::PosInf
    }

    /// Mirrors the interval around zero.
    pub fn negated(&self) -> Self {
        Self::new(-self.upper, -self.lower)
    }

    pub fn add(&self, other: &Interval) -> Self {
        Self::new(self.lower + other.lower, self.upper + other.upper)
    }

    pub fn sub(&self, other: &Interval) -> Self {
        self.add(&other.negated())
    }

    pub fn mul(&self, other: &Interval) -> Self {
        fn prod(a: Bound, b: Bound) -> Bound {
            match (a.finite(), b.finite()) {
                (Some(x), Some(y)) => Bound::Finite(x * y),
                // Infinite endpoint: the sign of the other side decides.
                _ => {
                    let negative = (a < Bound::Finite(0)) != (b < Bound::Finite(0));
                    if negative {
                        Bound::NegInf
                    } else {
                        Bound::PosInf
                    }
                }
            }
        }
        let candidates = [
            prod(self.lower, other.lower),
            prod(self.lower, other.upper),
            prod(self.upper, other.lower),
            prod(self.upper, other.upper),
        ];
        let lower = candidates.iter().copied().min().unwrap_or(Bound::NegInf);
        let upper = candidates.iter().copied().max().unwrap_or(Bound::PosInf);
        Self::new(lower, upper)
    }

    /// Evaluates an expression to a constant interval, if possible.
    ///
    /// Variables and division do not reduce; they yield [`NotConstant`], and
    /// the caller picks a coarser strategy (the linear-form extractor treats
    /// this as "the operand is the variable part").
    pub fn evaluate(expr: &Expr) -> Result<Interval, NotConstant> {
        match expr {
            Expr::Literal(c) => Ok(Interval::constant(*c)),
            Expr::Var(_) => Err(NotConstant),
            Expr::Input => Ok(Interval::top()),
            Expr::Unary(Sign::Plus, e) => Interval::evaluate(e),
            Expr::Unary(Sign::Minus, e) => Ok(Interval::evaluate(e)?.negated()),
            Expr::Binary(op, l, r) => {
                let l = Interval::evaluate(l)?;
                let r = Interval::evaluate(r)?;
                match op {
                    BinOp::Add => Ok(l.add(&r)),
                    BinOp::Sub => Ok(l.sub(&r)),
                    BinOp::Mul => Ok(l.mul(&r)),
                    BinOp::Div => Err(NotConstant),
                }
            }
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}
