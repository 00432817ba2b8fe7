//! Single-variable linear forms.
//!
//! The optimal octagon transfer functions are only defined for right-hand
//! sides of the shape `+/- var + [lower, upper]`. [`LinearForm::extract`]
//! attempts to rewrite an expression into that shape with a single structural
//! traversal. The variable and interval parts are populated at most once;
//! a second contribution of either kind is a structural error, which keeps
//! the single-assignment invariant visible in the result type instead of
//! relying on a runtime contract check.

use std::fmt;

use thiserror::Error;

use crate::expr::{BinOp, Expr, Sign, Variable};
use crate::interval::Interval;

/// Why an expression failed to match the single-variable linear form.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ExtractError {
    /// The expression shape is not covered by the traversal rules
    /// (nested arithmetic, multiplication, division, boolean operands, ...).
    #[error("expression shape is not a single-variable linear form")]
    Unsupported,
    /// A second variable contribution was found.
    #[error("linear form admits at most one variable term")]
    SecondVariable,
    /// A second interval contribution was found.
    #[error("linear form admits at most one interval term")]
    SecondInterval,
}

/// The normalized shape `sign * var + interval`, with each part optional.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LinearForm {
    sign: Sign,
    var: Option<Variable>,
    interval: Option<Interval>,
}

impl LinearForm {
    /// Attempts to rewrite `expr` as `+/- var + [lower, upper]`.
    ///
    /// This is a structural match, not an arithmetic normalization: it
    /// recognizes exactly one level of addition or subtraction between a
    /// (possibly negated) variable and a constant-evaluable operand.
    pub fn extract(expr: &Expr) -> Result<LinearForm, ExtractError> {
        let mut form = LinearForm {
            sign: Sign::Plus,
            var: None,
            interval: None,
        };
        form.visit(expr)?;
        Ok(form)
    }

    /// The sign of the variable part (meaningless if [`var`][Self::var] is
    /// `None`; defaults to plus).
    pub fn sign(&self) -> Sign {
        self.sign
    }

    pub fn var(&self) -> Option<&Variable> {
        self.var.as_ref()
    }

    pub fn interval(&self) -> Option<&Interval> {
        self.interval.as_ref()
    }

    fn put_var(&mut self, var: &Variable, sign: Sign) -> Result<(), ExtractError> {
        if self.var.is_some() {
            return Err(ExtractError::SecondVariable);
        }
        self.var = Some(var.clone());
        self.sign = sign;
        Ok(())
    }

    fn put_interval(&mut self, interval: Interval) -> Result<(), ExtractError> {
        if self.interval.is_some() {
            return Err(ExtractError::SecondInterval);
        }
        self.interval = Some(interval);
        Ok(())
    }

    /// Consumes one operand of the top-level expression: first as a constant
    /// interval, then as a (possibly negated) variable occurrence.
    ///
    /// `sign` is the sign the enclosing operator imposes on this operand
    /// (minus for the right operand of a subtraction).
    fn operand(&mut self, expr: &Expr, sign: Sign) -> Result<(), ExtractError> {
        if let Ok(interval) = Interval::evaluate(expr) {
            let interval = match sign {
                Sign::Plus => interval,
                Sign::Minus => interval.negated(),
            };
            return self.put_interval(interval);
        }
        match expr {
            Expr::Var(v) => self.put_var(v, sign),
            Expr::Unary(inner_sign, inner) => match inner.as_ref() {
                Expr::Var(v) => self.put_var(v, sign.combined(*inner_sign)),
                _ => Err(ExtractError::Unsupported),
            },
            _ => Err(ExtractError::Unsupported),
        }
    }

    fn visit(&mut self, expr: &Expr) -> Result<(), ExtractError> {
        match expr {
            Expr::Literal(_) | Expr::Input => {
                // Always constant-evaluable.
                self.operand(expr, Sign::Plus)
            }
            Expr::Var(v) => self.put_var(v, Sign::Plus),
            Expr::Unary(_, _) => self.operand(expr, Sign::Plus),
            Expr::Binary(op, left, right) => {
                let right_sign = match op {
                    BinOp::Add => Sign::Plus,
                    BinOp::Sub => Sign::Minus,
                    BinOp::Mul | BinOp::Div => return Err(ExtractError::Unsupported),
                };
                self.operand(left, Sign::Plus)?;
                self.operand(right, right_sign)
            }
        }
    }
}

impl fmt::Display for LinearForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.var, &self.interval) {
            (Some(v), Some(iv)) => write!(f, "{}{} + {}", self.sign, v, iv),
            (Some(v), None) => write!(f, "{}{}", self.sign, v),
            (None, Some(iv)) => write!(f, "{}", iv),
            (None, None) => write!(f, "<empty>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::bound::Bound;

    fn x() -> Variable {
        Variable::int("x")
    }

    #[test]
    fn test_literal() {
        let form = LinearForm::extract(&Expr::literal(5)).unwrap();
        assert_eq!(form.var(), None);
        assert_eq!(form.interval(), Some(&Interval::constant(5)));
    }

    #[test]
    fn test_bare_variable() {
        let form = LinearForm::extract(&Expr::var(x())).unwrap();
        assert_eq!(form.var(), Some(&x()));
        assert_eq!(form.sign(), Sign::Plus);
        assert_eq!(form.interval(), None);
    }

    #[test]
    fn test_negated_variable() {
        let form = LinearForm::extract(&Expr::neg(Expr::var(x()))).unwrap();
        assert_eq!(form.var(), Some(&x()));
        assert_eq!(form.sign(), Sign::Minus);
    }

    #[test]
    fn test_input_is_unbounded_interval() {
        let form = LinearForm::extract(&Expr::input()).unwrap();
        assert_eq!(form.interval(), Some(&Interval::top()));
        assert_eq!(form.var(), None);
    }

    #[test]
    fn test_variable_plus_constant() {
        let e = Expr::add(Expr::var(x()), Expr::literal(3));
        let form = LinearForm::extract(&e).unwrap();
        assert_eq!(form.var(), Some(&x()));
        assert_eq!(form.sign(), Sign::Plus);
        assert_eq!(form.interval(), Some(&Interval::constant(3)));
    }

    #[test]
    fn test_constant_minus_variable() {
        // 3 - x => -x + [3, 3]
        let e = Expr::sub(Expr::literal(3), Expr::var(x()));
        let form = LinearForm::extract(&e).unwrap();
        assert_eq!(form.var(), Some(&x()));
        assert_eq!(form.sign(), Sign::Minus);
        assert_eq!(form.interval(), Some(&Interval::constant(3)));
    }

    #[test]
    fn test_variable_minus_constant_negates_interval() {
        // x - 3 => x + [-3, -3]
        let e = Expr::sub(Expr::var(x()), Expr::literal(3));
        let form = LinearForm::extract(&e).unwrap();
        assert_eq!(form.interval(), Some(&Interval::constant(-3)));
        assert_eq!(form.sign(), Sign::Plus);
    }

    #[test]
    fn test_subtracting_negated_variable_flips_twice() {
        // 1 - (-x) => +x + [1, 1]
        let e = Expr::sub(Expr::literal(1), Expr::neg(Expr::var(x())));
        let form = LinearForm::extract(&e).unwrap();
        assert_eq!(form.var(), Some(&x()));
        assert_eq!(form.sign(), Sign::Plus);
        assert_eq!(form.interval(), Some(&Interval::constant(1)));
    }

    #[test]
    fn test_two_variables_fail() {
        let e = Expr::add(Expr::var(x()), Expr::var(Variable::int("y")));
        assert_eq!(
            LinearForm::extract(&e),
            Err(ExtractError::SecondVariable)
        );
    }

    #[test]
    fn test_two_intervals_fail() {
        // `1 + input()`: the left operand claims the interval slot, and the
        // right operand is constant-evaluable too.
        let e = Expr::add(Expr::literal(1), Expr::input());
        assert_eq!(
            LinearForm::extract(&e),
            Err(ExtractError::SecondInterval)
        );
    }

    #[test]
    fn test_multiplication_unsupported() {
        let e = Expr::mul(Expr::var(x()), Expr::literal(2));
        assert_eq!(LinearForm::extract(&e), Err(ExtractError::Unsupported));
    }

    #[test]
    fn test_nested_arithmetic_unsupported() {
        // (x + 1) + 2: the left operand is neither constant nor a variable.
        let e = Expr::add(Expr::add(Expr::var(x()), Expr::literal(1)), Expr::literal(2));
        assert_eq!(LinearForm::extract(&e), Err(ExtractError::Unsupported));
    }

    #[test]
    fn test_input_shifted_by_variable() {
        // x + input() => x + [-inf, +inf]
        let e = Expr::add(Expr::var(x()), Expr::input());
        let form = LinearForm::extract(&e).unwrap();
        assert_eq!(form.var(), Some(&x()));
        assert!(form.interval().unwrap().is_top());
        assert_eq!(form.interval().unwrap().lower, Bound::NegInf);
    }
}
