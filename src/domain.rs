//! The analyzer-facing abstract state.
//!
//! [`OctagonDomain`] binds the octagon lattice into the abstract-state
//! protocol ([`State`]) that an external forward fixpoint engine drives:
//! the engine calls `assign`/`assume`/scope hooks at each program point and
//! combines states with the lattice operations, widening past a threshold.
//!
//! Only assignments whose right-hand side matches the single-variable
//! linear form get a real transfer function in this version; see the
//! dispatch in [`State::assign`]. Everything else is a deliberate gap, not
//! an oversight: the remaining shapes are documented non-goals, and the
//! protocol's non-assignment operations are no-ops.

use log::debug;
use thiserror::Error;

use crate::expr::{Expr, Sign, Type, Variable};
use crate::interval::Interval;
use crate::linear::LinearForm;
use crate::octagon::Octagon;

/// An abstract-state operation was invoked against its contract.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum DomainError {
    /// Octagonal assignment is only defined for integer-typed targets.
    #[error("cannot assign to non-integer variable {0}")]
    NonIntegerTarget(Variable),
}

/// The abstract-state protocol consumed by the fixpoint driver.
///
/// All operations mutate the state in place and return it for chaining.
/// Operations documented as no-ops are part of the required surface; they
/// leave the state unchanged in this version.
pub trait State {
    /// Transfer function for `target = rhs`.
    fn assign(&mut self, target: &Variable, rhs: &Expr) -> Result<&mut Self, DomainError>;

    /// Condition narrowing. No-op in this version.
    fn assume(&mut self, condition: &Expr) -> &mut Self;

    /// Backward variable substitution. No-op in this version.
    fn substitute(&mut self, target: &Variable, expr: &Expr) -> &mut Self;

    /// Variable read hook. No-op in this version.
    fn access(&mut self, variable: &Variable) -> &mut Self;

    /// Output statement hook. No-op in this version.
    fn output(&mut self, expr: &Expr) -> &mut Self;

    /// Scope hooks for conditionals and loops. No-ops in this version.
    fn enter_if(&mut self) -> &mut Self;
    fn exit_if(&mut self) -> &mut Self;
    fn enter_loop(&mut self) -> &mut Self;
    fn exit_loop(&mut self) -> &mut Self;
}

/// The octagon lattice as an abstract state for one program point.
///
/// This is both the lattice element (the lattice operations are exposed by
/// delegation) and the protocol implementation. One state per program
/// point; clone explicitly before sharing.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct OctagonDomain {
    octagon: Octagon,
}

impl OctagonDomain {
    /// Creates the unconstrained state over the given ordered variables.
    pub fn new(variables: Vec<Variable>) -> Self {
        Self {
            octagon: Octagon::new(variables),
        }
    }

    pub fn octagon(&self) -> &Octagon {
        &self.octagon
    }

    pub fn octagon_mut(&mut self) -> &mut Octagon {
        &mut self.octagon
    }

    // Lattice surface, delegated for the fixpoint driver's benefit.

    pub fn is_bottom(&self) -> bool {
        self.octagon.is_bottom()
    }

    pub fn is_top(&self) -> bool {
        self.octagon.is_top()
    }

    pub fn less_equal(&self, other: &OctagonDomain) -> bool {
        self.octagon.less_equal(&other.octagon)
    }

    pub fn meet(&mut self, other: &OctagonDomain) -> &mut Self {
        self.octagon.meet(&other.octagon);
        self
    }

    pub fn join(&mut self, other: &OctagonDomain) -> &mut Self {
        self.octagon.join(&other.octagon);
        self
    }

    pub fn widening(&mut self, other: &OctagonDomain) -> &mut Self {
        self.octagon.widening(&other.octagon);
        self
    }
}

impl State for OctagonDomain {
    /// Dispatches `target = rhs` over the recognized linear forms.
    ///
    /// | form of `rhs`                  | action                           |
    /// |--------------------------------|----------------------------------|
    /// | `[a, b]` (no variable)         | forget target, constrain to it   |
    /// | `target + [a, b]`              | shift target's bounds additively |
    /// | `-target + [a, b]`             | unimplemented, state unchanged   |
    /// | `other_var + [a, b]`           | unimplemented, state unchanged   |
    /// | no match                       | state unchanged (known-unsound   |
    /// |                                | fallback, kept as documented)    |
    fn assign(&mut self, target: &Variable, rhs: &Expr) -> Result<&mut Self, DomainError> {
        if target.typ() != Type::Int {
            return Err(DomainError::NonIntegerTarget(target.clone()));
        }

        let form = match LinearForm::extract(rhs) {
            Ok(form) => form,
            Err(err) => {
                // The reference behavior: an unrecognized right-hand side
                // leaves the state unchanged. Unsound for an
                // over-approximating analysis; kept deliberately.
                debug!("assign({} = {}): {}; state unchanged", target, rhs, err);
                return Ok(self);
            }
        };

        match (form.var(), form.interval()) {
            (None, Some(interval)) => {
                debug!("assign({} = {}): interval assignment", target, interval);
                self.octagon.forget(target);
                self.octagon.set_interval(target, interval);
            }
            (Some(var), Some(interval)) if var == target => match form.sign() {
                Sign::Plus => {
                    debug!("assign({0} = {0} + {1}): additive update", target, interval);
                    let shifted = Interval::new(
                        self.octagon.get_lb(target) + interval.lower,
                        self.octagon.get_ub(target) + interval.upper,
                    );
                    self.octagon.set_interval(target, &shifted);
                }
                Sign::Minus => {
                    // x = -x + [a, b] is a recognized but unimplemented
                    // transfer function in this version.
                    debug!("assign({} = {}): sign flip unimplemented", target, form);
                }
            },
            (Some(var), None) if var == target => {
                // x = x: nothing to do.
                debug!("assign({0} = {0}): identity", target);
            }
            (Some(_), _) => {
                // Relational assignment x = +/-y + [a, b] is out of scope.
                debug!("assign({} = {}): relational form unimplemented", target, form);
            }
            (None, None) => {
                debug!("assign({} = {}): no actionable form", target, form);
            }
        }

        Ok(self)
    }

    fn assume(&mut self, _condition: &Expr) -> &mut Self {
        self
    }

    fn substitute(&mut self, _target: &Variable, _expr: &Expr) -> &mut Self {
        self
    }

    fn access(&mut self, _variable: &Variable) -> &mut Self {
        self
    }

    fn output(&mut self, _expr: &Expr) -> &mut Self {
        self
    }

    fn enter_if(&mut self) -> &mut Self {
        self
    }

    fn exit_if(&mut self) -> &mut Self {
        self
    }

    fn enter_loop(&mut self) -> &mut Self {
        self
    }

    fn exit_loop(&mut self) -> &mut Self {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::bound::Bound;

    fn state2() -> (OctagonDomain, Variable, Variable) {
        let x = Variable::int("x");
        let y = Variable::int("y");
        let state = OctagonDomain::new(vec![x.clone(), y.clone()]);
        (state, x, y)
    }

    #[test]
    fn test_assign_constant() {
        let (mut state, x, _) = state2();
        state.assign(&x, &Expr::literal(5)).unwrap();
        assert_eq!(state.octagon().get_lb(&x), Bound::Finite(5));
        assert_eq!(state.octagon().get_ub(&x), Bound::Finite(5));
    }

    #[test]
    fn test_assign_constant_replaces_old_bounds() {
        let (mut state, x, _) = state2();
        state
            .octagon_mut()
            .set_interval(&x, &Interval::new(Bound::Finite(0), Bound::Finite(10)));
        state.assign(&x, &Expr::literal(42)).unwrap();
        assert_eq!(state.octagon().get_interval(&x), Interval::constant(42));
    }

    #[test]
    fn test_assign_input_forgets_target() {
        let (mut state, x, _) = state2();
        state
            .octagon_mut()
            .set_interval(&x, &Interval::new(Bound::Finite(0), Bound::Finite(10)));
        state.assign(&x, &Expr::input()).unwrap();
        assert_eq!(state.octagon().get_lb(&x), Bound::NegInf);
        assert_eq!(state.octagon().get_ub(&x), Bound::PosInf);
    }

    #[test]
    fn test_assign_additive_update() {
        // x = [0, 10]; x = x + [1, 1]; expect [1, 11].
        let (mut state, x, _) = state2();
        state
            .octagon_mut()
            .set_interval(&x, &Interval::new(Bound::Finite(0), Bound::Finite(10)));
        let rhs = Expr::add(Expr::var(x.clone()), Expr::literal(1));
        state.assign(&x, &rhs).unwrap();
        assert_eq!(state.octagon().get_lb(&x), Bound::Finite(1));
        assert_eq!(state.octagon().get_ub(&x), Bound::Finite(11));
    }

    #[test]
    fn test_assign_subtractive_update() {
        // x = x - 3 is x + [-3, -3].
        let (mut state, x, _) = state2();
        state
            .octagon_mut()
            .set_interval(&x, &Interval::new(Bound::Finite(5), Bound::Finite(8)));
        let rhs = Expr::sub(Expr::var(x.clone()), Expr::literal(3));
        state.assign(&x, &rhs).unwrap();
        assert_eq!(state.octagon().get_lb(&x), Bound::Finite(2));
        assert_eq!(state.octagon().get_ub(&x), Bound::Finite(5));
    }

    #[test]
    fn test_independent_intervals_survive_closure() {
        // x = [0, 10]; y = [0, 10]; narrowing by closure must not disturb x.
        let (mut state, x, y) = state2();
        let iv = Interval::new(Bound::Finite(0), Bound::Finite(10));
        state.octagon_mut().set_interval(&x, &iv);
        state.octagon_mut().set_interval(&y, &iv);
        state.octagon_mut().close();
        assert!(!state.is_bottom());
        assert_eq!(state.octagon().get_lb(&x), Bound::Finite(0));
        assert_eq!(state.octagon().get_ub(&x), Bound::Finite(10));
    }

    #[test]
    fn test_assign_negated_self_is_unimplemented() {
        let (mut state, x, _) = state2();
        state
            .octagon_mut()
            .set_interval(&x, &Interval::new(Bound::Finite(1), Bound::Finite(2)));
        let before = state.clone();
        // x = -x + 1
        let rhs = Expr::add(Expr::neg(Expr::var(x.clone())), Expr::literal(1));
        state.assign(&x, &rhs).unwrap();
        assert_eq!(state, before);
    }

    #[test]
    fn test_assign_relational_is_unimplemented() {
        let (mut state, x, y) = state2();
        state
            .octagon_mut()
            .set_interval(&y, &Interval::new(Bound::Finite(1), Bound::Finite(2)));
        let before = state.clone();
        // x = y + 1
        let rhs = Expr::add(Expr::var(y.clone()), Expr::literal(1));
        state.assign(&x, &rhs).unwrap();
        assert_eq!(state, before);
    }

    #[test]
    fn test_assign_unrecognized_rhs_leaves_state_unchanged() {
        let (mut state, x, y) = state2();
        let before = state.clone();
        // x = x * y does not match the linear form.
        let rhs = Expr::mul(Expr::var(x.clone()), Expr::var(y));
        state.assign(&x, &rhs).unwrap();
        assert_eq!(state, before);
    }

    #[test]
    fn test_assign_to_non_integer_target_fails() {
        let b = Variable::new("b", crate::expr::Type::Bool);
        let mut state = OctagonDomain::new(vec![Variable::int("x")]);
        assert_eq!(
            state.assign(&b, &Expr::literal(1)).unwrap_err(),
            DomainError::NonIntegerTarget(b)
        );
    }

    #[test]
    fn test_protocol_noops_leave_state_unchanged() {
        let (mut state, x, _) = state2();
        state
            .octagon_mut()
            .set_interval(&x, &Interval::new(Bound::Finite(0), Bound::Finite(1)));
        let before = state.clone();
        state
            .assume(&Expr::literal(1))
            .substitute(&x, &Expr::literal(0))
            .access(&x)
            .output(&Expr::var(x.clone()))
            .enter_if()
            .exit_if()
            .enter_loop()
            .exit_loop();
        assert_eq!(state, before);
    }

    #[test]
    fn test_fixpoint_style_loop_converges() {
        // Emulates the driver on `x = 0; while ...: x = x + 1` with widening.
        let (mut entry, x, _) = state2();
        entry.assign(&x, &Expr::literal(0)).unwrap();

        let mut current = entry.clone();
        let increment = Expr::add(Expr::var(x.clone()), Expr::literal(1));
        for _ in 0..50 {
            let mut body = current.clone();
            body.assign(&x, &increment).unwrap();
            let mut next = entry.clone();
            next.join(&body);
            if next.less_equal(&current) {
                break;
            }
            current.widening(&next);
        }
        assert_eq!(current.octagon().get_lb(&x), Bound::Finite(0));
        assert_eq!(current.octagon().get_ub(&x), Bound::PosInf);
    }
}
