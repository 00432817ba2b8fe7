//! The octagon lattice.
//!
//! An [`Octagon`] is a conjunction of constraints of the form
//! `+/-x +/-y <= c` over a fixed, ordered set of program variables. It owns
//! one [`Dbm`] of size `2N`: variable number `k` occupies the "positive"
//! index `2k` (standing for `+v`) and the "negative" index `2k + 1`
//! (standing for `-v`). The mapping is fixed at construction.
//!
//! # Encoding
//!
//! Entry `(i, j)` bounds `V_i - V_j`, where `V_2k = +v_k` and
//! `V_2k+1 = -v_k`. Unary bounds move along a variable's own index pair by
//! *two* units per unit of variable change, hence the doubled constants:
//!
//! - `v <= u` is `(pos, neg) = 2u`, since `V_pos - V_neg = 2v`;
//! - `v >= l` is `(neg, pos) = -2l`, since `V_neg - V_pos = -2v`.
//!
//! Getters read back the same cells, so the set/get round trip is exact.
//!
//! # Mutating combinators
//!
//! The lattice operations (`meet`, `join`, `widening`, `forget`) are
//! destructive: they mutate `self` and return it for chaining. Clone first
//! if the original value must survive.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::bound::Bound;
use crate::dbm::{flip, Dbm};
use crate::expr::{Expr, Sign, Variable};
use crate::interval::Interval;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Octagon {
    variables: Vec<Variable>,
    index: HashMap<Variable, usize>,
    dbm: Dbm,
    bottom: bool,
}

impl Octagon {
    /// Creates the top octagon (no constraints) over the given variables.
    ///
    /// The variable order fixes the index mapping for the whole analysis
    /// run. Duplicate variables are a caller bug.
    pub fn new(variables: Vec<Variable>) -> Self {
        let mut index = HashMap::with_capacity(variables.len());
        for (k, var) in variables.iter().enumerate() {
            let previous = index.insert(var.clone(), 2 * k);
            assert!(previous.is_none(), "Duplicate variable {}", var);
        }
        let size = variables.len() * 2;
        Self {
            variables,
            index,
            dbm: Dbm::new(size),
            bottom: false,
        }
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn dbm(&self) -> &Dbm {
        &self.dbm
    }

    /// The DBM index of the positive occurrence of `var`.
    ///
    /// # Panics
    ///
    /// Panics if the variable is not tracked by this octagon.
    fn positive_index(&self, var: &Variable) -> usize {
        *self
            .index
            .get(var)
            .unwrap_or_else(|| panic!("Unknown variable {}", var))
    }

    fn signed_index(&self, var: &Variable, sign: Sign) -> usize {
        let pos = self.positive_index(var);
        match sign {
            Sign::Plus => pos,
            Sign::Minus => pos + 1,
        }
    }

    fn assert_same_dimension(&self, other: &Octagon) {
        assert_eq!(
            self.dbm.size(),
            other.dbm.size(),
            "Cannot combine octagons of different dimensions"
        );
    }

    /// Resets to the maximal element: every constraint dropped.
    pub fn top(&mut self) -> &mut Self {
        self.dbm = Dbm::new(self.dbm.size());
        self.bottom = false;
        self
    }

    /// True iff no constraint is present (every off-diagonal entry is
    /// unbounded) and the octagon is not bottom.
    pub fn is_top(&self) -> bool {
        !self.bottom
            && self
                .dbm
                .items()
                .filter(|((i, j), _)| i != j)
                .all(|(_, b)| b == Bound::PosInf)
    }

    /// Transitions to the infeasible sentinel. Short-circuits all mutators.
    pub fn set_bottom(&mut self) -> &mut Self {
        self.bottom = true;
        self
    }

    pub fn is_bottom(&self) -> bool {
        self.bottom
    }

    /// Closes the underlying DBM, transitioning to bottom on infeasibility.
    pub fn close(&mut self) -> &mut Self {
        if self.bottom {
            return self;
        }
        if self.dbm.close().is_err() {
            debug!("close: octagon is infeasible, going to bottom");
            self.set_bottom();
        }
        self
    }

    /// Pointwise comparison: true iff every bound of `self` is at most the
    /// corresponding bound of `other` (tighter constraints sit lower in the
    /// lattice).
    pub fn less_equal(&self, other: &Octagon) -> bool {
        self.assert_same_dimension(other);
        if self.bottom {
            return true;
        }
        if other.bottom {
            return false;
        }
        self.dbm
            .values()
            .zip(other.dbm.values())
            .all(|(a, b)| a <= b)
    }

    /// Greatest lower bound: entrywise minimum. No closure precondition.
    pub fn meet(&mut self, other: &Octagon) -> &mut Self {
        self.assert_same_dimension(other);
        debug!("meet(self = [{}], other = [{}])", self, other);
        if self.bottom {
            return self;
        }
        if other.bottom {
            return self.set_bottom();
        }
        self.dbm.intersection(&other.dbm);
        self
    }

    /// Least upper bound: closes both operands, then takes the entrywise
    /// maximum. Closing first is mandatory for precision.
    pub fn join(&mut self, other: &Octagon) -> &mut Self {
        self.assert_same_dimension(other);
        debug!("join(self = [{}], other = [{}])", self, other);
        self.close();
        let mut rhs = other.clone();
        rhs.close();
        if rhs.bottom {
            return self;
        }
        if self.bottom {
            *self = rhs;
            return self;
        }
        self.dbm.union(&rhs.dbm);
        self
    }

    /// Standard instability-detection widening: keeps a bound that did not
    /// grow, drops a growing bound to `+inf`. Each entry can be dropped at
    /// most once, so iterated widening converges.
    pub fn widening(&mut self, other: &Octagon) -> &mut Self {
        self.assert_same_dimension(other);
        debug!("widening(self = [{}], other = [{}])", self, other);
        if self.bottom {
            *self = other.clone();
            return self;
        }
        if other.bottom {
            return self;
        }
        self.dbm
            .zip(&other.dbm, |a, b| if a >= b { a } else { Bound::PosInf });
        self
    }

    /// Conservatively discards all knowledge about `var`: closes first (so
    /// information relating other variables through `var` survives), then
    /// unconstrains every entry touching its two indices.
    pub fn forget(&mut self, var: &Variable) -> &mut Self {
        debug!("forget(var = {})", var);
        self.close();
        if self.bottom {
            return self;
        }
        let pos = self.positive_index(var);
        for k in [pos, pos + 1] {
            for i in 0..self.dbm.size() {
                if i != k {
                    self.dbm.set(i, k, Bound::PosInf);
                    self.dbm.set(k, i, Bound::PosInf);
                }
            }
        }
        self
    }

    /// Constrains `var <= upper`.
    pub fn set_ub(&mut self, var: &Variable, upper: impl Into<Bound>) -> &mut Self {
        if self.bottom {
            return self;
        }
        let pos = self.positive_index(var);
        self.dbm.set(pos, pos + 1, upper.into().doubled());
        self
    }

    /// The strongest known upper bound on `var` (`+inf` if unbounded).
    pub fn get_ub(&self, var: &Variable) -> Bound {
        let pos = self.positive_index(var);
        self.dbm.get(pos, pos + 1).halved()
    }

    /// Constrains `var >= lower`.
    pub fn set_lb(&mut self, var: &Variable, lower: impl Into<Bound>) -> &mut Self {
        if self.bottom {
            return self;
        }
        let pos = self.positive_index(var);
        self.dbm.set(pos + 1, pos, (-lower.into()).doubled());
        self
    }

    /// The strongest known lower bound on `var` (`-inf` if unbounded).
    pub fn get_lb(&self, var: &Variable) -> Bound {
        let pos = self.positive_index(var);
        -self.dbm.get(pos + 1, pos).halved()
    }

    /// Constrains `var` to the given interval (both bounds at once).
    pub fn set_interval(&mut self, var: &Variable, interval: &Interval) -> &mut Self {
        self.set_lb(var, interval.lower);
        self.set_ub(var, interval.upper)
    }

    /// The interval currently known for `var`.
    pub fn get_interval(&self, var: &Variable) -> Interval {
        Interval::new(self.get_lb(var), self.get_ub(var))
    }

    /// Constrains `sign1 * var1 + sign2 * var2 <= constant`.
    ///
    /// Writes both coherent cells of the DBM. The two variables must be
    /// distinct; unary bounds go through [`set_lb`][Self::set_lb] and
    /// [`set_ub`][Self::set_ub].
    pub fn set_constraint(
        &mut self,
        sign1: Sign,
        var1: &Variable,
        sign2: Sign,
        var2: &Variable,
        constant: impl Into<Bound>,
    ) -> &mut Self {
        assert_ne!(
            var1, var2,
            "Binary constraint on a single variable; use the bound accessors"
        );
        if self.bottom {
            return self;
        }
        // (i, j) with V_i = sign1 * var1 and V_j = -sign2 * var2, so that
        // V_i - V_j is exactly the constrained sum.
        let i = self.signed_index(var1, sign1);
        let j = self.signed_index(var2, sign2.flipped());
        let c = constant.into();
        self.dbm.set(i, j, c);
        self.dbm.set(flip(j), flip(i), c);
        self
    }

    /// The strongest known bound on `sign1 * var1 + sign2 * var2`.
    pub fn get_constraint(
        &self,
        sign1: Sign,
        var1: &Variable,
        sign2: Sign,
        var2: &Variable,
    ) -> Bound {
        assert_ne!(
            var1, var2,
            "Binary constraint on a single variable; use the bound accessors"
        );
        let i = self.signed_index(var1, sign1);
        let j = self.signed_index(var2, sign2.flipped());
        self.dbm.get(i, j)
    }

    /// Partial expression evaluation at the octagon level.
    ///
    /// Only non-deterministic input is handled (it evaluates to a fresh,
    /// unconstrained octagon over the same variables). Every other shape is
    /// unhandled in this version; callers must tolerate `None`.
    pub fn evaluate(&self, expr: &Expr) -> Option<Octagon> {
        match expr {
            Expr::Input => Some(Octagon::new(self.variables.clone())),
            Expr::Literal(_)
            | Expr::Var(_)
            | Expr::Unary(_, _)
            | Expr::Binary(_, _, _) => None,
        }
    }
}

/// Renders the constraint set: unary bounds first, then the four binary
/// polarities per unordered variable pair.
impl fmt::Display for Octagon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bottom {
            return write!(f, "⊥");
        }
        let mut constraints = Vec::new();
        for var in &self.variables {
            let lower = self.get_lb(var);
            let upper = self.get_ub(var);
            match (lower.is_finite(), upper.is_finite()) {
                (true, true) => constraints.push(format!("{}<={}<={}", lower, var, upper)),
                (true, false) => constraints.push(format!("{}<={}", lower, var)),
                (false, true) => constraints.push(format!("{}<={}", var, upper)),
                (false, false) => {}
            }
        }
        for (a, var1) in self.variables.iter().enumerate() {
            for var2 in &self.variables[a + 1..] {
                let polarities = [
                    (Sign::Plus, Sign::Plus, format!("{}+{}", var1, var2)),
                    (Sign::Plus, Sign::Minus, format!("{}-{}", var1, var2)),
                    (Sign::Minus, Sign::Plus, format!("-{}+{}", var1, var2)),
                    (Sign::Minus, Sign::Minus, format!("-{}-{}", var1, var2)),
                ];
                for (sign1, sign2, text) in polarities {
                    let c = self.get_constraint(sign1, var1, sign2, var2);
                    if c.is_finite() {
                        constraints.push(format!("{}<={}", text, c));
                    }
                }
            }
        }
        write!(f, "{}", constraints.join(", "))
    }
}
