//! Extended numeric bounds for DBM entries and interval endpoints.
//!
//! A [`Bound`] is either a finite integer or one of the two infinities.
//! DBM entries only ever hold `Finite` or `PosInf` (a missing constraint);
//! `NegInf` shows up as the lower endpoint of an unbounded interval and as
//! the result of negating `PosInf`.

use std::fmt;
use std::ops::{Add, Neg};

/// An integer bound extended with both infinities.
///
/// The derived `Ord` gives the expected total order:
/// `NegInf < Finite(c) < PosInf` for every finite `c`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Bound {
    NegInf,
    Finite(i64),
    PosInf,
}

impl Bound {
    pub fn is_finite(self) -> bool {
        matches!(self, Bound::Finite(_))
    }

    pub fn is_infinite(self) -> bool {
        !self.is_finite()
    }

    /// The finite value, if any.
    pub fn finite(self) -> Option<i64> {
        match self {
            Bound::Finite(c) => Some(c),
            _ => None,
        }
    }

    /// Doubles the bound. Infinities are fixed points.
    pub fn doubled(self) -> Bound {
        match self {
            Bound::Finite(c) => Bound::Finite(2 * c),
            inf => inf,
        }
    }

    /// Halves the bound, rounding toward negative infinity.
    ///
    /// Flooring is the sound direction for an integer upper bound: from
    /// `2x <= c` we may conclude `x <= floor(c / 2)`.
    pub fn halved(self) -> Bound {
        match self {
            Bound::Finite(c) => Bound::Finite(c.div_euclid(2)),
            inf => inf,
        }
    }
}

impl Add for Bound {
    type Output = Bound;

    /// Adds two bounds. Any infinity is absorbing.
    ///
    /// # Panics
    ///
    /// Panics when adding opposite infinities. A closed DBM never stores
    /// `NegInf`, so the closure relaxation can never hit this case; hitting
    /// it means a caller fed an ill-formed bound pair.
    fn add(self, rhs: Bound) -> Bound {
        use Bound::*;
        match (self, rhs) {
            (PosInf, NegInf) | (NegInf, PosInf) => {
                panic!("Cannot add opposite infinities")
            }
            (PosInf, _) | (_, PosInf) => PosInf,
            (NegInf, _) | (_, NegInf) => NegInf,
            (Finite(a), Finite(b)) => Finite(a + b),
        }
    }
}

impl Neg for Bound {
    type Output = Bound;

    fn neg(self) -> Bound {
        match self {
            Bound::NegInf => Bound::PosInf,
            Bound::Finite(c) => Bound::Finite(-c),
            Bound::PosInf => Bound::NegInf,
        }
    }
}

impl From<i64> for Bound {
    fn from(c: i64) -> Self {
        Bound::Finite(c)
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::NegInf => write!(f, "-inf"),
            Bound::Finite(c) => write!(f, "{}", c),
            Bound::PosInf => write!(f, "+inf"),
        }
    }
}
