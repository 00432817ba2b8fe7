//! Difference-bound matrix.
//!
//! A [`Dbm`] of size `2N` encodes octagonal constraints over `N` variables:
//! every variable occupies two adjacent indices, one for its positive and one
//! for its negative occurrence, and the entry at `(i, j)` is an upper bound
//! on `V_i - V_j` where `V_2k = +v_k` and `V_2k+1 = -v_k`.
//!
//! The matrix itself knows nothing about variables; the mapping lives in
//! [`crate::octagon::Octagon`]. Here we only provide the entrywise lattice
//! primitives (intersection, union, zip) and the shortest-path closure.

use std::ops::{Index, IndexMut};

use log::debug;
use thiserror::Error;

use crate::bound::Bound;

/// The closure relaxation found a negative cycle: the encoded constraint set
/// has no solution. Callers must treat the enclosing octagon as bottom.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
#[error("DBM constraints are infeasible (negative cycle)")]
pub struct Infeasible;

/// The flipped occurrence of an encoded index: positive <-> negative.
#[inline]
pub(crate) fn flip(i: usize) -> usize {
    i ^ 1
}

/// A dense square matrix of [`Bound`]s, row-major.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Dbm {
    size: usize,
    entries: Vec<Bound>,
}

impl Dbm {
    /// Creates an unconstrained DBM: every entry is `+inf`.
    ///
    /// The size must be even (two encoded indices per variable).
    pub fn new(size: usize) -> Self {
        assert_eq!(size % 2, 0, "DBM size must be even");
        Self {
            size,
            entries: vec![Bound::PosInf; size * size],
        }
    }

    /// Number of rows (= columns).
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        assert!(i < self.size, "Row {} out of range 0..{}", i, self.size);
        assert!(j < self.size, "Column {} out of range 0..{}", j, self.size);
        i * self.size + j
    }

    pub fn get(&self, i: usize, j: usize) -> Bound {
        self.entries[self.offset(i, j)]
    }

    pub fn set(&mut self, i: usize, j: usize, bound: Bound) {
        let offset = self.offset(i, j);
        self.entries[offset] = bound;
    }

    /// Entrywise minimum: tightens each bound to the stricter of the two.
    ///
    /// Sound without a closure precondition, since the meet of two octagons
    /// is itself an octagon.
    pub fn intersection(&mut self, other: &Dbm) {
        self.zip(other, |a, b| a.min(b));
    }

    /// Entrywise maximum: loosens each bound to the looser of the two.
    ///
    /// Both operands must already be closed, otherwise the result loses
    /// precision that closure would have recovered.
    pub fn union(&mut self, other: &Dbm) {
        self.zip(other, |a, b| a.max(b));
    }

    /// Entrywise application of `f`, storing the result in `self`.
    pub fn zip(&mut self, other: &Dbm, f: impl Fn(Bound, Bound) -> Bound) {
        assert_eq!(
            self.size, other.size,
            "Cannot combine DBMs of different sizes"
        );
        for (a, &b) in self.entries.iter_mut().zip(other.entries.iter()) {
            *a = f(*a, b);
        }
    }

    /// Computes the closure: the strongest set of bounds equivalent to the
    /// current one.
    ///
    /// This is an all-pairs-shortest-paths relaxation (Floyd-Warshall over
    /// the `size`-node constraint graph) followed by the octagon coherence
    /// step, which tightens `(i, j)` through the flipped pair
    /// `(i, flip(i))`, `(flip(j), j)` of each index's own variable.
    ///
    /// Returns [`Infeasible`] if the relaxation drives a diagonal entry
    /// negative; otherwise the diagonal is normalized to zero.
    pub fn close(&mut self) -> Result<(), Infeasible> {
        debug!("close(size = {})", self.size);

        let n = self.size;
        for k in 0..n {
            for i in 0..n {
                let ik = self.get(i, k);
                if ik == Bound::PosInf {
                    continue;
                }
                for j in 0..n {
                    let via = ik + self.get(k, j);
                    if via < self.get(i, j) {
                        self.set(i, j, via);
                    }
                }
            }
        }

        // Coherence: +/- occurrences of the same variable are two unit steps
        // apart, so unary bounds can tighten any binary bound.
        for i in 0..n {
            let half_i = self.get(i, flip(i)).halved();
            for j in 0..n {
                let via = half_i + self.get(flip(j), j).halved();
                if via < self.get(i, j) {
                    self.set(i, j, via);
                }
            }
        }

        for i in 0..n {
            if self.get(i, i) < Bound::Finite(0) {
                debug!("close: negative cycle through index {}", i);
                return Err(Infeasible);
            }
            self.set(i, i, Bound::Finite(0));
        }

        Ok(())
    }

    /// All `(row, column)` positions, row-major.
    pub fn keys(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.size;
        (0..n).flat_map(move |i| (0..n).map(move |j| (i, j)))
    }

    /// All bounds, row-major.
    pub fn values(&self) -> impl Iterator<Item = Bound> + '_ {
        self.entries.iter().copied()
    }

    /// All `((row, column), bound)` pairs, row-major.
    pub fn items(&self) -> impl Iterator<Item = ((usize, usize), Bound)> + '_ {
        self.keys().zip(self.values())
    }
}

impl Index<(usize, usize)> for Dbm {
    type Output = Bound;

    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        &self.entries[self.offset(i, j)]
    }
}

impl IndexMut<(usize, usize)> for Dbm {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        let offset = self.offset(i, j);
        &mut self.entries[offset]
    }
}
