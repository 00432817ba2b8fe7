//! # octagon-rs: the Octagon Abstract Domain in Rust
//!
//! **`octagon-rs`** is the numerical core of a static program analyzer: it
//! maintains a sound over-approximation of the reachable variable valuations
//! as a conjunction of **octagonal constraints** `±x ± y ≤ c`.
//!
//! ## What is an octagon?
//!
//! An octagon is the set of points satisfying a system of unit-two-variable
//! inequalities. It sits between intervals (cheaper, less precise) and
//! convex polyhedra (more precise, far more expensive): it can express
//! relations like `x - y ≤ 3` while staying cubic-time in the number of
//! variables.
//!
//! ## Key Features
//!
//! - **DBM encoding**: constraints live in a difference-bound matrix of size
//!   `2N x 2N`, two signed occurrences per variable, with a
//!   Floyd-Warshall-style [closure][crate::dbm::Dbm::close] that normalizes
//!   the system to its strongest equivalent form and detects infeasibility.
//! - **Lattice operations**: [`meet`][crate::octagon::Octagon::meet],
//!   [`join`][crate::octagon::Octagon::join] (which closes both operands
//!   first, as precision demands), instability-detection
//!   [`widening`][crate::octagon::Octagon::widening], and pointwise
//!   [`less_equal`][crate::octagon::Octagon::less_equal] comparison.
//! - **Transfer functions**: assignments whose right-hand side matches the
//!   single-variable linear form `±x + [a, b]` are handled precisely; the
//!   extractor is a structural match over a closed expression AST.
//!
//! ## Basic Usage
//!
//! ```rust
//! use octagon_rs::bound::Bound;
//! use octagon_rs::domain::{OctagonDomain, State};
//! use octagon_rs::expr::{Expr, Variable};
//!
//! // 1. Fix the tracked variables (this fixes the DBM dimension).
//! let x = Variable::int("x");
//! let y = Variable::int("y");
//! let mut state = OctagonDomain::new(vec![x.clone(), y.clone()]);
//!
//! // 2. x = 5
//! state.assign(&x, &Expr::literal(5)).unwrap();
//!
//! // 3. x = x + 2
//! let rhs = Expr::add(Expr::var(x.clone()), Expr::literal(2));
//! state.assign(&x, &rhs).unwrap();
//!
//! // 4. Inspect the abstract value.
//! assert_eq!(state.octagon().get_lb(&x), Bound::Finite(7));
//! assert_eq!(state.octagon().get_ub(&x), Bound::Finite(7));
//! assert_eq!(state.octagon().to_string(), "7<=x<=7");
//! ```
//!
//! ## Core Components
//!
//! - **[`dbm`]**: the difference-bound matrix and its closure algorithm.
//! - **[`octagon`]**: the lattice wrapper — index mapping, bottom sentinel,
//!   lattice and constraint operations, constraint rendering.
//! - **[`linear`]**: the single-variable linear-form extractor.
//! - **[`domain`]**: the abstract-state protocol the fixpoint driver calls.
//!
//! The crate is single-threaded by design: every operation is a direct,
//! in-place computation over a bounded matrix, with one abstract state per
//! analyzed program point.

pub mod bound;
pub mod dbm;
pub mod domain;
pub mod expr;
pub mod interval;
pub mod linear;
pub mod octagon;
