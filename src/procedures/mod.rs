//! The procedures of a solve, one per module.
//!
//! Each module implements a piece of the conflict-driven clause-learning loop as methods on the
//! [solver](crate::solver::GenericSolver), with the [solve](crate::procedures::solve) procedure
//! sequencing the rest:
//!
//! ```none
//!           +---------------+
//!   +-------| make_decision |
//!   |       +---------------+
//!   |               ⌃
//!   |               | stable, with some variable unvalued
//!   |               |
//!   ⌄        +-----------+          satisfiable, if every variable is valued
//! --+------->| propagate |--------> unsatisfiable, on a conflict with no decision to undo
//!   ⌃        +-----------+
//!   |               |
//!   |               | conflict
//!   |               ⌄
//!   |  +---------+-----------+----------+
//!   +--| analyze | minimize  | backjump |
//!      +---------+-----------+----------+
//! ```
//!
//! with restarts and stall recovery interrupting the loop from time to time.

pub mod analysis;
pub mod backjump;
pub mod decision;
pub mod minimize;
pub mod propagate;
pub mod restart;
pub mod solve;
