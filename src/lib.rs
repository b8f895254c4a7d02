//! A library for determining the satisfiability of boolean formulas written in conjunctive normal form.
//!
//! relay_sat is an incremental conflict-driven clause-learning (CDCL) solver together with a
//! portfolio layer which races diversified solver instances to the first answer.
//!
//! At a high level the library is arranged around a handful of structures:
//! - A formula is stored in a [clause database](crate::db::ClauseDb), which owns every clause and
//!   maps each literal to the clauses watching it.
//! - The current (partial) valuation is stored on a [trail](crate::db::trail::Trail), which records
//!   for each assignment its decision level, the clause which forced it (if any), and whether it
//!   was a decision.
//! - A [solver](crate::solver::Solver) drives the CDCL loop over these, with the details of the
//!   loop factored into a collection of [procedures].
//! - A [portfolio](crate::portfolio::Portfolio) runs several independently configured solvers over
//!   a shared formula on their own threads, and returns as soon as one of them reports.
//!
//! # Example
//!
//! ```rust
//! use relay_sat::config::Config;
//! use relay_sat::solver::{SolveStatus, Solver};
//!
//! // (x1 ∨ x2) ∧ (¬x1 ∨ x3) ∧ (¬x2 ∨ ¬x3)
//! let formula = vec![vec![1, 2], vec![-1, 3], vec![-2, -3]];
//! let mut solver = Solver::new(&formula, Config::default());
//!
//! assert_eq!(solver.solve(), SolveStatus::Satisfiable);
//!
//! let assignment = solver.assignment();
//! for clause in &formula {
//!     assert!(clause.iter().any(|&l| assignment.satisfies(l.into())));
//! }
//! ```
//!
//! Solves are incremental: clauses and fresh variables may be added between solves, and a solve
//! may be made under assumptions, with an unsatisfiable core of the assumptions read back on an
//! unsatisfiable result.
//!
//! ```rust
//! use relay_sat::config::Config;
//! use relay_sat::solver::{SolveStatus, Solver};
//!
//! let formula = vec![vec![1, 2], vec![-1, 3]];
//! let mut solver = Solver::new(&formula, Config::default());
//!
//! solver.set_assumptions(&[1, -3]);
//! assert_eq!(solver.solve(), SolveStatus::Unsatisfiable);
//!
//! let core: Vec<i32> = solver.unsat_core().iter().map(|l| l.as_int()).collect();
//! assert!(core.contains(&1) && core.contains(&-3));
//! ```
//!
//! # Logs
//!
//! Calls to [log!](log) are made throughout, with a target defined per subsystem to help narrow
//! output to the relevant part of a solve — see [misc::log::targets](crate::misc::log::targets).
//! For example, with [env_logger](https://docs.rs/env_logger/latest/env_logger/) logs of clause
//! database reductions can be isolated with `RUST_LOG=reduction …`.

pub mod config;
pub mod db;
pub mod generic;
pub mod misc;
pub mod portfolio;
pub mod procedures;
pub mod solver;
pub mod structures;
pub mod types;
