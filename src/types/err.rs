/*!
Error types used in the library.

Most operations on the databases cannot fail --- an invalid clause id, for example, is silently
ignored, with callers required to treat a vacant slot as a deleted clause.
The errors here are instead used to control the flow of a solve:

- A [conflict](BcpError::Conflict) during propagation is expected from time to time, and a
  learning opportunity rather than a fault.
- An [interrupt](Interrupt) is raised when a poll during propagation, analysis, or minimization
  observes the solve deadline has passed or an external stop was signalled.
  The in-flight procedure returns without further mutation and the solve reports
  [Unknown](crate::solver::SolveStatus::Unknown).
*/

use crate::db::ClauseId;

/// A poll observed the solve deadline passed, or an external stop signal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Interrupt;

/// Noted errors during boolean constraint propagation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BcpError {
    /// A clause unsatisfiable on the current valuation was found.
    Conflict(ClauseId),

    /// A poll observed the solve should stop.
    Interrupted,
}

impl From<Interrupt> for BcpError {
    fn from(_: Interrupt) -> Self {
        BcpError::Interrupted
    }
}

/// Noted errors during conflict analysis.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AnalysisError {
    /// A poll observed the solve should stop.
    Interrupted,
}

impl From<Interrupt> for AnalysisError {
    fn from(_: Interrupt) -> Self {
        AnalysisError::Interrupted
    }
}
