/*!
Signals shared between the portfolio manager and its workers.

Two flags cross the thread boundary: *solution found* and *global timeout*.
Workers poll [should_stop](SearchSignals::should_stop) at their cancellation points --- during
propagation, analysis, and minimization --- and return from the current solve within one
polling interval of either flag being raised.
No worker is ever preempted.

The solution flag is raised by the winning worker *while holding the lock* on the portfolio's
result record, after publishing its assignment.
A reader which observes the flag and then acquires the lock therefore reads a consistent
assignment.
*/

use std::sync::atomic::{AtomicBool, Ordering};

/// The cross-worker stop flags.
#[derive(Default)]
pub struct SearchSignals {
    /// Raised by the first worker to publish a satisfying assignment.
    solution_found: AtomicBool,

    /// Raised by the manager when the global deadline passes.
    global_timeout: AtomicBool,
}

impl SearchSignals {
    pub fn new() -> Self {
        SearchSignals::default()
    }

    /// True only if a solution has been published or the global deadline has passed.
    pub fn should_stop(&self) -> bool {
        self.solution_found.load(Ordering::Acquire) || self.global_timeout.load(Ordering::Acquire)
    }

    /// True only if a solution has been published.
    pub fn solution_found(&self) -> bool {
        self.solution_found.load(Ordering::Acquire)
    }

    /// True only if the global deadline has passed.
    pub fn timed_out(&self) -> bool {
        self.global_timeout.load(Ordering::Acquire)
    }

    /// Raises the solution flag. Called with the result record locked.
    pub fn signal_solution(&self) {
        self.solution_found.store(true, Ordering::Release);
    }

    /// Raises the timeout flag.
    pub fn signal_timeout(&self) {
        self.global_timeout.store(true, Ordering::Release);
    }
}
