/*!
A portfolio of diversified solvers, raced to the first answer.

The manager spawns one thread per selected [preset](presets), each owning an independent
[solver](crate::solver::Solver) over a shared immutable view of the formula --- there is no
sharing of learned clauses between workers.

The cross-worker channel is deliberately narrow:
- the [signals](signals::SearchSignals) --- two atomics polled by every worker at its
  cancellation points;
- a result record behind a mutex, to which the first satisfiable worker publishes its
  assignment (raising the solution flag while the record is locked);
- a results channel on which every worker sends its [report](WorkerReport), drained by the
  manager.

The first worker to publish wins; later satisfiable finishers silently abandon their
assignments.
A global deadline raises the timeout flag, after which every worker returns within one polling
interval; the manager joins all workers before returning.
If every worker completes without a solution the race reports unsatisfiable --- or merely
unknown, when a deadline cut the search short, which the boolean surface folds into `false`.

Worker counts respect resources: at most `min(presets, hardware parallelism, memory budget /
per-worker estimate)` workers run, with the per-worker estimate derived from the formula size.

# Example

```rust
use std::time::Duration;
use relay_sat::portfolio::Portfolio;

let formula = vec![vec![1, 2], vec![-1, 3], vec![-2, -3]];
let mut portfolio = Portfolio::new(formula, Duration::from_secs(10), 4);

assert!(portfolio.solve());
let solution = portfolio.solution().expect("a published assignment");
assert!(solution.satisfies(1.into()) || solution.satisfies(2.into()));
```
*/

pub mod presets;
pub mod signals;

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, RecvTimeoutError};

use crate::config::Config;
use crate::misc::log::targets;
use crate::portfolio::presets::WorkerPreset;
use crate::portfolio::signals::SearchSignals;
use crate::solver::stats::SolverStatistics;
use crate::solver::{SolveStatus, Solver};
use crate::structures::valuation::Assignment;

/// A formula, as clauses of signed nonzero integers.
pub type Formula = Vec<Vec<i32>>;

/// Base memory attributed to a worker, before the formula.
const WORKER_BASE_MEMORY: usize = 25 * 1024 * 1024;

/// Estimated bytes per clause of a worker's database.
const WORKER_CLAUSE_MEMORY: usize = 80;

/// Estimated bytes per variable of a worker's state.
const WORKER_VARIABLE_MEMORY: usize = 40;

/// The memory budget shared by all workers.
const PORTFOLIO_MEMORY_BUDGET: usize = 8 * 1024 * 1024 * 1024;

/// Why a worker's solve ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminationReason {
    /// The worker won the race with a satisfying assignment.
    Solution,

    /// The worker completed an unsatisfiability proof.
    Unsat,

    /// The worker observed a deadline, or abandoned the solve as unresolved.
    Timeout,

    /// The worker failed, or was never able to run within resource limits.
    Resource,

    /// The worker stopped because a sibling published a solution first.
    ExternalStop,
}

/// What a worker reports back to the manager.
#[derive(Clone, Debug)]
pub struct WorkerReport {
    /// The worker's index into the preset catalog.
    pub worker: usize,

    /// The status the worker's solve returned.
    pub status: SolveStatus,

    /// Why the solve ended.
    pub reason: TerminationReason,

    /// The worker's solver counters.
    pub stats: SolverStatistics,

    /// Live learned clauses when the solve ended.
    pub learned: usize,

    /// Wall-clock duration of the solve.
    pub duration: Duration,

    /// The memory estimate the worker was admitted under.
    pub estimated_memory: usize,
}

/// The race's published result.
#[derive(Default)]
struct RaceOutcome {
    solution: Option<Assignment>,
    winner: Option<usize>,
}

/// A portfolio of diversified solvers over one formula.
pub struct Portfolio {
    /// The shared immutable formula.
    formula: Arc<Formula>,

    /// The global deadline for the race.
    timeout: Duration,

    /// The requested cap on concurrent workers.
    worker_limit: usize,

    /// The memory budget shared by all workers.
    memory_budget: usize,

    /// The cross-worker stop flags.
    signals: Arc<SearchSignals>,

    /// The result record.
    outcome: Arc<Mutex<RaceOutcome>>,

    /// The winning assignment, once the race has run.
    solution: Option<Assignment>,

    /// The winning worker, once the race has run.
    winner: Option<usize>,

    /// Reports from every worker of the last race.
    reports: Vec<WorkerReport>,
}

impl Portfolio {
    /// A portfolio over `formula` with a global `timeout` and at most `worker_count` workers.
    pub fn new(formula: Formula, timeout: Duration, worker_count: usize) -> Self {
        Portfolio {
            formula: Arc::new(formula),
            timeout,
            worker_limit: worker_count.max(1),
            memory_budget: PORTFOLIO_MEMORY_BUDGET,
            signals: Arc::new(SearchSignals::new()),
            outcome: Arc::new(Mutex::new(RaceOutcome::default())),
            solution: None,
            winner: None,
            reports: Vec::default(),
        }
    }

    /// Races the workers. Returns true only if some worker found a satisfying assignment.
    ///
    /// `false` covers both a completed unsatisfiability proof and a race cut short by the
    /// deadline; consult [statistics](Portfolio::statistics) to distinguish them.
    pub fn solve(&mut self) -> bool {
        self.solution = None;
        self.winner = None;
        self.reports.clear();

        // Fresh flags and record, in case the race is rerun.
        self.signals = Arc::new(SearchSignals::new());
        self.outcome = Arc::new(Mutex::new(RaceOutcome::default()));

        let catalog = presets::catalog();
        let per_worker_memory = Self::estimate_worker_memory(&self.formula);
        let memory_limit = (self.memory_budget / per_worker_memory).max(1);
        let hardware_limit = thread::available_parallelism().map_or(1, |n| n.get());

        let worker_count = catalog
            .len()
            .min(self.worker_limit)
            .min(hardware_limit)
            .min(memory_limit)
            .max(1);

        log::info!(
            target: targets::PORTFOLIO,
            "Racing {worker_count} of {} presets, ~{}MB per worker",
            catalog.len(),
            per_worker_memory / (1024 * 1024)
        );

        let deadline = Instant::now() + self.timeout;
        let (report_tx, report_rx) = channel::bounded::<WorkerReport>(worker_count);
        let mut handles = Vec::with_capacity(worker_count);

        for (worker, preset) in catalog.into_iter().take(worker_count).enumerate() {
            let formula = Arc::clone(&self.formula);
            let signals = Arc::clone(&self.signals);
            let outcome = Arc::clone(&self.outcome);
            let sender = report_tx.clone();
            let timeout = self.timeout;

            handles.push(thread::spawn(move || {
                let attempt = std::panic::catch_unwind(AssertUnwindSafe(|| {
                    run_worker(
                        worker,
                        &preset,
                        &formula,
                        timeout,
                        per_worker_memory,
                        &signals,
                        &outcome,
                    )
                }));

                let report = attempt.unwrap_or_else(|_| {
                    log::error!(target: targets::PORTFOLIO, "Worker {worker} failed");
                    WorkerReport {
                        worker,
                        status: SolveStatus::Unknown,
                        reason: TerminationReason::Resource,
                        stats: SolverStatistics::default(),
                        learned: 0,
                        duration: Duration::default(),
                        estimated_memory: per_worker_memory,
                    }
                });

                // Delivery fails only once the manager has stopped listening.
                let _ = sender.send(report);
            }));
        }
        drop(report_tx);

        // Drain reports until every worker has answered or the deadline passes.
        let mut received = 0;
        while received < worker_count {
            let now = Instant::now();
            if now >= deadline {
                self.signals.signal_timeout();
                break;
            }
            match report_rx.recv_timeout(deadline - now) {
                Ok(report) => {
                    received += 1;
                    self.reports.push(report);
                }
                Err(RecvTimeoutError::Timeout) => {
                    log::info!(target: targets::PORTFOLIO, "Global deadline passed");
                    self.signals.signal_timeout();
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        // Workers observe the flags within a polling interval; wait for every one.
        for handle in handles {
            let _ = handle.join();
        }
        while let Ok(report) = report_rx.try_recv() {
            self.reports.push(report);
        }
        self.reports.sort_by_key(|report| report.worker);

        let outcome = match self.outcome.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        self.solution = outcome.solution.clone();
        self.winner = outcome.winner;

        self.solution.is_some()
    }

    /// The satisfying assignment published by the winning worker, if any.
    pub fn solution(&self) -> Option<&Assignment> {
        self.solution.as_ref()
    }

    /// The index of the winning worker, if any.
    pub fn winner(&self) -> Option<usize> {
        self.winner
    }

    /// Reports from every worker of the last race.
    pub fn statistics(&self) -> &[WorkerReport] {
        &self.reports
    }

    /// Revises the global deadline for subsequent races.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Revises the memory budget shared by all workers, capping how many run concurrently.
    pub fn set_memory_budget(&mut self, bytes: usize) {
        self.memory_budget = bytes.max(1);
    }

    /// Estimated memory for one worker over `formula`.
    fn estimate_worker_memory(formula: &Formula) -> usize {
        let variable_count = formula
            .iter()
            .flatten()
            .map(|literal| literal.unsigned_abs() as usize)
            .max()
            .unwrap_or(0);

        WORKER_BASE_MEMORY
            + formula.len() * WORKER_CLAUSE_MEMORY
            + variable_count * WORKER_VARIABLE_MEMORY
    }
}

/// The body of a worker thread: configure, solve, publish on a win, report.
fn run_worker(
    worker: usize,
    preset: &WorkerPreset,
    formula: &Formula,
    timeout: Duration,
    estimated_memory: usize,
    signals: &Arc<SearchSignals>,
    outcome: &Arc<Mutex<RaceOutcome>>,
) -> WorkerReport {
    let mut config = Config::default();
    preset.apply(&mut config);
    config.time_limit = timeout;

    let mut solver = Solver::new(formula, config);
    solver.attach_signals(Arc::clone(signals));
    solver.randomize_polarities(preset.random_polarity_freq);

    let start = Instant::now();
    let status = solver.solve();
    let duration = start.elapsed();

    let reason = match status {
        SolveStatus::Satisfiable => {
            let mut guard = match outcome.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            match guard.winner {
                None if !signals.solution_found() => {
                    guard.solution = Some(solver.assignment());
                    guard.winner = Some(worker);
                    // Raised while the record is locked, so readers of the flag see the
                    // published assignment.
                    signals.signal_solution();
                    TerminationReason::Solution
                }
                _ => TerminationReason::ExternalStop,
            }
        }

        SolveStatus::Unsatisfiable => TerminationReason::Unsat,

        SolveStatus::Unknown => match signals.solution_found() {
            true => TerminationReason::ExternalStop,
            false => TerminationReason::Timeout,
        },
    };

    log::info!(
        target: targets::PORTFOLIO,
        "Worker {worker} finished: {status:?} ({reason:?}) after {}ms, {} conflicts",
        duration.as_millis(),
        solver.statistics().conflicts
    );

    let stats = solver.statistics().clone();
    let learned = stats.learned_clauses;

    WorkerReport {
        worker,
        status,
        reason,
        stats,
        learned,
        duration,
        estimated_memory,
    }
}
