/*!
The incremental solver --- to which clauses are added, and within which solves take place.

A [GenericSolver] owns a [clause database](crate::db::ClauseDb), a
[trail](crate::db::trail::Trail), variable activities, and per-solve bookkeeping, and is generic
over its source of randomness.
[Solver] fixes the source to the crate's [minimal PCG](crate::generic::minimal_pcg), seeded from
[Config::seed](crate::config::Config::seed), so a solve is deterministic for a fixed formula,
configuration, and seed.

Formulas are given as slices of clauses, each clause a sequence of signed nonzero integers, and
may be extended between solves with permanent clauses, temporary clauses, and fresh variables.
A solve may be made under assumptions, with an unsatisfiable core of the assumptions available
after an unsatisfiable result.

# Example

```rust
use relay_sat::config::Config;
use relay_sat::solver::{SolveStatus, Solver};

let mut solver = Solver::new(&[vec![1, 2], vec![-1, 2]], Config::default());
assert_eq!(solver.solve(), SolveStatus::Satisfiable);
assert!(solver.assignment().satisfies(2.into()));

solver.add_clause(&[-2]);
assert_eq!(solver.solve(), SolveStatus::Unsatisfiable);
```
*/

pub mod stats;

use std::sync::Arc;
use std::time::Instant;

use rand::{Rng, SeedableRng};

use crate::config::{Activity, Config, RestartStrategy};
use crate::db::trail::Trail;
use crate::db::ClauseDb;
use crate::generic::index_heap::IndexHeap;
use crate::generic::luby::Luby;
use crate::generic::minimal_pcg::MinimalPcg32;
use crate::portfolio::signals::SearchSignals;
use crate::solver::stats::SolverStatistics;
use crate::structures::literal::{Literal, Variable};
use crate::structures::valuation::Assignment;
use crate::types::err::Interrupt;

/// The result of a solve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveStatus {
    /// A satisfying valuation was found, available through
    /// [assignment](GenericSolver::assignment).
    Satisfiable,

    /// The formula is unsatisfiable under the given assumptions, with a core available through
    /// [unsat_core](GenericSolver::unsat_core).
    Unsatisfiable,

    /// The solve was cut short --- by the time limit, an external stop, or the stall limit ---
    /// without an answer. Never a proof of anything.
    Unknown,
}

/// A variable's activity, ordered by activity with ties to the lowest variable id.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct VarActivity {
    pub activity: Activity,
    pub variable: Variable,
}

impl PartialOrd for VarActivity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match self.activity.partial_cmp(&other.activity) {
            Some(std::cmp::Ordering::Equal) => Some(other.variable.cmp(&self.variable)),
            ordering => ordering,
        }
    }
}

/// Rescale variable activities when any activity passes this bound.
pub(crate) const VARIABLE_ACTIVITY_BOUND: Activity = 1e100;

/// Progress bookkeeping for stall detection, refreshed each solve.
#[derive(Default)]
pub(crate) struct StallState {
    pub last_conflicts: usize,
    pub last_decisions: usize,
    pub last_propagations: usize,
    pub last_learned: usize,
    pub last_restarts: usize,
    pub last_level: u32,

    /// Iterations without progress since the last forced restart.
    pub stuck: usize,

    /// Iterations without progress since any progress at all.
    pub no_progress: usize,

    /// Forced restarts without intervening progress.
    pub consecutive_restarts: usize,

    /// Iterations spent at the same decision level.
    pub at_level: usize,
}

/// An incremental CDCL solver, generic over its source of randomness.
pub struct GenericSolver<R: Rng> {
    /// Configuration, fixed at construction apart from the explicit setters.
    pub(crate) config: Config,

    /// The clause database.
    pub(crate) db: ClauseDb,

    /// The trail, with the current valuation.
    pub(crate) trail: Trail,

    /// Variable activities, with unassigned variables active on the heap.
    pub(crate) activity_heap: IndexHeap<VarActivity>,

    /// The activity with which the next bumped variable will be bumped.
    pub(crate) var_inc: Activity,

    /// Assumptions for the next solve.
    pub(crate) assumptions: Vec<Literal>,

    /// The unsatisfiable core from the last unsatisfiable solve.
    pub(crate) core: Vec<Literal>,

    /// The satisfying valuation from the last satisfiable solve.
    pub(crate) satisfying: Option<Assignment>,

    /// The status of the last solve, invalidated by additions.
    pub(crate) last_status: Option<SolveStatus>,

    /// Counters, accumulated across solves.
    pub(crate) counters: SolverStatistics,

    /// Conflicts since the last restart.
    pub(crate) conflicts_since_restart: u32,

    /// The current restart threshold, in conflicts.
    pub(crate) restart_threshold: u32,

    /// The luby sequence, for luby-scheduled restarts.
    pub(crate) luby: Luby,

    /// Stall detection state.
    pub(crate) stall: StallState,

    /// The moment the current solve started.
    pub(crate) solve_start: Instant,

    /// Shared portfolio signals, when solving as a worker.
    pub(crate) signals: Option<Arc<SearchSignals>>,

    /// The solver's source of randomness.
    pub(crate) rng: R,
}

/// The canonical solver, on the crate's minimal PCG.
pub type Solver = GenericSolver<MinimalPcg32>;

impl<R: Rng + SeedableRng> GenericSolver<R> {
    /// A solver over `formula`, a slice of clauses of signed nonzero integers.
    pub fn new(formula: &[Vec<i32>], config: Config) -> Self {
        let mut solver = Self::from_config(config);
        for clause in formula {
            solver.add_clause(clause);
        }
        solver
    }

    /// A solver over the empty formula.
    pub fn from_config(config: Config) -> Self {
        let rng = R::seed_from_u64(config.seed);
        let restart_threshold = config.restart_threshold;
        let db = ClauseDb::new(0, config.clause_db.clone());

        GenericSolver {
            config,
            db,
            trail: Trail::default(),
            activity_heap: IndexHeap::default(),
            var_inc: 1.0,
            assumptions: Vec::default(),
            core: Vec::default(),
            satisfying: None,
            last_status: None,
            counters: SolverStatistics::default(),
            conflicts_since_restart: 0,
            restart_threshold,
            luby: Luby::default(),
            stall: StallState::default(),
            solve_start: Instant::now(),
            signals: None,
            rng,
        }
    }
}

impl<R: Rng + SeedableRng> GenericSolver<R> {
    /// Adds a permanent clause, introducing any variables the clause mentions.
    pub fn add_clause(&mut self, clause: &[i32]) {
        let literals = self.intern_clause(clause);
        self.db.add_clause(literals, false);
        self.last_status = None;
    }

    /// Adds a clause valid only until the next solve completes.
    pub fn add_temporary_clause(&mut self, clause: &[i32]) {
        let literals = self.intern_clause(clause);
        self.db.add_temporary(literals);
        self.last_status = None;
    }

    /// Introduces a fresh variable, with zero activity and no phase.
    pub fn new_variable(&mut self) -> Variable {
        let variable = self.db.new_variable();
        self.trail.ensure_capacity(self.db.variable_count());
        self.activity_heap.add(
            variable as usize,
            VarActivity {
                activity: 0.0,
                variable,
            },
        );
        variable
    }

    /// Sets the assumptions for subsequent solves.
    pub fn set_assumptions(&mut self, assumptions: &[i32]) {
        self.assumptions = assumptions.iter().map(|l| Literal::from(*l)).collect();
        self.last_status = None;
    }

    /// Appends a single assumption.
    pub fn add_assumption(&mut self, literal: i32) {
        self.assumptions.push(Literal::from(literal));
        self.last_status = None;
    }

    /// Clears all assumptions.
    pub fn clear_assumptions(&mut self) {
        self.assumptions.clear();
        self.last_status = None;
    }

    /// Solves under the given assumptions, replacing any previously set.
    pub fn solve_with_assumptions(&mut self, assumptions: &[i32]) -> SolveStatus {
        self.set_assumptions(assumptions);
        self.solve()
    }

    /// The satisfying valuation from the last satisfiable solve, empty otherwise.
    pub fn assignment(&self) -> Assignment {
        self.satisfying.clone().unwrap_or_default()
    }

    /// The unsatisfiable core from the last unsatisfiable solve: a subset of the assumption
    /// list which suffices for unsatisfiability.
    pub fn unsat_core(&self) -> &[Literal] {
        &self.core
    }

    /// Sets the wall-clock limit for each solve.
    pub fn set_timeout(&mut self, limit: std::time::Duration) {
        self.config.time_limit = limit;
    }

    /// Sets the decay factor for variable activities.
    pub fn set_var_decay(&mut self, decay: f64) {
        self.config.var_decay = decay;
    }

    /// Configures the restart strategy and its base threshold.
    pub fn set_restart(&mut self, strategy: RestartStrategy, threshold: u32) {
        self.config.restart_strategy = strategy;
        self.config.restart_threshold = threshold;
        self.restart_threshold = threshold;
        self.luby = Luby::default();
    }

    /// Caps the learned clause population.
    pub fn set_max_learnts(&mut self, cap: usize) {
        self.db.set_max_learnts(cap);
    }

    /// Enables or disables phase saving.
    pub fn set_phase_saving(&mut self, enabled: bool) {
        self.config.phase_saving = enabled;
    }

    /// Sets the probability a saved phase is overridden with a random polarity.
    pub fn set_random_polarity_freq(&mut self, freq: f64) {
        self.config.random_polarity_freq = freq;
    }

    /// Enables or disables lbd scoring of learned clauses.
    pub fn set_use_lbd(&mut self, enabled: bool) {
        self.config.use_lbd = enabled;
    }

    /// Forces the phase first tried when deciding on `variable`.
    ///
    /// Effective while phase saving is enabled; the phase is overwritten once the variable
    /// holds a value.
    pub fn set_decision_polarity(&mut self, variable: Variable, phase: bool) {
        self.ensure_variable(variable);
        self.trail.set_phase(variable, phase);
    }

    /// Randomizes the saved phase of each variable with probability `freq`, for
    /// diversification.
    pub fn randomize_polarities(&mut self, freq: f64) {
        if !self.config.phase_saving {
            return;
        }
        for variable in 1..=self.db.variable_count() as Variable {
            if self.rng.random::<f64>() < freq {
                let phase = self.rng.random::<bool>();
                self.trail.set_phase(variable, phase);
            }
        }
    }

    /// Attaches shared portfolio signals, polled at the solve's cancellation points.
    pub fn attach_signals(&mut self, signals: Arc<SearchSignals>) {
        self.signals = Some(signals);
    }

    /// The solver's counters.
    pub fn statistics(&self) -> &SolverStatistics {
        &self.counters
    }

    /// The status of the last solve, cleared by any addition.
    pub fn last_status(&self) -> Option<SolveStatus> {
        self.last_status
    }

    /// A count of variables known to the solver.
    pub fn variable_count(&self) -> usize {
        self.db.variable_count()
    }

    /// A count of live clauses in the database.
    pub fn clause_count(&self) -> usize {
        self.db.clause_count()
    }

    /// A count of live learned clauses in the database.
    pub fn learned_count(&self) -> usize {
        self.db.learned_count()
    }
}

// Internal supports.
impl<R: Rng + SeedableRng> GenericSolver<R> {
    /// Interns a clause of integers, growing variable storage to cover its literals.
    fn intern_clause(&mut self, clause: &[i32]) -> Vec<Literal> {
        let literals: Vec<Literal> = clause.iter().map(|l| Literal::from(*l)).collect();
        for literal in &literals {
            self.ensure_variable(literal.variable());
        }
        literals
    }

    /// Grows variable storage to cover `variable`.
    pub(crate) fn ensure_variable(&mut self, variable: Variable) {
        while self.db.variable_count() < variable as usize {
            self.new_variable();
        }
    }

    /// Sets variable activities to literal occurrence counts and rebuilds the heap.
    pub(crate) fn init_vsids(&mut self) {
        self.var_inc = 1.0;
        for variable in 1..=self.db.variable_count() as Variable {
            let (positive, negative) = self.db.occurrence_of(variable);
            self.activity_heap.add(
                variable as usize,
                VarActivity {
                    activity: (positive + negative) as Activity,
                    variable,
                },
            );
            if self.trail.value_of(variable).is_none() {
                self.activity_heap.activate(variable as usize);
            }
        }
    }

    /// Bumps the activity of `variable`, rescaling all activities if any would pass the bound.
    pub(crate) fn bump_variable_activity(&mut self, variable: Variable) {
        let bumped = self.activity_heap.value_at(variable as usize).activity + self.var_inc;
        if bumped > VARIABLE_ACTIVITY_BOUND {
            self.activity_heap.apply_to_all(|value| VarActivity {
                activity: value.activity * 1e-100,
                variable: value.variable,
            });
            self.var_inc *= 1e-100;
        }

        let var_inc = self.var_inc;
        self.activity_heap
            .apply_to_value_at(variable as usize, |value| VarActivity {
                activity: value.activity + var_inc,
                variable: value.variable,
            });
    }

    /// Decays variable activities, by inflating the next bump.
    pub(crate) fn decay_variable_activities(&mut self) {
        self.var_inc /= self.config.var_decay;
    }

    /// Returns an interrupt if the solve deadline has passed or an external stop was signalled.
    pub(crate) fn check_interrupt(&self) -> Result<(), Interrupt> {
        let limit = self.config.time_limit;
        if !limit.is_zero() && self.solve_start.elapsed() > limit {
            return Err(Interrupt);
        }
        if let Some(signals) = &self.signals {
            if signals.should_stop() {
                return Err(Interrupt);
            }
        }
        Ok(())
    }

    /// Extracts the unsatisfiable core from the final clause of a conflict at level zero.
    ///
    /// The core is the set of assumptions whose negation appears in the clause and which sit on
    /// the trail at level zero with the decision mark --- a level-zero entry without the mark is
    /// a propagated fact, never part of the core.
    pub(crate) fn extract_core(&mut self, final_clause: &[Literal]) {
        self.core.clear();
        for assumption in &self.assumptions {
            if !final_clause.contains(&assumption.negate()) {
                continue;
            }
            match self.trail.entry_for(assumption.variable()) {
                Some(entry) if entry.level == 0 && entry.is_decision => {
                    self.core.push(*assumption);
                }
                _ => {}
            }
        }
    }
}
