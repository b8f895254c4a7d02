/*!
Determines the satisfiability of the formula in the solver, under the current assumptions.

# Overview

A solve alternates propagation with decisions, learning from each conflict:

- [Propagation](crate::procedures::propagate) drives the trail to a stable state, or finds a
  conflicting clause.
- On a conflict with an implication point, [analysis](crate::procedures::analysis) produces a
  learned clause, [minimization](crate::procedures::minimize) strengthens it, and the solve
  [backjumps](crate::procedures::backjump) to the level at which the clause asserts its literal.
- On a conflict at level zero, the formula is unsatisfiable under the assumptions, and the core
  is extracted from the final clause of the analysis.
- When stable with every variable valued, the formula is satisfied and the valuation is
  snapshotted.
- Otherwise a [decision](crate::procedures::decision) opens a fresh level.

[Restarts](crate::procedures::restart) interrupt the alternation on their schedule, and stall
detection watches for iterations which move none of the counters, escalating from a forced
restart through clearing learned clauses to abandoning the solve as unresolved.

# Solve boundaries

Each solve closes by dropping all non-core clauses --- the clauses it learned, and the
temporary clauses it ran under --- so a temporary clause binds exactly the solve it precedes.
At the open, watch lists are rebuilt, activities are reinitialized from occurrence counts, and
the solver's source of randomness is reseeded, so a solve is a deterministic function of the
database, configuration, and assumptions.

Assumptions are placed on the trail at level zero, marked as decisions; a contradictory pair
short-circuits to unsatisfiable with the pair as the core.

# Leaving the loop

A solve ends with [Satisfiable](SolveStatus::Satisfiable),
[Unsatisfiable](SolveStatus::Unsatisfiable), or --- on the deadline, an external stop, the
stall limit, or the iteration cap --- [Unknown](SolveStatus::Unknown), which is never a proof.
*/

use std::time::Instant;

use rand::{Rng, SeedableRng};

use crate::db::ClauseDb;
use crate::generic::luby::Luby;
use crate::misc::log::targets;
use crate::procedures::analysis::LearnedClause;
use crate::procedures::decision::DecisionOk;
use crate::solver::{GenericSolver, SolveStatus, StallState};
use crate::types::err::BcpError;

impl<R: Rng + SeedableRng> GenericSolver<R> {
    /// Determines the satisfiability of the formula under the current assumptions.
    pub fn solve(&mut self) -> SolveStatus {
        self.solve_start = Instant::now();
        let status = self.solve_given();
        self.counters.solve_time = self.solve_start.elapsed();
        self.counters.learned_clauses = self.db.learned_count();
        self.last_status = Some(status);

        // The solve boundary: the clauses this solve learned, and any temporary clauses it ran
        // under, vanish.
        self.db.clear_learned();

        log::info!(target: targets::SOLVE, "Solve concluded: {status:?}");
        status
    }

    fn solve_given(&mut self) -> SolveStatus {
        self.satisfying = None;
        self.core.clear();

        // Contradictory assumptions short-circuit, with the pair as the core.
        for i in 0..self.assumptions.len() {
            for j in (i + 1)..self.assumptions.len() {
                if self.assumptions[i] == self.assumptions[j].negate() {
                    log::info!(
                        target: targets::SOLVE,
                        "Contradictory assumptions {} and {}",
                        self.assumptions[i],
                        self.assumptions[j]
                    );
                    self.core = vec![self.assumptions[i], self.assumptions[j]];
                    return SolveStatus::Unsatisfiable;
                }
            }
        }

        // A fresh start over the current database.
        self.rng = R::seed_from_u64(self.config.seed);
        self.trail.clear();
        self.trail.ensure_capacity(self.db.variable_count());
        self.db.init_watches();
        self.init_vsids();
        self.conflicts_since_restart = 0;
        self.restart_threshold = self.config.restart_threshold;
        self.luby = Luby::default();
        self.stall = StallState::default();

        // Assumptions join the trail at level zero, marked as decisions.
        let assumptions = self.assumptions.clone();
        for assumption in assumptions {
            match self.trail.value_of(assumption.variable()) {
                Some(value) if value != assumption.polarity() => {
                    self.core = vec![assumption];
                    return SolveStatus::Unsatisfiable;
                }
                Some(_) => {}
                None => self.trail.assign(assumption, 0, None, true),
            }
        }

        let mut iterations: usize = 0;

        'solve_loop: while iterations < self.config.max_iterations {
            iterations += 1;
            self.counters.iterations += 1;

            if self.check_interrupt().is_err() {
                log::info!(target: targets::SOLVE, "Interrupted after {iterations} iterations");
                return SolveStatus::Unknown;
            }

            if let Some(status) = self.stall_check() {
                return status;
            }

            if self.should_restart() {
                self.restart();
            }

            match self.propagate() {
                Err(BcpError::Interrupted) => return SolveStatus::Unknown,

                Err(BcpError::Conflict(conflict_id)) => {
                    self.counters.conflicts += 1;
                    self.conflicts_since_restart += 1;

                    let learned = match self.analyze_conflict(conflict_id) {
                        Ok(learned) => learned,
                        Err(_) => return SolveStatus::Unknown,
                    };

                    match learned.asserting {
                        None => return self.conclude_unsatisfiable(learned),

                        Some(asserting) => {
                            let mut literals = learned.literals;
                            self.minimize_learned(&mut literals);

                            let lbd = match self.config.use_lbd {
                                true => ClauseDb::compute_lbd(&literals, &self.trail),
                                false => literals.len() as u32,
                            };

                            for literal in &literals {
                                self.bump_variable_activity(literal.variable());
                            }

                            let learned_id = self.db.add_learned(literals, lbd);
                            self.db.bump_activity(learned_id);

                            self.backjump(learned.backjump_level);

                            self.trail.assign(
                                asserting,
                                learned.backjump_level,
                                Some(learned_id),
                                false,
                            );
                            self.counters.propagations += 1;

                            self.decay_variable_activities();
                            self.db.decay_activities();

                            if self.db.over_cap() || self.db.over_memory_ceiling() {
                                self.db.reduce(&self.trail);
                            }
                        }
                    }
                }

                Ok(()) => match self.make_decision() {
                    DecisionOk::Made => continue 'solve_loop,

                    DecisionOk::Exhausted => {
                        self.satisfying = Some(self.trail.assignment());
                        return SolveStatus::Satisfiable;
                    }
                },
            }
        }

        log::warn!(target: targets::SOLVE, "Iteration cap reached without an answer");
        SolveStatus::Unknown
    }

    /// Concludes an unsatisfiable solve from the final clause of a level-zero conflict.
    fn conclude_unsatisfiable(&mut self, learned: LearnedClause) -> SolveStatus {
        for literal in &learned.literals {
            self.bump_variable_activity(literal.variable());
        }
        self.decay_variable_activities();

        if !learned.literals.is_empty() {
            let lbd = match self.config.use_lbd {
                true => ClauseDb::compute_lbd(&learned.literals, &self.trail),
                false => learned.literals.len() as u32,
            };
            self.db.add_learned(learned.literals.clone(), lbd);
        }

        self.extract_core(&learned.literals);
        SolveStatus::Unsatisfiable
    }

    /// Updates stall bookkeeping, escalating through forced restarts, clearing learned clauses,
    /// partial backjumps, and finally abandoning the solve.
    fn stall_check(&mut self) -> Option<SolveStatus> {
        let level = self.trail.current_level();
        let learned = self.db.learned_count();

        let other_progress = self.counters.conflicts > self.stall.last_conflicts
            || self.counters.decisions > self.stall.last_decisions
            || self.counters.propagations > self.stall.last_propagations
            || learned > self.stall.last_learned
            || level > self.stall.last_level;
        let restart_progress = self.counters.restarts > self.stall.last_restarts;

        if other_progress || restart_progress {
            self.stall.stuck = 0;
            self.stall.no_progress = 0;
        } else {
            self.stall.stuck += 1;
            self.stall.no_progress += 1;
        }

        self.stall.consecutive_restarts = match (restart_progress, other_progress) {
            (true, _) => self.stall.consecutive_restarts + 1,
            (false, true) => 0,
            (false, false) => self.stall.consecutive_restarts,
        };

        self.stall.at_level = match level != self.stall.last_level || restart_progress {
            true => 0,
            false => self.stall.at_level + 1,
        };

        self.stall.last_conflicts = self.counters.conflicts;
        self.stall.last_decisions = self.counters.decisions;
        self.stall.last_propagations = self.counters.propagations;
        self.stall.last_learned = learned;
        self.stall.last_restarts = self.counters.restarts;
        self.stall.last_level = level;

        if self.stall.stuck > self.config.stall.restart_after {
            if self.stall.consecutive_restarts > self.config.stall.consecutive_restart_limit {
                log::warn!(
                    target: targets::SOLVE,
                    "Stalled through {} restarts, clearing learned clauses",
                    self.stall.consecutive_restarts
                );
                self.reset_search();
                self.stall.consecutive_restarts = 0;
            } else {
                log::debug!(target: targets::SOLVE, "Stalled, forcing a restart");
                self.restart();
            }
            self.stall.stuck = 0;
        }

        if self.stall.at_level > self.config.stall.level_limit {
            log::debug!(
                target: targets::SOLVE,
                "Stuck at level {level}, forcing a partial backjump"
            );
            self.backjump(level.saturating_sub(1));
            self.stall.at_level = 0;
        }

        if self.stall.no_progress > self.config.stall.abandon_after {
            log::warn!(target: targets::SOLVE, "No progress, abandoning the solve");
            return Some(SolveStatus::Unknown);
        }

        None
    }

    /// Forgets the search so far: the trail is cleared, learned clauses dropped --- temporary
    /// clauses still bind this solve --- activities reinitialized, and the assumptions
    /// re-asserted.
    fn reset_search(&mut self) {
        self.trail.clear();
        self.db.drop_learned_clauses();
        self.init_vsids();

        let assumptions = self.assumptions.clone();
        for assumption in assumptions {
            if self.trail.value_of(assumption.variable()).is_none() {
                self.trail.assign(assumption, 0, None, true);
            }
        }
    }
}
