/*!
Boolean constraint propagation, by two watched literals.

# Overview

A cursor tracks the first trail entry whose consequences have not been applied.
For each such entry with literal *ℓ*, the clauses watching *-ℓ* are examined:

- The watched pair is normalized so the falsified literal sits in slot zero.
- If the other watched literal is satisfied the clause needs nothing.
- Otherwise the clause is scanned for a non-watched literal which is not falsified; if one is
  found the watch migrates to it and the clause needs nothing further.
- With no replacement, the other watched literal is the clause's last hope: unassigned, it is
  enqueued with the clause as its antecedent; falsified, the clause is the conflict.

The list of clauses watching *-ℓ* is iterated over a copy, as watch migration mutates the
underlying list.
A clause id which resolves to nothing --- the clause was deleted --- or whose watched pair no
longer includes *-ℓ* --- the watch migrated under an earlier cursor position --- is skipped.

# The defensive scan

Once the cursor reaches the end of the trail a second pass scans the whole database for unit or
conflicting clauses the watch scheme missed.
Watches are registered against the leading literals of a clause, and a clause added between
solves may mention variables introduced after its watches were last placed; the scan picks up
whatever such a clause implies.
The scan also identifies empty clauses, which watch nothing.
Anything enqueued by the scan reopens the cursor loop.

# Polls

Every thousand steps the solve deadline and any external stop signal are consulted, and the
in-flight propagation abandoned if either has fired.
*/

use rand::{Rng, SeedableRng};

use crate::misc::log::targets;
use crate::solver::GenericSolver;
use crate::structures::literal::Literal;
use crate::types::err::BcpError;

/// How a clause responded to the falsification of a watched literal.
enum WatchResponse {
    /// The clause is satisfied or no longer watches the literal.
    Settled,

    /// A non-falsified literal was found to watch instead.
    Migrate(Literal),

    /// The clause asserts its remaining watched literal.
    Unit(Literal),

    /// Every literal of the clause is falsified.
    Conflict,
}

impl<R: Rng + SeedableRng> GenericSolver<R> {
    /// Drives propagation until the trail is stable under every clause, or a conflict is found.
    pub(crate) fn propagate(&mut self) -> Result<(), BcpError> {
        let mut steps: usize = 0;

        loop {
            while let Some(literal) = self.trail.next_unpropagated() {
                steps += 1;
                if steps % 1000 == 0 {
                    self.check_interrupt()?;
                }

                let negated = literal.negate();

                // The list is copied as migration mutates it.
                let watchers = self.db.watches_of(negated).to_vec();

                for id in watchers {
                    let response = {
                        let Some(clause) = self.db.clause_mut(id) else {
                            continue;
                        };

                        let (first, second) = clause.watched();
                        if first != negated && second != negated {
                            WatchResponse::Settled
                        } else {
                            if clause.watched().1 == negated {
                                clause.swap_watched();
                            }
                            let other = clause.watched().1;

                            if other.is_none() {
                                // A falsified unit clause.
                                WatchResponse::Conflict
                            } else if self.trail.value_of_literal(other) == Some(true) {
                                WatchResponse::Settled
                            } else {
                                let replacement = clause.literals().iter().copied().find(|l| {
                                    *l != negated
                                        && *l != other
                                        && self.trail.value_of_literal(*l) != Some(false)
                                });

                                match replacement {
                                    Some(fresh) => WatchResponse::Migrate(fresh),
                                    None => match self.trail.value_of_literal(other) {
                                        None => WatchResponse::Unit(other),
                                        _ => WatchResponse::Conflict,
                                    },
                                }
                            }
                        }
                    };

                    match response {
                        WatchResponse::Settled => {}

                        WatchResponse::Migrate(fresh) => {
                            self.db.update_watches(id, negated, fresh);
                        }

                        WatchResponse::Unit(unit) => {
                            log::trace!(
                                target: targets::PROPAGATION,
                                "{id} asserts {unit} at level {}",
                                self.trail.current_level()
                            );
                            let level = self.trail.current_level();
                            self.trail.assign(unit, level, Some(id), false);
                            self.counters.propagations += 1;
                        }

                        WatchResponse::Conflict => {
                            log::trace!(target: targets::PROPAGATION, "Conflict in {id}");
                            return Err(BcpError::Conflict(id));
                        }
                    }
                }
            }

            if !self.defensive_scan(&mut steps)? {
                return Ok(());
            }
        }
    }

    /// Scans every clause for unit or conflict conditions the watch scheme missed.
    ///
    /// Returns true only if the scan enqueued something, reopening the cursor loop.
    fn defensive_scan(&mut self, steps: &mut usize) -> Result<bool, BcpError> {
        let mut enqueued = false;

        for index in 0..self.db.slot_count() {
            *steps += 1;
            if *steps % 1000 == 0 {
                self.check_interrupt()?;
            }

            let id = self.db.id_at(index);
            let Some(clause) = self.db.clause(id) else {
                continue;
            };

            let mut satisfied = false;
            let mut unassigned = 0;
            let mut last_unassigned = Literal::NONE;

            for literal in clause.literals() {
                match self.trail.value_of_literal(*literal) {
                    Some(true) => {
                        satisfied = true;
                        break;
                    }
                    Some(false) => {}
                    None => {
                        unassigned += 1;
                        last_unassigned = *literal;
                    }
                }
            }

            if satisfied {
                continue;
            }

            match unassigned {
                0 => {
                    log::trace!(target: targets::PROPAGATION, "Scan found conflict in {id}");
                    return Err(BcpError::Conflict(id));
                }

                1 => {
                    log::trace!(
                        target: targets::PROPAGATION,
                        "Scan found {id} asserts {last_unassigned}"
                    );
                    let level = self.trail.current_level();
                    self.trail.assign(last_unassigned, level, Some(id), false);
                    self.counters.propagations += 1;
                    enqueued = true;
                }

                _ => {}
            }
        }

        Ok(enqueued)
    }
}
