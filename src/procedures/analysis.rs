/*!
Analysis of a clause unsatisfiable on the current valuation.

# Overview

Analysis resolves the conflicting clause against the antecedents of trail entries, most recent
first, until exactly one literal at the conflict level remains --- the first unique implication
point.
The learned clause is that literal (negated, and placed first) together with every accumulated
literal from lower levels, and asserts its leading literal as soon as the trail is unwound to
the backjump level: the highest level below the conflict level among the learned literals.

Literals at level zero are kept in the learned clause rather than dropped as proven: with
assumptions in play a level-zero literal may be the negation of an assumption, and
[core extraction](crate::solver::GenericSolver::unsat_core) reads assumptions out of the final
learned clause.

The conflict level is computed from the conflicting clause itself rather than taken from the
trail, as the defensive propagation scan may surface a clause which became unsatisfiable at an
earlier level.

# Conflicts at level zero

A conflict at level zero admits no implication point, and establishes the formula is
unsatisfiable under the current assumptions.
Resolution instead runs back through every level-zero antecedent, stopping only at assumptions
and unresolvable entries; the resulting clause is the final clause from which the
unsatisfiable core is extracted, and is empty whenever no assumption took part in the conflict.

# Polls

Every fifty resolution steps the solve deadline and any external stop signal are consulted.
*/

use rand::{Rng, SeedableRng};

use crate::db::trail::LevelIndex;
use crate::db::ClauseId;
use crate::misc::log::targets;
use crate::solver::GenericSolver;
use crate::structures::literal::Literal;
use crate::types::err::AnalysisError;

/// The result of conflict analysis.
pub struct LearnedClause {
    /// The literals of the learned clause, asserting literal first when one exists.
    pub literals: Vec<Literal>,

    /// The asserting literal, absent for a conflict at level zero.
    pub asserting: Option<Literal>,

    /// The level to backjump to, at which the clause asserts its literal.
    pub backjump_level: LevelIndex,
}

impl<R: Rng + SeedableRng> GenericSolver<R> {
    /// Resolves the clause at `conflict_id` to a learned clause, by first-UIP.
    pub(crate) fn analyze_conflict(
        &mut self,
        conflict_id: ClauseId,
    ) -> Result<LearnedClause, AnalysisError> {
        let conflict_literals: Vec<Literal> = match self.db.clause(conflict_id) {
            Some(clause) => clause.literals().to_vec(),
            None => panic!("! Conflict clause missing from the database"),
        };

        let conflict_level = conflict_literals
            .iter()
            .map(|literal| self.trail.level_of(literal.variable()))
            .max()
            .unwrap_or(0);

        log::info!(
            target: targets::ANALYSIS,
            "Analysis of {conflict_id} at level {conflict_level}"
        );

        if conflict_level == 0 {
            return self.analyze_root_conflict(&conflict_literals);
        }

        self.db.bump_activity(conflict_id);

        let mut seen = vec![false; self.db.variable_count() + 1];
        let mut counter: usize = 0;
        let mut tail: Vec<Literal> = Vec::new();
        let mut backjump: LevelIndex = 0;

        for literal in &conflict_literals {
            self.mark_literal(*literal, conflict_level, &mut seen, &mut counter, &mut tail, &mut backjump);
        }

        let mut index = self.trail.len();
        let mut steps: usize = 0;
        let asserting_entry;

        loop {
            steps += 1;
            if steps % 50 == 0 {
                self.check_interrupt()?;
            }

            // The most recent trail entry still in the working clause at the conflict level.
            loop {
                debug_assert!(index > 0);
                index -= 1;
                let entry = self.trail.entry(index);
                if seen[entry.literal.variable() as usize] && entry.level == conflict_level {
                    break;
                }
            }

            let entry = *self.trail.entry(index);

            if counter == 1 {
                asserting_entry = entry.literal;
                break;
            }

            // Resolve the working clause on the entry's variable.
            let pivot = entry.literal.variable();
            seen[pivot as usize] = false;
            counter -= 1;

            let Some(antecedent_id) = entry.antecedent else {
                panic!("! Resolution reached a decision without an implication point")
            };
            self.db.bump_activity(antecedent_id);

            let antecedent_literals: Vec<Literal> = match self.db.clause(antecedent_id) {
                Some(clause) => clause.literals().to_vec(),
                None => panic!("! Antecedent clause missing from the database"),
            };

            for literal in antecedent_literals {
                if literal.variable() != pivot {
                    self.mark_literal(literal, conflict_level, &mut seen, &mut counter, &mut tail, &mut backjump);
                }
            }
        }

        let asserting = asserting_entry.negate();
        tail.sort();

        let mut literals = Vec::with_capacity(1 + tail.len());
        literals.push(asserting);
        literals.extend(tail);

        log::info!(
            target: targets::ANALYSIS,
            "Learned {:?}, asserting {asserting} after a jump to {backjump}",
            literals
        );

        Ok(LearnedClause {
            literals,
            asserting: Some(asserting),
            backjump_level: backjump,
        })
    }

    /// Merges `literal` into the working clause.
    ///
    /// A literal at the conflict level extends the resolution count; any other literal joins
    /// the learned tail and may raise the backjump level.
    fn mark_literal(
        &self,
        literal: Literal,
        conflict_level: LevelIndex,
        seen: &mut [bool],
        counter: &mut usize,
        tail: &mut Vec<Literal>,
        backjump: &mut LevelIndex,
    ) {
        let variable = literal.variable();
        if seen[variable as usize] {
            return;
        }
        seen[variable as usize] = true;

        let level = self.trail.level_of(variable);
        if level == conflict_level {
            *counter += 1;
        } else {
            tail.push(literal);
            if level > *backjump {
                *backjump = level;
            }
        }
    }

    /// Resolves a level-zero conflict back to assumptions and unresolvable entries.
    fn analyze_root_conflict(
        &mut self,
        conflict_literals: &[Literal],
    ) -> Result<LearnedClause, AnalysisError> {
        let mut seen = vec![false; self.db.variable_count() + 1];
        for literal in conflict_literals {
            seen[literal.variable() as usize] = true;
        }

        let mut kept: Vec<Literal> = Vec::new();
        let mut steps: usize = 0;

        for index in (0..self.trail.len()).rev() {
            steps += 1;
            if steps % 50 == 0 {
                self.check_interrupt()?;
            }

            let entry = *self.trail.entry(index);
            let variable = entry.literal.variable();
            if !seen[variable as usize] {
                continue;
            }

            match entry.antecedent {
                Some(antecedent_id) if !entry.is_decision => {
                    seen[variable as usize] = false;
                    self.db.bump_activity(antecedent_id);

                    match self.db.clause(antecedent_id) {
                        Some(clause) => {
                            let literals: Vec<Literal> = clause.literals().to_vec();
                            for literal in literals {
                                if literal.variable() != variable {
                                    seen[literal.variable() as usize] = true;
                                }
                            }
                        }
                        // The antecedent was vacated; the entry cannot be resolved through.
                        None => kept.push(entry.literal.negate()),
                    }
                }

                _ => kept.push(entry.literal.negate()),
            }
        }

        kept.sort();
        kept.dedup();

        log::info!(
            target: targets::ANALYSIS,
            "Fundamental conflict, final clause {:?}",
            kept
        );

        Ok(LearnedClause {
            literals: kept,
            asserting: None,
            backjump_level: 0,
        })
    }
}
