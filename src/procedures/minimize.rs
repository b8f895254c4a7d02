/*!
Minimization of learned clauses, by recursive self-subsumption.

A literal of a learned clause is redundant if its antecedent shows it follows from the rest of
the clause: every other literal of the antecedent is either the negation of a literal already
in the clause, or recursively redundant by the same rule.
Removing a redundant literal strengthens the clause without weakening what it propagates.

Some literals are never candidates:
- The asserting literal, which the clause exists to propagate.
- Literals assigned at level zero.
- Literals whose negation is a current assumption, which core extraction must be able to read
  out of the final clause.
- Decisions, and entries whose antecedent has been deleted.

Minimization is best effort.
Recursion is capped at a fixed depth, clauses beyond a hundred literals are left alone, and the
pass honours a local budget of around a hundred milliseconds --- checked every fifty literals,
along with the solve deadline --- bailing out with the clause unchanged when exceeded.
*/

use std::collections::HashSet;
use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};

use crate::misc::log::targets;
use crate::solver::GenericSolver;
use crate::structures::literal::Literal;

/// Clauses beyond this many literals are not minimized.
const MINIMIZE_SIZE_LIMIT: usize = 100;

/// The cap on recursion through antecedents.
const RECURSION_LIMIT: usize = 100;

/// The local wall-clock budget for one minimization pass.
const MINIMIZE_BUDGET: Duration = Duration::from_millis(100);

impl<R: Rng + SeedableRng> GenericSolver<R> {
    /// Strengthens a learned clause in place, leaving the asserting literal first.
    ///
    /// Called between analysis and storage, while every literal of the clause is still on the
    /// trail.
    pub(crate) fn minimize_learned(&self, clause: &mut Vec<Literal>) {
        if clause.len() <= 1 || clause.len() > MINIMIZE_SIZE_LIMIT {
            return;
        }

        let start = Instant::now();
        let mut polls: usize = 0;

        let seen: HashSet<Literal> = clause.iter().copied().collect();
        let mut kept = Vec::with_capacity(clause.len());
        kept.push(clause[0]);

        for literal in &clause[1..] {
            if self.minimize_expired(&start, &mut polls) {
                return;
            }

            let keep = self.trail.level_of(literal.variable()) == 0
                || self.assumptions.contains(literal)
                || !self.literal_redundant(*literal, &seen, 0, &start, &mut polls);

            if keep {
                kept.push(*literal);
            }
        }

        if kept.len() < clause.len() {
            log::trace!(
                target: targets::MINIMIZATION,
                "Minimized from {} to {} literals",
                clause.len(),
                kept.len()
            );
            *clause = kept;
        }
    }

    /// True only if `literal` follows from the rest of the clause through its antecedent.
    fn literal_redundant(
        &self,
        literal: Literal,
        seen: &HashSet<Literal>,
        depth: usize,
        start: &Instant,
        polls: &mut usize,
    ) -> bool {
        if depth > RECURSION_LIMIT || self.minimize_expired(start, polls) {
            return false;
        }

        let variable = literal.variable();
        let Some(entry) = self.trail.entry_for(variable) else {
            return false;
        };
        if entry.is_decision {
            return false;
        }
        let Some(antecedent_id) = entry.antecedent else {
            return false;
        };
        if self.assumptions.contains(&literal) {
            return false;
        }
        let Some(antecedent) = self.db.clause(antecedent_id) else {
            return false;
        };

        for reason_literal in antecedent.literals() {
            if reason_literal.variable() == variable {
                continue;
            }
            if seen.contains(&reason_literal.negate()) {
                continue;
            }

            let reason_variable = reason_literal.variable();
            let Some(reason_entry) = self.trail.entry_for(reason_variable) else {
                return false;
            };
            if reason_entry.level > entry.level || reason_entry.level == 0 {
                return false;
            }
            if !self.literal_redundant(*reason_literal, seen, depth + 1, start, polls) {
                return false;
            }
        }

        true
    }

    /// True only if the local budget or the solve deadline has expired. Checked every fifty
    /// calls.
    fn minimize_expired(&self, start: &Instant, polls: &mut usize) -> bool {
        *polls += 1;
        if *polls % 50 != 0 {
            return false;
        }
        start.elapsed() > MINIMIZE_BUDGET || self.check_interrupt().is_err()
    }
}
