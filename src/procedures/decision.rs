/*!
Decisions: choosing an unvalued variable, and a value for it.

# Choosing the variable

The variable of maximum activity is taken from the activity heap, with ties broken towards the
lowest variable id so a fixed seed gives a fixed search.
A fraction of decisions instead pick a uniformly random unvalued variable; the fraction adapts
to the clause-to-variable ratio of the database, rising steeply inside the band around the
random 3-SAT phase transition (ratio in [4.0, 4.5]) where activity scores carry the least
signal, and again whenever the solve has stalled.

# Choosing the value

With phase saving enabled, the last value the variable held is reused, subject to a per-solver
random-polarity override which diversifies portfolio workers.
Otherwise the value follows the sign with more occurrences in the database, blended with the
same ratio-adaptive randomization as variable selection.
*/

use rand::{Rng, SeedableRng};

use crate::misc::log::targets;
use crate::solver::GenericSolver;
use crate::structures::literal::{Literal, Variable};

/// Possible results of asking for a decision.
pub enum DecisionOk {
    /// A decision was made and pushed to the trail.
    Made,

    /// Every variable has a value: the formula is satisfied.
    Exhausted,
}

impl<R: Rng + SeedableRng> GenericSolver<R> {
    /// Opens a fresh decision level with a chosen literal, unless every variable has a value.
    pub(crate) fn make_decision(&mut self) -> DecisionOk {
        let Some(variable) = self.select_variable() else {
            return DecisionOk::Exhausted;
        };

        let polarity = self.select_polarity(variable);
        let literal = Literal::new(variable, polarity);
        let level = self.trail.increment_level();

        self.counters.decisions += 1;
        if level > self.counters.max_decision_level {
            self.counters.max_decision_level = level;
        }

        log::trace!(target: targets::DECISION, "Decided {literal} at level {level}");
        self.trail.assign(literal, level, None, true);

        DecisionOk::Made
    }

    /// An unvalued variable: by maximum activity, or at random with ratio-adaptive probability.
    fn select_variable(&mut self) -> Option<Variable> {
        let ratio = self.clause_variable_ratio();
        let stalled = self.stall.stuck > 0;

        let random_probability = if (4.0..=4.5).contains(&ratio) {
            let distance = (ratio - 4.25).abs();
            0.15 + 0.35 * (1.0 - distance / 0.25) + if stalled { 0.2 } else { 0.0 }
        } else if ratio > 4.5 {
            0.25 + 0.25 * (ratio - 4.5) / 0.5 + if stalled { 0.15 } else { 0.0 }
        } else if stalled {
            0.1
        } else {
            0.02
        };

        if self.rng.random::<f64>() < random_probability {
            let unvalued: Vec<Variable> = (1..=self.db.variable_count() as Variable)
                .filter(|variable| self.trail.value_of(*variable).is_none())
                .collect();
            if !unvalued.is_empty() {
                let choice = unvalued[self.rng.random_range(0..unvalued.len())];
                log::trace!(target: targets::DECISION, "Random choice of {choice}");
                return Some(choice);
            }
        }

        // Variables popped while valued return to the heap on backjump.
        while let Some(index) = self.activity_heap.pop_max() {
            let variable = index as Variable;
            if self.trail.value_of(variable).is_none() {
                return Some(variable);
            }
        }

        (1..=self.db.variable_count() as Variable)
            .find(|variable| self.trail.value_of(*variable).is_none())
    }

    /// A value for `variable`: saved phase, or occurrence counts under ratio-adaptive
    /// randomization.
    fn select_polarity(&mut self, variable: Variable) -> bool {
        if self.config.phase_saving {
            if self.rng.random::<f64>() < self.config.random_polarity_freq {
                return self.rng.random::<bool>();
            }
            if let Some(phase) = self.trail.saved_phase(variable) {
                return phase;
            }
        }

        let (positive, negative) = self.db.occurrence_of(variable);
        let ratio = self.clause_variable_ratio();
        let stalled = self.stall.stuck > 0;

        let random_probability = if (4.0..=4.5).contains(&ratio) {
            let distance = (ratio - 4.25).abs();
            0.2 + 0.3 * (1.0 - distance / 0.25) + if stalled { 0.2 } else { 0.0 }
        } else if ratio > 4.5 {
            0.4 + if stalled { 0.15 } else { 0.0 }
        } else if stalled {
            0.1
        } else {
            0.0
        };

        if random_probability > 0.0 && self.rng.random::<f64>() < random_probability {
            self.rng.random::<bool>()
        } else {
            positive >= negative
        }
    }

    /// The clause-to-variable ratio of the database.
    fn clause_variable_ratio(&self) -> f64 {
        self.db.clause_count() as f64 / self.db.variable_count().max(1) as f64
    }
}
