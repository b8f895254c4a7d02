/*!
The trail: an ordered record of the current assignments, with provenance.

Each entry pairs a literal with the decision level it was assigned at, the clause which forced
it (its *antecedent*) if it was propagated, and a mark for decisions.
Assumptions are placed at level zero with the decision mark set, which distinguishes them from
toplevel facts --- a level-zero entry without the mark is a propagated fact, and must not appear
in an unsatisfiable core.

The trail is appended in propagation/decision order and popped from the tail on backtrack, so
decision levels are non-decreasing along the trail.
Dense maps from variables to value, level, and trail position are kept alongside, with an entry
precisely for the variables on the trail.
The saved phase of a variable outlives its time on the trail.
*/

use crate::db::ClauseId;
use crate::structures::literal::{Literal, Variable};
use crate::structures::valuation::Assignment;

/// A decision level. Level zero holds assumptions and toplevel facts.
pub type LevelIndex = u32;

/// A record of a single assignment.
#[derive(Clone, Copy, Debug)]
pub struct TrailEntry {
    /// The literal assigned.
    pub literal: Literal,

    /// The decision level of the assignment.
    pub level: LevelIndex,

    /// The clause which forced the assignment, if propagated.
    pub antecedent: Option<ClauseId>,

    /// True for decisions and assumptions.
    pub is_decision: bool,
}

/// The trail and its companion maps.
#[derive(Default)]
pub struct Trail {
    /// Assignments, in the order they were made.
    entries: Vec<TrailEntry>,

    /// Variable to position in `entries`, while assigned.
    position: Vec<Option<u32>>,

    /// Variable to value, while assigned.
    values: Vec<Option<bool>>,

    /// Variable to decision level, while assigned. Zero otherwise.
    levels: Vec<LevelIndex>,

    /// The last value each variable held, surviving backtracks.
    phase: Vec<Option<bool>>,

    /// The current decision level.
    level: LevelIndex,

    /// Position of the first unpropagated entry.
    propagated: usize,
}

impl Trail {
    /// Grows the companion maps to cover `variable_count` variables.
    pub fn ensure_capacity(&mut self, variable_count: usize) {
        let required = variable_count + 1;
        if self.values.len() < required {
            self.position.resize(required, None);
            self.values.resize(required, None);
            self.levels.resize(required, 0);
            self.phase.resize(required, None);
        }
    }

    /// Clears all assignments and resets the decision level. Saved phases survive.
    pub fn clear(&mut self) {
        for entry in &self.entries {
            let variable = entry.literal.variable() as usize;
            self.position[variable] = None;
            self.values[variable] = None;
            self.levels[variable] = 0;
        }
        self.entries.clear();
        self.level = 0;
        self.propagated = 0;
    }

    /// The current decision level.
    pub fn current_level(&self) -> LevelIndex {
        self.level
    }

    /// Opens a fresh decision level and returns it.
    pub fn increment_level(&mut self) -> LevelIndex {
        self.level += 1;
        self.level
    }

    /// The value of `variable`, if on the trail.
    pub fn value_of(&self, variable: Variable) -> Option<bool> {
        self.values[variable as usize]
    }

    /// The value of `literal` on the trail: true if satisfied, false if falsified, none if the
    /// variable is unassigned.
    pub fn value_of_literal(&self, literal: Literal) -> Option<bool> {
        self.values[literal.variable() as usize].map(|value| value == literal.polarity())
    }

    /// The decision level of `variable`. Meaningful only while the variable is on the trail.
    pub fn level_of(&self, variable: Variable) -> LevelIndex {
        self.levels[variable as usize]
    }

    /// The trail position of `variable`, if on the trail.
    pub fn position_of(&self, variable: Variable) -> Option<usize> {
        self.position[variable as usize].map(|position| position as usize)
    }

    /// The entry which assigned `variable`, if on the trail.
    pub fn entry_for(&self, variable: Variable) -> Option<&TrailEntry> {
        self.position_of(variable).map(|position| &self.entries[position])
    }

    /// The entry at `position`.
    pub fn entry(&self, position: usize) -> &TrailEntry {
        &self.entries[position]
    }

    /// All entries, in assignment order.
    pub fn entries(&self) -> &[TrailEntry] {
        &self.entries
    }

    /// A count of entries on the trail.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True only if no assignment has been made.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The saved phase of `variable`, if the variable has ever held a value.
    pub fn saved_phase(&self, variable: Variable) -> Option<bool> {
        self.phase[variable as usize]
    }

    /// Appends an assignment to the trail.
    ///
    /// The variable must not already be on the trail.
    pub fn assign(
        &mut self,
        literal: Literal,
        level: LevelIndex,
        antecedent: Option<ClauseId>,
        is_decision: bool,
    ) {
        let variable = literal.variable() as usize;
        debug_assert!(self.values[variable].is_none());

        self.position[variable] = Some(self.entries.len() as u32);
        self.values[variable] = Some(literal.polarity());
        self.levels[variable] = level;
        self.phase[variable] = Some(literal.polarity());

        self.entries.push(TrailEntry {
            literal,
            level,
            antecedent,
            is_decision,
        });
    }

    /// The literal of the next unpropagated entry, advancing the propagation cursor.
    pub fn next_unpropagated(&mut self) -> Option<Literal> {
        match self.entries.get(self.propagated) {
            Some(entry) => {
                self.propagated += 1;
                Some(entry.literal)
            }
            None => None,
        }
    }

    /// Pops entries above `target` level, clearing their assignments.
    ///
    /// Returns the popped literals, most recent first, so a caller may reactivate the freed
    /// variables on an activity heap.
    pub fn backtrack_to(&mut self, target: LevelIndex) -> Vec<Literal> {
        let mut popped = Vec::new();

        while let Some(entry) = self.entries.last() {
            if entry.level <= target {
                break;
            }
            let literal = entry.literal;
            let variable = literal.variable() as usize;

            self.position[variable] = None;
            self.values[variable] = None;
            self.levels[variable] = 0;

            popped.push(literal);
            self.entries.pop();
        }

        self.level = target;
        self.propagated = self.propagated.min(self.entries.len());
        popped
    }

    /// Overwrites the saved phase of `variable`.
    pub fn set_phase(&mut self, variable: Variable, value: bool) {
        self.phase[variable as usize] = Some(value);
    }

    /// A snapshot of the current valuation.
    pub fn assignment(&self) -> Assignment {
        Assignment::from_values(self.values.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(value: i32) -> Literal {
        Literal::from(value)
    }

    #[test]
    fn values_follow_assignments() {
        let mut trail = Trail::default();
        trail.ensure_capacity(3);

        trail.assign(literal(1), 0, None, false);
        trail.assign(literal(-2), 0, None, false);

        assert_eq!(trail.value_of(1), Some(true));
        assert_eq!(trail.value_of(2), Some(false));
        assert_eq!(trail.value_of(3), None);

        assert_eq!(trail.value_of_literal(literal(-2)), Some(true));
        assert_eq!(trail.value_of_literal(literal(2)), Some(false));
        assert_eq!(trail.value_of_literal(literal(3)), None);
    }

    #[test]
    fn backtrack_leaves_exactly_the_level_prefix() {
        let mut trail = Trail::default();
        trail.ensure_capacity(5);

        trail.assign(literal(1), 0, None, true);
        trail.increment_level();
        trail.assign(literal(2), 1, None, true);
        trail.assign(literal(3), 1, None, false);
        trail.increment_level();
        trail.assign(literal(-4), 2, None, true);
        trail.assign(literal(5), 2, None, false);

        let popped = trail.backtrack_to(1);

        assert_eq!(popped.len(), 2);
        assert_eq!(trail.len(), 3);
        assert_eq!(trail.current_level(), 1);
        assert!(trail.entries().iter().all(|entry| entry.level <= 1));

        assert_eq!(trail.value_of(4), None);
        assert_eq!(trail.value_of(5), None);
        assert_eq!(trail.value_of(3), Some(true));
    }

    #[test]
    fn phases_survive_backtrack() {
        let mut trail = Trail::default();
        trail.ensure_capacity(2);

        trail.increment_level();
        trail.assign(literal(-1), 1, None, true);
        trail.backtrack_to(0);

        assert_eq!(trail.value_of(1), None);
        assert_eq!(trail.saved_phase(1), Some(false));
    }

    #[test]
    fn propagation_cursor_rewinds_with_the_trail() {
        let mut trail = Trail::default();
        trail.ensure_capacity(3);

        trail.assign(literal(1), 0, None, false);
        assert_eq!(trail.next_unpropagated(), Some(literal(1)));
        assert_eq!(trail.next_unpropagated(), None);

        trail.increment_level();
        trail.assign(literal(2), 1, None, true);
        trail.backtrack_to(0);

        assert_eq!(trail.next_unpropagated(), None);

        trail.increment_level();
        trail.assign(literal(3), 1, None, true);
        assert_eq!(trail.next_unpropagated(), Some(literal(3)));
    }

    #[test]
    fn assumptions_are_level_zero_decisions() {
        let mut trail = Trail::default();
        trail.ensure_capacity(2);

        trail.assign(literal(1), 0, None, true);
        trail.assign(literal(2), 0, None, false);

        let assumption = trail.entry_for(1).unwrap();
        assert!(assumption.is_decision && assumption.level == 0);

        let fact = trail.entry_for(2).unwrap();
        assert!(!fact.is_decision && fact.level == 0);
    }
}
