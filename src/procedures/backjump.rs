/*!
Recovery from a conflict, by a jump from the current decision level to some lower level.

All assignments above the target level are undone: popped from the trail with their value and
level cleared, and their variables returned to the activity heap as decision candidates.
Entries at or below the target --- in particular every level-zero assumption and fact ---
survive, so after a backjump the trail is exactly the prefix of assignments whose level is at
most the target.
*/

use rand::{Rng, SeedableRng};

use crate::db::trail::LevelIndex;
use crate::misc::log::targets;
use crate::solver::GenericSolver;

impl<R: Rng + SeedableRng> GenericSolver<R> {
    /// Backjumps to the given target level.
    ///
    /// A target at or above the current level is safe, and does nothing.
    pub(crate) fn backjump(&mut self, target: LevelIndex) {
        log::trace!(
            target: targets::BACKJUMP,
            "Backjump from {} to {target}",
            self.trail.current_level()
        );

        for literal in self.trail.backtrack_to(target) {
            self.activity_heap.activate(literal.variable() as usize);
        }
    }
}
