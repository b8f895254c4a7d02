/*!
Restarts: a backjump to level zero to escape an unproductive region of the search.

Level-zero assumptions and facts survive, learned clauses are retained, and only the decision
levels above zero are undone.

Two schedules are supported:
- **Luby**: the *i*th restart fires after `base * luby(i)` conflicts, following the
  [luby sequence](crate::generic::luby).
- **Geometric**: the threshold is multiplied by a constant after each restart.

Restarts forced by stall detection take the same path, on top of whichever schedule is active.
*/

use rand::{Rng, SeedableRng};

use crate::config::RestartStrategy;
use crate::misc::log::targets;
use crate::solver::GenericSolver;

impl<R: Rng + SeedableRng> GenericSolver<R> {
    /// True only if the active schedule calls for a restart.
    pub(crate) fn should_restart(&self) -> bool {
        match self.config.restart_strategy {
            RestartStrategy::Luby => {
                self.conflicts_since_restart
                    >= self.restart_threshold.saturating_mul(self.luby.current())
            }
            RestartStrategy::Geometric => self.conflicts_since_restart >= self.restart_threshold,
        }
    }

    /// Backjumps to level zero and advances the restart schedule.
    pub(crate) fn restart(&mut self) {
        log::debug!(
            target: targets::RESTART,
            "Restart after {} conflicts",
            self.conflicts_since_restart
        );

        self.backjump(0);

        match self.config.restart_strategy {
            RestartStrategy::Luby => {
                self.luby.next();
            }
            RestartStrategy::Geometric => {
                self.restart_threshold =
                    (self.restart_threshold as f64 * self.config.restart_multiplier) as u32;
            }
        }

        self.conflicts_since_restart = 0;
        self.counters.restarts += 1;
    }
}
