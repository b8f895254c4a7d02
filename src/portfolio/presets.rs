/*!
The diversification catalog.

Each preset fixes the knobs which matter for diversification --- activity decay, restart
schedule, polarity randomization, clause scoring, and the learned-clause cap --- together with
a distinct seed, so workers over the same formula explore different parts of the search space.
Presets are ordered from aggressive to conservative; when fewer workers run than presets exist,
the prefix is used.
*/

use crate::config::{Config, RestartStrategy};

/// The configuration a portfolio worker runs under.
#[derive(Clone, Debug)]
pub struct WorkerPreset {
    /// Decay factor for variable activities.
    pub var_decay: f64,

    /// Restart schedule.
    pub restart_strategy: RestartStrategy,

    /// Base restart threshold, in conflicts.
    pub restart_threshold: u32,

    /// Probability a saved phase is overridden with a random polarity.
    pub random_polarity_freq: f64,

    /// Score learned clauses by literal block distance.
    pub use_lbd: bool,

    /// Reuse last values on decisions.
    pub phase_saving: bool,

    /// Cap on the learned clause population.
    pub max_learnts: usize,

    /// Seed for the worker's source of randomness.
    pub seed: u64,
}

impl WorkerPreset {
    /// Writes the preset over a base configuration.
    pub fn apply(&self, config: &mut Config) {
        config.var_decay = self.var_decay;
        config.restart_strategy = self.restart_strategy;
        config.restart_threshold = self.restart_threshold;
        config.random_polarity_freq = self.random_polarity_freq;
        config.use_lbd = self.use_lbd;
        config.phase_saving = self.phase_saving;
        config.clause_db.max_learnts = Some(self.max_learnts);
        config.seed = self.seed;
    }
}

/// The fixed catalog of presets.
pub fn catalog() -> Vec<WorkerPreset> {
    vec![
        // Aggressive: fast decay, tight luby restarts, heavy randomization and learning.
        WorkerPreset {
            var_decay: 0.98,
            restart_strategy: RestartStrategy::Luby,
            restart_threshold: 30,
            random_polarity_freq: 0.15,
            use_lbd: true,
            phase_saving: true,
            max_learnts: 20_000,
            seed: 0x5eed_0001,
        },
        // Very aggressive, without phase saving, for hard instances.
        WorkerPreset {
            var_decay: 0.98,
            restart_strategy: RestartStrategy::Luby,
            restart_threshold: 25,
            random_polarity_freq: 0.10,
            use_lbd: true,
            phase_saving: false,
            max_learnts: 25_000,
            seed: 0x5eed_0002,
        },
        // Balanced: geometric restarts, light randomization.
        WorkerPreset {
            var_decay: 0.97,
            restart_strategy: RestartStrategy::Geometric,
            restart_threshold: 50,
            random_polarity_freq: 0.08,
            use_lbd: false,
            phase_saving: true,
            max_learnts: 15_000,
            seed: 0x5eed_0003,
        },
        // Conservative backup.
        WorkerPreset {
            var_decay: 0.95,
            restart_strategy: RestartStrategy::Geometric,
            restart_threshold: 100,
            random_polarity_freq: 0.05,
            use_lbd: false,
            phase_saving: true,
            max_learnts: 8_000,
            seed: 0x5eed_0004,
        },
    ]
}
