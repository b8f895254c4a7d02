/*!
Configuration of a solver.

The primary structure is [Config], with database-specific options split into [ClauseDbConfig]
and stall-detection thresholds into [StallConfig].
Portfolio presets clone a base configuration and adjust the fields which diversify a worker ---
see [presets](crate::portfolio::presets).

Defaults are tuned for quick, deterministic results on modest formulas; a driver solving large
instances will likely want to raise the time limit and the learned-clause cap.
*/

use std::time::Duration;

/// Activities, of variables and clauses.
pub type Activity = f64;

/// Restart scheduling strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestartStrategy {
    /// Restart after `base * luby(i)` conflicts, where `i` counts restarts.
    Luby,

    /// Restart after a threshold of conflicts, multiplying the threshold after each restart.
    Geometric,
}

/// The primary configuration structure.
#[derive(Clone, Debug)]
pub struct Config {
    /// Clause database configuration.
    pub clause_db: ClauseDbConfig,

    /// Stall detection thresholds.
    pub stall: StallConfig,

    /// The decay factor for variable activities, in (0, 1).
    pub var_decay: f64,

    /// Which restart schedule to follow.
    pub restart_strategy: RestartStrategy,

    /// The base restart threshold, in conflicts.
    pub restart_threshold: u32,

    /// The multiplier applied to the threshold after each geometric restart.
    pub restart_multiplier: f64,

    /// Reuse the last value assigned to a variable when deciding on the variable.
    pub phase_saving: bool,

    /// The probability a saved phase is overridden with a random polarity.
    pub random_polarity_freq: f64,

    /// Score learned clauses by literal block distance rather than length.
    pub use_lbd: bool,

    /// The wall-clock limit for a single solve. Zero disables the limit.
    pub time_limit: Duration,

    /// A cap on iterations of the solve loop, against degenerate instances.
    pub max_iterations: usize,

    /// The seed for the solver's source of randomness.
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            clause_db: ClauseDbConfig::default(),
            stall: StallConfig::default(),

            var_decay: 0.95,

            restart_strategy: RestartStrategy::Luby,
            restart_threshold: 100,
            restart_multiplier: 1.5,

            phase_saving: true,
            random_polarity_freq: 0.02,

            use_lbd: true,

            time_limit: Duration::from_secs(30),
            max_iterations: 1_000_000,

            seed: 0,
        }
    }
}

/// Configuration for the clause database.
#[derive(Clone, Debug)]
pub struct ClauseDbConfig {
    /// Permit deletion of learned clauses.
    pub deletion_allowed: bool,

    /// A cap on the learned clause population.
    ///
    /// If unset, the cap defaults to four times the variable count of the formula.
    pub max_learnts: Option<usize>,

    /// Learned clauses with lbd at or below the bound are kept during reduction.
    pub lbd_keep_bound: u32,

    /// The decay factor for clause activities.
    pub clause_decay: f64,

    /// The advisory memory ceiling, in mebibytes. Crossing it triggers an opportunistic
    /// reduction, never a failure.
    pub memory_limit_mb: usize,
}

impl Default for ClauseDbConfig {
    fn default() -> Self {
        ClauseDbConfig {
            deletion_allowed: true,
            max_learnts: None,
            lbd_keep_bound: 2,
            clause_decay: 0.999,
            memory_limit_mb: 1024,
        }
    }
}

/// Thresholds for stall detection during a solve.
///
/// An iteration of the solve loop records progress if any of the conflict, decision,
/// propagation, learned-clause, decision-level, or restart counts changed.
#[derive(Clone, Debug)]
pub struct StallConfig {
    /// Stalled iterations before a restart is forced.
    pub restart_after: usize,

    /// Consecutive forced restarts before learned clauses are cleared and activities reset.
    pub consecutive_restart_limit: usize,

    /// Iterations at the same decision level before a partial backjump is forced.
    pub level_limit: usize,

    /// Stalled iterations before the solve is abandoned as unresolved.
    pub abandon_after: usize,
}

impl Default for StallConfig {
    fn default() -> Self {
        StallConfig {
            restart_after: 50,
            consecutive_restart_limit: 10,
            level_limit: 400,
            abandon_after: 2000,
        }
    }
}
