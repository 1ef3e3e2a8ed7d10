//! Simulation configuration loaded from the environment.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use battle_runtime::Personality;

/// Settings of one headless battle.
#[derive(Clone, Debug)]
pub struct SimConfig {
    pub seed: u64,
    /// Ships per fleet.
    pub fleet_size: usize,
    pub max_cycles: u32,
    /// Log directory; platform cache directory when unset.
    pub log_dir: Option<PathBuf>,
    /// Parent directory of replays; platform data directory when unset.
    pub replay_dir: Option<PathBuf>,
    pub planner_timeout: Duration,
    /// Personalities of the blue and red fleets.
    pub personalities: [Personality; 2],
    /// Variables that were set but could not be parsed.
    pub warnings: Vec<String>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            fleet_size: 3,
            max_cycles: 100,
            log_dir: None,
            replay_dir: None,
            planner_timeout: Duration::from_secs(2),
            personalities: [Personality::Balanced; 2],
            warnings: Vec::new(),
        }
    }
}

impl SimConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_SEED` - Seed of the battle generator (default: 1)
    /// - `BATTLE_FLEET_SIZE` - Ships per fleet (default: 3)
    /// - `BATTLE_MAX_CYCLES` - Cycle cap before the run stops (default: 100)
    /// - `BATTLE_LOG_DIR` - Directory of the log file (default: platform-specific)
    /// - `BATTLE_REPLAY_DIR` - Directory receiving replays (default: platform-specific)
    /// - `BATTLE_PLANNER_TIMEOUT_MS` - Planning budget per maneuver (default: 2000)
    /// - `BATTLE_BLUE_PERSONALITY`, `BATTLE_RED_PERSONALITY` - `balanced`, `aggressive`
    ///   or `heroic` (default: balanced)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(seed) = config.read_env::<u64>("BATTLE_SEED") {
            config.seed = seed;
        }
        if let Some(size) = config.read_env::<usize>("BATTLE_FLEET_SIZE") {
            config.fleet_size = size.max(1);
        }
        if let Some(cycles) = config.read_env::<u32>("BATTLE_MAX_CYCLES") {
            config.max_cycles = cycles;
        }
        if let Some(millis) = config.read_env::<u64>("BATTLE_PLANNER_TIMEOUT_MS") {
            config.planner_timeout = Duration::from_millis(millis);
        }
        for (slot, key) in ["BATTLE_BLUE_PERSONALITY", "BATTLE_RED_PERSONALITY"]
            .into_iter()
            .enumerate()
        {
            if let Some(personality) = config.read_env::<Personality>(key) {
                config.personalities[slot] = personality;
            }
        }
        config.log_dir = env::var_os("BATTLE_LOG_DIR").map(PathBuf::from);
        config.replay_dir = env::var_os("BATTLE_REPLAY_DIR").map(PathBuf::from);

        config
    }

    /// Parses `key`; a value that does not parse is reported and ignored.
    fn read_env<T: std::str::FromStr>(&mut self, key: &str) -> Option<T> {
        let raw = env::var(key).ok()?;
        match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                self.warnings
                    .push(format!("ignoring {key}={raw:?}: not a valid value"));
                None
            }
        }
    }
}
