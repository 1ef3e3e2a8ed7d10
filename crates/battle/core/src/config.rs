/// Battle arena configuration and tunable engine limits.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleConfig {
    /// Arena width, in arena units.
    pub width: f64,
    /// Arena height, in arena units.
    pub height: f64,
    /// Distance from the arena edges a ship may never enter.
    pub border: f64,
    /// Minimal distance between two ship centers.
    pub ship_separation: f64,
    /// Maximal passes of the post-action checks before giving up.
    pub max_check_loops: u32,
}

impl BattleConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_WIDTH: f64 = 1808.0;
    pub const DEFAULT_HEIGHT: f64 = 948.0;
    pub const DEFAULT_BORDER: f64 = 50.0;
    pub const DEFAULT_SHIP_SEPARATION: f64 = 100.0;
    pub const DEFAULT_MAX_CHECK_LOOPS: u32 = 1000;

    pub fn new() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            border: Self::DEFAULT_BORDER,
            ship_separation: Self::DEFAULT_SHIP_SEPARATION,
            max_check_loops: Self::DEFAULT_MAX_CHECK_LOOPS,
        }
    }

    pub fn with_arena(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::new()
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
