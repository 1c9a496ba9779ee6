/// Stats a tower carries at a given level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerStats {
    pub damage: i32,
    pub attack_speed_ticks: u32,
    pub range: f32,
}

/// Everything tunable about a match, supplied at construction time.
///
/// Distances are in world units (`tile_size` units per tile), speeds in
/// world units per tick, and every duration in ticks. The map template is
/// parsed by [`crate::grid::Grid::from_rows`].
#[derive(Clone, Debug)]
pub struct GameConfig {
    pub map_rows: Vec<String>,
    pub tile_size: f32,

    pub start_lives: u32,
    pub base_start_gold: u32,
    pub kill_reward: u32,

    pub tower_cost: u32,
    pub upgrade_cost_scale: u32,
    pub damage_base: i32,
    pub damage_per_level: i32,
    pub attack_speed_base_ticks: u32,
    pub attack_speed_step_ticks: u32,
    pub attack_speed_min_ticks: u32,
    pub range_base_tiles: f32,
    pub range_per_level_tiles: f32,

    pub projectile_speed: f32,
    pub monster_speed: f32,
    pub monster_max_hp: i32,
    pub spawn_interval_ticks: u32,

    /// Ticks to wait after the last life is lost before the match resets.
    /// `None` makes a lives-out game terminal instead.
    pub restart_delay_ticks: Option<u32>,
}

impl GameConfig {
    pub fn tower_stats(&self, level: u32) -> TowerStats {
        let speed = self
            .attack_speed_base_ticks
            .saturating_sub(level * self.attack_speed_step_ticks)
            .max(self.attack_speed_min_ticks);
        TowerStats {
            damage: self.damage_base + level as i32 * self.damage_per_level,
            attack_speed_ticks: speed,
            range: self.tile_size * (self.range_base_tiles + level as f32 * self.range_per_level_tiles),
        }
    }

    /// Cost of raising a tower from `level` to `level + 1`.
    pub fn upgrade_cost(&self, level: u32) -> u32 {
        self.tower_cost + level * self.upgrade_cost_scale
    }

    /// Total gold paid for a tower currently at `level`: the placement cost
    /// plus every upgrade increment along the way.
    pub fn invested(&self, level: u32) -> u32 {
        (1..level).fold(self.tower_cost, |sum, l| sum + self.upgrade_cost(l))
    }

    /// Gold returned when a tower at `level` is sold or its owner leaves.
    pub fn sale_refund(&self, level: u32) -> u32 {
        self.invested(level) / 2
    }
}

/// Two spawn arms joining a shared lane to the goal, with a little build
/// room on every side.
pub const DEFAULT_MAP: [&str; 12] = [
    "................",
    "S+++++++........",
    ".......+..##....",
    ".......+..##....",
    ".......+........",
    ".......++++++++G",
    ".......+........",
    "...##..+........",
    "...##..+........",
    "S+++++++........",
    "................",
    "................",
];

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_rows: DEFAULT_MAP.iter().map(|r| r.to_string()).collect(),
            tile_size: 40.0,

            start_lives: 10,
            base_start_gold: 200,
            kill_reward: 1,

            tower_cost: 5,
            upgrade_cost_scale: 5,
            damage_base: 5,
            damage_per_level: 5,
            attack_speed_base_ticks: 250,
            attack_speed_step_ticks: 10,
            attack_speed_min_ticks: 30,
            range_base_tiles: 1.3,
            range_per_level_tiles: 0.5,

            projectile_speed: 3.0,
            monster_speed: 0.5,
            monster_max_hp: 100,
            spawn_interval_ticks: 30,

            restart_delay_ticks: Some(180),
        }
    }
}
