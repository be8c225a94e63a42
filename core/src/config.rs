//! Tunable parameters of a simulation run.
//!
//! Every section deserializes with `#[serde(default)]`, so adapters may load
//! partial documents and inherit the remaining values from [`Default`].

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{CellCoord, Element, Grade, WorldPoint, GRADE_COUNT, GRADE_NAMES};

/// Complete configuration of a simulation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed shared by every randomised system.
    pub seed: u64,
    /// Tile layout and playable region.
    pub grid: GridConfig,
    /// Spawn points and waypoints walked by enemies.
    pub path: PathConfig,
    /// Wave composition and pacing.
    pub waves: WaveConfig,
    /// Gold, spawn pricing and player health.
    pub economy: EconomyConfig,
    /// Piece attack rules.
    pub combat: CombatConfig,
    /// Per-element effect parameters.
    pub elements: ElementTuning,
    /// Enemy ability parameters.
    pub enemies: EnemyConfig,
    /// Named stat blocks for pieces and enemies.
    pub catalog: StatCatalog,
}

/// Tile layout from which the playable region is derived.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Column of the lower-left tile.
    pub origin_x: i32,
    /// Row of the lower-left tile.
    pub origin_y: i32,
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Side length of a tile in world units.
    pub cell_size: f32,
    /// Columns excluded on the left edge.
    pub left_margin: u32,
    /// Columns excluded on the right edge.
    pub right_margin: u32,
    /// Rows excluded on the top edge.
    pub top_margin: u32,
    /// Cells inside the bounds that have no tile.
    pub holes: Vec<CellCoord>,
    /// Highest grade a merge may produce.
    pub max_piece_grade: u8,
}

impl GridConfig {
    /// Bounds of the playable region after removing the margins.
    #[must_use]
    pub fn playable_bounds(&self) -> CellBounds {
        let columns = i32::try_from(self.columns).unwrap_or(i32::MAX);
        let rows = i32::try_from(self.rows).unwrap_or(i32::MAX);
        let left = i32::try_from(self.left_margin).unwrap_or(i32::MAX);
        let right = i32::try_from(self.right_margin).unwrap_or(i32::MAX);
        let top = i32::try_from(self.top_margin).unwrap_or(i32::MAX);
        CellBounds {
            x_min: self.origin_x.saturating_add(left),
            x_max: self
                .origin_x
                .saturating_add(columns)
                .saturating_sub(right),
            y_min: self.origin_y,
            y_max: self.origin_y.saturating_add(rows).saturating_sub(top),
        }
    }

    /// Centre of a cell in world units.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> WorldPoint {
        WorldPoint::new(
            (cell.x() as f32 + 0.5) * self.cell_size,
            (cell.y() as f32 + 0.5) * self.cell_size,
        )
    }

    /// Highest grade a merge may produce.
    #[must_use]
    pub const fn max_grade(&self) -> Grade {
        Grade::new(self.max_piece_grade)
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            origin_x: 0,
            origin_y: 0,
            columns: 10,
            rows: 9,
            cell_size: 1.0,
            left_margin: 1,
            right_margin: 1,
            top_margin: 5,
            holes: Vec::new(),
            max_piece_grade: Grade::KING.get(),
        }
    }
}

/// Half-open rectangle of cells: `x_min..x_max` by `y_min..y_max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellBounds {
    /// First playable column.
    pub x_min: i32,
    /// Column just past the last playable one.
    pub x_max: i32,
    /// First playable row.
    pub y_min: i32,
    /// Row just past the last playable one.
    pub y_max: i32,
}

impl CellBounds {
    /// Reports whether the cell lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.x() >= self.x_min
            && cell.x() < self.x_max
            && cell.y() >= self.y_min
            && cell.y() < self.y_max
    }

    /// Cells inside the rectangle in ascending order.
    #[must_use]
    pub fn cells(&self) -> Vec<CellCoord> {
        let mut cells = Vec::new();
        for x in self.x_min..self.x_max {
            for y in self.y_min..self.y_max {
                cells.push(CellCoord::new(x, y));
            }
        }
        cells
    }
}

/// Spawn points and the waypoint path enemies follow.
///
/// The path turns twice: enemies first walk vertically to `waypoints[0]`,
/// then horizontally to `waypoints[1]`, then back vertically to the goal at
/// `waypoints[2]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Positions where enemies may enter.
    pub spawn_points: Vec<WorldPoint>,
    /// Ordered waypoints; the last one is the goal.
    pub waypoints: Vec<WorldPoint>,
    /// Distance below which a waypoint counts as reached.
    pub arrival_threshold: f32,
}

impl PathConfig {
    /// Number of waypoints the path logic requires.
    pub const WAYPOINT_COUNT: usize = 3;

    /// Waypoints when the path is complete.
    #[must_use]
    pub fn route(&self) -> Option<[WorldPoint; Self::WAYPOINT_COUNT]> {
        match self.waypoints.as_slice() {
            [first, second, goal, ..] => Some([*first, *second, *goal]),
            _ => None,
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            spawn_points: vec![WorldPoint::new(0.5, 8.5), WorldPoint::new(0.5, 7.5)],
            waypoints: vec![
                WorldPoint::new(0.5, 4.5),
                WorldPoint::new(9.5, 4.5),
                WorldPoint::new(9.5, 8.5),
            ],
            arrival_threshold: 0.2,
        }
    }
}

/// Wave composition and pacing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Cost budget of every wave before the per-wave increase.
    pub base_cost: f32,
    /// Cost budget added per wave number.
    pub increase_per_wave: f32,
    /// Unit cost of each enemy grade.
    pub grade_costs: [f32; GRADE_COUNT],
    /// Every n-th wave is a boss wave.
    pub boss_every: u32,
    /// Seconds between two enemy spawns.
    pub spawn_interval_secs: f32,
    /// Maximum seconds a normal wave waits for its enemies to die.
    pub wave_delay_secs: f32,
    /// Maximum seconds a boss wave waits for its boss to die.
    pub boss_wave_delay_secs: f32,
    /// Seconds between two end-condition polls.
    pub poll_interval_secs: f32,
    /// Gold granted per wave number when a wave ends.
    pub reward_per_wave: u32,
}

impl WaveConfig {
    /// Interval between two spawns.
    #[must_use]
    pub fn spawn_interval(&self) -> Duration {
        duration_from_secs(self.spawn_interval_secs)
    }

    /// Maximum wait after spawning, depending on the wave kind.
    #[must_use]
    pub fn end_delay(&self, boss: bool) -> Duration {
        if boss {
            duration_from_secs(self.boss_wave_delay_secs)
        } else {
            duration_from_secs(self.wave_delay_secs)
        }
    }

    /// Interval between two end-condition polls.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        duration_from_secs(self.poll_interval_secs)
    }
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            base_cost: 3.0,
            increase_per_wave: 1.0,
            grade_costs: [1.0, 2.0, 4.0, 4.0, 10.0, 15.0],
            boss_every: 20,
            spawn_interval_secs: 0.5,
            wave_delay_secs: 10.0,
            boss_wave_delay_secs: 30.0,
            poll_interval_secs: 0.1,
            reward_per_wave: 20,
        }
    }
}

/// Gold, spawn pricing and player health.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Gold held at the start of a run.
    pub starting_gold: u32,
    /// Price of the first piece spawn.
    pub spawn_cost: u32,
    /// Price increase after every successful spawn.
    pub spawn_cost_step: u32,
    /// Upgrade price per current level.
    pub upgrade_cost_multiplier: u32,
    /// Gold granted for each killed enemy.
    pub kill_reward: u32,
    /// Player health at the start of a run.
    pub player_health: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_gold: 100,
            spawn_cost: 20,
            spawn_cost_step: 5,
            upgrade_cost_multiplier: 100,
            kill_reward: 10,
            player_health: 10,
        }
    }
}

/// Piece attack rules shared by every element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Seconds a piece hit by an enemy ability cannot attack.
    pub hit_lockout_secs: f32,
    /// Seconds before a piece that found no target scans again.
    pub rescan_delay_secs: f32,
    /// Damage bonus per upgrade level above one.
    pub level_damage_bonus: f32,
    /// Upgrade levels per ability tier.
    pub levels_per_tier: u32,
    /// Grade of pieces that buff their allies.
    pub king_grade: u8,
    /// Maximum number of kings contributing to the buff.
    pub max_king_bonus: u32,
}

impl CombatConfig {
    /// Lockout applied after an enemy ability hit.
    #[must_use]
    pub fn hit_lockout(&self) -> Duration {
        duration_from_secs(self.hit_lockout_secs)
    }

    /// Delay before a fruitless scan is retried.
    #[must_use]
    pub fn rescan_delay(&self) -> Duration {
        duration_from_secs(self.rescan_delay_secs)
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            hit_lockout_secs: 1.0,
            rescan_delay_secs: 0.1,
            level_damage_bonus: 0.5,
            levels_per_tier: 5,
            king_grade: Grade::KING.get(),
            max_king_bonus: 3,
        }
    }
}

/// Per-element effect parameters before tier bonuses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementTuning {
    /// Damage ratio of every element in table order.
    pub damage_ratio: [f32; 6],
    /// Enemies hit by an electric chain at tier zero.
    pub electric_target_count: u32,
    /// Seconds between two chain hops.
    pub chain_hop_secs: f32,
    /// Fraction of the attack damage dealt by each poison tick.
    pub poison_ratio: f32,
    /// Seconds between poison ticks.
    pub poison_period_secs: f32,
    /// Poison ticks at tier zero.
    pub poison_ticks: u32,
    /// Fraction of the attack damage dealt by an explosion.
    pub explosion_ratio: f32,
    /// Explosion radius at tier zero.
    pub explosion_range: f32,
    /// Seconds an explosion keeps damaging enemies.
    pub explosion_lifetime_secs: f32,
    /// Cooldown divisor applied after a wind attack at tier zero.
    pub wind_attack_speed: f32,
    /// Instant kill probability at tier zero.
    pub death_probability: f32,
    /// Slow rate applied by ice.
    pub ice_slow_rate: f32,
    /// Seconds an ice slow lasts.
    pub ice_slow_secs: f32,
    /// Stop probability at tier zero.
    pub ice_stop_probability: f32,
    /// Seconds an ice stop lasts.
    pub ice_stop_secs: f32,
}

impl ElementTuning {
    /// Damage ratio of the element.
    #[must_use]
    pub fn ratio(&self, element: Element) -> f32 {
        self.damage_ratio[element.index()]
    }
}

impl Default for ElementTuning {
    fn default() -> Self {
        Self {
            damage_ratio: [1.0, 0.8, 1.2, 1.0, 1.0, 0.9],
            electric_target_count: 3,
            chain_hop_secs: 0.08,
            poison_ratio: 0.3,
            poison_period_secs: 0.5,
            poison_ticks: 5,
            explosion_ratio: 0.8,
            explosion_range: 1.0,
            explosion_lifetime_secs: 0.3,
            wind_attack_speed: 1.5,
            death_probability: 0.05,
            ice_slow_rate: 0.4,
            ice_slow_secs: 2.0,
            ice_stop_probability: 0.1,
            ice_stop_secs: 1.0,
        }
    }
}

/// Enemy ability parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Seconds between two ability activations.
    pub ability_period_secs: f32,
    /// Lowest grade that owns an ability.
    pub ability_min_grade: u8,
    /// Length of ability rays in cells.
    pub ability_ray_length: u32,
    /// Seconds affected pieces stay dimmed.
    pub disrupt_secs: f32,
}

impl EnemyConfig {
    /// Period of the ability timer.
    #[must_use]
    pub fn ability_period(&self) -> Duration {
        duration_from_secs(self.ability_period_secs)
    }

    /// Duration of the dimming debuff.
    #[must_use]
    pub fn disrupt_duration(&self) -> Duration {
        duration_from_secs(self.disrupt_secs)
    }

    /// Reports whether enemies of the grade run an ability timer.
    #[must_use]
    pub const fn has_ability(&self, grade: Grade) -> bool {
        grade.get() >= self.ability_min_grade
    }
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            ability_period_secs: 10.0,
            ability_min_grade: 2,
            ability_ray_length: 10,
            disrupt_secs: 2.0,
        }
    }
}

/// Static attack stats of a piece grade.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PieceStats {
    /// Base damage per attack.
    pub damage: f32,
    /// Attack radius in world units.
    pub range: f32,
    /// Seconds between attacks.
    pub attack_delay_secs: f32,
}

impl PieceStats {
    /// Safe stats used when no stat block resolves.
    pub const FALLBACK: Self = Self {
        damage: 1.0,
        range: 1.0,
        attack_delay_secs: 1.0,
    };

    /// Attack delay as a duration.
    #[must_use]
    pub fn attack_delay(&self) -> Duration {
        duration_from_secs(self.attack_delay_secs)
    }
}

/// Static stats of an enemy grade.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    /// Health before the wave multiplier.
    pub health: u32,
    /// Movement speed in world units per second.
    pub speed: f32,
}

/// Stat blocks keyed by grade name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatCatalog {
    /// Piece stats keyed by grade name.
    pub pieces: BTreeMap<String, PieceStats>,
    /// Enemy stats keyed by grade name.
    pub enemies: BTreeMap<String, EnemyStats>,
}

impl StatCatalog {
    /// Piece stats registered under the name.
    #[must_use]
    pub fn piece_stats(&self, name: &str) -> Option<PieceStats> {
        self.pieces.get(name).copied()
    }

    /// Enemy stats registered under the name.
    #[must_use]
    pub fn enemy_stats(&self, name: &str) -> Option<EnemyStats> {
        self.enemies.get(name).copied()
    }
}

impl Default for StatCatalog {
    fn default() -> Self {
        const PIECES: [(f32, f32, f32); GRADE_COUNT] = [
            (1.0, 2.0, 1.0),
            (2.0, 2.0, 0.9),
            (4.0, 2.5, 0.9),
            (7.0, 2.5, 0.8),
            (12.0, 3.0, 0.7),
            (20.0, 3.0, 0.6),
        ];
        const ENEMIES: [(u32, f32); GRADE_COUNT] = [
            (3, 1.5),
            (5, 2.0),
            (8, 1.4),
            (12, 1.0),
            (40, 0.9),
            (60, 0.7),
        ];

        let pieces = GRADE_NAMES
            .iter()
            .zip(PIECES)
            .map(|(name, (damage, range, attack_delay_secs))| {
                (
                    (*name).to_owned(),
                    PieceStats {
                        damage,
                        range,
                        attack_delay_secs,
                    },
                )
            })
            .collect();
        let enemies = GRADE_NAMES
            .iter()
            .zip(ENEMIES)
            .map(|(name, (health, speed))| ((*name).to_owned(), EnemyStats { health, speed }))
            .collect();

        Self { pieces, enemies }
    }
}

/// Converts configured seconds to a duration.
///
/// Non-positive and NaN values become zero; values too large for a
/// `Duration` saturate at `Duration::MAX`.
#[must_use]
pub fn duration_from_secs(value: f32) -> Duration {
    if value > 0.0 {
        Duration::try_from_secs_f32(value).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}
