#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Pawn Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! presenters to react to. Systems consume event streams, query immutable
//! views, and respond exclusively with new command batches.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

pub mod config;

pub use config::{
    duration_from_secs, CellBounds, CombatConfig, EconomyConfig, ElementTuning, EnemyConfig,
    EnemyStats, GridConfig, PathConfig, PieceStats, SimulationConfig, StatCatalog, WaveConfig,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Pawn Defence.";

/// Number of distinct grades shared by pieces and enemies.
pub const GRADE_COUNT: usize = 6;

/// Display names of every grade, indexed by the grade value.
pub const GRADE_NAMES: [&str; GRADE_COUNT] = ["Pawn", "Knight", "Bishop", "Rook", "Queen", "King"];

new_key_type! {
    /// Generation-checked handle of an enemy agent.
    pub struct EnemyId;

    /// Generation-checked handle of a piece placed on the grid.
    pub struct PieceId;
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Rebuilds the world from its configuration after a game over.
    Restart,
    /// Announces that a new wave started.
    BeginWave {
        /// Ordinal number of the wave, starting at one.
        wave: u32,
        /// Whether the wave is a boss wave.
        boss: bool,
    },
    /// Requests that an enemy of the given grade enters at a spawn point.
    SpawnEnemy {
        /// Grade of the enemy to create.
        grade: Grade,
        /// Index into the configured spawn points.
        spawn_point: usize,
        /// Wave number used as the enemy's health multiplier.
        wave: u32,
    },
    /// Publishes the remaining boss wave time, or `None` once the timer closes.
    ReportBossTimer {
        /// Remaining time before the boss wave times out.
        remaining: Option<Duration>,
    },
    /// Grants gold to the player.
    AwardGold {
        /// Amount of gold to add.
        amount: u32,
    },
    /// Pays the spawn cost and places a new grade zero piece on the cell.
    SpawnPiece {
        /// Cell receiving the piece.
        cell: CellCoord,
        /// Element assigned to the new piece.
        element: Element,
    },
    /// Relocates a piece onto a free cell.
    MovePiece {
        /// Piece being moved.
        piece: PieceId,
        /// Cell the piece is expected to occupy.
        from: CellCoord,
        /// Destination cell.
        to: CellCoord,
    },
    /// Drops a dragged piece onto a cell, merging with its occupant when possible.
    MergePieces {
        /// Piece being dragged.
        dragged: PieceId,
        /// Cell the dragged piece occupies.
        from: CellCoord,
        /// Cell the piece was dropped on.
        to: CellCoord,
        /// Element assigned to the merged piece.
        element: Element,
    },
    /// Removes a piece from the grid.
    RemovePiece {
        /// Piece targeted for removal.
        piece: PieceId,
    },
    /// Purchases one upgrade level for an element.
    UpgradeElement {
        /// Element receiving the upgrade.
        element: Element,
    },
    /// Locks a piece onto an enemy.
    AssignTarget {
        /// Piece acquiring the target.
        piece: PieceId,
        /// Enemy being targeted.
        enemy: EnemyId,
    },
    /// Clears the piece's target and postpones its next scan.
    DeferTargetScan {
        /// Piece that found nothing in range.
        piece: PieceId,
    },
    /// Executes a resolved attack of a piece against its target.
    ResolveAttack {
        /// Attacking piece.
        piece: PieceId,
        /// Enemy receiving the attack.
        target: EnemyId,
        /// Elemental effect carried by the attack.
        effect: AttackEffect,
        /// Cooldown before the piece may attack again.
        cooldown: Duration,
    },
    /// Applies an enemy ability debuff to the listed pieces.
    DisruptPieces {
        /// Enemy that triggered the ability.
        enemy: EnemyId,
        /// Deduplicated pieces affected by the ability pattern.
        pieces: Vec<PieceId>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Reports that player health reached zero and the clock froze.
    GameOver {
        /// Wave that was active when the game ended.
        wave: u32,
    },
    /// Confirms that the world was rebuilt from its configuration.
    Restarted,
    /// Announces a new wave.
    WaveStarted {
        /// Ordinal number of the wave.
        wave: u32,
        /// Whether the wave is a boss wave.
        boss: bool,
    },
    /// Reports remaining boss wave time, `None` once the timer is hidden.
    BossTimerUpdated {
        /// Remaining time before the boss wave ends.
        remaining: Option<Duration>,
    },
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Identifier allocated to the enemy.
        enemy: EnemyId,
        /// Grade of the enemy.
        grade: Grade,
        /// Spawn position.
        position: WorldPoint,
        /// Health after the wave multiplier was applied.
        health: u32,
    },
    /// Reports that a spawn request could not be satisfied.
    EnemySpawnSkipped {
        /// Grade that was requested.
        grade: Grade,
        /// Reason the spawn was skipped.
        reason: SpawnError,
    },
    /// Reports damage that left the enemy alive.
    EnemyDamaged {
        /// Enemy that took damage.
        enemy: EnemyId,
        /// Damage applied.
        amount: u32,
        /// Health remaining.
        health: u32,
        /// Remaining health normalised to `0.0..=1.0`.
        health_fraction: f32,
    },
    /// Reports that an enemy was destroyed by damage.
    EnemyKilled {
        /// Enemy that died.
        enemy: EnemyId,
        /// Gold granted for the kill.
        reward: u32,
    },
    /// Reports that an enemy reached the goal waypoint.
    EnemyReachedGoal {
        /// Enemy that arrived.
        enemy: EnemyId,
    },
    /// Reports that a slow replaced any previous slow on the enemy.
    EnemySlowed {
        /// Enemy being slowed.
        enemy: EnemyId,
        /// Velocity multiplier applied while the slow lasts.
        multiplier: f32,
        /// Duration of the slow.
        duration: Duration,
    },
    /// Reports that an enemy was frozen in place.
    EnemyStopped {
        /// Enemy being stopped.
        enemy: EnemyId,
        /// Duration of the stop.
        duration: Duration,
    },
    /// Signals that an enemy's ability timer elapsed.
    EnemyAbilityReady {
        /// Enemy whose ability fired.
        enemy: EnemyId,
        /// Grade selecting the ability pattern.
        grade: Grade,
    },
    /// Reports a new player health value.
    PlayerHealthChanged {
        /// Remaining player health.
        health: u32,
    },
    /// Reports a new gold balance.
    GoldChanged {
        /// Gold currently held.
        gold: u32,
    },
    /// Reports a new piece spawn cost.
    SpawnCostChanged {
        /// Gold required for the next spawn.
        cost: u32,
    },
    /// Confirms that a piece was placed on the grid.
    PieceSpawned {
        /// Identifier allocated to the piece.
        piece: PieceId,
        /// Cell occupied by the piece.
        cell: CellCoord,
        /// Element assigned to the piece.
        element: Element,
        /// Grade of the piece.
        grade: Grade,
    },
    /// Reports that a piece spawn request was rejected.
    PieceSpawnRejected {
        /// Requested cell.
        cell: CellCoord,
        /// Reason the spawn failed.
        reason: SpawnError,
    },
    /// Confirms that a piece moved.
    PieceMoved {
        /// Piece that moved.
        piece: PieceId,
        /// Cell the piece left.
        from: CellCoord,
        /// Cell the piece entered.
        to: CellCoord,
        /// Centre of the destination cell in world units.
        position: WorldPoint,
    },
    /// Reports that a move request was rejected.
    MoveRejected {
        /// Piece that failed to move.
        piece: PieceId,
        /// Requested destination.
        to: CellCoord,
        /// Reason the move failed.
        reason: MoveError,
    },
    /// Confirms that two pieces merged into one of a higher grade.
    PiecesMerged {
        /// Pieces destroyed by the merge.
        consumed: [PieceId; 2],
        /// Piece created by the merge.
        piece: PieceId,
        /// Cell holding the merged piece.
        cell: CellCoord,
        /// Grade of the merged piece.
        grade: Grade,
        /// Element assigned to the merged piece.
        element: Element,
    },
    /// Reports that a merge was rejected and the dragged piece should snap back.
    MergeRejected {
        /// Piece that was dragged.
        dragged: PieceId,
        /// Cell it was dropped on.
        to: CellCoord,
        /// Reason the merge failed.
        reason: MergeError,
    },
    /// Confirms that a piece was removed.
    PieceRemoved {
        /// Piece that was removed.
        piece: PieceId,
        /// Cell that became free.
        cell: CellCoord,
    },
    /// Reports pieces debuffed by an enemy ability.
    PiecesDisrupted {
        /// Enemy that used the ability.
        enemy: EnemyId,
        /// Pieces that were affected.
        pieces: Vec<PieceId>,
        /// Duration of the dimming debuff.
        duration: Duration,
    },
    /// Confirms that a piece acquired a target.
    TargetAcquired {
        /// Piece acquiring the target.
        piece: PieceId,
        /// Targeted enemy.
        enemy: EnemyId,
    },
    /// Confirms that a piece attacked.
    AttackResolved {
        /// Attacking piece.
        piece: PieceId,
        /// Attacked enemy.
        target: EnemyId,
        /// Element of the attack.
        element: Element,
    },
    /// Requests a fire-and-forget visual effect.
    EffectSpawned {
        /// Effect to display.
        kind: EffectKind,
        /// World position of the effect.
        position: WorldPoint,
    },
    /// Notifies listeners that an element upgrade level changed.
    ElementUpgraded {
        /// Upgraded element.
        element: Element,
        /// New upgrade level.
        level: u32,
    },
    /// Reports that an upgrade could not be afforded.
    UpgradeRejected {
        /// Element the player tried to upgrade.
        element: Element,
        /// Reason the purchase failed.
        reason: SpendError,
    },
}

/// Ordinal rank shared by pieces and enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Grade(u8);

impl Grade {
    /// Base grade of freshly spawned pieces and the weakest enemies.
    pub const PAWN: Self = Self(0);
    /// Grade of queen enemies, spawned on odd boss waves.
    pub const QUEEN: Self = Self(4);
    /// Highest named grade.
    pub const KING: Self = Self(5);

    /// Creates a grade from its numeric rank.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Numeric rank of the grade.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Grade one rank higher, or `None` past the last representable rank.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Zero-based index usable with per-grade tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Name keying the grade's stat block, if the grade is named.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        GRADE_NAMES.get(self.index()).copied()
    }
}

/// Elemental attack behaviour assigned to a piece at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Element {
    /// Chains between nearby enemies.
    Electric,
    /// Deals damage over time.
    Poison,
    /// Damages every enemy inside an area.
    Explosion,
    /// Shortens the attacker's next cooldown.
    Wind,
    /// Chance to kill outright.
    Death,
    /// Slows and sometimes stops the target.
    Ice,
}

impl Element {
    /// Every element in table order.
    pub const ALL: [Self; 6] = [
        Self::Electric,
        Self::Poison,
        Self::Explosion,
        Self::Wind,
        Self::Death,
        Self::Ice,
    ];

    /// Index of the element inside per-element tables.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Electric => 0,
            Self::Poison => 1,
            Self::Explosion => 2,
            Self::Wind => 3,
            Self::Death => 4,
            Self::Ice => 5,
        }
    }

    /// Element stored at the provided table index, if any.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Visual effects requested from the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Lightning arc of an electric chain hop.
    Lightning,
    /// Poison cloud on the target.
    Poison,
    /// Area explosion.
    Explosion,
    /// Gust around a wind piece.
    Gust,
    /// Instant kill flash.
    Doom,
    /// Frost on a slowed target.
    Frost,
}

impl EffectKind {
    /// Effect displayed for attacks of the given element.
    #[must_use]
    pub const fn for_element(element: Element) -> Self {
        match element {
            Element::Electric => Self::Lightning,
            Element::Poison => Self::Poison,
            Element::Explosion => Self::Explosion,
            Element::Wind => Self::Gust,
            Element::Death => Self::Doom,
            Element::Ice => Self::Frost,
        }
    }
}

/// Fully resolved elemental effect of a single attack.
///
/// Random rolls (instant kill, ice stop) are decided by the combat system so
/// the world applies attacks deterministically.
#[derive(Clone, Debug, PartialEq)]
pub enum AttackEffect {
    /// Breadth-first lightning chain.
    Chain {
        /// Damage applied to every enemy hit by the chain.
        damage: u32,
        /// Maximum number of enemies the chain may hit.
        max_targets: u32,
        /// Radius searched around each hit enemy for the next hop.
        radius: f32,
        /// Delay between successive hops.
        hop_delay: Duration,
    },
    /// Immediate damage followed by periodic poison ticks.
    Poison {
        /// Damage applied immediately.
        damage: u32,
        /// Damage applied by every tick.
        tick_damage: u32,
        /// Number of ticks.
        ticks: u32,
        /// Interval between ticks.
        period: Duration,
    },
    /// Area damage centred on the target.
    Explosion {
        /// Radius of the area in world units.
        radius: f32,
        /// Damage applied to each enemy inside the area.
        damage: u32,
        /// Time the area keeps damaging enemies entering it.
        lifetime: Duration,
    },
    /// Direct damage; the shortened cooldown travels with the attack command.
    Wind {
        /// Damage applied to the target.
        damage: u32,
    },
    /// Instant kill roll outcome.
    Death {
        /// Whether the roll succeeded.
        lethal: bool,
        /// Damage applied when the roll failed.
        damage: u32,
    },
    /// Slow, optional stop, and direct damage.
    Ice {
        /// Damage applied to the target.
        damage: u32,
        /// Slow rate, clamped into `0.0..=1.0` by the target.
        slow_rate: f32,
        /// Duration of the slow.
        slow_duration: Duration,
        /// Stop duration when the stop roll succeeded.
        stop: Option<Duration>,
    },
}

impl AttackEffect {
    /// Element that produced the effect.
    #[must_use]
    pub const fn element(&self) -> Element {
        match self {
            Self::Chain { .. } => Element::Electric,
            Self::Poison { .. } => Element::Poison,
            Self::Explosion { .. } => Element::Explosion,
            Self::Wind { .. } => Element::Wind,
            Self::Death { .. } => Element::Death,
            Self::Ice { .. } => Element::Ice,
        }
    }
}

/// Reasons a piece move may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum MoveError {
    /// The piece no longer exists.
    #[error("piece does not exist")]
    MissingPiece,
    /// The piece does not occupy the reported origin cell.
    #[error("piece is not located at the origin cell")]
    NotAtOrigin,
    /// The destination lies outside the playable region or has no tile.
    #[error("destination cell is not playable")]
    InvalidCell,
    /// The destination already holds a piece.
    #[error("destination cell is occupied")]
    Occupied,
}

/// Reasons a merge may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum MergeError {
    /// The dragged piece no longer exists or is not at the origin.
    #[error("dragged piece is missing from its origin cell")]
    MissingPiece,
    /// The piece was dropped on its own cell.
    #[error("piece dropped on its own cell")]
    SameCell,
    /// The destination lies outside the playable region or has no tile.
    #[error("destination cell is not playable")]
    InvalidCell,
    /// The two pieces have different grades.
    #[error("pieces have different grades")]
    GradeMismatch,
    /// The merged grade would exceed the configured maximum.
    #[error("merged grade would exceed the maximum grade")]
    MaxGradeReached,
}

/// Reasons a gold purchase may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum SpendError {
    /// The player holds less gold than the purchase costs.
    #[error("insufficient gold: cost {cost}, held {gold}")]
    InsufficientGold {
        /// Price of the purchase.
        cost: u32,
        /// Gold held when the purchase was attempted.
        gold: u32,
    },
}

/// Reasons a spawn (piece or enemy) may be skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum SpawnError {
    /// The requested cell is not playable.
    #[error("cell is not playable")]
    InvalidCell,
    /// The requested cell already holds a piece.
    #[error("cell is occupied")]
    Occupied,
    /// The spawn could not be paid for.
    #[error(transparent)]
    Spend(#[from] SpendError),
    /// No spawn point exists at the requested index.
    #[error("no spawn point configured")]
    MissingSpawnPoint,
    /// No stat block exists for the requested grade.
    #[error("no stat block configured for grade")]
    MissingStats,
    /// The path does not contain the required waypoints.
    #[error("path waypoints are not configured")]
    MissingWaypoints,
    /// The game is over and the world is frozen.
    #[error("game is over")]
    GameOver,
}

/// Location of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: i32,
    y: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the cell; rows grow upward.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Cell displaced by the provided offsets.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

/// Continuous position expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate, growing upward.
    pub y: f32,
}

impl WorldPoint {
    /// Creates a point from its coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Upgrade level of every element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpgradeLevels([u32; 6]);

impl UpgradeLevels {
    /// Wraps per-element levels in table order.
    #[must_use]
    pub const fn new(levels: [u32; 6]) -> Self {
        Self(levels)
    }

    /// Level of the provided element.
    #[must_use]
    pub const fn level(&self, element: Element) -> u32 {
        self.0[element.index()]
    }
}

impl Default for UpgradeLevels {
    fn default() -> Self {
        Self([1; 6])
    }
}

/// Immutable representation of a single enemy used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Handle of the enemy.
    pub id: EnemyId,
    /// Grade of the enemy.
    pub grade: Grade,
    /// Current position.
    pub position: WorldPoint,
    /// Remaining health.
    pub health: u32,
    /// Health at spawn.
    pub max_health: u32,
    /// Index of the waypoint the enemy is walking toward.
    pub path_index: usize,
    /// Path length left before the enemy reaches the goal.
    pub remaining_distance: f32,
}

/// Read-only snapshot describing all live enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a view, keeping the provided (arena) order.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<EnemySnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Snapshot of the enemy, if it is still alive.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == id)
    }

    /// Number of live enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no enemy is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable representation of a single piece used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PieceSnapshot {
    /// Handle of the piece.
    pub id: PieceId,
    /// Grade of the piece.
    pub grade: Grade,
    /// Element of the piece.
    pub element: Element,
    /// Cell the piece occupies.
    pub cell: CellCoord,
    /// Centre of the cell in world units.
    pub position: WorldPoint,
    /// Resolved stat block.
    pub stats: PieceStats,
    /// Current target, which may have become stale.
    pub target: Option<EnemyId>,
    /// Whether the attack cooldown elapsed.
    pub ready: bool,
    /// Whether the piece may scan for a new target.
    pub can_scan: bool,
    /// Whether an enemy ability hit locks the piece out of attacking.
    pub locked_out: bool,
    /// Whether the piece is dimmed by an enemy ability.
    pub dimmed: bool,
}

/// Read-only snapshot describing all placed pieces.
#[derive(Clone, Debug, Default)]
pub struct PieceView {
    snapshots: Vec<PieceSnapshot>,
}

impl PieceView {
    /// Creates a new piece view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<PieceSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &PieceSnapshot> {
        self.snapshots.iter()
    }

    /// Snapshot of the piece, if it is still placed.
    #[must_use]
    pub fn get(&self, id: PieceId) -> Option<&PieceSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of placed pieces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the grid holds no piece.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Read-only view into grid occupancy.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    occupants: &'a BTreeMap<CellCoord, PieceId>,
    playable: &'a [CellCoord],
}

impl<'a> OccupancyView<'a> {
    /// Captures a view over the occupancy map and the sorted playable cells.
    #[must_use]
    pub fn new(occupants: &'a BTreeMap<CellCoord, PieceId>, playable: &'a [CellCoord]) -> Self {
        Self {
            occupants,
            playable,
        }
    }

    /// Returns the piece occupying the provided cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<PieceId> {
        self.occupants.get(&cell).copied()
    }

    /// Reports whether pieces may stand on the cell.
    #[must_use]
    pub fn is_playable(&self, cell: CellCoord) -> bool {
        self.playable.binary_search(&cell).is_ok()
    }

    /// Reports whether the cell is playable and free.
    #[must_use]
    pub fn is_free(&self, cell: CellCoord) -> bool {
        self.is_playable(cell) && !self.occupants.contains_key(&cell)
    }

    /// Playable cells that hold no piece, in ascending order.
    #[must_use]
    pub fn free_cells(&self) -> Vec<CellCoord> {
        self.playable
            .iter()
            .copied()
            .filter(|cell| !self.occupants.contains_key(cell))
            .collect()
    }

    /// Iterator over occupied cells and their pieces.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, PieceId)> + 'a {
        self.occupants.iter().map(|(cell, piece)| (*cell, *piece))
    }
}
