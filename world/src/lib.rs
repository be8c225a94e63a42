#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Pawn Defence.

mod economy;
mod enemies;
mod explosions;
mod grid;
mod pieces;
mod timers;

use std::{collections::VecDeque, time::Duration};

use pawn_defence_core::{
    AttackEffect, CellCoord, Command, EffectKind, Element, EnemyId, Event, Grade, MergeError,
    MoveError, PieceId, SimulationConfig, SpawnError, WorldPoint, WELCOME_BANNER,
};
use slotmap::SlotMap;
use tracing::{debug, info, warn};

use crate::{
    economy::Economy,
    enemies::{Advance, DamageOutcome, Enemy},
    explosions::Explosion,
    grid::GridStore,
    pieces::Piece,
    timers::{Chain, Task, TimerTable},
};

/// Represents the authoritative Pawn Defence world state.
#[derive(Debug)]
pub struct World {
    config: SimulationConfig,
    banner: &'static str,
    now: Duration,
    wave: u32,
    boss_timer: Option<Duration>,
    game_over: bool,
    grid: GridStore,
    pieces: SlotMap<PieceId, Piece>,
    enemies: SlotMap<EnemyId, Enemy>,
    economy: Economy,
    timers: TimerTable,
    explosions: Vec<Explosion>,
}

/// Result of dropping a dragged piece on a cell.
enum DropOutcome {
    Moved(WorldPoint),
    Merged {
        consumed: [PieceId; 2],
        piece: PieceId,
        grade: Grade,
    },
}

impl World {
    /// Creates a world ready for simulation from the provided configuration.
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            banner: WELCOME_BANNER,
            now: Duration::ZERO,
            wave: 0,
            boss_timer: None,
            game_over: false,
            grid: GridStore::new(&config.grid),
            pieces: SlotMap::with_key(),
            enemies: SlotMap::with_key(),
            economy: Economy::new(&config.economy),
            timers: TimerTable::default(),
            explosions: Vec::new(),
            config,
        }
    }

    fn cell_center(&self, cell: CellCoord) -> WorldPoint {
        self.config.grid.cell_center(cell)
    }

    /// Moves every enemy and reports whether the game ended.
    fn advance_enemies(&mut self, dt: Duration, out_events: &mut Vec<Event>) -> bool {
        let now = self.now;
        let threshold = self.config.path.arrival_threshold;
        let arrived: Vec<EnemyId> = self
            .enemies
            .iter_mut()
            .filter_map(|(id, enemy)| {
                (enemy.advance(dt, now, threshold) == Advance::Arrived).then_some(id)
            })
            .collect();

        for enemy in arrived {
            let _ = self.enemies.remove(enemy);
            out_events.push(Event::EnemyReachedGoal { enemy });
            let health = self.economy.lose_health();
            out_events.push(Event::PlayerHealthChanged { health });
            if health == 0 {
                self.game_over = true;
                info!(wave = self.wave, "player health depleted");
                out_events.push(Event::GameOver { wave: self.wave });
                return true;
            }
        }
        false
    }

    fn resolve_explosions(&mut self, out_events: &mut Vec<Event>) {
        let now = self.now;
        let mut explosions = std::mem::take(&mut self.explosions);
        explosions.retain(|explosion| !explosion.is_expired(now));
        for explosion in &mut explosions {
            let hits = explosion.collect_hits(
                self.enemies
                    .iter()
                    .map(|(id, enemy)| (id, enemy.position())),
            );
            for enemy in hits {
                let _ = self.damage_enemy(enemy, explosion.damage(), out_events);
            }
        }
        self.explosions = explosions;
    }

    fn run_due_timers(&mut self, out_events: &mut Vec<Event>) {
        while let Some((fire_at, task)) = self.timers.pop_due(self.now) {
            let owner = task.owner();
            if !self.pieces.contains_key(owner) {
                debug!(?owner, "dropping task of a removed piece");
                continue;
            }

            match task {
                Task::ChainHop(mut chain) => {
                    let enemies = &self.enemies;
                    let Some(target) = chain.next_target(|enemy| enemies.contains_key(enemy))
                    else {
                        continue;
                    };
                    if let Some(position) = self.enemies.get(target).map(Enemy::position) {
                        out_events.push(Event::EffectSpawned {
                            kind: EffectKind::Lightning,
                            position,
                        });
                    }
                    self.strike_chain(fire_at, target, chain, out_events);
                }
                Task::PoisonTick {
                    owner,
                    target,
                    damage,
                    remaining,
                    period,
                } => {
                    if !self.enemies.contains_key(target) {
                        debug!(?target, "poison target is gone");
                        continue;
                    }
                    let alive = self.damage_enemy(target, damage, out_events);
                    let remaining = remaining.saturating_sub(1);
                    if alive && remaining > 0 {
                        self.timers.schedule(
                            fire_at.saturating_add(period),
                            Task::PoisonTick {
                                owner,
                                target,
                                damage,
                                remaining,
                                period,
                            },
                        );
                    }
                }
            }
        }
    }

    fn poll_abilities(&mut self, out_events: &mut Vec<Event>) {
        let now = self.now;
        let period = self.config.enemies.ability_period();
        for (id, enemy) in self.enemies.iter_mut() {
            if enemy.poll_ability(now, period) {
                out_events.push(Event::EnemyAbilityReady {
                    enemy: id,
                    grade: enemy.grade(),
                });
            }
        }
    }

    /// Applies damage and reports whether the enemy survived.
    fn damage_enemy(&mut self, id: EnemyId, amount: u32, out_events: &mut Vec<Event>) -> bool {
        let Some(enemy) = self.enemies.get_mut(id) else {
            debug!(enemy = ?id, "damage on a missing enemy");
            return false;
        };

        match enemy.damage(amount) {
            DamageOutcome::Survived { health, fraction } => {
                out_events.push(Event::EnemyDamaged {
                    enemy: id,
                    amount,
                    health,
                    health_fraction: fraction,
                });
                true
            }
            DamageOutcome::Killed => {
                let _ = self.enemies.remove(id);
                let reward = self.config.economy.kill_reward;
                self.economy.add_gold(reward);
                out_events.push(Event::EnemyKilled { enemy: id, reward });
                out_events.push(Event::GoldChanged {
                    gold: self.economy.gold(),
                });
                false
            }
        }
    }

    /// Damages one chain target, queues its neighbours and schedules the next hop.
    fn strike_chain(
        &mut self,
        at: Duration,
        target: EnemyId,
        mut chain: Chain,
        out_events: &mut Vec<Event>,
    ) {
        let Some(position) = self.enemies.get(target).map(Enemy::position) else {
            return;
        };
        chain.hit.push(target);
        chain.remaining = chain.remaining.saturating_sub(1);
        let _ = self.damage_enemy(target, chain.damage, out_events);

        let radius = chain.radius;
        chain.enqueue(
            self.enemies
                .iter()
                .filter(|(_, enemy)| enemy.position().distance(position) <= radius)
                .map(|(id, _)| id),
        );
        if chain.has_more() {
            let fire_at = at.saturating_add(chain.hop_delay);
            self.timers.schedule(fire_at, Task::ChainHop(chain));
        }
    }

    fn spawn_enemy(
        &mut self,
        grade: Grade,
        spawn_point: usize,
        wave: u32,
    ) -> Result<(EnemyId, WorldPoint, u32), SpawnError> {
        let position = *self
            .config
            .path
            .spawn_points
            .get(spawn_point)
            .ok_or(SpawnError::MissingSpawnPoint)?;
        let route = self.config.path.route().ok_or(SpawnError::MissingWaypoints)?;
        let stats = grade
            .name()
            .and_then(|name| self.config.catalog.enemy_stats(name))
            .ok_or(SpawnError::MissingStats)?;
        let ability_at = self
            .config
            .enemies
            .has_ability(grade)
            .then(|| self.now.saturating_add(self.config.enemies.ability_period()));

        let enemy = Enemy::spawn(grade, stats, wave, position, route, ability_at);
        let health = enemy.health();
        Ok((self.enemies.insert(enemy), position, health))
    }

    fn spawn_piece(&mut self, cell: CellCoord, element: Element) -> Result<PieceId, SpawnError> {
        if !self.grid.is_valid(cell) {
            return Err(SpawnError::InvalidCell);
        }
        if self.grid.occupant(cell).is_some() {
            return Err(SpawnError::Occupied);
        }
        let _ = self.economy.try_spend_for_spawn()?;
        Ok(self.place_piece(Grade::PAWN, element, cell))
    }

    fn place_piece(&mut self, grade: Grade, element: Element, cell: CellCoord) -> PieceId {
        let piece = Piece::new(grade, element, cell, &self.config.catalog);
        let id = self.pieces.insert(piece);
        self.grid.occupy(cell, id);
        id
    }

    fn take_piece(&mut self, id: PieceId) -> Option<Piece> {
        let piece = self.pieces.remove(id)?;
        let _ = self.grid.vacate(piece.cell);
        Some(piece)
    }

    fn relocate(&mut self, id: PieceId, from: CellCoord, to: CellCoord) {
        let _ = self.grid.vacate(from);
        self.grid.occupy(to, id);
        if let Some(piece) = self.pieces.get_mut(id) {
            piece.cell = to;
        }
    }

    fn move_piece(
        &mut self,
        id: PieceId,
        from: CellCoord,
        to: CellCoord,
    ) -> Result<WorldPoint, MoveError> {
        let piece = self.pieces.get(id).ok_or(MoveError::MissingPiece)?;
        if piece.cell != from {
            return Err(MoveError::NotAtOrigin);
        }
        if !self.grid.is_valid(to) {
            return Err(MoveError::InvalidCell);
        }
        if self.grid.occupant(to).is_some() {
            return Err(MoveError::Occupied);
        }
        self.relocate(id, from, to);
        Ok(self.cell_center(to))
    }

    fn merge_pieces(
        &mut self,
        dragged: PieceId,
        from: CellCoord,
        to: CellCoord,
        element: Element,
    ) -> Result<DropOutcome, MergeError> {
        let grade = match self.pieces.get(dragged) {
            Some(piece) if piece.cell == from => piece.grade,
            _ => return Err(MergeError::MissingPiece),
        };
        if from == to {
            return Err(MergeError::SameCell);
        }
        if !self.grid.is_valid(to) {
            return Err(MergeError::InvalidCell);
        }
        let Some(other) = self.grid.occupant(to) else {
            self.relocate(dragged, from, to);
            return Ok(DropOutcome::Moved(self.cell_center(to)));
        };

        let other_grade = self
            .pieces
            .get(other)
            .map(|piece| piece.grade)
            .ok_or(MergeError::MissingPiece)?;
        if other_grade != grade {
            return Err(MergeError::GradeMismatch);
        }
        let merged = grade
            .next()
            .filter(|merged| *merged <= self.config.grid.max_grade())
            .ok_or(MergeError::MaxGradeReached)?;

        let _ = self.take_piece(dragged);
        let _ = self.take_piece(other);
        let piece = self.place_piece(merged, element, to);
        Ok(DropOutcome::Merged {
            consumed: [dragged, other],
            piece,
            grade: merged,
        })
    }

    fn resolve_attack(
        &mut self,
        id: PieceId,
        target: EnemyId,
        effect: AttackEffect,
        cooldown: Duration,
        out_events: &mut Vec<Event>,
    ) {
        let now = self.now;
        let Some(piece) = self.pieces.get_mut(id) else {
            debug!(piece = ?id, "attack from a removed piece");
            return;
        };
        if !piece.is_ready(now) || piece.is_locked_out(now) {
            debug!(piece = ?id, "attack ignored while the piece cannot fire");
            return;
        }
        let Some(target_position) = self.enemies.get(target).map(Enemy::position) else {
            piece.target = None;
            debug!(piece = ?id, "attack target is gone");
            return;
        };
        piece.finish_attack(now, cooldown);
        let cell = piece.cell;

        let element = effect.element();
        let position = if element == Element::Wind {
            self.cell_center(cell)
        } else {
            target_position
        };
        out_events.push(Event::AttackResolved {
            piece: id,
            target,
            element,
        });
        out_events.push(Event::EffectSpawned {
            kind: EffectKind::for_element(element),
            position,
        });

        match effect {
            AttackEffect::Chain {
                damage,
                max_targets,
                radius,
                hop_delay,
            } => {
                let chain = Chain {
                    owner: id,
                    frontier: VecDeque::new(),
                    hit: Vec::new(),
                    remaining: max_targets.max(1),
                    damage,
                    radius,
                    hop_delay,
                };
                self.strike_chain(now, target, chain, out_events);
            }
            AttackEffect::Poison {
                damage,
                tick_damage,
                ticks,
                period,
            } => {
                let alive = self.damage_enemy(target, damage, out_events);
                if alive && ticks > 0 {
                    self.timers.schedule(
                        now.saturating_add(period),
                        Task::PoisonTick {
                            owner: id,
                            target,
                            damage: tick_damage,
                            remaining: ticks,
                            period,
                        },
                    );
                }
            }
            AttackEffect::Explosion {
                radius,
                damage,
                lifetime,
            } => {
                let mut explosion =
                    Explosion::new(target_position, radius, damage, now.saturating_add(lifetime));
                let hits = explosion.collect_hits(
                    self.enemies
                        .iter()
                        .map(|(enemy, state)| (enemy, state.position())),
                );
                for enemy in hits {
                    let _ = self.damage_enemy(enemy, damage, out_events);
                }
                self.explosions.push(explosion);
            }
            AttackEffect::Wind { damage } => {
                let _ = self.damage_enemy(target, damage, out_events);
            }
            AttackEffect::Death { lethal, damage } => {
                let amount = if lethal {
                    self.enemies.get(target).map_or(0, Enemy::health)
                } else {
                    damage
                };
                let _ = self.damage_enemy(target, amount, out_events);
            }
            AttackEffect::Ice {
                damage,
                slow_rate,
                slow_duration,
                stop,
            } => {
                if let Some(enemy) = self.enemies.get_mut(target) {
                    let multiplier = enemy.apply_slow(slow_rate, slow_duration, now);
                    out_events.push(Event::EnemySlowed {
                        enemy: target,
                        multiplier,
                        duration: slow_duration,
                    });
                    if let Some(duration) = stop {
                        enemy.stop_for(duration, now);
                        out_events.push(Event::EnemyStopped {
                            enemy: target,
                            duration,
                        });
                    }
                }
                let _ = self.damage_enemy(target, damage, out_events);
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.game_over && command != Command::Restart {
        reject_after_game_over(command, out_events);
        return;
    }

    match command {
        Command::Tick { dt } => {
            world.now = world.now.saturating_add(dt);
            if world.advance_enemies(dt, out_events) {
                return;
            }
            world.resolve_explosions(out_events);
            world.run_due_timers(out_events);
            world.poll_abilities(out_events);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::Restart => {
            *world = World::new(world.config.clone());
            info!("world restarted");
            out_events.push(Event::Restarted);
            out_events.push(Event::GoldChanged {
                gold: world.economy.gold(),
            });
            out_events.push(Event::SpawnCostChanged {
                cost: world.economy.spawn_cost(),
            });
            out_events.push(Event::PlayerHealthChanged {
                health: world.economy.player_health(),
            });
        }
        Command::BeginWave { wave, boss } => {
            world.wave = wave;
            info!(wave, boss, "wave started");
            out_events.push(Event::WaveStarted { wave, boss });
        }
        Command::SpawnEnemy {
            grade,
            spawn_point,
            wave,
        } => match world.spawn_enemy(grade, spawn_point, wave) {
            Ok((enemy, position, health)) => out_events.push(Event::EnemySpawned {
                enemy,
                grade,
                position,
                health,
            }),
            Err(reason) => {
                warn!(grade = grade.get(), spawn_point, %reason, "enemy spawn skipped");
                out_events.push(Event::EnemySpawnSkipped { grade, reason });
            }
        },
        Command::ReportBossTimer { remaining } => {
            world.boss_timer = remaining;
            out_events.push(Event::BossTimerUpdated { remaining });
        }
        Command::AwardGold { amount } => {
            world.economy.add_gold(amount);
            out_events.push(Event::GoldChanged {
                gold: world.economy.gold(),
            });
        }
        Command::SpawnPiece { cell, element } => match world.spawn_piece(cell, element) {
            Ok(piece) => {
                out_events.push(Event::PieceSpawned {
                    piece,
                    cell,
                    element,
                    grade: Grade::PAWN,
                });
                out_events.push(Event::GoldChanged {
                    gold: world.economy.gold(),
                });
                out_events.push(Event::SpawnCostChanged {
                    cost: world.economy.spawn_cost(),
                });
            }
            Err(reason) => {
                warn!(?cell, %reason, "piece spawn rejected");
                out_events.push(Event::PieceSpawnRejected { cell, reason });
            }
        },
        Command::MovePiece { piece, from, to } => match world.move_piece(piece, from, to) {
            Ok(position) => out_events.push(Event::PieceMoved {
                piece,
                from,
                to,
                position,
            }),
            Err(reason) => {
                warn!(?piece, ?to, %reason, "move rejected");
                out_events.push(Event::MoveRejected { piece, to, reason });
            }
        },
        Command::MergePieces {
            dragged,
            from,
            to,
            element,
        } => match world.merge_pieces(dragged, from, to, element) {
            Ok(DropOutcome::Moved(position)) => out_events.push(Event::PieceMoved {
                piece: dragged,
                from,
                to,
                position,
            }),
            Ok(DropOutcome::Merged {
                consumed,
                piece,
                grade,
            }) => out_events.push(Event::PiecesMerged {
                consumed,
                piece,
                cell: to,
                grade,
                element,
            }),
            Err(reason) => {
                warn!(?dragged, ?to, %reason, "merge rejected");
                out_events.push(Event::MergeRejected {
                    dragged,
                    to,
                    reason,
                });
            }
        },
        Command::RemovePiece { piece } => match world.take_piece(piece) {
            Some(removed) => out_events.push(Event::PieceRemoved {
                piece,
                cell: removed.cell,
            }),
            None => debug!(?piece, "removal of a missing piece"),
        },
        Command::UpgradeElement { element } => match world.economy.upgrade(element) {
            Ok(level) => {
                info!(?element, level, "element upgraded");
                out_events.push(Event::ElementUpgraded { element, level });
                out_events.push(Event::GoldChanged {
                    gold: world.economy.gold(),
                });
            }
            Err(reason) => {
                warn!(?element, %reason, "upgrade rejected");
                out_events.push(Event::UpgradeRejected { element, reason });
            }
        },
        Command::AssignTarget { piece, enemy } => {
            if !world.enemies.contains_key(enemy) {
                debug!(?enemy, "target is gone");
                return;
            }
            if let Some(state) = world.pieces.get_mut(piece) {
                state.target = Some(enemy);
                out_events.push(Event::TargetAcquired { piece, enemy });
            }
        }
        Command::DeferTargetScan { piece } => {
            let delay = world.config.combat.rescan_delay();
            if let Some(state) = world.pieces.get_mut(piece) {
                state.defer_scan(world.now, delay);
            }
        }
        Command::ResolveAttack {
            piece,
            target,
            effect,
            cooldown,
        } => world.resolve_attack(piece, target, effect, cooldown, out_events),
        Command::DisruptPieces { enemy, pieces } => {
            let now = world.now;
            let duration = world.config.enemies.disrupt_duration();
            let lockout = world.config.combat.hit_lockout();
            let affected: Vec<PieceId> = pieces
                .into_iter()
                .filter(|id| match world.pieces.get_mut(*id) {
                    Some(state) => {
                        state.disrupt(now, duration, lockout);
                        true
                    }
                    None => false,
                })
                .collect();
            if !affected.is_empty() {
                out_events.push(Event::PiecesDisrupted {
                    enemy,
                    pieces: affected,
                    duration,
                });
            }
        }
    }
}

fn reject_after_game_over(command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SpawnEnemy { grade, .. } => out_events.push(Event::EnemySpawnSkipped {
            grade,
            reason: SpawnError::GameOver,
        }),
        Command::SpawnPiece { cell, .. } => out_events.push(Event::PieceSpawnRejected {
            cell,
            reason: SpawnError::GameOver,
        }),
        other => debug!(command = ?other, "command ignored after game over"),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use pawn_defence_core::{
        CellCoord, Element, EnemyView, OccupancyView, PieceView, SimulationConfig, UpgradeLevels,
        WorldPoint,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Configuration the world was built from.
    #[must_use]
    pub fn config(world: &World) -> &SimulationConfig {
        &world.config
    }

    /// Simulated time elapsed since the world was created.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.now
    }

    /// Number of the wave announced last, zero before the first wave.
    #[must_use]
    pub fn wave(world: &World) -> u32 {
        world.wave
    }

    /// Remaining boss wave time last reported by the scheduler.
    #[must_use]
    pub fn boss_timer(world: &World) -> Option<Duration> {
        world.boss_timer
    }

    /// Reports whether player health reached zero.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.game_over
    }

    /// Gold currently held.
    #[must_use]
    pub fn gold(world: &World) -> u32 {
        world.economy.gold()
    }

    /// Price of the next piece spawn.
    #[must_use]
    pub fn spawn_cost(world: &World) -> u32 {
        world.economy.spawn_cost()
    }

    /// Remaining player health.
    #[must_use]
    pub fn player_health(world: &World) -> u32 {
        world.economy.player_health()
    }

    /// Upgrade level of every element.
    #[must_use]
    pub fn upgrade_levels(world: &World) -> UpgradeLevels {
        world.economy.levels()
    }

    /// Price of the next upgrade of the element.
    #[must_use]
    pub fn upgrade_cost(world: &World, element: Element) -> u32 {
        world.economy.upgrade_cost(element)
    }

    /// Number of enemies still on the path.
    #[must_use]
    pub fn live_enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Number of deferred tasks waiting in the timer table.
    #[must_use]
    pub fn pending_tasks(world: &World) -> usize {
        world.timers.len()
    }

    /// Centre of a cell in world units.
    #[must_use]
    pub fn cell_center(world: &World, cell: CellCoord) -> WorldPoint {
        world.cell_center(cell)
    }

    /// Captures a read-only view of the live enemies in arena order.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .enemies
                .iter()
                .map(|(id, enemy)| enemy.snapshot(id))
                .collect(),
        )
    }

    /// Captures a read-only view of the placed pieces.
    #[must_use]
    pub fn piece_view(world: &World) -> PieceView {
        PieceView::from_snapshots(
            world
                .pieces
                .iter()
                .map(|(id, piece)| piece.snapshot(id, world.cell_center(piece.cell), world.now))
                .collect(),
        )
    }

    /// Exposes a read-only view of grid occupancy.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        world.grid.view()
    }
}
