#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduler that composes, spawns and closes enemy waves.
//!
//! The scheduler runs the loop `compose → spawn → await end → reward` on the
//! simulated clock carried by [`Event::TimeAdvanced`]. Every transition is
//! expressed as a [`Command`]; the world stays the only owner of enemies.

use std::{collections::BTreeMap, collections::VecDeque, time::Duration};

use pawn_defence_core::{Command, Event, Grade, WaveConfig};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Lowest grade reserved for boss waves.
const BOSS_ONLY_GRADE: u8 = 4;

/// Pure system that drives the wave loop.
#[derive(Debug)]
pub struct WaveScheduler {
    config: WaveConfig,
    seed: u64,
    spawn_points: usize,
    wave: u32,
    phase: Phase,
}

#[derive(Debug)]
enum Phase {
    Compose,
    Spawning {
        queue: VecDeque<Grade>,
        wait: Duration,
        rng: ChaCha8Rng,
        boss: bool,
    },
    Awaiting {
        elapsed: Duration,
        wait: Duration,
        boss: bool,
    },
    Reward,
}

impl WaveScheduler {
    /// Creates a scheduler that starts at wave one.
    ///
    /// `spawn_points` is the number of configured spawn points; each enemy
    /// picks one uniformly at random.
    #[must_use]
    pub fn new(config: WaveConfig, seed: u64, spawn_points: usize) -> Self {
        Self {
            config,
            seed,
            spawn_points,
            wave: 1,
            phase: Phase::Compose,
        }
    }

    /// Wave currently being composed, spawned or awaited.
    #[must_use]
    pub fn wave(&self) -> u32 {
        self.wave
    }

    /// Consumes world events and emits wave commands.
    ///
    /// `live_enemies` is the number of enemies alive in the world before the
    /// commands emitted by this call are applied.
    pub fn handle(&mut self, events: &[Event], live_enemies: usize, out: &mut Vec<Command>) {
        let mut pending_spawns = 0;
        for event in events {
            match event {
                Event::Restarted => {
                    debug!("wave scheduler reset");
                    self.wave = 1;
                    self.phase = Phase::Compose;
                    pending_spawns = 0;
                }
                Event::TimeAdvanced { dt } => {
                    self.advance(*dt, live_enemies, &mut pending_spawns, out);
                }
                _ => {}
            }
        }
    }

    fn advance(
        &mut self,
        dt: Duration,
        live_enemies: usize,
        pending_spawns: &mut usize,
        out: &mut Vec<Command>,
    ) {
        let mut budget = dt;
        loop {
            match &mut self.phase {
                Phase::Compose => self.begin_wave(out),
                Phase::Spawning {
                    queue,
                    wait,
                    rng,
                    boss,
                } => {
                    if *wait > budget {
                        *wait -= budget;
                        return;
                    }
                    budget -= *wait;

                    let Some(grade) = queue.pop_front() else {
                        self.phase = Phase::Awaiting {
                            elapsed: Duration::ZERO,
                            wait: Duration::ZERO,
                            boss: *boss,
                        };
                        continue;
                    };
                    let spawn_point = if self.spawn_points > 0 {
                        rng.gen_range(0..self.spawn_points)
                    } else {
                        0
                    };
                    out.push(Command::SpawnEnemy {
                        grade,
                        spawn_point,
                        wave: self.wave,
                    });
                    *pending_spawns += 1;
                    *wait = self.config.spawn_interval();
                }
                Phase::Awaiting {
                    elapsed,
                    wait,
                    boss,
                } => {
                    if *wait > budget {
                        *wait -= budget;
                        return;
                    }
                    budget -= *wait;

                    let boss = *boss;
                    let max_delay = self.config.end_delay(boss);
                    let cleared = live_enemies + *pending_spawns == 0;
                    if cleared || *elapsed >= max_delay {
                        if boss {
                            out.push(Command::ReportBossTimer { remaining: None });
                        }
                        info!(wave = self.wave, cleared, "wave ended");
                        self.phase = Phase::Reward;
                        continue;
                    }

                    if boss {
                        out.push(Command::ReportBossTimer {
                            remaining: Some(max_delay.saturating_sub(*elapsed)),
                        });
                    }
                    let poll = self.config.poll_interval().max(MIN_POLL_INTERVAL);
                    *elapsed = elapsed.saturating_add(poll);
                    *wait = poll;
                }
                Phase::Reward => {
                    out.push(Command::AwardGold {
                        amount: self.wave.saturating_mul(self.config.reward_per_wave),
                    });
                    self.wave = self.wave.saturating_add(1);
                    self.phase = Phase::Compose;
                }
            }
        }
    }

    fn begin_wave(&mut self, out: &mut Vec<Command>) {
        let wave = self.wave;
        let boss = is_boss_wave(wave, &self.config);
        let composition = compose_wave(wave, &self.config);

        let mut queue: Vec<Grade> = composition
            .iter()
            .flat_map(|(grade, count)| std::iter::repeat(*grade).take(*count as usize))
            .collect();
        let mut rng = ChaCha8Rng::seed_from_u64(derive_wave_seed(self.seed, wave));
        queue.shuffle(&mut rng);

        info!(wave, boss, enemies = queue.len(), "wave started");
        out.push(Command::BeginWave { wave, boss });
        self.phase = Phase::Spawning {
            queue: queue.into(),
            wait: Duration::ZERO,
            rng,
            boss,
        };
    }
}

/// Reports whether the wave is a boss wave.
#[must_use]
pub fn is_boss_wave(wave: u32, config: &WaveConfig) -> bool {
    config.boss_every > 0 && wave % config.boss_every == 0
}

/// Grade ratios of a non-boss wave, determined by its position in the cycle.
#[must_use]
pub fn wave_ratios(wave: u32) -> Vec<(Grade, f32)> {
    let cycle_wave = (wave.max(1) - 1) % 20 + 1;
    let ratios: &[f32] = match cycle_wave {
        1..=5 => &[1.0],
        6..=10 => &[0.8, 0.2],
        11..=15 => &[0.7, 0.15, 0.075, 0.075],
        _ => &[0.6, 0.2, 0.1, 0.1],
    };
    ratios
        .iter()
        .enumerate()
        .map(|(grade, ratio)| (Grade::new(grade as u8), *ratio))
        .collect()
}

/// Number of enemies per grade spawned in the wave.
#[must_use]
pub fn compose_wave(wave: u32, config: &WaveConfig) -> BTreeMap<Grade, u32> {
    let mut composition = BTreeMap::new();
    if is_boss_wave(wave, config) {
        let boss = if (wave / config.boss_every) % 2 == 1 {
            Grade::QUEEN
        } else {
            Grade::KING
        };
        let _ = composition.insert(boss, 1);
        return composition;
    }

    let cost = config.base_cost + wave as f32 * config.increase_per_wave;
    for (grade, ratio) in wave_ratios(wave) {
        if grade.get() >= BOSS_ONLY_GRADE || ratio <= 0.0 {
            continue;
        }
        let unit_cost = config.grade_costs[grade.index()];
        let affordable = if unit_cost > 0.0 {
            (cost * ratio / unit_cost).floor() as u32
        } else {
            0
        };
        let _ = composition.insert(grade, affordable.max(1));
    }
    composition
}

fn derive_wave_seed(global_seed: u64, wave: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update(wave.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratios_sum_to_one_without_boss_grades() {
        for wave in 1..=200 {
            let ratios = wave_ratios(wave);
            let total: f32 = ratios.iter().map(|(_, ratio)| ratio).sum();
            assert!((total - 1.0).abs() < 1e-5, "wave {wave} sums to {total}");
            assert!(ratios.iter().all(|(grade, _)| grade.get() < 4));
        }
    }

    #[test]
    fn early_waves_spawn_pawns_only() {
        let config = WaveConfig::default();
        let first = compose_wave(1, &config);
        assert_eq!(first.into_iter().collect::<Vec<_>>(), vec![(Grade::PAWN, 4)]);
    }

    #[test]
    fn every_grade_with_a_ratio_spawns_at_least_once() {
        let config = WaveConfig::default();
        let composition = compose_wave(11, &config);
        assert_eq!(
            composition.into_iter().collect::<Vec<_>>(),
            vec![
                (Grade::new(0), 9),
                (Grade::new(1), 1),
                (Grade::new(2), 1),
                (Grade::new(3), 1),
            ]
        );
    }

    #[test]
    fn wave_seeds_differ_per_wave() {
        assert_ne!(derive_wave_seed(7, 1), derive_wave_seed(7, 2));
        assert_eq!(derive_wave_seed(7, 3), derive_wave_seed(7, 3));
    }
}
