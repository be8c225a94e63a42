#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns ready, targeted pieces into resolved attacks.
//!
//! Damage follows `base * ratio * (1 + max(0, level - 1) * bonus) * king`
//! where `king = 1 + min(other kings on the grid, cap)`. The same king
//! multiplier shortens the cooldown. Every few upgrade levels form a tier
//! that strengthens the secondary parameters of the elemental effect.
//! Random rolls are made here so the world applies attacks verbatim.

use std::time::Duration;

use pawn_defence_core::{
    duration_from_secs as seconds, AttackEffect, CombatConfig, Command, Element, ElementTuning,
    EnemyView, PieceSnapshot, PieceView, UpgradeLevels,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

const MIN_WIND_COOLDOWN: Duration = Duration::from_millis(10);

/// Tower combat system that queues attack commands for ready pieces.
#[derive(Debug)]
pub struct TowerCombat {
    combat: CombatConfig,
    elements: ElementTuning,
    rng: ChaCha8Rng,
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a combat system whose rolls are drawn from `seed`.
    #[must_use]
    pub fn new(combat: CombatConfig, elements: ElementTuning, seed: u64) -> Self {
        Self {
            combat,
            elements,
            rng: ChaCha8Rng::seed_from_u64(seed),
            scratch: Vec::new(),
        }
    }

    /// Emits `Command::ResolveAttack` entries for pieces ready to attack.
    ///
    /// A piece attacks when its cooldown elapsed, it is not locked out, and
    /// its target is alive and inside its range.
    pub fn handle(
        &mut self,
        pieces: &PieceView,
        enemies: &EnemyView,
        levels: &UpgradeLevels,
        out: &mut Vec<Command>,
    ) {
        if pieces.is_empty() || enemies.is_empty() {
            return;
        }

        let kings = pieces
            .iter()
            .filter(|piece| piece.grade.get() == self.combat.king_grade)
            .count() as u32;

        self.scratch.clear();
        for piece in pieces.iter() {
            if !piece.ready || piece.locked_out {
                continue;
            }
            let Some(target) = piece.target else {
                continue;
            };
            let Some(enemy) = enemies.get(target) else {
                continue;
            };
            if enemy.position.distance(piece.position) > piece.stats.range {
                continue;
            }

            let allied_kings = if piece.grade.get() == self.combat.king_grade {
                kings.saturating_sub(1)
            } else {
                kings
            };
            let king = self.king_multiplier(allied_kings);
            let level = levels.level(piece.element);
            let (effect, cooldown) = self.resolve(piece, level, king);
            trace!(piece = ?piece.id, element = ?piece.element, level, "attack resolved");
            self.scratch.push(Command::ResolveAttack {
                piece: piece.id,
                target,
                effect,
                cooldown,
            });
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }

    fn king_multiplier(&self, allied_kings: u32) -> f32 {
        1.0 + allied_kings.min(self.combat.max_king_bonus) as f32
    }

    fn tier(&self, level: u32) -> u32 {
        level.saturating_sub(1) / self.combat.levels_per_tier.max(1)
    }

    fn resolve(
        &mut self,
        piece: &PieceSnapshot,
        level: u32,
        king: f32,
    ) -> (AttackEffect, Duration) {
        let tuning = &self.elements;
        let level_bonus = 1.0 + level.saturating_sub(1) as f32 * self.combat.level_damage_bonus;
        let damage = piece.stats.damage * tuning.ratio(piece.element) * level_bonus * king;
        let tier = self.tier(level);
        let tier_f = tier as f32;
        let delay_secs = piece.stats.attack_delay().as_secs_f32() / king;

        let effect = match piece.element {
            Element::Electric => AttackEffect::Chain {
                damage: round(damage),
                max_targets: tuning.electric_target_count.saturating_add(tier),
                radius: piece.stats.range,
                hop_delay: seconds(tuning.chain_hop_secs),
            },
            Element::Poison => AttackEffect::Poison {
                damage: round(damage),
                tick_damage: round(damage * tuning.poison_ratio).max(1),
                ticks: tuning.poison_ticks.saturating_add(tier),
                period: seconds(tuning.poison_period_secs),
            },
            Element::Explosion => AttackEffect::Explosion {
                radius: tuning.explosion_range + 0.5 * tier_f,
                damage: round(damage * (tuning.explosion_ratio + 0.05 * tier_f)),
                lifetime: seconds(tuning.explosion_lifetime_secs),
            },
            Element::Wind => {
                let speed = tuning.wind_attack_speed + 0.2 * tier_f;
                let cooldown = if speed.is_finite() && speed > 0.0 {
                    seconds(delay_secs / speed).max(MIN_WIND_COOLDOWN)
                } else {
                    seconds(delay_secs)
                };
                return (
                    AttackEffect::Wind {
                        damage: round(damage),
                    },
                    cooldown,
                );
            }
            Element::Death => {
                let chance = tuning.death_probability + 0.005 * tier_f;
                AttackEffect::Death {
                    lethal: self.rng.gen::<f32>() < chance,
                    damage: round(damage * 0.5),
                }
            }
            Element::Ice => {
                let chance = tuning.ice_stop_probability + 0.01 * tier_f;
                let stop = (self.rng.gen::<f32>() < chance).then(|| seconds(tuning.ice_stop_secs));
                AttackEffect::Ice {
                    damage: round(damage),
                    slow_rate: tuning.ice_slow_rate,
                    slow_duration: seconds(tuning.ice_slow_secs),
                    stop,
                }
            }
        };
        (effect, seconds(delay_secs))
    }
}

fn round(value: f32) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    }
}
