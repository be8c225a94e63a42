use std::time::Duration;

use pawn_defence_core::{EnemyId, EnemySnapshot, EnemyStats, Grade, PathConfig, WorldPoint};

const FINAL_SEGMENT: usize = 2;

/// Outcome of applying damage to an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum DamageOutcome {
    Survived { health: u32, fraction: f32 },
    Killed,
}

/// Outcome of advancing an enemy along its route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Advance {
    Walking,
    Arrived,
}

#[derive(Clone, Copy, Debug)]
struct Slow {
    multiplier: f32,
    until: Duration,
}

/// Enemy walking the three-waypoint route.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    grade: Grade,
    position: WorldPoint,
    health: u32,
    max_health: u32,
    speed: f32,
    route: [WorldPoint; PathConfig::WAYPOINT_COUNT],
    path_index: usize,
    vertical: f32,
    slow: Option<Slow>,
    stopped_until: Option<Duration>,
    ability_at: Option<Duration>,
}

impl Enemy {
    pub(crate) fn spawn(
        grade: Grade,
        stats: EnemyStats,
        wave: u32,
        position: WorldPoint,
        route: [WorldPoint; PathConfig::WAYPOINT_COUNT],
        ability_at: Option<Duration>,
    ) -> Self {
        let max_health = stats.health.saturating_mul(wave.max(1));
        let vertical = if route[0].y < position.y { -1.0 } else { 1.0 };
        Self {
            grade,
            position,
            health: max_health,
            max_health,
            speed: stats.speed,
            route,
            path_index: 0,
            vertical,
            slow: None,
            stopped_until: None,
            ability_at,
        }
    }

    pub(crate) fn grade(&self) -> Grade {
        self.grade
    }

    pub(crate) fn position(&self) -> WorldPoint {
        self.position
    }

    pub(crate) fn health(&self) -> u32 {
        self.health
    }

    /// Unit direction of the current segment.
    fn direction(&self) -> WorldPoint {
        match self.path_index {
            0 => WorldPoint::new(0.0, self.vertical),
            1 => {
                if self.route[1].x >= self.position.x {
                    WorldPoint::new(1.0, 0.0)
                } else {
                    WorldPoint::new(-1.0, 0.0)
                }
            }
            _ => WorldPoint::new(0.0, -self.vertical),
        }
    }

    /// Current velocity including slow and stop effects.
    pub(crate) fn velocity(&self, now: Duration) -> WorldPoint {
        if self.stopped_until.is_some_and(|until| now < until) {
            return WorldPoint::default();
        }
        let multiplier = match self.slow {
            Some(slow) if now < slow.until => slow.multiplier,
            _ => 1.0,
        };
        let direction = self.direction();
        let scale = self.speed * multiplier;
        WorldPoint::new(direction.x * scale, direction.y * scale)
    }

    /// Moves the enemy for `dt` and reports whether it reached the goal.
    pub(crate) fn advance(&mut self, dt: Duration, now: Duration, threshold: f32) -> Advance {
        if self.slow.is_some_and(|slow| now >= slow.until) {
            self.slow = None;
        }
        if self.stopped_until.is_some_and(|until| now >= until) {
            self.stopped_until = None;
        }

        let velocity = self.velocity(now);
        let seconds = dt.as_secs_f32();
        let waypoint = self.route[self.path_index];
        let next = WorldPoint::new(
            self.position.x + velocity.x * seconds,
            self.position.y + velocity.y * seconds,
        );

        let horizontal = self.path_index == 1;
        let moved = next != self.position;
        let crossed = moved
            && if horizontal {
                crossed_axis(self.position.x, next.x, waypoint.x)
            } else {
                crossed_axis(self.position.y, next.y, waypoint.y)
            };

        self.position = next;
        if !crossed && self.position.distance(waypoint) >= threshold {
            return Advance::Walking;
        }

        if horizontal {
            self.position.x = waypoint.x;
        } else {
            self.position.y = waypoint.y;
        }
        if self.path_index == FINAL_SEGMENT {
            return Advance::Arrived;
        }
        self.path_index += 1;
        Advance::Walking
    }

    /// Path length left to the goal.
    pub(crate) fn remaining_distance(&self) -> f32 {
        let to_waypoint = self.position.distance(self.route[self.path_index]);
        let rest: f32 = self.route[self.path_index..]
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .sum();
        to_waypoint + rest
    }

    pub(crate) fn damage(&mut self, amount: u32) -> DamageOutcome {
        if amount >= self.health {
            self.health = 0;
            return DamageOutcome::Killed;
        }
        self.health -= amount;
        DamageOutcome::Survived {
            health: self.health,
            fraction: self.health as f32 / self.max_health.max(1) as f32,
        }
    }

    /// Replaces any active slow and returns the applied multiplier.
    pub(crate) fn apply_slow(&mut self, rate: f32, duration: Duration, now: Duration) -> f32 {
        let multiplier = 1.0 - rate.clamp(0.0, 1.0);
        self.slow = Some(Slow {
            multiplier,
            until: now.saturating_add(duration),
        });
        multiplier
    }

    pub(crate) fn stop_for(&mut self, duration: Duration, now: Duration) {
        self.stopped_until = Some(now.saturating_add(duration));
    }

    /// Reports a due ability activation and re-arms the timer.
    pub(crate) fn poll_ability(&mut self, now: Duration, period: Duration) -> bool {
        match self.ability_at {
            Some(at) if now >= at => {
                self.ability_at = Some(now.saturating_add(period));
                true
            }
            _ => false,
        }
    }

    pub(crate) fn snapshot(&self, id: EnemyId) -> EnemySnapshot {
        EnemySnapshot {
            id,
            grade: self.grade,
            position: self.position,
            health: self.health,
            max_health: self.max_health,
            path_index: self.path_index,
            remaining_distance: self.remaining_distance(),
        }
    }
}

fn crossed_axis(from: f32, to: f32, target: f32) -> bool {
    (from <= target && to >= target) || (from >= target && to <= target)
}
