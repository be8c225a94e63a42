use std::{fmt, time::Duration};

use pawn_defence_core::{Event, Grade};
use pawn_defence_runtime::Presenter;

/// Tallies the event stream of a headless run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Summary {
    clock: Duration,
    wave: u32,
    kills: u32,
    bounty: u32,
    leaks: u32,
    spawned: u32,
    merges: u32,
    upgrades: u32,
    best_grade: Option<Grade>,
    gold: u32,
    health: Option<u32>,
    lost_at_wave: Option<u32>,
}

impl Summary {
    pub(crate) fn is_lost(&self) -> bool {
        self.lost_at_wave.is_some()
    }

    fn record_grade(&mut self, grade: Grade) {
        if self.best_grade.map_or(true, |best| grade > best) {
            self.best_grade = Some(grade);
        }
    }
}

impl Presenter for Summary {
    fn present(&mut self, clock: Duration, events: &[Event]) {
        self.clock = clock;
        for event in events {
            match event {
                Event::WaveStarted { wave, .. } => self.wave = *wave,
                Event::EnemyKilled { reward, .. } => {
                    self.kills += 1;
                    self.bounty += reward;
                }
                Event::EnemyReachedGoal { .. } => self.leaks += 1,
                Event::PieceSpawned { grade, .. } => {
                    self.spawned += 1;
                    self.record_grade(*grade);
                }
                Event::PiecesMerged { grade, .. } => {
                    self.merges += 1;
                    self.record_grade(*grade);
                }
                Event::ElementUpgraded { .. } => self.upgrades += 1,
                Event::GoldChanged { gold } => self.gold = *gold,
                Event::PlayerHealthChanged { health } => self.health = Some(*health),
                Event::GameOver { wave } => self.lost_at_wave = Some(*wave),
                _ => {}
            }
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "simulated {:.1}s, reached wave {}", self.clock.as_secs_f32(), self.wave)?;
        writeln!(
            f,
            "enemies killed: {} ({} gold), leaked: {}",
            self.kills, self.bounty, self.leaks
        )?;
        let best = self
            .best_grade
            .and_then(Grade::name)
            .unwrap_or("none");
        writeln!(
            f,
            "pieces spawned: {}, merges: {}, best grade: {best}, upgrades: {}",
            self.spawned, self.merges, self.upgrades
        )?;
        match self.health {
            Some(health) => writeln!(f, "gold: {}, health: {health}", self.gold)?,
            None => writeln!(f, "gold: {}", self.gold)?,
        }
        match self.lost_at_wave {
            Some(wave) => write!(f, "defeated during wave {wave}"),
            None => write!(f, "still standing"),
        }
    }
}
