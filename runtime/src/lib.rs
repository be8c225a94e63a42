#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-step driver that pumps the world and every system in order.
//!
//! One step applies `Command::Tick` and then runs the wave scheduler, enemy
//! abilities, targeting, combat and placement, applying each system's
//! commands before the next system reads the world. Enemy movement therefore
//! always lands before targeting reads positions.

use std::time::Duration;

use pawn_defence_core::{Command, Event, SimulationConfig};
use pawn_defence_system_enemy_abilities::EnemyAbilities;
use pawn_defence_system_placement::{Placement, PlacementInput};
use pawn_defence_system_tower_combat::TowerCombat;
use pawn_defence_system_tower_targeting::TowerTargeting;
use pawn_defence_system_wave_scheduler::WaveScheduler;
use pawn_defence_world::{self as world, query, World};
use tracing::trace;

const ABILITY_SALT: u64 = 0x9e37_79b9_7f4a_7c15;
const COMBAT_SALT: u64 = 0xc2b2_ae3d_27d4_eb4f;
const PLACEMENT_SALT: u64 = 0x1656_67b1_9e37_79f9;

/// Receives every event batch produced by the simulation.
///
/// Rendering, audio and UI layers implement this to react to world changes
/// without reaching into world state.
pub trait Presenter {
    /// Presents the events emitted by one step, stamped with the world clock.
    fn present(&mut self, clock: Duration, events: &[Event]);
}

impl Presenter for Vec<Event> {
    fn present(&mut self, _clock: Duration, events: &[Event]) {
        self.extend_from_slice(events);
    }
}

/// World plus the systems that drive it.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    scheduler: WaveScheduler,
    abilities: EnemyAbilities,
    targeting: TowerTargeting,
    combat: TowerCombat,
    placement: Placement,
}

impl Simulation {
    /// Builds the world and seeds every system from `config.seed`.
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        let seed = config.seed;
        let scheduler = WaveScheduler::new(
            config.waves.clone(),
            seed,
            config.path.spawn_points.len(),
        );
        let abilities = EnemyAbilities::new(config.enemies.clone(), seed ^ ABILITY_SALT);
        let combat = TowerCombat::new(
            config.combat.clone(),
            config.elements.clone(),
            seed ^ COMBAT_SALT,
        );
        Self {
            world: World::new(config),
            scheduler,
            abilities,
            targeting: TowerTargeting::new(),
            combat,
            placement: Placement::new(seed ^ PLACEMENT_SALT),
        }
    }

    /// Read-only access for queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Current wave of the scheduler.
    #[must_use]
    pub fn wave(&self) -> u32 {
        self.scheduler.wave()
    }

    /// Advances the simulation by `dt` and returns every event produced.
    pub fn step(&mut self, dt: Duration, input: &PlacementInput) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        let mut commands = Vec::new();
        self.scheduler.handle(
            &events,
            query::live_enemy_count(&self.world),
            &mut commands,
        );
        self.flush(&mut commands, &mut events);

        self.abilities
            .handle(&events, &query::occupancy_view(&self.world), &mut commands);
        self.flush(&mut commands, &mut events);

        self.targeting.handle(
            &query::piece_view(&self.world),
            &query::enemy_view(&self.world),
            &mut commands,
        );
        self.flush(&mut commands, &mut events);

        self.combat.handle(
            &query::piece_view(&self.world),
            &query::enemy_view(&self.world),
            &query::upgrade_levels(&self.world),
            &mut commands,
        );
        self.flush(&mut commands, &mut events);

        self.placement.handle(
            &events,
            input,
            &query::occupancy_view(&self.world),
            &mut commands,
        );
        self.flush(&mut commands, &mut events);

        trace!(events = events.len(), "step complete");
        events
    }

    /// Steps the simulation and forwards the events to `presenter`.
    pub fn step_presented<P: Presenter>(
        &mut self,
        dt: Duration,
        input: &PlacementInput,
        presenter: &mut P,
    ) {
        let events = self.step(dt, input);
        presenter.present(query::clock(&self.world), &events);
    }

    /// Rebuilds the world from its configuration and resets the systems.
    pub fn restart(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Restart, &mut events);

        let mut commands = Vec::new();
        self.scheduler.handle(&events, 0, &mut commands);
        self.placement.handle(
            &events,
            &PlacementInput::default(),
            &query::occupancy_view(&self.world),
            &mut commands,
        );
        self.flush(&mut commands, &mut events);
        events
    }

    /// Applies an adapter-issued command directly, bypassing the systems.
    pub fn apply(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        events
    }

    fn flush(&mut self, commands: &mut Vec<Command>, events: &mut Vec<Event>) {
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_opens_the_first_wave() {
        let mut simulation = Simulation::new(SimulationConfig::default());
        let events = simulation.step(Duration::from_millis(100), &PlacementInput::default());

        assert!(events.contains(&Event::WaveStarted {
            wave: 1,
            boss: false
        }));
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::EnemySpawned { .. })));
        assert_eq!(query::live_enemy_count(simulation.world()), 1);
    }

    #[test]
    fn presenter_receives_each_batch() {
        let mut simulation = Simulation::new(SimulationConfig::default());
        let mut presented = Vec::new();
        simulation.step_presented(
            Duration::from_millis(100),
            &PlacementInput::default(),
            &mut presented,
        );

        assert_eq!(
            presented.first(),
            Some(&Event::TimeAdvanced {
                dt: Duration::from_millis(100)
            })
        );
    }
}
