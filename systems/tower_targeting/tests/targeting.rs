use std::time::Duration;

use pawn_defence_core::{CellCoord, Command, Element, Event, Grade};
use pawn_defence_system_tower_targeting::TowerTargeting;
use pawn_defence_world::{self as world, query, World};

fn pump(world: &mut World, targeting: &mut TowerTargeting) -> Vec<Event> {
    let mut commands = Vec::new();
    targeting.handle(
        &query::piece_view(world),
        &query::enemy_view(world),
        &mut commands,
    );
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn tick(world: &mut World) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(100),
        },
        &mut events,
    );
}

#[test]
fn piece_acquires_an_enemy_once_it_walks_into_range() {
    let mut world = World::default();
    let mut targeting = TowerTargeting::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnPiece {
            cell: CellCoord::new(1, 3),
            element: Element::Ice,
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SpawnEnemy {
            grade: Grade::PAWN,
            spawn_point: 0,
            wave: 1,
        },
        &mut events,
    );
    let piece = query::piece_view(&world).iter().next().expect("piece").id;
    let enemy = query::enemy_view(&world).iter().next().expect("enemy").id;

    assert!(pump(&mut world, &mut targeting).is_empty());
    assert!(!query::piece_view(&world).get(piece).expect("piece").can_scan);

    let mut acquired = false;
    for _ in 0..60 {
        tick(&mut world);
        if pump(&mut world, &mut targeting).contains(&Event::TargetAcquired { piece, enemy }) {
            acquired = true;
            break;
        }
    }
    assert!(acquired, "enemy never entered range");

    let snapshot = *query::piece_view(&world).get(piece).expect("piece");
    assert_eq!(snapshot.target, Some(enemy));
    assert!(pump(&mut world, &mut targeting).is_empty());
}
