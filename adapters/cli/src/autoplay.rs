use std::collections::BTreeMap;

use pawn_defence_core::{CellCoord, Element, Grade, PieceId};
use pawn_defence_system_placement::{PieceDrop, PlacementInput};
use pawn_defence_world::{query, World};

/// Scripted player that spends gold as soon as it can.
///
/// Priority: spawn while affordable, then merge any equal-grade pair, then
/// upgrade the cheapest element present on the grid.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Autoplay {
    upgrades: bool,
}

impl Autoplay {
    pub(crate) fn new(upgrades: bool) -> Self {
        Self { upgrades }
    }

    pub(crate) fn decide(&self, world: &World) -> PlacementInput {
        if query::is_game_over(world) {
            return PlacementInput::default();
        }

        let gold = query::gold(world);
        if gold >= query::spawn_cost(world) && !query::occupancy_view(world).free_cells().is_empty()
        {
            return PlacementInput::spawn();
        }

        if let Some(drop) = merge_candidate(world) {
            return PlacementInput {
                drop: Some(drop),
                ..PlacementInput::default()
            };
        }

        if self.upgrades {
            if let Some(element) = cheapest_upgrade(world) {
                if query::upgrade_cost(world, element) <= gold {
                    return PlacementInput {
                        upgrade: Some(element),
                        ..PlacementInput::default()
                    };
                }
            }
        }

        PlacementInput::default()
    }
}

fn merge_candidate(world: &World) -> Option<PieceDrop> {
    let max_grade = query::config(world).grid.max_grade();
    let mut first_of_grade: BTreeMap<Grade, (PieceId, CellCoord)> = BTreeMap::new();
    for piece in query::piece_view(world).iter() {
        if piece.grade >= max_grade {
            continue;
        }
        if let Some((_, cell)) = first_of_grade.get(&piece.grade) {
            return Some(PieceDrop {
                piece: piece.id,
                from: piece.cell,
                to: *cell,
            });
        }
        let _ = first_of_grade.insert(piece.grade, (piece.id, piece.cell));
    }
    None
}

fn cheapest_upgrade(world: &World) -> Option<Element> {
    let view = query::piece_view(world);
    Element::ALL
        .into_iter()
        .filter(|element| view.iter().any(|piece| piece.element == *element))
        .min_by_key(|element| query::upgrade_cost(world, *element))
}
