#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure placement system that translates player intents into grid commands.
//!
//! Spawns land on a uniformly random free cell with a random element; the
//! world re-validates the cell and charges the spawn cost in the same step.

use pawn_defence_core::{CellCoord, Command, Element, Event, OccupancyView, PieceId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Piece released by the player over a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PieceDrop {
    /// Dragged piece.
    pub piece: PieceId,
    /// Cell the drag started from.
    pub from: CellCoord,
    /// Cell the piece was released over.
    pub to: CellCoord,
}

/// Player intents gathered by an adapter for one step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlacementInput {
    /// Player pressed the spawn button.
    pub spawn_requested: bool,
    /// Drag-and-drop released this step.
    pub drop: Option<PieceDrop>,
    /// Piece the player asked to remove.
    pub remove: Option<PieceId>,
    /// Element the player asked to upgrade.
    pub upgrade: Option<Element>,
}

impl PlacementInput {
    /// Input asking for a single spawn.
    #[must_use]
    pub fn spawn() -> Self {
        Self {
            spawn_requested: true,
            ..Self::default()
        }
    }

    /// Reports whether the input carries no intent.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        !self.spawn_requested
            && self.drop.is_none()
            && self.remove.is_none()
            && self.upgrade.is_none()
    }
}

/// Placement system holding the generator used for cells and elements.
#[derive(Debug)]
pub struct Placement {
    rng: ChaCha8Rng,
    frozen: bool,
}

impl Placement {
    /// Creates a placement system whose random picks are drawn from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            frozen: false,
        }
    }

    /// Consumes world events and player input to emit placement commands.
    ///
    /// Input is ignored between `Event::GameOver` and `Event::Restarted`.
    pub fn handle(
        &mut self,
        events: &[Event],
        input: &PlacementInput,
        occupancy: &OccupancyView<'_>,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::GameOver { .. } => self.frozen = true,
                Event::Restarted => self.frozen = false,
                _ => {}
            }
        }

        if self.frozen || input.is_idle() {
            return;
        }

        if let Some(drop) = input.drop {
            out.push(Command::MergePieces {
                dragged: drop.piece,
                from: drop.from,
                to: drop.to,
                element: self.random_element(),
            });
        }

        if let Some(piece) = input.remove {
            out.push(Command::RemovePiece { piece });
        }

        if input.spawn_requested {
            let free = occupancy.free_cells();
            if free.is_empty() {
                debug!("spawn requested on a full grid");
            } else {
                let cell = free[self.rng.gen_range(0..free.len())];
                out.push(Command::SpawnPiece {
                    cell,
                    element: self.random_element(),
                });
            }
        }

        if let Some(element) = input.upgrade {
            out.push(Command::UpgradeElement { element });
        }
    }

    fn random_element(&mut self) -> Element {
        Element::ALL[self.rng.gen_range(0..Element::ALL.len())]
    }
}
