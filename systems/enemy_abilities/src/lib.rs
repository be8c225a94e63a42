#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns enemy ability triggers into piece disruptions.
//!
//! When an enemy ability fires, one placed piece is chosen at random as the
//! origin and the enemy grade decides which cells around it are affected.

use std::collections::BTreeSet;

use pawn_defence_core::{
    CellCoord, Command, EnemyConfig, Event, Grade, OccupancyView, PieceId,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

const DIAGONALS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ORTHOGONALS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const STAR: [(i32, i32); 8] = [
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
];

/// Area affected by an enemy ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pattern {
    /// Rays along the four diagonals.
    Diagonal,
    /// Rays along rows and columns.
    Orthogonal,
    /// Union of diagonal and orthogonal rays.
    Star,
    /// Every placed piece.
    Everything,
}

impl Pattern {
    /// Pattern used by enemies of the provided grade, if they have one.
    #[must_use]
    pub const fn for_grade(grade: Grade) -> Option<Self> {
        match grade.get() {
            0 | 1 => None,
            2 => Some(Self::Diagonal),
            3 => Some(Self::Orthogonal),
            4 => Some(Self::Star),
            _ => Some(Self::Everything),
        }
    }

    const fn directions(self) -> Option<&'static [(i32, i32)]> {
        match self {
            Self::Diagonal => Some(&DIAGONALS),
            Self::Orthogonal => Some(&ORTHOGONALS),
            Self::Star => Some(&STAR),
            Self::Everything => None,
        }
    }
}

/// Enemy ability system that picks origins with a seeded generator.
#[derive(Debug)]
pub struct EnemyAbilities {
    config: EnemyConfig,
    rng: ChaCha8Rng,
}

impl EnemyAbilities {
    /// Creates the system; origin picks are drawn from `seed`.
    #[must_use]
    pub fn new(config: EnemyConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Emits `Command::DisruptPieces` for every ability that fired.
    pub fn handle(
        &mut self,
        events: &[Event],
        occupancy: &OccupancyView<'_>,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            let Event::EnemyAbilityReady { enemy, grade } = event else {
                continue;
            };
            if !self.config.has_ability(*grade) {
                continue;
            }
            let Some(pattern) = Pattern::for_grade(*grade) else {
                continue;
            };

            let placed: Vec<(CellCoord, PieceId)> = occupancy.iter().collect();
            if placed.is_empty() {
                debug!(enemy = ?enemy, "ability fired with no piece on the grid");
                continue;
            }
            let (origin, _) = placed[self.rng.gen_range(0..placed.len())];
            let pieces =
                affected_pieces(pattern, origin, occupancy, self.config.ability_ray_length);
            debug!(enemy = ?enemy, ?pattern, affected = pieces.len(), "enemy ability fired");
            out.push(Command::DisruptPieces {
                enemy: *enemy,
                pieces,
            });
        }
    }
}

/// Pieces affected by a pattern centred on `origin`, deduplicated and sorted.
///
/// The origin piece is always included. Rays extend `ray_length` cells and
/// pass over empty or unplayable cells.
#[must_use]
pub fn affected_pieces(
    pattern: Pattern,
    origin: CellCoord,
    occupancy: &OccupancyView<'_>,
    ray_length: u32,
) -> Vec<PieceId> {
    let mut hit = BTreeSet::new();
    if let Some(piece) = occupancy.occupant(origin) {
        let _ = hit.insert(piece);
    }

    match pattern.directions() {
        None => hit.extend(occupancy.iter().map(|(_, piece)| piece)),
        Some(directions) => {
            let reach = i32::try_from(ray_length).unwrap_or(i32::MAX);
            for (dx, dy) in directions {
                for step in 1..=reach {
                    let cell = origin.offset(dx.saturating_mul(step), dy.saturating_mul(step));
                    if let Some(piece) = occupancy.occupant(cell) {
                        let _ = hit.insert(piece);
                    }
                }
            }
        }
    }
    hit.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawn_defence_core::EnemyId;
    use slotmap::SlotMap;
    use std::collections::BTreeMap;

    struct Board {
        ids: SlotMap<PieceId, ()>,
        occupants: BTreeMap<CellCoord, PieceId>,
    }

    impl Board {
        fn new() -> Self {
            Self {
                ids: SlotMap::with_key(),
                occupants: BTreeMap::new(),
            }
        }

        fn place(&mut self, x: i32, y: i32) -> PieceId {
            let id = self.ids.insert(());
            let _ = self.occupants.insert(CellCoord::new(x, y), id);
            id
        }

        fn view(&self) -> OccupancyView<'_> {
            OccupancyView::new(&self.occupants, &[])
        }
    }

    fn sorted(mut pieces: Vec<PieceId>) -> Vec<PieceId> {
        pieces.sort();
        pieces
    }

    #[test]
    fn grades_map_to_patterns() {
        assert_eq!(Pattern::for_grade(Grade::PAWN), None);
        assert_eq!(Pattern::for_grade(Grade::new(1)), None);
        assert_eq!(Pattern::for_grade(Grade::new(2)), Some(Pattern::Diagonal));
        assert_eq!(Pattern::for_grade(Grade::new(3)), Some(Pattern::Orthogonal));
        assert_eq!(Pattern::for_grade(Grade::QUEEN), Some(Pattern::Star));
        assert_eq!(Pattern::for_grade(Grade::KING), Some(Pattern::Everything));
    }

    #[test]
    fn diagonal_and_orthogonal_rays_cover_their_own_lines() {
        let mut board = Board::new();
        let origin = board.place(4, 2);
        let diagonal = board.place(5, 3);
        let far_diagonal = board.place(1, 5);
        let column = board.place(4, 0);
        let row = board.place(8, 2);
        let _off_line = board.place(6, 3);
        let centre = CellCoord::new(4, 2);

        assert_eq!(
            affected_pieces(Pattern::Diagonal, centre, &board.view(), 10),
            sorted(vec![origin, diagonal, far_diagonal])
        );
        assert_eq!(
            affected_pieces(Pattern::Orthogonal, centre, &board.view(), 10),
            sorted(vec![origin, column, row])
        );
        assert_eq!(
            affected_pieces(Pattern::Star, centre, &board.view(), 10),
            sorted(vec![origin, diagonal, far_diagonal, column, row])
        );
        assert_eq!(
            affected_pieces(Pattern::Everything, centre, &board.view(), 10).len(),
            6
        );
    }

    #[test]
    fn rays_stop_at_their_length() {
        let mut board = Board::new();
        let origin = board.place(0, 0);
        let near = board.place(1, 1);
        let _far = board.place(3, 3);

        assert_eq!(
            affected_pieces(Pattern::Diagonal, CellCoord::new(0, 0), &board.view(), 2),
            sorted(vec![origin, near])
        );
    }

    #[test]
    fn low_grades_and_empty_grids_do_nothing() {
        let mut enemies: SlotMap<EnemyId, ()> = SlotMap::with_key();
        let enemy = enemies.insert(());
        let mut system = EnemyAbilities::new(EnemyConfig::default(), 1);
        let board = Board::new();
        let mut out = Vec::new();

        system.handle(
            &[Event::EnemyAbilityReady {
                enemy,
                grade: Grade::KING,
            }],
            &board.view(),
            &mut out,
        );
        assert!(out.is_empty());

        let mut board = Board::new();
        let _ = board.place(2, 2);
        system.handle(
            &[Event::EnemyAbilityReady {
                enemy,
                grade: Grade::new(1),
            }],
            &board.view(),
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn lone_piece_is_its_own_origin() {
        let mut enemies: SlotMap<EnemyId, ()> = SlotMap::with_key();
        let enemy = enemies.insert(());
        let mut board = Board::new();
        let piece = board.place(3, 1);
        let mut out = Vec::new();

        EnemyAbilities::new(EnemyConfig::default(), 4).handle(
            &[Event::EnemyAbilityReady {
                enemy,
                grade: Grade::new(3),
            }],
            &board.view(),
            &mut out,
        );
        assert_eq!(
            out,
            vec![Command::DisruptPieces {
                enemy,
                pieces: vec![piece],
            }]
        );
    }
}
