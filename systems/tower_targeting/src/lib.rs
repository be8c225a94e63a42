#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that assigns enemy targets to pieces from world snapshots.
//!
//! A piece keeps its target while the enemy is alive and in range. Otherwise
//! it scans its attack radius and locks onto the enemy closest to the goal,
//! measured as remaining path distance. Ties keep the enemy found first in
//! arena order.

use pawn_defence_core::{Command, EnemyId, EnemyView, PieceView, WorldPoint};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits target assignments for pieces without a valid target.
    ///
    /// Pieces whose scan found nothing receive [`Command::DeferTargetScan`] so
    /// the world postpones their next scan.
    pub fn handle(&mut self, pieces: &PieceView, enemies: &EnemyView, out: &mut Vec<Command>) {
        if pieces.is_empty() {
            return;
        }
        self.prepare_enemy_workspace(enemies);

        for piece in pieces.iter() {
            let range = piece.stats.range;
            if let Some(current) = piece.target {
                if self.in_range(current, piece.position, range) {
                    continue;
                }
            }
            if !piece.can_scan {
                continue;
            }

            let mut best: Option<&EnemyCandidate> = None;
            for candidate in &self.enemy_workspace {
                if candidate.position.distance(piece.position) > range {
                    continue;
                }
                if best.map_or(true, |existing| candidate.precedes(existing)) {
                    best = Some(candidate);
                }
            }

            match best {
                Some(candidate) => out.push(Command::AssignTarget {
                    piece: piece.id,
                    enemy: candidate.id,
                }),
                None => out.push(Command::DeferTargetScan { piece: piece.id }),
            }
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace.reserve(enemies.len());
        for snapshot in enemies.iter() {
            self.enemy_workspace.push(EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
                remaining_distance: snapshot.remaining_distance,
            });
        }
    }

    fn in_range(&self, enemy: EnemyId, origin: WorldPoint, range: f32) -> bool {
        self.enemy_workspace
            .iter()
            .find(|candidate| candidate.id == enemy)
            .is_some_and(|candidate| candidate.position.distance(origin) <= range)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: WorldPoint,
    remaining_distance: f32,
}

impl EnemyCandidate {
    fn precedes(&self, other: &Self) -> bool {
        self.remaining_distance < other.remaining_distance
    }
}

#[cfg(test)]
mod tests {
    use super::TowerTargeting;
    use pawn_defence_core::{
        CellCoord, Command, Element, EnemyId, EnemySnapshot, EnemyView, Grade, PieceId,
        PieceSnapshot, PieceStats, PieceView, WorldPoint,
    };
    use slotmap::SlotMap;

    fn piece(id: PieceId, target: Option<EnemyId>, can_scan: bool) -> PieceSnapshot {
        PieceSnapshot {
            id,
            grade: Grade::PAWN,
            element: Element::Electric,
            cell: CellCoord::new(2, 2),
            position: WorldPoint::new(2.5, 2.5),
            stats: PieceStats {
                damage: 1.0,
                range: 2.0,
                attack_delay_secs: 1.0,
            },
            target,
            ready: true,
            can_scan,
            locked_out: false,
            dimmed: false,
        }
    }

    fn enemy(id: EnemyId, position: (f32, f32), remaining_distance: f32) -> EnemySnapshot {
        EnemySnapshot {
            id,
            grade: Grade::PAWN,
            position: WorldPoint::new(position.0, position.1),
            health: 3,
            max_health: 3,
            path_index: 1,
            remaining_distance,
        }
    }

    struct Ids {
        pieces: SlotMap<PieceId, ()>,
        enemies: SlotMap<EnemyId, ()>,
    }

    impl Ids {
        fn new() -> Self {
            Self {
                pieces: SlotMap::with_key(),
                enemies: SlotMap::with_key(),
            }
        }
    }

    #[test]
    fn picks_the_enemy_closest_to_the_goal() {
        let mut ids = Ids::new();
        let tower = ids.pieces.insert(());
        let near = ids.enemies.insert(());
        let leading = ids.enemies.insert(());
        let pieces = PieceView::from_snapshots(vec![piece(tower, None, true)]);
        let enemies = EnemyView::from_snapshots(vec![
            enemy(near, (2.5, 3.0), 9.0),
            enemy(leading, (3.5, 3.5), 4.0),
        ]);

        let mut out = Vec::new();
        TowerTargeting::new().handle(&pieces, &enemies, &mut out);
        assert_eq!(
            out,
            vec![Command::AssignTarget {
                piece: tower,
                enemy: leading
            }]
        );
    }

    #[test]
    fn ties_keep_the_first_enemy_found() {
        let mut ids = Ids::new();
        let tower = ids.pieces.insert(());
        let first = ids.enemies.insert(());
        let second = ids.enemies.insert(());
        let pieces = PieceView::from_snapshots(vec![piece(tower, None, true)]);
        let enemies = EnemyView::from_snapshots(vec![
            enemy(second, (2.5, 3.0), 5.0),
            enemy(first, (2.5, 2.0), 5.0),
        ]);

        let mut out = Vec::new();
        TowerTargeting::new().handle(&pieces, &enemies, &mut out);
        assert_eq!(
            out,
            vec![Command::AssignTarget {
                piece: tower,
                enemy: second
            }]
        );
    }

    #[test]
    fn nothing_in_range_defers_the_scan() {
        let mut ids = Ids::new();
        let tower = ids.pieces.insert(());
        let far = ids.enemies.insert(());
        let pieces = PieceView::from_snapshots(vec![piece(tower, None, true)]);
        let enemies = EnemyView::from_snapshots(vec![enemy(far, (9.5, 2.5), 1.0)]);

        let mut out = Vec::new();
        TowerTargeting::new().handle(&pieces, &enemies, &mut out);
        assert_eq!(out, vec![Command::DeferTargetScan { piece: tower }]);
    }

    #[test]
    fn valid_targets_are_kept_and_waiting_pieces_stay_idle() {
        let mut ids = Ids::new();
        let locked = ids.pieces.insert(());
        let waiting = ids.pieces.insert(());
        let target = ids.enemies.insert(());
        let pieces = PieceView::from_snapshots(vec![
            piece(locked, Some(target), true),
            piece(waiting, None, false),
        ]);
        let enemies = EnemyView::from_snapshots(vec![enemy(target, (3.0, 3.0), 2.0)]);

        let mut out = Vec::new();
        TowerTargeting::new().handle(&pieces, &enemies, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn targets_that_left_range_are_replaced() {
        let mut ids = Ids::new();
        let tower = ids.pieces.insert(());
        let escaped = ids.enemies.insert(());
        let fresh = ids.enemies.insert(());
        let pieces = PieceView::from_snapshots(vec![piece(tower, Some(escaped), true)]);
        let enemies = EnemyView::from_snapshots(vec![
            enemy(escaped, (8.5, 2.5), 1.0),
            enemy(fresh, (2.5, 1.5), 6.0),
        ]);

        let mut out = Vec::new();
        TowerTargeting::new().handle(&pieces, &enemies, &mut out);
        assert_eq!(
            out,
            vec![Command::AssignTarget {
                piece: tower,
                enemy: fresh
            }]
        );
    }
}
