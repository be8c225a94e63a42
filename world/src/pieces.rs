use std::time::Duration;

use pawn_defence_core::{
    CellCoord, Element, EnemyId, Grade, PieceId, PieceSnapshot, PieceStats, StatCatalog,
    WorldPoint,
};
use tracing::warn;

/// Unit placed on the grid.
#[derive(Clone, Debug)]
pub(crate) struct Piece {
    pub(crate) grade: Grade,
    pub(crate) element: Element,
    pub(crate) cell: CellCoord,
    pub(crate) stats: PieceStats,
    pub(crate) target: Option<EnemyId>,
    ready_at: Duration,
    scan_at: Duration,
    locked_until: Duration,
    dimmed_until: Duration,
}

impl Piece {
    pub(crate) fn new(
        grade: Grade,
        element: Element,
        cell: CellCoord,
        catalog: &StatCatalog,
    ) -> Self {
        Self {
            grade,
            element,
            cell,
            stats: resolve_stats(catalog, grade),
            target: None,
            ready_at: Duration::ZERO,
            scan_at: Duration::ZERO,
            locked_until: Duration::ZERO,
            dimmed_until: Duration::ZERO,
        }
    }

    pub(crate) fn is_ready(&self, now: Duration) -> bool {
        now >= self.ready_at
    }

    pub(crate) fn is_locked_out(&self, now: Duration) -> bool {
        now < self.locked_until
    }

    /// Starts the cooldown and drops the target after an attack.
    pub(crate) fn finish_attack(&mut self, now: Duration, cooldown: Duration) {
        self.ready_at = now.saturating_add(cooldown);
        self.target = None;
    }

    pub(crate) fn defer_scan(&mut self, now: Duration, delay: Duration) {
        self.target = None;
        self.scan_at = now.saturating_add(delay);
    }

    pub(crate) fn disrupt(&mut self, now: Duration, dim: Duration, lockout: Duration) {
        self.dimmed_until = now.saturating_add(dim);
        self.locked_until = now.saturating_add(lockout);
    }

    pub(crate) fn snapshot(
        &self,
        id: PieceId,
        position: WorldPoint,
        now: Duration,
    ) -> PieceSnapshot {
        PieceSnapshot {
            id,
            grade: self.grade,
            element: self.element,
            cell: self.cell,
            position,
            stats: self.stats,
            target: self.target,
            ready: self.is_ready(now),
            can_scan: now >= self.scan_at,
            locked_out: self.is_locked_out(now),
            dimmed: now < self.dimmed_until,
        }
    }
}

/// Looks up the stat block named after the grade, falling back to safe stats.
pub(crate) fn resolve_stats(catalog: &StatCatalog, grade: Grade) -> PieceStats {
    match grade.name().and_then(|name| catalog.piece_stats(name)) {
        Some(stats) => stats,
        None => {
            warn!(grade = grade.get(), "missing piece stats, using fallback");
            PieceStats::FALLBACK
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn unknown_grade_falls_back_to_safe_stats() {
        let catalog = StatCatalog::default();
        assert_eq!(resolve_stats(&catalog, Grade::new(9)), PieceStats::FALLBACK);
        assert_eq!(
            resolve_stats(&catalog, Grade::KING),
            catalog.piece_stats("King").expect("king stats")
        );
    }

    #[test]
    fn attack_and_disruption_timers_gate_the_snapshot() {
        let mut ids: SlotMap<PieceId, ()> = SlotMap::with_key();
        let id = ids.insert(());
        let catalog = StatCatalog::default();
        let mut piece = Piece::new(Grade::PAWN, Element::Ice, CellCoord::new(1, 0), &catalog);
        let now = Duration::from_secs(5);

        piece.finish_attack(now, Duration::from_secs(1));
        piece.disrupt(now, Duration::from_secs(2), Duration::from_secs(1));

        let snapshot = piece.snapshot(id, WorldPoint::default(), now);
        assert!(!snapshot.ready);
        assert!(snapshot.locked_out);
        assert!(snapshot.dimmed);

        let later = piece.snapshot(id, WorldPoint::default(), Duration::from_millis(6_500));
        assert!(later.ready);
        assert!(!later.locked_out);
        assert!(later.dimmed);
    }
}
