use std::time::Duration;

use pawn_defence_core::{EnemyId, WorldPoint};

/// Short-lived damage area that hits every enemy inside it once.
#[derive(Clone, Debug)]
pub(crate) struct Explosion {
    center: WorldPoint,
    radius: f32,
    damage: u32,
    expires_at: Duration,
    hit: Vec<EnemyId>,
}

impl Explosion {
    pub(crate) fn new(center: WorldPoint, radius: f32, damage: u32, expires_at: Duration) -> Self {
        Self {
            center,
            radius,
            damage,
            expires_at,
            hit: Vec::new(),
        }
    }

    pub(crate) fn damage(&self) -> u32 {
        self.damage
    }

    pub(crate) fn is_expired(&self, now: Duration) -> bool {
        now >= self.expires_at
    }

    /// Picks enemies inside the area that were not hit yet and marks them.
    pub(crate) fn collect_hits(
        &mut self,
        enemies: impl IntoIterator<Item = (EnemyId, WorldPoint)>,
    ) -> Vec<EnemyId> {
        let mut fresh = Vec::new();
        for (enemy, position) in enemies {
            if self.center.distance(position) <= self.radius && !self.hit.contains(&enemy) {
                self.hit.push(enemy);
                fresh.push(enemy);
            }
        }
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn enemies_are_hit_once_while_inside() {
        let mut enemies: SlotMap<EnemyId, ()> = SlotMap::with_key();
        let near = enemies.insert(());
        let far = enemies.insert(());
        let mut explosion = Explosion::new(
            WorldPoint::new(2.0, 2.0),
            1.0,
            4,
            Duration::from_millis(300),
        );

        let first = explosion.collect_hits([
            (near, WorldPoint::new(2.5, 2.0)),
            (far, WorldPoint::new(5.0, 2.0)),
        ]);
        assert_eq!(first, vec![near]);

        let second = explosion.collect_hits([
            (near, WorldPoint::new(2.5, 2.0)),
            (far, WorldPoint::new(2.0, 2.9)),
        ]);
        assert_eq!(second, vec![far]);
        assert!(!explosion.is_expired(Duration::from_millis(299)));
        assert!(explosion.is_expired(Duration::from_millis(300)));
    }
}
