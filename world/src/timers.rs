use std::{collections::VecDeque, time::Duration};

use pawn_defence_core::{EnemyId, PieceId};

/// Deferred work owned by a piece.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Task {
    /// Next hop of a breadth-first lightning chain.
    ChainHop(Chain),
    /// Periodic poison damage on a single enemy.
    PoisonTick {
        owner: PieceId,
        target: EnemyId,
        damage: u32,
        remaining: u32,
        period: Duration,
    },
}

impl Task {
    pub(crate) fn owner(&self) -> PieceId {
        match self {
            Self::ChainHop(chain) => chain.owner,
            Self::PoisonTick { owner, .. } => *owner,
        }
    }
}

/// Progress of a lightning chain between hops.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Chain {
    pub(crate) owner: PieceId,
    pub(crate) frontier: VecDeque<EnemyId>,
    pub(crate) hit: Vec<EnemyId>,
    pub(crate) remaining: u32,
    pub(crate) damage: u32,
    pub(crate) radius: f32,
    pub(crate) hop_delay: Duration,
}

impl Chain {
    /// Queues enemies that were neither hit nor queued yet.
    pub(crate) fn enqueue(&mut self, candidates: impl IntoIterator<Item = EnemyId>) {
        for enemy in candidates {
            if !self.hit.contains(&enemy) && !self.frontier.contains(&enemy) {
                self.frontier.push_back(enemy);
            }
        }
    }

    /// Pops the next queued enemy that satisfies `alive`.
    pub(crate) fn next_target(&mut self, alive: impl Fn(EnemyId) -> bool) -> Option<EnemyId> {
        while let Some(enemy) = self.frontier.pop_front() {
            if alive(enemy) && !self.hit.contains(&enemy) {
                return Some(enemy);
            }
        }
        None
    }

    pub(crate) fn has_more(&self) -> bool {
        self.remaining > 0 && !self.frontier.is_empty()
    }
}

#[derive(Clone, Debug)]
struct Entry {
    fire_at: Duration,
    sequence: u64,
    task: Task,
}

/// Timer table ordered by `(fire_at, sequence)`.
#[derive(Clone, Debug, Default)]
pub(crate) struct TimerTable {
    entries: Vec<Entry>,
    next_sequence: u64,
}

impl TimerTable {
    pub(crate) fn schedule(&mut self, fire_at: Duration, task: Task) {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        let index = self
            .entries
            .partition_point(|entry| (entry.fire_at, entry.sequence) <= (fire_at, sequence));
        self.entries.insert(
            index,
            Entry {
                fire_at,
                sequence,
                task,
            },
        );
    }

    /// Removes the earliest task due at `now` and returns it with its fire time.
    pub(crate) fn pop_due(&mut self, now: Duration) -> Option<(Duration, Task)> {
        if self.entries.first()?.fire_at > now {
            return None;
        }
        let entry = self.entries.remove(0);
        Some((entry.fire_at, entry.task))
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
