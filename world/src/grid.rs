use std::collections::BTreeMap;

use pawn_defence_core::{CellCoord, GridConfig, OccupancyView, PieceId};

/// Sparse occupancy map restricted to the playable cells of the board.
#[derive(Debug)]
pub(crate) struct GridStore {
    playable: Vec<CellCoord>,
    occupants: BTreeMap<CellCoord, PieceId>,
}

impl GridStore {
    pub(crate) fn new(config: &GridConfig) -> Self {
        let playable = config
            .playable_bounds()
            .cells()
            .into_iter()
            .filter(|cell| !config.holes.contains(cell))
            .collect();
        Self {
            playable,
            occupants: BTreeMap::new(),
        }
    }

    /// Reports whether pieces may stand on the cell.
    pub(crate) fn is_valid(&self, cell: CellCoord) -> bool {
        self.playable.binary_search(&cell).is_ok()
    }

    pub(crate) fn occupant(&self, cell: CellCoord) -> Option<PieceId> {
        self.occupants.get(&cell).copied()
    }

    pub(crate) fn occupy(&mut self, cell: CellCoord, piece: PieceId) {
        let previous = self.occupants.insert(cell, piece);
        debug_assert!(previous.is_none(), "cell {cell:?} was already occupied");
    }

    pub(crate) fn vacate(&mut self, cell: CellCoord) -> Option<PieceId> {
        self.occupants.remove(&cell)
    }

    pub(crate) fn view(&self) -> OccupancyView<'_> {
        OccupancyView::new(&self.occupants, &self.playable)
    }
}
