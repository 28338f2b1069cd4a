use crate::grid::{Cell, Grid};

const BLOCK: [(i64, i64); 9] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),  (0, 0),  (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];

/// Live cells in the 3x3 block centred on (x, y), centre included. Range [0, 9].
#[inline]
pub fn block_live_count(grid: &Grid<Cell>, x: i64, y: i64) -> u8 {
    BLOCK
        .iter()
        .map(|&(dx, dy)| grid.get(x + dx, y + dy))
        .sum()
}

/// Live neighbours of (x, y) under toroidal wrap, the cell itself excluded. Range [0, 8].
#[inline]
pub fn live_neighbors(grid: &Grid<Cell>, x: i64, y: i64) -> u8 {
    block_live_count(grid, x, y) - grid.get(x, y)
}
