use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::error::LifeError;
use crate::grid::{ALIVE, Cell, DEAD, Grid};
use crate::neighbors::block_live_count;

/// Conway transition: born with exactly 3 neighbours, survives with 2 or 3.
#[inline]
pub fn next_state(alive: bool, neighbors: u8) -> bool {
    neighbors == 3 || (neighbors == 2 && alive)
}

/// One generation from `src` into `dst` on the current rayon pool.
///
/// Rows of `dst` are disjoint chunks, each worker reads all of `src` and
/// reports whether its row changed. The flags are OR-merged after every row
/// has been written. Returns true iff any cell differs between `src` and `dst`.
pub fn step(src: &Grid<Cell>, dst: &mut Grid<Cell>, generation: u64) -> bool {
    assert_eq!(
        src.dimensions(),
        dst.dimensions(),
        "source and destination grids differ in size"
    );
    let w = src.w;

    let changed = dst
        .data
        .par_chunks_mut(w)
        .enumerate()
        .map(|(y, row)| {
            let y = y as i64;
            let mut row_changed = false;
            for (x, out) in row.iter_mut().enumerate() {
                let x = x as i64;
                let own = src.get(x, y);
                let n = block_live_count(src, x, y) - own;
                let next = if next_state(own != DEAD, n) { ALIVE } else { DEAD };
                *out = next;
                row_changed |= next != own;
            }
            row_changed
        })
        // `reduce` rather than `any`: every row must be written.
        .reduce(|| false, |a, b| a | b);

    debug!(generation, changed, "generation evolved");
    changed
}

/// Runs [`step`] on a dedicated worker pool.
pub struct EvolutionEngine {
    pool: ThreadPool,
}

impl EvolutionEngine {
    /// `threads = None` sizes the pool to the available hardware parallelism.
    pub fn new(threads: Option<usize>) -> Result<Self, LifeError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.unwrap_or(0))
            .thread_name(|i| format!("life-worker-{i}"))
            .build()?;
        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn step(&self, src: &Grid<Cell>, dst: &mut Grid<Cell>, generation: u64) -> bool {
        self.pool.install(|| step(src, dst, generation))
    }
}
