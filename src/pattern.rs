use std::fs;
use std::path::PathBuf;

use tracing::info;

use crate::error::LifeError;
use crate::grid::{ALIVE, Cell, DEAD, Grid};
use crate::rng::Rng;

/// Populates a freshly allocated grid.
pub trait PatternSource {
    fn fill(&self, grid: &mut Grid<Cell>) -> Result<(), LifeError>;
}

/// Overwrite every cell of `grid` from raw pattern bytes.
///
/// One line per row: byte `'1'` is alive, any other byte dead. Lines or
/// bytes beyond the grid are ignored; missing ones leave cells dead.
pub fn parse_into(bytes: &[u8], grid: &mut Grid<Cell>) {
    grid.fill(DEAD);
    let w = grid.w;
    for (y, line) in bytes.split(|&b| b == b'\n').take(grid.h).enumerate() {
        for (x, &b) in line.iter().take(w).enumerate() {
            if b == b'1' {
                grid.data[y * w + x] = ALIVE;
            }
        }
    }
}

pub fn parse_pattern(bytes: impl AsRef<[u8]>, w: usize, h: usize) -> Grid<Cell> {
    let mut grid = Grid::new(w, h);
    parse_into(bytes.as_ref(), &mut grid);
    grid
}

/// Pattern read from a text file.
#[derive(Clone, Debug)]
pub struct FilePattern {
    pub path: PathBuf,
}

impl FilePattern {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PatternSource for FilePattern {
    fn fill(&self, grid: &mut Grid<Cell>) -> Result<(), LifeError> {
        let bytes = fs::read(&self.path).map_err(|source| LifeError::PatternOpen {
            path: self.path.clone(),
            source,
        })?;
        parse_into(&bytes, grid);
        info!(
            path = %self.path.display(),
            live = grid.live_count(),
            "pattern loaded"
        );
        Ok(())
    }
}

/// Pattern held in memory.
#[derive(Clone, Debug)]
pub struct TextPattern {
    pub text: String,
}

impl PatternSource for TextPattern {
    fn fill(&self, grid: &mut Grid<Cell>) -> Result<(), LifeError> {
        parse_into(self.text.as_bytes(), grid);
        Ok(())
    }
}

/// Seeded random soup plus a vertical blinker stamped at (2,2)..(2,4).
#[derive(Clone, Debug)]
pub struct RandomPattern {
    pub seed: u64,
    pub density: f64,
}

impl Default for RandomPattern {
    fn default() -> Self {
        Self {
            seed: 42,
            density: 0.1,
        }
    }
}

impl PatternSource for RandomPattern {
    fn fill(&self, grid: &mut Grid<Cell>) -> Result<(), LifeError> {
        let mut rng = Rng::new(self.seed);
        for c in grid.data.iter_mut() {
            *c = if rng.chance(self.density) { ALIVE } else { DEAD };
        }
        for y in 2..=4 {
            grid.set(2, y, ALIVE);
        }
        Ok(())
    }
}
