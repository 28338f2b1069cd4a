/// Row-major flat grid. No per-cell objects.
/// Both axes wrap (toroidal topology): there is no edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid<T> {
    pub data: Vec<T>,
    pub w: usize,
    pub h: usize,
}

/// Cell state: 0 = dead, 1 = alive.
pub type Cell = u8;

pub const DEAD: Cell = 0;
pub const ALIVE: Cell = 1;

impl<T: Copy + Default> Grid<T> {
    pub fn new(w: usize, h: usize) -> Self {
        assert!(w > 0 && h > 0, "grid dimensions must be positive ({w}x{h})");
        Self {
            data: vec![T::default(); w * h],
            w,
            h,
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.w, self.h)
    }

    /// Flat index of an arbitrary coordinate after toroidal normalization.
    #[inline]
    pub fn idx(&self, x: i64, y: i64) -> usize {
        let (wx, wy) = wrap_xy(x, y, self.w, self.h);
        wy * self.w + wx
    }

    #[inline]
    pub fn get(&self, x: i64, y: i64) -> T {
        self.data[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: i64, y: i64, v: T) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    pub fn fill(&mut self, v: T) {
        self.data.fill(v);
    }
}

impl Grid<Cell> {
    pub fn live_count(&self) -> usize {
        self.data.iter().filter(|&&c| c != DEAD).count()
    }

    /// Coordinates of all live cells, row-major.
    pub fn live_cells(&self) -> Vec<(usize, usize)> {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, c)| **c != DEAD)
            .map(|(i, _)| (i % self.w, i / self.w))
            .collect()
    }
}

/// Wrap both coordinates onto the torus: `((x % w + w) % w, (y % h + h) % h)`.
#[inline]
pub fn wrap_xy(x: i64, y: i64, w: usize, h: usize) -> (usize, usize) {
    let (w, h) = (w as i64, h as i64);
    (x.rem_euclid(w) as usize, y.rem_euclid(h) as usize)
}
