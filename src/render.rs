use std::io::Write;
use std::path::Path;

use rayon::prelude::*;

use crate::error::LifeError;
use crate::grid::{Cell, DEAD, Grid};

const LIVE_RGBA: [u8; 4] = [235, 235, 220, 255];
const DEAD_RGBA: [u8; 4] = [18, 22, 30, 255];

const HOME: &str = "\x1b[H";
const NEXT_LINE: &str = "\x1b[E";
const LIVE_CELL: &str = "\x1b[07m  \x1b[m";
const DEAD_CELL: &str = "  ";

/// Presents one generation. Has no effect on simulation state.
pub trait Renderer {
    fn render(&mut self, grid: &Grid<Cell>, generation: u64) -> Result<(), LifeError>;
}

/// Discards every frame.
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _grid: &Grid<Cell>, _generation: u64) -> Result<(), LifeError> {
        Ok(())
    }
}

/// Full-screen repaint with ANSI control sequences, two columns per cell.
pub fn render_ansi(grid: &Grid<Cell>) -> String {
    let mut s = String::with_capacity(HOME.len() + grid.h * (grid.w * LIVE_CELL.len() + NEXT_LINE.len()));
    s.push_str(HOME);
    for row in grid.data.chunks(grid.w) {
        for &c in row {
            s.push_str(if c != DEAD { LIVE_CELL } else { DEAD_CELL });
        }
        s.push_str(NEXT_LINE);
    }
    s
}

pub struct TerminalRenderer<W: Write> {
    out: W,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl TerminalRenderer<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, grid: &Grid<Cell>, _generation: u64) -> Result<(), LifeError> {
        self.out
            .write_all(render_ansi(grid).as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(LifeError::Render)
    }
}

/// RGBA8 image of the grid, each cell `scale`x`scale` pixels.
pub fn render_rgba(grid: &Grid<Cell>, scale: u32) -> Vec<u8> {
    let s = scale.max(1) as usize;
    let pw = grid.w * s;
    let ph = grid.h * s;
    let mut rgba = vec![0u8; pw * ph * 4];

    rgba.par_chunks_mut(pw * 4).enumerate().for_each(|(py, row)| {
        let y = py / s;
        for px in 0..pw {
            let c = grid.data[y * grid.w + px / s];
            let color = if c != DEAD { LIVE_RGBA } else { DEAD_RGBA };
            row[px * 4..px * 4 + 4].copy_from_slice(&color);
        }
    });

    rgba
}

/// Write a PNG frame of the grid.
pub fn save_png(grid: &Grid<Cell>, scale: u32, path: &Path) -> Result<(), LifeError> {
    let s = scale.max(1);
    let rgba = render_rgba(grid, s);
    image::save_buffer(
        path,
        &rgba,
        grid.w as u32 * s,
        grid.h as u32 * s,
        image::ColorType::Rgba8,
    )
    .map_err(|source| LifeError::Frame {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::ALIVE;

    #[test]
    fn ansi_repaint_layout() {
        let mut g = Grid::new(2, 2);
        g.set(1, 0, ALIVE);
        let expected = format!("{HOME}{DEAD_CELL}{LIVE_CELL}{NEXT_LINE}{DEAD_CELL}{DEAD_CELL}{NEXT_LINE}");
        assert_eq!(render_ansi(&g), expected);
    }

    #[test]
    fn terminal_renderer_writes_frame() {
        let mut g = Grid::new(1, 1);
        g.set(0, 0, ALIVE);
        let mut r = TerminalRenderer::new(Vec::new());
        r.render(&g, 0).unwrap();
        let out = String::from_utf8(r.into_inner()).unwrap();
        assert_eq!(out, "\x1b[H\x1b[07m  \x1b[m\x1b[E");
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn terminal_write_failure_is_render_error() {
        let mut r = TerminalRenderer::new(BrokenPipe);
        let err = r.render(&Grid::new(2, 2), 0).unwrap_err();
        assert!(matches!(err, LifeError::Render(_)));
    }

    #[test]
    fn rgba_scales_cells() {
        let mut g = Grid::new(2, 1);
        g.set(1, 0, ALIVE);
        let rgba = render_rgba(&g, 2);
        assert_eq!(rgba.len(), 4 * 2 * 4);
        // second pixel row, third pixel: cell (1, 0)
        let px = (4 + 2) * 4;
        assert_eq!(&rgba[px..px + 4], &LIVE_RGBA);
        assert_eq!(&rgba[0..4], &DEAD_RGBA);
    }
}
