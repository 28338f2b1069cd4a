use std::thread;
use std::time::{Duration, Instant};

use tracing::info;

use crate::config::Params;
use crate::error::LifeError;
use crate::evolve::EvolutionEngine;
use crate::grid::{Cell, Grid};
use crate::pattern::PatternSource;
use crate::render::Renderer;
use crate::snapshot::SnapshotWriter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimState {
    Initializing,
    Running { generation: u64 },
    /// The step of `generation` changed no cell.
    Stable { generation: u64 },
    /// All requested generations were computed.
    Exhausted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndState {
    Stable { generation: u64 },
    Exhausted,
}

#[derive(Clone, Debug)]
pub struct RunSummary {
    pub end: EndState,
    /// Number of evolution steps executed.
    pub steps: u64,
    pub ms: f64,
}

/// Generation loop over two owned grids: render, evolve, snapshot, then stop
/// on a stable configuration or swap buffers and pace.
pub struct Simulation {
    grids: [Grid<Cell>; 2],
    /// Index of the grid holding the current generation; the other is the
    /// write buffer for the next one.
    current: usize,
    engine: EvolutionEngine,
    state: SimState,
    timesteps: u64,
    step_delay: Duration,
    stable_pause: Duration,
    frames: SnapshotWriter,
    vtk: bool,
    png_scale: Option<u32>,
}

impl Simulation {
    pub fn new(params: &Params, source: &dyn PatternSource) -> Result<Self, LifeError> {
        let mut current = Grid::new(params.width, params.height);
        source.fill(&mut current)?;
        let next = Grid::new(params.width, params.height);
        let engine = EvolutionEngine::new(params.threads)?;

        info!(
            width = params.width,
            height = params.height,
            timesteps = params.timesteps,
            threads = engine.threads(),
            live = current.live_count(),
            "simulation initialised"
        );

        Ok(Self {
            grids: [current, next],
            current: 0,
            engine,
            state: SimState::Initializing,
            timesteps: params.timesteps,
            step_delay: params.step_delay,
            stable_pause: params.stable_pause,
            frames: SnapshotWriter::new(&params.out_dir, &params.prefix, &params.variant),
            vtk: params.snapshots,
            png_scale: params.png_scale,
        })
    }

    pub fn current(&self) -> &Grid<Cell> {
        &self.grids[self.current]
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    /// Exchange the roles of the two buffers.
    fn swap(&mut self) {
        self.current ^= 1;
    }

    pub fn run(&mut self, renderer: &mut dyn Renderer) -> Result<RunSummary, LifeError> {
        self.run_with(renderer, |_, _| {})
    }

    /// Like [`run`](Self::run), calling `observe` with each generation's grid
    /// before it is evolved.
    pub fn run_with(
        &mut self,
        renderer: &mut dyn Renderer,
        mut observe: impl FnMut(u64, &Grid<Cell>),
    ) -> Result<RunSummary, LifeError> {
        let start = Instant::now();
        let mut t = 0;

        while t < self.timesteps {
            self.state = SimState::Running { generation: t };
            renderer.render(self.current(), t)?;
            observe(t, self.current());

            let changed = {
                let [a, b] = &mut self.grids;
                let (src, dst) = if self.current == 0 { (&*a, b) } else { (&*b, a) };
                self.engine.step(src, dst, t)
            };

            self.write_frames(t)?;

            if !changed {
                self.state = SimState::Stable { generation: t };
                info!(generation = t, "stable configuration reached");
                thread::sleep(self.stable_pause);
                return Ok(self.summary(EndState::Stable { generation: t }, t + 1, start));
            }

            self.swap();
            thread::sleep(self.step_delay);
            t += 1;
        }

        self.state = SimState::Exhausted;
        info!(generations = t, "generation limit reached");
        Ok(self.summary(EndState::Exhausted, t, start))
    }

    fn write_frames(&self, generation: u64) -> Result<(), LifeError> {
        if self.vtk {
            self.frames.write(self.current(), generation)?;
        }
        if let Some(scale) = self.png_scale {
            self.frames.write_png(self.current(), generation, scale)?;
        }
        Ok(())
    }

    fn summary(&self, end: EndState, steps: u64, start: Instant) -> RunSummary {
        let ms = start.elapsed().as_secs_f64() * 1000.0;
        info!(?end, steps, ms, live = self.current().live_count(), "simulation finished");
        RunSummary { end, steps, ms }
    }
}
