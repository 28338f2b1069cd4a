pub mod config;
pub mod error;
pub mod evolve;
pub mod grid;
pub mod neighbors;
pub mod pattern;
pub mod render;
pub mod rng;
pub mod simulation;
pub mod snapshot;

use config::Params;
use error::LifeError;
use pattern::PatternSource;
use render::{NullRenderer, Renderer, TerminalRenderer};
use simulation::{RunSummary, Simulation};

pub use grid::{ALIVE, Cell, DEAD, Grid};

/// Initialise from `source` and run to a terminal state, rendering to stdout
/// when `params.render` is set.
pub fn simulate(params: &Params, source: &dyn PatternSource) -> Result<RunSummary, LifeError> {
    let mut sim = Simulation::new(params, source)?;
    let mut renderer: Box<dyn Renderer> = if params.render {
        Box::new(TerminalRenderer::stdout())
    } else {
        Box::new(NullRenderer)
    };
    sim.run(renderer.as_mut())
}
