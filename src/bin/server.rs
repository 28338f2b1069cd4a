use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use base64::Engine;
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use toruslife::config::Params;
use toruslife::pattern::{PatternSource, RandomPattern, TextPattern};
use toruslife::render::{NullRenderer, render_rgba};
use toruslife::simulation::{EndState, Simulation};
use toruslife::{Cell, Grid};

/// Request budget: cells per grid, pixels per rendered frame, pixels per run.
const MAX_CELLS: usize = 4_000_000;
const MAX_FRAME_PIXELS: u64 = 16_000_000;
const MAX_RUN_PIXELS: u64 = 1_000_000_000;
const MAX_TIMESTEPS: u64 = 1_000;
const MAX_THREADS: usize = 256;

#[derive(Deserialize)]
struct SimulateRequest {
    width: Option<usize>,
    height: Option<usize>,
    timesteps: Option<u64>,
    /// ASCII pattern; a seeded random soup when absent.
    pattern: Option<String>,
    seed: Option<u64>,
    threads: Option<usize>,
    scale: Option<u32>,
}

#[derive(Serialize)]
struct SimulateResponse {
    width: usize,
    height: usize,
    end_state: String,
    stable_generation: Option<u64>,
    steps: u64,
    frames: Vec<Frame>,
    elapsed_ms: f64,
}

#[derive(Serialize)]
struct Frame {
    generation: u64,
    data_url: String,
}

fn encode_png(grid: &Grid<Cell>, scale: u32) -> Result<String, image::ImageError> {
    let rgba = render_rgba(grid, scale);
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf).write_image(
        &rgba,
        grid.w as u32 * scale,
        grid.h as u32 * scale,
        image::ExtendedColorType::Rgba8,
    )?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&buf);
    Ok(format!("data:image/png;base64,{}", b64))
}

/// Reject requests whose grid or rendered frames would not fit the budget.
/// One frame is rendered per generation plus the final one.
fn check_budget(width: usize, height: usize, scale: u32, timesteps: u64) -> anyhow::Result<()> {
    let cells = width
        .checked_mul(height)
        .filter(|&c| c <= MAX_CELLS)
        .ok_or_else(|| anyhow::anyhow!("grid {width}x{height} too large"))?;
    let frame_pixels = (cells as u64)
        .checked_mul(u64::from(scale) * u64::from(scale))
        .filter(|&p| p <= MAX_FRAME_PIXELS)
        .ok_or_else(|| anyhow::anyhow!("frame of {width}x{height} at scale {scale} too large"))?;
    let run_pixels = frame_pixels
        .checked_mul(timesteps + 1)
        .filter(|&p| p <= MAX_RUN_PIXELS);
    anyhow::ensure!(
        run_pixels.is_some(),
        "{timesteps} frames of {width}x{height} at scale {scale} too large"
    );
    Ok(())
}

fn run_request(req: SimulateRequest) -> anyhow::Result<SimulateResponse> {
    let defaults = Params::default();
    let width = req.width.filter(|&w| w > 0).unwrap_or(defaults.width);
    let height = req.height.filter(|&h| h > 0).unwrap_or(defaults.height);
    let timesteps = req
        .timesteps
        .filter(|&t| t > 0)
        .unwrap_or(defaults.timesteps)
        .min(MAX_TIMESTEPS);
    let scale = req.scale.unwrap_or(8).clamp(1, 32);
    check_budget(width, height, scale, timesteps)?;

    let mut params = Params::headless(width, height, timesteps);
    params.threads = req.threads.filter(|&n| n > 0).map(|n| n.min(MAX_THREADS));

    let source: Box<dyn PatternSource> = match req.pattern {
        Some(text) => Box::new(TextPattern { text }),
        None => Box::new(RandomPattern {
            seed: req.seed.unwrap_or(42),
            ..RandomPattern::default()
        }),
    };

    let mut sim = Simulation::new(&params, source.as_ref())?;
    let mut frames = Vec::new();
    let mut encode_err = None;
    let summary = sim.run_with(&mut NullRenderer, |generation, grid| {
        if encode_err.is_some() {
            return;
        }
        match encode_png(grid, scale) {
            Ok(data_url) => frames.push(Frame { generation, data_url }),
            Err(e) => encode_err = Some(e),
        }
    })?;
    if let Some(e) = encode_err {
        return Err(e.into());
    }
    if summary.end == EndState::Exhausted {
        frames.push(Frame {
            generation: summary.steps,
            data_url: encode_png(sim.current(), scale)?,
        });
    }

    let (end_state, stable_generation) = match summary.end {
        EndState::Stable { generation } => ("stable", Some(generation)),
        EndState::Exhausted => ("exhausted", None),
    };

    Ok(SimulateResponse {
        width,
        height,
        end_state: end_state.to_owned(),
        stable_generation,
        steps: summary.steps,
        frames,
        elapsed_ms: summary.ms,
    })
}

async fn simulate_handler(
    Json(req): Json<SimulateRequest>,
) -> Result<Json<SimulateResponse>, (StatusCode, String)> {
    let result = tokio::task::spawn_blocking(move || run_request(req))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    match result {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!(%e, "simulation request failed");
            Err((StatusCode::BAD_REQUEST, format!("{e:#}")))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let app = Router::new()
        .route("/api/simulate", post(simulate_handler))
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!(%addr, "toruslife server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflowing_dimensions_are_rejected() {
        assert!(check_budget(1 << 32, 1 << 32, 1, 10).is_err());
        assert!(check_budget(usize::MAX, 2, 1, 10).is_err());
    }

    #[test]
    fn scale_counts_against_frame_budget() {
        assert!(check_budget(2000, 2000, 1, 10).is_ok());
        assert!(check_budget(2000, 2000, 32, 1).is_err());
        assert!(check_budget(500, 500, 8, 1).is_ok());
    }

    #[test]
    fn frame_count_counts_against_run_budget() {
        assert!(check_budget(1000, 1000, 4, 10).is_ok());
        assert!(check_budget(1000, 1000, 4, 1000).is_err());
    }

    #[test]
    fn huge_request_fails_without_panicking() {
        let req = SimulateRequest {
            width: Some(1 << 32),
            height: Some(1 << 32),
            timesteps: Some(1),
            pattern: None,
            seed: None,
            threads: None,
            scale: None,
        };
        assert!(run_request(req).is_err());
    }

    #[test]
    fn small_blinker_request_runs() {
        let req = SimulateRequest {
            width: Some(5),
            height: Some(5),
            timesteps: Some(2),
            pattern: Some("00000\n00000\n00100\n00100\n00100\n".into()),
            seed: None,
            threads: Some(2),
            scale: Some(2),
        };
        let resp = run_request(req).unwrap();
        assert_eq!(resp.end_state, "exhausted");
        assert_eq!(resp.steps, 2);
        assert_eq!(resp.frames.len(), 3);
        assert!(resp.frames[0].data_url.starts_with("data:image/png;base64,"));
    }
}
