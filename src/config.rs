use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::LifeError;

pub const DEFAULT_WIDTH: usize = 30;
pub const DEFAULT_HEIGHT: usize = 30;
pub const DEFAULT_TIMESTEPS: u64 = 10;

/// Run parameters. Grid size and step count come from positional arguments,
/// everything else from `LIFE_*` environment variables.
#[derive(Clone, Debug)]
pub struct Params {
    pub width: usize,
    pub height: usize,
    pub timesteps: u64,

    /// Worker pool size; `None` = hardware parallelism.
    pub threads: Option<usize>,
    /// Pause between generations.
    pub step_delay: Duration,
    /// Pause after reaching a stable configuration.
    pub stable_pause: Duration,

    // Output
    pub out_dir: PathBuf,
    pub prefix: String,
    pub variant: String,
    pub snapshots: bool,
    pub render: bool,
    /// Pixels per cell for PNG frames; `None` disables them.
    pub png_scale: Option<u32>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            timesteps: DEFAULT_TIMESTEPS,
            threads: None,
            step_delay: Duration::from_millis(200),
            stable_pause: Duration::from_secs(3),
            out_dir: PathBuf::from("out"),
            prefix: "output".to_owned(),
            variant: String::new(),
            snapshots: true,
            render: true,
            png_scale: None,
        }
    }
}

/// Positive integer or `default` (missing, unparsable, zero, or negative).
fn positive_or(arg: Option<&String>, default: i64) -> i64 {
    arg.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(default)
}

fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>, LifeError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| LifeError::Config(format!("invalid {name}: {e}"))),
        Err(_) => Ok(None),
    }
}

impl Params {
    /// `args` excludes the program name: `[width] [height] [timesteps]`.
    pub fn from_args(args: &[String]) -> Self {
        Self {
            width: positive_or(args.first(), DEFAULT_WIDTH as i64) as usize,
            height: positive_or(args.get(1), DEFAULT_HEIGHT as i64) as usize,
            timesteps: positive_or(args.get(2), DEFAULT_TIMESTEPS as i64) as u64,
            ..Self::default()
        }
    }

    /// Apply `LIFE_*` overrides:
    /// - `LIFE_THREADS` -- worker pool size (0 = hardware parallelism)
    /// - `LIFE_STEP_DELAY_MS`, `LIFE_STABLE_PAUSE_MS` -- pacing
    /// - `LIFE_OUT_DIR`, `LIFE_PREFIX`, `LIFE_VARIANT` -- snapshot naming
    /// - `LIFE_SNAPSHOTS`, `LIFE_RENDER` -- `true`/`false`
    /// - `LIFE_PNG_SCALE` -- pixels per cell, 0 disables PNG frames
    pub fn with_env(mut self) -> Result<Self, LifeError> {
        if let Some(n) = env_parse::<usize>("LIFE_THREADS")? {
            self.threads = (n > 0).then_some(n);
        }
        if let Some(ms) = env_parse::<u64>("LIFE_STEP_DELAY_MS")? {
            self.step_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = env_parse::<u64>("LIFE_STABLE_PAUSE_MS")? {
            self.stable_pause = Duration::from_millis(ms);
        }
        if let Ok(dir) = std::env::var("LIFE_OUT_DIR") {
            self.out_dir = PathBuf::from(dir);
        }
        if let Ok(prefix) = std::env::var("LIFE_PREFIX") {
            self.prefix = prefix;
        }
        if let Ok(variant) = std::env::var("LIFE_VARIANT") {
            self.variant = variant;
        }
        if let Some(on) = env_parse::<bool>("LIFE_SNAPSHOTS")? {
            self.snapshots = on;
        }
        if let Some(on) = env_parse::<bool>("LIFE_RENDER")? {
            self.render = on;
        }
        if let Some(scale) = env_parse::<u32>("LIFE_PNG_SCALE")? {
            self.png_scale = (scale > 0).then_some(scale);
        }
        Ok(self)
    }

    /// No pacing, no files, no terminal output.
    pub fn headless(width: usize, height: usize, timesteps: u64) -> Self {
        Self {
            width,
            height,
            timesteps,
            step_delay: Duration::ZERO,
            stable_pause: Duration::ZERO,
            snapshots: false,
            render: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_without_args() {
        let p = Params::from_args(&[]);
        assert_eq!((p.width, p.height, p.timesteps), (30, 30, 10));
        assert_eq!(p.out_dir, PathBuf::from("out"));
        assert_eq!(p.prefix, "output");
        assert!(p.variant.is_empty());
    }

    #[test]
    fn positional_args() {
        let p = Params::from_args(&args(&["40", "20", "100"]));
        assert_eq!((p.width, p.height, p.timesteps), (40, 20, 100));
    }

    #[test]
    fn non_positive_and_garbage_fall_back() {
        let p = Params::from_args(&args(&["0", "-5", "abc"]));
        assert_eq!((p.width, p.height, p.timesteps), (30, 30, 10));
        let p = Params::from_args(&args(&["12"]));
        assert_eq!((p.width, p.height, p.timesteps), (12, 30, 10));
    }

    #[test]
    fn headless_disables_side_effects() {
        let p = Params::headless(5, 5, 3);
        assert!(!p.snapshots && !p.render);
        assert_eq!(p.step_delay, Duration::ZERO);
        assert_eq!(p.png_scale, None);
    }
}
