use std::io::{self, BufRead, Write};

use anyhow::{Context, bail};
use tracing::info;
use tracing_subscriber::EnvFilter;

use toruslife::config::Params;
use toruslife::pattern::FilePattern;

fn prompt_pattern_path() -> anyhow::Result<String> {
    let mut stdout = io::stdout();
    writeln!(stdout, "insert file name")?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read pattern file name")?;
    let name = line.trim();
    if name.is_empty() {
        bail!("no pattern file name given");
    }
    Ok(name.to_owned())
}

fn main() -> anyhow::Result<()> {
    // stderr keeps stdout free for the terminal renderer
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let params = Params::from_args(&args)
        .with_env()
        .context("invalid LIFE_* configuration")?;

    let path = prompt_pattern_path()?;
    let source = FilePattern::new(&path);

    info!(
        width = params.width,
        height = params.height,
        timesteps = params.timesteps,
        out_dir = %params.out_dir.display(),
        "starting"
    );

    let summary = toruslife::simulate(&params, &source)
        .with_context(|| format!("simulation from {path} failed"))?;

    eprintln!(
        "\n{:?} after {} steps ({:.1} ms)",
        summary.end, summary.steps, summary.ms
    );
    Ok(())
}
