use std::path::PathBuf;

/// Errors that can occur while loading, running, or persisting a simulation.
///
/// Mismatched grid dimensions handed to the engine are a contract violation
/// and panic instead.
#[derive(Debug, thiserror::Error)]
pub enum LifeError {
    /// The pattern file could not be opened or read.
    #[error("failed to read pattern file {}: {source}", .path.display())]
    PatternOpen {
        /// Requested pattern file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A snapshot frame could not be written.
    #[error("failed to write snapshot {}: {source}", .path.display())]
    Snapshot {
        /// Frame file that was being written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A PNG frame could not be encoded or written.
    #[error("failed to write frame image {}: {source}", .path.display())]
    Frame {
        /// Image file that was being written.
        path: PathBuf,
        /// The underlying image error.
        source: image::ImageError,
    },

    /// The terminal renderer failed to write to its output.
    #[error("render failed: {0}")]
    Render(std::io::Error),

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A configuration value was malformed.
    #[error("configuration error: {0}")]
    Config(String),
}
