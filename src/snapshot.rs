use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use tracing::debug;

use crate::error::LifeError;
use crate::grid::{Cell, DEAD, Grid};
use crate::render::save_png;

/// Write one legacy VTK structured-points frame: ASCII header, then the
/// `w*h` big-endian f32 payload.
/// Values are `0.0`/`1.0`, x varying fastest.
pub fn encode_frame<Wr: Write>(out: &mut Wr, grid: &Grid<Cell>, generation: u64) -> io::Result<()> {
    let (w, h) = grid.dimensions();
    write!(
        out,
        "# vtk DataFile Version 3.0\n\
         frame {generation}\n\
         BINARY\n\
         DATASET STRUCTURED_POINTS\n\
         DIMENSIONS {w} {h} 1\n\
         SPACING 1.0 1.0 1.0\n\
         ORIGIN 0 0 0\n\
         POINT_DATA {}\n\
         SCALARS data float 1\n\
         LOOKUP_TABLE default\n",
        w * h
    )?;

    let mut payload = Vec::with_capacity(w * h * 4);
    for &c in &grid.data {
        let v: f32 = if c != DEAD { 1.0 } else { 0.0 };
        payload.extend_from_slice(&v.to_be_bytes());
    }
    out.write_all(&payload)
}

/// Writes one frame file per call to `<dir>/<prefix>_<generation><variant>.vtk`.
///
/// The variant is fixed for the writer's lifetime so a generation always maps
/// to the same file.
#[derive(Clone, Debug)]
pub struct SnapshotWriter {
    dir: PathBuf,
    prefix: String,
    variant: String,
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            variant: variant.into(),
        }
    }

    fn file_for(&self, generation: u64, ext: &str) -> PathBuf {
        self.dir
            .join(format!("{}_{}{}.{ext}", self.prefix, generation, self.variant))
    }

    pub fn path_for(&self, generation: u64) -> PathBuf {
        self.file_for(generation, "vtk")
    }

    /// Create or overwrite the frame for `generation`.
    ///
    /// The frame is staged next to its final name and renamed into place, so a
    /// failed write never leaves a truncated `.vtk` behind.
    pub fn write(&self, grid: &Grid<Cell>, generation: u64) -> Result<PathBuf, LifeError> {
        let path = self.path_for(generation);
        let staging = path.with_extension("vtk.part");
        let wrap = |source: io::Error| LifeError::Snapshot {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(wrap)?;

        let result = File::create(&staging).and_then(|file| {
            let mut writer = BufWriter::new(file);
            encode_frame(&mut writer, grid, generation)?;
            writer.flush()
        });
        if let Err(e) = result {
            let _ = fs::remove_file(&staging);
            return Err(wrap(e));
        }
        if let Err(e) = fs::rename(&staging, &path) {
            let _ = fs::remove_file(&staging);
            return Err(wrap(e));
        }

        debug!(generation, path = %path.display(), "snapshot written");
        Ok(path)
    }

    /// PNG companion of the frame, `scale` pixels per cell.
    pub fn write_png(&self, grid: &Grid<Cell>, generation: u64, scale: u32) -> Result<PathBuf, LifeError> {
        let path = self.file_for(generation, "png");
        fs::create_dir_all(&self.dir).map_err(|source| LifeError::Snapshot {
            path: path.clone(),
            source,
        })?;
        save_png(grid, scale, &path)?;
        debug!(generation, path = %path.display(), "png frame written");
        Ok(path)
    }
}
