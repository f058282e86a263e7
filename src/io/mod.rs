//! Run configuration, plots and result files.

mod config;
mod plot;

pub use config::{Basis, CrystalConfig, OptimizerConfig, RunConfig, SweepConfig};
pub use plot::plot_energies;

use serde::Serialize;
use std::path::Path;

use crate::error::Result;

/// Pretty-printed JSON dump of `value`.
pub fn write_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}
