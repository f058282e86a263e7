//! Active-space sweep: LiH energy as the number of active orbitals grows.

use serde::Serialize;
use tracing::{info, info_span};

use crate::error::Result;
use crate::io::{plot_energies, write_json, RunConfig};
use crate::pipeline::ActiveSpace;
use crate::project::LiHProject;

/// Energy of one active-space size.
#[derive(Debug, Clone, Serialize)]
pub struct SweepPoint {
    pub n_active_el: usize,
    pub n_active_orb: usize,
    /// Hartree per formula unit
    pub energy: f64,
    pub iterations: usize,
    pub converged: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepResult {
    /// Frozen determinant with no active orbitals, Hartree per formula unit
    pub reference_energy: f64,
    pub points: Vec<SweepPoint>,
}

impl SweepResult {
    /// Render the plot and, when configured, the JSON results file.
    pub fn save(&self, config: &RunConfig) -> Result<()> {
        plot_energies(&self.points, &config.sweep.plot_path)?;
        info!(path = %config.sweep.plot_path, "Wrote energy plot");
        if let Some(path) = &config.sweep.results_path {
            write_json(self, path)?;
            info!(path = %path, "Wrote sweep results");
        }
        Ok(())
    }
}

/// Run one project per entry of `config.sweep.active_orbitals`.
///
/// Size 0 is the closed-shell determinant and needs no optimization; every
/// other size keeps `config.active_space.n_active_el` active electrons.
pub fn run_sweep(config: &RunConfig) -> Result<SweepResult> {
    let mut reference = LiHProject::new(config, ActiveSpace::closed_shell())?;
    let reference_energy = reference.energy()?;
    info!(reference_energy, "Closed-shell reference");

    let mut points = Vec::with_capacity(config.sweep.active_orbitals.len());
    for &n_active_orb in &config.sweep.active_orbitals {
        let _span = info_span!("sweep", n_active_orb).entered();
        let point = if n_active_orb == 0 {
            SweepPoint {
                n_active_el: 0,
                n_active_orb: 0,
                energy: reference_energy,
                iterations: 0,
                converged: true,
            }
        } else {
            let space = ActiveSpace::new(config.active_space.n_active_el, n_active_orb);
            let mut project = LiHProject::new(config, space)?;
            let energy = project.energy()?;
            let (iterations, converged) = project
                .optimization()
                .map(|r| (r.iterations, r.converged))
                .unwrap_or((0, false));
            SweepPoint {
                n_active_el: space.n_active_el,
                n_active_orb,
                energy,
                iterations,
                converged,
            }
        };
        info!(energy = point.energy, converged = point.converged, "Sweep point");
        points.push(point);
    }

    Ok(SweepResult {
        reference_energy,
        points,
    })
}
