//! YAML run configuration for the LiH calculations.
//!
//! Every section is optional; missing keys take the defaults of the
//! 7.72 Bohr, 3-subdivision, 2-electrons-in-4-orbitals reference run.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, VqeError};
use crate::hamiltonian::PlaneWaveOptions;
use crate::pipeline::ActiveSpace;

/// Single-particle basis of the Hamiltonian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Basis {
    /// One orbital per grid point
    #[default]
    Dual,
    /// One orbital per reciprocal-lattice vector
    PlaneWave,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrystalConfig {
    /// Cubic lattice constant in Bohr
    pub lattice_constant: f64,
    /// Grid points per axis
    pub grid_subdivisions: usize,
    pub include_constant: bool,
    pub basis: Basis,
    /// Kinetic-energy cutoff in Hartree, plane-wave basis only
    pub e_cutoff: Option<f64>,
}

impl Default for CrystalConfig {
    fn default() -> Self {
        Self {
            lattice_constant: 7.72,
            grid_subdivisions: 3,
            include_constant: false,
            basis: Basis::Dual,
            e_cutoff: None,
        }
    }
}

impl CrystalConfig {
    pub fn plane_wave_options(&self) -> PlaneWaveOptions {
        PlaneWaveOptions {
            spinless: false,
            plane_wave: self.basis == Basis::PlaneWave,
            include_constant: self.include_constant,
            e_cutoff: self.e_cutoff,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Value of every packed amplitude at the starting point
    pub initial_amplitude: f64,
    pub gtol: f64,
    /// Defaults to 200 times the number of amplitudes
    pub max_iterations: Option<usize>,
    /// Forward-difference step of the gradient
    pub fd_step: f64,
    pub trotter_steps: usize,
    /// Measurement RNG seed; entropy when absent
    pub seed: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            initial_amplitude: 0.001,
            gtol: 1e-5,
            max_iterations: None,
            fd_step: f64::EPSILON.sqrt(),
            trotter_steps: 1,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Active spin-orbital counts to evaluate; 0 selects the frozen reference
    pub active_orbitals: Vec<usize>,
    /// `.png` or `.svg`
    pub plot_path: String,
    /// Optional JSON dump of the sweep points
    pub results_path: Option<String>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            active_orbitals: vec![2, 4, 6, 8],
            plot_path: "energies.svg".to_string(),
            results_path: None,
        }
    }
}

/// Complete input of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub crystal: CrystalConfig,
    pub active_space: ActiveSpace,
    pub optimizer: OptimizerConfig,
    pub sweep: SweepConfig,
}

impl RunConfig {
    /// Read and validate a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let config: RunConfig = serde_yaml::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: RunConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges that do not depend on the grid. Active-space bounds are
    /// checked against the grid when the pipeline is built.
    pub fn validate(&self) -> Result<()> {
        let crystal = &self.crystal;
        if !(crystal.lattice_constant.is_finite() && crystal.lattice_constant > 0.0) {
            return Err(VqeError::InvalidConfig(format!(
                "lattice_constant must be positive, got {}",
                crystal.lattice_constant
            )));
        }
        if crystal.grid_subdivisions == 0 {
            return Err(VqeError::InvalidConfig(
                "grid_subdivisions must be at least 1".to_string(),
            ));
        }
        if let Some(cut) = crystal.e_cutoff {
            if !(cut.is_finite() && cut > 0.0) {
                return Err(VqeError::InvalidConfig(format!(
                    "e_cutoff must be positive, got {cut}"
                )));
            }
        }

        let opt = &self.optimizer;
        if !opt.initial_amplitude.is_finite() {
            return Err(VqeError::InvalidConfig(
                "initial_amplitude must be finite".to_string(),
            ));
        }
        if !(opt.gtol.is_finite() && opt.gtol > 0.0) {
            return Err(VqeError::InvalidConfig(format!(
                "gtol must be positive, got {}",
                opt.gtol
            )));
        }
        if !(opt.fd_step.is_finite() && opt.fd_step > 0.0) {
            return Err(VqeError::InvalidConfig(format!(
                "fd_step must be positive, got {}",
                opt.fd_step
            )));
        }
        if opt.trotter_steps == 0 {
            return Err(VqeError::InvalidConfig(
                "trotter_steps must be at least 1".to_string(),
            ));
        }

        if self.sweep.active_orbitals.is_empty() {
            return Err(VqeError::InvalidConfig(
                "sweep.active_orbitals must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_relative_eq!(config.crystal.lattice_constant, 7.72);
        assert_eq!(config.crystal.grid_subdivisions, 3);
        assert_eq!(config.crystal.basis, Basis::Dual);
        assert_eq!(config.active_space.n_active_el, 2);
        assert_eq!(config.active_space.n_active_orb, 4);
        assert_relative_eq!(config.optimizer.fd_step, 1.4901161193847656e-8);
        assert_eq!(config.sweep.active_orbitals, vec![2, 4, 6, 8]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = "
crystal:
  lattice_constant: 4.085
  basis: plane_wave
active_space:
  n_active_orb: 6
sweep:
  active_orbitals: [0, 2]
";
        let config = RunConfig::from_yaml(yaml).unwrap();
        assert_relative_eq!(config.crystal.lattice_constant, 4.085);
        assert_eq!(config.crystal.grid_subdivisions, 3);
        assert!(config.crystal.plane_wave_options().plane_wave);
        assert_eq!(config.active_space.n_active_el, 2);
        assert_eq!(config.active_space.n_active_orb, 6);
        assert_eq!(config.sweep.active_orbitals, vec![0, 2]);
        assert_eq!(config.sweep.plot_path, "energies.svg");
    }

    #[test]
    fn test_invalid_values() {
        let bad_lattice = "crystal:\n  lattice_constant: -1.0\n";
        assert!(matches!(
            RunConfig::from_yaml(bad_lattice),
            Err(VqeError::InvalidConfig(_))
        ));
        let bad_steps = "optimizer:\n  trotter_steps: 0\n";
        assert!(matches!(
            RunConfig::from_yaml(bad_steps),
            Err(VqeError::InvalidConfig(_))
        ));
        assert!(matches!(
            RunConfig::from_yaml("crystal: [1, 2]"),
            Err(VqeError::Yaml(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            RunConfig::from_file("does/not/exist.yml"),
            Err(VqeError::Io(_))
        ));
    }
}
