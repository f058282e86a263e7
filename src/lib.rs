//! Rust VQE - variational quantum eigensolver for crystalline LiH
//!
//! This crate builds the plane-wave Hamiltonian of a rock-salt LiH cell,
//! freezes it to a small active space, maps it to qubits with the
//! Jordan-Wigner transform and minimizes the energy of a UCCSD-singlet
//! state on a statevector simulator.

pub mod error;
pub mod hamiltonian;
pub mod io;
pub mod optimize;
pub mod pipeline;
pub mod project;
pub mod simulator;
pub mod sweep;
pub mod systems;
pub mod wavefunction;

// Re-export commonly used types at crate root
pub use error::{Result, VqeError};
pub use hamiltonian::{
    jordan_wigner, plane_wave_hamiltonian, FermionOperator, LadderOperator, Pauli, PauliString,
    PlaneWaveOptions, QubitOperator,
};
pub use io::{plot_energies, write_json, Basis, RunConfig};
pub use optimize::{ConjugateGradient, Objective, OptimizationResult};
pub use pipeline::{ActiveSpace, Pipeline};
pub use project::LiHProject;
pub use simulator::{Gate, QubitRegister, SimulationEngine, Statevector};
pub use sweep::{run_sweep, SweepPoint, SweepResult};
pub use systems::{Grid, LatticeVector, LithiumHydride, FORMULA_UNITS};
pub use wavefunction::{uccsd_singlet_generator, uccsd_singlet_paramsize, TrialState, UccsdSinglet};

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::DVector;

    use crate::{ActiveSpace, LiHProject, Pipeline, RunConfig, VqeError};

    fn default_config() -> RunConfig {
        let mut config = RunConfig::default();
        config.optimizer.seed = Some(11);
        config
    }

    #[test]
    fn test_two_electrons_in_four_orbitals() {
        let config = default_config();
        let mut project = LiHProject::from_config(&config).unwrap();
        assert!(!project.fermion_hamiltonian().is_empty());
        assert!(!project.qubit_hamiltonian().is_empty());
        assert_eq!(project.qubit_hamiltonian().num_qubits(), 4);
        assert!(project.qubit_hamiltonian().is_hermitian(1e-10));

        let x0 = project.initial_amplitudes();
        assert_eq!(x0.len(), 2);
        assert!(x0.iter().all(|&t| t == 0.001));
        let energy = project.energy_objective(&x0).unwrap();
        assert!(energy.is_finite());
    }

    #[test]
    fn test_closed_shell_is_constant_only() {
        let config = default_config();
        let mut project = LiHProject::new(&config, ActiveSpace::closed_shell()).unwrap();
        let hamiltonian = project.fermion_hamiltonian();
        assert_eq!(hamiltonian.len(), 1);
        assert_eq!(hamiltonian.num_modes(), 0);

        let constant = project.core_energy();
        assert_relative_eq!(project.energy().unwrap(), constant / 4.0, epsilon = 1e-12);
        assert_eq!(project.objective_evaluations(), 0);
        assert_eq!(project.optimization().map(|r| r.iterations), Some(0));
    }

    #[test]
    fn test_refreezing_closed_shell_is_idempotent() {
        let config = default_config();
        let project = LiHProject::new(&config, ActiveSpace::closed_shell()).unwrap();
        let mut refrozen = project.fermion_hamiltonian().clone();
        let occupied: Vec<usize> = (0..16).collect();
        let unoccupied: Vec<usize> = (16..54).collect();
        refrozen.freeze_orbitals(&occupied, &unoccupied);
        assert_eq!(&refrozen, project.fermion_hamiltonian());
    }

    #[test]
    fn test_frozen_constant_matches_determinant_energy() {
        let config = default_config();
        let (grid, full) = Pipeline::full_hamiltonian(&config.crystal).unwrap();
        assert_eq!(grid.num_spin_orbitals(false), 54);
        assert_eq!(full.num_modes(), 54);

        let occupied: Vec<usize> = (0..16).collect();
        let direct = full.fock_expectation(&occupied);
        assert_relative_eq!(direct.im, 0.0, epsilon = 1e-8);

        let closed = Pipeline::build(&config.crystal, ActiveSpace::closed_shell()).unwrap();
        assert_relative_eq!(closed.core_energy(), direct.re, epsilon = 1e-8, max_relative = 1e-10);
    }

    #[test]
    fn test_active_reference_matches_closed_shell() {
        let config = default_config();
        let active = LiHProject::from_config(&config).unwrap();
        let mut closed = LiHProject::new(&config, ActiveSpace::closed_shell()).unwrap();
        assert_relative_eq!(
            active.reference_energy(),
            closed.energy().unwrap(),
            epsilon = 1e-8,
            max_relative = 1e-10
        );
    }

    #[test]
    fn test_amplitude_length_mismatch() {
        let config = default_config();
        let mut project = LiHProject::from_config(&config).unwrap();
        let wrong = DVector::from_element(3, 0.001);
        assert!(matches!(
            project.energy_objective(&wrong),
            Err(VqeError::AmplitudeLength { expected: 2, got: 3 })
        ));
    }

    #[test]
    fn test_oversized_active_space_rejected() {
        let config = default_config();
        assert!(matches!(
            LiHProject::new(&config, ActiveSpace::new(2, 44)),
            Err(VqeError::ActiveSpaceOutOfRange { .. })
        ));
    }
}
