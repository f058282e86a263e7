//! One VQE calculation on crystalline LiH.
//!
//! A [`LiHProject`] owns the frozen Hamiltonians of a single
//! `(a, n, n_active_el, n_active_orb)` configuration together with the
//! simulation engine that evaluates its UCCSD energies. The optimized
//! result is computed on the first call to [`LiHProject::energy`] and kept
//! until [`LiHProject::recompute_energy`].

use nalgebra::DVector;
use tracing::{debug, info};

use crate::error::Result;
use crate::hamiltonian::{FermionOperator, QubitOperator};
use crate::io::RunConfig;
use crate::optimize::{ConjugateGradient, OptimizationResult};
use crate::pipeline::{ActiveSpace, Pipeline};
use crate::simulator::{QubitRegister, SimulationEngine};
use crate::systems::FORMULA_UNITS;
use crate::wavefunction::{TrialState, UccsdSinglet};

const MSG_CLOSED_FORM: &str = "Closed-form reference determinant, no parameters.";

pub struct LiHProject {
    pipeline: Pipeline,
    engine: SimulationEngine,
    ansatz: UccsdSinglet,
    optimizer: ConjugateGradient,
    initial_amplitude: f64,
    optimization: Option<OptimizationResult>,
    objective_evaluations: usize,
}

impl LiHProject {
    /// Build the project for the active space named in `config`.
    pub fn from_config(config: &RunConfig) -> Result<Self> {
        Self::new(config, config.active_space)
    }

    /// Build the project for `active_space`, taking crystal and optimizer
    /// settings from `config`.
    pub fn new(config: &RunConfig, active_space: ActiveSpace) -> Result<Self> {
        let pipeline = Pipeline::build(&config.crystal, active_space)?;
        let ansatz = UccsdSinglet::new(active_space.n_active_orb, active_space.n_active_el)?
            .with_trotter_steps(config.optimizer.trotter_steps);
        let optimizer = ConjugateGradient::new()
            .with_gtol(config.optimizer.gtol)
            .with_max_iterations(config.optimizer.max_iterations)
            .with_fd_step(config.optimizer.fd_step);

        Ok(Self {
            pipeline,
            engine: SimulationEngine::new(config.optimizer.seed),
            ansatz,
            optimizer,
            initial_amplitude: config.optimizer.initial_amplitude,
            optimization: None,
            objective_evaluations: 0,
        })
    }

    pub fn active_space(&self) -> ActiveSpace {
        self.pipeline.active_space
    }

    pub fn fermion_hamiltonian(&self) -> &FermionOperator {
        &self.pipeline.fermion_hamiltonian
    }

    pub fn qubit_hamiltonian(&self) -> &QubitOperator {
        &self.pipeline.qubit_hamiltonian
    }

    pub fn num_amplitudes(&self) -> usize {
        self.ansatz.num_parameters()
    }

    /// Constant term of the frozen Hamiltonian, for the whole cell.
    pub fn core_energy(&self) -> f64 {
        self.pipeline.core_energy()
    }

    /// Energy per formula unit of the determinant with every core and
    /// active electron in the lowest orbitals.
    pub fn reference_energy(&self) -> f64 {
        let occupied: Vec<usize> = (0..self.ansatz.n_electrons).collect();
        self.pipeline.fermion_hamiltonian.fock_expectation(&occupied).re / FORMULA_UNITS as f64
    }

    /// Starting point of the optimizer.
    pub fn initial_amplitudes(&self) -> DVector<f64> {
        self.ansatz.uniform_parameters(self.initial_amplitude)
    }

    /// Calls made to [`LiHProject::energy_objective`] so far.
    pub fn objective_evaluations(&self) -> usize {
        self.objective_evaluations
    }

    /// Cached optimization, if [`LiHProject::energy`] has run.
    pub fn optimization(&self) -> Option<&OptimizationResult> {
        self.optimization.as_ref()
    }

    /// Cell energy of the UCCSD state with `amplitudes`, frozen core included.
    pub fn energy_objective(&mut self, amplitudes: &DVector<f64>) -> Result<f64> {
        self.objective_evaluations += 1;
        let register = self.engine.allocate_register(self.ansatz.n_qubits)?;
        let energy = self.evaluate(&register, amplitudes);
        // Release the register even when preparation failed.
        self.engine.measure_all(register)?;
        energy
    }

    fn evaluate(&mut self, register: &QubitRegister, amplitudes: &DVector<f64>) -> Result<f64> {
        self.ansatz.prepare(&mut self.engine, register, amplitudes)?;
        self.engine.flush();
        self.engine
            .expectation_value(&self.pipeline.qubit_hamiltonian, register)
    }

    /// Optimized energy per formula unit, computed once and cached.
    pub fn energy(&mut self) -> Result<f64> {
        if let Some(result) = &self.optimization {
            return Ok(result.energy / FORMULA_UNITS as f64);
        }

        let result = if self.pipeline.active_space.n_active_orb == 0 {
            let core = self.core_energy();
            debug!(energy = core, "Active space is empty, using frozen constant");
            OptimizationResult {
                energy: core,
                amplitudes: DVector::zeros(0),
                converged: true,
                iterations: 0,
                function_evaluations: 0,
                gradient_evaluations: 0,
                message: MSG_CLOSED_FORM.to_string(),
                energy_history: vec![core],
            }
        } else {
            let optimizer = self.optimizer.clone();
            let x0 = self.initial_amplitudes();
            let mut objective = |x: &DVector<f64>| self.energy_objective(x);
            optimizer.minimize(&mut objective, &x0)?
        };

        let space = self.pipeline.active_space;
        info!(
            n_active_el = space.n_active_el,
            n_active_orb = space.n_active_orb,
            energy = result.energy,
            per_formula_unit = result.energy / FORMULA_UNITS as f64,
            iterations = result.iterations,
            "Project energy"
        );
        let energy = result.energy / FORMULA_UNITS as f64;
        self.optimization = Some(result);
        Ok(energy)
    }

    /// Drop the cached optimization and run it again.
    pub fn recompute_energy(&mut self) -> Result<f64> {
        self.optimization = None;
        self.energy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VqeError;
    use approx::assert_relative_eq;

    fn seeded_config() -> RunConfig {
        let mut config = RunConfig::default();
        config.optimizer.seed = Some(7);
        config
    }

    #[test]
    fn test_closed_shell_skips_optimizer() {
        // Two points per axis hold exactly the 16 electrons.
        let mut config = seeded_config();
        config.crystal.grid_subdivisions = 2;
        let mut project = LiHProject::new(&config, ActiveSpace::closed_shell()).unwrap();
        assert_eq!(project.num_amplitudes(), 0);
        assert_eq!(project.fermion_hamiltonian().len(), 1);

        let energy = project.energy().unwrap();
        assert_relative_eq!(energy, project.core_energy() / 4.0, epsilon = 1e-12);
        assert_eq!(project.objective_evaluations(), 0);
        assert_relative_eq!(energy, project.reference_energy(), epsilon = 1e-10);
    }

    #[test]
    fn test_objective_releases_register() {
        let config = seeded_config();
        let mut project = LiHProject::new(&config, ActiveSpace::new(2, 4)).unwrap();
        let x0 = project.initial_amplitudes();
        assert_eq!(x0.len(), 2);
        let first = project.energy_objective(&x0).unwrap();
        let second = project.energy_objective(&x0).unwrap();
        assert!(first.is_finite());
        assert_relative_eq!(first, second, epsilon = 1e-12);
        assert_eq!(project.objective_evaluations(), 2);
    }

    #[test]
    fn test_wrong_amplitude_length_keeps_engine_usable() {
        let config = seeded_config();
        let mut project = LiHProject::new(&config, ActiveSpace::new(2, 4)).unwrap();
        let bad = DVector::from_element(5, 0.0);
        assert!(matches!(
            project.energy_objective(&bad),
            Err(VqeError::AmplitudeLength { expected: 2, got: 5 })
        ));
        let zeros = DVector::zeros(2);
        assert!(project.energy_objective(&zeros).is_ok());
    }

    #[test]
    fn test_zero_amplitudes_give_reference() {
        let config = seeded_config();
        let mut project = LiHProject::new(&config, ActiveSpace::new(2, 4)).unwrap();
        let energy = project.energy_objective(&DVector::zeros(2)).unwrap();
        assert_relative_eq!(
            energy / FORMULA_UNITS as f64,
            project.reference_energy(),
            epsilon = 1e-8
        );
    }

    #[test]
    fn test_energy_is_cached_and_variational() {
        let config = seeded_config();
        let mut project = LiHProject::new(&config, ActiveSpace::new(2, 4)).unwrap();
        let energy = project.energy().unwrap();
        let evaluations = project.objective_evaluations();
        assert!(evaluations > 0);

        assert_relative_eq!(project.energy().unwrap(), energy);
        assert_eq!(project.objective_evaluations(), evaluations);
        assert!(energy <= project.reference_energy() + 1e-6);

        let again = project.recompute_energy().unwrap();
        assert_relative_eq!(again, energy, epsilon = 1e-10);
        assert!(project.objective_evaluations() > evaluations);
    }
}
