//! Trial-state trait for variational calculations.
//!
//! A trial state knows its register width and parameter count and can queue
//! the gates preparing itself on a freshly allocated register.

use nalgebra::DVector;

use crate::error::Result;
use crate::simulator::{QubitRegister, SimulationEngine};

/// Parameterized quantum state prepared by a gate sequence.
pub trait TrialState {
    /// Register width the state is defined on.
    fn num_qubits(&self) -> usize;

    /// Length of the parameter vector.
    fn num_parameters(&self) -> usize;

    /// Queue the preparation of the state for `params` on `register`.
    /// The engine is not flushed.
    fn prepare(
        &self,
        engine: &mut SimulationEngine,
        register: &QubitRegister,
        params: &DVector<f64>,
    ) -> Result<()>;

    /// Parameter vector with every entry set to `value`.
    fn uniform_parameters(&self, value: f64) -> DVector<f64> {
        DVector::from_element(self.num_parameters(), value)
    }
}
