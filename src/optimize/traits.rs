//! Objective-function trait for the classical minimizers.

use nalgebra::DVector;

use crate::error::Result;

/// Scalar function minimized by an optimizer.
///
/// Evaluation may mutate state (e.g. a simulation engine), so calls are
/// strictly sequential.
pub trait Objective {
    fn evaluate(&mut self, x: &DVector<f64>) -> Result<f64>;
}

impl<F> Objective for F
where
    F: FnMut(&DVector<f64>) -> Result<f64>,
{
    fn evaluate(&mut self, x: &DVector<f64>) -> Result<f64> {
        self(x)
    }
}

/// Outcome of a minimization.
#[derive(Clone, Debug)]
pub struct OptimizationResult {
    /// Objective value at the final point
    pub energy: f64,
    /// Final point
    pub amplitudes: DVector<f64>,
    /// Whether the gradient tolerance was met
    pub converged: bool,
    /// Completed iterations
    pub iterations: usize,
    /// Objective calls, finite-difference steps included
    pub function_evaluations: usize,
    pub gradient_evaluations: usize,
    /// Termination reason
    pub message: String,
    /// Objective value after each iteration, starting point first
    pub energy_history: Vec<f64>,
}
