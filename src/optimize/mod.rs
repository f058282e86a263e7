//! Optimize module - classical minimizers driving the variational loop.

pub mod conjugate_gradient;
mod traits;

pub use conjugate_gradient::ConjugateGradient;
pub use traits::{Objective, OptimizationResult};
