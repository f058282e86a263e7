//! Wavefunction module - variational trial states prepared on the simulator.

mod traits;
pub mod uccsd;

pub use traits::TrialState;
pub use uccsd::{uccsd_singlet_generator, uccsd_singlet_paramsize, UccsdSinglet};
