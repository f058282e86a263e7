//! Second-quantized Hamiltonians and their qubit images.

pub mod fermion;
pub mod jordan_wigner;
pub mod plane_wave;
pub mod qubit;

pub use fermion::{FermionOperator, FermionTerm, LadderOperator};
pub use jordan_wigner::jordan_wigner;
pub use plane_wave::{plane_wave_hamiltonian, PlaneWaveOptions, MADELUNG_CONSTANT};
pub use qubit::{Pauli, PauliString, QubitOperator};

/// Coefficients below this magnitude are treated as zero when terms combine.
pub const EQ_TOLERANCE: f64 = 1e-8;
