//! Statevector quantum simulator used to evaluate variational energies.

pub mod engine;
pub mod evolution;
pub mod statevector;

pub use engine::{QubitRegister, SimulationEngine, DEFAULT_MAX_QUBITS};
pub use evolution::{pauli_rotation, trotter_circuit};
pub use statevector::{Gate, Statevector};
