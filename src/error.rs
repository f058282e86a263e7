//! Error types for the VQE pipeline.

use thiserror::Error;

/// Errors that can occur while building or evaluating a LiH calculation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VqeError {
    /// A configuration value is outside its valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The requested active window does not fit in the orbital space.
    #[error(
        "Active space of {n_active_el} electrons in {n_active_orb} orbitals does not fit \
         {n_electrons} electrons in {n_qubits} spin-orbitals"
    )]
    ActiveSpaceOutOfRange {
        /// Active electrons requested.
        n_active_el: usize,
        /// Active spin-orbitals requested.
        n_active_orb: usize,
        /// Total electrons in the cell.
        n_electrons: usize,
        /// Total spin-orbitals of the grid.
        n_qubits: usize,
    },

    /// Singlet excitations pair up alpha and beta spin-orbitals.
    #[error("The total number of spin-orbitals should be even, got {0}")]
    OddSpinOrbitals(usize),

    /// Packed amplitude vector has the wrong length for the ansatz.
    #[error("Expected {expected} packed amplitudes, got {got}")]
    AmplitudeLength {
        /// Length required by the ansatz.
        expected: usize,
        /// Length supplied by the caller.
        got: usize,
    },

    /// Gate addressed a qubit outside the register.
    #[error("Qubit {qubit} out of range for register of {size} qubits")]
    QubitOutOfRange {
        /// Offending qubit index.
        qubit: usize,
        /// Register size.
        size: usize,
    },

    /// A register is still live on the engine.
    #[error("A qubit register of {0} qubits is already allocated; measure it before reallocating")]
    RegisterInUse(usize),

    /// The register handle belongs to an earlier allocation.
    #[error("Register handle does not match the live allocation")]
    StaleRegister,

    /// Register exceeds the simulator's memory limit.
    #[error("Register of {requested} qubits exceeds simulator limit of {limit}")]
    RegisterTooLarge {
        /// Requested qubits.
        requested: usize,
        /// Maximum supported qubits.
        limit: usize,
    },

    /// Queued gates have not been materialized yet.
    #[error("{0} pending operations must be flushed before evaluation")]
    PendingOperations(usize),

    /// Observable touches qubits the register does not have.
    #[error("Operator acts on {needed} qubits but register has {size}")]
    OperatorTooWide {
        /// Qubits the operator needs.
        needed: usize,
        /// Register size.
        size: usize,
    },

    /// Objective produced NaN or infinity.
    #[error("Objective returned non-finite value {0}")]
    NonFiniteObjective(f64),

    /// File system failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML (de)serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Rendering the energy plot failed.
    #[error("Plotting failed: {0}")]
    Plot(String),
}

/// Result type for VQE operations.
pub type Result<T> = std::result::Result<T, VqeError>;
