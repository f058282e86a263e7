//! Simulation engine owning a single live qubit register.
//!
//! Gates are queued and only materialized on [`SimulationEngine::flush`];
//! reading an expectation value with gates still queued is an error. A
//! register is released by measuring it, which consumes its handle.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, instrument};

use super::evolution::trotter_circuit;
use super::statevector::{Gate, Statevector};
use crate::error::{Result, VqeError};
use crate::hamiltonian::QubitOperator;

/// Default register size limit (2²⁴ amplitudes).
pub const DEFAULT_MAX_QUBITS: usize = 24;

/// Handle to the engine's live register. Not `Clone`: exactly one handle
/// exists per allocation and measuring consumes it.
#[derive(Debug)]
pub struct QubitRegister {
    generation: u64,
    size: usize,
}

struct LiveRegister {
    generation: u64,
    state: Statevector,
}

/// Statevector backend with deferred gate execution.
pub struct SimulationEngine {
    live: Option<LiveRegister>,
    pending: Vec<Gate>,
    next_generation: u64,
    max_qubits: usize,
    rng: StdRng,
}

impl SimulationEngine {
    /// Engine with a measurement RNG seeded from `seed`, or from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self {
            live: None,
            pending: Vec::new(),
            next_generation: 0,
            max_qubits: DEFAULT_MAX_QUBITS,
            rng,
        }
    }

    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    pub fn is_allocated(&self) -> bool {
        self.live.is_some()
    }

    /// Allocate `n` qubits in |0…0⟩.
    pub fn allocate_register(&mut self, n: usize) -> Result<QubitRegister> {
        if let Some(live) = &self.live {
            return Err(VqeError::RegisterInUse(live.state.num_qubits()));
        }
        if n > self.max_qubits {
            return Err(VqeError::RegisterTooLarge {
                requested: n,
                limit: self.max_qubits,
            });
        }

        let generation = self.next_generation;
        self.next_generation += 1;
        self.live = Some(LiveRegister {
            generation,
            state: Statevector::new(n),
        });
        Ok(QubitRegister {
            generation,
            size: n,
        })
    }

    fn live_state(&self, register: &QubitRegister) -> Result<&Statevector> {
        match &self.live {
            Some(live) if live.generation == register.generation => Ok(&live.state),
            _ => Err(VqeError::StaleRegister),
        }
    }

    /// Queue a gate on the register.
    pub fn apply(&mut self, register: &QubitRegister, gate: Gate) -> Result<()> {
        self.live_state(register)?;
        if let Some(&qubit) = gate.qubits().iter().find(|&&q| q >= register.size) {
            return Err(VqeError::QubitOutOfRange {
                qubit,
                size: register.size,
            });
        }
        self.pending.push(gate);
        Ok(())
    }

    pub fn apply_all(
        &mut self,
        register: &QubitRegister,
        gates: impl IntoIterator<Item = Gate>,
    ) -> Result<()> {
        for gate in gates {
            self.apply(register, gate)?;
        }
        Ok(())
    }

    /// Queue a Trotterized `exp(−i t H)`.
    pub fn apply_time_evolution(
        &mut self,
        register: &QubitRegister,
        hamiltonian: &QubitOperator,
        time: f64,
        trotter_steps: usize,
    ) -> Result<()> {
        let needed = hamiltonian.num_qubits();
        if needed > register.size {
            return Err(VqeError::OperatorTooWide {
                needed,
                size: register.size,
            });
        }
        self.apply_all(register, trotter_circuit(hamiltonian, time, trotter_steps))
    }

    /// Materialize all queued gates.
    pub fn flush(&mut self) {
        let gates = std::mem::take(&mut self.pending);
        if let Some(live) = self.live.as_mut() {
            for gate in &gates {
                live.state.apply(gate);
            }
        }
        debug!(gates = gates.len(), "Flushed gate queue");
    }

    /// `Re ⟨ψ|H|ψ⟩` of the flushed register state.
    pub fn expectation_value(
        &self,
        operator: &QubitOperator,
        register: &QubitRegister,
    ) -> Result<f64> {
        let state = self.live_state(register)?;
        if !self.pending.is_empty() {
            return Err(VqeError::PendingOperations(self.pending.len()));
        }
        let needed = operator.num_qubits();
        if needed > register.size {
            return Err(VqeError::OperatorTooWide {
                needed,
                size: register.size,
            });
        }
        Ok(state.expectation(operator))
    }

    /// Flush, measure every qubit and release the register.
    ///
    /// Returns the observed basis state, bit `q` holding qubit `q`.
    #[instrument(skip(self, register), fields(qubits = register.size))]
    pub fn measure_all(&mut self, register: QubitRegister) -> Result<usize> {
        self.live_state(&register)?;
        self.flush();
        let mut live = self.live.take().ok_or(VqeError::StaleRegister)?;
        let outcome = live.state.measure_all(&mut self.rng);
        debug!(outcome, "Register measured and released");
        Ok(outcome)
    }

    /// Amplitudes of the flushed state, for inspection.
    pub fn state(&self, register: &QubitRegister) -> Result<&Statevector> {
        if !self.pending.is_empty() {
            return Err(VqeError::PendingOperations(self.pending.len()));
        }
        self.live_state(register)
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new(None)
    }
}
