//! Dense statevector with little-endian qubit order (qubit `q` is bit `q`
//! of the basis index).

use num_complex::Complex64;
use rand::Rng;

use crate::hamiltonian::{Pauli, PauliString, QubitOperator};

/// Gates understood by the simulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    X(usize),
    H(usize),
    Rx(usize, f64),
    Rz(usize, f64),
    Cnot { control: usize, target: usize },
}

impl Gate {
    /// Qubits the gate touches.
    pub fn qubits(&self) -> Vec<usize> {
        match *self {
            Gate::X(q) | Gate::H(q) | Gate::Rx(q, _) | Gate::Rz(q, _) => vec![q],
            Gate::Cnot { control, target } => vec![control, target],
        }
    }
}

/// A quantum state of `num_qubits` qubits.
#[derive(Debug, Clone)]
pub struct Statevector {
    amplitudes: Vec<Complex64>,
    num_qubits: usize,
}

impl Statevector {
    /// |0…0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    pub fn norm_squared(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sqr()).sum()
    }

    /// Apply a gate. Qubit indices are assumed to be in range.
    pub fn apply(&mut self, gate: &Gate) {
        match *gate {
            Gate::X(q) => self.apply_x(q),
            Gate::H(q) => self.apply_h(q),
            Gate::Rx(q, theta) => self.apply_rx(q, theta),
            Gate::Rz(q, theta) => self.apply_rz(q, theta),
            Gate::Cnot { control, target } => self.apply_cnot(control, target),
        }
    }

    fn apply_x(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                self.amplitudes.swap(i, i | mask);
            }
        }
    }

    fn apply_h(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let sqrt2_inv = std::f64::consts::FRAC_1_SQRT_2;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = sqrt2_inv * (a + b);
                self.amplitudes[j] = sqrt2_inv * (a - b);
            }
        }
    }

    fn apply_rx(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let neg_i_s = Complex64::new(0.0, -(theta / 2.0).sin());
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a + neg_i_s * b;
                self.amplitudes[j] = neg_i_s * a + c * b;
            }
        }
    }

    fn apply_rz(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let phase_0 = Complex64::from_polar(1.0, -theta / 2.0);
        let phase_1 = Complex64::from_polar(1.0, theta / 2.0);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            *amp *= if i & mask == 0 { phase_0 } else { phase_1 };
        }
    }

    fn apply_cnot(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if i & ctrl_mask != 0 && i & tgt_mask == 0 {
                self.amplitudes.swap(i, i | tgt_mask);
            }
        }
    }

    /// `⟨ψ|P|ψ⟩` for a single Pauli string.
    ///
    /// Uses `P|b⟩ = i^{n_Y} (−1)^{|b ∧ zy|} |b ⊕ xy⟩`, where `xy` marks the X
    /// and Y factors and `zy` the Z and Y factors.
    pub fn pauli_expectation(&self, string: &PauliString) -> Complex64 {
        let mut flip = 0usize;
        let mut sign_mask = 0usize;
        let mut n_y = 0u32;
        for &(q, p) in string.factors() {
            match p {
                Pauli::X => flip |= 1 << q,
                Pauli::Y => {
                    flip |= 1 << q;
                    sign_mask |= 1 << q;
                    n_y += 1;
                }
                Pauli::Z => sign_mask |= 1 << q,
            }
        }

        let sum: Complex64 = self
            .amplitudes
            .iter()
            .enumerate()
            .map(|(b, amp)| {
                let parity = (b & sign_mask).count_ones() % 2;
                let value = self.amplitudes[b ^ flip].conj() * amp;
                if parity == 1 {
                    -value
                } else {
                    value
                }
            })
            .sum();

        sum * Complex64::new(0.0, 1.0).powu(n_y)
    }

    /// Real part of `⟨ψ|H|ψ⟩`.
    pub fn expectation(&self, operator: &QubitOperator) -> f64 {
        operator
            .terms()
            .iter()
            .map(|(string, coef)| (coef * self.pauli_expectation(string)).re)
            .sum()
    }

    /// Draw a basis state with probability `|ψ_b|²` and collapse onto it.
    pub fn measure_all<R: Rng>(&mut self, rng: &mut R) -> usize {
        let total = self.norm_squared();
        let mut threshold = rng.gen::<f64>() * total;
        let mut outcome = self.amplitudes.len() - 1;
        for (b, amp) in self.amplitudes.iter().enumerate() {
            threshold -= amp.norm_sqr();
            if threshold < 0.0 {
                outcome = b;
                break;
            }
        }

        for amp in self.amplitudes.iter_mut() {
            *amp = Complex64::new(0.0, 0.0);
        }
        self.amplitudes[outcome] = Complex64::new(1.0, 0.0);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f64::consts::PI;

    fn z(q: usize) -> PauliString {
        PauliString::from_factors(&[(q, Pauli::Z)]).1
    }

    #[test]
    fn test_x_flips_bit() {
        let mut sv = Statevector::new(3);
        sv.apply(&Gate::X(1));
        assert_relative_eq!(sv.amplitudes()[0b010].re, 1.0);
        assert_relative_eq!(sv.pauli_expectation(&z(1)).re, -1.0);
        assert_relative_eq!(sv.pauli_expectation(&z(0)).re, 1.0);
    }

    #[test]
    fn test_bell_state_correlations() {
        let mut sv = Statevector::new(2);
        sv.apply(&Gate::H(0));
        sv.apply(&Gate::Cnot { control: 0, target: 1 });
        let xx = PauliString::from_factors(&[(0, Pauli::X), (1, Pauli::X)]).1;
        let yy = PauliString::from_factors(&[(0, Pauli::Y), (1, Pauli::Y)]).1;
        let zz = PauliString::from_factors(&[(0, Pauli::Z), (1, Pauli::Z)]).1;
        assert_relative_eq!(sv.pauli_expectation(&xx).re, 1.0, epsilon = 1e-12);
        assert_relative_eq!(sv.pauli_expectation(&yy).re, -1.0, epsilon = 1e-12);
        assert_relative_eq!(sv.pauli_expectation(&zz).re, 1.0, epsilon = 1e-12);
        assert_relative_eq!(sv.pauli_expectation(&z(0)).re, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rx_half_turn_maps_y_basis() {
        // Rx(π/2) takes |0⟩ to the −Y eigenstate.
        let mut sv = Statevector::new(1);
        sv.apply(&Gate::Rx(0, PI / 2.0));
        let y = PauliString::from_factors(&[(0, Pauli::Y)]).1;
        assert_relative_eq!(sv.pauli_expectation(&y).re, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rz_preserves_norm() {
        let mut sv = Statevector::new(2);
        sv.apply(&Gate::H(0));
        sv.apply(&Gate::Rz(0, 0.37));
        sv.apply(&Gate::Rz(1, -1.2));
        assert_relative_eq!(sv.norm_squared(), 1.0, epsilon = 1e-12);
        let x = PauliString::from_factors(&[(0, Pauli::X)]).1;
        assert_relative_eq!(sv.pauli_expectation(&x).re, 0.37f64.cos(), epsilon = 1e-12);
    }

    #[test]
    fn test_operator_expectation_includes_identity() {
        let mut h = QubitOperator::identity(Complex64::new(-1.5, 0.0));
        h.add_term(z(0), Complex64::new(0.25, 0.0));
        let sv = Statevector::new(1);
        assert_relative_eq!(sv.expectation(&h), -1.25, epsilon = 1e-12);
    }

    #[test]
    fn test_measurement_collapses_basis_state() {
        let mut sv = Statevector::new(2);
        sv.apply(&Gate::X(0));
        sv.apply(&Gate::H(1));
        let mut rng = StdRng::seed_from_u64(7);
        let outcome = sv.measure_all(&mut rng);
        assert_eq!(outcome & 1, 1);
        assert_relative_eq!(sv.amplitudes()[outcome].re, 1.0);
        assert_relative_eq!(sv.norm_squared(), 1.0);
    }
}
