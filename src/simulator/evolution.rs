//! Gate synthesis for `exp(−i t H)` with `H` a real combination of Pauli
//! strings.

use crate::hamiltonian::{Pauli, PauliString, QubitOperator};

use super::statevector::Gate;
use std::f64::consts::FRAC_PI_2;

/// Gates implementing `exp(−i θ/2 · P)` for one Pauli string.
///
/// Each factor is rotated into the Z basis, the parity is collected on the
/// last qubit with a CNOT ladder, `Rz(θ)` is applied and everything is
/// undone in reverse.
pub fn pauli_rotation(string: &PauliString, theta: f64) -> Vec<Gate> {
    let factors = string.factors();
    if factors.is_empty() {
        return Vec::new();
    }

    let mut change = Vec::with_capacity(factors.len());
    let mut undo = Vec::with_capacity(factors.len());
    for &(q, p) in factors {
        match p {
            Pauli::X => {
                change.push(Gate::H(q));
                undo.push(Gate::H(q));
            }
            Pauli::Y => {
                change.push(Gate::Rx(q, FRAC_PI_2));
                undo.push(Gate::Rx(q, -FRAC_PI_2));
            }
            Pauli::Z => {}
        }
    }

    let ladder: Vec<Gate> = factors
        .windows(2)
        .map(|w| Gate::Cnot {
            control: w[0].0,
            target: w[1].0,
        })
        .collect();
    let last = factors[factors.len() - 1].0;

    let mut gates = change;
    gates.extend(ladder.iter().copied());
    gates.push(Gate::Rz(last, theta));
    gates.extend(ladder.iter().rev().copied());
    gates.extend(undo);
    gates
}

/// First-order Trotter circuit for `exp(−i t H)` with `steps` slices.
///
/// Imaginary parts of the coefficients are ignored and the identity term
/// only contributes a global phase.
pub fn trotter_circuit(hamiltonian: &QubitOperator, time: f64, steps: usize) -> Vec<Gate> {
    let steps = steps.max(1);
    let dt = time / steps as f64;
    let slice: Vec<Gate> = hamiltonian
        .terms()
        .iter()
        .flat_map(|(string, coef)| pauli_rotation(string, 2.0 * coef.re * dt))
        .collect();

    let mut gates = Vec::with_capacity(slice.len() * steps);
    for _ in 0..steps {
        gates.extend(slice.iter().copied());
    }
    gates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::statevector::Statevector;
    use approx::assert_relative_eq;
    use num_complex::Complex64;

    fn apply(sv: &mut Statevector, gates: &[Gate]) {
        for g in gates {
            sv.apply(g);
        }
    }

    #[test]
    fn test_identity_term_emits_nothing() {
        assert!(pauli_rotation(&PauliString::identity(), 1.0).is_empty());
    }

    #[test]
    fn test_single_z_rotation() {
        let z = PauliString::from_factors(&[(1, Pauli::Z)]).1;
        assert_eq!(pauli_rotation(&z, 0.5), vec![Gate::Rz(1, 0.5)]);
    }

    #[test]
    fn test_xy_rotation_matches_exact_exponential() {
        // X0 Y1 maps qubit-0-set to i·(qubit-1-set), so the exact result is
        // cos t on index 0b01 and sin t on index 0b10.
        let xy = PauliString::from_factors(&[(0, Pauli::X), (1, Pauli::Y)]).1;
        let t: f64 = 0.3;
        let mut sv = Statevector::new(2);
        sv.apply(&Gate::X(0));
        apply(&mut sv, &pauli_rotation(&xy, 2.0 * t));

        assert_relative_eq!(sv.amplitudes()[0b01].re, t.cos(), epsilon = 1e-12);
        assert_relative_eq!(sv.amplitudes()[0b01].im, 0.0, epsilon = 1e-12);
        assert_relative_eq!(sv.amplitudes()[0b10].re, t.sin(), epsilon = 1e-12);
        assert_relative_eq!(sv.norm_squared(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_trotter_steps_repeat_slices() {
        let mut h = QubitOperator::identity(Complex64::new(3.0, 0.0));
        h.add_term(
            PauliString::from_factors(&[(0, Pauli::X)]).1,
            Complex64::new(0.5, 0.0),
        );
        let one = trotter_circuit(&h, 1.0, 1);
        let four = trotter_circuit(&h, 1.0, 4);
        assert_eq!(one.len(), 3);
        assert_eq!(four.len(), 12);
        assert_eq!(four[1], Gate::Rz(0, 0.25));
    }
}
