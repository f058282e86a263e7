//! Jordan-Wigner mapping from fermionic modes to qubits.
//!
//! Mode `j` maps to qubit `j`; the parity of all lower modes is carried by a
//! string of `Z` operators:
//!
//! `a†_j = ½ (X_j − i Y_j) Z_{j−1} … Z_0`
//! `a_j  = ½ (X_j + i Y_j) Z_{j−1} … Z_0`

use num_complex::Complex64;
use std::collections::HashMap;
use tracing::debug;

use super::fermion::{FermionOperator, LadderOperator};
use super::qubit::{Pauli, PauliString, QubitOperator};

/// Qubit image of a single ladder operator.
fn ladder_to_qubits(op: &LadderOperator) -> QubitOperator {
    let z_string: Vec<(usize, Pauli)> = (0..op.mode).map(|q| (q, Pauli::Z)).collect();
    let with = |p: Pauli| {
        let mut factors = z_string.clone();
        factors.push((op.mode, p));
        PauliString::from_factors(&factors).1
    };
    let y_sign = if op.raise { -0.5 } else { 0.5 };

    let mut out = QubitOperator::new();
    out.add_term(with(Pauli::X), Complex64::new(0.5, 0.0));
    out.add_term(with(Pauli::Y), Complex64::new(0.0, y_sign));
    out
}

/// Transform a fermionic operator term by term.
pub fn jordan_wigner(fermion: &FermionOperator) -> QubitOperator {
    let mut cache: HashMap<LadderOperator, QubitOperator> = HashMap::new();
    let mut out = QubitOperator::new();

    for (term, coef) in fermion.terms() {
        let mut product = QubitOperator::identity(*coef);
        for op in term {
            let image = cache.entry(*op).or_insert_with(|| ladder_to_qubits(op));
            product = &product * &*image;
        }
        out += &product;
    }

    debug!(
        fermion_terms = fermion.len(),
        qubit_terms = out.len(),
        "Jordan-Wigner transform"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn test_number_operator() {
        // n_2 = ½ (1 − Z_2)
        let mut op = FermionOperator::new();
        op.add_term(vec![LadderOperator::create(2), LadderOperator::annihilate(2)], c(1.0));
        let q = jordan_wigner(&op);
        assert_eq!(q.len(), 2);
        assert_relative_eq!(q.constant().re, 0.5);
        let z2 = PauliString::from_factors(&[(2, Pauli::Z)]).1;
        assert_relative_eq!(q.terms()[&z2].re, -0.5);
    }

    #[test]
    fn test_hopping_is_hermitian() {
        let mut op = FermionOperator::new();
        op.add_term(vec![LadderOperator::create(0), LadderOperator::annihilate(2)], c(1.0));
        op.add_term(vec![LadderOperator::create(2), LadderOperator::annihilate(0)], c(1.0));
        let q = jordan_wigner(&op);
        // ½ (X0 Z1 X2 + Y0 Z1 Y2)
        assert_eq!(q.len(), 2);
        assert!(q.is_hermitian(1e-12));
        let xzx = PauliString::from_factors(&[(0, Pauli::X), (1, Pauli::Z), (2, Pauli::X)]).1;
        assert_relative_eq!(q.terms()[&xzx].re, 0.5);
    }

    #[test]
    fn test_anticommutation() {
        // {a_1, a†_1} = 1
        let mut op = FermionOperator::new();
        op.add_term(vec![LadderOperator::annihilate(1), LadderOperator::create(1)], c(1.0));
        op.add_term(vec![LadderOperator::create(1), LadderOperator::annihilate(1)], c(1.0));
        let q = jordan_wigner(&op);
        assert_eq!(q.len(), 1);
        assert_relative_eq!(q.constant().re, 1.0);
    }

    #[test]
    fn test_pauli_exclusion() {
        let mut op = FermionOperator::new();
        op.add_term(vec![LadderOperator::create(3), LadderOperator::create(3)], c(1.0));
        assert!(jordan_wigner(&op).is_empty());
    }
}
