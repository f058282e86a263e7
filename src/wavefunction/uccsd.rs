//! Spin-adapted unitary coupled-cluster singles and doubles (UCCSD) ansatz.
//!
//! Spin-orbital `2i` is spatial orbital `i` spin up, `2i + 1` spin down. The
//! lowest `⌈n_electrons/2⌉` spatial orbitals are occupied in the reference.
//! Packed amplitudes are laid out as
//!
//! - `t1`: one single per (virtual, occupied) spatial pair,
//! - `t2_1`: one paired double per (virtual, occupied) pair,
//! - `t2_2`: one double per unordered pair of (virtual, occupied) pairs.

use nalgebra::DVector;
use num_complex::Complex64;

use super::traits::TrialState;
use crate::error::{Result, VqeError};
use crate::hamiltonian::{jordan_wigner, FermionOperator, LadderOperator, QubitOperator};
use crate::simulator::{Gate, QubitRegister, SimulationEngine};

/// Tolerance used when compressing the qubit generator.
const GENERATOR_TOLERANCE: f64 = 1e-12;

fn up_index(spatial: usize) -> usize {
    2 * spatial
}

fn down_index(spatial: usize) -> usize {
    2 * spatial + 1
}

/// `(n_occupied, n_virtual)` spatial orbital counts.
fn spatial_partition(n_qubits: usize, n_electrons: usize) -> Result<(usize, usize)> {
    if n_qubits % 2 != 0 {
        return Err(VqeError::OddSpinOrbitals(n_qubits));
    }
    let n_occupied = n_electrons.div_ceil(2);
    Ok((n_occupied, (n_qubits / 2).saturating_sub(n_occupied)))
}

/// Number of packed amplitudes for `n_electrons` in `n_qubits` spin-orbitals.
pub fn uccsd_singlet_paramsize(n_qubits: usize, n_electrons: usize) -> Result<usize> {
    let (n_occupied, n_virtual) = spatial_partition(n_qubits, n_electrons)?;
    let n_single = n_occupied * n_virtual;
    Ok(n_single + n_single * (n_single + 1) / 2)
}

/// Anti-Hermitian singlet generator `T − T†` for packed amplitudes.
pub fn uccsd_singlet_generator(
    packed_amplitudes: &DVector<f64>,
    n_qubits: usize,
    n_electrons: usize,
) -> Result<FermionOperator> {
    let (n_occupied, n_virtual) = spatial_partition(n_qubits, n_electrons)?;
    let expected = uccsd_singlet_paramsize(n_qubits, n_electrons)?;
    if packed_amplitudes.len() != expected {
        return Err(VqeError::AmplitudeLength {
            expected,
            got: packed_amplitudes.len(),
        });
    }

    let n_single = n_occupied * n_virtual;
    let t1 = packed_amplitudes.rows(0, n_single);
    let t2_1 = packed_amplitudes.rows(n_single, n_single);
    let t2_2 = packed_amplitudes.rows(2 * n_single, expected - 2 * n_single);

    let spin_index: [fn(usize) -> usize; 2] = [up_index, down_index];
    let pairs: Vec<(usize, usize)> = (0..n_virtual)
        .flat_map(|p| (0..n_occupied).map(move |q| (n_occupied + p, q)))
        .collect();

    let mut generator = FermionOperator::new();
    let mut excite = |term: Vec<LadderOperator>, coeff: f64| {
        let adjoint = term
            .iter()
            .rev()
            .map(|op| LadderOperator {
                mode: op.mode,
                raise: !op.raise,
            })
            .collect();
        generator.add_term(term, Complex64::new(coeff, 0.0));
        generator.add_term(adjoint, Complex64::new(-coeff, 0.0));
    };

    for (i, &(virtual_spatial, occupied_spatial)) in pairs.iter().enumerate() {
        for spin in 0..2 {
            let this = spin_index[spin];
            let other = spin_index[1 - spin];

            excite(
                vec![
                    LadderOperator::create(this(virtual_spatial)),
                    LadderOperator::annihilate(this(occupied_spatial)),
                ],
                t1[i],
            );
            excite(
                vec![
                    LadderOperator::create(this(virtual_spatial)),
                    LadderOperator::annihilate(this(occupied_spatial)),
                    LadderOperator::create(other(virtual_spatial)),
                    LadderOperator::annihilate(other(occupied_spatial)),
                ],
                t2_1[i],
            );
        }
    }

    let combos = pairs
        .iter()
        .enumerate()
        .flat_map(|(i, a)| pairs[i + 1..].iter().map(move |b| (*a, *b)));
    for (i, ((virtual_1, occupied_1), (virtual_2, occupied_2))) in combos.enumerate() {
        for spin_a in 0..2 {
            for spin_b in 0..2 {
                let index_a = spin_index[spin_a];
                let index_b = spin_index[spin_b];
                excite(
                    vec![
                        LadderOperator::create(index_a(virtual_1)),
                        LadderOperator::annihilate(index_a(occupied_1)),
                        LadderOperator::create(index_b(virtual_2)),
                        LadderOperator::annihilate(index_b(occupied_2)),
                    ],
                    t2_2[i],
                );
            }
        }
    }

    Ok(generator)
}

/// UCCSD singlet state on `n_qubits` spin-orbitals holding `n_electrons`.
#[derive(Debug, Clone, Copy)]
pub struct UccsdSinglet {
    pub n_qubits: usize,
    pub n_electrons: usize,
    /// First-order Trotter slices used for the evolution
    pub trotter_steps: usize,
}

impl UccsdSinglet {
    pub fn new(n_qubits: usize, n_electrons: usize) -> Result<Self> {
        spatial_partition(n_qubits, n_electrons)?;
        Ok(Self {
            n_qubits,
            n_electrons,
            trotter_steps: 1,
        })
    }

    pub fn with_trotter_steps(mut self, steps: usize) -> Self {
        self.trotter_steps = steps.max(1);
        self
    }

    /// Hermitian `H_gen` with `T − T† = i·H_gen` after Jordan-Wigner, so the
    /// cluster operator is `exp(−i·H_gen)`.
    pub fn evolution_hamiltonian(&self, packed_amplitudes: &DVector<f64>) -> Result<QubitOperator> {
        let generator =
            uccsd_singlet_generator(packed_amplitudes, self.n_qubits, self.n_electrons)?;
        let mut hamiltonian = jordan_wigner(&generator).imaginary_part();
        hamiltonian.compress(GENERATOR_TOLERANCE);
        Ok(hamiltonian)
    }

    /// X on each of the `n_electrons` lowest qubits.
    pub fn hartree_fock_gates(&self) -> Vec<Gate> {
        (0..self.n_electrons).map(Gate::X).collect()
    }
}

impl TrialState for UccsdSinglet {
    fn num_qubits(&self) -> usize {
        self.n_qubits
    }

    fn num_parameters(&self) -> usize {
        uccsd_singlet_paramsize(self.n_qubits, self.n_electrons).unwrap_or(0)
    }

    fn prepare(
        &self,
        engine: &mut SimulationEngine,
        register: &QubitRegister,
        params: &DVector<f64>,
    ) -> Result<()> {
        let hamiltonian = self.evolution_hamiltonian(params)?;
        engine.apply_all(register, self.hartree_fock_gates())?;
        engine.apply_time_evolution(register, &hamiltonian, 1.0, self.trotter_steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hamiltonian::{Pauli, PauliString};
    use approx::assert_relative_eq;

    #[test]
    fn test_paramsize() {
        assert_eq!(uccsd_singlet_paramsize(4, 2).unwrap(), 2);
        assert_eq!(uccsd_singlet_paramsize(8, 2).unwrap(), 9);
        assert_eq!(uccsd_singlet_paramsize(8, 4).unwrap(), 14);
        assert_eq!(uccsd_singlet_paramsize(2, 2).unwrap(), 0);
        assert_eq!(uccsd_singlet_paramsize(0, 0).unwrap(), 0);
        assert!(matches!(
            uccsd_singlet_paramsize(5, 2),
            Err(VqeError::OddSpinOrbitals(5))
        ));
    }

    #[test]
    fn test_generator_rejects_wrong_length() {
        let amps = DVector::from_element(3, 0.1);
        assert!(matches!(
            uccsd_singlet_generator(&amps, 4, 2),
            Err(VqeError::AmplitudeLength { expected: 2, got: 3 })
        ));
    }

    #[test]
    fn test_generator_is_anti_hermitian() {
        let amps = DVector::from_vec(vec![0.1, -0.2, 0.3, 0.05, 0.07, 0.11, 0.13, 0.17, 0.19]);
        let generator = uccsd_singlet_generator(&amps, 8, 2).unwrap();
        let mut sum = generator.hermitian_conjugate();
        sum += &generator;
        assert!(sum.is_empty());
    }

    #[test]
    fn test_single_amplitude_terms() {
        // 2 electrons in 4 spin-orbitals: one single t1 = 0.25 between
        // spatial 0 and 1 in both spins.
        let amps = DVector::from_vec(vec![0.25, 0.0]);
        let generator = uccsd_singlet_generator(&amps, 4, 2).unwrap();
        assert_eq!(generator.len(), 4);
        let up = vec![LadderOperator::create(2), LadderOperator::annihilate(0)];
        assert_relative_eq!(generator.terms()[&up].re, 0.25);
    }

    #[test]
    fn test_evolution_hamiltonian_is_real() {
        let ansatz = UccsdSinglet::new(4, 2).unwrap();
        let h = ansatz
            .evolution_hamiltonian(&DVector::from_vec(vec![0.3, 0.0]))
            .unwrap();
        assert!(h.is_hermitian(1e-12));
        // Singles a†_2 a_0 − h.c. map to ½(Y0 Z1 X2 − X0 Z1 Y2) per spin.
        let yzx = PauliString::from_factors(&[(0, Pauli::Y), (1, Pauli::Z), (2, Pauli::X)]).1;
        assert_relative_eq!(h.terms()[&yzx].re.abs(), 0.15, epsilon = 1e-12);
        assert_eq!(h.len(), 4);
    }

    #[test]
    fn test_zero_amplitudes_keep_reference() {
        let ansatz = UccsdSinglet::new(4, 2).unwrap();
        let mut engine = SimulationEngine::new(Some(0));
        let reg = engine.allocate_register(4).unwrap();
        ansatz
            .prepare(&mut engine, &reg, &ansatz.uniform_parameters(0.0))
            .unwrap();
        engine.flush();
        let state = engine.state(&reg).unwrap();
        assert_relative_eq!(state.amplitudes()[0b0011].norm(), 1.0, epsilon = 1e-12);
        engine.measure_all(reg).unwrap();
    }

    #[test]
    fn test_paired_double_preserves_norm_and_particle_number() {
        let ansatz = UccsdSinglet::new(4, 2).unwrap();
        let mut engine = SimulationEngine::new(Some(0));
        let reg = engine.allocate_register(4).unwrap();
        ansatz
            .prepare(&mut engine, &reg, &DVector::from_vec(vec![0.0, 0.4]))
            .unwrap();
        engine.flush();
        let state = engine.state(&reg).unwrap();
        assert_relative_eq!(state.norm_squared(), 1.0, epsilon = 1e-12);
        for (b, amp) in state.amplitudes().iter().enumerate() {
            if (b as u32).count_ones() != 2 {
                assert_relative_eq!(amp.norm(), 0.0, epsilon = 1e-12);
            }
        }
        assert!(state.amplitudes()[0b1100].norm() > 0.1);
    }
}
