//! Sparse second-quantized fermionic operators.
//!
//! A term is an ordered product of ladder operators read left to right, so
//! `[a†_0, a_1]` stands for `a†_0 a_1`. The empty product is the identity.

use num_complex::Complex64;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::AddAssign;

use super::EQ_TOLERANCE;

/// A single creation (`raise = true`) or annihilation operator on a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LadderOperator {
    pub mode: usize,
    pub raise: bool,
}

impl LadderOperator {
    pub fn create(mode: usize) -> Self {
        Self { mode, raise: true }
    }

    pub fn annihilate(mode: usize) -> Self {
        Self { mode, raise: false }
    }
}

impl fmt::Display for LadderOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.raise {
            write!(f, "{}^", self.mode)
        } else {
            write!(f, "{}", self.mode)
        }
    }
}

pub type FermionTerm = Vec<LadderOperator>;

/// Linear combination of ladder-operator products.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FermionOperator {
    terms: BTreeMap<FermionTerm, Complex64>,
}

impl FermionOperator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operator holding only `coefficient · 1`.
    pub fn identity(coefficient: f64) -> Self {
        let mut op = Self::new();
        op.add_term(Vec::new(), Complex64::new(coefficient, 0.0));
        op
    }

    /// Accumulate `coefficient · term`. Entries whose coefficient is below
    /// `EQ_TOLERANCE` are neither inserted nor kept.
    pub fn add_term(&mut self, term: FermionTerm, coefficient: Complex64) {
        match self.terms.entry(term) {
            Entry::Occupied(mut entry) => {
                *entry.get_mut() += coefficient;
                if entry.get().norm() < EQ_TOLERANCE {
                    entry.remove();
                }
            }
            Entry::Vacant(entry) => {
                if coefficient.norm() >= EQ_TOLERANCE {
                    entry.insert(coefficient);
                }
            }
        }
    }

    pub fn terms(&self) -> &BTreeMap<FermionTerm, Complex64> {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Coefficient of the identity term, zero when absent.
    pub fn constant(&self) -> Complex64 {
        self.terms
            .get(&Vec::new())
            .copied()
            .unwrap_or(Complex64::new(0.0, 0.0))
    }

    /// One past the highest mode index any term touches.
    pub fn num_modes(&self) -> usize {
        self.terms
            .keys()
            .flat_map(|t| t.iter().map(|op| op.mode + 1))
            .max()
            .unwrap_or(0)
    }

    /// Hermitian conjugate: reverse each product, flip every action and
    /// conjugate the coefficient.
    pub fn hermitian_conjugate(&self) -> Self {
        let mut out = Self::new();
        for (term, coef) in &self.terms {
            let conj: FermionTerm = term
                .iter()
                .rev()
                .map(|op| LadderOperator {
                    mode: op.mode,
                    raise: !op.raise,
                })
                .collect();
            out.add_term(conj, coef.conj());
        }
        out
    }

    /// Fix the orbitals in `occupied` to 1 and those in `unoccupied` to 0,
    /// projecting them out of every term in place.
    ///
    /// Surviving terms are renumbered so the remaining modes are contiguous
    /// from zero in their original order. Terms acting only on frozen modes
    /// fold into the identity.
    pub fn freeze_orbitals(&mut self, occupied: &[usize], unoccupied: &[usize]) {
        let frozen: Vec<(usize, bool)> = occupied
            .iter()
            .map(|&i| (i, true))
            .chain(unoccupied.iter().map(|&i| (i, false)))
            .collect();

        for &(index, occupancy) in &frozen {
            let mut projected = Self::new();
            for (term, &coef) in &self.terms {
                let mut kept = Vec::with_capacity(term.len());
                let mut coef = coef;
                let mut current = occupancy;
                let mut n_ops = 0usize;
                let mut n_swaps = 0usize;

                // Walk right to left, carrying ops on `index` past the rest.
                for (pos, op) in term.iter().rev().enumerate() {
                    if op.mode == index {
                        n_ops += 1;
                        n_swaps += pos + 1 - n_ops;
                        if current == op.raise {
                            coef = Complex64::new(0.0, 0.0);
                        }
                        current = !current;
                    } else {
                        kept.push(*op);
                    }
                }
                kept.reverse();

                if n_swaps % 2 == 1 {
                    coef = -coef;
                }
                if coef.norm() > 0.0 && current == occupancy {
                    projected.add_term(kept, coef);
                }
            }
            self.terms = projected.terms;
        }

        // Bra and ket creation operators of occupied orbitals must meet.
        for (term, coef) in self.terms.iter_mut() {
            let flips: usize = occupied
                .iter()
                .map(|&idx| term.iter().filter(|op| op.mode > idx).count())
                .sum();
            if flips % 2 == 1 {
                *coef = -*coef;
            }
        }

        let removed: BTreeSet<usize> = frozen.iter().map(|&(i, _)| i).collect();
        self.renumber_without(&removed);
    }

    fn renumber_without(&mut self, removed: &BTreeSet<usize>) {
        if removed.is_empty() {
            return;
        }
        let terms = std::mem::take(&mut self.terms);
        for (term, coef) in terms {
            let shifted = term
                .into_iter()
                .map(|op| LadderOperator {
                    mode: op.mode - removed.range(..op.mode).count(),
                    raise: op.raise,
                })
                .collect();
            self.add_term(shifted, coef);
        }
    }

    /// `⟨Φ|H|Φ⟩` for the Slater determinant with the given modes occupied.
    pub fn fock_expectation(&self, occupied: &[usize]) -> Complex64 {
        let reference: BTreeSet<usize> = occupied.iter().copied().collect();
        let mut total = Complex64::new(0.0, 0.0);

        'terms: for (term, coef) in &self.terms {
            let mut state = reference.clone();
            let mut sign = 1.0;
            for op in term.iter().rev() {
                if state.contains(&op.mode) == op.raise {
                    continue 'terms;
                }
                if state.range(..op.mode).count() % 2 == 1 {
                    sign = -sign;
                }
                if op.raise {
                    state.insert(op.mode);
                } else {
                    state.remove(&op.mode);
                }
            }
            if state == reference {
                total += coef * sign;
            }
        }
        total
    }
}

impl AddAssign<&FermionOperator> for FermionOperator {
    fn add_assign(&mut self, rhs: &FermionOperator) {
        for (term, coef) in &rhs.terms {
            self.add_term(term.clone(), *coef);
        }
    }
}

impl fmt::Display for FermionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (term, coef) in &self.terms {
            write!(f, "{coef} [")?;
            for (i, op) in term.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{op}")?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    fn number(mode: usize) -> FermionTerm {
        vec![LadderOperator::create(mode), LadderOperator::annihilate(mode)]
    }

    #[test]
    fn test_add_term_cancels_below_tolerance() {
        let mut op = FermionOperator::new();
        op.add_term(number(0), c(1.0));
        op.add_term(number(1), c(2.0));
        op.add_term(number(0), c(-1.0 + 1e-10));
        assert_eq!(op.len(), 1);
        assert_relative_eq!(op.terms()[&number(1)].re, 2.0);
    }

    #[test]
    fn test_tiny_coefficients_never_stored() {
        let mut op = FermionOperator::new();
        op.add_term(number(0), c(1e-15));
        op.add_term(number(1), Complex64::new(0.0, 5e-9));
        assert!(op.is_empty());

        op.add_term(number(2), c(2e-8));
        assert_eq!(op.len(), 1);
    }

    #[test]
    fn test_display_lists_terms() {
        let mut op = FermionOperator::new();
        op.add_term(vec![LadderOperator::create(1), LadderOperator::annihilate(0)], c(0.5));
        let text = op.to_string();
        assert!(text.contains("[1^ 0]"));
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_num_modes_and_constant() {
        let mut op = FermionOperator::identity(0.5);
        op.add_term(vec![LadderOperator::create(4), LadderOperator::annihilate(2)], c(1.0));
        assert_eq!(op.num_modes(), 5);
        assert_relative_eq!(op.constant().re, 0.5);
    }

    #[test]
    fn test_hermitian_conjugate_of_hopping() {
        let mut op = FermionOperator::new();
        op.add_term(
            vec![LadderOperator::create(0), LadderOperator::annihilate(1)],
            Complex64::new(0.0, 1.0),
        );
        let conj = op.hermitian_conjugate();
        let key = vec![LadderOperator::create(1), LadderOperator::annihilate(0)];
        assert_relative_eq!(conj.terms()[&key].im, -1.0);
    }

    #[test]
    fn test_freeze_occupied_number_operator() {
        let mut op = FermionOperator::new();
        op.add_term(number(0), c(2.0));
        op.add_term(number(1), c(3.0));
        op.freeze_orbitals(&[0], &[]);
        assert_relative_eq!(op.constant().re, 2.0);
        assert_relative_eq!(op.terms()[&number(0)].re, 3.0);
        assert_eq!(op.len(), 2);
    }

    #[test]
    fn test_freeze_unoccupied_drops_terms() {
        let mut op = FermionOperator::new();
        op.add_term(number(0), c(2.0));
        op.add_term(vec![LadderOperator::create(0), LadderOperator::annihilate(1)], c(1.0));
        op.freeze_orbitals(&[], &[1]);
        assert_eq!(op.len(), 1);
        assert_relative_eq!(op.terms()[&number(0)].re, 2.0);
    }

    #[test]
    fn test_freeze_pair_interaction_to_constant() {
        // n_0 n_1 written as a†_0 a_0 a†_1 a_1 with both orbitals filled.
        let mut op = FermionOperator::new();
        let mut term = number(0);
        term.extend(number(1));
        op.add_term(term.clone(), c(0.7));
        let mut swapped = vec![
            LadderOperator::create(0),
            LadderOperator::create(1),
            LadderOperator::annihilate(1),
            LadderOperator::annihilate(0),
        ];
        op.add_term(swapped.clone(), c(0.2));
        swapped.swap(2, 3);
        op.add_term(swapped, c(0.1));

        let expected = op.fock_expectation(&[0, 1]);
        assert_relative_eq!(expected.re, 0.7 + 0.2 - 0.1, epsilon = 1e-12);

        op.freeze_orbitals(&[0, 1], &[]);
        assert_eq!(op.len(), 1);
        assert_relative_eq!(op.constant().re, expected.re, epsilon = 1e-12);
    }

    #[test]
    fn test_freeze_sign_past_occupied_core() {
        // a†_1 n_0 a_2 reduces to plain hopping once orbital 0 is filled.
        let mut op = FermionOperator::new();
        op.add_term(
            vec![
                LadderOperator::create(1),
                LadderOperator::create(0),
                LadderOperator::annihilate(0),
                LadderOperator::annihilate(2),
            ],
            c(1.0),
        );
        op.freeze_orbitals(&[0], &[]);
        let key = vec![LadderOperator::create(0), LadderOperator::annihilate(1)];
        assert_eq!(op.len(), 1);
        assert_relative_eq!(op.terms()[&key].re, 1.0);
    }

    #[test]
    fn test_renumbering_after_freeze() {
        let mut op = FermionOperator::new();
        op.add_term(vec![LadderOperator::create(3), LadderOperator::annihilate(5)], c(1.0));
        op.freeze_orbitals(&[0, 1], &[4, 6]);
        let key = vec![LadderOperator::create(1), LadderOperator::annihilate(2)];
        assert!(op.terms().contains_key(&key));
        assert_eq!(op.num_modes(), 3);
    }

    #[test]
    fn test_fock_expectation_hopping_vanishes() {
        let mut op = FermionOperator::new();
        op.add_term(vec![LadderOperator::create(0), LadderOperator::annihilate(1)], c(1.0));
        op.add_term(number(1), c(4.0));
        assert_relative_eq!(op.fock_expectation(&[1]).re, 4.0);
        assert_relative_eq!(op.fock_expectation(&[0]).re, 0.0);
    }
}
