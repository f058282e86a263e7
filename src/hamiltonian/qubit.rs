//! Pauli strings and sparse qubit operators.

use num_complex::Complex64;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{AddAssign, Mul};

use super::EQ_TOLERANCE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Pauli {
    X,
    Y,
    Z,
}

impl Pauli {
    /// `self · other = phase · result`, `None` standing for the identity.
    pub fn product(self, other: Pauli) -> (Complex64, Option<Pauli>) {
        use Pauli::*;
        let i = Complex64::new(0.0, 1.0);
        match (self, other) {
            (X, X) | (Y, Y) | (Z, Z) => (Complex64::new(1.0, 0.0), None),
            (X, Y) => (i, Some(Z)),
            (Y, X) => (-i, Some(Z)),
            (Y, Z) => (i, Some(X)),
            (Z, Y) => (-i, Some(X)),
            (Z, X) => (i, Some(Y)),
            (X, Z) => (-i, Some(Y)),
        }
    }
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Pauli::X => 'X',
            Pauli::Y => 'Y',
            Pauli::Z => 'Z',
        };
        write!(f, "{c}")
    }
}

/// Tensor product of single-qubit Paulis, sorted by qubit with at most one
/// factor per qubit. The empty string is the identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PauliString(Vec<(usize, Pauli)>);

impl PauliString {
    pub fn identity() -> Self {
        Self(Vec::new())
    }

    /// Build from arbitrary `(qubit, pauli)` factors, multiplying repeats
    /// together. Returns the accumulated phase alongside the string.
    pub fn from_factors(factors: &[(usize, Pauli)]) -> (Complex64, Self) {
        factors.iter().fold(
            (Complex64::new(1.0, 0.0), Self::identity()),
            |(phase, acc), &factor| {
                let (p, s) = acc.multiply(&Self(vec![factor]));
                (phase * p, s)
            },
        )
    }

    pub fn factors(&self) -> &[(usize, Pauli)] {
        &self.0
    }

    pub fn is_identity(&self) -> bool {
        self.0.is_empty()
    }

    /// Highest qubit index touched, plus one.
    pub fn width(&self) -> usize {
        self.0.last().map(|&(q, _)| q + 1).unwrap_or(0)
    }

    /// Product `self · other` as `(phase, string)`.
    pub fn multiply(&self, other: &PauliString) -> (Complex64, PauliString) {
        let mut phase = Complex64::new(1.0, 0.0);
        let mut out = Vec::with_capacity(self.0.len() + other.0.len());
        let (mut i, mut j) = (0, 0);

        while i < self.0.len() && j < other.0.len() {
            let (qa, pa) = self.0[i];
            let (qb, pb) = other.0[j];
            if qa < qb {
                out.push((qa, pa));
                i += 1;
            } else if qb < qa {
                out.push((qb, pb));
                j += 1;
            } else {
                let (p, res) = pa.product(pb);
                phase *= p;
                if let Some(res) = res {
                    out.push((qa, res));
                }
                i += 1;
                j += 1;
            }
        }
        out.extend_from_slice(&self.0[i..]);
        out.extend_from_slice(&other.0[j..]);

        (phase, PauliString(out))
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "I");
        }
        for (i, (q, p)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{p}{q}")?;
        }
        Ok(())
    }
}

/// Linear combination of Pauli strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QubitOperator {
    terms: BTreeMap<PauliString, Complex64>,
}

impl QubitOperator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity(coefficient: Complex64) -> Self {
        let mut op = Self::new();
        op.add_term(PauliString::identity(), coefficient);
        op
    }

    /// Single-term operator `coefficient · Π factors`.
    pub fn from_factors(factors: &[(usize, Pauli)], coefficient: Complex64) -> Self {
        let (phase, string) = PauliString::from_factors(factors);
        let mut op = Self::new();
        op.add_term(string, coefficient * phase);
        op
    }

    /// Accumulate into the term, dropping it if the sum falls below
    /// `EQ_TOLERANCE`.
    pub fn add_term(&mut self, string: PauliString, coefficient: Complex64) {
        match self.terms.entry(string) {
            Entry::Occupied(mut entry) => {
                *entry.get_mut() += coefficient;
                if entry.get().norm() < EQ_TOLERANCE {
                    entry.remove();
                }
            }
            Entry::Vacant(entry) => {
                if coefficient.norm() > 0.0 {
                    entry.insert(coefficient);
                }
            }
        }
    }

    pub fn terms(&self) -> &BTreeMap<PauliString, Complex64> {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn constant(&self) -> Complex64 {
        self.terms
            .get(&PauliString::identity())
            .copied()
            .unwrap_or(Complex64::new(0.0, 0.0))
    }

    /// Number of qubits needed to hold every term.
    pub fn num_qubits(&self) -> usize {
        self.terms.keys().map(PauliString::width).max().unwrap_or(0)
    }

    /// Drop terms with `|c| ≤ abs_tol` and discard imaginary parts below it.
    pub fn compress(&mut self, abs_tol: f64) {
        self.terms.retain(|_, c| c.norm() > abs_tol);
        for c in self.terms.values_mut() {
            if c.im.abs() <= abs_tol {
                c.im = 0.0;
            }
        }
    }

    /// Keep the imaginary part of every coefficient as a real coefficient.
    ///
    /// Turns the transform of an anti-Hermitian generator `G = iH` into the
    /// Hermitian `H`.
    pub fn imaginary_part(&self) -> Self {
        let terms = self
            .terms
            .iter()
            .map(|(s, c)| (s.clone(), Complex64::new(c.im, 0.0)))
            .collect();
        Self { terms }
    }

    pub fn is_hermitian(&self, tol: f64) -> bool {
        self.terms.values().all(|c| c.im.abs() <= tol)
    }
}

impl AddAssign<&QubitOperator> for QubitOperator {
    fn add_assign(&mut self, rhs: &QubitOperator) {
        for (s, c) in &rhs.terms {
            self.add_term(s.clone(), *c);
        }
    }
}

impl Mul<&QubitOperator> for &QubitOperator {
    type Output = QubitOperator;

    fn mul(self, rhs: &QubitOperator) -> QubitOperator {
        let mut out = QubitOperator::new();
        for (sa, ca) in &self.terms {
            for (sb, cb) in &rhs.terms {
                let (phase, s) = sa.multiply(sb);
                out.add_term(s, ca * cb * phase);
            }
        }
        out
    }
}

impl fmt::Display for QubitOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (s, c) in &self.terms {
            writeln!(f, "{c} [{s}]")?;
        }
        Ok(())
    }
}
