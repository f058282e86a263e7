//! Rock-salt lithium hydride conventional cell.
//!
//! The cubic cell holds four formula units. Nuclei are given in fractional
//! coordinates and scaled by the lattice constant when the Hamiltonian is
//! built.

use nalgebra::Vector3;

use super::crystal::LatticeVector;

/// Formula units of LiH per conventional cell.
pub const FORMULA_UNITS: usize = 4;

/// Nuclear species present in the cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Species {
    Li,
    H,
}

impl Species {
    pub fn nuclear_charge(&self) -> f64 {
        match self {
            Species::Li => 3.0,
            Species::H => 1.0,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Species::Li => "Li",
            Species::H => "H",
        }
    }
}

/// A nucleus at a fractional position in the cell.
#[derive(Debug, Clone, Copy)]
pub struct Nucleus {
    pub species: Species,
    /// Fractional coordinates in [0, 1)
    pub fractional: Vector3<f64>,
}

/// LiH crystal: species and fractional positions of the cell's nuclei.
#[derive(Debug, Clone)]
pub struct LithiumHydride {
    pub nuclei: Vec<Nucleus>,
}

impl LithiumHydride {
    /// Li on the fcc sublattice, H displaced by half a cell edge.
    pub fn rock_salt() -> Self {
        let li_sites = [
            [0.0, 0.0, 0.0],
            [0.0, 0.5, 0.5],
            [0.5, 0.0, 0.5],
            [0.5, 0.5, 0.0],
        ];
        let h_sites = [
            [0.5, 0.5, 0.5],
            [0.5, 0.0, 0.0],
            [0.0, 0.5, 0.0],
            [0.0, 0.0, 0.5],
        ];

        let nuclei = li_sites
            .iter()
            .map(|s| (Species::Li, s))
            .chain(h_sites.iter().map(|s| (Species::H, s)))
            .map(|(species, s)| Nucleus {
                species,
                fractional: Vector3::new(s[0], s[1], s[2]),
            })
            .collect();

        Self { nuclei }
    }

    /// Electrons of the neutral cell.
    pub fn num_electrons(&self) -> usize {
        self.nuclei
            .iter()
            .map(|n| n.species.nuclear_charge() as usize)
            .sum()
    }

    /// Cell contents as a formula, species in order of first appearance.
    pub fn cell_formula(&self) -> String {
        let mut counts: Vec<(Species, usize)> = Vec::new();
        for nucleus in &self.nuclei {
            match counts.iter_mut().find(|(s, _)| *s == nucleus.species) {
                Some((_, count)) => *count += 1,
                None => counts.push((nucleus.species, 1)),
            }
        }
        counts
            .iter()
            .map(|(s, count)| format!("{}{count}", s.symbol()))
            .collect()
    }

    /// `(Z, R)` pairs with Cartesian positions for a cell of the given lattice.
    pub fn charges_and_positions(&self, lattice: &LatticeVector) -> Vec<(f64, Vector3<f64>)> {
        self.nuclei
            .iter()
            .map(|n| (n.species.nuclear_charge(), lattice.to_cartesian(&n.fractional)))
            .collect()
    }
}

impl Default for LithiumHydride {
    fn default() -> Self {
        Self::rock_salt()
    }
}
