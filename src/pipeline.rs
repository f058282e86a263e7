//! Hamiltonian pipeline: grid, geometry, plane-wave Hamiltonian, orbital
//! freezing and Jordan-Wigner transform for one configuration.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::{debug, info};

use crate::error::{Result, VqeError};
use crate::hamiltonian::{jordan_wigner, plane_wave_hamiltonian, FermionOperator, QubitOperator};
use crate::io::CrystalConfig;
use crate::systems::{Grid, LithiumHydride};

/// Window of spin-orbitals left unfrozen.
///
/// Orbitals below the window are frozen occupied, orbitals above it frozen
/// empty. The window starts where the core electrons end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveSpace {
    pub n_active_el: usize,
    pub n_active_orb: usize,
}

impl Default for ActiveSpace {
    fn default() -> Self {
        Self {
            n_active_el: 2,
            n_active_orb: 4,
        }
    }
}

impl ActiveSpace {
    pub fn new(n_active_el: usize, n_active_orb: usize) -> Self {
        Self {
            n_active_el,
            n_active_orb,
        }
    }

    /// Frozen reference determinant: nothing active.
    pub fn closed_shell() -> Self {
        Self::new(0, 0)
    }

    /// Check the window fits `n_electrons` in `n_qubits` spin-orbitals.
    pub fn validate(&self, n_electrons: usize, n_qubits: usize) -> Result<()> {
        let fits = self.n_active_el <= n_electrons
            && n_electrons - self.n_active_el + self.n_active_orb <= n_qubits
            && self.n_active_el <= self.n_active_orb;
        if !fits {
            return Err(self.out_of_range(n_electrons, n_qubits));
        }
        if self.n_active_orb % 2 != 0 {
            return Err(VqeError::OddSpinOrbitals(self.n_active_orb));
        }
        Ok(())
    }

    fn out_of_range(&self, n_electrons: usize, n_qubits: usize) -> VqeError {
        VqeError::ActiveSpaceOutOfRange {
            n_active_el: self.n_active_el,
            n_active_orb: self.n_active_orb,
            n_electrons,
            n_qubits,
        }
    }

    /// Spin-orbitals frozen occupied.
    pub fn occupied(&self, n_electrons: usize, n_qubits: usize) -> Result<Range<usize>> {
        match n_electrons.checked_sub(self.n_active_el) {
            Some(end) if end <= n_qubits => Ok(0..end),
            _ => Err(self.out_of_range(n_electrons, n_qubits)),
        }
    }

    /// Spin-orbitals frozen empty.
    pub fn unoccupied(&self, n_electrons: usize, n_qubits: usize) -> Result<Range<usize>> {
        let start = self.occupied(n_electrons, n_qubits)?.end + self.n_active_orb;
        if start > n_qubits {
            return Err(self.out_of_range(n_electrons, n_qubits));
        }
        Ok(start..n_qubits)
    }
}

fn lih_hamiltonian(grid: &Grid, crystal: &CrystalConfig) -> FermionOperator {
    let nuclei = LithiumHydride::rock_salt().charges_and_positions(&grid.lattice());
    plane_wave_hamiltonian(grid, &nuclei, &crystal.plane_wave_options())
}

/// Hamiltonians of one configuration, frozen to its active space.
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub grid: Grid,
    pub active_space: ActiveSpace,
    /// Electrons in the whole cell
    pub n_electrons: usize,
    /// Spin-orbitals before freezing
    pub n_qubits: usize,
    /// Frozen fermionic Hamiltonian; its identity term is the core energy
    pub fermion_hamiltonian: FermionOperator,
    pub qubit_hamiltonian: QubitOperator,
}

impl Pipeline {
    /// Full Hamiltonian of the LiH cell over all `2n³` spin-orbitals.
    pub fn full_hamiltonian(crystal: &CrystalConfig) -> Result<(Grid, FermionOperator)> {
        let grid = Grid::new(crystal.grid_subdivisions, crystal.lattice_constant)?;
        let hamiltonian = lih_hamiltonian(&grid, crystal);
        Ok((grid, hamiltonian))
    }

    pub fn build(crystal: &CrystalConfig, active_space: ActiveSpace) -> Result<Self> {
        let n_electrons = LithiumHydride::rock_salt().num_electrons();
        let grid = Grid::new(crystal.grid_subdivisions, crystal.lattice_constant)?;
        let n_qubits = grid.num_spin_orbitals(false);
        active_space.validate(n_electrons, n_qubits)?;

        let mut fermion_hamiltonian = lih_hamiltonian(&grid, crystal);
        debug!(
            n_qubits,
            terms = fermion_hamiltonian.len(),
            "Freezing orbitals"
        );

        let occupied: Vec<usize> = active_space.occupied(n_electrons, n_qubits)?.collect();
        let unoccupied: Vec<usize> = active_space.unoccupied(n_electrons, n_qubits)?.collect();
        fermion_hamiltonian.freeze_orbitals(&occupied, &unoccupied);
        debug!("Frozen Hamiltonian:\n{fermion_hamiltonian}");

        let qubit_hamiltonian = jordan_wigner(&fermion_hamiltonian);
        debug!("Qubit Hamiltonian:\n{qubit_hamiltonian}");
        info!(
            n_active_el = active_space.n_active_el,
            n_active_orb = active_space.n_active_orb,
            fermion_terms = fermion_hamiltonian.len(),
            qubit_terms = qubit_hamiltonian.len(),
            qubits = qubit_hamiltonian.num_qubits(),
            "Built active-space Hamiltonian"
        );

        Ok(Self {
            grid,
            active_space,
            n_electrons,
            n_qubits,
            fermion_hamiltonian,
            qubit_hamiltonian,
        })
    }

    /// Identity coefficient of the frozen Hamiltonian.
    pub fn core_energy(&self) -> f64 {
        self.fermion_hamiltonian.constant().re
    }
}
