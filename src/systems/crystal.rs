//! Simple-cubic simulation cell and its real-space discretization grid.

use nalgebra::{Matrix3, Vector3};
use std::f64::consts::PI;

use crate::error::{Result, VqeError};

/// Lattice and reciprocal lattice vectors of a simulation cell.
#[derive(Debug, Clone, Copy)]
pub struct LatticeVector {
    pub lattice_vector: Matrix3<f64>,
    pub reciprocal_vector: Matrix3<f64>,
}

impl LatticeVector {
    pub fn new_cubic(a: f64) -> Self {
        let lattice = Matrix3::from_diagonal_element(a);
        let reciprocal = Matrix3::from_diagonal_element(2.0 * PI / a);

        Self {
            lattice_vector: lattice,
            reciprocal_vector: reciprocal,
        }
    }

    /// Cell volume Ω.
    pub fn volume(&self) -> f64 {
        self.lattice_vector.determinant().abs()
    }

    /// Convert fractional coordinates to Cartesian (Bohr).
    pub fn to_cartesian(&self, fractional: &Vector3<f64>) -> Vector3<f64> {
        self.lattice_vector * fractional
    }
}

/// Uniform 3D grid with `subdivisions` points per axis in a cubic cell of
/// side `scale`.
///
/// Grid points double as the dual-basis orbitals and, through the
/// index-to-momentum map, as the plane-wave basis.
#[derive(Debug, Clone, Copy)]
pub struct Grid {
    /// Points per axis (n)
    pub subdivisions: usize,
    /// Cell side length a (Bohr)
    pub scale: f64,
}

impl Grid {
    pub const DIMENSIONS: usize = 3;

    pub fn new(subdivisions: usize, scale: f64) -> Result<Self> {
        if subdivisions == 0 {
            return Err(VqeError::InvalidConfig(
                "grid subdivisions must be at least 1".to_string(),
            ));
        }
        if !(scale.is_finite() && scale > 0.0) {
            return Err(VqeError::InvalidConfig(format!(
                "lattice constant must be positive, got {scale}"
            )));
        }
        Ok(Self { subdivisions, scale })
    }

    pub fn lattice(&self) -> LatticeVector {
        LatticeVector::new_cubic(self.scale)
    }

    pub fn volume_scale(&self) -> f64 {
        self.scale.powi(Self::DIMENSIONS as i32)
    }

    pub fn num_points(&self) -> usize {
        self.subdivisions.pow(Self::DIMENSIONS as u32)
    }

    /// Number of spin-orbitals, `2·n³` unless spinless.
    pub fn num_spin_orbitals(&self, spinless: bool) -> usize {
        if spinless {
            self.num_points()
        } else {
            2 * self.num_points()
        }
    }

    /// All grid indices, first axis fastest.
    pub fn all_points_indices(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let n = self.subdivisions;
        (0..self.num_points()).map(move |flat| [flat % n, (flat / n) % n, flat / (n * n)])
    }

    /// Integer momentum offsets `i − ⌊n/2⌋` for an index triple.
    pub fn momentum_ints(&self, indices: &[usize; 3]) -> [i64; 3] {
        let shift = (self.subdivisions / 2) as i64;
        indices.map(|i| i as i64 - shift)
    }

    pub fn position_vector(&self, indices: &[usize; 3]) -> Vector3<f64> {
        let ints = self.momentum_ints(indices);
        let n = self.subdivisions as f64;
        Vector3::new(ints[0] as f64, ints[1] as f64, ints[2] as f64) * (self.scale / n)
    }

    pub fn momentum_vector(&self, indices: &[usize; 3]) -> Vector3<f64> {
        let ints = self.momentum_ints(indices);
        Vector3::new(ints[0] as f64, ints[1] as f64, ints[2] as f64) * (2.0 * PI / self.scale)
    }

    /// True for the k = 0 point, which every Coulomb sum skips.
    pub fn is_zero_momentum(&self, indices: &[usize; 3]) -> bool {
        self.momentum_ints(indices).iter().all(|&m| m == 0)
    }

    /// Spin-orbital index of a grid point. `spin` is `None` when spinless.
    pub fn orbital_id(&self, indices: &[usize; 3], spin: Option<usize>) -> usize {
        let n = self.subdivisions;
        let spatial = indices[0] + indices[1] * n + indices[2] * n * n;
        match spin {
            Some(s) => 2 * spatial + s,
            None => spatial,
        }
    }

    /// Component-wise `(a + sign·b) mod n`.
    pub fn wrap_indices(&self, a: &[usize; 3], b: &[i64; 3], sign: i64) -> [usize; 3] {
        let n = self.subdivisions as i64;
        [0, 1, 2].map(|d| (a[d] as i64 + sign * b[d]).rem_euclid(n) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cubic_lattice_volume() {
        let lattice = LatticeVector::new_cubic(7.72);
        assert_relative_eq!(lattice.volume(), 7.72f64.powi(3), epsilon = 1e-10);
        let product = lattice.lattice_vector * lattice.reciprocal_vector.transpose();
        assert_relative_eq!(product[(0, 0)], 2.0 * PI, epsilon = 1e-12);
        assert_relative_eq!(product[(0, 1)], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_grid_counts() {
        let grid = Grid::new(3, 7.72).unwrap();
        assert_eq!(grid.num_points(), 27);
        assert_eq!(grid.num_spin_orbitals(false), 54);
        assert_eq!(grid.num_spin_orbitals(true), 27);
        assert_eq!(grid.all_points_indices().count(), 27);
    }

    #[test]
    fn test_grid_rejects_bad_input() {
        assert!(Grid::new(0, 1.0).is_err());
        assert!(Grid::new(3, 0.0).is_err());
        assert!(Grid::new(3, f64::NAN).is_err());
    }

    #[test]
    fn test_orbital_ids_are_unique() {
        let grid = Grid::new(3, 1.0).unwrap();
        let mut ids: Vec<usize> = grid
            .all_points_indices()
            .flat_map(|idx| [grid.orbital_id(&idx, Some(0)), grid.orbital_id(&idx, Some(1))])
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 54);
        assert_eq!(*ids.last().unwrap(), 53);
    }

    #[test]
    fn test_center_point_has_zero_momentum() {
        let grid = Grid::new(3, 4.0).unwrap();
        assert!(grid.is_zero_momentum(&[1, 1, 1]));
        assert!(!grid.is_zero_momentum(&[0, 1, 1]));
        assert_relative_eq!(grid.momentum_vector(&[2, 1, 1]).x, 2.0 * PI / 4.0);
        assert_relative_eq!(grid.position_vector(&[0, 1, 1]).x, -4.0 / 3.0);
    }

    #[test]
    fn test_wrap_indices() {
        let grid = Grid::new(3, 1.0).unwrap();
        assert_eq!(grid.wrap_indices(&[0, 2, 1], &[1, 1, -1], 1), [1, 0, 0]);
        assert_eq!(grid.wrap_indices(&[0, 2, 1], &[1, 1, -1], -1), [2, 1, 2]);
    }
}
