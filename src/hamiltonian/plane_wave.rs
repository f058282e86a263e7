//! Periodic electronic-structure Hamiltonian on a cubic grid.
//!
//! Two discretizations are supported. The dual basis (default) places one
//! spatial orbital on each grid point, giving diagonal Coulomb terms. The
//! plane-wave basis uses one orbital per reciprocal-lattice vector. Both
//! omit the `k = 0` component of every Coulomb sum, which cancels against
//! the neutralizing background.

use nalgebra::Vector3;
use num_complex::Complex64;
use std::f64::consts::PI;
use tracing::{debug, info};

use super::fermion::{FermionOperator, LadderOperator};
use crate::systems::Grid;

/// Madelung constant of the uniform electron gas in a simple-cubic cell,
/// in units of `1/a`.
pub const MADELUNG_CONSTANT: f64 = 2.8372;

/// Flags controlling the Hamiltonian construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaneWaveOptions {
    /// One orbital per grid point instead of two
    pub spinless: bool,
    /// Momentum basis instead of the dual (position) basis
    pub plane_wave: bool,
    /// Add the Madelung term to the identity coefficient
    pub include_constant: bool,
    /// Skip momentum transfers with `|k|²/2` above this (plane-wave basis only)
    pub e_cutoff: Option<f64>,
}

impl PlaneWaveOptions {
    fn spins(&self) -> Vec<Option<usize>> {
        if self.spinless {
            vec![None]
        } else {
            vec![Some(0), Some(1)]
        }
    }

    fn above_cutoff(&self, momentum_squared: f64) -> bool {
        self.e_cutoff
            .map(|cut| momentum_squared / 2.0 > cut)
            .unwrap_or(false)
    }
}

/// Build the electronic Hamiltonian of `nuclei` (charge, Cartesian position)
/// in the periodic cell described by `grid`.
///
/// An empty `nuclei` slice gives the jellium model.
pub fn plane_wave_hamiltonian(
    grid: &Grid,
    nuclei: &[(f64, Vector3<f64>)],
    options: &PlaneWaveOptions,
) -> FermionOperator {
    let mut hamiltonian = if options.plane_wave {
        let mut op = plane_wave_kinetic(grid, options);
        op += &plane_wave_potential(grid, options);
        op += &plane_wave_external_potential(grid, nuclei, options);
        op
    } else {
        let mut op = dual_basis_jellium(grid, options);
        op += &dual_basis_external_potential(grid, nuclei, options);
        op
    };

    if options.include_constant {
        hamiltonian += &FermionOperator::identity(MADELUNG_CONSTANT / grid.scale);
    }

    info!(
        subdivisions = grid.subdivisions,
        lattice_constant = grid.scale,
        plane_wave = options.plane_wave,
        terms = hamiltonian.len(),
        "Built fermionic Hamiltonian"
    );
    hamiltonian
}

fn number_term(orbital: usize) -> Vec<LadderOperator> {
    vec![LadderOperator::create(orbital), LadderOperator::annihilate(orbital)]
}

fn real(x: f64) -> Complex64 {
    Complex64::new(x, 0.0)
}

/// Kinetic and electron-electron terms in the dual basis.
fn dual_basis_jellium(grid: &Grid, options: &PlaneWaveOptions) -> FermionOperator {
    let mut operator = FermionOperator::new();
    let spins = options.spins();
    let n_points = grid.num_points() as f64;
    let prefactor = 2.0 * PI / grid.volume_scale();
    let n = grid.subdivisions;

    let momenta: Vec<(Vector3<f64>, f64)> = grid
        .all_points_indices()
        .filter(|k| !grid.is_zero_momentum(k))
        .map(|k| {
            let v = grid.momentum_vector(&k);
            (v, v.norm_squared())
        })
        .collect();

    let origin = [0usize; 3];
    let origin_position = grid.position_vector(&origin);

    for indices_b in grid.all_points_indices() {
        let difference = grid.position_vector(&indices_b) - origin_position;

        let (kinetic, potential) = momenta.iter().fold((0.0, 0.0), |(t, v), (k, k2)| {
            let cos_difference = k.dot(&difference).cos();
            (
                t + cos_difference * k2 / (2.0 * n_points),
                v + prefactor * cos_difference / k2,
            )
        });

        for shift in grid.all_points_indices() {
            let index_a = shift;
            let index_b = [0, 1, 2].map(|d| (indices_b[d] + shift[d]) % n);

            for &spin in &spins {
                let orbital_a = grid.orbital_id(&index_a, spin);
                let orbital_b = grid.orbital_id(&index_b, spin);
                operator.add_term(
                    vec![
                        LadderOperator::create(orbital_a),
                        LadderOperator::annihilate(orbital_b),
                    ],
                    real(kinetic),
                );
            }

            for &spin_a in &spins {
                for &spin_b in &spins {
                    let orbital_a = grid.orbital_id(&index_a, spin_a);
                    let orbital_b = grid.orbital_id(&index_b, spin_b);
                    if orbital_a == orbital_b {
                        continue;
                    }
                    let mut term = number_term(orbital_a);
                    term.extend(number_term(orbital_b));
                    operator.add_term(term, real(potential));
                }
            }
        }
    }

    debug!(terms = operator.len(), "Dual-basis jellium terms");
    operator
}

/// Electron-nuclear attraction in the dual basis.
fn dual_basis_external_potential(
    grid: &Grid,
    nuclei: &[(f64, Vector3<f64>)],
    options: &PlaneWaveOptions,
) -> FermionOperator {
    let mut operator = FermionOperator::new();
    let spins = options.spins();
    let prefactor = -4.0 * PI / grid.volume_scale();

    for indices_p in grid.all_points_indices() {
        let position_p = grid.position_vector(&indices_p);
        for (charge, position_j) in nuclei {
            for k_indices in grid.all_points_indices() {
                if grid.is_zero_momentum(&k_indices) {
                    continue;
                }
                let k = grid.momentum_vector(&k_indices);
                let coefficient =
                    prefactor / k.norm_squared() * charge * k.dot(&(position_j - position_p)).cos();
                for &spin in &spins {
                    let orbital = grid.orbital_id(&indices_p, spin);
                    operator.add_term(number_term(orbital), real(coefficient));
                }
            }
        }
    }

    operator
}

/// Diagonal kinetic energy `|k|²/2` in the plane-wave basis.
fn plane_wave_kinetic(grid: &Grid, options: &PlaneWaveOptions) -> FermionOperator {
    let mut operator = FermionOperator::new();
    for k_indices in grid.all_points_indices() {
        let k2 = grid.momentum_vector(&k_indices).norm_squared();
        if options.above_cutoff(k2) {
            continue;
        }
        for spin in options.spins() {
            let orbital = grid.orbital_id(&k_indices, spin);
            operator.add_term(number_term(orbital), real(k2 / 2.0));
        }
    }
    operator
}

/// Electron-electron repulsion `(2π/Ω)/|ω|² a†_a a†_b a_{b+ω} a_{a−ω}`.
fn plane_wave_potential(grid: &Grid, options: &PlaneWaveOptions) -> FermionOperator {
    let mut operator = FermionOperator::new();
    let spins = options.spins();
    let prefactor = 2.0 * PI / grid.volume_scale();

    for omega_indices in grid.all_points_indices() {
        if grid.is_zero_momentum(&omega_indices) {
            continue;
        }
        let shifted_omega = grid.momentum_ints(&omega_indices);
        let omega2 = grid.momentum_vector(&omega_indices).norm_squared();
        if options.above_cutoff(omega2) {
            continue;
        }
        let coefficient = real(prefactor / omega2);

        for indices_a in grid.all_points_indices() {
            let indices_d = grid.wrap_indices(&indices_a, &shifted_omega, -1);
            for indices_b in grid.all_points_indices() {
                let indices_c = grid.wrap_indices(&indices_b, &shifted_omega, 1);
                for &spin_a in &spins {
                    let orbital_a = grid.orbital_id(&indices_a, spin_a);
                    let orbital_d = grid.orbital_id(&indices_d, spin_a);
                    for &spin_b in &spins {
                        let orbital_b = grid.orbital_id(&indices_b, spin_b);
                        let orbital_c = grid.orbital_id(&indices_c, spin_b);
                        if orbital_a == orbital_b || orbital_c == orbital_d {
                            continue;
                        }
                        operator.add_term(
                            vec![
                                LadderOperator::create(orbital_a),
                                LadderOperator::create(orbital_b),
                                LadderOperator::annihilate(orbital_c),
                                LadderOperator::annihilate(orbital_d),
                            ],
                            coefficient,
                        );
                    }
                }
            }
        }
    }

    debug!(terms = operator.len(), "Plane-wave two-body terms");
    operator
}

/// Electron-nuclear attraction coupling plane waves `p` and `q`.
fn plane_wave_external_potential(
    grid: &Grid,
    nuclei: &[(f64, Vector3<f64>)],
    options: &PlaneWaveOptions,
) -> FermionOperator {
    let mut operator = FermionOperator::new();
    let spins = options.spins();
    let prefactor = -4.0 * PI / grid.volume_scale();
    let half = (grid.subdivisions / 2) as i64;

    for indices_p in grid.all_points_indices() {
        for indices_q in grid.all_points_indices() {
            let q_ints = indices_q.map(|i| i as i64 - half);
            let transfer = grid.wrap_indices(&indices_p, &q_ints, -1);
            if grid.is_zero_momentum(&transfer) {
                continue;
            }
            let k = grid.momentum_vector(&transfer);
            let k2 = k.norm_squared();
            if options.above_cutoff(k2) {
                continue;
            }

            let coefficient: Complex64 = nuclei
                .iter()
                .map(|(charge, position)| {
                    Complex64::from_polar(prefactor / k2 * charge, -k.dot(position))
                })
                .sum();

            for &spin in &spins {
                let orbital_p = grid.orbital_id(&indices_p, spin);
                let orbital_q = grid.orbital_id(&indices_q, spin);
                operator.add_term(
                    vec![
                        LadderOperator::create(orbital_p),
                        LadderOperator::annihilate(orbital_q),
                    ],
                    coefficient,
                );
            }
        }
    }

    operator
}
