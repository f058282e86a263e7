//! LiH Hamiltonian Example
//!
//! Build the dual-basis Hamiltonian of the rock-salt LiH cell and report
//! its size before and after the Jordan-Wigner transform.
//!
//! Usage:
//!   cargo run --example lih_hamiltonian --release -- [OPTIONS]
//!
//! Options:
//!   -a, --lattice-constant <BOHR>  Lattice constant in Bohr [default: 4.085]
//!   -n, --subdivisions <N>         Grid points per axis [default: 3]
//!       --plane-wave               Use the momentum basis
//!       --no-constant              Leave out the Madelung constant

use clap::Parser;
use rust_vqe::io::CrystalConfig;
use rust_vqe::{jordan_wigner, Basis, LithiumHydride, Pipeline};

/// LiH plane-wave Hamiltonian
#[derive(Parser, Debug)]
#[command(version, about = "Term counts of the LiH plane-wave Hamiltonian")]
struct Args {
    /// Lattice constant in Bohr
    #[arg(short = 'a', long, default_value_t = 4.085)]
    lattice_constant: f64,

    /// Grid points per axis
    #[arg(short = 'n', long, default_value_t = 3)]
    subdivisions: usize,

    /// Momentum basis instead of the dual basis
    #[arg(long)]
    plane_wave: bool,

    /// Leave out the Madelung constant
    #[arg(long)]
    no_constant: bool,
}

fn main() -> rust_vqe::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let crystal = CrystalConfig {
        lattice_constant: args.lattice_constant,
        grid_subdivisions: args.subdivisions,
        include_constant: !args.no_constant,
        basis: if args.plane_wave {
            Basis::PlaneWave
        } else {
            Basis::Dual
        },
        e_cutoff: None,
    };

    let (grid, hamiltonian) = Pipeline::full_hamiltonian(&crystal)?;
    println!("{} cell, a = {:.4} Bohr", LithiumHydride::rock_salt().cell_formula(), grid.scale);
    println!("Hamiltonian has {} terms", hamiltonian.len());
    println!("Constant term: {:.8} Ha", hamiltonian.constant().re);

    let qubit_hamiltonian = jordan_wigner(&hamiltonian);
    println!("Transformed Hamiltonian has {} terms", qubit_hamiltonian.len());
    println!(
        "Acts on {} of {} qubits",
        qubit_hamiltonian.num_qubits(),
        grid.num_spin_orbitals(false)
    );
    Ok(())
}
