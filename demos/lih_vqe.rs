//! LiH VQE Example
//!
//! Freeze all but a few electrons of crystalline LiH and optimize a UCCSD
//! singlet state over the remaining active space.
//!
//! Usage:
//!   cargo run --example lih_vqe --release -- [OPTIONS]

use clap::Parser;
use rust_vqe::{ActiveSpace, LiHProject, RunConfig, FORMULA_UNITS};

/// VQE on crystalline LiH
#[derive(Parser, Debug)]
#[command(version, about = "UCCSD-singlet VQE for crystalline LiH")]
struct Args {
    /// Lattice constant in Bohr
    #[arg(short = 'a', long, default_value_t = 7.72)]
    lattice_constant: f64,

    /// Grid points per axis
    #[arg(short = 'n', long, default_value_t = 3)]
    subdivisions: usize,

    /// Active electrons
    #[arg(short, long, default_value_t = 2)]
    electrons: usize,

    /// Active spin-orbitals
    #[arg(short, long, default_value_t = 4)]
    orbitals: usize,

    /// Trotter slices of the UCCSD evolution
    #[arg(short, long, default_value_t = 1)]
    trotter_steps: usize,

    /// Measurement seed
    #[arg(short, long)]
    seed: Option<u64>,
}

fn main() -> rust_vqe::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut config = RunConfig::default();
    config.crystal.lattice_constant = args.lattice_constant;
    config.crystal.grid_subdivisions = args.subdivisions;
    config.optimizer.trotter_steps = args.trotter_steps;
    config.optimizer.seed = args.seed;
    config.validate()?;

    let space = ActiveSpace::new(args.electrons, args.orbitals);
    let mut project = LiHProject::new(&config, space)?;

    println!("\nActive Space:");
    println!("=============");
    println!("Active electrons:    {}", space.n_active_el);
    println!("Active orbitals:     {}", space.n_active_orb);
    println!("Amplitudes:          {}", project.num_amplitudes());
    println!("Fermion terms:       {}", project.fermion_hamiltonian().len());
    println!("Qubit terms:         {}", project.qubit_hamiltonian().len());
    println!();

    let x0 = project.initial_amplitudes();
    let initial = project.energy_objective(&x0)? / FORMULA_UNITS as f64;

    println!("Running VQE optimization...");
    let energy = project.energy()?;

    println!("\nResults:");
    println!("--------");
    println!("Reference energy:    {:.8} Ha/LiH", project.reference_energy());
    println!("Initial energy:      {:.8} Ha/LiH", initial);
    println!("Optimal energy:      {:.8} Ha/LiH", energy);
    if let Some(result) = project.optimization() {
        println!("Amplitudes:          {:?}", result.amplitudes.as_slice());
        println!("Iterations:          {}", result.iterations);
        println!("Objective calls:     {}", result.function_evaluations);
        println!("Converged:           {}", result.converged);
    }
    Ok(())
}
