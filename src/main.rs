use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use rust_vqe::{
    jordan_wigner, run_sweep, LiHProject, LithiumHydride, Pipeline, Result, RunConfig,
    FORMULA_UNITS,
};

#[derive(Parser, Debug)]
#[command(version, about = "VQE energies of crystalline LiH", long_about = None)]
struct Args {
    /// YAML run configuration; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<String>,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Term counts of the full Hamiltonian and its qubit image
    Hamiltonian,
    /// Optimize the configured active space
    Vqe,
    /// Energies over the configured active-space sizes
    Sweep,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(path: Option<&str>) -> Result<RunConfig> {
    match path {
        Some(path) => RunConfig::from_file(path),
        None => Ok(RunConfig::default()),
    }
}

fn run_hamiltonian(config: &RunConfig) -> Result<()> {
    let (grid, hamiltonian) = Pipeline::full_hamiltonian(&config.crystal)?;
    let qubit_hamiltonian = jordan_wigner(&hamiltonian);

    println!("LiH Hamiltonian");
    println!("----------------------------------------");
    println!("Cell: {}", LithiumHydride::rock_salt().cell_formula());
    println!("Lattice constant: {:.4} Bohr", grid.scale);
    println!("Grid subdivisions: {}", grid.subdivisions);
    println!("Spin-orbitals: {}", grid.num_spin_orbitals(false));
    println!("Hamiltonian has {} terms", hamiltonian.len());
    println!("Transformed Hamiltonian has {} terms", qubit_hamiltonian.len());
    Ok(())
}

fn run_vqe(config: &RunConfig) -> Result<()> {
    let mut project = LiHProject::from_config(config)?;
    let initial = project.initial_amplitudes();
    let initial_energy = project.energy_objective(&initial)?;
    let energy = project.energy()?;
    let space = project.active_space();

    println!("VQE Results for Crystalline LiH");
    println!("----------------------------------------");
    println!(
        "Active space: {} electrons in {} spin-orbitals",
        space.n_active_el, space.n_active_orb
    );
    println!("Frozen Hamiltonian has {} terms", project.fermion_hamiltonian().len());
    println!("Qubit Hamiltonian has {} terms", project.qubit_hamiltonian().len());
    println!(
        "Qubit Hamiltonian acts on {} qubits",
        project.qubit_hamiltonian().num_qubits()
    );
    println!("Core energy: {:.8} Ha", project.core_energy());
    println!("Reference energy: {:.8} Ha/LiH", project.reference_energy());
    println!(
        "Initial energy: {:.8} Ha/LiH",
        initial_energy / FORMULA_UNITS as f64
    );
    println!("Optimal UCCSD singlet energy: {:.8} Ha/LiH", energy);
    if let Some(result) = project.optimization() {
        println!("Optimal amplitudes: {:?}", result.amplitudes.as_slice());
        println!("Iterations: {}", result.iterations);
        println!("Function evaluations: {}", result.function_evaluations);
        println!("{}", result.message);
    }
    Ok(())
}

fn run_energy_sweep(config: &RunConfig) -> Result<()> {
    let result = run_sweep(config)?;
    result.save(config)?;

    println!("Active-Space Sweep for Crystalline LiH");
    println!("----------------------------------------");
    println!("Reference energy: {:.8} Ha/LiH", result.reference_energy);
    println!("{:>8} {:>8} {:>16} {:>10}", "n_el", "n_orb", "E (Ha/LiH)", "converged");
    for p in &result.points {
        println!(
            "{:>8} {:>8} {:>16.8} {:>10}",
            p.n_active_el, p.n_active_orb, p.energy, p.converged
        );
    }
    println!("Plot written to {}", config.sweep.plot_path);
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    match args.command {
        Command::Hamiltonian => run_hamiltonian(&config),
        Command::Vqe => run_vqe(&config),
        Command::Sweep => run_energy_sweep(&config),
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        error!("{e}");
        std::process::exit(1);
    }
}
