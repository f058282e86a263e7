//! LiH Active-Space Sweep Example
//!
//! Energy per formula unit as the active space grows, plotted to an image.
//! Pass `-o 0 ...` to include the fully frozen determinant as a point.
//!
//! Usage:
//!   cargo run --example lih_sweep --release -- [OPTIONS]
//!
//! Options:
//!   -o, --orbitals <N>...   Active spin-orbital counts [default: 2 4 6 8]
//!   -p, --plot <PATH>       Plot file, .svg (labelled) or .png [default: energies.svg]
//!   -j, --json <PATH>       Optional JSON results file

use clap::Parser;
use rust_vqe::{run_sweep, RunConfig};

/// Active-space sweep for crystalline LiH
#[derive(Parser, Debug)]
#[command(version, about = "LiH energy versus active-space size")]
struct Args {
    /// Active spin-orbital counts
    #[arg(short, long, num_args = 1.., default_values_t = vec![2, 4, 6, 8])]
    orbitals: Vec<usize>,

    /// Plot file
    #[arg(short, long, default_value = "energies.svg")]
    plot: String,

    /// JSON results file
    #[arg(short, long)]
    json: Option<String>,
}

fn main() -> rust_vqe::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut config = RunConfig::default();
    config.sweep.active_orbitals = args.orbitals;
    config.sweep.plot_path = args.plot;
    config.sweep.results_path = args.json;
    config.validate()?;

    let result = run_sweep(&config)?;
    result.save(&config)?;

    println!("\nSweep Results:");
    println!("--------------");
    println!("Reference energy:    {:.8} Ha/LiH", result.reference_energy);
    for point in &result.points {
        println!(
            "{:>2} orbitals:        {:.8} Ha/LiH",
            point.n_active_orb, point.energy
        );
    }
    Ok(())
}
