use pm_nbody::diagnostics::correlation_function;
use pm_nbody::{output, ParticleSet, Simulation};

use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use structopt::StructOpt;
use tracing::info;

/// Sweeps the expansion factor over a range of evenly spaced values, runs one
/// simulation per value and gathers the final correlation functions into a
/// single CSV for side-by-side comparison.
#[derive(StructOpt, Debug)]
#[structopt(name = "nbody_comparison")]
struct Opt {
    /// Smallest expansion factor in the sweep
    #[structopt(long, default_value = "1.0")]
    emin: f64,

    /// Largest expansion factor in the sweep
    #[structopt(long, default_value = "1.05")]
    emax: f64,

    /// Number of runs between emin and emax inclusive
    #[structopt(short = "r", long, default_value = "4")]
    runs: usize,

    /// Directory the CSV and manifest are written to
    #[structopt(short = "o", long, parse(from_os_str))]
    output_dir: PathBuf,

    /// Seed shared by every run, so runs differ only in expansion factor
    #[structopt(short = "s", long, default_value = "42")]
    seed: u64,
}

const NUM_CELLS: usize = 101;
const PARTICLES_PER_CELL: usize = 13;
const BOX_WIDTH: f64 = 100.0;
const TOTAL_MASS: f64 = 1e5;
const TIME_MAX: f64 = 1.5;
const TIME_STEP: f64 = 0.01;
const CORRELATION_BINS: usize = 101;

#[derive(Serialize)]
struct SweepManifest {
    seed: u64,
    num_cells: usize,
    num_particles: usize,
    time_max: f64,
    time_step: f64,
    correlation_bins: usize,
    expansion_factors: Vec<f64>,
}

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt::init();
    let opt = Opt::from_args();

    if opt.runs < 2 {
        return Err(eyre::eyre!("sweep needs at least 2 runs"));
    }
    if opt.emin >= opt.emax {
        return Err(eyre::eyre!(
            "emin ({}) must be below emax ({})",
            opt.emin,
            opt.emax
        ));
    }

    let step = (opt.emax - opt.emin) / (opt.runs - 1) as f64;
    let factors: Vec<f64> = (0..opt.runs).map(|i| opt.emin + i as f64 * step).collect();
    let num_particles = NUM_CELLS.pow(3) * PARTICLES_PER_CELL;
    let mass = TOTAL_MASS / num_particles as f64;

    info!(?factors, num_particles, "starting expansion-factor sweep");

    let columns: Vec<Vec<f64>> = factors
        .par_iter()
        .map(|&factor| -> pm_nbody::Result<Vec<f64>> {
            let particles = ParticleSet::from_seed(mass, num_particles, opt.seed)?;
            let mut sim = Simulation::new(
                TIME_MAX,
                TIME_STEP,
                particles,
                BOX_WIDTH,
                NUM_CELLS,
                factor,
            )?;
            sim.run();
            correlation_function(sim.particles(), CORRELATION_BINS)
        })
        .collect::<pm_nbody::Result<_>>()?;

    std::fs::create_dir_all(&opt.output_dir)?;
    let labels: Vec<String> = factors
        .iter()
        .map(|&f| output::trim_trailing_zeros(f))
        .collect();
    output::save_correlations_csv(
        &columns,
        &labels,
        &opt.output_dir.join("correlations.csv"),
    )?;

    let manifest = SweepManifest {
        seed: opt.seed,
        num_cells: NUM_CELLS,
        num_particles,
        time_max: TIME_MAX,
        time_step: TIME_STEP,
        correlation_bins: CORRELATION_BINS,
        expansion_factors: factors,
    };
    let manifest_file = std::fs::File::create(opt.output_dir.join("sweep.json"))?;
    serde_json::to_writer_pretty(manifest_file, &manifest)?;

    info!(output_dir = ?opt.output_dir, "sweep complete");
    Ok(())
}
