use pm_nbody::sim::RunState;
use pm_nbody::{output, ParticleSet, Simulation};

use std::path::PathBuf;
use structopt::StructOpt;
use tracing::info;

/// Watches structure grow: seeds a box with randomly placed equal-mass
/// particles, steps the particle-mesh simulation and writes one projected
/// density image per step.
#[derive(StructOpt, Debug)]
#[structopt(name = "nbody_visualiser")]
struct Opt {
    /// Cells along each edge of the box
    #[structopt(short = "c", long, default_value = "100")]
    num_cells: usize,

    /// Average number of particles per cell
    #[structopt(short = "p", long, default_value = "1.0")]
    particles_per_cell: f64,

    /// Total simulated time
    #[structopt(short = "t", long, default_value = "1.5")]
    time: f64,

    /// Time increment per step
    #[structopt(short = "d", long, default_value = "0.01")]
    time_step: f64,

    /// Comoving expansion factor applied every step
    #[structopt(short = "F", long, default_value = "1.0")]
    expansion_factor: f64,

    /// Directory the frames are written to
    #[structopt(short = "o", long, parse(from_os_str))]
    output_dir: PathBuf,

    /// Seed for the initial particle positions
    #[structopt(short = "s", long, default_value = "42")]
    seed: u64,
}

const BOX_WIDTH: f64 = 100.0;
const TOTAL_MASS: f64 = 1e5;

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt::init();
    let opt = Opt::from_args();

    let num_particles =
        (opt.num_cells.pow(3) as f64 * opt.particles_per_cell).round() as usize;
    if num_particles == 0 {
        return Err(eyre::eyre!(
            "no particles; increase --num-cells or --particles-per-cell"
        ));
    }
    let mass = TOTAL_MASS / num_particles as f64;

    let particles = ParticleSet::from_seed(mass, num_particles, opt.seed)?;
    let mut sim = Simulation::new(
        opt.time,
        opt.time_step,
        particles,
        BOX_WIDTH,
        opt.num_cells,
        opt.expansion_factor,
    )?;

    let run_dir = opt.output_dir.join(format!(
        "F{}_seed{}",
        output::round_trailing_decimal_places(opt.expansion_factor, 3),
        opt.seed
    ));
    std::fs::create_dir_all(&run_dir)?;
    info!(?run_dir, num_particles, mass, "starting visualiser run");

    let mut frame = 0usize;
    while sim.state() != RunState::Finished {
        sim.step();
        let path = run_dir.join(format!("density_{:04}.ppm", frame));
        output::save_density_image(sim.density_buffer(), sim.n_cells(), &path)?;
        info!(frame, time = sim.time(), "wrote density frame");
        frame += 1;
    }

    Ok(())
}
