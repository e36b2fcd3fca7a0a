use crate::error::{Error, Result};
use crate::gradient::gradient_field;
use crate::integrator;
use crate::mesh::MeshGrid;
use crate::particles::ParticleSet;
use crate::poisson::PoissonSolver;
use crate::{Cell, Scalar};
use tracing::{debug, info};

/// Where a run is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Initialized,
    Stepping,
    Finished,
}

/// Owns one complete particle-mesh run: the particle set, the mesh buffers,
/// the FFT plans and the time-stepping loop.
///
/// Buffers and plans are acquired once here and dropped with the simulation;
/// nothing is shared between instances, so a sweep driver can run many
/// simulations concurrently without aliasing scratch state.
pub struct Simulation {
    time_max: Scalar,
    time_step: Scalar,
    expansion_factor: Scalar,
    box_width: Scalar,
    n_cells: usize,
    time: Scalar,
    state: RunState,
    particles: ParticleSet,
    grid: MeshGrid,
    solver: PoissonSolver,
}

impl Simulation {
    /// Validates every run parameter up front; a simulation that constructs
    /// is a simulation that can run.
    pub fn new(
        time_max: Scalar,
        time_step: Scalar,
        particles: ParticleSet,
        box_width: Scalar,
        n_cells: usize,
        expansion_factor: Scalar,
    ) -> Result<Self> {
        check_positive("time_max", time_max)?;
        check_positive("time_step", time_step)?;
        check_positive("box_width", box_width)?;
        check_positive("expansion_factor", expansion_factor)?;
        if n_cells == 0 {
            return Err(Error::InvalidConfiguration {
                name: "number_of_cells",
                value: 0.0,
            });
        }

        Ok(Simulation {
            time_max,
            time_step,
            expansion_factor,
            box_width,
            n_cells,
            time: 0.0,
            state: RunState::Initialized,
            particles,
            grid: MeshGrid::new(n_cells),
            solver: PoissonSolver::new(n_cells),
        })
    }

    /// NGP deposition of the current particle positions into the density
    /// buffer (cleared first).
    pub fn fill_density(&mut self) {
        self.grid.deposit_density(&self.particles, self.box_width);
    }

    /// Spectral Poisson solve of the current density buffer into the
    /// potential buffer.
    pub fn fill_potential(&mut self) {
        self.solver.solve(&mut self.grid, self.box_width);
    }

    /// One full step: density → potential → force sampling and kinematic
    /// update → expansion rescale → advance time. Returns the state after
    /// the step; calling on a finished run is a no-op.
    pub fn step(&mut self) -> RunState {
        if self.state == RunState::Finished {
            return self.state;
        }
        self.state = RunState::Stepping;

        self.fill_density();
        self.fill_potential();
        let gradient = gradient_field(&self.grid.potential, self.n_cells, self.box_width);
        integrator::apply_forces(
            &mut self.particles,
            &gradient,
            self.n_cells,
            self.time_step,
        );
        integrator::expand(
            &mut self.particles,
            &mut self.box_width,
            self.expansion_factor,
        );

        self.time += self.time_step;
        debug!(time = self.time, box_width = self.box_width, "step complete");
        if self.time >= self.time_max {
            self.state = RunState::Finished;
        }
        self.state
    }

    /// Steps until the accumulated time reaches `time_max`.
    pub fn run(&mut self) {
        info!(
            particles = self.particles.len(),
            n_cells = self.n_cells,
            time_max = self.time_max,
            time_step = self.time_step,
            expansion_factor = self.expansion_factor,
            "starting particle-mesh run"
        );
        while self.step() != RunState::Finished {}
        info!(time = self.time, box_width = self.box_width, "run finished");
    }

    pub fn density_buffer(&self) -> &[Cell] {
        &self.grid.density
    }

    pub fn potential_buffer(&self) -> &[Cell] {
        &self.grid.potential
    }

    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    pub fn grid(&self) -> &MeshGrid {
        &self.grid
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn time(&self) -> Scalar {
        self.time
    }

    pub fn box_width(&self) -> Scalar {
        self.box_width
    }

    pub fn n_cells(&self) -> usize {
        self.n_cells
    }
}

fn check_positive(name: &'static str, value: Scalar) -> Result<()> {
    if value <= 0.0 {
        return Err(Error::InvalidConfiguration { name, value });
    }
    Ok(())
}
