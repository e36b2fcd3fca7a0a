pub mod diagnostics;
pub mod error;
pub mod gradient;
pub mod integrator;
pub mod mesh;
pub mod output;
pub mod particles;
pub mod poisson;
pub mod sim;

extern crate nalgebra as na;

pub use crate::error::{Error, Result};
pub use crate::particles::{Particle, ParticleSet};
pub use crate::sim::Simulation;

pub type Scalar = f64;
pub type Vec3 = na::Vector3<Scalar>;

/// Complex grid cell type shared by the density/potential/k-space buffers.
pub type Cell = rustfft::num_complex::Complex<Scalar>;
