use crate::mesh;
use crate::particles::ParticleSet;
use crate::{Scalar, Vec3};
use rayon::prelude::*;

/// One kinematic update from the force field sampled at each particle's
/// current home cell: `v ← v − g·dt`, then `x ← x + v·dt` with every
/// coordinate wrapped back into `[0, 1)`.
///
/// Ordering contract: the gradient must come from a potential computed for
/// the *current* particle positions; a stale field silently produces a wrong
/// trajectory. That is the caller's responsibility, not checked here.
///
/// Each particle reads the shared gradient and writes only its own state, so
/// the loop is parallel over particles.
pub fn apply_forces(particles: &mut ParticleSet, gradient: &[Vec3], n: usize, dt: Scalar) {
    particles.particles.par_iter_mut().for_each(|p| {
        let cell = mesh::home_cell(n, &p.position);
        let g = gradient[mesh::cell_index(n, cell)];

        p.velocity -= g * dt;
        p.position += p.velocity * dt;
        for axis in 0..3 {
            p.position[axis] = wrap_unit(p.position[axis]);
        }
    });
}

/// Comoving expansion rescale: the box grows by `factor` while every
/// physical velocity shrinks by it (Hubble drag). Positions are stored as
/// box fractions and stay untouched.
pub fn expand(particles: &mut ParticleSet, box_width: &mut Scalar, factor: Scalar) {
    *box_width *= factor;
    for p in &mut particles.particles {
        p.velocity /= factor;
    }
}

/// Wraps a coordinate into `[0, 1)`, for displacements of any size.
#[inline]
pub fn wrap_unit(x: Scalar) -> Scalar {
    let wrapped = x.rem_euclid(1.0);
    // rem_euclid rounds to exactly 1.0 for tiny negative inputs
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}
