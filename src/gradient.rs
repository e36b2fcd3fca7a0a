use crate::{Cell, Scalar, Vec3};
use rayon::prelude::*;

/// Central-difference gradient of a potential-shaped buffer.
///
/// Pure function of the supplied buffer, cell count and box width: each cell
/// gets `(φ[+1] - φ[-1]) / (2·cell_width)` along every axis, with periodic
/// index wraparound. Only the real part of the field enters the result.
///
/// Used on the live potential by the integrator and on synthetic closed-form
/// fields by the tests, so it must not touch any other simulation state.
pub fn gradient_field(buffer: &[Cell], n: usize, box_width: Scalar) -> Vec<Vec3> {
    assert_eq!(buffer.len(), n * n * n);
    let cell_width = box_width / n as Scalar;
    let half_inv = 1.0 / (2.0 * cell_width);

    let mut out = vec![Vec3::zeros(); n * n * n];
    out.par_chunks_mut(n * n).enumerate().for_each(|(i, slab)| {
        let i_up = (i + 1) % n;
        let i_down = (i + n - 1) % n;
        for j in 0..n {
            let j_up = (j + 1) % n;
            let j_down = (j + n - 1) % n;
            for k in 0..n {
                let k_up = (k + 1) % n;
                let k_down = (k + n - 1) % n;

                let at = |i: usize, j: usize, k: usize| buffer[k + n * (j + n * i)].re;

                slab[k + n * j] = Vec3::new(
                    (at(i_up, j, k) - at(i_down, j, k)) * half_inv,
                    (at(i, j_up, k) - at(i, j_down, k)) * half_inv,
                    (at(i, j, k_up) - at(i, j, k_down)) * half_inv,
                );
            }
        }
    });
    out
}
