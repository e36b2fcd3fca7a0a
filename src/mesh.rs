use crate::particles::ParticleSet;
use crate::{Cell, Scalar, Vec3};
use na::Vector3;

/// The one linear-index formula shared by every consumer of the mesh:
/// `idx = k + n·(j + n·i)`, `k` contiguous.
#[inline]
pub fn cell_index(n: usize, coord: Vector3<usize>) -> usize {
    coord.z + n * (coord.y + n * coord.x)
}

/// Home cell of a comoving position: independent floor-scaling of each
/// coordinate by `n`. The `[0, 1)` invariant keeps each component in range;
/// the `min` only guards against a stray `1.0` produced by rounding.
#[inline]
pub fn home_cell(n: usize, position: &Vec3) -> Vector3<usize> {
    position.map(|x| ((x * n as Scalar) as usize).min(n - 1))
}

/// The periodic cubic mesh: three flat complex-valued buffers of `n³` cells
/// plus the index math shared by every consumer.
///
/// Linear index convention is `idx = k + n·(j + n·i)` for cell coordinates
/// `(i, j, k)`, i.e. the `k` axis is contiguous. All three buffers are
/// allocated once and owned by a single `Simulation` for its lifetime.
pub struct MeshGrid {
    pub(crate) n: usize,
    pub density: Vec<Cell>,
    pub potential: Vec<Cell>,
    pub(crate) k_space: Vec<Cell>,
}

impl MeshGrid {
    pub fn new(n: usize) -> Self {
        let num_cells = n * n * n;
        MeshGrid {
            n,
            density: vec![Cell::default(); num_cells],
            potential: vec![Cell::default(); num_cells],
            k_space: vec![Cell::default(); num_cells],
        }
    }

    /// Cells per box edge.
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn num_cells(&self) -> usize {
        self.n * self.n * self.n
    }

    #[inline]
    pub fn coord_to_index(&self, coord: Vector3<usize>) -> usize {
        cell_index(self.n, coord)
    }

    #[inline]
    pub fn index_to_coord(&self, mut idx: usize) -> Vector3<usize> {
        let i = idx / (self.n * self.n);
        idx -= i * self.n * self.n;
        let j = idx / self.n;
        let k = idx % self.n;
        Vector3::new(i, j, k)
    }

    #[inline]
    pub fn home_cell(&self, position: &Vec3) -> Vector3<usize> {
        home_cell(self.n, position)
    }

    /// Nearest-cell (NGP) mass deposition. Clears the density buffer, then
    /// accumulates `mass / cell_volume` into the real part of each
    /// particle's home cell. Not incremental: must be re-run every step.
    pub fn deposit_density(&mut self, particles: &ParticleSet, box_width: Scalar) {
        let cell_width = box_width / self.n as Scalar;
        let cell_volume = cell_width * cell_width * cell_width;
        let weight = particles.mass / cell_volume;

        self.density.fill(Cell::default());
        for p in &particles.particles {
            let idx = self.coord_to_index(self.home_cell(&p.position));
            self.density[idx].re += weight;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn index_coord_round_trip(idx in 0usize..27_000) {
            let grid = MeshGrid::new(30);
            let coord = grid.index_to_coord(idx);
            prop_assert_eq!(grid.coord_to_index(coord), idx);
        }

        #[test]
        fn home_cell_in_bounds(x in 0.0f64..1.0, y in 0.0f64..1.0, z in 0.0f64..1.0) {
            let grid = MeshGrid::new(17);
            let cell = grid.home_cell(&Vec3::new(x, y, z));
            for axis in 0..3 {
                prop_assert!(cell[axis] < 17);
            }
        }
    }

    #[test]
    fn index_convention_is_k_fastest() {
        let grid = MeshGrid::new(10);
        // idx = k + n*(j + n*i)
        assert_eq!(grid.coord_to_index(Vector3::new(3, 2, 1)), 1 + 10 * (2 + 10 * 3));
        assert_eq!(grid.index_to_coord(321), Vector3::new(3, 2, 1));
    }

    #[test]
    fn deposition_clears_previous_contents() {
        let particles =
            crate::ParticleSet::from_positions(0.01, &[[0.45, 0.45, 0.45]]).unwrap();
        let mut grid = MeshGrid::new(10);
        grid.deposit_density(&particles, 1.0);
        grid.deposit_density(&particles, 1.0);

        let idx = grid.coord_to_index(Vector3::new(4, 4, 4));
        let cell_volume = (1.0f64 / 10.0).powi(3);
        let expected = 0.01 / cell_volume;
        assert!((grid.density[idx].re - expected).abs() < 1e-10 * expected);
    }
}
