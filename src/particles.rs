use crate::error::{Error, Result};
use crate::{Scalar, Vec3};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// A single equal-mass body: a comoving position inside the periodic unit
/// box and a physical-unit velocity.
///
/// Every position coordinate lies in `[0, 1)` after construction and after
/// any mutation by the integrator. Velocity starts at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
}

impl Particle {
    /// Validates the coordinate triple: anything outside `[0, 1]` is
    /// rejected with the offending value, an exact `1` wraps to `0`.
    pub fn new(position: [Scalar; 3]) -> Result<Self> {
        let mut pos = Vec3::zeros();
        for (axis, &x) in position.iter().enumerate() {
            if !(0.0..=1.0).contains(&x) {
                return Err(Error::OutOfBounds(x));
            }
            pos[axis] = if x == 1.0 { 0.0 } else { x };
        }
        Ok(Particle {
            position: pos,
            velocity: Vec3::zeros(),
        })
    }
}

/// An ordered, fixed-size collection of particles sharing one mass.
///
/// Constructed once before a run and then mutated in place by the
/// integrator and the expansion rescale; never resized.
#[derive(Debug, Clone)]
pub struct ParticleSet {
    pub mass: Scalar,
    pub particles: Vec<Particle>,
}

impl ParticleSet {
    /// Uniform-random positions on `[0, 1)^3`, deterministic per
    /// `(seed, count)`. Values are consumed particle-major, axis-minor.
    pub fn from_seed(mass: Scalar, count: usize, seed: u64) -> Result<Self> {
        check_mass(mass)?;
        let mut rng = StdRng::seed_from_u64(seed);
        let particles = (0..count)
            .map(|_| Particle::new(rng.gen::<[Scalar; 3]>()))
            .collect::<Result<Vec<_>>>()?;
        Ok(ParticleSet { mass, particles })
    }

    /// Explicit positions, each validated by the `Particle` constructor.
    pub fn from_positions(mass: Scalar, positions: &[[Scalar; 3]]) -> Result<Self> {
        check_mass(mass)?;
        let particles = positions
            .iter()
            .map(|&p| Particle::new(p))
            .collect::<Result<Vec<_>>>()?;
        Ok(ParticleSet { mass, particles })
    }

    /// Explicit positions with a declared count; the count must match the
    /// list length exactly.
    pub fn with_count(mass: Scalar, count: usize, positions: &[[Scalar; 3]]) -> Result<Self> {
        if count != positions.len() {
            return Err(Error::CountMismatch {
                count,
                provided: positions.len(),
            });
        }
        Self::from_positions(mass, positions)
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

fn check_mass(mass: Scalar) -> Result<()> {
    if mass <= 0.0 {
        return Err(Error::InvalidConfiguration {
            name: "mass",
            value: mass,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn boundary_coordinate_wraps_to_zero() {
        let p = Particle::new([1.0, 0.5, 1.0]).unwrap();
        assert_eq!(p.position, Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(p.velocity, Vec3::zeros());
    }

    #[test]
    fn out_of_range_coordinate_is_rejected() {
        for bad in [[1.5, 0.5, 0.5], [0.5, -0.1, 0.5], [0.5, 0.5, 2.0]] {
            match Particle::new(bad) {
                Err(Error::OutOfBounds(_)) => {}
                other => panic!("expected OutOfBounds, got {:?}", other),
            }
        }
    }

    #[test]
    fn non_positive_mass_is_rejected() {
        assert!(ParticleSet::from_seed(0.0, 4, 1).is_err());
        assert!(ParticleSet::from_positions(-1.0, &[[0.5, 0.5, 0.5]]).is_err());
    }

    #[test]
    fn count_mismatch_is_rejected() {
        let err = ParticleSet::with_count(1.0, 3, &[[0.5, 0.5, 0.5]]).unwrap_err();
        match err {
            Error::CountMismatch { count, provided } => {
                assert_eq!((count, provided), (3, 1));
            }
            other => panic!("expected CountMismatch, got {:?}", other),
        }
    }

    #[test]
    fn seeded_construction_is_deterministic() {
        let a = ParticleSet::from_seed(0.01, 32, 42).unwrap();
        let b = ParticleSet::from_seed(0.01, 32, 42).unwrap();
        let c = ParticleSet::from_seed(0.01, 32, 43).unwrap();
        assert_eq!(a.particles, b.particles);
        assert_ne!(a.particles, c.particles);
    }

    proptest! {
        #[test]
        fn random_positions_stay_in_unit_box(seed in 0u64..1000) {
            let set = ParticleSet::from_seed(1.0, 16, seed).unwrap();
            for p in &set.particles {
                for axis in 0..3 {
                    prop_assert!(p.position[axis] >= 0.0 && p.position[axis] < 1.0);
                }
            }
        }
    }
}
