use nalgebra::{Unit, Vector3};
use rand::Rng;
use rand_distr::StandardNormal;

/// Gaussian triples with a norm below this are rejected as numerically degenerate.
pub const MIN_DIRECTION_NORM: f64 = 1e-12;

/// Draws a direction uniformly distributed over the unit sphere.
///
/// Three independent standard-normal components are normalized by their Euclidean
/// norm. Returns `None` when the draw is too close to the origin to normalize; the
/// caller is expected to draw again.
pub fn sample_isotropic_direction(rng: &mut impl Rng) -> Option<Unit<Vector3<f64>>> {
    let raw = Vector3::new(
        rng.sample::<f64, _>(StandardNormal),
        rng.sample::<f64, _>(StandardNormal),
        rng.sample::<f64, _>(StandardNormal),
    );
    Unit::try_new(raw, MIN_DIRECTION_NORM)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const TRIALS: usize = 20_000;

    fn draw_many(seed: u64) -> Vec<Vector3<f64>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..TRIALS)
            .map(|_| sample_isotropic_direction(&mut rng).unwrap().into_inner())
            .collect()
    }

    #[test]
    fn sampled_directions_have_unit_norm() {
        for v in draw_many(7) {
            assert!((v.norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn component_means_converge_to_zero() {
        let samples = draw_many(11);
        let mean = samples.iter().fold(Vector3::zeros(), |acc, v| acc + v) / TRIALS as f64;
        // Each component has variance 1/3, so the standard error is ~0.004.
        for i in 0..3 {
            assert!(mean[i].abs() < 0.02, "component {} mean {}", i, mean[i]);
        }
    }

    #[test]
    fn single_component_is_uniform_on_the_interval() {
        // A point uniform on the sphere has each Cartesian component uniform on [-1, 1].
        let samples = draw_many(13);
        let mut bins = [0usize; 4];
        for v in &samples {
            let bin = (((v.z + 1.0) / 2.0) * 4.0).floor().clamp(0.0, 3.0) as usize;
            bins[bin] += 1;
        }
        let expected = TRIALS as f64 / 4.0;
        for count in bins {
            assert!(
                (count as f64 - expected).abs() / expected < 0.05,
                "bins {:?}",
                bins
            );
        }

        let second_moment: f64 = samples.iter().map(|v| v.x * v.x).sum::<f64>() / TRIALS as f64;
        assert!((second_moment - 1.0 / 3.0).abs() < 0.02);
    }

    #[test]
    fn same_seed_gives_identical_directions() {
        assert_eq!(draw_many(99), draw_many(99));
    }
}
