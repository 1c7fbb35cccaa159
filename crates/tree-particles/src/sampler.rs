//! Point sampling for the two particle configurations
//!
//! All samplers take the random source explicitly so generation can be
//! reproduced from a seeded RNG.

use crate::config::TreeShape;
use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

/// Uniform-by-volume point inside a sphere centred at the origin.
///
/// The radius is drawn as `radius * cbrt(u)`; drawing it uniformly would
/// crowd points toward the centre.
pub fn sample_filled_sphere<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec3 {
    let theta = rng.random::<f32>() * TAU;
    let cos_phi = rng.random::<f32>() * 2.0 - 1.0;
    let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();
    let r = radius * rng.random::<f32>().cbrt();

    Vec3::new(
        r * sin_phi * theta.cos(),
        r * sin_phi * theta.sin(),
        r * cos_phi,
    )
}

/// Point on the cone disk at `height_ratio` (0 = base, 1 = apex).
///
/// The radial distance is `r * sqrt(u)`, area-uniform over the disk, which
/// leaves more points near the rim than near the axis.
pub fn sample_cone_surface<R: Rng + ?Sized>(
    rng: &mut R,
    shape: &TreeShape,
    height_ratio: f32,
) -> Vec3 {
    let y = shape.y_at(height_ratio);
    let r = shape.radius_at(height_ratio);
    let theta = rng.random::<f32>() * TAU;
    let radius_jitter = r * rng.random::<f32>().sqrt();

    Vec3::new(radius_jitter * theta.cos(), y, radius_jitter * theta.sin())
}

/// Deterministic point on a rising spiral around the cone.
///
/// `surface_offset` pushes the point out past the cone surface; `turns` is
/// the number of full revolutions between base and apex.
pub fn spiral_point(shape: &TreeShape, height_ratio: f32, surface_offset: f32, turns: f32) -> Vec3 {
    let y = shape.y_at(height_ratio);
    let r = shape.radius_at(height_ratio) + surface_offset;
    let theta = height_ratio * TAU * turns;

    Vec3::new(r * theta.cos(), y, r * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn sphere_points_stay_inside_radius() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let p = sample_filled_sphere(&mut rng, 35.0);
            assert!(p.length() <= 35.0 + 1e-4, "point {p:?} escaped the sphere");
        }
    }

    #[test]
    fn sphere_density_is_volume_uniform() {
        // Shells of equal volume should receive roughly equal counts.
        // Shell boundaries at R * cbrt(k / 4) split the ball into 4 equal volumes.
        const SAMPLES: usize = 40_000;
        let radius = 10.0_f32;
        let bounds: Vec<f32> = (1..=4)
            .map(|k| radius * (k as f32 / 4.0).cbrt())
            .collect();

        let mut rng = StdRng::seed_from_u64(1234);
        let mut counts = [0usize; 4];
        for _ in 0..SAMPLES {
            let d = sample_filled_sphere(&mut rng, radius).length();
            let shell = bounds.iter().position(|b| d <= *b).unwrap_or(3);
            counts[shell] += 1;
        }

        let expected = SAMPLES as f32 / 4.0;
        for (i, count) in counts.iter().enumerate() {
            let deviation = (*count as f32 - expected).abs() / expected;
            assert!(
                deviation < 0.05,
                "shell {i} got {count} samples, expected about {expected}"
            );
        }
    }

    #[test]
    fn cone_apex_collapses_to_axis() {
        let mut rng = StdRng::seed_from_u64(3);
        let shape = TreeShape::default();
        let p = sample_cone_surface(&mut rng, &shape, 1.0);
        assert_eq!(p.y, shape.y_at(1.0));
        assert!(p.x.abs() < 1e-6 && p.z.abs() < 1e-6);
    }

    #[test]
    fn spiral_is_evenly_spaced_in_height() {
        let shape = TreeShape::default();
        let a = spiral_point(&shape, 0.0, 0.5, 3.0);
        let b = spiral_point(&shape, 0.5, 0.5, 3.0);
        assert_eq!(a, Vec3::new(8.5, -8.0, 0.0));
        assert!((b.y - 1.0).abs() < 1e-6);
        // Half way up, three turns means one and a half revolutions: theta = 3π
        assert!((b.x + 4.5).abs() < 1e-4);
        assert!(b.z.abs() < 1e-4);
    }

    proptest! {
        #[test]
        fn cone_points_respect_height_and_radius(seed in any::<u64>(), h in 0.0f32..=1.0) {
            let mut rng = StdRng::seed_from_u64(seed);
            let shape = TreeShape::default();
            let p = sample_cone_surface(&mut rng, &shape, h);

            prop_assert_eq!(p.y, shape.y_offset + h * shape.height);
            let horizontal = (p.x * p.x + p.z * p.z).sqrt();
            prop_assert!(horizontal <= shape.radius_at(h) + 1e-4);
        }

        #[test]
        fn sphere_points_respect_any_radius(seed in any::<u64>(), radius in 0.1f32..1000.0) {
            let mut rng = StdRng::seed_from_u64(seed);
            let p = sample_filled_sphere(&mut rng, radius);
            prop_assert!(p.length() <= radius * (1.0 + 1e-5));
        }
    }
}
