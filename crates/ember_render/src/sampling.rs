//! Random sampling helpers.
//!
//! Every function draws from an explicitly passed generator; there is no
//! global or thread-local RNG, so each pixel task owns its random stream.

use ember_math::Vec3;
use rand::{Rng, RngCore};
use std::f32::consts::PI;

/// Uniform `f32` in `[0, 1)`.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniform `f32` in `[min, max)`.
#[inline]
pub fn gen_range(rng: &mut dyn RngCore, min: f32, max: f32) -> f32 {
    min + (max - min) * gen_f32(rng)
}

/// Vector with each component uniform in `[min, max)`.
pub fn random_vec3(rng: &mut dyn RngCore, min: f32, max: f32) -> Vec3 {
    Vec3::new(
        gen_range(rng, min, max),
        gen_range(rng, min, max),
        gen_range(rng, min, max),
    )
}

/// Point uniformly distributed inside the unit ball (rejection sampling).
pub fn random_in_unit_sphere(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = random_vec3(rng, -1.0, 1.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Direction uniformly distributed on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = random_vec3(rng, -1.0, 1.0);
        let len_sq = p.length_squared();
        if len_sq > 1e-6 && len_sq <= 1.0 {
            return p / len_sq.sqrt();
        }
    }
}

/// Point uniformly distributed inside the unit disk in the XY plane.
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(gen_range(rng, -1.0, 1.0), gen_range(rng, -1.0, 1.0), 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Unit direction about +Z with density `cos(theta) / pi`.
pub fn random_cosine_direction(rng: &mut dyn RngCore) -> Vec3 {
    let r1 = gen_f32(rng);
    let r2 = gen_f32(rng);
    let z = (1.0 - r2).sqrt();

    let phi = 2.0 * PI * r1;
    let (sin_phi, cos_phi) = phi.sin_cos();
    let r = r2.sqrt();

    Vec3::new(cos_phi * r, sin_phi * r, z)
}

/// Unit direction about +Z, uniform over the cone subtended by a sphere of
/// `radius` whose center is `distance_squared` away along +Z.
pub fn random_to_sphere(rng: &mut dyn RngCore, radius: f32, distance_squared: f32) -> Vec3 {
    let r1 = gen_f32(rng);
    let r2 = gen_f32(rng);
    let cos_theta_max = (1.0 - radius * radius / distance_squared).max(0.0).sqrt();
    let z = 1.0 + r2 * (cos_theta_max - 1.0);

    let phi = 2.0 * PI * r1;
    let (sin_phi, cos_phi) = phi.sin_cos();
    let r = (1.0 - z * z).max(0.0).sqrt();

    Vec3::new(cos_phi * r, sin_phi * r, z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_gen_range_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            let x = gen_range(&mut rng, -3.0, 2.0);
            assert!((-3.0..2.0).contains(&x));
        }
    }

    #[test]
    fn test_unit_vectors_are_unit() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..1000 {
            assert!((random_unit_vector(&mut rng).length() - 1.0).abs() < 1e-4);
            assert!((random_cosine_direction(&mut rng).length() - 1.0).abs() < 1e-4);
            assert!(random_in_unit_sphere(&mut rng).length() < 1.0);
            let d = random_in_unit_disk(&mut rng);
            assert!(d.length() < 1.0 && d.z == 0.0);
        }
    }

    #[test]
    fn test_cosine_direction_stays_in_upper_hemisphere() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            assert!(random_cosine_direction(&mut rng).z >= 0.0);
        }
    }

    #[test]
    fn test_cosine_direction_matches_density() {
        // P(cos theta > c) = 1 - c^2 for density cos(theta)/pi
        let mut rng = StdRng::seed_from_u64(4);
        let n = 100_000;
        let bins = [0.25f32, 0.5, 0.75, 0.9];
        let mut counts = [0usize; 4];
        for _ in 0..n {
            let z = random_cosine_direction(&mut rng).z;
            for (count, &c) in counts.iter_mut().zip(&bins) {
                if z > c {
                    *count += 1;
                }
            }
        }
        for (count, &c) in counts.iter().zip(&bins) {
            let observed = *count as f32 / n as f32;
            let expected = 1.0 - c * c;
            assert!(
                (observed - expected).abs() < 0.01,
                "P(cos > {}) = {}, expected {}",
                c,
                observed,
                expected
            );
        }
    }

    #[test]
    fn test_to_sphere_stays_inside_cone() {
        let mut rng = StdRng::seed_from_u64(5);
        let (radius, dist_sq) = (1.0f32, 16.0f32);
        let cos_max = (1.0 - radius * radius / dist_sq).sqrt();
        for _ in 0..1000 {
            let d = random_to_sphere(&mut rng, radius, dist_sq);
            assert!(d.z >= cos_max - 1e-5);
            assert!((d.length() - 1.0).abs() < 1e-4);
        }
    }
}
