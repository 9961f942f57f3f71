//! Gradient (Perlin) noise with turbulence, driving the marble texture.

use crate::sampling::random_vec3;
use ember_math::Vec3;
use rand::seq::SliceRandom;
use rand::RngCore;

const POINT_COUNT: usize = 256;

/// Lattice of random unit gradients plus three permutation tables.
///
/// Built once from the scene-construction RNG; lookups are pure.
pub struct Perlin {
    ranvec: Vec<Vec3>,
    perm_x: Vec<usize>,
    perm_y: Vec<usize>,
    perm_z: Vec<usize>,
}

impl Perlin {
    pub fn new(rng: &mut dyn RngCore) -> Self {
        let ranvec = (0..POINT_COUNT)
            .map(|_| random_vec3(rng, -1.0, 1.0).normalize_or_zero())
            .collect();

        Self {
            ranvec,
            perm_x: Self::generate_perm(rng),
            perm_y: Self::generate_perm(rng),
            perm_z: Self::generate_perm(rng),
        }
    }

    /// Smoothly interpolated noise in roughly `[-1, 1]`.
    pub fn noise(&self, p: Vec3) -> f32 {
        let base = p.floor();
        let frac = p - base;
        let (i, j, k) = (base.x as i64, base.y as i64, base.z as i64);

        let mut c = [[[Vec3::ZERO; 2]; 2]; 2];
        for (di, plane) in c.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (dk, cell) in row.iter_mut().enumerate() {
                    let index = self.perm_x[Self::wrap(i + di as i64)]
                        ^ self.perm_y[Self::wrap(j + dj as i64)]
                        ^ self.perm_z[Self::wrap(k + dk as i64)];
                    *cell = self.ranvec[index];
                }
            }
        }

        Self::trilinear(&c, frac)
    }

    /// Sum of `depth` octaves of noise with halving weights.
    pub fn turb(&self, p: Vec3, depth: usize) -> f32 {
        let mut accum = 0.0;
        let mut temp_p = p;
        let mut weight = 1.0;

        for _ in 0..depth {
            accum += weight * self.noise(temp_p);
            weight *= 0.5;
            temp_p *= 2.0;
        }

        accum.abs()
    }

    fn generate_perm(rng: &mut dyn RngCore) -> Vec<usize> {
        let mut perm: Vec<usize> = (0..POINT_COUNT).collect();
        perm.shuffle(rng);
        perm
    }

    #[inline]
    fn wrap(i: i64) -> usize {
        (i & (POINT_COUNT as i64 - 1)) as usize
    }

    fn trilinear(c: &[[[Vec3; 2]; 2]; 2], frac: Vec3) -> f32 {
        // Hermite smoothing
        let s = frac * frac * (Vec3::splat(3.0) - 2.0 * frac);
        let mut accum = 0.0;

        for (i, plane) in c.iter().enumerate() {
            for (j, row) in plane.iter().enumerate() {
                for (k, gradient) in row.iter().enumerate() {
                    let (fi, fj, fk) = (i as f32, j as f32, k as f32);
                    let weight = Vec3::new(frac.x - fi, frac.y - fj, frac.z - fk);
                    accum += (fi * s.x + (1.0 - fi) * (1.0 - s.x))
                        * (fj * s.y + (1.0 - fj) * (1.0 - s.y))
                        * (fk * s.z + (1.0 - fk) * (1.0 - s.z))
                        * gradient.dot(weight);
                }
            }
        }

        accum
    }
}
