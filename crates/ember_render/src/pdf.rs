//! Direction sampling distributions used for importance sampling.
//!
//! Every variant pairs `value` (solid-angle density of a direction) with
//! `generate` (draw a direction distributed accordingly).

use crate::hittable::Hittable;
use crate::sampling::{gen_f32, random_cosine_direction, random_unit_vector};
use ember_math::{Onb, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// Closed set of sampling distributions.
///
/// `'a` borrows the scene for light-directed sampling; material
/// distributions don't borrow anything and are `Pdf<'static>`.
pub enum Pdf<'a> {
    /// Cosine-weighted hemisphere about a normal.
    Cosine(CosinePdf),
    /// Uniform over the whole sphere of directions.
    Sphere,
    /// Directions toward a target shape.
    Hittable(HittablePdf<'a>),
    /// Even blend of two distributions.
    Mixture(MixturePdf<'a>),
}

impl<'a> Pdf<'a> {
    /// Density of sampling `direction`. Zero outside the support.
    pub fn value(&self, direction: Vec3, rng: &mut dyn RngCore) -> f32 {
        match self {
            Pdf::Cosine(pdf) => pdf.value(direction),
            Pdf::Sphere => 1.0 / (4.0 * PI),
            Pdf::Hittable(pdf) => pdf.value(direction, rng),
            Pdf::Mixture(pdf) => pdf.value(direction, rng),
        }
    }

    /// Draw a direction. Not necessarily unit length.
    pub fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        match self {
            Pdf::Cosine(pdf) => pdf.generate(rng),
            Pdf::Sphere => random_unit_vector(rng),
            Pdf::Hittable(pdf) => pdf.generate(rng),
            Pdf::Mixture(pdf) => pdf.generate(rng),
        }
    }
}

/// Density `max(0, cos theta) / pi` about `w`.
#[derive(Debug, Clone, Copy)]
pub struct CosinePdf {
    uvw: Onb,
}

impl CosinePdf {
    pub fn new(w: Vec3) -> Self {
        Self {
            uvw: Onb::from_w(w),
        }
    }

    pub fn value(&self, direction: Vec3) -> f32 {
        let Some(direction) = direction.try_normalize() else {
            return 0.0;
        };
        let cosine = direction.dot(self.uvw.w());
        if cosine <= 0.0 {
            0.0
        } else {
            cosine / PI
        }
    }

    pub fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        self.uvw.local(random_cosine_direction(rng))
    }
}

/// Samples directions from `origin` toward a target shape, typically a light.
#[derive(Clone, Copy)]
pub struct HittablePdf<'a> {
    target: &'a dyn Hittable,
    origin: Vec3,
}

impl<'a> HittablePdf<'a> {
    pub fn new(target: &'a dyn Hittable, origin: Vec3) -> Self {
        Self { target, origin }
    }

    pub fn value(&self, direction: Vec3, rng: &mut dyn RngCore) -> f32 {
        self.target.pdf_value(self.origin, direction, rng)
    }

    pub fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        self.target.random(self.origin, rng)
    }
}

/// Equal-weight mixture of two distributions.
#[derive(Clone, Copy)]
pub struct MixturePdf<'a> {
    parts: [&'a Pdf<'a>; 2],
}

impl<'a> MixturePdf<'a> {
    pub fn new(p0: &'a Pdf<'a>, p1: &'a Pdf<'a>) -> Self {
        Self { parts: [p0, p1] }
    }

    pub fn value(&self, direction: Vec3, rng: &mut dyn RngCore) -> f32 {
        0.5 * self.parts[0].value(direction, rng) + 0.5 * self.parts[1].value(direction, rng)
    }

    /// A fair coin picks which child draws the direction.
    pub fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        if gen_f32(rng) < 0.5 {
            self.parts[0].generate(rng)
        } else {
            self.parts[1].generate(rng)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AaRect, DiffuseLight, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    #[test]
    fn test_cosine_value() {
        let pdf = CosinePdf::new(Vec3::Y);

        assert!((pdf.value(Vec3::Y) - 1.0 / PI).abs() < 1e-6);
        assert!((pdf.value(Vec3::new(0.0, 5.0, 0.0)) - 1.0 / PI).abs() < 1e-6);
        assert_eq!(pdf.value(-Vec3::Y), 0.0);
        assert_eq!(pdf.value(Vec3::X), 0.0);
        assert_eq!(pdf.value(Vec3::ZERO), 0.0);
    }

    #[test]
    fn test_cosine_generate_has_positive_density() {
        let pdf = CosinePdf::new(Vec3::new(1.0, 2.0, -0.5));
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1000 {
            let d = pdf.generate(&mut rng);
            assert!(pdf.value(d) >= 0.0);
            assert!(d.dot(Vec3::new(1.0, 2.0, -0.5)) >= -1e-5);
        }
    }

    #[test]
    fn test_mixture_value_is_even_blend() {
        let mut rng = StdRng::seed_from_u64(12);
        let a = Pdf::Cosine(CosinePdf::new(Vec3::X));
        let b = Pdf::Cosine(CosinePdf::new(Vec3::new(0.0, 1.0, 1.0)));
        let mix = MixturePdf::new(&a, &b);

        for _ in 0..200 {
            let d = random_unit_vector(&mut rng);
            let expected = 0.5 * a.value(d, &mut rng) + 0.5 * b.value(d, &mut rng);
            assert!((mix.value(d, &mut rng) - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_mixture_draws_half_from_each_child() {
        // Disjoint supports tag where each draw came from
        let mut rng = StdRng::seed_from_u64(13);
        let plus = Pdf::Cosine(CosinePdf::new(Vec3::X));
        let minus = Pdf::Cosine(CosinePdf::new(-Vec3::X));
        let mix = Pdf::Mixture(MixturePdf::new(&plus, &minus));

        let n = 20_000;
        let from_plus = (0..n).filter(|_| mix.generate(&mut rng).x > 0.0).count();
        let fraction = from_plus as f32 / n as f32;
        assert!((fraction - 0.5).abs() < 0.02, "fraction from first child: {}", fraction);
    }

    #[test]
    fn test_sphere_pdf_integrates_to_one() {
        let mut rng = StdRng::seed_from_u64(14);
        let value = Pdf::Sphere.value(Vec3::Z, &mut rng);
        assert!((value * 4.0 * PI - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_hittable_pdf_targets_shape() {
        let mut rng = StdRng::seed_from_u64(15);
        let light = AaRect::xz(-1.0, 1.0, -1.0, 1.0, 5.0, Arc::new(DiffuseLight::from_color(Vec3::ONE)));
        let pdf = HittablePdf::new(&light, Vec3::ZERO);

        for _ in 0..100 {
            let d = pdf.generate(&mut rng);
            // Every generated direction reaches the light and has positive density
            assert!(d.y > 0.0);
            assert!(pdf.value(d, &mut rng) > 0.0);
        }
        assert_eq!(pdf.value(-Vec3::Y, &mut rng), 0.0);
    }

    #[test]
    fn test_hittable_pdf_sphere_monte_carlo_solid_angle() {
        // Integrating the light density over uniformly drawn directions gives 1
        let mut rng = StdRng::seed_from_u64(16);
        let sphere = Sphere::new(
            Vec3::new(0.0, 0.0, -4.0),
            1.0,
            Arc::new(DiffuseLight::from_color(Vec3::ONE)),
        );
        let pdf = Pdf::Hittable(HittablePdf::new(&sphere, Vec3::ZERO));

        let n = 400_000;
        let sum: f32 = (0..n)
            .map(|_| {
                let d = random_unit_vector(&mut rng);
                pdf.value(d, &mut rng) * 4.0 * PI
            })
            .sum();
        let integral = sum / n as f32;
        assert!((integral - 1.0).abs() < 0.05, "integral = {}", integral);
    }
}
