//! Homogeneous participating media (smoke, fog).

use crate::hittable::{HitRecord, Hittable};
use crate::material::{Color, Isotropic, Material};
use crate::sampling::gen_f32;
use crate::texture::Texture;
use ember_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Constant-density volume filling a boundary shape.
///
/// The boundary must be closed and convex: the ray's entry and exit are
/// taken from its first two intersections.
pub struct ConstantMedium {
    boundary: Arc<dyn Hittable>,
    neg_inv_density: f32,
    phase_function: Arc<dyn Material>,
}

impl ConstantMedium {
    /// Negative or NaN densities are treated as 0, an empty volume.
    pub fn new(boundary: Arc<dyn Hittable>, density: f32, albedo: Arc<dyn Texture>) -> Self {
        Self::with_phase(boundary, density, Arc::new(Isotropic::new(albedo)))
    }

    pub fn from_color(boundary: Arc<dyn Hittable>, density: f32, albedo: Color) -> Self {
        Self::with_phase(boundary, density, Arc::new(Isotropic::from_color(albedo)))
    }

    fn with_phase(
        boundary: Arc<dyn Hittable>,
        density: f32,
        phase_function: Arc<dyn Material>,
    ) -> Self {
        // f32::max drops NaN; zero density gives -inf and never scatters
        let density = density.max(0.0);
        Self {
            boundary,
            neg_inv_density: -1.0 / density,
            phase_function,
        }
    }
}

impl Hittable for ConstantMedium {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        let mut rec1 = HitRecord::default();
        let mut rec2 = HitRecord::default();

        if !self.boundary.hit(ray, Interval::UNIVERSE, &mut rec1, rng) {
            return false;
        }
        if !self
            .boundary
            .hit(ray, Interval::new(rec1.t + 0.0001, f32::INFINITY), &mut rec2, rng)
        {
            return false;
        }

        let mut t_enter = rec1.t.max(ray_t.min);
        let t_exit = rec2.t.min(ray_t.max);
        if t_enter >= t_exit {
            return false;
        }
        t_enter = t_enter.max(0.0);

        let ray_length = ray.direction().length();
        if ray_length == 0.0 {
            return false;
        }
        let distance_inside_boundary = (t_exit - t_enter) * ray_length;
        let hit_distance = self.neg_inv_density * gen_f32(rng).ln();

        if hit_distance.is_nan() || hit_distance > distance_inside_boundary {
            return false;
        }

        rec.t = t_enter + hit_distance / ray_length;
        rec.p = ray.at(rec.t);
        rec.u = 0.0;
        rec.v = 0.0;

        // Arbitrary; the phase function ignores orientation
        rec.normal = Vec3::X;
        rec.front_face = true;
        rec.material = self.phase_function.as_ref();

        true
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Aabb {
        self.boundary.bounding_box(time0, time1)
    }
}
