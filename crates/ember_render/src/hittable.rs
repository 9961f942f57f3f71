//! Hittable trait and HitRecord for ray-object intersection.

use crate::material::{Material, ScatterRecord};
use crate::sampling::gen_f32;
use ember_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Placeholder material for a record that has not been filled yet. Absorbs
/// everything.
struct Unset;

impl Material for Unset {
    fn scatter(&self, _: &Ray, _: &HitRecord, _: &mut dyn RngCore) -> Option<ScatterRecord> {
        None
    }
}

static UNSET_MATERIAL: Unset = Unset;

/// Nearest-hit result of one intersection query.
///
/// Lives for one evaluation only; the material is borrowed from the scene.
#[derive(Clone)]
pub struct HitRecord<'a> {
    pub p: Vec3,
    /// Faces against the incoming ray
    pub normal: Vec3,
    pub material: &'a dyn Material,
    /// Ray parameter of `p`
    pub t: f32,
    pub u: f32,
    pub v: f32,
    /// The ray arrived from the side the outward normal points to
    pub front_face: bool,
}

impl Default for HitRecord<'_> {
    fn default() -> Self {
        Self {
            p: Vec3::ZERO,
            normal: Vec3::ZERO,
            material: &UNSET_MATERIAL,
            t: 0.0,
            u: 0.0,
            v: 0.0,
            front_face: false,
        }
    }
}

impl HitRecord<'_> {
    /// Orient `normal` against `ray` and record which side was struck.
    ///
    /// `outward_normal` must be unit length.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction().dot(outward_normal) < 0.0;
        self.normal = if self.front_face { outward_normal } else { -outward_normal };
    }
}

/// Anything a ray can be tested against.
///
/// Implementors are immutable once built and shared read-only between render
/// workers, hence `Send + Sync`. Randomness (participating media, light
/// sampling) always comes from the caller's generator.
pub trait Hittable: Send + Sync {
    /// Test if a ray hits this object within `ray_t`.
    ///
    /// Returns true if hit, and fills in the hit record.
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool;

    /// Bounding box covering the object over the shutter window `[time0, time1]`.
    fn bounding_box(&self, time0: f32, time1: f32) -> Aabb;

    /// Solid-angle density of sampling `direction` from `origin` toward this object.
    fn pdf_value(&self, _origin: Vec3, _direction: Vec3, _rng: &mut dyn RngCore) -> f32 {
        0.0
    }

    /// Direction from `origin` toward a random point on this object.
    fn random(&self, _origin: Vec3, _rng: &mut dyn RngCore) -> Vec3 {
        Vec3::X
    }
}

/// Nearest hit among `objects` by testing each in turn.
pub(crate) fn hit_closest<'a>(
    objects: &'a [Arc<dyn Hittable>],
    ray: &Ray,
    ray_t: Interval,
    rec: &mut HitRecord<'a>,
    rng: &mut dyn RngCore,
) -> bool {
    // Each hit shrinks the search so later objects only win when closer
    let mut closest = ray_t.max;
    let mut found = false;
    for object in objects {
        if object.hit(ray, ray_t.with_max(closest), rec, rng) {
            closest = rec.t;
            found = true;
        }
    }
    found
}

/// Linear collection: every query tests every child.
#[derive(Clone, Default)]
pub struct HittableList {
    objects: Vec<Arc<dyn Hittable>>,
}

impl HittableList {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    pub fn from_object(object: Arc<dyn Hittable>) -> Self {
        Self {
            objects: vec![object],
        }
    }

    pub fn add(&mut self, object: Arc<dyn Hittable>) {
        self.objects.push(object);
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[Arc<dyn Hittable>] {
        &self.objects
    }

    pub fn into_objects(self) -> Vec<Arc<dyn Hittable>> {
        self.objects
    }
}

impl FromIterator<Arc<dyn Hittable>> for HittableList {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Hittable>>>(iter: I) -> Self {
        Self {
            objects: iter.into_iter().collect(),
        }
    }
}

impl Hittable for HittableList {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        hit_closest(&self.objects, ray, ray_t, rec, rng)
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Aabb {
        self.objects.iter().fold(Aabb::EMPTY, |acc, object| {
            Aabb::surrounding(&acc, &object.bounding_box(time0, time1))
        })
    }

    /// Average of the children's densities: the density of `random`, which
    /// picks a child uniformly.
    fn pdf_value(&self, origin: Vec3, direction: Vec3, rng: &mut dyn RngCore) -> f32 {
        if self.objects.is_empty() {
            return 0.0;
        }
        let weight = 1.0 / self.objects.len() as f32;
        self.objects
            .iter()
            .map(|object| weight * object.pdf_value(origin, direction, rng))
            .sum()
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        if self.objects.is_empty() {
            return Vec3::X;
        }
        let n = self.objects.len();
        let index = ((gen_f32(rng) * n as f32) as usize).min(n - 1);
        self.objects[index].random(origin, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lambertian, Sphere};
    use crate::Color;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sphere_at(z: f32) -> Arc<dyn Hittable> {
        Arc::new(Sphere::new(
            Vec3::new(0.0, 0.0, z),
            0.5,
            Arc::new(Lambertian::from_color(Color::splat(0.5))),
        ))
    }

    #[test]
    fn test_set_face_normal_orients_against_ray() {
        let mut rec = HitRecord::default();
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);

        rec.set_face_normal(&ray, Vec3::Z);
        assert!(rec.front_face);
        assert_eq!(rec.normal, Vec3::Z);

        rec.set_face_normal(&ray, -Vec3::Z);
        assert!(!rec.front_face);
        assert_eq!(rec.normal, Vec3::Z);
    }

    #[test]
    fn test_list_returns_closest_hit() {
        let mut list = HittableList::new();
        list.add(sphere_at(-10.0));
        list.add(sphere_at(-3.0));
        list.add(sphere_at(-6.0));

        let mut rng = StdRng::seed_from_u64(0);
        let mut rec = HitRecord::default();
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);

        assert!(list.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!((rec.t - 2.5).abs() < 1e-4);
    }

    #[test]
    fn test_list_bounding_box_merges_children() {
        let list: HittableList = [sphere_at(-10.0), sphere_at(3.0)].into_iter().collect();
        let bbox = list.bounding_box(0.0, 1.0);

        assert_eq!(bbox.z.min, -10.5);
        assert_eq!(bbox.z.max, 3.5);
    }

    #[test]
    fn test_empty_list_has_zero_density() {
        let list = HittableList::new();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(list.pdf_value(Vec3::ZERO, Vec3::X, &mut rng), 0.0);
    }
}
