//! Decorators that place a child shape: translation, axis rotation and
//! face flipping. Each owns exactly one child.

use crate::hittable::{HitRecord, Hittable};
use ember_math::{Aabb, Axis, AxisRotation, Interval, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Child moved by a fixed offset.
pub struct Translate {
    child: Arc<dyn Hittable>,
    offset: Vec3,
}

impl Translate {
    pub fn new(child: Arc<dyn Hittable>, offset: Vec3) -> Self {
        Self { child, offset }
    }
}

impl Hittable for Translate {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        let moved = ray.offset_by(-self.offset);
        if !self.child.hit(&moved, ray_t, rec, rng) {
            return false;
        }

        rec.p += self.offset;
        true
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Aabb {
        self.child.bounding_box(time0, time1).translate(self.offset)
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3, rng: &mut dyn RngCore) -> f32 {
        self.child.pdf_value(origin - self.offset, direction, rng)
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.child.random(origin - self.offset, rng)
    }
}

/// Child rotated by a fixed angle about one coordinate axis.
pub struct Rotate {
    child: Arc<dyn Hittable>,
    rotation: AxisRotation,
}

impl Rotate {
    pub fn new(child: Arc<dyn Hittable>, axis: Axis, degrees: f32) -> Self {
        Self {
            child,
            rotation: AxisRotation::new(axis, degrees),
        }
    }

    pub fn x(child: Arc<dyn Hittable>, degrees: f32) -> Self {
        Self::new(child, Axis::X, degrees)
    }

    pub fn y(child: Arc<dyn Hittable>, degrees: f32) -> Self {
        Self::new(child, Axis::Y, degrees)
    }

    pub fn z(child: Arc<dyn Hittable>, degrees: f32) -> Self {
        Self::new(child, Axis::Z, degrees)
    }
}

impl Hittable for Rotate {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        // World -> object
        let local = Ray::new(
            self.rotation.to_local(ray.origin()),
            self.rotation.to_local(ray.direction()),
            ray.time(),
        );

        if !self.child.hit(&local, ray_t, rec, rng) {
            return false;
        }

        // Object -> world. Rotation keeps the normal facing against the ray,
        // so front_face carries over.
        rec.p = self.rotation.to_world(rec.p);
        rec.normal = self.rotation.to_world(rec.normal);
        true
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Aabb {
        self.rotation
            .transform_aabb(&self.child.bounding_box(time0, time1))
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3, rng: &mut dyn RngCore) -> f32 {
        self.child.pdf_value(
            self.rotation.to_local(origin),
            self.rotation.to_local(direction),
            rng,
        )
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.rotation
            .to_world(self.child.random(self.rotation.to_local(origin), rng))
    }
}

/// Child with its front and back faces swapped. Geometry is unchanged.
pub struct FlipFace {
    child: Arc<dyn Hittable>,
}

impl FlipFace {
    pub fn new(child: Arc<dyn Hittable>) -> Self {
        Self { child }
    }
}

impl Hittable for FlipFace {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        if !self.child.hit(ray, ray_t, rec, rng) {
            return false;
        }

        rec.front_face = !rec.front_face;
        true
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Aabb {
        self.child.bounding_box(time0, time1)
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3, rng: &mut dyn RngCore) -> f32 {
        self.child.pdf_value(origin, direction, rng)
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.child.random(origin, rng)
    }
}
