//! Axis-aligned rectangles and the six-sided box built from them.

use crate::hittable::{HitRecord, Hittable, HittableList};
use crate::material::Material;
use crate::sampling::gen_range;
use ember_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Which coordinate plane a rectangle lies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    XY,
    XZ,
    YZ,
}

impl Plane {
    /// Component indices `(a, b, k)`: the two in-plane axes, then the fixed one.
    fn axes(self) -> (usize, usize, usize) {
        match self {
            Plane::XY => (0, 1, 2),
            Plane::XZ => (0, 2, 1),
            Plane::YZ => (1, 2, 0),
        }
    }
}

/// Rectangle `[a0, a1] x [b0, b1]` on the plane `k` along the fixed axis.
///
/// The outward normal points along the positive fixed axis.
pub struct AaRect {
    plane: Plane,
    a0: f32,
    a1: f32,
    b0: f32,
    b1: f32,
    k: f32,
    material: Arc<dyn Material>,
}

impl AaRect {
    pub fn new(
        plane: Plane,
        a0: f32,
        a1: f32,
        b0: f32,
        b1: f32,
        k: f32,
        material: Arc<dyn Material>,
    ) -> Self {
        Self {
            plane,
            a0: a0.min(a1),
            a1: a0.max(a1),
            b0: b0.min(b1),
            b1: b0.max(b1),
            k,
            material,
        }
    }

    pub fn xy(x0: f32, x1: f32, y0: f32, y1: f32, k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::XY, x0, x1, y0, y1, k, material)
    }

    pub fn xz(x0: f32, x1: f32, z0: f32, z1: f32, k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::XZ, x0, x1, z0, z1, k, material)
    }

    pub fn yz(y0: f32, y1: f32, z0: f32, z1: f32, k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::YZ, y0, y1, z0, z1, k, material)
    }

    pub fn plane(&self) -> Plane {
        self.plane
    }

    pub fn area(&self) -> f32 {
        (self.a1 - self.a0) * (self.b1 - self.b0)
    }

    fn outward_normal(&self) -> Vec3 {
        let (_, _, k_axis) = self.plane.axes();
        let mut normal = Vec3::ZERO;
        normal[k_axis] = 1.0;
        normal
    }

    fn point(&self, a: f32, b: f32) -> Vec3 {
        let (a_axis, b_axis, k_axis) = self.plane.axes();
        let mut p = Vec3::ZERO;
        p[a_axis] = a;
        p[b_axis] = b;
        p[k_axis] = self.k;
        p
    }
}

impl Hittable for AaRect {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        _rng: &mut dyn RngCore,
    ) -> bool {
        let (a_axis, b_axis, k_axis) = self.plane.axes();
        let origin = ray.origin();
        let direction = ray.direction();

        // Parallel to the plane (including zero-length directions): no hit
        if direction[k_axis] == 0.0 {
            return false;
        }

        let t = (self.k - origin[k_axis]) / direction[k_axis];
        if !t.is_finite() || !ray_t.contains(t) {
            return false;
        }

        let a = origin[a_axis] + t * direction[a_axis];
        let b = origin[b_axis] + t * direction[b_axis];
        if a < self.a0 || a > self.a1 || b < self.b0 || b > self.b1 {
            return false;
        }

        rec.u = (a - self.a0) / (self.a1 - self.a0);
        rec.v = (b - self.b0) / (self.b1 - self.b0);
        rec.t = t;
        rec.set_face_normal(ray, self.outward_normal());
        rec.material = self.material.as_ref();
        rec.p = ray.at(t);

        true
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Aabb {
        // Zero thickness along the fixed axis; Aabb pads it
        Aabb::from_points(self.point(self.a0, self.b0), self.point(self.a1, self.b1))
    }

    /// `distance^2 / (cos * area)`: the solid-angle density of picking a
    /// uniform point on the rectangle.
    fn pdf_value(&self, origin: Vec3, direction: Vec3, rng: &mut dyn RngCore) -> f32 {
        let mut rec = HitRecord::default();
        let probe = Ray::new(origin, direction, 0.0);
        if !self.hit(&probe, Interval::new(0.001, f32::INFINITY), &mut rec, rng) {
            return 0.0;
        }

        let length = direction.length();
        let area = self.area();
        let distance_squared = rec.t * rec.t * length * length;
        let cosine = (direction.dot(rec.normal) / length).abs();
        if cosine <= 0.0 || area <= 0.0 {
            return 0.0;
        }

        distance_squared / (cosine * area)
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let a = gen_range(rng, self.a0, self.a1);
        let b = gen_range(rng, self.b0, self.b1);
        self.point(a, b) - origin
    }
}

/// Axis-aligned box made of six rectangles sharing one material.
pub struct Cuboid {
    box_min: Vec3,
    box_max: Vec3,
    sides: HittableList,
}

impl Cuboid {
    /// Box spanning the two corners, given in any order.
    pub fn new(p0: Vec3, p1: Vec3, material: Arc<dyn Material>) -> Self {
        let box_min = p0.min(p1);
        let box_max = p0.max(p1);
        let (lo, hi) = (box_min, box_max);

        let mut sides = HittableList::new();
        sides.add(Arc::new(AaRect::xy(lo.x, hi.x, lo.y, hi.y, hi.z, material.clone())));
        sides.add(Arc::new(AaRect::xy(lo.x, hi.x, lo.y, hi.y, lo.z, material.clone())));
        sides.add(Arc::new(AaRect::xz(lo.x, hi.x, lo.z, hi.z, hi.y, material.clone())));
        sides.add(Arc::new(AaRect::xz(lo.x, hi.x, lo.z, hi.z, lo.y, material.clone())));
        sides.add(Arc::new(AaRect::yz(lo.y, hi.y, lo.z, hi.z, hi.x, material.clone())));
        sides.add(Arc::new(AaRect::yz(lo.y, hi.y, lo.z, hi.z, lo.x, material)));

        Self {
            box_min,
            box_max,
            sides,
        }
    }
}

impl Hittable for Cuboid {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        self.sides.hit(ray, ray_t, rec, rng)
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Aabb {
        Aabb::from_points(self.box_min, self.box_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grey() -> Arc<dyn Material> {
        Arc::new(Lambertian::from_color(Vec3::splat(0.5)))
    }

    #[test]
    fn test_rect_hit_and_uv() {
        let rect = AaRect::xz(-1.0, 1.0, -2.0, 2.0, 3.0, grey());
        let mut rng = StdRng::seed_from_u64(0);
        let mut rec = HitRecord::default();
        let ray = Ray::new(Vec3::new(0.5, 0.0, 1.0), Vec3::Y, 0.0);

        assert!(rect.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!((rec.t - 3.0).abs() < 1e-6);
        assert!((rec.u - 0.75).abs() < 1e-6);
        assert!((rec.v - 0.75).abs() < 1e-6);
        // Struck from below: back face, normal flipped toward the ray
        assert!(!rec.front_face);
        assert_eq!(rec.normal, -Vec3::Y);
    }

    #[test]
    fn test_rect_outside_bounds_misses() {
        let rect = AaRect::xy(0.0, 1.0, 0.0, 1.0, -5.0, grey());
        let mut rng = StdRng::seed_from_u64(0);
        let mut rec = HitRecord::default();
        let ray = Ray::new(Vec3::new(2.0, 0.5, 0.0), -Vec3::Z, 0.0);

        assert!(!rect.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
    }

    #[test]
    fn test_parallel_ray_is_no_hit() {
        let rect = AaRect::yz(-1.0, 1.0, -1.0, 1.0, 0.0, grey());
        let mut rng = StdRng::seed_from_u64(0);
        let mut rec = HitRecord::default();

        // In the plane itself, direction has no x component
        let in_plane = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::Z, 0.0);
        assert!(!rect.hit(&in_plane, Interval::UNIVERSE, &mut rec, &mut rng));

        let degenerate = Ray::new(Vec3::ZERO, Vec3::ZERO, 0.0);
        assert!(!rect.hit(&degenerate, Interval::UNIVERSE, &mut rec, &mut rng));
    }

    #[test]
    fn test_rect_box_is_padded() {
        let rect = AaRect::xy(0.0, 1.0, 0.0, 1.0, 2.0, grey());
        let bbox = rect.bounding_box(0.0, 1.0);
        assert!(bbox.z.length() > 0.0);
        assert!(bbox.z.contains(2.0));
    }

    #[test]
    fn test_rect_pdf_matches_area_rule() {
        let rect = AaRect::xz(-1.0, 1.0, -1.0, 1.0, 2.0, grey());
        let mut rng = StdRng::seed_from_u64(0);

        // Straight up: distance 2, cosine 1, area 4
        let value = rect.pdf_value(Vec3::ZERO, Vec3::Y * 7.0, &mut rng);
        assert!((value - 1.0).abs() < 1e-5);
        assert_eq!(rect.pdf_value(Vec3::ZERO, -Vec3::Y, &mut rng), 0.0);
    }

    #[test]
    fn test_rect_pdf_integrates_to_one() {
        let rect = AaRect::xy(-1.0, 1.0, -1.0, 1.0, -1.5, grey());
        let mut rng = StdRng::seed_from_u64(9);

        // Importance-sampled estimate of the integral of pdf over the sphere
        let n = 20_000;
        let mut sum = 0.0;
        for _ in 0..n {
            let d = rect.random(Vec3::ZERO, &mut rng);
            let p = rect.pdf_value(Vec3::ZERO, d, &mut rng);
            assert!(p > 0.0);
            sum += 1.0 / p;
        }
        // Mean of 1/p estimates the solid angle subtended by the rectangle
        let solid_angle = sum / n as f32;
        let d2 = 1.5f32 * 1.5;
        let expected = 4.0 * (1.0 / (1.0 + d2)).asin();
        assert!((solid_angle - expected).abs() < 0.03 * expected, "{} vs {}", solid_angle, expected);
    }

    #[test]
    fn test_cuboid_hits_nearest_face() {
        let cuboid = Cuboid::new(Vec3::splat(1.0), Vec3::splat(-1.0), grey());
        let mut rng = StdRng::seed_from_u64(0);
        let mut rec = HitRecord::default();
        let ray = Ray::new(Vec3::new(0.2, 0.3, 5.0), -Vec3::Z, 0.0);

        assert!(cuboid.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!((rec.t - 4.0).abs() < 1e-5);
        assert!(rec.front_face);
        assert_eq!(rec.normal, Vec3::Z);

        let bbox = cuboid.bounding_box(0.0, 1.0);
        assert_eq!(bbox.min(), Vec3::splat(-1.0));
        assert_eq!(bbox.max(), Vec3::splat(1.0));
    }
}
