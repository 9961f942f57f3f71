use crate::{Interval, Ray, Vec3};

/// Minimum thickness of a box along any axis near the origin. Flat primitives
/// (axis-aligned rectangles) get padded up to this so the slab test can still
/// hit them.
const MIN_THICKNESS: f32 = 0.0001;

/// Far from the origin the padding grows to this many ulps per side, so it
/// survives rounding at any magnitude.
const PAD_ULPS: f32 = 2.0;

/// Axis-aligned box stored as one interval per axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Contains nothing; the identity for [`Aabb::surrounding`].
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    /// Box from per-axis extents, padding flat axes.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Create an AABB from two corner points, in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self::new(
            Interval::new(a.x.min(b.x), a.x.max(b.x)),
            Interval::new(a.y.min(b.y), a.y.max(b.y)),
            Interval::new(a.z.min(b.z), a.z.max(b.z)),
        )
    }

    /// Smallest box containing both inputs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Extent along axis `n` (0, 1, 2 for X, Y, Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// The eight corner points, in (x, y, z) binary counting order.
    pub fn corners(&self) -> [Vec3; 8] {
        let mut corners = [Vec3::ZERO; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            *corner = Vec3::new(
                if i & 1 == 0 { self.x.min } else { self.x.max },
                if i & 2 == 0 { self.y.min } else { self.y.max },
                if i & 4 == 0 { self.z.min } else { self.z.max },
            );
        }
        corners
    }

    /// Box around the images of all eight corners under `f`.
    ///
    /// Needed for transforms that don't map boxes to boxes (rotations).
    pub fn transformed(&self, f: impl Fn(Vec3) -> Vec3) -> Aabb {
        let corners = self.corners();
        let first = f(corners[0]);
        let (lo, hi) = corners[1..]
            .iter()
            .map(|&c| f(c))
            .fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Aabb::from_points(lo, hi)
    }

    /// Box moved by `offset`.
    pub fn translate(&self, offset: Vec3) -> Aabb {
        Aabb::new(
            self.x.shifted(offset.x),
            self.y.shifted(offset.y),
            self.z.shifted(offset.z),
        )
    }

    /// True if `other` lies entirely inside this box.
    pub fn contains_box(&self, other: &Aabb) -> bool {
        self.x.min <= other.x.min
            && other.x.max <= self.x.max
            && self.y.min <= other.y.min
            && other.y.max <= self.y.max
            && self.z.min <= other.z.min
            && other.z.max <= self.z.max
    }

    /// Slab test over `ray_t`. A zero direction component yields infinite slab
    /// distances, which `min`/`max` handle without special casing.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let adinv = 1.0 / r.direction[axis];
            let origin = r.origin[axis];

            let mut t0 = (slab.min - origin) * adinv;
            let mut t1 = (slab.max - origin) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }

            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max <= ray_t.min {
                return false;
            }
        }
        true
    }

    /// Give flat axes a minimum thickness.
    fn pad_to_minimums(&mut self) {
        self.x = pad_axis(self.x);
        self.y = pad_axis(self.y);
        self.z = pad_axis(self.z);
    }
}

fn pad_axis(extent: Interval) -> Interval {
    let magnitude = extent.min.abs().max(extent.max.abs());
    let width = if magnitude.is_finite() {
        MIN_THICKNESS.max(2.0 * PAD_ULPS * f32::EPSILON * magnitude)
    } else {
        MIN_THICKNESS
    };
    extent.padded_to(width)
}
