// Fixed-axis rotation helpers for the renderer's rotate decorators.
//
// Rotations about a coordinate axis only mix the two other components, so
// they are kept as a (sin, cos) pair rather than a full matrix.

use crate::{Aabb, Vec3};

/// Coordinate axis a rotation is performed about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Indices of the two components mixed by a rotation about this axis,
    /// ordered so that positive angles rotate counter-clockwise when looking
    /// down the axis.
    fn plane(self) -> (usize, usize) {
        match self {
            Axis::X => (1, 2),
            Axis::Y => (2, 0),
            Axis::Z => (0, 1),
        }
    }
}

/// Rotation by a fixed angle about one coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRotation {
    axis: Axis,
    sin_theta: f32,
    cos_theta: f32,
}

impl AxisRotation {
    /// Precompute sine and cosine for `degrees` about `axis`.
    pub fn new(axis: Axis, degrees: f32) -> Self {
        let (sin_theta, cos_theta) = degrees.to_radians().sin_cos();
        Self {
            axis,
            sin_theta,
            cos_theta,
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Object space to world space (rotate by +angle).
    #[inline]
    pub fn to_world(&self, v: Vec3) -> Vec3 {
        self.rotate(v, self.sin_theta)
    }

    /// World space to object space (rotate by -angle).
    #[inline]
    pub fn to_local(&self, v: Vec3) -> Vec3 {
        self.rotate(v, -self.sin_theta)
    }

    /// World-space bounds of an object-space box, from all 8 corners.
    pub fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        aabb.transformed(|p| self.to_world(p))
    }

    #[inline]
    fn rotate(&self, v: Vec3, sin_theta: f32) -> Vec3 {
        let (a, b) = self.axis.plane();
        let mut out = v;
        out[a] = self.cos_theta * v[a] - sin_theta * v[b];
        out[b] = sin_theta * v[a] + self.cos_theta * v[b];
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_quarter_turns() {
        let ry = AxisRotation::new(Axis::Y, 90.0);
        // +90 about Y takes +X to -Z
        assert!(approx_eq(ry.to_world(Vec3::X), -Vec3::Z));

        let rz = AxisRotation::new(Axis::Z, 90.0);
        assert!(approx_eq(rz.to_world(Vec3::X), Vec3::Y));

        let rx = AxisRotation::new(Axis::X, 90.0);
        assert!(approx_eq(rx.to_world(Vec3::Y), Vec3::Z));
    }

    #[test]
    fn test_matches_glam_rotation() {
        let p = Vec3::new(0.3, -1.2, 2.5);
        for (axis, quat) in [
            (Axis::X, glam::Quat::from_rotation_x(37f32.to_radians())),
            (Axis::Y, glam::Quat::from_rotation_y(37f32.to_radians())),
            (Axis::Z, glam::Quat::from_rotation_z(37f32.to_radians())),
        ] {
            let r = AxisRotation::new(axis, 37.0);
            assert!(approx_eq(r.to_world(p), quat * p));
        }
    }

    #[test]
    fn test_to_local_inverts_to_world() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            let r = AxisRotation::new(axis, -18.0);
            assert!(approx_eq(r.to_local(r.to_world(p)), p));
        }
    }

    #[test]
    fn test_rotated_box_contains_rotated_corners() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::new(165.0, 330.0, 165.0));
        let r = AxisRotation::new(Axis::Y, 15.0);
        let rotated = r.transform_aabb(&aabb);

        for corner in aabb.corners() {
            let p = r.to_world(corner);
            assert!(rotated.x.contains(p.x) && rotated.y.contains(p.y) && rotated.z.contains(p.z));
        }
        // Rotation about Y leaves the Y extent untouched
        assert_eq!(rotated.y, aabb.y);
    }
}
