//! Ember math - vector algebra and geometric helpers shared by the renderer.
//!
//! Vectors, points and colors are all `glam::Vec3`.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod onb;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use onb::Onb;
pub use ray::Ray;
pub use transform::{Axis, AxisRotation};
