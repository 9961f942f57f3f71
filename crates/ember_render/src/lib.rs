//! Ember renderer - CPU Monte Carlo path tracing.
//!
//! Shapes, materials and textures are built once into an immutable scene
//! graph of shared `Arc` handles, then read concurrently by the row
//! scheduler's workers. Every random draw comes from a per-pixel seeded
//! generator, so a render is reproducible for a given seed regardless of
//! thread count.

mod aarect;
mod bvh;
mod camera;
mod error;
mod hittable;
mod material;
mod medium;
mod pdf;
mod perlin;
mod ppm;
mod renderer;
mod sampling;
mod scheduler;
mod sphere;
mod texture;
mod transform;

pub use aarect::{AaRect, Cuboid, Plane};
pub use bvh::BvhNode;
pub use camera::Camera;
pub use error::{RenderError, RenderResult};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{
    Color, Dielectric, DiffuseLight, Isotropic, Lambertian, Material, Metal, ScatterRecord,
};
pub use medium::ConstantMedium;
pub use pdf::{CosinePdf, HittablePdf, MixturePdf, Pdf};
pub use perlin::Perlin;
pub use ppm::{write_image, PpmWriter};
pub use renderer::{
    color_to_rgb8, linear_to_gamma, ray_color, render_pixel, ImageBuffer, RenderConfig, Scene,
};
pub use sampling::{gen_f32, gen_range};
pub use scheduler::{order_row, pixel_seed, PixelSample, RowScheduler};
pub use sphere::{MovingSphere, Sphere};
pub use texture::{
    CheckerTexture, ImageTexture, NoiseTexture, SolidColor, Texture, MISSING_TEXTURE_COLOR,
};
pub use transform::{FlipFace, Rotate, Translate};

/// Re-export Vec3 and common math types from ember_math
pub use ember_math::{Aabb, Axis, Interval, Ray, Vec3};
