//! Radiance estimation and pixel accumulation.
//!
//! Paths are traced recursively up to `max_depth` bounces. Diffuse and
//! volume bounces draw from an even mixture of light and material sampling.

use crate::camera::Camera;
use crate::error::{RenderError, RenderResult};
use crate::hittable::{HitRecord, Hittable};
use crate::material::{Color, ScatterRecord};
use crate::pdf::{HittablePdf, MixturePdf, Pdf};
use crate::sampling::gen_f32;
use ember_math::{Interval, Ray};
use image::RgbImage;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Image size, quality and seeding for one render. Loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output width in pixels
    pub image_width: u32,
    /// Width / height; the height is derived from it
    pub aspect_ratio: f32,
    /// Paths traced per pixel
    pub samples_per_pixel: u32,
    /// Bounces after which a path contributes nothing more
    pub max_depth: u32,
    /// Base seed for the per-pixel random streams
    pub seed: u64,
    /// Worker threads, `None` for one per hardware thread
    pub threads: Option<usize>,
    /// Shutter open
    pub time0: f32,
    /// Shutter close
    pub time1: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            image_width: 600,
            aspect_ratio: 1.0,
            samples_per_pixel: 100,
            max_depth: 50,
            seed: 0,
            threads: None,
            time0: 0.0,
            time1: 1.0,
        }
    }
}

impl RenderConfig {
    /// Image height derived from the width and aspect ratio, rounded to the
    /// nearest pixel and at least 1.
    pub fn image_height(&self) -> u32 {
        ((self.image_width as f32 / self.aspect_ratio).round() as u32).max(1)
    }

    pub fn validate(&self) -> RenderResult<()> {
        let invalid = |msg: &str| Err(RenderError::InvalidConfig(msg.to_string()));

        if self.image_width == 0 {
            return invalid("image_width must be at least 1");
        }
        if !self.aspect_ratio.is_finite() || self.aspect_ratio <= 0.0 {
            return invalid("aspect_ratio must be a positive number");
        }
        if self.samples_per_pixel == 0 {
            return invalid("samples_per_pixel must be at least 1");
        }
        if self.max_depth == 0 {
            return invalid("max_depth must be at least 1");
        }
        if self.threads == Some(0) {
            return invalid("threads must be at least 1");
        }
        if !self.time0.is_finite() || !self.time1.is_finite() || self.time0 > self.time1 {
            return invalid("shutter interval must be finite with time0 <= time1");
        }
        Ok(())
    }
}

/// What gets rendered: geometry, the shapes to aim light samples at, and
/// the radiance of rays that escape.
#[derive(Clone)]
pub struct Scene {
    pub world: Arc<dyn Hittable>,
    pub lights: Option<Arc<dyn Hittable>>,
    pub background: Color,
}

impl Scene {
    pub fn new(world: Arc<dyn Hittable>, background: Color) -> Self {
        Self {
            world,
            lights: None,
            background,
        }
    }

    /// Sample directions toward `lights` as well as from materials.
    pub fn with_lights(mut self, lights: Arc<dyn Hittable>) -> Self {
        self.lights = Some(lights);
        self
    }
}

/// Compute the radiance carried back along a ray.
///
/// Diffuse and volume bounces draw one direction from an even mixture of the
/// light distribution and the material's own distribution. Specular bounces
/// follow their ray directly.
pub fn ray_color(ray: &Ray, scene: &Scene, depth: u32, rng: &mut dyn RngCore) -> Color {
    // Out of bounces: biased cutoff, not an error
    if depth == 0 {
        return Color::ZERO;
    }

    let mut rec = HitRecord::default();
    if !scene
        .world
        .hit(ray, Interval::new(0.001, f32::INFINITY), &mut rec, rng)
    {
        return scene.background;
    }

    let emitted = rec.material.emitted(ray, &rec);

    let Some(scatter) = rec.material.scatter(ray, &rec, rng) else {
        return emitted;
    };

    let (attenuation, material_pdf) = match scatter {
        ScatterRecord::Specular { attenuation, ray: specular } => {
            return emitted + attenuation * ray_color(&specular, scene, depth - 1, rng);
        }
        ScatterRecord::Sampled { attenuation, pdf } => (attenuation, pdf),
    };

    let (direction, pdf_value) = match &scene.lights {
        Some(lights) => {
            let light_pdf = Pdf::Hittable(HittablePdf::new(lights.as_ref(), rec.p));
            let mixture = Pdf::Mixture(MixturePdf::new(&light_pdf, &material_pdf));
            let direction = mixture.generate(rng);
            (direction, mixture.value(direction, rng))
        }
        None => {
            let direction = material_pdf.generate(rng);
            (direction, material_pdf.value(direction, rng))
        }
    };

    // Degenerate direction or zero density: no recursive contribution
    if !direction.is_finite() || direction.length_squared() == 0.0 {
        return emitted;
    }
    if !pdf_value.is_finite() || pdf_value <= 0.0 {
        return emitted;
    }

    let scattered = Ray::new(rec.p, direction, ray.time());
    let scattering_pdf = rec.material.scattering_pdf(ray, &rec, &scattered);
    if scattering_pdf <= 0.0 {
        return emitted;
    }

    let incoming = ray_color(&scattered, scene, depth - 1, rng);
    emitted + attenuation * scattering_pdf * incoming / pdf_value
}

/// Summed (not averaged) radiance of `samples_per_pixel` jittered samples.
///
/// `row` 0 is the top of the image.
pub fn render_pixel(
    scene: &Scene,
    camera: &Camera,
    config: &RenderConfig,
    row: u32,
    col: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let width = config.image_width;
    let height = config.image_height();
    let s_scale = 1.0 / width.saturating_sub(1).max(1) as f32;
    let t_scale = 1.0 / height.saturating_sub(1).max(1) as f32;
    let flipped_row = height.saturating_sub(1).saturating_sub(row);

    let mut pixel_color = Color::ZERO;
    for _ in 0..config.samples_per_pixel {
        let s = (col as f32 + gen_f32(rng)) * s_scale;
        let t = (flipped_row as f32 + gen_f32(rng)) * t_scale;
        let ray = camera.get_ray(s, t, rng);
        pixel_color += sanitize(ray_color(&ray, scene, config.max_depth, rng));
    }
    pixel_color
}

/// Replace non-finite channels of a sample with zero.
#[inline]
fn sanitize(color: Color) -> Color {
    Color::new(
        if color.x.is_finite() { color.x } else { 0.0 },
        if color.y.is_finite() { color.y } else { 0.0 },
        if color.z.is_finite() { color.z } else { 0.0 },
    )
}

/// Gamma 2 encode; non-positive input maps to 0.
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Average a pixel's sample sum and quantize it to 8-bit RGB.
pub fn color_to_rgb8(sum: Color, samples_per_pixel: u32) -> [u8; 3] {
    let scale = 1.0 / samples_per_pixel.max(1) as f32;
    let channel = |c: f32| {
        let c = c * scale;
        let c = if c.is_nan() { 0.0 } else { c };
        (256.0 * linear_to_gamma(c).clamp(0.0, 0.999)) as u8
    };
    [channel(sum.x), channel(sum.y), channel(sum.z)]
}

/// Accumulated per-pixel sample sums, row 0 at the top.
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    pub fn new(width: u32, height: u32, samples_per_pixel: u32) -> Self {
        Self {
            width,
            height,
            samples_per_pixel,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Sample sum at (col, row), or `None` outside the image.
    pub fn get(&self, col: u32, row: u32) -> Option<Color> {
        self.index(col, row).map(|i| self.pixels[i])
    }

    /// Store the sample sum at (col, row). Returns false, leaving the image
    /// untouched, when the coordinates fall outside it.
    pub fn set(&mut self, col: u32, row: u32, color: Color) -> bool {
        match self.index(col, row) {
            Some(i) => {
                self.pixels[i] = color;
                true
            }
            None => false,
        }
    }

    fn index(&self, col: u32, row: u32) -> Option<usize> {
        (col < self.width && row < self.height)
            .then(|| row as usize * self.width as usize + col as usize)
    }

    /// Gamma-corrected RGB bytes in row-major order.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&sum| color_to_rgb8(sum, self.samples_per_pixel))
            .collect()
    }

    /// Convert to an `image` buffer for saving in other formats.
    pub fn to_rgb_image(&self) -> RgbImage {
        let mut image = RgbImage::new(self.width, self.height);
        for (col, row, pixel) in image.enumerate_pixels_mut() {
            let sum = self.get(col, row).unwrap_or(Color::ZERO);
            pixel.0 = color_to_rgb8(sum, self.samples_per_pixel);
        }
        image
    }
}
