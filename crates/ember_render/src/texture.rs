//! Textures: spatially varying colors looked up at a hit's `(u, v, p)`.

use crate::material::Color;
use crate::perlin::Perlin;
use ember_math::Vec3;
use image::RgbImage;
use rand::RngCore;
use std::path::Path;
use std::sync::Arc;

/// Color returned by an image texture whose file could not be decoded.
pub const MISSING_TEXTURE_COLOR: Color = Color::new(0.0, 1.0, 1.0);

/// Trait for anything that yields a color at a surface point.
pub trait Texture: Send + Sync {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color;
}

/// A single constant color.
#[derive(Debug, Clone, Copy)]
pub struct SolidColor {
    color: Color,
}

impl SolidColor {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    pub fn rgb(red: f32, green: f32, blue: f32) -> Self {
        Self::new(Color::new(red, green, blue))
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        self.color
    }
}

/// 3-D checker pattern alternating between two child textures.
///
/// The pattern is solid (it depends on `p`, not `u, v`), so it does not
/// stretch with the surface parameterization.
pub struct CheckerTexture {
    odd: Arc<dyn Texture>,
    even: Arc<dyn Texture>,
}

impl CheckerTexture {
    pub fn new(odd: Arc<dyn Texture>, even: Arc<dyn Texture>) -> Self {
        Self { odd, even }
    }

    pub fn from_colors(odd: Color, even: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(odd)), Arc::new(SolidColor::new(even)))
    }
}

impl Texture for CheckerTexture {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        let sines = (10.0 * p.x).sin() * (10.0 * p.y).sin() * (10.0 * p.z).sin();
        if sines < 0.0 {
            self.odd.value(u, v, p)
        } else {
            self.even.value(u, v, p)
        }
    }
}

/// Marble-like pattern: a sine along z phase-shifted by Perlin turbulence.
pub struct NoiseTexture {
    noise: Perlin,
    scale: f32,
}

impl NoiseTexture {
    const TURBULENCE_DEPTH: usize = 7;

    pub fn new(scale: f32, rng: &mut dyn RngCore) -> Self {
        Self {
            noise: Perlin::new(rng),
            scale,
        }
    }
}

impl Texture for NoiseTexture {
    fn value(&self, _u: f32, _v: f32, p: Vec3) -> Color {
        let phase = self.scale * p.z + 10.0 * self.noise.turb(p, Self::TURBULENCE_DEPTH);
        Color::ONE * 0.5 * (1.0 + phase.sin())
    }
}

/// Texture sampled from a decoded bitmap, nearest texel.
///
/// A texture whose image failed to load reports [`MISSING_TEXTURE_COLOR`]
/// everywhere instead of aborting the render.
pub struct ImageTexture {
    image: Option<RgbImage>,
}

impl ImageTexture {
    /// Decode an image file. Failure is logged and yields the fallback color.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match image::open(path) {
            Ok(img) => {
                let rgb = img.to_rgb8();
                log::debug!(
                    "Loaded texture: {} ({}x{})",
                    path.display(),
                    rgb.width(),
                    rgb.height()
                );
                Self { image: Some(rgb) }
            }
            Err(e) => {
                log::warn!("Could not load texture image file '{}': {}", path.display(), e);
                Self { image: None }
            }
        }
    }

    /// Wrap an already decoded image.
    pub fn from_image(image: RgbImage) -> Self {
        let image = (image.width() > 0 && image.height() > 0).then_some(image);
        Self { image }
    }

    /// True if pixel data is available.
    pub fn is_loaded(&self) -> bool {
        self.image.is_some()
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f32, v: f32, _p: Vec3) -> Color {
        let Some(image) = &self.image else {
            return MISSING_TEXTURE_COLOR;
        };

        let (width, height) = image.dimensions();
        let u = u.clamp(0.0, 1.0);
        // Flip V to image coordinates
        let v = 1.0 - v.clamp(0.0, 1.0);

        let i = ((u * width as f32) as u32).min(width - 1);
        let j = ((v * height as f32) as u32).min(height - 1);

        let pixel = image.get_pixel(i, j);
        Color::new(
            pixel[0] as f32 / 255.0,
            pixel[1] as f32 / 255.0,
            pixel[2] as f32 / 255.0,
        )
    }
}
