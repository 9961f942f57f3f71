//! Materials: how light scatters from and is emitted by surfaces.

use crate::hittable::HitRecord;
use crate::pdf::{CosinePdf, Pdf};
use crate::sampling::{gen_f32, random_in_unit_sphere};
use crate::texture::{SolidColor, Texture};
use ember_math::{Ray, Vec3};
use rand::RngCore;
use std::f32::consts::PI;
use std::sync::Arc;

/// Color type alias (linear RGB radiance or reflectance)
pub type Color = Vec3;

/// Outcome of a scattering event.
pub enum ScatterRecord {
    /// Deterministic ray (mirror, glass). Followed directly, no density.
    Specular { attenuation: Color, ray: Ray },
    /// Outgoing direction to be drawn from `pdf` (diffuse, volume).
    Sampled {
        attenuation: Color,
        pdf: Pdf<'static>,
    },
}

/// Surface (or volume) response at a hit.
///
/// Materials are built once, shared by every primitive using them, and never
/// mutated afterwards.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray, or `None` if the material only emits/absorbs.
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterRecord>;

    /// Density with which this material scatters `ray_in` into `scattered`.
    fn scattering_pdf(&self, _ray_in: &Ray, _rec: &HitRecord, _scattered: &Ray) -> f32 {
        0.0
    }

    /// Light emitted at the hit. Most materials return black.
    fn emitted(&self, _ray_in: &Ray, _rec: &HitRecord) -> Color {
        Color::ZERO
    }
}

/// Ideal diffuse reflector, cosine-weighted.
pub struct Lambertian {
    albedo: Arc<dyn Texture>,
}

impl Lambertian {
    pub fn new(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }

    pub fn from_color(albedo: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(albedo)))
    }
}

impl Material for Lambertian {
    fn scatter(&self, _ray_in: &Ray, rec: &HitRecord, _rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        Some(ScatterRecord::Sampled {
            attenuation: self.albedo.value(rec.u, rec.v, rec.p),
            pdf: Pdf::Cosine(CosinePdf::new(rec.normal)),
        })
    }

    fn scattering_pdf(&self, _ray_in: &Ray, rec: &HitRecord, scattered: &Ray) -> f32 {
        let Some(direction) = scattered.direction().try_normalize() else {
            return 0.0;
        };
        let cosine = rec.normal.dot(direction);
        if cosine < 0.0 {
            0.0
        } else {
            cosine / PI
        }
    }
}

/// Mirror reflection blurred by a fuzz ball.
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// `fuzz` is clamped to `[0, 1]`; 0 is a perfect mirror.
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }
}

impl Material for Metal {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        let reflected = reflect(ray_in.direction().normalize_or_zero(), rec.normal);
        let direction = reflected + self.fuzz * random_in_unit_sphere(rng);

        Some(ScatterRecord::Specular {
            attenuation: self.albedo,
            ray: Ray::new(rec.p, direction, ray_in.time()),
        })
    }
}

/// Clear refractive surface such as glass or water.
pub struct Dielectric {
    ior: f32,
}

impl Dielectric {
    /// `ior` is relative to the surrounding medium (1.5 for glass in air).
    pub fn new(ior: f32) -> Self {
        Self { ior }
    }

    /// Schlick's Fresnel approximation.
    fn reflectance(cosine: f32, ior: f32) -> f32 {
        let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        let refraction_ratio = if rec.front_face { 1.0 / self.ior } else { self.ior };

        let unit_direction = ray_in.direction().normalize_or_zero();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

        // Total internal reflection
        let cannot_refract = refraction_ratio * sin_theta > 1.0;

        let direction = if cannot_refract
            || Self::reflectance(cos_theta, refraction_ratio) > gen_f32(rng)
        {
            reflect(unit_direction, rec.normal)
        } else {
            refract(unit_direction, rec.normal, refraction_ratio)
        };

        Some(ScatterRecord::Specular {
            attenuation: Color::ONE,
            ray: Ray::new(rec.p, direction, ray_in.time()),
        })
    }
}

/// Diffuse light emitter. Emits from the front face only.
pub struct DiffuseLight {
    emit: Arc<dyn Texture>,
}

impl DiffuseLight {
    pub fn new(emit: Arc<dyn Texture>) -> Self {
        Self { emit }
    }

    pub fn from_color(emit: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(emit)))
    }
}

impl Material for DiffuseLight {
    fn scatter(&self, _ray_in: &Ray, _rec: &HitRecord, _rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        None
    }

    fn emitted(&self, _ray_in: &Ray, rec: &HitRecord) -> Color {
        if !rec.front_face {
            return Color::ZERO;
        }
        self.emit.value(rec.u, rec.v, rec.p)
    }
}

/// Isotropic phase function for participating media.
///
/// Scatters uniformly over the sphere of directions.
pub struct Isotropic {
    albedo: Arc<dyn Texture>,
}

impl Isotropic {
    pub fn new(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }

    pub fn from_color(albedo: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(albedo)))
    }
}

impl Material for Isotropic {
    fn scatter(&self, _ray_in: &Ray, rec: &HitRecord, _rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        Some(ScatterRecord::Sampled {
            attenuation: self.albedo.value(rec.u, rec.v, rec.p),
            pdf: Pdf::Sphere,
        })
    }

    fn scattering_pdf(&self, _ray_in: &Ray, _rec: &HitRecord, _scattered: &Ray) -> f32 {
        1.0 / (4.0 * PI)
    }
}

/// Mirror `v` about the plane with normal `n`.
#[inline]
pub(crate) fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface with relative index `etai_over_etat`.
#[inline]
pub(crate) fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}
