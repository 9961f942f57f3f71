//! Built-in demo scenes.
//!
//! Each builder returns the scene graph plus where to put the camera. All
//! randomness (sphere placement, Perlin tables, BVH split axes) comes from the
//! generator passed in, so a scene is reproducible from the config seed.

use clap::ValueEnum;
use ember_render::{
    AaRect, BvhNode, Camera, CheckerTexture, Color, ConstantMedium, Cuboid, Dielectric,
    DiffuseLight, FlipFace, Hittable, HittableList, ImageTexture, Lambertian, Material, Metal,
    MovingSphere, NoiseTexture, RenderConfig, RenderResult, Rotate, Scene, Sphere, Texture,
    Translate, Vec3,
};
use rand::{Rng, RngCore};
use std::path::Path;
use std::sync::Arc;

const SKY: Color = Color::new(0.7, 0.8, 1.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SceneKind {
    RandomSpheres,
    TwoSpheres,
    PerlinSpheres,
    Earth,
    SimpleLight,
    CornellBox,
    CornellSmoke,
    Final,
}

#[cfg(test)]
impl SceneKind {
    pub const ALL: [SceneKind; 8] = [
        SceneKind::RandomSpheres,
        SceneKind::TwoSpheres,
        SceneKind::PerlinSpheres,
        SceneKind::Earth,
        SceneKind::SimpleLight,
        SceneKind::CornellBox,
        SceneKind::CornellSmoke,
        SceneKind::Final,
    ];
}

/// A built scene and its camera placement.
pub struct SceneSetup {
    pub scene: Scene,
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub vfov: f32,
    pub aperture: f32,
}

impl SceneSetup {
    const FOCUS_DIST: f32 = 10.0;

    /// Camera for this scene at the configured aspect ratio and shutter.
    pub fn camera(&self, config: &RenderConfig) -> Camera {
        let mut camera = Camera::new()
            .with_position(self.look_from, self.look_at, Vec3::Y)
            .with_lens(self.vfov, self.aperture, Self::FOCUS_DIST)
            .with_aspect_ratio(config.aspect_ratio)
            .with_shutter(config.time0, config.time1);
        camera.initialize();
        camera
    }
}

/// Build `kind`. `earth_texture` is only read by the scenes that show a globe.
pub fn build(
    kind: SceneKind,
    config: &RenderConfig,
    earth_texture: &Path,
    rng: &mut dyn RngCore,
) -> RenderResult<SceneSetup> {
    let (t0, t1) = (config.time0, config.time1);
    let setup = match kind {
        SceneKind::RandomSpheres => SceneSetup {
            scene: Scene::new(bvh(random_spheres(rng), t0, t1, rng)?, SKY),
            look_from: Vec3::new(13.0, 2.0, 3.0),
            look_at: Vec3::ZERO,
            vfov: 20.0,
            aperture: 0.1,
        },
        SceneKind::TwoSpheres => SceneSetup {
            scene: Scene::new(bvh(two_spheres(), t0, t1, rng)?, SKY),
            look_from: Vec3::new(13.0, 2.0, 3.0),
            look_at: Vec3::ZERO,
            vfov: 20.0,
            aperture: 0.0,
        },
        SceneKind::PerlinSpheres => {
            let (world, light) = perlin_spheres(rng);
            SceneSetup {
                scene: Scene::new(bvh(world, t0, t1, rng)?, Color::ZERO).with_lights(light),
                look_from: Vec3::new(478.0, 278.0, -600.0),
                look_at: Vec3::new(278.0, 278.0, 0.0),
                vfov: 40.0,
                aperture: 0.0,
            }
        }
        SceneKind::Earth => SceneSetup {
            scene: Scene::new(bvh(earth(earth_texture), t0, t1, rng)?, SKY),
            look_from: Vec3::new(13.0, 2.0, 3.0),
            look_at: Vec3::ZERO,
            vfov: 20.0,
            aperture: 0.0,
        },
        SceneKind::SimpleLight => {
            let (world, light) = simple_light(rng);
            SceneSetup {
                scene: Scene::new(bvh(world, t0, t1, rng)?, Color::ZERO).with_lights(light),
                look_from: Vec3::new(26.0, 3.0, 6.0),
                look_at: Vec3::new(0.0, 2.0, 0.0),
                vfov: 20.0,
                aperture: 0.0,
            }
        }
        SceneKind::CornellBox => {
            let (world, light) = cornell_box();
            SceneSetup {
                scene: Scene::new(bvh(world, t0, t1, rng)?, Color::ZERO).with_lights(light),
                look_from: Vec3::new(278.0, 278.0, -800.0),
                look_at: Vec3::new(278.0, 278.0, 0.0),
                vfov: 40.0,
                aperture: 0.0,
            }
        }
        SceneKind::CornellSmoke => {
            let (world, light) = cornell_smoke();
            SceneSetup {
                scene: Scene::new(bvh(world, t0, t1, rng)?, Color::ZERO).with_lights(light),
                look_from: Vec3::new(278.0, 278.0, -800.0),
                look_at: Vec3::new(278.0, 278.0, 0.0),
                vfov: 40.0,
                aperture: 0.0,
            }
        }
        SceneKind::Final => {
            let (world, light) = final_scene(earth_texture, t0, t1, rng)?;
            SceneSetup {
                scene: Scene::new(Arc::new(world), Color::ZERO).with_lights(light),
                look_from: Vec3::new(478.0, 278.0, -600.0),
                look_at: Vec3::new(278.0, 278.0, 0.0),
                vfov: 40.0,
                aperture: 0.0,
            }
        }
    };

    log::info!("Built scene {:?}", kind);
    Ok(setup)
}

fn bvh(
    list: HittableList,
    time0: f32,
    time1: f32,
    rng: &mut dyn RngCore,
) -> RenderResult<Arc<dyn Hittable>> {
    log::debug!("Building BVH over {} objects", list.len());
    Ok(Arc::new(BvhNode::from_list(list, time0, time1, rng)?))
}

fn lambertian(color: Color) -> Arc<dyn Material> {
    Arc::new(Lambertian::from_color(color))
}

fn random_color(rng: &mut dyn RngCore, min: f32, max: f32) -> Color {
    Color::new(
        rng.gen_range(min..max),
        rng.gen_range(min..max),
        rng.gen_range(min..max),
    )
}

/// Ceiling light facing down, usable both in the world and as the light target.
fn ceiling_light(x0: f32, x1: f32, z0: f32, z1: f32, y: f32, radiance: f32) -> Arc<dyn Hittable> {
    let emitter: Arc<dyn Material> = Arc::new(DiffuseLight::from_color(Color::splat(radiance)));
    Arc::new(FlipFace::new(Arc::new(AaRect::xz(x0, x1, z0, z1, y, emitter))))
}

fn checker() -> Arc<dyn Texture> {
    Arc::new(CheckerTexture::from_colors(
        Color::new(0.9, 0.9, 0.9),
        Color::new(0.2, 0.3, 0.1),
    ))
}

fn random_spheres(rng: &mut dyn RngCore) -> HittableList {
    let mut world = HittableList::new();
    world.add(Arc::new(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Lambertian::new(checker())),
    )));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat: f32 = rng.gen();
            let center = Vec3::new(
                a as f32 + 0.9 * rng.gen::<f32>(),
                0.2,
                b as f32 + 0.9 * rng.gen::<f32>(),
            );

            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            if choose_mat < 0.8 {
                // Diffuse, bouncing during the shutter
                let albedo = random_color(rng, 0.0, 1.0) * random_color(rng, 0.0, 1.0);
                let center2 = center + Vec3::new(0.0, rng.gen_range(0.0..0.5), 0.0);
                world.add(Arc::new(MovingSphere::new(
                    center,
                    center2,
                    0.0,
                    1.0,
                    0.2,
                    lambertian(albedo),
                )));
            } else if choose_mat < 0.95 {
                // Metal
                let albedo = random_color(rng, 0.5, 1.0);
                let fuzz = rng.gen_range(0.0..0.5);
                world.add(Arc::new(Sphere::new(center, 0.2, Arc::new(Metal::new(albedo, fuzz)))));
            } else {
                // Glass
                world.add(Arc::new(Sphere::new(center, 0.2, Arc::new(Dielectric::new(1.5)))));
            }
        }
    }

    world.add(Arc::new(Sphere::new(
        Vec3::new(0.0, 1.0, 0.0),
        1.0,
        Arc::new(Dielectric::new(1.5)),
    )));
    world.add(Arc::new(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        lambertian(Color::new(0.4, 0.2, 0.1)),
    )));
    world.add(Arc::new(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    )));

    world
}

fn two_spheres() -> HittableList {
    let material: Arc<dyn Material> = Arc::new(Lambertian::new(checker()));
    let mut world = HittableList::new();
    world.add(Arc::new(Sphere::new(Vec3::new(0.0, -10.0, 0.0), 10.0, material.clone())));
    world.add(Arc::new(Sphere::new(Vec3::new(0.0, 10.0, 0.0), 10.0, material)));
    world
}

fn perlin_spheres(rng: &mut dyn RngCore) -> (HittableList, Arc<dyn Hittable>) {
    let marble: Arc<dyn Material> = Arc::new(Lambertian::new(Arc::new(NoiseTexture::new(0.1, rng))));
    let light = ceiling_light(123.0, 423.0, 147.0, 412.0, 554.0, 10.0);

    let mut world = HittableList::new();
    world.add(light.clone());
    world.add(Arc::new(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, marble.clone())));
    world.add(Arc::new(Sphere::new(Vec3::new(220.0, 280.0, 300.0), 80.0, marble)));
    (world, light)
}

fn earth(texture: &Path) -> HittableList {
    let surface: Arc<dyn Material> = Arc::new(Lambertian::new(Arc::new(ImageTexture::open(texture))));
    HittableList::from_object(Arc::new(Sphere::new(Vec3::ZERO, 2.0, surface)))
}

fn simple_light(rng: &mut dyn RngCore) -> (HittableList, Arc<dyn Hittable>) {
    let marble: Arc<dyn Material> = Arc::new(Lambertian::new(Arc::new(NoiseTexture::new(4.0, rng))));
    let emitter: Arc<dyn Material> = Arc::new(DiffuseLight::from_color(Color::splat(4.0)));
    let light: Arc<dyn Hittable> = Arc::new(Sphere::new(Vec3::new(0.0, 7.0, 0.0), 2.0, emitter));

    let mut world = HittableList::new();
    world.add(Arc::new(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, marble.clone())));
    world.add(Arc::new(Sphere::new(Vec3::new(0.0, 2.0, 0.0), 2.0, marble)));
    world.add(light.clone());
    (world, light)
}

/// The five walls of the Cornell box, open toward the camera.
fn cornell_walls(world: &mut HittableList, white: &Arc<dyn Material>) {
    let red = lambertian(Color::new(0.65, 0.05, 0.05));
    let green = lambertian(Color::new(0.12, 0.45, 0.15));

    world.add(Arc::new(AaRect::yz(0.0, 555.0, 0.0, 555.0, 555.0, green)));
    world.add(Arc::new(AaRect::yz(0.0, 555.0, 0.0, 555.0, 0.0, red)));
    world.add(Arc::new(AaRect::xz(0.0, 555.0, 0.0, 555.0, 0.0, white.clone())));
    world.add(Arc::new(AaRect::xz(0.0, 555.0, 0.0, 555.0, 555.0, white.clone())));
    world.add(Arc::new(AaRect::xy(0.0, 555.0, 0.0, 555.0, 555.0, white.clone())));
}

/// The tall and short blocks, rotated about Y and moved into place.
fn cornell_blocks(white: &Arc<dyn Material>) -> (Arc<dyn Hittable>, Arc<dyn Hittable>) {
    let tall: Arc<dyn Hittable> =
        Arc::new(Cuboid::new(Vec3::ZERO, Vec3::new(165.0, 330.0, 165.0), white.clone()));
    let tall = Arc::new(Rotate::y(tall, 15.0));
    let tall: Arc<dyn Hittable> = Arc::new(Translate::new(tall, Vec3::new(265.0, 0.0, 295.0)));

    let short: Arc<dyn Hittable> =
        Arc::new(Cuboid::new(Vec3::ZERO, Vec3::new(165.0, 165.0, 165.0), white.clone()));
    let short = Arc::new(Rotate::y(short, -18.0));
    let short: Arc<dyn Hittable> = Arc::new(Translate::new(short, Vec3::new(130.0, 0.0, 65.0)));

    (tall, short)
}

fn cornell_box() -> (HittableList, Arc<dyn Hittable>) {
    let white = lambertian(Color::splat(0.73));
    let light = ceiling_light(213.0, 343.0, 227.0, 332.0, 554.0, 15.0);

    let mut world = HittableList::new();
    cornell_walls(&mut world, &white);
    world.add(light.clone());

    let (tall, short) = cornell_blocks(&white);
    world.add(tall);
    world.add(short);
    (world, light)
}

fn cornell_smoke() -> (HittableList, Arc<dyn Hittable>) {
    let white = lambertian(Color::splat(0.73));
    let light = ceiling_light(113.0, 443.0, 127.0, 432.0, 554.0, 7.0);

    let mut world = HittableList::new();
    cornell_walls(&mut world, &white);
    world.add(light.clone());

    let (tall, short) = cornell_blocks(&white);
    world.add(Arc::new(ConstantMedium::from_color(tall, 0.01, Color::ZERO)));
    world.add(Arc::new(ConstantMedium::from_color(short, 0.01, Color::ONE)));
    (world, light)
}

fn final_scene(
    earth_texture: &Path,
    t0: f32,
    t1: f32,
    rng: &mut dyn RngCore,
) -> RenderResult<(HittableList, Arc<dyn Hittable>)> {
    let ground = lambertian(Color::new(0.48, 0.83, 0.53));

    let boxes_per_side = 20;
    let mut boxes = HittableList::new();
    for i in 0..boxes_per_side {
        for j in 0..boxes_per_side {
            let w = 100.0;
            let x0 = -1000.0 + i as f32 * w;
            let z0 = -1000.0 + j as f32 * w;
            let y1 = rng.gen_range(1.0..101.0);
            boxes.add(Arc::new(Cuboid::new(
                Vec3::new(x0, 0.0, z0),
                Vec3::new(x0 + w, y1, z0 + w),
                ground.clone(),
            )));
        }
    }

    let mut world = HittableList::new();
    world.add(bvh(boxes, t0, t1, rng)?);

    let light = ceiling_light(123.0, 423.0, 147.0, 412.0, 554.0, 7.0);
    world.add(light.clone());

    let center1 = Vec3::new(400.0, 400.0, 200.0);
    let center2 = center1 + Vec3::new(30.0, 0.0, 0.0);
    world.add(Arc::new(MovingSphere::new(
        center1,
        center2,
        0.0,
        1.0,
        50.0,
        lambertian(Color::new(0.7, 0.3, 0.1)),
    )));

    world.add(Arc::new(Sphere::new(
        Vec3::new(260.0, 150.0, 45.0),
        50.0,
        Arc::new(Dielectric::new(1.5)),
    )));
    world.add(Arc::new(Sphere::new(
        Vec3::new(0.0, 150.0, 145.0),
        50.0,
        Arc::new(Metal::new(Color::new(0.8, 0.8, 0.9), 1.0)),
    )));

    // Glass ball filled with blue haze, and thin fog over everything
    let boundary: Arc<dyn Hittable> = Arc::new(Sphere::new(
        Vec3::new(360.0, 150.0, 145.0),
        70.0,
        Arc::new(Dielectric::new(1.5)),
    ));
    world.add(boundary.clone());
    world.add(Arc::new(ConstantMedium::from_color(boundary, 0.2, Color::new(0.2, 0.4, 0.9))));
    let fog: Arc<dyn Hittable> = Arc::new(Sphere::new(Vec3::ZERO, 5000.0, Arc::new(Dielectric::new(1.5))));
    world.add(Arc::new(ConstantMedium::from_color(fog, 0.0001, Color::ONE)));

    let globe: Arc<dyn Material> = Arc::new(Lambertian::new(Arc::new(ImageTexture::open(earth_texture))));
    world.add(Arc::new(Sphere::new(Vec3::new(400.0, 200.0, 400.0), 100.0, globe)));

    let marble: Arc<dyn Material> = Arc::new(Lambertian::new(Arc::new(NoiseTexture::new(0.1, rng))));
    world.add(Arc::new(Sphere::new(Vec3::new(220.0, 280.0, 300.0), 80.0, marble)));

    let white = lambertian(Color::splat(0.73));
    let mut cluster = HittableList::new();
    for _ in 0..1000 {
        let center = Vec3::new(
            rng.gen_range(0.0..165.0),
            rng.gen_range(0.0..165.0),
            rng.gen_range(0.0..165.0),
        );
        cluster.add(Arc::new(Sphere::new(center, 10.0, white.clone())));
    }
    world.add(Arc::new(Translate::new(
        Arc::new(Rotate::y(bvh(cluster, t0, t1, rng)?, 15.0)),
        Vec3::new(-100.0, 270.0, 395.0),
    )));

    Ok((world, light))
}
