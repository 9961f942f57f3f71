//! Row-by-row parallel render scheduling.
//!
//! Each scanline is split into one task per pixel on a rayon pool. Tasks
//! report back over a channel in whatever order they finish; the row barrier
//! sorts the results by column before handing the row on, so output is
//! row-major regardless of completion order.

use crate::camera::Camera;
use crate::error::{RenderError, RenderResult};
use crate::material::Color;
use crate::renderer::{render_pixel, ImageBuffer, RenderConfig, Scene};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::time::Instant;

/// Summed radiance of one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelSample {
    pub row: u32,
    pub col: u32,
    pub color: Color,
}

/// Seed of the random stream owned by pixel `(row, col)`.
///
/// SplitMix64 finalizer over the base seed and pixel coordinates, so
/// neighbouring pixels get unrelated streams.
pub fn pixel_seed(seed: u64, row: u32, col: u32) -> u64 {
    let mut z = seed
        .wrapping_add((((row as u64) << 32) | col as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Put one row's task results in column order.
///
/// Fails if any task failed, or if the columns are not exactly
/// `0..width` once sorted.
pub fn order_row(
    row: u32,
    width: u32,
    mut results: Vec<(u32, RenderResult<PixelSample>)>,
) -> RenderResult<Vec<PixelSample>> {
    let expected = width as usize;
    let received = results.len();
    if received != expected {
        return Err(RenderError::MissingPixels {
            row,
            expected,
            received,
        });
    }

    results.sort_by_key(|(col, _)| *col);

    let mut samples = Vec::with_capacity(expected);
    for (position, (col, result)) in results.into_iter().enumerate() {
        // A gap or duplicate shifts some column off its slot
        if col as usize != position {
            return Err(RenderError::MissingPixels {
                row,
                expected,
                received,
            });
        }
        samples.push(result?);
    }
    Ok(samples)
}

/// Fixed-size worker pool rendering one scanline at a time.
pub struct RowScheduler {
    pool: rayon::ThreadPool,
}

impl RowScheduler {
    /// Build the pool. `None` uses one worker per hardware thread.
    pub fn new(threads: Option<usize>) -> RenderResult<Self> {
        let mut builder = rayon::ThreadPoolBuilder::new()
            .thread_name(|i| format!("ember-worker-{}", i));
        if let Some(n) = threads {
            if n == 0 {
                return Err(RenderError::InvalidConfig(
                    "threads must be at least 1".to_string(),
                ));
            }
            builder = builder.num_threads(n);
        }
        let pool = builder
            .build()
            .map_err(|e| RenderError::ThreadPool(e.to_string()))?;
        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Render scanline `row` (0 = top), one task per column.
    ///
    /// Blocks until every task in the row has reported.
    pub fn render_row(
        &self,
        scene: &Scene,
        camera: &Camera,
        config: &RenderConfig,
        row: u32,
    ) -> RenderResult<Vec<PixelSample>> {
        let width = config.image_width;
        let (tx, rx) = mpsc::channel();

        // The scope owns the original sender; the channel closes once
        // every task has reported
        self.pool.scope(move |s| {
            for col in 0..width {
                let tx = tx.clone();
                s.spawn(move |_| {
                    let result = panic::catch_unwind(AssertUnwindSafe(|| {
                        let mut rng = StdRng::seed_from_u64(pixel_seed(config.seed, row, col));
                        render_pixel(scene, camera, config, row, col, &mut rng)
                    }))
                    .map(|color| PixelSample { row, col, color })
                    .map_err(|payload| RenderError::TaskFailed {
                        row,
                        col,
                        message: panic_message(payload.as_ref()),
                    });

                    // The receiver lives past the scope, so this can't fail
                    let _ = tx.send((col, result));
                });
            }
        });

        order_row(row, width, rx.into_iter().collect())
    }

    /// Render every row top to bottom, handing each finished row to `emit`.
    pub fn render_rows<F>(
        &self,
        scene: &Scene,
        camera: &Camera,
        config: &RenderConfig,
        mut emit: F,
    ) -> RenderResult<()>
    where
        F: FnMut(&[PixelSample]) -> RenderResult<()>,
    {
        config.validate()?;

        let height = config.image_height();
        let start = Instant::now();
        log::info!(
            "Rendering {}x{} at {} spp on {} threads",
            config.image_width,
            height,
            config.samples_per_pixel,
            self.threads()
        );

        for row in 0..height {
            log::info!("Scanlines remaining: {}", height - row);
            let row_start = Instant::now();

            let samples = self.render_row(scene, camera, config, row)?;
            emit(&samples)?;

            log::debug!("Row {} done in {:.2?}", row, row_start.elapsed());
        }

        log::info!("Render complete in {:.2?}", start.elapsed());
        Ok(())
    }

    /// Render the whole image into memory.
    pub fn render(
        &self,
        scene: &Scene,
        camera: &Camera,
        config: &RenderConfig,
    ) -> RenderResult<ImageBuffer> {
        let mut image = ImageBuffer::new(
            config.image_width,
            config.image_height(),
            config.samples_per_pixel,
        );
        self.render_rows(scene, camera, config, |samples| {
            for sample in samples {
                let stored = image.set(sample.col, sample.row, sample.color);
                debug_assert!(stored, "sample outside the image");
            }
            Ok(())
        })?;
        Ok(image)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aarect::AaRect;
    use crate::hittable::{HitRecord, Hittable, HittableList};
    use crate::material::{DiffuseLight, Lambertian, Material};
    use crate::ppm::PpmWriter;
    use crate::sphere::Sphere;
    use crate::transform::FlipFace;
    use ember_math::{Aabb, Interval, Ray, Vec3};
    use rand::seq::SliceRandom;
    use rand::RngCore;
    use std::sync::Arc;

    fn small_scene() -> (Scene, Camera, RenderConfig) {
        let white: Arc<dyn Material> = Arc::new(Lambertian::from_color(Color::splat(0.73)));
        let red: Arc<dyn Material> = Arc::new(Lambertian::from_color(Color::new(0.65, 0.05, 0.05)));
        let light: Arc<dyn Hittable> = Arc::new(FlipFace::new(Arc::new(AaRect::xz(
            -1.0,
            1.0,
            -1.0,
            1.0,
            3.0,
            Arc::new(DiffuseLight::from_color(Color::splat(8.0))),
        ))));

        let world: HittableList = [
            Arc::new(AaRect::xz(-5.0, 5.0, -5.0, 5.0, 0.0, white.clone())) as Arc<dyn Hittable>,
            Arc::new(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, red)),
            Arc::new(Sphere::new(Vec3::new(1.5, 0.5, 1.0), 0.5, white)),
            light.clone(),
        ]
        .into_iter()
        .collect();
        let scene = Scene::new(Arc::new(world), Color::splat(0.05)).with_lights(light);

        let mut camera = Camera::new()
            .with_position(Vec3::new(0.0, 2.0, 8.0), Vec3::new(0.0, 1.0, 0.0), Vec3::Y)
            .with_lens(40.0, 0.0, 8.0)
            .with_aspect_ratio(4.0 / 3.0);
        camera.initialize();

        let config = RenderConfig {
            image_width: 8,
            aspect_ratio: 4.0 / 3.0,
            samples_per_pixel: 4,
            max_depth: 6,
            seed: 1234,
            threads: None,
            ..Default::default()
        };
        (scene, camera, config)
    }

    fn ppm_bytes(rows: &[Vec<PixelSample>], config: &RenderConfig) -> Vec<u8> {
        let mut writer = PpmWriter::new(
            Vec::new(),
            config.image_width,
            config.image_height(),
            config.samples_per_pixel,
        )
        .unwrap();
        for row in rows {
            writer.write_row(row).unwrap();
        }
        writer.finish().unwrap()
    }

    fn render_to_ppm(threads: usize) -> Vec<u8> {
        let (scene, camera, config) = small_scene();
        let scheduler = RowScheduler::new(Some(threads)).unwrap();
        let mut rows = Vec::new();
        scheduler
            .render_rows(&scene, &camera, &config, |samples| {
                rows.push(samples.to_vec());
                Ok(())
            })
            .unwrap();
        ppm_bytes(&rows, &config)
    }

    #[test]
    fn test_pixel_seed_is_deterministic_and_distinct() {
        assert_eq!(pixel_seed(7, 3, 4), pixel_seed(7, 3, 4));
        assert_ne!(pixel_seed(7, 3, 4), pixel_seed(7, 4, 3));
        assert_ne!(pixel_seed(7, 3, 4), pixel_seed(8, 3, 4));

        let mut seeds: Vec<u64> = (0..32)
            .flat_map(|row| (0..32).map(move |col| pixel_seed(0, row, col)))
            .collect();
        seeds.sort_unstable();
        seeds.dedup();
        assert_eq!(seeds.len(), 32 * 32);
    }

    #[test]
    fn test_order_row_sorts_by_column() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut results: Vec<(u32, RenderResult<PixelSample>)> = (0..10)
            .map(|col| {
                let sample = PixelSample { row: 2, col, color: Color::splat(col as f32) };
                (col, Ok(sample))
            })
            .collect();
        results.shuffle(&mut rng);

        let ordered = order_row(2, 10, results).unwrap();
        let cols: Vec<u32> = ordered.iter().map(|s| s.col).collect();
        assert_eq!(cols, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_order_row_rejects_gaps_and_duplicates() {
        let sample = |col| (col, Ok(PixelSample { row: 0, col, color: Color::ZERO }));

        let short = vec![sample(0), sample(2)];
        assert!(matches!(
            order_row(0, 3, short),
            Err(RenderError::MissingPixels { expected: 3, received: 2, .. })
        ));

        let duplicate = vec![sample(0), sample(1), sample(1)];
        assert!(matches!(
            order_row(0, 3, duplicate),
            Err(RenderError::MissingPixels { .. })
        ));
    }

    #[test]
    fn test_order_row_surfaces_task_failure() {
        let results = vec![
            (1, Ok(PixelSample { row: 5, col: 1, color: Color::ZERO })),
            (
                0,
                Err(RenderError::TaskFailed { row: 5, col: 0, message: "boom".to_string() }),
            ),
        ];
        assert!(matches!(
            order_row(5, 2, results),
            Err(RenderError::TaskFailed { row: 5, col: 0, .. })
        ));
    }

    #[test]
    fn test_output_independent_of_completion_order() {
        let (scene, camera, config) = small_scene();
        let width = config.image_width;
        let height = config.image_height();
        let scheduler = RowScheduler::new(Some(2)).unwrap();

        let mut scheduled = Vec::new();
        for row in 0..height {
            scheduled.push(scheduler.render_row(&scene, &camera, &config, row).unwrap());
        }
        let expected = ppm_bytes(&scheduled, &config);

        // Replay each row's tasks, then feed the results to the barrier in
        // several shuffled completion orders
        let mut shuffler = StdRng::seed_from_u64(99);
        for _ in 0..3 {
            let mut rows = Vec::new();
            for row in 0..height {
                let mut results: Vec<(u32, RenderResult<PixelSample>)> = (0..width)
                    .map(|col| {
                        let mut rng = StdRng::seed_from_u64(pixel_seed(config.seed, row, col));
                        let color = render_pixel(&scene, &camera, &config, row, col, &mut rng);
                        (col, Ok(PixelSample { row, col, color }))
                    })
                    .collect();
                results.shuffle(&mut shuffler);
                rows.push(order_row(row, width, results).unwrap());
            }
            assert_eq!(ppm_bytes(&rows, &config), expected);
        }
    }

    #[test]
    fn test_thread_count_does_not_change_output() {
        let single = render_to_ppm(1);
        let multi = render_to_ppm(4);
        assert_eq!(single, multi);

        let text = String::from_utf8(single).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("P3"));
        assert_eq!(lines.next(), Some("8 6"));
        assert_eq!(lines.next(), Some("255"));
        assert_eq!(lines.count(), 48);
    }

    #[test]
    fn test_render_fills_image_row_major() {
        // Exercise the progress logging path
        let _ = env_logger::builder().is_test(true).try_init();

        let (scene, camera, config) = small_scene();
        let scheduler = RowScheduler::new(Some(3)).unwrap();
        let image = scheduler.render(&scene, &camera, &config).unwrap();

        assert_eq!(image.width, 8);
        assert_eq!(image.height, 6);
        let mut rng = StdRng::seed_from_u64(pixel_seed(config.seed, 4, 5));
        let direct = render_pixel(&scene, &camera, &config, 4, 5, &mut rng);
        assert_eq!(image.get(5, 4), Some(direct));
    }

    #[test]
    fn test_invalid_config_is_rejected_before_rendering() {
        let (scene, camera, mut config) = small_scene();
        config.samples_per_pixel = 0;
        let scheduler = RowScheduler::new(Some(1)).unwrap();
        let result = scheduler.render_rows(&scene, &camera, &config, |_| Ok(()));
        assert!(matches!(result, Err(RenderError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_threads_is_rejected() {
        assert!(matches!(RowScheduler::new(Some(0)), Err(RenderError::InvalidConfig(_))));
    }

    struct Exploding;

    impl Hittable for Exploding {
        fn hit<'a>(
            &'a self,
            _ray: &Ray,
            _ray_t: Interval,
            _rec: &mut HitRecord<'a>,
            _rng: &mut dyn RngCore,
        ) -> bool {
            panic!("intersection exploded")
        }

        fn bounding_box(&self, _time0: f32, _time1: f32) -> Aabb {
            Aabb::EMPTY
        }
    }

    #[test]
    fn test_panicking_task_is_reported_at_barrier() {
        let (_, camera, config) = small_scene();
        let scene = Scene::new(Arc::new(Exploding), Color::ZERO);
        let scheduler = RowScheduler::new(Some(2)).unwrap();

        match scheduler.render_row(&scene, &camera, &config, 0) {
            Err(RenderError::TaskFailed { row, col, message }) => {
                assert_eq!(row, 0);
                assert_eq!(col, 0);
                assert!(message.contains("exploded"));
            }
            other => panic!("expected a task failure, got {:?}", other.map(|r| r.len())),
        }
    }
}
