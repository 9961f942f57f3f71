//! `ember`: render one of the built-in scenes to a PPM image.

mod cli;
mod scenes;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use ember_render::{PpmWriter, RowScheduler};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::{self, BufWriter, Write};

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.into())
        .parse_default_env()
        .init();

    let config = cli.render_config()?;
    log::debug!("Render config: {:?}", config);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let setup = scenes::build(cli.scene, &config, &cli.earth_texture, &mut rng)?;
    let camera = setup.camera(&config);

    let scheduler = RowScheduler::new(config.threads)?;

    let writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    let mut ppm = PpmWriter::new(
        BufWriter::new(writer),
        config.image_width,
        config.image_height(),
        config.samples_per_pixel,
    )?;

    scheduler.render_rows(&setup.scene, &camera, &config, |samples| {
        ppm.write_row(samples)?;
        Ok(())
    })?;

    ppm.finish()?;

    if let Some(path) = &cli.output {
        log::info!("Wrote {}", path.display());
    }
    Ok(())
}
