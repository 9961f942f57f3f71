//! Command line arguments.

use crate::scenes::SceneKind;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ember_render::RenderConfig;
use log::LevelFilter;
use std::fs;
use std::path::PathBuf;

/// Log verbosity selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "ember")]
#[command(about = "Render a demo scene with a Monte Carlo path tracer and write it as PPM")]
pub struct Cli {
    /// Demo scene to render
    #[arg(long, value_enum, default_value = "cornell-box")]
    pub scene: SceneKind,

    /// JSON render configuration; flags below override its fields
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output file, stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Width divided by height
    #[arg(long)]
    pub aspect_ratio: Option<f32>,

    /// Samples per pixel
    #[arg(short, long)]
    pub samples: Option<u32>,

    /// Maximum bounces per path
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Seed for scene generation and pixel sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Worker threads, all cores when omitted
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Equirectangular image used by the earth scenes
    #[arg(long, default_value = "assets/earthmap.jpg")]
    pub earth_texture: PathBuf,

    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Cli {
    /// Resolve the render configuration: defaults, then the config file, then flags.
    pub fn render_config(&self) -> Result<RenderConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("Failed to parse config file {}", path.display()))?
            }
            None => RenderConfig::default(),
        };

        if let Some(width) = self.width {
            config.image_width = width;
        }
        if let Some(aspect_ratio) = self.aspect_ratio {
            config.aspect_ratio = aspect_ratio;
        }
        if let Some(samples) = self.samples {
            config.samples_per_pixel = samples;
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.threads.is_some() {
            config.threads = self.threads;
        }

        config.validate()?;
        Ok(config)
    }
}
