//! umbra: render one of the built-in scenes to an image file.

mod output;
mod scenes;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use umbra_renderer::{render, RenderConfig, DEFAULT_BUCKET_SIZE};

use scenes::{build_scene, SceneKind};

#[derive(Debug, Parser)]
#[command(name = "umbra", version, about = "Monte Carlo path tracer", long_about = None)]
struct CliArguments {
    /// Scene to render
    #[arg(long, value_enum, default_value_t = SceneKind::RandomSpheres)]
    scene: SceneKind,

    /// Image width in pixels; height follows the scene's aspect ratio
    #[arg(short, long, default_value_t = 400)]
    width: u32,

    /// Samples per pixel
    #[arg(short, long, default_value_t = 100)]
    samples: u32,

    /// Maximum bounces per path
    #[arg(short, long, default_value_t = 50)]
    depth: u32,

    /// Seed for scene construction and sampling
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Output path; `.ppm` writes plain PPM, other extensions use the image encoder
    #[arg(short, long, default_value = "image.ppm")]
    output: PathBuf,

    /// Image used by the `earth` and `final` scenes
    #[arg(short, long, default_value = "earthmap.jpg")]
    texture: PathBuf,

    /// Edge length of render buckets in pixels
    #[arg(long, default_value_t = DEFAULT_BUCKET_SIZE)]
    bucket_size: u32,

    /// Worker threads (defaults to one per core)
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArguments::parse();
    log::debug!("{:?}", args);

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure the render thread pool")?;
    }

    let start = Instant::now();
    let mut rng = StdRng::seed_from_u64(args.seed);
    let scene = build_scene(args.scene, args.width.max(1), &args.texture, &mut rng)
        .with_context(|| format!("Failed to build scene {:?}", args.scene))?;
    log::info!("Scene built in {:.2?}", start.elapsed());

    let config = RenderConfig {
        samples_per_pixel: args.samples,
        max_depth: args.depth,
        background: scene.background,
        seed: args.seed,
        bucket_size: args.bucket_size,
    };

    let image = render(&scene.camera, scene.world.as_ref(), &config);

    output::save_image(&image, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    Ok(())
}
