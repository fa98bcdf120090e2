use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::Context;
use clap::Parser;
use tensorscope::app::WindowManager;
use tensorscope::canvas::{
    GrayscaleBatchWindow, GrayscaleNormalization, GridMode, RgbTensorWindow, WindowConfig,
};
use tensorscope::config::{self, Settings};
use tensorscope::import::ImageImporter;
use tensorscope::logging;
use tensorscope::producer::{spawn_producer, ProducerReport};
use tensorscope::state::SharedContext;
use tensorscope::tensor::{Batch, Tensor, TensorError, TensorResult};

#[derive(Parser, Debug)]
#[command(
    name = "tensorscope",
    about = "Shows tensor batches from a running producer thread in live windows."
)]
struct Args {
    /// `;`-separated image files shown in an RGB window instead of the synthetic batches
    #[arg(long, value_name = "PATHS")]
    images: Option<String>,

    /// Settings file to use instead of $XDG_CONFIG_HOME/tensorscope/config.json
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

type Producers = Vec<JoinHandle<ProducerReport>>;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = match &args.config {
        Some(path) => config::read_settings(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => config::load_settings(),
    };
    logging::init(settings.log_filter.as_deref());
    tracing::info!("starting tensorscope");

    let shared = SharedContext::new();
    let manager = WindowManager::initialize(shared.clone(), &settings)
        .context("failed to initialize the window manager")?;

    let producers = match args.images.as_deref() {
        Some(list) => image_demo(&manager, &settings, list)?,
        None => synthetic_demo(&manager, &settings)?,
    };
    tracing::info!("press h in any window to list its key bindings");

    let looped = manager.start_loop();
    shared.quit();
    for producer in producers {
        match producer.join() {
            Ok(report) => tracing::info!(steps = report.steps, exit = ?report.exit, "producer finished"),
            Err(_) => tracing::error!("producer thread panicked"),
        }
    }
    looped.context("render loop failed")?;
    Ok(())
}

fn image_demo(manager: &WindowManager, settings: &Settings, list: &str) -> anyhow::Result<Producers> {
    let importer = ImageImporter::<f32>::from_path_list(list).context("failed to import images")?;
    let shared = manager.shared().clone();
    let config = settings.window_config(WindowConfig::new("Images"));
    let window = manager.create_window(|id| RgbTensorWindow::<f32>::new(id, &config, &shared))?;

    let canvas = window.canvas().clone();
    canvas.set_batch(importer.samples());
    let producer = spawn_producer("image-producer", shared, settings.producer_interval(), move |_| {
        let batch = (0..importer.len())
            .filter_map(|_| importer.random_sample())
            .collect::<Batch<f32>>();
        canvas.set_batch(&batch);
        Ok::<(), Infallible>(())
    })?;
    Ok(vec![producer])
}

fn synthetic_demo(manager: &WindowManager, settings: &Settings) -> anyhow::Result<Producers> {
    let shared = manager.shared().clone();
    let digits_config = settings.window_config(
        WindowConfig::new("Grayscale batch")
            .with_normalization(GrayscaleNormalization::HotCold)
            .with_grid(GridMode::Both),
    );
    let colors_config = settings.window_config(WindowConfig::new("RGB batch").with_position(600, 0));
    let digits = manager.create_window(|id| GrayscaleBatchWindow::<f32>::new(id, &digits_config, &shared))?;
    let colors = manager.create_window(|id| RgbTensorWindow::<f32>::new(id, &colors_config, &shared))?;

    let digits = digits.canvas().clone();
    let colors = colors.canvas().clone();
    let mut step = 0_usize;
    let producer = spawn_producer(
        "synthetic-producer",
        shared,
        settings.producer_interval(),
        move |shared| {
            let digit_batch = one_hot_batch(step)?;
            let color_batch = gradient_batch(step)?;
            let mut scope = shared.acquire_scoped();
            digits.set_batch_unsynchronized(&mut scope, &digit_batch);
            colors.set_batch_unsynchronized(&mut scope, &color_batch);
            step += 1;
            Ok::<(), TensorError>(())
        },
    )?;
    Ok(vec![producer])
}

/// Fifteen 3×5 matrices, each with a single signed element that moves every step.
fn one_hot_batch(step: usize) -> TensorResult<Batch<f32>> {
    (0..15)
        .map(|index| {
            let mut data = vec![0.0; 15];
            data[(index + step) % 15] = if index % 2 == 0 { 1.0 } else { -1.0 };
            Tensor::matrix(3, 5, data).map(Arc::new)
        })
        .collect()
}

fn gradient_batch(step: usize) -> TensorResult<Batch<f32>> {
    (0..4)
        .map(|index| {
            let blue = ((step + index * 3) % 10) as f32 / 10.0;
            let mut sample = Tensor::zeros(8, 8, 3)?;
            for y in 0..8 {
                for x in 0..8 {
                    sample.set(y, x, 0, x as f32 / 7.0);
                    sample.set(y, x, 1, y as f32 / 7.0);
                    sample.set(y, x, 2, blue);
                }
            }
            Ok(Arc::new(sample))
        })
        .collect()
}
