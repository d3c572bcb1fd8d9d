//! Command-line interface for rustpsd detector simulations.
//!
//! Assembles an example tube-array instrument from flags, fires Monte
//! Carlo trajectories at it, and writes histogram and wireframe output.
#![allow(
    clippy::uninlined_format_args,
    clippy::cast_precision_loss,
    clippy::too_many_lines
)]

use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustpsd_core::{DetectorConfig, MapFieldStore, Trajectory};
use rustpsd_detector::TubeArray;
use rustpsd_io::{write_wireframe_csv, HistogramFileWriter};
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("Detector error: {0}")]
    Core(#[from] rustpsd_core::Error),

    #[error("Output error: {0}")]
    RustpsdIo(#[from] rustpsd_io::Error),

    #[error("Config error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser)]
#[command(name = "rustpsd", version, about = "Position-sensitive detector tube array simulation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Detector assembly flags shared by the subcommands.
#[derive(Args)]
struct DetectorArgs {
    /// Number of tubes
    #[arg(long, default_value_t = 8)]
    tubes: i32,

    /// Wire the tubes into one series chain
    #[arg(long)]
    series: bool,

    /// Pixels per tube
    #[arg(long, default_value_t = 256)]
    pixels: usize,

    /// Tube radius (m)
    #[arg(long, default_value_t = 0.00635)]
    radius: f64,

    /// Raster width (m)
    #[arg(long, default_value_t = 0.12)]
    width: f64,

    /// Tube length (m)
    #[arg(long, default_value_t = 0.5)]
    height: f64,

    /// Raster curvature radius (m); 0 for a flat raster
    #[arg(long, default_value_t = 0.0)]
    curvature: f64,

    /// Converter gas pressure (bar); 0 disables absorption
    #[arg(long, default_value_t = 0.0)]
    pressure: f64,

    /// Dead-zone length at each tube end (m)
    #[arg(long, default_value_t = 0.0)]
    dead_length: f64,

    /// Wire resistivity (ohm/m)
    #[arg(long, default_value_t = 1000.0)]
    resistivity: f64,

    /// Inter-tube contact resistance (ohm)
    #[arg(long, default_value_t = 0.0)]
    inter_resistance: f64,

    /// Skip the tube overlap validation
    #[arg(long)]
    no_overlap_check: bool,
}

impl DetectorArgs {
    fn to_config(&self) -> DetectorConfig {
        let mut config = DetectorConfig::new()
            .with_tube_count(self.tubes)
            .with_series(self.series)
            .with_pixels_per_tube(self.pixels)
            .with_radius(self.radius)
            .with_width(self.width)
            .with_height(self.height)
            .with_curvature(self.curvature)
            .with_pressure(self.pressure)
            .with_dead_length(self.dead_length)
            .with_resistivity(self.resistivity)
            .with_inter_resistance(self.inter_resistance);
        config.skip_overlap_check = self.no_overlap_check;
        config
    }
}

#[derive(Subcommand)]
enum Command {
    /// Fire random trajectories at a tube array and report statistics
    Simulate {
        #[command(flatten)]
        detector: DetectorArgs,

        /// Number of trajectories
        #[arg(long, default_value_t = 1_000_000)]
        events: usize,

        /// RNG seed
        #[arg(long, default_value_t = 1)]
        seed: u64,

        /// Particle speed (m/s)
        #[arg(long, default_value_t = 1000.0)]
        speed: f64,

        /// Write the per-tube histogram as CSV
        #[arg(long)]
        output_2d: Option<PathBuf>,

        /// Write the flattened wire histogram as CSV (series mode)
        #[arg(long)]
        output_1d: Option<PathBuf>,

        /// Write histograms in binary instead of CSV
        #[arg(long)]
        binary: bool,
    },

    /// Export the array wireframe for an external viewer
    Wireframe {
        #[command(flatten)]
        detector: DetectorArgs,

        /// Output CSV path
        #[arg(long)]
        output: PathBuf,

        /// Chord segments per end ring
        #[arg(long, default_value_t = 32)]
        segments: usize,
    },

    /// Print the resolved detector configuration as JSON
    Config {
        #[command(flatten)]
        detector: DetectorArgs,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Simulate {
            detector,
            events,
            seed,
            speed,
            output_2d,
            output_1d,
            binary,
        } => simulate(&detector, events, seed, speed, output_2d, output_1d, binary),
        Command::Wireframe {
            detector,
            output,
            segments,
        } => {
            let array = build_array(&detector)?;
            write_wireframe_csv(&output, array.geometry(), segments)?;
            println!("wrote wireframe for {} tube(s) to {}", array.geometry().len(), output.display());
            Ok(())
        }
        Command::Config { detector } => {
            println!("{}", serde_json::to_string_pretty(&detector.to_config())?);
            Ok(())
        }
    }
}

fn build_array(detector: &DetectorArgs) -> Result<TubeArray> {
    let mut config = detector.to_config();
    // Simulations always persist the 2-D grid; the flattened grid only
    // exists for a series-wired chain.
    config = config.with_target_2d("psd.dat");
    if config.series {
        config = config.with_target_1d("wire.dat");
    }
    Ok(TubeArray::new(config, &MapFieldStore::new())?)
}

fn simulate(
    detector: &DetectorArgs,
    events: usize,
    seed: u64,
    speed: f64,
    output_2d: Option<PathBuf>,
    output_1d: Option<PathBuf>,
    binary: bool,
) -> Result<()> {
    let array = build_array(detector)?;

    // Illuminate the full aperture with a parallel beam along +z.
    let mut rng = StdRng::seed_from_u64(seed);
    let width = detector.width;
    let height = detector.height;
    let trajectories: Vec<Trajectory> = (0..events)
        .map(|_| {
            let x = (rng.random::<f64>() - 0.5) * width;
            let y = (rng.random::<f64>() - 0.5) * height;
            Trajectory::new([x, y, -1.0], [0.0, 0.0, speed])
        })
        .collect();

    let start = Instant::now();
    let summary = array.process_batch(&trajectories, seed);
    let elapsed = start.elapsed();

    println!("events:    {}", summary.events);
    println!("hits:      {}", summary.hits);
    println!("misses:    {}", summary.misses);
    println!("intensity: {:.4}", summary.weight);
    println!(
        "rate:      {:.1} events/s ({:.2?} total)",
        summary.events as f64 / elapsed.as_secs_f64(),
        elapsed
    );

    if let Some(path) = output_2d {
        let mut writer = HistogramFileWriter::create(&path)?;
        let snapshot = array.snapshot_2d();
        if binary {
            writer.write_binary(&snapshot)?;
        } else {
            writer.write_csv(&snapshot)?;
        }
        println!("wrote 2-D histogram to {}", path.display());
    }

    if let Some(path) = output_1d {
        match array.snapshot_1d() {
            Some(snapshot) => {
                let mut writer = HistogramFileWriter::create(&path)?;
                if binary {
                    writer.write_binary(&snapshot)?;
                } else {
                    writer.write_csv(&snapshot)?;
                }
                println!("wrote wire histogram to {}", path.display());
            }
            None => log::warn!("wire histogram requested but the array is not series-wired"),
        }
    }

    Ok(())
}
