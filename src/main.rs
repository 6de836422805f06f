/*
 * Boid Flocking Simulation - Headless Driver
 *
 * Runs the flock for a fixed number of frames and writes each exported frame
 * as one JSON line, the position/velocity feed a renderer would consume.
 * Periodic flock statistics go to the tracing log (RUST_LOG=info).
 */

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use boids3d::{DebugInfo, Flock, SimulationParams};

#[derive(Parser, Debug)]
#[command(name = "boids3d")]
#[command(about = "Headless 3D boid flocking simulation")]
struct Args {
    /// TOML file with simulation parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Override the population size
    #[arg(long)]
    boids: Option<usize>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Steering target as x,y,z
    #[arg(long, value_delimiter = ',', num_args = 3, allow_hyphen_values = true)]
    target: Option<Vec<f32>>,

    /// Frame output path; `-` writes to stdout
    #[arg(long, default_value = "-")]
    output: String,

    /// Export every Nth frame (0 disables export)
    #[arg(long, default_value_t = 1)]
    every: u64,

    /// Log flock statistics every Nth frame (0 disables)
    #[arg(long, default_value_t = 60)]
    stats_every: u64,
}

// Frames written and stats lines logged by one run
#[derive(Debug, Default, PartialEq, Eq)]
struct RunSummary {
    exported: u64,
    stats_logged: u64,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut flock = build_flock(&args)?;

    info!(
        frames = args.frames,
        boids = flock.len(),
        seed = ?flock.params().rng_seed,
        "Starting simulation"
    );

    let mut out: Box<dyn Write> = if args.output == "-" {
        Box::new(BufWriter::new(io::stdout().lock()))
    } else {
        let file = File::create(&args.output)
            .with_context(|| format!("creating output file {}", args.output))?;
        Box::new(BufWriter::new(file))
    };

    let summary = run(&args, &mut flock, &mut out)?;
    info!(
        frames = flock.frame(),
        exported = summary.exported,
        "Simulation finished"
    );
    Ok(())
}

// Parameters from the config file (or defaults) with command-line overrides applied
fn resolve_params(args: &Args) -> Result<SimulationParams> {
    let mut params = match &args.config {
        Some(path) => SimulationParams::load(path)
            .with_context(|| format!("loading parameters from {}", path.display()))?,
        None => SimulationParams::default(),
    };
    if let Some(n) = args.boids {
        params.num_boids = n;
    }
    if let Some(seed) = args.seed {
        params.rng_seed = Some(seed);
    }
    Ok(params)
}

fn build_flock(args: &Args) -> Result<Flock> {
    let mut flock = Flock::new(resolve_params(args)?)?;
    if let Some(target) = &args.target {
        let [x, y, z] = target.as_slice() else {
            bail!("--target expects exactly three components");
        };
        flock.set_target(*x, *y, *z);
    }
    Ok(flock)
}

fn run<W: Write>(args: &Args, flock: &mut Flock, out: &mut W) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for _ in 0..args.frames {
        let started = Instant::now();
        flock.step();
        let frame_time = started.elapsed();

        let frame = flock.frame();
        if args.every > 0 && frame % args.every == 0 {
            serde_json::to_writer(&mut *out, &flock.snapshot())?;
            out.write_all(b"\n")?;
            summary.exported += 1;
        }

        if args.stats_every > 0 && frame % args.stats_every == 0 {
            let stats = DebugInfo::collect(frame, flock.boids(), flock.params())
                .with_frame_time(frame_time);
            info!(
                frame = stats.frame,
                mean_speed = stats.mean_speed,
                out_of_speed_bounds = stats.out_of_speed_bounds,
                mean_origin_distance = stats.mean_origin_distance,
                beyond_margin = stats.beyond_margin,
                frame_time_us = stats.frame_time.as_micros() as u64,
                "Flock stats"
            );
            summary.stats_logged += 1;
        }
    }

    out.flush()?;
    Ok(summary)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}
