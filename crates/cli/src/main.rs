#![deny(unsafe_code)]
//! CLI binary for the liquid-metal metaball simulation.
//!
//! Subcommands:
//! - `run`: simulate N frames headlessly, write a PNG of the last frame and
//!   optionally an OBJ of its mesh
//! - `config`: print the reference scene as JSON
//! - `schema`: print the tunable parameters with defaults and ranges
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`.

mod error;

use clap::{Parser, Subcommand, ValueEnum};
use error::CliError;
use liquid_metal_core::{Engine, PointerInput, Viewport};
use liquid_metal_metaballs::{FrameLoop, LiquidMetal, SceneConfig, Tick};
use liquid_metal_snapshot::SnapshotRenderer;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "liquid-metal", about = "Liquid-metal metaball simulation CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
enum PointerPath {
    /// Sweep the pointer along a slow Lissajous curve.
    Orbit,
    /// Never move the pointer; kinematic sources stay at spawn.
    None,
}

#[derive(Subcommand)]
enum Command {
    /// Simulate N frames and write a snapshot of the last one.
    Run {
        /// Number of frames to simulate.
        #[arg(short, long, default_value_t = 120)]
        frames: usize,

        /// Seconds per frame.
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f32,

        /// Snapshot width in pixels.
        #[arg(short = 'W', long, default_value_t = 512)]
        width: usize,

        /// Snapshot height in pixels.
        #[arg(short = 'H', long, default_value_t = 512)]
        height: usize,

        /// PNG output path.
        #[arg(short, long, default_value = "liquid-metal.png")]
        output: PathBuf,

        /// Also write the last mesh as Wavefront OBJ.
        #[arg(long)]
        obj: Option<PathBuf>,

        /// Scene JSON file; defaults to the reference scene.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Flat parameter overrides as a JSON object; unknown keys are rejected.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Pointer motion fed to kinematic sources.
        #[arg(long, value_enum, default_value_t = PointerPath::Orbit)]
        pointer: PointerPath,
    },
    /// Print the reference scene configuration.
    Config,
    /// Print the parameter schema.
    Schema,
}

/// Builds the scene config from optional scene JSON text plus overrides.
fn scene_config(scene: Option<&str>, params: &str) -> Result<SceneConfig, CliError> {
    let params: serde_json::Value = serde_json::from_str(params)
        .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
    SceneConfig::check_overrides(&params)
        .map_err(|e| CliError::Input(format!("invalid --params: {e}")))?;
    let mut config = match scene {
        Some(text) => {
            let value: serde_json::Value = serde_json::from_str(text)
                .map_err(|e| CliError::Input(format!("invalid scene JSON: {e}")))?;
            SceneConfig::from_json(&value)?
        }
        None => SceneConfig::default(),
    };
    config.apply_overrides(&params)?;
    Ok(config)
}

fn read_scene(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|e| CliError::io_at(path, e))
}

/// Pointer position at time `t` seconds on the orbit path.
fn orbit_pointer(t: f32, viewport: Viewport) -> PointerInput {
    PointerInput::new(
        0.6 * (t * 0.7).sin(),
        0.45 * (t * 1.1).cos(),
        viewport.width,
        viewport.height,
    )
}

fn ticks(frames: usize, dt: f32, path: PointerPath, viewport: Viewport) -> Vec<Tick> {
    (0..frames)
        .map(|i| {
            let tick = Tick::new(dt);
            match path {
                PointerPath::Orbit => tick.with_pointer(orbit_pointer(i as f32 * dt, viewport)),
                PointerPath::None => tick,
            }
        })
        .collect()
}

fn write_obj(engine: &LiquidMetal, path: &Path) -> Result<(), CliError> {
    let file = File::create(path).map_err(|e| CliError::io_at(path, e))?;
    liquid_metal_snapshot::obj::write_obj(engine.mesh(), BufWriter::new(file))?;
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&SceneConfig::default())?);
        }
        Command::Schema => {
            let engine = LiquidMetal::new(SceneConfig::default())?;
            println!("{}", serde_json::to_string_pretty(&engine.param_schema())?);
        }
        Command::Run {
            frames,
            dt,
            width,
            height,
            output,
            obj,
            config,
            params,
            pointer,
        } => {
            let scene = config.as_deref().map(read_scene).transpose()?;
            let config = scene_config(scene.as_deref(), &params)?;
            let mut engine = LiquidMetal::new(config)?;
            let mut renderer = SnapshotRenderer::new(width, height)?;
            let ticks = ticks(frames, dt, pointer, renderer.viewport());

            let stats = FrameLoop::new(&mut engine, &mut renderer).run(ticks)?;
            info!(frames = stats.frames, "simulation finished");

            if let Some(frame) = renderer.last_frame() {
                liquid_metal_snapshot::png::write_png(frame, &output)?;
            }
            if let Some(path) = &obj {
                write_obj(&engine, path)?;
            }

            if cli.json {
                let info = serde_json::json!({
                    "frames": stats.frames,
                    "triangles": stats.last_triangle_count,
                    "max_triangles": stats.max_triangle_count,
                    "truncated_frames": stats.truncated_frames,
                    "resets": engine.reset_count(),
                    "width": width,
                    "height": height,
                    "output": output.display().to_string(),
                    "obj": obj.as_ref().map(|p| p.display().to_string()),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "simulated {} frames ({} triangles, {} truncated) -> {}",
                    stats.frames,
                    stats.last_triangle_count,
                    stats.truncated_frames,
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
