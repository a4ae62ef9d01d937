use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use formats::ViewerConfig;
use tracing_subscriber::EnvFilter;
use view::{ViewMode, ViewportSize};

#[derive(Parser, Debug)]
#[command(name = "house", about = "Inspect house models offline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the rooms found in a model.
    Rooms { model: PathBuf },
    /// Print the camera placement the viewer would use, as JSON.
    Frame {
        model: PathBuf,
        /// `3d` or `floorplan`.
        #[arg(long, default_value = "3d")]
        view: ViewMode,
        /// Room to enter, by display name or id.
        #[arg(long)]
        room: Option<String>,
        #[arg(long, default_value_t = 1280.0)]
        width: f64,
        #[arg(long, default_value_t = 720.0)]
        height: f64,
        /// Viewer config JSON file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Rooms { model } => cmd_rooms(model),
        Command::Frame {
            model,
            view,
            room,
            width,
            height,
            config,
        } => cmd_frame(model, view, room, ViewportSize::new(width, height), config),
    }
}

fn cmd_rooms(model: PathBuf) -> anyhow::Result<()> {
    let world = formats::load_world_from_path(&model)
        .with_context(|| format!("loading {}", model.display()))?;
    let reports = tools::room_reports(&world);
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

fn cmd_frame(
    model: PathBuf,
    view: ViewMode,
    room: Option<String>,
    size: ViewportSize,
    config: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = match config {
        Some(path) => {
            let payload = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            ViewerConfig::from_json_str(&payload)?
        }
        None => ViewerConfig::default(),
    };
    let world = formats::load_world_from_path(&model)
        .with_context(|| format!("loading {}", model.display()))?;

    let report = tools::frame_report(world, config, view, room.as_deref(), size)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
