//! Marble World Sandbox
//!
//! Loads a level (file, built-in or save slot), drives the world controller
//! with a scripted input for a fixed amount of simulated time, and logs the
//! HUD and the run summary.
//!
//! Example:
//!   cargo run -p marble-sandbox -- --builtin tutorial --seconds 20 --jump-every 1.5

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use bevy::prelude::Vec2;
use clap::{Parser, ValueEnum};
use marble_world::{
    BuiltInLevel, FileStore, InputState, KeyValueStore, Level, LogHud, MemoryStore, NamedButton,
    SaveSlot, WorldConfig, WorldController, store,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Slot {
    Quick,
    Auto,
}

impl From<Slot> for SaveSlot {
    fn from(slot: Slot) -> Self {
        match slot {
            Slot::Quick => SaveSlot::QuickSave,
            Slot::Auto => SaveSlot::AutoSave,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Play a marble-world level headlessly", long_about = None)]
struct Args {
    /// Level JSON file to play.
    #[arg(long, conflicts_with_all = ["builtin", "slot"])]
    level: Option<PathBuf>,
    /// Built-in level name (default, tutorial, trampoline).
    #[arg(long, conflicts_with = "slot")]
    builtin: Option<String>,
    /// Load the level from a save slot of the store.
    #[arg(long, value_enum, requires = "store")]
    slot: Option<Slot>,
    /// Directory holding save slots. Saves stay in memory when omitted.
    #[arg(long)]
    store: Option<PathBuf>,
    /// World configuration JSON file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Simulated seconds to run.
    #[arg(long, default_value_t = 10.0)]
    seconds: f32,
    /// Frames per simulated second.
    #[arg(long, default_value_t = 60)]
    fps: u32,
    /// Movement axis, `x` right.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    move_x: f32,
    /// Movement axis, `y` forward.
    #[arg(long, default_value_t = 1.0, allow_hyphen_values = true)]
    move_y: f32,
    /// Hold jump for one frame every this many seconds.
    #[arg(long)]
    jump_every: Option<f32>,
    /// Named buttons pressed on the first frame, comma separated.
    #[arg(long, value_delimiter = ',')]
    buttons: Vec<String>,
    /// Write the level to this file when done.
    #[arg(long)]
    save: Option<PathBuf>,
}

fn load_level(args: &Args, saves: &dyn KeyValueStore) -> Result<Level> {
    if let Some(path) = &args.level {
        return store::load_from_file(Some(path.as_path()))?
            .with_context(|| format!("read level {}", path.display()));
    }
    if let Some(slot) = args.slot {
        return Ok(store::load_from_slot(saves, slot.into())?);
    }
    let builtin = match &args.builtin {
        Some(name) => BuiltInLevel::from_name(name)?,
        None => BuiltInLevel::Default,
    };
    Ok(builtin.load())
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => WorldConfig::from_path(path).with_context(|| format!("read config {}", path.display()))?,
        None => WorldConfig::default(),
    };
    let store: Box<dyn KeyValueStore + Send + Sync> = match &args.store {
        Some(dir) => Box::new(FileStore::new(dir)),
        None => Box::new(MemoryStore::new()),
    };
    let level = load_level(&args, store.as_ref())?;
    let buttons = args
        .buttons
        .iter()
        .map(|name| name.parse::<NamedButton>())
        .collect::<Result<Vec<_>, _>>()?;

    let mut world = WorldController::with_level(config, &level, store, Arc::new(LogHud))?;
    tracing::info!("[sandbox] Running '{}' for {:.1}s", level.metadata.name, args.seconds);

    let fps = args.fps.max(1);
    let dt = 1.0 / fps as f32;
    let frames = (args.seconds * fps as f32).ceil() as u32;
    let jump_period = args.jump_every.map(|seconds| (seconds * fps as f32).round().max(1.0) as u32);

    for frame in 0..frames {
        let input = InputState {
            movement: Vec2::new(args.move_x, args.move_y),
            jump_held: jump_period.is_some_and(|period| frame % period == 0),
            buttons: if frame == 0 { buttons.clone() } else { Vec::new() },
            ..InputState::default()
        };
        world.update(dt, &input);

        if frame % fps == 0 {
            tracing::info!("[sandbox] {}", world.run().hud_text());
        }
        if world.last_summary().is_some() {
            break;
        }
    }

    match world.last_summary() {
        Some(summary) => tracing::info!("[sandbox] {}", summary),
        None => tracing::info!("[sandbox] Run unfinished: {}", world.run().hud_text()),
    }

    if let Some(path) = &args.save {
        world.save_file(path)?;
    }
    Ok(())
}
