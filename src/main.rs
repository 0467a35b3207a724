//! Opticon command-line tools
//!
//! Generates maps from a configuration and either exports them as turf
//! paths or prints them for a quick look.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use glam::IVec2;
use serde::Serialize;

use opticon::consts::TOWER_RADIUS;
use opticon::settings::MapPreset;
use opticon::sim::{FloorObject, GameState, TileKind, TurfCell};
use opticon::{GameConfig, ObstacleSeed, chebyshev};

/// Opticon map tools
#[derive(Parser)]
#[command(name = "opticon")]
#[command(about = "Map tools for the Opticon prison game", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Export the generated map as JSON turf paths
    DumpMap(DumpMap),

    /// Print the generated map as ASCII
    Show(Show),
}

/// Options shared by every map command
#[derive(clap::Args)]
struct MapArgs {
    /// JSON configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Map preset: compact or classic (ignored with --config)
    #[arg(short, long, value_name = "PRESET")]
    preset: Option<String>,

    /// Override the obstacle seed
    #[arg(short, long, value_name = "SEED")]
    seed: Option<u64>,
}

impl MapArgs {
    fn load(&self) -> Result<GameConfig> {
        let mut config = match (&self.config, &self.preset) {
            (Some(path), _) => GameConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            (None, Some(name)) => {
                let preset = MapPreset::from_str(name)
                    .ok_or_else(|| anyhow!("Unknown preset '{name}' (expected compact or classic)"))?;
                GameConfig::from_preset(preset)
            }
            (None, None) => GameConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.map.obstacle_seed = ObstacleSeed::Fixed(seed);
        }
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

/// Export the generated map as JSON turf paths
#[derive(Parser)]
struct DumpMap {
    #[command(flatten)]
    map: MapArgs,

    /// Write to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct MapDump {
    width: i32,
    height: i32,
    seed: u64,
    grid: Vec<Vec<TurfCell>>,
}

impl DumpMap {
    fn execute(self) -> Result<()> {
        let config = self.map.load()?;
        let state = GameState::new(&config);
        let dump = MapDump {
            width: state.grid.size(),
            height: state.grid.size(),
            seed: state.grid.seed(),
            grid: state.grid.turf_rows(),
        };
        let json = serde_json::to_string_pretty(&dump)?;

        match self.output {
            Some(path) => {
                std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                log::info!("Map written to {}", path.display());
            }
            None => println!("{json}"),
        }
        Ok(())
    }
}

/// Print the generated map as ASCII
#[derive(Parser)]
struct Show {
    #[command(flatten)]
    map: MapArgs,
}

impl Show {
    fn execute(self) -> Result<()> {
        let config = self.map.load()?;
        let state = GameState::new(&config);
        print!("{}", render_ascii(&state));
        println!(
            "seed {}  rings {}  start ({}, {})",
            state.grid.seed(),
            state.ring_count(),
            state.prisoner.position.x,
            state.prisoner.position.y
        );
        Ok(())
    }
}

/// One character per cell: `T` tower, `#` wall, `~` moat, `P` Prisoner,
/// objects by initial, and floor by its ring digit.
fn render_ascii(state: &GameState) -> String {
    let grid = &state.grid;
    let size = grid.size();
    let mut out = String::with_capacity(((size + 1) * size) as usize);

    for y in 0..size {
        for x in 0..size {
            let pos = IVec2::new(x, y);
            let Some(cell) = grid.cell(pos) else {
                continue;
            };
            let ch = if pos == state.prisoner.position {
                'P'
            } else {
                match (cell.tile, cell.object) {
                    (TileKind::Wall, _) if chebyshev(pos, grid.center()) <= TOWER_RADIUS => 'T',
                    (TileKind::Wall, _) => '#',
                    (TileKind::Moat, _) => '~',
                    (TileKind::Floor, FloorObject::Glass) => 'g',
                    (TileKind::Floor, FloorObject::Door) => 'd',
                    (TileKind::Floor, FloorObject::DoorLocked) => 'L',
                    (TileKind::Floor, FloorObject::WallObject) => 'w',
                    (TileKind::Floor, FloorObject::None) => ring_digit(cell.ring),
                }
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}

fn ring_digit(ring: i32) -> char {
    u32::try_from(ring % 10)
        .ok()
        .and_then(|d| char::from_digit(d, 10))
        .unwrap_or('?')
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Command::DumpMap(cmd) => cmd.execute(),
        Command::Show(cmd) => cmd.execute(),
    }
}
