mod config;
mod engine;
mod error;
mod food;
mod game;
mod input;
mod render;
mod snake;
mod term;
mod timer;

use std::{fs::File, path::{Path, PathBuf}, sync::Mutex, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use config::GameConfig;

pub type TermInt = u16;
pub type GridInt = i32;
pub type Coords = (GridInt, GridInt);

#[derive(Parser)]
#[command(name = "grid-snake")]
#[command(version, about = "Grid snake in the terminal")]
struct Cli {
    /// Grid width in cells
    #[arg(long, default_value = "20")]
    width: GridInt,

    /// Grid height in cells
    #[arg(long, default_value = "20")]
    height: GridInt,

    /// Pixel size of one cell on the drawing surface
    #[arg(long, default_value = "20")]
    cell_size: GridInt,

    /// Milliseconds between two moves
    #[arg(long, default_value = "100")]
    tick_ms: u64,

    /// Starting column of the snake
    #[arg(long, default_value = "10")]
    origin_x: GridInt,

    /// Starting row of the snake
    #[arg(long, default_value = "10")]
    origin_y: GridInt,

    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file (RUST_LOG filters, default info)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> GameConfig {
        GameConfig {
            grid_width: self.width,
            grid_height: self.height,
            cell_size: self.cell_size,
            tick: Duration::from_millis(self.tick_ms),
            origin: (self.origin_x, self.origin_y),
            seed: self.seed,
        }
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create log file {}", path.display()))?;

    // Logs go to a file only; the terminal belongs to the game
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "grid_snake=info".into()))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let config = cli.config();
    config.validate()?;

    let mut game: game::SnakeGame = game::SnakeGame::new(config)?;
    let result = game.initialize().and_then(|_| game.play());

    // The terminal is restored even when the game loop failed
    game.restore()?;
    result
}
