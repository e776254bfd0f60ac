mod audio;
mod game;
mod render;

use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use macroquad::prelude::Conf;
use tankarena::config::{DEFAULT_SEED, WORLD_SIZE, WorldConfig};
use tankarena::{Arena, GameStatus, generation, logging};

// --- Command Line Arguments ---
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed for world generation and AI decisions.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Exact number of AI tanks (default: random between 5 and 49).
    #[arg(long)]
    enemies: Option<u32>,

    /// Edge length of the square world.
    #[arg(long, default_value_t = WORLD_SIZE)]
    world_size: f64,

    /// Run this many ticks without a window and print a summary.
    #[arg(long)]
    headless: Option<u64>,

    /// Debug filter to specify log topics (e.g., "drive,weapon,shell,ai,collision,world")
    #[arg(long)]
    debug_filter: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn world_config(&self) -> WorldConfig {
        let mut config = WorldConfig {
            seed: self.seed,
            world_size: self.world_size,
            ..WorldConfig::default()
        };
        if let Some(count) = self.enemies {
            config.min_enemies = count;
            config.max_enemies = count.saturating_add(1);
        }
        config
    }
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Tank Arena".to_owned(),
        window_width: 1280,
        window_height: 800,
        window_resizable: true,
        ..Default::default()
    }
}

fn build_arena(config: WorldConfig) -> Result<Arena, tankarena::ArenaError> {
    let mut arena = Arena::new(config)?;
    generation::populate(&mut arena)?;
    Ok(arena)
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::init_logger(logging::parse_level(&args.log_level), args.debug_filter.clone()) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }

    info!("Initializing Tank Arena (seed {})...", args.seed);
    let mut arena = match build_arena(args.world_config()) {
        Ok(arena) => arena,
        Err(e) => {
            error!("Failed to build the world: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(ticks) = args.headless {
        let summary = game::run_headless(&mut arena, ticks);
        println!(
            "{:?} after {} ticks: {} enemies left, {} shots, {} hits",
            arena.status(),
            summary.ticks,
            arena.enemy_count(),
            summary.shots,
            summary.hits
        );
        return match arena.status() {
            GameStatus::PlayerDestroyed => ExitCode::from(2),
            _ => ExitCode::SUCCESS,
        };
    }

    macroquad::Window::from_config(window_conf(), async move {
        game::Game::new(arena).run().await;
    });
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enemy_override_pins_the_range() {
        let args = Args::parse_from(["tankarena", "--enemies", "3", "--seed", "7"]);
        let config = args.world_config();
        assert_eq!((config.min_enemies, config.max_enemies), (3, 4));
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["tankarena"]);
        assert_eq!(args.world_config(), WorldConfig::default());
        assert!(args.headless.is_none());
    }
}
