#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays the desktop snake game.

mod config;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use snake_autoplay_core::{Direction, GridPosition};
use snake_autoplay_desktop::{locate_window, DesktopInput, ScreenCapture, StopHotkey};
use snake_autoplay_session::{Autoplay, StopReason, StopSignal, ThreadPause};
use snake_autoplay_system_decision::DecisionEngine;
use snake_autoplay_system_game_over::GameOverDetector;
use snake_autoplay_system_object_detection::ObjectDetector;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::AutoplayConfig;

#[derive(Debug, Parser)]
#[command(name = "snake-autoplay")]
#[command(version, about = "Plays a desktop snake game by reading the screen")]
struct Cli {
    /// TOML configuration file; missing sections fall back to defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG overrides it
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Locate the game window and play until the stop hotkey is pressed
    Run {
        /// Seed for random tie-breaking
        #[arg(long)]
        seed: Option<u64>,
        /// Title of the game window, overriding the configuration
        #[arg(long)]
        window_title: Option<String>,
    },
    /// Run detection and a single decision on a saved screenshot
    Analyze {
        /// Screenshot of the play area, title bar excluded
        image: PathBuf,
        /// Direction the snake is assumed to be moving in
        #[arg(long)]
        direction: Option<Direction>,
        /// Seed for random tie-breaking
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the effective configuration as TOML
    Config,
}

/// Entry point for the snake autoplayer command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = AutoplayConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Run { seed, window_title } => run(&config, seed, window_title),
        Command::Analyze {
            image,
            direction,
            seed,
        } => analyze(&config, &image, direction, seed),
        Command::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn run(config: &AutoplayConfig, seed: Option<u64>, window_title: Option<String>) -> Result<()> {
    let geometry = config.geometry()?;
    let hotkey = config.hotkey()?;
    let title = window_title.unwrap_or_else(|| config.window.title.clone());

    let window = locate_window(&title)
        .with_context(|| format!("cannot start without the game window `{title}`"))?;
    let mut input = DesktopInput::new().context("failed to initialise synthetic input")?;
    input
        .activate(&window, config.window.activation_settle())
        .context("failed to activate the game window")?;

    let region = window.game_region(config.window.title_bar_offset);
    info!(
        left = region.left,
        top = region.top,
        width = region.width,
        height = region.height,
        "capturing game region"
    );

    let stop = StopSignal::new();
    let watcher = StopHotkey::spawn(hotkey, stop.clone())?;
    info!(%hotkey, "press the hotkey to stop");

    let mut autoplay = Autoplay::new(
        ObjectDetector::new(config.detection.clone(), geometry),
        GameOverDetector::new(config.game_over.clone(), geometry),
        DecisionEngine::new(seeded_rng(seed.or(config.control.seed))),
        geometry,
        config.timing(),
    );
    let report = autoplay.run(
        &mut ScreenCapture::new(region),
        &mut input,
        &mut ThreadPause::default(),
        &stop,
    );
    drop(watcher);

    info!(
        ticks = report.ticks,
        moves = report.moves,
        restarts = report.restarts,
        "run finished"
    );
    match report.outcome {
        StopReason::Requested => Ok(()),
        StopReason::Failed(message) => bail!("autoplay stopped after an error: {message}"),
    }
}

fn analyze(
    config: &AutoplayConfig,
    path: &Path,
    direction: Option<Direction>,
    seed: Option<u64>,
) -> Result<()> {
    let geometry = config.geometry()?;
    let frame = image::open(path)
        .with_context(|| format!("failed to load screenshot at {}", path.display()))?
        .to_rgb8();
    let grid = geometry.size_for(frame.width(), frame.height());
    let current = direction.unwrap_or(config.control.initial_direction);

    let observation = ObjectDetector::new(config.detection.clone(), geometry).detect(&frame);
    let inspection = GameOverDetector::new(config.game_over.clone(), geometry)
        .inspect(&frame, observation.food());
    let decision = DecisionEngine::new(seeded_rng(seed.or(config.control.seed))).decide(
        &observation,
        current,
        grid,
    );

    let describe = |cell: Option<GridPosition>| {
        cell.map_or_else(|| "not found".to_owned(), |cell| cell.to_string())
    };
    let body = observation
        .body()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");

    println!(
        "grid: {} x {} cells of {} px",
        grid.columns(),
        grid.rows(),
        geometry.pitch()
    );
    println!("head: {}", describe(observation.head()));
    println!("food: {}", describe(observation.food()));
    println!("body: {} cells {body}", observation.body().len());
    println!("red area: {} px", inspection.red_area);
    match inspection.banner {
        Some(banner) => println!(
            "banner: area {:.1}, circularity {:.3}",
            banner.area, banner.circularity
        ),
        None => println!("banner: none"),
    }
    println!("game over: {}", inspection.is_game_over());
    println!(
        "decision: {} -> {} ({:?})",
        current, decision.direction, decision.reason
    );

    Ok(())
}
