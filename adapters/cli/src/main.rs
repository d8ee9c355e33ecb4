#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots "Why Did The Chicken Cross The Road?".

mod game;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use crossing_core::{Board, Phase, GAME_TITLE};
use crossing_engine::{Engine, EngineConfig};
use crossing_highscores::HighScoreTable;
use crossing_rendering::{Color, Presentation, RenderingBackend, Scene};
use crossing_rendering_macroquad::MacroquadBackend;
use crossing_system_session as session;
use crossing_system_traffic::{self as traffic, standard_lanes};
use glam::Vec2;
use tracing::info;
use tracing_subscriber::EnvFilter;

use self::game::{phase_table, GameFactory};

/// Longest frame simulated in one step; slower frames are clamped.
const MAX_FRAME: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(name = "crossing")]
#[command(about = "Guide a chicken across the road", long_about = None)]
struct Args {
    /// Window scale relative to the 480x416 playing field.
    #[arg(long, default_value_t = 1.5)]
    scale: f32,

    /// Render as fast as possible instead of syncing to the display.
    #[arg(long, default_value_t = false)]
    no_vsync: bool,

    /// Print frame timing once per second.
    #[arg(long, default_value_t = false)]
    show_fps: bool,

    /// Draw placeholder rectangles instead of loading images.
    #[arg(long, default_value_t = false)]
    no_sprites: bool,

    /// Image manifest (defaults to assets/manifest.toml).
    #[arg(long, value_name = "PATH")]
    manifest: Option<PathBuf>,

    /// High-score file.
    #[arg(long, value_name = "PATH", default_value = HighScoreTable::DEFAULT_PATH)]
    highscores: PathBuf,

    /// Seed for traffic generation; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Enable N (win), M (die), O (list objects) and C (list controllers).
    #[arg(long, default_value_t = false)]
    debug_keys: bool,

    /// Lives at the start of a game.
    #[arg(
        long,
        default_value_t = session::Config::DEFAULT_LIVES,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    lives: u32,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,crossing=info")),
        )
        .init();
}

/// Entry point for the crossing command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, lives = args.lives, "starting");

    let board = Board::default();
    let factory = GameFactory::new(
        HighScoreTable::new(args.highscores),
        traffic::Config::new(seed, standard_lanes()),
        session::Config::new(
            args.lives,
            session::Config::DEFAULT_WIN_BONUS,
            session::Config::DEFAULT_HOP_POINTS,
        ),
    );
    let config = EngineConfig::new(Phase::Menu, board, args.debug_keys, MAX_FRAME);
    let mut engine =
        Engine::new(config, phase_table(), factory).context("failed to enter the menu")?;

    let presentation = Presentation::new(
        GAME_TITLE,
        Color::from_rgb_u8(0, 0, 0),
        Vec2::new(board.width(), board.height()),
        Scene::default(),
    )
    .with_scale(args.scale)
    .context("invalid --scale")?;

    let mut backend = MacroquadBackend::new()
        .with_vsync(!args.no_vsync)
        .with_show_fps(args.show_fps)
        .with_image_loading(!args.no_sprites);
    if let Some(manifest) = args.manifest {
        backend = backend.with_manifest_path(manifest);
    }

    backend.run(presentation, move |dt, input, scene| {
        let frame = engine.frame(dt, &input.keys).context("game frame failed")?;
        *scene = Scene::from_frame(frame);
        Ok(())
    })
}
