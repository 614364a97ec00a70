//! # Terratile Main Entry Point
//!
//! Parses arguments, sets up logging and runs either the interactive scene
//! flow in the terminal or a scripted headless session.

use clap::Parser;
use log::{error, info};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use terratile::constants::SETTINGS_FILE;
use terratile::{
    build_generated, generate_terrain, GameEngine, GameSettings, HeadlessBackend, HeadlessFrontend, SceneFlow,
    TerminalBackend, TerminalFrontend, TerraResult,
};

/// Command line arguments for Terratile.
#[derive(Parser, Debug)]
#[command(name = "terratile")]
#[command(about = "A terminal tile RPG with an in-place map editor")]
#[command(version)]
struct Args {
    /// Random seed for generated worlds
    #[arg(short, long)]
    seed: Option<u64>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log file; the terminal itself is taken by the game
    #[arg(long, default_value = "terratile.log")]
    log_file: PathBuf,

    /// Settings file
    #[arg(long, default_value = SETTINGS_FILE)]
    settings: PathBuf,

    /// Play a generated world headless, reading keys from this script,
    /// and print the final screen
    #[arg(long)]
    script: Option<PathBuf>,
}

fn main() -> TerraResult<()> {
    let args = Args::parse();
    initialize_logging(&args.log_level, &args.log_file);
    info!("Starting Terratile v{}", terratile::VERSION);

    let mut settings = GameSettings::load(&args.settings);
    if args.seed.is_some() {
        settings.seed = args.seed;
    }

    let result = match &args.script {
        Some(script) => run_script(settings, script),
        None => run_terminal(settings, &args.settings),
    };
    if let Err(err) = &result {
        error!("Terratile stopped: {}", err);
    }
    result
}

/// Sends log output to `log_file`, or to stderr when it cannot be opened.
fn initialize_logging(log_level: &str, log_file: &Path) {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(log_level).format_timestamp_millis();
    if let Ok(file) = File::create(log_file) {
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
}

fn run_terminal(settings: GameSettings, settings_path: &Path) -> TerraResult<()> {
    info!("Starting in terminal mode");
    let mut frontend = TerminalFrontend::new(TerminalBackend::new()?, &settings);
    let mut flow = SceneFlow::new(settings, settings_path);
    let result = flow.run(&mut frontend);
    // Restores the terminal before any error is printed.
    drop(frontend);
    result
}

fn run_script(mut settings: GameSettings, script: &Path) -> TerraResult<()> {
    info!("Replaying {}", script.display());
    settings.target_fps = 0;
    let backend = HeadlessBackend::from_script_text(80, 24, &fs::read_to_string(script)?)?;
    let mut frontend = HeadlessFrontend::new(backend, &settings);

    let seed = settings.seed.unwrap_or(42);
    let map = generate_terrain(&settings.generation_config(seed))?;
    let mut model = build_generated(map, None);
    model.context.enable_sliding = settings.enable_sliding;
    model.context.enable_respawn = settings.enable_respawn;

    GameEngine::from_settings(&settings).run(&mut model, &mut frontend)?;
    println!("{}", frontend.screen_text());
    Ok(())
}
