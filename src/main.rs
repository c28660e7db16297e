//! Midnight Drag - headless driver
//!
//! Runs the simulation with the autopilot at the wheel, logs the HUD, and
//! records finished attempts on the scoreboard.

use std::path::PathBuf;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;

use midnight_drag::platform::{Autopilot, LogRenderer};
use midnight_drag::session::{Session, SessionConfig};
use midnight_drag::settings::DEFAULT_SETTINGS_PATH;
use midnight_drag::sim::CarArchetype;
use midnight_drag::{LevelTable, LocalScoreboard, OfflineScoreboard, Scoreboard, Settings};

#[derive(Parser, Debug)]
#[command(name = "midnight-drag")]
#[command(about = "Lane-based street racing simulation, driven headless by an autopilot")]
struct Cli {
    /// RNG seed (decimal or 0x-prefixed hex); random when omitted
    #[arg(long)]
    seed: Option<String>,
    /// Simulated seconds to run
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,
    /// Car archetype: standard, sport, muscle, classic
    #[arg(long)]
    car: Option<String>,
    /// Name recorded on the scoreboard
    #[arg(long)]
    name: Option<String>,
    /// Settings file
    #[arg(long, default_value = DEFAULT_SETTINGS_PATH)]
    settings: PathBuf,
    /// Level table JSON replacing the built-in campaign
    #[arg(long)]
    levels: Option<PathBuf>,
    /// Scoreboard file
    #[arg(long)]
    scoreboard: Option<PathBuf>,
    /// Run without a scoreboard
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Attempts before the session ends
    #[arg(long, default_value_t = 3)]
    attempts: u32,
    /// Pace the simulation against the wall clock
    #[arg(long, default_value_t = false)]
    realtime: bool,
    /// Frames between HUD log lines
    #[arg(long, default_value_t = 60)]
    hud_interval: u64,
}

fn parse_seed(raw: &str) -> Result<u64> {
    let trimmed = raw.trim();
    let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => trimmed.parse::<u64>(),
    };
    parsed.with_context(|| format!("invalid seed {raw:?}"))
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5eed)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let settings = Settings::load(&cli.settings);

    let car = match cli.car.as_deref() {
        Some(raw) => raw.parse::<CarArchetype>()?,
        None => settings.car,
    };
    let seed = match cli.seed.as_deref() {
        Some(raw) => parse_seed(raw)?,
        None => settings.seed.unwrap_or_else(clock_seed),
    };
    let levels = match cli.levels.as_ref().or(settings.levels_path.as_ref()) {
        Some(path) => LevelTable::load(path)
            .with_context(|| format!("failed loading levels from {}", path.display()))?,
        None => LevelTable::builtin(),
    };

    let mut scoreboard: Box<dyn Scoreboard> = if cli.offline {
        Box::new(OfflineScoreboard)
    } else {
        match cli.scoreboard.clone().or(settings.scoreboard_path.clone()) {
            Some(path) => {
                let board = LocalScoreboard::open(path);
                if let Some(best) = board.top_score() {
                    log::info!("Score to beat on {}: {}", board.path().display(), best);
                }
                Box::new(board)
            }
            None => Box::new(OfflineScoreboard),
        }
    };

    let config = SessionConfig {
        seconds: cli.seconds,
        attempts: cli.attempts,
        player_name: cli.name.unwrap_or(settings.player_name),
    };

    let mut session = Session::new(car, levels, seed);
    let mut pilot = Autopilot::new();
    let mut renderer = LogRenderer::new(cli.hud_interval);

    let started = Instant::now();
    let summary = if cli.realtime {
        let mut last = Instant::now();
        session.run_frames(&config, &mut pilot, &mut renderer, scoreboard.as_mut(), || {
            std::thread::sleep(std::time::Duration::from_millis(16));
            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f32();
            last = now;
            dt
        })
    } else {
        session.run(&config, &mut pilot, &mut renderer, scoreboard.as_mut())
    };

    println!();
    println!(
        "Seed {:#x}: {} attempt(s), {} level(s) cleared, best score {} ({} ticks in {:.2?})",
        seed,
        summary.attempts.len(),
        summary.levels_completed,
        summary.best_score(),
        summary.ticks,
        started.elapsed()
    );
    for (i, attempt) in summary.attempts.iter().enumerate() {
        println!(
            "  #{} {:?} on level {} - {}",
            i + 1,
            attempt.end,
            attempt.level,
            attempt.score
        );
    }

    let top = scoreboard.fetch_top(10);
    if top.is_empty() {
        println!("Leaderboard: no scores yet");
    } else {
        println!("Leaderboard:");
        for (i, entry) in top.iter().enumerate() {
            println!("  {:>2}. {:<15} {}", i + 1, entry.name, entry.score);
        }
    }

    Ok(())
}
