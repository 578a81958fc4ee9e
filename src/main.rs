//! Fruit Drop entry point
//!
//! Headless native runner: plays sessions with an autoplay input source,
//! one tick per simulated frame, and records final scores on the leaderboard.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use fruit_drop::consts::*;
use fruit_drop::sim::{DropRequest, GameEvent, GamePhase, GameState, TickInput, tick};
use fruit_drop::{GameConfig, HighScores};

#[derive(Debug, Parser)]
#[command(name = "fruit-drop", about = "Headless falling-fruit merge game")]
struct Args {
    /// JSON config file (reference configuration if omitted)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for the first session (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Number of sessions to play back to back
    #[arg(long, default_value_t = 1)]
    games: u32,
    /// Stop a session after this many frames
    #[arg(long, default_value_t = 60 * 60 * 10)]
    max_ticks: u64,
    /// Frames between autoplay drops
    #[arg(long, default_value_t = 45)]
    drop_every: u64,
    /// Leaderboard file
    #[arg(long, default_value = "highscores.json")]
    scores: PathBuf,
}

/// Picks drop positions the way an idle player might
struct Autoplay {
    rng: Pcg32,
    drop_every: u64,
}

impl Autoplay {
    fn new(seed: u64, drop_every: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15),
            drop_every: drop_every.max(1),
        }
    }

    /// Aim at the highest piece matching the next tier, otherwise anywhere
    fn input(&mut self, state: &GameState) -> TickInput {
        if state.time_ticks % self.drop_every != 0 {
            return TickInput::default();
        }

        let c = state.container;
        let target = state
            .pieces
            .iter()
            .filter(|p| p.tier() == state.next_tier)
            .min_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|p| p.pos.x);
        let x = target.unwrap_or_else(|| self.rng.random_range(c.left..c.right));

        TickInput {
            drop: Some(DropRequest { x, y: c.top - 30.0 }),
            quit: false,
        }
    }
}

fn now_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Play one session to loss or the tick limit; returns the final score
fn play(state: &mut GameState, args: &Args) -> u64 {
    let mut autoplay = Autoplay::new(state.seed, args.drop_every);
    let dt = FRAME_DT.min(MAX_FRAME_DT);
    let mut merges = 0u32;
    let mut final_score = None;

    while state.time_ticks < args.max_ticks {
        let input = autoplay.input(state);
        tick(state, &input, dt);

        for event in state.drain_events() {
            match event {
                GameEvent::Merged { into, .. } => {
                    merges += 1;
                    log::debug!("Merged into {:?}, score {}", into, state.score);
                }
                GameEvent::Annihilated { tier, .. } => {
                    log::info!("Top tier {:?} pair cleared", tier);
                }
                GameEvent::Lost { final_score: score } => final_score = Some(score),
                GameEvent::Dropped { .. } => {}
            }
        }

        if state.phase == GamePhase::Lost {
            break;
        }
        if state.time_ticks % (FPS as u64 * 30) == 0 {
            log::info!(
                "t={}s pieces={} score={}",
                state.time_ticks / FPS as u64,
                state.pieces.len(),
                state.score
            );
        }
    }

    if final_score.is_none() {
        log::info!("Tick limit reached, ending session");
        state.quit();
    }
    log::info!("{} merges, final score {}", merges, state.score);
    final_score.unwrap_or(state.score)
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    log::info!("Fruit Drop (headless) starting...");

    let config = match &args.config {
        Some(path) => match GameConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => GameConfig::default(),
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut state = match GameState::new(&config, seed) {
        Ok(state) => state,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let mut high_scores = HighScores::load(&args.scores);

    for game in 0..args.games {
        if game > 0 {
            state.restart(seed.wrapping_add(game as u64));
        }
        log::info!("Game {} initialized with seed: {}", game + 1, state.seed);

        let score = play(&mut state, &args);
        if let Some(rank) = high_scores.potential_rank(score) {
            log::debug!("Score {} would place #{}", score, rank);
        }
        match high_scores.add_score(score, state.seed, now_ms()) {
            Some(rank) => log::info!("New high score #{}: {}", rank, score),
            None => log::info!("Score {} (best {:?})", score, high_scores.top_score()),
        }
        println!("game {} seed {} score {}", game + 1, state.seed, score);
    }

    if let Err(e) = high_scores.save(&args.scores) {
        log::error!("Failed to save high scores: {}", e);
    }
}
