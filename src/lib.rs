//! Fruit Drop - A falling-fruit merge game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (Verlet physics, merges, session state)
//! - `config`: Container geometry and tier table, loadable from JSON
//! - `highscores`: Leaderboard fed with the final score of each session

pub mod config;
pub mod highscores;
pub mod sim;

pub use config::{ConfigError, GameConfig};
pub use highscores::HighScores;

/// Reference configuration constants
pub mod consts {
    /// Target frame rate; one simulation tick per frame
    pub const FPS: u32 = 60;
    /// Nominal frame time
    pub const FRAME_DT: f32 = 1.0 / FPS as f32;
    /// Largest step the frame limiter hands to the simulation
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Downward gravity (pixels/s², screen space so +y is down)
    pub const GRAVITY: f32 = 900.0;

    /// Vertical energy retained per integration step
    pub const VERTICAL_DAMPING: f32 = 0.99;
    /// Share of vertical momentum kept after a side wall hit
    pub const WALL_VERTICAL_DAMPING: f32 = 0.5;
    /// Fraction of the overlap each piece is pushed apart by per pass
    pub const SEPARATION_FACTOR: f32 = 1.0 / 6.0;

    /// Minimum time between honoured drops (seconds)
    pub const DROP_COOLDOWN: f64 = 0.01;

    /// Container defaults (pixels)
    pub const CONTAINER_X: f32 = 660.0;
    pub const CONTAINER_Y: f32 = 400.0;
    pub const WALL_THICKNESS: f32 = 20.0;
    pub const INNER_WIDTH: f32 = 560.0;
    pub const INNER_HEIGHT: f32 = 580.0;

    /// Tier diameters, smallest first
    pub const TIER_DIAMETERS: [f32; 8] = [50.0, 70.0, 90.0, 110.0, 130.0, 150.0, 180.0, 210.0];
    /// Points awarded when a piece of the tier is consumed
    pub const TIER_SCORES: [u64; 8] = [1, 3, 7, 12, 19, 28, 40, 60];
}
