//! Midnight Drag - A lane-based street racing simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (steering, spawning, collisions, progression)
//! - `levels`: Data-driven level table
//! - `platform`: Render/input collaborator seams
//! - `persistence`: In-memory snapshots of a running simulation
//! - `scoreboard`: Leaderboard collaborator
//! - `session`: Frame-by-frame driver tying the collaborators together

pub mod error;
pub mod levels;
pub mod persistence;
pub mod platform;
pub mod scoreboard;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::Error;
pub use levels::{LevelDescriptor, LevelTable};
pub use scoreboard::{LocalScoreboard, OfflineScoreboard, ScoreEntry, Scoreboard};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per rendered frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Screen dimensions
    pub const SCREEN_WIDTH: f32 = 900.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    /// Drivable road, with shoulders on either side
    pub const ROAD_MARGIN: f32 = 120.0;
    pub const ROAD_LEFT: f32 = ROAD_MARGIN;
    pub const ROAD_RIGHT: f32 = SCREEN_WIDTH - ROAD_MARGIN;
    pub const LANE_COUNT: u32 = 5;

    /// The player is kept this far inside the painted road edge
    pub const PLAYER_EDGE_INSET: f32 = 14.0;
    /// Player center sits at this fraction of the screen height
    pub const PLAYER_Y_FRACTION: f32 = 0.72;

    /// Player defaults (scaled by car archetype)
    pub const PLAYER_START_SPEED: f32 = 140.0;
    pub const PLAYER_MIN_SPEED: f32 = 60.0;
    pub const PLAYER_BASE_MAX_SPEED: f32 = 280.0;
    pub const PLAYER_BASE_ACCEL: f32 = 140.0;
    pub const PLAYER_BASE_TURN: f32 = 280.0;
    pub const BRAKE_FACTOR: f32 = 1.2;

    /// Nitro
    pub const NITRO_MAX: f32 = 100.0;
    pub const NITRO_BURN_RATE: f32 = 30.0;
    pub const NITRO_SPEED_FACTOR: f32 = 1.35;
    pub const NITRO_STEER_FACTOR: f32 = 1.15;

    /// Distance-based score accrual per unit of speed per second
    pub const SCORE_RATE: f32 = 0.02;
}

/// Road bounds as (left, right)
#[inline]
pub fn road_bounds() -> (f32, f32) {
    (consts::ROAD_LEFT, consts::ROAD_RIGHT)
}

/// Width of one of the painted lanes
#[inline]
pub fn lane_width() -> f32 {
    (consts::ROAD_RIGHT - consts::ROAD_LEFT) / consts::LANE_COUNT as f32
}
