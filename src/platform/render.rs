//! Read-only presentation of the simulation
//!
//! The simulation never draws. After each tick the driver builds a `Hud` and
//! hands it, with the state, to whatever `Renderer` is plugged in.

use crate::levels::LevelTable;
use crate::sim::{GameEvent, GamePhase, GameState, Weather};

/// Everything the heads-up display shows
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub level_name: String,
    pub background_theme: String,
    /// 1-based level number
    pub level_number: u32,
    pub level_count: usize,
    pub score: u64,
    pub distance: f32,
    pub distance_goal: f32,
    pub speed: f32,
    pub nitro: f32,
    pub weather: Weather,
    pub invincible: bool,
    pub score_multiplier: bool,
    pub phase: GamePhase,
}

impl Hud {
    pub fn from_state(state: &GameState, levels: &LevelTable) -> Self {
        let level = state.level(levels);
        Self {
            level_name: level.name.clone(),
            background_theme: level.background_theme.clone(),
            level_number: (state.level_index + 1).min(levels.len() as u32),
            level_count: levels.len(),
            score: state.display_score(),
            distance: state.distance,
            distance_goal: level.distance_goal,
            speed: state.player.speed,
            nitro: state.player.nitro,
            weather: state.weather,
            invincible: state.player.is_invincible(),
            score_multiplier: state.player.score_multiplier() > 1.0,
            phase: state.phase,
        }
    }

    /// Fraction of the level covered, in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.distance_goal <= 0.0 {
            return 1.0;
        }
        (self.distance / self.distance_goal).clamp(0.0, 1.0)
    }

    /// One-line status, as the log renderer prints it
    pub fn status_line(&self) -> String {
        let mut line = format!(
            "[{}/{}] {} | score {} | {:.0}/{:.0} m ({:.0}%) | speed {:.0} | nitro {:.0} | {:?}",
            self.level_number,
            self.level_count,
            self.level_name,
            self.score,
            self.distance,
            self.distance_goal,
            self.progress() * 100.0,
            self.speed,
            self.nitro,
            self.weather,
        );
        if self.invincible {
            line.push_str(" | INVINCIBLE");
        }
        if self.score_multiplier {
            line.push_str(" | x2 SCORE");
        }
        match self.phase {
            GamePhase::Paused => line.push_str(" | PAUSED"),
            GamePhase::Crashed => line.push_str(" | CRASHED"),
            GamePhase::GameWon => line.push_str(" | YOU WIN"),
            GamePhase::Racing => {}
        }
        line
    }
}

/// Presentation collaborator
pub trait Renderer {
    fn present(&mut self, state: &GameState, hud: &Hud);
}

/// Discards every frame
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn present(&mut self, _state: &GameState, _hud: &Hud) {}
}

/// Headless renderer: logs a HUD line every `interval` frames, plus every
/// phase change and notable event as it happens
#[derive(Debug, Clone)]
pub struct LogRenderer {
    interval: u64,
    frames: u64,
    last_phase: Option<GamePhase>,
}

impl LogRenderer {
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            frames: 0,
            last_phase: None,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for LogRenderer {
    /// One line per simulated second
    fn default() -> Self {
        Self::new(60)
    }
}

impl Renderer for LogRenderer {
    fn present(&mut self, state: &GameState, hud: &Hud) {
        self.frames += 1;

        for event in &state.events {
            match event {
                GameEvent::NearMiss { bonus } => log::debug!("Near miss +{:.0}", bonus),
                GameEvent::OrbCollected | GameEvent::PropDestroyed => {}
                other => log::info!("{:?}", other),
            }
        }

        let phase_changed = self.last_phase != Some(hud.phase);
        self.last_phase = Some(hud.phase);
        if phase_changed || self.frames % self.interval == 0 {
            log::info!("{}", hud.status_line());
        }
    }
}
