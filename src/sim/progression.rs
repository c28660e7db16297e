//! Distance/score accrual and level transitions

use rand::Rng;

use super::state::{GameEvent, GamePhase, GameState};
use super::weather;
use crate::consts::{PLAYER_START_SPEED, SCORE_RATE};
use crate::levels::LevelTable;

/// Minimum speed carried into a new level
const CARRY_MIN_SPEED: f32 = 160.0;
/// Fraction of the current speed carried into a new level
const CARRY_SPEED_FACTOR: f32 = 0.75;
/// Nitro bonus for finishing a level
const LEVEL_NITRO_BONUS: f32 = 20.0;

/// Result of checking the level goal after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Goal not reached yet
    Continue,
    /// Advanced; `completed` is the index of the level just finished
    LevelComplete { completed: u32 },
    /// Final level finished
    GameWon,
}

/// Distance and score earned by driving for `dt`
pub fn accrue(state: &mut GameState, dt: f32) {
    if !state.player.alive {
        return;
    }
    let speed = state.player.speed;
    state.distance += speed * dt;
    let earned = (speed * SCORE_RATE * dt) as f64 * state.player.score_multiplier();
    state.add_score(earned);
}

/// Advance to the next level (or finish the run) once the goal is covered
pub fn check<R: Rng + ?Sized>(state: &mut GameState, levels: &LevelTable, rng: &mut R) -> Progress {
    if !state.player.alive || state.phase != GamePhase::Racing {
        return Progress::Continue;
    }
    let goal = state.level(levels).distance_goal;
    if state.distance < goal {
        return Progress::Continue;
    }

    let completed = state.level_index;
    state.level_index += 1;

    let Some(next) = levels.get(state.level_index) else {
        state.phase = GamePhase::GameWon;
        state.emit(GameEvent::GameWon);
        log::info!(
            "All {} levels cleared, final score {}",
            levels.len(),
            state.display_score()
        );
        return Progress::GameWon;
    };

    state.distance = 0.0;
    state.clear_transient();

    let player = &mut state.player;
    player.recenter();
    player.speed = CARRY_MIN_SPEED.max(player.speed * CARRY_SPEED_FACTOR);
    player.add_nitro(LEVEL_NITRO_BONUS);
    player.invincible_timer = 0.0;
    player.score_multiplier_timer = 0.0;
    player.nitro_active = false;
    player.set_max_speed_from_level(next.max_speed);

    weather::reset(state, rng);
    state.emit(GameEvent::LevelComplete { completed });
    log::info!(
        "Level {} complete, entering {} ({})",
        completed + 1,
        next.name,
        next.background_theme
    );
    if levels.is_last(state.level_index) {
        log::info!("Final level ahead");
    }
    Progress::LevelComplete { completed }
}

/// Start the current level over with a fresh score
///
/// After the final level has been won this replays the last level.
pub fn restart_level<R: Rng + ?Sized>(state: &mut GameState, levels: &LevelTable, rng: &mut R) {
    let last = levels.len().saturating_sub(1) as u32;
    state.level_index = state.level_index.min(last);

    state.score = 0.0;
    state.distance = 0.0;
    state.clear_transient();

    let max_speed = state.level(levels).max_speed;
    let player = &mut state.player;
    player.recenter();
    player.speed = PLAYER_START_SPEED;
    player.nitro = 0.0;
    player.nitro_active = false;
    player.alive = true;
    player.invincible_timer = 0.0;
    player.score_multiplier_timer = 0.0;
    player.set_max_speed_from_level(max_speed);

    weather::reset(state, rng);
    state.phase = GamePhase::Racing;
    state.emit(GameEvent::Restarted);
    log::info!("Restarting level {}", state.level_index + 1);
}
