//! Fixed timestep simulation tick
//!
//! Core loop that advances the simulation deterministically. Order inside a
//! tick: weather, spawning, autonomous steering, scrolling, player, collision,
//! progression. Rendering happens outside, after the tick returns.

use serde::{Deserialize, Serialize};

use super::collision;
use super::context::SimContext;
use super::progression::{self, Progress};
use super::spawner;
use super::state::{GameEvent, GamePhase, GameState};
use super::steering::{self, SteeringEnv};
use super::weather;
use crate::levels::LevelTable;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub accelerate: bool,
    pub brake: bool,
    /// Burn nitro while held
    pub nitro: bool,
    /// Pause toggle (edge-triggered by the input source)
    pub pause: bool,
    /// Restart the current level
    pub restart: bool,
    /// Leave the game
    pub quit: bool,
}

/// What the driver loop should do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Quit,
}

/// Advance the game state by one fixed timestep
pub fn tick(
    state: &mut GameState,
    input: &TickInput,
    levels: &LevelTable,
    ctx: &mut SimContext,
) -> TickOutcome {
    state.events.clear();

    if input.quit {
        return TickOutcome::Quit;
    }

    if input.restart {
        progression::restart_level(state, levels, &mut ctx.rng);
    }

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Racing => {
                state.phase = GamePhase::Paused;
                state.emit(GameEvent::Paused);
                return TickOutcome::Continue;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Racing;
                state.emit(GameEvent::Resumed);
            }
            _ => {}
        }
    }

    // Paused, crashed and won runs are frozen
    if state.phase != GamePhase::Racing {
        return TickOutcome::Continue;
    }

    let dt = ctx.dt;
    let level = state.level(levels);

    state.near_miss_cooldown = (state.near_miss_cooldown - dt).max(0.0);

    weather::update(state, dt, &mut ctx.rng);
    spawner::update(state, level, dt, &mut ctx.rng);

    // Autonomous vehicles, in spawn order, then the rival
    let env = SteeringEnv::new(dt, state.player.speed, state.player.rect);
    for vehicle in &mut state.traffic {
        steering::advance(vehicle, &env, &mut ctx.rng);
    }
    if let Some(rival) = state.rival.as_mut() {
        steering::advance(rival, &env, &mut ctx.rng);
    }

    spawner::scroll(state, env.world_speed, dt);
    spawner::despawn(state);

    let grip = state.grip;
    state.player.update(dt, input, grip);
    progression::accrue(state, dt);

    collision::resolve(state, level);

    if let Progress::GameWon = progression::check(state, levels, &mut ctx.rng) {
        log::debug!("Run finished after {:.1}s", ctx.elapsed);
    }

    ctx.elapsed += dt as f64;
    TickOutcome::Continue
}
