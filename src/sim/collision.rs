//! Player-vs-world interaction resolution
//!
//! Evaluated once per tick while the player is alive, in a fixed priority
//! order: traffic, rival, obstacles, power-ups, destructibles, near-miss,
//! orbs. A lethal hit ends resolution, so overlapping two hazards at once only
//! ever registers the first one in that order.

use glam::Vec2;

use super::rect::Rect;
use super::state::{GameEvent, GamePhase, GameState, Hazard, PowerUpKind};
use crate::levels::LevelDescriptor;

/// Player hitbox shrink relative to the body (x, y)
pub const PLAYER_HIT_SHRINK: (f32, f32) = (10.0, 18.0);

/// Pickup windows around the player center
const POWER_UP_REACH: Vec2 = Vec2::new(30.0, 60.0);
const ORB_REACH: Vec2 = Vec2::new(28.0, 50.0);

/// Near-miss band
const NEAR_MISS_DEPTH: f32 = 90.0;
pub const NEAR_MISS_DISTANCE: f32 = 26.0;
pub const NEAR_MISS_COOLDOWN: f32 = 0.2;

const INVINCIBILITY_DURATION: f32 = 5.0;
const SCORE_MULTIPLIER_DURATION: f32 = 8.0;
const SPEED_BOOST_AMOUNT: f32 = 100.0;
const SPEED_BOOST_CAP: f32 = 1.5;

const POWER_UP_BONUS: f64 = 50.0;
const PROP_BONUS: f64 = 10.0;
const ORB_BONUS: f64 = 25.0;
const NEAR_MISS_NITRO: f32 = 14.0;
const ORB_NITRO: f32 = 18.0;

const CRASH_COLOR: [u8; 3] = [255, 90, 120];
const SMASH_COLOR: [u8; 3] = [255, 255, 0];

/// What a hazard contact did to the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Contact {
    /// Nothing overlapped
    Clear,
    /// Invincible player plowed through
    Smashed,
    /// Run over
    Fatal,
}

/// Resolve every interaction for this tick
pub fn resolve(state: &mut GameState, level: &LevelDescriptor) {
    if !state.player.alive {
        return;
    }

    let player_box = player_hitbox(state);

    if resolve_traffic(state, &player_box) == Contact::Fatal {
        return;
    }
    if resolve_rival(state, &player_box) == Contact::Fatal {
        return;
    }
    if resolve_obstacles(state, &player_box) == Contact::Fatal {
        return;
    }
    collect_power_ups(state);
    hit_destructibles(state, &player_box);
    check_near_miss(state, level);
    collect_orbs(state);
}

pub fn player_hitbox(state: &GameState) -> Rect {
    state
        .player
        .rect
        .inflate(-PLAYER_HIT_SHRINK.0, -PLAYER_HIT_SHRINK.1)
}

/// Lethal contact: flag the crash, apply the floored penalty
fn crash(state: &mut GameState, hazard: Hazard, label: &str) {
    state.player.alive = false;
    state.phase = GamePhase::Crashed;
    state.add_score(-hazard.crash_penalty());
    let top = Vec2::new(state.player.rect.center().x, state.player.rect.top());
    state.float_text(top, label, CRASH_COLOR);
    state.emit(GameEvent::Crashed { hazard });
    log::info!(
        "Crashed into {:?} at level {} (score {})",
        hazard,
        state.level_index + 1,
        state.display_score()
    );
}

/// Invincible contact: award the smash bonus
fn smash(state: &mut GameState, hazard: Hazard, id: Option<u32>, at: Vec2, label: &str) {
    let reward = hazard.smash_reward() * state.player.score_multiplier();
    state.add_score(reward);
    state.float_text(at, label, SMASH_COLOR);
    state.emit(GameEvent::Smashed { hazard, id });
}

fn resolve_traffic(state: &mut GameState, player_box: &Rect) -> Contact {
    let Some(index) = state
        .traffic
        .iter()
        .position(|v| player_box.overlaps(&v.hitbox()))
    else {
        return Contact::Clear;
    };

    if state.player.is_invincible() {
        let car = state.traffic.remove(index);
        let at = Vec2::new(car.rect.center().x, car.rect.top());
        smash(state, Hazard::Traffic, Some(car.id), at, "BOOM!");
        Contact::Smashed
    } else {
        crash(state, Hazard::Traffic, "CRASH!");
        Contact::Fatal
    }
}

fn resolve_rival(state: &mut GameState, player_box: &Rect) -> Contact {
    let hit = state
        .rival
        .as_ref()
        .is_some_and(|rival| player_box.overlaps(&rival.hitbox()));
    if !hit {
        return Contact::Clear;
    }

    if state.player.is_invincible() {
        let id = state.rival.take().map(|r| r.id);
        let at = Vec2::new(state.player.rect.center().x, state.player.rect.top());
        smash(state, Hazard::Rival, id, at, "RIVAL DEFEATED!");
        Contact::Smashed
    } else {
        crash(state, Hazard::Rival, "RIVAL CRASH!");
        Contact::Fatal
    }
}

fn resolve_obstacles(state: &mut GameState, player_box: &Rect) -> Contact {
    let Some(index) = state
        .obstacles
        .iter()
        .position(|o| player_box.overlaps(&o.rect))
    else {
        return Contact::Clear;
    };

    if state.player.is_invincible() {
        let obstacle = state.obstacles.remove(index);
        let at = Vec2::new(obstacle.rect.center().x, obstacle.rect.top());
        smash(state, Hazard::Obstacle, Some(obstacle.id), at, "SMASH!");
        Contact::Smashed
    } else {
        crash(state, Hazard::Obstacle, "OBSTACLE HIT!");
        Contact::Fatal
    }
}

fn within_reach(a: Vec2, b: Vec2, reach: Vec2) -> bool {
    let d = (a - b).abs();
    d.x < reach.x && d.y < reach.y
}

/// First power-up in reach is consumed
fn collect_power_ups(state: &mut GameState) {
    let center = state.player.rect.center();
    let Some(index) = state
        .power_ups
        .iter()
        .position(|p| within_reach(p.pos, center, POWER_UP_REACH))
    else {
        return;
    };
    let power_up = state.power_ups.remove(index);

    let player = &mut state.player;
    match power_up.kind {
        PowerUpKind::Invincibility => player.invincible_timer = INVINCIBILITY_DURATION,
        PowerUpKind::SpeedBoost => {
            let cap = player.max_speed * SPEED_BOOST_CAP;
            player.speed = (player.speed + SPEED_BOOST_AMOUNT).min(cap);
        }
        PowerUpKind::ScoreMultiplier => player.score_multiplier_timer = SCORE_MULTIPLIER_DURATION,
    }

    // The bonus uses whatever multiplier is now in force
    let bonus = POWER_UP_BONUS * state.player.score_multiplier();
    state.add_score(bonus);
    let color = match power_up.kind {
        PowerUpKind::Invincibility => [255, 255, 0],
        PowerUpKind::SpeedBoost => [0, 255, 0],
        PowerUpKind::ScoreMultiplier => [255, 165, 0],
    };
    let at = Vec2::new(center.x, state.player.rect.top() - 20.0);
    state.float_text(at, power_up.kind.label(), color);
    state.emit(GameEvent::PowerUpCollected(power_up.kind));
}

/// Props break on contact; never lethal
fn hit_destructibles(state: &mut GameState, player_box: &Rect) {
    let Some(prop) = state
        .destructibles
        .iter_mut()
        .find(|d| !d.destroyed && player_box.overlaps(&d.rect))
    else {
        return;
    };
    prop.hit();
    let at = Vec2::new(prop.rect.center().x, prop.rect.top());

    let bonus = PROP_BONUS * state.player.score_multiplier();
    state.add_score(bonus);
    state.float_text(at, "CRUNCH!", [180, 180, 180]);
    state.emit(GameEvent::PropDestroyed);
}

/// Close pass behind the player; one award per cooldown window
fn check_near_miss(state: &mut GameState, level: &LevelDescriptor) {
    if state.near_miss_cooldown > 0.0 {
        return;
    }
    let center = state.player.rect.center();
    let reach = state.player.rect.width() * 0.5 + NEAR_MISS_DISTANCE;
    let passed = state.traffic.iter().any(|v| {
        let c = v.rect.center();
        let dy = c.y - center.y;
        dy > 0.0 && dy < NEAR_MISS_DEPTH && (c.x - center.x).abs() < reach
    });
    if !passed {
        return;
    }

    state.near_miss_cooldown = NEAR_MISS_COOLDOWN;
    let bonus = level.near_miss_bonus as f64 * state.player.score_multiplier();
    state.add_score(bonus);
    state.player.add_nitro(NEAR_MISS_NITRO);
    let at = Vec2::new(center.x, state.player.rect.top() - 14.0);
    state.float_text(at, format!("NEAR MISS +{}", bonus as u64), [255, 255, 200]);
    state.emit(GameEvent::NearMiss { bonus });
}

/// Every orb in reach is collected
fn collect_orbs(state: &mut GameState) {
    let center = state.player.rect.center();
    let before = state.orbs.len();
    state.orbs.retain(|o| !within_reach(o.pos, center, ORB_REACH));
    let collected = before - state.orbs.len();

    for _ in 0..collected {
        let bonus = ORB_BONUS * state.player.score_multiplier();
        state.add_score(bonus);
        state.player.add_nitro(ORB_NITRO);
        let at = Vec2::new(center.x, state.player.rect.top() - 12.0);
        state.float_text(at, "+ORB", [0, 255, 220]);
        state.emit(GameEvent::OrbCollected);
    }
}
