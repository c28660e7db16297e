//! Entity spawning: five countdown timers re-armed from the level's rates
//!
//! Also owns scrolling/despawning of everything that is not steered.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::context::{dice, uniform};
use super::rect::Rect;
use super::state::{
    AutonomousVehicle, Destructible, GameEvent, GameState, ORB_RADIUS, Obstacle, Orb,
    POWER_UP_RADIUS, PowerUp, PowerUpKind,
};
use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::levels::LevelDescriptor;
use crate::{lane_width, road_bounds};

/// Traffic enters with its top edge here
pub const TRAFFIC_SPAWN_Y: f32 = -140.0;
/// A new car is refused within this lateral distance of an existing one...
pub const SPAWN_SAFETY_GAP: f32 = 45.0;
/// ...whose top edge is still above this line
pub const SPAWN_SAFETY_DEPTH: f32 = 140.0;

const RIVAL_SPAWN_Y: f32 = -200.0;
/// Rival spawn chance per 60 Hz frame
const RIVAL_SPAWN_CHANCE: f32 = 0.001;

/// First level's rates; cadences are tuned relative to these
const REFERENCE_TRAFFIC_RATE: f32 = 1.0;
const REFERENCE_ORB_RATE: f32 = 0.55;

/// Despawn lines below the screen
const TRAFFIC_DESPAWN_MARGIN: f32 = 160.0;
const PICKUP_DESPAWN_MARGIN: f32 = 60.0;

/// Re-arm intervals (seconds) for a level
pub fn traffic_interval(level: &LevelDescriptor) -> f32 {
    (1.1 / level.traffic_rate).clamp(0.16, 0.9)
}

pub fn orb_interval(level: &LevelDescriptor) -> f32 {
    (2.1 / level.orb_rate).clamp(0.35, 2.8)
}

fn obstacle_interval<R: Rng + ?Sized>(level: &LevelDescriptor, rng: &mut R) -> f32 {
    let base = uniform(rng, 1.5, 3.0);
    (base * REFERENCE_TRAFFIC_RATE / level.traffic_rate).clamp(0.75, 3.0)
}

fn power_up_interval<R: Rng + ?Sized>(level: &LevelDescriptor, rng: &mut R) -> f32 {
    let base = uniform(rng, 5.0, 10.0);
    (base * REFERENCE_ORB_RATE / level.orb_rate).clamp(3.0, 10.0)
}

fn destructible_interval<R: Rng + ?Sized>(level: &LevelDescriptor, rng: &mut R) -> f32 {
    let base = uniform(rng, 0.8, 2.0);
    (base * REFERENCE_TRAFFIC_RATE / level.traffic_rate).clamp(0.4, 2.0)
}

/// Run every spawn timer for one tick
pub fn update<R: Rng + ?Sized>(
    state: &mut GameState,
    level: &LevelDescriptor,
    dt: f32,
    rng: &mut R,
) {
    state.spawn.traffic -= dt;
    if state.spawn.traffic <= 0.0 {
        state.spawn.traffic = traffic_interval(level);
        spawn_traffic(state, level, rng);
    }

    if state.rival.is_none() && rng.random::<f32>() < RIVAL_SPAWN_CHANCE * dt * 60.0 {
        let id = state.next_entity_id();
        let midtop = Vec2::new(SCREEN_WIDTH / 2.0, RIVAL_SPAWN_Y);
        state.rival = Some(AutonomousVehicle::new_rival(id, midtop, level.activity, rng));
        state.emit(GameEvent::RivalSpawned);
        log::debug!("Rival {} entered", id);
    }

    state.spawn.orb -= dt;
    if state.spawn.orb <= 0.0 {
        state.spawn.orb = orb_interval(level);
        spawn_orb(state, rng);
    }

    state.spawn.obstacle -= dt;
    if state.spawn.obstacle <= 0.0 {
        state.spawn.obstacle = obstacle_interval(level, rng);
        spawn_obstacle(state, rng);
    }

    state.spawn.power_up -= dt;
    if state.spawn.power_up <= 0.0 {
        state.spawn.power_up = power_up_interval(level, rng);
        spawn_power_up(state, rng);
    }

    state.spawn.destructible -= dt;
    if state.spawn.destructible <= 0.0 {
        state.spawn.destructible = destructible_interval(level, rng);
        spawn_destructible(state, rng);
    }
}

/// True when no fresh traffic sits within the safety gap of `x`
pub fn lane_is_clear(traffic: &[AutonomousVehicle], x: f32) -> bool {
    !traffic.iter().any(|v| {
        (v.rect.center().x - x).abs() < SPAWN_SAFETY_GAP && v.rect.top() < SPAWN_SAFETY_DEPTH
    })
}

/// Try to add a car in a random lane; skipped when the slot is not clear
pub fn spawn_traffic<R: Rng + ?Sized>(
    state: &mut GameState,
    level: &LevelDescriptor,
    rng: &mut R,
) -> bool {
    let (left, _) = road_bounds();
    let lane_w = lane_width();
    let lane = rng.random_range(0..crate::consts::LANE_COUNT) as f32;
    let x = left + lane * lane_w + uniform(rng, 0.15, 0.85) * lane_w;

    if !lane_is_clear(&state.traffic, x) {
        log::debug!("Traffic spawn at x={:.0} skipped: lane occupied", x);
        return false;
    }

    let id = state.next_entity_id();
    let at = Vec2::new(x, TRAFFIC_SPAWN_Y);
    let vehicle = AutonomousVehicle::new_traffic(id, at, level.activity, rng);
    state.traffic.push(vehicle);
    true
}

fn spawn_orb<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) {
    let (left, right) = road_bounds();
    let x = left + uniform(rng, 0.12, 0.88) * (right - left);
    let id = state.next_entity_id();
    state.orbs.push(Orb {
        id,
        pos: Vec2::new(x, -30.0),
        radius: ORB_RADIUS,
    });
}

fn spawn_obstacle<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) {
    let (left, right) = road_bounds();
    let w = dice(rng, 30, 80) as f32;
    let h = dice(rng, 20, 60) as f32;
    let x = dice(rng, left as i32, (right - w) as i32) as f32;
    let id = state.next_entity_id();
    state.obstacles.push(Obstacle {
        id,
        rect: Rect::new(x, -h, w, h),
    });
}

fn spawn_power_up<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) {
    let (left, right) = road_bounds();
    let kind = *PowerUpKind::ALL.choose(rng).unwrap_or(&PowerUpKind::SpeedBoost);
    let x = dice(rng, left as i32 + 20, right as i32 - 20) as f32;
    let id = state.next_entity_id();
    state.power_ups.push(PowerUp {
        id,
        kind,
        pos: Vec2::new(x, -50.0),
        radius: POWER_UP_RADIUS,
    });
}

/// Props only ever appear on the shoulders, never on the road
fn spawn_destructible<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) {
    let (left, right) = road_bounds();
    let w = dice(rng, 15, 30) as f32;
    let h = dice(rng, 20, 40) as f32;
    let x = if rng.random_bool(0.5) {
        dice(rng, (left - 50.0) as i32, (left - w - 10.0) as i32)
    } else {
        dice(rng, (right + 10.0) as i32, (right + 50.0 - w) as i32)
    } as f32;
    let id = state.next_entity_id();
    state.destructibles.push(Destructible {
        id,
        rect: Rect::new(x, -h, w, h),
        life: 1,
        destroyed: false,
    });
}

/// Scroll non-steered entities with the road and age floating text
pub fn scroll(state: &mut GameState, world_speed: f32, dt: f32) {
    let dy = world_speed * dt;
    for orb in &mut state.orbs {
        orb.pos.y += dy;
    }
    for power_up in &mut state.power_ups {
        power_up.pos.y += dy;
    }
    for obstacle in &mut state.obstacles {
        obstacle.rect.pos.y += dy;
    }
    for prop in state.destructibles.iter_mut().filter(|d| !d.destroyed) {
        prop.rect.pos.y += dy;
    }
    for text in &mut state.texts {
        text.update(dt);
    }
}

/// Drop everything that has left the screen (or been destroyed)
pub fn despawn(state: &mut GameState) {
    let h = SCREEN_HEIGHT;
    state
        .traffic
        .retain(|v| v.rect.top() < h + TRAFFIC_DESPAWN_MARGIN);
    if state
        .rival
        .as_ref()
        .is_some_and(|r| r.rect.top() > h + TRAFFIC_DESPAWN_MARGIN)
    {
        log::debug!("Rival left the road");
        state.rival = None;
    }
    state.orbs.retain(|o| o.pos.y < h + PICKUP_DESPAWN_MARGIN);
    state.power_ups.retain(|p| p.pos.y < h + PICKUP_DESPAWN_MARGIN);
    state.obstacles.retain(|o| o.rect.top() < h);
    state
        .destructibles
        .retain(|d| d.rect.top() < h && !d.destroyed);
    state.texts.retain(|t| t.alive());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::LevelTable;
    use crate::sim::context::SimContext;
    use crate::sim::state::CarArchetype;

    fn fresh(seed: u64) -> (GameState, SimContext, LevelTable) {
        let levels = LevelTable::builtin();
        let mut ctx = SimContext::new(seed);
        let state = GameState::new(CarArchetype::Standard, &levels, &mut ctx);
        (state, ctx, levels)
    }

    #[test]
    fn test_intervals_clamped() {
        let levels = LevelTable::builtin();
        let easy = levels.get(0).unwrap();
        let hard = levels.get(12).unwrap();
        assert!((traffic_interval(easy) - 0.9).abs() < 1e-6);
        assert!((traffic_interval(hard) - 0.183_333).abs() < 1e-3);
        let mut extreme = hard.clone();
        extreme.traffic_rate = 100.0;
        assert_eq!(traffic_interval(&extreme), 0.16);
        assert_eq!(orb_interval(easy), 2.8);
        let crown = levels.get(7).unwrap();
        assert!((orb_interval(crown) - 2.1 / 1.1).abs() < 1e-4);

        let mut rng = SimContext::new(3).rng;
        for _ in 0..100 {
            let obstacle = obstacle_interval(&extreme, &mut rng);
            assert!((0.75..=3.0).contains(&obstacle));
            let power = power_up_interval(easy, &mut rng);
            assert!((5.0..=10.0).contains(&power));
        }
    }

    #[test]
    fn test_first_tick_spawns_every_category() {
        let (mut state, mut ctx, levels) = fresh(21);
        let level = levels.get(0).unwrap().clone();
        update(&mut state, &level, 1.0 / 60.0, &mut ctx.rng);
        assert_eq!(state.traffic.len(), 1);
        assert_eq!(state.orbs.len(), 1);
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.power_ups.len(), 1);
        assert_eq!(state.destructibles.len(), 1);
        assert!((state.spawn.traffic - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_lane_safety_rejects_crowded_slot() {
        let (mut state, mut ctx, levels) = fresh(4);
        let level = levels.get(0).unwrap().clone();
        // Fill the top of every lane
        let (left, right) = road_bounds();
        let mut x = left + 20.0;
        while x < right {
            let id = state.next_entity_id();
            let at = Vec2::new(x, TRAFFIC_SPAWN_Y);
            let car = AutonomousVehicle::new_traffic(id, at, 0.5, &mut ctx.rng);
            state.traffic.push(car);
            x += 40.0;
        }
        let before = state.traffic.len();
        for _ in 0..20 {
            assert!(!spawn_traffic(&mut state, &level, &mut ctx.rng));
        }
        assert_eq!(state.traffic.len(), before);

        // Once they have scrolled down the corridor the lanes count as clear
        for car in &mut state.traffic {
            car.rect.pos.y = 300.0;
        }
        assert!(spawn_traffic(&mut state, &level, &mut ctx.rng));
    }

    #[test]
    fn test_destructibles_on_shoulders_only() {
        let (mut state, mut ctx, _) = fresh(99);
        let (left, right) = road_bounds();
        for _ in 0..200 {
            spawn_destructible(&mut state, &mut ctx.rng);
        }
        for prop in &state.destructibles {
            let on_left = prop.rect.right() <= left;
            let on_right = prop.rect.left() >= right;
            assert!(on_left || on_right, "prop at {:?} is on the road", prop.rect);
        }
    }

    #[test]
    fn test_single_rival() {
        let (mut state, mut ctx, levels) = fresh(5);
        let level = levels.get(0).unwrap().clone();
        // A huge dt makes the per-tick spawn roll a certainty
        for _ in 0..50 {
            update(&mut state, &level, 100.0, &mut ctx.rng);
        }
        assert!(state.rival.is_some());
        let spawned = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::RivalSpawned))
            .count();
        assert_eq!(spawned, 1);
    }

    #[test]
    fn test_despawn_off_screen() {
        let (mut state, mut ctx, levels) = fresh(6);
        let level = levels.get(0).unwrap().clone();
        update(&mut state, &level, 1.0 / 60.0, &mut ctx.rng);
        scroll(&mut state, 10_000.0, 1.0);
        state.traffic[0].rect.pos.y = SCREEN_HEIGHT + 200.0;
        despawn(&mut state);
        assert!(state.traffic.is_empty());
        assert!(state.orbs.is_empty());
        assert!(state.obstacles.is_empty());
        assert!(state.power_ups.is_empty());
        assert!(state.destructibles.is_empty());
    }
}
