//! Lateral steering AI for traffic and the rival
//!
//! Each vehicle carries its own wander/lane-change timers; randomness comes
//! only from the RNG passed in, so a seeded run steers identically every time.

use rand::Rng;

use super::context::uniform;
use super::rect::Rect;
use super::state::{AutonomousVehicle, VehicleKind, VehicleRole};
use crate::{lane_width, road_bounds};

/// Distance from a road edge at which traffic starts pushing away
const WALL_MARGIN: f32 = 10.0;
/// Vertical window in which traffic yields to the player
const TRAFFIC_AVOID_RANGE: f32 = 130.0;
const RIVAL_AVOID_RANGE: f32 = 150.0;
/// Fraction of lateral speed kept after bouncing off a road edge
const WALL_BOUNCE: f32 = 0.7;

/// Per-tick inputs shared by every autonomous vehicle
#[derive(Debug, Clone, Copy)]
pub struct SteeringEnv {
    pub dt: f32,
    /// Player's forward speed; everything scrolls relative to it
    pub world_speed: f32,
    pub player_box: Rect,
    pub road_left: f32,
    pub road_right: f32,
}

impl SteeringEnv {
    pub fn new(dt: f32, world_speed: f32, player_box: Rect) -> Self {
        let (road_left, road_right) = road_bounds();
        Self {
            dt,
            world_speed,
            player_box,
            road_left,
            road_right,
        }
    }
}

/// Advance one vehicle by a tick: scroll, steer, damp, keep on the road
pub fn advance<R: Rng + ?Sized>(vehicle: &mut AutonomousVehicle, env: &SteeringEnv, rng: &mut R) {
    // Relative motion: slower cars recede toward the bottom, faster ones pull away
    vehicle.rect.pos.y += (env.world_speed - vehicle.speed) * env.dt;

    match vehicle.role {
        VehicleRole::Traffic => steer_traffic(vehicle, env, rng),
        VehicleRole::Rival { .. } => steer_rival(vehicle, env, rng),
    }

    clamp_to_road(vehicle, env);
}

fn steer_traffic<R: Rng + ?Sized>(v: &mut AutonomousVehicle, env: &SteeringEnv, rng: &mut R) {
    let dt = env.dt;

    // Drift
    v.wander_timer -= dt;
    if v.wander_timer <= 0.0 {
        v.vx += uniform(rng, -10.0, 10.0) * v.activity;
        v.wander_timer = uniform(rng, 0.5, 1.2);
    }

    // Lane-change intent
    v.change_timer -= dt;
    if v.change_timer <= 0.0 {
        let lane_w = lane_width();
        let lane = rng.random_range(0..crate::consts::LANE_COUNT) as f32;
        v.target_x = env.road_left + lane * lane_w + uniform(rng, 0.2, 0.8) * lane_w;
        v.change_timer = uniform(rng, 1.0, 2.0) / v.activity.max(0.4);
    }

    if v.rect.left() < env.road_left + WALL_MARGIN {
        v.vx = v.vx.abs() * 0.8 + 20.0 * v.activity;
    }
    if v.rect.right() > env.road_right - WALL_MARGIN {
        v.vx = -v.vx.abs() * 0.8 - 20.0 * v.activity;
    }

    avoid_player(v, env, TRAFFIC_AVOID_RANGE, 18.0);

    let truck_factor = if v.kind == VehicleKind::Truck { 0.5 } else { 1.0 };
    let steer = (v.target_x - v.rect.center().x).clamp(-40.0, 40.0);
    v.vx += steer * 0.6 * dt * truck_factor;

    v.rect.pos.x += v.vx * dt;
    v.vx *= if v.kind == VehicleKind::Bike { 0.93 } else { 0.96 };
}

fn steer_rival<R: Rng + ?Sized>(v: &mut AutonomousVehicle, env: &SteeringEnv, rng: &mut R) {
    let dt = env.dt;

    let VehicleRole::Rival {
        mut target_lane,
        mut lane_change_timer,
    } = v.role
    else {
        return;
    };

    lane_change_timer -= dt;
    if lane_change_timer <= 0.0 {
        target_lane = rng.random_range(0..crate::consts::LANE_COUNT);
        lane_change_timer = uniform(rng, 2.0, 5.0);
    }
    v.role = VehicleRole::Rival {
        target_lane,
        lane_change_timer,
    };

    let lane_w = lane_width();
    v.target_x = env.road_left + target_lane as f32 * lane_w + lane_w / 2.0;

    let steer = (v.target_x - v.rect.center().x).clamp(-50.0, 50.0);
    v.vx += steer * 0.8 * dt + uniform(rng, -5.0, 5.0) * dt;

    avoid_player(v, env, RIVAL_AVOID_RANGE, 25.0);

    v.rect.pos.x += v.vx * dt;
    v.vx *= 0.95;
}

/// Bias lateral velocity away from the player when vertically close
fn avoid_player(v: &mut AutonomousVehicle, env: &SteeringEnv, range: f32, strength: f32) {
    let player = env.player_box.center();
    let center = v.rect.center();
    if (center.y - player.y).abs() < range {
        if center.x < player.x {
            v.vx -= strength * v.activity;
        } else {
            v.vx += strength * v.activity;
        }
    }
}

/// Keep the body inside the road; bounce off the edges
fn clamp_to_road(v: &mut AutonomousVehicle, env: &SteeringEnv) {
    if v.rect.left() < env.road_left {
        v.rect.set_left(env.road_left);
        v.vx = v.vx.abs() * WALL_BOUNCE;
    }
    if v.rect.right() > env.road_right {
        v.rect.set_right(env.road_right);
        v.vx = -v.vx.abs() * WALL_BOUNCE;
    }
}
