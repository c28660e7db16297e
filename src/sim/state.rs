//! Game state and core simulation types
//!
//! All state that must be captured for snapshots/determinism lives here.
//! Entities are plain values owned by `GameState` and removed by filtering.

use std::str::FromStr;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::context::{SimContext, uniform};
use super::rect::Rect;
use super::tick::TickInput;
use crate::consts::*;
use crate::error::Error;
use crate::levels::{LevelDescriptor, LevelTable};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active driving
    Racing,
    /// Frozen; only input and rendering run
    Paused,
    /// Lethal collision; waits for restart or quit
    Crashed,
    /// Every level cleared
    GameWon,
}

/// Player car archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CarArchetype {
    #[default]
    Standard,
    Sport,
    Muscle,
    Classic,
}

/// Multipliers applied to the base player stats
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarStats {
    pub max_speed_mult: f32,
    pub accel_mult: f32,
    pub turn_mult: f32,
}

impl FromStr for CarArchetype {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_lowercase().as_str() {
            "standard" | "std" => Ok(CarArchetype::Standard),
            "sport" => Ok(CarArchetype::Sport),
            "muscle" => Ok(CarArchetype::Muscle),
            "classic" => Ok(CarArchetype::Classic),
            _ => Err(Error::UnknownCar(s.to_string())),
        }
    }
}

impl CarArchetype {
    pub const ALL: [CarArchetype; 4] = [
        CarArchetype::Standard,
        CarArchetype::Sport,
        CarArchetype::Muscle,
        CarArchetype::Classic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CarArchetype::Standard => "Standard",
            CarArchetype::Sport => "Sport",
            CarArchetype::Muscle => "Muscle",
            CarArchetype::Classic => "Classic",
        }
    }

    pub fn stats(&self) -> CarStats {
        let (max_speed_mult, accel_mult, turn_mult) = match self {
            CarArchetype::Standard => (1.0, 1.0, 1.0),
            CarArchetype::Sport => (1.2, 1.1, 1.3),
            CarArchetype::Muscle => (1.1, 1.3, 0.9),
            CarArchetype::Classic => (0.9, 0.9, 1.1),
        };
        CarStats {
            max_speed_mult,
            accel_mult,
            turn_mult,
        }
    }

    /// Body size in world units
    pub fn size(&self) -> Vec2 {
        match self {
            CarArchetype::Standard => Vec2::new(56.0, 100.0),
            CarArchetype::Sport => Vec2::new(50.0, 90.0),
            CarArchetype::Muscle => Vec2::new(60.0, 110.0),
            CarArchetype::Classic => Vec2::new(58.0, 95.0),
        }
    }
}

/// The player's car
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub archetype: CarArchetype,
    pub rect: Rect,
    /// Forward speed (also the world scroll speed)
    pub speed: f32,
    /// Speed cap for the current level (before nitro)
    pub max_speed: f32,
    pub accel: f32,
    pub turn_speed: f32,
    pub nitro: f32,
    pub nitro_active: bool,
    pub alive: bool,
    /// Seconds of invincibility left
    pub invincible_timer: f32,
    /// Seconds of x2 scoring left
    pub score_multiplier_timer: f32,
}

impl Player {
    pub fn new(archetype: CarArchetype, level_max_speed: f32) -> Self {
        let stats = archetype.stats();
        let center = Vec2::new(
            (ROAD_LEFT + ROAD_RIGHT) / 2.0,
            SCREEN_HEIGHT * PLAYER_Y_FRACTION,
        );
        let mut player = Self {
            archetype,
            rect: Rect::from_center(center, archetype.size()),
            speed: PLAYER_START_SPEED,
            max_speed: PLAYER_BASE_MAX_SPEED,
            accel: PLAYER_BASE_ACCEL * stats.accel_mult,
            turn_speed: PLAYER_BASE_TURN * stats.turn_mult,
            nitro: 0.0,
            nitro_active: false,
            alive: true,
            invincible_timer: 0.0,
            score_multiplier_timer: 0.0,
        };
        player.set_max_speed_from_level(level_max_speed);
        player
    }

    /// Combine the level's speed cap with this car's top-speed multiplier
    pub fn set_max_speed_from_level(&mut self, level_max_speed: f32) {
        self.max_speed = level_max_speed * self.archetype.stats().max_speed_mult;
    }

    /// Speed cap including an active nitro burn
    pub fn effective_max_speed(&self) -> f32 {
        if self.nitro_active {
            self.max_speed * NITRO_SPEED_FACTOR
        } else {
            self.max_speed
        }
    }

    /// Allowed range for `rect.left()`
    pub fn x_bounds(&self) -> (f32, f32) {
        (
            ROAD_LEFT + PLAYER_EDGE_INSET,
            ROAD_RIGHT - PLAYER_EDGE_INSET - self.rect.width(),
        )
    }

    pub fn recenter(&mut self) {
        self.rect.set_center_x((ROAD_LEFT + ROAD_RIGHT) / 2.0);
    }

    pub fn add_nitro(&mut self, amount: f32) {
        self.nitro = (self.nitro + amount).clamp(0.0, NITRO_MAX);
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_timer > 0.0
    }

    pub fn score_multiplier(&self) -> f64 {
        if self.score_multiplier_timer > 0.0 { 2.0 } else { 1.0 }
    }

    /// Throttle, nitro, steering and buff timers for one tick
    pub fn update(&mut self, dt: f32, input: &TickInput, grip: f32) {
        if !self.alive {
            return;
        }

        self.invincible_timer = (self.invincible_timer - dt).max(0.0);
        self.score_multiplier_timer = (self.score_multiplier_timer - dt).max(0.0);

        if input.accelerate {
            self.speed += self.accel * dt;
        }
        if input.brake {
            self.speed -= self.accel * BRAKE_FACTOR * dt;
        }

        if input.nitro && self.nitro > 0.0 {
            self.nitro_active = true;
            self.nitro -= NITRO_BURN_RATE * dt;
            if self.nitro <= 0.0 {
                self.nitro = 0.0;
                self.nitro_active = false;
            }
        } else {
            self.nitro_active = false;
        }

        self.speed = self.speed.clamp(PLAYER_MIN_SPEED, self.effective_max_speed());

        let steer_factor = if self.nitro_active { NITRO_STEER_FACTOR } else { 1.0 };
        let lateral = self.turn_speed * dt * steer_factor * grip;
        if input.right {
            self.rect.pos.x += lateral;
        }
        if input.left {
            self.rect.pos.x -= lateral;
        }

        let (min_x, max_x) = self.x_bounds();
        self.rect.pos.x = self.rect.pos.x.clamp(min_x, max_x);
    }
}

/// Autonomous vehicle body types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleKind {
    Bike,
    Car,
    Van,
    Truck,
}

impl VehicleKind {
    /// Traffic mix: 12% bikes, 28% cars, 35% vans, 25% trucks
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let r: f32 = rng.random();
        if r < 0.12 {
            VehicleKind::Bike
        } else if r < 0.40 {
            VehicleKind::Car
        } else if r < 0.75 {
            VehicleKind::Van
        } else {
            VehicleKind::Truck
        }
    }

    pub fn size(&self) -> Vec2 {
        match self {
            VehicleKind::Bike => Vec2::new(32.0, 72.0),
            VehicleKind::Car => Vec2::new(56.0, 100.0),
            VehicleKind::Van => Vec2::new(60.0, 108.0),
            VehicleKind::Truck => Vec2::new(72.0, 130.0),
        }
    }

    /// Forward speed range
    pub fn speed_range(&self) -> (f32, f32) {
        match self {
            VehicleKind::Bike => (170.0, 260.0),
            VehicleKind::Car => (120.0, 220.0),
            VehicleKind::Van => (100.0, 180.0),
            VehicleKind::Truck => (80.0, 140.0),
        }
    }

    /// Hitbox shrink applied on each axis for collision tests
    pub fn hit_shrink(&self) -> f32 {
        match self {
            VehicleKind::Bike => 10.0,
            VehicleKind::Car => 8.0,
            VehicleKind::Van => 6.0,
            VehicleKind::Truck => 2.0,
        }
    }
}

/// Behaviour variant for an autonomous vehicle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VehicleRole {
    /// Ambient traffic: wanders and picks random lane offsets
    Traffic,
    /// Pursuing rival: holds a lane index, re-picked every few seconds
    Rival {
        target_lane: u32,
        lane_change_timer: f32,
    },
}

/// Traffic or rival car steered by the lateral AI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutonomousVehicle {
    pub id: u32,
    pub kind: VehicleKind,
    pub role: VehicleRole,
    pub rect: Rect,
    /// Forward speed; the vehicle scrolls at `world_speed - speed`
    pub speed: f32,
    /// Lateral velocity
    pub vx: f32,
    pub wander_timer: f32,
    pub change_timer: f32,
    pub target_x: f32,
    /// Level activity coefficient
    pub activity: f32,
}

impl AutonomousVehicle {
    /// Ambient traffic with its top edge centered on `midtop`
    pub fn new_traffic<R: Rng + ?Sized>(id: u32, midtop: Vec2, activity: f32, rng: &mut R) -> Self {
        let kind = VehicleKind::roll(rng);
        let (lo, hi) = kind.speed_range();
        let speed = uniform(rng, lo, hi);

        let max_vx = 22.0 + 28.0 * activity;
        let truck_factor = if kind == VehicleKind::Truck { 0.3 } else { 1.0 };
        let vx = uniform(rng, -max_vx, max_vx) * truck_factor;

        let patience = activity.max(0.35);
        let wander_timer = uniform(rng, 0.6, 1.4) / patience;
        let change_timer = uniform(rng, 1.2, 2.2) / patience;

        Self {
            id,
            kind,
            role: VehicleRole::Traffic,
            rect: Rect::from_midtop(midtop, kind.size()),
            speed,
            vx,
            wander_timer,
            change_timer,
            target_x: midtop.x,
            activity,
        }
    }

    /// The rival: always a car, faster than traffic, locked to a lane
    pub fn new_rival<R: Rng + ?Sized>(id: u32, midtop: Vec2, activity: f32, rng: &mut R) -> Self {
        let mut rival = Self::new_traffic(id, midtop, activity, rng);
        rival.kind = VehicleKind::Car;
        rival.rect = Rect::from_midtop(midtop, VehicleKind::Car.size());
        rival.speed = uniform(rng, 200.0, 300.0);
        rival.role = VehicleRole::Rival {
            target_lane: rng.random_range(0..LANE_COUNT),
            lane_change_timer: uniform(rng, 2.0, 5.0),
        };
        rival
    }

    pub fn is_rival(&self) -> bool {
        matches!(self.role, VehicleRole::Rival { .. })
    }

    /// Collision box for player contact
    pub fn hitbox(&self) -> Rect {
        let shrink = if self.is_rival() { 8.0 } else { self.kind.hit_shrink() };
        self.rect.inflate(-shrink, -shrink)
    }
}

/// Nitro orb pickup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Orb {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
}

pub const ORB_RADIUS: f32 = 10.0;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Invincibility,
    SpeedBoost,
    ScoreMultiplier,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::Invincibility,
        PowerUpKind::SpeedBoost,
        PowerUpKind::ScoreMultiplier,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PowerUpKind::Invincibility => "INVINCIBLE!",
            PowerUpKind::SpeedBoost => "SPEED BOOST!",
            PowerUpKind::ScoreMultiplier => "SCORE x2!",
        }
    }
}

/// A power-up entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub radius: f32,
}

pub const POWER_UP_RADIUS: f32 = 12.0;

/// Static road block; lethal unless invincible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub rect: Rect,
}

/// Roadside prop on the shoulders; one hit destroys it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destructible {
    pub id: u32,
    pub rect: Rect,
    pub life: u8,
    pub destroyed: bool,
}

impl Destructible {
    pub fn hit(&mut self) {
        self.life = self.life.saturating_sub(1);
        if self.life == 0 {
            self.destroyed = true;
        }
    }
}

/// Ephemeral feedback label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingText {
    pub pos: Vec2,
    pub text: String,
    pub color: [u8; 3],
    /// Seconds left on screen
    pub timer: f32,
}

pub const FLOATING_TEXT_LIFETIME: f32 = 1.2;
const FLOATING_TEXT_RISE: f32 = 35.0;

impl FloatingText {
    pub fn new(pos: Vec2, text: impl Into<String>, color: [u8; 3]) -> Self {
        Self {
            pos,
            text: text.into(),
            color,
            timer: FLOATING_TEXT_LIFETIME,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.timer -= dt;
        self.pos.y -= FLOATING_TEXT_RISE * dt;
    }

    pub fn alive(&self) -> bool {
        self.timer > 0.0
    }
}

/// Weather states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Weather {
    #[default]
    Clear,
    Rain,
    Fog,
}

impl Weather {
    pub const ALL: [Weather; 3] = [Weather::Clear, Weather::Rain, Weather::Fog];

    /// Lateral steering responsiveness under this weather
    pub fn grip(&self) -> f32 {
        match self {
            Weather::Clear => 1.0,
            Weather::Rain => 0.7,
            Weather::Fog => 0.9,
        }
    }
}

/// Countdown (seconds) until each category spawns again
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnTimers {
    pub traffic: f32,
    pub orb: f32,
    pub obstacle: f32,
    pub power_up: f32,
    pub destructible: f32,
}

/// Lethal collision categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hazard {
    Traffic,
    Rival,
    Obstacle,
}

impl Hazard {
    /// Score lost when this hazard ends the run
    pub fn crash_penalty(&self) -> f64 {
        match self {
            Hazard::Traffic => 80.0,
            Hazard::Rival => 150.0,
            Hazard::Obstacle => 100.0,
        }
    }

    /// Base score for smashing through it while invincible
    pub fn smash_reward(&self) -> f64 {
        match self {
            Hazard::Traffic => 50.0,
            Hazard::Rival => 200.0,
            Hazard::Obstacle => 75.0,
        }
    }
}

/// Things that happened this tick, for render/audio collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Crashed { hazard: Hazard },
    Smashed { hazard: Hazard, id: Option<u32> },
    PowerUpCollected(PowerUpKind),
    OrbCollected,
    PropDestroyed,
    NearMiss { bonus: f64 },
    WeatherChanged(Weather),
    RivalSpawned,
    LevelComplete { completed: u32 },
    GameWon,
    Restarted,
    Paused,
    Resumed,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    /// Current level index (0-based)
    pub level_index: u32,
    /// Distance covered in the current level
    pub distance: f32,
    pub score: f64,
    pub player: Player,
    /// Active traffic (spawn order)
    pub traffic: Vec<AutonomousVehicle>,
    /// At most one rival
    pub rival: Option<AutonomousVehicle>,
    pub orbs: Vec<Orb>,
    pub power_ups: Vec<PowerUp>,
    pub obstacles: Vec<Obstacle>,
    pub destructibles: Vec<Destructible>,
    pub texts: Vec<FloatingText>,
    pub spawn: SpawnTimers,
    pub weather: Weather,
    /// Steering responsiveness, driven by weather
    pub grip: f32,
    /// Seconds until the next weather roll
    pub weather_timer: f32,
    /// Seconds before another near-miss can score
    pub near_miss_cooldown: f32,
    /// Events raised during the last tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Fresh run at level 0
    pub fn new(archetype: CarArchetype, levels: &LevelTable, ctx: &mut SimContext) -> Self {
        let level = levels.get_or_last(0);
        Self {
            phase: GamePhase::Racing,
            level_index: 0,
            distance: 0.0,
            score: 0.0,
            player: Player::new(archetype, level.max_speed),
            traffic: Vec::new(),
            rival: None,
            orbs: Vec::new(),
            power_ups: Vec::new(),
            obstacles: Vec::new(),
            destructibles: Vec::new(),
            texts: Vec::new(),
            spawn: SpawnTimers::default(),
            weather: Weather::Clear,
            grip: Weather::Clear.grip(),
            weather_timer: super::weather::initial_timer(&mut ctx.rng),
            near_miss_cooldown: 0.0,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Descriptor for the level being driven (last level once the run is won)
    pub fn level<'a>(&self, levels: &'a LevelTable) -> &'a LevelDescriptor {
        levels.get_or_last(self.level_index)
    }

    /// Drop every transient entity and re-arm spawning
    pub fn clear_transient(&mut self) {
        self.traffic.clear();
        self.rival = None;
        self.orbs.clear();
        self.power_ups.clear();
        self.obstacles.clear();
        self.destructibles.clear();
        self.texts.clear();
        self.spawn = SpawnTimers::default();
        self.near_miss_cooldown = 0.0;
    }

    /// Add (or subtract) score, never dropping below zero
    pub fn add_score(&mut self, delta: f64) {
        self.score = (self.score + delta).max(0.0);
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn float_text(&mut self, pos: Vec2, text: impl Into<String>, color: [u8; 3]) {
        self.texts.push(FloatingText::new(pos, text, color));
    }

    /// Score as shown on the HUD
    pub fn display_score(&self) -> u64 {
        self.score as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_speed_clamped() {
        let mut player = Player::new(CarArchetype::Standard, 260.0);
        let input = TickInput {
            accelerate: true,
            ..Default::default()
        };
        for _ in 0..600 {
            player.update(SIM_DT, &input, 1.0);
        }
        assert_eq!(player.speed, 260.0);

        let brake = TickInput {
            brake: true,
            ..Default::default()
        };
        for _ in 0..600 {
            player.update(SIM_DT, &brake, 1.0);
        }
        assert_eq!(player.speed, PLAYER_MIN_SPEED);
    }

    #[test]
    fn test_nitro_burns_and_raises_cap() {
        let mut player = Player::new(CarArchetype::Standard, 260.0);
        player.speed = 260.0;
        player.nitro = 10.0;
        let input = TickInput {
            accelerate: true,
            nitro: true,
            ..Default::default()
        };
        player.update(0.1, &input, 1.0);
        assert!(player.nitro_active);
        assert!(player.speed > 260.0);
        assert!((player.nitro - 7.0).abs() < 1e-4);

        for _ in 0..10 {
            player.update(0.1, &input, 1.0);
        }
        assert_eq!(player.nitro, 0.0);
        assert!(!player.nitro_active);
        assert!(player.speed <= player.max_speed);
    }

    #[test]
    fn test_steering_scaled_by_grip_and_clamped() {
        let mut dry = Player::new(CarArchetype::Standard, 260.0);
        let mut wet = dry.clone();
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        let start = dry.rect.left();
        dry.update(0.1, &right, 1.0);
        wet.update(0.1, &right, 0.7);
        assert!((dry.rect.left() - start - 28.0).abs() < 1e-3);
        assert!((wet.rect.left() - start - 19.6).abs() < 1e-3);

        for _ in 0..100 {
            dry.update(0.1, &right, 1.0);
        }
        assert_eq!(dry.rect.left(), dry.x_bounds().1);
    }

    #[test]
    fn test_car_archetype_stats() {
        let sport = Player::new(CarArchetype::Sport, 300.0);
        assert!((sport.max_speed - 360.0).abs() < 1e-3);
        assert_eq!("MUSCLE".parse::<CarArchetype>().ok(), Some(CarArchetype::Muscle));
        assert!(matches!(
            "tank".parse::<CarArchetype>(),
            Err(Error::UnknownCar(name)) if name == "tank"
        ));
    }

    #[test]
    fn test_score_floor() {
        let mut ctx = SimContext::new(1);
        let mut state = GameState::new(CarArchetype::Standard, &LevelTable::builtin(), &mut ctx);
        state.add_score(30.0);
        state.add_score(-Hazard::Rival.crash_penalty());
        assert_eq!(state.score, 0.0);
    }

    #[test]
    fn test_destructible_one_hit() {
        let mut prop = Destructible {
            id: 1,
            rect: Rect::new(0.0, 0.0, 20.0, 30.0),
            life: 1,
            destroyed: false,
        };
        prop.hit();
        assert!(prop.destroyed);
    }
}
