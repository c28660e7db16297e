//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only, carried in `SimContext`
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod context;
pub mod progression;
pub mod rect;
pub mod spawner;
pub mod state;
pub mod steering;
pub mod tick;
pub mod weather;

pub use context::SimContext;
pub use progression::Progress;
pub use rect::Rect;
pub use state::{
    AutonomousVehicle, CarArchetype, Destructible, FloatingText, GameEvent, GamePhase, GameState,
    Hazard, Obstacle, Orb, Player, PowerUp, PowerUpKind, VehicleKind, VehicleRole, Weather,
};
pub use tick::{TickInput, TickOutcome, tick};
