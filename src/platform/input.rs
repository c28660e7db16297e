//! Input sources: anything that can turn a game state into a `TickInput`

use crate::consts::{LANE_COUNT, NITRO_MAX};
use crate::sim::{GamePhase, GameState, Rect, TickInput};
use crate::{lane_width, road_bounds};

/// Produces the input for the next tick
pub trait InputSource {
    fn poll(&mut self, state: &GameState) -> TickInput;
}

/// How far up the road the autopilot looks for trouble
const LOOKAHEAD: f32 = 280.0;
/// Extra lateral room kept around the player when judging a lane
const SIDE_MARGIN: f32 = 12.0;
/// Threat this close straight ahead makes the autopilot brake
const BRAKE_DISTANCE: f32 = 90.0;
/// Lateral error the autopilot tolerates before steering
const STEER_DEADZONE: f32 = 6.0;
/// Lane clearance considered comfortable enough to chase pickups
const SAFE_CLEARANCE: f32 = 200.0;

/// Demo driver: keeps the throttle open, dodges into the clearest lane and
/// grabs pickups when nothing is close
#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    /// Ticks driven, used to vary lane preference between equal choices
    ticks: u64,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every hazard box the player must not touch
    fn hazards(state: &GameState) -> Vec<Rect> {
        let mut boxes: Vec<Rect> = state.traffic.iter().map(|v| v.rect).collect();
        boxes.extend(state.rival.iter().map(|r| r.rect));
        boxes.extend(state.obstacles.iter().map(|o| o.rect));
        boxes
    }

    /// Distance to the nearest hazard ahead in the corridor centered on `x`
    fn clearance(state: &GameState, hazards: &[Rect], x: f32) -> f32 {
        let player = &state.player.rect;
        let half = player.width() / 2.0 + SIDE_MARGIN;
        hazards
            .iter()
            .filter(|h| h.right() > x - half && h.left() < x + half)
            .filter(|h| h.bottom() > player.top() - LOOKAHEAD && h.top() < player.bottom())
            .map(|h| (player.top() - h.bottom()).max(0.0))
            .fold(LOOKAHEAD, f32::min)
    }

    /// Nearest pickup that is still ahead of the player
    fn pickup_target(state: &GameState) -> Option<f32> {
        let player = state.player.rect.center();
        state
            .power_ups
            .iter()
            .map(|p| p.pos)
            .chain(state.orbs.iter().map(|o| o.pos))
            .filter(|p| p.y < player.y && player.y - p.y < LOOKAHEAD)
            .min_by(|a, b| {
                a.distance(player)
                    .partial_cmp(&b.distance(player))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|p| p.x)
    }
}

impl InputSource for Autopilot {
    fn poll(&mut self, state: &GameState) -> TickInput {
        self.ticks += 1;
        let mut input = TickInput::default();
        if state.phase != GamePhase::Racing {
            return input;
        }

        let player_x = state.player.rect.center().x;
        let hazards = Self::hazards(state);
        let here = Self::clearance(state, &hazards, player_x);

        // Score every lane by clearance, preferring short moves
        let (road_left, _) = road_bounds();
        let lane_w = lane_width();
        let sway = ((self.ticks / 240) % 2) as f32 * 0.5;
        let best_lane = (0..LANE_COUNT)
            .map(|lane| road_left + (lane as f32 + 0.5) * lane_w)
            .map(|x| {
                let clear = Self::clearance(state, &hazards, x);
                let travel = (x - player_x).abs() / lane_w;
                (x, clear - travel * (20.0 + sway))
            })
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(x, _)| x)
            .unwrap_or(player_x);

        let invincible = state.player.is_invincible();
        let mut target = if here >= SAFE_CLEARANCE || invincible {
            // Safe: go get the nearest pickup instead
            Self::pickup_target(state)
                .filter(|&x| Self::clearance(state, &hazards, x) >= SAFE_CLEARANCE)
                .unwrap_or(player_x)
        } else {
            best_lane
        };
        let (min_x, max_x) = state.player.x_bounds();
        let half_w = state.player.rect.width() / 2.0;
        target = target.clamp(min_x + half_w, max_x + half_w);

        let error = target - player_x;
        input.left = error < -STEER_DEADZONE;
        input.right = error > STEER_DEADZONE;

        let blocked = !invincible && here < BRAKE_DISTANCE;
        input.brake = blocked;
        input.accelerate = !blocked;
        input.nitro = state.player.nitro >= NITRO_MAX && here >= LOOKAHEAD;
        input
    }
}

/// Replays a fixed list of inputs, then idles
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    inputs: Vec<TickInput>,
    cursor: usize,
}

impl ScriptedInput {
    pub fn new(inputs: Vec<TickInput>) -> Self {
        Self { inputs, cursor: 0 }
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, _state: &GameState) -> TickInput {
        let input = self.inputs.get(self.cursor).cloned().unwrap_or_default();
        self.cursor = (self.cursor + 1).min(self.inputs.len());
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::LevelTable;
    use crate::sim::{
        AutonomousVehicle, CarArchetype, Obstacle, SimContext, VehicleKind, tick,
    };
    use glam::Vec2;

    fn fresh(seed: u64) -> (GameState, SimContext, LevelTable) {
        let levels = LevelTable::builtin();
        let mut ctx = SimContext::new(seed);
        let state = GameState::new(CarArchetype::Standard, &levels, &mut ctx);
        (state, ctx, levels)
    }

    #[test]
    fn test_autopilot_open_road_accelerates() {
        let (state, _, _) = fresh(1);
        let input = Autopilot::new().poll(&state);
        assert!(input.accelerate);
        assert!(!input.brake);
        assert!(!input.left && !input.right);
    }

    #[test]
    fn test_autopilot_dodges_obstacle_ahead() {
        let (mut state, _, _) = fresh(2);
        let player = state.player.rect;
        let rect = Rect::from_center(
            Vec2::new(player.center().x, player.top() - 150.0),
            Vec2::new(60.0, 40.0),
        );
        state.obstacles.push(Obstacle { id: 1, rect });

        let input = Autopilot::new().poll(&state);
        assert!(input.left || input.right, "should steer out of the blocked lane");
    }

    #[test]
    fn test_autopilot_brakes_when_boxed_in() {
        let (mut state, mut ctx, _) = fresh(3);
        let (road_left, road_right) = road_bounds();
        // A wall of trucks just ahead across every lane
        let mut x = road_left + 36.0;
        let mut id = 1;
        while x < road_right {
            let mut truck =
                AutonomousVehicle::new_traffic(id, Vec2::ZERO, 0.5, &mut ctx.rng);
            truck.kind = VehicleKind::Truck;
            truck.rect = Rect::from_midtop(
                Vec2::new(x, state.player.rect.top() - 180.0),
                VehicleKind::Truck.size(),
            );
            state.traffic.push(truck);
            x += 72.0;
            id += 1;
        }

        let input = Autopilot::new().poll(&state);
        assert!(input.brake);
        assert!(!input.accelerate);
    }

    #[test]
    fn test_autopilot_idle_outside_racing() {
        let (mut state, _, _) = fresh(4);
        state.phase = GamePhase::Crashed;
        assert_eq!(Autopilot::new().poll(&state), TickInput::default());
    }

    #[test]
    fn test_autopilot_makes_progress() {
        let (mut state, mut ctx, levels) = fresh(5);
        let mut pilot = Autopilot::new();
        for _ in 0..600 {
            let input = pilot.poll(&state);
            tick(&mut state, &input, &levels, &mut ctx);
        }
        assert!(state.distance > 0.0 || state.level_index > 0);
    }

    #[test]
    fn test_scripted_replays_then_idles() {
        let (state, _, _) = fresh(6);
        let mut script = ScriptedInput::new(vec![
            TickInput {
                accelerate: true,
                ..Default::default()
            },
            TickInput {
                left: true,
                ..Default::default()
            },
        ]);
        assert!(script.poll(&state).accelerate);
        assert!(script.poll(&state).left);
        assert_eq!(script.poll(&state), TickInput::default());
        assert_eq!(script.poll(&state), TickInput::default());
    }
}
