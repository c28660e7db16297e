//! Weather: a slow random timer that swaps the shared grip factor

use rand::Rng;
use rand::seq::IndexedRandom;

use super::context::uniform;
use super::state::{GameEvent, GameState, Weather};
use glam::Vec2;

use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Timer range when a level starts
const INITIAL_INTERVAL: (f32, f32) = (15.0, 30.0);
/// Timer range after each change
const CHANGE_INTERVAL: (f32, f32) = (20.0, 40.0);

pub fn initial_timer<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    uniform(rng, INITIAL_INTERVAL.0, INITIAL_INTERVAL.1)
}

/// Count down and, on expiry, roll a new weather state
pub fn update<R: Rng + ?Sized>(state: &mut GameState, dt: f32, rng: &mut R) {
    state.weather_timer -= dt;
    if state.weather_timer > 0.0 {
        return;
    }

    let weather = *Weather::ALL.choose(rng).unwrap_or(&Weather::Clear);
    state.weather_timer = uniform(rng, CHANGE_INTERVAL.0, CHANGE_INTERVAL.1);
    apply(state, weather);

    let (label, color) = match weather {
        Weather::Rain => ("RAIN! Reduced Grip!", [150, 150, 200]),
        Weather::Fog => ("FOG! Low Visibility!", [180, 180, 180]),
        Weather::Clear => ("Clear Skies!", [200, 255, 200]),
    };
    state.float_text(
        Vec2::new(SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 4.0),
        label,
        color,
    );
    state.emit(GameEvent::WeatherChanged(weather));
    log::info!("Weather changed to {:?} (grip {})", weather, state.grip);
}

/// Set weather and the grip factor it implies
pub fn apply(state: &mut GameState, weather: Weather) {
    state.weather = weather;
    state.grip = weather.grip();
}

/// Back to clear skies with a fresh timer (level start/restart)
pub fn reset<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) {
    apply(state, Weather::Clear);
    state.weather_timer = initial_timer(rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::LevelTable;
    use crate::sim::context::SimContext;
    use crate::sim::state::CarArchetype;

    fn fresh(seed: u64) -> (GameState, SimContext) {
        let mut ctx = SimContext::new(seed);
        let state = GameState::new(CarArchetype::Standard, &LevelTable::builtin(), &mut ctx);
        (state, ctx)
    }

    #[test]
    fn test_initial_timer_range() {
        let (state, _) = fresh(3);
        assert!((15.0..30.0).contains(&state.weather_timer));
        assert_eq!(state.grip, 1.0);
    }

    #[test]
    fn test_rain_sets_grip_until_next_change() {
        let mut found = false;
        for seed in 0..64 {
            let (mut state, mut ctx) = fresh(seed);
            state.weather_timer = 0.0;
            update(&mut state, 0.01, &mut ctx.rng);
            if state.weather != Weather::Rain {
                continue;
            }
            found = true;
            assert_eq!(state.grip, 0.7);
            assert!((20.0..40.0).contains(&state.weather_timer));
            assert!(state.events.contains(&GameEvent::WeatherChanged(Weather::Rain)));

            // Stays wet until the timer runs out again
            for _ in 0..100 {
                update(&mut state, 0.1, &mut ctx.rng);
            }
            assert_eq!(state.weather, Weather::Rain);
            assert_eq!(state.grip, 0.7);
            break;
        }
        assert!(found, "no seed rolled rain");
    }

    #[test]
    fn test_fog_and_reset() {
        let (mut state, mut ctx) = fresh(9);
        apply(&mut state, Weather::Fog);
        assert_eq!(state.grip, 0.9);
        reset(&mut state, &mut ctx.rng);
        assert_eq!(state.weather, Weather::Clear);
        assert_eq!(state.grip, 1.0);
    }
}
