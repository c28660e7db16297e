//! A playing session: state, context and collaborators driven frame by frame
//!
//! Each finished attempt (crash, win or time-out) submits its score to the
//! scoreboard. After a crash the session restarts the level if attempts
//! remain.

use crate::levels::LevelTable;
use crate::platform::{FixedStep, Hud, InputSource, Renderer};
use crate::scoreboard::Scoreboard;
use crate::sim::{CarArchetype, GameEvent, GamePhase, GameState, SimContext, TickOutcome, tick};

/// Limits for a headless session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Seconds of frame time before the session quits, paused or not
    pub seconds: f32,
    /// Attempts before giving up after crashes
    pub attempts: u32,
    /// Name submitted to the scoreboard
    pub player_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seconds: 120.0,
            attempts: 3,
            player_name: "Racer".to_string(),
        }
    }
}

/// How an attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptEnd {
    Crashed,
    Won,
    TimeUp,
}

/// One finished attempt
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptResult {
    pub end: AttemptEnd,
    pub score: u64,
    /// 1-based level reached
    pub level: u32,
}

/// What a whole session produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSummary {
    pub attempts: Vec<AttemptResult>,
    pub ticks: u64,
    pub levels_completed: u32,
}

impl SessionSummary {
    pub fn best_score(&self) -> u64 {
        self.attempts.iter().map(|a| a.score).max().unwrap_or(0)
    }
}

pub struct Session {
    pub state: GameState,
    pub ctx: SimContext,
    levels: LevelTable,
    clock: FixedStep,
}

impl Session {
    pub fn new(car: CarArchetype, levels: LevelTable, seed: u64) -> Self {
        let mut ctx = SimContext::new(seed);
        let state = GameState::new(car, &levels, &mut ctx);
        log::info!(
            "New session: {} car, seed {:#x}, {} levels",
            car.as_str(),
            seed,
            levels.len()
        );
        Self {
            state,
            ctx,
            levels,
            clock: FixedStep::default(),
        }
    }

    /// Run at one tick per frame until time, attempts or the campaign run out
    pub fn run(
        &mut self,
        config: &SessionConfig,
        input: &mut dyn InputSource,
        renderer: &mut dyn Renderer,
        scoreboard: &mut dyn Scoreboard,
    ) -> SessionSummary {
        let frame_dt = self.clock.step();
        self.run_frames(config, input, renderer, scoreboard, || frame_dt)
    }

    /// Run with frame times supplied by `next_frame` (wall clock, replay, ...)
    pub fn run_frames(
        &mut self,
        config: &SessionConfig,
        input: &mut dyn InputSource,
        renderer: &mut dyn Renderer,
        scoreboard: &mut dyn Scoreboard,
        mut next_frame: impl FnMut() -> f32,
    ) -> SessionSummary {
        let mut summary = SessionSummary::default();
        let attempts = config.attempts.max(1);
        let mut restart_pending = false;
        // Frame time, not ctx.elapsed: the sim clock stops while paused
        let mut session_time = 0.0_f64;

        'frames: loop {
            let time_up = session_time >= config.seconds as f64;
            let substeps = if time_up {
                1
            } else {
                let frame_dt = next_frame();
                session_time += frame_dt as f64;
                self.clock.advance(frame_dt)
            };

            for _ in 0..substeps {
                let mut cmd = input.poll(&self.state);
                cmd.quit |= time_up;
                // Restarts go through the regular input path
                cmd.restart |= std::mem::take(&mut restart_pending);

                if tick(&mut self.state, &cmd, &self.levels, &mut self.ctx) == TickOutcome::Quit {
                    if matches!(self.state.phase, GamePhase::Racing | GamePhase::Paused) {
                        self.finish_attempt(AttemptEnd::TimeUp, config, scoreboard, &mut summary);
                    }
                    break 'frames;
                }
                summary.ticks += 1;
                summary.levels_completed += self
                    .state
                    .events
                    .iter()
                    .filter(|e| matches!(e, GameEvent::LevelComplete { .. }))
                    .count() as u32;

                match self.state.phase {
                    GamePhase::Crashed => {
                        self.finish_attempt(AttemptEnd::Crashed, config, scoreboard, &mut summary);
                        if summary.attempts.len() as u32 >= attempts {
                            break 'frames;
                        }
                        restart_pending = true;
                    }
                    GamePhase::GameWon => {
                        self.finish_attempt(AttemptEnd::Won, config, scoreboard, &mut summary);
                        break 'frames;
                    }
                    GamePhase::Racing | GamePhase::Paused => {}
                }
            }

            let hud = Hud::from_state(&self.state, &self.levels);
            renderer.present(&self.state, &hud);
        }

        summary
    }

    fn finish_attempt(
        &self,
        end: AttemptEnd,
        config: &SessionConfig,
        scoreboard: &mut dyn Scoreboard,
        summary: &mut SessionSummary,
    ) {
        let result = AttemptResult {
            end,
            score: self.state.display_score(),
            level: (self.state.level_index + 1).min(self.levels.len() as u32),
        };
        log::info!(
            "Attempt {} ended ({:?}) on level {} with score {}",
            summary.attempts.len() + 1,
            end,
            result.level,
            result.score
        );
        scoreboard.submit(&config.player_name, result.score);
        summary.attempts.push(result);
    }
}
