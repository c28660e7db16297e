//! Snapshots of a running simulation
//!
//! A snapshot captures the full `GameState` together with its `SimContext`
//! (seed, RNG position, clock), so a restored run continues tick-for-tick
//! exactly like the uninterrupted run. Snapshots use a versioned JSON envelope.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sim::{GameState, SimContext};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Versioned envelope around state and context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub state: GameState,
    pub ctx: SimContext,
}

/// Header read first so an unknown version is reported before the body fails
#[derive(Deserialize)]
struct Header {
    version: u32,
}

impl Snapshot {
    pub fn capture(state: &GameState, ctx: &SimContext) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            state: state.clone(),
            ctx: ctx.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let header: Header = serde_json::from_str(json)?;
        if header.version != SNAPSHOT_VERSION {
            return Err(Error::SnapshotVersion {
                found: header.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Hand back the state and context to resume ticking
    pub fn restore(self) -> (GameState, SimContext) {
        (self.state, self.ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::LevelTable;
    use crate::sim::{CarArchetype, TickInput, tick};

    #[test]
    fn test_restored_run_matches_uninterrupted() {
        let levels = LevelTable::builtin();
        let mut ctx = SimContext::new(2024);
        let mut state = GameState::new(CarArchetype::Sport, &levels, &mut ctx);
        let drive = TickInput {
            accelerate: true,
            ..Default::default()
        };
        for _ in 0..180 {
            tick(&mut state, &drive, &levels, &mut ctx);
        }

        let json = Snapshot::capture(&state, &ctx).to_json().unwrap();
        let (mut restored, mut restored_ctx) = Snapshot::from_json(&json).unwrap().restore();

        let weave = [
            TickInput {
                accelerate: true,
                left: true,
                ..Default::default()
            },
            TickInput {
                right: true,
                ..Default::default()
            },
        ];
        for i in 0..600 {
            let input = &weave[(i / 45) % weave.len()];
            tick(&mut state, input, &levels, &mut ctx);
            tick(&mut restored, input, &levels, &mut restored_ctx);
        }

        assert_eq!(
            serde_json::to_string(&state).unwrap(),
            serde_json::to_string(&restored).unwrap()
        );
        assert_eq!(ctx, restored_ctx);
    }

    #[test]
    fn test_unknown_version_rejected() {
        let levels = LevelTable::builtin();
        let mut ctx = SimContext::new(1);
        let state = GameState::new(CarArchetype::Standard, &levels, &mut ctx);
        let mut snapshot = Snapshot::capture(&state, &ctx);
        snapshot.version = 99;
        let json = snapshot.to_json().unwrap();

        match Snapshot::from_json(&json) {
            Err(Error::SnapshotVersion { found, expected }) => {
                assert_eq!(found, 99);
                assert_eq!(expected, SNAPSHOT_VERSION);
            }
            other => panic!("expected version error, got {:?}", other.map(|s| s.version)),
        }
    }

    #[test]
    fn test_garbage_is_json_error() {
        assert!(matches!(Snapshot::from_json("[1, 2"), Err(Error::Json(_))));
    }
}
