//! Error taxonomy for the fallible edges of the crate
//!
//! The simulation tick itself never fails; only configuration loading,
//! car selection, snapshots and leaderboard storage surface errors.

use std::fmt;
use std::io;

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Json(serde_json::Error),
    EmptyLevelTable,
    InvalidLevel { index: usize, reason: &'static str },
    SnapshotVersion { found: u32, expected: u32 },
    UnknownCar(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "i/o error: {err}"),
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::EmptyLevelTable => write!(f, "level table has no levels"),
            Self::InvalidLevel { index, reason } => {
                write!(f, "level {index} is invalid: {reason}")
            }
            Self::SnapshotVersion { found, expected } => write!(
                f,
                "unsupported snapshot version: {found} (expected {expected})"
            ),
            Self::UnknownCar(name) => write!(f, "unknown car {name:?}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
