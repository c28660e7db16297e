//! Level table
//!
//! Levels are an ordered, immutable sequence consumed by index. An index past
//! the end means the run is complete.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Difficulty and pacing for one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDescriptor {
    pub name: String,
    /// Distance to cover before the level completes
    pub distance_goal: f32,
    /// Traffic spawns per ~1.1 s
    pub traffic_rate: f32,
    /// Speed cap for a baseline car
    pub max_speed: f32,
    /// Orb spawns per ~2.1 s
    pub orb_rate: f32,
    pub near_miss_bonus: u32,
    /// Backdrop tag for the renderer
    pub background_theme: String,
    /// How aggressively traffic wanders and changes lanes
    pub activity: f32,
}

impl LevelDescriptor {
    #[allow(clippy::too_many_arguments)]
    fn builtin(
        name: &str,
        distance_goal: f32,
        traffic_rate: f32,
        max_speed: f32,
        orb_rate: f32,
        near_miss_bonus: u32,
        activity: f32,
        background_theme: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            distance_goal,
            traffic_rate,
            max_speed,
            orb_rate,
            near_miss_bonus,
            background_theme: background_theme.to_string(),
            activity,
        }
    }

    fn validate(&self, index: usize) -> Result<()> {
        let invalid = |reason| Err(Error::InvalidLevel { index, reason });
        if self.distance_goal <= 0.0 {
            return invalid("distance goal must be positive");
        }
        if self.traffic_rate <= 0.0 {
            return invalid("traffic rate must be positive");
        }
        if self.orb_rate <= 0.0 {
            return invalid("orb rate must be positive");
        }
        if self.max_speed <= crate::consts::PLAYER_MIN_SPEED {
            return invalid("speed cap must exceed the minimum player speed");
        }
        if self.activity < 0.0 {
            return invalid("activity must not be negative");
        }
        Ok(())
    }
}

/// Ordered level sequence; deserializing goes through the same validation as `new`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LevelDescriptor>", into = "Vec<LevelDescriptor>")]
pub struct LevelTable {
    levels: Vec<LevelDescriptor>,
}

impl TryFrom<Vec<LevelDescriptor>> for LevelTable {
    type Error = Error;

    fn try_from(levels: Vec<LevelDescriptor>) -> Result<Self> {
        Self::new(levels)
    }
}

impl From<LevelTable> for Vec<LevelDescriptor> {
    fn from(table: LevelTable) -> Self {
        table.levels
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LevelTable {
    /// Build a table, rejecting empty or nonsensical levels
    pub fn new(levels: Vec<LevelDescriptor>) -> Result<Self> {
        if levels.is_empty() {
            return Err(Error::EmptyLevelTable);
        }
        for (index, level) in levels.iter().enumerate() {
            level.validate(index)?;
        }
        Ok(Self { levels })
    }

    /// The stock campaign
    pub fn builtin() -> Self {
        let l = LevelDescriptor::builtin;
        Self {
            levels: vec![
                l("Neon Warmup", 1200.0, 1.0, 260.0, 0.55, 30, 0.35, "city"),
                l("City Pulse", 1600.0, 1.4, 290.0, 0.65, 35, 0.45, "city"),
                l("Cyber Tunnel", 2000.0, 1.9, 320.0, 0.75, 40, 0.55, "city"),
                l("Starlit Bridge", 2400.0, 2.6, 350.0, 0.85, 45, 0.70, "bridge"),
                l("Quantum Strip", 2800.0, 3.3, 380.0, 0.95, 50, 0.85, "futuristic"),
                l("Violet Overdrive", 3200.0, 4.1, 410.0, 1.00, 55, 1.00, "city"),
                l("Abyss Express", 3600.0, 4.9, 440.0, 1.05, 60, 1.15, "abyss"),
                l("Midnight Crown", 4000.0, 5.7, 480.0, 1.10, 70, 1.30, "city"),
                l("Desert Mirage", 4500.0, 3.0, 300.0, 0.60, 40, 0.40, "desert"),
                l("Mountain Pass", 5000.0, 3.8, 330.0, 0.70, 45, 0.60, "mountain"),
                l("Ocean Drive", 5500.0, 4.5, 360.0, 0.80, 50, 0.75, "ocean"),
                l("Volcanic Trail", 6000.0, 5.2, 390.0, 0.90, 55, 0.90, "volcano"),
                l("Cosmic Highway", 6500.0, 6.0, 420.0, 1.00, 60, 1.00, "cosmic"),
            ],
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let levels: Vec<LevelDescriptor> = serde_json::from_str(json)?;
        Self::new(levels)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let table = Self::from_json(&json)?;
        log::info!("Loaded {} levels from {}", table.len(), path.display());
        Ok(table)
    }

    /// Level at `index`, or None once the campaign is finished
    pub fn get(&self, index: u32) -> Option<&LevelDescriptor> {
        self.levels.get(index as usize)
    }

    /// Clamped lookup for code paths that must always have a level
    pub fn get_or_last(&self, index: u32) -> &LevelDescriptor {
        let last = self.levels.len() - 1;
        &self.levels[(index as usize).min(last)]
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn is_last(&self, index: u32) -> bool {
        index as usize + 1 >= self.levels.len()
    }
}
