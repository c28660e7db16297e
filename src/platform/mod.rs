//! Platform abstraction layer
//!
//! The collaborators around the simulation:
//! - Input sources (autopilot, scripted replay)
//! - Renderers (headless log output)
//! - Frame clock (fixed-step accumulator)

pub mod clock;
pub mod input;
pub mod render;

pub use clock::FixedStep;
pub use input::{Autopilot, InputSource, ScriptedInput};
pub use render::{Hud, LogRenderer, NullRenderer, Renderer};
