//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed per-frame step only
//! - Seeded RNG only
//! - Stable iteration order (track emission order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod geometry;
pub mod level;
pub mod state;
pub mod story;
pub mod tick;
pub mod track;

pub use collision::{Outcome, resolve, respawn_target};
pub use geometry::{Rect, Viewport};
pub use level::{JumpEnvelope, TrackError, TrackGenerator, validate_track};
pub use state::{
    Actor, DeathCause, GameEvent, GameSession, PauseReason, RunPhase, TrailPoint,
};
pub use story::{StoryMessage, StoryScript, TriggeredMessage, compute_progress};
pub use tick::{TickInput, tick};
pub use track::{Gap, Platform, PlatformKind, Ramp, Spike, Track};
