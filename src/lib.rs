//! Cosmic Runner - A story-driven endless runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (level generation, physics, collisions, run state)
//! - `tuning`: Data-driven physics and run configuration
//! - `contact`: Optional contact handle lookup for the goal screen
//! - `view`: Read-only snapshots for the presentation layer

pub mod contact;
pub mod sim;
pub mod tuning;
pub mod view;

pub use contact::{ContactHandle, GoalAction, goal_actions, resolve_contact};
pub use tuning::{Lives, Tuning};
pub use view::{Snapshot, Viewport};

/// Game configuration constants
///
/// All motion values are per simulation frame (60 Hz), in pixels.
pub mod consts {
    /// Fixed simulation timestep (one logical frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per animation frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Physics defaults
    pub const GRAVITY: f32 = 0.6;
    pub const HORIZONTAL_SPEED: f32 = 2.5;
    /// Negative is upward
    pub const JUMP_POWER: f32 = -17.0;
    pub const ACTOR_SIZE: f32 = 30.0;
    pub const FINAL_DISTANCE: f32 = 12_000.0;

    /// Actor spawn
    pub const ACTOR_START_X: f32 = 100.0;
    /// Spawn height above the bottom of the display
    pub const ACTOR_START_DROP: f32 = 200.0;

    /// Trail (cosmetic, positions supplied by the sim)
    pub const TRAIL_LENGTH: usize = 25;
    pub const TRAIL_SAMPLE_SPACING: f32 = 3.0;
    pub const TRAIL_START_ALPHA: f32 = 0.8;
    pub const TRAIL_ALPHA_DECAY: f32 = 0.05;

    /// Ground surface sits this far above the bottom of the display
    pub const GROUND_OFFSET: f32 = 100.0;
    /// How far below the previous frame's surface contact a landing is still accepted
    pub const LANDING_TOLERANCE: f32 = 10.0;
    /// Hit-box forgiveness on every side of a spike test
    pub const SPIKE_INSET: f32 = 5.0;
    /// Fall this far below the display to die
    pub const VOID_MARGIN: f32 = 100.0;

    /// Hole fall-through heuristic (play-feel tuning, keep as is)
    pub const HOLE_MIN_FALL_SPEED: f32 = 8.0;
    pub const HOLE_CHECK_HEIGHT: f32 = 200.0;
    pub const HOLE_BOTTOM_DEPTH: f32 = 150.0;
    pub const HOLE_LOOKAHEAD: f32 = 150.0;
    pub const HOLE_LOOKBEHIND: f32 = 50.0;

    /// Respawn placement
    pub const RESPAWN_ROLLBACK: f32 = 500.0;
    pub const RESPAWN_SEARCH_BEHIND: f32 = 100.0;
    pub const RESPAWN_SEARCH_AHEAD: f32 = 200.0;
    pub const RESPAWN_INSET: f32 = 50.0;
    pub const RESPAWN_DROP: f32 = 10.0;
    /// Frames spent in the death transition before the fail message
    pub const DEATH_TRANSITION_TICKS: u32 = 30;

    /// Score is one point per this many pixels travelled
    pub const SCORE_DIVISOR: f32 = 10.0;
    /// Camera keeps the actor at this fraction of the viewport width
    pub const CAMERA_LEAD: f32 = 0.2;
}

/// Score for a horizontal position (one point per ten pixels, never negative)
#[inline]
pub fn score_for_distance(x: f32) -> u64 {
    (x / consts::SCORE_DIVISOR).floor().max(0.0) as u64
}
