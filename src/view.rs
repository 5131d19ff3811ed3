//! Read-only frame snapshot for the presentation layer
//!
//! Everything a renderer or HUD needs for one frame, already culled to the
//! camera window. Nothing here feeds back into the simulation.

use glam::Vec2;
use serde::Serialize;

use crate::consts::CAMERA_LEAD;
use crate::sim::{GameSession, Platform, Ramp, RunPhase, Spike, TrailPoint};
use crate::tuning::Lives;

pub use crate::sim::geometry::Viewport;

/// Extra horizontal margin when culling small hazards
pub const HAZARD_CULL_MARGIN: f32 = 50.0;

/// Actor look, swapped once the run passes its half-way point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AppearanceStage {
    Early,
    Late,
}

impl AppearanceStage {
    pub fn for_distance(x: f32, final_distance: f32) -> Self {
        if x >= final_distance / 2.0 {
            AppearanceStage::Late
        } else {
            AppearanceStage::Early
        }
    }
}

/// One frame of state, in world coordinates with the camera offset alongside
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// World x of the left edge of the view
    pub camera_x: f32,
    pub viewport: Viewport,
    pub platforms: Vec<Platform>,
    pub spikes: Vec<Spike>,
    pub ramps: Vec<Ramp>,
    pub actor_pos: Vec2,
    pub actor_size: f32,
    pub appearance: AppearanceStage,
    pub trail: Vec<TrailPoint>,
    pub score: u64,
    /// Goal progress percentage `[0, 100]`
    pub progress: f32,
    pub lives: Lives,
    pub paused: bool,
    pub phase: RunPhase,
}

impl Snapshot {
    pub fn capture(session: &GameSession) -> Self {
        let viewport = session.viewport();
        let actor = session.actor();
        let track = session.track();
        let camera_x = actor.pos.x - viewport.width * CAMERA_LEAD;
        let view_end = camera_x + viewport.width;

        Self {
            camera_x,
            viewport,
            platforms: track.platforms_in(camera_x, view_end).cloned().collect(),
            spikes: track
                .spikes_in(camera_x - HAZARD_CULL_MARGIN, view_end + HAZARD_CULL_MARGIN)
                .copied()
                .collect(),
            ramps: track
                .ramps_in(camera_x - HAZARD_CULL_MARGIN, view_end + HAZARD_CULL_MARGIN)
                .copied()
                .collect(),
            actor_pos: actor.pos,
            actor_size: actor.size,
            appearance: AppearanceStage::for_distance(actor.pos.x, track.final_distance),
            trail: actor.trail.iter().copied().collect(),
            score: session.score(),
            progress: session.progress(),
            lives: session.lives(),
            paused: session.is_paused(),
            phase: session.phase(),
        }
    }

    /// World x to screen x
    #[inline]
    pub fn to_screen_x(&self, world_x: f32) -> f32 {
        world_x - self.camera_x
    }
}

impl GameSession {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }
}
