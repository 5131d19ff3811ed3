//! Collision and hazard resolution
//!
//! Runs once per frame after the actor has moved. Checks happen in a fixed
//! order: platform landing, ramps, spikes, the void, then the hole
//! fall-through heuristic. A death ends resolution for the frame.

use super::state::{Actor, DeathCause};
use super::track::{Platform, Track};
use crate::consts::*;

/// Result of resolving one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing notable (includes walking along a surface)
    None,
    /// Touched down this frame after being airborne
    Landed,
    /// Launched by a ramp
    Boosted,
    /// Hit a spike or fell out of the world
    Died(DeathCause),
    /// Fast fall into a hole with nothing beneath
    FellInHole,
}

impl Outcome {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Outcome::Died(_) | Outcome::FellInHole)
    }

    pub fn death_cause(&self) -> Option<DeathCause> {
        match self {
            Outcome::Died(cause) => Some(*cause),
            Outcome::FellInHole => Some(DeathCause::Hole),
            _ => None,
        }
    }
}

/// Resolve the actor against the track after `Actor::advance`
///
/// Mutates only the actor's vertical position, velocity and grounded flag.
pub fn resolve(actor: &mut Actor, track: &Track) -> Outcome {
    let was_grounded = actor.grounded;
    actor.grounded = false;

    let landed = land_on_platforms(actor, track);
    let boosted = apply_ramps(actor, track);

    if let Some(cause) = check_spikes(actor, track).or_else(|| check_void(actor, track)) {
        return Outcome::Died(cause);
    }
    if fell_in_hole(actor, track) {
        return Outcome::FellInHole;
    }

    if boosted {
        Outcome::Boosted
    } else if landed && !was_grounded {
        Outcome::Landed
    } else {
        Outcome::None
    }
}

/// Snap onto the first platform whose top band the actor crossed this frame
pub fn land_on_platforms(actor: &mut Actor, track: &Track) -> bool {
    if actor.vy < 0.0 {
        return false;
    }
    let rect = actor.rect();
    let bottom = rect.bottom();
    let previous_bottom = bottom - actor.vy;

    let hit = track.platforms.iter().find(|p| {
        rect.overlaps_x(&p.rect)
            && bottom > p.surface()
            && previous_bottom <= p.surface() + LANDING_TOLERANCE
    });

    match hit {
        Some(platform) => {
            actor.land_on(platform.surface());
            true
        }
        None => false,
    }
}

/// Ramp contact while not rising overrides vertical velocity
pub fn apply_ramps(actor: &mut Actor, track: &Track) -> bool {
    if actor.vy < 0.0 {
        return false;
    }
    let rect = actor.rect();
    match track.ramps.iter().find(|r| rect.overlaps(&r.rect)) {
        Some(ramp) => {
            actor.vy = ramp.boost_velocity;
            actor.grounded = false;
            true
        }
        None => false,
    }
}

pub fn check_spikes(actor: &Actor, track: &Track) -> Option<DeathCause> {
    let hitbox = actor.rect().inset(SPIKE_INSET);
    track
        .spikes
        .iter()
        .any(|s| hitbox.overlaps(&s.rect))
        .then_some(DeathCause::Spike)
}

pub fn check_void(actor: &Actor, track: &Track) -> Option<DeathCause> {
    (actor.pos.y > track.canvas_height + VOID_MARGIN).then_some(DeathCause::Void)
}

/// Safety net for fast falls between platforms near ground level
pub fn fell_in_hole(actor: &Actor, track: &Track) -> bool {
    let height = track.canvas_height;
    if actor.vy <= HOLE_MIN_FALL_SPEED
        || actor.pos.y <= height - HOLE_CHECK_HEIGHT
        || actor.bottom() <= height - HOLE_BOTTOM_DEPTH
    {
        return false;
    }

    let center_x = actor.center_x();
    let bottom = actor.bottom();
    !track.platforms.iter().any(|p| {
        p.rect.spans_x(center_x)
            && bottom < p.surface() + HOLE_LOOKAHEAD
            && p.surface() > bottom - HOLE_LOOKBEHIND
    })
}

/// Walkable platform to respawn on near `x`
///
/// First ground-level platform meeting the search window around `x`, else the
/// one whose start is closest to `x`. `None` only for a track without ground.
pub fn respawn_target(track: &Track, x: f32) -> Option<&Platform> {
    track
        .walkable()
        .find(|p| {
            p.rect.left() <= x + RESPAWN_SEARCH_AHEAD
                && p.rect.right() >= x - RESPAWN_SEARCH_BEHIND
        })
        .or_else(|| {
            track
                .walkable()
                .min_by(|a, b| (a.rect.x - x).abs().total_cmp(&(b.rect.x - x).abs()))
        })
}
