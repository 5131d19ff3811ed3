//! Static level geometry
//!
//! A `Track` is rebuilt at the start of every run and never mutated during it.

use serde::{Deserialize, Serialize};

use super::geometry::Rect;

/// Platform types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformKind {
    /// Ground-level segment of the main path
    Ground,
    /// Elevated helper platform
    Floating,
    /// Final ground platform at the goal distance
    Goal,
}

impl PlatformKind {
    /// Ground-level and safe to respawn on
    pub fn is_walkable(&self) -> bool {
        matches!(self, PlatformKind::Ground | PlatformKind::Goal)
    }
}

/// A solid-topped platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Rect,
    pub kind: PlatformKind,
}

impl Platform {
    pub fn new(x: f32, y: f32, w: f32, h: f32, kind: PlatformKind) -> Self {
        Self {
            rect: Rect::new(x, y, w, h),
            kind,
        }
    }

    /// Surface height (top edge)
    #[inline]
    pub fn surface(&self) -> f32 {
        self.rect.top()
    }
}

/// A deadly spike
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spike {
    pub rect: Rect,
}

/// A boost ramp: overrides vertical velocity on contact
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ramp {
    pub rect: Rect,
    /// Vertical velocity applied on contact (negative is up)
    pub boost_velocity: f32,
}

/// A hole in the ground path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub x: f32,
    pub width: f32,
}

impl Gap {
    #[inline]
    pub fn end(&self) -> f32 {
        self.x + self.width
    }
}

/// Generated level layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Display height the track was generated for (ground sits relative to it)
    pub canvas_height: f32,
    /// Goal distance
    pub final_distance: f32,
    /// Platforms in emission order (ground segment first, then its floaters)
    pub platforms: Vec<Platform>,
    pub spikes: Vec<Spike>,
    pub ramps: Vec<Ramp>,
    /// Holes in the ground path, in increasing x
    pub gaps: Vec<Gap>,
}

impl Track {
    pub fn new(canvas_height: f32, final_distance: f32) -> Self {
        Self {
            canvas_height,
            final_distance,
            ..Default::default()
        }
    }

    /// The goal platform, if present
    pub fn goal(&self) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.kind == PlatformKind::Goal)
    }

    /// Ground-level platforms in x order
    pub fn walkable(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter().filter(|p| p.kind.is_walkable())
    }

    /// Platforms meeting the horizontal window `[min, max]`
    pub fn platforms_in(&self, min: f32, max: f32) -> impl Iterator<Item = &Platform> {
        self.platforms.iter().filter(move |p| p.rect.within_x(min, max))
    }

    pub fn spikes_in(&self, min: f32, max: f32) -> impl Iterator<Item = &Spike> {
        self.spikes.iter().filter(move |s| s.rect.within_x(min, max))
    }

    pub fn ramps_in(&self, min: f32, max: f32) -> impl Iterator<Item = &Ramp> {
        self.ramps.iter().filter(move |r| r.rect.within_x(min, max))
    }

    /// Ground platform hosting a point on the main path
    pub fn ground_at(&self, x: f32) -> Option<&Platform> {
        self.walkable()
            .find(|p| x >= p.rect.left() && x < p.rect.right())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Track {
        let mut track = Track::new(600.0, 2000.0);
        track
            .platforms
            .push(Platform::new(0.0, 500.0, 600.0, 500.0, PlatformKind::Ground));
        track
            .platforms
            .push(Platform::new(200.0, 370.0, 150.0, 20.0, PlatformKind::Floating));
        track
            .platforms
            .push(Platform::new(680.0, 500.0, 1320.0, 500.0, PlatformKind::Ground));
        track
            .platforms
            .push(Platform::new(2000.0, 500.0, 1000.0, 500.0, PlatformKind::Goal));
        track.gaps.push(Gap {
            x: 600.0,
            width: 80.0,
        });
        track
    }

    #[test]
    fn test_goal_lookup() {
        let track = sample();
        assert_eq!(track.goal().map(|g| g.rect.x), Some(2000.0));
    }

    #[test]
    fn test_ground_at_skips_floating_and_gaps() {
        let track = sample();
        assert_eq!(track.ground_at(250.0).map(|p| p.kind), Some(PlatformKind::Ground));
        assert!(track.ground_at(640.0).is_none());
        assert_eq!(track.ground_at(2500.0).map(|p| p.kind), Some(PlatformKind::Goal));
    }

    #[test]
    fn test_window_culling() {
        let track = sample();
        assert_eq!(track.platforms_in(610.0, 670.0).count(), 0);
        assert_eq!(track.platforms_in(100.0, 300.0).count(), 2);
    }
}
