//! Run state and core simulation types
//!
//! `GameSession` owns everything a run mutates: the track, the actor, the
//! story script, the run phase and the seeded RNG.

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::{Rect, Viewport};
use super::level::{TrackGenerator, validate_track};
use super::story::StoryScript;
use super::track::Track;
use crate::consts::*;
use crate::tuning::{Lives, Tuning};

/// Why a run is paused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PauseReason {
    /// A story message is on screen; resumes on dismissal
    Story { index: usize, is_final: bool },
    /// Fail message is on screen; resumes on respawn confirmation
    AwaitingRespawn,
    /// Limited lives ran out; only a new run leaves this
    OutOfLives,
    /// Actor stands on the goal platform; only a new run leaves this
    GoalReached,
}

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Waiting for the first start request
    Idle,
    /// Active gameplay
    Running,
    Paused(PauseReason),
    /// Actor just died; frozen until the countdown ends
    DeadTransitioning { ticks_remaining: u32 },
}

/// What killed the actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Spike,
    /// Fell below the display
    Void,
    /// Fast fall into a hole with nothing beneath
    Hole,
}

/// Effect requests for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    RunStarted { seed: u64, run: u32 },
    Jumped { pos: Vec2 },
    Landed { pos: Vec2 },
    Boosted { pos: Vec2 },
    Died { cause: DeathCause, pos: Vec2 },
    ShowFailMessage { text: String },
    ShowStory { index: usize, text: String, is_final: bool },
    Respawned { pos: Vec2 },
    GoalReached { score: u64 },
    OutOfLives,
}

/// Trail point for actor rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    /// Fades by a fixed step each frame; dropped at zero
    pub alpha: f32,
}

/// The player-controlled runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// Top-left corner of the bounding box
    pub pos: Vec2,
    /// Vertical velocity (positive is down)
    pub vy: f32,
    /// Constant rightward speed
    pub horizontal_speed: f32,
    /// Bounding box edge length
    pub size: f32,
    /// Resting on a platform surface, eligible to jump
    pub grounded: bool,
    /// Recent positions, oldest first
    pub trail: VecDeque<TrailPoint>,
    trail_capacity: usize,
    last_sample_x: f32,
}

impl Actor {
    pub fn new(pos: Vec2, tuning: &Tuning) -> Self {
        Self {
            pos,
            vy: 0.0,
            horizontal_speed: tuning.horizontal_speed,
            size: tuning.actor_size,
            grounded: false,
            trail: VecDeque::with_capacity(tuning.trail_capacity),
            trail_capacity: tuning.trail_capacity,
            last_sample_x: pos.x,
        }
    }

    /// Bounding box
    pub fn rect(&self) -> Rect {
        Rect::square(self.pos, self.size)
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.pos.x + self.size / 2.0
    }

    /// Advance one frame
    pub fn advance(&mut self, gravity: f32, horizontal_speed: f32) {
        self.vy += gravity;
        self.pos.y += self.vy;
        self.pos.x += horizontal_speed;
        self.record_trail();
    }

    /// Start a jump if grounded. No double jumps.
    pub fn jump(&mut self, jump_power: f32) -> bool {
        if !self.grounded {
            return false;
        }
        self.vy = jump_power;
        self.grounded = false;
        true
    }

    /// Reposition in place (respawn): velocity, contact and trail are cleared
    pub fn place(&mut self, pos: Vec2) {
        self.pos = pos;
        self.vy = 0.0;
        self.grounded = false;
        self.clear_trail();
    }

    /// Snap onto a surface
    pub fn land_on(&mut self, surface_y: f32) {
        self.pos.y = surface_y - self.size;
        self.vy = 0.0;
        self.grounded = true;
    }

    /// Sample position every few pixels of travel, then fade everything
    fn record_trail(&mut self) {
        if self.pos.x - self.last_sample_x >= TRAIL_SAMPLE_SPACING {
            self.last_sample_x = self.pos.x;
            self.trail.push_back(TrailPoint {
                pos: self.pos,
                alpha: TRAIL_START_ALPHA,
            });
            while self.trail.len() > self.trail_capacity {
                self.trail.pop_front();
            }
        }
        for point in self.trail.iter_mut() {
            point.alpha -= TRAIL_ALPHA_DECAY;
        }
        self.trail.retain(|p| p.alpha > 0.0);
    }

    /// Trail-free copy for look-ahead simulation
    pub(crate) fn ghost(&self) -> Self {
        Self {
            trail: VecDeque::new(),
            trail_capacity: 0,
            ..self.clone()
        }
    }

    pub fn clear_trail(&mut self) {
        self.trail.clear();
        self.last_sample_x = self.pos.x;
    }
}

/// One game session: owns the run state and everything it mutates
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Session seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub(crate) tuning: Tuning,
    pub(crate) story: StoryScript,
    pub(crate) track: Track,
    pub(crate) actor: Actor,
    pub(crate) phase: RunPhase,
    pub(crate) lives: Lives,
    pub(crate) score: u64,
    pub(crate) progress: f32,
    /// Simulation frames while running
    pub(crate) time_ticks: u64,
    /// Runs started this session
    pub(crate) runs: u32,
    pub(crate) viewport: Viewport,
    pub(crate) events: Vec<GameEvent>,
}

impl GameSession {
    /// Create an idle session; the track is generated on `start`
    pub fn new(seed: u64, tuning: Tuning, story: StoryScript, viewport: Viewport) -> Self {
        let actor = Actor::new(spawn_point(viewport.height), &tuning);
        let lives = tuning.lives;
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            track: Track::new(viewport.height, tuning.final_distance),
            tuning,
            story,
            actor,
            phase: RunPhase::Idle,
            lives,
            score: 0,
            progress: 0.0,
            time_ticks: 0,
            runs: 0,
            viewport,
            events: Vec::new(),
        }
    }

    /// Running session on a prebuilt track
    pub fn with_track(seed: u64, tuning: Tuning, story: StoryScript, track: Track) -> Self {
        let viewport = Viewport::new(Viewport::default().width, track.canvas_height);
        let mut session = Self::new(seed, tuning, story, viewport);
        session.track = track;
        session.phase = RunPhase::Running;
        session.runs = 1;
        session
    }

    /// Begin a new run: fresh track, actor, story and lives
    pub fn start(&mut self) {
        self.story.reset();
        let generator = TrackGenerator::new(&self.tuning, &self.story.trigger_positions());
        self.track = generator.generate(
            &mut self.rng,
            self.viewport.height,
            self.tuning.final_distance,
        );
        if let Err(e) = validate_track(&self.track, generator.envelope()) {
            log::warn!("Generated track violates an invariant: {}", e);
        }
        self.actor = Actor::new(spawn_point(self.viewport.height), &self.tuning);
        self.lives = self.tuning.lives;
        self.score = 0;
        self.progress = 0.0;
        self.time_ticks = 0;
        self.runs += 1;
        self.phase = RunPhase::Running;

        log::info!(
            "Run {} started (seed {}): {} platforms, {} gaps, {} spikes, {} ramps",
            self.runs,
            self.seed,
            self.track.platforms.len(),
            self.track.gaps.len(),
            self.track.spikes.len(),
            self.track.ramps.len()
        );
        self.push_event(GameEvent::RunStarted {
            seed: self.seed,
            run: self.runs,
        });
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn story(&self) -> &StoryScript {
        &self.story
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Goal progress percentage `[0, 100]`
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn lives(&self) -> Lives {
        self.lives
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_paused(&self) -> bool {
        matches!(
            self.phase,
            RunPhase::Paused(_) | RunPhase::DeadTransitioning { .. }
        )
    }

    /// Change the display size. The running track keeps the height it was built for.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Take all effect requests emitted since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

/// Where a new run's actor appears (drops onto the first platform)
pub(crate) fn spawn_point(canvas_height: f32) -> Vec2 {
    Vec2::new(ACTOR_START_X, canvas_height - ACTOR_START_DROP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_integrates_per_frame() {
        let tuning = Tuning::default();
        let mut actor = Actor::new(Vec2::new(100.0, 100.0), &tuning);
        actor.advance(0.6, 2.5);
        assert_eq!(actor.vy, 0.6);
        assert_eq!(actor.pos.x, 102.5);
        assert!((actor.pos.y - 100.6).abs() < 1e-4);
        actor.advance(0.6, 2.5);
        assert_eq!(actor.vy, 1.2);
        assert!((actor.pos.y - 101.8).abs() < 1e-4);
        assert_eq!(actor.pos.x, 105.0);
    }

    #[test]
    fn test_jump_only_when_grounded() {
        let tuning = Tuning::default();
        let mut actor = Actor::new(Vec2::new(0.0, 0.0), &tuning);
        actor.vy = 3.0;
        assert!(!actor.jump(-17.0));
        assert_eq!(actor.vy, 3.0);

        actor.land_on(100.0);
        assert!(actor.grounded);
        assert_eq!(actor.bottom(), 100.0);
        assert!(actor.jump(-17.0));
        assert_eq!(actor.vy, -17.0);
        assert!(!actor.grounded);

        // No double jump
        assert!(!actor.jump(-17.0));
        assert_eq!(actor.vy, -17.0);
    }

    #[test]
    fn test_trail_is_bounded_and_fades() {
        let tuning = Tuning {
            trail_capacity: 5,
            ..Default::default()
        };
        let mut actor = Actor::new(Vec2::new(0.0, 0.0), &tuning);
        for _ in 0..50 {
            actor.advance(0.0, 4.0);
            assert!(actor.trail.len() <= 5);
            assert!(actor.trail.iter().all(|p| p.alpha > 0.0));
        }
        // Oldest first
        let xs: Vec<f32> = actor.trail.iter().map(|p| p.pos.x).collect();
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*xs.last().unwrap(), actor.pos.x);
    }

    #[test]
    fn test_trail_fades_out_when_stopped() {
        let tuning = Tuning::default();
        let mut actor = Actor::new(Vec2::new(0.0, 0.0), &tuning);
        for _ in 0..5 {
            actor.advance(0.0, 4.0);
        }
        assert!(!actor.trail.is_empty());
        for _ in 0..20 {
            actor.advance(0.0, 0.0);
        }
        assert!(actor.trail.is_empty());
    }

    #[test]
    fn test_place_resets_motion() {
        let tuning = Tuning::default();
        let mut actor = Actor::new(Vec2::new(0.0, 0.0), &tuning);
        actor.land_on(50.0);
        for _ in 0..5 {
            actor.advance(0.6, 4.0);
        }
        actor.place(Vec2::new(300.0, 10.0));
        assert_eq!(actor.pos, Vec2::new(300.0, 10.0));
        assert_eq!(actor.vy, 0.0);
        assert!(!actor.grounded);
        assert!(actor.trail.is_empty());
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = GameSession::new(
            7,
            Tuning::default(),
            StoryScript::default(),
            Viewport::new(800.0, 600.0),
        );
        assert_eq!(session.phase(), RunPhase::Idle);
        assert_eq!(session.actor().pos, Vec2::new(100.0, 400.0));
        assert!(session.track().platforms.is_empty());
        assert!(!session.is_paused());
    }

    #[test]
    fn test_start_builds_track() {
        let mut session = GameSession::new(
            7,
            Tuning::default(),
            StoryScript::default(),
            Viewport::new(800.0, 600.0),
        );
        session.start();
        assert_eq!(session.phase(), RunPhase::Running);
        assert!(session.track().goal().is_some());
        assert_eq!(session.track().canvas_height, 600.0);
        let events = session.drain_events();
        assert_eq!(events, vec![GameEvent::RunStarted { seed: 7, run: 1 }]);
        assert!(session.drain_events().is_empty());
    }
}
