//! Procedural level generation
//!
//! Walks a cursor from 0 to the goal distance emitting ground segments and
//! gaps, then decorates each segment with spikes, ramps and floating
//! platforms. Randomized parameters, deterministic shape: the caller supplies
//! the RNG, and every gap is sized from the actor's jump envelope so it can
//! always be jumped and never be skipped without jumping.

use rand::Rng;
use thiserror::Error;

use super::geometry::Rect;
use super::track::{Gap, Platform, PlatformKind, Ramp, Spike, Track};
use crate::consts::*;
use crate::tuning::Tuning;

/// Ground segments are this tall (they extend below the display)
pub const GROUND_HEIGHT: f32 = 500.0;
/// Hazards and floaters are suppressed this close to a story trigger
pub const SAFE_ZONE_RADIUS: f32 = 300.0;
/// Gaps are suppressed this close to a story trigger
pub const MESSAGE_GAP_RADIUS: f32 = 500.0;
/// No gaps in the run-up to the goal
pub const GOAL_APPROACH: f32 = 500.0;
/// No spikes or ramps before this distance
pub const FIRST_HAZARD_X: f32 = 500.0;

/// Ground segment width range
pub const PLATFORM_MIN_WIDTH: f32 = 400.0;
pub const PLATFORM_MAX_WIDTH: f32 = 800.0;

/// Gap odds per cursor step and nominal width range (narrowed by the envelope)
pub const GAP_CHANCE: f64 = 0.25;
pub const GAP_MIN_WIDTH: f32 = 50.0;
pub const GAP_MAX_WIDTH: f32 = 90.0;
/// Frames of slack kept between a maximal gap and the jump reach
pub const JUMP_GRACE_FRAMES: f32 = 4.0;

/// Spikes
pub const HAZARD_CHANCE: f64 = 0.7;
pub const HAZARD_MIN_PLATFORM: f32 = 200.0;
/// Spike-free run-in at the start of a segment (respawn lands inside it)
pub const HAZARD_LEAD_IN: f32 = 160.0;
/// Spike-free margin at both segment edges
pub const HAZARD_EDGE_MARGIN: f32 = 30.0;
/// Skip spikes when less room than this remains after margins
pub const HAZARD_MIN_AVAILABLE: f32 = 80.0;
pub const SPIKE_SIZE: f32 = 25.0;
pub const MAX_SPIKES: usize = 2;

/// Ramps
pub const RAMP_CHANCE: f64 = 0.4;
pub const RAMP_MIN_PLATFORM: f32 = 300.0;
pub const RAMP_WIDTH: f32 = 40.0;
pub const RAMP_HEIGHT: f32 = 30.0;
pub const RAMP_BOOST: f32 = -18.0;
/// Spikes keep this far in front of a ramp
pub const RAMP_SPIKE_CLEARANCE: f32 = 60.0;

/// Floating platforms
pub const FLOAT_HEIGHT: f32 = 20.0;
pub const FLOAT_MIN_WIDTH: f32 = 60.0;
/// Highest floater surface above the ground
pub const FLOAT_MAX_RISE: f32 = 180.0;

/// Goal platform width
pub const GOAL_WIDTH: f32 = 1000.0;

const EPSILON: f32 = 0.01;

/// Generation invariant violations
#[derive(Debug, Error, PartialEq)]
pub enum TrackError {
    #[error("ground path not contiguous at x={at:.1}")]
    Discontinuous { at: f32 },
    #[error("gap at x={x:.1} is {width:.1} wide (max {max:.1})")]
    GapTooWide { x: f32, width: f32, max: f32 },
    #[error("gap at x={x:.1} is {width:.1} wide (min {min:.1})")]
    GapTooNarrow { x: f32, width: f32, min: f32 },
    #[error("gap at x={x:.1} has no reachable platform after it")]
    GapNotFollowed { x: f32 },
    #[error("spike at x={x:.1} is outside its platform's safe span")]
    SpikeOutOfBounds { x: f32 },
    #[error("track has no goal platform")]
    MissingGoal,
    #[error("goal platform is {width:.1} wide (min {min:.1})")]
    GoalTooNarrow { width: f32, min: f32 },
}

/// What a single jump can do under a given tuning
#[derive(Debug, Clone, PartialEq)]
pub struct JumpEnvelope {
    pub gravity: f32,
    pub horizontal_speed: f32,
    pub actor_size: f32,
    /// Frames from take-off back to take-off height
    pub airtime: f32,
    /// Horizontal distance covered in that time
    pub reach: f32,
    /// Peak height above take-off
    pub apex: f32,
    /// Narrowest gap a non-jumping actor cannot roll across
    pub min_gap_width: f32,
    /// Widest gap a jump still clears with room to spare
    pub max_gap_width: f32,
}

impl JumpEnvelope {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        let gravity = tuning.gravity;
        let speed = tuning.horizontal_speed;
        let size = tuning.actor_size;
        let airtime = 2.0 * tuning.jump_power.abs() / gravity;
        let reach = airtime * speed;
        let apex = tuning.jump_power * tuning.jump_power / (2.0 * gravity);

        // A walker leaving an edge can still land on the far side for as long
        // as its fall stays inside the landing tolerance.
        let tolerant = frames_within_tolerance(gravity) as f32;
        let min_gap_width = (size + speed * (tolerant + 2.0)).max(GAP_MIN_WIDTH);
        let max_gap_width = (reach - size - speed * JUMP_GRACE_FRAMES).min(GAP_MAX_WIDTH);

        Self {
            gravity,
            horizontal_speed: speed,
            actor_size: size,
            airtime,
            reach,
            apex,
            min_gap_width,
            max_gap_width,
        }
    }

    /// Whether any gap width satisfies both bounds
    pub fn gaps_possible(&self) -> bool {
        self.min_gap_width <= self.max_gap_width
    }

    /// Horizontal distance of a ramp launch back to launch height
    pub fn ramp_flight(&self, boost: f32) -> f32 {
        2.0 * boost.abs() / self.gravity * self.horizontal_speed
    }

    /// Horizontal distance covered while dropping `height` from rest
    pub fn drop_distance(&self, height: f32) -> f32 {
        (2.0 * height / self.gravity).sqrt() * self.horizontal_speed
    }
}

/// Largest n such that an n-frame fall stays within the landing tolerance
fn frames_within_tolerance(gravity: f32) -> u32 {
    let fall = |n: u32| gravity * (n * (n + 1)) as f32 / 2.0;
    let mut n = 0;
    while n < 1_000 && fall(n + 1) <= LANDING_TOLERANCE {
        n += 1;
    }
    n
}

/// Builds tracks for a tuning and a set of story trigger positions
#[derive(Debug, Clone)]
pub struct TrackGenerator {
    envelope: JumpEnvelope,
    story_triggers: Vec<f32>,
}

impl TrackGenerator {
    pub fn new(tuning: &Tuning, story_triggers: &[f32]) -> Self {
        Self {
            envelope: JumpEnvelope::from_tuning(tuning),
            story_triggers: story_triggers.to_vec(),
        }
    }

    pub fn envelope(&self) -> &JumpEnvelope {
        &self.envelope
    }

    fn near_trigger(&self, x: f32, radius: f32) -> bool {
        self.story_triggers.iter().any(|t| (t - x).abs() < radius)
    }

    /// Generate a track for the given display height and goal distance
    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        canvas_height: f32,
        final_distance: f32,
    ) -> Track {
        let mut track = Track::new(canvas_height, final_distance);
        let ground_y = canvas_height - GROUND_OFFSET;

        if !self.envelope.gaps_possible() {
            log::warn!(
                "Tuning leaves no valid gap width ({:.1} > {:.1}); generating without gaps",
                self.envelope.min_gap_width,
                self.envelope.max_gap_width
            );
        }

        let mut current_x = 0.0;
        let mut after_gap = false;

        while current_x < final_distance {
            let safe_zone = self.near_trigger(current_x, SAFE_ZONE_RADIUS);
            let near_message = self.near_trigger(current_x, MESSAGE_GAP_RADIUS);

            let gap_allowed = !after_gap
                && !safe_zone
                && !near_message
                && self.envelope.gaps_possible()
                && final_distance - current_x > GOAL_APPROACH;

            if gap_allowed && rng.random_bool(GAP_CHANCE) {
                let width = rng
                    .random_range(self.envelope.min_gap_width..=self.envelope.max_gap_width);
                track.gaps.push(Gap {
                    x: current_x,
                    width,
                });
                current_x += width;
                after_gap = true;
                continue;
            }

            let width = rng
                .random_range(PLATFORM_MIN_WIDTH..PLATFORM_MAX_WIDTH)
                .min(final_distance - current_x);
            let host = Platform::new(current_x, ground_y, width, GROUND_HEIGHT, PlatformKind::Ground);

            let hazards_allowed = current_x >= FIRST_HAZARD_X && !safe_zone && !after_gap;

            let ramp = if hazards_allowed && width > RAMP_MIN_PLATFORM && rng.random_bool(RAMP_CHANCE) {
                self.place_ramp(&host)
            } else {
                None
            };

            let mut spikes = Vec::new();
            if hazards_allowed && width > HAZARD_MIN_PLATFORM && rng.random_bool(HAZARD_CHANCE) {
                spikes = self.place_spikes(rng, &host, ramp.as_ref());
            }

            let floaters = self.place_floaters(rng, &host, after_gap, safe_zone);

            track.platforms.push(host);
            track.platforms.extend(floaters);
            track.spikes.extend(spikes);
            track.ramps.extend(ramp);

            current_x += width;
            after_gap = false;
        }

        track.platforms.push(Platform::new(
            final_distance,
            ground_y,
            GOAL_WIDTH.max(self.envelope.reach),
            GROUND_HEIGHT,
            PlatformKind::Goal,
        ));

        log::debug!(
            "Generated track: {} platforms, {} gaps, {} spikes, {} ramps",
            track.platforms.len(),
            track.gaps.len(),
            track.spikes.len(),
            track.ramps.len()
        );
        track
    }

    /// Mid-platform ramp, only where the launch lands back on the same segment
    fn place_ramp(&self, host: &Platform) -> Option<Ramp> {
        let x = host.rect.x + host.rect.w * 0.5;
        let landing = x + self.envelope.ramp_flight(RAMP_BOOST) + self.envelope.actor_size;
        if landing > host.rect.right() - HAZARD_EDGE_MARGIN {
            return None;
        }
        Some(Ramp {
            rect: Rect::new(
                x,
                host.surface() - RAMP_HEIGHT,
                RAMP_WIDTH,
                RAMP_HEIGHT,
            ),
            boost_velocity: RAMP_BOOST,
        })
    }

    /// One or two evenly spaced spikes clear of the run-in, the far edge and any ramp
    fn place_spikes<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        host: &Platform,
        ramp: Option<&Ramp>,
    ) -> Vec<Spike> {
        let start = host.rect.x + HAZARD_LEAD_IN.max(HAZARD_EDGE_MARGIN);
        let mut end = host.rect.right() - HAZARD_EDGE_MARGIN;
        if let Some(ramp) = ramp {
            end = end.min(ramp.rect.x - RAMP_SPIKE_CLEARANCE);
        }
        let available = end - start;
        if available < HAZARD_MIN_AVAILABLE {
            return Vec::new();
        }

        let count = rng.random_range(1..=MAX_SPIKES);
        let spacing = available / (count + 1) as f32;
        (0..count)
            .map(|i| {
                let center = start + spacing * (i + 1) as f32;
                Spike {
                    rect: Rect::new(
                        center - SPIKE_SIZE / 2.0,
                        host.surface() - SPIKE_SIZE,
                        SPIKE_SIZE,
                        SPIKE_SIZE,
                    ),
                }
            })
            .collect()
    }

    /// Elevated helpers: one right after a gap, or up to three alternate paths otherwise
    fn place_floaters<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        host: &Platform,
        after_gap: bool,
        safe_zone: bool,
    ) -> Vec<Platform> {
        let x = host.rect.x;
        let width = host.rect.w;
        let ground_y = host.surface();
        // Walking off a floater must still come down on this segment
        let limit = host.rect.right()
            - self.envelope.actor_size
            - self.envelope.drop_distance(FLOAT_MAX_RISE)
            - HAZARD_EDGE_MARGIN;

        let mut candidates: Vec<(f32, f32, f32)> = Vec::new();
        if after_gap {
            if rng.random_bool(0.7) {
                candidates.push((
                    x + 100.0,
                    ground_y - 120.0 - rng.random_range(0.0f32..30.0),
                    140.0 + rng.random_range(0.0f32..60.0),
                ));
            }
        } else if !safe_zone {
            if rng.random_bool(0.5) {
                candidates.push((
                    x + width * 0.3,
                    ground_y - 130.0 - rng.random_range(0.0f32..50.0),
                    130.0 + rng.random_range(0.0f32..70.0),
                ));
            }
            if width > 500.0 && rng.random_bool(0.6) {
                candidates.push((
                    x + width * 0.6,
                    ground_y - 100.0 - rng.random_range(0.0f32..40.0),
                    110.0 + rng.random_range(0.0f32..50.0),
                ));
            }
            if width > 700.0 && rng.random_bool(0.7) {
                candidates.push((
                    x + width * 0.45,
                    ground_y - 90.0 - rng.random_range(0.0f32..30.0),
                    90.0 + rng.random_range(0.0f32..40.0),
                ));
            }
        }

        candidates
            .into_iter()
            .filter_map(|(fx, fy, fw)| {
                let fw = fw.min(limit - fx);
                (fw >= FLOAT_MIN_WIDTH)
                    .then(|| Platform::new(fx, fy, fw, FLOAT_HEIGHT, PlatformKind::Floating))
            })
            .collect()
    }
}

/// Check a track against the generator's invariants
///
/// # Errors
///
/// Returns the first `TrackError` found: a broken ground path, a gap outside
/// the jump envelope or without a landing after it, a spike outside its
/// platform's safe span, or a missing or undersized goal.
pub fn validate_track(track: &Track, envelope: &JumpEnvelope) -> Result<(), TrackError> {
    let goal = track.goal().ok_or(TrackError::MissingGoal)?;
    if goal.rect.w < envelope.reach {
        return Err(TrackError::GoalTooNarrow {
            width: goal.rect.w,
            min: envelope.reach,
        });
    }

    // Ground path: walkable platforms and gaps tile [0, final_distance]
    let mut spans: Vec<(f32, f32)> = track
        .walkable()
        .map(|p| (p.rect.left(), p.rect.right()))
        .chain(track.gaps.iter().map(|g| (g.x, g.end())))
        .collect();
    spans.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut covered = 0.0_f32;
    for (start, end) in spans {
        if start > covered + EPSILON {
            return Err(TrackError::Discontinuous { at: covered });
        }
        covered = covered.max(end);
    }
    if covered + EPSILON < track.final_distance {
        return Err(TrackError::Discontinuous { at: covered });
    }

    for gap in &track.gaps {
        if gap.width > envelope.max_gap_width + EPSILON {
            return Err(TrackError::GapTooWide {
                x: gap.x,
                width: gap.width,
                max: envelope.max_gap_width,
            });
        }
        if gap.width + EPSILON < envelope.min_gap_width {
            return Err(TrackError::GapTooNarrow {
                x: gap.x,
                width: gap.width,
                min: envelope.min_gap_width,
            });
        }
        let ground_ahead = track
            .walkable()
            .any(|p| (p.rect.left() - gap.end()).abs() <= EPSILON);
        let ground_y = track.canvas_height - GROUND_OFFSET;
        let floater_ahead = track.platforms.iter().any(|p| {
            p.kind == PlatformKind::Floating
                && p.rect.left() >= gap.x
                && p.rect.left() <= gap.x + envelope.reach
                && ground_y - p.surface() <= envelope.apex
        });
        if !ground_ahead && !floater_ahead {
            return Err(TrackError::GapNotFollowed { x: gap.x });
        }
    }

    for spike in &track.spikes {
        let host = track
            .ground_at(spike.rect.center().x)
            .ok_or(TrackError::SpikeOutOfBounds { x: spike.rect.x })?;
        if spike.rect.left() < host.rect.left() + HAZARD_EDGE_MARGIN
            || spike.rect.right() > host.rect.right() - HAZARD_EDGE_MARGIN
        {
            return Err(TrackError::SpikeOutOfBounds { x: spike.rect.x });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::story::StoryScript;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn generator(tuning: &Tuning) -> TrackGenerator {
        TrackGenerator::new(tuning, &StoryScript::default().trigger_positions())
    }

    fn build(seed: u64) -> (Track, TrackGenerator) {
        let tuning = Tuning::default();
        let generator = generator(&tuning);
        let mut rng = Pcg32::seed_from_u64(seed);
        let track = generator.generate(&mut rng, 720.0, tuning.final_distance);
        (track, generator)
    }

    #[test]
    fn test_default_envelope() {
        let env = JumpEnvelope::from_tuning(&Tuning::default());
        assert!((env.airtime - 56.666).abs() < 0.01);
        assert!((env.reach - 141.666).abs() < 0.01);
        assert!((env.apex - 240.833).abs() < 0.01);
        // 30 + 2.5 * (5 + 2) = 47.5, raised to the nominal minimum
        assert_eq!(env.min_gap_width, GAP_MIN_WIDTH);
        assert_eq!(env.max_gap_width, GAP_MAX_WIDTH);
        assert!(env.gaps_possible());
    }

    #[test]
    fn test_fast_envelope_widens_minimum_gap() {
        let tuning = Tuning {
            horizontal_speed: 4.0,
            ..Default::default()
        };
        let env = JumpEnvelope::from_tuning(&tuning);
        assert_eq!(env.min_gap_width, 58.0);
        assert_eq!(env.max_gap_width, GAP_MAX_WIDTH);
    }

    #[test]
    fn test_tolerance_frames() {
        // 0.6 * 15 = 9 <= 10, 0.6 * 21 = 12.6 > 10
        assert_eq!(frames_within_tolerance(0.6), 5);
        assert_eq!(frames_within_tolerance(20.0), 0);
    }

    #[test]
    fn test_slow_jump_disables_gaps() {
        let tuning = Tuning {
            jump_power: -3.0,
            ..Default::default()
        };
        let generator = generator(&tuning);
        assert!(!generator.envelope().gaps_possible());
        let mut rng = Pcg32::seed_from_u64(3);
        let track = generator.generate(&mut rng, 720.0, tuning.final_distance);
        assert!(track.gaps.is_empty());
        assert_eq!(validate_track(&track, generator.envelope()), Ok(()));
    }

    #[test]
    fn test_generation_is_reproducible() {
        let (a, _) = build(1234);
        let (b, _) = build(1234);
        assert_eq!(a, b);
        let (c, _) = build(4321);
        assert_ne!(a, c);
    }

    #[test]
    fn test_goal_is_last_and_wide() {
        let (track, _) = build(9);
        let goal = track.platforms.last().unwrap();
        assert_eq!(goal.kind, PlatformKind::Goal);
        assert_eq!(goal.rect.x, 12_000.0);
        assert_eq!(goal.rect.w, GOAL_WIDTH);
        assert_eq!(goal.surface(), 720.0 - GROUND_OFFSET);
    }

    #[test]
    fn test_start_is_solid_ground() {
        for seed in 0..20 {
            let (track, _) = build(seed);
            let first = &track.platforms[0];
            assert_eq!(first.kind, PlatformKind::Ground);
            assert_eq!(first.rect.x, 0.0);
            assert!(track.spikes.iter().all(|s| s.rect.x >= FIRST_HAZARD_X));
            assert!(track.ramps.iter().all(|r| r.rect.x >= FIRST_HAZARD_X));
        }
    }

    #[test]
    fn test_gaps_keep_away_from_story_and_goal() {
        let triggers = StoryScript::default().trigger_positions();
        for seed in 0..50 {
            let (track, _) = build(seed);
            for gap in &track.gaps {
                assert!(triggers.iter().all(|t| (t - gap.x).abs() >= MESSAGE_GAP_RADIUS));
                assert!(track.final_distance - gap.x > GOAL_APPROACH);
            }
        }
    }

    #[test]
    fn test_gaps_never_consecutive() {
        for seed in 0..50 {
            let (track, _) = build(seed);
            for pair in track.gaps.windows(2) {
                assert!(pair[1].x > pair[0].end() + EPSILON);
            }
        }
    }

    #[test]
    fn test_no_spikes_in_safe_zones_or_after_gaps() {
        let triggers = StoryScript::default().trigger_positions();
        for seed in 0..50 {
            let (track, _) = build(seed);
            for spike in &track.spikes {
                let host = track.ground_at(spike.rect.center().x).unwrap();
                assert!(triggers.iter().all(|t| (t - host.rect.x).abs() >= SAFE_ZONE_RADIUS));
                assert!(track.gaps.iter().all(|g| (g.end() - host.rect.x).abs() > EPSILON));
                assert!(spike.rect.x >= host.rect.x + HAZARD_LEAD_IN);
            }
        }
    }

    #[test]
    fn test_ramps_land_on_their_segment() {
        let env = JumpEnvelope::from_tuning(&Tuning::default());
        for seed in 0..50 {
            let (track, _) = build(seed);
            for ramp in &track.ramps {
                let host = track.ground_at(ramp.rect.x).unwrap();
                let landing = ramp.rect.x + env.ramp_flight(ramp.boost_velocity) + env.actor_size;
                assert!(landing <= host.rect.right());
                assert!(track.spikes.iter().all(|s| {
                    s.rect.right() <= ramp.rect.x - RAMP_SPIKE_CLEARANCE
                        || s.rect.x >= host.rect.right()
                        || s.rect.right() <= host.rect.x
                }));
            }
        }
    }

    #[test]
    fn test_floaters_sit_inside_their_segment() {
        for seed in 0..50 {
            let (track, _) = build(seed);
            for floater in track.platforms.iter().filter(|p| p.kind == PlatformKind::Floating) {
                let host = track.ground_at(floater.rect.x).unwrap();
                assert!(floater.rect.right() < host.rect.right());
                assert!(floater.rect.w >= FLOAT_MIN_WIDTH);
                let rise = host.surface() - floater.surface();
                assert!((90.0..=FLOAT_MAX_RISE).contains(&rise));
            }
        }
    }

    #[test]
    fn test_validate_rejects_wide_gap() {
        let env = JumpEnvelope::from_tuning(&Tuning::default());
        let mut track = Track::new(720.0, 2_000.0);
        track
            .platforms
            .push(Platform::new(0.0, 620.0, 600.0, GROUND_HEIGHT, PlatformKind::Ground));
        track
            .platforms
            .push(Platform::new(800.0, 620.0, 1_200.0, GROUND_HEIGHT, PlatformKind::Ground));
        track
            .platforms
            .push(Platform::new(2_000.0, 620.0, GOAL_WIDTH, GROUND_HEIGHT, PlatformKind::Goal));
        track.gaps.push(Gap {
            x: 600.0,
            width: 200.0,
        });
        assert!(matches!(
            validate_track(&track, &env),
            Err(TrackError::GapTooWide { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_hole_in_ground() {
        let env = JumpEnvelope::from_tuning(&Tuning::default());
        let mut track = Track::new(720.0, 2_000.0);
        track
            .platforms
            .push(Platform::new(0.0, 620.0, 600.0, GROUND_HEIGHT, PlatformKind::Ground));
        track
            .platforms
            .push(Platform::new(700.0, 620.0, 1_300.0, GROUND_HEIGHT, PlatformKind::Ground));
        track
            .platforms
            .push(Platform::new(2_000.0, 620.0, GOAL_WIDTH, GROUND_HEIGHT, PlatformKind::Goal));
        assert_eq!(
            validate_track(&track, &env),
            Err(TrackError::Discontinuous { at: 600.0 })
        );
    }

    #[test]
    fn test_validate_rejects_missing_goal_and_stray_spike() {
        let env = JumpEnvelope::from_tuning(&Tuning::default());
        let mut track = Track::new(720.0, 600.0);
        track
            .platforms
            .push(Platform::new(0.0, 620.0, 600.0, GROUND_HEIGHT, PlatformKind::Ground));
        assert_eq!(validate_track(&track, &env), Err(TrackError::MissingGoal));

        track
            .platforms
            .push(Platform::new(600.0, 620.0, GOAL_WIDTH, GROUND_HEIGHT, PlatformKind::Goal));
        assert_eq!(validate_track(&track, &env), Ok(()));

        track.spikes.push(Spike {
            rect: Rect::new(5.0, 595.0, SPIKE_SIZE, SPIKE_SIZE),
        });
        assert_eq!(
            validate_track(&track, &env),
            Err(TrackError::SpikeOutOfBounds { x: 5.0 })
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_generated_tracks_are_playable(
            seed in any::<u64>(),
            canvas_height in 400.0f32..1400.0,
            speed in 2.0f32..5.0,
        ) {
            let tuning = Tuning { horizontal_speed: speed, ..Default::default() };
            let generator = generator(&tuning);
            let mut rng = Pcg32::seed_from_u64(seed);
            let track = generator.generate(&mut rng, canvas_height, tuning.final_distance);
            prop_assert_eq!(validate_track(&track, generator.envelope()), Ok(()));
        }

        #[test]
        fn prop_spikes_clear_platform_edges(seed in any::<u64>()) {
            let (track, _) = build(seed);
            for spike in &track.spikes {
                let host = track.ground_at(spike.rect.center().x);
                prop_assert!(host.is_some());
                let host = host.unwrap();
                prop_assert!(spike.rect.x >= host.rect.x + HAZARD_EDGE_MARGIN);
                prop_assert!(spike.rect.right() <= host.rect.right() - HAZARD_EDGE_MARGIN);
            }
        }

        #[test]
        fn prop_gaps_within_envelope(seed in any::<u64>()) {
            let (track, generator) = build(seed);
            let env = generator.envelope();
            for gap in &track.gaps {
                prop_assert!(gap.width >= env.min_gap_width);
                prop_assert!(gap.width <= env.max_gap_width);
                prop_assert!(gap.width + env.actor_size < env.reach);
                prop_assert!(track.ground_at(gap.end()).is_some());
            }
        }
    }
}
