//! Fixed timestep simulation tick
//!
//! One call advances the run by exactly one logical frame. Input requests are
//! edge-triggered and applied at the start of the tick, never mid-tick.

use glam::Vec2;

use super::collision::{Outcome, resolve, respawn_target};
use super::state::{
    Actor, DeathCause, GameEvent, GameSession, PauseReason, RunPhase, spawn_point,
};
use super::story::compute_progress;
use super::track::Track;
use crate::consts::*;
use crate::score_for_distance;
use crate::tuning::Tuning;

/// Frames the autopilot simulates ahead before committing to a jump
pub const AUTOPILOT_HORIZON: u32 = 120;
/// Frames a planned landing must then survive on foot
pub const AUTOPILOT_SETTLE: u32 = 3;

/// Input requests for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Jump (tap/click/space). No-op unless grounded.
    pub jump: bool,
    /// Begin a new run from idle, game over or the goal screen
    pub start: bool,
    /// Confirm respawn after a death
    pub respawn: bool,
    /// Dismiss the story message on screen
    pub dismiss: bool,
    /// Demo mode - the sim jumps for the player and acknowledges pauses
    pub autopilot: bool,
}

/// Advance the session by one fixed timestep
pub fn tick(session: &mut GameSession, input: &TickInput) {
    apply_requests(session, input);

    match session.phase {
        RunPhase::Running => step_running(session, input),
        RunPhase::DeadTransitioning { ticks_remaining } => {
            if ticks_remaining <= 1 {
                finish_death(session);
            } else {
                session.phase = RunPhase::DeadTransitioning {
                    ticks_remaining: ticks_remaining - 1,
                };
            }
        }
        RunPhase::Idle | RunPhase::Paused(_) => {}
    }
}

/// Phase changes requested from outside; anything not valid for the current phase is ignored
fn apply_requests(session: &mut GameSession, input: &TickInput) {
    match session.phase {
        RunPhase::Idle | RunPhase::Paused(PauseReason::OutOfLives | PauseReason::GoalReached)
            if input.start =>
        {
            session.start();
        }
        RunPhase::Paused(PauseReason::Story { .. }) if input.dismiss || input.autopilot => {
            session.phase = RunPhase::Running;
        }
        RunPhase::Paused(PauseReason::AwaitingRespawn) if input.respawn || input.autopilot => {
            respawn(session);
        }
        _ => {}
    }
}

fn step_running(session: &mut GameSession, input: &TickInput) {
    session.time_ticks += 1;

    let wants_jump = input.jump || (input.autopilot && autopilot_wants_jump(session));
    if wants_jump && session.actor.jump(session.tuning.jump_power) {
        let pos = session.actor.pos;
        session.push_event(GameEvent::Jumped { pos });
    }

    let outcome = step_actor(&mut session.actor, &session.track, &session.tuning);
    let pos = session.actor.pos;

    if let Some(cause) = outcome.death_cause() {
        enter_death(session, cause);
        return;
    }
    match outcome {
        Outcome::Landed => session.push_event(GameEvent::Landed { pos }),
        Outcome::Boosted => session.push_event(GameEvent::Boosted { pos }),
        _ => {}
    }

    session.score = score_for_distance(pos.x);
    session.progress = compute_progress(pos.x, session.track.final_distance);

    if let Some(message) = session.story.check_triggers(pos.x) {
        log::info!("Story beat {} at x={:.0}", message.index, pos.x);
        session.phase = RunPhase::Paused(PauseReason::Story {
            index: message.index,
            is_final: message.is_final,
        });
        session.push_event(GameEvent::ShowStory {
            index: message.index,
            text: message.text,
            is_final: message.is_final,
        });
        return;
    }

    if on_goal(&session.actor, &session.track) {
        session.progress = 100.0;
        log::info!(
            "Goal reached after {} ticks, score {}",
            session.time_ticks,
            session.score
        );
        session.phase = RunPhase::Paused(PauseReason::GoalReached);
        session.push_event(GameEvent::GoalReached {
            score: session.score,
        });
    }
}

fn step_actor(actor: &mut Actor, track: &Track, tuning: &Tuning) -> Outcome {
    let speed = actor.horizontal_speed;
    actor.advance(tuning.gravity, speed);
    resolve(actor, track)
}

/// Standing on the goal platform with the whole run distance covered
fn on_goal(actor: &Actor, track: &Track) -> bool {
    actor.grounded
        && actor.pos.x >= track.final_distance
        && track
            .goal()
            .is_some_and(|goal| goal.rect.spans_x(actor.center_x()))
}

fn enter_death(session: &mut GameSession, cause: DeathCause) {
    let pos = session.actor.pos;
    let alive = session.lives.lose_one();
    log::info!(
        "Actor died ({:?}) at x={:.0}, lives left: {:?}",
        cause,
        pos.x,
        session.lives.remaining()
    );
    log::debug!("Death detail: pos={:?} vy={:.2} alive={}", pos, session.actor.vy, alive);
    session.phase = RunPhase::DeadTransitioning {
        ticks_remaining: session.tuning.death_transition_ticks.max(1),
    };
    session.push_event(GameEvent::Died { cause, pos });
}

/// End of the death countdown: console the player, then wait for a respawn or a new run
fn finish_death(session: &mut GameSession) {
    if let Some(text) = session.story.pick_fail_message(&mut session.rng) {
        let text = text.to_string();
        session.push_event(GameEvent::ShowFailMessage { text });
    }
    if session.lives.remaining() == Some(0) {
        log::info!("Out of lives");
        session.phase = RunPhase::Paused(PauseReason::OutOfLives);
        session.push_event(GameEvent::OutOfLives);
    } else {
        session.phase = RunPhase::Paused(PauseReason::AwaitingRespawn);
    }
}

/// Roll back and place the actor on a walkable platform near where it died
fn respawn(session: &mut GameSession) {
    let x = (session.actor.pos.x - RESPAWN_ROLLBACK).max(ACTOR_START_X);
    let size = session.actor.size;
    let pos = match respawn_target(&session.track, x) {
        Some(platform) => Vec2::new(
            platform.rect.x + RESPAWN_INSET,
            platform.surface() - size - RESPAWN_DROP,
        ),
        None => {
            log::warn!("No walkable platform to respawn on; using the spawn height");
            Vec2::new(x, spawn_point(session.track.canvas_height).y)
        }
    };

    session.actor.place(pos);
    session.phase = RunPhase::Running;
    log::info!("Respawned at x={:.0}", pos.x);
    session.push_event(GameEvent::Respawned { pos });
}

/// Jump on the last frame a jump still survives, and only when walking on would not
///
/// A take-off counts when the landing leaves a way past whatever comes next
/// (walking on, or one more jump). Only when no take-off does is a bare safe
/// landing accepted.
fn autopilot_wants_jump(session: &GameSession) -> bool {
    if !session.actor.grounded {
        return false;
    }
    let (track, tuning) = (&session.track, &session.tuning);
    let ghost = session.actor.ghost();
    if walk_survives(ghost.clone(), track, tuning) {
        return false;
    }
    let jump_at = |delay, follow_ups| jump_survives(ghost.clone(), track, tuning, delay, follow_ups);
    if jump_at(0, 1) {
        return !jump_at(1, 1);
    }
    jump_at(0, 0) && !jump_at(1, 0)
}

fn walk_survives(mut actor: Actor, track: &Track, tuning: &Tuning) -> bool {
    (0..AUTOPILOT_HORIZON).all(|_| !step_actor(&mut actor, track, tuning).is_fatal())
}

/// Walk `delay` frames, jump, then touch down and stay alive
///
/// With `follow_ups` left the landing must also get through the rest of the
/// horizon, jumping again where walking on would die.
fn jump_survives(
    mut actor: Actor,
    track: &Track,
    tuning: &Tuning,
    delay: u32,
    follow_ups: u32,
) -> bool {
    for _ in 0..delay {
        if step_actor(&mut actor, track, tuning).is_fatal() || !actor.grounded {
            return false;
        }
    }
    if !actor.jump(tuning.jump_power) {
        return false;
    }
    for _ in 0..AUTOPILOT_HORIZON {
        match step_actor(&mut actor, track, tuning) {
            outcome if outcome.is_fatal() => return false,
            Outcome::Landed if follow_ups == 0 => {
                return (0..AUTOPILOT_SETTLE)
                    .all(|_| !step_actor(&mut actor, track, tuning).is_fatal());
            }
            Outcome::Landed => return recovers(actor, track, tuning, follow_ups - 1),
            _ => {}
        }
    }
    true
}

/// A grounded actor walks out the horizon, or jumps clear from some frame before walking kills it
fn recovers(mut actor: Actor, track: &Track, tuning: &Tuning, follow_ups: u32) -> bool {
    let mut takeoffs = Vec::new();
    for _ in 0..AUTOPILOT_HORIZON {
        if actor.grounded {
            takeoffs.push(actor.clone());
        }
        if step_actor(&mut actor, track, tuning).is_fatal() {
            // Latest first
            return takeoffs
                .into_iter()
                .rev()
                .any(|takeoff| jump_survives(takeoff, track, tuning, 0, follow_ups));
        }
    }
    true
}
