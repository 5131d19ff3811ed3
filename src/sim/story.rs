//! Story beats and progress
//!
//! One-time narrative pauses keyed to horizontal position, plus the
//! consolation lines shown after a death.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A narrative beat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryMessage {
    /// Fires once the actor's x reaches this
    pub trigger_x: f32,
    pub text: String,
    /// Flips to true exactly once per run
    #[serde(default)]
    pub shown: bool,
    /// The closing message of the run
    #[serde(default)]
    pub is_final: bool,
}

impl StoryMessage {
    pub fn new(trigger_x: f32, text: impl Into<String>) -> Self {
        Self {
            trigger_x,
            text: text.into(),
            shown: false,
            is_final: false,
        }
    }

    pub fn final_beat(trigger_x: f32, text: impl Into<String>) -> Self {
        Self {
            is_final: true,
            ..Self::new(trigger_x, text)
        }
    }
}

/// A message that fired this frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggeredMessage {
    /// Position in the script
    pub index: usize,
    pub text: String,
    pub is_final: bool,
}

/// Ordered narrative for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryScript {
    messages: Vec<StoryMessage>,
    #[serde(default = "default_fail_messages")]
    fail_messages: Vec<String>,
}

impl Default for StoryScript {
    fn default() -> Self {
        Self::new(
            vec![
                StoryMessage::new(
                    200.0,
                    "Welcome to the road ahead.\n\nThis is where the real game begins.\n\nI'm proud of you.",
                ),
                StoryMessage::new(
                    1_200.0,
                    "The day you arrived changed everything.\n\nI haven't always found the right words,\nbut I never stopped trying.",
                ),
                StoryMessage::new(
                    2_400.0,
                    "Sometimes the answer was 'no'.\n\nEvery choice, good or bad,\nbuilds the path you walk.",
                ),
                StoryMessage::new(
                    3_600.0,
                    "Some obstacles look like fun\nbut only take from you.\n\nJumping over them is up to you.",
                ),
                StoryMessage::new(
                    4_800.0,
                    "I can't give you everything.\n\nWhat I can give you\nisn't for sale:\nmy support, always.",
                ),
                StoryMessage::final_beat(
                    10_000.0,
                    "This goal isn't the end.\nIt's your STARTING POINT.\n\nWhatever comes next,\nyou can count on me.",
                ),
            ],
            default_fail_messages(),
        )
    }
}

fn default_fail_messages() -> Vec<String> {
    [
        "Falling is allowed.\nGetting back up is required.\n\nTry again.",
        "One bad call doesn't define your future.\nKeep going.",
        "Mistakes are experience.\nDon't give up now.",
        "I'm here when you fall.\nAlways.",
        "Don't give up.\nYou've got this.",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl StoryScript {
    /// Build a script; messages are ordered by trigger position
    pub fn new(mut messages: Vec<StoryMessage>, fail_messages: Vec<String>) -> Self {
        messages.sort_by(|a, b| a.trigger_x.total_cmp(&b.trigger_x));
        Self {
            messages,
            fail_messages,
        }
    }

    /// Parse a script from JSON (`{"messages": [...], "fail_messages": [...]}`)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let parsed: StoryScript = serde_json::from_str(json)?;
        Ok(Self::new(parsed.messages, parsed.fail_messages))
    }

    pub fn messages(&self) -> &[StoryMessage] {
        &self.messages
    }

    /// Trigger positions (the generator keeps these areas safe)
    pub fn trigger_positions(&self) -> Vec<f32> {
        self.messages.iter().map(|m| m.trigger_x).collect()
    }

    /// Fire the first unshown message whose trigger the actor has reached
    ///
    /// At most one message fires per call; ties resolve to script order.
    pub fn check_triggers(&mut self, actor_x: f32) -> Option<TriggeredMessage> {
        let (index, message) = self
            .messages
            .iter_mut()
            .enumerate()
            .find(|(_, m)| !m.shown && m.trigger_x <= actor_x)?;
        message.shown = true;
        Some(TriggeredMessage {
            index,
            text: message.text.clone(),
            is_final: message.is_final,
        })
    }

    /// Forget which messages were shown (new run)
    pub fn reset(&mut self) {
        for message in &mut self.messages {
            message.shown = false;
        }
    }

    /// Pick a consolation line for a death
    pub fn pick_fail_message<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        if self.fail_messages.is_empty() {
            return None;
        }
        let i = rng.random_range(0..self.fail_messages.len());
        Some(self.fail_messages[i].as_str())
    }
}

/// Goal progress as a percentage clamped to `[0, 100]`
pub fn compute_progress(actor_x: f32, final_distance: f32) -> f32 {
    if final_distance <= 0.0 {
        return 100.0;
    }
    (actor_x / final_distance * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_progress_examples() {
        assert_eq!(compute_progress(6_000.0, 12_000.0), 50.0);
        assert_eq!(compute_progress(13_000.0, 12_000.0), 100.0);
        assert_eq!(compute_progress(-50.0, 12_000.0), 0.0);
        assert_eq!(compute_progress(0.0, 12_000.0), 0.0);
    }

    #[test]
    fn test_fires_once() {
        let mut script = StoryScript::default();
        let first = script.check_triggers(250.0).unwrap();
        assert_eq!(first.index, 0);
        assert!(!first.is_final);
        assert!(script.messages()[0].shown);
        assert!(script.check_triggers(250.0).is_none());
        assert!(script.check_triggers(300.0).is_none());
    }

    #[test]
    fn test_one_message_per_call() {
        let mut script = StoryScript::default();
        // Far past several triggers: they come out one at a time, in order
        let a = script.check_triggers(5_000.0).unwrap();
        let b = script.check_triggers(5_000.0).unwrap();
        assert_eq!(a.index, 0);
        assert_eq!(b.index, 1);
    }

    #[test]
    fn test_final_flag() {
        let mut script = StoryScript::default();
        let mut last = None;
        while let Some(msg) = script.check_triggers(20_000.0) {
            last = Some(msg);
        }
        let last = last.unwrap();
        assert!(last.is_final);
        assert_eq!(last.index, script.messages().len() - 1);
    }

    #[test]
    fn test_unsorted_input_is_ordered() {
        let mut script = StoryScript::new(
            vec![
                StoryMessage::final_beat(900.0, "end"),
                StoryMessage::new(100.0, "start"),
            ],
            vec![],
        );
        assert_eq!(script.check_triggers(1_000.0).unwrap().text, "start");
        assert_eq!(script.check_triggers(1_000.0).unwrap().text, "end");
    }

    #[test]
    fn test_reset() {
        let mut script = StoryScript::default();
        assert!(script.check_triggers(300.0).is_some());
        script.reset();
        assert!(script.check_triggers(300.0).is_some());
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "messages": [
                {"trigger_x": 500.0, "text": "b"},
                {"trigger_x": 100.0, "text": "a", "is_final": false},
                {"trigger_x": 900.0, "text": "c", "is_final": true}
            ]
        }"#;
        let script = StoryScript::from_json(json).unwrap();
        let texts: Vec<_> = script.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["a", "b", "c"]);
        assert!(script.messages()[2].is_final);
        // Fail lines fall back to the built-in set
        let mut rng = Pcg32::seed_from_u64(1);
        assert!(script.pick_fail_message(&mut rng).is_some());
    }

    #[test]
    fn test_fail_message_is_seeded() {
        let script = StoryScript::default();
        let mut a = Pcg32::seed_from_u64(42);
        let mut b = Pcg32::seed_from_u64(42);
        for _ in 0..10 {
            assert_eq!(
                script.pick_fail_message(&mut a),
                script.pick_fail_message(&mut b)
            );
        }
        let empty = StoryScript::new(vec![], vec![]);
        assert!(empty.pick_fail_message(&mut a).is_none());
    }

    proptest! {
        #[test]
        fn prop_triggers_fire_once_in_order(steps in prop::collection::vec(0.0f32..400.0, 1..200)) {
            let mut script = StoryScript::default();
            let mut x = 0.0;
            let mut fired: Vec<(usize, f32)> = Vec::new();
            for step in steps {
                x += step;
                if let Some(msg) = script.check_triggers(x) {
                    fired.push((msg.index, script.messages()[msg.index].trigger_x));
                }
            }
            // Strictly increasing script index: each message at most once,
            // and trigger positions never go backwards
            for pair in fired.windows(2) {
                prop_assert!(pair[0].0 < pair[1].0);
                prop_assert!(pair[0].1 <= pair[1].1);
            }
            // Every fired trigger had been reached
            for (_, trigger) in &fired {
                prop_assert!(*trigger <= x);
            }
        }
    }
}
