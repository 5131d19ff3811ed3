//! Physics and run tuning
//!
//! Data-driven balance values. Defaults reproduce the shipped game; a JSON
//! override can replace any subset of fields.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Lives available to a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Lives {
    /// Deaths never end the run
    #[default]
    Unlimited,
    /// Run ends after this many deaths
    Limited(u32),
}

impl Lives {
    /// Remove one life. Returns false when none remain afterwards.
    pub fn lose_one(&mut self) -> bool {
        match self {
            Lives::Unlimited => true,
            Lives::Limited(n) => {
                *n = n.saturating_sub(1);
                *n > 0
            }
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Lives::Unlimited)
    }

    /// Remaining count, `None` when unlimited
    pub fn remaining(&self) -> Option<u32> {
        match self {
            Lives::Unlimited => None,
            Lives::Limited(n) => Some(*n),
        }
    }
}

/// Errors raised when a tuning override is rejected
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f32,
        max: f32,
        value: f32,
    },
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: u32,
        value: u32,
    },
    #[error("tuning JSON invalid: {0}")]
    Json(#[from] serde_json::Error),
    #[error("tuning file unreadable: {0}")]
    Io(#[from] std::io::Error),
}

/// Physics and run parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Added to vertical velocity every frame
    pub gravity: f32,
    /// Constant rightward speed
    pub horizontal_speed: f32,
    /// Vertical velocity applied by a jump (negative is up)
    pub jump_power: f32,
    /// Actor bounding box edge length
    pub actor_size: f32,
    /// Distance of the goal platform
    pub final_distance: f32,
    pub lives: Lives,
    /// Maximum trail samples kept
    pub trail_capacity: usize,
    /// Frames the actor stays frozen after dying
    pub death_transition_ticks: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            horizontal_speed: HORIZONTAL_SPEED,
            jump_power: JUMP_POWER,
            actor_size: ACTOR_SIZE,
            final_distance: FINAL_DISTANCE,
            lives: Lives::Unlimited,
            trail_capacity: TRAIL_LENGTH,
            death_transition_ticks: DEATH_TRANSITION_TICKS,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON override. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Validate parameter bounds
    ///
    /// # Errors
    ///
    /// Returns `TuningError` when any field is outside the range the level
    /// generator can still produce a completable track for.
    pub fn validate(&self) -> Result<(), TuningError> {
        check_range("gravity", self.gravity, 0.05, 5.0)?;
        check_range("horizontal_speed", self.horizontal_speed, 0.5, 20.0)?;
        check_range("jump_power", self.jump_power, -60.0, -2.0)?;
        check_range("actor_size", self.actor_size, 4.0, 120.0)?;
        check_range("final_distance", self.final_distance, 1_000.0, 1_000_000.0)?;
        if let Lives::Limited(n) = self.lives {
            if n == 0 {
                return Err(TuningError::MinViolation {
                    field: "lives",
                    min: 1,
                    value: n,
                });
            }
        }
        if self.trail_capacity == 0 {
            return Err(TuningError::MinViolation {
                field: "trail_capacity",
                min: 1,
                value: 0,
            });
        }
        Ok(())
    }

    /// LocalStorage key for developer overrides
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "cosmic_runner_tuning";

    /// Env var naming a JSON override file (native)
    #[cfg(not(target_arch = "wasm32"))]
    const ENV_VAR: &'static str = "COSMIC_RUNNER_TUNING";

    /// Load tuning from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(tuning) => {
                        log::info!("Loaded tuning override from LocalStorage");
                        return tuning;
                    }
                    Err(e) => log::warn!("Ignoring tuning override: {}", e),
                }
            }
        }

        log::info!("Using default tuning");
        Self::default()
    }

    /// Load tuning from the file named by `COSMIC_RUNNER_TUNING` (native)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(Self::ENV_VAR) else {
            return Self::default();
        };
        match Self::load_file(std::path::Path::new(&path)) {
            Ok(tuning) => {
                log::info!("Loaded tuning override from {}", path);
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring tuning override {}: {}", path, e);
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_file(path: &std::path::Path) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

fn check_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), TuningError> {
    if !(min..=max).contains(&value) {
        return Err(TuningError::RangeViolation {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.lives, Lives::Unlimited);
        assert_eq!(tuning.final_distance, 12_000.0);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{"horizontal_speed": 4.0}"#).unwrap();
        assert_eq!(tuning.horizontal_speed, 4.0);
        assert_eq!(tuning.gravity, GRAVITY);
        assert_eq!(tuning.jump_power, JUMP_POWER);
    }

    #[test]
    fn test_limited_lives_override() {
        let tuning = Tuning::from_json(r#"{"lives": {"limited": 3}}"#).unwrap();
        assert_eq!(tuning.lives, Lives::Limited(3));
    }

    #[test]
    fn test_rejects_upward_gravity() {
        let err = Tuning::from_json(r#"{"gravity": -1.0}"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::RangeViolation { field: "gravity", .. }
        ));
    }

    #[test]
    fn test_rejects_downward_jump() {
        let err = Tuning::from_json(r#"{"jump_power": 17.0}"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::RangeViolation {
                field: "jump_power",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_zero_lives() {
        let err = Tuning::from_json(r#"{"lives": {"limited": 0}}"#).unwrap_err();
        assert!(matches!(err, TuningError::MinViolation { field: "lives", .. }));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            Tuning::from_json("not json"),
            Err(TuningError::Json(_))
        ));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_load_file_override() {
        let dir = std::env::temp_dir().join(format!("cosmic-runner-tuning-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tuning.json");
        std::fs::write(&path, r#"{"lives": {"limited": 5}}"#).unwrap();

        let tuning = Tuning::load_file(&path).unwrap();
        assert_eq!(tuning.lives, Lives::Limited(5));
        assert_eq!(tuning.gravity, GRAVITY);
        assert!(matches!(
            Tuning::load_file(&dir.join("missing.json")),
            Err(TuningError::Io(_))
        ));
        assert_eq!(Tuning::ENV_VAR, "COSMIC_RUNNER_TUNING");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_lives_countdown() {
        let mut lives = Lives::Limited(2);
        assert!(lives.lose_one());
        assert_eq!(lives.remaining(), Some(1));
        assert!(!lives.lose_one());
        assert_eq!(lives.remaining(), Some(0));
        // Stays at zero
        assert!(!lives.lose_one());

        let mut unlimited = Lives::Unlimited;
        for _ in 0..100 {
            assert!(unlimited.lose_one());
        }
        assert_eq!(unlimited.remaining(), None);
    }
}
