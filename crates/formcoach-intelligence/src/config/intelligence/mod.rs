// ABOUTME: Coaching configuration for the classifier, cue engine, and difficulty engine
// ABOUTME: Orchestrates domain-specific configs and provides unified validation and loading
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Coaching Configuration Module
//!
//! Configuration is organized into domain-specific modules:
//! - `classifier` - Buffers, exercise detection heuristics, and rep scoring
//! - `cue` - Cue capacity, expiry, trigger thresholds, and reminders
//! - `difficulty` - Progression gates and fatigue scaling
//!
//! All values can be overridden via environment variables with the `FORMCOACH_` prefix.

pub mod classifier;
pub mod cue;
pub mod difficulty;
pub mod error;

pub use classifier::{ClassifierConfig, DetectionConfig, PoseQualityConfig, RepScoringConfig};
pub use cue::{CueEngineConfig, CueFilterConfig, CueTriggerConfig, ReminderConfig};
pub use difficulty::{AdjustmentConfidence, DifficultyConfig, DifficultyThresholds, FatigueConfig};
pub use error::ConfigError;

use serde::{Deserialize, Serialize};
use std::env::{self, VarError};
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::warn;

/// Global configuration singleton
static COACHING_CONFIG: OnceLock<CoachingConfig> = OnceLock::new();

/// Main coaching configuration container
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoachingConfig {
    /// Exercise classifier and rep FSM
    pub classifier: ClassifierConfig,
    /// Coaching cue engine
    pub cue_engine: CueEngineConfig,
    /// Adaptive difficulty engine
    pub difficulty: DifficultyConfig,
}

impl CoachingConfig {
    /// Get the global configuration instance
    pub fn global() -> &'static Self {
        COACHING_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                warn!("Failed to load coaching config: {e}, using defaults");
                Self::default()
            })
        })
    }

    /// Load configuration from environment
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values or validation fails
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config = config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if configuration values are invalid
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_classifier()?;
        self.validate_cue_engine()?;
        self.validate_difficulty()
    }

    fn validate_classifier(&self) -> Result<(), ConfigError> {
        let classifier = &self.classifier;
        if classifier.pose_history_length == 0 || classifier.rep_history_length == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "classifier history lengths must be > 0",
            ));
        }
        if classifier.min_classification_frames == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "min_classification_frames must be > 0",
            ));
        }
        if classifier.min_classification_frames > classifier.pose_history_length {
            return Err(ConfigError::InvalidRange(
                "min_classification_frames must be <= pose_history_length",
            ));
        }

        let detection = &classifier.detection;
        if detection.squat_min_stance_ratio >= detection.squat_max_stance_ratio {
            return Err(ConfigError::InvalidRange(
                "squat_min_stance_ratio must be < squat_max_stance_ratio",
            ));
        }

        if classifier.scoring.tempo_tolerance_secs < 0.0 {
            return Err(ConfigError::ValueOutOfRange(
                "tempo_tolerance_secs must be >= 0",
            ));
        }

        let quality = &classifier.quality;
        if quality.window_frames == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "quality window_frames must be > 0",
            ));
        }
        if quality.max_low_confidence_frames > quality.window_frames {
            return Err(ConfigError::InvalidRange(
                "max_low_confidence_frames must be <= window_frames",
            ));
        }

        Ok(())
    }

    fn validate_cue_engine(&self) -> Result<(), ConfigError> {
        let cue = &self.cue_engine;
        if cue.max_active_cues == 0 || cue.history_length == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "max_active_cues and cue history_length must be > 0",
            ));
        }
        if cue.cue_expiry_secs <= 0.0 {
            return Err(ConfigError::ValueOutOfRange("cue_expiry_secs must be > 0"));
        }

        let triggers = &cue.triggers;
        if triggers.too_fast_secs >= triggers.too_slow_secs {
            return Err(ConfigError::InvalidRange(
                "too_fast_secs must be < too_slow_secs",
            ));
        }
        if triggers.halfway_min_progress > triggers.halfway_max_progress {
            return Err(ConfigError::InvalidRange(
                "halfway_min_progress must be <= halfway_max_progress",
            ));
        }

        Ok(())
    }

    fn validate_difficulty(&self) -> Result<(), ConfigError> {
        let thresholds = &self.difficulty.thresholds;
        if thresholds.regression_completion >= thresholds.progression_completion {
            return Err(ConfigError::InvalidRange(
                "regression_completion must be < progression_completion",
            ));
        }
        if thresholds.max_progression_effort >= thresholds.regression_effort {
            return Err(ConfigError::InvalidRange(
                "max_progression_effort must be < regression_effort",
            ));
        }
        if thresholds.recent_sets_window == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "recent_sets_window must be > 0",
            ));
        }

        let fatigue = &self.difficulty.fatigue;
        let ascending = fatigue.no_change_max <= fatigue.cancel_progression_above
            && fatigue.cancel_progression_above <= fatigue.force_regression_above;
        let bounded = fatigue.no_change_max >= 0.0 && fatigue.force_regression_above <= 1.0;
        if !(ascending && bounded) {
            return Err(ConfigError::InvalidRange(
                "fatigue thresholds must be ascending within [0, 1]",
            ));
        }
        if fatigue.reduction_factor <= 0.0 || fatigue.reduction_factor >= 1.0 {
            return Err(ConfigError::InvalidWeights(
                "fatigue reduction_factor must be within (0, 1)",
            ));
        }

        Ok(())
    }

    /// Helper function to parse and apply an environment variable override
    ///
    /// An unset variable keeps the default; a value that is not valid unicode is an error.
    fn apply_env_var<T: FromStr>(env_var_name: &str, target: &mut T) -> Result<(), ConfigError> {
        let val = match env::var(env_var_name) {
            Ok(val) => val,
            Err(VarError::NotPresent) => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        *target = val
            .parse()
            .map_err(|_| ConfigError::Parse(format!("Invalid {env_var_name}")))?;
        Ok(())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Classifier buffers
        Self::apply_env_var(
            "FORMCOACH_POSE_HISTORY_LENGTH",
            &mut self.classifier.pose_history_length,
        )?;
        Self::apply_env_var(
            "FORMCOACH_REP_HISTORY_LENGTH",
            &mut self.classifier.rep_history_length,
        )?;
        Self::apply_env_var(
            "FORMCOACH_MIN_CLASSIFICATION_FRAMES",
            &mut self.classifier.min_classification_frames,
        )?;

        // Cue engine
        Self::apply_env_var(
            "FORMCOACH_MAX_ACTIVE_CUES",
            &mut self.cue_engine.max_active_cues,
        )?;
        Self::apply_env_var(
            "FORMCOACH_CUE_EXPIRY_SECS",
            &mut self.cue_engine.cue_expiry_secs,
        )?;
        Self::apply_env_var(
            "FORMCOACH_CUE_HISTORY_LENGTH",
            &mut self.cue_engine.history_length,
        )?;

        // Difficulty thresholds
        Self::apply_env_var(
            "FORMCOACH_PROGRESSION_COMPLETION",
            &mut self.difficulty.thresholds.progression_completion,
        )?;
        Self::apply_env_var(
            "FORMCOACH_REGRESSION_COMPLETION",
            &mut self.difficulty.thresholds.regression_completion,
        )?;
        Self::apply_env_var(
            "FORMCOACH_FORM_THRESHOLD",
            &mut self.difficulty.thresholds.form_threshold,
        )?;
        Self::apply_env_var(
            "FORMCOACH_TEMPO_THRESHOLD",
            &mut self.difficulty.thresholds.tempo_threshold,
        )?;
        Self::apply_env_var(
            "FORMCOACH_MIN_SESSIONS_BEFORE_PROGRESSION",
            &mut self.difficulty.thresholds.min_sessions_before_progression,
        )?;
        Self::apply_env_var(
            "FORMCOACH_FATIGUE_REDUCTION_FACTOR",
            &mut self.difficulty.fatigue.reduction_factor,
        )?;

        Ok(self)
    }
}
