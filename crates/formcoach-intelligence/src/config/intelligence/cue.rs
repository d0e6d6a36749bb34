// ABOUTME: Cue engine configuration for capacity, expiry, trigger thresholds, and reminders
// ABOUTME: Controls when candidate cues are generated and which are filtered by context
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use formcoach_core::constants::{cue_timing, limits};
use serde::{Deserialize, Serialize};

/// Cue Engine Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CueEngineConfig {
    /// Simultaneously active cues (also the per-tick emission cap)
    pub max_active_cues: usize,
    /// Seconds a cue stays active
    pub cue_expiry_secs: f64,
    /// Emitted cues retained for statistics
    pub history_length: usize,
    /// Candidate generation thresholds
    pub triggers: CueTriggerConfig,
    /// Context filter thresholds
    pub filters: CueFilterConfig,
    /// Instruction reminder timing
    pub reminders: ReminderConfig,
}

/// Thresholds that raise candidate cues
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CueTriggerConfig {
    /// Left/right knee difference that raises a knee alignment warning (degrees)
    pub knee_asymmetry_degrees: f64,
    /// Elbow angle above which joints count as locked out (degrees)
    pub hyperextension_degrees: f64,
    /// Primary angle above which a descending rep is too shallow (degrees)
    pub depth_threshold_degrees: f64,
    /// Reps faster than this are too fast (seconds)
    pub too_fast_secs: f64,
    /// Reps slower than this are too slow (seconds)
    pub too_slow_secs: f64,
    /// Lower bound of the halfway progress window
    pub halfway_min_progress: f64,
    /// Upper bound of the halfway progress window
    pub halfway_max_progress: f64,
    /// Progress at which the final push cue starts
    pub final_push_progress: f64,
    /// Average form score above which good form is praised
    pub good_form_score: f64,
}

/// Context filters applied after prioritization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CueFilterConfig {
    /// Form cues are suppressed when the overall form score exceeds this
    pub suppress_form_above_score: f64,
    /// Tempo cues are suppressed when fatigue exceeds this
    pub suppress_tempo_above_fatigue: f64,
}

/// Instruction reminder timing (seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Session length before breathing reminders start
    pub breathing_min_session_secs: f64,
    /// Minimum spacing of breathing reminders
    pub breathing_interval_secs: f64,
    /// Minimum spacing of core engagement reminders
    pub core_interval_secs: f64,
}

impl Default for CueEngineConfig {
    fn default() -> Self {
        Self {
            max_active_cues: limits::MAX_ACTIVE_CUES,
            cue_expiry_secs: cue_timing::CUE_EXPIRY_SECS,
            history_length: limits::CUE_HISTORY_LENGTH,
            triggers: CueTriggerConfig::default(),
            filters: CueFilterConfig::default(),
            reminders: ReminderConfig::default(),
        }
    }
}

impl Default for CueTriggerConfig {
    fn default() -> Self {
        Self {
            knee_asymmetry_degrees: 15.0,
            hyperextension_degrees: 175.0,
            depth_threshold_degrees: 120.0,
            too_fast_secs: 2.0,
            too_slow_secs: 6.0,
            halfway_min_progress: 0.4,
            halfway_max_progress: 0.6,
            final_push_progress: 0.8,
            good_form_score: 85.0,
        }
    }
}

impl Default for CueFilterConfig {
    fn default() -> Self {
        Self {
            suppress_form_above_score: 90.0,
            suppress_tempo_above_fatigue: 0.8,
        }
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            breathing_min_session_secs: 60.0,
            breathing_interval_secs: 30.0,
            core_interval_secs: 45.0,
        }
    }
}
