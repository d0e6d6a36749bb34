// ABOUTME: Exercise classifier configuration for buffers, detection heuristics, and rep scoring
// ABOUTME: Defaults mirror the constants in formcoach-core and can be overridden via environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Exercise Classifier Configuration
//!
//! Buffer sizes, the geometric heuristics used to identify an exercise, and the
//! parameters of per-rep form/tempo scoring.

use formcoach_core::constants::{limits, pose_quality, scoring};
use serde::{Deserialize, Serialize};

/// Exercise Classifier Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Pose frames retained per session
    pub pose_history_length: usize,
    /// Completed reps retained per session
    pub rep_history_length: usize,
    /// Frames buffered before classification is attempted
    pub min_classification_frames: usize,
    /// Angle above which a descending rep is reported as too shallow (degrees)
    pub depth_feedback_threshold: f64,
    /// Exercise detection heuristics
    pub detection: DetectionConfig,
    /// Rep scoring parameters
    pub scoring: RepScoringConfig,
    /// Pose quality heuristics
    pub quality: PoseQualityConfig,
}

/// Geometric heuristics for exercise detection (normalized coordinates)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Maximum vertical gap between shoulders and hips for a horizontal body
    pub pushup_max_torso_drop: f64,
    /// Lower bound (exclusive) of ankle/shoulder separation ratio for squats
    pub squat_min_stance_ratio: f64,
    /// Upper bound (exclusive) of ankle/shoulder separation ratio for squats
    pub squat_max_stance_ratio: f64,
    /// Minimum depth gap between ankles for a split stance
    pub lunge_min_ankle_depth_gap: f64,
    /// Minimum height gap between knees for a split stance
    pub lunge_min_knee_height_gap: f64,
}

/// Per-rep scoring parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepScoringConfig {
    /// Form score before issue deductions
    pub base_form_score: f64,
    /// Points deducted per form issue
    pub form_issue_penalty: f64,
    /// Ideal rep duration (seconds)
    pub ideal_rep_duration_secs: f64,
    /// Deviation tolerated without penalty (seconds)
    pub tempo_tolerance_secs: f64,
    /// Points deducted per second beyond tolerance
    pub tempo_penalty_per_second: f64,
}

/// Pose tracking quality heuristics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseQualityConfig {
    /// Confidence below which a frame counts as low quality
    pub low_confidence_threshold: f64,
    /// Number of recent frames inspected
    pub window_frames: usize,
    /// Low-confidence frames tolerated in the window
    pub max_low_confidence_frames: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            pose_history_length: limits::POSE_HISTORY_LENGTH,
            rep_history_length: limits::REP_HISTORY_LENGTH,
            min_classification_frames: limits::MIN_CLASSIFICATION_FRAMES,
            depth_feedback_threshold: 120.0,
            detection: DetectionConfig::default(),
            scoring: RepScoringConfig::default(),
            quality: PoseQualityConfig::default(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            pushup_max_torso_drop: 0.2,
            squat_min_stance_ratio: 0.8,
            squat_max_stance_ratio: 1.5,
            lunge_min_ankle_depth_gap: 0.3,
            lunge_min_knee_height_gap: 0.1,
        }
    }
}

impl Default for RepScoringConfig {
    fn default() -> Self {
        Self {
            base_form_score: scoring::BASE_FORM_SCORE,
            form_issue_penalty: scoring::FORM_ISSUE_PENALTY,
            ideal_rep_duration_secs: scoring::IDEAL_REP_DURATION_SECS,
            tempo_tolerance_secs: scoring::TEMPO_TOLERANCE_SECS,
            tempo_penalty_per_second: scoring::TEMPO_PENALTY_PER_SECOND,
        }
    }
}

impl Default for PoseQualityConfig {
    fn default() -> Self {
        Self {
            low_confidence_threshold: pose_quality::LOW_CONFIDENCE_THRESHOLD,
            window_frames: pose_quality::QUALITY_WINDOW_FRAMES,
            max_low_confidence_frames: pose_quality::MAX_LOW_CONFIDENCE_FRAMES,
        }
    }
}
