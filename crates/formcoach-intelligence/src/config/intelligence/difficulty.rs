// ABOUTME: Adaptive difficulty configuration for progression gates and fatigue scaling
// ABOUTME: Thresholds deciding progression/regression and how fatigue softens recommendations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Adaptive Difficulty Configuration

use serde::{Deserialize, Serialize};

/// Adaptive Difficulty Configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DifficultyConfig {
    /// Progression/regression decision thresholds
    pub thresholds: DifficultyThresholds,
    /// Fatigue scaling
    pub fatigue: FatigueConfig,
    /// Confidence attached to each kind of recommendation
    pub confidence: AdjustmentConfidence,
}

/// Decision thresholds applied to averaged recent sets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyThresholds {
    /// Completion rate required to progress
    pub progression_completion: f64,
    /// Completion rate below which to regress
    pub regression_completion: f64,
    /// Minimum form score to progress; below it regresses
    pub form_threshold: f64,
    /// Minimum tempo score to progress; below it regresses
    pub tempo_threshold: f64,
    /// Highest average effort (RPE) that still allows progression
    pub max_progression_effort: f64,
    /// Average effort (RPE) at or above which to regress
    pub regression_effort: f64,
    /// Sets since the last change required before progressing
    pub min_sessions_before_progression: usize,
    /// Most recent sets averaged per exercise
    pub recent_sets_window: usize,
}

/// Fatigue scaling of recommendations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FatigueConfig {
    /// Fatigue at or below which nothing changes
    pub no_change_max: f64,
    /// Fatigue above which progressions are cancelled
    pub cancel_progression_above: f64,
    /// Fatigue above which maintains become regressions
    pub force_regression_above: f64,
    /// Fraction removed from reps/duration on a forced regression
    pub reduction_factor: f64,
    /// Floor for reduced reps
    pub min_reps: u32,
    /// Floor for reduced durations (seconds)
    pub min_duration_secs: f64,
}

/// Confidence values attached to recommendations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentConfidence {
    /// Moving to another variation
    pub variation_change: f64,
    /// Changing volume within a variation
    pub volume_change: f64,
    /// Keeping the current prescription
    pub maintain: f64,
}

impl Default for DifficultyThresholds {
    fn default() -> Self {
        Self {
            progression_completion: 0.85,
            regression_completion: 0.60,
            form_threshold: 75.0,
            tempo_threshold: 70.0,
            max_progression_effort: 7.0,
            regression_effort: 9.0,
            min_sessions_before_progression: 2,
            recent_sets_window: 3,
        }
    }
}

impl Default for FatigueConfig {
    fn default() -> Self {
        Self {
            no_change_max: 0.3,
            cancel_progression_above: 0.6,
            force_regression_above: 0.7,
            reduction_factor: 0.15,
            min_reps: 1,
            min_duration_secs: 10.0,
        }
    }
}

impl Default for AdjustmentConfidence {
    fn default() -> Self {
        Self {
            variation_change: 0.9,
            volume_change: 0.8,
            maintain: 0.8,
        }
    }
}
