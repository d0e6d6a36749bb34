// ABOUTME: Set-level performance records, user capability profile, and difficulty adjustments
// ABOUTME: Inputs and outputs of the adaptive difficulty engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::exercise::{ExerciseType, RepMetrics};
use super::session::UserPreferences;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Performance of one completed set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Exercise performed
    pub exercise: ExerciseType,
    /// Reps completed
    pub actual_reps: u32,
    /// Reps targeted
    pub target_reps: u32,
    /// Mean form score (0-100)
    pub form_score: f64,
    /// Mean tempo score (0-100)
    pub tempo_score: f64,
    /// Mean range-of-motion score (0-100)
    pub rom_score: f64,
    /// `actual_reps / target_reps`
    pub completion_rate: f64,
    /// Rate of perceived exertion (1-10)
    pub effort: u8,
    /// Set duration in seconds
    pub duration: f64,
    /// When the set finished
    pub timestamp: DateTime<Utc>,
}

impl PerformanceMetrics {
    /// Summarize a set from its completed reps.
    ///
    /// Scores are averaged over `reps`; an empty set scores zero. Effort is clamped to 1-10.
    #[must_use]
    pub fn from_reps(
        exercise: ExerciseType,
        reps: &[RepMetrics],
        target_reps: u32,
        effort: u8,
        duration: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let actual_reps = u32::try_from(reps.len()).unwrap_or(u32::MAX);
        let mean = |score: fn(&RepMetrics) -> f64| {
            if reps.is_empty() {
                0.0
            } else {
                reps.iter().map(score).sum::<f64>() / reps.len() as f64
            }
        };

        Self {
            exercise,
            actual_reps,
            target_reps,
            form_score: mean(|rep| rep.form_score),
            tempo_score: mean(|rep| rep.tempo_score),
            rom_score: mean(|rep| rep.rom_score),
            completion_rate: Self::completion_rate_for(actual_reps, target_reps),
            effort: effort.clamp(1, 10),
            duration: duration.max(0.0),
            timestamp,
        }
    }

    /// Completion rate for a set; a zero target counts as fully completed
    #[must_use]
    pub fn completion_rate_for(actual_reps: u32, target_reps: u32) -> f64 {
        if target_reps == 0 {
            return 1.0;
        }
        f64::from(actual_reps) / f64::from(target_reps)
    }
}

/// Self-reported or assessed fitness level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitnessLevel {
    /// New to training
    Beginner,
    /// Regular training
    #[default]
    Intermediate,
    /// Experienced
    Advanced,
}

/// Read-only snapshot of what the user can currently do
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCapabilities {
    /// User identifier
    pub user_id: Uuid,
    /// Fitness level
    pub fitness_level: FitnessLevel,
    /// Past sets per exercise, oldest first
    #[serde(default)]
    pub exercise_history: HashMap<ExerciseType, Vec<PerformanceMetrics>>,
    /// Strength estimate per exercise (0-100)
    #[serde(default)]
    pub current_strength: HashMap<ExerciseType, f64>,
    /// Fatigue estimate in [0, 1]
    #[serde(default)]
    pub fatigue_level: f64,
    /// Active injury flags
    #[serde(default)]
    pub injury_flags: Vec<String>,
    /// Preferences
    #[serde(default)]
    pub preferences: UserPreferences,
    /// Variation currently trained per exercise
    #[serde(default)]
    pub current_variations: HashMap<ExerciseType, String>,
    /// When the difficulty of each exercise last changed
    #[serde(default)]
    pub last_difficulty_change: HashMap<ExerciseType, DateTime<Utc>>,
    /// When this snapshot was taken
    pub last_updated: DateTime<Utc>,
}

impl UserCapabilities {
    /// Empty profile for a user
    #[must_use]
    pub fn new(user_id: Uuid, fitness_level: FitnessLevel) -> Self {
        Self {
            user_id,
            fitness_level,
            exercise_history: HashMap::new(),
            current_strength: HashMap::new(),
            fatigue_level: 0.0,
            injury_flags: Vec::new(),
            preferences: UserPreferences::default(),
            current_variations: HashMap::new(),
            last_difficulty_change: HashMap::new(),
            last_updated: Utc::now(),
        }
    }

    /// Sets recorded for an exercise since its difficulty last changed
    #[must_use]
    pub fn sessions_since_change(&self, exercise: ExerciseType) -> usize {
        let Some(history) = self.exercise_history.get(&exercise) else {
            return 0;
        };
        self.last_difficulty_change
            .get(&exercise)
            .map_or(history.len(), |changed_at| {
                history
                    .iter()
                    .filter(|set| set.timestamp > *changed_at)
                    .count()
            })
    }

    /// Variation currently trained for an exercise, if recorded
    #[must_use]
    pub fn current_variation(&self, exercise: ExerciseType) -> Option<&str> {
        self.current_variations.get(&exercise).map(String::as_str)
    }
}

/// Direction of a difficulty recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentType {
    /// Make it harder
    Progression,
    /// Keep it as is
    Maintain,
    /// Make it easier
    Regression,
}

impl AdjustmentType {
    /// Lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Progression => "progression",
            Self::Maintain => "maintain",
            Self::Regression => "regression",
        }
    }
}

impl fmt::Display for AdjustmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommendation for one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyAdjustment {
    /// Exercise the recommendation applies to
    pub exercise: ExerciseType,
    /// Direction
    pub adjustment_type: AdjustmentType,
    /// Proposed reps per set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_reps: Option<u32>,
    /// Proposed number of sets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_sets: Option<u32>,
    /// Proposed hold duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_duration: Option<f64>,
    /// Proposed variation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modification: Option<String>,
    /// Human-readable rationale
    pub reasoning: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
}

impl DifficultyAdjustment {
    /// Recommendation with no proposed change
    #[must_use]
    pub fn maintain(exercise: ExerciseType, reasoning: impl Into<String>, confidence: f64) -> Self {
        Self {
            exercise,
            adjustment_type: AdjustmentType::Maintain,
            new_reps: None,
            new_sets: None,
            new_duration: None,
            modification: None,
            reasoning: reasoning.into(),
            confidence,
        }
    }

    /// Whether any concrete change is proposed
    #[must_use]
    pub const fn proposes_change(&self) -> bool {
        self.new_reps.is_some()
            || self.new_sets.is_some()
            || self.new_duration.is_some()
            || self.modification.is_some()
    }

    /// Drop every proposed change
    pub fn clear_changes(&mut self) {
        self.new_reps = None;
        self.new_sets = None;
        self.new_duration = None;
        self.modification = None;
    }
}
