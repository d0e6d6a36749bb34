// ABOUTME: Per-session context aggregated from classifier output for cue generation
// ABOUTME: Tracks progress, form scores, recent issues, preferences, and fatigue
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::analysis::FrameResult;
use super::exercise::{ExerciseType, RepPhase};
use crate::constants::form_score_keys;
use crate::constants::limits::RECENT_ISSUES_LENGTH;
use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// How chatty the coach should be
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackLevel {
    /// No motivational cues
    Minimal,
    /// Default cue mix
    #[default]
    Normal,
    /// Default cue mix; reserved for richer spoken output
    Detailed,
}

impl FeedbackLevel {
    /// Lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Normal => "normal",
            Self::Detailed => "detailed",
        }
    }
}

impl fmt::Display for FeedbackLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minimal" => Ok(Self::Minimal),
            "normal" => Ok(Self::Normal),
            "detailed" => Ok(Self::Detailed),
            other => Err(AppError::invalid_input(format!(
                "Unknown feedback level: {other}"
            ))),
        }
    }
}

/// User preferences relevant to cue selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Feedback verbosity
    #[serde(default)]
    pub feedback_level: FeedbackLevel,
}

/// Live session state read by the cue engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Session identifier
    pub session_id: Uuid,
    /// User identifier
    pub user_id: Uuid,
    /// Current exercise
    pub exercise: ExerciseType,
    /// Current rep phase
    pub phase: RepPhase,
    /// Reps completed in the current set
    pub rep_count: u32,
    /// Target reps for the set, if any
    pub target_reps: Option<u32>,
    /// Named form scores (`overall`, `last_rep`, ...)
    ///
    /// Rep completion writes at most 85. Callers with a richer form model
    /// insert higher scores here to unlock praise and form-cue suppression.
    pub form_scores: HashMap<String, f64>,
    /// Most recent issues, oldest first
    pub recent_issues: VecDeque<String>,
    /// User preferences
    pub user_preferences: UserPreferences,
    /// Seconds since the first frame of the session
    pub session_duration: f64,
    /// Fatigue estimate in [0, 1]
    pub fatigue_level: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    started_at: Option<f64>,
    #[serde(default)]
    scored_reps: u32,
}

impl SessionContext {
    /// Create an empty context
    #[must_use]
    pub fn new(session_id: Uuid, user_id: Uuid) -> Self {
        Self {
            session_id,
            user_id,
            exercise: ExerciseType::Unknown,
            phase: RepPhase::Rest,
            rep_count: 0,
            target_reps: None,
            form_scores: HashMap::new(),
            recent_issues: VecDeque::new(),
            user_preferences: UserPreferences::default(),
            session_duration: 0.0,
            fatigue_level: 0.0,
            started_at: None,
            scored_reps: 0,
        }
    }

    /// Set the target reps
    #[must_use]
    pub const fn with_target_reps(mut self, target_reps: u32) -> Self {
        self.target_reps = Some(target_reps);
        self
    }

    /// Set the feedback level
    #[must_use]
    pub const fn with_feedback_level(mut self, level: FeedbackLevel) -> Self {
        self.user_preferences.feedback_level = level;
        self
    }

    /// Set the fatigue level, clamped to [0, 1]
    #[must_use]
    pub fn with_fatigue_level(mut self, fatigue_level: f64) -> Self {
        self.set_fatigue_level(fatigue_level);
        self
    }

    /// Update the fatigue level, clamped to [0, 1]
    pub fn set_fatigue_level(&mut self, fatigue_level: f64) {
        self.fatigue_level = if fatigue_level.is_finite() {
            fatigue_level.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    /// Progress towards the target, if a target is set
    #[must_use]
    pub fn progress(&self) -> Option<f64> {
        self.target_reps
            .filter(|target| *target > 0)
            .map(|target| f64::from(self.rep_count) / f64::from(target))
    }

    /// Mean of all recorded form scores (0 when none)
    #[must_use]
    pub fn average_form_score(&self) -> f64 {
        if self.form_scores.is_empty() {
            return 0.0;
        }
        self.form_scores.values().sum::<f64>() / self.form_scores.len() as f64
    }

    /// Fold one classifier result into the context
    pub fn update_from_frame(&mut self, frame: &FrameResult) {
        self.exercise = frame.exercise_type;
        self.phase = frame.phase;
        self.rep_count = frame.rep_count;

        let started_at = *self.started_at.get_or_insert(frame.timestamp);
        self.session_duration = (frame.timestamp - started_at).max(0.0);

        if let Some(rep) = &frame.completed_rep {
            self.record_rep_score(rep.form_score);
            for issue in &rep.issues {
                self.push_issue(issue.clone());
            }
        }
    }

    /// Clear per-set progress, keeping identity, preferences and the session clock
    pub fn reset_progress(&mut self) {
        self.exercise = ExerciseType::Unknown;
        self.phase = RepPhase::Rest;
        self.rep_count = 0;
        self.form_scores.clear();
        self.recent_issues.clear();
        self.scored_reps = 0;
    }

    /// Clear everything the session has observed, including the session clock.
    ///
    /// Identity, preferences, target and the externally supplied fatigue level stay.
    pub fn reset(&mut self) {
        self.reset_progress();
        self.started_at = None;
        self.session_duration = 0.0;
    }

    fn record_rep_score(&mut self, form_score: f64) {
        self.scored_reps += 1;
        let previous = self
            .form_scores
            .get(form_score_keys::OVERALL)
            .copied()
            .unwrap_or(form_score);
        let overall = previous + (form_score - previous) / f64::from(self.scored_reps);
        self.form_scores
            .insert(form_score_keys::OVERALL.to_owned(), overall);
        self.form_scores
            .insert(form_score_keys::LAST_REP.to_owned(), form_score);
    }

    fn push_issue(&mut self, issue: String) {
        self.recent_issues.push_back(issue);
        while self.recent_issues.len() > RECENT_ISSUES_LENGTH {
            self.recent_issues.pop_front();
        }
    }
}
