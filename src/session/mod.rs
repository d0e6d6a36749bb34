// ABOUTME: Per-session coaching pipeline wiring the classifier, cue engine, and session context
// ABOUTME: Processes frames strictly in arrival order and summarizes completed sets
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Coaching sessions
//!
//! A [`CoachingSession`] owns exactly one classifier, one cue engine, and one
//! [`SessionContext`]. It is single-writer: callers feed it frames in arrival
//! order. Many sessions live side by side in a [`SessionRegistry`].

/// Concurrent registry of isolated sessions
pub mod registry;

pub use registry::SessionRegistry;

use chrono::{DateTime, Utc};
use formcoach_core::models::{
    CoachingCue, ExerciseType, FeedbackLevel, FrameResult, PerformanceMetrics, PoseFrame,
    RepMetrics, SessionContext,
};
use formcoach_intelligence::{CoachingConfig, CueEngine, ExerciseClassifier};
use serde::{Deserialize, Serialize};
use std::mem;
use tracing::info;
use uuid::Uuid;

/// Output of one tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTick {
    /// Classifier result for the frame
    pub frame: FrameResult,
    /// Cues emitted on this tick, highest priority first
    pub cues: Vec<CoachingCue>,
}

/// Control commands accepted by a running session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SessionCommand {
    /// Clear all per-session state
    Reset,
    /// Select the exercise manually
    SetExercise {
        /// Exercise to track
        exercise: ExerciseType,
    },
}

/// Options for a new session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Target reps for each set
    pub target_reps: Option<u32>,
    /// Cue verbosity
    pub feedback_level: FeedbackLevel,
    /// Exercise to track instead of auto-detecting
    pub exercise: Option<ExerciseType>,
}

/// One user's live coaching pipeline
#[derive(Debug)]
pub struct CoachingSession {
    id: Uuid,
    classifier: ExerciseClassifier,
    cue_engine: CueEngine,
    context: SessionContext,
    set_reps: Vec<RepMetrics>,
    set_started_at: Option<f64>,
    last_timestamp: Option<f64>,
}

impl CoachingSession {
    /// Create a session from the coaching configuration
    #[must_use]
    pub fn new(user_id: Uuid, options: &SessionOptions, config: &CoachingConfig) -> Self {
        let id = Uuid::new_v4();
        let mut context =
            SessionContext::new(id, user_id).with_feedback_level(options.feedback_level);
        context.target_reps = options.target_reps;

        let mut classifier = ExerciseClassifier::new(config.classifier.clone());
        if let Some(exercise) = options.exercise {
            classifier.set_exercise(exercise);
        }

        info!(
            session_id = %id,
            user_id = %user_id,
            exercise = ?options.exercise,
            target_reps = ?options.target_reps,
            "Coaching session started"
        );

        Self {
            id,
            classifier,
            cue_engine: CueEngine::new(config.cue_engine.clone()),
            context,
            set_reps: Vec::new(),
            set_started_at: None,
            last_timestamp: None,
        }
    }

    /// Session identifier
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Aggregated context read by the cue engine
    #[must_use]
    pub const fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Mutable context, e.g. to update fatigue from an external signal
    pub fn context_mut(&mut self) -> &mut SessionContext {
        &mut self.context
    }

    /// The session's classifier
    #[must_use]
    pub const fn classifier(&self) -> &ExerciseClassifier {
        &self.classifier
    }

    /// The session's cue engine
    #[must_use]
    pub const fn cue_engine(&self) -> &CueEngine {
        &self.cue_engine
    }

    /// Reps completed in the current set
    #[must_use]
    pub fn set_reps(&self) -> &[RepMetrics] {
        &self.set_reps
    }

    /// Run one frame through classifier, context, and cue engine
    pub fn process_frame(&mut self, frame: &PoseFrame) -> SessionTick {
        let result = self.classifier.ingest(frame);
        self.context.update_from_frame(&result);

        if self.set_started_at.is_none() {
            self.set_started_at = Some(result.timestamp);
        }
        self.last_timestamp = Some(result.timestamp);
        if let Some(rep) = &result.completed_rep {
            self.set_reps.push(rep.clone());
        }

        let cues = self.cue_engine.process(&result, &self.context);
        SessionTick {
            frame: result,
            cues,
        }
    }

    /// Apply a control command
    pub fn apply(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Reset => self.reset(),
            SessionCommand::SetExercise { exercise } => {
                self.classifier.set_exercise(exercise);
                self.context.exercise = exercise;
            }
        }
    }

    /// Clear classifier, cue engine, set progress, and the session clock
    pub fn reset(&mut self) {
        self.classifier.reset();
        self.cue_engine.reset();
        self.context.reset();
        self.set_reps.clear();
        self.set_started_at = None;
        self.last_timestamp = None;
        info!(session_id = %self.id, "Coaching session reset");
    }

    /// Summarize the current set and start the next one.
    ///
    /// The committed exercise carries over; rep counting restarts from zero.
    pub fn complete_set(&mut self, effort: u8, timestamp: DateTime<Utc>) -> PerformanceMetrics {
        let exercise = self.classifier.exercise();
        let reps = mem::take(&mut self.set_reps);
        let duration = match (self.set_started_at.take(), self.last_timestamp.take()) {
            (Some(start), Some(end)) => (end - start).max(0.0),
            _ => 0.0,
        };
        let target_reps = self
            .context
            .target_reps
            .unwrap_or_else(|| u32::try_from(reps.len()).unwrap_or(u32::MAX));

        let metrics =
            PerformanceMetrics::from_reps(exercise, &reps, target_reps, effort, duration, timestamp);

        self.classifier.reset();
        if exercise.is_known() {
            self.classifier.set_exercise(exercise);
        }
        self.context.reset_progress();
        self.context.exercise = exercise;

        info!(
            session_id = %self.id,
            exercise = %exercise,
            actual_reps = metrics.actual_reps,
            target_reps = metrics.target_reps,
            form_score = metrics.form_score,
            "Set completed"
        );
        metrics
    }
}
