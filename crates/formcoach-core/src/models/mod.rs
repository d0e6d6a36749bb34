// ABOUTME: Domain models shared by the coaching engines
// ABOUTME: Pose input, per-tick analysis, cues, session context, and set performance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Per-tick analysis output (joint angles, frame results)
pub mod analysis;
/// Coaching cue models
pub mod cue;
/// Exercise type, rep phase, and rep metrics
pub mod exercise;
/// Set performance, user capabilities, and difficulty adjustments
pub mod performance;
/// Pose frames and keypoints
pub mod pose;
/// Session context
pub mod session;

pub use analysis::{FrameMetrics, FrameResult, Joint, JointAngles};
pub use cue::{CoachingCue, CueCategory};
pub use exercise::{ExerciseType, RepMetrics, RepPhase};
pub use performance::{
    AdjustmentType, DifficultyAdjustment, FitnessLevel, PerformanceMetrics, UserCapabilities,
};
pub use pose::{Keypoint, Landmark, PoseFrame};
pub use session::{FeedbackLevel, SessionContext, UserPreferences};
