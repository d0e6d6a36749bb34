// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Pure data constants for pose geometry, rep scoring, cue timing, and buffers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single large file.
//! Tunable values have a matching field in the intelligence configuration; the
//! constants here are the defaults those fields start from.

/// Joint angle geometry
pub mod angles {
    /// Neutral "straight limb" angle used whenever a keypoint is missing
    pub const STRAIGHT_ANGLE_DEGREES: f64 = 180.0;
    /// Vector length below which an angle is considered degenerate
    pub const DEGENERATE_VECTOR_LENGTH: f64 = 1e-9;
}

/// Rep quality scoring
pub mod scoring {
    /// Form score before issue deductions
    pub const BASE_FORM_SCORE: f64 = 85.0;
    /// Points deducted per detected form issue
    pub const FORM_ISSUE_PENALTY: f64 = 5.0;
    /// Ideal rep duration in seconds
    pub const IDEAL_REP_DURATION_SECS: f64 = 3.0;
    /// Duration deviation tolerated without tempo penalty
    pub const TEMPO_TOLERANCE_SECS: f64 = 1.0;
    /// Tempo points deducted per second beyond tolerance
    pub const TEMPO_PENALTY_PER_SECOND: f64 = 20.0;
    /// Score reported by the placeholder ROM scorer
    pub const PLACEHOLDER_ROM_SCORE: f64 = 90.0;
    /// Lower bound of every 0-100 score
    pub const MIN_SCORE: f64 = 0.0;
    /// Upper bound of every 0-100 score
    pub const MAX_SCORE: f64 = 100.0;
}

/// Pose quality heuristics
pub mod pose_quality {
    /// Frames with confidence below this count as low quality
    pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.8;
    /// Number of recent frames inspected for quality issues
    pub const QUALITY_WINDOW_FRAMES: usize = 10;
    /// Low-confidence frames tolerated inside the window
    pub const MAX_LOW_CONFIDENCE_FRAMES: usize = 5;
    /// Issue text recorded for poor tracking quality
    pub const POOR_DETECTION_ISSUE: &str = "Poor pose detection quality";
}

/// Bounded buffer sizes
pub mod limits {
    /// Pose frames retained per session
    pub const POSE_HISTORY_LENGTH: usize = 100;
    /// Completed reps retained per session
    pub const REP_HISTORY_LENGTH: usize = 50;
    /// Frames required before the classifier commits to an exercise
    pub const MIN_CLASSIFICATION_FRAMES: usize = 10;
    /// Recent reps included in classifier stats
    pub const STATS_RECENT_REPS: usize = 5;
    /// Issues retained in a session context
    pub const RECENT_ISSUES_LENGTH: usize = 10;
    /// Simultaneously active coaching cues
    pub const MAX_ACTIVE_CUES: usize = 3;
    /// Emitted cues retained for statistics
    pub const CUE_HISTORY_LENGTH: usize = 50;
}

/// Coaching cue timing
pub mod cue_timing {
    /// Seconds a cue stays active after emission
    pub const CUE_EXPIRY_SECS: f64 = 10.0;
    /// Rolling window used for per-minute throttle budgets
    pub const THROTTLE_WINDOW_SECS: f64 = 60.0;
    /// Characters of the message used in the deduplication key
    pub const DEDUP_MESSAGE_PREFIX_CHARS: usize = 20;
}

/// Well-known keys in `SessionContext::form_scores`
pub mod form_score_keys {
    /// Running average over the session
    pub const OVERALL: &str = "overall";
    /// Score of the most recent rep
    pub const LAST_REP: &str = "last_rep";
}

/// Service identifiers used in structured logs
pub mod service_names {
    /// Coaching engine service
    pub const FORMCOACH: &str = "formcoach";
    /// Source tag stamped on engine-generated cues
    pub const CUE_SOURCE: &str = "coach_engine";
}
