// ABOUTME: Coaching intelligence engines for real-time exercise form feedback
// ABOUTME: Exercise classification, rep state machine, cue generation, and adaptive difficulty
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # `FormCoach` Intelligence
//!
//! Synchronous engines that turn pose frames into coaching. Every engine is a
//! plain function of `(state, input) -> (state, output)`; the catalogs they read
//! (transition tables, cue templates, throttle rules, progression ladders) are
//! immutable and shared behind `Arc`.
//!
//! ## Modules
//!
//! - **config**: Tunable thresholds loaded once with environment overrides
//! - **geometry**: Joint angle math over pose keypoints
//! - **`rep_fsm`**: Declarative per-exercise rep cycles and their stepper
//! - **`exercise_classifier`**: Exercise detection, rep counting, and rep scoring
//! - **`cue_catalog`**: Cue templates and per-category throttle rules
//! - **`cue_engine`**: Per-tick cue generation, filtering, and throttling
//! - **progression**: Exercise variation ladders
//! - **`difficulty_engine`**: Progression/regression recommendations from completed sets

/// Coaching configuration with environment overrides
pub mod config;

/// Joint angle geometry
pub mod geometry;

/// Rep counting state machine tables
pub mod rep_fsm;

/// Exercise classification and rep tracking
pub mod exercise_classifier;

/// Cue template catalog and throttle rules
pub mod cue_catalog;

/// Coaching cue engine
pub mod cue_engine;

/// Progression ladders
pub mod progression;

/// Adaptive difficulty engine
pub mod difficulty_engine;

pub use config::{CoachingConfig, ConfigError};
pub use cue_catalog::{CueCatalog, CueKey, CueTemplate, ThrottleRule, ThrottleRules};
pub use cue_engine::{CueEngine, CueStats};
pub use difficulty_engine::{AdaptiveDifficultyEngine, PerformanceSummary};
pub use exercise_classifier::{
    ClassifierState, ClassifierStats, ConstantRomScorer, DepthRomScorer, ExerciseClassifier,
    RomScorer,
};
pub use progression::{ProgressionCatalog, ProgressionLadder, Rung, TargetRange, VolumeStep};
pub use rep_fsm::{PrimaryJoint, RepCycle, TransitionTable};
