// ABOUTME: Core types and constants for the FormCoach exercise coaching engine
// ABOUTME: Foundation crate with error handling, pose and exercise models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # `FormCoach` Core
//!
//! Foundation crate providing shared types and constants for the `FormCoach`
//! coaching engine. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Scoring, angle, and landmark constants organized by domain
//! - **models**: Pose frames, exercise/phase enums, rep metrics, cues, and performance records
//! - **clock**: Per-session monotonic timestamp guard

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (`PoseFrame`, `ExerciseType`, `RepMetrics`, `CoachingCue`, ...)
pub mod models;

/// Monotonic timestamp guard for frame-driven clocks
pub mod clock;
