// ABOUTME: Main library entry point for the FormCoach real-time exercise coaching pipeline
// ABOUTME: Wires pose classification, cue generation, and adaptive difficulty into sessions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # `FormCoach`
//!
//! Real-time exercise form coaching from pose keypoints. Each frame of
//! keypoints is classified into an exercise and rep phase, turned into a small
//! set of prioritized coaching cues, and completed sets feed an adaptive
//! difficulty engine that recommends the next workout.
//!
//! ## Architecture
//!
//! - **`formcoach_core`**: Errors, constants, and data models
//! - **`formcoach_intelligence`**: Classifier, rep state machine, cue engine, difficulty engine
//! - **session**: Per-user pipelines and the concurrent session registry
//! - **replay**: Loading recorded frames for offline runs
//! - **logging**: Structured `tracing` setup
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use formcoach::replay::read_frames;
//! use formcoach::session::{SessionOptions, SessionRegistry};
//! use formcoach_core::errors::AppResult;
//! use formcoach_intelligence::CoachingConfig;
//! use uuid::Uuid;
//!
//! fn main() -> AppResult<()> {
//!     let registry = SessionRegistry::new(CoachingConfig::default());
//!     let session_id = registry.create(Uuid::new_v4(), &SessionOptions::default());
//!
//!     for frame in read_frames("workout.jsonl")? {
//!         let tick = registry.process_frame(session_id, &frame)?;
//!         for cue in &tick.cues {
//!             println!("{}", cue.message);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

/// Structured logging configuration
pub mod logging;

/// Recorded frame loading for offline replay
pub mod replay;

/// Coaching sessions and the session registry
pub mod session;

pub use formcoach_core::errors::{AppError, AppResult, ErrorCode};
pub use session::{CoachingSession, SessionCommand, SessionOptions, SessionRegistry, SessionTick};
