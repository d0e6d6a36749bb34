// ABOUTME: Configuration module for formcoach-intelligence crate
// ABOUTME: Re-exports coaching configuration types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Coaching engine configuration (classifier, cues, difficulty)
pub mod intelligence;

pub use intelligence::{CoachingConfig, ConfigError};
