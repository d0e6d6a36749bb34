// ABOUTME: Exercise type, rep phase, and per-rep metric models
// ABOUTME: Closed enums with parsing/display plus the immutable RepMetrics record
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Exercises the coaching engine understands
///
/// Committed once per session and kept until an explicit reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExerciseType {
    /// Push-up
    PushUp,
    /// Bodyweight squat
    Squat,
    /// Lunge
    Lunge,
    /// Plank hold
    Plank,
    /// Jumping jack
    JumpingJack,
    /// Not yet identified
    #[default]
    Unknown,
}

impl ExerciseType {
    /// Every exercise type
    pub const ALL: [Self; 6] = [
        Self::PushUp,
        Self::Squat,
        Self::Lunge,
        Self::Plank,
        Self::JumpingJack,
        Self::Unknown,
    ];

    /// Canonical kebab-case name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PushUp => "push-up",
            Self::Squat => "squat",
            Self::Lunge => "lunge",
            Self::Plank => "plank",
            Self::JumpingJack => "jumping-jack",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the exercise has been identified
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExerciseType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "push-up" | "push-ups" | "pushup" | "pushups" => Ok(Self::PushUp),
            "squat" | "squats" => Ok(Self::Squat),
            "lunge" | "lunges" => Ok(Self::Lunge),
            "plank" | "planks" => Ok(Self::Plank),
            "jumping-jack" | "jumping-jacks" | "jumpingjack" | "jumpingjacks" => {
                Ok(Self::JumpingJack)
            }
            "unknown" => Ok(Self::Unknown),
            _ => Err(AppError::invalid_input(format!("Unknown exercise type: {s}"))),
        }
    }
}

/// Phases of one repetition, in cycle order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepPhase {
    /// Not moving
    #[default]
    Rest,
    /// Movement has begun
    Starting,
    /// Lowering phase
    Eccentric,
    /// Deepest point
    Bottom,
    /// Lifting phase
    Concentric,
    /// Near full extension
    Top,
    /// Rep finished; folded back to `Rest` on the same tick
    Completed,
}

impl RepPhase {
    /// Canonical snake-case name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rest => "rest",
            Self::Starting => "starting",
            Self::Eccentric => "eccentric",
            Self::Bottom => "bottom",
            Self::Concentric => "concentric",
            Self::Top => "top",
            Self::Completed => "completed",
        }
    }

    /// Lowering or holding at the bottom, where depth matters
    #[must_use]
    pub const fn is_descending(&self) -> bool {
        matches!(self, Self::Eccentric | Self::Bottom)
    }

    /// Actively moving (lowering or lifting)
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        matches!(self, Self::Eccentric | Self::Concentric)
    }
}

impl fmt::Display for RepPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quality record for one completed rep. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepMetrics {
    /// 1-based rep number within the session
    pub rep_number: u32,
    /// Seconds from STARTING to COMPLETED
    pub duration: f64,
    /// Form score (0-100)
    pub form_score: f64,
    /// Tempo score (0-100)
    pub tempo_score: f64,
    /// Range-of-motion score (0-100)
    pub rom_score: f64,
    /// Seconds spent in each phase of the rep
    #[serde(default)]
    pub phase_durations: BTreeMap<RepPhase, f64>,
    /// Deepest angles reached during the rep, keyed by joint name
    #[serde(default)]
    pub peak_angles: BTreeMap<String, f64>,
    /// Form issues detected during the rep
    #[serde(default)]
    pub issues: Vec<String>,
}
