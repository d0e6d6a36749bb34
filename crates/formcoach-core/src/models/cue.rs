// ABOUTME: Coaching cue models shared by the cue engine and session pipeline
// ABOUTME: Category taxonomy with priority bands and the emitted CoachingCue record
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::exercise::RepPhase;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;

/// Cue categories, ordered from most to least urgent band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueCategory {
    /// Immediate injury risk
    Safety,
    /// Form corrections
    Form,
    /// General instructions (breathing, bracing)
    Instruction,
    /// Tempo and rhythm
    Tempo,
    /// Encouragement
    Motivation,
}

impl CueCategory {
    /// Every category
    pub const ALL: [Self; 5] = [
        Self::Safety,
        Self::Form,
        Self::Instruction,
        Self::Tempo,
        Self::Motivation,
    ];

    /// Priority band templates of this category must fall in
    #[must_use]
    pub const fn priority_range(&self) -> RangeInclusive<u8> {
        match self {
            Self::Safety => 10..=10,
            Self::Form => 7..=9,
            Self::Instruction => 5..=8,
            Self::Tempo => 4..=6,
            Self::Motivation => 1..=3,
        }
    }

    /// Snake-case category name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Safety => "safety",
            Self::Form => "form",
            Self::Instruction => "instruction",
            Self::Tempo => "tempo",
            Self::Motivation => "motivation",
        }
    }
}

impl fmt::Display for CueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A coaching message selected for delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingCue {
    /// Unique id: `{template}_{timestamp_ms}_{session_id}`
    pub id: String,
    /// Category
    pub category: CueCategory,
    /// Priority (1-10, higher is more urgent)
    pub priority: u8,
    /// Display message
    pub message: String,
    /// Text for speech synthesis
    pub spoken_text: String,
    /// Emission time in seconds (frame clock)
    pub timestamp: f64,
    /// When the cue stops being active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<f64>,
    /// Body part the cue refers to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_part: Option<String>,
    /// Rep phase at emission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_phase: Option<RepPhase>,
    /// Component that produced the cue
    pub source: String,
    /// Trigger conditions copied from the template
    #[serde(default)]
    pub conditions: HashMap<String, String>,
    /// Template key, exercise, and rep count at emission
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl CoachingCue {
    /// Whether the cue has expired at `now`
    #[must_use]
    pub fn is_expired(&self, now: f64) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}
