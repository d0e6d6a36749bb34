// ABOUTME: Immutable catalog of coaching cue templates and per-category throttle rules
// ABOUTME: Validates template priorities against their category band at construction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Cue catalog
//!
//! Templates and throttle rules are built once and shared between sessions
//! behind an `Arc`. Nothing in this module mutates after construction.

use formcoach_core::errors::{AppError, AppResult};
use formcoach_core::models::CueCategory;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifier of a cue template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueKey {
    /// Knees collapsing inwards
    KneeValgus,
    /// Torso leaning too far forward
    ExcessiveForwardLean,
    /// Joints locked out
    Hyperextension,
    /// Squat not deep enough
    ShallowSquat,
    /// Push-up not deep enough
    IncompletePushup,
    /// Lunge not deep enough
    ShallowLunge,
    /// Back rounding
    RoundedBack,
    /// Shoulders shrugging up
    DroppedShoulders,
    /// Rep too fast
    TooFast,
    /// Rep too slow
    TooSlow,
    /// Uneven rep timing
    InconsistentTempo,
    /// Praise for good form
    GoodForm,
    /// Halfway through the set
    HalfwayEncouragement,
    /// Last reps of the set
    FinalPush,
    /// Set finished
    SetComplete,
    /// Breathe steadily
    BreathingReminder,
    /// Brace the core
    CoreEngagement,
}

impl CueKey {
    /// Snake-case key, used in cue ids and metadata
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::KneeValgus => "knee_valgus",
            Self::ExcessiveForwardLean => "excessive_forward_lean",
            Self::Hyperextension => "hyperextension",
            Self::ShallowSquat => "shallow_squat",
            Self::IncompletePushup => "incomplete_pushup",
            Self::ShallowLunge => "shallow_lunge",
            Self::RoundedBack => "rounded_back",
            Self::DroppedShoulders => "dropped_shoulders",
            Self::TooFast => "too_fast",
            Self::TooSlow => "too_slow",
            Self::InconsistentTempo => "inconsistent_tempo",
            Self::GoodForm => "good_form",
            Self::HalfwayEncouragement => "halfway_encouragement",
            Self::FinalPush => "final_push",
            Self::SetComplete => "set_complete",
            Self::BreathingReminder => "breathing_reminder",
            Self::CoreEngagement => "core_engagement",
        }
    }
}

impl fmt::Display for CueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Condition that raises a template, for display and auditing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerDescriptor {
    /// Metric inspected
    pub metric: String,
    /// Condition on the metric (e.g. `> 15`)
    pub condition: String,
}

/// Catalog entry a cue is instantiated from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CueTemplate {
    /// Template key
    pub key: CueKey,
    /// Category
    pub category: CueCategory,
    /// Base priority (must lie in the category band)
    pub priority: u8,
    /// Display message
    pub message: String,
    /// Spoken text
    pub spoken_text: String,
    /// Body part the cue refers to
    pub body_part: Option<String>,
    /// Trigger descriptor
    pub trigger: Option<TriggerDescriptor>,
}

impl CueTemplate {
    /// Conditions map stamped on instantiated cues
    #[must_use]
    pub fn conditions(&self) -> HashMap<String, String> {
        self.trigger
            .iter()
            .map(|trigger| (trigger.metric.clone(), trigger.condition.clone()))
            .collect()
    }
}

fn template(
    key: CueKey,
    category: CueCategory,
    priority: u8,
    message: &str,
    spoken_text: &str,
    body_part: Option<&str>,
    trigger: Option<(&str, &str)>,
) -> CueTemplate {
    CueTemplate {
        key,
        category,
        priority,
        message: message.to_owned(),
        spoken_text: spoken_text.to_owned(),
        body_part: body_part.map(str::to_owned),
        trigger: trigger.map(|(metric, condition)| TriggerDescriptor {
            metric: metric.to_owned(),
            condition: condition.to_owned(),
        }),
    }
}

fn standard_templates() -> Vec<CueTemplate> {
    use CueCategory::{Form, Instruction, Motivation, Safety, Tempo};

    vec![
        template(
            CueKey::KneeValgus,
            Safety,
            10,
            "Keep your knees aligned over your toes",
            "Keep knees over toes for safety",
            Some("knees"),
            Some(("knee_angle_deviation", "> 15")),
        ),
        template(
            CueKey::ExcessiveForwardLean,
            Safety,
            10,
            "Avoid leaning too far forward",
            "Don't lean forward too much",
            Some("torso"),
            Some(("torso_angle", "> 45")),
        ),
        template(
            CueKey::Hyperextension,
            Safety,
            10,
            "Don't lock your joints completely",
            "Avoid locking your joints",
            Some("joints"),
            Some(("elbow_angle", "> 175")),
        ),
        template(
            CueKey::ShallowSquat,
            Form,
            8,
            "Go deeper for full range of motion",
            "Squat deeper for better results",
            Some("legs"),
            Some(("knee_angle", "> 120")),
        ),
        template(
            CueKey::IncompletePushup,
            Form,
            8,
            "Lower your chest closer to the ground",
            "Go lower for full range",
            Some("chest"),
            Some(("elbow_angle", "> 120")),
        ),
        template(
            CueKey::ShallowLunge,
            Form,
            8,
            "Drop your back knee closer to the floor",
            "Lower your back knee",
            Some("legs"),
            Some(("front_knee_angle", "> 120")),
        ),
        template(
            CueKey::RoundedBack,
            Form,
            8,
            "Keep your back straight and core engaged",
            "Straighten your back and engage core",
            Some("back"),
            None,
        ),
        template(
            CueKey::DroppedShoulders,
            Form,
            7,
            "Keep your shoulders down and back",
            "Shoulders down and back",
            Some("shoulders"),
            None,
        ),
        template(
            CueKey::TooFast,
            Tempo,
            5,
            "Slow down and control the movement",
            "Slow down for better control",
            None,
            Some(("rep_duration", "< 2")),
        ),
        template(
            CueKey::TooSlow,
            Tempo,
            5,
            "Pick up the pace slightly",
            "Speed up a little",
            None,
            Some(("rep_duration", "> 6")),
        ),
        template(
            CueKey::InconsistentTempo,
            Tempo,
            5,
            "Try to maintain consistent timing",
            "Keep consistent timing",
            None,
            None,
        ),
        template(
            CueKey::GoodForm,
            Motivation,
            3,
            "Excellent form! Keep it up!",
            "Great form! Keep going!",
            None,
            None,
        ),
        template(
            CueKey::HalfwayEncouragement,
            Motivation,
            3,
            "You're halfway there! Push through!",
            "Halfway done! You got this!",
            None,
            None,
        ),
        template(
            CueKey::FinalPush,
            Motivation,
            3,
            "Last few reps! Give it your all!",
            "Final reps! Push through!",
            None,
            None,
        ),
        template(
            CueKey::SetComplete,
            Motivation,
            3,
            "Great set! Take a moment to rest.",
            "Awesome set! Rest up.",
            None,
            None,
        ),
        template(
            CueKey::BreathingReminder,
            Instruction,
            5,
            "Remember to breathe steadily",
            "Don't forget to breathe",
            None,
            None,
        ),
        template(
            CueKey::CoreEngagement,
            Instruction,
            5,
            "Engage your core throughout the movement",
            "Keep your core tight",
            Some("core"),
            None,
        ),
    ]
}

/// Immutable template catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CueCatalog {
    templates: HashMap<CueKey, CueTemplate>,
}

impl CueCatalog {
    /// Build a catalog from templates
    ///
    /// # Errors
    ///
    /// Returns an error if a template's priority falls outside its category band
    /// or a key appears twice
    pub fn new(templates: impl IntoIterator<Item = CueTemplate>) -> AppResult<Self> {
        let mut by_key = HashMap::new();
        for template in templates {
            if !template.category.priority_range().contains(&template.priority) {
                return Err(AppError::config(format!(
                    "Cue template {} has priority {} outside the {} band {:?}",
                    template.key,
                    template.priority,
                    template.category,
                    template.category.priority_range()
                )));
            }
            let key = template.key;
            if by_key.insert(key, template).is_some() {
                return Err(AppError::already_exists(format!("Cue template {key}")));
            }
        }
        Ok(Self { templates: by_key })
    }

    /// The standard coaching catalog
    #[must_use]
    pub fn standard() -> Self {
        Self {
            templates: standard_templates()
                .into_iter()
                .map(|template| (template.key, template))
                .collect(),
        }
    }

    /// Look up a template
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the catalog has no template for `key`
    pub fn get(&self, key: CueKey) -> AppResult<&CueTemplate> {
        self.templates
            .get(&key)
            .ok_or_else(|| AppError::not_found(format!("Cue template {key}")))
    }

    /// All templates, in no particular order
    pub fn templates(&self) -> impl Iterator<Item = &CueTemplate> {
        self.templates.values()
    }

    /// Number of templates
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Spacing and budget for one category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThrottleRule {
    /// Minimum seconds between two cues of the category
    pub min_interval_secs: f64,
    /// Cues allowed in any rolling 60 s window
    pub max_per_minute: usize,
}

impl Default for ThrottleRule {
    fn default() -> Self {
        Self {
            min_interval_secs: 5.0,
            max_per_minute: 6,
        }
    }
}

/// Throttle rules per category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrottleRules {
    rules: HashMap<CueCategory, ThrottleRule>,
}

impl ThrottleRules {
    /// Standard rules
    #[must_use]
    pub fn standard() -> Self {
        let rules = [
            (CueCategory::Safety, 2.0, 10),
            (CueCategory::Form, 5.0, 6),
            (CueCategory::Tempo, 8.0, 4),
            (CueCategory::Motivation, 15.0, 2),
            (CueCategory::Instruction, 10.0, 3),
        ]
        .into_iter()
        .map(|(category, min_interval_secs, max_per_minute)| {
            (
                category,
                ThrottleRule {
                    min_interval_secs,
                    max_per_minute,
                },
            )
        })
        .collect();
        Self { rules }
    }

    /// Replace the rule of one category
    #[must_use]
    pub fn with_rule(mut self, category: CueCategory, rule: ThrottleRule) -> Self {
        self.rules.insert(category, rule);
        self
    }

    /// Rule for a category; categories without a rule use [`ThrottleRule::default`]
    #[must_use]
    pub fn rule(&self, category: CueCategory) -> ThrottleRule {
        self.rules.get(&category).copied().unwrap_or_default()
    }
}

impl Default for ThrottleRules {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_passes_validation() {
        let standard = CueCatalog::standard();
        let validated = CueCatalog::new(standard.templates().cloned());
        assert!(validated.is_ok());
        assert_eq!(standard.len(), 17);
    }

    #[test]
    fn test_rejects_priority_outside_band() {
        let bad = template(
            CueKey::GoodForm,
            CueCategory::Motivation,
            9,
            "Nice",
            "Nice",
            None,
            None,
        );
        assert!(CueCatalog::new([bad]).is_err());
    }

    #[test]
    fn test_throttle_rules_per_category() {
        let rules = ThrottleRules::standard();
        assert!((rules.rule(CueCategory::Safety).min_interval_secs - 2.0).abs() < f64::EPSILON);
        assert_eq!(rules.rule(CueCategory::Motivation).max_per_minute, 2);
    }
}
