// ABOUTME: Adaptive difficulty engine recommending progression, maintenance, or regression per exercise
// ABOUTME: Averages recent sets, walks progression ladders, and softens recommendations under fatigue
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Adaptive difficulty
//!
//! [`AdaptiveDifficultyEngine::analyze`] turns a batch of completed sets into one
//! [`DifficultyAdjustment`] per exercise. Exercises are independent and are
//! evaluated in parallel; output keeps the batch's first-appearance order.

use crate::config::intelligence::DifficultyConfig;
use crate::progression::{ProgressionCatalog, ProgressionLadder, TargetRange, VolumeStep};
use formcoach_core::models::{
    AdjustmentType, DifficultyAdjustment, ExerciseType, FitnessLevel, PerformanceMetrics,
    UserCapabilities,
};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Averages over an exercise's most recent sets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceSummary {
    /// Mean completion rate
    pub completion_rate: f64,
    /// Mean form score
    pub form_score: f64,
    /// Mean tempo score
    pub tempo_score: f64,
    /// Mean effort (RPE)
    pub effort: f64,
}

impl PerformanceSummary {
    /// Average the last `window` sets; `None` when there are no sets
    #[must_use]
    pub fn from_recent(sets: &[&PerformanceMetrics], window: usize) -> Option<Self> {
        let recent = &sets[sets.len().saturating_sub(window.max(1))..];
        if recent.is_empty() {
            return None;
        }
        let count = recent.len() as f64;
        let mean = |value: fn(&PerformanceMetrics) -> f64| -> f64 {
            recent.iter().map(|set| value(set)).sum::<f64>() / count
        };
        Some(Self {
            completion_rate: mean(|set| set.completion_rate),
            form_score: mean(|set| set.form_score),
            tempo_score: mean(|set| set.tempo_score),
            effort: mean(|set| f64::from(set.effort)),
        })
    }
}

/// Stateless difficulty recommender over immutable ladders
#[derive(Debug, Clone)]
pub struct AdaptiveDifficultyEngine {
    config: DifficultyConfig,
    ladders: Arc<ProgressionCatalog>,
}

impl AdaptiveDifficultyEngine {
    /// Create an engine with the standard ladders
    #[must_use]
    pub fn new(config: DifficultyConfig) -> Self {
        Self::with_ladders(config, Arc::new(ProgressionCatalog::standard()))
    }

    /// Create an engine sharing an existing ladder catalog
    #[must_use]
    pub const fn with_ladders(config: DifficultyConfig, ladders: Arc<ProgressionCatalog>) -> Self {
        Self { config, ladders }
    }

    /// Engine configuration
    #[must_use]
    pub const fn config(&self) -> &DifficultyConfig {
        &self.config
    }

    /// Recommend one adjustment per exercise present in `batch`
    #[must_use]
    pub fn analyze(
        &self,
        batch: &[PerformanceMetrics],
        capabilities: &UserCapabilities,
    ) -> Vec<DifficultyAdjustment> {
        let mut order: Vec<ExerciseType> = Vec::new();
        let mut grouped: HashMap<ExerciseType, Vec<&PerformanceMetrics>> = HashMap::new();
        for set in batch {
            grouped
                .entry(set.exercise)
                .or_insert_with(|| {
                    order.push(set.exercise);
                    Vec::new()
                })
                .push(set);
        }

        let adjustments: Vec<DifficultyAdjustment> = order
            .par_iter()
            .filter_map(|exercise| {
                let sets = grouped.get(exercise)?;
                self.analyze_exercise(*exercise, sets, capabilities)
            })
            .collect();

        info!(
            user_id = %capabilities.user_id,
            sets = batch.len(),
            exercises = adjustments.len(),
            "Difficulty analysis complete"
        );
        adjustments
    }

    fn analyze_exercise(
        &self,
        exercise: ExerciseType,
        sets: &[&PerformanceMetrics],
        capabilities: &UserCapabilities,
    ) -> Option<DifficultyAdjustment> {
        let thresholds = &self.config.thresholds;
        let summary = PerformanceSummary::from_recent(sets, thresholds.recent_sets_window)?;
        let latest = *sets.last()?;

        let sessions_since_change = capabilities.sessions_since_change(exercise);
        let ready_to_progress = sessions_since_change >= thresholds.min_sessions_before_progression;

        debug!(
            exercise = %exercise,
            completion_rate = summary.completion_rate,
            form_score = summary.form_score,
            tempo_score = summary.tempo_score,
            effort = summary.effort,
            sessions_since_change,
            "Evaluating exercise difficulty"
        );

        let Some(ladder) = self.ladders.ladder(exercise) else {
            return Some(self.stable(exercise, &summary, None, latest));
        };

        let adjustment = if self.should_progress(&summary) && ready_to_progress {
            self.progression(exercise, ladder, latest, capabilities)
        } else if self.should_regress(&summary) {
            self.regression(exercise, ladder, latest, capabilities)
        } else {
            self.stable(exercise, &summary, Some(ladder), latest)
        };
        Some(adjustment)
    }

    /// Whether averaged performance clears every progression gate
    #[must_use]
    pub fn should_progress(&self, summary: &PerformanceSummary) -> bool {
        let thresholds = &self.config.thresholds;
        summary.completion_rate >= thresholds.progression_completion
            && summary.form_score >= thresholds.form_threshold
            && summary.tempo_score >= thresholds.tempo_threshold
            && summary.effort <= thresholds.max_progression_effort
    }

    /// Whether averaged performance trips any regression signal
    #[must_use]
    pub fn should_regress(&self, summary: &PerformanceSummary) -> bool {
        let thresholds = &self.config.thresholds;
        summary.completion_rate < thresholds.regression_completion
            || summary.form_score < thresholds.form_threshold
            || summary.tempo_score < thresholds.tempo_threshold
            || summary.effort >= thresholds.regression_effort
    }

    fn stable(
        &self,
        exercise: ExerciseType,
        summary: &PerformanceSummary,
        ladder: Option<&ProgressionLadder>,
        latest: &PerformanceMetrics,
    ) -> DifficultyAdjustment {
        let mut adjustment = DifficultyAdjustment::maintain(
            exercise,
            format!(
                "Performance stable (completion: {:.1}%, form: {:.1})",
                summary.completion_rate * 100.0,
                summary.form_score
            ),
            self.config.confidence.maintain,
        );
        carry_latest_target(&mut adjustment, ladder, latest);
        adjustment
    }

    fn progression(
        &self,
        exercise: ExerciseType,
        ladder: &ProgressionLadder,
        latest: &PerformanceMetrics,
        capabilities: &UserCapabilities,
    ) -> DifficultyAdjustment {
        let confidence = &self.config.confidence;
        let current = ladder.current_index(exercise, capabilities);

        if let Some(next) = ladder.rung(current + 1) {
            let mut adjustment = DifficultyAdjustment {
                adjustment_type: AdjustmentType::Progression,
                modification: Some(next.name.clone()),
                ..DifficultyAdjustment::maintain(
                    exercise,
                    format!(
                        "Progressing to {} variation due to consistent good performance",
                        next.name
                    ),
                    confidence.variation_change,
                )
            };
            match next.range {
                TargetRange::Reps { min, .. } => adjustment.new_reps = Some(min),
                TargetRange::Duration { min_secs, .. } => adjustment.new_duration = Some(min_secs),
            }
            return adjustment;
        }

        let mut adjustment = match ladder.volume() {
            VolumeStep::Reps { increment, max, .. } => {
                let new_reps = latest.target_reps.saturating_add(increment).min(max);
                if new_reps <= latest.target_reps {
                    return self.at_limit(exercise, "At maximum progression level", ladder, latest);
                }
                let mut adjustment = DifficultyAdjustment::maintain(
                    exercise,
                    format!(
                        "Increasing reps from {} to {new_reps}",
                        latest.target_reps
                    ),
                    confidence.volume_change,
                );
                adjustment.new_reps = Some(new_reps);
                adjustment
            }
            VolumeStep::Duration {
                increment_secs,
                max_secs,
                ..
            } => {
                let new_duration = (latest.duration + increment_secs).min(max_secs);
                if new_duration <= latest.duration {
                    return self.at_limit(exercise, "At maximum progression level", ladder, latest);
                }
                let mut adjustment = DifficultyAdjustment::maintain(
                    exercise,
                    format!("Increasing duration to {new_duration:.0}s"),
                    confidence.volume_change,
                );
                adjustment.new_duration = Some(new_duration);
                adjustment
            }
        };
        adjustment.adjustment_type = AdjustmentType::Progression;
        adjustment
    }

    fn regression(
        &self,
        exercise: ExerciseType,
        ladder: &ProgressionLadder,
        latest: &PerformanceMetrics,
        capabilities: &UserCapabilities,
    ) -> DifficultyAdjustment {
        let confidence = &self.config.confidence;
        let current = ladder.current_index(exercise, capabilities);

        if let Some(previous) = current.checked_sub(1).and_then(|index| ladder.rung(index)) {
            let mut adjustment = DifficultyAdjustment {
                adjustment_type: AdjustmentType::Regression,
                modification: Some(previous.name.clone()),
                ..DifficultyAdjustment::maintain(
                    exercise,
                    format!(
                        "Regressing to {} variation due to performance issues",
                        previous.name
                    ),
                    confidence.variation_change,
                )
            };
            match previous.range {
                TargetRange::Reps { max, .. } => adjustment.new_reps = Some(max),
                TargetRange::Duration { max_secs, .. } => {
                    adjustment.new_duration = Some(max_secs);
                }
            }
            return adjustment;
        }

        let mut adjustment = match ladder.volume() {
            VolumeStep::Reps { decrement, min, .. } => {
                let new_reps = latest.target_reps.saturating_sub(decrement).max(min);
                if new_reps >= latest.target_reps {
                    return self.at_limit(exercise, "At minimum difficulty level", ladder, latest);
                }
                let mut adjustment = DifficultyAdjustment::maintain(
                    exercise,
                    format!(
                        "Decreasing reps from {} to {new_reps}",
                        latest.target_reps
                    ),
                    confidence.volume_change,
                );
                adjustment.new_reps = Some(new_reps);
                adjustment
            }
            VolumeStep::Duration {
                decrement_secs,
                min_secs,
                ..
            } => {
                let new_duration = (latest.duration - decrement_secs).max(min_secs);
                if new_duration >= latest.duration {
                    return self.at_limit(exercise, "At minimum difficulty level", ladder, latest);
                }
                let mut adjustment = DifficultyAdjustment::maintain(
                    exercise,
                    format!("Decreasing duration to {new_duration:.0}s"),
                    confidence.volume_change,
                );
                adjustment.new_duration = Some(new_duration);
                adjustment
            }
        };
        adjustment.adjustment_type = AdjustmentType::Regression;
        adjustment
    }

    fn at_limit(
        &self,
        exercise: ExerciseType,
        reasoning: &str,
        ladder: &ProgressionLadder,
        latest: &PerformanceMetrics,
    ) -> DifficultyAdjustment {
        let mut adjustment = DifficultyAdjustment::maintain(
            exercise,
            reasoning,
            self.config.confidence.variation_change,
        );
        carry_latest_target(&mut adjustment, Some(ladder), latest);
        adjustment
    }

    /// Soften recommendations for a tired user.
    ///
    /// Each adjustment takes at most one step: a progression above the cancel
    /// threshold becomes maintain, a maintain above the force threshold becomes a
    /// scaled-down regression.
    #[must_use]
    pub fn apply_fatigue_adjustment(
        &self,
        adjustments: Vec<DifficultyAdjustment>,
        fatigue_level: f64,
    ) -> Vec<DifficultyAdjustment> {
        let fatigue = &self.config.fatigue;
        if !fatigue_level.is_finite() {
            warn!(fatigue_level, "Ignoring non-finite fatigue level");
            return adjustments;
        }
        if fatigue_level <= fatigue.no_change_max {
            return adjustments;
        }

        let scale = 1.0 - fatigue.reduction_factor;
        adjustments
            .into_iter()
            .map(|mut adjustment| {
                match adjustment.adjustment_type {
                    AdjustmentType::Progression if fatigue_level > fatigue.cancel_progression_above => {
                        adjustment.adjustment_type = AdjustmentType::Maintain;
                        adjustment.clear_changes();
                        adjustment.reasoning.push_str(&format!(
                            " (progression cancelled due to high fatigue: {fatigue_level:.1})"
                        ));
                    }
                    AdjustmentType::Maintain if fatigue_level > fatigue.force_regression_above => {
                        adjustment.adjustment_type = AdjustmentType::Regression;
                        adjustment.new_reps = adjustment.new_reps.map(|reps| {
                            ((f64::from(reps) * scale).floor() as u32).max(fatigue.min_reps)
                        });
                        adjustment.new_duration = adjustment
                            .new_duration
                            .map(|secs| (secs * scale).max(fatigue.min_duration_secs));
                        adjustment.reasoning =
                            format!("Fatigue-adjusted regression (fatigue: {fatigue_level:.1})");
                    }
                    AdjustmentType::Progression
                    | AdjustmentType::Maintain
                    | AdjustmentType::Regression => {}
                }
                adjustment
            })
            .collect()
    }

    /// General training advice from fitness level, fatigue, and injuries
    #[must_use]
    pub fn personalized_recommendations(&self, capabilities: &UserCapabilities) -> Vec<String> {
        let mut recommendations = Vec::new();

        match capabilities.fitness_level {
            FitnessLevel::Beginner => {
                recommendations.push(
                    "Focus on form over speed - quality reps build strength safely".to_owned(),
                );
                recommendations
                    .push("Rest 60-90 seconds between sets to maintain good form".to_owned());
            }
            FitnessLevel::Advanced => {
                recommendations
                    .push("Challenge yourself with advanced variations when ready".to_owned());
                recommendations
                    .push("Consider shorter rest periods to increase intensity".to_owned());
            }
            FitnessLevel::Intermediate => {}
        }

        let fatigue = &self.config.fatigue;
        if capabilities.fatigue_level > fatigue.force_regression_above {
            recommendations.push(
                "High fatigue detected - consider active recovery or lighter exercises".to_owned(),
            );
        } else if capabilities.fatigue_level < fatigue.no_change_max {
            recommendations.push("Low fatigue - great day to push your limits!".to_owned());
        }

        if !capabilities.injury_flags.is_empty() {
            recommendations.push(format!(
                "Modified exercises recommended due to: {}",
                capabilities.injury_flags.join(", ")
            ));
        }

        recommendations
    }
}

/// Keep the latest target on a maintain so fatigue scaling has a base
fn carry_latest_target(
    adjustment: &mut DifficultyAdjustment,
    ladder: Option<&ProgressionLadder>,
    latest: &PerformanceMetrics,
) {
    match ladder.map(ProgressionLadder::volume) {
        Some(VolumeStep::Duration { .. }) => adjustment.new_duration = Some(latest.duration),
        Some(VolumeStep::Reps { .. }) | None => {
            if latest.target_reps > 0 {
                adjustment.new_reps = Some(latest.target_reps);
            }
        }
    }
}
