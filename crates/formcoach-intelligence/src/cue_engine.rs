// ABOUTME: Coaching cue engine turning per-tick analysis into a small, prioritized set of cues
// ABOUTME: Generates candidates, deduplicates, filters by context, throttles, and expires cues
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Cue engine
//!
//! Each call to [`CueEngine::process`] runs one tick of the pipeline:
//! evict expired cues, generate candidates, deduplicate, sort by priority,
//! apply context filters, throttle per category, then admit. The engine's clock
//! is the frame timestamp, never the host clock.

use crate::config::intelligence::CueEngineConfig;
use crate::cue_catalog::{CueCatalog, CueKey, ThrottleRules};
use crate::rep_fsm::PrimaryJoint;
use formcoach_core::clock::MonotonicClock;
use formcoach_core::constants::cue_timing::{DEDUP_MESSAGE_PREFIX_CHARS, THROTTLE_WINDOW_SECS};
use formcoach_core::constants::form_score_keys;
use formcoach_core::constants::service_names::CUE_SOURCE;
use formcoach_core::errors::AppResult;
use formcoach_core::models::{
    CoachingCue, CueCategory, ExerciseType, FeedbackLevel, FrameResult, SessionContext,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, warn};

/// Cue generation statistics over the retained history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CueStats {
    /// Cues in history
    pub total_cues: usize,
    /// Currently active cues
    pub active_cues: usize,
    /// History count per category
    pub cues_by_category: BTreeMap<CueCategory, usize>,
    /// Mean priority over history (0 when empty)
    pub average_priority: f64,
}

/// Per-session cue engine
#[derive(Debug)]
pub struct CueEngine {
    config: CueEngineConfig,
    catalog: Arc<CueCatalog>,
    throttle: Arc<ThrottleRules>,
    active: Vec<CoachingCue>,
    history: VecDeque<CoachingCue>,
    last_emitted: HashMap<CueCategory, f64>,
    recent_emissions: HashMap<CueCategory, VecDeque<f64>>,
    last_breathing_reminder: Option<f64>,
    last_core_reminder: Option<f64>,
    clock: MonotonicClock,
}

impl CueEngine {
    /// Create an engine with the standard catalog and throttle rules
    #[must_use]
    pub fn new(config: CueEngineConfig) -> Self {
        Self::with_catalog(
            config,
            Arc::new(CueCatalog::standard()),
            Arc::new(ThrottleRules::standard()),
        )
    }

    /// Create an engine sharing an existing catalog and rules
    #[must_use]
    pub fn with_catalog(
        config: CueEngineConfig,
        catalog: Arc<CueCatalog>,
        throttle: Arc<ThrottleRules>,
    ) -> Self {
        Self {
            config,
            catalog,
            throttle,
            active: Vec::new(),
            history: VecDeque::new(),
            last_emitted: HashMap::new(),
            recent_emissions: HashMap::new(),
            last_breathing_reminder: None,
            last_core_reminder: None,
            clock: MonotonicClock::new(),
        }
    }

    /// Run one tick and return the cues emitted on it, highest priority first
    pub fn process(&mut self, frame: &FrameResult, context: &SessionContext) -> Vec<CoachingCue> {
        let now = self.clock.observe(frame.timestamp);
        self.evict_expired(now);

        let candidates = match self.generate(frame, context, now) {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(
                    session_id = %context.session_id,
                    error = %e,
                    "Cue generation failed, skipping tick"
                );
                return Vec::new();
            }
        };

        let mut ranked = deduplicate(candidates);
        ranked.sort_by(|a, b| b.priority.cmp(&a.priority));
        let filtered: Vec<CoachingCue> = ranked
            .into_iter()
            .filter(|cue| self.should_include(cue, context))
            .collect();

        let emitted = self.throttle(filtered, now);
        for cue in &emitted {
            self.admit(cue.clone());
        }
        if !emitted.is_empty() {
            debug!(
                session_id = %context.session_id,
                emitted = emitted.len(),
                active = self.active.len(),
                "Coaching cues emitted"
            );
        }
        emitted
    }

    /// Active cues, highest priority first
    #[must_use]
    pub fn active_cues(&self) -> Vec<CoachingCue> {
        let mut cues = self.active.clone();
        cues.sort_by(|a, b| b.priority.cmp(&a.priority));
        cues
    }

    /// Dismiss an active cue; returns whether it was active
    pub fn dismiss(&mut self, cue_id: &str) -> bool {
        let before = self.active.len();
        self.active.retain(|cue| cue.id != cue_id);
        self.active.len() != before
    }

    /// Drop every active cue (history and throttle state are kept)
    pub fn clear_all(&mut self) {
        self.active.clear();
    }

    /// Forget all per-session state
    pub fn reset(&mut self) {
        self.active.clear();
        self.history.clear();
        self.last_emitted.clear();
        self.recent_emissions.clear();
        self.last_breathing_reminder = None;
        self.last_core_reminder = None;
        self.clock.reset();
    }

    /// Emitted cues retained for statistics, oldest first
    #[must_use]
    pub const fn history(&self) -> &VecDeque<CoachingCue> {
        &self.history
    }

    /// Statistics over the retained history
    #[must_use]
    pub fn stats(&self) -> CueStats {
        let total_cues = self.history.len();
        if total_cues == 0 {
            return CueStats {
                active_cues: self.active.len(),
                ..CueStats::default()
            };
        }

        let mut cues_by_category = BTreeMap::new();
        for cue in &self.history {
            *cues_by_category.entry(cue.category).or_insert(0) += 1;
        }
        let priority_sum: f64 = self.history.iter().map(|cue| f64::from(cue.priority)).sum();

        CueStats {
            total_cues,
            active_cues: self.active.len(),
            cues_by_category,
            average_priority: priority_sum / total_cues as f64,
        }
    }

    fn evict_expired(&mut self, now: f64) {
        self.active.retain(|cue| !cue.is_expired(now));
    }

    fn generate(
        &self,
        frame: &FrameResult,
        context: &SessionContext,
        now: f64,
    ) -> AppResult<Vec<CoachingCue>> {
        let mut keys = Vec::new();
        self.safety_candidates(frame, &mut keys);
        self.form_candidates(frame, &mut keys);
        self.tempo_candidates(frame, &mut keys);
        self.motivation_candidates(context, &mut keys);
        self.instruction_candidates(frame, context, now, &mut keys);

        keys.into_iter()
            .map(|key| self.instantiate(key, frame, context, now))
            .collect()
    }

    fn safety_candidates(&self, frame: &FrameResult, keys: &mut Vec<CueKey>) {
        let angles = &frame.metrics.angles;
        let triggers = &self.config.triggers;
        match frame.exercise_type {
            ExerciseType::Squat => {
                if let (Some(left), Some(right)) = (angles.left_knee, angles.right_knee) {
                    if (left - right).abs() > triggers.knee_asymmetry_degrees {
                        keys.push(CueKey::KneeValgus);
                    }
                }
            }
            ExerciseType::PushUp => {
                let locked = [angles.left_elbow, angles.right_elbow]
                    .into_iter()
                    .flatten()
                    .any(|angle| angle > triggers.hyperextension_degrees);
                if locked {
                    keys.push(CueKey::Hyperextension);
                }
            }
            ExerciseType::Lunge
            | ExerciseType::Plank
            | ExerciseType::JumpingJack
            | ExerciseType::Unknown => {}
        }
    }

    fn form_candidates(&self, frame: &FrameResult, keys: &mut Vec<CueKey>) {
        let Some(depth_cue) = depth_cue_for(frame.exercise_type) else {
            return;
        };
        // Unmeasured joints read as straight elsewhere; that must not look shallow here
        let primary = PrimaryJoint::for_exercise(frame.exercise_type)
            .and_then(|joint| joint.measured(&frame.metrics.angles));
        let shallow =
            primary.is_some_and(|angle| angle > self.config.triggers.depth_threshold_degrees);
        if frame.phase.is_descending() && shallow {
            keys.push(depth_cue);
        }

        for feedback in &frame.feedback {
            let lowered = feedback.to_lowercase();
            if lowered.contains("lower") || lowered.contains("deeper") {
                keys.push(depth_cue);
            }
        }
    }

    fn tempo_candidates(&self, frame: &FrameResult, keys: &mut Vec<CueKey>) {
        let triggers = &self.config.triggers;
        if let Some(rep) = &frame.completed_rep {
            if rep.duration > 0.0 && rep.duration < triggers.too_fast_secs {
                keys.push(CueKey::TooFast);
            } else if rep.duration > triggers.too_slow_secs {
                keys.push(CueKey::TooSlow);
            }
        } else if frame.metrics.rep_duration > triggers.too_slow_secs {
            keys.push(CueKey::TooSlow);
        }
    }

    fn motivation_candidates(&self, context: &SessionContext, keys: &mut Vec<CueKey>) {
        let triggers = &self.config.triggers;
        if context.rep_count > 0 {
            if let Some(progress) = context.progress() {
                if (triggers.halfway_min_progress..=triggers.halfway_max_progress)
                    .contains(&progress)
                {
                    keys.push(CueKey::HalfwayEncouragement);
                } else if progress >= 1.0 {
                    keys.push(CueKey::SetComplete);
                } else if progress >= triggers.final_push_progress {
                    keys.push(CueKey::FinalPush);
                }
            }
        }

        // Rep scores top out at 85; praise needs scores supplied from outside
        if context.average_form_score() > triggers.good_form_score {
            keys.push(CueKey::GoodForm);
        }
    }

    fn instruction_candidates(
        &self,
        frame: &FrameResult,
        context: &SessionContext,
        now: f64,
        keys: &mut Vec<CueKey>,
    ) {
        let reminders = &self.config.reminders;
        let elapsed_since =
            |last: Option<f64>, interval: f64| last.is_none_or(|last| now - last >= interval);

        if frame.phase.is_moving()
            && context.session_duration > reminders.breathing_min_session_secs
            && elapsed_since(
                self.last_breathing_reminder,
                reminders.breathing_interval_secs,
            )
        {
            keys.push(CueKey::BreathingReminder);
        }

        let braced_exercise = matches!(
            frame.exercise_type,
            ExerciseType::PushUp | ExerciseType::Squat | ExerciseType::Lunge
        );
        if braced_exercise && elapsed_since(self.last_core_reminder, reminders.core_interval_secs)
        {
            keys.push(CueKey::CoreEngagement);
        }
    }

    fn instantiate(
        &self,
        key: CueKey,
        frame: &FrameResult,
        context: &SessionContext,
        now: f64,
    ) -> AppResult<CoachingCue> {
        let template = self.catalog.get(key)?;
        let timestamp_ms = (now * 1000.0).round() as i64;

        let mut metadata = HashMap::new();
        metadata.insert("template".to_owned(), Value::from(key.as_str()));
        metadata.insert(
            "exercise".to_owned(),
            Value::from(frame.exercise_type.as_str()),
        );
        metadata.insert("rep_count".to_owned(), Value::from(frame.rep_count));

        Ok(CoachingCue {
            id: format!("{key}_{timestamp_ms}_{}", context.session_id),
            category: template.category,
            priority: template.priority,
            message: template.message.clone(),
            spoken_text: template.spoken_text.clone(),
            timestamp: now,
            expires_at: Some(now + self.config.cue_expiry_secs),
            body_part: template.body_part.clone(),
            exercise_phase: Some(frame.phase),
            source: CUE_SOURCE.to_owned(),
            conditions: template.conditions(),
            metadata,
        })
    }

    /// Session filters.
    ///
    /// Form suppression keys off the `overall` form score, which only rises
    /// above the suppression bar when a caller supplies it through the context.
    fn should_include(&self, cue: &CoachingCue, context: &SessionContext) -> bool {
        let filters = &self.config.filters;
        match cue.category {
            CueCategory::Safety | CueCategory::Instruction => true,
            CueCategory::Motivation => {
                context.user_preferences.feedback_level != FeedbackLevel::Minimal
            }
            CueCategory::Form => context
                .form_scores
                .get(form_score_keys::OVERALL)
                .is_none_or(|overall| *overall <= filters.suppress_form_above_score),
            CueCategory::Tempo => context.fatigue_level <= filters.suppress_tempo_above_fatigue,
        }
    }

    /// Admit candidates that respect spacing and the per-minute budget, up to the active cap
    fn throttle(&mut self, candidates: Vec<CoachingCue>, now: f64) -> Vec<CoachingCue> {
        let mut emitted = Vec::new();
        for cue in candidates {
            if emitted.len() >= self.config.max_active_cues {
                break;
            }
            let rule = self.throttle.rule(cue.category);

            let spaced = self
                .last_emitted
                .get(&cue.category)
                .is_none_or(|last| now - last >= rule.min_interval_secs);
            if !spaced {
                continue;
            }

            let window = self.recent_emissions.entry(cue.category).or_default();
            while window
                .front()
                .is_some_and(|emitted_at| now - emitted_at >= THROTTLE_WINDOW_SECS)
            {
                window.pop_front();
            }
            if window.len() >= rule.max_per_minute {
                continue;
            }

            window.push_back(now);
            self.last_emitted.insert(cue.category, now);
            self.note_reminder(&cue, now);
            emitted.push(cue);
        }
        emitted
    }

    fn note_reminder(&mut self, cue: &CoachingCue, now: f64) {
        let template = cue.metadata.get("template").and_then(Value::as_str);
        if template == Some(CueKey::BreathingReminder.as_str()) {
            self.last_breathing_reminder = Some(now);
        } else if template == Some(CueKey::CoreEngagement.as_str()) {
            self.last_core_reminder = Some(now);
        }
    }

    fn admit(&mut self, cue: CoachingCue) {
        self.active.push(cue.clone());
        if self.active.len() > self.config.max_active_cues {
            self.active.sort_by(|a, b| b.priority.cmp(&a.priority));
            self.active.truncate(self.config.max_active_cues);
        }

        self.history.push_back(cue);
        while self.history.len() > self.config.history_length {
            self.history.pop_front();
        }
    }
}

/// Depth cue for exercises with a depth requirement
const fn depth_cue_for(exercise: ExerciseType) -> Option<CueKey> {
    match exercise {
        ExerciseType::PushUp => Some(CueKey::IncompletePushup),
        ExerciseType::Squat => Some(CueKey::ShallowSquat),
        ExerciseType::Lunge => Some(CueKey::ShallowLunge),
        ExerciseType::Plank | ExerciseType::JumpingJack | ExerciseType::Unknown => None,
    }
}

/// Collapse candidates sharing category, body part, and message prefix, keeping the
/// higher priority; first-seen order is preserved
fn deduplicate(candidates: Vec<CoachingCue>) -> Vec<CoachingCue> {
    let mut unique: Vec<CoachingCue> = Vec::with_capacity(candidates.len());
    let mut index_by_key: HashMap<(CueCategory, Option<String>, String), usize> = HashMap::new();

    for cue in candidates {
        let key = (
            cue.category,
            cue.body_part.clone(),
            cue.message.chars().take(DEDUP_MESSAGE_PREFIX_CHARS).collect(),
        );
        if let Some(&index) = index_by_key.get(&key) {
            if cue.priority > unique[index].priority {
                unique[index] = cue;
            }
            continue;
        }
        index_by_key.insert(key, unique.len());
        unique.push(cue);
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use formcoach_core::models::{FrameMetrics, JointAngles};
    use uuid::Uuid;

    #[test]
    fn test_deduplicate_keeps_first_seen_order() {
        let engine = CueEngine::new(CueEngineConfig::default());
        let frame = FrameResult {
            exercise_type: ExerciseType::Squat,
            ..FrameResult::default()
        };
        let context = SessionContext::new(Uuid::nil(), Uuid::nil());
        let keys = [CueKey::ShallowSquat, CueKey::GoodForm, CueKey::ShallowSquat];
        let cues: Vec<CoachingCue> = keys
            .into_iter()
            .filter_map(|key| engine.instantiate(key, &frame, &context, 1.0).ok())
            .collect();
        let unique = deduplicate(cues);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].category, CueCategory::Form);
        assert_eq!(unique[1].category, CueCategory::Motivation);
    }

    #[test]
    fn test_missing_elbow_does_not_raise_hyperextension() {
        let engine = CueEngine::new(CueEngineConfig::default());
        let frame = FrameResult {
            exercise_type: ExerciseType::PushUp,
            metrics: FrameMetrics {
                angles: JointAngles {
                    left_elbow: Some(150.0),
                    ..JointAngles::default()
                },
                ..Default::default()
            },
            ..FrameResult::default()
        };
        let mut keys = Vec::new();
        engine.safety_candidates(&frame, &mut keys);
        assert!(keys.is_empty());
    }
}
