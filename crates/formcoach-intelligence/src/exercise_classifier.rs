// ABOUTME: Exercise classification, rep counting, and per-rep quality scoring from pose frames
// ABOUTME: Owns the per-session classifier state and drives the declarative rep state machine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Exercise classifier
//!
//! [`ExerciseClassifier::ingest`] is called once per pose frame. It buffers the
//! frame, identifies the exercise (sticky once known), advances the rep state
//! machine, and scores each completed rep. Malformed input never fails: missing
//! keypoints read as straight limbs and a frame without any usable keypoint is a
//! no-op tick.

use crate::config::intelligence::ClassifierConfig;
use crate::geometry::compute_joint_angles;
use crate::rep_fsm::{RepCycle, TransitionTable};
use formcoach_core::clock::MonotonicClock;
use formcoach_core::constants::limits::STATS_RECENT_REPS;
use formcoach_core::constants::pose_quality::POOR_DETECTION_ISSUE;
use formcoach_core::constants::scoring::{MAX_SCORE, MIN_SCORE, PLACEHOLDER_ROM_SCORE};
use formcoach_core::models::{
    ExerciseType, FrameMetrics, FrameResult, Joint, JointAngles, Landmark, PoseFrame, RepMetrics,
    RepPhase,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::mem;
use std::sync::Arc;
use tracing::{debug, info};

/// Key of the deepest driving angle in [`RepMetrics::peak_angles`]
pub const PRIMARY_PEAK_KEY: &str = "primary";

const PUSHUP_DEPTH_FEEDBACK: &str = "Go lower for better range of motion";
const SQUAT_DEPTH_FEEDBACK: &str = "Squat deeper for full range of motion";
const LUNGE_DEPTH_FEEDBACK: &str = "Lower your back knee for a deeper lunge";

/// Range-of-motion scoring strategy
pub trait RomScorer: fmt::Debug + Send + Sync {
    /// Score (0-100) a completed rep from its cycle and the deepest angles reached
    fn score(&self, cycle: &RepCycle, peak_angles: &BTreeMap<String, f64>) -> f64;
}

/// Scores depth: the deepest driving angle mapped onto the cycle's ROM range
#[derive(Debug, Clone, Copy, Default)]
pub struct DepthRomScorer;

impl RomScorer for DepthRomScorer {
    fn score(&self, cycle: &RepCycle, peak_angles: &BTreeMap<String, f64>) -> f64 {
        let Some(deepest) = peak_angles.get(PRIMARY_PEAK_KEY) else {
            return MIN_SCORE;
        };
        let (range_min, range_max) = cycle.rom_range();
        let span = range_max - range_min;
        if span <= 0.0 {
            return MIN_SCORE;
        }
        (MAX_SCORE * (range_max - deepest) / span).clamp(MIN_SCORE, MAX_SCORE)
    }
}

/// Reports the same score for every rep
#[derive(Debug, Clone, Copy)]
pub struct ConstantRomScorer(pub f64);

impl Default for ConstantRomScorer {
    fn default() -> Self {
        Self(PLACEHOLDER_ROM_SCORE)
    }
}

impl RomScorer for ConstantRomScorer {
    fn score(&self, _cycle: &RepCycle, _peak_angles: &BTreeMap<String, f64>) -> f64 {
        self.0
    }
}

/// Accumulators for the rep in progress
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct RepTracker {
    phase_durations: BTreeMap<RepPhase, f64>,
    peak_angles: BTreeMap<String, f64>,
    feedback: Vec<String>,
}

impl RepTracker {
    fn record_angles(&mut self, primary: f64, angles: &JointAngles) {
        Self::keep_min(&mut self.peak_angles, PRIMARY_PEAK_KEY, primary);
        for joint in Joint::ALL {
            if let Some(angle) = angles.get(joint) {
                Self::keep_min(&mut self.peak_angles, joint.as_str(), angle);
            }
        }
    }

    fn keep_min(peaks: &mut BTreeMap<String, f64>, key: &str, angle: f64) {
        peaks
            .entry(key.to_owned())
            .and_modify(|peak| *peak = peak.min(angle))
            .or_insert(angle);
    }

    fn note_feedback(&mut self, feedback: &[String]) {
        for message in feedback {
            if !self.feedback.contains(message) {
                self.feedback.push(message.clone());
            }
        }
    }
}

/// Per-session classifier state (single writer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierState {
    /// Committed exercise
    pub exercise: ExerciseType,
    /// Current phase
    pub phase: RepPhase,
    /// Reps completed since the last reset
    pub rep_count: u32,
    /// When the current phase was entered
    pub phase_started_at: Option<f64>,
    /// When the current rep entered `Starting`
    pub rep_started_at: Option<f64>,
    /// Recent frames, oldest first
    pub pose_history: VecDeque<PoseFrame>,
    /// Completed reps, oldest first
    pub rep_history: VecDeque<RepMetrics>,
    current_rep: RepTracker,
}

impl Default for ClassifierState {
    fn default() -> Self {
        Self {
            exercise: ExerciseType::Unknown,
            phase: RepPhase::Rest,
            rep_count: 0,
            phase_started_at: None,
            rep_started_at: None,
            pose_history: VecDeque::new(),
            rep_history: VecDeque::new(),
            current_rep: RepTracker::default(),
        }
    }
}

impl ClassifierState {
    fn restart_cycle(&mut self) {
        self.phase = RepPhase::Rest;
        self.phase_started_at = None;
        self.rep_started_at = None;
        self.current_rep = RepTracker::default();
    }
}

/// Snapshot of classifier progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierStats {
    /// Committed exercise
    pub exercise: ExerciseType,
    /// Reps completed
    pub rep_count: u32,
    /// Current phase
    pub phase: RepPhase,
    /// Reps retained in history
    pub rep_history_length: usize,
    /// Frames retained in history
    pub pose_history_length: usize,
    /// Most recent reps, oldest first
    pub recent_reps: Vec<RepMetrics>,
}

/// Classifies the exercise and counts reps for one session
#[derive(Debug)]
pub struct ExerciseClassifier {
    config: ClassifierConfig,
    table: Arc<TransitionTable>,
    rom_scorer: Arc<dyn RomScorer>,
    state: ClassifierState,
    clock: MonotonicClock,
}

impl ExerciseClassifier {
    /// Create a classifier with the standard transition tables and depth ROM scoring
    #[must_use]
    pub fn new(config: ClassifierConfig) -> Self {
        Self::with_components(
            config,
            Arc::new(TransitionTable::standard()),
            Arc::new(DepthRomScorer),
        )
    }

    /// Create a classifier with shared tables and a custom ROM scorer
    #[must_use]
    pub fn with_components(
        config: ClassifierConfig,
        table: Arc<TransitionTable>,
        rom_scorer: Arc<dyn RomScorer>,
    ) -> Self {
        Self {
            config,
            table,
            rom_scorer,
            state: ClassifierState::default(),
            clock: MonotonicClock::new(),
        }
    }

    /// Process one pose frame
    pub fn ingest(&mut self, frame: &PoseFrame) -> FrameResult {
        let now = self.clock.observe(frame.timestamp);
        let confidence = sanitize_confidence(frame.confidence);

        if !frame.has_usable_keypoints() {
            debug!(timestamp = now, "Frame without usable keypoints skipped");
            return self.neutral_result(now, confidence);
        }

        self.remember_frame(frame);
        if !self.state.exercise.is_known() {
            self.try_classify(frame);
        }

        let angles = compute_joint_angles(frame);
        let (feedback, completed_rep) = self.advance(&angles, now);

        FrameResult {
            exercise_type: self.state.exercise,
            rep_count: self.state.rep_count,
            phase: self.state.phase,
            rep_completed: completed_rep.is_some(),
            metrics: FrameMetrics {
                angles,
                phase_duration: self
                    .state
                    .phase_started_at
                    .map_or(0.0, |started| (now - started).max(0.0)),
                rep_duration: self
                    .state
                    .rep_started_at
                    .map_or(0.0, |started| (now - started).max(0.0)),
                confidence,
            },
            feedback,
            timestamp: now,
            completed_rep,
        }
    }

    /// Manually select the exercise, restarting the current rep without clearing counts
    pub fn set_exercise(&mut self, exercise: ExerciseType) {
        info!(exercise = %exercise, previous = %self.state.exercise, "Exercise set manually");
        self.state.exercise = exercise;
        self.state.restart_cycle();
    }

    /// Return to the initial state: unknown exercise, rest, zero reps, empty histories
    pub fn reset(&mut self) {
        self.state = ClassifierState::default();
        self.clock.reset();
        debug!("Classifier reset");
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> &ClassifierState {
        &self.state
    }

    /// Committed exercise
    #[must_use]
    pub const fn exercise(&self) -> ExerciseType {
        self.state.exercise
    }

    /// Reps completed since the last reset
    #[must_use]
    pub const fn rep_count(&self) -> u32 {
        self.state.rep_count
    }

    /// Current phase
    #[must_use]
    pub const fn phase(&self) -> RepPhase {
        self.state.phase
    }

    /// Completed reps, oldest first
    #[must_use]
    pub const fn rep_history(&self) -> &VecDeque<RepMetrics> {
        &self.state.rep_history
    }

    /// Progress snapshot including the last few reps
    #[must_use]
    pub fn stats(&self) -> ClassifierStats {
        let history = &self.state.rep_history;
        let skip = history.len().saturating_sub(STATS_RECENT_REPS);
        ClassifierStats {
            exercise: self.state.exercise,
            rep_count: self.state.rep_count,
            phase: self.state.phase,
            rep_history_length: history.len(),
            pose_history_length: self.state.pose_history.len(),
            recent_reps: history.iter().skip(skip).cloned().collect(),
        }
    }

    fn neutral_result(&self, now: f64, confidence: f64) -> FrameResult {
        FrameResult {
            exercise_type: self.state.exercise,
            rep_count: self.state.rep_count,
            phase: self.state.phase,
            rep_completed: false,
            metrics: FrameMetrics {
                confidence,
                ..FrameMetrics::default()
            },
            feedback: Vec::new(),
            timestamp: now,
            completed_rep: None,
        }
    }

    fn remember_frame(&mut self, frame: &PoseFrame) {
        let history = &mut self.state.pose_history;
        history.push_back(frame.clone());
        while history.len() > self.config.pose_history_length {
            history.pop_front();
        }
    }

    fn try_classify(&mut self, frame: &PoseFrame) {
        if self.state.pose_history.len() < self.config.min_classification_frames {
            return;
        }
        let exercise = self.classify(frame);
        if exercise.is_known() {
            info!(
                exercise = %exercise,
                buffered_frames = self.state.pose_history.len(),
                "Exercise identified"
            );
            self.state.exercise = exercise;
            self.state.restart_cycle();
        }
    }

    fn classify(&self, frame: &PoseFrame) -> ExerciseType {
        if self.is_pushup_position(frame) {
            ExerciseType::PushUp
        } else if self.is_squat_position(frame) {
            ExerciseType::Squat
        } else if self.is_lunge_position(frame) {
            ExerciseType::Lunge
        } else {
            ExerciseType::Unknown
        }
    }

    /// Hands below shoulders with a roughly horizontal torso
    fn is_pushup_position(&self, frame: &PoseFrame) -> bool {
        let (
            Some(left_shoulder),
            Some(right_shoulder),
            Some(left_wrist),
            Some(right_wrist),
            Some(left_hip),
            Some(right_hip),
        ) = (
            frame.keypoint(Landmark::LeftShoulder),
            frame.keypoint(Landmark::RightShoulder),
            frame.keypoint(Landmark::LeftWrist),
            frame.keypoint(Landmark::RightWrist),
            frame.keypoint(Landmark::LeftHip),
            frame.keypoint(Landmark::RightHip),
        )
        else {
            return false;
        };

        let hands_below_shoulders =
            left_wrist.y > left_shoulder.y && right_wrist.y > right_shoulder.y;
        let shoulder_y = f64::midpoint(left_shoulder.y, right_shoulder.y);
        let hip_y = f64::midpoint(left_hip.y, right_hip.y);
        hands_below_shoulders
            && (shoulder_y - hip_y).abs() < self.config.detection.pushup_max_torso_drop
    }

    /// Feet about shoulder width apart with at least one knee below its hip
    fn is_squat_position(&self, frame: &PoseFrame) -> bool {
        let (
            Some(left_hip),
            Some(right_hip),
            Some(left_knee),
            Some(right_knee),
            Some(left_ankle),
            Some(right_ankle),
            Some(left_shoulder),
            Some(right_shoulder),
        ) = (
            frame.keypoint(Landmark::LeftHip),
            frame.keypoint(Landmark::RightHip),
            frame.keypoint(Landmark::LeftKnee),
            frame.keypoint(Landmark::RightKnee),
            frame.keypoint(Landmark::LeftAnkle),
            frame.keypoint(Landmark::RightAnkle),
            frame.keypoint(Landmark::LeftShoulder),
            frame.keypoint(Landmark::RightShoulder),
        )
        else {
            return false;
        };

        let shoulder_width = (left_shoulder.x - right_shoulder.x).abs();
        if shoulder_width <= f64::EPSILON {
            return false;
        }
        let stance_ratio = (left_ankle.x - right_ankle.x).abs() / shoulder_width;
        let detection = &self.config.detection;
        let feet_positioned = stance_ratio > detection.squat_min_stance_ratio
            && stance_ratio < detection.squat_max_stance_ratio;
        let knee_bend = left_knee.y > left_hip.y || right_knee.y > right_hip.y;
        feet_positioned && knee_bend
    }

    /// Split stance: ankles apart in depth and knees at different heights
    fn is_lunge_position(&self, frame: &PoseFrame) -> bool {
        let (Some(left_knee), Some(right_knee), Some(left_ankle), Some(right_ankle)) = (
            frame.keypoint(Landmark::LeftKnee),
            frame.keypoint(Landmark::RightKnee),
            frame.keypoint(Landmark::LeftAnkle),
            frame.keypoint(Landmark::RightAnkle),
        ) else {
            return false;
        };

        let detection = &self.config.detection;
        (left_ankle.z - right_ankle.z).abs() > detection.lunge_min_ankle_depth_gap
            && (left_knee.y - right_knee.y).abs() > detection.lunge_min_knee_height_gap
    }

    /// Step the FSM for this frame; returns the tick's feedback and the completed rep, if any
    fn advance(&mut self, angles: &JointAngles, now: f64) -> (Vec<String>, Option<RepMetrics>) {
        let table = Arc::clone(&self.table);
        let Some(cycle) = table.cycle(self.state.exercise) else {
            return (Vec::new(), None);
        };

        self.state.phase_started_at.get_or_insert(now);
        let primary = cycle.primary().measure(angles);
        for next in cycle.step(self.state.phase, primary) {
            self.enter_phase(next, now);
        }

        if self.state.phase != RepPhase::Rest {
            self.state.current_rep.record_angles(primary, angles);
        }

        let feedback = self.depth_feedback(cycle.primary().measured(angles));
        self.state.current_rep.note_feedback(&feedback);

        let completed = (self.state.phase == RepPhase::Completed)
            .then(|| self.complete_rep(cycle, now));
        (feedback, completed)
    }

    fn enter_phase(&mut self, next: RepPhase, now: f64) {
        let previous = self.state.phase;
        if previous != RepPhase::Rest {
            if let Some(started) = self.state.phase_started_at {
                *self
                    .state
                    .current_rep
                    .phase_durations
                    .entry(previous)
                    .or_insert(0.0) += (now - started).max(0.0);
            }
        }
        if next == RepPhase::Starting {
            self.state.current_rep = RepTracker::default();
            self.state.rep_started_at = Some(now);
        }
        self.state.phase = next;
        self.state.phase_started_at = Some(now);
        debug!(from = %previous, to = %next, timestamp = now, "Rep phase transition");
    }

    fn depth_feedback(&self, primary: Option<f64>) -> Vec<String> {
        let shallow = primary.is_some_and(|angle| angle > self.config.depth_feedback_threshold);
        if !self.state.phase.is_descending() || !shallow {
            return Vec::new();
        }
        let message = match self.state.exercise {
            ExerciseType::PushUp => PUSHUP_DEPTH_FEEDBACK,
            ExerciseType::Squat => SQUAT_DEPTH_FEEDBACK,
            ExerciseType::Lunge => LUNGE_DEPTH_FEEDBACK,
            ExerciseType::Plank | ExerciseType::JumpingJack | ExerciseType::Unknown => {
                return Vec::new()
            }
        };
        vec![message.to_owned()]
    }

    fn complete_rep(&mut self, cycle: &RepCycle, now: f64) -> RepMetrics {
        self.state.rep_count += 1;
        let duration = self
            .state
            .rep_started_at
            .map_or(0.0, |started| (now - started).max(0.0));
        let tracker = mem::take(&mut self.state.current_rep);
        let issues = self.identify_form_issues(&tracker);

        let scoring = &self.config.scoring;
        let penalty = scoring.form_issue_penalty * issues.len() as f64;
        let metrics = RepMetrics {
            rep_number: self.state.rep_count,
            duration,
            form_score: (scoring.base_form_score - penalty).clamp(MIN_SCORE, MAX_SCORE),
            tempo_score: self.tempo_score(duration),
            rom_score: self
                .rom_scorer
                .score(cycle, &tracker.peak_angles)
                .clamp(MIN_SCORE, MAX_SCORE),
            phase_durations: tracker.phase_durations,
            peak_angles: tracker.peak_angles,
            issues,
        };

        let history = &mut self.state.rep_history;
        history.push_back(metrics.clone());
        while history.len() > self.config.rep_history_length {
            history.pop_front();
        }
        self.state.restart_cycle();

        info!(
            exercise = %self.state.exercise,
            rep_number = metrics.rep_number,
            duration = metrics.duration,
            form_score = metrics.form_score,
            tempo_score = metrics.tempo_score,
            rom_score = metrics.rom_score,
            "Rep completed"
        );
        metrics
    }

    fn identify_form_issues(&self, tracker: &RepTracker) -> Vec<String> {
        let mut issues = Vec::new();
        let quality = &self.config.quality;
        let history = &self.state.pose_history;
        if history.len() >= quality.window_frames {
            let low_confidence = history
                .iter()
                .rev()
                .take(quality.window_frames)
                .filter(|frame| frame.confidence < quality.low_confidence_threshold)
                .count();
            if low_confidence > quality.max_low_confidence_frames {
                issues.push(POOR_DETECTION_ISSUE.to_owned());
            }
        }
        issues.extend(tracker.feedback.iter().cloned());
        issues
    }

    fn tempo_score(&self, duration: f64) -> f64 {
        let scoring = &self.config.scoring;
        let deviation = (duration - scoring.ideal_rep_duration_secs).abs();
        if deviation <= scoring.tempo_tolerance_secs {
            return MAX_SCORE;
        }
        (MAX_SCORE - (deviation - scoring.tempo_tolerance_secs) * scoring.tempo_penalty_per_second)
            .clamp(MIN_SCORE, MAX_SCORE)
    }
}

fn sanitize_confidence(confidence: f64) -> f64 {
    if confidence.is_finite() {
        confidence.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
