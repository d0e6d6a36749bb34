// ABOUTME: Integration tests for the coaching cue engine
// ABOUTME: Covers candidate rules, prioritization, context filters, throttling, and expiry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{frame_result, init_test_logging, knee_angles, pushup_frame, rep};
use formcoach_core::models::{
    CoachingCue, CueCategory, ExerciseType, FeedbackLevel, FrameResult, JointAngles, Keypoint,
    Landmark, RepPhase, SessionContext,
};
use formcoach_intelligence::config::intelligence::CueEngineConfig;
use formcoach_intelligence::geometry::compute_joint_angles;
use formcoach_intelligence::{CueCatalog, CueEngine, CueKey, CueTemplate, ThrottleRules};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

fn engine() -> CueEngine {
    init_test_logging();
    CueEngine::new(CueEngineConfig::default())
}

fn context() -> SessionContext {
    SessionContext::new(Uuid::new_v4(), Uuid::new_v4())
}

fn context_with_progress(rep_count: u32, target_reps: u32) -> SessionContext {
    let mut context = context().with_target_reps(target_reps);
    context.rep_count = rep_count;
    context
}

fn idle_frame(timestamp: f64) -> FrameResult {
    frame_result(
        ExerciseType::Unknown,
        RepPhase::Rest,
        JointAngles::default(),
        timestamp,
    )
}

fn templates(cues: &[CoachingCue]) -> Vec<String> {
    cues.iter()
        .filter_map(|cue| cue.metadata.get("template"))
        .filter_map(Value::as_str)
        .map(str::to_owned)
        .collect()
}

#[test]
fn test_emits_top_priorities_up_to_cap() {
    let mut engine = engine();
    let mut frame = frame_result(
        ExerciseType::Squat,
        RepPhase::Eccentric,
        knee_angles(170.0, 140.0),
        1.0,
    );
    frame.completed_rep = Some(rep(5, 1.0));
    let context = context_with_progress(5, 10);

    let cues = engine.process(&frame, &context);

    assert_eq!(
        templates(&cues),
        vec!["knee_valgus", "shallow_squat", "too_fast"]
    );
    assert_eq!(
        cues.iter().map(|cue| cue.priority).collect::<Vec<_>>(),
        vec![10, 8, 5]
    );
    assert_eq!(engine.active_cues().len(), 3);
}

#[test]
fn test_cue_fields_are_stamped_from_tick() {
    let mut engine = engine();
    let frame = frame_result(
        ExerciseType::Squat,
        RepPhase::Rest,
        knee_angles(170.0, 140.0),
        1.5,
    );
    let context = context();

    let cues = engine.process(&frame, &context);
    let safety = cues
        .iter()
        .find(|cue| cue.category == CueCategory::Safety)
        .unwrap();

    assert!(safety
        .id
        .starts_with(&format!("knee_valgus_1500_{}", context.session_id)));
    assert_eq!(safety.message, "Keep your knees aligned over your toes");
    assert_eq!(safety.source, "coach_engine");
    assert_eq!(safety.exercise_phase, Some(RepPhase::Rest));
    assert!(safety.expires_at.is_some_and(|at| (at - 11.5).abs() < 1e-9));
    assert_eq!(
        safety.metadata.get("exercise").and_then(Value::as_str),
        Some("squat")
    );
}

#[test]
fn test_pushup_lockout_raises_hyperextension() {
    let mut engine = engine();
    let angles = JointAngles {
        left_elbow: Some(178.0),
        right_elbow: Some(160.0),
        ..JointAngles::default()
    };
    let frame = frame_result(ExerciseType::PushUp, RepPhase::Rest, angles, 0.0);

    let cues = engine.process(&frame, &context());

    assert_eq!(templates(&cues)[0], "hyperextension");
}

#[test]
fn test_safety_cues_respect_min_interval() {
    let mut engine = engine();
    let context = context();
    let mut safety_emitted = Vec::new();

    for timestamp in [0.0, 0.5, 1.0, 1.5, 1.9, 2.0] {
        let frame = frame_result(
            ExerciseType::Squat,
            RepPhase::Rest,
            knee_angles(170.0, 140.0),
            timestamp,
        );
        let cues = engine.process(&frame, &context);
        if cues.iter().any(|cue| cue.category == CueCategory::Safety) {
            safety_emitted.push(timestamp);
        }
    }

    assert_eq!(safety_emitted, vec![0.0, 2.0]);
}

#[test]
fn test_per_minute_budget() {
    let mut engine = engine();
    let mut context = context();
    context.form_scores.insert("overall".to_owned(), 95.0);
    let mut emitted_at = Vec::new();

    for timestamp in [0.0, 15.0, 30.0, 45.0, 60.0] {
        let cues = engine.process(&idle_frame(timestamp), &context);
        if templates(&cues).contains(&"good_form".to_owned()) {
            emitted_at.push(timestamp);
        }
    }

    assert_eq!(emitted_at, vec![0.0, 15.0, 60.0]);
}

#[test]
fn test_minimal_feedback_drops_motivation() {
    let normal = context_with_progress(5, 10);
    let minimal = context_with_progress(5, 10).with_feedback_level(FeedbackLevel::Minimal);

    let cues = engine().process(&idle_frame(0.0), &normal);
    assert_eq!(templates(&cues), vec!["halfway_encouragement"]);

    let cues = engine().process(&idle_frame(0.0), &minimal);
    assert!(cues.is_empty());
}

#[test]
fn test_progress_milestones() {
    let cases = [
        (4, "halfway_encouragement"),
        (6, "halfway_encouragement"),
        (8, "final_push"),
        (10, "set_complete"),
        (12, "set_complete"),
    ];
    for (rep_count, expected) in cases {
        let cues = engine().process(&idle_frame(0.0), &context_with_progress(rep_count, 10));
        assert_eq!(templates(&cues), vec![expected], "rep_count {rep_count}");
    }

    let cues = engine().process(&idle_frame(0.0), &context_with_progress(7, 10));
    assert!(cues.is_empty());
}

#[test]
fn test_unmeasured_joints_raise_no_depth_cue() {
    let mut engine = engine();
    let context = context();

    let occluded = frame_result(
        ExerciseType::PushUp,
        RepPhase::Eccentric,
        JointAngles::default(),
        0.0,
    );
    let cues = engine.process(&occluded, &context);
    assert!(cues.iter().all(|cue| cue.category != CueCategory::Form));

    let one_arm = JointAngles {
        left_elbow: Some(100.0),
        ..JointAngles::default()
    };
    let half_seen = frame_result(ExerciseType::PushUp, RepPhase::Bottom, one_arm, 6.0);
    let cues = engine.process(&half_seen, &context);
    assert!(cues.iter().all(|cue| cue.category != CueCategory::Form));
}

#[test]
fn test_collapsed_elbow_raises_no_hyperextension() {
    let mut pose = pushup_frame(0.0, 160.0);
    let elbow = *pose.keypoint(Landmark::RightElbow).unwrap();
    pose.insert(Landmark::RightWrist, Keypoint::new(elbow.x, elbow.y, 0.0));
    let angles = compute_joint_angles(&pose);
    assert_eq!(angles.right_elbow, None);

    let frame = frame_result(ExerciseType::PushUp, RepPhase::Rest, angles, 0.0);
    let cues = engine().process(&frame, &context());

    assert!(!templates(&cues).contains(&"hyperextension".to_owned()));
}

#[test]
fn test_overflow_evicts_lowest_priority_across_ticks() {
    let mut engine = engine();
    let context = context_with_progress(5, 10);
    let mut first = frame_result(
        ExerciseType::Squat,
        RepPhase::Eccentric,
        knee_angles(170.0, 140.0),
        1.0,
    );
    first.completed_rep = Some(rep(5, 1.0));
    let first_cues = engine.process(&first, &context);
    assert_eq!(
        first_cues.iter().map(|cue| cue.priority).collect::<Vec<_>>(),
        vec![10, 8, 5]
    );

    // Safety spacing has elapsed, form and tempo are still throttled
    let second = frame_result(
        ExerciseType::Squat,
        RepPhase::Rest,
        knee_angles(170.0, 140.0),
        3.0,
    );
    let second_cues = engine.process(&second, &context);
    assert_eq!(second_cues[0].priority, 10);

    let active = engine.active_cues();
    let active_ids: Vec<&str> = active.iter().map(|cue| cue.id.as_str()).collect();
    assert_eq!(templates(&active), vec!["knee_valgus", "knee_valgus", "shallow_squat"]);
    assert!(active_ids.contains(&first_cues[0].id.as_str()));
    assert!(active_ids.contains(&first_cues[1].id.as_str()));
    assert!(active_ids.contains(&second_cues[0].id.as_str()));
    assert!(!templates(&active).contains(&"too_fast".to_owned()));
}

#[test]
fn test_form_cues_suppressed_for_high_scores() {
    let mut engine = engine();
    let mut context = context();
    context.form_scores.insert("overall".to_owned(), 91.0);
    let frame = frame_result(
        ExerciseType::Squat,
        RepPhase::Eccentric,
        knee_angles(150.0, 150.0),
        0.0,
    );

    let cues = engine.process(&frame, &context);

    assert!(cues.iter().all(|cue| cue.category != CueCategory::Form));
    assert!(templates(&cues).contains(&"core_engagement".to_owned()));
}

#[test]
fn test_shallow_depth_raises_form_cue() {
    let mut engine = engine();
    let frame = frame_result(
        ExerciseType::Squat,
        RepPhase::Eccentric,
        knee_angles(150.0, 150.0),
        0.0,
    );

    let cues = engine.process(&frame, &context());

    assert_eq!(templates(&cues), vec!["shallow_squat", "core_engagement"]);
}

#[test]
fn test_tempo_cues_suppressed_when_fatigued() {
    let mut frame = idle_frame(0.0);
    frame.completed_rep = Some(rep(1, 1.0));

    let rested = context().with_fatigue_level(0.5);
    let cues = engine().process(&frame, &rested);
    assert_eq!(templates(&cues), vec!["too_fast"]);

    let fatigued = context().with_fatigue_level(0.9);
    let cues = engine().process(&frame, &fatigued);
    assert!(cues.is_empty());
}

#[test]
fn test_slow_rep_in_progress_raises_tempo_cue() {
    let mut frame = idle_frame(0.0);
    frame.metrics.rep_duration = 7.0;

    let cues = engine().process(&frame, &context());

    assert_eq!(templates(&cues), vec!["too_slow"]);
}

#[test]
fn test_breathing_reminder_interval() {
    let mut engine = engine();
    let mut context = context();
    context.session_duration = 61.0;
    let mut reminded_at = Vec::new();

    for timestamp in [100.0, 115.0, 131.0] {
        let frame = frame_result(
            ExerciseType::Unknown,
            RepPhase::Eccentric,
            JointAngles::default(),
            timestamp,
        );
        let cues = engine.process(&frame, &context);
        if templates(&cues).contains(&"breathing_reminder".to_owned()) {
            reminded_at.push(timestamp);
        }
    }

    assert_eq!(reminded_at, vec![100.0, 131.0]);
}

#[test]
fn test_no_breathing_reminder_early_in_session() {
    let mut context = context();
    context.session_duration = 30.0;
    let frame = frame_result(
        ExerciseType::Unknown,
        RepPhase::Concentric,
        JointAngles::default(),
        30.0,
    );

    assert!(engine().process(&frame, &context).is_empty());
}

#[test]
fn test_dismiss_active_cue() {
    let mut engine = engine();
    let cues = engine.process(&idle_frame(0.0), &context_with_progress(5, 10));
    let id = cues[0].id.clone();

    assert!(engine.dismiss(&id));
    assert!(!engine.dismiss(&id));
    assert!(engine.active_cues().is_empty());
    assert_eq!(engine.history().len(), 1);
}

#[test]
fn test_cues_expire() {
    let mut engine = engine();
    let quiet = context();
    engine.process(&idle_frame(0.0), &context_with_progress(5, 10));

    engine.process(&idle_frame(9.9), &quiet);
    assert_eq!(engine.active_cues().len(), 1);

    engine.process(&idle_frame(10.0), &quiet);
    assert!(engine.active_cues().is_empty());
}

#[test]
fn test_stats_over_history() {
    let mut engine = engine();
    let mut frame = frame_result(
        ExerciseType::Squat,
        RepPhase::Eccentric,
        knee_angles(170.0, 140.0),
        1.0,
    );
    frame.completed_rep = Some(rep(5, 1.0));
    engine.process(&frame, &context_with_progress(5, 10));

    let stats = engine.stats();
    assert_eq!(stats.total_cues, 3);
    assert_eq!(stats.active_cues, 3);
    assert_eq!(stats.cues_by_category.get(&CueCategory::Safety), Some(&1));
    assert_eq!(stats.cues_by_category.get(&CueCategory::Form), Some(&1));
    assert_eq!(stats.cues_by_category.get(&CueCategory::Tempo), Some(&1));
    assert!((stats.average_priority - 23.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_clear_and_reset() {
    let mut engine = engine();
    let context = context_with_progress(5, 10);
    engine.process(&idle_frame(5.0), &context);

    engine.clear_all();
    assert!(engine.active_cues().is_empty());
    assert_eq!(engine.stats().total_cues, 1);

    engine.reset();
    assert_eq!(engine.stats().total_cues, 0);
    let cues = engine.process(&idle_frame(1.0), &context);
    assert_eq!(templates(&cues), vec!["halfway_encouragement"]);
}

#[test]
fn test_missing_template_skips_tick() {
    init_test_logging();
    let only_praise = CueTemplate {
        key: CueKey::GoodForm,
        category: CueCategory::Motivation,
        priority: 3,
        message: "Nice work".to_owned(),
        spoken_text: "Nice work".to_owned(),
        body_part: None,
        trigger: None,
    };
    let catalog = CueCatalog::new([only_praise]).unwrap();
    let mut engine = CueEngine::with_catalog(
        CueEngineConfig::default(),
        Arc::new(catalog),
        Arc::new(ThrottleRules::standard()),
    );
    let frame = frame_result(
        ExerciseType::Squat,
        RepPhase::Rest,
        knee_angles(170.0, 140.0),
        0.0,
    );

    assert!(engine.process(&frame, &context()).is_empty());
}
