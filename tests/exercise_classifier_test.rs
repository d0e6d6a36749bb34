// ABOUTME: Integration tests for exercise classification and rep counting
// ABOUTME: Drives the classifier with synthetic push-up, squat, and lunge frames
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{
    frame_time, init_test_logging, lunge_frame, pushup_frame, scripted_frames, squat_frame,
    LUNGE_REP, PUSHUP_REP, SQUAT_REP, WARMUP_FRAMES,
};
use formcoach_core::constants::pose_quality::POOR_DETECTION_ISSUE;
use formcoach_core::models::{ExerciseType, FrameResult, PoseFrame, RepPhase};
use formcoach_intelligence::config::intelligence::ClassifierConfig;
use formcoach_intelligence::{ConstantRomScorer, ExerciseClassifier, TransitionTable};
use std::sync::Arc;

fn classifier() -> ExerciseClassifier {
    init_test_logging();
    ExerciseClassifier::new(ClassifierConfig::default())
}

fn run(classifier: &mut ExerciseClassifier, frames: &[PoseFrame]) -> Vec<FrameResult> {
    frames.iter().map(|frame| classifier.ingest(frame)).collect()
}

#[test]
fn test_pushup_rep_is_counted_and_scored() {
    let mut classifier = classifier();
    let results = run(
        &mut classifier,
        &scripted_frames(pushup_frame, 160.0, &PUSHUP_REP),
    );

    assert_eq!(classifier.exercise(), ExerciseType::PushUp);
    assert_eq!(classifier.rep_count(), 1);
    assert_eq!(classifier.phase(), RepPhase::Rest);

    let completed: Vec<_> = results.iter().filter(|r| r.rep_completed).collect();
    assert_eq!(completed.len(), 1);
    let last = results.last().unwrap();
    assert!(last.rep_completed);
    assert_eq!(last.rep_count, 1);

    let rep = last.completed_rep.as_ref().unwrap();
    assert_eq!(rep.rep_number, 1);
    assert!((rep.duration - 2.5).abs() < 1e-6);
    assert!((rep.tempo_score - 100.0).abs() < 1e-6);
    assert!((rep.form_score - 85.0).abs() < 1e-6);
    assert!((rep.rom_score - 800.0 / 9.0).abs() < 0.01);
    assert!(rep.issues.is_empty());
    assert!(rep
        .phase_durations
        .get(&RepPhase::Starting)
        .is_some_and(|d| (d - 0.5).abs() < 1e-6));
    assert!(rep.peak_angles.get("primary").is_some_and(|a| (a - 80.0).abs() < 0.01));
}

#[test]
fn test_squat_is_identified_and_counted() {
    let mut classifier = classifier();
    let results = run(
        &mut classifier,
        &scripted_frames(squat_frame, 165.0, &SQUAT_REP),
    );

    assert_eq!(classifier.exercise(), ExerciseType::Squat);
    assert_eq!(classifier.rep_count(), 1);
    let rep = results.last().unwrap().completed_rep.as_ref().unwrap();
    assert!((rep.rom_score - 700.0 / 9.0).abs() < 0.01);
    assert!(rep.issues.is_empty());
}

#[test]
fn test_lunge_is_identified_and_counted() {
    let mut classifier = classifier();
    run(
        &mut classifier,
        &scripted_frames(lunge_frame, 165.0, &LUNGE_REP),
    );

    assert_eq!(classifier.exercise(), ExerciseType::Lunge);
    assert_eq!(classifier.rep_count(), 1);
}

#[test]
fn test_no_classification_before_enough_frames() {
    let mut classifier = classifier();
    for index in 0..WARMUP_FRAMES - 1 {
        let result = classifier.ingest(&squat_frame(frame_time(index), 165.0));
        assert_eq!(result.exercise_type, ExerciseType::Unknown);
        assert_eq!(result.phase, RepPhase::Rest);
        assert_eq!(result.rep_count, 0);
    }

    let result = classifier.ingest(&squat_frame(frame_time(WARMUP_FRAMES), 165.0));
    assert_eq!(result.exercise_type, ExerciseType::Squat);
}

#[test]
fn test_shallow_squat_reports_depth_feedback() {
    let mut classifier = classifier();
    let results = run(
        &mut classifier,
        &scripted_frames(squat_frame, 165.0, &[150.0, 125.0, 90.0, 120.0, 160.0, 175.0]),
    );

    let shallow = &results[WARMUP_FRAMES + 1];
    assert_eq!(shallow.phase, RepPhase::Eccentric);
    assert_eq!(
        shallow.feedback,
        vec!["Squat deeper for full range of motion".to_owned()]
    );

    let rep = results.last().unwrap().completed_rep.as_ref().unwrap();
    assert_eq!(rep.issues, vec!["Squat deeper for full range of motion".to_owned()]);
    assert!((rep.form_score - 80.0).abs() < 1e-6);
}

#[test]
fn test_frame_without_keypoints_is_a_no_op() {
    let mut classifier = classifier();
    run(
        &mut classifier,
        &scripted_frames(pushup_frame, 160.0, &[140.0]),
    );
    let before = classifier.stats();

    let result = classifier.ingest(&PoseFrame::new(2.0, 0.9));
    assert_eq!(result.exercise_type, ExerciseType::PushUp);
    assert_eq!(result.phase, before.phase);
    assert!(result.metrics.angles.is_empty());
    assert!(!result.rep_completed);
    assert_eq!(classifier.stats(), before);
}

#[test]
fn test_classification_is_sticky() {
    let mut classifier = classifier();
    run(
        &mut classifier,
        &scripted_frames(squat_frame, 165.0, &[]),
    );
    assert_eq!(classifier.exercise(), ExerciseType::Squat);

    for index in 0..WARMUP_FRAMES * 2 {
        classifier.ingest(&pushup_frame(frame_time(WARMUP_FRAMES + index), 160.0));
    }
    assert_eq!(classifier.exercise(), ExerciseType::Squat);
}

#[test]
fn test_manual_exercise_skips_warmup() {
    let mut classifier = classifier();
    classifier.set_exercise(ExerciseType::Squat);

    for (index, angle) in SQUAT_REP.iter().enumerate() {
        classifier.ingest(&squat_frame(frame_time(index * 5), *angle));
    }
    assert_eq!(classifier.rep_count(), 1);
}

#[test]
fn test_set_exercise_keeps_counts() {
    let mut classifier = classifier();
    run(
        &mut classifier,
        &scripted_frames(pushup_frame, 160.0, &PUSHUP_REP),
    );
    classifier.set_exercise(ExerciseType::Squat);

    assert_eq!(classifier.exercise(), ExerciseType::Squat);
    assert_eq!(classifier.rep_count(), 1);
    assert_eq!(classifier.phase(), RepPhase::Rest);
    assert_eq!(classifier.rep_history().len(), 1);
}

#[test]
fn test_reset_returns_to_initial_state() {
    let mut classifier = classifier();
    run(
        &mut classifier,
        &scripted_frames(pushup_frame, 160.0, &PUSHUP_REP),
    );
    classifier.reset();

    let stats = classifier.stats();
    assert_eq!(stats.exercise, ExerciseType::Unknown);
    assert_eq!(stats.rep_count, 0);
    assert_eq!(stats.phase, RepPhase::Rest);
    assert_eq!(stats.rep_history_length, 0);
    assert_eq!(stats.pose_history_length, 0);
}

#[test]
fn test_out_of_order_timestamp_is_clamped() {
    let mut classifier = classifier();
    classifier.ingest(&pushup_frame(5.0, 160.0));
    let result = classifier.ingest(&pushup_frame(3.0, 160.0));
    assert!((result.timestamp - 5.0).abs() < f64::EPSILON);
}

#[test]
fn test_low_confidence_frames_flag_poor_detection() {
    let mut classifier = classifier();
    let frames: Vec<PoseFrame> = scripted_frames(pushup_frame, 160.0, &PUSHUP_REP)
        .into_iter()
        .map(|mut frame| {
            frame.confidence = 0.5;
            frame
        })
        .collect();
    let results = run(&mut classifier, &frames);

    let rep = results.last().unwrap().completed_rep.as_ref().unwrap();
    assert_eq!(rep.issues, vec![POOR_DETECTION_ISSUE.to_owned()]);
    assert!((rep.form_score - 80.0).abs() < 1e-6);
}

#[test]
fn test_stats_keep_recent_reps() {
    let mut classifier = classifier();
    classifier.set_exercise(ExerciseType::PushUp);

    let mut index = 0;
    for _ in 0..7 {
        for angle in PUSHUP_REP {
            classifier.ingest(&pushup_frame(frame_time(index), angle));
            index += 5;
        }
    }

    let stats = classifier.stats();
    assert_eq!(stats.rep_count, 7);
    assert_eq!(stats.rep_history_length, 7);
    assert_eq!(stats.recent_reps.len(), 5);
    assert_eq!(stats.recent_reps[0].rep_number, 3);
    assert_eq!(stats.recent_reps[4].rep_number, 7);
}

#[test]
fn test_rep_history_is_bounded() {
    init_test_logging();
    let config = ClassifierConfig {
        rep_history_length: 2,
        ..ClassifierConfig::default()
    };
    let mut classifier = ExerciseClassifier::new(config);
    classifier.set_exercise(ExerciseType::PushUp);

    let mut index = 0;
    for _ in 0..4 {
        for angle in PUSHUP_REP {
            classifier.ingest(&pushup_frame(frame_time(index), angle));
            index += 5;
        }
    }

    assert_eq!(classifier.rep_count(), 4);
    assert_eq!(classifier.rep_history().len(), 2);
}

#[test]
fn test_exercise_without_cycle_counts_nothing() {
    let mut classifier = classifier();
    classifier.set_exercise(ExerciseType::Plank);

    for (index, angle) in PUSHUP_REP.iter().enumerate() {
        let result = classifier.ingest(&pushup_frame(frame_time(index * 5), *angle));
        assert_eq!(result.phase, RepPhase::Rest);
    }
    assert_eq!(classifier.rep_count(), 0);
}

#[test]
fn test_constant_rom_scorer() {
    init_test_logging();
    let mut classifier = ExerciseClassifier::with_components(
        ClassifierConfig::default(),
        Arc::new(TransitionTable::standard()),
        Arc::new(ConstantRomScorer::default()),
    );
    let results = run(
        &mut classifier,
        &scripted_frames(pushup_frame, 160.0, &PUSHUP_REP),
    );

    let rep = results.last().unwrap().completed_rep.as_ref().unwrap();
    assert!((rep.rom_score - 90.0).abs() < 1e-6);
}
