// ABOUTME: Shared test utilities for integration tests
// ABOUTME: Synthetic pose frames with exact joint angles plus frame-result and set builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::similar_names
)]
//! Shared test utilities for `formcoach`
//!
//! Frame builders place keypoints so the driving joint angle is exactly the
//! requested value, which lets tests script rep cycles angle by angle.

use chrono::{DateTime, Utc};
use formcoach_core::models::{
    ExerciseType, FrameMetrics, FrameResult, JointAngles, Keypoint, Landmark, PerformanceMetrics,
    PoseFrame, RepMetrics, RepPhase,
};
use std::collections::BTreeMap;
use std::env;
use std::sync::Once;
use tracing::Level;

static INIT_LOGGER: Once = Once::new();

/// Frames buffered before the classifier commits to an exercise
pub const WARMUP_FRAMES: usize = 10;

/// Seconds between synthetic frames
pub const FRAME_INTERVAL: f64 = 0.1;

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

fn offset(origin: (f64, f64), length: f64, angle_degrees: f64, mirror: bool) -> Keypoint {
    let radians = angle_degrees.to_radians();
    let dx = length * radians.sin();
    let dx = if mirror { -dx } else { dx };
    Keypoint::new(origin.0 + dx, origin.1 + length * radians.cos(), 0.0)
}

/// Push-up frame (hands under shoulders, flat torso) with both elbows at `elbow_angle`
///
/// Keep `elbow_angle` below 180 so the wrists stay below the shoulders.
pub fn pushup_frame(timestamp: f64, elbow_angle: f64) -> PoseFrame {
    let mut frame = PoseFrame::new(timestamp, 1.0)
        .with_keypoint(Landmark::LeftHip, Keypoint::new(0.4, 0.55, 0.0))
        .with_keypoint(Landmark::RightHip, Keypoint::new(0.6, 0.55, 0.0));

    for (shoulder, elbow, wrist, x, mirror) in [
        (
            Landmark::LeftShoulder,
            Landmark::LeftElbow,
            Landmark::LeftWrist,
            0.4,
            false,
        ),
        (
            Landmark::RightShoulder,
            Landmark::RightElbow,
            Landmark::RightWrist,
            0.6,
            true,
        ),
    ] {
        frame.insert(shoulder, Keypoint::new(x, 0.5, 0.0));
        frame.insert(elbow, Keypoint::new(x, 0.65, 0.0));
        // Elbow to shoulder points straight up, so the wrist ray sets the angle
        frame.insert(wrist, offset((x, 0.65), 0.15, 180.0 - elbow_angle, mirror));
    }
    frame
}

/// Squat frame (feet shoulder-width apart, hands up) with the given knee angles
pub fn squat_frame_asymmetric(timestamp: f64, left_knee: f64, right_knee: f64) -> PoseFrame {
    let mut frame = PoseFrame::new(timestamp, 1.0)
        .with_keypoint(Landmark::LeftShoulder, Keypoint::new(0.4, 0.3, 0.0))
        .with_keypoint(Landmark::RightShoulder, Keypoint::new(0.6, 0.3, 0.0));

    for (hip, knee, ankle, x, angle, mirror) in [
        (
            Landmark::LeftHip,
            Landmark::LeftKnee,
            Landmark::LeftAnkle,
            0.4,
            left_knee,
            false,
        ),
        (
            Landmark::RightHip,
            Landmark::RightKnee,
            Landmark::RightAnkle,
            0.6,
            right_knee,
            true,
        ),
    ] {
        frame.insert(knee, Keypoint::new(x, 0.7, 0.0));
        frame.insert(ankle, Keypoint::new(x, 0.9, 0.0));
        // Knee to ankle points straight down, so the hip ray sets the angle
        frame.insert(hip, offset((x, 0.7), 0.2, angle, mirror));
    }
    frame
}

/// Squat frame with both knees at `knee_angle`
pub fn squat_frame(timestamp: f64, knee_angle: f64) -> PoseFrame {
    squat_frame_asymmetric(timestamp, knee_angle, knee_angle)
}

/// Split-stance lunge frame: front (left) knee at `front_knee`, back knee nearly straight
pub fn lunge_frame(timestamp: f64, front_knee: f64) -> PoseFrame {
    let mut frame = PoseFrame::new(timestamp, 1.0)
        .with_keypoint(Landmark::LeftKnee, Keypoint::new(0.45, 0.6, 0.0))
        .with_keypoint(Landmark::LeftAnkle, Keypoint::new(0.45, 0.8, 0.0))
        .with_keypoint(Landmark::RightKnee, Keypoint::new(0.5, 0.75, 0.5))
        .with_keypoint(Landmark::RightAnkle, Keypoint::new(0.5, 0.95, 0.5));
    frame.insert(Landmark::LeftHip, offset((0.45, 0.6), 0.2, front_knee, false));
    frame.insert(Landmark::RightHip, offset((0.5, 0.75), 0.2, 175.0, true));
    frame
}

/// Timestamp of the `index`-th synthetic frame
pub fn frame_time(index: usize) -> f64 {
    index as f64 * FRAME_INTERVAL
}

/// Warm-up frames followed by one scripted rep, one frame per angle
pub fn scripted_frames(
    build: fn(f64, f64) -> PoseFrame,
    rest_angle: f64,
    rep_angles: &[f64],
) -> Vec<PoseFrame> {
    (0..WARMUP_FRAMES)
        .map(|index| build(frame_time(index), rest_angle))
        .chain(
            rep_angles
                .iter()
                .enumerate()
                .map(|(index, angle)| build(frame_time(WARMUP_FRAMES + index * 5), *angle)),
        )
        .collect()
}

/// The canonical push-up rep: 160, 140, 110, 80, 110, 150, 170
pub const PUSHUP_REP: [f64; 7] = [160.0, 140.0, 110.0, 80.0, 110.0, 150.0, 170.0];

/// A full squat rep through every threshold, deep enough to avoid depth feedback
pub const SQUAT_REP: [f64; 6] = [150.0, 115.0, 90.0, 120.0, 160.0, 175.0];

/// A full front-knee lunge rep through every threshold
pub const LUNGE_REP: [f64; 6] = [150.0, 115.0, 90.0, 120.0, 160.0, 175.0];

/// Frame result for cue-engine tests
pub fn frame_result(
    exercise: ExerciseType,
    phase: RepPhase,
    angles: JointAngles,
    timestamp: f64,
) -> FrameResult {
    FrameResult {
        exercise_type: exercise,
        phase,
        metrics: FrameMetrics {
            angles,
            confidence: 1.0,
            ..FrameMetrics::default()
        },
        timestamp,
        ..FrameResult::default()
    }
}

/// Knee-only joint angles
pub fn knee_angles(left: f64, right: f64) -> JointAngles {
    JointAngles {
        left_knee: Some(left),
        right_knee: Some(right),
        ..JointAngles::default()
    }
}

/// A completed rep with the given duration and neutral scores
pub fn rep(rep_number: u32, duration: f64) -> RepMetrics {
    RepMetrics {
        rep_number,
        duration,
        form_score: 85.0,
        tempo_score: 100.0,
        rom_score: 90.0,
        phase_durations: BTreeMap::new(),
        peak_angles: BTreeMap::new(),
        issues: Vec::new(),
    }
}

/// One completed set with explicit scores
pub fn performance(
    exercise: ExerciseType,
    completion_rate: f64,
    form_score: f64,
    tempo_score: f64,
    effort: u8,
) -> PerformanceMetrics {
    PerformanceMetrics {
        exercise,
        actual_reps: (completion_rate * 10.0).round() as u32,
        target_reps: 10,
        form_score,
        tempo_score,
        rom_score: 90.0,
        completion_rate,
        effort,
        duration: 60.0,
        timestamp: Utc::now(),
    }
}

/// A set recorded at a fixed time
pub fn performance_at(exercise: ExerciseType, timestamp: DateTime<Utc>) -> PerformanceMetrics {
    PerformanceMetrics {
        timestamp,
        ..performance(exercise, 0.9, 85.0, 90.0, 5)
    }
}
