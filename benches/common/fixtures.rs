// ABOUTME: Benchmark fixtures that synthesize push-up pose streams and completed sets
// ABOUTME: Deterministic data so repeated runs measure the same work
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Deterministic fixtures for coaching benchmarks.

use chrono::{Duration, Utc};
use formcoach_core::models::{
    ExerciseType, FitnessLevel, Keypoint, Landmark, PerformanceMetrics, PoseFrame,
    UserCapabilities,
};
use uuid::Uuid;

/// Frames per synthetic push-up rep
const FRAMES_PER_REP: usize = 20;

/// Seconds between frames (10 fps)
const FRAME_INTERVAL: f64 = 0.1;

/// Predefined stream lengths for benchmark scenarios
#[derive(Debug, Clone, Copy)]
pub enum StreamLength {
    /// One short set (100 frames)
    Short,
    /// A long session (1000 frames)
    Long,
}

impl StreamLength {
    #[must_use]
    pub const fn frames(self) -> usize {
        match self {
            Self::Short => 100,
            Self::Long => 1000,
        }
    }
}

/// Elbow angle that sweeps 170 -> 80 -> 170 once per rep
#[allow(clippy::cast_precision_loss)]
fn elbow_angle(index: usize) -> f64 {
    let position = (index % FRAMES_PER_REP) as f64 / FRAMES_PER_REP as f64;
    let depth = 1.0 - (position * 2.0 - 1.0).abs();
    depth.mul_add(-90.0, 170.0)
}

/// Push-up frame with both elbows at `elbow_angle`
#[must_use]
pub fn pushup_frame(timestamp: f64, elbow_angle: f64) -> PoseFrame {
    let radians = (180.0 - elbow_angle).to_radians();
    let mut frame = PoseFrame::new(timestamp, 0.95)
        .with_keypoint(Landmark::LeftHip, Keypoint::new(0.4, 0.55, 0.0))
        .with_keypoint(Landmark::RightHip, Keypoint::new(0.6, 0.55, 0.0));

    for (shoulder, elbow, wrist, x, side) in [
        (
            Landmark::LeftShoulder,
            Landmark::LeftElbow,
            Landmark::LeftWrist,
            0.4,
            1.0,
        ),
        (
            Landmark::RightShoulder,
            Landmark::RightElbow,
            Landmark::RightWrist,
            0.6,
            -1.0,
        ),
    ] {
        frame.insert(shoulder, Keypoint::new(x, 0.5, 0.0));
        frame.insert(elbow, Keypoint::new(x, 0.65, 0.0));
        let wrist_x = (side * 0.15).mul_add(radians.sin(), x);
        let wrist_y = 0.15_f64.mul_add(radians.cos(), 0.65);
        frame.insert(wrist, Keypoint::new(wrist_x, wrist_y, 0.0));
    }
    frame
}

/// A continuous push-up stream
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn generate_pushup_stream(length: StreamLength) -> Vec<PoseFrame> {
    (0..length.frames())
        .map(|index| pushup_frame(index as f64 * FRAME_INTERVAL, elbow_angle(index)))
        .collect()
}

/// Completed sets across three exercises, oldest first
#[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
#[must_use]
pub fn generate_sets(count: usize) -> Vec<PerformanceMetrics> {
    let base_date = Utc::now();
    let exercises = [ExerciseType::Squat, ExerciseType::PushUp, ExerciseType::Lunge];
    (0..count)
        .map(|index| {
            let completion_rate = 0.5 + ((index * 7) % 50) as f64 / 100.0;
            PerformanceMetrics {
                exercise: exercises[index % exercises.len()],
                actual_reps: (completion_rate * 10.0).round() as u32,
                target_reps: 10,
                form_score: 60.0 + ((index * 13) % 40) as f64,
                tempo_score: 60.0 + ((index * 11) % 40) as f64,
                rom_score: 85.0,
                completion_rate,
                effort: 4 + (index % 6) as u8,
                duration: 45.0,
                timestamp: base_date - Duration::minutes((count - index) as i64),
            }
        })
        .collect()
}

/// User profile whose history holds the given sets
#[must_use]
pub fn capabilities_for(sets: &[PerformanceMetrics]) -> UserCapabilities {
    let mut capabilities = UserCapabilities::new(Uuid::new_v4(), FitnessLevel::Intermediate);
    for set in sets {
        capabilities
            .exercise_history
            .entry(set.exercise)
            .or_default()
            .push(set.clone());
    }
    capabilities.fatigue_level = 0.2;
    capabilities
}
