// ABOUTME: Per-tick analysis output of the exercise classifier
// ABOUTME: Joint angle snapshot, live metrics, and the FrameResult consumed by the cue engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::exercise::{ExerciseType, RepMetrics, RepPhase};
use crate::constants::angles::STRAIGHT_ANGLE_DEGREES;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Joints whose interior angle is tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    /// Shoulder-elbow-wrist, left side
    LeftElbow,
    /// Shoulder-elbow-wrist, right side
    RightElbow,
    /// Hip-knee-ankle, left side
    LeftKnee,
    /// Hip-knee-ankle, right side
    RightKnee,
    /// Shoulder-hip-knee, left side
    LeftHip,
    /// Shoulder-hip-knee, right side
    RightHip,
}

impl Joint {
    /// Every tracked joint
    pub const ALL: [Self; 6] = [
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftHip,
        Self::RightHip,
    ];

    /// Snake-case joint name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
        }
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Joint angles for one frame, in degrees.
///
/// `None` means a keypoint of the joint was missing or the limb collapsed to a
/// point. Consumers that need a number use [`JointAngles::or_straight`], which
/// yields the neutral 180°.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JointAngles {
    /// Left elbow angle
    pub left_elbow: Option<f64>,
    /// Right elbow angle
    pub right_elbow: Option<f64>,
    /// Left knee angle
    pub left_knee: Option<f64>,
    /// Right knee angle
    pub right_knee: Option<f64>,
    /// Left hip angle
    pub left_hip: Option<f64>,
    /// Right hip angle
    pub right_hip: Option<f64>,
}

impl JointAngles {
    /// Measured angle of a joint, if available
    #[must_use]
    pub const fn get(&self, joint: Joint) -> Option<f64> {
        match joint {
            Joint::LeftElbow => self.left_elbow,
            Joint::RightElbow => self.right_elbow,
            Joint::LeftKnee => self.left_knee,
            Joint::RightKnee => self.right_knee,
            Joint::LeftHip => self.left_hip,
            Joint::RightHip => self.right_hip,
        }
    }

    /// Set the measured angle of a joint
    pub fn set(&mut self, joint: Joint, angle: Option<f64>) {
        let slot = match joint {
            Joint::LeftElbow => &mut self.left_elbow,
            Joint::RightElbow => &mut self.right_elbow,
            Joint::LeftKnee => &mut self.left_knee,
            Joint::RightKnee => &mut self.right_knee,
            Joint::LeftHip => &mut self.left_hip,
            Joint::RightHip => &mut self.right_hip,
        };
        *slot = angle;
    }

    /// Angle of a joint, defaulting to a straight limb when unmeasured
    #[must_use]
    pub fn or_straight(&self, joint: Joint) -> f64 {
        self.get(joint).unwrap_or(STRAIGHT_ANGLE_DEGREES)
    }

    /// Mean of the two elbows (missing sides count as straight)
    #[must_use]
    pub fn average_elbow(&self) -> f64 {
        f64::midpoint(
            self.or_straight(Joint::LeftElbow),
            self.or_straight(Joint::RightElbow),
        )
    }

    /// Mean of the two knees (missing sides count as straight)
    #[must_use]
    pub fn average_knee(&self) -> f64 {
        f64::midpoint(
            self.or_straight(Joint::LeftKnee),
            self.or_straight(Joint::RightKnee),
        )
    }

    /// The more bent of the two knees
    #[must_use]
    pub fn leading_knee(&self) -> f64 {
        self.or_straight(Joint::LeftKnee)
            .min(self.or_straight(Joint::RightKnee))
    }

    /// Whether no joint could be measured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        Joint::ALL.iter().all(|joint| self.get(*joint).is_none())
    }
}

/// Live metrics reported on every tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameMetrics {
    /// Joint angles of this frame
    pub angles: JointAngles,
    /// Seconds spent in the current phase
    pub phase_duration: f64,
    /// Seconds since the current rep started (0 when no rep is in progress)
    pub rep_duration: f64,
    /// Frame detection confidence
    pub confidence: f64,
}

/// Classifier output for one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameResult {
    /// Exercise being performed
    pub exercise_type: ExerciseType,
    /// Reps completed so far
    pub rep_count: u32,
    /// Phase after this tick
    pub phase: RepPhase,
    /// Whether a rep finished on this tick
    pub rep_completed: bool,
    /// Live metrics
    pub metrics: FrameMetrics,
    /// Real-time form feedback messages
    pub feedback: Vec<String>,
    /// Effective tick timestamp in seconds
    pub timestamp: f64,
    /// Metrics of the rep completed on this tick
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_rep: Option<RepMetrics>,
}
