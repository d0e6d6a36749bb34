// ABOUTME: Pose frame and keypoint models delivered by the external pose-estimation stage
// ABOUTME: Defines the closed landmark set and absent-tolerant keypoint lookup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Body landmarks the coaching engine reads from a pose frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Landmark {
    /// Left shoulder
    LeftShoulder,
    /// Right shoulder
    RightShoulder,
    /// Left elbow
    LeftElbow,
    /// Right elbow
    RightElbow,
    /// Left wrist
    LeftWrist,
    /// Right wrist
    RightWrist,
    /// Left hip
    LeftHip,
    /// Right hip
    RightHip,
    /// Left knee
    LeftKnee,
    /// Right knee
    RightKnee,
    /// Left ankle
    LeftAnkle,
    /// Right ankle
    RightAnkle,
}

impl Landmark {
    /// Every landmark, left/right pairs adjacent
    pub const ALL: [Self; 12] = [
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    /// Keypoint name used by the pose-estimation stage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }
}

impl fmt::Display for Landmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const fn default_visibility() -> f64 {
    1.0
}

/// Normalized 3D keypoint
///
/// `y` grows downwards (image convention), so a larger `y` is visually lower.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Horizontal position, normalized to the frame width
    pub x: f64,
    /// Vertical position, normalized to the frame height
    pub y: f64,
    /// Relative depth
    #[serde(default)]
    pub z: f64,
    /// Detection visibility in [0, 1]
    #[serde(default = "default_visibility")]
    pub visibility: f64,
}

impl Keypoint {
    /// Create a fully visible keypoint
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            visibility: 1.0,
        }
    }

    /// Set the visibility
    #[must_use]
    pub const fn with_visibility(mut self, visibility: f64) -> Self {
        self.visibility = visibility;
        self
    }

    /// Whether every coordinate is a finite number
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// One tick of pose data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    /// Keypoints by name; absent names are simply missing
    #[serde(default)]
    pub keypoints: HashMap<String, Keypoint>,
    /// Overall detection confidence in [0, 1]
    #[serde(default)]
    pub confidence: f64,
    /// Capture time in seconds
    #[serde(default)]
    pub timestamp: f64,
}

impl PoseFrame {
    /// Create an empty frame
    #[must_use]
    pub fn new(timestamp: f64, confidence: f64) -> Self {
        Self {
            keypoints: HashMap::new(),
            confidence,
            timestamp,
        }
    }

    /// Builder-style keypoint insertion
    #[must_use]
    pub fn with_keypoint(mut self, landmark: Landmark, keypoint: Keypoint) -> Self {
        self.insert(landmark, keypoint);
        self
    }

    /// Insert or replace a keypoint
    pub fn insert(&mut self, landmark: Landmark, keypoint: Keypoint) {
        self.keypoints.insert(landmark.as_str().to_owned(), keypoint);
    }

    /// Look up a landmark; keypoints with non-finite coordinates count as absent
    #[must_use]
    pub fn keypoint(&self, landmark: Landmark) -> Option<&Keypoint> {
        self.keypoints
            .get(landmark.as_str())
            .filter(|keypoint| keypoint.is_finite())
    }

    /// Whether at least one known landmark is present and usable
    #[must_use]
    pub fn has_usable_keypoints(&self) -> bool {
        Landmark::ALL
            .iter()
            .any(|landmark| self.keypoint(*landmark).is_some())
    }
}
