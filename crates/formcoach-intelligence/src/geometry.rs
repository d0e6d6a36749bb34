// ABOUTME: Joint angle geometry over normalized pose keypoints
// ABOUTME: Interior angle at a vertex plus the per-frame elbow, knee, and hip angle snapshot
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use formcoach_core::constants::angles::{DEGENERATE_VECTOR_LENGTH, STRAIGHT_ANGLE_DEGREES};
use formcoach_core::models::{Joint, JointAngles, Keypoint, Landmark, PoseFrame};

/// Landmarks (outer, vertex, outer) that define each tracked joint
const JOINT_LANDMARKS: [(Joint, Landmark, Landmark, Landmark); 6] = [
    (
        Joint::LeftElbow,
        Landmark::LeftShoulder,
        Landmark::LeftElbow,
        Landmark::LeftWrist,
    ),
    (
        Joint::RightElbow,
        Landmark::RightShoulder,
        Landmark::RightElbow,
        Landmark::RightWrist,
    ),
    (
        Joint::LeftKnee,
        Landmark::LeftHip,
        Landmark::LeftKnee,
        Landmark::LeftAnkle,
    ),
    (
        Joint::RightKnee,
        Landmark::RightHip,
        Landmark::RightKnee,
        Landmark::RightAnkle,
    ),
    (
        Joint::LeftHip,
        Landmark::LeftShoulder,
        Landmark::LeftHip,
        Landmark::LeftKnee,
    ),
    (
        Joint::RightHip,
        Landmark::RightShoulder,
        Landmark::RightHip,
        Landmark::RightKnee,
    ),
];

/// Interior angle at `vertex` between the rays to `a` and `c`, in degrees.
///
/// Computed in the x/y image plane. Returns `None` when the angle is undefined
/// (a zero-length ray or non-finite input).
#[must_use]
pub fn interior_angle(a: &Keypoint, vertex: &Keypoint, c: &Keypoint) -> Option<f64> {
    let (ax, ay) = (a.x - vertex.x, a.y - vertex.y);
    let (cx, cy) = (c.x - vertex.x, c.y - vertex.y);

    let len_a = ax.hypot(ay);
    let len_c = cx.hypot(cy);
    if !(len_a.is_finite() && len_c.is_finite())
        || len_a < DEGENERATE_VECTOR_LENGTH
        || len_c < DEGENERATE_VECTOR_LENGTH
    {
        return None;
    }

    let cosine = (ax.mul_add(cx, ay * cy) / (len_a * len_c)).clamp(-1.0, 1.0);
    Some(cosine.acos().to_degrees())
}

/// Angle at the middle point, defaulting to a straight limb when any point is
/// missing or the geometry is degenerate
#[must_use]
pub fn joint_angle(a: Option<&Keypoint>, vertex: Option<&Keypoint>, c: Option<&Keypoint>) -> f64 {
    match (a, vertex, c) {
        (Some(a), Some(vertex), Some(c)) => {
            interior_angle(a, vertex, c).unwrap_or(STRAIGHT_ANGLE_DEGREES)
        }
        _ => STRAIGHT_ANGLE_DEGREES,
    }
}

/// Compute every tracked joint angle for a frame.
///
/// A joint is `None` when one of its keypoints is absent or its geometry is
/// degenerate. Readers that need a number fall back to straight via
/// [`JointAngles::or_straight`].
#[must_use]
pub fn compute_joint_angles(frame: &PoseFrame) -> JointAngles {
    let mut angles = JointAngles::default();
    for (joint, outer_a, vertex, outer_c) in JOINT_LANDMARKS {
        let measured = match (
            frame.keypoint(outer_a),
            frame.keypoint(vertex),
            frame.keypoint(outer_c),
        ) {
            (Some(a), Some(v), Some(c)) => interior_angle(a, v, c),
            _ => None,
        };
        angles.set(joint, measured);
    }
    angles
}
