// ABOUTME: Tests for loading recorded pose frames from JSON-lines files
// ABOUTME: Covers blank-line handling, line-numbered parse errors, and missing files
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use formcoach::replay::{parse_frames, read_frames};
use formcoach::ErrorCode;
use formcoach_core::models::Landmark;
use std::fs;
use tempfile::TempDir;

const TWO_FRAMES: &str = r#"{"keypoints":{"left_shoulder":{"x":0.4,"y":0.5}},"confidence":1.0,"timestamp":0.0}

{"keypoints":{"left_knee":{"x":0.45,"y":0.7,"z":0.1,"visibility":0.6}},"confidence":0.8,"timestamp":0.1}
"#;

#[test]
fn test_read_frames_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("workout.jsonl");
    fs::write(&path, TWO_FRAMES).unwrap();

    let frames = read_frames(&path).unwrap();

    assert_eq!(frames.len(), 2);
    let shoulder = frames[0].keypoint(Landmark::LeftShoulder).unwrap();
    assert!((shoulder.x - 0.4).abs() < f64::EPSILON);
    assert!((shoulder.visibility - 1.0).abs() < f64::EPSILON);
    assert!(shoulder.z.abs() < f64::EPSILON);

    let knee = frames[1].keypoint(Landmark::LeftKnee).unwrap();
    assert!((knee.visibility - 0.6).abs() < f64::EPSILON);
    assert!((frames[1].timestamp - 0.1).abs() < f64::EPSILON);
}

#[test]
fn test_missing_fields_default() {
    let frames = parse_frames("{}\n".as_bytes()).unwrap();

    assert_eq!(frames.len(), 1);
    assert!(frames[0].keypoints.is_empty());
    assert!(!frames[0].has_usable_keypoints());
}

#[test]
fn test_invalid_line_is_reported_with_number() {
    let input = format!("{TWO_FRAMES}not a frame\n");

    let error = parse_frames(input.as_bytes()).unwrap_err();

    assert_eq!(error.code, ErrorCode::InvalidFormat);
    assert!(error.message.contains("line 4"), "{}", error.message);
}

#[test]
fn test_missing_file_is_storage_error() {
    let dir = TempDir::new().unwrap();

    let error = read_frames(dir.path().join("absent.jsonl")).unwrap_err();

    assert_eq!(error.code, ErrorCode::StorageError);
}
