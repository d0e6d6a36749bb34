// ABOUTME: Loads recorded pose frames from JSON-lines files for offline replay
// ABOUTME: One PoseFrame per line; blank lines are skipped and parse errors name the line
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use formcoach_core::errors::{AppError, AppResult};
use formcoach_core::models::PoseFrame;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Read every frame from a JSON-lines file
///
/// # Errors
///
/// Returns an error if the file cannot be read or a line is not a valid frame
pub fn read_frames(path: impl AsRef<Path>) -> AppResult<Vec<PoseFrame>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        AppError::storage(format!("Failed to open frame file {}", path.display())).with_source(e)
    })?;
    let frames = parse_frames(file)?;
    debug!(path = %path.display(), frames = frames.len(), "Loaded replay frames");
    Ok(frames)
}

/// Parse JSON-lines frames from any reader
///
/// # Errors
///
/// Returns an error on I/O failure or when a non-blank line is not a valid frame
pub fn parse_frames(reader: impl Read) -> AppResult<Vec<PoseFrame>> {
    let mut frames = Vec::new();
    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let line_number = index + 1;
        let line = line.map_err(|e| {
            AppError::storage(format!("Failed to read line {line_number}")).with_source(e)
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: PoseFrame = serde_json::from_str(&line).map_err(|e| {
            AppError::invalid_format(format!("Invalid pose frame on line {line_number}: {e}"))
                .with_source(e)
        })?;
        frames.push(frame);
    }
    Ok(frames)
}
