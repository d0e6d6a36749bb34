// ABOUTME: Exercise progression ladders with per-rung target ranges and volume step rules
// ABOUTME: Immutable catalog consulted by the adaptive difficulty engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use formcoach_core::errors::{AppError, AppResult};
use formcoach_core::models::{ExerciseType, FitnessLevel, UserCapabilities};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Allowed work per set on a rung
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetRange {
    /// Repetitions per set
    Reps {
        /// Lower bound
        min: u32,
        /// Upper bound
        max: u32,
    },
    /// Hold duration in seconds
    Duration {
        /// Lower bound
        min_secs: f64,
        /// Upper bound
        max_secs: f64,
    },
}

/// One named variation on a ladder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rung {
    /// Variation name, e.g. "diamond"
    pub name: String,
    /// Relative difficulty (higher is harder)
    pub difficulty: u8,
    /// Allowed target range
    pub range: TargetRange,
}

impl Rung {
    fn reps(name: &str, difficulty: u8, min: u32, max: u32) -> Self {
        Self {
            name: name.to_owned(),
            difficulty,
            range: TargetRange::Reps { min, max },
        }
    }

    fn hold(name: &str, difficulty: u8, min_secs: f64, max_secs: f64) -> Self {
        Self {
            name: name.to_owned(),
            difficulty,
            range: TargetRange::Duration { min_secs, max_secs },
        }
    }
}

/// How volume changes within a rung when no rung change is possible
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VolumeStep {
    /// Rep-based exercise
    Reps {
        /// Reps added on progression
        increment: u32,
        /// Cap after increment
        max: u32,
        /// Reps removed on regression
        decrement: u32,
        /// Floor after decrement
        min: u32,
    },
    /// Hold-based exercise
    Duration {
        /// Seconds added on progression
        increment_secs: f64,
        /// Cap after increment
        max_secs: f64,
        /// Seconds removed on regression
        decrement_secs: f64,
        /// Floor after decrement
        min_secs: f64,
    },
}

/// Ordered variations of one exercise, easiest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionLadder {
    rungs: Vec<Rung>,
    volume: VolumeStep,
}

impl ProgressionLadder {
    /// Build a ladder from rungs ordered easiest first
    ///
    /// # Errors
    ///
    /// Returns an error if the ladder is empty or difficulty does not increase.
    pub fn new(rungs: Vec<Rung>, volume: VolumeStep) -> AppResult<Self> {
        if rungs.is_empty() {
            return Err(AppError::config("progression ladder has no rungs"));
        }
        if rungs.windows(2).any(|pair| pair[1].difficulty <= pair[0].difficulty) {
            return Err(AppError::config(
                "progression ladder difficulty must strictly increase",
            ));
        }
        Ok(Self { rungs, volume })
    }

    /// Rungs, easiest first
    #[must_use]
    pub fn rungs(&self) -> &[Rung] {
        &self.rungs
    }

    /// Volume step rule
    #[must_use]
    pub const fn volume(&self) -> VolumeStep {
        self.volume
    }

    /// Rung at an index
    #[must_use]
    pub fn rung(&self, index: usize) -> Option<&Rung> {
        self.rungs.get(index)
    }

    /// Index of a named variation
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.rungs.iter().position(|rung| rung.name == name)
    }

    /// Starting rung for a fitness level
    #[must_use]
    pub fn default_index(&self, level: FitnessLevel) -> usize {
        let index = match level {
            FitnessLevel::Beginner => 0,
            FitnessLevel::Intermediate => 2,
            FitnessLevel::Advanced => 4,
        };
        index.min(self.rungs.len().saturating_sub(1))
    }

    /// The user's current rung: the recorded variation, else the fitness-level default
    #[must_use]
    pub fn current_index(&self, exercise: ExerciseType, capabilities: &UserCapabilities) -> usize {
        capabilities
            .current_variation(exercise)
            .and_then(|name| {
                let position = self.position(name);
                if position.is_none() {
                    warn!(
                        exercise = %exercise,
                        variation = name,
                        "Recorded variation not on ladder, using fitness-level default"
                    );
                }
                position
            })
            .unwrap_or_else(|| self.default_index(capabilities.fitness_level))
    }
}

/// Progression ladders keyed by exercise
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressionCatalog {
    ladders: HashMap<ExerciseType, ProgressionLadder>,
}

impl ProgressionCatalog {
    /// Standard ladders for push-ups, squats, planks, and lunges
    #[must_use]
    pub fn standard() -> Self {
        let mut ladders = HashMap::new();
        ladders.insert(
            ExerciseType::PushUp,
            ProgressionLadder {
                rungs: vec![
                    Rung::reps("wall", 1, 5, 15),
                    Rung::reps("incline", 2, 5, 12),
                    Rung::reps("knee", 3, 5, 15),
                    Rung::reps("standard", 4, 5, 20),
                    Rung::reps("diamond", 6, 3, 15),
                    Rung::reps("archer", 8, 2, 10),
                    Rung::reps("one-arm", 10, 1, 5),
                ],
                volume: VolumeStep::Reps {
                    increment: 2,
                    max: 25,
                    decrement: 2,
                    min: 3,
                },
            },
        );
        ladders.insert(
            ExerciseType::Squat,
            ProgressionLadder {
                rungs: vec![
                    Rung::reps("chair-assisted", 1, 5, 15),
                    Rung::reps("partial", 2, 8, 20),
                    Rung::reps("bodyweight", 3, 10, 25),
                    Rung::reps("jump", 5, 5, 15),
                    Rung::reps("single-leg", 7, 3, 12),
                    Rung::reps("pistol", 9, 1, 8),
                ],
                volume: VolumeStep::Reps {
                    increment: 3,
                    max: 30,
                    decrement: 3,
                    min: 5,
                },
            },
        );
        ladders.insert(
            ExerciseType::Plank,
            ProgressionLadder {
                rungs: vec![
                    Rung::hold("wall", 1, 10.0, 60.0),
                    Rung::hold("incline", 2, 15.0, 90.0),
                    Rung::hold("knee", 3, 20.0, 120.0),
                    Rung::hold("standard", 4, 30.0, 180.0),
                    Rung::hold("side", 6, 15.0, 90.0),
                    Rung::hold("single-arm", 8, 10.0, 60.0),
                ],
                volume: VolumeStep::Duration {
                    increment_secs: 10.0,
                    max_secs: 300.0,
                    decrement_secs: 10.0,
                    min_secs: 15.0,
                },
            },
        );
        ladders.insert(
            ExerciseType::Lunge,
            ProgressionLadder {
                rungs: vec![
                    Rung::reps("assisted", 1, 5, 12),
                    Rung::reps("stationary", 2, 6, 15),
                    Rung::reps("walking", 4, 8, 20),
                    Rung::reps("jumping", 6, 5, 12),
                    Rung::reps("weighted", 7, 6, 15),
                ],
                volume: VolumeStep::Reps {
                    increment: 2,
                    max: 20,
                    decrement: 2,
                    min: 4,
                },
            },
        );
        Self { ladders }
    }

    /// Register or replace the ladder of an exercise
    #[must_use]
    pub fn with_ladder(mut self, exercise: ExerciseType, ladder: ProgressionLadder) -> Self {
        self.ladders.insert(exercise, ladder);
        self
    }

    /// Ladder for an exercise, if it has one
    #[must_use]
    pub fn ladder(&self, exercise: ExerciseType) -> Option<&ProgressionLadder> {
        self.ladders.get(&exercise)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_standard_ladders_are_well_formed() {
        let catalog = ProgressionCatalog::standard();
        for exercise in [
            ExerciseType::PushUp,
            ExerciseType::Squat,
            ExerciseType::Plank,
            ExerciseType::Lunge,
        ] {
            let Some(ladder) = catalog.ladder(exercise) else {
                unreachable!("standard ladder registered for {exercise}");
            };
            assert!(ProgressionLadder::new(ladder.rungs().to_vec(), ladder.volume()).is_ok());
        }
        assert!(catalog.ladder(ExerciseType::JumpingJack).is_none());
    }

    #[test]
    fn test_rejects_non_increasing_difficulty() {
        let rungs = vec![Rung::reps("a", 2, 1, 5), Rung::reps("b", 2, 1, 5)];
        let volume = VolumeStep::Reps {
            increment: 1,
            max: 10,
            decrement: 1,
            min: 1,
        };
        assert!(ProgressionLadder::new(rungs, volume).is_err());
        assert!(ProgressionLadder::new(Vec::new(), volume).is_err());
    }

    #[test]
    fn test_current_index_prefers_recorded_variation() {
        let catalog = ProgressionCatalog::standard();
        let Some(ladder) = catalog.ladder(ExerciseType::Lunge) else {
            unreachable!("lunge ladder registered");
        };
        let mut capabilities = UserCapabilities::new(Uuid::new_v4(), FitnessLevel::Advanced);
        assert_eq!(ladder.current_index(ExerciseType::Lunge, &capabilities), 4);

        capabilities
            .current_variations
            .insert(ExerciseType::Lunge, "stationary".to_owned());
        assert_eq!(ladder.current_index(ExerciseType::Lunge, &capabilities), 1);

        capabilities
            .current_variations
            .insert(ExerciseType::Lunge, "moonwalk".to_owned());
        assert_eq!(ladder.current_index(ExerciseType::Lunge, &capabilities), 4);
    }
}
