// ABOUTME: Declarative rep-counting state machine tables and their generic stepper
// ABOUTME: One transition table per exercise; the stepper follows edges while their guards fire
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Rep finite state machine
//!
//! Every rep-counted exercise cycles through
//! `Rest → Starting → Eccentric → Bottom → Concentric → Top → Completed`. The
//! cycle is described as data ([`RepCycle`]): which angle drives it and the
//! threshold guarding each edge. [`RepCycle::step`] is the only interpreter.

use formcoach_core::models::{ExerciseType, JointAngles, RepPhase};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Phases in cycle order; each entry is the source of the next edge
const CYCLE_ORDER: [RepPhase; 7] = [
    RepPhase::Rest,
    RepPhase::Starting,
    RepPhase::Eccentric,
    RepPhase::Bottom,
    RepPhase::Concentric,
    RepPhase::Top,
    RepPhase::Completed,
];

/// Angle that drives an exercise's cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryJoint {
    /// Mean of both elbows
    AverageElbow,
    /// Mean of both knees
    AverageKnee,
    /// The more bent knee (front leg of a split stance)
    LeadingKnee,
}

impl PrimaryJoint {
    /// Read the driving angle from a frame's joint angles
    #[must_use]
    pub fn measure(&self, angles: &JointAngles) -> f64 {
        match self {
            Self::AverageElbow => angles.average_elbow(),
            Self::AverageKnee => angles.average_knee(),
            Self::LeadingKnee => angles.leading_knee(),
        }
    }

    /// Driving joint for an exercise's depth checks
    #[must_use]
    pub const fn for_exercise(exercise: ExerciseType) -> Option<Self> {
        match exercise {
            ExerciseType::PushUp => Some(Self::AverageElbow),
            ExerciseType::Squat => Some(Self::AverageKnee),
            ExerciseType::Lunge => Some(Self::LeadingKnee),
            ExerciseType::Plank | ExerciseType::JumpingJack | ExerciseType::Unknown => None,
        }
    }

    /// Driving angle only when it was actually measured.
    ///
    /// Averages need both sides; the leading knee needs at least one.
    #[must_use]
    pub fn measured(&self, angles: &JointAngles) -> Option<f64> {
        match self {
            Self::AverageElbow => Some(f64::midpoint(angles.left_elbow?, angles.right_elbow?)),
            Self::AverageKnee => Some(f64::midpoint(angles.left_knee?, angles.right_knee?)),
            Self::LeadingKnee => match (angles.left_knee, angles.right_knee) {
                (Some(left), Some(right)) => Some(left.min(right)),
                (one, other) => one.or(other),
            },
        }
    }
}

/// Which side of the threshold fires an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Angle strictly below the threshold (joint bending)
    Below,
    /// Angle strictly above the threshold (joint extending)
    Above,
}

/// One guarded edge of the cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Source phase
    pub from: RepPhase,
    /// Target phase
    pub to: RepPhase,
    /// Guard direction
    pub direction: Direction,
    /// Guard threshold in degrees
    pub threshold: f64,
}

impl Transition {
    /// Whether the guard holds for an angle
    #[must_use]
    pub fn fires(&self, angle: f64) -> bool {
        match self.direction {
            Direction::Below => angle < self.threshold,
            Direction::Above => angle > self.threshold,
        }
    }
}

/// Transition table and range of motion for one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepCycle {
    primary: PrimaryJoint,
    transitions: Vec<Transition>,
    rom_range: (f64, f64),
}

impl RepCycle {
    /// Build a cycle from the six edge thresholds in cycle order.
    ///
    /// The first three edges fire below their threshold (descending), the last
    /// three above (ascending). `rom_range` is `(deepest, fully extended)` in degrees.
    #[must_use]
    pub fn new(primary: PrimaryJoint, thresholds: [f64; 6], rom_range: (f64, f64)) -> Self {
        let transitions = CYCLE_ORDER
            .windows(2)
            .zip(thresholds)
            .enumerate()
            .map(|(index, (pair, threshold))| Transition {
                from: pair[0],
                to: pair[1],
                direction: if index < 3 {
                    Direction::Below
                } else {
                    Direction::Above
                },
                threshold,
            })
            .collect();

        Self {
            primary,
            transitions,
            rom_range,
        }
    }

    /// Driving angle of this cycle
    #[must_use]
    pub const fn primary(&self) -> PrimaryJoint {
        self.primary
    }

    /// `(deepest, fully extended)` angles used for range-of-motion scoring
    #[must_use]
    pub const fn rom_range(&self) -> (f64, f64) {
        self.rom_range
    }

    /// All edges in cycle order
    #[must_use]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Edge leaving a phase, if any
    #[must_use]
    pub fn edge_from(&self, phase: RepPhase) -> Option<&Transition> {
        self.transitions.iter().find(|edge| edge.from == phase)
    }

    /// Follow edges from `phase` while their guards fire for `angle`.
    ///
    /// Returns the phases entered in order (empty when nothing fired). Stepping
    /// stops at `Completed`, so at most one full cycle is walked per call.
    #[must_use]
    pub fn step(&self, phase: RepPhase, angle: f64) -> Vec<RepPhase> {
        let mut entered = Vec::new();
        let mut current = phase;
        while current != RepPhase::Completed {
            match self.edge_from(current) {
                Some(edge) if edge.fires(angle) => {
                    current = edge.to;
                    entered.push(current);
                }
                _ => break,
            }
        }
        entered
    }
}

/// Rep cycles for every rep-counted exercise
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionTable {
    cycles: HashMap<ExerciseType, RepCycle>,
}

impl TransitionTable {
    /// Standard tables for push-ups, squats, and lunges
    #[must_use]
    pub fn standard() -> Self {
        let mut cycles = HashMap::new();
        cycles.insert(
            ExerciseType::PushUp,
            RepCycle::new(
                PrimaryJoint::AverageElbow,
                [150.0, 120.0, 90.0, 100.0, 150.0, 160.0],
                (70.0, 160.0),
            ),
        );
        cycles.insert(
            ExerciseType::Squat,
            RepCycle::new(
                PrimaryJoint::AverageKnee,
                [160.0, 130.0, 100.0, 110.0, 150.0, 170.0],
                (70.0, 160.0),
            ),
        );
        cycles.insert(
            ExerciseType::Lunge,
            RepCycle::new(
                PrimaryJoint::LeadingKnee,
                [160.0, 130.0, 100.0, 110.0, 150.0, 170.0],
                (70.0, 160.0),
            ),
        );
        Self { cycles }
    }

    /// Register or replace the cycle of an exercise
    #[must_use]
    pub fn with_cycle(mut self, exercise: ExerciseType, cycle: RepCycle) -> Self {
        self.cycles.insert(exercise, cycle);
        self
    }

    /// Cycle for an exercise; `None` for exercises without rep counting
    #[must_use]
    pub fn cycle(&self, exercise: ExerciseType) -> Option<&RepCycle> {
        self.cycles.get(&exercise)
    }
}
