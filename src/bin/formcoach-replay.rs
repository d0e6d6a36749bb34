// ABOUTME: Replays recorded pose frames through one coaching session and prints the results
// ABOUTME: Reports reps, cues, the set summary, and the difficulty recommendation for the set
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Replay a recorded push-up set with a target of 10 reps
//! formcoach-replay --frames pushups.jsonl --target-reps 10
//!
//! # Force the exercise and emit every tick as JSON
//! formcoach-replay --frames squats.jsonl --exercise squat --json
//!
//! # Quiet coaching, tired user
//! formcoach-replay --frames lunges.jsonl --feedback-level minimal --fatigue 0.8
//! ```

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use formcoach::logging::LoggingConfig;
use formcoach::replay::read_frames;
use formcoach::session::{SessionOptions, SessionRegistry, SessionTick};
use formcoach_core::models::{
    DifficultyAdjustment, ExerciseType, FeedbackLevel, FitnessLevel, PerformanceMetrics,
    UserCapabilities,
};
use formcoach_intelligence::{AdaptiveDifficultyEngine, CoachingConfig};
use std::path::PathBuf;
use std::slice;
use tracing::info;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "formcoach-replay",
    about = "Replay recorded pose frames through the FormCoach pipeline",
    long_about = "Runs a JSON-lines file of pose frames through one coaching session, printing rep completions, coaching cues, a set summary, and the difficulty recommendation for that set."
)]
struct Cli {
    /// JSON-lines file with one pose frame per line
    #[arg(long)]
    frames: PathBuf,

    /// Track this exercise instead of auto-detecting it
    #[arg(long)]
    exercise: Option<ExerciseType>,

    /// Target reps for the set
    #[arg(long)]
    target_reps: Option<u32>,

    /// Cue verbosity (minimal, normal, detailed)
    #[arg(long, default_value = "normal")]
    feedback_level: FeedbackLevel,

    /// Perceived effort for the set (1-10)
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(1..=10))]
    effort: u8,

    /// Current fatigue level (0-1) applied to the recommendation
    #[arg(long, default_value_t = 0.0)]
    fatigue: f64,

    /// Print every tick as a JSON line instead of a readable log
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let logging = LoggingConfig::from_env();
    let logging = if cli.verbose {
        logging.with_level("debug")
    } else {
        logging
    };
    logging.init()?;

    let config = CoachingConfig::global().clone();
    let frames = read_frames(&cli.frames)?;
    info!(frames = frames.len(), path = %cli.frames.display(), "Replaying frames");

    let user_id = Uuid::new_v4();
    let registry = SessionRegistry::new(config.clone());
    let session_id = registry.create(
        user_id,
        &SessionOptions {
            target_reps: cli.target_reps,
            feedback_level: cli.feedback_level,
            exercise: cli.exercise,
        },
    );
    registry.with_session(session_id, |session| {
        session.context_mut().set_fatigue_level(cli.fatigue);
    })?;

    for frame in &frames {
        let tick = registry.process_frame(session_id, frame)?;
        if cli.json {
            println!("{}", serde_json::to_string(&tick)?);
        } else {
            print_tick(&tick);
        }
    }

    let set = registry.complete_set(session_id, cli.effort, Utc::now())?;
    registry.end(session_id)?;

    let mut capabilities = UserCapabilities::new(user_id, FitnessLevel::default());
    capabilities.fatigue_level = cli.fatigue.clamp(0.0, 1.0);
    capabilities
        .exercise_history
        .entry(set.exercise)
        .or_default()
        .push(set.clone());

    let engine = AdaptiveDifficultyEngine::new(config.difficulty);
    let adjustments = engine.analyze(slice::from_ref(&set), &capabilities);
    let adjustments = engine.apply_fatigue_adjustment(adjustments, capabilities.fatigue_level);
    let recommendations = engine.personalized_recommendations(&capabilities);

    if cli.json {
        println!(
            "{}",
            serde_json::json!({
                "set": set,
                "adjustments": adjustments,
                "recommendations": recommendations,
            })
        );
    } else {
        print_summary(&set, &adjustments, &recommendations);
    }
    Ok(())
}

fn print_tick(tick: &SessionTick) {
    if let Some(rep) = &tick.frame.completed_rep {
        println!(
            "[{:>7.2}s] {} rep {}: form {:.0}, tempo {:.0}, rom {:.0}, {:.1}s",
            tick.frame.timestamp,
            tick.frame.exercise_type,
            rep.rep_number,
            rep.form_score,
            rep.tempo_score,
            rep.rom_score,
            rep.duration
        );
        for issue in &rep.issues {
            println!("           issue: {issue}");
        }
    }
    for cue in &tick.cues {
        println!(
            "[{:>7.2}s] {:<11} p{:<2} {}",
            tick.frame.timestamp,
            cue.category.as_str(),
            cue.priority,
            cue.message
        );
    }
}

fn print_summary(
    set: &PerformanceMetrics,
    adjustments: &[DifficultyAdjustment],
    recommendations: &[String],
) {
    println!();
    println!(
        "Set: {} {}/{} reps ({:.0}% complete) in {:.1}s",
        set.exercise,
        set.actual_reps,
        set.target_reps,
        set.completion_rate * 100.0,
        set.duration
    );
    println!(
        "Scores: form {:.1}, tempo {:.1}, rom {:.1}, effort {}",
        set.form_score, set.tempo_score, set.rom_score, set.effort
    );
    for adjustment in adjustments {
        println!(
            "Next set: {} ({:.0}% confidence) - {}",
            adjustment.adjustment_type,
            adjustment.confidence * 100.0,
            adjustment.reasoning
        );
        if let Some(variation) = &adjustment.modification {
            println!("  variation: {variation}");
        }
        if let Some(reps) = adjustment.new_reps {
            println!("  reps: {reps}");
        }
        if let Some(duration) = adjustment.new_duration {
            println!("  duration: {duration:.0}s");
        }
    }
    for recommendation in recommendations {
        println!("* {recommendation}");
    }
}
