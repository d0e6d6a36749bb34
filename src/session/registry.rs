// ABOUTME: Concurrent registry of coaching sessions keyed by session id
// ABOUTME: DashMap shards keep each session single-writer while other sessions run in parallel
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{CoachingSession, SessionCommand, SessionOptions, SessionTick};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use formcoach_core::errors::{AppError, AppResult};
use formcoach_core::models::{PerformanceMetrics, PoseFrame};
use formcoach_intelligence::CoachingConfig;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Live sessions keyed by id
///
/// Cloning is cheap and shares the same sessions.
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<Uuid, CoachingSession>>,
    config: Arc<CoachingConfig>,
}

impl SessionRegistry {
    /// Create an empty registry using the given configuration for new sessions
    #[must_use]
    pub fn new(config: CoachingConfig) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            config: Arc::new(config),
        }
    }

    /// Start a session and return its id
    pub fn create(&self, user_id: Uuid, options: &SessionOptions) -> Uuid {
        let session = CoachingSession::new(user_id, options, &self.config);
        let id = session.id();
        self.sessions.insert(id, session);
        id
    }

    /// Run one frame through a session
    ///
    /// # Errors
    ///
    /// Returns an error if the session does not exist
    pub fn process_frame(&self, session_id: Uuid, frame: &PoseFrame) -> AppResult<SessionTick> {
        self.with_session(session_id, |session| session.process_frame(frame))
    }

    /// Run frames for many sessions in parallel.
    ///
    /// Frames of one session are processed in their input order; results come
    /// back grouped per session in first-appearance order.
    ///
    /// # Errors
    ///
    /// Returns an error if any referenced session does not exist; no frame is
    /// processed in that case
    pub fn process_batch(
        &self,
        frames: Vec<(Uuid, PoseFrame)>,
    ) -> AppResult<Vec<(Uuid, Vec<SessionTick>)>> {
        let mut order: Vec<Uuid> = Vec::new();
        let mut grouped: HashMap<Uuid, Vec<PoseFrame>> = HashMap::new();
        for (session_id, frame) in frames {
            grouped
                .entry(session_id)
                .or_insert_with(|| {
                    order.push(session_id);
                    Vec::new()
                })
                .push(frame);
        }

        if let Some(missing) = order.iter().find(|id| !self.sessions.contains_key(*id)) {
            return Err(AppError::not_found(format!("Session {missing}")));
        }

        order
            .into_par_iter()
            .map(|session_id| {
                let frames = grouped.get(&session_id).map_or(&[][..], Vec::as_slice);
                let ticks = self.with_session(session_id, |session| {
                    frames
                        .iter()
                        .map(|frame| session.process_frame(frame))
                        .collect()
                })?;
                Ok((session_id, ticks))
            })
            .collect()
    }

    /// Apply a control command to a session
    ///
    /// # Errors
    ///
    /// Returns an error if the session does not exist
    pub fn apply(&self, session_id: Uuid, command: SessionCommand) -> AppResult<()> {
        self.with_session(session_id, |session| session.apply(command))
    }

    /// Summarize the current set of a session
    ///
    /// # Errors
    ///
    /// Returns an error if the session does not exist
    pub fn complete_set(
        &self,
        session_id: Uuid,
        effort: u8,
        timestamp: DateTime<Utc>,
    ) -> AppResult<PerformanceMetrics> {
        self.with_session(session_id, |session| session.complete_set(effort, timestamp))
    }

    /// Run a closure with exclusive access to a session
    ///
    /// # Errors
    ///
    /// Returns an error if the session does not exist
    pub fn with_session<T>(
        &self,
        session_id: Uuid,
        f: impl FnOnce(&mut CoachingSession) -> T,
    ) -> AppResult<T> {
        let mut entry = self
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| AppError::not_found(format!("Session {session_id}")))?;
        Ok(f(entry.value_mut()))
    }

    /// End a session and return its final state
    ///
    /// # Errors
    ///
    /// Returns an error if the session does not exist
    pub fn end(&self, session_id: Uuid) -> AppResult<CoachingSession> {
        let (_, session) = self
            .sessions
            .remove(&session_id)
            .ok_or_else(|| AppError::not_found(format!("Session {session_id}")))?;
        info!(
            session_id = %session_id,
            reps = session.context().rep_count,
            duration_secs = session.context().session_duration,
            "Coaching session ended"
        );
        Ok(session)
    }

    /// Whether a session is live
    #[must_use]
    pub fn contains(&self, session_id: Uuid) -> bool {
        self.sessions.contains_key(&session_id)
    }

    /// Number of live sessions
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is live
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(CoachingConfig::global().clone())
    }
}
