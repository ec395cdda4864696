// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The buffered learning-event log.
//!
//! Events are appended to an in-memory buffer and persisted as a JSON array
//! under a single storage key. Queries only see persisted events; call
//! [`EventLog::flush`] first when the buffer must be visible.

use serde_json::Value;
use sprout_core::config::EventLogConfig;
use sprout_core::event::{
    AchievementRecord, ErrorRecord, ExerciseStartRecord, HintRecord, InteractionRecord,
    LevelDownRecord, LevelUpRecord,
};
use sprout_core::{
    new_session_id, AnswerRecord, Clock, DifficultyTier, Event, EventKind, EventPayload,
    EventSource, KeyValueStore, StorageError, TimeRange,
};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

/// Append-only event log with a write buffer.
#[derive(Debug)]
pub struct EventLog {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: EventLogConfig,
    buffer: Vec<Event>,
    session_id: OnceLock<String>,
}

impl EventLog {
    /// Creates a log over `store`, initializing the storage key to an empty
    /// array when it does not exist yet.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        config: EventLogConfig,
    ) -> Result<Self, StorageError> {
        if store.get(&config.storage_key)?.is_none() {
            store.set(&config.storage_key, "[]")?;
        }
        Ok(Self {
            store,
            clock,
            config,
            buffer: Vec::new(),
            session_id: OnceLock::new(),
        })
    }

    /// The id of the active session, created on first use.
    pub fn session_id(&self) -> &str {
        self.session_id
            .get_or_init(|| new_session_id(self.clock.now_ms()))
            .as_str()
    }

    /// Events appended since the last successful flush.
    pub fn pending(&self) -> &[Event] {
        &self.buffer
    }

    pub fn config(&self) -> &EventLogConfig {
        &self.config
    }

    /// Stamps `payload` with the current time and session and buffers it.
    ///
    /// Reaching the sync threshold triggers a flush. A failed automatic flush
    /// keeps the events buffered and is only logged.
    pub fn log_event(&mut self, payload: EventPayload) {
        let event = Event::new(self.clock.now_ms(), self.session_id(), payload);
        log::debug!(
            "Event '{}' buffered for {} ({} pending).",
            event.kind(),
            event.session_id,
            self.buffer.len() + 1
        );
        self.buffer.push(event);

        if self.buffer.len() >= self.config.sync_threshold {
            if let Err(e) = self.flush() {
                log::warn!(
                    "Automatic flush of {} events failed: {}",
                    self.buffer.len(),
                    e
                );
            }
        }
    }

    pub fn log_answer(&mut self, answer: AnswerRecord) {
        self.log_event(EventPayload::Answer(answer));
    }

    pub fn log_exercise_start(&mut self, exercise_type: &str, tier: DifficultyTier) {
        self.log_event(EventPayload::ExerciseStart(ExerciseStartRecord {
            exercise_type: exercise_type.to_string(),
            difficulty: tier.name().to_string(),
        }));
    }

    pub fn log_level_up(&mut self, old_level: u32, new_level: u32, total_score: u32) {
        self.log_event(EventPayload::LevelUp(LevelUpRecord {
            old_level,
            new_level,
            total_score,
        }));
    }

    pub fn log_level_down(&mut self, old_level: u32, new_level: u32, reason: &str) {
        self.log_event(EventPayload::LevelDown(LevelDownRecord {
            old_level,
            new_level,
            reason: reason.to_string(),
        }));
    }

    pub fn log_achievement(&mut self, achievement_id: &str, time_taken: Option<f64>) {
        self.log_event(EventPayload::Achievement(AchievementRecord {
            achievement_id: achievement_id.to_string(),
            time_taken,
        }));
    }

    pub fn log_hint(&mut self, exercise_type: &str, hint_type: &str) {
        self.log_event(EventPayload::Hint(HintRecord {
            exercise_type: exercise_type.to_string(),
            hint_type: hint_type.to_string(),
        }));
    }

    pub fn log_error(&mut self, error_type: &str, details: Value) {
        self.log_event(EventPayload::Error(ErrorRecord {
            error_type: error_type.to_string(),
            details,
        }));
    }

    pub fn log_interaction(&mut self, interaction_type: &str, details: Value) {
        self.log_event(EventPayload::Interaction(InteractionRecord {
            interaction_type: interaction_type.to_string(),
            details,
        }));
    }

    /// Appends the buffer to the persisted array, keeping only the most recent
    /// `max_persisted` events.
    ///
    /// On failure the buffer and the persisted array are left as they were.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let mut persisted = self.read_persisted()?;
        persisted.extend(self.buffer.iter().cloned());
        if persisted.len() > self.config.max_persisted {
            let excess = persisted.len() - self.config.max_persisted;
            persisted.drain(..excess);
        }

        let key = &self.config.storage_key;
        let json = serde_json::to_string(&persisted).map_err(|source| {
            StorageError::Serialization {
                key: key.clone(),
                source,
            }
        })?;
        self.store.set(key, &json)?;

        log::debug!(
            "Flushed {} events; {} persisted.",
            self.buffer.len(),
            persisted.len()
        );
        self.buffer.clear();
        Ok(())
    }

    /// Drops both buffered and persisted events.
    pub fn clear_logs(&mut self) -> Result<(), StorageError> {
        self.buffer.clear();
        self.store.set(&self.config.storage_key, "[]")
    }

    /// Every persisted event, oldest first.
    pub fn all_logs(&self) -> Result<Vec<Event>, StorageError> {
        let mut events = self.read_persisted()?;
        events.sort_by_key(|e| e.timestamp);
        Ok(events)
    }

    pub fn logs_by_session(&self, session_id: &str) -> Result<Vec<Event>, StorageError> {
        let mut events = self.all_logs()?;
        events.retain(|e| e.session_id == session_id);
        Ok(events)
    }

    /// The most recent `limit` events of `kind`, oldest first.
    pub fn logs_by_type(&self, kind: EventKind, limit: usize) -> Result<Vec<Event>, StorageError> {
        let mut events = self.all_logs()?;
        events.retain(|e| e.kind() == kind);
        if events.len() > limit {
            let excess = events.len() - limit;
            events.drain(..excess);
        }
        Ok(events)
    }

    /// [`logs_by_type`](Self::logs_by_type) with the configured default limit.
    pub fn recent_logs_by_type(&self, kind: EventKind) -> Result<Vec<Event>, StorageError> {
        self.logs_by_type(kind, self.config.default_query_limit)
    }

    pub fn logs_by_time_range(&self, range: TimeRange) -> Result<Vec<Event>, StorageError> {
        let mut events = self.all_logs()?;
        events.retain(|e| range.contains(e.timestamp));
        Ok(events)
    }

    fn read_persisted(&self) -> Result<Vec<Event>, StorageError> {
        let key = &self.config.storage_key;
        let Some(text) = self.store.get(key)? else {
            return Ok(Vec::new());
        };

        let entries: Vec<Value> = match serde_json::from_str(&text) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Persisted log '{}' is corrupt, reading as empty: {}", key, e);
                return Ok(Vec::new());
            }
        };

        let mut events = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_value::<Event>(entry) {
                Ok(event) => events.push(event),
                Err(e) => log::warn!("Skipping undecodable event in '{}': {}", key, e),
            }
        }
        Ok(events)
    }
}

/// A thread-safe handle to an [`EventLog`].
///
/// Every mutation goes through one mutex, so recorders on different threads
/// and the auto-sync worker never interleave a flush.
#[derive(Debug, Clone)]
pub struct SharedEventLog {
    inner: Arc<Mutex<EventLog>>,
}

impl SharedEventLog {
    pub fn new(log: EventLog) -> Self {
        Self {
            inner: Arc::new(Mutex::new(log)),
        }
    }

    /// Locks the log. A poisoned lock is recovered since the log holds no
    /// invariant a panic could break halfway.
    pub fn lock(&self) -> MutexGuard<'_, EventLog> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn log_event(&self, payload: EventPayload) {
        self.lock().log_event(payload);
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.lock().flush()
    }

    pub fn session_id(&self) -> String {
        self.lock().session_id().to_string()
    }
}

impl EventSource for SharedEventLog {
    fn logs_by_session(&self, session_id: &str) -> Result<Vec<Event>, StorageError> {
        self.lock().logs_by_session(session_id)
    }

    fn logs_by_type(&self, kind: EventKind, limit: usize) -> Result<Vec<Event>, StorageError> {
        self.lock().logs_by_type(kind, limit)
    }

    fn logs_by_time_range(&self, range: TimeRange) -> Result<Vec<Event>, StorageError> {
        self.lock().logs_by_time_range(range)
    }

    fn all_logs(&self) -> Result<Vec<Event>, StorageError> {
        self.lock().all_logs()
    }
}
