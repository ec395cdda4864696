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

//! The caching metrics engine.

use crate::error::MetricsError;
use crate::types::{
    AdaptabilityMetrics, EngagementMetrics, ErrorAnalysis, PerformanceMetrics, ProgressionMetrics,
};
use crate::{adaptability, engagement, error_analysis, performance, progression};
use sprout_core::{
    AnswerRecord, Clock, Event, EventKind, EventSource, LearningConfig, TimeRange, TtlCache,
};
use std::sync::{Arc, Mutex, PoisonError};

/// Answer events read for adaptability when no time range is given.
const ADAPTABILITY_DEFAULT_LIMIT: usize = 100;

/// Read interface over learning metrics.
///
/// Implemented by [`MetricsEngine`]; the difficulty controller and the
/// visualization formatter depend on this trait so they can be driven by
/// fixed values in tests.
pub trait MetricsProvider: Send + Sync {
    fn session_engagement(&self, session_id: &str) -> Result<EngagementMetrics, MetricsError>;

    fn performance(
        &self,
        session_id: &str,
        exercise_type: Option<&str>,
    ) -> Result<PerformanceMetrics, MetricsError>;

    /// Without a range, reads the whole persisted log.
    fn progression(
        &self,
        user_id: &str,
        range: Option<TimeRange>,
    ) -> Result<ProgressionMetrics, MetricsError>;

    fn error_analysis(
        &self,
        session_id: &str,
        exercise_type: Option<&str>,
    ) -> Result<ErrorAnalysis, MetricsError>;

    /// Without a range, reads the most recent 100 answers.
    fn adaptability(
        &self,
        user_id: &str,
        range: Option<TimeRange>,
    ) -> Result<AdaptabilityMetrics, MetricsError>;
}

type SessionKey = (String, Option<String>);
type RangeKey = (String, Option<TimeRange>);

#[derive(Debug)]
struct MetricCaches {
    engagement: TtlCache<String, EngagementMetrics>,
    performance: TtlCache<SessionKey, PerformanceMetrics>,
    progression: TtlCache<RangeKey, ProgressionMetrics>,
    errors: TtlCache<SessionKey, ErrorAnalysis>,
    adaptability: TtlCache<RangeKey, AdaptabilityMetrics>,
}

impl MetricCaches {
    fn new(timeout_ms: i64) -> Self {
        Self {
            engagement: TtlCache::new(timeout_ms),
            performance: TtlCache::new(timeout_ms),
            progression: TtlCache::new(timeout_ms),
            errors: TtlCache::new(timeout_ms),
            adaptability: TtlCache::new(timeout_ms),
        }
    }

    fn clear(&mut self) {
        self.engagement.clear();
        self.performance.clear();
        self.progression.clear();
        self.errors.clear();
        self.adaptability.clear();
    }
}

/// Computes metrics from an [`EventSource`] and memoizes them.
///
/// Every result is cached under all of its inputs for
/// `config.cache.metrics_timeout_ms`. Failed computations are not cached.
pub struct MetricsEngine {
    source: Arc<dyn EventSource>,
    clock: Arc<dyn Clock>,
    config: Arc<LearningConfig>,
    caches: Mutex<MetricCaches>,
}

impl MetricsEngine {
    pub fn new(
        source: Arc<dyn EventSource>,
        clock: Arc<dyn Clock>,
        config: Arc<LearningConfig>,
    ) -> Self {
        let caches = Mutex::new(MetricCaches::new(config.cache.metrics_timeout_ms));
        Self {
            source,
            clock,
            config,
            caches,
        }
    }

    /// Drops every cached metric.
    pub fn clear_cache(&self) {
        self.caches().clear();
        log::debug!("Metrics cache cleared.");
    }

    fn caches(&self) -> std::sync::MutexGuard<'_, MetricCaches> {
        self.caches.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn session_answers(
        &self,
        session_id: &str,
        exercise_type: Option<&str>,
    ) -> Result<Vec<Event>, MetricsError> {
        let mut events = self.source.logs_by_session(session_id)?;
        events.retain(|e| {
            e.as_answer()
                .is_some_and(|a| exercise_type.map_or(true, |t| a.exercise_type == t))
        });
        Ok(events)
    }
}

fn answers(events: &[Event]) -> Vec<&AnswerRecord> {
    events.iter().filter_map(Event::as_answer).collect()
}

impl MetricsProvider for MetricsEngine {
    fn session_engagement(&self, session_id: &str) -> Result<EngagementMetrics, MetricsError> {
        let now = self.clock.now_ms();
        let key = session_id.to_string();
        if let Some(hit) = self.caches().engagement.get(&key, now) {
            return Ok(hit);
        }

        let events = self.source.logs_by_session(session_id)?;
        let metrics = engagement::session_engagement(&events);
        self.caches().engagement.insert(key, metrics.clone(), now);
        Ok(metrics)
    }

    fn performance(
        &self,
        session_id: &str,
        exercise_type: Option<&str>,
    ) -> Result<PerformanceMetrics, MetricsError> {
        let now = self.clock.now_ms();
        let key = (session_id.to_string(), exercise_type.map(str::to_string));
        if let Some(hit) = self.caches().performance.get(&key, now) {
            return Ok(hit);
        }

        let events = self.session_answers(session_id, exercise_type)?;
        let metrics = performance::performance(&answers(&events));
        self.caches().performance.insert(key, metrics.clone(), now);
        Ok(metrics)
    }

    fn progression(
        &self,
        user_id: &str,
        range: Option<TimeRange>,
    ) -> Result<ProgressionMetrics, MetricsError> {
        let now = self.clock.now_ms();
        let key = (user_id.to_string(), range);
        if let Some(hit) = self.caches().progression.get(&key, now) {
            return Ok(hit);
        }

        let events = match range {
            Some(range) => self.source.logs_by_time_range(range)?,
            None => self.source.all_logs()?,
        };
        let metrics = progression::progression(&events);
        self.caches().progression.insert(key, metrics.clone(), now);
        Ok(metrics)
    }

    fn error_analysis(
        &self,
        session_id: &str,
        exercise_type: Option<&str>,
    ) -> Result<ErrorAnalysis, MetricsError> {
        let now = self.clock.now_ms();
        let key = (session_id.to_string(), exercise_type.map(str::to_string));
        if let Some(hit) = self.caches().errors.get(&key, now) {
            return Ok(hit);
        }

        let events = self.session_answers(session_id, exercise_type)?;
        let incorrect: Vec<&AnswerRecord> =
            answers(&events).into_iter().filter(|a| !a.is_correct).collect();
        let analysis = error_analysis::error_analysis(&incorrect);
        self.caches().errors.insert(key, analysis.clone(), now);
        Ok(analysis)
    }

    fn adaptability(
        &self,
        user_id: &str,
        range: Option<TimeRange>,
    ) -> Result<AdaptabilityMetrics, MetricsError> {
        let now = self.clock.now_ms();
        let key = (user_id.to_string(), range);
        if let Some(hit) = self.caches().adaptability.get(&key, now) {
            return Ok(hit);
        }

        let events = match range {
            Some(range) => self.source.logs_by_time_range(range)?,
            None => self
                .source
                .logs_by_type(EventKind::Answer, ADAPTABILITY_DEFAULT_LIMIT)?,
        };
        let metrics = adaptability::adaptability(&answers(&events), &self.config)?;
        self.caches().adaptability.insert(key, metrics.clone(), now);
        Ok(metrics)
    }
}
