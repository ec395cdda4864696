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

//! Turns metrics into chart-ready data.

use crate::charts::{
    ChartData, ChartKind, ChartOptions, Dataset, HeatmapData, MeterReading, ProgressMeters,
};
use crate::palette::ColorPalette;
use chrono::DateTime;
use sprout_core::{Clock, DifficultyTier, LearningConfig, TimeRange, TtlCache};
use sprout_metrics::{ErrorAnalysis, MetricsError, MetricsProvider};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const HEATMAP_EXERCISES: [&str; 3] = ["Addition", "Subtraction", "Number Recognition"];
const HEATMAP_DIFFICULTIES: [&str; 3] = ["Beginner", "Intermediate", "Advanced"];
const SPEED_METER_THRESHOLD: f64 = 50.0;
const IMPROVEMENT_METER_THRESHOLD: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ChartKey {
    Achievement(String),
    Performance(String, Option<TimeRange>),
    Errors(String),
    Heatmap(String),
}

#[derive(Debug, Clone)]
enum ChartPayload {
    Chart(ChartData),
    Heatmap(HeatmapData),
}

/// Builds chart datasets and meters from a [`MetricsProvider`].
///
/// Chart results are cached per session for the configured visualization
/// timeout; meters are always recomputed.
pub struct VisualizationFormatter {
    metrics: Arc<dyn MetricsProvider>,
    clock: Arc<dyn Clock>,
    config: Arc<LearningConfig>,
    palette: ColorPalette,
    cache: Mutex<TtlCache<ChartKey, ChartPayload>>,
    chart_options: Mutex<HashMap<ChartKind, ChartOptions>>,
}

impl VisualizationFormatter {
    pub fn new(
        metrics: Arc<dyn MetricsProvider>,
        clock: Arc<dyn Clock>,
        config: Arc<LearningConfig>,
    ) -> Self {
        let cache = TtlCache::new(config.cache.visualization_timeout_ms);
        Self {
            metrics,
            clock,
            config,
            palette: ColorPalette::default(),
            cache: Mutex::new(cache),
            chart_options: Mutex::new(HashMap::new()),
        }
    }

    pub fn palette(&self) -> &ColorPalette {
        &self.palette
    }

    fn cache(&self) -> MutexGuard<'_, TtlCache<ChartKey, ChartPayload>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cached_chart<F>(&self, key: ChartKey, build: F) -> Result<ChartData, MetricsError>
    where
        F: FnOnce() -> Result<ChartData, MetricsError>,
    {
        let now = self.clock.now_ms();
        if let Some(ChartPayload::Chart(data)) = self.cache().get(&key, now) {
            return Ok(data);
        }
        let data = build()?;
        self.cache().insert(key, ChartPayload::Chart(data.clone()), now);
        Ok(data)
    }

    /// Bar data: tasks completed, unique exercise types, total attempts.
    pub fn achievement_chart(&self, session_id: &str) -> Result<ChartData, MetricsError> {
        self.cached_chart(ChartKey::Achievement(session_id.to_string()), || {
            let engagement = self.metrics.session_engagement(session_id)?;
            Ok(ChartData {
                labels: labels(&["Tasks Completed", "Unique Exercises", "Total Attempts"]),
                datasets: vec![Dataset {
                    data: vec![
                        engagement.tasks_completed as f64,
                        engagement.unique_exercise_types as f64,
                        engagement.total_attempts as f64,
                    ],
                    background_color: self.palette.primary_colors(3),
                    border_width: Some(1),
                    ..Dataset::default()
                }],
            })
        })
    }

    /// Line data labeled by level-change times, with the session's accuracy
    /// percentage and average response time as the two series.
    pub fn performance_line(
        &self,
        session_id: &str,
        range: Option<TimeRange>,
    ) -> Result<ChartData, MetricsError> {
        self.cached_chart(
            ChartKey::Performance(session_id.to_string(), range),
            || {
                let performance = self.metrics.performance(session_id, None)?;
                let progression = self.metrics.progression(session_id, range)?;
                let labels = progression
                    .difficulty_progression
                    .iter()
                    .map(|step| time_label(step.timestamp))
                    .collect();

                Ok(ChartData {
                    labels,
                    datasets: vec![
                        Dataset {
                            label: Some("Accuracy Rate".to_string()),
                            data: vec![performance.accuracy_rate * 100.0],
                            border_color: Some(self.palette.success.to_string()),
                            fill: Some(false),
                            ..Dataset::default()
                        },
                        Dataset {
                            label: Some("Response Time".to_string()),
                            data: vec![performance.average_response_time],
                            border_color: Some(self.palette.warning.to_string()),
                            fill: Some(false),
                            ..Dataset::default()
                        },
                    ],
                })
            },
        )
    }

    /// Pie data over the four error patterns.
    pub fn error_distribution(&self, session_id: &str) -> Result<ChartData, MetricsError> {
        self.cached_chart(ChartKey::Errors(session_id.to_string()), || {
            let patterns = self.metrics.error_analysis(session_id, None)?.error_patterns;
            Ok(ChartData {
                labels: labels(&[
                    "Operation Confusion",
                    "Magnitude Errors",
                    "Reversal Errors",
                    "Carry/Borrow Errors",
                ]),
                datasets: vec![Dataset {
                    data: vec![
                        patterns.operation_confusion as f64,
                        patterns.magnitude_errors as f64,
                        patterns.reversal_errors as f64,
                        patterns.carry_borrow_errors as f64,
                    ],
                    background_color: self.palette.primary_colors(self.palette.primary.len()),
                    border_width: Some(1),
                    ..Dataset::default()
                }],
            })
        })
    }

    /// A 3x3 exercise by difficulty grid of problem-area error counts.
    pub fn learning_heatmap(&self, session_id: &str) -> Result<HeatmapData, MetricsError> {
        let key = ChartKey::Heatmap(session_id.to_string());
        let now = self.clock.now_ms();
        if let Some(ChartPayload::Heatmap(data)) = self.cache().get(&key, now) {
            return Ok(data);
        }

        let analysis = self.metrics.error_analysis(session_id, None)?;
        let data = heatmap(&analysis);
        self.cache().insert(key, ChartPayload::Heatmap(data.clone()), now);
        Ok(data)
    }

    /// Accuracy, speed and improvement meters. Never cached.
    pub fn progress_meters(&self, session_id: &str) -> Result<ProgressMeters, MetricsError> {
        let performance = self.metrics.performance(session_id, None)?;
        let adaptability = self.metrics.adaptability(session_id, None)?;

        let accuracy = performance.accuracy_rate * 100.0;
        let base_time_limit = self.config.tier(DifficultyTier::Beginner).time_limit;
        let speed = if base_time_limit > 0.0 {
            (performance.average_response_time / base_time_limit * 100.0).min(100.0)
        } else {
            100.0
        };
        let improvement = adaptability.accuracy_improvement * 100.0;

        Ok(ProgressMeters {
            accuracy: MeterReading {
                value: accuracy,
                color: self.palette.color_for_value(accuracy, false).to_string(),
                threshold: self.config.progress.auto_level_up_threshold * 100.0,
            },
            speed: MeterReading {
                value: speed,
                color: self.palette.color_for_value(speed, true).to_string(),
                threshold: SPEED_METER_THRESHOLD,
            },
            improvement: MeterReading {
                value: improvement.max(0.0),
                color: self.palette.color_for_value(improvement, false).to_string(),
                threshold: IMPROVEMENT_METER_THRESHOLD,
            },
        })
    }

    /// Static display options, built once per kind.
    pub fn chart_options(&self, kind: ChartKind) -> ChartOptions {
        self.chart_options
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(kind)
            .or_insert_with(|| ChartOptions::for_kind(kind))
            .clone()
    }

    pub fn color_for_value(&self, value: f64, inverse: bool) -> &'static str {
        self.palette.color_for_value(value, inverse)
    }

    pub fn clear_cache(&self) {
        self.cache().clear();
        log::debug!("Visualization cache cleared.");
    }
}

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// `HH:MM:SS` in UTC.
fn time_label(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|time| time.format("%H:%M:%S").to_string())
        .unwrap_or_default()
}

fn heatmap(analysis: &ErrorAnalysis) -> HeatmapData {
    let columns = HEATMAP_DIFFICULTIES.len();
    let mut values = vec![0; HEATMAP_EXERCISES.len() * columns];

    for entry in &analysis.problem_areas {
        let row = if entry.area.is_addition() { 0 } else { 1 };
        let column = if entry.area.is_double_digit() { 1 } else { 0 };
        values[row * columns + column] += entry.count;
    }

    HeatmapData {
        exercises: labels(&HEATMAP_EXERCISES),
        difficulties: labels(&HEATMAP_DIFFICULTIES),
        values,
    }
}
