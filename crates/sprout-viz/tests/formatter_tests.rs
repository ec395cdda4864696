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

use approx::assert_relative_eq;
use sprout_core::{LearningConfig, ManualClock, TimeRange};
use sprout_metrics::{
    AdaptabilityMetrics, EngagementMetrics, ErrorAnalysis, ErrorPatterns, LevelProgression,
    MetricsError, MetricsProvider, PerformanceMetrics, ProblemArea, ProblemAreaCount,
    ProgressionMetrics, StreakData,
};
use sprout_viz::{ChartKind, VisualizationFormatter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Fixed metrics that count how often they are read.
struct FixedMetrics {
    calls: AtomicUsize,
    accuracy_rate: f64,
    average_response_time: f64,
    accuracy_improvement: f64,
}

impl FixedMetrics {
    fn new(accuracy_rate: f64, average_response_time: f64, accuracy_improvement: f64) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            accuracy_rate,
            average_response_time,
            accuracy_improvement,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl MetricsProvider for FixedMetrics {
    fn session_engagement(&self, _: &str) -> Result<EngagementMetrics, MetricsError> {
        self.hit();
        Ok(EngagementMetrics {
            time_on_task: 120.0,
            tasks_completed: 7,
            total_attempts: 9,
            unique_exercise_types: 2,
        })
    }

    fn performance(&self, _: &str, _: Option<&str>) -> Result<PerformanceMetrics, MetricsError> {
        self.hit();
        Ok(PerformanceMetrics {
            attempts_before_correct: 1.5,
            average_response_time: self.average_response_time,
            accuracy_rate: self.accuracy_rate,
            streak_data: StreakData::default(),
        })
    }

    fn progression(
        &self,
        _: &str,
        _: Option<TimeRange>,
    ) -> Result<ProgressionMetrics, MetricsError> {
        self.hit();
        Ok(ProgressionMetrics {
            levels_completed: 2,
            difficulty_progression: vec![
                LevelProgression {
                    timestamp: 3_600_000,
                    old_level: 1,
                    new_level: 2,
                    total_score: 55,
                },
                LevelProgression {
                    timestamp: 7_322_000,
                    old_level: 2,
                    new_level: 3,
                    total_score: 110,
                },
            ],
            learning_rate: 0.0,
            module_completion_times: Vec::new(),
        })
    }

    fn error_analysis(&self, _: &str, _: Option<&str>) -> Result<ErrorAnalysis, MetricsError> {
        self.hit();
        Ok(ErrorAnalysis {
            common_errors: Vec::new(),
            error_patterns: ErrorPatterns {
                operation_confusion: 4,
                magnitude_errors: 1,
                reversal_errors: 2,
                carry_borrow_errors: 3,
            },
            problem_areas: vec![
                ProblemAreaCount {
                    area: ProblemArea::DoubleDigitAddition,
                    count: 5,
                },
                ProblemAreaCount {
                    area: ProblemArea::SingleDigitSubtraction,
                    count: 1,
                },
            ],
        })
    }

    fn adaptability(
        &self,
        _: &str,
        _: Option<TimeRange>,
    ) -> Result<AdaptabilityMetrics, MetricsError> {
        self.hit();
        Ok(AdaptabilityMetrics {
            speed_improvement: Vec::new(),
            accuracy_improvement: self.accuracy_improvement,
            difficulty_adjustment_recommendations: None,
        })
    }
}

fn formatter(metrics: Arc<FixedMetrics>) -> (Arc<ManualClock>, VisualizationFormatter) {
    let clock = Arc::new(ManualClock::new(0));
    let formatter = VisualizationFormatter::new(
        metrics,
        clock.clone(),
        Arc::new(LearningConfig::default()),
    );
    (clock, formatter)
}

#[test]
fn test_achievement_chart_layout() -> anyhow::Result<()> {
    let metrics = Arc::new(FixedMetrics::new(1.0, 5.0, 0.0));
    let (_, formatter) = formatter(metrics);

    let chart = formatter.achievement_chart("s1")?;
    assert_eq!(
        chart.labels,
        vec!["Tasks Completed", "Unique Exercises", "Total Attempts"]
    );
    assert_eq!(chart.datasets[0].data, vec![7.0, 2.0, 9.0]);
    assert_eq!(chart.datasets[0].background_color.len(), 3);
    assert_eq!(chart.datasets[0].border_width, Some(1));

    let json = serde_json::to_value(&chart)?;
    assert!(json["datasets"][0]["backgroundColor"].is_array());
    assert!(json["datasets"][0].get("label").is_none());
    Ok(())
}

#[test]
fn test_charts_are_cached_until_timeout() -> anyhow::Result<()> {
    let metrics = Arc::new(FixedMetrics::new(1.0, 5.0, 0.0));
    let (clock, formatter) = formatter(metrics.clone());

    formatter.error_distribution("s1")?;
    formatter.error_distribution("s1")?;
    assert_eq!(metrics.calls(), 1);

    formatter.error_distribution("s2")?;
    assert_eq!(metrics.calls(), 2);

    clock.advance(30_000);
    formatter.error_distribution("s1")?;
    assert_eq!(metrics.calls(), 3);

    formatter.clear_cache();
    formatter.error_distribution("s1")?;
    assert_eq!(metrics.calls(), 4);
    Ok(())
}

#[test]
fn test_performance_line_uses_level_change_times() -> anyhow::Result<()> {
    let metrics = Arc::new(FixedMetrics::new(0.75, 8.0, 0.0));
    let (_, formatter) = formatter(metrics);

    let chart = formatter.performance_line("s1", None)?;
    assert_eq!(chart.labels, vec!["01:00:00", "02:02:02"]);
    assert_eq!(chart.datasets[0].label.as_deref(), Some("Accuracy Rate"));
    assert_relative_eq!(chart.datasets[0].data[0], 75.0);
    assert_eq!(chart.datasets[0].fill, Some(false));
    assert_relative_eq!(chart.datasets[1].data[0], 8.0);
    Ok(())
}

#[test]
fn test_error_distribution_and_heatmap() -> anyhow::Result<()> {
    let metrics = Arc::new(FixedMetrics::new(1.0, 5.0, 0.0));
    let (_, formatter) = formatter(metrics);

    let pie = formatter.error_distribution("s1")?;
    assert_eq!(pie.labels.len(), 4);
    assert_eq!(pie.datasets[0].data, vec![4.0, 1.0, 2.0, 3.0]);

    let heatmap = formatter.learning_heatmap("s1")?;
    assert_eq!(heatmap.exercises.len(), 3);
    assert_eq!(heatmap.values.len(), 9);
    assert_eq!(heatmap.value(0, 1), Some(5));
    assert_eq!(heatmap.value(1, 0), Some(1));
    assert_eq!(heatmap.value(2, 0), Some(0));
    Ok(())
}

#[test]
fn test_progress_meters() -> anyhow::Result<()> {
    let metrics = Arc::new(FixedMetrics::new(0.9, 6.0, -0.1));
    let (_, formatter) = formatter(metrics.clone());
    let palette = formatter.palette().clone();

    let meters = formatter.progress_meters("s1")?;
    assert_relative_eq!(meters.accuracy.value, 90.0);
    assert_eq!(meters.accuracy.color, palette.success);
    assert_relative_eq!(meters.accuracy.threshold, 80.0);

    // 6 s of a 30 s limit.
    assert_relative_eq!(meters.speed.value, 20.0);
    assert_eq!(meters.speed.color, palette.success);
    assert_relative_eq!(meters.speed.threshold, 50.0);

    assert_relative_eq!(meters.improvement.value, 0.0);
    assert_eq!(meters.improvement.color, palette.error);

    let before = metrics.calls();
    formatter.progress_meters("s1")?;
    assert_eq!(metrics.calls(), before + 2);
    Ok(())
}

#[test]
fn test_slow_answers_cap_speed_meter() -> anyhow::Result<()> {
    let metrics = Arc::new(FixedMetrics::new(0.5, 90.0, 0.3));
    let (_, formatter) = formatter(metrics);

    let meters = formatter.progress_meters("s1")?;
    assert_relative_eq!(meters.speed.value, 100.0);
    assert_eq!(meters.speed.color, formatter.palette().error);
    assert_relative_eq!(meters.improvement.value, 30.0, epsilon = 1e-9);
    Ok(())
}

#[test]
fn test_chart_options_are_memoized() {
    let metrics = Arc::new(FixedMetrics::new(1.0, 5.0, 0.0));
    let (_, formatter) = formatter(metrics);

    let first = formatter.chart_options(ChartKind::Pie);
    let second = formatter.chart_options(ChartKind::Pie);
    assert_eq!(first, second);
    assert!(!formatter.chart_options(ChartKind::Heatmap).plugins.legend.display);
}
