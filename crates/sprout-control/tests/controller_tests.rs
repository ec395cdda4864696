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

use sprout_control::DifficultyController;
use sprout_core::{Achievement, LearningConfig, ManualClock, Signal, StorageError, TimeRange};
use sprout_metrics::{
    AdaptabilityMetrics, AdjustmentDirection, DifficultyRecommendation, EngagementMetrics,
    ErrorAnalysis, MetricsError, MetricsProvider, PerformanceMetrics, ProgressionMetrics,
    StreakData,
};
use std::sync::Arc;

/// Serves fixed metrics, or fails every call.
struct FixedMetrics {
    learning_rate: f64,
    accuracy_improvement: f64,
    recommendation: Option<DifficultyRecommendation>,
    failing: bool,
}

impl FixedMetrics {
    fn new(learning_rate: f64, accuracy_improvement: f64) -> Self {
        Self {
            learning_rate,
            accuracy_improvement,
            recommendation: None,
            failing: false,
        }
    }

    fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new(0.0, 0.0)
        }
    }

    fn check(&self) -> Result<(), MetricsError> {
        if self.failing {
            Err(MetricsError::Source(StorageError::Lock))
        } else {
            Ok(())
        }
    }
}

impl MetricsProvider for FixedMetrics {
    fn session_engagement(&self, _: &str) -> Result<EngagementMetrics, MetricsError> {
        self.check()?;
        Ok(EngagementMetrics {
            time_on_task: 60.0,
            tasks_completed: 6,
            total_attempts: 6,
            unique_exercise_types: 1,
        })
    }

    fn performance(&self, _: &str, _: Option<&str>) -> Result<PerformanceMetrics, MetricsError> {
        self.check()?;
        Ok(PerformanceMetrics {
            attempts_before_correct: 1.0,
            average_response_time: 4.0,
            accuracy_rate: 1.0,
            streak_data: StreakData::default(),
        })
    }

    fn progression(
        &self,
        _: &str,
        _: Option<TimeRange>,
    ) -> Result<ProgressionMetrics, MetricsError> {
        self.check()?;
        Ok(ProgressionMetrics {
            levels_completed: 0,
            difficulty_progression: Vec::new(),
            learning_rate: self.learning_rate,
            module_completion_times: Vec::new(),
        })
    }

    fn error_analysis(&self, _: &str, _: Option<&str>) -> Result<ErrorAnalysis, MetricsError> {
        self.check()?;
        Ok(ErrorAnalysis {
            common_errors: Vec::new(),
            error_patterns: Default::default(),
            problem_areas: Vec::new(),
        })
    }

    fn adaptability(
        &self,
        _: &str,
        _: Option<TimeRange>,
    ) -> Result<AdaptabilityMetrics, MetricsError> {
        self.check()?;
        Ok(AdaptabilityMetrics {
            speed_improvement: Vec::new(),
            accuracy_improvement: self.accuracy_improvement,
            difficulty_adjustment_recommendations: self.recommendation.clone(),
        })
    }
}

fn controller() -> (DifficultyController, crossbeam_channel::Receiver<Signal>) {
    DifficultyController::new(
        Arc::new(LearningConfig::default()),
        Arc::new(ManualClock::new(0)),
    )
}

fn score_to(controller: &mut DifficultyController, score: u32) {
    while controller.score() < score {
        controller.record_correct(20.0);
    }
}

#[test]
fn test_level_up_when_improving_at_required_score() {
    let (mut c, rx) = controller();
    c.select_exercise("addition_level1");
    let metrics = FixedMetrics::new(0.15, 0.25);

    score_to(&mut c, 4);
    assert!(c.check_for_level_up(&metrics, "learner").is_none());

    score_to(&mut c, 5);
    let change = c.check_for_level_up(&metrics, "learner").expect("level up");
    assert_eq!((change.old_level, change.new_level), (1, 2));
    assert_eq!(change.total_score, 5);
    assert_eq!(c.level(), 2);
    assert_eq!(c.score(), 55);
    assert!(matches!(rx.try_recv(), Ok(Signal::LevelUp { .. })));
}

#[test]
fn test_no_level_up_without_improvement() {
    let (mut c, _rx) = controller();
    score_to(&mut c, 5);
    assert!(c
        .check_for_level_up(&FixedMetrics::new(0.05, 0.25), "learner")
        .is_none());
    assert!(c
        .check_for_level_up(&FixedMetrics::new(0.15, 0.1), "learner")
        .is_none());
    assert_eq!(c.level(), 1);
}

#[test]
fn test_level_up_falls_back_to_score_when_metrics_fail() {
    let (mut c, _rx) = controller();
    score_to(&mut c, 5);
    assert!(c
        .check_for_level_up(&FixedMetrics::failing(), "learner")
        .is_some());
    assert_eq!(c.level(), 2);
}

#[test]
fn test_decrease_recommendation_levels_down_with_warning() {
    let (mut c, rx) = controller();
    c.level_up();
    c.level_up();
    while rx.try_recv().is_ok() {}

    let mut metrics = FixedMetrics::new(0.0, 0.0);
    metrics.recommendation = Some(DifficultyRecommendation::adjust(
        AdjustmentDirection::Decrease,
        "Low accuracy rate",
    ));

    let score = c.score();
    let change = c
        .update_adaptive_difficulty(&metrics, "learner")
        .expect("level down");
    assert_eq!((change.old_level, change.new_level), (3, 2));
    assert_eq!(c.score(), score);

    let signals: Vec<Signal> = rx.try_iter().collect();
    assert!(matches!(
        &signals[0],
        Signal::PerformanceWarning { reason } if reason == "Low accuracy rate"
    ));
    assert!(matches!(signals[1], Signal::LevelDown { new_level: 2, .. }));
}

#[test]
fn test_adaptive_update_survives_metrics_failure() {
    let (mut c, _rx) = controller();
    c.level_up();
    let before = c.snapshot();
    assert!(c
        .update_adaptive_difficulty(&FixedMetrics::failing(), "learner")
        .is_none());
    assert_eq!(c.snapshot(), before);
}

#[test]
fn test_achievements_unlock_once() {
    let (mut c, rx) = controller();
    let metrics = FixedMetrics::new(0.0, 0.0);
    let engagement = metrics.session_engagement("s").unwrap();
    let performance = metrics.performance("s", None).unwrap();

    assert_eq!(
        c.check_achievements(&engagement, &performance),
        vec![Achievement::QuickLearner]
    );
    assert!(c.check_achievements(&engagement, &performance).is_empty());
    assert_eq!(rx.try_iter().count(), 1);
}
