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

//! Heuristic analysis of learning metrics.
//!
//! The `AdaptiveAnalyzer` reads progression and adaptability metrics and
//! decides what the controller should change: the learner's level, the time
//! limits of exercises that got faster, and the operand ranges when accuracy
//! improves.

use sprout_metrics::{AdaptabilityMetrics, AdjustmentDirection, ProgressionMetrics};

/// Daily accuracy slope above which the learner is trending upward.
const LEVEL_UP_LEARNING_RATE: f64 = 0.1;
/// Relative accuracy gain required, together with the learning rate, to level up.
const LEVEL_UP_ACCURACY_IMPROVEMENT: f64 = 0.2;
/// Relative speed gain above which an exercise's time limit shrinks.
const SPEED_IMPROVEMENT_THRESHOLD: f64 = 0.2;
/// Relative accuracy gain above which operand ranges grow.
const RANGE_EXPANSION_THRESHOLD: f64 = 0.1;

/// Decisions derived from one set of metrics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisReport {
    /// Level change recommended by recent accuracy and speed.
    pub recommendation: Option<AdjustmentDirection>,
    /// Reason attached to the recommendation.
    pub reason: Option<String>,
    /// Exercise types whose time limit should shrink.
    pub faster_exercises: Vec<String>,
    /// `true` if every exercise's range should grow.
    pub expand_ranges: bool,
    /// Human-readable summary of the findings for logging.
    pub alerts: Vec<String>,
}

/// Analyzes metrics to determine difficulty changes.
#[derive(Debug, Default, Clone, Copy)]
pub struct AdaptiveAnalyzer;

impl AdaptiveAnalyzer {
    /// Whether the metric side of the level-up rule holds.
    ///
    /// The score side (a multiple of the tier's required score) is checked by
    /// the controller.
    pub fn metrics_support_level_up(
        &self,
        progression: &ProgressionMetrics,
        adaptability: &AdaptabilityMetrics,
    ) -> bool {
        progression.learning_rate > LEVEL_UP_LEARNING_RATE
            && adaptability.accuracy_improvement > LEVEL_UP_ACCURACY_IMPROVEMENT
    }

    /// Evaluates adaptability metrics.
    pub fn analyze(&self, metrics: &AdaptabilityMetrics) -> AnalysisReport {
        let mut report = AnalysisReport::default();

        if let Some(rec) = &metrics.difficulty_adjustment_recommendations {
            if rec.should_adjust_difficulty {
                report.recommendation = rec.direction;
                report.reason = rec.reason.clone();
                if let Some(direction) = rec.direction {
                    report.alerts.push(format!(
                        "Recommend {:?}: {}",
                        direction,
                        rec.reason.as_deref().unwrap_or("no reason given")
                    ));
                }
            }
        }

        for speed in &metrics.speed_improvement {
            if speed.improvement > SPEED_IMPROVEMENT_THRESHOLD {
                report.alerts.push(format!(
                    "'{}' answered {:.0}% faster",
                    speed.exercise_type,
                    speed.improvement * 100.0
                ));
                report.faster_exercises.push(speed.exercise_type.clone());
            }
        }

        if metrics.accuracy_improvement > RANGE_EXPANSION_THRESHOLD {
            report.expand_ranges = true;
            report.alerts.push(format!(
                "Accuracy improved by {:.0}%",
                metrics.accuracy_improvement * 100.0
            ));
        }

        if !report.alerts.is_empty() {
            log::debug!("Adaptive analysis: {}", report.alerts.join("; "));
        }
        report
    }
}
