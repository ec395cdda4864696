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

//! Metric snapshot types.
//!
//! Each snapshot is an immutable value derived from a set of events. They
//! serialize with camelCase field names.

use serde::{Deserialize, Serialize};
use sprout_core::Operation;
use std::fmt;

/// Session engagement counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementMetrics {
    /// Seconds between the first and last event of the session.
    pub time_on_task: f64,
    pub tasks_completed: usize,
    pub total_attempts: usize,
    /// Distinct exercise types among `exerciseStart` events.
    pub unique_exercise_types: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakData {
    /// Correct answers in a row at the end of the sequence.
    pub current_streak: u32,
    pub max_streak: u32,
    /// Runs of correct answers ended by an incorrect one.
    pub total_streaks: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub attempts_before_correct: f64,
    /// Seconds, over correct answers only.
    pub average_response_time: f64,
    /// In `[0, 1]`.
    pub accuracy_rate: f64,
    pub streak_data: StreakData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgression {
    pub timestamp: i64,
    pub old_level: u32,
    pub new_level: u32,
    pub total_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleCompletionTime {
    pub module: String,
    pub average_time: f64,
    pub min_time: f64,
    pub max_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionMetrics {
    pub levels_completed: usize,
    pub difficulty_progression: Vec<LevelProgression>,
    /// Slope of daily accuracy, in accuracy per day.
    pub learning_rate: f64,
    pub module_completion_times: Vec<ModuleCompletionTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    pub num1: i64,
    pub num2: Option<i64>,
    pub operation: Operation,
    pub user_answer: i64,
    pub correct_answer: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonError {
    /// `num1 op num2 = userAnswer`, e.g. `7+5=11`.
    pub error: String,
    pub count: usize,
    pub details: ErrorDetails,
}

/// Counts of classified mistakes. One answer may count toward several.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPatterns {
    pub operation_confusion: usize,
    pub magnitude_errors: usize,
    pub reversal_errors: usize,
    pub carry_borrow_errors: usize,
}

impl ErrorPatterns {
    pub fn total(&self) -> usize {
        self.operation_confusion + self.magnitude_errors + self.reversal_errors + self.carry_borrow_errors
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProblemArea {
    #[serde(rename = "Single-digit addition")]
    SingleDigitAddition,
    #[serde(rename = "Double-digit addition")]
    DoubleDigitAddition,
    #[serde(rename = "Single-digit subtraction")]
    SingleDigitSubtraction,
    #[serde(rename = "Double-digit subtraction")]
    DoubleDigitSubtraction,
}

impl ProblemArea {
    pub fn label(&self) -> &'static str {
        match self {
            ProblemArea::SingleDigitAddition => "Single-digit addition",
            ProblemArea::DoubleDigitAddition => "Double-digit addition",
            ProblemArea::SingleDigitSubtraction => "Single-digit subtraction",
            ProblemArea::DoubleDigitSubtraction => "Double-digit subtraction",
        }
    }

    pub fn is_double_digit(&self) -> bool {
        matches!(
            self,
            ProblemArea::DoubleDigitAddition | ProblemArea::DoubleDigitSubtraction
        )
    }

    pub fn is_addition(&self) -> bool {
        matches!(
            self,
            ProblemArea::SingleDigitAddition | ProblemArea::DoubleDigitAddition
        )
    }
}

impl fmt::Display for ProblemArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemAreaCount {
    pub area: ProblemArea,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorAnalysis {
    pub common_errors: Vec<CommonError>,
    pub error_patterns: ErrorPatterns,
    /// Most frequent first.
    pub problem_areas: Vec<ProblemAreaCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedImprovement {
    pub exercise_type: String,
    /// Relative drop in response time; positive means faster.
    pub improvement: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentDirection {
    Increase,
    Decrease,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyRecommendation {
    pub should_adjust_difficulty: bool,
    pub direction: Option<AdjustmentDirection>,
    pub reason: Option<String>,
}

impl DifficultyRecommendation {
    pub fn keep() -> Self {
        Self {
            should_adjust_difficulty: false,
            direction: None,
            reason: None,
        }
    }

    pub fn adjust(direction: AdjustmentDirection, reason: &str) -> Self {
        Self {
            should_adjust_difficulty: true,
            direction: Some(direction),
            reason: Some(reason.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptabilityMetrics {
    pub speed_improvement: Vec<SpeedImprovement>,
    pub accuracy_improvement: f64,
    /// `None` until enough answers exist to judge.
    pub difficulty_adjustment_recommendations: Option<DifficultyRecommendation>,
}
