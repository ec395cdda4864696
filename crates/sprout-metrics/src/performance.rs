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

use crate::stats;
use crate::types::{PerformanceMetrics, StreakData};
use sprout_core::{AnswerRecord, Operation};
use std::collections::HashMap;

/// Performance over answers in chronological order.
pub(crate) fn performance(answers: &[&AnswerRecord]) -> PerformanceMetrics {
    let correct_times: Vec<f64> = answers
        .iter()
        .filter(|a| a.is_correct)
        .map(|a| a.time_taken)
        .collect();

    let accuracy_rate = if answers.is_empty() {
        0.0
    } else {
        correct_times.len() as f64 / answers.len() as f64
    };

    PerformanceMetrics {
        attempts_before_correct: attempts_before_correct(answers),
        average_response_time: stats::mean(&correct_times),
        accuracy_rate,
        streak_data: streaks(answers),
    }
}

/// Average attempts per solved problem. Problems sharing exercise type,
/// operands and operation are treated as the same problem.
fn attempts_before_correct(answers: &[&AnswerRecord]) -> f64 {
    let mut open: HashMap<(&str, i64, Operation, Option<i64>), u32> = HashMap::new();
    let mut total_attempts = 0u32;
    let mut solved = 0u32;

    for answer in answers {
        let key = (
            answer.exercise_type.as_str(),
            answer.num1,
            answer.operation,
            answer.num2,
        );
        let attempts = open.entry(key).or_insert(0);
        *attempts += 1;

        if answer.is_correct {
            total_attempts += *attempts;
            solved += 1;
            open.remove(&key);
        }
    }

    if solved == 0 {
        0.0
    } else {
        total_attempts as f64 / solved as f64
    }
}

fn streaks(answers: &[&AnswerRecord]) -> StreakData {
    let mut data = StreakData::default();
    for answer in answers {
        if answer.is_correct {
            data.current_streak += 1;
            data.max_streak = data.max_streak.max(data.current_streak);
        } else {
            if data.current_streak > 0 {
                data.total_streaks += 1;
            }
            data.current_streak = 0;
        }
    }
    data
}
