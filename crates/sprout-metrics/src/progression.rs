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
use crate::types::{LevelProgression, ModuleCompletionTime, ProgressionMetrics};
use chrono::{DateTime, NaiveDate};
use sprout_core::{Event, EventPayload};

/// Progression over a chronological set of events.
pub(crate) fn progression(events: &[Event]) -> ProgressionMetrics {
    let difficulty_progression: Vec<LevelProgression> = events
        .iter()
        .filter_map(|e| match &e.payload {
            EventPayload::LevelUp(up) => Some(LevelProgression {
                timestamp: e.timestamp,
                old_level: up.old_level,
                new_level: up.new_level,
                total_score: up.total_score,
            }),
            _ => None,
        })
        .collect();

    ProgressionMetrics {
        levels_completed: difficulty_progression.len(),
        difficulty_progression,
        learning_rate: learning_rate(events),
        module_completion_times: module_completion_times(events),
    }
}

/// Slope of per-day accuracy, days taken in order of first appearance.
fn learning_rate(events: &[Event]) -> f64 {
    let answers: Vec<(i64, bool)> = events
        .iter()
        .filter_map(|e| e.as_answer().map(|a| (e.timestamp, a.is_correct)))
        .collect();
    if answers.len() < 2 {
        return 0.0;
    }

    // (day, correct, total)
    let mut days: Vec<(Option<NaiveDate>, u32, u32)> = Vec::new();
    for (timestamp, is_correct) in answers {
        let day = DateTime::from_timestamp_millis(timestamp).map(|d| d.date_naive());
        let bucket = match days.iter().position(|(d, _, _)| *d == day) {
            Some(index) => &mut days[index],
            None => {
                days.push((day, 0, 0));
                let last = days.len() - 1;
                &mut days[last]
            }
        };
        bucket.2 += 1;
        if is_correct {
            bucket.1 += 1;
        }
    }

    let trend: Vec<f64> = days
        .iter()
        .map(|(_, correct, total)| *correct as f64 / *total as f64)
        .collect();
    stats::slope(&trend)
}

fn module_completion_times(events: &[Event]) -> Vec<ModuleCompletionTime> {
    let mut modules: Vec<(&str, Vec<f64>)> = Vec::new();
    for answer in events.iter().filter_map(Event::as_answer) {
        match modules
            .iter_mut()
            .find(|(name, _)| *name == answer.exercise_type)
        {
            Some((_, times)) => times.push(answer.time_taken),
            None => modules.push((answer.exercise_type.as_str(), vec![answer.time_taken])),
        }
    }

    modules
        .into_iter()
        .map(|(module, times)| ModuleCompletionTime {
            module: module.to_string(),
            average_time: stats::mean(&times),
            min_time: stats::min(&times),
            max_time: stats::max(&times),
        })
        .collect()
}
