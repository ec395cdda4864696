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

use crate::types::EngagementMetrics;
use sprout_core::{Event, EventPayload};
use std::collections::HashSet;

/// Engagement counters over the events of one session, oldest first.
pub(crate) fn session_engagement(events: &[Event]) -> EngagementMetrics {
    let time_on_task = match (events.first(), events.last()) {
        (Some(first), Some(last)) if events.len() >= 2 => {
            (last.timestamp - first.timestamp) as f64 / 1000.0
        }
        _ => 0.0,
    };

    let answers: Vec<_> = events.iter().filter_map(Event::as_answer).collect();
    let exercise_types: HashSet<&str> = events
        .iter()
        .filter_map(|e| match &e.payload {
            EventPayload::ExerciseStart(start) => Some(start.exercise_type.as_str()),
            _ => None,
        })
        .collect();

    EngagementMetrics {
        time_on_task,
        tasks_completed: answers.iter().filter(|a| a.is_correct).count(),
        total_attempts: answers.len(),
        unique_exercise_types: exercise_types.len(),
    }
}
