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

//! Achievement unlock rules.

use sprout_core::config::AchievementThresholds;
use sprout_core::Achievement;
use sprout_metrics::{EngagementMetrics, PerformanceMetrics};

/// Achievements whose conditions currently hold, whether or not they were
/// already unlocked.
pub fn earned(
    thresholds: &AchievementThresholds,
    engagement: &EngagementMetrics,
    performance: &PerformanceMetrics,
    level: u32,
    max_level: u32,
) -> Vec<Achievement> {
    let mut earned = Vec::new();

    if performance.average_response_time <= thresholds.quick_learner_time
        && engagement.tasks_completed >= thresholds.quick_learner_tasks as usize
    {
        earned.push(Achievement::QuickLearner);
    }
    if performance.streak_data.current_streak >= thresholds.perfect_streak {
        earned.push(Achievement::PerfectScore);
    }
    if level >= max_level {
        earned.push(Achievement::MathMaster);
    }

    earned
}

/// The reason text attached to an unlock signal.
pub fn describe(achievement: Achievement) -> &'static str {
    match achievement {
        Achievement::QuickLearner => "Answered five problems quickly",
        Achievement::PerfectScore => "Ten correct answers in a row",
        Achievement::MathMaster => "Reached the highest level",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprout_metrics::StreakData;

    fn engagement(tasks: usize) -> EngagementMetrics {
        EngagementMetrics {
            time_on_task: 100.0,
            tasks_completed: tasks,
            total_attempts: tasks,
            unique_exercise_types: 1,
        }
    }

    fn performance(avg: f64, streak: u32) -> PerformanceMetrics {
        PerformanceMetrics {
            attempts_before_correct: 1.0,
            average_response_time: avg,
            accuracy_rate: 1.0,
            streak_data: StreakData {
                current_streak: streak,
                max_streak: streak,
                total_streaks: 0,
            },
        }
    }

    #[test]
    fn test_quick_learner_needs_five_tasks() {
        let thresholds = AchievementThresholds::default();
        assert!(earned(&thresholds, &engagement(4), &performance(10.0, 0), 1, 10).is_empty());
        assert_eq!(
            earned(&thresholds, &engagement(5), &performance(30.0, 0), 1, 10),
            vec![Achievement::QuickLearner]
        );
    }

    #[test]
    fn test_streak_and_level() {
        let thresholds = AchievementThresholds::default();
        let all = earned(&thresholds, &engagement(0), &performance(0.0, 10), 10, 10);
        assert_eq!(all, vec![Achievement::PerfectScore, Achievement::MathMaster]);
    }
}
