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

use crate::error::MetricsError;
use crate::stats;
use crate::types::{
    AdaptabilityMetrics, AdjustmentDirection, DifficultyRecommendation, SpeedImprovement,
};
use sprout_core::{AnswerRecord, LearningConfig};

/// Answers per accuracy window.
const ACCURACY_WINDOW: usize = 10;
/// Answers considered for a difficulty recommendation.
const RECOMMENDATION_WINDOW: usize = 10;
/// Recent accuracy below which difficulty should drop.
const LOW_ACCURACY_THRESHOLD: f64 = 0.3;

/// Adaptability indicators over answers in chronological order.
pub(crate) fn adaptability(
    answers: &[&AnswerRecord],
    config: &LearningConfig,
) -> Result<AdaptabilityMetrics, MetricsError> {
    Ok(AdaptabilityMetrics {
        speed_improvement: speed_improvement(answers),
        accuracy_improvement: accuracy_improvement(answers),
        difficulty_adjustment_recommendations: recommendation(answers, config)?,
    })
}

/// Per exercise type, how much faster the second half of correct answers
/// were than the first half.
fn speed_improvement(answers: &[&AnswerRecord]) -> Vec<SpeedImprovement> {
    let mut by_type: Vec<(&str, Vec<f64>)> = Vec::new();
    for answer in answers.iter().filter(|a| a.is_correct) {
        match by_type
            .iter_mut()
            .find(|(name, _)| *name == answer.exercise_type)
        {
            Some((_, times)) => times.push(answer.time_taken),
            None => by_type.push((answer.exercise_type.as_str(), vec![answer.time_taken])),
        }
    }

    by_type
        .into_iter()
        .filter(|(_, times)| times.len() >= 2)
        .map(|(exercise_type, times)| {
            let (first, second) = stats::half_means(&times);
            SpeedImprovement {
                exercise_type: exercise_type.to_string(),
                improvement: -stats::relative_change(first, second),
            }
        })
        .collect()
}

/// Relative change in accuracy between the first and second half of
/// fixed-size answer windows.
fn accuracy_improvement(answers: &[&AnswerRecord]) -> f64 {
    let windows: Vec<f64> = answers
        .chunks(ACCURACY_WINDOW)
        .map(|window| {
            window.iter().filter(|a| a.is_correct).count() as f64 / window.len() as f64
        })
        .collect();
    if windows.len() < 2 {
        return 0.0;
    }

    let (first, second) = stats::half_means(&windows);
    stats::relative_change(first, second)
}

fn recommendation(
    answers: &[&AnswerRecord],
    config: &LearningConfig,
) -> Result<Option<DifficultyRecommendation>, MetricsError> {
    if answers.len() < RECOMMENDATION_WINDOW {
        return Ok(None);
    }

    let recent = &answers[answers.len() - RECOMMENDATION_WINDOW..];
    let accuracy = recent.iter().filter(|a| a.is_correct).count() as f64 / recent.len() as f64;
    let times: Vec<f64> = recent.iter().map(|a| a.time_taken).collect();
    let average_time = stats::mean(&times);

    if accuracy > config.progress.auto_level_up_threshold {
        let exercise_type = &recent[0].exercise_type;
        let tier = config
            .exercise_tier(exercise_type)
            .ok_or_else(|| MetricsError::UnknownExerciseType(exercise_type.clone()))?;
        if average_time < config.tier(tier).time_limit / 2.0 {
            return Ok(Some(DifficultyRecommendation::adjust(
                AdjustmentDirection::Increase,
                "High accuracy and quick responses",
            )));
        }
    }

    if accuracy < LOW_ACCURACY_THRESHOLD {
        return Ok(Some(DifficultyRecommendation::adjust(
            AdjustmentDirection::Decrease,
            "Low accuracy rate",
        )));
    }

    Ok(Some(DifficultyRecommendation::keep()))
}
