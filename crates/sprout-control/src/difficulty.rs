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

//! Per-exercise difficulty parameters.

use serde::{Deserialize, Serialize};
use sprout_core::{DifficultyTier, LearningConfig, NumberRange, Operation};

/// The live parameters of one exercise type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyState {
    pub range: NumberRange,
    pub operations: Vec<Operation>,
    /// Seconds allowed per question.
    pub time_limit: f64,
}

impl DifficultyState {
    /// Default parameters for `exercise_type`.
    ///
    /// The range and time limit come from the exercise's configured tier, or
    /// from `fallback` for unconfigured exercises. Exercises named after an
    /// operation only pose that operation.
    pub fn for_exercise(
        exercise_type: &str,
        config: &LearningConfig,
        fallback: DifficultyTier,
    ) -> Self {
        let tier = config.exercise_tier(exercise_type).unwrap_or(fallback);
        let tier_config = config.tier(tier);

        let operations = if exercise_type.contains("addition") {
            vec![Operation::Add]
        } else if exercise_type.contains("subtraction") {
            vec![Operation::Subtract]
        } else if exercise_type.contains("recognition") {
            vec![Operation::Recognition]
        } else {
            tier_config.operations.clone()
        };

        Self {
            range: tier_config.range,
            operations,
            time_limit: tier_config.time_limit,
        }
    }
}
