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

//! Learning configuration.
//!
//! Every struct here has a `Default` carrying the production constants, and
//! every field may be omitted from a JSON config file.

use crate::event::Operation;
use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// A difficulty band. Levels 1-3 are beginner, 4-7 intermediate, the rest advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DifficultyTier {
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyTier {
    /// Maps a learner level to its tier.
    pub fn for_level(level: u32) -> Self {
        match level {
            0..=3 => DifficultyTier::Beginner,
            4..=7 => DifficultyTier::Intermediate,
            _ => DifficultyTier::Advanced,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DifficultyTier::Beginner => "BEGINNER",
            DifficultyTier::Intermediate => "INTERMEDIATE",
            DifficultyTier::Advanced => "ADVANCED",
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An inclusive range of operand values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberRange {
    pub min: i64,
    pub max: i64,
}

impl NumberRange {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }
}

/// Parameters of one difficulty tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierConfig {
    pub range: NumberRange,
    pub operations: Vec<Operation>,
    /// Seconds allowed per question.
    pub time_limit: f64,
    /// Score step at which a level-up is considered.
    pub required_score: u32,
}

/// The three tier definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct DifficultyLevels {
    pub beginner: TierConfig,
    pub intermediate: TierConfig,
    pub advanced: TierConfig,
}

impl DifficultyLevels {
    pub fn get(&self, tier: DifficultyTier) -> &TierConfig {
        match tier {
            DifficultyTier::Beginner => &self.beginner,
            DifficultyTier::Intermediate => &self.intermediate,
            DifficultyTier::Advanced => &self.advanced,
        }
    }
}

impl Default for DifficultyLevels {
    fn default() -> Self {
        Self {
            beginner: TierConfig {
                range: NumberRange::new(0, 10),
                operations: vec![Operation::Add, Operation::Subtract],
                time_limit: 30.0,
                required_score: 5,
            },
            intermediate: TierConfig {
                range: NumberRange::new(0, 20),
                operations: vec![Operation::Add, Operation::Subtract, Operation::Multiply],
                time_limit: 45.0,
                required_score: 10,
            },
            advanced: TierConfig {
                range: NumberRange::new(0, 100),
                operations: vec![
                    Operation::Add,
                    Operation::Subtract,
                    Operation::Multiply,
                    Operation::Divide,
                ],
                time_limit: 60.0,
                required_score: 15,
            },
        }
    }
}

/// Progress persistence and level ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressConfig {
    pub save_interval_ms: u64,
    pub auto_level_up_threshold: f64,
    pub max_level: u32,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            save_interval_ms: 60_000,
            auto_level_up_threshold: 0.8,
            max_level: 10,
        }
    }
}

/// Points awarded for answers and level completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RewardConfig {
    pub correct_answer: u32,
    pub streak_bonus: u32,
    pub quick_answer_bonus: u32,
    pub level_completion: u32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            correct_answer: 10,
            streak_bonus: 5,
            quick_answer_bonus: 15,
            level_completion: 50,
        }
    }
}

/// Unlock conditions for achievements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AchievementThresholds {
    /// Maximum average response time in seconds for the quick learner badge.
    pub quick_learner_time: f64,
    pub quick_learner_tasks: u32,
    pub perfect_streak: u32,
}

impl Default for AchievementThresholds {
    fn default() -> Self {
        Self {
            quick_learner_time: 30.0,
            quick_learner_tasks: 5,
            perfect_streak: 10,
        }
    }
}

/// Event log buffering and retention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventLogConfig {
    pub storage_key: String,
    /// Buffer size that triggers an automatic flush.
    pub sync_threshold: usize,
    /// Maximum number of persisted events; older ones are dropped.
    pub max_persisted: usize,
    pub default_query_limit: usize,
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            storage_key: "math_logs".to_string(),
            sync_threshold: 100,
            max_persisted: 1000,
            default_query_limit: 100,
        }
    }
}

/// Memoization windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheConfig {
    pub metrics_timeout_ms: i64,
    pub visualization_timeout_ms: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            metrics_timeout_ms: 60_000,
            visualization_timeout_ms: 30_000,
        }
    }
}

/// Top-level configuration of a learning session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LearningConfig {
    pub difficulty_levels: DifficultyLevels,
    /// Exercise type to tier. Unknown exercise types have no tier.
    pub exercise_tiers: BTreeMap<String, DifficultyTier>,
    pub progress: ProgressConfig,
    pub rewards: RewardConfig,
    pub achievements: AchievementThresholds,
    pub event_log: EventLogConfig,
    pub cache: CacheConfig,
    /// How long a remediation narrowing lasts.
    pub remediation_delay_ms: i64,
    pub progress_storage_key: String,
}

impl Default for LearningConfig {
    fn default() -> Self {
        let exercise_tiers = [
            ("addition_level1", DifficultyTier::Beginner),
            ("addition_level2", DifficultyTier::Intermediate),
            ("subtraction_level1", DifficultyTier::Beginner),
            ("subtraction_level2", DifficultyTier::Intermediate),
            ("number_recognition", DifficultyTier::Beginner),
        ]
        .into_iter()
        .map(|(name, tier)| (name.to_string(), tier))
        .collect();

        Self {
            difficulty_levels: DifficultyLevels::default(),
            exercise_tiers,
            progress: ProgressConfig::default(),
            rewards: RewardConfig::default(),
            achievements: AchievementThresholds::default(),
            event_log: EventLogConfig::default(),
            cache: CacheConfig::default(),
            remediation_delay_ms: 300_000,
            progress_storage_key: "math_progress".to_string(),
        }
    }
}

impl LearningConfig {
    /// Parses a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid learning configuration")
    }

    /// Loads a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn exercise_tier(&self, exercise_type: &str) -> Option<DifficultyTier> {
        self.exercise_tiers.get(exercise_type).copied()
    }

    pub fn tier(&self, tier: DifficultyTier) -> &TierConfig {
        self.difficulty_levels.get(tier)
    }
}
