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

//! Outbound notifications for the presentation layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A one-time badge the learner can earn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    QuickLearner,
    PerfectScore,
    MathMaster,
}

impl Achievement {
    pub fn id(&self) -> &'static str {
        match self {
            Achievement::QuickLearner => "quick_learner",
            Achievement::PerfectScore => "perfect_score",
            Achievement::MathMaster => "math_master",
        }
    }
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Something the UI should react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Signal {
    LevelUp {
        old_level: u32,
        new_level: u32,
        reason: String,
    },
    LevelDown {
        old_level: u32,
        new_level: u32,
        reason: String,
    },
    AchievementUnlocked {
        achievement: Achievement,
        reason: String,
    },
    PerformanceWarning {
        reason: String,
    },
}

impl Signal {
    pub fn reason(&self) -> &str {
        match self {
            Signal::LevelUp { reason, .. }
            | Signal::LevelDown { reason, .. }
            | Signal::AchievementUnlocked { reason, .. }
            | Signal::PerformanceWarning { reason } => reason,
        }
    }
}
