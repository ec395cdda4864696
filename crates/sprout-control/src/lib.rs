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

//! # Sprout Control
//!
//! Turns learning metrics into difficulty decisions.
//!
//! The [`DifficultyController`] owns the learner's level, score, streak and
//! per-exercise parameters. It reads metrics through
//! [`MetricsProvider`](sprout_metrics::MetricsProvider) and reports level and
//! achievement changes as [`Signal`](sprout_core::Signal)s on a channel.

pub mod achievements;
pub mod analysis;
pub mod controller;
pub mod difficulty;
pub mod feedback;

pub use analysis::{AdaptiveAnalyzer, AnalysisReport};
pub use controller::{DifficultyController, LevelChange, ProgressSnapshot};
pub use difficulty::DifficultyState;
pub use feedback::FeedbackHint;
