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

//! # Sprout SDK
//!
//! The entry point for applications embedding the learning pipeline.
//!
//! A [`LearningSession`] owns one event log, metrics engine, difficulty
//! controller and visualization formatter, all sharing a single clock and
//! configuration. Answers go in through [`LearningSession::submit_answer`];
//! level and achievement changes come out as [`Signal`]s.

mod logging;
mod progress;
mod session;

pub use logging::init_logging;
pub use progress::{ProgressStore, ProgressSync};
pub use session::{AnswerOutcome, LearningSession, Question};

pub mod prelude {
    pub use sprout_control::{FeedbackHint, LevelChange, ProgressSnapshot};
    pub use sprout_core::{
        Achievement, DifficultyTier, EventKind, LearningConfig, Operation, Signal, SyncError,
        TimeRange,
    };
    pub use sprout_metrics::MetricsProvider;
    pub use sprout_telemetry::{FileStore, InMemoryStore};
    pub use sprout_viz::ChartKind;
}

pub use sprout_core::Signal;
