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

//! # Sprout Core
//!
//! Foundational crate containing the event model, configuration, and the
//! interface contracts shared by every stage of the learning-analytics
//! pipeline.
//!
//! This crate defines the abstract "what": `sprout-telemetry` records events,
//! `sprout-metrics` derives statistics from them, `sprout-control` turns those
//! statistics into difficulty decisions and `sprout-viz` shapes them for charts.

pub mod cache;
pub mod config;
pub mod error;
pub mod event;
pub mod session;
pub mod signal;
pub mod storage;
pub mod task;
pub mod time;

pub use cache::TtlCache;
pub use config::{DifficultyTier, LearningConfig, NumberRange, TierConfig};
pub use error::{StorageError, SyncError};
pub use event::{AnswerRecord, Event, EventKind, EventPayload, Operation};
pub use session::new_session_id;
pub use signal::{Achievement, Signal};
pub use storage::{EventSource, KeyValueStore};
pub use task::{PeriodicWorker, TimerGroup};
pub use time::{Clock, ManualClock, SystemClock, TimeRange};
