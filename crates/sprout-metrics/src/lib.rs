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

//! # Sprout Metrics
//!
//! Derives statistical summaries from the learning-event log.
//!
//! The [`MetricsEngine`] reads events through an
//! [`EventSource`](sprout_core::EventSource) and memoizes each result for a
//! configurable window. Consumers depend on the [`MetricsProvider`] trait.

mod adaptability;
mod engagement;
pub mod engine;
pub mod error;
mod error_analysis;
mod performance;
mod progression;
pub mod stats;
pub mod types;

pub use engine::{MetricsEngine, MetricsProvider};
pub use error::MetricsError;
pub use types::*;
