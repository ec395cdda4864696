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

//! # Sprout Telemetry
//!
//! Records learning events into a buffered, append-only log and persists them
//! through a [`KeyValueStore`](sprout_core::KeyValueStore) backend.

pub mod event_log;
pub mod service;
pub mod storage;

pub use event_log::{EventLog, SharedEventLog};
pub use service::AutoSync;
pub use storage::{FileStore, InMemoryStore};
