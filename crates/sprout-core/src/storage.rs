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

//! Storage and query contracts.

use crate::error::StorageError;
use crate::event::{Event, EventKind};
use crate::time::TimeRange;
use std::fmt::Debug;

/// A string key-value store with local-storage semantics.
///
/// Values are opaque strings, in practice JSON documents. Implementations must
/// be safe to share across threads.
pub trait KeyValueStore: Send + Sync + Debug {
    /// Reads a value. A missing key is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Read access to persisted events, as consumed by the metrics engine.
///
/// All methods return events in chronological order.
pub trait EventSource: Send + Sync {
    fn logs_by_session(&self, session_id: &str) -> Result<Vec<Event>, StorageError>;

    /// The most recent `limit` events of `kind`.
    fn logs_by_type(&self, kind: EventKind, limit: usize) -> Result<Vec<Event>, StorageError>;

    fn logs_by_time_range(&self, range: TimeRange) -> Result<Vec<Event>, StorageError>;

    fn all_logs(&self) -> Result<Vec<Event>, StorageError>;
}
