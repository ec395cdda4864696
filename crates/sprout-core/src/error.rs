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

//! Error types shared across the pipeline.

use thiserror::Error;

/// Failures of a [`KeyValueStore`](crate::storage::KeyValueStore).
#[derive(Debug, Error)]
pub enum StorageError {
    /// The underlying medium failed.
    #[error("I/O error on key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    /// A stored value could not be encoded or decoded.
    #[error("serialization error on key '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    /// The write would exceed the store's capacity.
    #[error("quota exceeded writing '{key}': needed {needed} bytes, {available} available")]
    QuotaExceeded {
        key: String,
        needed: usize,
        available: usize,
    },
    /// A lock guarding the store was poisoned.
    #[error("failed to acquire storage lock")]
    Lock,
}

/// Failures talking to the optional progress server.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("progress server unreachable: {0}")]
    Unreachable(String),
    #[error("progress server rejected the update: {0}")]
    Rejected(String),
}
