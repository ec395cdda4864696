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

//! Saved learner progress.

use sprout_control::ProgressSnapshot;
use sprout_core::{KeyValueStore, StorageError, SyncError};
use std::sync::Arc;

/// Pushes progress to a remote endpoint.
///
/// Failures are reported to the caller, which logs them; a session keeps
/// working offline.
pub trait ProgressSync: Send + Sync {
    fn push(&self, snapshot: &ProgressSnapshot) -> Result<(), SyncError>;
}

/// Reads and writes a [`ProgressSnapshot`] under one storage key.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl ProgressStore {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn save(&self, snapshot: &ProgressSnapshot) -> Result<(), StorageError> {
        let json = serde_json::to_string(snapshot).map_err(|source| {
            StorageError::Serialization {
                key: self.key.clone(),
                source,
            }
        })?;
        self.store.set(&self.key, &json)?;
        log::debug!("Progress saved: level {}, score {}.", snapshot.level, snapshot.score);
        Ok(())
    }

    /// The saved snapshot, or `None` when nothing was saved or the saved
    /// value cannot be decoded.
    pub fn load(&self) -> Result<Option<ProgressSnapshot>, StorageError> {
        let Some(json) = self.store.get(&self.key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&json) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                log::warn!("Ignoring unreadable progress under '{}': {}", self.key, e);
                Ok(None)
            }
        }
    }
}
