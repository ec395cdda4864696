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

use sprout_core::{KeyValueStore, StorageError};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory key-value store using `RwLock<HashMap>`.
///
/// An optional byte quota emulates a browser storage limit: a write whose key
/// and value would push the total past the quota fails with
/// [`StorageError::QuotaExceeded`] and leaves the store unchanged.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    storage: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl InMemoryStore {
    /// Create an unbounded store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that refuses writes beyond `quota_bytes`
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            storage: RwLock::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Total bytes of keys and values currently held
    pub fn used_bytes(&self) -> usize {
        self.storage
            .read()
            .map(|storage| storage.iter().map(|(k, v)| k.len() + v.len()).sum())
            .unwrap_or(0)
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.storage.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let storage = self.storage.read().map_err(|_| StorageError::Lock)?;
        Ok(storage.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut storage = self.storage.write().map_err(|_| StorageError::Lock)?;

        if let Some(quota) = self.quota_bytes {
            let used: usize = storage
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = key.len() + value.len();
            let available = quota.saturating_sub(used);
            if needed > available {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    available,
                });
            }
        }

        storage.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut storage = self.storage.write().map_err(|_| StorageError::Lock)?;
        storage.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_remove() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        store.remove("k").unwrap();
    }

    #[test]
    fn test_quota_rejects_oversized_write() {
        let store = InMemoryStore::with_quota(10);
        store.set("a", "1234").unwrap();
        let err = store.set("b", "123456789").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
        assert_eq!(store.get("b").unwrap(), None);
        assert_eq!(store.used_bytes(), 5);
    }

    #[test]
    fn test_quota_counts_replaced_value_once() {
        let store = InMemoryStore::with_quota(10);
        store.set("a", "12345678").unwrap();
        store.set("a", "87654321").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("87654321"));
    }
}
