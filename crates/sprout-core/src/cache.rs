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

//! A time-bounded memoization cache.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    computed_at: i64,
}

/// Caches values for `timeout_ms` after they are computed.
///
/// Expired entries are only replaced on the next insert for the same key;
/// there is no background eviction.
#[derive(Debug, Clone)]
pub struct TtlCache<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    timeout_ms: i64,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(timeout_ms: i64) -> Self {
        Self {
            entries: HashMap::new(),
            timeout_ms,
        }
    }

    /// Returns the cached value if it is younger than the timeout at `now_ms`.
    pub fn get(&self, key: &K, now_ms: i64) -> Option<V> {
        self.entries
            .get(key)
            .filter(|entry| now_ms - entry.computed_at < self.timeout_ms)
            .map(|entry| entry.value.clone())
    }

    pub fn insert(&mut self, key: K, value: V, now_ms: i64) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                computed_at: now_ms,
            },
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn timeout_ms(&self) -> i64 {
        self.timeout_ms
    }
}
