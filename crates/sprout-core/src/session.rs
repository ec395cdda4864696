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

//! Session identifiers.

use uuid::Uuid;

const SUFFIX_LEN: usize = 9;
const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Creates an id of the form `session_<epoch ms>_<9 base-36 chars>`.
pub fn new_session_id(now_ms: i64) -> String {
    let mut bits = Uuid::new_v4().as_u128();
    let mut suffix = String::with_capacity(SUFFIX_LEN);
    for _ in 0..SUFFIX_LEN {
        suffix.push(DIGITS[(bits % 36) as usize] as char);
        bits /= 36;
    }
    format!("session_{}_{}", now_ms, suffix)
}

/// Whether `id` has the session id shape.
pub fn is_session_id(id: &str) -> bool {
    let Some(rest) = id.strip_prefix("session_") else {
        return false;
    };
    let Some((millis, suffix)) = rest.split_once('_') else {
        return false;
    };
    !millis.is_empty()
        && millis.bytes().all(|b| b.is_ascii_digit())
        && suffix.len() == SUFFIX_LEN
        && suffix.bytes().all(|b| DIGITS.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_shape() {
        let id = new_session_id(1_700_000_000_000);
        assert!(id.starts_with("session_1700000000000_"));
        assert!(is_session_id(&id));
    }

    #[test]
    fn test_session_ids_differ() {
        assert_ne!(new_session_id(1), new_session_id(1));
    }

    #[test]
    fn test_rejects_malformed_ids() {
        assert!(!is_session_id("session_12_short"));
        assert!(!is_session_id("sess_12_abcdefghi"));
        assert!(!is_session_id("session_x_abcdefghi"));
    }
}
