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

use anyhow::Result;
use sprout_core::config::EventLogConfig;
use sprout_core::{
    AnswerRecord, EventKind, EventSource, KeyValueStore, ManualClock, Operation, StorageError,
};
use sprout_telemetry::{AutoSync, EventLog, FileStore, InMemoryStore, SharedEventLog};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::tempdir;

fn answer(num1: i64, user: i64) -> AnswerRecord {
    AnswerRecord::new("addition_level1", num1, Some(1), Operation::Add, user, num1 + 1, 2.0)
}

fn log_over(store: Arc<dyn KeyValueStore>, clock: Arc<ManualClock>) -> Result<EventLog> {
    Ok(EventLog::new(store, clock, EventLogConfig::default())?)
}

#[test]
fn test_buffer_flushes_at_threshold() -> Result<()> {
    let store = Arc::new(InMemoryStore::new());
    let mut log = log_over(store, Arc::new(ManualClock::new(0)))?;

    for i in 0..99 {
        log.log_answer(answer(i, i + 1));
    }
    assert_eq!(log.pending().len(), 99);
    assert!(log.all_logs()?.is_empty());

    log.log_answer(answer(99, 100));
    assert!(log.pending().is_empty());
    assert_eq!(log.all_logs()?.len(), 100);
    Ok(())
}

#[test]
fn test_persisted_log_is_capped_to_most_recent() -> Result<()> {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(ManualClock::new(0));
    let mut log = log_over(store.clone(), clock.clone())?;

    for i in 0..1_050 {
        clock.set(i);
        log.log_answer(answer(i, i + 1));
    }
    log.flush()?;

    // Reload through a fresh instance over the same store.
    let reloaded = log_over(store, clock)?;
    let events = reloaded.all_logs()?;
    assert_eq!(events.len(), 1_000);
    assert_eq!(events[0].timestamp, 50);
    assert_eq!(events[999].timestamp, 1_049);
    Ok(())
}

#[test]
fn test_session_query_returns_only_that_session() -> Result<()> {
    let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());
    let clock = Arc::new(ManualClock::new(10));

    let mut first = log_over(store.clone(), clock.clone())?;
    first.log_answer(answer(1, 2));
    first.flush()?;

    let mut second = log_over(store.clone(), clock.clone())?;
    clock.advance(5);
    second.log_answer(answer(2, 3));
    second.log_answer(answer(3, 9));
    second.flush()?;

    let events = second.logs_by_session(second.session_id())?;
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.session_id == second.session_id()));
    assert!(events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    assert_eq!(first.logs_by_session(first.session_id())?.len(), 1);
    Ok(())
}

#[test]
fn test_logs_by_type_returns_most_recent() -> Result<()> {
    let clock = Arc::new(ManualClock::new(0));
    let mut log = log_over(Arc::new(InMemoryStore::new()), clock.clone())?;
    for i in 0..5 {
        clock.set(i * 100);
        log.log_answer(answer(i, i + 1));
        log.log_hint("addition_level1", "count_on");
    }
    log.flush()?;

    let answers = log.logs_by_type(EventKind::Answer, 2)?;
    assert_eq!(answers.len(), 2);
    assert_eq!(answers[0].timestamp, 300);
    assert_eq!(answers[1].timestamp, 400);
    Ok(())
}

#[test]
fn test_corrupt_storage_reads_as_empty() -> Result<()> {
    let store = Arc::new(InMemoryStore::new());
    store.set("math_logs", "{this is not an array")?;
    let mut log = log_over(store.clone(), Arc::new(ManualClock::new(0)))?;
    assert!(log.all_logs()?.is_empty());

    log.log_answer(answer(1, 2));
    log.flush()?;
    assert_eq!(log.all_logs()?.len(), 1);
    Ok(())
}

#[test]
fn test_undecodable_entries_are_skipped() -> Result<()> {
    let store = Arc::new(InMemoryStore::new());
    store.set(
        "math_logs",
        r#"[{"timestamp":1,"eventType":"mystery","sessionId":"s","data":{}},
            {"timestamp":2,"eventType":"hint","sessionId":"s","data":{"exerciseType":"addition_level1","hintType":"x"}}]"#,
    )?;
    let log = log_over(store, Arc::new(ManualClock::new(0)))?;
    let events = log.all_logs()?;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), EventKind::Hint);
    Ok(())
}

#[test]
fn test_failed_flush_keeps_buffer() -> Result<()> {
    let store = Arc::new(InMemoryStore::with_quota(64));
    let mut log = log_over(store.clone(), Arc::new(ManualClock::new(0)))?;
    log.log_answer(answer(1, 2));

    let err = log.flush().unwrap_err();
    assert!(matches!(err, StorageError::QuotaExceeded { .. }));
    assert_eq!(log.pending().len(), 1);
    assert_eq!(store.get("math_logs")?.as_deref(), Some("[]"));
    Ok(())
}

#[test]
fn test_automatic_flush_failure_is_swallowed() -> Result<()> {
    let store = Arc::new(InMemoryStore::with_quota(64));
    let mut log = EventLog::new(
        store,
        Arc::new(ManualClock::new(0)),
        EventLogConfig {
            sync_threshold: 2,
            ..EventLogConfig::default()
        },
    )?;
    log.log_answer(answer(1, 2));
    log.log_answer(answer(2, 3));
    assert_eq!(log.pending().len(), 2);
    Ok(())
}

#[test]
fn test_file_store_survives_reopen() -> Result<()> {
    let dir = tempdir()?;
    let clock = Arc::new(ManualClock::new(7));
    {
        let store = Arc::new(FileStore::open(dir.path())?);
        let mut log = log_over(store, clock.clone())?;
        log.log_level_up(1, 2, 60);
        log.flush()?;
    }

    let store = Arc::new(FileStore::open(dir.path())?);
    let log = log_over(store, clock)?;
    let events = log.all_logs()?;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), EventKind::LevelUp);
    Ok(())
}

#[test]
fn test_auto_sync_flushes_in_background() -> Result<()> {
    let log = SharedEventLog::new(log_over(
        Arc::new(InMemoryStore::new()),
        Arc::new(ManualClock::new(0)),
    )?);
    log.lock().log_achievement("quick_learner", Some(12.0));

    let mut sync = AutoSync::start(log.clone(), Duration::from_millis(5))?;
    let deadline = Instant::now() + Duration::from_secs(5);
    while !log.lock().pending().is_empty() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    sync.stop();

    assert!(!sync.is_running());
    assert_eq!(log.all_logs()?.len(), 1);
    Ok(())
}
