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

//! Background persistence of the event log.

use crate::event_log::SharedEventLog;
use anyhow::Context as _;
use sprout_core::PeriodicWorker;
use std::time::Duration;

/// Periodically flushes a [`SharedEventLog`] until stopped.
pub struct AutoSync {
    worker: PeriodicWorker,
}

impl AutoSync {
    /// Starts flushing `event_log` every `interval`.
    pub fn start(event_log: SharedEventLog, interval: Duration) -> anyhow::Result<Self> {
        let worker = PeriodicWorker::spawn("sprout-auto-sync", interval, move || {
            if let Err(e) = event_log.flush() {
                log::warn!("Auto-sync flush failed: {}", e);
            }
        })
        .context("failed to spawn auto-sync worker")?;

        log::info!("Auto-sync started with a {:?} interval.", interval);
        Ok(Self { worker })
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_running()
    }

    pub fn stop(&mut self) {
        self.worker.stop();
    }

    /// Hands the underlying worker to a caller that manages timers as a group.
    pub fn into_worker(self) -> PeriodicWorker {
        self.worker
    }
}
