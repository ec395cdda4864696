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

//! Cancellable periodic background work.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::io;
use std::thread;
use std::time::Duration;

/// Runs a closure on a dedicated thread every `interval` until stopped.
///
/// Stopping is prompt: the worker waits on a shutdown channel rather than
/// sleeping, so `stop` returns without waiting out the interval.
pub struct PeriodicWorker {
    name: String,
    shutdown_tx: Option<Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl PeriodicWorker {
    /// Fails with `InvalidInput` on a zero interval, which would spin the thread.
    pub fn spawn<F>(name: impl Into<String>, interval: Duration, mut task: F) -> io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let name = name.into();
        if interval.is_zero() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("worker '{}' needs a non-zero interval", name),
            ));
        }
        let (shutdown_tx, shutdown_rx): (Sender<()>, Receiver<()>) = crossbeam_channel::bounded(1);
        let thread_name = name.clone();

        let handle = thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                log::debug!("Worker '{}' started.", thread_name);
                loop {
                    match shutdown_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => task(),
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                log::debug!("Worker '{}' stopped.", thread_name);
            })?;

        Ok(Self {
            name,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Signals the worker and waits for its thread to exit.
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.try_send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Worker '{}' panicked.", self.name);
            }
        }
    }
}

impl Drop for PeriodicWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A set of workers stopped together.
#[derive(Default)]
pub struct TimerGroup {
    workers: Vec<PeriodicWorker>,
}

impl TimerGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, worker: PeriodicWorker) {
        self.workers.push(worker);
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn stop_all(&mut self) {
        for mut worker in self.workers.drain(..) {
            worker.stop();
        }
    }
}

impl Drop for TimerGroup {
    fn drop(&mut self) {
        self.stop_all();
    }
}
