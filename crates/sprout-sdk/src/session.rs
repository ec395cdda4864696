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

//! The learning session context object.

use crate::progress::{ProgressStore, ProgressSync};
use anyhow::{anyhow, bail, Context as _};
use crossbeam_channel::Receiver;
use sprout_control::feedback::feedback_message;
use sprout_control::{DifficultyController, DifficultyState, FeedbackHint, LevelChange};
use sprout_core::{
    Achievement, AnswerRecord, Clock, KeyValueStore, LearningConfig, Operation, PeriodicWorker,
    Signal, StorageError, SystemClock, TimerGroup,
};
use sprout_metrics::{AdjustmentDirection, MetricsEngine, MetricsProvider};
use sprout_telemetry::{AutoSync, EventLog, SharedEventLog};
use sprout_viz::VisualizationFormatter;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// The operands of one exercise question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub num1: i64,
    /// `None` for number recognition.
    pub num2: Option<i64>,
    pub operation: Operation,
}

impl Question {
    pub fn binary(num1: i64, operation: Operation, num2: i64) -> Self {
        Self {
            num1,
            num2: Some(num2),
            operation,
        }
    }

    pub fn recognition(number: i64) -> Self {
        Self {
            num1: number,
            num2: None,
            operation: Operation::Recognition,
        }
    }
}

/// What happened when an answer was submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub correct_answer: i64,
    pub time_taken: f64,
    /// Points earned; zero for a wrong answer.
    pub points: u32,
    pub level_change: Option<LevelChange>,
    pub unlocked: Vec<Achievement>,
    /// Message for a wrong answer.
    pub feedback: Option<String>,
    pub hint: Option<FeedbackHint>,
    /// Whether the exercise range was narrowed for remediation.
    pub remediated: bool,
}

/// One learner's session.
///
/// Every component shares the session's clock and configuration. Metrics are
/// computed from the persisted log, so answers become visible to them after
/// the next flush.
pub struct LearningSession {
    config: Arc<LearningConfig>,
    clock: Arc<dyn Clock>,
    event_log: SharedEventLog,
    metrics: Arc<MetricsEngine>,
    formatter: VisualizationFormatter,
    controller: Arc<Mutex<DifficultyController>>,
    signals: Receiver<Signal>,
    progress: ProgressStore,
    sync: Option<Arc<dyn ProgressSync>>,
    timers: TimerGroup,
    session_id: String,
    question_started_at: Option<i64>,
}

impl LearningSession {
    /// Opens a session on the system clock.
    pub fn new(config: LearningConfig, store: Arc<dyn KeyValueStore>) -> anyhow::Result<Self> {
        Self::with_clock(config, store, Arc::new(SystemClock))
    }

    /// Opens a session and restores any saved progress from `store`.
    pub fn with_clock(
        config: LearningConfig,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let log = EventLog::new(store.clone(), clock.clone(), config.event_log.clone())
            .context("failed to open the event log")?;
        let event_log = SharedEventLog::new(log);
        let session_id = event_log.session_id();

        let metrics = Arc::new(MetricsEngine::new(
            Arc::new(event_log.clone()),
            clock.clone(),
            config.clone(),
        ));
        let formatter = VisualizationFormatter::new(metrics.clone(), clock.clone(), config.clone());
        let (controller, signals) = DifficultyController::new(config.clone(), clock.clone());
        let progress = ProgressStore::new(store, config.progress_storage_key.clone());

        let session = Self {
            config,
            clock,
            event_log,
            metrics,
            formatter,
            controller: Arc::new(Mutex::new(controller)),
            signals,
            progress,
            sync: None,
            timers: TimerGroup::new(),
            session_id,
            question_started_at: None,
        };
        session
            .load_progress()
            .context("failed to load saved progress")?;

        log::info!("Learning session {} opened.", session.session_id);
        Ok(session)
    }

    /// Attaches a remote endpoint that receives progress on save.
    pub fn with_progress_sync(mut self, sync: Arc<dyn ProgressSync>) -> Self {
        self.sync = Some(sync);
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    pub fn event_log(&self) -> &SharedEventLog {
        &self.event_log
    }

    pub fn metrics(&self) -> &MetricsEngine {
        &self.metrics
    }

    pub fn formatter(&self) -> &VisualizationFormatter {
        &self.formatter
    }

    pub fn controller(&self) -> MutexGuard<'_, DifficultyController> {
        lock_controller(&self.controller)
    }

    /// The receiving end of the controller's signal channel.
    pub fn signals(&self) -> &Receiver<Signal> {
        &self.signals
    }

    /// Takes every signal emitted so far.
    pub fn drain_signals(&self) -> Vec<Signal> {
        self.signals.try_iter().collect()
    }

    /// Switches to `exercise_type` and starts timing its first question.
    pub fn start_exercise(&mut self, exercise_type: &str) -> DifficultyState {
        let (state, tier) = {
            let mut controller = self.controller();
            let tier = self
                .config
                .exercise_tier(exercise_type)
                .unwrap_or_else(|| controller.tier());
            (controller.select_exercise(exercise_type).clone(), tier)
        };
        self.event_log.lock().log_exercise_start(exercise_type, tier);
        self.question_started_at = Some(self.clock.now_ms());
        state
    }

    /// Grades an answer to the current exercise, logs it and updates the
    /// learner's state.
    ///
    /// The time taken runs from the previous answer, or from the exercise
    /// start for the first question.
    pub fn submit_answer(
        &mut self,
        question: Question,
        user_answer: i64,
    ) -> anyhow::Result<AnswerOutcome> {
        let exercise_type = self
            .controller()
            .current_exercise()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("no exercise started"))?;
        let Some(correct_answer) = question.operation.apply(question.num1, question.num2) else {
            bail!(
                "question {} {} {:?} has no answer",
                question.num1,
                question.operation,
                question.num2
            );
        };

        let now = self.clock.now_ms();
        let time_taken = self
            .question_started_at
            .map_or(0.0, |start| (now - start).max(0) as f64 / 1000.0);
        self.question_started_at = Some(now);

        let answer = AnswerRecord::new(
            exercise_type.clone(),
            question.num1,
            question.num2,
            question.operation,
            user_answer,
            correct_answer,
            time_taken,
        );
        let is_correct = answer.is_correct;
        self.event_log.lock().log_answer(answer);

        let mut outcome = AnswerOutcome {
            is_correct,
            correct_answer,
            time_taken,
            points: 0,
            level_change: None,
            unlocked: Vec::new(),
            feedback: None,
            hint: None,
            remediated: false,
        };
        if is_correct {
            self.on_correct(time_taken, &mut outcome);
        } else {
            self.on_incorrect(&exercise_type, &mut outcome);
        }
        Ok(outcome)
    }

    fn on_correct(&self, time_taken: f64, outcome: &mut AnswerOutcome) {
        outcome.points = self.controller().record_correct(time_taken);

        match (
            self.metrics.session_engagement(&self.session_id),
            self.metrics.performance(&self.session_id, None),
        ) {
            (Ok(engagement), Ok(performance)) => {
                outcome.unlocked = self
                    .controller()
                    .check_achievements(&engagement, &performance);
            }
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("Achievement check skipped: {}", e);
            }
        }
        for achievement in &outcome.unlocked {
            self.event_log
                .lock()
                .log_achievement(achievement.id(), Some(time_taken));
        }

        let change = self
            .controller()
            .check_for_level_up(self.metrics.as_ref(), &self.session_id);
        if let Some(change) = &change {
            record_level_change(&self.event_log, change);
        }
        outcome.level_change = change;
    }

    fn on_incorrect(&self, exercise_type: &str, outcome: &mut AnswerOutcome) {
        self.controller().record_incorrect();

        match self
            .metrics
            .error_analysis(&self.session_id, Some(exercise_type))
        {
            Ok(analysis) => {
                let mut controller = self.controller();
                outcome.hint = controller.feedback_hint(&analysis);
                if !analysis.problem_areas.is_empty() {
                    outcome.remediated = controller.apply_remediation(&analysis);
                }
            }
            Err(e) => log::warn!("Error analysis unavailable: {}", e),
        }
        if let Some(hint) = outcome.hint {
            self.event_log.lock().log_hint(exercise_type, hint.id());
        }
        outcome.feedback = Some(feedback_message(outcome.correct_answer, outcome.hint));
    }

    /// Runs the adaptive difficulty update once and applies an expired
    /// remediation restore.
    pub fn update_adaptive_difficulty(&self) -> Option<LevelChange> {
        adaptive_step(
            &self.controller,
            self.metrics.as_ref(),
            &self.event_log,
            &self.session_id,
        )
    }

    /// Starts log auto-sync and the periodic progress worker, both on the
    /// configured save interval. Does nothing if they are already running.
    pub fn start_timers(&mut self) -> anyhow::Result<()> {
        if !self.timers.is_empty() {
            return Ok(());
        }
        let interval = Duration::from_millis(self.config.progress.save_interval_ms);

        let auto_sync = AutoSync::start(self.event_log.clone(), interval)?;
        self.timers.push(auto_sync.into_worker());

        let controller = self.controller.clone();
        let metrics = self.metrics.clone();
        let event_log = self.event_log.clone();
        let progress = self.progress.clone();
        let session_id = self.session_id.clone();
        let worker = PeriodicWorker::spawn("sprout-progress", interval, move || {
            let snapshot = lock_controller(&controller).snapshot();
            if let Err(e) = progress.save(&snapshot) {
                log::warn!("Periodic progress save failed: {}", e);
            }
            adaptive_step(&controller, metrics.as_ref(), &event_log, &session_id);
        })
        .context("failed to spawn progress worker")?;
        self.timers.push(worker);

        log::debug!("{} session timers running.", self.timers.len());
        Ok(())
    }

    pub fn timers_running(&self) -> bool {
        !self.timers.is_empty()
    }

    pub fn stop_timers(&mut self) {
        self.timers.stop_all();
    }

    /// Writes buffered events to storage.
    pub fn flush(&self) -> Result<(), StorageError> {
        self.event_log.flush()
    }

    pub fn save_progress(&self) -> Result<(), StorageError> {
        self.progress.save(&self.controller().snapshot())
    }

    /// Restores saved progress into the controller. Returns whether anything
    /// was restored.
    pub fn load_progress(&self) -> Result<bool, StorageError> {
        match self.progress.load()? {
            Some(snapshot) => {
                self.controller().restore(&snapshot);
                log::debug!("Progress restored at level {}.", snapshot.level);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Pushes progress to the attached endpoint. Failures are logged and
    /// reported as `false`.
    pub fn sync_progress(&self) -> bool {
        let Some(sync) = &self.sync else {
            return false;
        };
        match sync.push(&self.controller().snapshot()) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Progress sync failed: {}", e);
                false
            }
        }
    }

    /// Stops timers, flushes the log and saves progress.
    ///
    /// Both writes are attempted; the first failure is returned.
    pub fn end(&mut self) -> Result<(), StorageError> {
        self.stop_timers();
        let flushed = self.flush();
        let saved = self.save_progress();
        self.sync_progress();
        log::info!("Learning session {} ended.", self.session_id);
        flushed.and(saved)
    }
}

fn lock_controller(
    controller: &Mutex<DifficultyController>,
) -> MutexGuard<'_, DifficultyController> {
    controller.lock().unwrap_or_else(PoisonError::into_inner)
}

fn record_level_change(event_log: &SharedEventLog, change: &LevelChange) {
    let mut log = event_log.lock();
    match change.direction {
        AdjustmentDirection::Increase => {
            log.log_level_up(change.old_level, change.new_level, change.total_score)
        }
        AdjustmentDirection::Decrease => {
            log.log_level_down(change.old_level, change.new_level, &change.reason)
        }
    }
}

fn adaptive_step(
    controller: &Mutex<DifficultyController>,
    metrics: &dyn MetricsProvider,
    event_log: &SharedEventLog,
    session_id: &str,
) -> Option<LevelChange> {
    let mut controller = lock_controller(controller);
    let change = controller.update_adaptive_difficulty(metrics, session_id);
    if controller.tick() {
        log::info!("Remediation period over, ranges restored.");
    }
    drop(controller);

    if let Some(change) = &change {
        record_level_change(event_log, change);
    }
    change
}
