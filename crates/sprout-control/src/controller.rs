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

//! The adaptive difficulty controller.

use crate::achievements;
use crate::analysis::{AdaptiveAnalyzer, AnalysisReport};
use crate::difficulty::DifficultyState;
use crate::feedback::FeedbackHint;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use sprout_core::{Achievement, Clock, DifficultyTier, LearningConfig, Signal};
use sprout_metrics::{
    AdaptabilityMetrics, AdjustmentDirection, EngagementMetrics, ErrorAnalysis, MetricsProvider,
    PerformanceMetrics,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Maximum number of undelivered signals. Further signals are dropped.
const SIGNAL_BUFFER_SIZE: usize = 64;
/// Range growth of the current exercise on level-up.
const LEVEL_UP_RANGE_STEP: i64 = 10;
/// Range growth of every exercise when accuracy improves.
const RANGE_EXPANSION_STEP: i64 = 5;
/// Time limit multiplier for exercises answered faster.
const TIME_LIMIT_FACTOR: f64 = 0.9;
/// Range ceiling while a double-digit problem area is being remediated.
const REMEDIATION_RANGE_MAX: i64 = 9;
const LEVEL_DOWN_REASON: &str = "Performance below threshold";

/// A level transition, as recorded in the event log.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelChange {
    pub old_level: u32,
    pub new_level: u32,
    /// Score before any level completion bonus.
    pub total_score: u32,
    pub direction: AdjustmentDirection,
    pub reason: String,
}

/// Persisted learner progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub score: u32,
    pub level: u32,
    pub streak: u32,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
}

/// Owns the learner's level, score and per-exercise difficulty.
///
/// All state is mutated through methods; changes the UI should react to are
/// sent as [`Signal`]s on the channel returned by [`DifficultyController::new`].
pub struct DifficultyController {
    config: Arc<LearningConfig>,
    clock: Arc<dyn Clock>,
    analyzer: AdaptiveAnalyzer,
    signal_tx: Sender<Signal>,
    level: u32,
    score: u32,
    streak: u32,
    current_exercise: Option<String>,
    exercises: BTreeMap<String, DifficultyState>,
    achievements: BTreeSet<Achievement>,
    remediation_deadline: Option<i64>,
}

impl DifficultyController {
    /// Creates a controller at level 1 with every configured exercise at its
    /// default parameters.
    pub fn new(config: Arc<LearningConfig>, clock: Arc<dyn Clock>) -> (Self, Receiver<Signal>) {
        let (tx, rx) = crossbeam_channel::bounded(SIGNAL_BUFFER_SIZE);
        let exercises = config
            .exercise_tiers
            .keys()
            .map(|name| {
                let state = DifficultyState::for_exercise(name, &config, DifficultyTier::Beginner);
                (name.clone(), state)
            })
            .collect();

        let controller = Self {
            config,
            clock,
            analyzer: AdaptiveAnalyzer,
            signal_tx: tx,
            level: 1,
            score: 0,
            streak: 0,
            current_exercise: None,
            exercises,
            achievements: BTreeSet::new(),
            remediation_deadline: None,
        };
        (controller, rx)
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// The tier of the current level.
    pub fn tier(&self) -> DifficultyTier {
        DifficultyTier::for_level(self.level)
    }

    pub fn current_exercise(&self) -> Option<&str> {
        self.current_exercise.as_deref()
    }

    pub fn exercise(&self, exercise_type: &str) -> Option<&DifficultyState> {
        self.exercises.get(exercise_type)
    }

    pub fn achievements(&self) -> impl Iterator<Item = Achievement> + '_ {
        self.achievements.iter().copied()
    }

    /// When the active remediation expires, if any.
    pub fn remediation_deadline(&self) -> Option<i64> {
        self.remediation_deadline
    }

    /// Makes `exercise_type` current and returns its parameters.
    pub fn select_exercise(&mut self, exercise_type: &str) -> &DifficultyState {
        let fallback = self.tier();
        let config = &self.config;
        self.current_exercise = Some(exercise_type.to_string());
        self.exercises
            .entry(exercise_type.to_string())
            .or_insert_with(|| DifficultyState::for_exercise(exercise_type, config, fallback))
    }

    /// Books a correct answer and returns the points earned.
    pub fn record_correct(&mut self, time_taken: f64) -> u32 {
        self.streak += 1;
        self.score += 1;

        let rewards = &self.config.rewards;
        let mut points = rewards.correct_answer;
        if self.streak > 1 {
            points += rewards.streak_bonus;
        }
        if time_taken < self.config.tier(self.tier()).time_limit / 2.0 {
            points += rewards.quick_answer_bonus;
        }
        points
    }

    pub fn record_incorrect(&mut self) {
        self.streak = 0;
    }

    /// Levels up when the score sits on a multiple of the tier's required
    /// score and the learner is improving.
    ///
    /// If metrics are unavailable the score condition alone decides.
    pub fn check_for_level_up(
        &mut self,
        metrics: &dyn MetricsProvider,
        user_id: &str,
    ) -> Option<LevelChange> {
        let required = self.config.tier(self.tier()).required_score;
        let at_threshold = required > 0 && self.score > 0 && self.score % required == 0;

        let improving = match (
            metrics.progression(user_id, None),
            metrics.adaptability(user_id, None),
        ) {
            (Ok(progression), Ok(adaptability)) => self
                .analyzer
                .metrics_support_level_up(&progression, &adaptability),
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("Level-up metrics unavailable, using score only: {}", e);
                true
            }
        };

        if at_threshold && improving {
            self.level_up()
        } else {
            None
        }
    }

    /// Moves up one level. No-op at the maximum level.
    pub fn level_up(&mut self) -> Option<LevelChange> {
        if self.level >= self.config.progress.max_level {
            return None;
        }

        let change = LevelChange {
            old_level: self.level,
            new_level: self.level + 1,
            total_score: self.score,
            direction: AdjustmentDirection::Increase,
            reason: format!("Reached level {}", self.level + 1),
        };
        self.level += 1;

        if let Some(state) = self.current_state_mut() {
            state.range.max += LEVEL_UP_RANGE_STEP;
        }
        self.score += self.config.rewards.level_completion;

        log::info!("Level up: {} -> {}", change.old_level, change.new_level);
        self.emit(Signal::LevelUp {
            old_level: change.old_level,
            new_level: change.new_level,
            reason: change.reason.clone(),
        });
        Some(change)
    }

    /// Moves down one level. No-op at level 1. Ranges are left unchanged.
    pub fn level_down(&mut self) -> Option<LevelChange> {
        if self.level <= 1 {
            return None;
        }

        let change = LevelChange {
            old_level: self.level,
            new_level: self.level - 1,
            total_score: self.score,
            direction: AdjustmentDirection::Decrease,
            reason: LEVEL_DOWN_REASON.to_string(),
        };
        self.level -= 1;

        log::info!("Level down: {} -> {}", change.old_level, change.new_level);
        self.emit(Signal::LevelDown {
            old_level: change.old_level,
            new_level: change.new_level,
            reason: change.reason.clone(),
        });
        Some(change)
    }

    /// Applies the current adaptability recommendation, then tunes exercise
    /// parameters. Metrics failures leave the state untouched.
    pub fn update_adaptive_difficulty(
        &mut self,
        metrics: &dyn MetricsProvider,
        user_id: &str,
    ) -> Option<LevelChange> {
        let adaptability = match metrics.adaptability(user_id, None) {
            Ok(adaptability) => adaptability,
            Err(e) => {
                log::warn!("Adaptive difficulty update skipped: {}", e);
                return None;
            }
        };

        let report = self.analyzer.analyze(&adaptability);
        let change = match report.recommendation {
            Some(AdjustmentDirection::Increase) => self.level_up(),
            Some(AdjustmentDirection::Decrease) => {
                let reason = report
                    .reason
                    .clone()
                    .unwrap_or_else(|| LEVEL_DOWN_REASON.to_string());
                self.emit(Signal::PerformanceWarning { reason });
                self.level_down()
            }
            None => None,
        };

        self.apply_report(&report);
        change
    }

    /// Shrinks time limits of faster exercises and widens ranges when
    /// accuracy improves.
    pub fn adjust_parameters(&mut self, metrics: &AdaptabilityMetrics) {
        let report = self.analyzer.analyze(metrics);
        self.apply_report(&report);
    }

    fn apply_report(&mut self, report: &AnalysisReport) {
        let tier = self.config.tier(self.tier()).clone();

        for exercise_type in &report.faster_exercises {
            if let Some(state) = self.exercises.get_mut(exercise_type) {
                state.time_limit = (state.time_limit * TIME_LIMIT_FACTOR).max(tier.time_limit / 2.0);
            }
        }

        if report.expand_ranges {
            for state in self.exercises.values_mut() {
                state.range.max = (state.range.max + RANGE_EXPANSION_STEP).min(tier.range.max);
            }
        }
    }

    /// Narrows the current exercise to single digits when the top problem
    /// area is double-digit, and (re)starts the restore deadline.
    ///
    /// Returns `true` if the range was narrowed.
    pub fn apply_remediation(&mut self, analysis: &ErrorAnalysis) -> bool {
        let Some(top) = analysis.problem_areas.first() else {
            return false;
        };

        let mut narrowed = false;
        if top.area.is_double_digit() {
            if let Some(state) = self.current_state_mut() {
                state.range.max = REMEDIATION_RANGE_MAX;
                narrowed = true;
            }
        }

        let deadline = self.clock.now_ms() + self.config.remediation_delay_ms;
        self.remediation_deadline = Some(deadline);
        log::debug!("Remediation for '{}' until {}.", top.area, deadline);
        narrowed
    }

    /// Restores default ranges once the remediation deadline has passed.
    ///
    /// Returns `true` if a restore happened.
    pub fn tick(&mut self) -> bool {
        match self.remediation_deadline {
            Some(deadline) if self.clock.now_ms() >= deadline => {
                self.restore_normal_difficulty();
                self.remediation_deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Resets every exercise's range to the current tier's default.
    pub fn restore_normal_difficulty(&mut self) {
        let range = self.config.tier(self.tier()).range;
        for state in self.exercises.values_mut() {
            state.range = range;
        }
        log::debug!("Exercise ranges restored to {:?}.", range);
    }

    /// Unlocks achievements whose conditions hold. Returns the new ones.
    pub fn check_achievements(
        &mut self,
        engagement: &EngagementMetrics,
        performance: &PerformanceMetrics,
    ) -> Vec<Achievement> {
        let earned = achievements::earned(
            &self.config.achievements,
            engagement,
            performance,
            self.level,
            self.config.progress.max_level,
        );

        let mut unlocked = Vec::new();
        for achievement in earned {
            if self.achievements.insert(achievement) {
                log::info!("Achievement unlocked: {}", achievement);
                self.emit(Signal::AchievementUnlocked {
                    achievement,
                    reason: achievements::describe(achievement).to_string(),
                });
                unlocked.push(achievement);
            }
        }
        unlocked
    }

    /// The hint matching the learner's mistakes, if any.
    pub fn feedback_hint(&self, analysis: &ErrorAnalysis) -> Option<FeedbackHint> {
        FeedbackHint::from_patterns(&analysis.error_patterns)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            score: self.score,
            level: self.level,
            streak: self.streak,
            achievements: self.achievements.iter().copied().collect(),
        }
    }

    /// Restores saved progress. Out-of-range levels are clamped.
    pub fn restore(&mut self, snapshot: &ProgressSnapshot) {
        self.score = snapshot.score;
        self.level = snapshot.level.clamp(1, self.config.progress.max_level.max(1));
        self.streak = snapshot.streak;
        self.achievements = snapshot.achievements.iter().copied().collect();
    }

    fn current_state_mut(&mut self) -> Option<&mut DifficultyState> {
        let name = self.current_exercise.as_deref()?;
        self.exercises.get_mut(name)
    }

    fn emit(&self, signal: Signal) {
        match self.signal_tx.try_send(signal) {
            Ok(()) => {}
            Err(TrySendError::Full(signal)) => {
                log::warn!("Signal buffer full, dropping: {}", signal.reason());
            }
            Err(TrySendError::Disconnected(_)) => {
                log::debug!("No signal receiver attached.");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprout_core::ManualClock;
    use sprout_metrics::{ProblemArea, ProblemAreaCount, SpeedImprovement};

    fn controller() -> (DifficultyController, Receiver<Signal>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let (controller, rx) =
            DifficultyController::new(Arc::new(LearningConfig::default()), clock.clone());
        (controller, rx, clock)
    }

    #[test]
    fn test_rewards() {
        let (mut c, _rx, _) = controller();
        assert_eq!(c.record_correct(20.0), 10);
        assert_eq!(c.record_correct(20.0), 15);
        assert_eq!(c.record_correct(5.0), 30);
        c.record_incorrect();
        assert_eq!(c.streak(), 0);
        assert_eq!(c.score(), 3);
    }

    #[test]
    fn test_level_up_raises_range_and_score() {
        let (mut c, rx, _) = controller();
        c.select_exercise("addition_level1");
        let change = c.level_up().unwrap();
        assert_eq!((change.old_level, change.new_level), (1, 2));
        assert_eq!(c.exercise("addition_level1").unwrap().range.max, 20);
        assert_eq!(c.score(), 50);
        assert!(matches!(rx.try_recv(), Ok(Signal::LevelUp { new_level: 2, .. })));
    }

    #[test]
    fn test_level_bounds() {
        let (mut c, _rx, _) = controller();
        assert!(c.level_down().is_none());
        for _ in 0..20 {
            c.level_up();
        }
        assert_eq!(c.level(), 10);
        assert!(c.level_up().is_none());
    }

    #[test]
    fn test_parameter_tuning_floors_and_caps() {
        let (mut c, _rx, _) = controller();
        let metrics = AdaptabilityMetrics {
            speed_improvement: vec![SpeedImprovement {
                exercise_type: "addition_level1".into(),
                improvement: 0.5,
            }],
            accuracy_improvement: 0.5,
            difficulty_adjustment_recommendations: None,
        };
        for _ in 0..10 {
            c.adjust_parameters(&metrics);
        }
        let state = c.exercise("addition_level1").unwrap();
        assert_eq!(state.time_limit, 15.0);
        assert_eq!(state.range.max, 10);
        // Every exercise is capped at the range of the current tier.
        assert_eq!(c.exercise("addition_level2").unwrap().range.max, 10);
    }

    #[test]
    fn test_remediation_restores_after_deadline() {
        let (mut c, _rx, clock) = controller();
        c.select_exercise("addition_level2");
        let analysis = ErrorAnalysis {
            common_errors: Vec::new(),
            error_patterns: Default::default(),
            problem_areas: vec![ProblemAreaCount {
                area: ProblemArea::DoubleDigitAddition,
                count: 3,
            }],
        };
        assert!(c.apply_remediation(&analysis));
        assert_eq!(c.exercise("addition_level2").unwrap().range.max, 9);

        clock.advance(200_000);
        assert!(!c.tick());
        // Re-trigger restarts the deadline.
        c.apply_remediation(&analysis);
        clock.advance(200_000);
        assert!(!c.tick());
        clock.advance(100_000);
        assert!(c.tick());
        assert_eq!(c.exercise("addition_level2").unwrap().range.max, 10);
        assert_eq!(c.remediation_deadline(), None);
    }

    #[test]
    fn test_single_digit_area_does_not_narrow() {
        let (mut c, _rx, _) = controller();
        c.select_exercise("addition_level1");
        let analysis = ErrorAnalysis {
            common_errors: Vec::new(),
            error_patterns: Default::default(),
            problem_areas: vec![ProblemAreaCount {
                area: ProblemArea::SingleDigitAddition,
                count: 1,
            }],
        };
        assert!(!c.apply_remediation(&analysis));
        assert!(c.remediation_deadline().is_some());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let (mut c, _rx, _) = controller();
        c.restore(&ProgressSnapshot {
            score: 42,
            level: 99,
            streak: 3,
            achievements: vec![Achievement::QuickLearner],
        });
        let snapshot = c.snapshot();
        assert_eq!(snapshot.level, 10);
        assert_eq!(snapshot.score, 42);
        assert_eq!(snapshot.achievements, vec![Achievement::QuickLearner]);
    }
}
