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

//! Learning events recorded by the event log.
//!
//! An [`Event`] is an immutable record of something the learner did or that
//! happened to the learner. Its JSON form is
//! `{"timestamp":…,"eventType":"answer","sessionId":"…","data":{…}}`; in Rust the
//! `(eventType, data)` pair is the tagged [`EventPayload`].

use serde::de::Error as _;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// The type tag of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    /// The learner submitted an answer.
    Answer,
    /// An exercise screen was opened.
    ExerciseStart,
    /// The learner moved up a level.
    LevelUp,
    /// The learner moved down a level.
    LevelDown,
    /// An achievement was unlocked.
    Achievement,
    /// A hint was shown.
    Hint,
    /// A client-side error occurred.
    Error,
    /// A generic UI interaction.
    Interaction,
}

impl EventKind {
    /// The wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Answer => "answer",
            EventKind::ExerciseStart => "exerciseStart",
            EventKind::LevelUp => "levelUp",
            EventKind::LevelDown => "levelDown",
            EventKind::Achievement => "achievement",
            EventKind::Hint => "hint",
            EventKind::Error => "error",
            EventKind::Interaction => "interaction",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An arithmetic operation posed by an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Operation {
    /// Addition.
    #[serde(rename = "+")]
    Add,
    /// Subtraction.
    #[serde(rename = "-")]
    Subtract,
    /// Multiplication.
    #[serde(rename = "*")]
    Multiply,
    /// Integer division.
    #[serde(rename = "/")]
    Divide,
    /// Number recognition: the answer is the single operand itself.
    #[serde(rename = "recognition")]
    Recognition,
}

impl Operation {
    /// The symbol used on the wire and in error keys.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "*",
            Operation::Divide => "/",
            Operation::Recognition => "recognition",
        }
    }

    /// Computes the correct answer. Returns `None` for a division by zero,
    /// an overflow or a missing second operand.
    pub fn apply(&self, num1: i64, num2: Option<i64>) -> Option<i64> {
        match self {
            Operation::Recognition => Some(num1),
            Operation::Add => num2.and_then(|b| num1.checked_add(b)),
            Operation::Subtract => num2.and_then(|b| num1.checked_sub(b)),
            Operation::Multiply => num2.and_then(|b| num1.checked_mul(b)),
            Operation::Divide => num2.and_then(|b| num1.checked_div(b)),
        }
    }

    /// Whether carry or borrow mistakes are meaningful for this operation.
    pub fn is_additive(&self) -> bool {
        matches!(self, Operation::Add | Operation::Subtract)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Payload of an `answer` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub exercise_type: String,
    pub num1: i64,
    /// Absent for number recognition.
    pub num2: Option<i64>,
    pub operation: Operation,
    pub user_answer: i64,
    pub correct_answer: i64,
    /// Seconds spent on the question.
    pub time_taken: f64,
    pub is_correct: bool,
}

impl AnswerRecord {
    /// Builds a record, deriving `is_correct` from the two answers.
    pub fn new(
        exercise_type: impl Into<String>,
        num1: i64,
        num2: Option<i64>,
        operation: Operation,
        user_answer: i64,
        correct_answer: i64,
        time_taken: f64,
    ) -> Self {
        Self {
            exercise_type: exercise_type.into(),
            num1,
            num2,
            operation,
            user_answer,
            correct_answer,
            time_taken,
            is_correct: user_answer == correct_answer,
        }
    }

    /// The question part of the record, e.g. `7+5`.
    pub fn question(&self) -> String {
        match self.num2 {
            Some(n) => format!("{}{}{}", self.num1, self.operation.symbol(), n),
            None => format!("{}{}", self.num1, self.operation.symbol()),
        }
    }
}

/// Payload of an `exerciseStart` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseStartRecord {
    pub exercise_type: String,
    /// Tier name, e.g. `BEGINNER`.
    pub difficulty: String,
}

/// Payload of a `levelUp` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelUpRecord {
    pub old_level: u32,
    pub new_level: u32,
    pub total_score: u32,
}

/// Payload of a `levelDown` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDownRecord {
    pub old_level: u32,
    pub new_level: u32,
    pub reason: String,
}

/// Payload of an `achievement` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementRecord {
    pub achievement_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_taken: Option<f64>,
}

/// Payload of a `hint` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintRecord {
    pub exercise_type: String,
    pub hint_type: String,
}

/// Payload of an `error` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub error_type: String,
    #[serde(default)]
    pub details: Value,
}

/// Payload of an `interaction` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    pub interaction_type: String,
    #[serde(default)]
    pub details: Value,
}

/// The typed body of an event. One variant per [`EventKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    Answer(AnswerRecord),
    ExerciseStart(ExerciseStartRecord),
    LevelUp(LevelUpRecord),
    LevelDown(LevelDownRecord),
    Achievement(AchievementRecord),
    Hint(HintRecord),
    Error(ErrorRecord),
    Interaction(InteractionRecord),
}

impl EventPayload {
    /// The kind tag matching this payload.
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::Answer(_) => EventKind::Answer,
            EventPayload::ExerciseStart(_) => EventKind::ExerciseStart,
            EventPayload::LevelUp(_) => EventKind::LevelUp,
            EventPayload::LevelDown(_) => EventKind::LevelDown,
            EventPayload::Achievement(_) => EventKind::Achievement,
            EventPayload::Hint(_) => EventKind::Hint,
            EventPayload::Error(_) => EventKind::Error,
            EventPayload::Interaction(_) => EventKind::Interaction,
        }
    }

    /// Decodes a payload from its kind tag and the raw `data` object.
    pub fn from_parts(kind: EventKind, data: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            EventKind::Answer => EventPayload::Answer(serde_json::from_value(data)?),
            EventKind::ExerciseStart => EventPayload::ExerciseStart(serde_json::from_value(data)?),
            EventKind::LevelUp => EventPayload::LevelUp(serde_json::from_value(data)?),
            EventKind::LevelDown => EventPayload::LevelDown(serde_json::from_value(data)?),
            EventKind::Achievement => EventPayload::Achievement(serde_json::from_value(data)?),
            EventKind::Hint => EventPayload::Hint(serde_json::from_value(data)?),
            EventKind::Error => EventPayload::Error(serde_json::from_value(data)?),
            EventKind::Interaction => EventPayload::Interaction(serde_json::from_value(data)?),
        })
    }

    fn to_data(&self) -> Result<Value, serde_json::Error> {
        match self {
            EventPayload::Answer(r) => serde_json::to_value(r),
            EventPayload::ExerciseStart(r) => serde_json::to_value(r),
            EventPayload::LevelUp(r) => serde_json::to_value(r),
            EventPayload::LevelDown(r) => serde_json::to_value(r),
            EventPayload::Achievement(r) => serde_json::to_value(r),
            EventPayload::Hint(r) => serde_json::to_value(r),
            EventPayload::Error(r) => serde_json::to_value(r),
            EventPayload::Interaction(r) => serde_json::to_value(r),
        }
    }
}

/// A timestamped event belonging to one session.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub session_id: String,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(timestamp: i64, session_id: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            timestamp,
            session_id: session_id.into(),
            payload,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    /// The answer payload, if this is an `answer` event.
    pub fn as_answer(&self) -> Option<&AnswerRecord> {
        match &self.payload {
            EventPayload::Answer(a) => Some(a),
            _ => None,
        }
    }

    /// The exercise type carried by the payload, when it has one.
    pub fn exercise_type(&self) -> Option<&str> {
        match &self.payload {
            EventPayload::Answer(a) => Some(&a.exercise_type),
            EventPayload::ExerciseStart(s) => Some(&s.exercise_type),
            EventPayload::Hint(h) => Some(&h.exercise_type),
            _ => None,
        }
    }
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let data = self
            .payload
            .to_data()
            .map_err(serde::ser::Error::custom)?;
        let mut state = serializer.serialize_struct("Event", 4)?;
        state.serialize_field("timestamp", &self.timestamp)?;
        state.serialize_field("eventType", &self.payload.kind())?;
        state.serialize_field("sessionId", &self.session_id)?;
        state.serialize_field("data", &data)?;
        state.end()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    timestamp: i64,
    event_type: EventKind,
    session_id: String,
    #[serde(default)]
    data: Value,
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawEvent::deserialize(deserializer)?;
        let payload = EventPayload::from_parts(raw.event_type, raw.data).map_err(D::Error::custom)?;
        Ok(Event {
            timestamp: raw.timestamp,
            session_id: raw.session_id,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_answer_record_derives_correctness() {
        let right = AnswerRecord::new("addition_level1", 3, Some(4), Operation::Add, 7, 7, 2.0);
        let wrong = AnswerRecord::new("addition_level1", 3, Some(4), Operation::Add, 8, 7, 2.0);
        assert!(right.is_correct);
        assert!(!wrong.is_correct);
    }

    #[test]
    fn test_event_wire_format() {
        let event = Event::new(
            1_000,
            "session_1_abc",
            EventPayload::Answer(AnswerRecord::new(
                "addition_level1",
                3,
                Some(4),
                Operation::Add,
                7,
                7,
                2.5,
            )),
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["eventType"], "answer");
        assert_eq!(value["sessionId"], "session_1_abc");
        assert_eq!(value["data"]["exerciseType"], "addition_level1");
        assert_eq!(value["data"]["operation"], "+");
        assert_eq!(value["data"]["isCorrect"], true);

        let back: Event = serde_json::from_value(value).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_recognition_without_second_operand() {
        let value = json!({
            "timestamp": 5,
            "eventType": "answer",
            "sessionId": "s",
            "data": {
                "exerciseType": "number_recognition",
                "num1": 4,
                "num2": null,
                "operation": "recognition",
                "userAnswer": 4,
                "correctAnswer": 4,
                "timeTaken": 1.0,
                "isCorrect": true
            }
        });
        let event: Event = serde_json::from_value(value).unwrap();
        let answer = event.as_answer().unwrap();
        assert_eq!(answer.num2, None);
        assert_eq!(answer.question(), "4recognition");
    }

    #[test]
    fn test_unknown_event_type_is_rejected() {
        let value = json!({"timestamp": 1, "eventType": "teleport", "sessionId": "s", "data": {}});
        assert!(serde_json::from_value::<Event>(value).is_err());
    }

    #[test]
    fn test_operation_apply() {
        assert_eq!(Operation::Add.apply(2, Some(3)), Some(5));
        assert_eq!(Operation::Subtract.apply(2, Some(3)), Some(-1));
        assert_eq!(Operation::Multiply.apply(2, Some(3)), Some(6));
        assert_eq!(Operation::Divide.apply(7, Some(0)), None);
        assert_eq!(Operation::Recognition.apply(9, None), Some(9));
    }
}
