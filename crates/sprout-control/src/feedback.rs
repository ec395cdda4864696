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

//! Mistake-specific hints shown after a wrong answer.

use serde::{Deserialize, Serialize};
use sprout_metrics::ErrorPatterns;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackHint {
    CheckOperation,
    MindMagnitude,
    CheckDigitOrder,
    WatchCarryBorrow,
}

impl FeedbackHint {
    /// Picks the most relevant hint. Operation confusion wins over magnitude,
    /// then reversal, then carry/borrow.
    pub fn from_patterns(patterns: &ErrorPatterns) -> Option<Self> {
        if patterns.operation_confusion > 0 {
            Some(FeedbackHint::CheckOperation)
        } else if patterns.magnitude_errors > 0 {
            Some(FeedbackHint::MindMagnitude)
        } else if patterns.reversal_errors > 0 {
            Some(FeedbackHint::CheckDigitOrder)
        } else if patterns.carry_borrow_errors > 0 {
            Some(FeedbackHint::WatchCarryBorrow)
        } else {
            None
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            FeedbackHint::CheckOperation => "check_operation",
            FeedbackHint::MindMagnitude => "mind_magnitude",
            FeedbackHint::CheckDigitOrder => "check_digit_order",
            FeedbackHint::WatchCarryBorrow => "watch_carry_borrow",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            FeedbackHint::CheckOperation => "Remember to check the operation sign!",
            FeedbackHint::MindMagnitude => "Watch the size of the numbers!",
            FeedbackHint::CheckDigitOrder => "Look carefully at the order of the digits!",
            FeedbackHint::WatchCarryBorrow => "Watch out for carrying and borrowing!",
        }
    }
}

/// The message shown for a wrong answer.
pub fn feedback_message(correct_answer: i64, hint: Option<FeedbackHint>) -> String {
    match hint {
        Some(hint) => format!("The correct answer is {}. {}", correct_answer, hint.message()),
        None => format!("The correct answer is {}.", correct_answer),
    }
}
