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

use crate::types::{
    CommonError, ErrorAnalysis, ErrorDetails, ErrorPatterns, ProblemArea, ProblemAreaCount,
};
use sprout_core::{AnswerRecord, Operation};

const TOP_ERRORS: usize = 5;

/// Classifies incorrect answers, given in chronological order.
pub(crate) fn error_analysis(incorrect: &[&AnswerRecord]) -> ErrorAnalysis {
    ErrorAnalysis {
        common_errors: common_errors(incorrect),
        error_patterns: error_patterns(incorrect),
        problem_areas: problem_areas(incorrect),
    }
}

fn common_errors(incorrect: &[&AnswerRecord]) -> Vec<CommonError> {
    let mut errors: Vec<CommonError> = Vec::new();
    for answer in incorrect {
        let key = format!("{}={}", answer.question(), answer.user_answer);
        match errors.iter_mut().find(|e| e.error == key) {
            Some(existing) => existing.count += 1,
            None => errors.push(CommonError {
                error: key,
                count: 1,
                details: ErrorDetails {
                    num1: answer.num1,
                    num2: answer.num2,
                    operation: answer.operation,
                    user_answer: answer.user_answer,
                    correct_answer: answer.correct_answer,
                },
            }),
        }
    }

    // Stable: equal counts stay in first-seen order.
    errors.sort_by(|a, b| b.count.cmp(&a.count));
    errors.truncate(TOP_ERRORS);
    errors
}

fn error_patterns(incorrect: &[&AnswerRecord]) -> ErrorPatterns {
    let mut patterns = ErrorPatterns::default();
    for answer in incorrect {
        if is_operation_confusion(answer) {
            patterns.operation_confusion += 1;
        }
        if is_magnitude_error(answer) {
            patterns.magnitude_errors += 1;
        }
        if is_reversal(answer) {
            patterns.reversal_errors += 1;
        }
        if answer.operation.is_additive() && answer.user_answer.abs_diff(answer.correct_answer) == 10
        {
            patterns.carry_borrow_errors += 1;
        }
    }
    patterns
}

/// The answer matches the other additive operation.
fn is_operation_confusion(answer: &AnswerRecord) -> bool {
    let Some(num2) = answer.num2 else {
        return false;
    };
    match answer.operation {
        Operation::Add => answer.num1.checked_sub(num2) == Some(answer.user_answer),
        Operation::Subtract => answer.num1.checked_add(num2) == Some(answer.user_answer),
        _ => false,
    }
}

/// Off by at least one order of magnitude. Zero answers count; negative
/// answers never do.
fn is_magnitude_error(answer: &AnswerRecord) -> bool {
    let user = (answer.user_answer as f64).log10();
    let correct = (answer.correct_answer as f64).log10();
    (user - correct).abs() >= 1.0
}

/// The decimal digits of the answer reversed give the correct answer.
fn is_reversal(answer: &AnswerRecord) -> bool {
    let reversed: String = answer.user_answer.to_string().chars().rev().collect();
    reversed == answer.correct_answer.to_string()
}

fn problem_areas(incorrect: &[&AnswerRecord]) -> Vec<ProblemAreaCount> {
    let mut areas: Vec<ProblemAreaCount> = Vec::new();
    for answer in incorrect {
        let double_digit = answer.num1 >= 10 || answer.num2.is_some_and(|n| n >= 10);
        let area = if answer.exercise_type.contains("addition") {
            if double_digit {
                ProblemArea::DoubleDigitAddition
            } else {
                ProblemArea::SingleDigitAddition
            }
        } else if answer.exercise_type.contains("subtraction") {
            if double_digit {
                ProblemArea::DoubleDigitSubtraction
            } else {
                ProblemArea::SingleDigitSubtraction
            }
        } else {
            continue;
        };

        match areas.iter_mut().find(|a| a.area == area) {
            Some(existing) => existing.count += 1,
            None => areas.push(ProblemAreaCount { area, count: 1 }),
        }
    }

    areas.sort_by(|a, b| b.count.cmp(&a.count));
    areas
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrong(exercise: &str, num1: i64, num2: i64, op: Operation, user: i64) -> AnswerRecord {
        let correct = op.apply(num1, Some(num2)).unwrap_or_default();
        AnswerRecord::new(exercise, num1, Some(num2), op, user, correct, 5.0)
    }

    #[test]
    fn test_operation_confusion_and_carry() {
        // 7+5 answered 2: confusion, and |2 - 12| == 10.
        let record = wrong("addition_level1", 7, 5, Operation::Add, 2);
        let patterns = error_patterns(&[&record]);
        assert_eq!(patterns.operation_confusion, 1);
        assert_eq!(patterns.carry_borrow_errors, 1);
        assert_eq!(patterns.reversal_errors, 0);
        assert_eq!(patterns.magnitude_errors, 0);
    }

    #[test]
    fn test_reversal() {
        let record = wrong("addition_level2", 10, 11, Operation::Add, 12);
        assert!(is_reversal(&record));
    }

    #[test]
    fn test_magnitude_uses_float_semantics() {
        let zero = wrong("addition_level1", 3, 4, Operation::Add, 0);
        assert!(is_magnitude_error(&zero));
        let negative = wrong("subtraction_level1", 3, 4, Operation::Subtract, -7);
        assert!(!is_magnitude_error(&negative));
        let tenfold = wrong("addition_level1", 3, 4, Operation::Add, 700);
        assert!(is_magnitude_error(&tenfold));
    }

    #[test]
    fn test_common_errors_ranked_and_truncated() {
        let mut records = Vec::new();
        for num1 in 1..=6 {
            records.push(wrong("addition_level1", num1, 1, Operation::Add, 0));
        }
        records.push(wrong("addition_level1", 6, 1, Operation::Add, 0));
        let refs: Vec<_> = records.iter().collect();

        let errors = common_errors(&refs);
        assert_eq!(errors.len(), 5);
        assert_eq!(errors[0].error, "6+1=0");
        assert_eq!(errors[0].count, 2);
        assert_eq!(errors[1].error, "1+1=0");
    }

    #[test]
    fn test_problem_areas_sorted_by_count() {
        let records = [
            wrong("addition_level1", 3, 4, Operation::Add, 9),
            wrong("addition_level2", 13, 4, Operation::Add, 9),
            wrong("addition_level2", 3, 14, Operation::Add, 9),
            wrong("subtraction_level1", 8, 3, Operation::Subtract, 4),
            wrong("number_recognition", 8, 0, Operation::Add, 4),
        ];
        let refs: Vec<_> = records.iter().collect();
        let areas = problem_areas(&refs);
        assert_eq!(areas.len(), 3);
        assert_eq!(areas[0].area, ProblemArea::DoubleDigitAddition);
        assert_eq!(areas[0].count, 2);
        assert_eq!(areas[1].area, ProblemArea::SingleDigitAddition);
        assert_eq!(areas[2].area, ProblemArea::SingleDigitSubtraction);
    }
}
