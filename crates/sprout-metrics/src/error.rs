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

use sprout_core::StorageError;
use thiserror::Error;

/// Failures while computing a metric.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// The event log could not be read.
    #[error("failed to read events: {0}")]
    Source(#[from] StorageError),
    /// An answer refers to an exercise type with no configured difficulty tier.
    #[error("no difficulty tier configured for exercise type '{0}'")]
    UnknownExerciseType(String),
}
