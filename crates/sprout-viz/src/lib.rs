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

//! # Sprout Viz
//!
//! Shapes learning metrics into chart-ready structures: labeled series,
//! progress meters and color-coded values. Rendering is left to the caller.

pub mod charts;
pub mod formatter;
pub mod palette;

pub use charts::{ChartData, ChartKind, ChartOptions, Dataset, HeatmapData, MeterReading, ProgressMeters};
pub use formatter::VisualizationFormatter;
pub use palette::ColorPalette;
