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

//! Chart data structures.
//!
//! Field names serialize in camelCase so the structures can be handed to a
//! charting library unchanged.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One labeled series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub data: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub background_color: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
}

/// Labels plus one or more series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// An exercise-by-difficulty activity grid, stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapData {
    pub exercises: Vec<String>,
    pub difficulties: Vec<String>,
    pub values: Vec<usize>,
}

impl HeatmapData {
    pub fn value(&self, exercise: usize, difficulty: usize) -> Option<usize> {
        if difficulty >= self.difficulties.len() {
            return None;
        }
        self.values
            .get(exercise * self.difficulties.len() + difficulty)
            .copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterReading {
    /// 0 to 100.
    pub value: f64,
    pub color: String,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressMeters {
    pub accuracy: MeterReading,
    pub speed: MeterReading,
    pub improvement: MeterReading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Heatmap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendOptions {
    pub display: bool,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipOptions {
    pub enabled: bool,
    pub mode: String,
    pub intersect: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginOptions {
    pub legend: LegendOptions,
    pub tooltip: TooltipOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisOptions {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub axis_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_at_zero: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_display: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineElements {
    pub tension: f64,
    pub point_radius: f64,
    pub hit_radius: f64,
    pub hover_radius: f64,
}

/// Static display options for one chart kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub responsive: bool,
    pub maintain_aspect_ratio: bool,
    pub plugins: PluginOptions,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scales: BTreeMap<String, AxisOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<LineElements>,
}

impl ChartOptions {
    pub fn for_kind(kind: ChartKind) -> Self {
        let mut options = Self {
            responsive: true,
            maintain_aspect_ratio: false,
            plugins: PluginOptions {
                legend: LegendOptions {
                    display: true,
                    position: Position::Bottom,
                },
                tooltip: TooltipOptions {
                    enabled: true,
                    mode: "index".to_string(),
                    intersect: false,
                },
            },
            scales: BTreeMap::new(),
            elements: None,
        };

        match kind {
            ChartKind::Bar => {
                options.scales.insert(
                    "y".to_string(),
                    AxisOptions {
                        begin_at_zero: Some(true),
                        grid_display: Some(false),
                        ..AxisOptions::default()
                    },
                );
            }
            ChartKind::Line => {
                options.elements = Some(LineElements {
                    tension: 0.4,
                    point_radius: 4.0,
                    hit_radius: 10.0,
                    hover_radius: 6.0,
                });
            }
            ChartKind::Pie => {
                options.plugins.legend.position = Position::Right;
            }
            ChartKind::Heatmap => {
                options.plugins.legend.display = false;
                for (axis, position) in [("x", Position::Bottom), ("y", Position::Left)] {
                    options.scales.insert(
                        axis.to_string(),
                        AxisOptions {
                            axis_type: Some("category".to_string()),
                            position: Some(position),
                            ..AxisOptions::default()
                        },
                    );
                }
            }
        }

        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_kind_options() {
        let bar = ChartOptions::for_kind(ChartKind::Bar);
        assert_eq!(bar.scales["y"].begin_at_zero, Some(true));
        assert!(bar.elements.is_none());

        let pie = ChartOptions::for_kind(ChartKind::Pie);
        assert_eq!(pie.plugins.legend.position, Position::Right);

        let heatmap = ChartOptions::for_kind(ChartKind::Heatmap);
        assert!(!heatmap.plugins.legend.display);
        assert_eq!(heatmap.scales.len(), 2);

        let line = ChartOptions::for_kind(ChartKind::Line);
        assert_eq!(line.elements.unwrap().tension, 0.4);
    }

    #[test]
    fn test_heatmap_lookup() {
        let heatmap = HeatmapData {
            exercises: vec!["a".into(), "b".into()],
            difficulties: vec!["x".into(), "y".into(), "z".into()],
            values: vec![0, 1, 2, 3, 4, 5],
        };
        assert_eq!(heatmap.value(1, 2), Some(5));
        assert_eq!(heatmap.value(0, 3), None);
        assert_eq!(heatmap.value(2, 0), None);
    }
}
