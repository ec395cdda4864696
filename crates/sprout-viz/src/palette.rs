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

//! Colors used by charts and meters.

/// The chart color scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorPalette {
    pub primary: [&'static str; 5],
    pub success: &'static str,
    pub warning: &'static str,
    pub error: &'static str,
    pub neutral: &'static str,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            primary: ["#4CAF50", "#2196F3", "#9C27B0", "#FF9800", "#F44336"],
            success: "#4CAF50",
            warning: "#FF9800",
            error: "#F44336",
            neutral: "#9E9E9E",
        }
    }
}

impl ColorPalette {
    /// Maps a 0-100 score to a color: 80 and up is success, 60 and up warning,
    /// anything lower error.
    ///
    /// With `inverse`, lower values are better and `100 - value` is compared.
    pub fn color_for_value(&self, value: f64, inverse: bool) -> &'static str {
        let normalized = if inverse { 100.0 - value } else { value };
        if normalized >= 80.0 {
            self.success
        } else if normalized >= 60.0 {
            self.warning
        } else {
            self.error
        }
    }

    /// The first `n` primary colors, as owned strings.
    pub fn primary_colors(&self, n: usize) -> Vec<String> {
        self.primary.iter().take(n).map(|c| c.to_string()).collect()
    }
}
