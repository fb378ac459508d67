//! Column fitting for the forecast grid.

use serde::{Deserialize, Serialize};

/// Fixed geometry of a grid cell plus the minimum gap between cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSpec {
    pub cell_width: f64,
    pub cell_height: f64,
    pub min_spacing: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self { cell_width: 100.0, cell_height: 150.0, min_spacing: 10.0 }
    }
}

/// Geometry applied to the grid viewport for one width.
///
/// `edge_inset` goes on all four sides; `padding` is used both between
/// columns and between rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridMetrics {
    pub columns: usize,
    pub padding: f64,
    pub edge_inset: f64,
}

impl GridMetrics {
    /// Number of rows needed for `cells` cells.
    pub fn rows_for(&self, cells: usize) -> usize {
        if self.columns == 0 { 0 } else { cells.div_ceil(self.columns) }
    }
}

impl GridSpec {
    /// Fit as many columns as the width allows and spread the leftover space.
    ///
    /// Negative or non-finite widths are treated as zero. The first column
    /// needs a cell plus spacing on both sides, so widths below
    /// `cell_width + 2 * min_spacing` yield zero columns.
    pub fn fit(&self, width: f64) -> GridMetrics {
        let width = if width.is_finite() { width.max(0.0) } else { 0.0 };

        let available_width = width - self.min_spacing;
        let columns = (available_width / (self.cell_width + self.min_spacing)).floor().max(0.0);
        let padding_space = width - self.cell_width * columns;
        let padding = (padding_space / (columns + 1.0)).floor();
        let edge_inset = ((padding_space - padding * columns) / 2.0).floor();

        GridMetrics { columns: columns as usize, padding, edge_inset }
    }

    /// Top-left origin of the cell at `index`, relative to the viewport.
    pub fn cell_origin(&self, metrics: &GridMetrics, index: usize) -> Option<(f64, f64)> {
        if metrics.columns == 0 {
            return None;
        }
        let col = (index % metrics.columns) as f64;
        let row = (index / metrics.columns) as f64;
        let x = metrics.edge_inset + col * (self.cell_width + metrics.padding);
        let y = metrics.edge_inset + row * (self.cell_height + metrics.padding);
        Some((x, y))
    }
}
