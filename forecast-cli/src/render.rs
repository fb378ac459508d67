//! Draws the forecast screen's grid as plain text.

use forecast_core::{ForecastCell, ForecastScreen, GridMetrics, ScreenError};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct GridSnapshot {
    pub title: String,
    pub metrics: GridMetrics,
    pub cells: Vec<PlacedCell>,
}

#[derive(Debug, Serialize)]
pub struct PlacedCell {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    #[serde(flatten)]
    pub cell: ForecastCell,
}

/// Every cell with its position in the viewport.
pub fn snapshot(screen: &ForecastScreen, metrics: GridMetrics) -> Result<GridSnapshot, ScreenError> {
    let mut cells = Vec::with_capacity(screen.cell_count());
    for index in 0..screen.cell_count() {
        let Some((x, y)) = screen.grid().cell_origin(&metrics, index) else { break };
        cells.push(PlacedCell { index, x, y, cell: screen.render_cell(index)? });
    }
    Ok(GridSnapshot { title: screen.title(), metrics, cells })
}

/// Lay the cells out as text lines, one character per grid unit.
pub fn render_grid(screen: &ForecastScreen, metrics: GridMetrics) -> Result<Vec<String>, ScreenError> {
    if screen.cell_count() == 0 {
        return Ok(vec!["(no forecast available)".to_string()]);
    }
    if metrics.columns == 0 {
        return Ok(vec!["(viewport too narrow for the forecast grid)".to_string()]);
    }

    let grid = screen.grid();
    let cell_width = grid.cell_width as usize;
    let cell_height = grid.cell_height as usize;
    let inset = metrics.edge_inset as usize;
    let padding = metrics.padding as usize;
    let rows = metrics.rows_for(screen.cell_count());

    let mut lines = vec![String::new(); inset];
    for row in 0..rows {
        let first = row * metrics.columns;
        let last = (first + metrics.columns).min(screen.cell_count());

        let mut placed = Vec::with_capacity(last - first);
        for index in first..last {
            let x = grid.cell_origin(&metrics, index).map_or(0, |(x, _)| x as usize);
            placed.push((x, cell_lines(&screen.render_cell(index)?, cell_height)));
        }

        for line_no in 0..cell_height {
            let mut line = String::new();
            for (x, content) in &placed {
                let used = line.chars().count();
                line.extend(std::iter::repeat_n(' ', x.saturating_sub(used)));
                line.push_str(&center(&content[line_no], cell_width));
            }
            lines.push(line.trim_end().to_string());
        }

        if row + 1 < rows {
            lines.extend(std::iter::repeat_n(String::new(), padding));
        }
    }
    lines.extend(std::iter::repeat_n(String::new(), inset));

    Ok(lines)
}

fn cell_lines(cell: &ForecastCell, height: usize) -> Vec<String> {
    let mut content = vec![
        cell.date_label.clone(),
        cell.icon.clone().unwrap_or_default(),
        cell.label.clone(),
    ];
    content.resize(height, String::new());
    content
}

fn center(text: &str, width: usize) -> String {
    let text: String = text.chars().take(width).collect();
    let len = text.chars().count();
    let left = (width - len) / 2;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(width - len - left))
}
