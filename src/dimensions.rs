//! Plans the effective pixel width of every column and height of every row.
//!
//! Explicit author-set dimensions always win and convert verbatim through the
//! unit converter. Everything else is estimated from content: column widths
//! from the longest effective text in the column, row heights from the
//! maximum embedded line count in the row.

use crate::model::Sheet;
use crate::units::{
    AUTO_COL_MAX_PX, AUTO_COL_MIN_PX, BASE_ROW_PX, CONTENT_PADDING_PX, CONTENT_PX_PER_CHAR,
    LINE_INCREMENT_PX, height_points_to_px, width_units_to_px,
};
use crate::values::measured_text;

/// Per-sheet pixel dimensions, computed once and reused by cell rendering
/// and shape placement.
///
/// Index 0 corresponds to column/row 1. The left edge of column n+1 is the
/// sum of the first n widths; shape positioning relies on this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    pub col_widths: Vec<u32>,
    pub row_heights: Vec<u32>,
}

impl PixelGrid {
    pub fn total_width(&self) -> u32 {
        self.col_widths.iter().sum()
    }

    pub fn total_height(&self) -> u32 {
        self.row_heights.iter().sum()
    }

    /// Left pixel edge of the 0-based column index. Indexes at or past the
    /// grid edge clamp to the full grid width.
    pub fn col_left(&self, col: usize) -> f64 {
        let upto = col.min(self.col_widths.len());
        self.col_widths[..upto].iter().map(|w| *w as f64).sum()
    }

    /// Top pixel edge of the 0-based row index, clamped like [`col_left`].
    ///
    /// [`col_left`]: PixelGrid::col_left
    pub fn row_top(&self, row: usize) -> f64 {
        let upto = row.min(self.row_heights.len());
        self.row_heights[..upto].iter().map(|h| *h as f64).sum()
    }
}

/// Usable extent of a sheet. A degenerate 1x1 extent with no cells reports
/// zero and the renderer skips the sheet entirely.
pub fn sheet_extent(sheet: &Sheet) -> (u32, u32) {
    if sheet.max_row <= 1 && sheet.max_col <= 1 && sheet.cells.is_empty() {
        return (0, 0);
    }
    (sheet.max_row, sheet.max_col)
}

/// Compute the pixel grid for a sheet.
pub fn plan_sheet(sheet: &Sheet) -> PixelGrid {
    let (max_row, max_col) = sheet_extent(sheet);

    let col_widths = (1..=max_col).map(|col| plan_column(sheet, col, max_row)).collect();
    let row_heights = (1..=max_row).map(|row| plan_row(sheet, row, max_col)).collect();

    PixelGrid {
        col_widths,
        row_heights,
    }
}

fn plan_column(sheet: &Sheet, col: u32, max_row: u32) -> u32 {
    // Explicit author width wins verbatim; zero or negative stored widths
    // count as absent.
    if let Some(width) = sheet.col_widths.get(&col).copied().filter(|w| *w > 0.0) {
        return width_units_to_px(width);
    }

    let mut max_length: f64 = 0.0;
    for row in 1..=max_row {
        if let Some(cell) = sheet.cell(row, col) {
            max_length = max_length.max(effective_length(&measured_text(&cell.value)));
        }
    }

    if max_length == 0.0 {
        return AUTO_COL_MIN_PX;
    }
    let width = (max_length * CONTENT_PX_PER_CHAR + CONTENT_PADDING_PX) as u32;
    width.clamp(AUTO_COL_MIN_PX, AUTO_COL_MAX_PX)
}

fn plan_row(sheet: &Sheet, row: u32, max_col: u32) -> u32 {
    if let Some(height) = sheet.row_heights.get(&row).copied().filter(|h| *h > 0.0) {
        return height_points_to_px(height);
    }

    // Height grows with the maximum line count across the row, not per cell.
    let mut max_lines: u32 = 1;
    for col in 1..=max_col {
        if let Some(cell) = sheet.cell(row, col) {
            let text = measured_text(&cell.value);
            if !text.is_empty() {
                let lines = text.matches('\n').count() as u32 + 1;
                max_lines = max_lines.max(lines);
            }
        }
    }

    BASE_ROW_PX + (max_lines - 1) * LINE_INCREMENT_PX
}

/// Effective character length of a cell text: ASCII counts 1, everything
/// else (CJK and other wide scripts) counts 1.5.
fn effective_length(text: &str) -> f64 {
    text.chars()
        .map(|c| if c.is_ascii() { 1.0 } else { 1.5 })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cell, CellValue};

    fn sheet_with_text(rows: &[&[&str]]) -> Sheet {
        let max_row = rows.len() as u32;
        let max_col = rows.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        let mut sheet = Sheet::new("S", max_row.max(1), max_col.max(1));
        for (r, row) in rows.iter().enumerate() {
            for (c, text) in row.iter().enumerate() {
                if !text.is_empty() {
                    sheet.set_cell(
                        r as u32 + 1,
                        c as u32 + 1,
                        Cell::new(CellValue::Text((*text).to_string())),
                    );
                }
            }
        }
        sheet
    }

    #[test]
    fn test_explicit_column_width_wins() {
        let mut sheet = sheet_with_text(&[&["this is a rather long cell value"]]);
        sheet.col_widths.insert(1, 10.0);
        let grid = plan_sheet(&sheet);
        assert_eq!(grid.col_widths, vec![70]);
    }

    #[test]
    fn test_explicit_zero_width_falls_through_to_content() {
        let mut sheet = sheet_with_text(&[&[""]]);
        sheet.max_row = 2;
        sheet.col_widths.insert(1, 0.0);
        let grid = plan_sheet(&sheet);
        assert_eq!(grid.col_widths, vec![AUTO_COL_MIN_PX]);
    }

    #[test]
    fn test_empty_column_gets_minimum_never_zero() {
        let mut sheet = Sheet::new("S", 2, 2);
        sheet.set_cell(1, 1, Cell::new(CellValue::Text("x".into())));
        let grid = plan_sheet(&sheet);
        assert_eq!(grid.col_widths[1], AUTO_COL_MIN_PX);
        assert!(grid.col_widths.iter().all(|w| *w > 0));
    }

    #[test]
    fn test_content_width_formula() {
        // 10 ASCII chars: 10 * 8 + 20 = 100
        let sheet = sheet_with_text(&[&["0123456789"]]);
        let grid = plan_sheet(&sheet);
        assert_eq!(grid.col_widths, vec![100]);
    }

    #[test]
    fn test_content_width_clamped_to_max() {
        let long = "x".repeat(200);
        let sheet = sheet_with_text(&[&[long.as_str()]]);
        let grid = plan_sheet(&sheet);
        assert_eq!(grid.col_widths, vec![AUTO_COL_MAX_PX]);
    }

    #[test]
    fn test_short_content_clamped_to_min() {
        let sheet = sheet_with_text(&[&["ab"]]);
        let grid = plan_sheet(&sheet);
        assert_eq!(grid.col_widths, vec![AUTO_COL_MIN_PX]);
    }

    #[test]
    fn test_wide_chars_count_one_and_a_half() {
        // 10 CJK chars: 15 effective * 8 + 20 = 140
        let sheet = sheet_with_text(&[&["日本語日本語日本語日"]]);
        let grid = plan_sheet(&sheet);
        assert_eq!(grid.col_widths, vec![140]);
    }

    #[test]
    fn test_column_takes_max_over_rows() {
        let sheet = sheet_with_text(&[&["ab"], &["0123456789"], &["xyz"]]);
        let grid = plan_sheet(&sheet);
        assert_eq!(grid.col_widths, vec![100]);
    }

    #[test]
    fn test_explicit_row_height_wins() {
        let mut sheet = sheet_with_text(&[&["a\nb\nc"]]);
        sheet.row_heights.insert(1, 30.0);
        let grid = plan_sheet(&sheet);
        assert_eq!(grid.row_heights, vec![39]);
    }

    #[test]
    fn test_row_height_grows_with_line_breaks() {
        let sheet = sheet_with_text(&[&["one line"], &["two\nlines"], &["a\nb\nc"]]);
        let grid = plan_sheet(&sheet);
        assert_eq!(grid.row_heights, vec![25, 45, 65]);
    }

    #[test]
    fn test_row_height_uses_max_lines_across_row() {
        let sheet = sheet_with_text(&[&["plain", "x\ny\nz", "also plain"]]);
        let grid = plan_sheet(&sheet);
        assert_eq!(grid.row_heights, vec![65]);
    }

    #[test]
    fn test_formula_cells_measure_formula_text() {
        let mut sheet = Sheet::new("S", 1, 2);
        sheet.set_cell(1, 1, Cell::new(CellValue::Formula("=SUM(A1:A100)".into())));
        let grid = plan_sheet(&sheet);
        // 13 chars: 13 * 8 + 20 = 124
        assert_eq!(grid.col_widths[0], 124);
    }

    #[test]
    fn test_degenerate_sheet_reports_zero_extent() {
        let sheet = Sheet::new("Empty", 1, 1);
        assert_eq!(sheet_extent(&sheet), (0, 0));
        let grid = plan_sheet(&sheet);
        assert!(grid.col_widths.is_empty());
        assert!(grid.row_heights.is_empty());
    }

    #[test]
    fn test_single_cell_sheet_is_not_degenerate() {
        let mut sheet = Sheet::new("One", 1, 1);
        sheet.set_cell(1, 1, Cell::new(CellValue::Text("x".into())));
        assert_eq!(sheet_extent(&sheet), (1, 1));
    }

    #[test]
    fn test_grid_offsets_are_prefix_sums() {
        let grid = PixelGrid {
            col_widths: vec![50, 60, 70],
            row_heights: vec![25, 25],
        };
        assert_eq!(grid.col_left(0), 0.0);
        assert_eq!(grid.col_left(1), 50.0);
        assert_eq!(grid.col_left(2), 110.0);
        assert_eq!(grid.col_left(3), 180.0);
        // Past the edge clamps to the full extent.
        assert_eq!(grid.col_left(99), 180.0);
        assert_eq!(grid.row_top(99), 50.0);
        assert_eq!(grid.total_width(), 180);
    }
}
