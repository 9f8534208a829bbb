//! Resolves merge ranges into a per-cell suppression and span map.
//!
//! The anchor (top-left) cell of each range carries the spans; every other
//! member is suppressed and skipped entirely during grid emission, with its
//! columns absorbed by the anchor's span.

use std::collections::BTreeMap;

use crate::model::MergeRange;
use crate::render::{RenderWarning, WarningCode};

/// State of one cell with respect to the sheet's merges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeState {
    pub suppressed: bool,
    pub col_span: u32,
    pub row_span: u32,
}

/// Per-cell merge lookup for one sheet. Cells outside any range are not in
/// the map and render as plain 1x1 cells.
#[derive(Debug, Clone, Default)]
pub struct MergeMap {
    map: BTreeMap<(u32, u32), MergeState>,
}

impl MergeMap {
    /// Build the map from the sheet's declared ranges.
    ///
    /// Ranges are assumed non-overlapping. If the input violates that, the
    /// first-seen range is authoritative and the later one is reported as a
    /// skipped element rather than silently ignored.
    pub fn build(ranges: &[MergeRange], sheet: &str, warnings: &mut Vec<RenderWarning>) -> Self {
        let mut map = BTreeMap::new();

        for range in ranges {
            let overlaps = (range.min_row..=range.max_row).any(|row| {
                (range.min_col..=range.max_col).any(|col| map.contains_key(&(row, col)))
            });
            if overlaps {
                warnings.push(RenderWarning {
                    code: WarningCode::SkippedElement,
                    message: format!(
                        "merge range ({},{})-({},{}) overlaps an earlier range",
                        range.min_row, range.min_col, range.max_row, range.max_col
                    ),
                    location: Some(sheet.to_string()),
                });
                continue;
            }

            for row in range.min_row..=range.max_row {
                for col in range.min_col..=range.max_col {
                    let is_anchor = row == range.min_row && col == range.min_col;
                    let state = if is_anchor {
                        MergeState {
                            suppressed: false,
                            col_span: range.col_span(),
                            row_span: range.row_span(),
                        }
                    } else {
                        MergeState {
                            suppressed: true,
                            col_span: 1,
                            row_span: 1,
                        }
                    };
                    map.insert((row, col), state);
                }
            }
        }

        Self { map }
    }

    pub fn is_suppressed(&self, row: u32, col: u32) -> bool {
        self.map.get(&(row, col)).is_some_and(|s| s.suppressed)
    }

    /// (col_span, row_span) for a cell; (1, 1) outside any range.
    pub fn spans(&self, row: u32, col: u32) -> (u32, u32) {
        self.map
            .get(&(row, col))
            .map_or((1, 1), |s| (s.col_span, s.row_span))
    }

    pub fn state(&self, row: u32, col: u32) -> Option<&MergeState> {
        self.map.get(&(row, col))
    }
}
