use xltohtml::{Cell, CellValue, Sheet, Workbook};

/// Build a sheet from a rectangular grid of text values.
///
/// Empty strings leave the cell absent, so the sheet looks the way a loader
/// would produce it: only populated cells present, extent covering the grid.
pub fn sheet_from_rows(name: &str, rows: &[&[&str]]) -> Sheet {
    let max_row = rows.len().max(1) as u32;
    let max_col = rows.iter().map(|r| r.len()).max().unwrap_or(0).max(1) as u32;
    let mut sheet = Sheet::new(name, max_row, max_col);
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

/// Wrap sheets into a workbook with no raw package attached.
pub fn workbook_of(sheets: Vec<Sheet>) -> Workbook {
    Workbook {
        sheets,
        package: None,
    }
}
