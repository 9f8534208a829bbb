//! Orchestrates the per-sheet pipeline and emits the final HTML document.
//!
//! Per sheet: plan the pixel grid, resolve merges, locate shapes, then walk
//! the cells row-major. Suppressed merge members are skipped entirely; every
//! emitted cell carries its full inline style. Shapes land last as
//! absolutely-positioned overlays in discovery order, so later shapes stack
//! on top.

use base64::Engine;

use crate::dimensions::{plan_sheet, sheet_extent};
use crate::error::RenderError;
use crate::html;
use crate::merges::MergeMap;
use crate::model::{CellValue, Shape, Sheet, Workbook};
use crate::shapes::{PlacedShape, locate_shapes};
use crate::style::{explicit_cell_px, resolve_style};
use crate::values::{ComputedValues, format_number, resolve_value};

/// Categories for recoverable conversion warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningCode {
    SkippedElement,
    UnsupportedFeature,
    MalformedSegment,
}

/// A recoverable issue encountered during conversion.
#[derive(Debug, Clone)]
pub struct RenderWarning {
    pub code: WarningCode,
    pub message: String,
    pub location: Option<String>,
}

/// Options controlling conversion behavior.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Document title; defaults to "Workbook".
    pub title: Option<String>,
    /// Subset of sheet names to include. `None` renders all sheets.
    pub sheets: Option<Vec<String>>,
}

/// The result of rendering a workbook to HTML.
#[derive(Debug, Clone, Default)]
pub struct RenderResult {
    /// The self-contained HTML document.
    pub html: String,
    /// Recoverable issues encountered during conversion.
    pub warnings: Vec<RenderWarning>,
}

/// Render a workbook into a self-contained HTML document.
///
/// `computed` holds the external evaluator's formula results and may be
/// empty; formula cells without an entry render as visible placeholders.
/// Fails only when the requested sheet subset matches nothing.
pub fn render_workbook(
    workbook: &Workbook,
    computed: &ComputedValues,
    options: &RenderOptions,
) -> Result<RenderResult, RenderError> {
    let targets: Vec<&Sheet> = workbook
        .sheets
        .iter()
        .filter(|sheet| match &options.sheets {
            Some(names) => names.iter().any(|n| n == &sheet.name),
            None => true,
        })
        .collect();

    if targets.is_empty() {
        return Err(RenderError::NoSheets);
    }

    let title = options.title.as_deref().unwrap_or("Workbook");
    let mut out = html::document_header(title);
    let mut warnings = Vec::new();

    for sheet in targets {
        render_sheet(
            sheet,
            workbook.package.as_deref(),
            computed,
            &mut out,
            &mut warnings,
        );
    }

    out.push_str(html::document_footer());

    Ok(RenderResult {
        html: out,
        warnings,
    })
}

fn render_sheet(
    sheet: &Sheet,
    package: Option<&[u8]>,
    computed: &ComputedValues,
    out: &mut String,
    warnings: &mut Vec<RenderWarning>,
) {
    let (max_row, max_col) = sheet_extent(sheet);
    if max_row == 0 || max_col == 0 {
        // Empty sheet: no section, no title.
        return;
    }

    let grid = plan_sheet(sheet);
    let merge_map = MergeMap::build(&sheet.merges, &sheet.name, warnings);
    let shapes = locate_shapes(sheet, package, &grid, warnings);

    out.push_str(&html::sheet_header(&sheet.name));
    out.push_str(&html::table_open(grid.total_width()));
    out.push_str(&html::colgroup(&grid.col_widths));

    for row in 1..=max_row {
        let height = grid.row_heights[(row - 1) as usize];
        out.push_str(&format!("            <tr style=\"height: {height}px;\">\n"));

        for col in 1..=max_col {
            if merge_map.is_suppressed(row, col) {
                // Member of a merge: absorbed by the anchor's span.
                continue;
            }
            out.push_str(&render_cell(sheet, row, col, &merge_map, computed));
        }

        out.push_str("            </tr>\n");
    }

    out.push_str(html::table_close());

    for placed in &shapes {
        out.push_str(&shape_html(placed));
    }

    out.push_str(html::sheet_footer());
}

fn render_cell(
    sheet: &Sheet,
    row: u32,
    col: u32,
    merge_map: &MergeMap,
    computed: &ComputedValues,
) -> String {
    let cell = sheet.cell(row, col);
    let value = cell.map_or(&CellValue::Empty, |c| &c.value);
    let resolved = resolve_value(&sheet.name, row, col, value, computed);

    let style = resolve_style(cell.and_then(|c| c.style.as_ref()));
    let (width_px, height_px) = explicit_cell_px(
        sheet.col_widths.get(&col).copied(),
        sheet.row_heights.get(&row).copied(),
    );
    let css = style.to_css(width_px, height_px);

    let mut attrs = String::new();
    let (col_span, row_span) = merge_map.spans(row, col);
    if col_span > 1 {
        attrs.push_str(&format!(" colspan=\"{col_span}\""));
    }
    if row_span > 1 {
        attrs.push_str(&format!(" rowspan=\"{row_span}\""));
    }

    let mut classes: Vec<&str> = Vec::new();
    if resolved.is_empty {
        classes.push("empty-cell");
    }
    if resolved.multiline {
        classes.push("multiline");
    }
    if !classes.is_empty() {
        attrs.push_str(&format!(" class=\"{}\"", classes.join(" ")));
    }

    format!(
        "                <td style=\"{css}\"{attrs}>{}</td>\n",
        html::escape_html(&resolved.text)
    )
}

fn shape_html(placed: &PlacedShape) -> String {
    let b = &placed.bounds;
    let position = format!(
        "left: {}px; top: {}px; width: {}px; height: {}px;",
        b.left, b.top, b.width, b.height
    );

    match &placed.shape {
        Shape::Image(img) => {
            let encoded = base64::engine::general_purpose::STANDARD.encode(&img.data);
            format!(
                "            <img class=\"shape\" src=\"data:image/{};base64,{encoded}\" alt=\"{}\" style=\"{position}\">\n",
                img.format(),
                html::escape_html(&img.name)
            )
        }
        Shape::Chart(chart) => format!(
            "            <div class=\"shape shape-chart\" style=\"{position}\">{} ({})</div>\n",
            html::escape_html(&chart.name),
            html::escape_html(&chart.kind)
        ),
        Shape::Generic(shape) | Shape::TextBox(shape) => {
            let s = &shape.style;
            format!(
                "            <div class=\"shape\" style=\"{position} background-color: {}; border: {}px solid {}; font-size: {}pt; color: {};\">{}</div>\n",
                s.fill_color,
                s.border_width_px,
                s.border_color,
                format_number(s.font_size_pt),
                s.font_color,
                html::escape_html(&shape.text)
            )
        }
        Shape::Placeholder(p) => format!(
            "            <div class=\"shape shape-placeholder\" style=\"{position}\">{}</div>\n",
            html::escape_html(&p.name)
        ),
    }
}
