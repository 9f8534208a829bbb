//! The in-memory workbook model this crate renders.
//!
//! A loader (xlsx reader, test builder, ...) populates these types and hands
//! them over read-only. Styles arrive fully resolved to raw attribute values;
//! nothing here performs lazy theme lookups.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

/// An ordered collection of sheets, read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
    /// Raw bytes of the source package, if the loader kept them. Only
    /// consulted by the deepest shape-discovery tier.
    pub package: Option<Vec<u8>>,
}

/// A single worksheet: cells, explicit dimensions, merges, and drawings.
///
/// Cell coordinates are 1-based (row, column), row-major. Shape anchors are
/// 0-based, matching the drawing layer they come from.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    /// Rectangular extent as reported by the loader, 1-based.
    pub max_row: u32,
    pub max_col: u32,
    pub cells: BTreeMap<(u32, u32), Cell>,
    /// Explicit author-set column widths in character units, keyed by column.
    pub col_widths: BTreeMap<u32, f64>,
    /// Explicit author-set row heights in points, keyed by row.
    pub row_heights: BTreeMap<u32, f64>,
    pub default_col_width: Option<f64>,
    pub default_row_height: Option<f64>,
    pub merges: Vec<MergeRange>,
    /// Structured drawing listing (first shape-discovery tier).
    pub images: Vec<ImageShape>,
    pub charts: Vec<ChartShape>,
    /// Raw drawing-part XML (second shape-discovery tier).
    pub drawing_xml: Option<String>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, max_row: u32, max_col: u32) -> Self {
        Self {
            name: name.into(),
            max_row,
            max_col,
            ..Default::default()
        }
    }

    pub fn set_cell(&mut self, row: u32, col: u32, cell: Cell) {
        self.cells.insert((row, col), cell);
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }
}

/// One cell: a raw value plus an optional style reference.
#[derive(Debug, Clone, Default)]
pub struct Cell {
    pub value: CellValue,
    pub style: Option<CellStyle>,
}

impl Cell {
    pub fn new(value: CellValue) -> Self {
        Self { value, style: None }
    }

    pub fn styled(value: CellValue, style: CellStyle) -> Self {
        Self {
            value,
            style: Some(style),
        }
    }
}

/// The raw value of a cell as the loader saw it.
///
/// `Formula` carries the formula text (including the leading `=`); the
/// computed result, when one exists, lives in the external value table.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Formula(String),
}

/// Raw style attributes attached to a cell. Absent groups mean "defaults".
#[derive(Debug, Clone, Default)]
pub struct CellStyle {
    pub font: Option<FontAttrs>,
    pub fill: Option<FillAttrs>,
    pub border: Option<BorderAttrs>,
    pub alignment: Option<AlignmentAttrs>,
}

/// Font attributes. Bold and italic are tri-state: explicitly on, explicitly
/// off, or absent.
#[derive(Debug, Clone, Default)]
pub struct FontAttrs {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    /// Size in points.
    pub size: Option<f64>,
    pub name: Option<String>,
    pub color: Option<ColorRef>,
    /// Underline keyword ("single", "double", ...); "none" counts as unset.
    pub underline: Option<String>,
    pub strike: bool,
}

/// Fill attributes. Several sub-attributes can carry the color depending on
/// the fill kind; the style resolver picks the first usable one.
#[derive(Debug, Clone, Default)]
pub struct FillAttrs {
    pub start_color: Option<ColorRef>,
    pub fg_color: Option<ColorRef>,
    pub bg_color: Option<ColorRef>,
    pub gradient_start: Option<ColorRef>,
}

/// Four independently styled border edges.
#[derive(Debug, Clone, Default)]
pub struct BorderAttrs {
    pub top: Option<BorderEdge>,
    pub bottom: Option<BorderEdge>,
    pub left: Option<BorderEdge>,
    pub right: Option<BorderEdge>,
}

/// One border edge: a style keyword ("thin", "medium", ...) and a color.
#[derive(Debug, Clone, Default)]
pub struct BorderEdge {
    pub style: Option<String>,
    pub color: Option<ColorRef>,
}

impl BorderEdge {
    pub fn new(style: impl Into<String>) -> Self {
        Self {
            style: Some(style.into()),
            color: None,
        }
    }
}

/// Alignment keywords as the loader found them.
#[derive(Debug, Clone, Default)]
pub struct AlignmentAttrs {
    pub horizontal: Option<String>,
    pub vertical: Option<String>,
}

/// A color reference in one of the source encodings.
///
/// `Rgb` holds a bare 6-char RGB or 8-char ARGB hex string. Indexed and theme
/// references cannot be resolved without a palette, so the style resolver
/// treats them as "no explicit color".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorRef {
    Rgb(String),
    Indexed(u32),
    Theme(u32),
}

/// A merged region. The anchor is (`min_row`, `min_col`); every other member
/// cell is suppressed from output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRange {
    pub min_row: u32,
    pub max_row: u32,
    pub min_col: u32,
    pub max_col: u32,
}

impl MergeRange {
    pub fn new(min_row: u32, max_row: u32, min_col: u32, max_col: u32) -> Self {
        Self {
            min_row,
            max_row,
            min_col,
            max_col,
        }
    }

    pub fn col_span(&self) -> u32 {
        self.max_col - self.min_col + 1
    }

    pub fn row_span(&self) -> u32 {
        self.max_row - self.min_row + 1
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        (self.min_row..=self.max_row).contains(&row) && (self.min_col..=self.max_col).contains(&col)
    }
}

/// Anchor point of a shape: a 0-based cell plus an EMU offset into that cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShapeAnchor {
    pub col: u32,
    pub row: u32,
    pub col_offset_emu: i64,
    pub row_offset_emu: i64,
}

impl ShapeAnchor {
    pub fn at(col: u32, row: u32) -> Self {
        Self {
            col,
            row,
            col_offset_emu: 0,
            row_offset_emu: 0,
        }
    }
}

/// A floating image with its binary payload and declared pixel size.
#[derive(Debug, Clone)]
pub struct ImageShape {
    pub name: String,
    pub data: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
    pub anchor: ShapeAnchor,
}

impl ImageShape {
    /// Sniff the payload format from magic bytes. Unrecognized payloads
    /// default to png.
    pub fn format(&self) -> &'static str {
        if self.data.starts_with(b"\x89PNG") {
            "png"
        } else if self.data.starts_with(b"\xff\xd8") {
            "jpeg"
        } else if self.data.starts_with(b"GIF") {
            "gif"
        } else if self.data.starts_with(b"BM") {
            "bmp"
        } else {
            "png"
        }
    }
}

/// A chart placeholder: charts are not re-plotted, only labeled and placed.
#[derive(Debug, Clone)]
pub struct ChartShape {
    pub name: String,
    /// Chart-kind label, e.g. "BarChart".
    pub kind: String,
    pub anchor: ShapeAnchor,
    pub to: ShapeAnchor,
}

/// A drawn shape or textbox: text content plus its own style record.
#[derive(Debug, Clone)]
pub struct DrawnShape {
    pub text: String,
    pub style: ShapeStyle,
    pub anchor: ShapeAnchor,
    pub to: ShapeAnchor,
}

/// Visual style of a drawn shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeStyle {
    pub fill_color: String,
    pub border_color: String,
    pub border_width_px: u32,
    pub font_size_pt: f64,
    pub font_color: String,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            fill_color: "#FFFFFF".to_string(),
            border_color: "#000000".to_string(),
            border_width_px: 1,
            font_size_pt: 11.0,
            font_color: "#000000".to_string(),
        }
    }
}

/// Stand-in for a picture whose payload could not be recovered.
#[derive(Debug, Clone)]
pub struct PlaceholderImage {
    pub name: String,
    pub width_px: u32,
    pub height_px: u32,
    pub anchor: ShapeAnchor,
}

/// A floating object on a sheet. Variants share the positioning contract via
/// [`Shape::anchor`]; rendering dispatches on the variant.
#[derive(Debug, Clone)]
pub enum Shape {
    Image(ImageShape),
    Chart(ChartShape),
    Generic(DrawnShape),
    TextBox(DrawnShape),
    Placeholder(PlaceholderImage),
}

impl Shape {
    pub fn anchor(&self) -> &ShapeAnchor {
        match self {
            Shape::Image(s) => &s.anchor,
            Shape::Chart(s) => &s.anchor,
            Shape::Generic(s) => &s.anchor,
            Shape::TextBox(s) => &s.anchor,
            Shape::Placeholder(s) => &s.anchor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_range_spans() {
        let range = MergeRange::new(1, 2, 1, 3);
        assert_eq!(range.row_span(), 2);
        assert_eq!(range.col_span(), 3);
        assert!(range.contains(2, 3));
        assert!(!range.contains(3, 1));
    }

    #[test]
    fn test_image_format_sniffing() {
        let png = ImageShape {
            name: "a".into(),
            data: b"\x89PNG\r\n".to_vec(),
            width_px: 1,
            height_px: 1,
            anchor: ShapeAnchor::default(),
        };
        assert_eq!(png.format(), "png");

        let jpeg = ImageShape {
            data: b"\xff\xd8\xff\xe0".to_vec(),
            ..png.clone()
        };
        assert_eq!(jpeg.format(), "jpeg");

        let gif = ImageShape {
            data: b"GIF89a".to_vec(),
            ..png.clone()
        };
        assert_eq!(gif.format(), "gif");

        let unknown = ImageShape {
            data: b"????".to_vec(),
            ..png
        };
        assert_eq!(unknown.format(), "png");
    }

    #[test]
    fn test_sheet_cell_accessors() {
        let mut sheet = Sheet::new("S", 2, 2);
        sheet.set_cell(1, 1, Cell::new(CellValue::Text("x".into())));
        assert!(sheet.cell(1, 1).is_some());
        assert!(sheet.cell(2, 2).is_none());
    }
}
