pub mod dimensions;
pub mod error;
pub mod merges;
pub mod model;
pub mod render;
pub mod shapes;
pub mod style;
pub mod units;
pub mod values;

mod html;

pub use error::RenderError;
pub use model::{
    AlignmentAttrs, BorderAttrs, BorderEdge, Cell, CellStyle, CellValue, ChartShape, ColorRef,
    DrawnShape, FillAttrs, FontAttrs, ImageShape, MergeRange, PlaceholderImage, Shape,
    ShapeAnchor, ShapeStyle, Sheet, Workbook,
};
pub use render::{RenderOptions, RenderResult, RenderWarning, WarningCode, render_workbook};
pub use values::{ComputedValues, Scalar};

use std::path::Path;

/// Render a workbook and write the HTML document to the given path.
///
/// Convenience wrapper around [`render_workbook`] for callers that want a
/// file as the output destination.
pub fn render_to_file(
    workbook: &Workbook,
    computed: &ComputedValues,
    options: &RenderOptions,
    path: impl AsRef<Path>,
) -> Result<RenderResult, RenderError> {
    let result = render_workbook(workbook, computed, options)?;
    std::fs::write(path, &result.html)?;
    Ok(result)
}
