//! Maps raw cell style attributes to a complete set of visual properties.
//!
//! Every property of the output either carries an explicit value or a
//! documented default; a resolved style is never partially populated. Styles
//! are resolved fresh per cell at render time and never cached, so visually
//! identical cells do not share state.

use crate::model::{BorderEdge, CellStyle, ColorRef, FontAttrs};
use crate::units;
use crate::values::format_number;

/// Default font size in points when the cell declares none.
pub const DEFAULT_FONT_SIZE_PT: f64 = 11.0;

/// Default font stack when the cell declares no font name.
pub const DEFAULT_FONT_FAMILY: &str = "'Calibri', Arial, sans-serif";

/// Default text color.
pub const DEFAULT_FONT_COLOR: &str = "#000000";

/// The flat visual-property record for one cell.
///
/// `font_size_pt`, `font_family`, and `color` always hold usable values;
/// `Option` fields produce no declaration when `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub font_weight: Option<&'static str>,
    pub font_style: Option<&'static str>,
    pub font_size_pt: f64,
    pub font_family: String,
    pub color: String,
    pub text_decoration: Option<&'static str>,
    /// `None` means "inherit the document default"; white is not forced.
    pub background_color: Option<String>,
    pub text_align: Option<&'static str>,
    pub vertical_align: Option<&'static str>,
    pub border_top: Option<String>,
    pub border_bottom: Option<String>,
    pub border_left: Option<String>,
    pub border_right: Option<String>,
}

impl ResolvedStyle {
    /// Render the inline CSS declaration list, optionally led by explicit
    /// author-set cell dimensions (already converted to pixels by the same
    /// unit converter the grid uses).
    pub fn to_css(&self, width_px: Option<u32>, height_px: Option<u32>) -> String {
        let mut decls: Vec<String> = Vec::new();

        if let Some(w) = width_px {
            decls.push(format!("width: {w}px"));
        }
        if let Some(h) = height_px {
            decls.push(format!("height: {h}px"));
        }

        if let Some(weight) = self.font_weight {
            decls.push(format!("font-weight: {weight}"));
        }
        if let Some(style) = self.font_style {
            decls.push(format!("font-style: {style}"));
        }
        decls.push(format!("font-size: {}pt", format_number(self.font_size_pt)));
        decls.push(format!("font-family: {}", self.font_family));
        decls.push(format!("color: {}", self.color));
        if let Some(deco) = self.text_decoration {
            decls.push(format!("text-decoration: {deco}"));
        }
        if let Some(bg) = &self.background_color {
            decls.push(format!("background-color: {bg}"));
        }
        if let Some(align) = self.text_align {
            decls.push(format!("text-align: {align}"));
        }
        if let Some(valign) = self.vertical_align {
            decls.push(format!("vertical-align: {valign}"));
        }
        if let Some(b) = &self.border_top {
            decls.push(format!("border-top: {b}"));
        }
        if let Some(b) = &self.border_bottom {
            decls.push(format!("border-bottom: {b}"));
        }
        if let Some(b) = &self.border_left {
            decls.push(format!("border-left: {b}"));
        }
        if let Some(b) = &self.border_right {
            decls.push(format!("border-right: {b}"));
        }

        decls.join("; ")
    }
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        Self {
            font_weight: None,
            font_style: None,
            font_size_pt: DEFAULT_FONT_SIZE_PT,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            color: DEFAULT_FONT_COLOR.to_string(),
            text_decoration: None,
            background_color: None,
            text_align: None,
            vertical_align: None,
            border_top: None,
            border_bottom: None,
            border_left: None,
            border_right: None,
        }
    }
}

/// Resolve a cell's raw style attributes into a complete visual record.
pub fn resolve_style(style: Option<&CellStyle>) -> ResolvedStyle {
    let mut resolved = ResolvedStyle::default();
    let Some(style) = style else {
        return resolved;
    };

    if let Some(font) = &style.font {
        apply_font(font, &mut resolved);
    }

    if let Some(fill) = &style.fill {
        // First usable color wins: solid start, foreground, background,
        // gradient start. Black doubles as the unset placeholder in the
        // source encoding and is never a usable fill.
        resolved.background_color = [
            &fill.start_color,
            &fill.fg_color,
            &fill.bg_color,
            &fill.gradient_start,
        ]
        .into_iter()
        .flatten()
        .find_map(|color| normalize_color(color).filter(|hex| hex != "#000000"));
    }

    if let Some(alignment) = &style.alignment {
        resolved.text_align = match alignment.horizontal.as_deref() {
            Some("left") => Some("left"),
            Some("center") => Some("center"),
            Some("right") => Some("right"),
            _ => None,
        };
        resolved.vertical_align = match alignment.vertical.as_deref() {
            Some("top") => Some("top"),
            Some("center") => Some("middle"),
            Some("bottom") => Some("bottom"),
            _ => None,
        };
    }

    if let Some(border) = &style.border {
        resolved.border_top = border.top.as_ref().and_then(edge_css);
        resolved.border_bottom = border.bottom.as_ref().and_then(edge_css);
        resolved.border_left = border.left.as_ref().and_then(edge_css);
        resolved.border_right = border.right.as_ref().and_then(edge_css);
    }

    resolved
}

fn apply_font(font: &FontAttrs, resolved: &mut ResolvedStyle) {
    resolved.font_weight = match font.bold {
        Some(true) => Some("bold"),
        Some(false) => Some("normal"),
        None => None,
    };
    resolved.font_style = match font.italic {
        Some(true) => Some("italic"),
        Some(false) => Some("normal"),
        None => None,
    };

    if let Some(size) = font.size
        && size > 0.0
    {
        resolved.font_size_pt = size;
    }

    if let Some(name) = &font.name {
        resolved.font_family = format!("'{name}', Arial, sans-serif");
    }

    if let Some(color) = font.color.as_ref().and_then(normalize_color) {
        resolved.color = color;
    }

    let underline = font
        .underline
        .as_deref()
        .is_some_and(|u| !u.is_empty() && u != "none");
    resolved.text_decoration = match (underline, font.strike) {
        (true, true) => Some("underline line-through"),
        (true, false) => Some("underline"),
        (false, true) => Some("line-through"),
        (false, false) => None,
    };
}

/// Normalize a color reference to a `#RRGGBB` string.
///
/// 8-char ARGB hex drops the alpha prefix; 6-char RGB passes through; indexed
/// and theme references resolve to `None`; a hex value is never guessed for
/// an index. Anything else is treated as unrecognized.
pub fn normalize_color(color: &ColorRef) -> Option<String> {
    let ColorRef::Rgb(raw) = color else {
        return None;
    };
    let hex = raw.trim_start_matches('#');
    let rgb = match hex.len() {
        8 => &hex[2..],
        6 => hex,
        _ => return None,
    };
    if !rgb.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("#{}", rgb.to_ascii_uppercase()))
}

/// CSS for one border edge, or `None` when the edge has no style keyword.
///
/// Unknown keywords degrade to a plain 1px solid line; a missing edge color
/// falls back to black.
fn edge_css(edge: &BorderEdge) -> Option<String> {
    let style = edge.style.as_deref().filter(|s| !s.is_empty())?;
    let color = edge
        .color
        .as_ref()
        .and_then(normalize_color)
        .unwrap_or_else(|| "#000000".to_string());
    let css = match style {
        "thin" | "hair" => format!("1px solid {color}"),
        "medium" => format!("2px solid {color}"),
        "thick" => format!("3px solid {color}"),
        "dashed" => format!("1px dashed {color}"),
        "dotted" => format!("1px dotted {color}"),
        "double" => format!("3px double {color}"),
        _ => format!("1px solid {color}"),
    };
    Some(css)
}

/// Explicit author-set cell dimensions in pixels, for the per-cell style.
///
/// Uses the same converter as the dimension planner so the two can never
/// drift apart. Non-positive stored values count as absent.
pub fn explicit_cell_px(width_units: Option<f64>, height_points: Option<f64>) -> (Option<u32>, Option<u32>) {
    let width = width_units
        .filter(|w| *w > 0.0)
        .map(units::width_units_to_px);
    let height = height_points
        .filter(|h| *h > 0.0)
        .map(units::height_points_to_px);
    (width, height)
}
