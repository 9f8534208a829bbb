//! Finds floating shapes on a sheet and computes their absolute pixel
//! bounding boxes against the resolved column/row grid.
//!
//! Discovery runs in tiers, each attempted only when the previous one found
//! nothing: the structured image/chart listing, then a scan of the sheet's
//! raw drawing XML, then a best-effort sweep of the underlying package for
//! drawing parts. The deepest tier emits placeholders for picture references
//! whose payload cannot be recovered rather than dropping them silently.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;

use crate::dimensions::PixelGrid;
use crate::error::RenderError;
use crate::model::{
    DrawnShape, PlaceholderImage, Shape, ShapeAnchor, ShapeStyle, Sheet,
};
use crate::render::{RenderWarning, WarningCode};
use crate::units::{SHAPE_MIN_PX, TEXT_SHAPE_MIN_PX, emu_to_px};

/// Declared pixel size of a placeholder for an unrecoverable picture.
const PLACEHOLDER_W_PX: u32 = 100;
const PLACEHOLDER_H_PX: u32 = 50;

/// Absolute pixel bounding box of a placed shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// A discovered shape with its resolved pixel bounds.
#[derive(Debug, Clone)]
pub struct PlacedShape {
    pub shape: Shape,
    pub bounds: ShapeBox,
}

/// Discover the sheet's shapes and place them against the pixel grid.
///
/// Returned in discovery order; the renderer stacks later shapes on top.
pub fn locate_shapes(
    sheet: &Sheet,
    package: Option<&[u8]>,
    grid: &PixelGrid,
    warnings: &mut Vec<RenderWarning>,
) -> Vec<PlacedShape> {
    discover(sheet, package, warnings)
        .into_iter()
        .map(|shape| place(shape, grid))
        .collect()
}

fn discover(sheet: &Sheet, package: Option<&[u8]>, warnings: &mut Vec<RenderWarning>) -> Vec<Shape> {
    // Tier 1: the structured listing the loader already extracted.
    let mut shapes: Vec<Shape> = Vec::new();
    shapes.extend(sheet.images.iter().cloned().map(Shape::Image));
    shapes.extend(sheet.charts.iter().cloned().map(Shape::Chart));
    if !shapes.is_empty() {
        return shapes;
    }

    // Tier 2: scan the sheet's raw drawing payload for shapes and textboxes.
    if let Some(xml) = &sheet.drawing_xml {
        let scanned = scan_drawing_xml(xml, false, &sheet.name, warnings);
        if !scanned.is_empty() {
            return scanned;
        }
    }

    // Tier 3: deep scan of the source package.
    if let Some(package) = package {
        return deep_package_scan(package, &sheet.name, warnings);
    }

    Vec::new()
}

fn place(shape: Shape, grid: &PixelGrid) -> PlacedShape {
    let (left, top) = anchor_px(shape.anchor(), grid);
    let (width, height) = match &shape {
        // Point-anchored: the declared size is authoritative.
        Shape::Image(img) => (img.width_px as f64, img.height_px as f64),
        Shape::Placeholder(p) => (p.width_px as f64, p.height_px as f64),
        // Extent-anchored: pixel delta between the two corners, floored so
        // degenerate shapes stay visible.
        Shape::Chart(c) => extent_size(&c.anchor, &c.to, grid, SHAPE_MIN_PX),
        Shape::Generic(s) => {
            let min = if s.text.is_empty() {
                SHAPE_MIN_PX
            } else {
                TEXT_SHAPE_MIN_PX
            };
            extent_size(&s.anchor, &s.to, grid, min)
        }
        Shape::TextBox(s) => extent_size(&s.anchor, &s.to, grid, TEXT_SHAPE_MIN_PX),
    };
    PlacedShape {
        shape,
        bounds: ShapeBox {
            left,
            top,
            width,
            height,
        },
    }
}

fn anchor_px(anchor: &ShapeAnchor, grid: &PixelGrid) -> (f64, f64) {
    (
        grid.col_left(anchor.col as usize) + emu_to_px(anchor.col_offset_emu),
        grid.row_top(anchor.row as usize) + emu_to_px(anchor.row_offset_emu),
    )
}

fn extent_size(from: &ShapeAnchor, to: &ShapeAnchor, grid: &PixelGrid, min: f64) -> (f64, f64) {
    let (left, top) = anchor_px(from, grid);
    let (right, bottom) = anchor_px(to, grid);
    ((right - left).max(min), (bottom - top).max(min))
}

// ---- Drawing XML scanning (tiers 2 and 3) ----

/// One anchor pair being assembled while walking the XML.
#[derive(Debug, Default)]
struct AnchorCapture {
    from: ShapeAnchor,
    to: Option<ShapeAnchor>,
}

/// Which anchor corner a `col`/`row`/`colOff`/`rowOff` leaf belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Corner {
    From,
    To,
}

/// Scan a drawing part for shape (`sp`) and picture (`pic`) elements.
///
/// Shapes yield [`Shape::Generic`] or [`Shape::TextBox`] with anchors, text
/// runs, and a best-effort style record. Pictures yield placeholders only
/// when `placeholder_pics` is set (the deep-scan tier); the sheet-payload
/// tier leaves them to the structured listing.
fn scan_drawing_xml(
    xml: &str,
    placeholder_pics: bool,
    sheet: &str,
    warnings: &mut Vec<RenderWarning>,
) -> Vec<Shape> {
    let mut reader = Reader::from_str(xml);
    let mut shapes: Vec<Shape> = Vec::new();

    let mut anchor = AnchorCapture::default();
    let mut corner: Option<Corner> = None;
    let mut coord_field: Option<String> = None;

    let mut in_sp = false;
    let mut sp_is_textbox = false;
    let mut sp_text = String::new();
    let mut sp_style = ShapeStyle::default();
    let mut fill_seen = false;
    let mut in_ln = false;
    let mut in_def_rpr = false;
    let mut in_text = false;

    let mut in_pic = false;
    let mut pic_name: Option<String> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                warnings.push(RenderWarning {
                    code: WarningCode::MalformedSegment,
                    message: format!("malformed drawing XML: {e}"),
                    location: Some(sheet.to_string()),
                });
                break;
            }
        };

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let local = e.local_name();
                let local = std::str::from_utf8(local.as_ref()).unwrap_or("");
                let is_empty_elem = matches!(&event, Event::Empty(_));

                match local {
                    "twoCellAnchor" | "oneCellAnchor" | "absoluteAnchor" => {
                        anchor = AnchorCapture::default();
                    }
                    "from" => corner = Some(Corner::From),
                    "to" => {
                        corner = Some(Corner::To);
                        anchor.to.get_or_insert_with(ShapeAnchor::default);
                    }
                    "col" | "row" | "colOff" | "rowOff" if corner.is_some() => {
                        coord_field = Some(local.to_string());
                    }
                    "sp" => {
                        in_sp = true;
                        sp_is_textbox = false;
                        sp_text.clear();
                        sp_style = ShapeStyle::default();
                        fill_seen = false;
                    }
                    "cNvSpPr" if in_sp => {
                        if attr_value(e, "txBox").as_deref() == Some("1") {
                            sp_is_textbox = true;
                        }
                    }
                    "ln" if in_sp => {
                        if let Some(w) = attr_value(e, "w").and_then(|w| w.parse::<i64>().ok()) {
                            sp_style.border_width_px = emu_to_px(w).round().max(1.0) as u32;
                        }
                        if !is_empty_elem {
                            in_ln = true;
                        }
                    }
                    "defRPr" if in_sp => {
                        if let Some(sz) = attr_value(e, "sz").and_then(|s| s.parse::<f64>().ok()) {
                            // Font size arrives in hundredths of a point.
                            sp_style.font_size_pt = sz / 100.0;
                        }
                        if !is_empty_elem {
                            in_def_rpr = true;
                        }
                    }
                    "srgbClr" if in_sp => {
                        if let Some(val) = attr_value(e, "val") {
                            let hex = format!("#{val}");
                            if in_def_rpr {
                                sp_style.font_color = hex;
                            } else if in_ln {
                                sp_style.border_color = hex;
                            } else if !fill_seen {
                                sp_style.fill_color = hex;
                                fill_seen = true;
                            }
                        }
                    }
                    "t" if in_sp => {
                        if !is_empty_elem {
                            in_text = true;
                        }
                    }
                    "pic" => {
                        in_pic = true;
                        pic_name = None;
                    }
                    "cNvPr" if in_pic => {
                        pic_name = attr_value(e, "name");
                    }
                    _ => {}
                }
            }
            Event::Text(ref t) => {
                let text = t.unescape().map(|c| c.into_owned()).unwrap_or_default();
                if in_text {
                    sp_text.push_str(&text);
                } else if let (Some(corner), Some(field)) = (corner, coord_field.as_deref()) {
                    if let Ok(n) = text.trim().parse::<i64>() {
                        let target = match corner {
                            Corner::From => &mut anchor.from,
                            Corner::To => anchor.to.get_or_insert_with(ShapeAnchor::default),
                        };
                        match field {
                            "col" => target.col = n.max(0) as u32,
                            "row" => target.row = n.max(0) as u32,
                            "colOff" => target.col_offset_emu = n,
                            "rowOff" => target.row_offset_emu = n,
                            _ => {}
                        }
                    }
                }
            }
            Event::End(ref e) => {
                let local = e.local_name();
                let local = std::str::from_utf8(local.as_ref()).unwrap_or("");
                match local {
                    "from" | "to" => corner = None,
                    "col" | "row" | "colOff" | "rowOff" => coord_field = None,
                    "ln" => in_ln = false,
                    "defRPr" => in_def_rpr = false,
                    "t" => in_text = false,
                    "sp" => {
                        let from = anchor.from;
                        let to = anchor.to.unwrap_or(ShapeAnchor {
                            col: from.col + 2,
                            row: from.row + 2,
                            col_offset_emu: 0,
                            row_offset_emu: 0,
                        });
                        let drawn = DrawnShape {
                            text: sp_text.trim().to_string(),
                            style: sp_style.clone(),
                            anchor: from,
                            to,
                        };
                        shapes.push(if sp_is_textbox {
                            Shape::TextBox(drawn)
                        } else {
                            Shape::Generic(drawn)
                        });
                        in_sp = false;
                    }
                    "pic" => {
                        if placeholder_pics {
                            shapes.push(Shape::Placeholder(PlaceholderImage {
                                name: pic_name.take().unwrap_or_else(|| "Picture".to_string()),
                                width_px: PLACEHOLDER_W_PX,
                                height_px: PLACEHOLDER_H_PX,
                                anchor: anchor.from,
                            }));
                        }
                        in_pic = false;
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    shapes
}

fn attr_value(e: &quick_xml::events::BytesStart<'_>, name: &str) -> Option<String> {
    for attr in e.attributes().flatten() {
        let local = attr.key.local_name();
        if std::str::from_utf8(local.as_ref()).unwrap_or("") == name {
            return Some(String::from_utf8_lossy(&attr.value).to_string());
        }
    }
    None
}

// ---- Deep package scan (tier 3) ----

/// A resolved relationship entry from a .rels file.
#[derive(Debug, Clone)]
struct Relationship {
    target: String,
    rel_type: String,
}

/// Parse a .rels XML file into a relationship ID map.
fn parse_relationships(xml: &str) -> HashMap<String, Relationship> {
    let mut rels = HashMap::new();
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let local = e.local_name();
                if std::str::from_utf8(local.as_ref()).unwrap_or("") == "Relationship" {
                    let mut id = None;
                    let mut target = None;
                    let mut rel_type = String::new();
                    for attr in e.attributes().flatten() {
                        let key = std::str::from_utf8(attr.key.as_ref()).unwrap_or("");
                        let val = String::from_utf8_lossy(&attr.value).to_string();
                        match key {
                            "Id" => id = Some(val),
                            "Target" => target = Some(val),
                            "Type" => rel_type = val,
                            _ => {}
                        }
                    }
                    if let (Some(id), Some(target)) = (id, target) {
                        rels.insert(id, Relationship { target, rel_type });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }

    rels
}

/// Derive the part path a .rels file describes.
///
/// Example: `xl/worksheets/_rels/sheet1.xml.rels` -> `xl/worksheets/sheet1.xml`
fn part_path_for_rels(rels_path: &str) -> Option<String> {
    let stem = rels_path.strip_suffix(".rels")?;
    let (dir, filename) = stem.rsplit_once('/')?;
    let dir = dir.strip_suffix("/_rels").or_else(|| (dir == "_rels").then_some(""))?;
    if dir.is_empty() {
        Some(filename.to_string())
    } else {
        Some(format!("{dir}/{filename}"))
    }
}

/// Resolve a relative relationship target against its base part path.
///
/// Example: base=`xl/worksheets/sheet1.xml`, target=`../drawings/drawing1.xml`
///          -> `xl/drawings/drawing1.xml`
fn resolve_relative_path(base: &str, target: &str) -> String {
    if !target.starts_with("../") {
        if let Some(pos) = base.rfind('/') {
            return format!("{}/{target}", &base[..pos]);
        }
        return target.to_string();
    }

    let mut base_parts: Vec<&str> = base.split('/').collect();
    base_parts.pop();

    let mut remaining = target;
    while let Some(rest) = remaining.strip_prefix("../") {
        base_parts.pop();
        remaining = rest;
    }

    if base_parts.is_empty() {
        remaining.to_string()
    } else {
        format!("{}/{remaining}", base_parts.join("/"))
    }
}

/// Read a UTF-8 text file from a ZIP archive, returning None if not found.
fn read_zip_text(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    path: &str,
) -> Result<Option<String>, RenderError> {
    let mut file = match archive.by_name(path) {
        Ok(f) => f,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(RenderError::ZipError(e)),
    };
    let mut buf = String::new();
    file.read_to_string(&mut buf)?;
    Ok(Some(buf))
}

/// Best-effort sweep of the raw package for drawing parts.
///
/// Worksheet relationship files point at the drawing parts; when none are
/// found the drawings directory itself is swept. Failures here degrade to
/// warnings; a broken package never aborts the conversion.
fn deep_package_scan(package: &[u8], sheet: &str, warnings: &mut Vec<RenderWarning>) -> Vec<Shape> {
    let mut archive = match ZipArchive::new(Cursor::new(package)) {
        Ok(archive) => archive,
        Err(e) => {
            warnings.push(RenderWarning {
                code: WarningCode::MalformedSegment,
                message: format!("source package is not readable: {e}"),
                location: Some(sheet.to_string()),
            });
            return Vec::new();
        }
    };

    let names: Vec<String> = archive.file_names().map(String::from).collect();

    let mut drawing_parts: Vec<String> = Vec::new();
    for rels_path in names
        .iter()
        .filter(|n| n.starts_with("xl/worksheets/_rels/") && n.ends_with(".rels"))
    {
        let Ok(Some(xml)) = read_zip_text(&mut archive, rels_path) else {
            continue;
        };
        let Some(base) = part_path_for_rels(rels_path) else {
            continue;
        };
        for rel in parse_relationships(&xml).values() {
            if rel.rel_type.ends_with("/drawing") {
                drawing_parts.push(resolve_relative_path(&base, &rel.target));
            }
        }
    }

    if drawing_parts.is_empty() {
        drawing_parts = names
            .iter()
            .filter(|n| n.starts_with("xl/drawings/") && n.ends_with(".xml") && !n.contains("/_rels/"))
            .cloned()
            .collect();
    }
    drawing_parts.sort();
    drawing_parts.dedup();

    let mut shapes = Vec::new();
    for part in &drawing_parts {
        match read_zip_text(&mut archive, part) {
            Ok(Some(xml)) => shapes.extend(scan_drawing_xml(&xml, true, sheet, warnings)),
            Ok(None) => {}
            Err(e) => warnings.push(RenderWarning {
                code: WarningCode::MalformedSegment,
                message: format!("failed to read drawing part '{part}': {e}"),
                location: Some(sheet.to_string()),
            }),
        }
    }
    shapes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChartShape, ImageShape};

    const XDR: &str = "http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing";
    const A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

    fn grid() -> PixelGrid {
        PixelGrid {
            col_widths: vec![50, 60, 70],
            row_heights: vec![25, 25, 25],
        }
    }

    fn drawing_with_sp(body: &str) -> String {
        format!(
            r#"<xdr:wsDr xmlns:xdr="{XDR}" xmlns:a="{A}">{body}</xdr:wsDr>"#
        )
    }

    fn two_cell_sp(extra: &str, text: &str) -> String {
        format!(
            "<xdr:twoCellAnchor>\
             <xdr:from><xdr:col>1</xdr:col><xdr:colOff>0</xdr:colOff>\
             <xdr:row>0</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from>\
             <xdr:to><xdr:col>2</xdr:col><xdr:colOff>0</xdr:colOff>\
             <xdr:row>2</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:to>\
             <xdr:sp><xdr:nvSpPr><xdr:cNvPr id=\"1\" name=\"Shape 1\"/>{extra}</xdr:nvSpPr>\
             <xdr:spPr></xdr:spPr>\
             <xdr:txBody><a:p><a:r><a:t>{text}</a:t></a:r></a:p></xdr:txBody>\
             </xdr:sp></xdr:twoCellAnchor>"
        )
    }

    // -- Positioning --

    #[test]
    fn test_left_is_prefix_sum_plus_offset_for_every_variant() {
        let anchor = ShapeAnchor::at(2, 0);
        let g = grid();

        let image = Shape::Image(ImageShape {
            name: "i".into(),
            data: vec![],
            width_px: 30,
            height_px: 20,
            anchor,
        });
        let chart = Shape::Chart(ChartShape {
            name: "c".into(),
            kind: "BarChart".into(),
            anchor,
            to: ShapeAnchor::at(3, 2),
        });
        let placeholder = Shape::Placeholder(PlaceholderImage {
            name: "p".into(),
            width_px: 100,
            height_px: 50,
            anchor,
        });

        for shape in [image, chart, placeholder] {
            let placed = place(shape, &g);
            assert_eq!(placed.bounds.left, 110.0);
            assert_eq!(placed.bounds.top, 0.0);
        }
    }

    #[test]
    fn test_emu_offset_added_to_anchor() {
        let anchor = ShapeAnchor {
            col: 1,
            row: 1,
            col_offset_emu: 914_400,
            row_offset_emu: 457_200,
        };
        let (left, top) = anchor_px(&anchor, &grid());
        assert_eq!(left, 50.0 + 96.0);
        assert_eq!(top, 25.0 + 48.0);
    }

    #[test]
    fn test_anchor_past_grid_edge_clamps() {
        let (left, top) = anchor_px(&ShapeAnchor::at(10, 10), &grid());
        assert_eq!(left, 180.0);
        assert_eq!(top, 75.0);
    }

    #[test]
    fn test_extent_size_minimum_enforced() {
        // Both corners identical: degenerate extent.
        let from = ShapeAnchor::at(1, 1);
        let (w, h) = extent_size(&from, &from, &grid(), SHAPE_MIN_PX);
        assert_eq!((w, h), (SHAPE_MIN_PX, SHAPE_MIN_PX));
    }

    #[test]
    fn test_text_bearing_shape_has_larger_minimum() {
        let g = grid();
        let from = ShapeAnchor::at(0, 0);
        let drawn = DrawnShape {
            text: "label".into(),
            style: ShapeStyle::default(),
            anchor: from,
            to: from,
        };
        let placed = place(Shape::TextBox(drawn.clone()), &g);
        assert_eq!(placed.bounds.width, TEXT_SHAPE_MIN_PX);

        let empty = DrawnShape {
            text: String::new(),
            ..drawn
        };
        let placed = place(Shape::Generic(empty), &g);
        assert_eq!(placed.bounds.width, SHAPE_MIN_PX);
    }

    #[test]
    fn test_image_uses_declared_size() {
        let placed = place(
            Shape::Image(ImageShape {
                name: "i".into(),
                data: vec![],
                width_px: 123,
                height_px: 45,
                anchor: ShapeAnchor::at(0, 0),
            }),
            &grid(),
        );
        assert_eq!(placed.bounds.width, 123.0);
        assert_eq!(placed.bounds.height, 45.0);
    }

    // -- Drawing XML scanning --

    #[test]
    fn test_scan_finds_generic_shape_with_anchor_and_text() {
        let xml = drawing_with_sp(&two_cell_sp("", "hello"));
        let mut warnings = Vec::new();
        let shapes = scan_drawing_xml(&xml, false, "S", &mut warnings);
        assert_eq!(shapes.len(), 1);
        let Shape::Generic(shape) = &shapes[0] else {
            panic!("expected a generic shape");
        };
        assert_eq!(shape.text, "hello");
        assert_eq!(shape.anchor, ShapeAnchor::at(1, 0));
        assert_eq!(shape.to, ShapeAnchor::at(2, 2));
    }

    #[test]
    fn test_scan_textbox_flag() {
        let xml = drawing_with_sp(&two_cell_sp("<xdr:cNvSpPr txBox=\"1\"/>", "note"));
        let mut warnings = Vec::new();
        let shapes = scan_drawing_xml(&xml, false, "S", &mut warnings);
        assert_eq!(shapes.len(), 1);
        assert!(matches!(&shapes[0], Shape::TextBox(s) if s.text == "note"));
    }

    #[test]
    fn test_scan_extracts_shape_style() {
        let body = String::from(
            "<xdr:twoCellAnchor>\
             <xdr:from><xdr:col>0</xdr:col><xdr:colOff>0</xdr:colOff>\
             <xdr:row>0</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from>\
             <xdr:to><xdr:col>1</xdr:col><xdr:colOff>0</xdr:colOff>\
             <xdr:row>1</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:to>\
             <xdr:sp><xdr:spPr>\
             <a:solidFill><a:srgbClr val=\"AABBCC\"/></a:solidFill>\
             <a:ln w=\"19050\"><a:solidFill><a:srgbClr val=\"112233\"/></a:solidFill></a:ln>\
             </xdr:spPr>\
             <xdr:txBody><a:p><a:pPr><a:defRPr sz=\"1400\">\
             <a:solidFill><a:srgbClr val=\"445566\"/></a:solidFill>\
             </a:defRPr></a:pPr><a:r><a:t>styled</a:t></a:r></a:p></xdr:txBody>\
             </xdr:sp></xdr:twoCellAnchor>",
        );
        let xml = drawing_with_sp(&body);
        let mut warnings = Vec::new();
        let shapes = scan_drawing_xml(&xml, false, "S", &mut warnings);
        let Shape::Generic(shape) = &shapes[0] else {
            panic!("expected a generic shape");
        };
        assert_eq!(shape.style.fill_color, "#AABBCC");
        assert_eq!(shape.style.border_color, "#112233");
        // 19050 EMU = 1/48 inch = 2px
        assert_eq!(shape.style.border_width_px, 2);
        assert_eq!(shape.style.font_size_pt, 14.0);
        assert_eq!(shape.style.font_color, "#445566");
    }

    #[test]
    fn test_scan_pic_ignored_without_placeholder_flag() {
        let body = "<xdr:twoCellAnchor>\
                    <xdr:from><xdr:col>0</xdr:col><xdr:colOff>0</xdr:colOff>\
                    <xdr:row>0</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from>\
                    <xdr:pic><xdr:nvPicPr><xdr:cNvPr id=\"2\" name=\"Logo\"/></xdr:nvPicPr></xdr:pic>\
                    </xdr:twoCellAnchor>";
        let xml = drawing_with_sp(body);
        let mut warnings = Vec::new();
        assert!(scan_drawing_xml(&xml, false, "S", &mut warnings).is_empty());

        let shapes = scan_drawing_xml(&xml, true, "S", &mut warnings);
        assert_eq!(shapes.len(), 1);
        let Shape::Placeholder(p) = &shapes[0] else {
            panic!("expected a placeholder");
        };
        assert_eq!(p.name, "Logo");
        assert_eq!((p.width_px, p.height_px), (PLACEHOLDER_W_PX, PLACEHOLDER_H_PX));
    }

    #[test]
    fn test_scan_malformed_xml_records_warning() {
        let mut warnings = Vec::new();
        let shapes = scan_drawing_xml("<xdr:wsDr><broken", false, "S", &mut warnings);
        assert!(shapes.is_empty());
        assert!(!warnings.is_empty());
        assert_eq!(warnings[0].code, WarningCode::MalformedSegment);
    }

    // -- Tier ordering --

    #[test]
    fn test_structured_listing_short_circuits_drawing_scan() {
        let mut sheet = Sheet::new("S", 3, 3);
        sheet.images.push(ImageShape {
            name: "img".into(),
            data: vec![],
            width_px: 10,
            height_px: 10,
            anchor: ShapeAnchor::at(0, 0),
        });
        sheet.drawing_xml = Some(drawing_with_sp(&two_cell_sp("", "ignored")));
        let mut warnings = Vec::new();
        let shapes = discover(&sheet, None, &mut warnings);
        assert_eq!(shapes.len(), 1);
        assert!(matches!(shapes[0], Shape::Image(_)));
    }

    #[test]
    fn test_drawing_scan_used_when_no_structured_shapes() {
        let mut sheet = Sheet::new("S", 3, 3);
        sheet.drawing_xml = Some(drawing_with_sp(&two_cell_sp("", "from xml")));
        let mut warnings = Vec::new();
        let shapes = discover(&sheet, None, &mut warnings);
        assert_eq!(shapes.len(), 1);
        assert!(matches!(&shapes[0], Shape::Generic(s) if s.text == "from xml"));
    }

    #[test]
    fn test_no_sources_yields_no_shapes() {
        let sheet = Sheet::new("S", 3, 3);
        let mut warnings = Vec::new();
        assert!(discover(&sheet, None, &mut warnings).is_empty());
    }

    // -- Path helpers --

    #[test]
    fn test_part_path_for_rels() {
        assert_eq!(
            part_path_for_rels("xl/worksheets/_rels/sheet1.xml.rels").as_deref(),
            Some("xl/worksheets/sheet1.xml")
        );
        assert!(part_path_for_rels("xl/worksheets/sheet1.xml").is_none());
    }

    #[test]
    fn test_resolve_relative_path() {
        assert_eq!(
            resolve_relative_path("xl/worksheets/sheet1.xml", "../drawings/drawing1.xml"),
            "xl/drawings/drawing1.xml"
        );
        assert_eq!(
            resolve_relative_path("xl/workbook.xml", "worksheets/sheet1.xml"),
            "xl/worksheets/sheet1.xml"
        );
    }

    // -- Deep package scan --

    fn build_package(entries: &[(&str, &str)]) -> Vec<u8> {
        use std::io::Write;
        use zip::ZipWriter;
        use zip::write::SimpleFileOptions;

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let opts = SimpleFileOptions::default();
        for (path, content) in entries {
            zip.start_file(path.to_string(), opts).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_deep_scan_follows_worksheet_rels() {
        let rels = format!(
            "<?xml version=\"1.0\"?>\
             <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
             <Relationship Id=\"rId1\" \
             Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing\" \
             Target=\"../drawings/drawing1.xml\"/>\
             </Relationships>"
        );
        let drawing = drawing_with_sp(&two_cell_sp("", "deep"));
        let package = build_package(&[
            ("xl/worksheets/_rels/sheet1.xml.rels", rels.as_str()),
            ("xl/drawings/drawing1.xml", drawing.as_str()),
        ]);
        let mut warnings = Vec::new();
        let shapes = deep_package_scan(&package, "S", &mut warnings);
        assert_eq!(shapes.len(), 1);
        assert!(matches!(&shapes[0], Shape::Generic(s) if s.text == "deep"));
    }

    #[test]
    fn test_deep_scan_sweeps_drawings_dir_without_rels() {
        let drawing = drawing_with_sp(&two_cell_sp("", "swept"));
        let package = build_package(&[("xl/drawings/drawing1.xml", drawing.as_str())]);
        let mut warnings = Vec::new();
        let shapes = deep_package_scan(&package, "S", &mut warnings);
        assert_eq!(shapes.len(), 1);
    }

    #[test]
    fn test_deep_scan_unreadable_package_warns() {
        let mut warnings = Vec::new();
        let shapes = deep_package_scan(b"not a zip archive", "S", &mut warnings);
        assert!(shapes.is_empty());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, WarningCode::MalformedSegment);
    }
}
