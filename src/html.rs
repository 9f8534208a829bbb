//! HTML fragments: escaping, document chrome, and grid scaffolding.
//!
//! The embedded stylesheet carries only presentation that is safe to share
//! across every cell (padding, overflow, wrapping classes). Core visual
//! properties always travel inline on each cell so the output never depends
//! on a cascading class alone.

/// Escape text for HTML element content and attribute values.
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Document head and opening body, including the shared stylesheet.
pub(crate) fn document_header(title: &str) -> String {
    let title = escape_html(title);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <style>
        body {{
            font-family: Arial, sans-serif;
            margin: 20px;
            background-color: #f5f5f5;
        }}
        .sheet-container {{
            background-color: white;
            margin-bottom: 30px;
            padding: 20px;
            border-radius: 8px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
        }}
        .sheet-title {{
            font-size: 24px;
            font-weight: bold;
            margin-bottom: 15px;
            color: #333;
            border-bottom: 2px solid #4CAF50;
            padding-bottom: 10px;
        }}
        .sheet-grid {{
            position: relative;
        }}
        table {{
            border-collapse: collapse;
            margin-bottom: 20px;
            table-layout: fixed;
        }}
        td, th {{
            border: 1px solid #ddd;
            padding: 2px 4px;
            min-width: 20px;
            min-height: 20px;
            overflow: hidden;
            word-wrap: break-word;
            box-sizing: border-box;
            white-space: nowrap;
            vertical-align: top;
        }}
        td.multiline {{
            white-space: pre-wrap;
        }}
        .empty-cell {{
            background-color: #FFFFFF;
        }}
        .shape {{
            position: absolute;
            box-sizing: border-box;
            overflow: hidden;
        }}
        .shape-chart {{
            border: 1px solid #808080;
            background-color: #F8F8F8;
            text-align: center;
        }}
        .shape-placeholder {{
            border: 1px dashed #808080;
            background-color: #F0F0F0;
            text-align: center;
        }}
    </style>
</head>
<body>
    <h1>{title}</h1>
"#
    )
}

pub(crate) fn document_footer() -> &'static str {
    "</body>\n</html>"
}

/// Titled sheet section opening: container, title, and the relatively
/// positioned grid wrapper the shape overlays anchor to.
pub(crate) fn sheet_header(sheet_name: &str) -> String {
    format!(
        "    <div class=\"sheet-container\">\n        <div class=\"sheet-title\">{}</div>\n        <div class=\"sheet-grid\">\n",
        escape_html(sheet_name)
    )
}

pub(crate) fn sheet_footer() -> &'static str {
    "        </div>\n    </div>\n"
}

/// Table opening tag with the fixed total pixel width.
///
/// The declared width is the sum of the per-column widths, so the grid's
/// size never depends on the rendering surface's own table sizing.
pub(crate) fn table_open(total_width_px: u32) -> String {
    format!("        <table style=\"width: {total_width_px}px; table-layout: fixed;\">\n")
}

pub(crate) fn table_close() -> &'static str {
    "        </table>\n"
}

/// Explicit per-column pixel widths.
pub(crate) fn colgroup(col_widths_px: &[u32]) -> String {
    let mut out = String::from("            <colgroup>\n");
    for width in col_widths_px {
        out.push_str(&format!(
            "                <col style=\"width: {width}px;\">\n"
        ));
    }
    out.push_str("            </colgroup>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html_special_chars() {
        assert_eq!(escape_html("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }

    #[test]
    fn test_escape_html_plain_text_unchanged() {
        assert_eq!(escape_html("plain text"), "plain text");
        assert_eq!(escape_html(""), "");
    }

    #[test]
    fn test_escape_html_preserves_unicode() {
        assert_eq!(escape_html("日本語"), "日本語");
    }

    #[test]
    fn test_document_header_escapes_title() {
        let header = document_header("a<b");
        assert!(header.contains("<title>a&lt;b</title>"));
        assert!(header.contains("<h1>a&lt;b</h1>"));
    }

    #[test]
    fn test_table_open_carries_total_width() {
        assert!(table_open(180).contains("width: 180px"));
    }

    #[test]
    fn test_colgroup_one_col_per_width() {
        let cg = colgroup(&[50, 60, 70]);
        assert_eq!(cg.matches("<col ").count(), 3);
        assert!(cg.contains("width: 50px"));
        assert!(cg.contains("width: 70px"));
    }

    #[test]
    fn test_sheet_header_escapes_name() {
        assert!(sheet_header("A&B").contains("A&amp;B"));
    }
}
