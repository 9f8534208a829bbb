//! Decides what text a cell displays: a literal, a pre-computed formula
//! result, or a formula-text placeholder.
//!
//! Formula results come from an external evaluator (typically a spreadsheet
//! engine driven out-of-process) as a table keyed by sheet, row, and column.
//! The evaluator is allowed to fail or be missing entirely; every formula
//! cell without a computed value degrades to a visible placeholder instead of
//! rendering blank.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::error::RenderError;
use crate::model::CellValue;

/// A literal scalar produced by the external evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(f64),
    Bool(bool),
}

/// Computed formula results keyed by (sheet name, row, column), 1-based.
///
/// May be empty: conversion then falls back to formula-text placeholders for
/// every formula cell.
#[derive(Debug, Clone, Default)]
pub struct ComputedValues {
    map: HashMap<(String, u32, u32), Scalar>,
}

impl ComputedValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sheet: impl Into<String>, row: u32, col: u32, value: Scalar) {
        self.map.insert((sheet.into(), row, col), value);
    }

    pub fn get(&self, sheet: &str, row: u32, col: u32) -> Option<&Scalar> {
        self.map.get(&(sheet.to_string(), row, col))
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Parse the evaluator's JSON emission:
    /// `{"Sheet1": {"1,1": 42.0, "2,3": "text"}}` with `"row,col"` keys,
    /// 1-based. Null entries are ignored.
    pub fn from_json_str(json: &str) -> Result<Self, RenderError> {
        let root: serde_json::Value =
            serde_json::from_str(json).map_err(|e| RenderError::MalformedValues {
                reason: format!("invalid JSON: {e}"),
            })?;

        let sheets = root.as_object().ok_or_else(|| RenderError::MalformedValues {
            reason: "expected a top-level object keyed by sheet name".to_string(),
        })?;

        let mut values = Self::new();
        for (sheet, entries) in sheets {
            let entries = entries
                .as_object()
                .ok_or_else(|| RenderError::MalformedValues {
                    reason: format!("sheet '{sheet}' is not an object"),
                })?;
            for (key, value) in entries {
                let (row, col) = parse_coord_key(key).ok_or_else(|| {
                    RenderError::MalformedValues {
                        reason: format!("bad cell key '{key}' in sheet '{sheet}'"),
                    }
                })?;
                let scalar = match value {
                    serde_json::Value::Null => continue,
                    serde_json::Value::Bool(b) => Scalar::Bool(*b),
                    serde_json::Value::Number(n) => {
                        Scalar::Number(n.as_f64().unwrap_or_default())
                    }
                    serde_json::Value::String(s) => Scalar::Text(s.clone()),
                    other => {
                        return Err(RenderError::MalformedValues {
                            reason: format!("non-scalar value for '{sheet}'!{key}: {other}"),
                        });
                    }
                };
                values.insert(sheet.clone(), row, col, scalar);
            }
        }
        Ok(values)
    }
}

/// Parse a `"row,col"` key into 1-based coordinates.
fn parse_coord_key(key: &str) -> Option<(u32, u32)> {
    let (row, col) = key.split_once(',')?;
    let row = row.trim().parse().ok().filter(|r| *r >= 1)?;
    let col = col.trim().parse().ok().filter(|c| *c >= 1)?;
    Some((row, col))
}

/// The display decision for one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedValue {
    pub text: String,
    /// Tagged so the renderer can apply empty-cell presentation.
    pub is_empty: bool,
    /// Tagged so the renderer switches to wrapping presentation.
    pub multiline: bool,
}

impl ResolvedValue {
    fn from_text(text: String) -> Self {
        let is_empty = text.is_empty();
        let multiline = text.contains('\n');
        Self {
            text,
            is_empty,
            multiline,
        }
    }
}

/// Resolve the display text for a cell.
///
/// Formula cells consult the computed-value table; a missing entry yields a
/// placeholder embedding the formula text, never a blank.
pub fn resolve_value(
    sheet: &str,
    row: u32,
    col: u32,
    value: &CellValue,
    computed: &ComputedValues,
) -> ResolvedValue {
    let text = match value {
        CellValue::Formula(formula) => match computed.get(sheet, row, col) {
            Some(scalar) => format_scalar(scalar),
            None => format!("[formula: {formula}]"),
        },
        other => literal_text(other),
    };
    ResolvedValue::from_text(text)
}

/// Display text of a literal value.
///
/// Whole finite floats display as integers (`3.0` -> `"3"`), booleans as
/// `TRUE`/`FALSE`, midnight datetimes as date-only.
pub(crate) fn literal_text(value: &CellValue) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Text(s) => s.clone(),
        CellValue::Number(f) => format_number(*f),
        CellValue::Bool(b) => format_bool(*b),
        CellValue::DateTime(dt) => format_datetime(dt),
        CellValue::Formula(formula) => formula.clone(),
    }
}

/// Text used for content measurement by the dimension planner. Formula cells
/// measure their formula text, matching what a cell without a computed value
/// will roughly occupy.
pub(crate) fn measured_text(value: &CellValue) -> String {
    literal_text(value)
}

pub(crate) fn format_number(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 {
        format!("{f:.0}")
    } else {
        f.to_string()
    }
}

fn format_bool(b: bool) -> String {
    if b { "TRUE".to_string() } else { "FALSE".to_string() }
}

fn format_datetime(dt: &NaiveDateTime) -> String {
    let (h, m, s) = (dt.hour(), dt.minute(), dt.second());
    if h == 0 && m == 0 && s == 0 {
        // Date-only: no time component
        format!("{:04}-{:02}-{:02}", dt.year(), dt.month(), dt.day())
    } else {
        format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            dt.year(),
            dt.month(),
            dt.day(),
            h,
            m,
            s
        )
    }
}

fn format_scalar(scalar: &Scalar) -> String {
    match scalar {
        Scalar::Text(s) => s.clone(),
        Scalar::Number(f) => format_number(*f),
        Scalar::Bool(b) => format_bool(*b),
    }
}
