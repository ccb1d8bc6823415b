use std::collections::HashMap;

use crate::models::{StyleError, StyleOptions};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FormError {
    #[error("field {field} has invalid value {value:?}")]
    Invalid { field: &'static str, value: String },
    #[error(transparent)]
    Style(#[from] StyleError),
}

pub const FIELD_IMAGES: &str = "images";
pub const FIELD_CONFIDENCE: &str = "confidence";
pub const FIELD_SHOW_CONFIDENCE: &str = "show_confidence";
pub const FIELD_LABEL_POSITION: &str = "label_position";
pub const FIELD_BOX_THICKNESS: &str = "box_thickness";
pub const FIELD_FONT_SIZE: &str = "font_size";

fn parse_field<T: std::str::FromStr>(
    fields: &HashMap<String, String>,
    field: &'static str,
    default: T,
) -> Result<T, FormError> {
    match fields.get(field).map(|v| v.trim()) {
        None | Some("") => Ok(default),
        Some(value) => value.parse().map_err(|_| FormError::Invalid { field, value: value.to_string() }),
    }
}

/// Checkbox state: absent, empty or a false-like value means off
fn parse_checkbox(fields: &HashMap<String, String>, field: &'static str) -> Result<bool, FormError> {
    let Some(raw) = fields.get(field) else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Ok(true),
        "" | "off" | "false" | "0" | "no" => Ok(false),
        _ => Err(FormError::Invalid { field, value: raw.clone() }),
    }
}

/// Build style options from submitted form fields.
/// Missing fields take their defaults, except the checkbox: absent means off.
pub fn style_from_fields(fields: &HashMap<String, String>) -> Result<StyleOptions, FormError> {
    let defaults = StyleOptions::default();

    let label_position = match fields.get(FIELD_LABEL_POSITION) {
        Some(value) if !value.trim().is_empty() => value.parse()?,
        _ => defaults.label_position,
    };

    let style = StyleOptions {
        confidence_threshold: parse_field(fields, FIELD_CONFIDENCE, defaults.confidence_threshold)?,
        show_confidence: parse_checkbox(fields, FIELD_SHOW_CONFIDENCE)?,
        label_position,
        box_thickness: parse_field(fields, FIELD_BOX_THICKNESS, defaults.box_thickness)?,
        font_size: parse_field(fields, FIELD_FONT_SIZE, defaults.font_size)?,
    };
    style.validate()?;
    Ok(style)
}
