//! Wire-facing filter pipeline
//!
//! An [`ImageEditMetadata`] record is normalized into a [`FilterPipelineItem`] whose
//! filters always follow the canonical order resize, crop, rotate, brightness,
//! grayscale, flip. Filters left at their inert default are never emitted.

use serde::{Deserialize, Serialize};

use super::edit::{FlipDirection, ImageEditMetadata};

/// Payload of filters that carry no parameters; serializes as `{}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyValue {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "filter_type", content = "filter_value", rename_all = "lowercase")]
pub enum FilterOp {
    Resize {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<i64>,
    },
    Crop {
        top: i64,
        left: i64,
        width: i64,
        height: i64,
    },
    /// Degrees; `None` when the typed value was not a number (left to the backend)
    Rotate(Option<i64>),
    Brightness(i32),
    Grayscale(EmptyValue),
    Flip { direction: FlipDirection },
}

impl FilterOp {
    pub fn filter_type(&self) -> &'static str {
        match self {
            FilterOp::Resize { .. } => "resize",
            FilterOp::Crop { .. } => "crop",
            FilterOp::Rotate(_) => "rotate",
            FilterOp::Brightness(_) => "brightness",
            FilterOp::Grayscale(_) => "grayscale",
            FilterOp::Flip { .. } => "flip",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPipelineItem {
    pub image_name: String,
    pub filters: Vec<FilterOp>,
}

impl From<&ImageEditMetadata> for FilterPipelineItem {
    fn from(meta: &ImageEditMetadata) -> Self {
        let f = &meta.filters;
        let mut filters = Vec::new();

        if f.resize.is_applied() {
            filters.push(FilterOp::Resize {
                width: parse_leading_int(&f.resize.width),
                height: parse_leading_int(&f.resize.height),
            });
        }

        if f.crop.is_applied() {
            filters.push(FilterOp::Crop {
                top: parse_leading_int(&f.crop.top).unwrap_or(0),
                left: parse_leading_int(&f.crop.left).unwrap_or(0),
                width: parse_leading_int(&f.crop.width).unwrap_or(0),
                height: parse_leading_int(&f.crop.height).unwrap_or(0),
            });
        }

        if !f.rotate.is_empty() {
            filters.push(FilterOp::Rotate(parse_leading_int(&f.rotate)));
        }

        if f.brightness.is_applied() {
            filters.push(FilterOp::Brightness(f.brightness.value));
        }

        if f.grayscale {
            filters.push(FilterOp::Grayscale(EmptyValue {}));
        }

        if !f.flip.is_none() {
            filters.push(FilterOp::Flip { direction: f.flip });
        }

        Self {
            image_name: meta.image_name.clone(),
            filters,
        }
    }
}

/// The `metadata` part of an upload submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadDocument {
    pub email: String,
    #[serde(rename = "imagesMetadata")]
    pub images_metadata: Vec<FilterPipelineItem>,
}

impl UploadDocument {
    pub fn new(email: impl Into<String>, metadata: &[ImageEditMetadata]) -> Self {
        Self {
            email: email.into(),
            images_metadata: metadata.iter().map(FilterPipelineItem::from).collect(),
        }
    }
}

/// Lenient integer parsing: leading whitespace is skipped, an optional sign and the
/// leading run of digits are read, anything after them is ignored.
/// Returns `None` when no digit is found or the value does not fit.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
