//! Per-image edit state
//!
//! Every field keeps the raw text the user typed so that "empty" and "zero" stay
//! distinguishable until serialization. Records are never mutated in place: each
//! update consumes the record and returns the updated copy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const BRIGHTNESS_MIN: i32 = -100;
pub const BRIGHTNESS_MAX: i32 = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeInput {
    pub width: String,
    pub height: String,
}

impl ResizeInput {
    pub fn new(width: impl Into<String>, height: impl Into<String>) -> Self {
        Self {
            width: width.into(),
            height: height.into(),
        }
    }

    pub fn is_applied(&self) -> bool {
        !self.width.is_empty() || !self.height.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropInput {
    pub top: String,
    pub left: String,
    pub width: String,
    pub height: String,
}

impl CropInput {
    pub fn is_applied(&self) -> bool {
        [&self.top, &self.left, &self.width, &self.height]
            .iter()
            .any(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrightnessSetting {
    pub enabled: bool,
    /// Always within [`BRIGHTNESS_MIN`, `BRIGHTNESS_MAX`]; 0 while disabled
    pub value: i32,
}

impl BrightnessSetting {
    pub fn is_applied(&self) -> bool {
        self.enabled && self.value != 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipDirection {
    #[default]
    None,
    Horizontal,
    Vertical,
}

impl FlipDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlipDirection::None => "none",
            FlipDirection::Horizontal => "horizontal",
            FlipDirection::Vertical => "vertical",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, FlipDirection::None)
    }
}

impl fmt::Display for FlipDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlipDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(FlipDirection::None),
            "horizontal" | "h" => Ok(FlipDirection::Horizontal),
            "vertical" | "v" => Ok(FlipDirection::Vertical),
            other => Err(format!(
                "Invalid flip direction '{}'. Must be: none, horizontal, or vertical",
                other
            )),
        }
    }
}

/// The six editable filters of one image, all inert by default
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFilters {
    pub resize: ResizeInput,
    pub crop: CropInput,
    pub rotate: String,
    pub brightness: BrightnessSetting,
    pub grayscale: bool,
    pub flip: FlipDirection,
}

impl ImageFilters {
    /// True when at least one filter differs from its inert default
    pub fn has_applied(&self) -> bool {
        self.resize.is_applied()
            || self.crop.is_applied()
            || !self.rotate.is_empty()
            || self.brightness.is_applied()
            || self.grayscale
            || !self.flip.is_none()
    }
}

/// A single field-level edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterUpdate {
    Resize(ResizeInput),
    Crop(CropInput),
    Rotate(String),
    BrightnessEnabled(bool),
    BrightnessValue(i32),
    Grayscale(bool),
    Flip(FlipDirection),
}

impl FilterUpdate {
    pub fn filter_name(&self) -> &'static str {
        match self {
            FilterUpdate::Resize(_) => "resize",
            FilterUpdate::Crop(_) => "crop",
            FilterUpdate::Rotate(_) => "rotate",
            FilterUpdate::BrightnessEnabled(_) | FilterUpdate::BrightnessValue(_) => "brightness",
            FilterUpdate::Grayscale(_) => "grayscale",
            FilterUpdate::Flip(_) => "flip",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEditMetadata {
    pub image_name: String,
    pub filters: ImageFilters,
}

impl ImageEditMetadata {
    /// Inert record for a freshly selected file
    pub fn for_file(file_name: impl Into<String>) -> Self {
        Self {
            image_name: file_name.into(),
            filters: ImageFilters::default(),
        }
    }

    pub fn has_applied_filters(&self) -> bool {
        self.filters.has_applied()
    }

    pub fn renamed(self, image_name: impl Into<String>) -> Self {
        Self {
            image_name: image_name.into(),
            ..self
        }
    }

    /// Replace exactly one filter field, leaving all others untouched
    pub fn with_update(self, update: FilterUpdate) -> Self {
        let mut filters = self.filters;
        match update {
            FilterUpdate::Resize(resize) => filters.resize = resize,
            FilterUpdate::Crop(crop) => filters.crop = crop,
            FilterUpdate::Rotate(rotate) => filters.rotate = rotate,
            FilterUpdate::BrightnessEnabled(enabled) => {
                filters.brightness = BrightnessSetting {
                    enabled,
                    value: if enabled { filters.brightness.value } else { 0 },
                };
            }
            FilterUpdate::BrightnessValue(value) => {
                if filters.brightness.enabled {
                    filters.brightness.value = value.clamp(BRIGHTNESS_MIN, BRIGHTNESS_MAX);
                }
            }
            FilterUpdate::Grayscale(grayscale) => filters.grayscale = grayscale,
            FilterUpdate::Flip(flip) => filters.flip = flip,
        }
        Self { filters, ..self }
    }
}
