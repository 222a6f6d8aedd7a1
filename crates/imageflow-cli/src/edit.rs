//! `--edit INDEX:FILTER[=VALUE]` arguments
//!
//! | filter      | value                          |
//! |-------------|--------------------------------|
//! | `name`      | new image name                 |
//! | `resize`    | `WIDTHxHEIGHT`, either side optional |
//! | `crop`      | `TOP,LEFT,WIDTH,HEIGHT`        |
//! | `rotate`    | degrees                        |
//! | `brightness`| `-100..=100`, or `off`         |
//! | `grayscale` | none, `true` or `false`        |
//! | `flip`      | `none`, `horizontal`/`h`, `vertical`/`v` |

use anyhow::{anyhow, bail, Context, Result};
use imageflow_core::models::{CropInput, FilterUpdate, FlipDirection, ResizeInput};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    Rename(String),
    /// Field updates applied in order
    Filters(Vec<FilterUpdate>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEdit {
    pub index: usize,
    pub action: EditAction,
}

pub fn parse_edit(raw: &str) -> Result<ImageEdit> {
    let (index, rest) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("Edit '{}' must look like INDEX:FILTER[=VALUE]", raw))?;
    let index: usize = index
        .trim()
        .parse()
        .with_context(|| format!("Invalid image index in '{}'", raw))?;

    let (filter, value) = match rest.split_once('=') {
        Some((filter, value)) => (filter.trim(), Some(value)),
        None => (rest.trim(), None),
    };
    let value_for = |filter: &str| {
        value.ok_or_else(|| anyhow!("Filter '{}' needs a value ({})", filter, raw))
    };

    let action = match filter.to_lowercase().as_str() {
        "name" => EditAction::Rename(value_for("name")?.to_string()),
        "resize" => {
            let value = value_for("resize")?;
            let (width, height) = value.split_once(['x', 'X']).unwrap_or((value, ""));
            EditAction::Filters(vec![FilterUpdate::Resize(ResizeInput::new(
                width.trim(),
                height.trim(),
            ))])
        }
        "crop" => {
            let fields: Vec<&str> = value_for("crop")?.split(',').map(str::trim).collect();
            let [top, left, width, height] = fields.as_slice() else {
                bail!("Crop needs TOP,LEFT,WIDTH,HEIGHT ({})", raw);
            };
            EditAction::Filters(vec![FilterUpdate::Crop(CropInput {
                top: top.to_string(),
                left: left.to_string(),
                width: width.to_string(),
                height: height.to_string(),
            })])
        }
        "rotate" => EditAction::Filters(vec![FilterUpdate::Rotate(
            value_for("rotate")?.trim().to_string(),
        )]),
        "brightness" => {
            let value = value_for("brightness")?.trim();
            if value.eq_ignore_ascii_case("off") {
                EditAction::Filters(vec![FilterUpdate::BrightnessEnabled(false)])
            } else {
                let amount: i32 = value
                    .parse()
                    .with_context(|| format!("Invalid brightness in '{}'", raw))?;
                EditAction::Filters(vec![
                    FilterUpdate::BrightnessEnabled(true),
                    FilterUpdate::BrightnessValue(amount),
                ])
            }
        }
        "grayscale" => {
            let enabled = match value.map(|v| v.trim().to_lowercase()) {
                None => true,
                Some(v) if v == "true" || v == "on" => true,
                Some(v) if v == "false" || v == "off" => false,
                Some(v) => bail!("Invalid grayscale value '{}'", v),
            };
            EditAction::Filters(vec![FilterUpdate::Grayscale(enabled)])
        }
        "flip" => {
            let direction: FlipDirection = value_for("flip")?.parse().map_err(|e: String| anyhow!(e))?;
            EditAction::Filters(vec![FilterUpdate::Flip(direction)])
        }
        other => bail!(
            "Unknown filter '{}'. Expected one of: name, resize, crop, rotate, brightness, grayscale, flip",
            other
        ),
    };

    Ok(ImageEdit { index, action })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters(raw: &str) -> Vec<FilterUpdate> {
        match parse_edit(raw).unwrap().action {
            EditAction::Filters(updates) => updates,
            other => panic!("expected filter updates, got {:?}", other),
        }
    }

    #[test]
    fn parses_each_filter() {
        assert_eq!(
            filters("0:resize=800x"),
            vec![FilterUpdate::Resize(ResizeInput::new("800", ""))]
        );
        assert_eq!(
            filters("0:resize=x600"),
            vec![FilterUpdate::Resize(ResizeInput::new("", "600"))]
        );
        assert_eq!(
            filters("1:crop=10, 20,300,400"),
            vec![FilterUpdate::Crop(CropInput {
                top: "10".into(),
                left: "20".into(),
                width: "300".into(),
                height: "400".into(),
            })]
        );
        assert_eq!(filters("2:rotate=90"), vec![FilterUpdate::Rotate("90".into())]);
        assert_eq!(
            filters("0:brightness=-20"),
            vec![
                FilterUpdate::BrightnessEnabled(true),
                FilterUpdate::BrightnessValue(-20)
            ]
        );
        assert_eq!(
            filters("0:brightness=off"),
            vec![FilterUpdate::BrightnessEnabled(false)]
        );
        assert_eq!(filters("0:grayscale"), vec![FilterUpdate::Grayscale(true)]);
        assert_eq!(filters("0:grayscale=false"), vec![FilterUpdate::Grayscale(false)]);
        assert_eq!(
            filters("3:flip=h"),
            vec![FilterUpdate::Flip(FlipDirection::Horizontal)]
        );
    }

    #[test]
    fn parses_rename() {
        assert_eq!(
            parse_edit("4:name=holiday.jpg").unwrap(),
            ImageEdit {
                index: 4,
                action: EditAction::Rename("holiday.jpg".into())
            }
        );
    }

    #[test]
    fn rejects_malformed_edits() {
        assert!(parse_edit("grayscale").is_err());
        assert!(parse_edit("x:grayscale").is_err());
        assert!(parse_edit("0:rotate").is_err());
        assert!(parse_edit("0:crop=1,2,3").is_err());
        assert!(parse_edit("0:flip=diagonal").is_err());
        assert!(parse_edit("0:sharpen=2").is_err());
    }
}
