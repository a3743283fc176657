//! Configuration type definitions.

use super::enums::ColorSpec;
use crate::codec::{EncodeOptions, ImageFormat};
use crate::draw::color::WHITE;
use crate::shot::{ShotDestination, file::DEFAULT_TEMPLATE};
use chrono::format::{Item, StrftimeItems};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a single setting cannot be applied.
///
/// The previous value is left untouched in every case.
#[derive(Debug, Error, PartialEq)]
pub enum SettingError {
    #[error("Unknown setting '{0}'")]
    UnknownKey(String),

    #[error("Invalid value '{value}' for '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

impl SettingError {
    pub(crate) fn invalid(key: &str, value: &str, reason: impl ToString) -> Self {
        SettingError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Options that control how a selection is laid out and encoded.
///
/// Persisted under `[render]`; the format is stored by ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RenderOptions {
    /// Multiplier applied to all geometry (must be finite and > 0)
    pub scale: f64,

    /// Margin around the content in output pixels, not affected by scale
    pub padding: u32,

    /// Remove the indentation common to every non-blank line
    pub chop_indentation: bool,

    /// Leave caret marks out of the image
    pub remove_caret: bool,

    /// Draw editor line numbers in a gutter left of the text
    pub show_line_numbers: bool,

    /// Output format ordinal: 0 = PNG, 1 = JPEG, 2 = BMP, 3 = SVG
    #[schemars(with = "u8")]
    pub format: ImageFormat,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            padding: 0,
            chop_indentation: true,
            remove_caret: false,
            show_line_numbers: false,
            format: ImageFormat::default(),
        }
    }
}

impl RenderOptions {
    /// Recognized keys, in persisted order.
    pub const KEYS: [&'static str; 6] = [
        "scale",
        "padding",
        "chop_indentation",
        "remove_caret",
        "show_line_numbers",
        "format",
    ];

    /// Sets one option from its textual form.
    ///
    /// `format` accepts either an ordinal or a name (`png`, `jpeg`, ...).
    pub fn apply_setting(&mut self, key: &str, value: &str) -> Result<(), SettingError> {
        let raw = value.trim();
        match key {
            "scale" => {
                let scale: f64 = raw.parse().map_err(|e| SettingError::invalid(key, value, e))?;
                if !scale.is_finite() || scale <= 0.0 {
                    return Err(SettingError::invalid(
                        key,
                        value,
                        "must be a positive number",
                    ));
                }
                self.scale = scale;
            }
            "padding" => {
                self.padding = raw.parse().map_err(|e| SettingError::invalid(key, value, e))?;
            }
            "chop_indentation" => {
                self.chop_indentation = parse_bool(key, value)?;
            }
            "remove_caret" => {
                self.remove_caret = parse_bool(key, value)?;
            }
            "show_line_numbers" => {
                self.show_line_numbers = parse_bool(key, value)?;
            }
            "format" => {
                self.format = match raw.parse::<u8>() {
                    Ok(ordinal) => ImageFormat::try_from(ordinal),
                    Err(_) => raw.parse::<ImageFormat>(),
                }
                .map_err(|e| SettingError::invalid(key, value, e))?;
            }
            other => return Err(SettingError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

/// Where and how finished shots are delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for saved images; `~/` is expanded. Defaults to `<Pictures>/Codeshot`
    pub save_directory: Option<String>,

    /// File name without extension, as a chrono format string
    pub filename_template: String,

    /// JPEG quality (1 - 100)
    pub jpeg_quality: u8,

    /// Color that transparent pixels are flattened against for JPEG and BMP
    pub opaque_background: ColorSpec,

    /// Ask for confirmation (or `--force`) above this many output pixels; 0 disables
    pub large_image_warning_pixels: u64,

    /// Offer a file reference on the clipboard alongside the image
    pub clipboard_file_flavor: bool,

    /// Default destination for rendered shots
    pub destination: ShotDestination,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            save_directory: None,
            filename_template: DEFAULT_TEMPLATE.to_string(),
            jpeg_quality: 90,
            opaque_background: ColorSpec::Name("white".to_string()),
            large_image_warning_pixels: 3_000_000,
            clipboard_file_flavor: true,
            destination: ShotDestination::default(),
        }
    }
}

impl OutputConfig {
    pub fn apply_setting(&mut self, key: &str, value: &str) -> Result<(), SettingError> {
        let raw = value.trim();
        match key {
            "save_directory" => {
                self.save_directory = (!raw.is_empty()).then(|| raw.to_string());
            }
            "filename_template" => {
                validate_template(raw).map_err(|reason| SettingError::invalid(key, value, reason))?;
                self.filename_template = raw.to_string();
            }
            "jpeg_quality" => {
                let quality: u8 = raw.parse().map_err(|e| SettingError::invalid(key, value, e))?;
                if !(1..=100).contains(&quality) {
                    return Err(SettingError::invalid(key, value, "must be within 1-100"));
                }
                self.jpeg_quality = quality;
            }
            "opaque_background" => {
                if crate::util::parse_color(raw).is_none() {
                    return Err(SettingError::invalid(key, value, "not a color"));
                }
                self.opaque_background = ColorSpec::Name(raw.to_string());
            }
            "large_image_warning_pixels" => {
                self.large_image_warning_pixels =
                    raw.parse().map_err(|e| SettingError::invalid(key, value, e))?;
            }
            "clipboard_file_flavor" => {
                self.clipboard_file_flavor = parse_bool(key, value)?;
            }
            "destination" => {
                self.destination = raw
                    .parse()
                    .map_err(|e| SettingError::invalid(key, value, e))?;
            }
            other => return Err(SettingError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    /// Encoder settings derived from this section.
    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            jpeg_quality: self.jpeg_quality.clamp(1, 100),
            opaque_background: self.opaque_background.to_color(WHITE),
        }
    }

    /// Pixel limit for the large-image guard, `None` when disabled.
    pub fn max_pixels(&self) -> Option<u64> {
        (self.large_image_warning_pixels > 0).then_some(self.large_image_warning_pixels)
    }
}

/// Rejects templates chrono cannot format or that would leave the save directory.
pub(crate) fn validate_template(template: &str) -> Result<(), &'static str> {
    if template.is_empty() {
        return Err("must not be empty");
    }
    if template.contains(['/', '\\']) {
        return Err("must not contain a path separator");
    }
    if StrftimeItems::new(template).any(|item| matches!(item, Item::Error)) {
        return Err("not a valid date/time pattern");
    }
    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, SettingError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(SettingError::invalid(key, value, "expected true or false")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_defaults() {
        let options = RenderOptions::default();
        assert_eq!(options.scale, 1.0);
        assert_eq!(options.padding, 0);
        assert!(options.chop_indentation);
        assert!(!options.remove_caret);
        assert!(!options.show_line_numbers);
        assert_eq!(options.format, ImageFormat::ALL[0]);
    }

    #[test]
    fn apply_setting_parses_each_key() {
        let mut options = RenderOptions::default();
        options.apply_setting("scale", "2.5").unwrap();
        options.apply_setting("padding", " 12 ").unwrap();
        options.apply_setting("chop_indentation", "off").unwrap();
        options.apply_setting("remove_caret", "true").unwrap();
        options.apply_setting("show_line_numbers", "yes").unwrap();
        options.apply_setting("format", "3").unwrap();
        assert_eq!(
            options,
            RenderOptions {
                scale: 2.5,
                padding: 12,
                chop_indentation: false,
                remove_caret: true,
                show_line_numbers: true,
                format: ImageFormat::Svg,
            }
        );

        options.apply_setting("format", "jpeg").unwrap();
        assert_eq!(options.format, ImageFormat::Jpeg);
    }

    #[test]
    fn invalid_values_keep_previous() {
        let mut options = RenderOptions {
            scale: 3.0,
            padding: 7,
            ..RenderOptions::default()
        };
        for (key, value) in [
            ("scale", "0"),
            ("scale", "-1"),
            ("scale", "NaN"),
            ("scale", "inf"),
            ("scale", "big"),
            ("padding", "-4"),
            ("chop_indentation", "maybe"),
            ("format", "17"),
            ("format", "gif"),
        ] {
            let err = options.apply_setting(key, value).unwrap_err();
            assert!(matches!(err, SettingError::InvalidValue { .. }), "{key}={value}");
        }
        assert_eq!(options.scale, 3.0);
        assert_eq!(options.padding, 7);
        assert!(options.chop_indentation);
        assert_eq!(options.format, ImageFormat::Png);

        assert_eq!(
            options.apply_setting("zoom", "2"),
            Err(SettingError::UnknownKey("zoom".to_string()))
        );
    }

    #[test]
    fn output_settings() {
        let mut output = OutputConfig::default();
        assert_eq!(output.max_pixels(), Some(3_000_000));

        output.apply_setting("jpeg_quality", "75").unwrap();
        assert!(output.apply_setting("jpeg_quality", "0").is_err());
        assert!(output.apply_setting("jpeg_quality", "101").is_err());
        assert_eq!(output.jpeg_quality, 75);

        output.apply_setting("opaque_background", "#202020").unwrap();
        assert!(output.apply_setting("opaque_background", "#12").is_err());
        assert_eq!(output.opaque_background, ColorSpec::Name("#202020".to_string()));

        output.apply_setting("large_image_warning_pixels", "0").unwrap();
        assert_eq!(output.max_pixels(), None);

        output.apply_setting("destination", "clipboard").unwrap();
        assert_eq!(output.destination, ShotDestination::ClipboardOnly);

        output.apply_setting("save_directory", "").unwrap();
        assert_eq!(output.save_directory, None);
    }

    #[test]
    fn filename_template_is_checked() {
        let mut output = OutputConfig::default();
        assert_eq!(output.filename_template, DEFAULT_TEMPLATE);

        output.apply_setting("filename_template", "code_%Y-%m-%d").unwrap();
        assert_eq!(output.filename_template, "code_%Y-%m-%d");

        for bad in ["", "  ", "../escape_%H", "shot_%Q%"] {
            let err = output.apply_setting("filename_template", bad).unwrap_err();
            assert!(matches!(err, SettingError::InvalidValue { .. }), "{bad:?}");
        }
        assert_eq!(output.filename_template, "code_%Y-%m-%d");
    }
}
