//! Configuration file support for codeshot.
//!
//! This module handles loading user settings from the configuration file
//! located at `~/.config/codeshot/config.toml`, optionally overlaid by a
//! per-project `.codeshot.toml`. Settings cover layout options (scale,
//! padding, indentation chopping, caret removal, format) and output delivery.
//!
//! Loading is lenient: unknown keys are ignored and a value that fails to
//! parse keeps the value it would otherwise have had, with a warning.

pub mod enums;
pub mod types;

// Re-export commonly used types at module level
pub use enums::ColorSpec;
pub use types::{OutputConfig, RenderOptions, SettingError};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the per-project overlay, looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = ".codeshot.toml";

/// Main configuration structure containing all user settings.
///
/// # Example TOML
/// ```toml
/// [render]
/// scale = 2.0
/// padding = 16
/// chop_indentation = true
/// remove_caret = false
/// format = 0
///
/// [output]
/// save_directory = "~/Pictures/Codeshot"
/// jpeg_quality = 90
/// opaque_background = "white"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Layout and format options
    #[serde(default)]
    pub render: RenderOptions,

    /// Save location, encoder and clipboard settings
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// JSON schema describing the configuration file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/codeshot/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("codeshot");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads the user configuration, or returns defaults if not found.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined, or the
    /// file exists but cannot be read or is not valid TOML.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::default().overlay_file(&config_path)
    }

    /// Loads the user configuration and overlays `<project>/.codeshot.toml`.
    pub fn load_for_project(project: &Path) -> Result<Self> {
        Self::load()?.overlay_file(&project.join(PROJECT_CONFIG_FILE))
    }

    /// Applies the settings of `path` on top of `self`.
    ///
    /// A missing file leaves the configuration unchanged.
    pub fn overlay_file(mut self, path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, keeping current settings", path.display());
            return Ok(self);
        }

        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let table: toml::Table = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        self.apply_table(&table);

        info!("Loaded config from {}", path.display());
        debug!("Config: {:?}", self);

        Ok(self)
    }

    /// Applies every recognized key of a parsed TOML document.
    pub fn apply_table(&mut self, table: &toml::Table) {
        for (section, value) in table {
            let Some(entries) = value.as_table() else {
                debug!("Ignoring top-level key '{}'", section);
                continue;
            };
            for (key, value) in entries {
                let result = match section.as_str() {
                    "render" => self.render.apply_setting(key, &setting_text(value)),
                    "output" => self.apply_output_value(key, value),
                    _ => {
                        debug!("Ignoring unknown section [{}]", section);
                        break;
                    }
                };
                match result {
                    Ok(()) => {}
                    Err(SettingError::UnknownKey(_)) => {
                        debug!("Ignoring unknown key '{}.{}'", section, key);
                    }
                    Err(err) => warn!("{}; keeping previous value", err),
                }
            }
        }
    }

    fn apply_output_value(&mut self, key: &str, value: &toml::Value) -> Result<(), SettingError> {
        if key == "opaque_background" && value.is_array() {
            let spec: ColorSpec = value
                .clone()
                .try_into()
                .map_err(|e| SettingError::invalid(key, &value.to_string(), e))?;
            self.output.opaque_background = spec;
            return Ok(());
        }
        self.output.apply_setting(key, &setting_text(value))
    }

    /// Saves the current configuration to file.
    ///
    /// Serializes the config to TOML format and writes it to `~/.config/codeshot/config.toml`.
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    /// Writes the configuration as TOML to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, config_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Creates a default configuration file with documentation comments.
    ///
    /// Writes the example config from `config.example.toml` to the user's config directory.
    ///
    /// # Errors
    /// Returns an error if a config file already exists at the target path, or
    /// the directory or file cannot be written.
    pub fn create_default_file() -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;

        if config_path.exists() {
            return Err(anyhow::anyhow!(
                "Config file already exists at {}",
                config_path.display()
            ));
        }

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        fs::write(&config_path, EXAMPLE_CONFIG)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;

        info!("Created default config at {}", config_path.display());
        Ok(config_path)
    }
}

/// Documented example configuration shipped with the binary.
pub const EXAMPLE_CONFIG: &str = include_str!("../../config.example.toml");

/// Textual form of a TOML scalar as accepted by `apply_setting`.
fn setting_text(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
