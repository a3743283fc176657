//! Data types for rendering and delivering code shots.

use crate::codec::{EncodedImage, EncodingError};
use crate::draw::RenderError;
use crate::model::ModelError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Where a finished shot should be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ShotDestination {
    /// Write the encoded image to the save directory
    FileOnly,
    /// Place the image on the clipboard only
    ClipboardOnly,
    /// Copy to the clipboard and keep a saved file
    #[default]
    FileAndClipboard,
}

impl ShotDestination {
    pub fn from_flags(save: bool, clipboard: bool) -> Option<Self> {
        match (save, clipboard) {
            (true, false) => Some(ShotDestination::FileOnly),
            (false, true) => Some(ShotDestination::ClipboardOnly),
            (true, true) => Some(ShotDestination::FileAndClipboard),
            (false, false) => None,
        }
    }

    pub fn saves_file(self) -> bool {
        matches!(
            self,
            ShotDestination::FileOnly | ShotDestination::FileAndClipboard
        )
    }

    pub fn copies_to_clipboard(self) -> bool {
        matches!(
            self,
            ShotDestination::ClipboardOnly | ShotDestination::FileAndClipboard
        )
    }
}

impl FromStr for ShotDestination {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" | "file-only" => Ok(ShotDestination::FileOnly),
            "clipboard" | "clipboard-only" => Ok(ShotDestination::ClipboardOnly),
            "both" | "file-and-clipboard" => Ok(ShotDestination::FileAndClipboard),
            other => Err(format!(
                "unknown destination '{other}' (expected file, clipboard or both)"
            )),
        }
    }
}

/// Result of a completed shot.
#[derive(Debug, Clone)]
pub struct ShotResult {
    /// The encoded image, as saved and offered on the clipboard.
    pub image: EncodedImage,
    /// Canvas size in pixels.
    pub width: u32,
    pub height: u32,
    /// Path where the image was saved (if saved).
    pub saved_path: Option<PathBuf>,
    /// Whether the image was copied to clipboard.
    pub copied_to_clipboard: bool,
}

/// Outcome of a shot request processed by the background manager.
#[derive(Debug, Clone)]
pub enum ShotOutcome {
    Success(ShotResult),
    Failed(String),
}

/// Errors that can occur while producing or delivering a shot.
#[derive(Debug, Error)]
pub enum ShotError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Image would be {pixels} pixels, above the limit of {limit}")]
    TooLarge { pixels: u64, limit: u64 },

    #[error("{} exists and is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Clipboard operation failed: {0}")]
    Clipboard(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

/// Status of the shot manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShotStatus {
    Idle,
    InProgress,
    Success,
    Failed(String),
}

impl fmt::Display for ShotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShotStatus::Idle => f.write_str("idle"),
            ShotStatus::InProgress => f.write_str("in progress"),
            ShotStatus::Success => f.write_str("done"),
            ShotStatus::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}
