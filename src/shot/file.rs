//! File saving functionality for shots.

use super::types::ShotError;
use crate::config::OutputConfig;
use crate::transfer::FilePayload;
use chrono::Local;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Default file name template (chrono format specifiers).
pub const DEFAULT_TEMPLATE: &str = "Shot_%Y%m%d_%H%M%S";

/// Upper bound on `_N` suffixes tried before giving up on a name.
const MAX_COLLISION_SUFFIX: u32 = 10_000;

/// Stem of the scratch file backing the clipboard's file flavor.
const CLIPBOARD_COPY_STEM: &str = "clipboard";

/// Configuration for file saving.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSaveConfig {
    /// Directory to save shots to.
    pub save_directory: PathBuf,
    /// Filename template (supports chrono format specifiers).
    pub filename_template: String,
}

impl Default for FileSaveConfig {
    fn default() -> Self {
        Self {
            save_directory: default_save_directory(),
            filename_template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl FileSaveConfig {
    pub fn from_output(output: &OutputConfig) -> Self {
        let save_directory = output
            .save_directory
            .as_deref()
            .map(expand_tilde)
            .unwrap_or_else(default_save_directory);
        Self {
            save_directory,
            filename_template: output.filename_template.clone(),
        }
    }
}

fn default_save_directory() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Codeshot")
}

/// Generate a filename based on the template and current time.
///
/// A template chrono cannot format falls back to [`DEFAULT_TEMPLATE`].
pub fn generate_filename(template: &str, extension: &str) -> String {
    let now = Local::now();
    let mut filename = String::new();
    if write!(filename, "{}", now.format(template)).is_err() || filename.is_empty() {
        log::warn!("Invalid filename template '{}', using default", template);
        filename = now.format(DEFAULT_TEMPLATE).to_string();
    }
    format!("{}.{}", filename, extension)
}

/// Ensure the save directory exists, creating it if necessary.
///
/// # Returns
/// The canonicalized path to the directory
///
/// # Errors
/// [`ShotError::NotADirectory`] if the path exists but is something else.
pub fn ensure_directory_exists(directory: &Path) -> Result<PathBuf, ShotError> {
    if directory.exists() {
        if !directory.is_dir() {
            return Err(ShotError::NotADirectory(directory.to_path_buf()));
        }
    } else {
        log::info!("Creating shot directory: {}", directory.display());
        fs::create_dir_all(directory).map_err(|source| ShotError::CreateDirectory {
            path: directory.to_path_buf(),
            source,
        })?;
    }

    // Canonicalize to resolve relative paths
    let canonical = directory
        .canonicalize()
        .unwrap_or_else(|_| directory.to_path_buf());

    Ok(canonical)
}

/// Writes `write`'s output to a hidden temp file in `directory`.
///
/// The temp file is removed when anything fails, so callers never see a
/// partially written shot.
fn stage<F>(directory: &Path, write: F) -> Result<NamedTempFile, ShotError>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let mut staged = tempfile::Builder::new()
        .prefix(".codeshot-")
        .tempfile_in(directory)
        .map_err(|source| ShotError::Write {
            path: directory.to_path_buf(),
            source,
        })?;

    let staged_path = staged.path().to_path_buf();
    let write_err = |source| ShotError::Write {
        path: staged_path.clone(),
        source,
    };
    write(staged.as_file_mut()).map_err(write_err)?;
    staged.as_file().sync_all().map_err(write_err)?;

    // Set permissions to user read/write only
    #[cfg(unix)]
    {
        use std::fs::Permissions;
        use std::os::unix::fs::PermissionsExt;
        staged
            .as_file()
            .set_permissions(Permissions::from_mode(0o600))
            .map_err(write_err)?;
    }

    Ok(staged)
}

/// Moves a staged file to `<directory>/<stem>.<ext>`, or `<stem>_1.<ext>`,
/// `<stem>_2.<ext>`... when the name is taken. Existing files are never replaced.
fn persist_unique(
    mut staged: NamedTempFile,
    directory: &Path,
    filename: &str,
) -> Result<PathBuf, ShotError> {
    let (stem, extension) = filename.rsplit_once('.').unwrap_or((filename, ""));

    for n in 0..=MAX_COLLISION_SUFFIX {
        let name = match (n, extension.is_empty()) {
            (0, _) => filename.to_string(),
            (_, true) => format!("{stem}_{n}"),
            (_, false) => format!("{stem}_{n}.{extension}"),
        };
        let path = directory.join(name);
        match staged.persist_noclobber(&path) {
            Ok(_) => return Ok(path),
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                log::debug!("{} exists, trying next suffix", path.display());
                staged = err.file;
            }
            Err(err) => {
                return Err(ShotError::Write {
                    path,
                    source: err.error,
                });
            }
        }
    }

    Err(ShotError::Write {
        path: directory.join(filename),
        source: io::Error::new(io::ErrorKind::AlreadyExists, "no free file name"),
    })
}

fn write_payload(payload: FilePayload<'_>, directory: &Path, template: &str) -> Result<PathBuf, ShotError> {
    let filename = generate_filename(template, payload.extension);
    let staged = stage(directory, |file| file.write_all(payload.bytes))?;
    persist_unique(staged, directory, &filename)
}

/// Save an encoded shot to the configured directory.
///
/// # Returns
/// Path to the saved file
pub fn save_shot(payload: FilePayload<'_>, config: &FileSaveConfig) -> Result<PathBuf, ShotError> {
    let directory = ensure_directory_exists(&config.save_directory)?;

    log::info!(
        "Saving {} shot to {} ({} bytes)",
        payload.mime_type,
        directory.display(),
        payload.bytes.len()
    );

    let file_path = write_payload(payload, &directory, &config.filename_template)?;

    log::info!("Shot saved successfully: {}", file_path.display());
    Ok(file_path)
}

/// Write a copy of the shot under the system temp directory.
///
/// Backs the clipboard's file flavor when nothing was saved.
pub fn write_temp_copy(payload: FilePayload<'_>) -> Result<PathBuf, ShotError> {
    write_scratch_copy(payload, &std::env::temp_dir().join("codeshot"))
}

/// Replaces `<directory>/clipboard.<ext>` with the payload.
///
/// The clipboard only ever serves the latest shot, so one file per
/// extension is reused instead of accumulating copies.
fn write_scratch_copy(payload: FilePayload<'_>, directory: &Path) -> Result<PathBuf, ShotError> {
    let directory = ensure_directory_exists(directory)?;
    let file_path = directory.join(format!("{}.{}", CLIPBOARD_COPY_STEM, payload.extension));

    let staged = stage(&directory, |file| file.write_all(payload.bytes))?;
    staged.persist(&file_path).map_err(|err| ShotError::Write {
        path: file_path.clone(),
        source: err.error,
    })?;

    log::debug!("Wrote temporary copy {}", file_path.display());
    Ok(file_path)
}

/// Expand tilde (~) in path strings.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}
