//! Clipboard integration for copying shots.
//!
//! A [`TransferPackage`] is offered as several MIME flavors at once so that
//! the paste target can pick: decoded pixels as `image/png`, the chosen
//! encoding under its own MIME type, and a `text/uri-list` file reference.

use super::types::ShotError;
use crate::codec::{self, EncodeOptions, ImageFormat};
use crate::draw::PixelBuffer;
use crate::transfer::{Representation, TransferPackage};
use std::process::{Command, Stdio};
use wl_clipboard_rs::copy::{MimeSource, MimeType, Options, ServeRequests, Source};

/// MIME type of the file-reference flavor.
pub const URI_LIST_MIME: &str = "text/uri-list";

/// One clipboard flavor: a MIME type and the bytes served for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flavor {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Maps the package's representations onto clipboard flavors, most specific first.
pub fn clipboard_flavors(package: &TransferPackage) -> Result<Vec<Flavor>, ShotError> {
    let mut flavors: Vec<Flavor> = Vec::new();
    let has_native = package.as_native_image().is_some();

    for representation in package.representations() {
        match representation {
            Representation::NativeImage => {
                flavors.push(Flavor {
                    mime_type: ImageFormat::Png.mime_type().to_string(),
                    bytes: native_png(package)?,
                });
            }
            Representation::Encoded(mime) => {
                if has_native && *mime == ImageFormat::Png.mime_type() {
                    continue;
                }
                flavors.push(Flavor {
                    mime_type: mime.to_string(),
                    bytes: package.as_bytes().bytes.to_vec(),
                });
            }
            Representation::FileList => {
                let Some(path) = package.file() else {
                    continue;
                };
                let url = url::Url::from_file_path(path).map_err(|_| {
                    ShotError::Clipboard(format!(
                        "Cannot build a file URL for {}",
                        path.display()
                    ))
                })?;
                flavors.push(Flavor {
                    mime_type: URI_LIST_MIME.to_string(),
                    bytes: format!("{url}\r\n").into_bytes(),
                });
            }
        }
    }

    Ok(flavors)
}

/// PNG bytes of the native image, reusing the encoded bytes when they already are PNG.
fn native_png(package: &TransferPackage) -> Result<Vec<u8>, ShotError> {
    if package.format() == ImageFormat::Png {
        return Ok(package.as_bytes().bytes.to_vec());
    }

    let native = package
        .as_native_image()
        .ok_or_else(|| ShotError::Clipboard("No native image to offer".to_string()))?;
    let pixels = PixelBuffer::from_rgba(native.width, native.height, native.rgba.to_vec())
        .ok_or_else(|| ShotError::Clipboard("Native image has inconsistent size".to_string()))?;
    let png = codec::encode_pixels(&pixels, ImageFormat::Png, &EncodeOptions::default())?;
    Ok(png.bytes().to_vec())
}

/// Copy a shot to the Wayland clipboard.
///
/// Attempts the wl-clipboard-rs library first, which can offer every
/// flavor; falls back to the wl-copy command with the primary flavor only.
pub fn copy_to_clipboard(package: &TransferPackage) -> Result<(), ShotError> {
    let flavors = clipboard_flavors(package)?;
    let Some(primary) = flavors.first().cloned() else {
        return Err(ShotError::Clipboard("Nothing to copy".to_string()));
    };

    log::debug!(
        "Attempting to copy shot to clipboard as {}",
        flavors
            .iter()
            .map(|f| format!("{} ({} bytes)", f.mime_type, f.bytes.len()))
            .collect::<Vec<_>>()
            .join(", ")
    );

    match copy_via_library(flavors) {
        Ok(()) => {
            log::info!("Successfully copied to clipboard via wl-clipboard-rs");
            Ok(())
        }
        Err(lib_err) => {
            log::warn!(
                "wl-clipboard-rs failed ({}). Falling back to wl-copy with {}",
                lib_err,
                primary.mime_type
            );
            match copy_via_command(&primary) {
                Ok(()) => {
                    log::info!("Successfully copied to clipboard via wl-copy fallback");
                    Ok(())
                }
                Err(cmd_err) => {
                    let combined = format!(
                        "wl-clipboard-rs failed: {} ; wl-copy failed: {}",
                        lib_err, cmd_err
                    );
                    Err(ShotError::Clipboard(combined))
                }
            }
        }
    }
}

/// Copy to clipboard using wl-clipboard-rs library.
fn copy_via_library(flavors: Vec<Flavor>) -> Result<(), ShotError> {
    let mut opts = Options::new();

    // Serve one paste then exit
    opts.serve_requests(ServeRequests::Only(1));

    let sources = flavors
        .into_iter()
        .map(|flavor| MimeSource {
            source: Source::Bytes(flavor.bytes.into_boxed_slice()),
            mime_type: MimeType::Specific(flavor.mime_type),
        })
        .collect();

    opts.copy_multi(sources)
        .map_err(|e| ShotError::Clipboard(format!("wl-clipboard-rs error: {}", e)))?;

    Ok(())
}

/// Copy to clipboard by shelling out to wl-copy command.
fn copy_via_command(flavor: &Flavor) -> Result<(), ShotError> {
    use std::io::Write;

    let mut child = Command::new("wl-copy")
        .arg("--type")
        .arg(&flavor.mime_type)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            ShotError::Clipboard(format!("Failed to spawn wl-copy (is it installed?): {}", e))
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(&flavor.bytes).map_err(|e| {
            ShotError::Clipboard(format!("Failed to write to wl-copy stdin: {}", e))
        })?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| ShotError::Clipboard(format!("Failed to wait for wl-copy: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ShotError::Clipboard(format!("wl-copy failed: {}", stderr)));
    }

    log::debug!("wl-copy command completed successfully");
    Ok(())
}
