use std::{fmt, path::PathBuf, sync::Arc};

use crate::codec::EncodeOptions;
use crate::config::{Config, RenderOptions};
use crate::model::{ModelError, StyledTextModel};
use crate::shot::{
    dependencies::{ShotClipboard, ShotDependencies, ShotFileSaver},
    file::FileSaveConfig,
    types::{ShotDestination, ShotError, ShotResult},
};
use crate::transfer::TransferPackage;
use tokio::task;

/// Everything needed to render one selection and deliver it.
#[derive(Clone)]
pub struct ShotRequest {
    pub model: StyledTextModel,
    pub options: RenderOptions,
    pub encode: EncodeOptions,
    pub destination: ShotDestination,
    pub save_config: Option<FileSaveConfig>,
    /// Refuse canvases above this many pixels; `None` disables the guard.
    pub max_pixels: Option<u64>,
    /// Offer a `text/uri-list` flavor next to the image.
    pub clipboard_file_flavor: bool,
}

impl ShotRequest {
    /// Builds a request from configuration defaults.
    pub fn from_config(model: StyledTextModel, config: &Config) -> Self {
        Self {
            model,
            options: config.render,
            encode: config.output.encode_options(),
            destination: config.output.destination,
            save_config: Some(FileSaveConfig::from_output(&config.output)),
            max_pixels: config.output.max_pixels(),
            clipboard_file_flavor: config.output.clipboard_file_flavor,
        }
    }
}

impl fmt::Debug for ShotRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShotRequest")
            .field("segments", &self.model.segments.len())
            .field("options", &self.options)
            .field("destination", &self.destination)
            .field(
                "save_directory",
                &self.save_config.as_ref().map(|cfg| &cfg.save_directory),
            )
            .field("max_pixels", &self.max_pixels)
            .finish()
    }
}

pub async fn perform_shot(
    request: ShotRequest,
    dependencies: Arc<ShotDependencies>,
) -> Result<ShotResult, ShotError> {
    log::info!("Starting shot: {:?}", request);

    // Step 1: Refuse selections that cannot be rendered
    if request.model.is_empty() {
        return Err(ModelError::EmptySelection.into());
    }
    request.model.validate()?;

    // Step 2: Layout
    let format = request.options.format;
    let layout = dependencies
        .layout
        .layout(request.model, request.options)
        .await?;
    log::debug!(
        "Laid out {} lines into {}x{} ({} ops)",
        layout.line_count,
        layout.width,
        layout.height,
        layout.ops.len()
    );

    if let Some(limit) = request.max_pixels
        && layout.pixel_count() > limit
    {
        return Err(ShotError::TooLarge {
            pixels: layout.pixel_count(),
            limit,
        });
    }

    // Step 3: Rasterize and encode
    let (width, height) = (layout.width, layout.height);
    let encode = request.encode;
    let package = task::spawn_blocking(move || TransferPackage::render(&layout, format, &encode))
        .await
        .map_err(|e| ShotError::Task(format!("Encode task failed: {}", e)))??;
    log::info!(
        "Encoded {}x{} shot as {} ({} bytes)",
        width,
        height,
        format,
        package.encoded().len()
    );
    let package = Arc::new(package);

    // Step 4: Save to file (if requested)
    let saved_path = match (request.destination.saves_file(), request.save_config) {
        (true, Some(save_config)) if !save_config.save_directory.as_os_str().is_empty() => Some(
            save_package(
                Arc::clone(&dependencies.saver),
                Arc::clone(&package),
                save_config,
            )
            .await?,
        ),
        (true, _) => {
            log::debug!("No save directory configured; skipping file save");
            None
        }
        (false, _) => None,
    };

    // Step 5: Copy to clipboard (if requested)
    let copied_to_clipboard = if request.destination.copies_to_clipboard() {
        let file = if !request.clipboard_file_flavor {
            None
        } else if let Some(path) = &saved_path {
            Some(path.clone())
        } else {
            temp_copy(Arc::clone(&dependencies.saver), Arc::clone(&package)).await
        };
        let offered = match file {
            Some(path) => Arc::new(package.as_ref().clone().with_file(path)),
            None => Arc::clone(&package),
        };
        copy_to_clipboard(Arc::clone(&dependencies.clipboard), offered).await
    } else {
        log::debug!("Clipboard copy not requested for this shot");
        false
    };

    Ok(ShotResult {
        image: package.encoded().clone(),
        width,
        height,
        saved_path,
        copied_to_clipboard,
    })
}

async fn save_package(
    saver: Arc<dyn ShotFileSaver>,
    package: Arc<TransferPackage>,
    config: FileSaveConfig,
) -> Result<PathBuf, ShotError> {
    task::spawn_blocking(move || saver.save(&package, &config))
        .await
        .map_err(|e| ShotError::Task(format!("Save task failed: {}", e)))?
}

async fn temp_copy(saver: Arc<dyn ShotFileSaver>, package: Arc<TransferPackage>) -> Option<PathBuf> {
    match task::spawn_blocking(move || saver.save_temp(&package))
        .await
        .map_err(|e| ShotError::Task(format!("Temp copy task failed: {}", e)))
    {
        Ok(Ok(path)) => Some(path),
        Ok(Err(e)) | Err(e) => {
            log::warn!("No file flavor for clipboard: {}", e);
            None
        }
    }
}

async fn copy_to_clipboard(clipboard: Arc<dyn ShotClipboard>, package: Arc<TransferPackage>) -> bool {
    match task::spawn_blocking(move || clipboard.copy(&package))
        .await
        .map_err(|e| ShotError::Clipboard(format!("Clipboard task failed: {}", e)))
    {
        Ok(Ok(())) => {
            log::info!("Successfully copied to clipboard");
            true
        }
        Ok(Err(e)) | Err(e) => {
            log::error!("Failed to copy to clipboard: {}", e);
            false
        }
    }
}
