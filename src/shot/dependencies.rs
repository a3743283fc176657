use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tokio::task;

use crate::config::RenderOptions;
use crate::draw::RenderError;
use crate::layout::{Layout, LayoutEngine};
use crate::model::StyledTextModel;
use crate::shot::{
    clipboard,
    file::{self, FileSaveConfig},
    types::ShotError,
};
use crate::transfer::TransferPackage;

/// Abstraction over how a model is turned into a layout.
#[async_trait]
pub trait ShotLayoutSource: Send + Sync {
    async fn layout(
        &self,
        model: StyledTextModel,
        options: RenderOptions,
    ) -> Result<Layout, ShotError>;
}

/// Abstraction over file saving for rendered shots.
pub trait ShotFileSaver: Send + Sync {
    fn save(&self, package: &TransferPackage, config: &FileSaveConfig)
    -> Result<PathBuf, ShotError>;

    /// Writes a scratch copy that backs the clipboard's file flavor.
    fn save_temp(&self, package: &TransferPackage) -> Result<PathBuf, ShotError>;
}

/// Abstraction over copying shots to the clipboard.
pub trait ShotClipboard: Send + Sync {
    fn copy(&self, package: &TransferPackage) -> Result<(), ShotError>;
}

/// Bundle of dependencies used by the shot pipeline. Each component can be mocked in tests.
#[derive(Clone)]
pub struct ShotDependencies {
    pub layout: Arc<dyn ShotLayoutSource>,
    pub saver: Arc<dyn ShotFileSaver>,
    pub clipboard: Arc<dyn ShotClipboard>,
}

impl Default for ShotDependencies {
    fn default() -> Self {
        Self {
            layout: Arc::new(PangoLayoutSource),
            saver: Arc::new(DefaultFileSaver),
            clipboard: Arc::new(DefaultClipboard),
        }
    }
}

struct PangoLayoutSource;
struct DefaultFileSaver;
struct DefaultClipboard;

#[async_trait]
impl ShotLayoutSource for PangoLayoutSource {
    async fn layout(
        &self,
        model: StyledTextModel,
        options: RenderOptions,
    ) -> Result<Layout, ShotError> {
        // Pango contexts are not Send; build the engine on the worker thread.
        task::spawn_blocking(move || -> Result<Layout, ShotError> {
            let engine = LayoutEngine::with_pango().map_err(RenderError::from)?;
            Ok(engine.layout(&model, &options))
        })
        .await
        .map_err(|e| ShotError::Task(format!("Layout task failed: {}", e)))?
    }
}

impl ShotFileSaver for DefaultFileSaver {
    fn save(
        &self,
        package: &TransferPackage,
        config: &FileSaveConfig,
    ) -> Result<PathBuf, ShotError> {
        file::save_shot(package.as_bytes(), config)
    }

    fn save_temp(&self, package: &TransferPackage) -> Result<PathBuf, ShotError> {
        file::write_temp_copy(package.as_bytes())
    }
}

impl ShotClipboard for DefaultClipboard {
    fn copy(&self, package: &TransferPackage) -> Result<(), ShotError> {
        clipboard::copy_to_clipboard(package)
    }
}
