use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use tokio::time::{Duration, sleep};

use super::{
    dependencies::{ShotClipboard, ShotDependencies, ShotFileSaver, ShotLayoutSource},
    file::FileSaveConfig,
    manager::ShotManager,
    pipeline::{ShotRequest, perform_shot},
    types::{ShotDestination, ShotError, ShotOutcome, ShotStatus},
};
use crate::codec::{EncodeOptions, ImageFormat};
use crate::config::RenderOptions;
use crate::draw::{Color, FontDescriptor};
use crate::layout::{DrawOp, Layout, Rect};
use crate::model::{ModelBuilder, ModelError, StyledTextModel, TextStyle};
use crate::transfer::{Representation, TransferPackage};

#[derive(Clone)]
struct MockLayout {
    width: u32,
    height: u32,
    calls: Arc<Mutex<usize>>,
}

#[async_trait]
impl ShotLayoutSource for MockLayout {
    async fn layout(
        &self,
        _model: StyledTextModel,
        _options: RenderOptions,
    ) -> Result<Layout, ShotError> {
        *self.calls.lock().unwrap() += 1;
        Ok(Layout {
            width: self.width,
            height: self.height,
            content: Rect::new(0.0, 0.0, self.width as f64, self.height as f64),
            line_count: 1,
            ops: vec![DrawOp::Background {
                rect: Rect::new(0.0, 0.0, self.width as f64, self.height as f64),
                color: Color::from_rgba8(40, 40, 40, 255),
            }],
        })
    }
}

#[derive(Clone)]
struct MockSaver {
    pub should_fail: bool,
    pub path: PathBuf,
    pub calls: Arc<Mutex<usize>>,
    pub temp_calls: Arc<Mutex<usize>>,
}

impl ShotFileSaver for MockSaver {
    fn save(
        &self,
        _package: &TransferPackage,
        _config: &FileSaveConfig,
    ) -> Result<PathBuf, ShotError> {
        *self.calls.lock().unwrap() += 1;
        if self.should_fail {
            Err(ShotError::Write {
                path: self.path.clone(),
                source: std::io::Error::other("save failed"),
            })
        } else {
            Ok(self.path.clone())
        }
    }

    fn save_temp(&self, _package: &TransferPackage) -> Result<PathBuf, ShotError> {
        *self.temp_calls.lock().unwrap() += 1;
        Ok(PathBuf::from("/tmp/codeshot/temp.png"))
    }
}

#[derive(Clone)]
struct MockClipboard {
    pub should_fail: bool,
    pub calls: Arc<Mutex<usize>>,
    pub offered: Arc<Mutex<Vec<Representation>>>,
}

impl ShotClipboard for MockClipboard {
    fn copy(&self, package: &TransferPackage) -> Result<(), ShotError> {
        *self.calls.lock().unwrap() += 1;
        *self.offered.lock().unwrap() = package.representations().to_vec();
        if self.should_fail {
            Err(ShotError::Clipboard("clipboard failure".to_string()))
        } else {
            Ok(())
        }
    }
}

struct Harness {
    layout: MockLayout,
    saver: MockSaver,
    clipboard: MockClipboard,
}

impl Harness {
    fn new() -> Self {
        Self {
            layout: MockLayout {
                width: 8,
                height: 6,
                calls: Arc::new(Mutex::new(0)),
            },
            saver: MockSaver {
                should_fail: false,
                path: PathBuf::from("/tmp/shot.png"),
                calls: Arc::new(Mutex::new(0)),
                temp_calls: Arc::new(Mutex::new(0)),
            },
            clipboard: MockClipboard {
                should_fail: false,
                calls: Arc::new(Mutex::new(0)),
                offered: Arc::new(Mutex::new(Vec::new())),
            },
        }
    }

    fn dependencies(&self) -> ShotDependencies {
        ShotDependencies {
            layout: Arc::new(self.layout.clone()),
            saver: Arc::new(self.saver.clone()),
            clipboard: Arc::new(self.clipboard.clone()),
        }
    }
}

fn sample_model() -> StyledTextModel {
    let style = TextStyle {
        font: FontDescriptor::default(),
        foreground: Color::from_rgba8(0, 0, 0, 255),
        background: None,
    };
    ModelBuilder::new().push(0, "let x = 1;", &style).build()
}

fn request(destination: ShotDestination) -> ShotRequest {
    ShotRequest {
        model: sample_model(),
        options: RenderOptions::default(),
        encode: EncodeOptions::default(),
        destination,
        save_config: Some(FileSaveConfig::default()),
        max_pixels: Some(3_000_000),
        clipboard_file_flavor: true,
    }
}

#[tokio::test]
async fn test_shot_manager_creation() {
    let manager = ShotManager::new(&tokio::runtime::Handle::current());
    let status = manager.get_status().await;
    assert_eq!(status, ShotStatus::Idle);
}

#[tokio::test]
async fn empty_selection_is_refused_before_layout() {
    let harness = Harness::new();
    let mut req = request(ShotDestination::FileOnly);
    req.model = StyledTextModel::default();

    let err = perform_shot(req, Arc::new(harness.dependencies()))
        .await
        .unwrap_err();
    assert!(matches!(err, ShotError::Model(ModelError::EmptySelection)));
    assert_eq!(err.to_string(), "Selection is empty");
    assert_eq!(*harness.layout.calls.lock().unwrap(), 0);
    assert_eq!(*harness.saver.calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn file_only_saves_encoded_image() {
    let harness = Harness::new();
    let result = perform_shot(
        request(ShotDestination::FileOnly),
        Arc::new(harness.dependencies()),
    )
    .await
    .unwrap();

    assert_eq!(result.saved_path, Some(PathBuf::from("/tmp/shot.png")));
    assert!(!result.copied_to_clipboard);
    assert_eq!((result.width, result.height), (8, 6));
    assert_eq!(result.image.format(), ImageFormat::Png);
    assert_eq!(*harness.saver.calls.lock().unwrap(), 1);
    assert_eq!(*harness.clipboard.calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn clipboard_only_uses_temp_file_flavor() {
    let harness = Harness::new();
    let result = perform_shot(
        request(ShotDestination::ClipboardOnly),
        Arc::new(harness.dependencies()),
    )
    .await
    .unwrap();

    assert!(result.saved_path.is_none());
    assert!(result.copied_to_clipboard);
    assert_eq!(*harness.saver.calls.lock().unwrap(), 0);
    assert_eq!(*harness.saver.temp_calls.lock().unwrap(), 1);
    assert_eq!(
        *harness.clipboard.offered.lock().unwrap(),
        vec![
            Representation::NativeImage,
            Representation::Encoded("image/png"),
            Representation::FileList
        ]
    );
}

#[tokio::test]
async fn file_and_clipboard_reuses_saved_file() {
    let harness = Harness::new();
    let result = perform_shot(
        request(ShotDestination::FileAndClipboard),
        Arc::new(harness.dependencies()),
    )
    .await
    .unwrap();

    assert!(result.saved_path.is_some());
    assert!(result.copied_to_clipboard);
    assert_eq!(*harness.saver.calls.lock().unwrap(), 1);
    assert_eq!(*harness.saver.temp_calls.lock().unwrap(), 0);
    assert_eq!(*harness.clipboard.calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn file_flavor_can_be_disabled() {
    let harness = Harness::new();
    let mut req = request(ShotDestination::ClipboardOnly);
    req.clipboard_file_flavor = false;
    req.options.format = ImageFormat::Svg;

    perform_shot(req, Arc::new(harness.dependencies()))
        .await
        .unwrap();
    assert_eq!(*harness.saver.temp_calls.lock().unwrap(), 0);
    assert_eq!(
        *harness.clipboard.offered.lock().unwrap(),
        vec![Representation::Encoded("image/svg+xml")]
    );
}

#[tokio::test]
async fn clipboard_failure_is_not_fatal() {
    let mut harness = Harness::new();
    harness.clipboard.should_fail = true;

    let result = perform_shot(
        request(ShotDestination::FileAndClipboard),
        Arc::new(harness.dependencies()),
    )
    .await
    .unwrap();
    assert!(result.saved_path.is_some());
    assert!(!result.copied_to_clipboard);
    assert_eq!(*harness.clipboard.calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn save_failure_is_reported() {
    let mut harness = Harness::new();
    harness.saver.should_fail = true;

    let err = perform_shot(
        request(ShotDestination::FileAndClipboard),
        Arc::new(harness.dependencies()),
    )
    .await
    .unwrap_err();
    match err {
        ShotError::Write { ref path, .. } => assert_eq!(path, &PathBuf::from("/tmp/shot.png")),
        other => panic!("expected Write, got {:?}", other),
    }
    assert_eq!(*harness.saver.calls.lock().unwrap(), 1);
    assert_eq!(*harness.clipboard.calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn large_images_need_force() {
    let harness = Harness::new();
    let mut guarded = request(ShotDestination::FileOnly);
    guarded.max_pixels = Some(40);

    let err = perform_shot(guarded, Arc::new(harness.dependencies()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ShotError::TooLarge {
            pixels: 48,
            limit: 40
        }
    ));
    assert_eq!(*harness.saver.calls.lock().unwrap(), 0);

    let mut forced = request(ShotDestination::FileOnly);
    forced.max_pixels = None;
    let result = perform_shot(forced, Arc::new(harness.dependencies()))
        .await
        .unwrap();
    assert_eq!((result.width, result.height), (8, 6));
}

#[tokio::test]
async fn missing_save_config_skips_file() {
    let harness = Harness::new();
    let mut req = request(ShotDestination::FileOnly);
    req.save_config = None;

    let result = perform_shot(req, Arc::new(harness.dependencies()))
        .await
        .unwrap();
    assert!(result.saved_path.is_none());
    assert_eq!(*harness.saver.calls.lock().unwrap(), 0);
}

async fn wait_for_outcome(manager: &ShotManager) -> Option<ShotOutcome> {
    for _ in 0..50 {
        if let Some(result) = manager.try_take_result() {
            return Some(result);
        }
        sleep(Duration::from_millis(20)).await;
    }
    None
}

#[tokio::test]
async fn test_shot_manager_with_dependencies() {
    let harness = Harness::new();
    let manager =
        ShotManager::with_dependencies(&tokio::runtime::Handle::current(), harness.dependencies());

    manager
        .request_shot(request(ShotDestination::ClipboardOnly))
        .unwrap();

    match wait_for_outcome(&manager).await {
        Some(ShotOutcome::Success(result)) => {
            assert!(result.saved_path.is_none());
            assert!(result.copied_to_clipboard);
        }
        other => panic!("Expected success outcome, got {:?}", other),
    }
    assert_eq!(*harness.clipboard.calls.lock().unwrap(), 1);
    assert_eq!(manager.get_status().await, ShotStatus::Success);

    manager.reset().await;
    assert_eq!(manager.get_status().await, ShotStatus::Idle);
}

#[test]
fn request_shot_returns_error_when_channel_closed() {
    let manager = ShotManager::with_closed_channel_for_test();
    let err = manager
        .request_shot(request(ShotDestination::ClipboardOnly))
        .expect_err("should fail when channel closed");
    assert!(
        matches!(err, ShotError::Task(ref msg) if msg.contains("not running")),
        "unexpected error variant: {err:?}"
    );
}

#[tokio::test]
async fn shot_manager_records_failure_status() {
    let mut harness = Harness::new();
    harness.saver.should_fail = true;
    let manager =
        ShotManager::with_dependencies(&tokio::runtime::Handle::current(), harness.dependencies());

    manager
        .request_shot(request(ShotDestination::FileOnly))
        .unwrap();

    match wait_for_outcome(&manager).await {
        Some(ShotOutcome::Failed(msg)) => {
            assert!(msg.contains("save failed"), "unexpected failure message: {msg}");
        }
        other => panic!("Expected failure outcome, got {other:?}"),
    }

    assert!(matches!(
        manager.get_status().await,
        ShotStatus::Failed(_)
    ));
}
