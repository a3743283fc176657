use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

use crate::shot::{
    dependencies::ShotDependencies,
    pipeline::{ShotRequest, perform_shot},
    types::{ShotError, ShotOutcome, ShotStatus},
};

/// Runs shot requests on a background task, one at a time.
///
/// Callers submit without waiting and poll the status or the last outcome.
#[derive(Clone)]
pub struct ShotManager {
    /// Channel for sending shot requests.
    request_tx: mpsc::UnboundedSender<ShotRequest>,
    /// Shared status of the current shot.
    status: Arc<Mutex<ShotStatus>>,
    /// Shared result of the last shot (if any).
    last_result: Arc<Mutex<Option<ShotOutcome>>>,
}

impl ShotManager {
    /// Create a new shot manager.
    ///
    /// This spawns a background task that processes requests in order.
    pub fn new(runtime_handle: &tokio::runtime::Handle) -> Self {
        Self::with_dependencies(runtime_handle, ShotDependencies::default())
    }

    /// Create a shot manager with custom dependencies (useful for testing).
    pub fn with_dependencies(
        runtime_handle: &tokio::runtime::Handle,
        dependencies: ShotDependencies,
    ) -> Self {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<ShotRequest>();
        let status = Arc::new(Mutex::new(ShotStatus::Idle));
        let last_result = Arc::new(Mutex::new(None));
        let dependencies = Arc::new(dependencies);

        let status_clone = status.clone();
        let result_clone = last_result.clone();

        runtime_handle.spawn(async move {
            while let Some(request) = request_rx.recv().await {
                log::debug!("Processing shot request: {:?}", request);

                *status_clone.lock().await = ShotStatus::InProgress;

                match perform_shot(request, dependencies.clone()).await {
                    Ok(result) => {
                        log::info!("Shot successful: {:?}", result.saved_path);
                        *status_clone.lock().await = ShotStatus::Success;
                        *result_clone.lock().await = Some(ShotOutcome::Success(result));
                    }
                    Err(e) => {
                        let error_message = e.to_string();
                        log::error!("Shot failed: {}", error_message);
                        *status_clone.lock().await = ShotStatus::Failed(error_message.clone());
                        *result_clone.lock().await = Some(ShotOutcome::Failed(error_message));
                    }
                }
            }
        });

        Self {
            request_tx,
            status,
            last_result,
        }
    }

    /// Queue a shot. Returns immediately; the work happens in the background.
    pub fn request_shot(&self, request: ShotRequest) -> Result<(), ShotError> {
        self.request_tx
            .send(request)
            .map_err(|_| ShotError::Task("Shot manager not running".to_string()))?;

        Ok(())
    }

    /// Get the current status.
    pub async fn get_status(&self) -> ShotStatus {
        self.status.lock().await.clone()
    }

    /// Get the result of the last shot and clear it.
    pub async fn take_result(&self) -> Option<ShotOutcome> {
        self.last_result.lock().await.take()
    }

    /// Try to get the result without waiting (non-blocking).
    pub fn try_take_result(&self) -> Option<ShotOutcome> {
        self.last_result.try_lock().ok().and_then(|mut r| r.take())
    }

    /// Reset status to idle.
    pub async fn reset(&self) {
        *self.status.lock().await = ShotStatus::Idle;
    }
}

#[cfg(test)]
impl ShotManager {
    pub(crate) fn with_closed_channel_for_test() -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<ShotRequest>();
        drop(rx);
        Self {
            request_tx: tx,
            status: Arc::new(Mutex::new(ShotStatus::Idle)),
            last_result: Arc::new(Mutex::new(None)),
        }
    }
}
