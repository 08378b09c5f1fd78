use crate::client::Client;
use crate::config::{CaptureMode, Config};
use crate::error::{Error, Result};
use crate::models::{non_empty, RecognizeResponse};
use crate::page::{Page, StatusKind, CONNECTING_LABEL, CONNECT_LABEL};
use crate::view::View;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Shown when connect is attempted with a blank address.
pub const EMPTY_ADDRESS_MESSAGE: &str = "IP 주소를 입력하세요";

/// Operator input, as the page's event listeners would deliver it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Loaded,
    AddressEdited(String),
    /// Enter pressed in the address field.
    AddressSubmitted,
    ConnectClicked,
    CaptureClicked,
    RetryClicked,
}

/// Background reader of `/video_feed`, alive while the page shows the live stream.
struct LiveStream {
    task: JoinHandle<()>,
    received: watch::Receiver<u64>,
}

/// Drives the operator page against the recognition backend.
///
/// Lives from page load to unload. Actions take `&mut self`, so only one
/// runs at a time.
pub struct Controller<V: View> {
    client: Client,
    mode: CaptureMode,
    save_dir: Option<PathBuf>,
    page: Page,
    view: V,
    stream: Option<LiveStream>,
}

impl<V: View> Controller<V> {
    pub fn new(client: Client, mode: CaptureMode, view: V) -> Self {
        Self {
            client,
            mode,
            save_dir: None,
            page: Page::default(),
            view,
            stream: None,
        }
    }

    pub fn from_config(config: &Config, view: V) -> Result<Self> {
        let client = Client::from_config(config)?;
        Ok(Self::new(client, config.mode, view).with_save_dir(config.save_dir.clone()))
    }

    pub fn with_save_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.save_dir = dir;
        self
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    /// Whether a `/video_feed` reader is running.
    pub fn is_streaming(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| !s.task.is_finished())
    }

    /// Waits up to `limit` for the live stream to deliver its first bytes.
    pub async fn wait_for_live_frame(&mut self, limit: Duration) -> bool {
        let Some(stream) = self.stream.as_mut() else {
            return false;
        };
        let arrived = tokio::time::timeout(limit, stream.received.wait_for(|bytes| *bytes > 0)).await;
        matches!(arrived, Ok(Ok(_)))
    }

    /// Shows the live stream and starts reading it, replacing any earlier reader.
    fn open_live_stream(&mut self) {
        self.close_live_stream();
        self.page.show_live(self.client.video_feed_url());

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No tokio runtime, live stream not opened");
            return;
        };
        let client = self.client.clone();
        let (tx, rx) = watch::channel(0);
        let task = runtime.spawn(async move {
            match client.consume_video_feed(tx).await {
                Ok(total) => tracing::info!(bytes = total, "Live stream closed by backend"),
                Err(e) => tracing::warn!("Live stream failed: {}", e),
            }
        });
        self.stream = Some(LiveStream { task, received: rx });
    }

    fn close_live_stream(&mut self) {
        if let Some(stream) = self.stream.take() {
            stream.task.abort();
            tracing::debug!("Live stream closed");
        }
    }

    fn render(&mut self) {
        self.view.render(&self.page);
    }

    /// Routes an event to its action. Returns `false` when the control the
    /// event targets is disabled or hidden, in which case nothing happens.
    pub async fn dispatch(&mut self, event: UiEvent) -> bool {
        match event {
            UiEvent::Loaded => self.check_status().await,
            UiEvent::AddressEdited(address) => {
                self.page.address = address;
                self.render();
            }
            UiEvent::AddressSubmitted | UiEvent::ConnectClicked => {
                if !self.page.connect.clickable() {
                    tracing::debug!(?event, "Connect control unavailable");
                    return false;
                }
                let address = self.page.address.clone();
                self.connect(&address).await;
            }
            UiEvent::CaptureClicked => {
                if !self.page.capture.clickable() {
                    tracing::debug!(?event, "Capture control unavailable");
                    return false;
                }
                self.capture_and_recognize().await;
            }
            UiEvent::RetryClicked => {
                if !self.page.retry.clickable() {
                    tracing::debug!(?event, "Retry control unavailable");
                    return false;
                }
                self.retry_capture();
            }
        }
        true
    }

    /// Points the backend at the camera at `input` and starts the live stream.
    pub async fn connect(&mut self, input: &str) {
        let ip = input.trim();
        if ip.is_empty() {
            self.page.show_status(EMPTY_ADDRESS_MESSAGE, StatusKind::Error);
            self.render();
            return;
        }

        self.page.connect.enabled = false;
        self.page.connect.label = CONNECTING_LABEL.to_string();
        self.render();

        match self.client.set_camera(ip).await {
            Ok(data) if data.success => {
                tracing::info!(ip, "Camera connected");
                self.page.show_status("Connected successfully!", StatusKind::Success);
                self.open_live_stream();
                self.page.capture.enabled = true;
            }
            Ok(data) => {
                tracing::info!(ip, error = ?data.error, "Camera connection refused");
                let message = non_empty(data.error.as_deref()).unwrap_or("Connection failed");
                self.page.show_status(message, StatusKind::Error);
            }
            Err(e) => {
                tracing::warn!(ip, "set_camera failed: {}", e);
                self.page
                    .show_status(format!("Network error: {e}"), StatusKind::Error);
            }
        }

        self.page.connect.enabled = true;
        self.page.connect.label = CONNECT_LABEL.to_string();
        self.render();
    }

    pub async fn capture_and_recognize(&mut self) {
        self.page.capture.enabled = false;
        self.page.loading = true;
        self.render();

        match self.mode {
            CaptureMode::SingleStep => match self.client.capture().await {
                Ok(data) => self.show_recognition(&data),
                Err(e) => {
                    tracing::warn!("capture failed: {}", e);
                    self.page.show_result_error(format!("Error: {e}"));
                }
            },
            CaptureMode::FreezeThenRecognize => match self.freeze_then_recognize().await {
                Ok(data) => self.show_recognition(&data),
                Err(e) => {
                    tracing::warn!("freeze/recognize failed: {}", e);
                    self.page.show_result_error(format!("Error: {e}"));
                    self.page.enter_review();
                }
            },
        }

        self.page.capture.enabled = true;
        self.page.loading = false;
        self.render();
    }

    async fn freeze_then_recognize(&mut self) -> Result<RecognizeResponse> {
        let frozen = self.client.freeze().await?;
        let filename = match non_empty(frozen.filename.as_deref()) {
            Some(filename) if frozen.success => filename.to_string(),
            _ => {
                let message = non_empty(frozen.error.as_deref()).unwrap_or("Freeze failed");
                return Err(Error::Backend(message.to_string()));
            }
        };
        tracing::info!(%filename, "Frame frozen");

        let url = self.client.capture_image_url(&filename)?;
        self.page.show_frozen(url, filename.clone());
        self.close_live_stream();
        self.render();

        if let Some(dir) = &self.save_dir {
            if let Err(e) = self.client.download_capture(&filename, dir).await {
                tracing::warn!(%filename, "Could not save frozen frame: {}", e);
            }
        }

        self.client.recognize(&filename).await
    }

    fn show_recognition(&mut self, data: &RecognizeResponse) {
        if data.success {
            tracing::info!(plate = ?data.plate_number, confidence = ?data.confidence, "Plate recognized");
        } else {
            tracing::info!(error = ?data.error, "No plate recognized");
        }
        self.page.show_recognition(data);
    }

    /// Drops the frozen frame and returns to the live stream. Only the stream
    /// itself is reopened; nothing else is sent to the backend.
    pub fn retry_capture(&mut self) {
        if self.mode == CaptureMode::SingleStep {
            tracing::debug!("Retry has no meaning in single-step mode");
            return;
        }
        self.page.leave_review(self.client.video_feed_url());
        self.open_live_stream();
        self.render();
    }

    /// Restores an existing camera session on page load. Failures are only logged.
    pub async fn check_status(&mut self) {
        let status = match self.client.status().await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!("Status check failed: {}", e);
                return;
            }
        };

        if !status.camera_connected {
            return;
        }
        let Some(url) = non_empty(status.camera_url.as_deref()) else {
            return;
        };

        self.page.address = url.to_string();
        if status.has_frame.unwrap_or(false) {
            self.open_live_stream();
            self.page.capture.enabled = true;
            self.page
                .show_status("Camera already connected", StatusKind::Success);
        }
        self.render();
    }
}

impl<V: View> Drop for Controller<V> {
    fn drop(&mut self) {
        self.close_live_stream();
    }
}
