use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{ConnectRequest, ConnectResponse, FreezeResponse, RecognizeResponse, StatusResponse};
use reqwest::Client as ReqwestClient;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::sync::watch;

/// Typed client for the recognition backend's REST surface.
#[derive(Clone, Debug)]
pub struct Client {
    http_client: ReqwestClient,
    base_url: String,
}

impl Client {
    pub fn new(base_url: String) -> Self {
        Self {
            http_client: ReqwestClient::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let http_client = ReqwestClient::builder()
            .connect_timeout(config.connect_timeout)
            .build()?;
        Ok(Self {
            http_client,
            base_url: config.server.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// MJPEG stream of the connected camera.
    pub fn video_feed_url(&self) -> String {
        format!("{}/video_feed", self.base_url)
    }

    /// Still image written by a previous freeze.
    pub fn capture_image_url(&self, filename: &str) -> Result<String> {
        validate_filename(filename)?;
        Ok(format!("{}/captures/{}", self.base_url, filename))
    }

    pub async fn set_camera(&self, ip: &str) -> Result<ConnectResponse> {
        let url = format!("{}/set_camera", self.base_url);
        tracing::debug!(%url, ip, "POST set_camera");
        let response = self
            .http_client
            .post(&url)
            .json(&ConnectRequest { ip: ip.to_string() })
            .send()
            .await?;
        decode(response).await
    }

    /// Single-step capture: the backend grabs a frame and recognizes it.
    pub async fn capture(&self) -> Result<RecognizeResponse> {
        self.post_empty(&format!("{}/capture", self.base_url)).await
    }

    pub async fn freeze(&self) -> Result<FreezeResponse> {
        self.post_empty(&format!("{}/freeze", self.base_url)).await
    }

    pub async fn recognize(&self, filename: &str) -> Result<RecognizeResponse> {
        validate_filename(filename)?;
        self.post_empty(&format!("{}/recognize/{}", self.base_url, filename))
            .await
    }

    pub async fn status(&self) -> Result<StatusResponse> {
        let url = format!("{}/status", self.base_url);
        tracing::debug!(%url, "GET status");
        let response = self.http_client.get(&url).send().await?;
        decode(response).await
    }

    /// Downloads a frozen frame into `dir`, returning the written path.
    pub async fn download_capture(&self, filename: &str, dir: &Path) -> Result<PathBuf> {
        let url = self.capture_image_url(filename)?;
        tracing::debug!(%url, "GET capture image");
        let bytes = self
            .http_client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(filename);
        tokio::fs::write(&path, &bytes).await?;
        tracing::info!(path = %path.display(), size = bytes.len(), "Saved frozen frame");
        Ok(path)
    }

    /// Reads `/video_feed` until the backend closes it, publishing the running
    /// byte count on `received`. The backend only grabs camera frames while
    /// this stream is being read.
    pub async fn consume_video_feed(&self, received: watch::Sender<u64>) -> Result<u64> {
        let url = self.video_feed_url();
        tracing::debug!(%url, "GET video_feed");
        let mut response = self
            .http_client
            .get(&url)
            .send()
            .await?
            .error_for_status()?;

        let mut total = 0u64;
        while let Some(chunk) = response.chunk().await? {
            total += chunk.len() as u64;
            received.send_replace(total);
        }
        Ok(total)
    }

    async fn post_empty<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!(%url, "POST");
        let response = self.http_client.post(url).send().await?;
        decode(response).await
    }
}

/// The backend reports application failures in the JSON body, so the body is
/// decoded whatever the HTTP status is.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        tracing::debug!(%status, url = %response.url(), "Backend returned non-success status");
    }
    Ok(response.json::<T>().await?)
}

/// Capture filenames are interpolated into URL paths and local file paths,
/// so they must be a single plain path segment.
fn validate_filename(filename: &str) -> Result<()> {
    let bad = filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename
            .chars()
            .any(|c| matches!(c, '/' | '\\' | '?' | '#') || c.is_control());
    if bad {
        return Err(Error::InvalidFilename(filename.to_string()));
    }
    Ok(())
}
