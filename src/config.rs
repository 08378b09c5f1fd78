use std::path::PathBuf;
use std::time::Duration;

/// Backend address used when nothing else is configured.
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";

/// Time allowed to establish the TCP connection to the backend.
/// Requests themselves are never timed out.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How a capture request is carried out.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureMode {
    /// One `POST /capture` that returns the recognition result directly.
    #[value(name = "single")]
    SingleStep,
    /// `POST /freeze`, show the frozen frame, then `POST /recognize/<filename>`.
    #[default]
    #[value(name = "freeze")]
    FreezeThenRecognize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub server: String,
    pub mode: CaptureMode,
    pub connect_timeout: Duration,
    /// Where frozen frames are written after a successful freeze.
    pub save_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER)
    }
}

impl Config {
    pub fn new(server: impl Into<String>) -> Self {
        let server = server.into();
        Self {
            server: server.trim().trim_end_matches('/').to_string(),
            mode: CaptureMode::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            save_dir: None,
        }
    }

    pub fn with_mode(mut self, mode: CaptureMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_save_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.save_dir = dir;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_trimmed() {
        let config = Config::new(" http://10.0.0.2:5000// ");
        assert_eq!(config.server, "http://10.0.0.2:5000");
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.server, DEFAULT_SERVER);
        assert_eq!(config.mode, CaptureMode::FreezeThenRecognize);
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert!(config.save_dir.is_none());
    }

    #[test]
    fn builder_methods() {
        let config = Config::new("http://lpr.local")
            .with_mode(CaptureMode::SingleStep)
            .with_connect_timeout(Duration::from_secs(3))
            .with_save_dir(Some(PathBuf::from("/tmp/frames")));
        assert_eq!(config.mode, CaptureMode::SingleStep);
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.save_dir, Some(PathBuf::from("/tmp/frames")));
    }
}
