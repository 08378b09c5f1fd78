//! State of every control on the operator page.
//!
//! The controller mutates a [`Page`] and hands it to a view after each step;
//! views never change it.

use crate::models::{non_empty, RecognizeResponse, TextCandidate};
use crate::render::{format_confidence, format_detected_texts};

pub const CONNECT_LABEL: &str = "Connect";
pub const CONNECTING_LABEL: &str = "Connecting...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub message: String,
    pub kind: StatusKind,
}

/// What the media element currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Media {
    /// "No video" placeholder.
    #[default]
    Placeholder,
    Live { url: String },
    Frozen { url: String, filename: String },
}

/// Live or frozen review, for freeze-then-recognize capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Live,
    Frozen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub enabled: bool,
    pub visible: bool,
}

impl Button {
    fn new(label: &str, enabled: bool, visible: bool) -> Self {
        Self {
            label: label.to_string(),
            enabled,
            visible,
        }
    }

    /// Whether a click would reach the handler.
    pub fn clickable(&self) -> bool {
        self.enabled && self.visible
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultPanel {
    pub visible: bool,
    pub plate: String,
    /// Plate line is styled as an error.
    pub is_error: bool,
    pub confidence: String,
    pub details: String,
    pub candidates: Vec<TextCandidate>,
    pub captured_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub address: String,
    pub connect: Button,
    pub status: Option<StatusLine>,
    pub media: Media,
    pub capture: Button,
    pub retry: Button,
    pub loading: bool,
    pub result: ResultPanel,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            address: String::new(),
            connect: Button::new(CONNECT_LABEL, true, true),
            status: None,
            media: Media::Placeholder,
            capture: Button::new("Capture", false, true),
            retry: Button::new("Retry", true, false),
            loading: false,
            result: ResultPanel::default(),
        }
    }
}

impl Page {
    pub fn phase(&self) -> Phase {
        if self.retry.visible {
            Phase::Frozen
        } else {
            Phase::Live
        }
    }

    pub fn show_status(&mut self, message: impl Into<String>, kind: StatusKind) {
        self.status = Some(StatusLine {
            message: message.into(),
            kind,
        });
    }

    pub fn show_live(&mut self, url: String) {
        self.media = Media::Live { url };
    }

    /// Switches to the frozen frame and swaps the capture control for retry.
    pub fn show_frozen(&mut self, url: String, filename: String) {
        self.media = Media::Frozen { url, filename };
        self.enter_review();
    }

    pub fn enter_review(&mut self) {
        self.capture.visible = false;
        self.retry.visible = true;
    }

    /// Back to live review: stream on, result hidden, capture offered again.
    pub fn leave_review(&mut self, live_url: String) {
        self.media = Media::Live { url: live_url };
        self.result = ResultPanel::default();
        self.retry.visible = false;
        self.capture.visible = true;
        self.capture.enabled = true;
    }

    pub fn show_recognition(&mut self, data: &RecognizeResponse) {
        let plate = non_empty(data.plate_number.as_deref());
        match plate {
            Some(plate) if data.success => {
                self.result = ResultPanel {
                    visible: true,
                    plate: plate.to_string(),
                    is_error: false,
                    confidence: format_confidence(data.confidence.unwrap_or_default()),
                    details: format_detected_texts(data.candidates()),
                    candidates: data.candidates().to_vec(),
                    captured_file: data.captured_file.clone(),
                };
            }
            _ => {
                let message = non_empty(data.error.as_deref()).unwrap_or("No license plate detected");
                self.show_result_error(message);
                self.result.captured_file = data.captured_file.clone();
            }
        }
    }

    pub fn show_result_error(&mut self, message: impl Into<String>) {
        self.result = ResultPanel {
            visible: true,
            plate: message.into(),
            is_error: true,
            ..ResultPanel::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_page_is_disconnected() {
        let page = Page::default();
        assert_eq!(page.media, Media::Placeholder);
        assert!(page.connect.clickable());
        assert_eq!(page.connect.label, CONNECT_LABEL);
        assert!(!page.capture.enabled);
        assert!(page.capture.visible);
        assert!(!page.retry.visible);
        assert!(!page.loading);
        assert!(!page.result.visible);
        assert_eq!(page.phase(), Phase::Live);
    }

    #[test]
    fn successful_recognition_fills_the_panel() {
        let mut page = Page::default();
        page.show_recognition(&RecognizeResponse {
            success: true,
            plate_number: Some("12가3456".to_string()),
            confidence: Some(0.873),
            all_texts: Some(vec![
                TextCandidate {
                    text: "12가3456".to_string(),
                    confidence: 0.91,
                },
                TextCandidate {
                    text: "ABC".to_string(),
                    confidence: 0.40,
                },
            ]),
            ..Default::default()
        });

        assert!(page.result.visible);
        assert!(!page.result.is_error);
        assert_eq!(page.result.plate, "12가3456");
        assert_eq!(page.result.confidence, "Confidence: 87%");
        assert_eq!(
            page.result.details,
            r#"Detected texts: "12가3456" (91%), "ABC" (40%)"#
        );
        assert_eq!(page.result.candidates.len(), 2);
    }

    #[test]
    fn success_without_plate_is_shown_as_failure() {
        let mut page = Page::default();
        page.show_recognition(&RecognizeResponse {
            success: true,
            plate_number: Some(String::new()),
            confidence: Some(0.5),
            ..Default::default()
        });
        assert!(page.result.is_error);
        assert_eq!(page.result.plate, "No license plate detected");
        assert_eq!(page.result.confidence, "");
        assert_eq!(page.result.details, "");
    }

    #[test]
    fn failure_prefers_server_error() {
        let mut page = Page::default();
        page.show_recognition(&RecognizeResponse {
            success: false,
            error: Some("Invalid image".to_string()),
            ..Default::default()
        });
        assert!(page.result.is_error);
        assert_eq!(page.result.plate, "Invalid image");
    }

    #[test]
    fn review_round_trip() {
        let mut page = Page::default();
        page.show_frozen(
            "http://lpr/captures/c.jpg".to_string(),
            "c.jpg".to_string(),
        );
        page.show_result_error("Error: boom");
        assert_eq!(page.phase(), Phase::Frozen);
        assert!(!page.capture.visible);

        page.leave_review("http://lpr/video_feed".to_string());
        assert_eq!(page.phase(), Phase::Live);
        assert_eq!(
            page.media,
            Media::Live {
                url: "http://lpr/video_feed".to_string()
            }
        );
        assert!(!page.result.visible);
        assert!(page.capture.clickable());
    }
}
