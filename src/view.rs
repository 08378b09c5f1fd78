use crate::page::{Media, Page, StatusKind, CONNECTING_LABEL};
use crate::render::confidence_percent;
use colored::*;
use std::io::{self, Write};

/// Something that shows the operator page.
///
/// `render` is called after every observable step of an action, so a view
/// sees intermediate states such as the loading overlay.
pub trait View {
    fn render(&mut self, page: &Page);
}

/// Keeps every rendered page. Handy for headless use and tests.
#[derive(Debug, Default)]
pub struct RecordingView {
    pub frames: Vec<Page>,
}

impl RecordingView {
    pub fn last(&self) -> Option<&Page> {
        self.frames.last()
    }
}

impl View for RecordingView {
    fn render(&mut self, page: &Page) {
        self.frames.push(page.clone());
    }
}

/// Prints what changed since the previous render.
pub struct TerminalView<W: Write> {
    out: W,
    last: Page,
}

impl TerminalView<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last: Page::default(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, page: &Page) -> io::Result<()> {
        let last = &self.last;
        let out = &mut self.out;

        if page.connect.label != last.connect.label && page.connect.label == CONNECTING_LABEL {
            writeln!(out, "{} {}", "→".bright_blue(), CONNECTING_LABEL.bright_black())?;
        }

        if page.status != last.status {
            if let Some(status) = &page.status {
                match status.kind {
                    StatusKind::Success => writeln!(out, "✔ {}", status.message.green().bold())?,
                    StatusKind::Error => writeln!(out, "✖ {}", status.message.red().bold())?,
                }
            }
        }

        if page.address != last.address && !page.address.is_empty() {
            writeln!(out, "  {} Camera address: {}", "→".bright_blue(), page.address.bright_cyan())?;
        }

        if page.media != last.media {
            match &page.media {
                Media::Placeholder => writeln!(out, "  {} {}", "→".bright_blue(), "No video".bright_black())?,
                Media::Live { url } => {
                    writeln!(out, "  {} Live stream: {}", "▶".bright_green(), url.bright_cyan())?
                }
                Media::Frozen { url, .. } => {
                    writeln!(out, "  {} Frozen frame: {}", "■".bright_yellow(), url.bright_cyan())?
                }
            }
        }

        if page.loading && !last.loading {
            writeln!(out, "{} {}", "…".bright_blue(), "Recognizing".bright_black())?;
        }

        if page.result != last.result && page.result.visible {
            let result = &page.result;
            if result.is_error {
                writeln!(out, "✖ {}", result.plate.red().bold())?;
            } else {
                writeln!(out, "✔ Plate: {}", result.plate.bright_green().bold())?;
                writeln!(out, "  {} {}", "→".bright_blue(), result.confidence)?;
            }
            if !result.candidates.is_empty() {
                let mut table = comfy_table::Table::new();
                table
                    .set_header(vec!["#", "Text", "Confidence"])
                    .load_preset(comfy_table::presets::UTF8_FULL_CONDENSED)
                    .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
                for (index, candidate) in result.candidates.iter().enumerate() {
                    table.add_row(vec![
                        (index + 1).to_string(),
                        candidate.text.clone(),
                        format!("{}%", confidence_percent(candidate.confidence)),
                    ]);
                }
                writeln!(out, "{table}")?;
            }
            if let Some(file) = &result.captured_file {
                writeln!(out, "  {} Frame: {}", "→".bright_blue(), file.bright_black())?;
            }
        }

        if page.retry.visible && !last.retry.visible {
            writeln!(
                out,
                "  {} Use {} to return to the live stream",
                "→".bright_blue(),
                "retry".bright_green()
            )?;
        } else if page.capture.clickable() && !last.capture.clickable() {
            writeln!(out, "  {} Ready to {}", "→".bright_blue(), "capture".bright_green())?;
        }

        out.flush()
    }
}

impl<W: Write> View for TerminalView<W> {
    fn render(&mut self, page: &Page) {
        if let Err(e) = self.draw(page) {
            tracing::warn!("Failed to draw page: {}", e);
        }
        self.last = page.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecognizeResponse, TextCandidate};

    fn output(view: TerminalView<Vec<u8>>) -> String {
        String::from_utf8(view.into_inner()).unwrap()
    }

    #[test]
    fn recording_view_keeps_every_frame() {
        let mut view = RecordingView::default();
        let mut page = Page::default();
        view.render(&page);
        page.loading = true;
        view.render(&page);
        assert_eq!(view.frames.len(), 2);
        assert!(view.last().unwrap().loading);
    }

    #[test]
    fn terminal_view_prints_recognition() {
        let mut view = TerminalView::new(Vec::new());
        let mut page = Page::default();
        page.show_recognition(&RecognizeResponse {
            success: true,
            plate_number: Some("12가3456".to_string()),
            confidence: Some(0.873),
            all_texts: Some(vec![TextCandidate {
                text: "ABC".to_string(),
                confidence: 0.4,
            }]),
            captured_file: Some("capture_1.jpg".to_string()),
            ..Default::default()
        });
        view.render(&page);

        let text = output(view);
        assert!(text.contains("12가3456"));
        assert!(text.contains("Confidence: 87%"));
        assert!(text.contains("ABC"));
        assert!(text.contains("40%"));
        assert!(text.contains("capture_1.jpg"));
    }

    #[test]
    fn terminal_view_prints_only_changes() {
        let mut view = TerminalView::new(Vec::new());
        let mut page = Page::default();
        page.show_status("Connected successfully!", StatusKind::Success);
        view.render(&page);
        view.render(&page);

        let text = output(view);
        assert_eq!(text.matches("Connected successfully!").count(), 1);
    }

    #[test]
    fn terminal_view_prints_media_switches() {
        let mut view = TerminalView::new(Vec::new());
        let mut page = Page::default();
        page.show_live("http://lpr/video_feed".to_string());
        view.render(&page);
        page.show_frozen("http://lpr/captures/c.jpg".to_string(), "c.jpg".to_string());
        view.render(&page);

        let text = output(view);
        assert!(text.contains("http://lpr/video_feed"));
        assert!(text.contains("http://lpr/captures/c.jpg"));
        assert!(text.contains("retry"));
    }
}
