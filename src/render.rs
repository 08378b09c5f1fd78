//! Text shown in the result panel.

use crate::models::TextCandidate;

/// Converts a `0..=1` confidence fraction to a whole percentage, rounding half up.
pub fn confidence_percent(fraction: f64) -> i64 {
    (fraction * 100.0 + 0.5).floor() as i64
}

pub fn format_confidence(fraction: f64) -> String {
    format!("Confidence: {}%", confidence_percent(fraction))
}

/// `Detected texts: "A" (91%), "B" (40%)`, or an empty string when nothing was detected.
pub fn format_detected_texts(candidates: &[TextCandidate]) -> String {
    if candidates.is_empty() {
        return String::new();
    }
    let texts = candidates
        .iter()
        .map(|c| format!("\"{}\" ({}%)", c.text, confidence_percent(c.confidence)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("Detected texts: {texts}")
}
