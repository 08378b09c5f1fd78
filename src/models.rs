use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /set_camera`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConnectRequest {
    pub ip: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ConnectResponse {
    #[serde(default)]
    pub success: bool,
    pub error: Option<String>,
    pub message: Option<String>,
}

/// Answer of `POST /freeze`. `filename` names the still frame under `/captures/`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FreezeResponse {
    #[serde(default)]
    pub success: bool,
    pub filename: Option<String>,
    pub timestamp: Option<String>,
    pub error: Option<String>,
}

/// One OCR text candidate. The backend also sends a bounding box, which is ignored.
/// A missing or `null` field reads as empty text / zero confidence.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TextCandidate {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub confidence: f64,
}

/// Answer of `POST /capture` and `POST /recognize/<filename>`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RecognizeResponse {
    #[serde(default)]
    pub success: bool,
    pub plate_number: Option<String>,
    /// Fraction in `0..=1`.
    pub confidence: Option<f64>,
    pub all_texts: Option<Vec<TextCandidate>>,
    pub error: Option<String>,
    pub captured_file: Option<String>,
    pub timestamp: Option<String>,
}

impl RecognizeResponse {
    pub fn candidates(&self) -> &[TextCandidate] {
        self.all_texts.as_deref().unwrap_or_default()
    }
}

/// Answer of `GET /status`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct StatusResponse {
    #[serde(default)]
    pub camera_connected: bool,
    pub camera_url: Option<String>,
    pub has_frame: Option<bool>,
    pub recognizer_ready: Option<bool>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Treats `None` and `""` alike, the way the backend's optional strings are meant.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
