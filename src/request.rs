use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::wire::{Content, GenerateContentRequest, InlineData, Part};

/// Instruction sent with every pose analysis.
pub const POSE_ANALYSIS_PROMPT: &str = "Analyze this gymnastics pose for injury prevention. \
Identify specific risks like 'knee valgus' (knees caving in), 'spinal hyperextension', \
or 'poor landing mechanics'. Provide 3 bullet points: 1. Observation, 2. Potential Risk, \
3. Corrective Cue. Keep it professional and concise.";

/// MIME type assumed when a data URI does not declare one.
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Image bytes in base64 form, tagged with a MIME type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImagePayload {
    mime_type: String,
    base64: String,
}

impl ImagePayload {
    /// Encodes raw bytes with the standard base64 alphabet.
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            base64: STANDARD.encode(bytes),
        }
    }

    /// Wraps data that is already base64 encoded. The content is not checked.
    pub fn from_base64(mime_type: impl Into<String>, base64: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            base64: base64.into(),
        }
    }

    /// Splits a `data:<mime>;base64,<data>` URI.
    ///
    /// Data is everything after the first comma, or empty when there is no
    /// comma. The MIME type falls back to [`DEFAULT_IMAGE_MIME`]. Nothing is
    /// validated; a malformed URI is forwarded and left to the remote service.
    pub fn from_data_uri(uri: &str) -> Self {
        let (header, data) = uri.split_once(',').unwrap_or((uri, ""));
        let mime_type = header
            .trim()
            .strip_prefix("data:")
            .and_then(|rest| rest.split(';').next())
            .map(str::trim)
            .filter(|mime| !mime.is_empty())
            .unwrap_or(DEFAULT_IMAGE_MIME);

        Self::from_base64(mime_type, data.trim())
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn base64(&self) -> &str {
        &self.base64
    }
}

/// One logical call to the remote service. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisRequest {
    instruction: String,
    image: Option<ImagePayload>,
}

impl AnalysisRequest {
    /// Text-only request.
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            image: None,
        }
    }

    /// Request carrying an instruction and an image.
    pub fn with_image(instruction: impl Into<String>, image: ImagePayload) -> Self {
        Self {
            instruction: instruction.into(),
            image: Some(image),
        }
    }

    /// [`POSE_ANALYSIS_PROMPT`] applied to the image in `image_data_uri`.
    pub fn pose_analysis(image_data_uri: &str) -> Self {
        Self::with_image(
            POSE_ANALYSIS_PROMPT,
            ImagePayload::from_data_uri(image_data_uri),
        )
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn image(&self) -> Option<&ImagePayload> {
        self.image.as_ref()
    }

    pub(crate) fn to_wire(&self) -> GenerateContentRequest {
        let mut parts = Vec::with_capacity(2);
        parts.push(Part::Text {
            text: self.instruction.clone(),
        });
        if let Some(image) = &self.image {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type.clone(),
                    data: image.base64.clone(),
                },
            });
        }

        GenerateContentRequest {
            contents: vec![Content { parts }],
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{AnalysisRequest, ImagePayload, DEFAULT_IMAGE_MIME, POSE_ANALYSIS_PROMPT};

    #[test]
    fn text_only_payload_has_single_part() {
        let wire = serde_json::to_value(AnalysisRequest::new("hello").to_wire())
            .expect("payload must serialize");
        assert_eq!(wire, json!({ "contents": [ { "parts": [ { "text": "hello" } ] } ] }));
        assert!(!wire.to_string().contains("inlineData"));
    }

    #[test]
    fn image_payload_becomes_inline_data_part() {
        let request =
            AnalysisRequest::with_image("look", ImagePayload::from_bytes("image/jpeg", b"abc"));
        let wire = serde_json::to_value(request.to_wire()).expect("payload must serialize");
        assert_eq!(
            wire,
            json!({
                "contents": [ {
                    "parts": [
                        { "text": "look" },
                        { "inlineData": { "mimeType": "image/jpeg", "data": "YWJj" } }
                    ]
                } ]
            })
        );
    }

    #[test]
    fn data_uri_strips_prefix_and_keeps_mime() {
        let image = ImagePayload::from_data_uri("data:image/webp;base64,UklGRg==");
        assert_eq!(image.mime_type(), "image/webp");
        assert_eq!(image.base64(), "UklGRg==");
    }

    #[test]
    fn data_uri_without_mime_defaults_to_png() {
        let image = ImagePayload::from_data_uri("data:;base64,iVBORw0K");
        assert_eq!(image.mime_type(), DEFAULT_IMAGE_MIME);
        assert_eq!(image.base64(), "iVBORw0K");
    }

    #[test]
    fn malformed_data_uri_is_forwarded_with_empty_data() {
        let image = ImagePayload::from_data_uri("not a data uri");
        assert_eq!(image.mime_type(), DEFAULT_IMAGE_MIME);
        assert_eq!(image.base64(), "");
    }

    #[test]
    fn pose_analysis_uses_fixed_prompt() {
        let request = AnalysisRequest::pose_analysis("data:image/png;base64,AAAA");
        assert_eq!(request.instruction(), POSE_ANALYSIS_PROMPT);
        assert_eq!(request.image().map(ImagePayload::base64), Some("AAAA"));
    }
}
