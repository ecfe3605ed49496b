//! Request/response types for the Gemini `generateContent` endpoint.

use crate::image::types::{is_image_mime_type, ImageInput, TransformRequest};
use serde::{Deserialize, Serialize};

/// Finish reasons that mean the output was withheld by a safety filter.
const BLOCKED_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "IMAGE_SAFETY",
    "IMAGE_PROHIBITED_CONTENT",
    "IMAGE_RECITATION",
    "RECITATION",
    "PROHIBITED_CONTENT",
    "BLOCKLIST",
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<RequestContent>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub(crate) struct RequestContent {
    pub parts: Vec<RequestPart>,
}

/// A part in a request - inline image data or text.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum RequestPart {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub response_modalities: Vec<Modality>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub(crate) enum Modality {
    Image,
    Text,
}

impl GenerateContentRequest {
    /// Image part first, then the instruction; asks for image and text back.
    pub fn from_transform_request(req: &TransformRequest) -> Self {
        let ImageInput { data, mime_type } = &req.image;
        let parts = vec![
            RequestPart::InlineData {
                inline_data: InlineData {
                    mime_type: mime_type.clone(),
                    data: data.clone(),
                },
            },
            RequestPart::Text {
                text: req.prompt.clone(),
            },
        ];

        Self {
            contents: vec![RequestContent { parts }],
            generation_config: GenerationConfig {
                response_modalities: vec![Modality::Image, Modality::Text],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<ResponseContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
    #[serde(default)]
    pub block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResponsePart {
    #[serde(default)]
    pub inline_data: Option<InlineData>,
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Parts of the first candidate, in response order.
    pub fn parts(&self) -> impl Iterator<Item = &ResponsePart> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .into_iter()
            .flat_map(|content| content.parts.iter())
    }

    /// First inline part whose MIME type denotes an image.
    pub fn first_image(&self) -> Option<&InlineData> {
        self.parts()
            .filter_map(|p| p.inline_data.as_ref())
            .find(|d| is_image_mime_type(&d.mime_type))
    }

    /// Text parts of the first candidate joined with newlines.
    pub fn text(&self) -> Option<String> {
        let texts: Vec<&str> = self
            .parts()
            .filter_map(|p| p.text.as_deref())
            .filter(|t| !t.trim().is_empty())
            .collect();
        (!texts.is_empty()).then(|| texts.join("\n"))
    }

    /// Reason the prompt or output was blocked, if any.
    pub fn block_reason(&self) -> Option<String> {
        if let Some(ref feedback) = self.prompt_feedback {
            if let Some(ref reason) = feedback.block_reason {
                return Some(
                    feedback
                        .block_reason_message
                        .clone()
                        .unwrap_or_else(|| format!("Prompt blocked: {reason}")),
                );
            }
        }

        self.candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
            .filter(|reason| BLOCKED_FINISH_REASONS.contains(reason))
            .map(|reason| format!("Content blocked by safety filter: {reason}"))
    }
}
