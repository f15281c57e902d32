use serde::Serialize;

use super::data_url::{DataUrl, DecodedDataUrl};
use super::error::NO_IMAGE_MESSAGE;

/// The stylization instruction sent with every edit
pub const VINTAGE_PROMPT: &str = "Please color grade this photo. I want it to have the vibe of a vintage record album cover. Think faded colors, warm tones, and a slightly grainy, nostalgic feel.";

/// An image plus the instruction to apply to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    base64_data: String,
    mime_type: String,
    prompt: String,
}

impl EditRequest {
    pub fn new(image: DecodedDataUrl, prompt: impl Into<String>) -> Self {
        Self {
            base64_data: image.base64_data,
            mime_type: image.mime_type,
            prompt: prompt.into(),
        }
    }

    /// Request the vintage look for an image
    pub fn vintage(image: DecodedDataUrl) -> Self {
        Self::new(image, VINTAGE_PROMPT)
    }

    pub fn base64_data(&self) -> &str {
        &self.base64_data
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// Outcome of an edit call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EditResult {
    /// The model returned an image, possibly with commentary
    Edited {
        image: DataUrl,
        text: Option<String>,
    },
    /// No image came back; `message` explains why
    Declined { message: String },
}

impl EditResult {
    /// Build a result from whatever the response fold collected.
    ///
    /// A missing image always yields a non-empty message, using the
    /// generic fallback when no advisory text was available.
    pub fn from_parts(image: Option<DataUrl>, text: Option<String>) -> Self {
        match image {
            Some(image) => EditResult::Edited { image, text },
            None => EditResult::Declined {
                message: text
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| NO_IMAGE_MESSAGE.to_string()),
            },
        }
    }

    #[cfg(test)]
    pub fn image(&self) -> Option<&DataUrl> {
        match self {
            EditResult::Edited { image, .. } => Some(image),
            EditResult::Declined { .. } => None,
        }
    }

    /// Advisory text from the model, or the decline reason
    #[cfg(test)]
    pub fn message(&self) -> Option<&str> {
        match self {
            EditResult::Edited { text, .. } => text.as_deref(),
            EditResult::Declined { message } => Some(message),
        }
    }
}
