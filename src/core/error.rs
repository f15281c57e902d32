use thiserror::Error;

/// Generic fallback when the model answers without an image or any text.
pub const NO_IMAGE_MESSAGE: &str = "API did not return an edited image.";

#[derive(Error, Debug)]
pub enum VintageError {
    #[error("API key not configured. Set GEMINI_API_KEY (or API_KEY) environment variable or run: vintage config set api.key <your-key>")]
    MissingCredential,

    #[error("Failed to read file.")]
    ReadError(#[source] std::io::Error),

    #[error("AI processing failed: {0}")]
    MalformedResponse(String),

    #[error("AI processing failed: {0}")]
    NoImageReturned(String),

    #[error("AI processing failed: {message}")]
    ProviderError {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Please upload an image first.")]
    NoImageSelected,

    #[error("An operation is already in progress")]
    Busy,

    #[error("Background task failed: {0}")]
    TaskFailed(String),

    #[error("Invalid image data: {0}")]
    InvalidImageData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VintageError {
    pub fn provider(message: impl Into<String>) -> Self {
        VintageError::ProviderError {
            message: message.into(),
            source: None,
        }
    }
}

impl From<reqwest::Error> for VintageError {
    fn from(err: reqwest::Error) -> Self {
        VintageError::ProviderError {
            message: err.to_string(),
            source: Some(err),
        }
    }
}
