use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::ImageFormat;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tokio::fs;

use super::error::VintageError;

/// Media type used when none can be determined
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// A `data:<mime>;base64,<payload>` string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DataUrl(String);

impl DataUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into payload and media type
    pub fn decode(&self) -> DecodedDataUrl {
        decode(&self.0)
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Base64 payload and media type pulled out of a data URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDataUrl {
    pub base64_data: String,
    pub mime_type: String,
}

impl DecodedDataUrl {
    /// Decode the base64 payload back to raw bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, VintageError> {
        BASE64
            .decode(&self.base64_data)
            .map_err(|e| VintageError::InvalidImageData(e.to_string()))
    }

    /// Size of the decoded payload, computed without decoding it
    pub fn byte_len(&self) -> usize {
        let data = self.base64_data.trim_end();
        let padding = data.bytes().rev().take_while(|&b| b == b'=').count();
        (data.len() / 4 * 3).saturating_sub(padding)
    }
}

/// Build a data URL from raw bytes
pub fn encode(bytes: &[u8], mime_type: &str) -> DataUrl {
    from_base64(&BASE64.encode(bytes), mime_type)
}

/// Build a data URL from an already base64-encoded payload
pub fn from_base64(base64_data: &str, mime_type: &str) -> DataUrl {
    DataUrl(format!("data:{};base64,{}", mime_type, base64_data))
}

/// Read a whole file and encode it as a data URL
pub async fn encode_file(path: &Path) -> Result<DataUrl, VintageError> {
    let bytes = fs::read(path).await.map_err(VintageError::ReadError)?;
    let mime_type = sniff_mime_type(&bytes).unwrap_or_else(|| mime_from_extension(path));

    tracing::debug!(
        "Read {} ({} bytes, {})",
        path.display(),
        bytes.len(),
        mime_type
    );

    Ok(encode(&bytes, mime_type))
}

/// Split a data URL into its payload and media type.
///
/// Lenient: never fails. The header and payload are split on the first
/// comma (a missing comma yields an empty payload) and the media type is
/// whatever sits between the first `:` and the following `;`, falling back
/// to [`DEFAULT_MIME_TYPE`] when that pattern is absent.
pub fn decode(data_url: &str) -> DecodedDataUrl {
    let (header, payload) = data_url.split_once(',').unwrap_or((data_url, ""));

    let mime_type = header
        .split_once(':')
        .and_then(|(_, rest)| rest.split_once(';'))
        .map(|(mime, _)| mime)
        .unwrap_or(DEFAULT_MIME_TYPE);

    DecodedDataUrl {
        base64_data: payload.to_string(),
        mime_type: mime_type.to_string(),
    }
}

/// Decode a data URL and write its bytes to disk
pub async fn save(data_url: &DataUrl, path: &Path) -> Result<(), VintageError> {
    let bytes = data_url.decode().to_bytes()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, &bytes).await?;

    tracing::info!("Saved image to: {}", path.display());
    Ok(())
}

fn sniff_mime_type(bytes: &[u8]) -> Option<&'static str> {
    match image::guess_format(bytes).ok()? {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Gif => Some("image/gif"),
        _ => None,
    }
}

fn mime_from_extension(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => DEFAULT_MIME_TYPE,
    }
}
