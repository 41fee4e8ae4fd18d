use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::errors::Error;

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Accepted on upload, before anything is sent to the model
pub const UPLOAD_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/bmp",
    "image/webp",
];

/// Accepted by the plain OCR route
pub const OCR_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/webp",
    "image/heic",
    "image/heif",
];

pub const DEFAULT_MIME: &str = "image/jpeg";

/// Rejects an upload by declared type and size. Runs before any network call.
pub fn validate_upload(content_type: &str, size: usize) -> Result<(), Error> {
    if !UPLOAD_TYPES.contains(&content_type) {
        return Err(Error::validation(
            "Invalid file type. Please upload an image file (JPEG, PNG, GIF, BMP, WebP).",
        ));
    }

    if size > MAX_UPLOAD_BYTES {
        return Err(Error::validation(
            "File size too large. Please upload an image smaller than 10MB.",
        ));
    }

    Ok(())
}

/// Base64 image payload plus its MIME type
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImageData {
    pub mime_type: String,
    pub data: String,
}

impl ImageData {
    /// Accepts `data:image/<sub>;base64,<payload>` or bare base64 (assumed JPEG).
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::missing("Image data is required"));
        }

        let (mime_type, data) = match split_data_url(raw) {
            Some((mime_type, data)) => (mime_type.to_string(), data),
            None => (DEFAULT_MIME.to_string(), raw),
        };

        if data.is_empty() {
            return Err(Error::validation("Invalid image data format"));
        }

        Ok(Self {
            mime_type,
            data: data.to_string(),
        })
    }

    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data: STANDARD.encode(bytes),
        }
    }

    pub fn ensure_ocr_supported(&self) -> Result<(), Error> {
        if !OCR_TYPES.contains(&self.mime_type.as_str()) {
            return Err(Error::validation(format!(
                "Unsupported MIME type: {}",
                self.mime_type
            )));
        }
        Ok(())
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn decode(&self) -> Result<Vec<u8>, Error> {
        STANDARD
            .decode(self.data.as_bytes())
            .map_err(|e| Error::validation(format!("Invalid image data format: {}", e)))
    }

    pub fn extension(&self) -> &str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            "image/bmp" => "bmp",
            "image/heic" => "heic",
            "image/heif" => "heif",
            _ => "jpg",
        }
    }
}

/// True when the string carries an inline image rather than a stored URL
pub fn is_data_url(value: &str) -> bool {
    split_data_url(value.trim()).is_some()
}

fn split_data_url(raw: &str) -> Option<(&str, &str)> {
    let rest = raw.strip_prefix("data:")?;
    let (mime_type, data) = rest.split_once(";base64,")?;
    let subtype = mime_type.strip_prefix("image/")?;
    if subtype.is_empty() || !subtype.bytes().all(|b| b.is_ascii_lowercase()) {
        return None;
    }
    Some((mime_type, data))
}
