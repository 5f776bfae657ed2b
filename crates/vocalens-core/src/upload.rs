//! Uploaded image handling: format detection, limit checks, and the base64
//! PNG payload sent to the vision backend.

use base64::Engine;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::ImageError;

/// An image accepted from the user, decoded into memory.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    image: DynamicImage,
    /// Format the upload arrived in (PNG or JPEG)
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    /// Size of the uploaded bytes
    pub file_size: u64,
}

impl UploadedImage {
    /// Decode an upload from memory, accepting only PNG and JPEG.
    pub fn from_bytes(bytes: &[u8], limits: &LimitsConfig) -> Result<Self, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }

        let file_size = bytes.len() as u64;
        let max_bytes = limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if file_size > max_bytes {
            return Err(ImageError::TooLarge {
                size_mb: file_size.div_ceil(1024 * 1024),
                max_mb: limits.max_file_size_mb,
            });
        }

        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ImageError::Decode(format!("Cannot detect image format: {e}")))?;

        let format = match reader.format() {
            Some(f @ (ImageFormat::Png | ImageFormat::Jpeg)) => f,
            Some(other) => {
                return Err(ImageError::UnsupportedFormat(
                    other.extensions_str().first().unwrap_or(&"unknown").to_string(),
                ))
            }
            None => return Err(ImageError::UnsupportedFormat("unknown".to_string())),
        };

        let image = reader
            .decode()
            .map_err(|e| ImageError::Decode(e.to_string()))?;

        let (width, height) = image.dimensions();
        if width > limits.max_image_dimension || height > limits.max_image_dimension {
            return Err(ImageError::DimensionsTooLarge {
                width,
                height,
                max_dim: limits.max_image_dimension,
            });
        }

        tracing::debug!(?format, width, height, file_size, "Decoded upload");

        Ok(Self {
            image,
            format,
            width,
            height,
            file_size,
        })
    }

    /// Read and decode an image file.
    pub fn open(path: &Path, limits: &LimitsConfig) -> Result<Self, ImageError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, limits)
    }

    /// Read an image file without blocking the runtime.
    ///
    /// The decode runs on the blocking pool.
    pub async fn load(path: &Path, limits: &LimitsConfig) -> Result<Self, ImageError> {
        let bytes = tokio::fs::read(path).await?;
        let limits = limits.clone();
        tokio::task::spawn_blocking(move || Self::from_bytes(&bytes, &limits))
            .await
            .map_err(|e| ImageError::Decode(format!("Task join error: {e}")))?
    }

    /// Re-encode losslessly as PNG and base64 the result.
    pub fn to_png_base64(&self) -> Result<ImageInput, ImageError> {
        let mut buffer = Cursor::new(Vec::new());
        self.image
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| ImageError::Encode(e.to_string()))?;
        Ok(ImageInput::from_bytes(buffer.get_ref(), "png"))
    }
}

/// Base64-encoded image ready to send to a chat completions API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and format string.
    pub fn from_bytes(bytes: &[u8], format: &str) -> Self {
        let media_type = match format {
            "jpeg" | "jpg" => "image/jpeg",
            "png" => "image/png",
            other => {
                tracing::warn!("Unknown image format '{other}', defaulting to image/png");
                "image/png"
            }
        };

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        }
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}
