// src/storage/mod.rs
// Image storage: validation, persistence, and URL rendering

mod local;

pub use local::LocalImageStore;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;

use crate::correlation::ImageReference;
use crate::error::{IrisError, Result};

/// Where uploaded image bytes live
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist bytes and return a reference to them
    async fn save(&self, bytes: &[u8], image: &DetectedImage) -> Result<ImageReference>;

    /// Publicly reachable URL for a stored image
    fn url_for(&self, image: &ImageReference) -> String;

    /// Read the stored bytes back
    async fn load(&self, image: &ImageReference) -> Result<Vec<u8>>;
}

/// Format information sniffed from uploaded bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectedImage {
    pub mime_type: &'static str,
    pub extension: &'static str,
}

/// Sniff the image format, rejecting anything but PNG, JPEG, GIF and WebP
pub fn detect_image(bytes: &[u8]) -> Result<DetectedImage> {
    if bytes.is_empty() {
        return Err(IrisError::InvalidInput("image is empty".into()));
    }

    let format = image::guess_format(bytes)
        .map_err(|_| IrisError::UnsupportedImage("unrecognized image data".into()))?;

    let (mime_type, extension) = match format {
        ImageFormat::Png => ("image/png", "png"),
        ImageFormat::Jpeg => ("image/jpeg", "jpg"),
        ImageFormat::Gif => ("image/gif", "gif"),
        ImageFormat::WebP => ("image/webp", "webp"),
        other => {
            return Err(IrisError::UnsupportedImage(format!(
                "{:?} images are not accepted",
                other
            )));
        }
    };

    Ok(DetectedImage {
        mime_type,
        extension,
    })
}

/// URL placed in the image message: the public URL, or an inline data URL
pub async fn render_image_url(
    store: &dyn ImageStore,
    image: &ImageReference,
    inline: bool,
) -> Result<String> {
    if !inline {
        return Ok(store.url_for(image));
    }
    let bytes = store.load(image).await?;
    Ok(data_url(&image.mime_type, &bytes))
}

pub fn data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

#[cfg(test)]
pub(crate) mod test_images {
    /// Smallest PNG signature + IHDR start recognized by format sniffing
    pub const PNG: &[u8] = &[
        0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D',
        b'R',
    ];
    pub const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
}
