// src/storage/local.rs
// Filesystem-backed image store

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, info};

use super::{DetectedImage, ImageStore};
use crate::correlation::ImageReference;
use crate::error::{IrisError, Result};

/// Stores images as `<uuid>.<ext>` files in one directory
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    dir: PathBuf,
    public_base_url: String,
}

impl LocalImageStore {
    /// Open (creating if needed) the upload directory
    pub async fn open(dir: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        info!(dir = %dir.display(), "Image store ready");
        Ok(Self {
            dir,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a stored file name to a path, refusing anything that could escape the directory
    fn path_for(&self, name: &str) -> Result<PathBuf> {
        if !is_safe_name(name) {
            return Err(IrisError::InvalidInput(format!("invalid image name: {}", name)));
        }
        Ok(self.dir.join(name))
    }

    /// Read an image by file name, for serving. Missing files map to `NotFound`.
    pub async fn read_named(&self, name: &str) -> Result<(Vec<u8>, String)> {
        let path = self.path_for(name)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(IrisError::NotFound(format!("image {}", name)));
            }
            Err(e) => return Err(e.into()),
        };
        let mime = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok((bytes, mime))
    }
}

fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        && !name.contains("..")
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn save(&self, bytes: &[u8], image: &DetectedImage) -> Result<ImageReference> {
        let name = format!("{}.{}", uuid::Uuid::new_v4(), image.extension);
        let path = self.path_for(&name)?;
        tokio::fs::write(&path, bytes).await?;
        debug!(image = %name, size = bytes.len(), "Image written");
        Ok(ImageReference::new(name, image.mime_type))
    }

    fn url_for(&self, image: &ImageReference) -> String {
        format!("{}/images/{}", self.public_base_url, image.name)
    }

    async fn load(&self, image: &ImageReference) -> Result<Vec<u8>> {
        let path = self.path_for(&image.name)?;
        Ok(tokio::fs::read(path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_images::PNG;
    use crate::storage::{detect_image, render_image_url};

    async fn store() -> (tempfile::TempDir, LocalImageStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::open(dir.path().join("uploads"), "http://localhost:5001/")
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_save_load_and_url() {
        let (_dir, store) = store().await;
        let detected = detect_image(PNG).unwrap();
        let image = store.save(PNG, &detected).await.unwrap();

        assert!(image.name.ends_with(".png"));
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(
            store.url_for(&image),
            format!("http://localhost:5001/images/{}", image.name)
        );
        assert_eq!(store.load(&image).await.unwrap(), PNG);

        let (bytes, mime) = store.read_named(&image.name).await.unwrap();
        assert_eq!(bytes, PNG);
        assert_eq!(mime, "image/png");
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let (_dir, store) = store().await;
        let err = store.read_named("nope.png").await.unwrap_err();
        assert!(matches!(err, IrisError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_traversal_names_rejected() {
        let (_dir, store) = store().await;
        for name in ["../secret", "a/b.png", "..", ".env", ""] {
            let err = store.read_named(name).await.unwrap_err();
            assert!(matches!(err, IrisError::InvalidInput(_)), "{name}");
        }
    }

    #[tokio::test]
    async fn test_render_inline_and_public() {
        let (_dir, store) = store().await;
        let detected = detect_image(PNG).unwrap();
        let image = store.save(PNG, &detected).await.unwrap();

        let public = render_image_url(&store, &image, false).await.unwrap();
        assert!(public.starts_with("http://localhost:5001/images/"));

        let inline = render_image_url(&store, &image, true).await.unwrap();
        assert!(inline.starts_with("data:image/png;base64,"));
    }
}
