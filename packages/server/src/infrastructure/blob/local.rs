//! Local filesystem blob store.
//!
//! Images are written to `{root}/{prefix}/{uuid}.{ext}` and served back under
//! `{public_base}/{prefix}/{uuid}.{ext}` by the HTTP layer.

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{BlobError, BlobStore, ImageUrl, UploadKind};

/// Image formats accepted for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Detect the format from the leading magic bytes
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(ImageFormat::Webp)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base: String,
    max_bytes: usize,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base: &str, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.trim_end_matches('/').to_string(),
            max_bytes,
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, bytes: Vec<u8>, kind: UploadKind) -> Result<ImageUrl, BlobError> {
        if bytes.is_empty() {
            return Err(BlobError::Empty);
        }
        if bytes.len() > self.max_bytes {
            return Err(BlobError::TooLarge {
                max: self.max_bytes,
                actual: bytes.len(),
            });
        }
        let format = ImageFormat::sniff(&bytes).ok_or(BlobError::UnsupportedFormat)?;

        let dir = self.root.join(kind.prefix());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| BlobError::Io(e.to_string()))?;

        let file_name = format!("{}.{}", Uuid::new_v4(), format.extension());
        tokio::fs::write(dir.join(&file_name), &bytes)
            .await
            .map_err(|e| BlobError::Io(e.to_string()))?;

        let url = format!("{}/{}/{}", self.public_base, kind.prefix(), file_name);
        tracing::info!("Stored {} bytes as {}", bytes.len(), url);
        ImageUrl::new(url).map_err(|e| BlobError::Io(e.to_string()))
    }
}
