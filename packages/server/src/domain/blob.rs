//! Blob store port for uploaded images.

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::{BlobError, ImageUrl};

/// What an upload is going to be used for
///
/// Kinds only differ in storage prefix; avatars are stored as uploaded, without
/// resizing or cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Avatar,
    MessageImage,
}

impl UploadKind {
    /// Storage prefix for this kind of upload
    pub fn prefix(&self) -> &'static str {
        match self {
            UploadKind::Avatar => "avatars",
            UploadKind::MessageImage => "images",
        }
    }
}

/// Stores image bytes and hands back a public URL.
///
/// Implementations own their retry policy and return a definitive error.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, kind: UploadKind) -> Result<ImageUrl, BlobError>;
}
