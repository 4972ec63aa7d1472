//! Driven port for property photo blob storage.

use async_trait::async_trait;

/// Errors surfaced by image store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageStoreError {
    /// The storage bucket or object path does not exist.
    #[error("image store target not found: {message}")]
    NotFound { message: String },
    /// Storage policy refused the upload.
    #[error("image store denied the request: {message}")]
    Denied { message: String },
    /// The payload exceeds the storage size limit.
    #[error("image store payload too large: {message}")]
    TooLarge { message: String },
    /// Transport failed before a response arrived.
    #[error("image store transport failed: {message}")]
    Transport { message: String },
    /// The call exceeded its deadline.
    #[error("image store timeout: {message}")]
    Timeout { message: String },
    /// The response could not be decoded.
    #[error("image store response decode failed: {message}")]
    Decode { message: String },
}

impl ImageStoreError {
    /// Build an [`ImageStoreError::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Build an [`ImageStoreError::Denied`].
    pub fn denied(message: impl Into<String>) -> Self {
        Self::Denied {
            message: message.into(),
        }
    }

    /// Build an [`ImageStoreError::TooLarge`].
    pub fn too_large(message: impl Into<String>) -> Self {
        Self::TooLarge {
            message: message.into(),
        }
    }

    /// Build an [`ImageStoreError::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Build an [`ImageStoreError::Timeout`].
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Build an [`ImageStoreError::Decode`].
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// A successfully stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Bucket-relative path of the stored object.
    pub path: String,
}

/// Port for uploading property photos and resolving their public URLs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Upload `bytes` under the bucket-relative `path`.
    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<StoredImage, ImageStoreError>;

    /// Publicly reachable URL for a stored path.
    ///
    /// Pure URL construction; no request is made and unknown paths still
    /// yield a syntactically valid URL.
    fn public_url(&self, path: &str) -> String;
}

/// Fixture implementation that accepts every upload.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureImageStore;

#[async_trait]
impl ImageStore for FixtureImageStore {
    async fn upload(
        &self,
        path: &str,
        _bytes: &[u8],
        _content_type: &str,
    ) -> Result<StoredImage, ImageStoreError> {
        Ok(StoredImage {
            path: path.to_owned(),
        })
    }

    fn public_url(&self, path: &str) -> String {
        format!("https://storage.invalid/public/{path}")
    }
}
