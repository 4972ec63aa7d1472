//! Blob-storage adapter for the image store port.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, StatusCode, header};

use crate::domain::ports::{ImageStore, ImageStoreError, StoredImage};

use super::{RequestFailure, SupabaseTransport, status_message};

const DEFAULT_BUCKET: &str = "transaction-images";
// Matches the bucket's serve-side caching window.
const CACHE_CONTROL: &str = "3600";

/// Image store backed by the hosted blob storage surface.
pub struct SupabaseImageStore {
    transport: Arc<SupabaseTransport>,
    bucket: String,
}

impl SupabaseImageStore {
    /// Build the adapter against the default property-photo bucket.
    pub fn new(transport: Arc<SupabaseTransport>) -> Self {
        Self::with_bucket(transport, DEFAULT_BUCKET)
    }

    /// Build the adapter against an explicit bucket.
    pub fn with_bucket(transport: Arc<SupabaseTransport>, bucket: impl Into<String>) -> Self {
        Self {
            transport,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ImageStore for SupabaseImageStore {
    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<StoredImage, ImageStoreError> {
        let object_path = format!("storage/v1/object/{}/{path}", self.bucket);
        let request = self
            .transport
            .request(Method::POST, &object_path)
            .map_err(map_failure)?
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CACHE_CONTROL, CACHE_CONTROL)
            // Paths embed a timestamp, so an existing object means a clash
            // worth surfacing rather than silently overwriting.
            .header("x-upsert", "false")
            .body(bytes.to_vec());
        let (status, body) = self.transport.send(request).await.map_err(map_failure)?;
        if !status.is_success() {
            return Err(map_status(status, &body));
        }
        Ok(StoredImage {
            path: path.to_owned(),
        })
    }

    fn public_url(&self, path: &str) -> String {
        let relative = format!("storage/v1/object/public/{}/{path}", self.bucket);
        match self.transport.base_url().join(&relative) {
            Ok(url) => url.to_string(),
            // Unreachable for sane buckets and paths; degrade to string
            // concatenation instead of panicking inside a formatter.
            Err(_) => format!("{}{relative}", self.transport.base_url()),
        }
    }
}

fn map_failure(failure: RequestFailure) -> ImageStoreError {
    match failure {
        RequestFailure::Timeout { message } => ImageStoreError::timeout(message),
        RequestFailure::Transport { message } => ImageStoreError::transport(message),
    }
}

fn map_status(status: StatusCode, body: &[u8]) -> ImageStoreError {
    let message = status_message(status, body);
    match status {
        StatusCode::NOT_FOUND => ImageStoreError::not_found(message),
        StatusCode::PAYLOAD_TOO_LARGE => ImageStoreError::too_large(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ImageStoreError::timeout(message)
        }
        _ if status.is_client_error() => ImageStoreError::denied(message),
        _ => ImageStoreError::transport(message),
    }
}
