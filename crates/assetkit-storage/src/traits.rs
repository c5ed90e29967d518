//! Storage abstraction traits
//!
//! [`UploadGateway`] is the boundary to the remote asset store and
//! [`LegacyMediaSource`] the boundary to the legacy local files. Core logic only
//! ever holds these as `Arc<dyn Trait>`.

use assetkit_core::{DeliveryType, ResourceType};
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Upload failures. The record keeps its identifier so a later run can retry.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Upload transport failed: {0}")]
    Transport(String),

    #[error("Upload rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid upload response: {0}")]
    InvalidResponse(String),
}

/// Explicit lookup failures. Resolution falls back to the legacy URL on any of them.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("No remote asset at {0}")]
    NotFound(String),

    #[error("Lookup transport failed: {0}")]
    Transport(String),

    #[error("Lookup rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid lookup response: {0}")]
    InvalidResponse(String),
}

/// Legacy media access failures.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Source file missing: {0}")]
    Missing(String),

    #[error("Invalid source path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bytes to upload, with the original filename when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadContent {
    pub bytes: Bytes,
    pub filename: Option<String>,
}

impl UploadContent {
    pub fn new(bytes: impl Into<Bytes>, filename: Option<String>) -> Self {
        Self {
            bytes: bytes.into(),
            filename,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Store-assigned coordinates of an uploaded asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub version: u64,
    pub public_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    pub secure_url: String,
}

/// Remote asset store.
///
/// Both network operations may be slow and fail; implementations must not
/// retry on their own.
#[async_trait]
pub trait UploadGateway: Send + Sync {
    /// Upload content under `folder` and return the assigned version and public id.
    async fn upload(
        &self,
        content: UploadContent,
        folder: &str,
        resource_type: ResourceType,
    ) -> Result<UploadedAsset, UploadError>;

    /// Confirm that `path` is a known asset without uploading anything.
    async fn explicit_lookup(
        &self,
        path: &str,
        resource_type: ResourceType,
        delivery_type: DeliveryType,
    ) -> Result<LookupResult, LookupError>;

    /// Public URL of a `v{version}/{public_id}` identifier. No network access.
    fn delivery_url(&self, versioned_id: &str, resource_type: ResourceType) -> String;
}

/// Read access to legacy files addressed by their stored raw value.
#[async_trait]
pub trait LegacyMediaSource: Send + Sync {
    /// Whether a regular file exists for `raw_value`.
    async fn exists(&self, raw_value: &str) -> Result<bool, SourceError>;

    /// Read the file for `raw_value`. Returns [`SourceError::Missing`] when absent.
    async fn read(&self, raw_value: &str) -> Result<UploadContent, SourceError>;
}
