use assetkit_core::{
    classify_opt, derive_remote_path, AssetField, AssetKind, Config, DeliveryType, ResourceType,
};
use assetkit_storage::UploadGateway;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;

/// Turns a stored asset value into a public URL.
///
/// Resolution is read-only and infallible: any lookup problem degrades to the
/// legacy media URL.
#[derive(Clone)]
pub struct StorageResolver {
    gateway: Arc<dyn UploadGateway>,
    media_url: String,
    lookup_timeout: Duration,
}

impl StorageResolver {
    pub fn new(gateway: Arc<dyn UploadGateway>, media_url: impl Into<String>) -> Self {
        Self {
            gateway,
            media_url: media_url.into(),
            lookup_timeout: Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS),
        }
    }

    pub fn from_config(gateway: Arc<dyn UploadGateway>, config: &Config) -> Self {
        Self::new(gateway, config.media_url())
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn media_url(&self) -> &str {
        &self.media_url
    }

    /// Resolve an image value stored under `folder_hint`.
    pub async fn resolve_url(
        &self,
        raw: Option<&str>,
        folder_hint: &str,
        media_base_url: &str,
    ) -> Option<String> {
        self.resolve(raw, folder_hint, ResourceType::Image, media_base_url)
            .await
    }

    /// Resolve with the folder and resource type of a catalog field.
    pub async fn resolve_field_url(
        &self,
        raw: Option<&str>,
        field: &AssetField,
        media_base_url: &str,
    ) -> Option<String> {
        self.resolve(raw, field.folder, field.resource_type, media_base_url)
            .await
    }

    /// [`Self::resolve_field_url`] against the configured media URL.
    pub async fn resolve_for_field(&self, raw: Option<&str>, field: &AssetField) -> Option<String> {
        self.resolve(raw, field.folder, field.resource_type, &self.media_url)
            .await
    }

    async fn resolve(
        &self,
        raw: Option<&str>,
        folder_hint: &str,
        resource_type: ResourceType,
        media_base_url: &str,
    ) -> Option<String> {
        let kind = classify_opt(raw);
        let raw = match raw {
            Some(raw) if kind != AssetKind::Unset => raw,
            _ => {
                tracing::debug!("Asset value unset");
                return None;
            }
        };

        match kind {
            AssetKind::AbsoluteUrl => Some(raw.to_string()),
            AssetKind::RemoteVersionedId => {
                let url = self.gateway.delivery_url(raw, resource_type);
                tracing::debug!(raw = %raw, url = %url, "Resolved remote identifier");
                Some(url)
            }
            AssetKind::LegacyLocalPath => {
                Some(self.resolve_legacy(raw, folder_hint, resource_type, media_base_url).await)
            }
            AssetKind::Unset => None,
        }
    }

    async fn resolve_legacy(
        &self,
        raw: &str,
        folder_hint: &str,
        resource_type: ResourceType,
        media_base_url: &str,
    ) -> String {
        let remote_path = derive_remote_path(raw, folder_hint);
        let lookup = self
            .gateway
            .explicit_lookup(&remote_path, resource_type, DeliveryType::Upload);

        match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Ok(Ok(found)) => {
                tracing::debug!(
                    raw = %raw,
                    remote_path = %remote_path,
                    "Legacy value found in remote store"
                );
                found.secure_url
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    raw = %raw,
                    remote_path = %remote_path,
                    error = %e,
                    "Remote lookup failed, falling back to legacy media URL"
                );
                join_media_url(media_base_url, raw)
            }
            Err(_) => {
                tracing::warn!(
                    raw = %raw,
                    remote_path = %remote_path,
                    timeout_ms = self.lookup_timeout.as_millis() as u64,
                    "Remote lookup timed out, falling back to legacy media URL"
                );
                join_media_url(media_base_url, raw)
            }
        }
    }
}

/// Join a media base URL and a relative path with exactly one `/` between them.
pub fn join_media_url(base: &str, path: &str) -> String {
    if base.is_empty() {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_media_url() {
        assert_eq!(
            join_media_url("/media/", "leadership/john.jpg"),
            "/media/leadership/john.jpg"
        );
        assert_eq!(
            join_media_url("/media", "/leadership/john.jpg"),
            "/media/leadership/john.jpg"
        );
        assert_eq!(
            join_media_url("https://cdn.example.com/media//", "a.jpg"),
            "https://cdn.example.com/media/a.jpg"
        );
        assert_eq!(join_media_url("", "a.jpg"), "a.jpg");
    }
}
