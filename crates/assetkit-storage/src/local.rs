use crate::traits::{LegacyMediaSource, SourceError, UploadContent};
use assetkit_core::ConfigError;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

/// Legacy media files on the local filesystem
#[derive(Clone, Debug)]
pub struct LocalMediaSource {
    media_root: PathBuf,
}

impl LocalMediaSource {
    /// Create a new LocalMediaSource
    ///
    /// # Arguments
    /// * `media_root` - Directory the legacy raw values are relative to (e.g. "/srv/app/media")
    pub async fn new(media_root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let media_root = media_root.into();

        let is_dir = fs::metadata(&media_root)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(ConfigError::invalid(
                "MEDIA_ROOT",
                format!("{} is not a directory", media_root.display()),
            ));
        }

        Ok(LocalMediaSource { media_root })
    }

    pub fn media_root(&self) -> &PathBuf {
        &self.media_root
    }

    /// Convert a stored raw value to a filesystem path with traversal checks
    ///
    /// Stored values occasionally carry a leading `/`; it is dropped rather
    /// than treated as an absolute path.
    fn raw_to_path(&self, raw_value: &str) -> Result<PathBuf, SourceError> {
        let relative = raw_value.trim_start_matches('/');

        if relative.is_empty() {
            return Err(SourceError::InvalidPath("empty path".to_string()));
        }
        if relative.split(&['/', '\\'][..]).any(|segment| segment == "..") || relative.contains('\0')
        {
            return Err(SourceError::InvalidPath(format!(
                "{} escapes the media root",
                raw_value
            )));
        }

        let path = self.media_root.join(relative);

        // Symlinks may still point outside the root.
        if let (Ok(base), Ok(canonical)) = (self.media_root.canonicalize(), path.canonicalize()) {
            if canonical.strip_prefix(&base).is_err() {
                return Err(SourceError::InvalidPath(format!(
                    "{} resolves outside the media root",
                    raw_value
                )));
            }
        }

        Ok(path)
    }
}

#[async_trait]
impl LegacyMediaSource for LocalMediaSource {
    async fn exists(&self, raw_value: &str) -> Result<bool, SourceError> {
        let path = self.raw_to_path(raw_value)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SourceError::Io(e)),
        }
    }

    async fn read(&self, raw_value: &str) -> Result<UploadContent, SourceError> {
        let path = self.raw_to_path(raw_value)?;
        let start = std::time::Instant::now();

        let data = fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => SourceError::Missing(raw_value.to_string()),
            _ => SourceError::Io(e),
        })?;

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());

        tracing::debug!(
            path = %path.display(),
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Read legacy media file"
        );

        Ok(UploadContent::new(data, filename))
    }
}
