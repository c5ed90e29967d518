use crate::{CloudinaryGateway, LegacyMediaSource, LocalMediaSource, UploadGateway};
use assetkit_core::{Config, ConfigError};
use std::sync::Arc;

/// Create the remote store gateway from configuration
pub fn create_gateway(config: &Config) -> Result<Arc<dyn UploadGateway>, ConfigError> {
    let gateway = CloudinaryGateway::new(config.cloudinary.clone())?;
    Ok(Arc::new(gateway))
}

/// Create the legacy media source rooted at `MEDIA_ROOT`
pub async fn create_media_source(
    config: &Config,
) -> Result<Arc<dyn LegacyMediaSource>, ConfigError> {
    let source = LocalMediaSource::new(config.media.media_root.clone()).await?;
    Ok(Arc::new(source))
}
