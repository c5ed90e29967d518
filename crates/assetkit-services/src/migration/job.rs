use assetkit_core::{classify_opt, format_versioned, AssetField, AssetKind, MigrationSettings};
use assetkit_db::{AssetRecord, AssetRecordStore};
use assetkit_storage::{
    LegacyMediaSource, SourceError, UploadContent, UploadError, UploadGateway, UploadedAsset,
};
use std::sync::Arc;
use std::time::Duration;

use super::report::MigrationReport;
use super::{MigrationError, SKIP_IDENTIFIER_CHANGED, SKIP_SOURCE_MISSING};

const DEFAULT_MAX_UPLOAD_ATTEMPTS: u32 = 1;
const DEFAULT_RETRY_BACKOFF_SECS: u64 = 2;

#[derive(Debug, Clone)]
pub struct MigrationOptions {
    /// Upload attempts per record; `1` disables retries.
    pub max_upload_attempts: u32,
    /// Delay before the second attempt, growing linearly after that.
    pub retry_backoff: Duration,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            max_upload_attempts: DEFAULT_MAX_UPLOAD_ATTEMPTS,
            retry_backoff: Duration::from_secs(DEFAULT_RETRY_BACKOFF_SECS),
        }
    }
}

impl MigrationOptions {
    /// Delay after failed attempt `attempt` (1-based), saturating on overflow.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.retry_backoff.saturating_mul(attempt)
    }
}

impl From<&MigrationSettings> for MigrationOptions {
    fn from(settings: &MigrationSettings) -> Self {
        Self {
            max_upload_attempts: settings.max_upload_attempts,
            retry_backoff: Duration::from_secs(settings.retry_backoff_secs),
        }
    }
}

enum RecordOutcome {
    Migrated(String),
    Skipped(Option<&'static str>),
}

/// Migrates the legacy files of one asset field at a time.
pub struct MigrationJob {
    gateway: Arc<dyn UploadGateway>,
    source: Arc<dyn LegacyMediaSource>,
    options: MigrationOptions,
}

impl MigrationJob {
    pub fn new(gateway: Arc<dyn UploadGateway>, source: Arc<dyn LegacyMediaSource>) -> Self {
        Self {
            gateway,
            source,
            options: MigrationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: MigrationOptions) -> Self {
        self.options = options;
        self
    }

    /// Run over every record of `field`, uploading into `field.folder` as
    /// `field.resource_type`.
    ///
    /// Only a failure to list the records is returned as an error. Everything
    /// that goes wrong with a single record ends up in the report.
    #[tracing::instrument(skip(self, store, field), fields(field = %field.key(), folder = field.folder))]
    pub async fn run(
        &self,
        store: &dyn AssetRecordStore,
        field: &AssetField,
    ) -> Result<MigrationReport, MigrationError> {
        let mut report = MigrationReport::new(field.key());

        let records = store
            .list_records(field)
            .await
            .map_err(MigrationError::RecordStore)?;

        tracing::info!(
            run_id = %report.run_id,
            records = records.len(),
            "Starting asset migration"
        );

        for record in &records {
            match self.migrate_record(store, field, record).await {
                Ok(RecordOutcome::Migrated(identifier)) => {
                    tracing::info!(
                        record_id = record.id,
                        identifier = %identifier,
                        "Record migrated"
                    );
                    report.record_migrated();
                }
                Ok(RecordOutcome::Skipped(reason)) => {
                    if let Some(reason) = reason {
                        tracing::warn!(record_id = record.id, reason = reason, "Record skipped");
                    }
                    report.record_skipped(record.id, reason);
                }
                Err(e) => {
                    tracing::error!(record_id = record.id, error = %e, "Record migration failed");
                    report.record_failed(record.id, e.to_string());
                }
            }
        }

        report.finish();
        tracing::info!(
            run_id = %report.run_id,
            migrated = report.migrated,
            skipped = report.skipped,
            failed = report.failed,
            duration_ms = report.duration_ms(),
            "Asset migration finished"
        );

        Ok(report)
    }

    async fn migrate_record(
        &self,
        store: &dyn AssetRecordStore,
        field: &AssetField,
        record: &AssetRecord,
    ) -> Result<RecordOutcome, MigrationError> {
        let raw = match (classify_opt(record.raw_value.as_deref()), &record.raw_value) {
            (AssetKind::LegacyLocalPath, Some(raw)) => raw.as_str(),
            _ => return Ok(RecordOutcome::Skipped(None)),
        };

        if !self.source.exists(raw).await? {
            return Ok(RecordOutcome::Skipped(Some(SKIP_SOURCE_MISSING)));
        }

        let content = match self.source.read(raw).await {
            Ok(content) => content,
            // Removed between the existence check and the read.
            Err(SourceError::Missing(_)) => {
                return Ok(RecordOutcome::Skipped(Some(SKIP_SOURCE_MISSING)))
            }
            Err(e) => return Err(e.into()),
        };

        let uploaded = self.upload_with_retry(record.id, content, field).await?;
        let identifier = format_versioned(uploaded.version, &uploaded.public_id);

        let updated = match store
            .update_identifier(record.id, field, raw, &identifier)
            .await
        {
            Ok(updated) => updated,
            Err(source) => {
                tracing::warn!(
                    record_id = record.id,
                    orphaned = %identifier,
                    error = %source,
                    "Identifier not persisted, uploaded asset left unreferenced"
                );
                return Err(MigrationError::Persist {
                    source,
                    orphaned: identifier,
                });
            }
        };

        if !updated {
            tracing::warn!(
                record_id = record.id,
                orphaned = %identifier,
                "Identifier changed during migration, uploaded asset left unreferenced"
            );
            return Ok(RecordOutcome::Skipped(Some(SKIP_IDENTIFIER_CHANGED)));
        }

        Ok(RecordOutcome::Migrated(identifier))
    }

    async fn upload_with_retry(
        &self,
        record_id: i64,
        content: UploadContent,
        field: &AssetField,
    ) -> Result<UploadedAsset, UploadError> {
        let max_attempts = self.options.max_upload_attempts.max(1);
        let mut attempt = 1;

        loop {
            let start = std::time::Instant::now();
            match self
                .gateway
                .upload(content.clone(), field.folder, field.resource_type)
                .await
            {
                Ok(uploaded) => {
                    tracing::debug!(
                        record_id = record_id,
                        attempt = attempt,
                        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                        "Upload completed"
                    );
                    return Ok(uploaded);
                }
                Err(e) if attempt < max_attempts => {
                    let backoff = self.options.backoff_for(attempt);
                    tracing::warn!(
                        record_id = record_id,
                        attempt = attempt,
                        max_attempts = max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Upload failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
