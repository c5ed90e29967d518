use assetkit_core::AssetField;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordStoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid SQL identifier: {0}")]
    InvalidIdentifier(String),
}

/// One row owning an asset field: primary key plus the field's stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRecord {
    pub id: i64,
    pub raw_value: Option<String>,
}

impl AssetRecord {
    pub fn new(id: i64, raw_value: Option<&str>) -> Self {
        Self {
            id,
            raw_value: raw_value.map(String::from),
        }
    }
}

/// Record access for one asset field at a time.
#[async_trait]
pub trait AssetRecordStore: Send + Sync {
    /// Every record of the field's table, ordered by id.
    async fn list_records(&self, field: &AssetField) -> Result<Vec<AssetRecord>, RecordStoreError>;

    /// Set the field to `new_value` only while it still holds `expected`.
    ///
    /// Returns `false` when no row matched, i.e. the record is gone or its
    /// value changed since it was listed.
    async fn update_identifier(
        &self,
        record_id: i64,
        field: &AssetField,
        expected: &str,
        new_value: &str,
    ) -> Result<bool, RecordStoreError>;
}
