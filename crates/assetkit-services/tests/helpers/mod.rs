//! In-memory fakes for the storage and record store traits

#![allow(dead_code)]

use assetkit_core::{AssetField, DeliveryType, ResourceType};
use assetkit_db::{AssetRecord, AssetRecordStore, RecordStoreError};
use assetkit_storage::{
    LegacyMediaSource, LookupError, LookupResult, SourceError, UploadContent, UploadError,
    UploadGateway, UploadedAsset,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

pub const BASE_VERSION: u64 = 1700000000;

/// Remote store fake: counts uploads, fails on demand, answers lookups from a map.
#[derive(Default)]
pub struct MockGateway {
    uploads: Mutex<Vec<(String, Option<String>)>>,
    failures: Mutex<HashMap<String, u32>>,
    remote_assets: Mutex<HashMap<String, String>>,
    lookups: Mutex<Vec<String>>,
    lookup_delay: Option<Duration>,
    forbid_network: bool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Any upload or lookup panics.
    pub fn offline() -> Self {
        Self {
            forbid_network: true,
            ..Self::default()
        }
    }

    pub fn with_lookup_delay(delay: Duration) -> Self {
        Self {
            lookup_delay: Some(delay),
            ..Self::default()
        }
    }

    /// Fail the next `times` uploads of `filename`.
    pub fn fail_uploads(&self, filename: &str, times: u32) {
        self.failures
            .lock()
            .unwrap()
            .insert(filename.to_string(), times);
    }

    pub fn add_remote_asset(&self, path: &str, secure_url: &str) {
        self.remote_assets
            .lock()
            .unwrap()
            .insert(path.to_string(), secure_url.to_string());
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn uploaded_folders(&self) -> Vec<String> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .map(|(folder, _)| folder.clone())
            .collect()
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl UploadGateway for MockGateway {
    async fn upload(
        &self,
        content: UploadContent,
        folder: &str,
        _resource_type: ResourceType,
    ) -> Result<UploadedAsset, UploadError> {
        assert!(!self.forbid_network, "upload called on an offline gateway");

        let filename = content.filename.clone().unwrap_or_default();
        {
            let mut failures = self.failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(&filename) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(UploadError::Rejected {
                        status: 500,
                        message: "Internal Server Error".to_string(),
                    });
                }
            }
        }

        let mut uploads = self.uploads.lock().unwrap();
        uploads.push((folder.to_string(), content.filename.clone()));
        let stem = filename.split('.').next().unwrap_or_default();

        Ok(UploadedAsset {
            version: BASE_VERSION + uploads.len() as u64,
            public_id: format!("{}/{}", folder, stem),
        })
    }

    async fn explicit_lookup(
        &self,
        path: &str,
        _resource_type: ResourceType,
        _delivery_type: DeliveryType,
    ) -> Result<LookupResult, LookupError> {
        assert!(!self.forbid_network, "lookup called on an offline gateway");

        self.lookups.lock().unwrap().push(path.to_string());
        if let Some(delay) = self.lookup_delay {
            tokio::time::sleep(delay).await;
        }

        let secure_url = self.remote_assets.lock().unwrap().get(path).cloned();
        match secure_url {
            Some(secure_url) => Ok(LookupResult { secure_url }),
            None => Err(LookupError::NotFound(path.to_string())),
        }
    }

    fn delivery_url(&self, versioned_id: &str, resource_type: ResourceType) -> String {
        format!(
            "https://res.cloudinary.com/demo/{}/upload/{}",
            resource_type, versioned_id
        )
    }
}

/// Legacy files keyed by raw value.
#[derive(Default)]
pub struct MockMediaSource {
    files: Mutex<HashMap<String, Vec<u8>>>,
    unreadable: Mutex<HashSet<String>>,
    rejected: Mutex<HashSet<String>>,
}

impl MockMediaSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files(raw_values: &[&str]) -> Self {
        let source = Self::new();
        for raw in raw_values {
            source.set_file(raw, raw.as_bytes().to_vec());
        }
        source
    }

    pub fn set_file(&self, raw_value: &str, data: Vec<u8>) {
        self.files
            .lock()
            .unwrap()
            .insert(raw_value.to_string(), data);
    }

    /// The file exists but reading it fails with an I/O error.
    pub fn make_unreadable(&self, raw_value: &str) {
        self.unreadable
            .lock()
            .unwrap()
            .insert(raw_value.to_string());
    }

    /// The value is refused as a path before touching the filesystem.
    pub fn reject_path(&self, raw_value: &str) {
        self.rejected.lock().unwrap().insert(raw_value.to_string());
    }
}

#[async_trait]
impl LegacyMediaSource for MockMediaSource {
    async fn exists(&self, raw_value: &str) -> Result<bool, SourceError> {
        if self.rejected.lock().unwrap().contains(raw_value) {
            return Err(SourceError::InvalidPath(format!(
                "{} escapes the media root",
                raw_value
            )));
        }
        Ok(self.files.lock().unwrap().contains_key(raw_value))
    }

    async fn read(&self, raw_value: &str) -> Result<UploadContent, SourceError> {
        if self.unreadable.lock().unwrap().contains(raw_value) {
            return Err(SourceError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "permission denied",
            )));
        }
        let data = self
            .files
            .lock()
            .unwrap()
            .get(raw_value)
            .cloned()
            .ok_or_else(|| SourceError::Missing(raw_value.to_string()))?;
        let filename = raw_value.rsplit('/').next().map(String::from);
        Ok(UploadContent::new(data, filename))
    }
}

/// Single-field record table with compare-and-set updates.
#[derive(Default)]
pub struct MockRecordStore {
    rows: Mutex<BTreeMap<i64, Option<String>>>,
    changes_after_listing: Mutex<Vec<(i64, Option<String>)>>,
    failing_updates: Mutex<HashSet<i64>>,
    fail_listing: bool,
}

impl MockRecordStore {
    pub fn new(rows: &[(i64, Option<&str>)]) -> Self {
        Self {
            rows: Mutex::new(
                rows.iter()
                    .map(|(id, value)| (*id, value.map(String::from)))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            fail_listing: true,
            ..Self::default()
        }
    }

    /// Rewrite a row right after the job has listed the records.
    pub fn change_after_listing(&self, id: i64, value: Option<&str>) {
        self.changes_after_listing
            .lock()
            .unwrap()
            .push((id, value.map(String::from)));
    }

    /// Updates of this record fail with a database error.
    pub fn fail_updates(&self, id: i64) {
        self.failing_updates.lock().unwrap().insert(id);
    }

    pub fn value(&self, id: i64) -> Option<String> {
        self.rows.lock().unwrap().get(&id).cloned().flatten()
    }
}

#[async_trait]
impl AssetRecordStore for MockRecordStore {
    async fn list_records(&self, _field: &AssetField) -> Result<Vec<AssetRecord>, RecordStoreError> {
        if self.fail_listing {
            return Err(RecordStoreError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut rows = self.rows.lock().unwrap();
        let records = rows
            .iter()
            .map(|(id, value)| AssetRecord {
                id: *id,
                raw_value: value.clone(),
            })
            .collect();

        for (id, value) in self.changes_after_listing.lock().unwrap().drain(..) {
            rows.insert(id, value);
        }

        Ok(records)
    }

    async fn update_identifier(
        &self,
        record_id: i64,
        _field: &AssetField,
        expected: &str,
        new_value: &str,
    ) -> Result<bool, RecordStoreError> {
        if self.failing_updates.lock().unwrap().contains(&record_id) {
            return Err(RecordStoreError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&record_id) {
            Some(value) if value.as_deref() == Some(expected) => {
                *value = Some(new_value.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
