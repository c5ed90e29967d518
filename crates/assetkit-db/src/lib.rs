//! Assetkit DB Library
//!
//! The [`AssetRecordStore`] port used by the migration job, and its Postgres
//! implementation over the tables listed in the asset field catalog.

pub mod db;
pub mod traits;

// Re-export commonly used types
pub use db::{connect, ConnectError, PgAssetRecordRepository};
pub use traits::{AssetRecord, AssetRecordStore, RecordStoreError};
