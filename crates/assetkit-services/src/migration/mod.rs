//! Legacy media migration
//!
//! Moves every legacy local file referenced by one asset field to the remote
//! store and rewrites the field to the returned `v{version}/{public_id}`.
//! Records are processed one at a time; a failing record never stops the run.

mod job;
mod report;

pub use job::{MigrationJob, MigrationOptions};
pub use report::{MigrationReport, RecordError, RecordSkip};

use assetkit_db::RecordStoreError;
use assetkit_storage::{SourceError, UploadError};
use thiserror::Error;

/// Skip reason for a record whose legacy file is absent.
pub const SKIP_SOURCE_MISSING: &str = "source missing";
/// Skip reason for a record rewritten by someone else mid-run.
pub const SKIP_IDENTIFIER_CHANGED: &str = "identifier changed during migration";

#[derive(Debug, Error)]
pub enum MigrationError {
    /// Records could not be listed; nothing was migrated.
    #[error("Failed to enumerate records: {0}")]
    RecordStore(RecordStoreError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    /// The upload succeeded but the record still holds its old value.
    #[error("Failed to persist identifier {orphaned}: {source}")]
    Persist {
        source: RecordStoreError,
        orphaned: String,
    },
}
