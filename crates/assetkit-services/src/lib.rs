//! Assetkit Services Layer
//!
//! Read-time URL resolution ([`StorageResolver`]) and the one-off migration of
//! legacy local files to the remote asset store ([`MigrationJob`]). Both take
//! their collaborators as `Arc<dyn Trait>` so they can run against fakes.

pub mod migration;
pub mod resolver;

pub use migration::{
    MigrationError, MigrationJob, MigrationOptions, MigrationReport, RecordError, RecordSkip,
    SKIP_IDENTIFIER_CHANGED, SKIP_SOURCE_MISSING,
};
pub use resolver::{join_media_url, StorageResolver};
