//! Postgres repositories
//
// Asset-owning records, addressed through the field catalog
pub mod asset_record;
//
// Connection pool setup
pub mod pool;

pub use asset_record::PgAssetRecordRepository;
pub use pool::{connect, ConnectError};
