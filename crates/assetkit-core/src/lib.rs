//! Assetkit Core Library
//!
//! Asset identifier classification, the catalog of asset-owning fields, shared
//! error types and configuration used by every assetkit component.

pub mod config;
pub mod error;
pub mod fields;
pub mod identifier;
pub mod storage_types;

// Re-export commonly used types
pub use config::{CloudinaryConfig, Config, LegacyMediaConfig, MigrationSettings};
pub use error::ConfigError;
pub use fields::{find_field, AssetField, ASSET_FIELDS};
pub use identifier::{
    classify, classify_opt, derive_remote_path, format_versioned, parse_versioned, AssetKind,
    AssetReference, VersionedId,
};
pub use storage_types::{DeliveryType, ResourceType};
