//! Assetkit Storage Library
//!
//! Storage boundaries used by resolution and migration: the remote asset store
//! ([`UploadGateway`], implemented over HTTP by [`CloudinaryGateway`]) and the
//! legacy local files ([`LegacyMediaSource`], implemented by [`LocalMediaSource`]).
//!
//! # Remote identifiers
//!
//! The store assigns every upload a numeric version and a public id. Records
//! keep them as `v{version}/{public_id}`; public URLs are derived from that
//! value without network access.

pub mod cloudinary;
pub mod factory;
pub mod local;
pub(crate) mod signing;
pub mod traits;

// Re-export commonly used types
pub use cloudinary::CloudinaryGateway;
pub use factory::{create_gateway, create_media_source};
pub use local::LocalMediaSource;
pub use traits::{
    LegacyMediaSource, LookupError, LookupResult, SourceError, UploadContent, UploadError,
    UploadGateway, UploadedAsset,
};
