//! Catalog of entity fields that own an uploaded asset.
//!
//! Each entry ties a table column to the upload folder and resource type used
//! when its files were first stored. Folder hints come from this catalog, never
//! from the stored data.

use serde::Serialize;

use crate::storage_types::ResourceType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssetField {
    /// Logical entity name, used in the field key.
    pub entity: &'static str,
    /// Backing table.
    pub table: &'static str,
    /// Column holding the raw identifier.
    pub field: &'static str,
    /// Upload folder, without trailing slash.
    pub folder: &'static str,
    pub resource_type: ResourceType,
}

impl AssetField {
    /// Stable `<entity>.<field>` key, e.g. `gallery.video`.
    pub fn key(&self) -> String {
        format!("{}.{}", self.entity, self.field)
    }
}

pub const ASSET_FIELDS: &[AssetField] = &[
    AssetField {
        entity: "leadership",
        table: "party_nationalleadership",
        field: "image",
        folder: "leadership",
        resource_type: ResourceType::Image,
    },
    AssetField {
        entity: "gallery",
        table: "party_gallery",
        field: "image",
        folder: "gallery/images",
        resource_type: ResourceType::Image,
    },
    AssetField {
        entity: "gallery",
        table: "party_gallery",
        field: "video",
        folder: "gallery/videos",
        resource_type: ResourceType::Video,
    },
    AssetField {
        entity: "gallery",
        table: "party_gallery",
        field: "thumbnail",
        folder: "gallery/thumbnails",
        resource_type: ResourceType::Image,
    },
    AssetField {
        entity: "product",
        table: "party_product",
        field: "image",
        folder: "products",
        resource_type: ResourceType::Image,
    },
    AssetField {
        entity: "news",
        table: "party_news",
        field: "preview_image",
        folder: "news/previews",
        resource_type: ResourceType::Image,
    },
    AssetField {
        entity: "news",
        table: "party_news",
        field: "image",
        folder: "news",
        resource_type: ResourceType::Image,
    },
    AssetField {
        entity: "event",
        table: "party_event",
        field: "preview_image",
        folder: "events/previews",
        resource_type: ResourceType::Image,
    },
    AssetField {
        entity: "user",
        table: "authentication_user",
        field: "profile_picture",
        folder: "profile_pictures",
        resource_type: ResourceType::Image,
    },
];

/// Look up a catalog entry by its `<entity>.<field>` key.
pub fn find_field(key: &str) -> Option<&'static AssetField> {
    ASSET_FIELDS.iter().find(|f| f.key() == key)
}
