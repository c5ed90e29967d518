use assetkit_core::AssetField;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres};

use crate::traits::{AssetRecord, AssetRecordStore, RecordStoreError};

/// Repository over the tables named by the asset field catalog
#[derive(Clone)]
pub struct PgAssetRecordRepository {
    pool: PgPool,
}

impl PgAssetRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Table and column names are interpolated into SQL, so only plain
/// lower-case identifiers are accepted.
fn checked_identifier(name: &str) -> Result<&str, RecordStoreError> {
    let mut chars = name.chars();
    let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if valid_start && valid_rest && name.len() <= 63 {
        Ok(name)
    } else {
        Err(RecordStoreError::InvalidIdentifier(name.to_string()))
    }
}

fn select_sql(field: &AssetField) -> Result<String, RecordStoreError> {
    let table = checked_identifier(field.table)?;
    let column = checked_identifier(field.field)?;
    Ok(format!(
        "SELECT id::bigint AS id, {column}::text AS raw_value FROM {table} ORDER BY id ASC"
    ))
}

fn update_sql(field: &AssetField) -> Result<String, RecordStoreError> {
    let table = checked_identifier(field.table)?;
    let column = checked_identifier(field.field)?;
    Ok(format!(
        "UPDATE {table} SET {column} = $1 WHERE id = $2 AND {column} = $3"
    ))
}

#[async_trait]
impl AssetRecordStore for PgAssetRecordRepository {
    #[tracing::instrument(skip(self, field), fields(db.table = field.table, db.column = field.field, db.operation = "select"))]
    async fn list_records(&self, field: &AssetField) -> Result<Vec<AssetRecord>, RecordStoreError> {
        let sql = select_sql(field)?;
        let start = std::time::Instant::now();

        let rows = sqlx::query_as::<Postgres, (i64, Option<String>)>(&sql)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(
            count = rows.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Listed asset records"
        );

        Ok(rows
            .into_iter()
            .map(|(id, raw_value)| AssetRecord { id, raw_value })
            .collect())
    }

    #[tracing::instrument(skip(self, field, expected, new_value), fields(db.table = field.table, db.column = field.field, db.operation = "update", db.record_id = record_id))]
    async fn update_identifier(
        &self,
        record_id: i64,
        field: &AssetField,
        expected: &str,
        new_value: &str,
    ) -> Result<bool, RecordStoreError> {
        let sql = update_sql(field)?;

        let result = sqlx::query::<Postgres>(&sql)
            .bind(new_value)
            .bind(record_id)
            .bind(expected)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetkit_core::{find_field, ASSET_FIELDS, ResourceType};

    #[test]
    fn test_catalog_identifiers_are_valid() {
        for field in ASSET_FIELDS {
            assert!(select_sql(field).is_ok(), "{}", field.key());
            assert!(update_sql(field).is_ok(), "{}", field.key());
        }
    }

    #[test]
    fn test_generated_sql() {
        let field = find_field("gallery.video").unwrap();
        assert_eq!(
            select_sql(field).unwrap(),
            "SELECT id::bigint AS id, video::text AS raw_value FROM party_gallery ORDER BY id ASC"
        );
        assert_eq!(
            update_sql(field).unwrap(),
            "UPDATE party_gallery SET video = $1 WHERE id = $2 AND video = $3"
        );
    }

    #[test]
    fn test_rejects_unsafe_identifiers() {
        let field = AssetField {
            entity: "evil",
            table: "users; DROP TABLE users",
            field: "image",
            folder: "evil",
            resource_type: ResourceType::Image,
        };
        assert!(matches!(
            select_sql(&field),
            Err(RecordStoreError::InvalidIdentifier(_))
        ));

        assert!(checked_identifier("Image").is_err());
        assert!(checked_identifier("1image").is_err());
        assert!(checked_identifier("").is_err());
        assert!(checked_identifier("_image2").is_ok());
    }
}
