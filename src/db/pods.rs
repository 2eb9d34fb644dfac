use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::domain::{Pod, PodDescription};
use crate::fabric::FabricError;

use super::row_helpers::map_pod_row;

const SELECT_POD: &str = r#"
    SELECT id, name, spine_device_type, leaf_device_type, inter_connect_prefix,
           vlan_prefix, loopback_prefix, spine_as, leaf_as, topology,
           allocated_loopback_block, allocated_irb_block
    FROM pods
"#;

/// Pod persistence. `get_unique_by_name` mirrors the object-store adapter's
/// `getUniqueByName` contract — name carries a UNIQUE constraint so the
/// `Ambiguous` branch should be unreachable in practice, but is still
/// checked rather than assumed.
pub struct PodRepo;

impl PodRepo {
    pub async fn get_unique_by_name(pool: &Pool<Sqlite>, name: &str) -> Result<Option<Pod>, FabricError> {
        let rows = sqlx::query(&format!("{} WHERE name = ?", SELECT_POD))
            .bind(name)
            .fetch_all(pool)
            .await?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(Some(map_pod_row(&rows[0]))),
            _ => Err(FabricError::AmbiguousPod(name.to_string())),
        }
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Pod>, FabricError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_POD))
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_pod_row))
    }

    pub async fn create(pool: &Pool<Sqlite>, name: &str, desc: &PodDescription) -> Result<Pod, FabricError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"INSERT INTO pods (name, spine_device_type, leaf_device_type, inter_connect_prefix,
                                  vlan_prefix, loopback_prefix, spine_as, leaf_as, topology,
                                  created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(name)
        .bind(&desc.spine_device_type)
        .bind(&desc.leaf_device_type)
        .bind(&desc.inter_connect_prefix)
        .bind(&desc.vlan_prefix)
        .bind(&desc.loopback_prefix)
        .bind(desc.spine_as as i64)
        .bind(desc.leaf_as as i64)
        .bind(&desc.topology)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        let id = result.last_insert_rowid();
        Self::get(pool, id)
            .await?
            .ok_or_else(|| FabricError::PodNotFound(name.to_string()))
    }

    pub async fn update(pool: &Pool<Sqlite>, id: i64, desc: &PodDescription) -> Result<Pod, FabricError> {
        sqlx::query(
            r#"UPDATE pods SET spine_device_type = ?, leaf_device_type = ?, inter_connect_prefix = ?,
                                vlan_prefix = ?, loopback_prefix = ?, spine_as = ?, leaf_as = ?,
                                topology = ?, updated_at = ?
               WHERE id = ?"#,
        )
        .bind(&desc.spine_device_type)
        .bind(&desc.leaf_device_type)
        .bind(&desc.inter_connect_prefix)
        .bind(&desc.vlan_prefix)
        .bind(&desc.loopback_prefix)
        .bind(desc.spine_as as i64)
        .bind(desc.leaf_as as i64)
        .bind(&desc.topology)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

        Self::get(pool, id)
            .await?
            .ok_or_else(|| FabricError::PodNotFound(id.to_string()))
    }

    pub async fn set_allocated_blocks(
        pool: &Pool<Sqlite>,
        id: i64,
        loopback_block: &str,
        irb_block: Option<&str>,
    ) -> Result<Pod, FabricError> {
        sqlx::query("UPDATE pods SET allocated_loopback_block = ?, allocated_irb_block = ?, updated_at = ? WHERE id = ?")
            .bind(loopback_block)
            .bind(irb_block)
            .bind(Utc::now())
            .bind(id)
            .execute(pool)
            .await?;

        Self::get(pool, id)
            .await?
            .ok_or_else(|| FabricError::PodNotFound(id.to_string()))
    }

    /// Cascades to devices and interfaces via `ON DELETE CASCADE`.
    pub async fn delete(pool: &Pool<Sqlite>, id: i64) -> Result<(), FabricError> {
        sqlx::query("DELETE FROM pods WHERE id = ?").bind(id).execute(pool).await?;
        Ok(())
    }
}
