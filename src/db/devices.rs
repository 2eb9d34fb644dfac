use sqlx::{Pool, Sqlite};

use crate::domain::{Device, Role};
use crate::fabric::FabricError;

use super::row_helpers::map_device_row;

const SELECT_DEVICE: &str = "SELECT id, pod_id, name, family, mgmt_ip, ssh_user, ssh_password, role, asn FROM devices";

pub struct DeviceRepo;

impl DeviceRepo {
    pub async fn create(
        pool: &Pool<Sqlite>,
        pod_id: i64,
        name: &str,
        family: &str,
        role: Role,
        mgmt_ip: &str,
        ssh_user: &str,
        ssh_password: &str,
    ) -> Result<Device, FabricError> {
        let result = sqlx::query(
            "INSERT INTO devices (pod_id, name, family, mgmt_ip, ssh_user, ssh_password, role) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(pod_id)
        .bind(name)
        .bind(family)
        .bind(mgmt_ip)
        .bind(ssh_user)
        .bind(ssh_password)
        .bind(role.as_str())
        .execute(pool)
        .await?;

        let id = result.last_insert_rowid();
        Self::get(pool, id).await?.ok_or_else(|| FabricError::PodNotFound(name.to_string()))
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Device>, FabricError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_DEVICE))
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_device_row))
    }

    /// Ordered ascending by id, which is insertion order — the topology's
    /// device-list order, since the materializer creates rows in that order.
    pub async fn list_by_pod_ordered(pool: &Pool<Sqlite>, pod_id: i64) -> Result<Vec<Device>, FabricError> {
        let rows = sqlx::query(&format!("{} WHERE pod_id = ? ORDER BY id ASC", SELECT_DEVICE))
            .bind(pod_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.iter().map(map_device_row).collect())
    }

    pub async fn set_asn(pool: &Pool<Sqlite>, id: i64, asn: u32) -> Result<(), FabricError> {
        sqlx::query("UPDATE devices SET asn = ? WHERE id = ?")
            .bind(asn as i64)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
