use sqlx::{Pool, Sqlite};

use crate::domain::{Direction, LogicalInterface, PhysicalInterface};
use crate::fabric::FabricError;

use super::row_helpers::{map_logical_interface_row, map_physical_interface_row};

const SELECT_IFD: &str = "SELECT id, device_id, name, direction, peer_id FROM physical_interfaces";
const SELECT_IFL: &str = "SELECT id, device_id, name, layer_above_id, ip_address FROM logical_interfaces";

pub struct PhysicalInterfaceRepo;

impl PhysicalInterfaceRepo {
    pub async fn create(
        pool: &Pool<Sqlite>,
        device_id: i64,
        name: &str,
        direction: Direction,
    ) -> Result<PhysicalInterface, FabricError> {
        let result = sqlx::query("INSERT INTO physical_interfaces (device_id, name, direction) VALUES (?, ?, ?)")
            .bind(device_id)
            .bind(name)
            .bind(direction.as_str())
            .execute(pool)
            .await?;
        let id = result.last_insert_rowid();
        Self::get(pool, id)
            .await?
            .ok_or_else(|| FabricError::TopologyInvalid(format!("interface {} vanished after insert", name)))
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<PhysicalInterface>, FabricError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_IFD))
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_physical_interface_row))
    }

    pub async fn find_by_device_and_name(
        pool: &Pool<Sqlite>,
        device_id: i64,
        name: &str,
    ) -> Result<Option<PhysicalInterface>, FabricError> {
        let row = sqlx::query(&format!("{} WHERE device_id = ? AND name = ?", SELECT_IFD))
            .bind(device_id)
            .bind(name)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_physical_interface_row))
    }

    /// Every port on `device_id` that has a peer assigned, ascending by port
    /// name — the order the interconnect allocator walks a spine's ports in.
    pub async fn list_peered_by_device_ordered(
        pool: &Pool<Sqlite>,
        device_id: i64,
    ) -> Result<Vec<PhysicalInterface>, FabricError> {
        let rows = sqlx::query(&format!(
            "{} WHERE device_id = ? AND peer_id IS NOT NULL ORDER BY name ASC",
            SELECT_IFD
        ))
        .bind(device_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.iter().map(map_physical_interface_row).collect())
    }

    /// Sets both directions of the peer relation in one transaction, keeping
    /// the symmetry invariant intact on every mutation.
    pub async fn set_peers(pool: &Pool<Sqlite>, a: i64, b: i64) -> Result<(), FabricError> {
        let mut tx = pool.begin().await?;
        sqlx::query("UPDATE physical_interfaces SET peer_id = ? WHERE id = ?")
            .bind(b)
            .bind(a)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE physical_interfaces SET peer_id = ? WHERE id = ?")
            .bind(a)
            .bind(b)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

pub struct LogicalInterfaceRepo;

impl LogicalInterfaceRepo {
    pub async fn create(
        pool: &Pool<Sqlite>,
        device_id: i64,
        name: &str,
        layer_above_id: Option<i64>,
        ip_address: &str,
    ) -> Result<LogicalInterface, FabricError> {
        let result = sqlx::query(
            "INSERT INTO logical_interfaces (device_id, name, layer_above_id, ip_address) VALUES (?, ?, ?, ?)",
        )
        .bind(device_id)
        .bind(name)
        .bind(layer_above_id)
        .bind(ip_address)
        .execute(pool)
        .await?;
        let id = result.last_insert_rowid();
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_IFL))
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(map_logical_interface_row(&row))
    }

    pub async fn list_by_device(pool: &Pool<Sqlite>, device_id: i64) -> Result<Vec<LogicalInterface>, FabricError> {
        let rows = sqlx::query(&format!("{} WHERE device_id = ? ORDER BY id ASC", SELECT_IFL))
            .bind(device_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.iter().map(map_logical_interface_row).collect())
    }
}
