mod devices;
mod interfaces;
mod pods;
pub(crate) mod row_helpers;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

use crate::domain::{Device, Direction, LogicalInterface, PhysicalInterface, Pod, PodDescription, Role};
use crate::fabric::FabricError;

use devices::DeviceRepo;
use interfaces::{LogicalInterfaceRepo, PhysicalInterfaceRepo};
use pods::PodRepo;

/// Store handles all database operations, delegating to per-entity repo modules.
#[derive(Clone)]
pub struct Store {
    pool: Pool<Sqlite>,
}

impl Store {
    pub async fn new(db_path: &str) -> Result<Self> {
        Self::with_pool_size(db_path, 5).await
    }

    /// `:memory:` is given a single-connection pool so every query lands on
    /// the same in-memory database instead of each acquiring a fresh, empty one.
    pub async fn with_pool_size(db_path: &str, max_connections: u32) -> Result<Self> {
        let max_connections = if db_path == ":memory:" { 1 } else { max_connections };

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path))
            .context("parsing database path")?
            .create_if_missing(true)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("failed to connect to database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("failed to run database migrations")?;
        Ok(())
    }

    // --- Pods ---

    pub async fn get_pod_by_name(&self, name: &str) -> Result<Option<Pod>, FabricError> {
        PodRepo::get_unique_by_name(&self.pool, name).await
    }

    pub async fn create_pod(&self, name: &str, desc: &PodDescription) -> Result<Pod, FabricError> {
        PodRepo::create(&self.pool, name, desc).await
    }

    pub async fn update_pod(&self, id: i64, desc: &PodDescription) -> Result<Pod, FabricError> {
        PodRepo::update(&self.pool, id, desc).await
    }

    pub async fn set_allocated_blocks(
        &self,
        id: i64,
        loopback_block: &str,
        irb_block: Option<&str>,
    ) -> Result<Pod, FabricError> {
        PodRepo::set_allocated_blocks(&self.pool, id, loopback_block, irb_block).await
    }

    pub async fn delete_pod(&self, id: i64) -> Result<(), FabricError> {
        PodRepo::delete(&self.pool, id).await
    }

    // --- Devices ---

    #[allow(clippy::too_many_arguments)]
    pub async fn create_device(
        &self,
        pod_id: i64,
        name: &str,
        family: &str,
        role: Role,
        mgmt_ip: &str,
        ssh_user: &str,
        ssh_password: &str,
    ) -> Result<Device, FabricError> {
        DeviceRepo::create(&self.pool, pod_id, name, family, role, mgmt_ip, ssh_user, ssh_password).await
    }

    pub async fn list_devices_by_pod_ordered(&self, pod_id: i64) -> Result<Vec<Device>, FabricError> {
        DeviceRepo::list_by_pod_ordered(&self.pool, pod_id).await
    }

    pub async fn set_device_asn(&self, id: i64, asn: u32) -> Result<(), FabricError> {
        DeviceRepo::set_asn(&self.pool, id, asn).await
    }

    // --- Physical interfaces ---

    pub async fn create_physical_interface(
        &self,
        device_id: i64,
        name: &str,
        direction: Direction,
    ) -> Result<PhysicalInterface, FabricError> {
        PhysicalInterfaceRepo::create(&self.pool, device_id, name, direction).await
    }

    pub async fn get_physical_interface(&self, id: i64) -> Result<Option<PhysicalInterface>, FabricError> {
        PhysicalInterfaceRepo::get(&self.pool, id).await
    }

    pub async fn find_physical_interface(
        &self,
        device_id: i64,
        name: &str,
    ) -> Result<Option<PhysicalInterface>, FabricError> {
        PhysicalInterfaceRepo::find_by_device_and_name(&self.pool, device_id, name).await
    }

    pub async fn list_peered_physical_interfaces_by_device_ordered(
        &self,
        device_id: i64,
    ) -> Result<Vec<PhysicalInterface>, FabricError> {
        PhysicalInterfaceRepo::list_peered_by_device_ordered(&self.pool, device_id).await
    }

    pub async fn set_peers(&self, a: i64, b: i64) -> Result<(), FabricError> {
        PhysicalInterfaceRepo::set_peers(&self.pool, a, b).await
    }

    // --- Logical interfaces ---

    pub async fn create_logical_interface(
        &self,
        device_id: i64,
        name: &str,
        layer_above_id: Option<i64>,
        ip_address: &str,
    ) -> Result<LogicalInterface, FabricError> {
        LogicalInterfaceRepo::create(&self.pool, device_id, name, layer_above_id, ip_address).await
    }

    pub async fn list_logical_interfaces_by_device(&self, device_id: i64) -> Result<Vec<LogicalInterface>, FabricError> {
        LogicalInterfaceRepo::list_by_device(&self.pool, device_id).await
    }
}
