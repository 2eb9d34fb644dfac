use sqlx::{sqlite::SqliteRow, Row};

use crate::domain::{Device, Direction, LogicalInterface, PhysicalInterface, Pod, Role};

pub fn map_pod_row(row: &SqliteRow) -> Pod {
    Pod {
        id: row.get("id"),
        name: row.get("name"),
        spine_device_type: row.get("spine_device_type"),
        leaf_device_type: row.get("leaf_device_type"),
        inter_connect_prefix: row.get("inter_connect_prefix"),
        vlan_prefix: row.get("vlan_prefix"),
        loopback_prefix: row.get("loopback_prefix"),
        spine_as: row.get::<i64, _>("spine_as") as u32,
        leaf_as: row.get::<i64, _>("leaf_as") as u32,
        topology: row.get("topology"),
        allocated_loopback_block: row.get("allocated_loopback_block"),
        allocated_irb_block: row.get("allocated_irb_block"),
    }
}

pub fn map_device_row(row: &SqliteRow) -> Device {
    let role: String = row.get("role");
    Device {
        id: row.get("id"),
        pod_id: row.get("pod_id"),
        name: row.get("name"),
        family: row.get("family"),
        mgmt_ip: row.get("mgmt_ip"),
        ssh_user: row.get("ssh_user"),
        ssh_password: row.get("ssh_password"),
        role: role.parse::<Role>().unwrap_or(Role::Leaf),
        asn: row.get::<Option<i64>, _>("asn").map(|v| v as u32),
    }
}

pub fn map_physical_interface_row(row: &SqliteRow) -> PhysicalInterface {
    let direction: String = row.get("direction");
    PhysicalInterface {
        id: row.get("id"),
        device_id: row.get("device_id"),
        name: row.get("name"),
        direction: direction.parse::<Direction>().unwrap_or(Direction::Downlink),
        peer_id: row.get("peer_id"),
    }
}

pub fn map_logical_interface_row(row: &SqliteRow) -> LogicalInterface {
    LogicalInterface {
        id: row.get("id"),
        device_id: row.get("device_id"),
        name: row.get("name"),
        layer_above_id: row.get("layer_above_id"),
        ip_address: row.get("ip_address"),
    }
}
