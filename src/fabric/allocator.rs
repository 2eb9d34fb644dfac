use crate::db::Store;
use crate::domain::{Device, Pod, Role};

use super::cidr;
use super::FabricError;

/// Hardcoded constants the source algorithm baked in directly — externalized
/// here per the "mark these as configuration with defaults" design note.
#[derive(Debug, Clone)]
pub struct AllocatorConfig {
    pub hosts_per_leaf: u32,
    pub loopback_unit: String,
    pub irb_unit: String,
    pub interconnect_prefix_len: u8,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            hosts_per_leaf: 254,
            loopback_unit: "lo0.0".to_string(),
            irb_unit: "irb.1".to_string(),
            interconnect_prefix_len: 31,
        }
    }
}

/// Runs the four allocation substeps in the fixed order loopback → IRB →
/// interconnect → AS, returning the pod with its derived blocks populated.
pub async fn allocate(store: &Store, pod: &Pod, cfg: &AllocatorConfig) -> Result<Pod, FabricError> {
    let devices = store.list_devices_by_pod_ordered(pod.id).await?;
    let spines: Vec<Device> = devices.iter().filter(|d| d.role == Role::Spine).cloned().collect();
    let leaves: Vec<Device> = devices.iter().filter(|d| d.role == Role::Leaf).cloned().collect();

    let loopback_block = allocate_loopback(store, pod, &devices, cfg).await?;

    let irb_block = if leaves.is_empty() {
        None
    } else {
        Some(allocate_irb(store, pod, &leaves, cfg).await?)
    };

    if !leaves.is_empty() {
        allocate_interconnect(store, pod, &spines, cfg).await?;
    }

    allocate_as_numbers(store, pod, &spines, &leaves).await?;

    store.set_allocated_blocks(pod.id, &loopback_block, irb_block.as_deref()).await
}

async fn allocate_loopback(
    store: &Store,
    pod: &Pod,
    devices: &[Device],
    cfg: &AllocatorConfig,
) -> Result<String, FabricError> {
    let required = devices.len() as u64 + 2;
    let bits = cidr::bits_for_count(required);
    let (network, prefix_len) = cidr::fit_block(&pod.loopback_prefix, bits)?;
    let hosts = cidr::usable_hosts(network, prefix_len);

    if hosts.len() < devices.len() {
        return Err(FabricError::AddressSpaceExhausted(format!(
            "loopback block {} has {} usable hosts, need {}",
            cidr::format_cidr(network, prefix_len),
            hosts.len(),
            devices.len()
        )));
    }

    for (device, host) in devices.iter().zip(hosts.into_iter()) {
        let ip = format!("{}/32", cidr::ip_to_string(host));
        store.create_logical_interface(device.id, &cfg.loopback_unit, None, &ip).await?;
    }

    Ok(cidr::format_cidr(network, prefix_len))
}

async fn allocate_irb(
    store: &Store,
    pod: &Pod,
    leaves: &[Device],
    cfg: &AllocatorConfig,
) -> Result<String, FabricError> {
    let cidr_per_subnet = 32 - cidr::bits_for_count(cfg.hosts_per_leaf as u64 + 2) as u8;
    let total_hosts = leaves.len() as u64 * (cfg.hosts_per_leaf as u64 + 2);
    let bits = cidr::bits_for_count(total_hosts);
    let (network, prefix_len) = cidr::fit_block(&pod.vlan_prefix, bits)?;

    let subnets = cidr::child_subnets(network, prefix_len, cidr_per_subnet);
    if subnets.len() < leaves.len() {
        return Err(FabricError::AddressSpaceExhausted(format!(
            "IRB block {} yields {} /{} subnets, need {}",
            cidr::format_cidr(network, prefix_len),
            subnets.len(),
            cidr_per_subnet,
            leaves.len()
        )));
    }

    for (leaf, (subnet_net, subnet_prefix)) in leaves.iter().zip(subnets.into_iter()) {
        let host = cidr::usable_hosts(subnet_net, subnet_prefix)
            .into_iter()
            .next()
            .ok_or_else(|| FabricError::AddressSpaceExhausted(format!("empty IRB subnet for {}", leaf.name)))?;
        let ip = format!("{}/{}", cidr::ip_to_string(host), subnet_prefix);
        store.create_logical_interface(leaf.id, &cfg.irb_unit, None, &ip).await?;
    }

    Ok(cidr::format_cidr(network, prefix_len))
}

async fn allocate_interconnect(
    store: &Store,
    pod: &Pod,
    spines: &[Device],
    cfg: &AllocatorConfig,
) -> Result<(), FabricError> {
    let mut subnet_count = 0u64;
    for spine in spines {
        subnet_count += store.list_peered_physical_interfaces_by_device_ordered(spine.id).await?.len() as u64;
    }
    if subnet_count == 0 {
        return Ok(());
    }

    let bits = cidr::bits_for_count(2 * subnet_count);
    let (network, prefix_len) = cidr::fit_block(&pod.inter_connect_prefix, bits)?;
    let mut subnets = cidr::child_subnets(network, prefix_len, cfg.interconnect_prefix_len).into_iter();

    for spine in spines {
        let peered_ports = store.list_peered_physical_interfaces_by_device_ordered(spine.id).await?;
        for spine_ifd in peered_ports {
            let (subnet_net, subnet_prefix) = subnets.next().ok_or_else(|| {
                FabricError::AddressSpaceExhausted(format!(
                    "interconnect block {} exhausted",
                    cidr::format_cidr(network, prefix_len)
                ))
            })?;
            let mut addrs = cidr::usable_hosts(subnet_net, subnet_prefix).into_iter();
            let spine_ip = addrs.next().unwrap();
            let leaf_ip = addrs.next().unwrap();

            let spine_ifl_name = format!("{}.0", spine_ifd.name);
            store
                .create_logical_interface(
                    spine.id,
                    &spine_ifl_name,
                    Some(spine_ifd.id),
                    &format!("{}/{}", cidr::ip_to_string(spine_ip), subnet_prefix),
                )
                .await?;

            let peer_id = spine_ifd
                .peer_id
                .ok_or_else(|| FabricError::TopologyInvalid(format!("{} has no peer at allocation time", spine_ifd.name)))?;
            let peer_ifd = store
                .get_physical_interface(peer_id)
                .await?
                .ok_or_else(|| FabricError::TopologyInvalid(format!("peer interface {} vanished", peer_id)))?;
            let leaf_ifl_name = format!("{}.0", peer_ifd.name);
            store
                .create_logical_interface(
                    peer_ifd.device_id,
                    &leaf_ifl_name,
                    Some(peer_ifd.id),
                    &format!("{}/{}", cidr::ip_to_string(leaf_ip), subnet_prefix),
                )
                .await?;
        }
    }

    Ok(())
}

async fn allocate_as_numbers(
    store: &Store,
    pod: &Pod,
    spines: &[Device],
    leaves: &[Device],
) -> Result<(), FabricError> {
    for (i, spine) in spines.iter().enumerate() {
        store.set_device_asn(spine.id, pod.spine_as + i as u32).await?;
    }
    for (i, leaf) in leaves.iter().enumerate() {
        store.set_device_asn(leaf.id, pod.leaf_as + i as u32).await?;
    }
    Ok(())
}
