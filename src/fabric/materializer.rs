use std::collections::{HashMap, HashSet};

use crate::catalog::DeviceFamilyCatalog;
use crate::db::Store;
use crate::domain::{Direction, Pod, PodDescription, Role};
use crate::loaders::TopologyDoc;

use super::FabricError;

/// Checks device-name uniqueness and link port references against the
/// family port catalog without touching the store. Called before any row is
/// written so a bad topology never leaves a partial pod behind.
pub fn validate_topology(
    catalog: &DeviceFamilyCatalog,
    description: &PodDescription,
    topology: &TopologyDoc,
) -> Result<(), FabricError> {
    let spine_ports = catalog
        .get(&description.spine_device_type)
        .ok_or_else(|| FabricError::UnknownDeviceFamily(description.spine_device_type.clone()))?;
    let leaf_ports = catalog
        .get(&description.leaf_device_type)
        .ok_or_else(|| FabricError::UnknownDeviceFamily(description.leaf_device_type.clone()))?;

    let mut seen_names: HashSet<&str> = HashSet::new();
    let mut spine_port_names: HashMap<&str, HashSet<&str>> = HashMap::new();
    let mut leaf_port_names: HashMap<&str, HashSet<&str>> = HashMap::new();

    for spine in &topology.spines {
        if !seen_names.insert(&spine.name) {
            return Err(FabricError::TopologyInvalid(format!("duplicate device name: {}", spine.name)));
        }
        spine_port_names.insert(&spine.name, spine_ports.ports.iter().map(String::as_str).collect());
    }

    for leaf in &topology.leafs {
        if !seen_names.insert(&leaf.name) {
            return Err(FabricError::TopologyInvalid(format!("duplicate device name: {}", leaf.name)));
        }
        let ports = leaf_ports
            .uplink_ports
            .iter()
            .chain(leaf_ports.downlink_ports.iter())
            .map(String::as_str)
            .collect();
        leaf_port_names.insert(&leaf.name, ports);
    }

    for link in &topology.links {
        let s_ports = spine_port_names
            .get(link.s_name.as_str())
            .ok_or_else(|| FabricError::TopologyInvalid(format!("unknown spine device: {}", link.s_name)))?;
        if !s_ports.contains(link.s_port.as_str()) {
            return Err(FabricError::TopologyInvalid(format!("unknown port {} on {}", link.s_port, link.s_name)));
        }

        let l_ports = leaf_port_names
            .get(link.l_name.as_str())
            .ok_or_else(|| FabricError::TopologyInvalid(format!("unknown leaf device: {}", link.l_name)))?;
        if !l_ports.contains(link.l_port.as_str()) {
            return Err(FabricError::TopologyInvalid(format!("unknown port {} on {}", link.l_port, link.l_name)));
        }
    }

    Ok(())
}

/// Constructs spine/leaf devices, their port interfaces, and peer links from
/// a topology document. Runs after a Pod row exists and after
/// `validate_topology` has already accepted the document; never mutates the
/// pod itself.
pub async fn materialize(
    store: &Store,
    catalog: &DeviceFamilyCatalog,
    pod: &Pod,
    topology: &TopologyDoc,
) -> Result<(), FabricError> {
    let mut seen_names: HashSet<&str> = HashSet::new();
    let mut device_ids: HashMap<&str, i64> = HashMap::new();

    let spine_ports = catalog
        .get(&pod.spine_device_type)
        .ok_or_else(|| FabricError::UnknownDeviceFamily(pod.spine_device_type.clone()))?
        .clone();
    for spine in &topology.spines {
        if !seen_names.insert(&spine.name) {
            return Err(FabricError::TopologyInvalid(format!("duplicate device name: {}", spine.name)));
        }
        let device = store
            .create_device(
                pod.id,
                &spine.name,
                &pod.spine_device_type,
                Role::Spine,
                &spine.mgmt_ip,
                &spine.user,
                &spine.password,
            )
            .await?;
        device_ids.insert(&spine.name, device.id);
        for port in &spine_ports.ports {
            store.create_physical_interface(device.id, port, Direction::Downlink).await?;
        }
    }

    let leaf_ports = catalog
        .get(&pod.leaf_device_type)
        .ok_or_else(|| FabricError::UnknownDeviceFamily(pod.leaf_device_type.clone()))?
        .clone();
    for leaf in &topology.leafs {
        if !seen_names.insert(&leaf.name) {
            return Err(FabricError::TopologyInvalid(format!("duplicate device name: {}", leaf.name)));
        }
        let device = store
            .create_device(
                pod.id,
                &leaf.name,
                &pod.leaf_device_type,
                Role::Leaf,
                &leaf.mgmt_ip,
                &leaf.user,
                &leaf.password,
            )
            .await?;
        device_ids.insert(&leaf.name, device.id);
        for port in &leaf_ports.uplink_ports {
            store.create_physical_interface(device.id, port, Direction::Uplink).await?;
        }
        for port in &leaf_ports.downlink_ports {
            store.create_physical_interface(device.id, port, Direction::Downlink).await?;
        }
    }

    for link in &topology.links {
        let s_id = *device_ids
            .get(link.s_name.as_str())
            .ok_or_else(|| FabricError::TopologyInvalid(format!("unknown spine device: {}", link.s_name)))?;
        let l_id = *device_ids
            .get(link.l_name.as_str())
            .ok_or_else(|| FabricError::TopologyInvalid(format!("unknown leaf device: {}", link.l_name)))?;

        let s_ifd = store
            .find_physical_interface(s_id, &link.s_port)
            .await?
            .ok_or_else(|| FabricError::TopologyInvalid(format!("unknown port {} on {}", link.s_port, link.s_name)))?;
        let l_ifd = store
            .find_physical_interface(l_id, &link.l_port)
            .await?
            .ok_or_else(|| FabricError::TopologyInvalid(format!("unknown port {} on {}", link.l_port, link.l_name)))?;

        store.set_peers(s_ifd.id, l_ifd.id).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::{LeafEntry, LinkEntry, SpineEntry};

    async fn test_store() -> Store {
        Store::with_pool_size(":memory:", 1).await.unwrap()
    }

    fn test_catalog() -> DeviceFamilyCatalog {
        serde_json::from_str(
            r#"{
                "qfx10008": {"ports": ["et-0/0/0", "et-0/0/1"]},
                "qfx5120": {"uplinkPorts": ["et-0/0/48", "et-0/0/49"], "downlinkPorts": ["xe-0/0/0"]}
            }"#,
        )
        .unwrap()
    }

    async fn test_pod(store: &Store) -> Pod {
        let desc = PodDescription {
            spine_device_type: "qfx10008".into(),
            leaf_device_type: "qfx5120".into(),
            inter_connect_prefix: "192.168.0.0/24".into(),
            vlan_prefix: "172.16.0.0/16".into(),
            loopback_prefix: "10.0.0.0/24".into(),
            spine_as: 65000,
            leaf_as: 65100,
            topology: "pod1.json".into(),
        };
        store.create_pod("pod1", &desc).await.unwrap()
    }

    #[tokio::test]
    async fn materializes_minimal_fabric_and_peers_links() {
        let store = test_store().await;
        let catalog = test_catalog();
        let pod = test_pod(&store).await;

        let topology = TopologyDoc {
            spines: vec![SpineEntry {
                name: "spine1".into(),
                user: "root".into(),
                password: "x".into(),
                mgmt_ip: "10.1.0.1".into(),
            }],
            leafs: vec![LeafEntry {
                name: "leaf1".into(),
                user: "root".into(),
                password: "x".into(),
                mgmt_ip: "10.1.0.2".into(),
            }],
            links: vec![LinkEntry {
                s_name: "spine1".into(),
                s_port: "et-0/0/0".into(),
                l_name: "leaf1".into(),
                l_port: "et-0/0/48".into(),
            }],
        };

        materialize(&store, &catalog, &pod, &topology).await.unwrap();

        let devices = store.list_devices_by_pod_ordered(pod.id).await.unwrap();
        assert_eq!(devices.len(), 2);

        let spine = devices.iter().find(|d| d.role == Role::Spine).unwrap();
        let leaf = devices.iter().find(|d| d.role == Role::Leaf).unwrap();

        let spine_port = store.find_physical_interface(spine.id, "et-0/0/0").await.unwrap().unwrap();
        let leaf_port = store.find_physical_interface(leaf.id, "et-0/0/48").await.unwrap().unwrap();
        assert_eq!(spine_port.peer_id, Some(leaf_port.id));
        assert_eq!(leaf_port.peer_id, Some(spine_port.id));

        let unpeered = store.find_physical_interface(spine.id, "et-0/0/1").await.unwrap().unwrap();
        assert_eq!(unpeered.peer_id, None);
    }

    #[tokio::test]
    async fn fails_fatally_on_link_to_unknown_port() {
        let store = test_store().await;
        let catalog = test_catalog();
        let pod = test_pod(&store).await;

        let topology = TopologyDoc {
            spines: vec![SpineEntry {
                name: "spine1".into(),
                user: "root".into(),
                password: "x".into(),
                mgmt_ip: "10.1.0.1".into(),
            }],
            leafs: vec![LeafEntry {
                name: "leaf1".into(),
                user: "root".into(),
                password: "x".into(),
                mgmt_ip: "10.1.0.2".into(),
            }],
            links: vec![LinkEntry {
                s_name: "spine1".into(),
                s_port: "et-99/0/0".into(),
                l_name: "leaf1".into(),
                l_port: "et-0/0/48".into(),
            }],
        };

        let err = materialize(&store, &catalog, &pod, &topology).await.unwrap_err();
        assert!(matches!(err, FabricError::TopologyInvalid(_)));
    }

    #[tokio::test]
    async fn fails_fatally_on_duplicate_device_name() {
        let store = test_store().await;
        let catalog = test_catalog();
        let pod = test_pod(&store).await;

        let topology = TopologyDoc {
            spines: vec![
                SpineEntry {
                    name: "spine1".into(),
                    user: "root".into(),
                    password: "x".into(),
                    mgmt_ip: "10.1.0.1".into(),
                },
                SpineEntry {
                    name: "spine1".into(),
                    user: "root".into(),
                    password: "x".into(),
                    mgmt_ip: "10.1.0.3".into(),
                },
            ],
            leafs: vec![],
            links: vec![],
        };

        let err = materialize(&store, &catalog, &pod, &topology).await.unwrap_err();
        assert!(matches!(err, FabricError::TopologyInvalid(_)));
    }

    fn sample_description() -> PodDescription {
        PodDescription {
            spine_device_type: "qfx10008".into(),
            leaf_device_type: "qfx5120".into(),
            inter_connect_prefix: "192.168.0.0/24".into(),
            vlan_prefix: "172.16.0.0/16".into(),
            loopback_prefix: "10.0.0.0/24".into(),
            spine_as: 65000,
            leaf_as: 65100,
            topology: "pod1.json".into(),
        }
    }

    #[test]
    fn validate_topology_accepts_well_formed_document() {
        let catalog = test_catalog();
        let topology = TopologyDoc {
            spines: vec![SpineEntry { name: "spine1".into(), user: "root".into(), password: "x".into(), mgmt_ip: "10.1.0.1".into() }],
            leafs: vec![LeafEntry { name: "leaf1".into(), user: "root".into(), password: "x".into(), mgmt_ip: "10.1.0.2".into() }],
            links: vec![LinkEntry { s_name: "spine1".into(), s_port: "et-0/0/0".into(), l_name: "leaf1".into(), l_port: "et-0/0/48".into() }],
        };

        assert!(validate_topology(&catalog, &sample_description(), &topology).is_ok());
    }

    #[test]
    fn validate_topology_rejects_unknown_port_without_touching_store() {
        let catalog = test_catalog();
        let topology = TopologyDoc {
            spines: vec![SpineEntry { name: "spine1".into(), user: "root".into(), password: "x".into(), mgmt_ip: "10.1.0.1".into() }],
            leafs: vec![LeafEntry { name: "leaf1".into(), user: "root".into(), password: "x".into(), mgmt_ip: "10.1.0.2".into() }],
            links: vec![LinkEntry { s_name: "spine1".into(), s_port: "et-99/0/0".into(), l_name: "leaf1".into(), l_port: "et-0/0/48".into() }],
        };

        let err = validate_topology(&catalog, &sample_description(), &topology).unwrap_err();
        assert!(matches!(err, FabricError::TopologyInvalid(_)));
    }

    #[test]
    fn validate_topology_rejects_duplicate_device_name() {
        let catalog = test_catalog();
        let topology = TopologyDoc {
            spines: vec![
                SpineEntry { name: "spine1".into(), user: "root".into(), password: "x".into(), mgmt_ip: "10.1.0.1".into() },
                SpineEntry { name: "spine1".into(), user: "root".into(), password: "x".into(), mgmt_ip: "10.1.0.3".into() },
            ],
            leafs: vec![],
            links: vec![],
        };

        let err = validate_topology(&catalog, &sample_description(), &topology).unwrap_err();
        assert!(matches!(err, FabricError::TopologyInvalid(_)));
    }

    #[test]
    fn validate_topology_rejects_unknown_device_family() {
        let catalog = test_catalog();
        let mut description = sample_description();
        description.spine_device_type = "not-a-family".into();

        let err = validate_topology(&catalog, &description, &minimal_topology_for_validation()).unwrap_err();
        assert!(matches!(err, FabricError::UnknownDeviceFamily(_)));
    }

    fn minimal_topology_for_validation() -> TopologyDoc {
        TopologyDoc {
            spines: vec![SpineEntry { name: "spine1".into(), user: "root".into(), password: "x".into(), mgmt_ip: "10.1.0.1".into() }],
            leafs: vec![LeafEntry { name: "leaf1".into(), user: "root".into(), password: "x".into(), mgmt_ip: "10.1.0.2".into() }],
            links: vec![],
        }
    }
}
