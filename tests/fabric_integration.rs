use fabricgen::catalog::DeviceFamilyCatalog;
use fabricgen::db::Store;
use fabricgen::domain::Role;
use fabricgen::fabric::{FabricBuilder, FabricError};
use fabricgen::loaders;

fn catalog() -> DeviceFamilyCatalog {
    DeviceFamilyCatalog::load("config/device_families.json").expect("device family catalog fixture")
}

async fn memory_store() -> Store {
    Store::with_pool_size(":memory:", 1).await.expect("in-memory store")
}

#[tokio::test]
async fn minimal_fabric_boundary_scenario() {
    let store = memory_store().await;
    let catalog = catalog();
    let builder = FabricBuilder::new(&store, &catalog);

    let pods = loaders::load_pod_descriptions("fixtures/pods.yaml").unwrap();
    let description = pods.get("pod1").unwrap();
    let topology = loaders::load_topology("fixtures/pod1-topology.json").unwrap();

    let pod = builder.process_fabric("pod1", description, &topology, false).await.unwrap();

    assert_eq!(pod.allocated_loopback_block.as_deref(), Some("10.0.0.0/29"));
    assert_eq!(pod.allocated_irb_block.as_deref(), Some("172.16.0.0/23"));

    let devices = store.list_devices_by_pod_ordered(pod.id).await.unwrap();
    assert_eq!(devices.len(), 4);

    let spine_asns: Vec<u32> = devices.iter().filter(|d| d.role == Role::Spine).filter_map(|d| d.asn).collect();
    assert_eq!(spine_asns, vec![65000, 65001]);

    let leaf_asns: Vec<u32> = devices.iter().filter(|d| d.role == Role::Leaf).filter_map(|d| d.asn).collect();
    assert_eq!(leaf_asns, vec![65100, 65101]);

    let mut loopbacks = Vec::new();
    for device in &devices {
        let ifls = store.list_logical_interfaces_by_device(device.id).await.unwrap();
        loopbacks.push(ifls.iter().find(|i| i.name == "lo0.0").unwrap().ip_address.clone());
    }
    loopbacks.sort();
    assert_eq!(loopbacks, vec!["10.0.0.1/32", "10.0.0.2/32", "10.0.0.3/32", "10.0.0.4/32"]);
}

#[tokio::test]
async fn recreate_on_as_change_replaces_stale_interfaces() {
    let store = memory_store().await;
    let catalog = catalog();
    let builder = FabricBuilder::new(&store, &catalog);

    let pods = loaders::load_pod_descriptions("fixtures/pods.yaml").unwrap();
    let mut description = pods.get("pod1").unwrap().clone();
    let topology = loaders::load_topology("fixtures/pod1-topology.json").unwrap();

    let pod = builder.process_fabric("pod1", &description, &topology, false).await.unwrap();
    let original_devices = store.list_devices_by_pod_ordered(pod.id).await.unwrap();

    description.spine_as = 65050;
    let pod = builder.process_fabric("pod1", &description, &topology, true).await.unwrap();
    let new_devices = store.list_devices_by_pod_ordered(pod.id).await.unwrap();

    // Recreate cascades: new device rows, none of the old ids survive.
    let original_ids: Vec<i64> = original_devices.iter().map(|d| d.id).collect();
    assert!(new_devices.iter().all(|d| !original_ids.contains(&d.id)));

    let spine_asns: Vec<u32> = new_devices.iter().filter(|d| d.role == Role::Spine).filter_map(|d| d.asn).collect();
    assert_eq!(spine_asns, vec![65050, 65051]);
}

#[tokio::test]
async fn mutate_in_place_preserves_ids_for_non_structural_change() {
    let store = memory_store().await;
    let catalog = catalog();
    let builder = FabricBuilder::new(&store, &catalog);

    let pods = loaders::load_pod_descriptions("fixtures/pods.yaml").unwrap();
    let mut description = pods.get("pod1").unwrap().clone();
    let topology = loaders::load_topology("fixtures/pod1-topology.json").unwrap();

    let pod = builder.process_fabric("pod1", &description, &topology, false).await.unwrap();
    let before = store.list_devices_by_pod_ordered(pod.id).await.unwrap();

    description.topology = "pod1-topology-v2.json".into();
    let pod = builder.process_fabric("pod1", &description, &topology, false).await.unwrap();
    let after = store.list_devices_by_pod_ordered(pod.id).await.unwrap();

    assert_eq!(
        before.iter().map(|d| d.id).collect::<Vec<_>>(),
        after.iter().map(|d| d.id).collect::<Vec<_>>()
    );
    assert_eq!(pod.topology, "pod1-topology-v2.json");
}

#[tokio::test]
async fn missing_peer_port_is_topology_invalid_with_no_partial_pod() {
    let store = memory_store().await;
    let catalog = catalog();
    let builder = FabricBuilder::new(&store, &catalog);

    let pods = loaders::load_pod_descriptions("fixtures/pods.yaml").unwrap();
    let description = pods.get("pod1").unwrap().clone();

    let mut topology = loaders::load_topology("fixtures/pod1-topology.json").unwrap();
    topology.links[0].s_port = "et-9/9/9".into();

    let err = builder
        .process_fabric("pod1", &description, &topology, false)
        .await
        .unwrap_err();
    assert!(matches!(err, FabricError::TopologyInvalid(_)));
    assert!(store.get_pod_by_name("pod1").await.unwrap().is_none());
}

#[tokio::test]
async fn ordering_determinism_across_two_device_orders() {
    let store_a = memory_store().await;
    let store_b = memory_store().await;
    let catalog = catalog();

    let pods = loaders::load_pod_descriptions("fixtures/pods.yaml").unwrap();
    let description = pods.get("pod1").unwrap().clone();

    let topo_a = loaders::load_topology("fixtures/pod1-topology.json").unwrap();
    let mut topo_b = topo_a.clone();
    topo_b.leafs.reverse();

    let builder_a = FabricBuilder::new(&store_a, &catalog);
    let pod_a = builder_a.process_fabric("pod1", &description, &topo_a, false).await.unwrap();

    let builder_b = FabricBuilder::new(&store_b, &catalog);
    let pod_b = builder_b.process_fabric("pod1", &description, &topo_b, false).await.unwrap();

    let devices_a = store_a.list_devices_by_pod_ordered(pod_a.id).await.unwrap();
    let devices_b = store_b.list_devices_by_pod_ordered(pod_b.id).await.unwrap();

    let leaf1_a = devices_a.iter().find(|d| d.name == "leaf1").unwrap();
    let leaf1_b = devices_b.iter().find(|d| d.name == "leaf1").unwrap();

    // leaf1 is first in topo_a's leaf list but second in topo_b's reversed
    // list — assignment must follow supplied order, not a sorted one.
    assert_eq!(leaf1_a.asn, Some(65100));
    assert_eq!(leaf1_b.asn, Some(65101));
}
