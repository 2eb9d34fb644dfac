use std::path::Path as StdPath;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::domain::{Pod, PodDescription, Role};
use crate::fabric::FabricBuilder;
use crate::loaders;
use crate::render::{DeviceRenderContext, PeeredPort};
use crate::AppState;

use super::ApiError;

#[derive(Debug, Deserialize)]
pub struct ProcessFabricRequest {
    #[serde(flatten)]
    pub description: PodDescription,
    #[serde(default)]
    pub recreate: bool,
}

/// `POST /api/pods/:name` — invokes `processFabric`.
pub async fn process_fabric(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(req): Json<ProcessFabricRequest>,
) -> Result<(StatusCode, Json<Pod>), ApiError> {
    let topology_path = StdPath::new(&state.config.topology_dir).join(&req.description.topology);
    let topology_path = topology_path.to_string_lossy().to_string();
    let topology = loaders::load_topology(&topology_path)?;

    let builder = FabricBuilder::new(&state.store, &state.catalog);
    let pod = builder
        .process_fabric(&name, &req.description, &topology, req.recreate)
        .await?;

    for device in state.store.list_devices_by_pod_ordered(pod.id).await? {
        let ctx = gather_render_context(&state, &pod, &device).await?;
        let rendered = crate::render::render_device_config(&state.templates, &ctx)?;
        loaders::write_device_config(&state.config.output_dir, &pod.name, &device.name, &rendered)?;
    }

    let devices = state.store.list_devices_by_pod_ordered(pod.id).await?;
    let device_names: Vec<(String, String)> = devices.iter().map(|d| (d.name.clone(), d.role.to_string())).collect();
    let mut links = Vec::new();
    for device in devices.iter().filter(|d| d.role == Role::Spine) {
        for ifd in state.store.list_peered_physical_interfaces_by_device_ordered(device.id).await? {
            if let Some(peer_id) = ifd.peer_id {
                if let Some(peer) = state.store.get_physical_interface(peer_id).await? {
                    if let Some(peer_device) = devices.iter().find(|d| d.id == peer.device_id) {
                        links.push((device.name.clone(), peer_device.name.clone()));
                    }
                }
            }
        }
    }
    loaders::write_dot_file(&state.config.output_dir, &pod.name, &device_names, &links)?;

    Ok((StatusCode::CREATED, Json(pod)))
}

/// `GET /api/pods/:name`
pub async fn get_pod(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Pod>, ApiError> {
    let pod = state
        .store
        .get_pod_by_name(&name)
        .await?
        .ok_or_else(|| ApiError::not_found("pod"))?;
    Ok(Json(pod))
}

/// `DELETE /api/pods/:name` — cascade delete.
pub async fn delete_pod(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    let pod = state
        .store
        .get_pod_by_name(&name)
        .await?
        .ok_or_else(|| ApiError::not_found("pod"))?;
    state.store.delete_pod(pod.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/pods/:name/devices`
pub async fn list_devices(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<crate::domain::Device>>, ApiError> {
    let pod = state
        .store
        .get_pod_by_name(&name)
        .await?
        .ok_or_else(|| ApiError::not_found("pod"))?;
    let devices = state.store.list_devices_by_pod_ordered(pod.id).await?;
    Ok(Json(devices))
}

/// `GET /api/pods/:name/devices/:device/config` — renders on demand, same
/// path `process_fabric` uses to write its output files.
pub async fn get_device_config(
    State(state): State<Arc<AppState>>,
    Path((name, device_name)): Path<(String, String)>,
) -> Result<String, ApiError> {
    let pod = state
        .store
        .get_pod_by_name(&name)
        .await?
        .ok_or_else(|| ApiError::not_found("pod"))?;
    let devices = state.store.list_devices_by_pod_ordered(pod.id).await?;
    let device = devices
        .into_iter()
        .find(|d| d.name == device_name)
        .ok_or_else(|| ApiError::not_found("device"))?;

    let ctx = gather_render_context(&state, &pod, &device).await?;
    let rendered = crate::render::render_device_config(&state.templates, &ctx)?;
    Ok(rendered)
}

/// Assembles the pure render view from persisted state — the one place
/// store access and the renderer meet.
async fn gather_render_context(
    state: &Arc<AppState>,
    pod: &Pod,
    device: &crate::domain::Device,
) -> Result<DeviceRenderContext, ApiError> {
    let ifls = state.store.list_logical_interfaces_by_device(device.id).await?;
    let loopback_ip = ifls
        .iter()
        .find(|i| i.name == "lo0.0")
        .map(|i| i.ip_address.clone())
        .ok_or_else(|| ApiError::internal(format!("device {} missing loopback", device.name)))?;
    let irb_ip = ifls.iter().find(|i| i.name == "irb.1").map(|i| i.ip_address.clone());

    let peered_ifds = state.store.list_peered_physical_interfaces_by_device_ordered(device.id).await?;
    let mut peered_ports = Vec::new();
    for ifd in peered_ifds {
        let unit_name = format!("{}.0", ifd.name);
        let unit = ifls.iter().find(|i| i.name == unit_name);
        let (Some(unit), Some(peer_id)) = (unit, ifd.peer_id) else {
            continue;
        };
        if let Some(peer_ifd) = state.store.get_physical_interface(peer_id).await? {
            let peer_device_name = state
                .store
                .list_devices_by_pod_ordered(pod.id)
                .await?
                .into_iter()
                .find(|d| d.id == peer_ifd.device_id)
                .map(|d| d.name)
                .unwrap_or_default();
            peered_ports.push(PeeredPort {
                port_name: ifd.name.clone(),
                unit_name,
                ip_address: unit.ip_address.clone(),
                peer_device: peer_device_name,
                peer_port: peer_ifd.name,
            });
        }
    }

    Ok(DeviceRenderContext {
        pod_name: pod.name.clone(),
        device_name: device.name.clone(),
        family: device.family.clone(),
        mgmt_ip: device.mgmt_ip.clone(),
        role: device.role.to_string(),
        asn: device.asn.unwrap_or_default(),
        loopback_ip,
        irb_ip,
        peered_ports,
        allocated_loopback_block: pod.allocated_loopback_block.clone().unwrap_or_default(),
        allocated_irb_block: pod.allocated_irb_block.clone(),
    })
}
