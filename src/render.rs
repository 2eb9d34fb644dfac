//! Per-device config rendering. The renderer itself is a pure function over
//! an already-assembled view — it never touches the store. Gathering that
//! view from persisted state is the caller's job (see `handlers::pods`).

use anyhow::{Context, Result};
use serde::Serialize;
use tera::Tera;

#[derive(Debug, Clone, Serialize)]
pub struct PeeredPort {
    pub port_name: String,
    pub unit_name: String,
    pub ip_address: String,
    pub peer_device: String,
    pub peer_port: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceRenderContext {
    pub pod_name: String,
    pub device_name: String,
    pub family: String,
    pub mgmt_ip: String,
    pub role: String,
    pub asn: u32,
    pub loopback_ip: String,
    pub irb_ip: Option<String>,
    pub peered_ports: Vec<PeeredPort>,
    pub allocated_loopback_block: String,
    pub allocated_irb_block: Option<String>,
}

pub fn load_templates(dir: &str) -> Result<Tera> {
    let pattern = format!("{}/**/*.tera", dir);
    Tera::new(&pattern).with_context(|| format!("loading templates from {}", dir))
}

pub fn render_device_config(tera: &Tera, ctx: &DeviceRenderContext) -> Result<String> {
    let template_name = if ctx.role == "spine" { "spine.conf.tera" } else { "leaf.conf.tera" };
    let tera_ctx = tera::Context::from_serialize(ctx).context("building template context")?;
    tera.render(template_name, &tera_ctx)
        .with_context(|| format!("rendering {} using {}", ctx.device_name, template_name))
}
