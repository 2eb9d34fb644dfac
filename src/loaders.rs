//! External-input loaders and output sinks: YAML pod definitions, JSON
//! topology documents, per-device config file output, and Graphviz DOT
//! export. Kept as pure, store-free functions — the same separation the
//! source algorithm drew between `TopologyLoader`/`FileOutputHandler`/
//! `dotHandler` and the mediation layer that invokes them.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::PodDescription;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpineEntry {
    pub name: String,
    pub user: String,
    pub password: String,
    pub mgmt_ip: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LeafEntry {
    pub name: String,
    pub user: String,
    pub password: String,
    pub mgmt_ip: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinkEntry {
    pub s_name: String,
    pub s_port: String,
    pub l_name: String,
    pub l_port: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TopologyDoc {
    #[serde(default)]
    pub spines: Vec<SpineEntry>,
    #[serde(default)]
    pub leafs: Vec<LeafEntry>,
    #[serde(default)]
    pub links: Vec<LinkEntry>,
}

pub fn load_topology(path: &str) -> Result<TopologyDoc> {
    let data = std::fs::read_to_string(path).with_context(|| format!("reading topology document {}", path))?;
    serde_json::from_str(&data).with_context(|| format!("parsing topology document {}", path))
}

#[derive(Debug, Deserialize)]
struct PodsFile {
    pods: HashMap<String, PodDescription>,
}

pub fn load_pod_descriptions(path: &str) -> Result<HashMap<String, PodDescription>> {
    let data = std::fs::read_to_string(path).with_context(|| format!("reading pod definitions {}", path))?;
    let parsed: PodsFile =
        serde_yaml::from_str(&data).with_context(|| format!("parsing pod definitions {}", path))?;
    Ok(parsed.pods)
}

/// Writes `<outputDir>/<podName>/<deviceName>.conf`.
pub fn write_device_config(output_dir: &str, pod_name: &str, device_name: &str, contents: &str) -> Result<()> {
    let dir = Path::new(output_dir).join(pod_name);
    std::fs::create_dir_all(&dir).with_context(|| format!("creating output directory {}", dir.display()))?;
    let file_path = dir.join(format!("{}.conf", device_name));
    std::fs::write(&file_path, contents).with_context(|| format!("writing {}", file_path.display()))
}

/// Emits `<outputDir>/<podName>/<podName>.dot`, the fabric's spine/leaf graph
/// with peered links — supplements the spec's distillation with the
/// visualization sink the source system shipped alongside text config.
pub fn write_dot_file(
    output_dir: &str,
    pod_name: &str,
    devices: &[(String, String)],
    links: &[(String, String)],
) -> Result<()> {
    let dir = Path::new(output_dir).join(pod_name);
    std::fs::create_dir_all(&dir)?;

    let mut dot = String::from("graph fabric {\n");
    for (name, role) in devices {
        let shape = if role == "spine" { "box" } else { "ellipse" };
        dot.push_str(&format!("    \"{}\" [shape={}];\n", name, shape));
    }
    for (a, b) in links {
        dot.push_str(&format!("    \"{}\" -- \"{}\";\n", a, b));
    }
    dot.push_str("}\n");

    std::fs::write(dir.join(format!("{}.dot", pod_name)), dot)
        .with_context(|| format!("writing dot file for pod {}", pod_name))
}
