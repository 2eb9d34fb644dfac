//! Device-family port catalog: a small config map loaded once at startup and
//! passed into the fabric builder, rather than read as a process-wide global.
//! Precedent: the hardcoded family/port tables in the teacher's CLOS lab
//! generator, externalized here into a loadable JSON document.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyPorts {
    #[serde(default)]
    pub ports: Vec<String>,
    #[serde(default)]
    pub uplink_ports: Vec<String>,
    #[serde(default)]
    pub downlink_ports: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceFamilyCatalog {
    families: HashMap<String, FamilyPorts>,
}

impl DeviceFamilyCatalog {
    pub fn load(path: &str) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading device family catalog {}", path))?;
        let families: HashMap<String, FamilyPorts> = serde_json::from_str(&data)
            .with_context(|| format!("parsing device family catalog {}", path))?;
        Ok(Self { families })
    }

    pub fn get(&self, family: &str) -> Option<&FamilyPorts> {
        self.families.get(family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_family_map() {
        let json = r#"{
            "qfx10008": {"ports": ["et-0/0/0", "et-0/0/1"]},
            "qfx5120": {"uplinkPorts": ["et-0/0/48"], "downlinkPorts": ["xe-0/0/0"]}
        }"#;
        let families: HashMap<String, FamilyPorts> = serde_json::from_str(json).unwrap();
        let catalog = DeviceFamilyCatalog { families };
        assert_eq!(catalog.get("qfx10008").unwrap().ports.len(), 2);
        assert_eq!(catalog.get("qfx5120").unwrap().uplink_ports, vec!["et-0/0/48"]);
        assert!(catalog.get("unknown").is_none());
    }
}
