use serde::{Deserialize, Serialize};

use crate::fabric::cidr;

/// The caller-supplied attributes of a pod. Everything here is immutable for a
/// given generation — changing any field is a structural diff (see
/// `Pod::is_recreate_fabric`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodDescription {
    pub spine_device_type: String,
    pub leaf_device_type: String,
    pub inter_connect_prefix: String,
    pub vlan_prefix: String,
    pub loopback_prefix: String,
    #[serde(rename = "spineAS")]
    pub spine_as: u32,
    #[serde(rename = "leafAS")]
    pub leaf_as: u32,
    /// Path to a topology document, relative to the configured topology directory.
    pub topology: String,
}

impl PodDescription {
    /// Device-type strings non-empty, prefix fields parse as IPv4 CIDRs,
    /// AS numbers positive. Whether a device type is actually a recognized
    /// family is checked later against the catalog, surfacing as
    /// `FabricError::UnknownDeviceFamily` — this validation has no catalog
    /// to check against.
    pub fn validate(&self) -> Result<(), String> {
        if self.spine_device_type.trim().is_empty() {
            return Err("spineDeviceType must not be empty".into());
        }
        if self.leaf_device_type.trim().is_empty() {
            return Err("leafDeviceType must not be empty".into());
        }
        for (field, value) in [
            ("interConnectPrefix", &self.inter_connect_prefix),
            ("vlanPrefix", &self.vlan_prefix),
            ("loopbackPrefix", &self.loopback_prefix),
        ] {
            cidr::parse_cidr(value).map_err(|e| format!("{} is not a valid IPv4 CIDR: {}", field, e))?;
        }
        if self.spine_as == 0 {
            return Err("spineAS must be a positive integer".into());
        }
        if self.leaf_as == 0 {
            return Err("leafAS must be a positive integer".into());
        }
        Ok(())
    }
}

/// A named fabric instance, persisted with its derived address blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pod {
    pub id: i64,
    pub name: String,
    pub spine_device_type: String,
    pub leaf_device_type: String,
    pub inter_connect_prefix: String,
    pub vlan_prefix: String,
    pub loopback_prefix: String,
    pub spine_as: u32,
    pub leaf_as: u32,
    pub topology: String,
    pub allocated_loopback_block: Option<String>,
    pub allocated_irb_block: Option<String>,
}

impl Pod {
    pub fn description(&self) -> PodDescription {
        PodDescription {
            spine_device_type: self.spine_device_type.clone(),
            leaf_device_type: self.leaf_device_type.clone(),
            inter_connect_prefix: self.inter_connect_prefix.clone(),
            vlan_prefix: self.vlan_prefix.clone(),
            loopback_prefix: self.loopback_prefix.clone(),
            spine_as: self.spine_as,
            leaf_as: self.leaf_as,
            topology: self.topology.clone(),
        }
    }

    /// True if any field whose change would re-key allocated addresses or AS
    /// numbers differs between the persisted pod and a proposed new description.
    pub fn is_recreate_fabric(&self, new: &PodDescription) -> bool {
        self.spine_device_type != new.spine_device_type
            || self.leaf_device_type != new.leaf_device_type
            || self.inter_connect_prefix != new.inter_connect_prefix
            || self.vlan_prefix != new.vlan_prefix
            || self.loopback_prefix != new.loopback_prefix
            || self.spine_as != new.spine_as
            || self.leaf_as != new.leaf_as
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PodDescription {
        PodDescription {
            spine_device_type: "qfx10008".into(),
            leaf_device_type: "qfx5120".into(),
            inter_connect_prefix: "192.168.0.0/24".into(),
            vlan_prefix: "172.16.0.0/16".into(),
            loopback_prefix: "10.0.0.0/24".into(),
            spine_as: 65000,
            leaf_as: 65100,
            topology: "pod1-topology.json".into(),
        }
    }

    #[test]
    fn validate_rejects_empty_device_type() {
        let mut desc = sample();
        desc.spine_device_type = "".into();
        assert!(desc.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_cidr() {
        let mut desc = sample();
        desc.loopback_prefix = "not-a-cidr".into();
        assert!(desc.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_as() {
        let mut desc = sample();
        desc.leaf_as = 0;
        assert!(desc.validate().is_err());
    }

    #[test]
    fn validate_accepts_well_formed_description() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn is_recreate_fabric_true_on_as_change() {
        let pod = Pod {
            id: 1,
            name: "pod1".into(),
            spine_device_type: sample().spine_device_type,
            leaf_device_type: sample().leaf_device_type,
            inter_connect_prefix: sample().inter_connect_prefix,
            vlan_prefix: sample().vlan_prefix,
            loopback_prefix: sample().loopback_prefix,
            spine_as: 65000,
            leaf_as: 65100,
            topology: sample().topology,
            allocated_loopback_block: None,
            allocated_irb_block: None,
        };
        let mut bumped = sample();
        bumped.spine_as = 65001;
        assert!(pod.is_recreate_fabric(&bumped));
    }

    #[test]
    fn is_recreate_fabric_false_when_only_topology_differs() {
        let pod = Pod {
            id: 1,
            name: "pod1".into(),
            spine_device_type: sample().spine_device_type,
            leaf_device_type: sample().leaf_device_type,
            inter_connect_prefix: sample().inter_connect_prefix,
            vlan_prefix: sample().vlan_prefix,
            loopback_prefix: sample().loopback_prefix,
            spine_as: sample().spine_as,
            leaf_as: sample().leaf_as,
            topology: "pod1-topology.json".into(),
            allocated_loopback_block: None,
            allocated_irb_block: None,
        };
        let mut changed = sample();
        changed.topology = "pod1-topology-v2.json".into();
        assert!(!pod.is_recreate_fabric(&changed));
    }
}
