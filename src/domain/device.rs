use serde::{Deserialize, Serialize};

/// A device's tier in the fabric. Spines have no uplink tier above them in
/// this system's view; leaves face both spines and access-side ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Spine,
    Leaf,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Spine => "spine",
            Role::Leaf => "leaf",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spine" => Ok(Role::Spine),
            "leaf" => Ok(Role::Leaf),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A switch, owned by exactly one Pod. Destroyed with its pod.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: i64,
    pub pod_id: i64,
    pub name: String,
    pub family: String,
    pub mgmt_ip: String,
    pub ssh_user: String,
    pub ssh_password: String,
    pub role: Role,
    pub asn: Option<u32>,
}
