use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Uplink,
    Downlink,
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uplink" => Ok(Direction::Uplink),
            "downlink" => Ok(Direction::Downlink),
            other => Err(format!("unknown direction: {}", other)),
        }
    }
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Uplink => "uplink",
            Direction::Downlink => "downlink",
        }
    }
}

/// A physical port on a device. Peering is symmetric — maintained as a pair
/// of mirrored self-referential rows rather than an undirected edge table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalInterface {
    pub id: i64,
    pub device_id: i64,
    pub name: String,
    pub direction: Direction,
    pub peer_id: Option<i64>,
}

/// A logical subinterface (unit), either layered above a PhysicalInterface
/// (`<port>.0`) or standing alone (`lo0.0`, `irb.1`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogicalInterface {
    pub id: i64,
    pub device_id: i64,
    pub name: String,
    pub layer_above_id: Option<i64>,
    pub ip_address: String,
}
