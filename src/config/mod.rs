use std::env;

/// Config holds all application configuration, loaded once at startup and
/// threaded through explicitly rather than read from a process-wide global.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub db_max_connections: u32,
    pub listen_addr: String,
    pub output_dir: String,
    pub templates_dir: String,
    pub device_family_catalog: String,
    pub topology_dir: String,
}

impl Config {
    /// Load configuration from environment variables with defaults.
    pub fn load() -> Self {
        Self {
            db_path: get_env("DB_PATH", "fabric.db"),
            db_max_connections: get_env("DB_MAX_CONNECTIONS", "5")
                .parse()
                .unwrap_or(5),
            listen_addr: get_env("LISTEN_ADDR", "0.0.0.0:8080"),
            output_dir: get_env("OUTPUT_DIR", "out"),
            templates_dir: get_env("TEMPLATES_DIR", "templates"),
            device_family_catalog: get_env("DEVICE_FAMILY_CATALOG", "config/device_families.json"),
            topology_dir: get_env("TOPOLOGY_DIR", "topologies"),
        }
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
