pub mod catalog;
pub mod config;
pub mod db;
pub mod domain;
pub mod fabric;
pub mod handlers;
pub mod loaders;
pub mod render;
pub mod router;

use catalog::DeviceFamilyCatalog;
use config::Config;
use db::Store;

/// Application state shared across handlers.
pub struct AppState {
    pub store: Store,
    pub config: Config,
    pub catalog: DeviceFamilyCatalog,
    pub templates: tera::Tera,
}
