//! Configuration and dependency wiring.

mod app_config;
mod dependencies;

pub use app_config::AppConfig;
pub use dependencies::{build_client, load_index_settings, Dependencies};
