//! Basic library shared by the outage crates
//!
//! Provides:
//! - logging bootstrap
//! - layered configuration loading

pub mod config_loader;
pub mod logging;

pub use config_loader::load_config;
pub use logging::{init_with_config as init_logging, LogConfig};
