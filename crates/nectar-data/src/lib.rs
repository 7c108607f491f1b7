//! Config file loading for the Nectar simulation.
//!
//! A config is a [`SimConfig`](nectar_core::config::SimConfig) written in RON,
//! TOML or JSON. Every section and field is optional; anything a file omits
//! keeps its default. Loaded configs are validated before they are returned.

pub mod loader;

pub use loader::{
    DataLoadError, Format, config_to_string, load_config, load_config_dir, load_config_str,
    parse_config, save_config,
};
