// src/config/mod.rs

//! TOML configuration describing what to watch and how to read events.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_from_str};
pub use model::{ConfigFile, RawConfigFile};
