//! Configuration loading: compiled-in defaults, an optional TOML file,
//! and `SCHED_`-prefixed environment variable overrides, via `figment`.

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
