//! Infrastructure layer: adapters for the outside world.
//!
//! - `http` — the metadata RPC client and the event dispatch client
//! - `config` — the `ConfigLoader` (figment-based, see `SPEC_FULL.md` §4.8)
//! - `logging` — `tracing-subscriber` installation

pub mod config;
pub mod http;
pub mod logging;
