//! Domain ports (interfaces) for the scheduler.

pub mod metadata_client;

pub use metadata_client::MetadataClient;
