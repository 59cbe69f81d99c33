//! HTTP-based adapters: the metadata RPC client and the event dispatch client.

pub mod dispatch_client;
pub mod metadata_client;

pub use dispatch_client::{DispatchClient, DispatchOutcome};
pub use metadata_client::HttpMetadataClient;
