//! Application services for the scheduler: the registry, dispatch queue,
//! event executor, tick engine, and the two startup-time sync passes
//! (metadata bridge, config ingest).

pub mod config_ingest;
pub mod executor;
pub mod metadata_bridge;
pub mod queue;
pub mod registry;
pub mod scheduler;
pub mod tick_engine;

pub use executor::EventExecutor;
pub use queue::DispatchQueue;
pub use registry::ScheduleRegistry;
pub use scheduler::Scheduler;
pub use tick_engine::TickEngine;
