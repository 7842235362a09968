//! SensorThings API (FROST server) access.

pub mod client;
pub mod memory;
pub mod models;
pub mod query;
pub mod source;

pub use client::StaClient;
pub use memory::MemorySource;
pub use models::{Collection, Datastream, EntityId, RawObservation, Thing};
pub use query::{ObservationQuery, SortOrder};
pub use source::{PageRequest, SensorSource};
