use crate::error::AppResult;
use crate::sta::models::{Collection, Datastream, EntityId, RawObservation, Thing};
use crate::sta::query::ObservationQuery;

/// One page of an observations listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    /// First page for a datastream, built from query options
    First {
        datastream: EntityId,
        query: ObservationQuery,
    },
    /// Follow-up page, an `@iot.nextLink` URL as returned by the server
    Next(String),
}

/// The read operations the dashboard needs from a SensorThings server.
///
/// Every call is a single request; pagination is driven by the caller.
/// Implementations return `AppError::SourceUnavailable` for transport or
/// HTTP failures and `AppError::MalformedResponse` for bodies that are not a
/// well-formed collection.
#[allow(async_fn_in_trait)]
pub trait SensorSource {
    /// All things with their locations expanded.
    async fn things(&self) -> AppResult<Collection<Thing>>;

    /// Datastreams of one thing.
    async fn datastreams(&self, thing: &EntityId) -> AppResult<Collection<Datastream>>;

    /// One page of observations.
    async fn observations(&self, page: &PageRequest) -> AppResult<Collection<RawObservation>>;

    /// URL identifying a page; a `Next` page is its link verbatim.
    fn page_url(&self, page: &PageRequest) -> String;
}
