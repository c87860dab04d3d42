use std::sync::Arc;

use crate::identity::{CallContext, IdentityResolver};
use crate::model::{Flight, FlightFilter, ItineraryRow};
use crate::store::TravelStore;
use crate::CoreResult;

/// Read-only lookups: a passenger's itinerary and flight search.
pub struct QueryService {
    store: Arc<dyn TravelStore>,
    identity: IdentityResolver,
}

impl QueryService {
    pub fn new(store: Arc<dyn TravelStore>, identity: IdentityResolver) -> Self {
        Self { store, identity }
    }

    /// All tickets for the calling passenger with flight details and seat
    /// assignments, one row per (ticket, flight, seat, fare).
    pub async fn fetch_itinerary(&self, ctx: &CallContext) -> CoreResult<Vec<ItineraryRow>> {
        let passenger_id = self.identity.resolve(ctx)?;
        let rows = self.store.itinerary(&passenger_id).await?;
        Ok(rows)
    }

    /// Flights matching the AND-combined filter, capped at `filter.limit`.
    pub async fn search_flights(&self, filter: &FlightFilter) -> CoreResult<Vec<Flight>> {
        let flights = self.store.search_flights(filter).await?;
        Ok(flights)
    }
}
