use async_trait::async_trait;

use crate::model::{Flight, FlightFilter, ItineraryRow, TicketFlight};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
    #[error("malformed stored timestamp '{value}' for flight {flight_id}")]
    MalformedTimestamp { flight_id: i64, value: String },
}

/// Result of the transactional rebind (rebook phase 2). The store re-checks
/// the minimal invariants inside the same transaction as the update, so a
/// concurrent change during the confirmation wait surfaces here instead of
/// becoming a lost update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebindStatus {
    Applied,
    FlightGone,
    BindingGone,
    OwnershipMismatch,
}

/// Result of the transactional release (cancel phase 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseStatus {
    Released,
    BindingGone,
    OwnershipMismatch,
}

/// Repository trait for travel data access.
#[async_trait]
pub trait TravelStore: Send + Sync {
    async fn find_flight(&self, flight_id: i64) -> Result<Option<Flight>, StoreError>;

    async fn current_binding(&self, ticket_no: &str) -> Result<Option<TicketFlight>, StoreError>;

    async fn is_ticket_owner(
        &self,
        ticket_no: &str,
        passenger_id: &str,
    ) -> Result<bool, StoreError>;

    async fn itinerary(&self, passenger_id: &str) -> Result<Vec<ItineraryRow>, StoreError>;

    async fn search_flights(&self, filter: &FlightFilter) -> Result<Vec<Flight>, StoreError>;

    /// Point the ticket's binding at `new_flight_id` in one transaction,
    /// re-validating flight existence, binding presence, and ownership first.
    async fn rebind_ticket(
        &self,
        ticket_no: &str,
        passenger_id: &str,
        new_flight_id: i64,
    ) -> Result<RebindStatus, StoreError>;

    /// Delete the ticket's binding in one transaction, re-validating binding
    /// presence and ownership first. The ticket row and its boarding passes
    /// are left as historical record.
    async fn release_ticket(
        &self,
        ticket_no: &str,
        passenger_id: &str,
    ) -> Result<ReleaseStatus, StoreError>;
}
