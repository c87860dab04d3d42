use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use tracing::{info, warn};

use crate::gateway::ConfirmationGateway;
use crate::identity::{CallContext, IdentityResolver};
use crate::store::{RebindStatus, ReleaseStatus, TravelStore};
use crate::CoreResult;

/// Reference timezone for the rebooking window (UTC+3).
const BOOKING_TZ_SECONDS: i32 = 3 * 3600;

const MIN_LEAD_HOURS: i64 = 3;

const REBOOK_PROMPT: &str = "Are you sure you want to update your ticket to this new flight?";
const CANCEL_PROMPT: &str = "Are you sure you want to cancel this ticket?";

/// Terminal outcome of a rebooking attempt. Negative outcomes are expected
/// results, not faults; none of them leaves a mutation behind.
#[derive(Debug, Clone, PartialEq)]
pub enum RebookOutcome {
    Updated,
    InvalidFlight,
    DepartureTooSoon { departure: DateTime<FixedOffset> },
    TicketNotFound,
    NotOwner { passenger_id: String, ticket_no: String },
    Declined,
}

impl fmt::Display for RebookOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebookOutcome::Updated => write!(f, "Ticket successfully updated to new flight."),
            RebookOutcome::InvalidFlight => write!(f, "Invalid new flight ID provided."),
            RebookOutcome::DepartureTooSoon { departure } => write!(
                f,
                "Not permitted to reschedule to a flight that is less than 3 hours from the current time. Selected flight is at {}.",
                departure
            ),
            RebookOutcome::TicketNotFound => {
                write!(f, "No existing ticket found for the given ticket number.")
            }
            RebookOutcome::NotOwner {
                passenger_id,
                ticket_no,
            } => write!(
                f,
                "Current signed-in passenger with ID {} not the owner of ticket {}",
                passenger_id, ticket_no
            ),
            RebookOutcome::Declined => write!(f, "Ticket update cancelled by user."),
        }
    }
}

/// Terminal outcome of a cancellation attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CancelOutcome {
    Cancelled,
    TicketNotFound,
    NotOwner { passenger_id: String, ticket_no: String },
    Declined,
}

impl fmt::Display for CancelOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelOutcome::Cancelled => write!(f, "Ticket successfully cancelled."),
            CancelOutcome::TicketNotFound => {
                write!(f, "No existing ticket found for the given ticket number.")
            }
            CancelOutcome::NotOwner {
                passenger_id,
                ticket_no,
            } => write!(
                f,
                "Current signed-in passenger with ID {} not the owner of ticket {}",
                passenger_id, ticket_no
            ),
            CancelOutcome::Declined => write!(f, "Ticket cancellation declined by user."),
        }
    }
}

pub fn booking_zone() -> FixedOffset {
    // Offset is a compile-time constant well inside the valid range.
    FixedOffset::east_opt(BOOKING_TZ_SECONDS).unwrap()
}

/// A lead time of exactly three hours is still permitted; only strictly
/// shorter leads are rejected.
fn departure_too_soon(departure: DateTime<FixedOffset>, now: DateTime<FixedOffset>) -> bool {
    departure.signed_duration_since(now) < Duration::hours(MIN_LEAD_HOURS)
}

/// The rebooking/cancellation workflow. Each call is a fresh evaluation of a
/// linear gate pipeline; the only suspension point is the confirmation
/// request, and no store transaction spans that wait. The final store call
/// re-validates the minimal invariants inside the mutating transaction.
pub struct BookingWorkflow {
    store: Arc<dyn TravelStore>,
    gateway: Arc<dyn ConfirmationGateway>,
    identity: IdentityResolver,
}

impl BookingWorkflow {
    pub fn new(
        store: Arc<dyn TravelStore>,
        gateway: Arc<dyn ConfirmationGateway>,
        identity: IdentityResolver,
    ) -> Self {
        Self {
            store,
            gateway,
            identity,
        }
    }

    /// Move the ticket's flight binding to `new_flight_id`.
    ///
    /// Gate order: flight existence and the lead-time window fail fast on
    /// globally invalid input; ownership is checked before the gateway is
    /// asked, so confirmation is never requested for an unauthorized call;
    /// confirmation comes last, immediately before the mutating transaction.
    pub async fn rebook_ticket(
        &self,
        ctx: &CallContext,
        ticket_no: &str,
        new_flight_id: i64,
    ) -> CoreResult<RebookOutcome> {
        let passenger_id = self.identity.resolve(ctx)?;

        let Some(flight) = self.store.find_flight(new_flight_id).await? else {
            return Ok(RebookOutcome::InvalidFlight);
        };

        let now = Utc::now().with_timezone(&booking_zone());
        if departure_too_soon(flight.scheduled_departure, now) {
            return Ok(RebookOutcome::DepartureTooSoon {
                departure: flight.scheduled_departure,
            });
        }

        if self.store.current_binding(ticket_no).await?.is_none() {
            return Ok(RebookOutcome::TicketNotFound);
        }

        if !self.store.is_ticket_owner(ticket_no, &passenger_id).await? {
            return Ok(RebookOutcome::NotOwner {
                passenger_id,
                ticket_no: ticket_no.to_string(),
            });
        }

        if !self.confirm(REBOOK_PROMPT).await {
            return Ok(RebookOutcome::Declined);
        }

        let status = self
            .store
            .rebind_ticket(ticket_no, &passenger_id, new_flight_id)
            .await?;
        Ok(match status {
            RebindStatus::Applied => {
                info!(ticket_no, new_flight_id, "ticket rebooked");
                RebookOutcome::Updated
            }
            RebindStatus::FlightGone => RebookOutcome::InvalidFlight,
            RebindStatus::BindingGone => RebookOutcome::TicketNotFound,
            RebindStatus::OwnershipMismatch => RebookOutcome::NotOwner {
                passenger_id,
                ticket_no: ticket_no.to_string(),
            },
        })
    }

    /// Remove the ticket's flight binding. The ticket row and boarding
    /// passes remain as historical record.
    pub async fn cancel_ticket(
        &self,
        ctx: &CallContext,
        ticket_no: &str,
    ) -> CoreResult<CancelOutcome> {
        let passenger_id = self.identity.resolve(ctx)?;

        if self.store.current_binding(ticket_no).await?.is_none() {
            return Ok(CancelOutcome::TicketNotFound);
        }

        if !self.store.is_ticket_owner(ticket_no, &passenger_id).await? {
            return Ok(CancelOutcome::NotOwner {
                passenger_id,
                ticket_no: ticket_no.to_string(),
            });
        }

        if !self.confirm(CANCEL_PROMPT).await {
            return Ok(CancelOutcome::Declined);
        }

        let status = self.store.release_ticket(ticket_no, &passenger_id).await?;
        Ok(match status {
            ReleaseStatus::Released => {
                info!(ticket_no, "ticket cancelled");
                CancelOutcome::Cancelled
            }
            ReleaseStatus::BindingGone => CancelOutcome::TicketNotFound,
            ReleaseStatus::OwnershipMismatch => CancelOutcome::NotOwner {
                passenger_id,
                ticket_no: ticket_no.to_string(),
            },
        })
    }

    /// A gateway failure or timeout counts as a decline, never as consent.
    async fn confirm(&self, prompt: &str) -> bool {
        match self.gateway.ask_yes_no(prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("confirmation gateway failed, treating as decline: {}", e);
                false
            }
        }
    }
}
