use std::sync::Arc;

use axum::http::HeaderMap;
use tern_core::booking::BookingWorkflow;
use tern_core::identity::CallContext;
use tern_core::query::QueryService;

pub const PASSENGER_HEADER: &str = "x-passenger-id";

#[derive(Clone)]
pub struct AppState {
    pub queries: Arc<QueryService>,
    pub bookings: Arc<BookingWorkflow>,
}

/// The transport carries the already-resolved passenger identity in a
/// header; issuing that identity is out of scope here.
pub fn call_context(headers: &HeaderMap) -> CallContext {
    CallContext {
        passenger_id: headers
            .get(PASSENGER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    }
}
