use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::{call_context, AppState};

#[derive(Debug, Deserialize)]
struct RebookRequest {
    new_flight_id: i64,
}

/// Expected negative outcomes (invalid flight, window violation, ownership
/// mismatch, user decline) come back as a 200 with the outcome message;
/// only infrastructure faults map to error statuses.
#[derive(Debug, Serialize)]
struct OutcomeResponse {
    outcome: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/tickets/{ticket_no}/rebook", post(rebook_ticket))
        .route("/v1/tickets/{ticket_no}/cancel", post(cancel_ticket))
}

async fn rebook_ticket(
    State(state): State<AppState>,
    Path(ticket_no): Path<String>,
    headers: HeaderMap,
    Json(req): Json<RebookRequest>,
) -> Result<Json<OutcomeResponse>, AppError> {
    let ctx = call_context(&headers);
    let outcome = state
        .bookings
        .rebook_ticket(&ctx, &ticket_no, req.new_flight_id)
        .await?;
    Ok(Json(OutcomeResponse {
        outcome: outcome.to_string(),
    }))
}

async fn cancel_ticket(
    State(state): State<AppState>,
    Path(ticket_no): Path<String>,
    headers: HeaderMap,
) -> Result<Json<OutcomeResponse>, AppError> {
    let ctx = call_context(&headers);
    let outcome = state.bookings.cancel_ticket(&ctx, &ticket_no).await?;
    Ok(Json(OutcomeResponse {
        outcome: outcome.to_string(),
    }))
}
