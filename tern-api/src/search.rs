use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tern_core::model::{Flight, FlightFilter};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/flights/search", get(search_flights))
}

async fn search_flights(
    State(state): State<AppState>,
    Query(filter): Query<FlightFilter>,
) -> Result<Json<Vec<Flight>>, AppError> {
    let flights = state.queries.search_flights(&filter).await?;
    Ok(Json(flights))
}
