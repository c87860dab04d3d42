use axum::{
    extract::State,
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use tern_core::model::ItineraryRow;

use crate::error::AppError;
use crate::state::{call_context, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/itinerary", get(fetch_itinerary))
}

async fn fetch_itinerary(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ItineraryRow>>, AppError> {
    let ctx = call_context(&headers);
    let rows = state.queries.fetch_itinerary(&ctx).await?;
    Ok(Json(rows))
}
