use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::health::HealthResponse, error::AppError, services::health_service, state::SharedState,
};

#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "Service is up", body = String))
)]
/// Plain liveness probe answering with a static greeting.
pub async fn liveness() -> Json<&'static str> {
    Json("All good in here")
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Storage reachable", body = HealthResponse),
        (status = 500, description = "Storage unreachable")
    )
)]
/// Return the current health status of the backend and ping MongoDB.
pub async fn healthcheck(
    State(state): State<SharedState>,
) -> Result<Json<HealthResponse>, AppError> {
    let status = health_service::health_status(&state).await?;
    Ok(Json(status))
}

/// Configure the health routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/", get(liveness))
        .route("/health", get(healthcheck))
}
