use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, put},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AuthenticatedUser,
    dto::game::{
        CreateGameRequest, GameDetail, GameListItem, GameSummary, JoinGameRequest,
        LeaveGameResponse, UpdateGameRequest,
    },
    error::AppError,
    services::{coordinator, game_service},
    state::SharedState,
};

/// Routes handling the game catalogue and roster operations.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", get(list_games).post(create_game))
        .route(
            "/games/{id}",
            get(get_game).put(update_game).delete(leave_game),
        )
        .route("/games/{id}/join", put(join_game))
}

/// List upcoming games as lean catalogue entries, oldest date first.
#[utoipa::path(
    get,
    path = "/games",
    tag = "games",
    responses(
        (status = 200, description = "Game catalogue", body = Vec<GameListItem>)
    )
)]
pub async fn list_games(
    State(state): State<SharedState>,
) -> Result<Json<Vec<GameListItem>>, AppError> {
    let games = game_service::list_games(&state).await?;
    Ok(Json(games))
}

/// Fetch one game with rosters resolved to display data.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "games",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Game detail", body = GameDetail),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameDetail>, AppError> {
    let detail = game_service::get_game(&state, id).await?;
    Ok(Json(detail))
}

/// Create a game hosted by the caller, together with its conversation.
#[utoipa::path(
    post,
    path = "/games",
    tag = "games",
    security(("bearer_auth" = [])),
    request_body = CreateGameRequest,
    responses(
        (status = 201, description = "Game created", body = GameSummary),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    user: AuthenticatedUser,
    payload: Result<Json<CreateGameRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GameSummary>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;
    let summary = coordinator::create_game(&state, user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// Join a game, optionally requesting a specific team.
///
/// Without a body the first open seat is taken, team A preferred.
#[utoipa::path(
    put,
    path = "/games/{id}/join",
    tag = "games",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    request_body(content = JoinGameRequest, description = "Optional team preference"),
    responses(
        (status = 200, description = "Seat taken", body = GameSummary),
        (status = 400, description = "Roster conflict"),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn join_game(
    State(state): State<SharedState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    payload: Result<Option<Json<JoinGameRequest>>, JsonRejection>,
) -> Result<Json<GameSummary>, AppError> {
    let request = payload?.map(|Json(body)| body).unwrap_or_default();
    let summary = coordinator::join_game(&state, id, user.id, request).await?;
    Ok(Json(summary))
}

/// Rewrite the details of a game. Only the host may do this.
#[utoipa::path(
    put,
    path = "/games/{id}",
    tag = "games",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    request_body = UpdateGameRequest,
    responses(
        (status = 200, description = "Game updated", body = GameSummary),
        (status = 403, description = "Caller is not the host"),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn update_game(
    State(state): State<SharedState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateGameRequest>, JsonRejection>,
) -> Result<Json<GameSummary>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;
    let summary = game_service::update_game(&state, id, user.id, payload).await?;
    Ok(Json(summary))
}

/// Leave a game, promoting a replacement host or deleting an emptied game.
#[utoipa::path(
    delete,
    path = "/games/{id}",
    tag = "games",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Departure applied", body = LeaveGameResponse),
        (status = 403, description = "Caller is not part of the game"),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn leave_game(
    State(state): State<SharedState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<LeaveGameResponse>, AppError> {
    let response = coordinator::leave_game(&state, id, user.id).await?;
    Ok(Json(response))
}
