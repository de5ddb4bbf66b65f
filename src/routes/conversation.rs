use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    auth::AuthenticatedUser,
    dto::conversation::{
        ConversationDetail, ConversationFilter, ConversationListItem, ConversationSummary,
        PostMessageRequest,
    },
    error::AppError,
    services::conversation_service,
    state::SharedState,
};

/// Routes handling game conversations and message posting.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/conversations", get(list_conversations))
        .route("/conversations/{id}", get(get_conversation))
        .route("/conversations/{id}/message", post(post_message))
}

/// List conversations as lean entries without message bodies.
#[utoipa::path(
    get,
    path = "/conversations",
    tag = "conversations",
    params(ConversationFilter),
    responses(
        (status = 200, description = "Conversation listing", body = Vec<ConversationListItem>)
    )
)]
pub async fn list_conversations(
    State(state): State<SharedState>,
    Query(filter): Query<ConversationFilter>,
) -> Result<Json<Vec<ConversationListItem>>, AppError> {
    let listed = conversation_service::list_conversations(&state, filter.game).await?;
    Ok(Json(listed))
}

/// Fetch one conversation. Only current participants may read it.
#[utoipa::path(
    get,
    path = "/conversations/{id}",
    tag = "conversations",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Identifier of the conversation")),
    responses(
        (status = 200, description = "Conversation detail", body = ConversationDetail),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "Unknown conversation")
    )
)]
pub async fn get_conversation(
    State(state): State<SharedState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ConversationDetail>, AppError> {
    let detail = conversation_service::get_conversation(&state, id, user.id).await?;
    Ok(Json(detail))
}

/// Append a message to a conversation.
#[utoipa::path(
    post,
    path = "/conversations/{id}/message",
    tag = "conversations",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Identifier of the conversation")),
    request_body = PostMessageRequest,
    responses(
        (status = 201, description = "Message appended", body = ConversationSummary),
        (status = 403, description = "Conversation locked or caller not a participant"),
        (status = 404, description = "Unknown conversation")
    )
)]
pub async fn post_message(
    State(state): State<SharedState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<PostMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ConversationSummary>), AppError> {
    let Json(payload) = payload?;
    let summary = conversation_service::post_message(&state, id, user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}
