use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Matchpoint.
#[openapi(
    paths(
        crate::routes::health::liveness,
        crate::routes::health::healthcheck,
        crate::routes::game::list_games,
        crate::routes::game::get_game,
        crate::routes::game::create_game,
        crate::routes::game::join_game,
        crate::routes::game::update_game,
        crate::routes::game::leave_game,
        crate::routes::conversation::list_conversations,
        crate::routes::conversation::get_conversation,
        crate::routes::conversation::post_message,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::JoinGameRequest,
            crate::dto::game::UpdateGameRequest,
            crate::dto::game::UserRef,
            crate::dto::game::GameSummary,
            crate::dto::game::GameListItem,
            crate::dto::game::GameDetail,
            crate::dto::game::LeaveGameResponse,
            crate::dto::conversation::PostMessageRequest,
            crate::dto::conversation::MessageSummary,
            crate::dto::conversation::MessageDetail,
            crate::dto::conversation::ConversationSummary,
            crate::dto::conversation::ConversationDetail,
            crate::dto::conversation::ConversationListItem,
            crate::dao::models::TeamSide,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "games", description = "Game catalogue and roster operations"),
        (name = "conversations", description = "Game conversations and messages"),
    )
)]
pub struct ApiDoc;

/// Registers the bearer token scheme referenced by the protected routes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
