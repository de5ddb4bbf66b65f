/// Conversation reads and message posting.
pub mod conversation_service;
/// Cross-entity flows keeping games and conversations consistent.
pub mod coordinator;
/// OpenAPI documentation generation.
pub mod documentation;
/// Game reads and host-side updates.
pub mod game_service;
/// Health check service.
pub mod health_service;

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexSet;
use uuid::Uuid;

use crate::dao::entity_store::EntityStore;
use crate::dao::models::UserEntity;
use crate::error::ServiceError;

/// Fetch display data for `ids`, keyed by user id. Ids with no matching
/// account are simply absent; callers degrade to bare ids.
pub(crate) async fn resolve_users(
    store: &Arc<dyn EntityStore>,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, UserEntity>, ServiceError> {
    let unique: IndexSet<Uuid> = ids.into_iter().collect();
    if unique.is_empty() {
        return Ok(HashMap::new());
    }
    let users = store.find_users(unique.into_iter().collect()).await?;
    Ok(users.into_iter().map(|user| (user.id, user)).collect())
}
