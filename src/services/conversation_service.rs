use uuid::Uuid;

use crate::{
    dto::conversation::{
        ConversationDetail, ConversationListItem, ConversationSummary, PostMessageRequest,
    },
    error::ServiceError,
    services::resolve_users,
    state::SharedState,
};

/// Load one conversation with participants and authors resolved to display
/// data. Only current participants may read it.
pub async fn get_conversation(
    state: &SharedState,
    id: Uuid,
    caller: Uuid,
) -> Result<ConversationDetail, ServiceError> {
    let store = state.require_store().await?;
    let Some(conversation) = store.find_conversation(id).await? else {
        return Err(conversation_not_found(id));
    };
    if !conversation.is_participant(caller) {
        return Err(ServiceError::Forbidden(
            "user is not allowed to view this conversation".into(),
        ));
    }

    // Authors who already left the game keep their messages, so resolve them
    // alongside the current participants.
    let ids = conversation
        .users
        .iter()
        .copied()
        .chain(conversation.messages.iter().map(|message| message.user));
    let users = resolve_users(&store, ids).await?;
    Ok(ConversationDetail::resolve(conversation, &users))
}

/// List conversations as lean entries, optionally narrowed to one game.
/// Message bodies stay private to participants.
pub async fn list_conversations(
    state: &SharedState,
    game: Option<Uuid>,
) -> Result<Vec<ConversationListItem>, ServiceError> {
    let store = state.require_store().await?;
    let conversations = store.list_conversations(game).await?;
    Ok(conversations.into_iter().map(Into::into).collect())
}

/// Append a message to a conversation on behalf of `caller`.
///
/// The write runs under the owning game's gate so it cannot interleave with a
/// roster change that would flip the lock mid-flight.
pub async fn post_message(
    state: &SharedState,
    id: Uuid,
    caller: Uuid,
    request: PostMessageRequest,
) -> Result<ConversationSummary, ServiceError> {
    let store = state.require_store().await?;

    // One unguarded probe to learn which game owns the conversation.
    let Some(probe) = store.find_conversation(id).await? else {
        return Err(conversation_not_found(id));
    };
    let gate = state.game_gate(probe.game);
    let _guard = gate.lock().await;

    // Re-read under the gate; the roster may have changed while waiting. A
    // conversation that vanished went down with its game, gate included.
    let Some(mut conversation) = store.find_conversation(id).await? else {
        state.discard_game_gate(probe.game);
        return Err(conversation_not_found(id));
    };
    conversation.post(caller, &request.message)?;
    store.save_conversation(conversation.clone()).await?;
    Ok(conversation.into())
}

pub(crate) fn conversation_not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("conversation `{id}` not found"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::AuthVerifier;
    use crate::dao::entity_store::memory::MemoryEntityStore;
    use crate::dao::entity_store::EntityStore;
    use crate::dao::models::{ConversationEntity, UserEntity};
    use crate::state::AppState;

    async fn state_with(store: &Arc<MemoryEntityStore>) -> SharedState {
        let state = AppState::new(AuthVerifier::new(b"conversation-service-tests"));
        state.install_store(store.clone()).await;
        state
    }

    fn full_conversation(users: [Uuid; 4]) -> ConversationEntity {
        ConversationEntity::new(Uuid::new_v4(), users)
    }

    #[tokio::test]
    async fn get_conversation_requires_participation() {
        let store = Arc::new(MemoryEntityStore::new());
        let state = state_with(&store).await;

        let users = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let conversation = full_conversation(users);
        store
            .save_conversation(conversation.clone())
            .await
            .expect("seed conversation");

        let err = get_conversation(&state, conversation.id, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let detail = get_conversation(&state, conversation.id, users[0])
            .await
            .expect("participant view");
        assert_eq!(detail.users.len(), 4);
    }

    #[tokio::test]
    async fn get_conversation_resolves_message_authors() {
        let store = Arc::new(MemoryEntityStore::new());
        let state = state_with(&store).await;

        let users = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        store.insert_user(UserEntity {
            id: users[1],
            name: "Bea".into(),
            email: "bea@example.com".into(),
        });
        let mut conversation = full_conversation(users);
        conversation
            .post(users[1], "see you at six")
            .expect("unlocked conversation");
        store
            .save_conversation(conversation.clone())
            .await
            .expect("seed conversation");

        let detail = get_conversation(&state, conversation.id, users[0])
            .await
            .expect("participant view");
        assert_eq!(detail.messages.len(), 1);
        assert_eq!(detail.messages[0].user.name.as_deref(), Some("Bea"));
    }

    #[tokio::test]
    async fn post_message_rejects_locked_conversation() {
        let store = Arc::new(MemoryEntityStore::new());
        let state = state_with(&store).await;

        let member = Uuid::new_v4();
        let conversation = ConversationEntity::new(Uuid::new_v4(), [member]);
        store
            .save_conversation(conversation.clone())
            .await
            .expect("seed conversation");

        let err = post_message(
            &state,
            conversation.id,
            member,
            PostMessageRequest {
                message: "anyone up".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Locked(_)));
    }

    #[tokio::test]
    async fn post_message_appends_and_persists() {
        let store = Arc::new(MemoryEntityStore::new());
        let state = state_with(&store).await;

        let users = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let conversation = full_conversation(users);
        store
            .save_conversation(conversation.clone())
            .await
            .expect("seed conversation");

        let summary = post_message(
            &state,
            conversation.id,
            users[2],
            PostMessageRequest {
                message: "  bring water  ".into(),
            },
        )
        .await
        .expect("posted message");
        assert_eq!(summary.messages.len(), 1);
        assert_eq!(summary.messages[0].text, "bring water");

        let stored = store
            .find_conversation(conversation.id)
            .await
            .expect("lookup")
            .expect("conversation kept");
        assert_eq!(stored.messages.len(), 1);
    }

    #[tokio::test]
    async fn post_message_unknown_conversation_is_not_found() {
        let store = Arc::new(MemoryEntityStore::new());
        let state = state_with(&store).await;

        let err = post_message(
            &state,
            Uuid::new_v4(),
            Uuid::new_v4(),
            PostMessageRequest {
                message: "hello".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
