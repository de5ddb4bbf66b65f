//! Mutations that touch a game and its conversation as a pair.
//!
//! Every flow writes the game document first and mirrors the change into the
//! conversation afterwards. A conversation write that fails once the game
//! write already landed is reported as a partial write instead of being
//! swallowed, and the two documents may disagree until a later mutation
//! repairs them.

use std::sync::Arc;

use tracing::{error, warn};
use uuid::Uuid;

use crate::{
    dao::{
        entity_store::EntityStore,
        models::{ConversationEntity, GameEntity},
        storage::StorageError,
    },
    dto::game::{CreateGameRequest, GameSummary, JoinGameRequest, LeaveGameResponse},
    error::ServiceError,
    services::game_service::game_not_found,
    state::SharedState,
};

/// Create a game hosted by `host` together with its conversation.
///
/// The host is seated in team A and starts as the only conversation
/// participant, so the conversation comes out locked.
pub async fn create_game(
    state: &SharedState,
    host: Uuid,
    request: CreateGameRequest,
) -> Result<GameSummary, ServiceError> {
    let store = state.require_store().await?;

    let game = GameEntity::new(host, request.location, request.area, request.date.into());
    store.save_game(game.clone()).await?;

    let conversation = ConversationEntity::new(game.id, [host]);
    if let Err(err) = store.save_conversation(conversation).await {
        return Err(partial_write("create_game", game.id, err));
    }

    Ok(game.into())
}

/// Seat `user` in a game and mirror them into its conversation.
///
/// Runs under the game's gate, so concurrent joins are applied one at a time
/// and a full team can never be oversubscribed.
pub async fn join_game(
    state: &SharedState,
    id: Uuid,
    user: Uuid,
    request: JoinGameRequest,
) -> Result<GameSummary, ServiceError> {
    let store = state.require_store().await?;

    // One unguarded probe first; unknown ids must not register a gate.
    if store.find_game(id).await?.is_none() {
        return Err(game_not_found(id));
    }
    let gate = state.game_gate(id);
    let _guard = gate.lock().await;

    // Re-read under the gate; the game may be gone by now.
    let Some(mut game) = store.find_game(id).await? else {
        state.discard_game_gate(id);
        return Err(game_not_found(id));
    };
    game.join(user, request.team)?;
    store.save_game(game.clone()).await?;

    sync_conversation(&store, &game, "join_game", |conversation| {
        conversation.add_user(user);
    })
    .await?;

    Ok(game.into())
}

/// Remove `user` from a game, handing the host role on or deleting the game
/// once nobody is left.
pub async fn leave_game(
    state: &SharedState,
    id: Uuid,
    user: Uuid,
) -> Result<LeaveGameResponse, ServiceError> {
    let store = state.require_store().await?;

    // One unguarded probe first; unknown ids must not register a gate.
    if store.find_game(id).await?.is_none() {
        return Err(game_not_found(id));
    }
    let gate = state.game_gate(id);
    let _guard = gate.lock().await;

    // Re-read under the gate; the game may be gone by now.
    let Some(mut game) = store.find_game(id).await? else {
        state.discard_game_gate(id);
        return Err(game_not_found(id));
    };
    let outcome = game.leave(user)?;

    if outcome.roster_empty {
        store.delete_game(id).await?;
        if let Err(err) = store.delete_conversation_by_game(id).await {
            return Err(partial_write("leave_game", id, err));
        }
        state.discard_game_gate(id);
        return Ok(LeaveGameResponse {
            deleted: true,
            new_host: None,
            game: None,
        });
    }

    store.save_game(game.clone()).await?;
    sync_conversation(&store, &game, "leave_game", |conversation| {
        conversation.remove_user(user);
    })
    .await?;

    Ok(LeaveGameResponse {
        deleted: false,
        new_host: outcome.new_host,
        game: Some(game.into()),
    })
}

/// Mirror a roster change into the game's conversation.
///
/// A conversation that went missing is rebuilt from the roster, which also
/// recomputes the lock. Failures here happen after the game write landed, so
/// they surface as partial writes.
async fn sync_conversation(
    store: &Arc<dyn EntityStore>,
    game: &GameEntity,
    operation: &'static str,
    apply: impl FnOnce(&mut ConversationEntity),
) -> Result<(), ServiceError> {
    let mut conversation = match store.find_conversation_by_game(game.id).await {
        Ok(Some(conversation)) => conversation,
        Ok(None) => {
            warn!(game = %game.id, "conversation missing, rebuilding from roster");
            ConversationEntity::new(game.id, game.roster())
        }
        Err(err) => return Err(partial_write(operation, game.id, err)),
    };

    apply(&mut conversation);
    if let Err(err) = store.save_conversation(conversation).await {
        return Err(partial_write(operation, game.id, err));
    }
    Ok(())
}

fn partial_write(operation: &'static str, game: Uuid, source: StorageError) -> ServiceError {
    error!(%game, operation, error = %source, "conversation write failed after game write");
    ServiceError::PartialConsistency {
        operation,
        game,
        source,
    }
}
