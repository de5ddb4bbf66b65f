use uuid::Uuid;

use crate::{
    dto::game::{GameDetail, GameListItem, GameSummary, UpdateGameRequest},
    error::ServiceError,
    services::resolve_users,
    state::SharedState,
};

/// List every upcoming game as a lean catalogue entry, oldest date first.
pub async fn list_games(state: &SharedState) -> Result<Vec<GameListItem>, ServiceError> {
    let store = state.require_store().await?;
    let games = store.list_games().await?;
    Ok(games.into_iter().map(Into::into).collect())
}

/// Load one game with rosters resolved to display data.
pub async fn get_game(state: &SharedState, id: Uuid) -> Result<GameDetail, ServiceError> {
    let store = state.require_store().await?;
    let Some(game) = store.find_game(id).await? else {
        return Err(game_not_found(id));
    };

    let users = resolve_users(&store, game.roster()).await?;
    Ok(GameDetail::resolve(game, &users))
}

/// Rewrite the mutable details of a game. Only the host may do this, and the
/// roster and conversation are never touched.
pub async fn update_game(
    state: &SharedState,
    id: Uuid,
    caller: Uuid,
    request: UpdateGameRequest,
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
    if game.host != caller {
        return Err(ServiceError::Forbidden(
            "only the host can update this game".into(),
        ));
    }

    if let Some(location) = request.location {
        game.location = location;
    }
    if let Some(area) = request.area {
        game.area = Some(area);
    }
    if let Some(date) = request.date {
        game.date = date.into();
    }
    game.touch();

    store.save_game(game.clone()).await?;
    Ok(game.into())
}

pub(crate) fn game_not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("game `{id}` not found"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{Duration, SystemTime};

    use super::*;
    use crate::auth::AuthVerifier;
    use crate::dao::entity_store::memory::MemoryEntityStore;
    use crate::dao::models::{GameEntity, UserEntity};
    use crate::state::AppState;

    async fn state_with(store: &Arc<MemoryEntityStore>) -> SharedState {
        let state = AppState::new(AuthVerifier::new(b"game-service-tests"));
        state.install_store(store.clone()).await;
        state
    }

    fn seeded_game(host: Uuid) -> GameEntity {
        GameEntity::new(
            host,
            "Riverside court".into(),
            Some("North".into()),
            SystemTime::now() + Duration::from_secs(3_600),
        )
    }

    async fn save(store: &Arc<MemoryEntityStore>, game: &GameEntity) {
        use crate::dao::entity_store::EntityStore;
        store.save_game(game.clone()).await.expect("seed game");
    }

    #[tokio::test]
    async fn get_game_resolves_known_players() {
        let store = Arc::new(MemoryEntityStore::new());
        let state = state_with(&store).await;

        let host = Uuid::new_v4();
        store.insert_user(UserEntity {
            id: host,
            name: "Ana".into(),
            email: "ana@example.com".into(),
        });
        let game = seeded_game(host);
        save(&store, &game).await;

        let detail = get_game(&state, game.id).await.expect("game detail");
        assert_eq!(detail.team_a.len(), 1);
        assert_eq!(detail.team_a[0].name.as_deref(), Some("Ana"));
        assert_eq!(detail.host.id, host);
    }

    #[tokio::test]
    async fn get_game_unknown_id_is_not_found() {
        let store = Arc::new(MemoryEntityStore::new());
        let state = state_with(&store).await;

        let err = get_game(&state, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_rejects_non_host() {
        let store = Arc::new(MemoryEntityStore::new());
        let state = state_with(&store).await;

        let host = Uuid::new_v4();
        let game = seeded_game(host);
        save(&store, &game).await;

        let err = update_game(
            &state,
            game.id,
            Uuid::new_v4(),
            UpdateGameRequest {
                location: Some("Elsewhere".into()),
                area: None,
                date: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn update_applies_only_provided_fields() {
        let store = Arc::new(MemoryEntityStore::new());
        let state = state_with(&store).await;

        let host = Uuid::new_v4();
        let game = seeded_game(host);
        save(&store, &game).await;

        let summary = update_game(
            &state,
            game.id,
            host,
            UpdateGameRequest {
                location: Some("Harbour gym".into()),
                area: None,
                date: None,
            },
        )
        .await
        .expect("updated game");

        assert_eq!(summary.location, "Harbour gym");
        assert_eq!(summary.area.as_deref(), Some("North"));
    }

    #[tokio::test]
    async fn update_of_unknown_game_registers_no_gate() {
        let store = Arc::new(MemoryEntityStore::new());
        let state = state_with(&store).await;

        let err = update_game(
            &state,
            Uuid::new_v4(),
            Uuid::new_v4(),
            UpdateGameRequest {
                location: Some("Elsewhere".into()),
                area: None,
                date: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(state.gate_count(), 0);
    }

    #[tokio::test]
    async fn list_games_maps_catalogue_entries() {
        let store = Arc::new(MemoryEntityStore::new());
        let state = state_with(&store).await;

        let game = seeded_game(Uuid::new_v4());
        save(&store, &game).await;

        let listed = list_games(&state).await.expect("catalogue");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, game.id);
        assert_eq!(listed[0].player_count, 1);
    }

    #[tokio::test]
    async fn repeated_reads_are_identical() {
        let store = Arc::new(MemoryEntityStore::new());
        let state = state_with(&store).await;

        let game = seeded_game(Uuid::new_v4());
        save(&store, &game).await;

        let first = get_game(&state, game.id).await.expect("game detail");
        let second = get_game(&state, game.id).await.expect("game detail");
        assert_eq!(
            serde_json::to_value(&first).expect("serialize"),
            serde_json::to_value(&second).expect("serialize"),
        );
    }
}
