use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::auth::AuthVerifier;
use crate::dao::entity_store::EntityStore;
use crate::error::ServiceError;

pub type SharedState = Arc<AppState>;

/// Central application state storing the database handle, the token verifier
/// and the per-game mutation gates.
pub struct AppState {
    store: RwLock<Option<Arc<dyn EntityStore>>>,
    auth: AuthVerifier,
    game_gates: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(auth: AuthVerifier) -> SharedState {
        Arc::new(Self {
            store: RwLock::new(None),
            auth,
            game_gates: DashMap::new(),
        })
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn store(&self) -> Option<Arc<dyn EntityStore>> {
        let guard = self.store.read().await;
        guard.as_ref().cloned()
    }

    /// Store handle for request handlers, or a degraded-mode error.
    pub async fn require_store(&self) -> Result<Arc<dyn EntityStore>, ServiceError> {
        self.store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new store implementation and leave degraded mode.
    pub async fn install_store(&self, store: Arc<dyn EntityStore>) {
        let mut guard = self.store.write().await;
        *guard = Some(store);
    }

    /// Remove the current store and enter degraded mode.
    pub async fn clear_store(&self) {
        let mut guard = self.store.write().await;
        guard.take();
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.store.read().await;
        guard.is_none()
    }

    /// Token verifier for the REST surface.
    pub fn auth(&self) -> &AuthVerifier {
        &self.auth
    }

    /// Serialization gate for mutations of one game.
    ///
    /// Holding the gate makes roster changes of the same game run one at a
    /// time; distinct games are unaffected.
    pub fn game_gate(&self, game: Uuid) -> Arc<Mutex<()>> {
        self.game_gates
            .entry(game)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Forget the gate of a deleted game.
    ///
    /// Tasks still waiting on the old gate simply find the game gone once
    /// they acquire it.
    pub fn discard_game_gate(&self, game: Uuid) {
        self.game_gates.remove(&game);
    }

    /// Number of registered gates.
    #[cfg(test)]
    pub(crate) fn gate_count(&self) -> usize {
        self.game_gates.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::entity_store::memory::MemoryEntityStore;

    fn state() -> SharedState {
        AppState::new(AuthVerifier::new(b"state-test-secret"))
    }

    #[tokio::test]
    async fn starts_degraded_until_store_installed() {
        let state = state();
        assert!(state.is_degraded().await);
        assert!(matches!(
            state.require_store().await,
            Err(ServiceError::Degraded)
        ));

        state
            .install_store(Arc::new(MemoryEntityStore::new()))
            .await;
        assert!(!state.is_degraded().await);
        assert!(state.require_store().await.is_ok());

        state.clear_store().await;
        assert!(state.is_degraded().await);
    }

    #[tokio::test]
    async fn game_gates_are_per_game() {
        let state = state();
        let game = Uuid::new_v4();
        let other = Uuid::new_v4();

        let gate = state.game_gate(game);
        assert!(Arc::ptr_eq(&gate, &state.game_gate(game)));
        assert!(!Arc::ptr_eq(&gate, &state.game_gate(other)));
        assert_eq!(state.gate_count(), 2);

        state.discard_game_gate(game);
        assert!(!Arc::ptr_eq(&gate, &state.game_gate(game)));
    }
}
