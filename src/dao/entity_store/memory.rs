//! In-memory [`EntityStore`] used by service tests.

use std::collections::HashMap;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use futures::future::BoxFuture;
use uuid::Uuid;

use super::EntityStore;
use crate::dao::models::{ConversationEntity, GameEntity, GameListItemEntity, UserEntity};
use crate::dao::storage::{StorageError, StorageResult};

/// Hash-map backed store with a switch to simulate an unreachable backend.
#[derive(Clone, Default)]
pub struct MemoryEntityStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    games: Mutex<HashMap<Uuid, GameEntity>>,
    conversations: Mutex<HashMap<Uuid, ConversationEntity>>,
    users: Mutex<HashMap<Uuid, UserEntity>>,
    offline: AtomicBool,
    conversation_writes_failing: AtomicBool,
}

impl MemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account for display-data resolution.
    pub fn insert_user(&self, user: UserEntity) {
        self.inner
            .users
            .lock()
            .expect("lock poisoned")
            .insert(user.id, user);
    }

    /// Make every subsequent operation fail as if the backend were down.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    /// Fail only conversation writes, leaving game writes working. Used to
    /// drive the partial-write paths of the coordinator.
    pub fn set_conversation_writes_failing(&self, failing: bool) {
        self.inner
            .conversation_writes_failing
            .store(failing, Ordering::SeqCst);
    }

    fn unavailable(message: &str) -> StorageError {
        StorageError::unavailable(message.into(), std::io::Error::other(message.to_owned()))
    }

    fn guard(&self) -> StorageResult<()> {
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(Self::unavailable("memory store offline"));
        }
        Ok(())
    }

    fn guard_conversation_write(&self) -> StorageResult<()> {
        self.guard()?;
        if self.inner.conversation_writes_failing.load(Ordering::SeqCst) {
            return Err(Self::unavailable("memory store conversation writes failing"));
        }
        Ok(())
    }
}

impl EntityStore for MemoryEntityStore {
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.guard()?;
            store
                .inner
                .games
                .lock()
                .expect("lock poisoned")
                .insert(game.id, game);
            Ok(())
        })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.guard()?;
            Ok(store
                .inner
                .games
                .lock()
                .expect("lock poisoned")
                .get(&id)
                .cloned())
        })
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store.guard()?;
            Ok(store
                .inner
                .games
                .lock()
                .expect("lock poisoned")
                .remove(&id)
                .is_some())
        })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameListItemEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.guard()?;
            let mut games: Vec<GameEntity> = store
                .inner
                .games
                .lock()
                .expect("lock poisoned")
                .values()
                .cloned()
                .collect();
            games.sort_by_key(|game| game.date);
            Ok(games.into_iter().map(Into::into).collect())
        })
    }

    fn save_conversation(
        &self,
        conversation: ConversationEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.guard_conversation_write()?;
            store
                .inner
                .conversations
                .lock()
                .expect("lock poisoned")
                .insert(conversation.id, conversation);
            Ok(())
        })
    }

    fn find_conversation(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ConversationEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.guard()?;
            Ok(store
                .inner
                .conversations
                .lock()
                .expect("lock poisoned")
                .get(&id)
                .cloned())
        })
    }

    fn find_conversation_by_game(
        &self,
        game: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ConversationEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.guard()?;
            Ok(store
                .inner
                .conversations
                .lock()
                .expect("lock poisoned")
                .values()
                .find(|conversation| conversation.game == game)
                .cloned())
        })
    }

    fn delete_conversation_by_game(&self, game: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store.guard_conversation_write()?;
            let mut conversations = store.inner.conversations.lock().expect("lock poisoned");
            let id = conversations
                .values()
                .find(|conversation| conversation.game == game)
                .map(|conversation| conversation.id);
            Ok(match id {
                Some(id) => conversations.remove(&id).is_some(),
                None => false,
            })
        })
    }

    fn list_conversations(
        &self,
        game: Option<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<ConversationEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.guard()?;
            Ok(store
                .inner
                .conversations
                .lock()
                .expect("lock poisoned")
                .values()
                .filter(|conversation| game.is_none_or(|game| conversation.game == game))
                .cloned()
                .collect())
        })
    }

    fn find_users(&self, ids: Vec<Uuid>) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.guard()?;
            let users = store.inner.users.lock().expect("lock poisoned");
            Ok(ids.into_iter().filter_map(|id| users.get(&id).cloned()).collect())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.guard() })
    }
}
